use dimevents_core::{GapFill, Value};
use proptest::prelude::*;

use generators::*;

proptest! {
    #![proptest_config(proptest::test_runner::Config::with_cases(512))]

    #[test]
    fn gaps_are_exactly_the_uncovered_runs((frames, events) in arb_tracked_events()) {
        let mut ds = dataset(&frames, &events);
        let gaps = ds.events().gaps().expect("gaps");

        let uncovered: Vec<bool> = frames.iter().map(|&f| !covered(f, &events)).collect();
        let runs = uncovered
            .iter()
            .zip(std::iter::once(&false).chain(uncovered.iter()))
            .filter(|&(now, before)| *now && !*before)
            .count();
        prop_assert_eq!(gaps.len(), runs);

        for (frame, is_gap) in frames.iter().zip(&uncovered) {
            let value = Value::Int(*frame);
            let in_a_gap = gaps.iter().any(|g| g.start <= value && value <= g.end);
            prop_assert_eq!(in_a_gap, *is_gap, "frame {}", frame);
        }
        prop_assert_eq!(ds.events().has_gaps().expect("has_gaps"), runs > 0);
    }

    #[test]
    fn filling_leaves_no_gaps((frames, events) in arb_tracked_events()) {
        let mut ds = dataset(&frames, &events);
        let gaps = ds.events().gaps().expect("gaps").len();
        let filled = ds.events().fill_gaps(&GapFill::new()).expect("fill");

        prop_assert!(!filled.events().has_gaps().expect("has_gaps"));
        prop_assert_eq!(
            filled.events().table().map(dimevents_core::EventTable::len),
            Some(events.len() + gaps)
        );
    }

    #[test]
    fn overlap_means_next_start_within_one_of_end((frames, events) in arb_tracked_events()) {
        let mut ds = dataset(&frames, &events);

        let mut sorted = events.clone();
        sorted.sort_by_key(|&(start, _)| start);
        let expected = sorted.windows(2).any(|pair| pair[1].0 - pair[0].1 < 1);

        prop_assert_eq!(ds.events().has_overlaps().expect("has_overlaps"), expected);
    }

    #[test]
    fn dropping_a_covered_frame_from_every_event_opens_a_gap(
        (frames, events) in arb_tracked_events(),
        pick in any::<prop::sample::Index>(),
    ) {
        let frame = frames[pick.index(frames.len())];
        prop_assume!(covered(frame, &events));

        let split: Vec<(i64, i64)> = events
            .iter()
            .flat_map(|&(s, e)| {
                if s <= frame && frame <= e {
                    let before = frames.iter().copied().filter(|&f| s <= f && f < frame).max();
                    let after = frames.iter().copied().filter(|&f| frame < f && f <= e).min();
                    vec![before.map(|b| (s, b)), after.map(|a| (a, e))]
                } else {
                    vec![Some((s, e))]
                }
            })
            .flatten()
            .collect();

        let mut ds = dataset(&frames, &split);
        prop_assert!(ds.events().has_gaps().expect("has_gaps"));
        let gaps = ds.events().gaps().expect("gaps");
        let value = Value::Int(frame);
        prop_assert!(gaps.iter().any(|g| g.start <= value && value <= g.end));
    }
}
