use std::fmt;

/// Machine-readable error codes for callers that branch on failure kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    EventsNotLoaded,
    MappingNotLoaded,
    InvalidMapping,
    MultipleDurations,
    NoDurationMapping,
    UnknownConstraint,
    UnrecognizedColumn,
    NoMappingMatch,
    InvalidMask,
    NonNumericDuration,
    UnsupportedSource,
    TableOperation,
    DatasetOperation,
    ReindexFailed,
}

impl ErrorCode {
    pub const ALL: [Self; 14] = [
        Self::EventsNotLoaded,
        Self::MappingNotLoaded,
        Self::InvalidMapping,
        Self::MultipleDurations,
        Self::NoDurationMapping,
        Self::UnknownConstraint,
        Self::UnrecognizedColumn,
        Self::NoMappingMatch,
        Self::InvalidMask,
        Self::NonNumericDuration,
        Self::UnsupportedSource,
        Self::TableOperation,
        Self::DatasetOperation,
        Self::ReindexFailed,
    ];

    /// Stable code identifier (`E####`) for machine parsing.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::EventsNotLoaded => "E1001",
            Self::MappingNotLoaded => "E1002",
            Self::InvalidMapping => "E2001",
            Self::MultipleDurations => "E2002",
            Self::NoDurationMapping => "E2003",
            Self::UnknownConstraint => "E3001",
            Self::UnrecognizedColumn => "E3002",
            Self::NoMappingMatch => "E3003",
            Self::InvalidMask => "E3004",
            Self::NonNumericDuration => "E4001",
            Self::UnsupportedSource => "E5001",
            Self::TableOperation => "E6001",
            Self::DatasetOperation => "E6002",
            Self::ReindexFailed => "E6003",
        }
    }

    /// Short human-facing summary for logs and terminal output.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::EventsNotLoaded => "Events not loaded",
            Self::MappingNotLoaded => "Dimension mapping not loaded",
            Self::InvalidMapping => "Invalid dimension mapping",
            Self::MultipleDurations => "More than one duration pair",
            Self::NoDurationMapping => "No duration mapping",
            Self::UnknownConstraint => "Unknown selection constraint",
            Self::UnrecognizedColumn => "Unrecognized event column",
            Self::NoMappingMatch => "Column not in dimension mapping",
            Self::InvalidMask => "Invalid boolean mask",
            Self::NonNumericDuration => "Non-numeric duration bound",
            Self::UnsupportedSource => "Unsupported event source",
            Self::TableOperation => "Event table operation failed",
            Self::DatasetOperation => "Dataset operation failed",
            Self::ReindexFailed => "Reindex failed",
        }
    }

    /// Optional remediation hint.
    #[must_use]
    pub const fn hint(self) -> Option<&'static str> {
        match self {
            Self::EventsNotLoaded => Some("Call `events().load(table, ..)` first."),
            Self::MappingNotLoaded => Some("Pass a dimension mapping to `load` or `set_mapping`."),
            Self::InvalidMapping => {
                Some("Map only existing dataset dimensions/coordinates to existing event columns.")
            }
            Self::MultipleDurations => Some("Keep a single start/end column pair in the mapping."),
            Self::NoDurationMapping => {
                Some("Map a dimension to a start/end column pair, e.g. frame -> (start, end).")
            }
            Self::UnknownConstraint => {
                Some("Use dataset dimension/coordinate names or event column names as keys.")
            }
            Self::UnrecognizedColumn => None,
            Self::NoMappingMatch => Some("Add the column to the dimension mapping."),
            Self::InvalidMask => Some("Return exactly one flag per event row from the predicate."),
            Self::NonNumericDuration => Some("Overlap detection needs numeric start/end values."),
            Self::UnsupportedSource => Some("Build an `EventTable` and load that instead."),
            Self::TableOperation | Self::DatasetOperation => None,
            Self::ReindexFailed => {
                Some("Match values must be unique, and sorted when a fill method is used.")
            }
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}
