use std::time::Duration;
use thiserror::Error;

/// Malformed input for a single wizard step or ballot. The caller re-prompts
/// the same step; nothing has changed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field} must not be empty")]
    Empty { field: &'static str },
    #[error("could not parse {field} from '{value}'")]
    Unparsable { field: &'static str, value: String },
    #[error("time slot must end after it starts ({start} .. {end})")]
    EndBeforeStart { start: String, end: String },
    #[error("time slot must be at least one minute long")]
    SlotTooShort,
    #[error("at least one option is required")]
    NoOptions,
    #[error("option starting {0} is listed more than once")]
    DuplicateOption(String),
    #[error("a time zone is required when the poll has timed options")]
    MissingTimeZone,
    #[error("unknown time zone '{0}'")]
    UnknownTimeZone(String),
    #[error("'{0}' is not a valid email address")]
    InvalidEmail(String),
    #[error("vote references option '{0}' which is not part of this poll")]
    UnknownOption(String),
    #[error("week start must be between 0 and 6, got {0}")]
    WeekStartOutOfRange(u8),
    #[error("expected {expected} data for this step, got {got}")]
    WrongStep {
        expected: &'static str,
        got: &'static str,
    },
}

/// Failures coming back from the external poll store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Db(#[from] sqlx::Error),
    #[error("store did not answer within {0:?}")]
    Timeout(Duration),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("corrupt record: {0}")]
    Corrupt(String),
}

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// The assembled poll lacks a required value. Only reachable when a step
    /// was skipped or the session state was tampered with.
    #[error("missing required field: {0}")]
    MissingField(&'static str),
    #[error(transparent)]
    Store(#[from] StoreError),
    /// Another submission is already in flight for this session.
    #[error("a submission is already in progress")]
    DuplicateSubmission,
}

impl Error {
    /// Whether the error should be shown to the person filling in the form.
    /// Duplicate submissions are swallowed by the busy guard.
    pub fn is_user_facing(&self) -> bool {
        !matches!(self, Error::DuplicateSubmission)
    }
}
