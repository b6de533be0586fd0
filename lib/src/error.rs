use std::fmt;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl FieldError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("validation failed: {}", join_fields(.0))]
    Validation(Vec<FieldError>),

    #[error("index {index} out of range for {len} question(s)")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("cannot submit an empty question batch")]
    EmptyBatch,

    #[error("{0} not found")]
    NotFound(String),

    #[error("request failed: {0}")]
    Fetch(String),

    #[error("session is no longer authenticated")]
    Unauthenticated,
}

impl Error {
    pub fn field_errors(&self) -> &[FieldError] {
        match self {
            Self::Validation(fields) => fields,
            _ => &[],
        }
    }

    /// True for failures that never left this process.
    pub fn is_local(&self) -> bool {
        !matches!(self, Self::Fetch(_) | Self::Unauthenticated)
    }
}

fn join_fields(fields: &[FieldError]) -> String {
    fields
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
