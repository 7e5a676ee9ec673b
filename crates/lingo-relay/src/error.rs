use thiserror::Error;

/// Failure modes of the relay engine, from template parsing through
/// statistics aggregation. URL-template variants surface at startup while
/// the rest surface per request as internal errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RelayError {
    #[error("unterminated '<' in url template '{template}'")]
    UnterminatedParam { template: String },
    #[error("invalid path parameter name '{name}': expected [a-zA-Z0-9_]+")]
    InvalidParamName { name: String },
    #[error("duplicate path parameter '{name}'")]
    DuplicateParam { name: String },
    #[error("duplicate endpoint name '{name}'")]
    DuplicateEndpointName { name: String },
    #[error("missing value for path parameter '{name}'")]
    MissingParamValue { name: String },
    #[error("unknown modification '{name}'")]
    UnknownModification { name: String },
    #[error("unknown statistic kind '{value}': expected 'translated' or 'reviewed'")]
    UnknownStatKind { value: String },
    #[error("resource list is empty")]
    EmptyResourceList,
    #[error("expected upstream payload to be a resource array")]
    ExpectedResourceArray,
    #[error("resource record is missing '{path}'")]
    MissingKey { path: String },
    #[error("expected '{path}' to be an object")]
    NotAnObject { path: String },
    #[error("expected '{path}' to be a number")]
    NotANumber { path: String },
    #[error("sum of '{path}' overflows")]
    CountOverflow { path: String },
}
