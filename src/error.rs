#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TwitterError {
    /// JSON did not have the expected shape.
    Json(String),
    /// JSON had the right shape but a value made no sense.
    MalformedResponse(String),
    /// A paging parameter was set that the endpoint does not accept.
    UnsupportedParameter(String),
    InvalidArgument(String),
    /// The caller's transport failed to fetch a page.
    Fetch(String),
}

impl std::fmt::Display for TwitterError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Json(s) => write!(f, "unexpected json: {}", s),
            Self::MalformedResponse(s) => write!(f, "twitter api returned malformed response: {}", s),
            Self::UnsupportedParameter(s) => {
                write!(f, "paging parameter [{}] is not supported with this operation", s)
            }
            Self::InvalidArgument(s) => write!(f, "invalid argument: {}", s),
            Self::Fetch(s) => write!(f, "unable to fetch page: {}", s),
        }
    }
}

impl std::error::Error for TwitterError {}

impl From<serde_json::Error> for TwitterError {
    fn from(e: serde_json::Error) -> Self {
        Self::Json(e.to_string())
    }
}
