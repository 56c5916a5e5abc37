use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// A structurally required element is absent: the layout changed or the
    /// page is not the expected resource type.
    #[error("missing required element: {0}")]
    MissingElement(&'static str),

    /// The site served its "invalid id" page instead of a record.
    #[error("page reports an invalid id")]
    InvalidId,
}
