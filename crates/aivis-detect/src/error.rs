use thiserror::Error;

#[derive(Debug, Error)]
pub enum DetectError {
    #[error("failed to build match pattern for term '{term}': {source}")]
    Pattern {
        term: String,
        #[source]
        source: regex::Error,
    },
}
