#[derive(Debug, thiserror::Error)]
pub enum RefillError {
    #[error("malformed {field} date {value:?}: {source}")]
    MalformedFact {
        field: String,
        value: String,
        #[source]
        source: chrono::ParseError,
    },
    #[error("No protocol found for medication class: {0}")]
    ProtocolNotFound(String),
    #[error("protocol store failure: {0}")]
    Store(String),
    #[error("clinical data source failure: {0}")]
    Source(String),
    #[error("failed to deserialize clinical data: {0}")]
    Deserialization(serde_json::Error),
}

pub type RefillResult<T> = std::result::Result<T, RefillError>;
