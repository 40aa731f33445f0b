use thiserror::Error;

#[derive(Debug, Error)]
pub enum KirError {
    #[error("malformed .kir version string {0:?}, expected \"major.minor\"")]
    MalformedVersion(String),
    #[error("unsupported .kir major version {found}, this build understands {supported}")]
    UnsupportedMajorVersion { found: u32, supported: u32 },
    #[error("not a kir-json document (format field was {0:?})")]
    WrongFormat(String),
    #[error("failed to serialize .kir document: {0}")]
    Serialize(#[source] serde_json::Error),
    #[error("failed to parse .kir document: {0}")]
    Deserialize(#[source] serde_json::Error),
}
