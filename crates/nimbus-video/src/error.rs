use nimbus_core::NodeError;

pub type VideoResult<T> = Result<T, VideoError>;

#[derive(thiserror::Error, Debug)]
pub enum VideoError {
    #[error("validation error: {0}")]
    Validation(String),

    #[error("encode error: {0}")]
    Encode(String),

    #[error("node error: {0}")]
    Node(#[from] NodeError),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl VideoError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }
}
