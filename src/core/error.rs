use thiserror::Error;

#[derive(Error, Debug)]
pub enum AssetError {
    #[error("Asset not found")]
    NotFound,

    #[error("Deserialization error: {0}")]
    Deserialization(String),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Lock error: {0}")]
    Lock(String),
}

pub type Result<T> = std::result::Result<T, AssetError>;

impl AssetError {
    /// A miss is a normal outcome, not a failure.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound)
    }
}

impl<T> From<std::sync::PoisonError<T>> for AssetError {
    fn from(err: std::sync::PoisonError<T>) -> Self {
        Self::Lock(err.to_string())
    }
}
