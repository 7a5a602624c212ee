//! Service-level error type.

use thiserror::Error;

use pitstop_core::{DomainError, Rejection};

use crate::record_store::StoreError;

pub type ShopResult<T> = Result<T, ShopError>;

#[derive(Debug, Error)]
pub enum ShopError {
    /// Validation, not-found and state rejections. State is unchanged.
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// The record store failed. Not retried.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Stored data disagrees with what the caller is trying to write.
    #[error("consistency error: {0}")]
    Consistency(String),
}

impl From<Rejection> for ShopError {
    fn from(value: Rejection) -> Self {
        ShopError::Domain(DomainError::Rejected(value))
    }
}

impl ShopError {
    pub fn consistency(msg: impl Into<String>) -> Self {
        Self::Consistency(msg.into())
    }

    pub fn rejection(&self) -> Option<&Rejection> {
        match self {
            ShopError::Domain(err) => err.rejection(),
            _ => None,
        }
    }
}
