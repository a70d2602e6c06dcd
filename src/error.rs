use thiserror::Error;

/// Errors raised by the product data-access layer.
#[derive(Debug, Error)]
pub enum DaoError {
    /// Any failure while opening a connection, preparing or executing a
    /// statement, or mapping a row.
    #[error("data access failed: {0}")]
    DataAccess(#[from] rusqlite::Error),

    /// The insert completed without producing a row id.
    #[error("insert did not return a generated key")]
    MissingGeneratedKey,

    /// An update was requested for a product that was never saved.
    #[error("product has no id; save it before updating")]
    NotPersisted,
}

pub type Result<T, E = DaoError> = std::result::Result<T, E>;
