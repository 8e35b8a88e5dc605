use super::domain::{Territory, TerritoryId};

/// Storage abstraction so the service can run against any backend.
pub trait RecordStore<T: Territory>: Send + Sync {
    fn insert(&self, record: T) -> Result<T, RepositoryError>;
    fn update(&self, record: T) -> Result<(), RepositoryError>;
    fn fetch(&self, id: TerritoryId) -> Result<Option<T>, RepositoryError>;
    /// Every stored record, active or not, in id order.
    fn list(&self) -> Result<Vec<T>, RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}
