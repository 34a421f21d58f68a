//! Persistence services. Each takes an explicit connection handle in its
//! constructor; anything implementing `ConnectionTrait` works, including an
//! open transaction.

mod opinion;
mod poi;

use common::ValidationErrors;
use sea_orm::DbErr;

pub use opinion::{OpinionStore, StoredOpinion};
pub use poi::{NewPoi, PoiDeletion, PoiLifecycle, PoiPatch, PoiView};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Malformed or out-of-range input. Correctable by the caller.
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationErrors),

    /// A uniqueness rule rejected the write.
    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    NotFound(String),

    /// I/O or transaction failure. Not retried.
    #[error("storage error: {0}")]
    Storage(#[from] DbErr),
}
