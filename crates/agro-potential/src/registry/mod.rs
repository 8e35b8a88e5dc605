//! Revenda and vendedor registry with per-territory analyses.
//!
//! Records are kept behind [`RecordStore`] so the HTTP service can run on the
//! in-memory store while tests swap in failing backends. Listings only show
//! active records; deleting a record flips `ativo` instead of removing it.

pub mod domain;
pub mod repository;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use domain::{
    NewRevenda, NewVendedor, Revenda, RevendaUpdate, Territory, TerritoryId, TerritoryKind,
    TerritoryView, ValidationError, Vendedor, VendedorUpdate, DEFAULT_REVENDA_COLOR,
    DEFAULT_VENDEDOR_COLOR,
};
pub use repository::{RecordStore, RepositoryError};
pub use router::{territory_router, SelectionRequest, SheetQuery};
pub use service::{TerritoryService, TerritoryServiceError};
