//! Potential scoring and commercial analytics for agri-retail territories.
//!
//! Datasets are read-only category → municipality mappings supplied by a
//! [`datasets::DatasetProvider`]; the [`analysis`] module turns a set of IBGE
//! municipality codes into scores, recommendations and spreadsheet-ready
//! summaries.

pub mod analysis;
pub mod config;
pub mod datasets;
pub mod error;
pub mod export;
pub mod registry;
pub mod telemetry;

mod format;
