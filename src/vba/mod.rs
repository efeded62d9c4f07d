//! VBA macro heuristics

mod sources;

pub use sources::{extract_data_sources, extract_from_all};
