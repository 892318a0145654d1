// src/summarise/mod.rs
pub mod delta;
pub mod proportion;
pub mod trend;

pub use delta::{curated_subset, subject_deltas, SubjectDelta};
pub use proportion::{proportion_bands, YearBands};
pub use trend::{yearly_totals, YearlyTotal};
