//! Reshapes a government university-enrolment spreadsheet (merged-cell,
//! three-row header layout) into a tall table, filters it to a curated set of
//! humanities subjects, and renders three summary charts.

pub mod chart;
pub mod clean;
pub mod config;
pub mod load;
pub mod shape;
pub mod summarise;
