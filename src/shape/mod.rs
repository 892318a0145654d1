// src/shape/mod.rs
pub mod headers;
pub mod unpivot;

pub use headers::{composite_names, forward_fill};
pub use unpivot::{pivot, unpivot, TallRecord, WideTable};
