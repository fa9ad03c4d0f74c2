//! Genomic value types used to build queries

mod logical_list;
mod region;
mod variant;

pub use logical_list::{Logic, LogicalList};
pub use region::Region;
pub use variant::{ConfidenceInterval, VariantSpec, VariantType};
