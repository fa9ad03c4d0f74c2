//! CellBase Common Library
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Genomic value types, logging and error handling shared by the CellBase
//! workspace members.
//!
//! # Overview
//!
//! - **Types**: [`Region`](types::Region), [`VariantSpec`](types::VariantSpec)
//!   and [`LogicalList`](types::LogicalList), the values queries are built from
//! - **Logging**: tracing subscriber setup driven by environment variables
//! - **Errors**: [`CommonError`] raised when textual input cannot be parsed
//!
//! # Example
//!
//! ```
//! use cellbase_common::types::{LogicalList, Region};
//!
//! let region: Region = "17:43044295-43125483".parse().unwrap();
//! assert_eq!(region.chromosome, "17");
//!
//! let biotypes = LogicalList::parse("protein_coding,lncRNA").unwrap();
//! assert!(!biotypes.is_and());
//! ```

pub mod error;
pub mod logging;
pub mod types;

// Re-export commonly used types
pub use error::{CommonError, Result};
pub use types::{ConfidenceInterval, Logic, LogicalList, Region, VariantSpec, VariantType};
