#![forbid(unsafe_code)]

//! Loading and writing relations as delimited text.

/// CSV import of the three input relations and export of recommendations.
pub mod import_export;
