//! tabrec — declarative typed-record containers with tabular flattening.
//!
//! Schemas declare ordered, metadata-carrying fields (default value,
//! description, physical unit); instances materialize independent defaults
//! per slot; nested records and keyed collections of sub-records convert
//! into flat, deterministically-named column mappings for table writers.

pub use tabrec_core::{container, dict, error, field, map, schema, value};

pub use tabrec_core::error::Error;

pub mod prelude {
    pub use tabrec_core::prelude::*;
}
