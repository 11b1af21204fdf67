//! Core runtime for tabrec: field descriptors, container schemas, record
//! instances, named collections, and the dict/flatten converter exported
//! via the `prelude`.
#![warn(unreachable_pub)]

mod macros;

// public exports are one module level down
pub mod container;
pub mod dict;
pub mod error;
pub mod field;
pub mod map;
pub mod schema;
pub mod value;

///
/// Prelude
///
/// Prelude contains only domain vocabulary.
/// No errors or conversion internals are re-exported here.
///

pub mod prelude {
    pub use crate::{
        container::Container,
        dict::{Column, Dict, DictOptions, DictValue},
        field::{Field, Unit},
        map::{Map, MapKey},
        schema::Schema,
        value::Value,
    };
}
