//! `tree-patch-schema`: named types and their wire representation strategies.
//!
//! A [`TypeSystem`] is a closed set of named [`TypeDef`]s. Each type has a
//! typed view ([`TypeHandle::kind`]) and a representation view
//! ([`TypeHandle::representation_kind`]); builders and codecs in the other
//! tree-patch crates choose which one they follow.
//!
//! # Example
//!
//! ```
//! use tree_patch_schema::{parse_schema, Kind};
//!
//! let ts = parse_schema(r#"
//!     type Beta union { | Gamma "gamma" } representation stringprefix ":"
//!     type Gamma string
//! "#).unwrap();
//! let beta = ts.type_by_name("Beta").unwrap();
//! assert_eq!(beta.kind(), Some(Kind::Map));
//! assert_eq!(beta.representation_kind(), Some(Kind::String));
//! ```

pub mod dsl;
pub mod error;
pub mod system;
pub mod types;

pub use dsl::parse_schema;
pub use error::SchemaError;
pub use system::{TypeHandle, TypeSystem};
pub use types::{
    EnumType, Kind, ListType, MapType, ScalarKind, StructField, StructRepr, StructType, TypeDef,
    UnionRepr, UnionType,
};
