//! `tree-patch-node`: the generic data model and the builders that fill it.
//!
//! Every decoded document is a tree of [`Node`]s. Decoders never construct
//! nodes directly; they drive a [`NodeAssembler`], so the same event stream
//! can produce an untyped tree ([`NodeBuilder`]), a schema-checked tree
//! ([`SchemaBuilder`]) or a native Rust value ([`BoundBuilder`]).
//!
//! # Example
//!
//! ```
//! use tree_patch_node::{Node, NodeAssembler, Prototype};
//! use tree_patch_schema::parse_schema;
//!
//! let ts = parse_schema(r#"type Pair struct { left Int right Int (rename "r") }"#).unwrap();
//! let mut builder = Prototype::new(&ts, "Pair").unwrap().representation().new_builder();
//! builder.begin_map(Some(2)).unwrap();
//! builder.assemble_key("left").unwrap();
//! builder.assign_int(1).unwrap();
//! builder.assemble_key("r").unwrap();
//! builder.assign_int(2).unwrap();
//! builder.finish_map().unwrap();
//! let node = builder.build().unwrap();
//! assert_eq!(node.lookup("right"), Some(&Node::Int(2)));
//! ```

pub mod assembler;
pub mod bind;
pub mod builder;
pub mod error;
pub mod node;
pub mod representation;
pub mod schema_builder;

pub use assembler::{replay, NodeAssembler};
pub use bind::{bind, present, BoundBuilder};
pub use builder::NodeBuilder;
pub use error::{AssembleError, BindError};
pub use node::{Kind, Link, Node};
pub use representation::to_representation;
pub use schema_builder::{Prototype, SchemaBuilder, TypedNode, View};
