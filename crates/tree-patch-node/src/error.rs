use std::fmt::Display;

use thiserror::Error;

use crate::node::Kind;

/// Failures raised while driving an assembler.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum AssembleError {
    #[error("{type_name}: expected {expected}, found {actual}")]
    WrongKind {
        type_name: String,
        expected: Kind,
        actual: Kind,
    },
    #[error("{type_name}: missing required field {field:?}")]
    MissingField { type_name: String, field: String },
    #[error("{type_name}: unknown field {field:?}")]
    UnknownField { type_name: String, field: String },
    #[error("duplicate key {key:?}")]
    DuplicateKey { key: String },
    #[error("{type_name}: {value:?} is not a member")]
    InvalidEnumMember { type_name: String, value: String },
    #[error("{type_name}: unknown discriminant {value:?}")]
    UnknownDiscriminant { type_name: String, value: String },
    #[error("{type_name}: union must have exactly one entry, found {count}")]
    UnionArity { type_name: String, count: usize },
    #[error("{type_name}: cannot assign through the {strategy} representation: {reason}")]
    UnsupportedAssignment {
        type_name: String,
        strategy: &'static str,
        reason: String,
    },
    #[error("unknown type {0}")]
    UnknownType(String),
    #[error("invalid assembler call: {0}")]
    InvalidState(&'static str),
    #[error("assembly is incomplete")]
    Incomplete,
    #[error("bind: {0}")]
    Bind(String),
}

/// Error type for projecting nodes onto native types through serde.
#[derive(Debug, Error, Clone, PartialEq)]
#[error("{0}")]
pub struct BindError(String);

impl serde::de::Error for BindError {
    fn custom<T: Display>(msg: T) -> Self {
        BindError(msg.to_string())
    }
}

impl From<BindError> for AssembleError {
    fn from(e: BindError) -> Self {
        AssembleError::Bind(e.0)
    }
}
