use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SchemaError {
    #[error("syntax error on line {line}: {message}")]
    Syntax { line: usize, message: String },
    #[error("type {0} declared more than once")]
    DuplicateType(String),
    #[error("type {referenced_by} refers to undeclared type {name}")]
    UnknownType { referenced_by: String, name: String },
    #[error("map type {type_name} has non-string key type {key_type}")]
    InvalidKeyType { type_name: String, key_type: String },
    #[error("type {type_name} uses wire name {wire:?} more than once")]
    DuplicateWireName { type_name: String, wire: String },
    #[error("union {type_name}: {message}")]
    InvalidUnion { type_name: String, message: String },
}
