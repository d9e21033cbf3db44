//! Shared data types for the courier desk.
//!
//! Every other crate speaks in these terms: a scalar [`Value`], the generic
//! tabular [`QueryResult`], the closed [`TableName`] allow-list, the semantic
//! [`FieldType`] used by forms and report parameters, and the bound
//! [`Statement`] handed to the database gateway.

pub mod enums;
pub mod error;
pub mod result;
pub mod statement;
pub mod value;

// Re-export the core types to provide a clean public API.
pub use enums::{FieldType, TableName};
pub use error::CoreError;
pub use result::QueryResult;
pub use statement::{InsertStatement, Statement};
pub use value::Value;
