//! # Courier Desk Database Crate
//!
//! The database gateway: everything that talks to PostgreSQL lives here.
//!
//! ## Architectural Principles
//!
//! - **One session per action:** [`connect`] opens a single dedicated
//!   connection. Callers open one per user action and drop it afterwards;
//!   nothing here pools or shares a connection between concurrent callers.
//! - **Bound parameters only:** statements arrive as SQL text plus
//!   [`core_types::Value`] parameters, and values are always bound.
//! - **Generic results:** rows are decoded column by column into a
//!   [`core_types::QueryResult`] whose shape comes from the statement.
//!
//! ## Public API
//!
//! - `Credentials` / `connect`: establish a `PgSession`.
//! - `Gateway`: the seam the catalog, table browser and form engine are
//!   written against. `PgSession` is the real implementation and
//!   `MemoryGateway` an in-memory one that records statements.
//! - `DbError`: connection, query and timeout failures.

// Declare the modules that constitute this crate.
pub mod connection;
pub mod error;
pub mod gateway;
pub mod memory;
pub mod session;

// Re-export the key components to create a clean, public-facing API.
pub use connection::{Credentials, connect};
pub use error::DbError;
pub use gateway::Gateway;
pub use memory::MemoryGateway;
pub use session::PgSession;
