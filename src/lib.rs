//! SQLite-backed data-access object for product records.
//!
//! # Intention
//!
//! - Provide CRUD operations for the `product` table behind a small typed API.
//! - Encapsulate SQLite-specific logic, connection acquisition, and error handling.
//!
//! # Architectural Boundaries
//!
//! - Only persistence code belongs here.
//! - No business logic, caching, or pooling policy.

pub mod dao;
pub mod error;
pub mod product;
pub mod sqlite;

pub use dao::ProductDao;
pub use error::{DaoError, Result};
pub use product::Product;
pub use sqlite::{ConnectionProvider, Schema, SqliteConfig, SqliteConnectionManager};
