//! rxportal local database layer.
//!
//! Provides SQLite connection management and schema migrations for the
//! offline bookmark store.
//!
//! # Usage
//!
//! ```no_run
//! use rxportal::database::Database;
//!
//! // Open a persistent database
//! let db = Database::open("rxportal.db").expect("failed to open database");
//!
//! // Or use an in-memory database for testing
//! let db = Database::open_in_memory().expect("failed to open in-memory database");
//!
//! let conn = db.connection();
//! ```

pub mod connection;
pub mod migrations;

pub use connection::Database;
