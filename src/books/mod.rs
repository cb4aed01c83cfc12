//! Book catalogue: declared schema, in-memory store and CSV dataset loading.

pub mod loader;
pub mod schema;
pub mod store;

pub use loader::load_store;
pub use schema::{Book, Field, FieldKind, FieldViolation, RawRecord, Value};
pub use store::{BookStore, StoreError};
