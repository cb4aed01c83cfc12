//! Book Store
//! Mission: Keep the book table in memory, indexed by Identifier, with all-or-nothing mutations

use crate::books::schema::{parse_fields, Book, Field, FieldViolation, RawRecord};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::fmt;
use tracing::debug;

/// Store operation failure
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    NotFound(i64),
    Conflict(i64),
    MissingKey,
    InvalidField(FieldViolation),
    InvalidArgument(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::NotFound(id) => write!(f, "Book {} doesn't exist", id),
            StoreError::Conflict(id) => {
                write!(f, "Identifier {} already exists in book dataset", id)
            }
            StoreError::MissingKey => write!(f, "Missing Identifier"),
            StoreError::InvalidField(violation) => write!(f, "{}", violation),
            StoreError::InvalidArgument(name) => {
                write!(f, "Cannot order by unknown field '{}'", name)
            }
        }
    }
}

impl std::error::Error for StoreError {}

impl From<FieldViolation> for StoreError {
    fn from(violation: FieldViolation) -> Self {
        StoreError::InvalidField(violation)
    }
}

/// Rows plus their insertion order
#[derive(Debug, Default)]
struct BookTable {
    order: Vec<i64>,
    rows: HashMap<i64, Book>,
}

impl BookTable {
    fn insert(&mut self, book: Book) {
        self.order.push(book.id());
        self.rows.insert(book.id(), book);
    }
}

/// In-memory book table.
///
/// One lock guards the whole table. Reads share it; every mutation validates
/// and applies under the write guard, so readers never see half a change.
#[derive(Debug, Default)]
pub struct BookStore {
    table: RwLock<BookTable>,
}

impl BookStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.table.read().rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Insert an already-typed record (dataset loading)
    pub fn insert(&self, book: Book) -> Result<(), StoreError> {
        let mut table = self.table.write();
        if table.rows.contains_key(&book.id()) {
            return Err(StoreError::Conflict(book.id()));
        }
        table.insert(book);
        Ok(())
    }

    /// All records in insertion order, or sorted by `order` when given.
    ///
    /// Sorting is stable, so equal values keep insertion order.
    pub fn list(&self, order: Option<&str>, ascending: bool) -> Result<Vec<Book>, StoreError> {
        let field = order
            .map(|name| {
                Field::from_name(name).ok_or_else(|| StoreError::InvalidArgument(name.to_string()))
            })
            .transpose()?;

        let mut books: Vec<Book> = {
            let table = self.table.read();
            table
                .order
                .iter()
                .filter_map(|id| table.rows.get(id))
                .cloned()
                .collect()
        };

        if let Some(field) = field {
            books.sort_by(|a, b| a.compare_by(b, field, ascending));
        }

        Ok(books)
    }

    pub fn get(&self, id: i64) -> Result<Book, StoreError> {
        self.table
            .read()
            .rows
            .get(&id)
            .cloned()
            .ok_or(StoreError::NotFound(id))
    }

    /// Create a record from untyped input and return its identifier
    pub fn create(&self, raw: &RawRecord) -> Result<i64, StoreError> {
        let id = match raw.get(Field::Identifier.name()) {
            None | Some(serde_json::Value::Null) => return Err(StoreError::MissingKey),
            Some(value) => value
                .as_i64()
                .ok_or(FieldViolation::WrongType(Field::Identifier))?,
        };

        let mut table = self.table.write();
        if table.rows.contains_key(&id) {
            return Err(StoreError::Conflict(id));
        }

        let mut book = Book::new(id);
        for (field, value) in parse_fields(id, raw)? {
            book.set(field, value);
        }

        debug!("Inserting book {} ({} fields)", id, raw.len());
        table.insert(book);
        Ok(id)
    }

    /// Merge the given fields into record `id`, leaving the others untouched
    pub fn update(&self, id: i64, raw: &RawRecord) -> Result<Book, StoreError> {
        let mut table = self.table.write();
        let book = table.rows.get_mut(&id).ok_or(StoreError::NotFound(id))?;

        let changes = parse_fields(id, raw)?;
        for (field, value) in changes {
            book.set(field, value);
        }

        Ok(book.clone())
    }

    /// Remove record `id` and return it
    pub fn delete(&self, id: i64) -> Result<Book, StoreError> {
        let mut table = self.table.write();
        let book = table.rows.remove(&id).ok_or(StoreError::NotFound(id))?;
        table.order.retain(|existing| *existing != id);
        Ok(book)
    }
}
