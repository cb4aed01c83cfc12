//! Book Schema
//! Mission: Enumerate the declared book fields and validate untyped input against them

use serde::{ser::SerializeMap, Serialize, Serializer};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;

/// Declared book fields, in column order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    FlickrUrl,
    Publisher,
    Author,
    Title,
    DateOfPublication,
    Identifier,
    PlaceOfPublication,
}

/// Value type a field accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Integer,
}

impl Field {
    pub const ALL: [Field; 7] = [
        Field::FlickrUrl,
        Field::Publisher,
        Field::Author,
        Field::Title,
        Field::DateOfPublication,
        Field::Identifier,
        Field::PlaceOfPublication,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Field::FlickrUrl => "Flickr_URL",
            Field::Publisher => "Publisher",
            Field::Author => "Author",
            Field::Title => "Title",
            Field::DateOfPublication => "Date_of_Publication",
            Field::Identifier => "Identifier",
            Field::PlaceOfPublication => "Place_of_Publication",
        }
    }

    /// Exact, case-sensitive lookup by wire name
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.name() == name)
    }

    pub fn kind(self) -> FieldKind {
        match self {
            Field::DateOfPublication | Field::Identifier => FieldKind::Integer,
            _ => FieldKind::Text,
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Scalar field value
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Text(String),
    Integer(i64),
    Null,
}

impl Value {
    /// Ordering between two present values. Integers sort before text.
    fn compare(&self, other: &Value) -> Ordering {
        match (self, other) {
            (Value::Integer(a), Value::Integer(b)) => a.cmp(b),
            (Value::Text(a), Value::Text(b)) => a.cmp(b),
            (Value::Integer(_), _) => Ordering::Less,
            (_, Value::Integer(_)) => Ordering::Greater,
            _ => Ordering::Equal,
        }
    }
}

/// Why a field in a request was refused
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldViolation {
    Unknown(String),
    IdentifierChanged,
    WrongType(Field),
}

impl fmt::Display for FieldViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldViolation::Unknown(name) => write!(f, "{} is invalid", name),
            FieldViolation::IdentifierChanged => write!(f, "Identifier cannot be changed"),
            FieldViolation::WrongType(field) => match field.kind() {
                FieldKind::Text => write!(f, "{} must be a string", field),
                FieldKind::Integer => write!(f, "{} must be an integer", field),
            },
        }
    }
}

/// Convert a JSON value into the declared type of `field`
pub fn parse_value(field: Field, raw: &serde_json::Value) -> Result<Value, FieldViolation> {
    match (field.kind(), raw) {
        (_, serde_json::Value::Null) => Ok(Value::Null),
        (FieldKind::Text, serde_json::Value::String(s)) => Ok(Value::Text(s.clone())),
        (FieldKind::Integer, serde_json::Value::Number(n)) => n
            .as_i64()
            .map(Value::Integer)
            .ok_or(FieldViolation::WrongType(field)),
        _ => Err(FieldViolation::WrongType(field)),
    }
}

/// Untyped request body: field name to JSON value
pub type RawRecord = serde_json::Map<String, serde_json::Value>;

/// Validate every entry of `raw` and return the typed changes, leaving out `Identifier`.
///
/// `Identifier` may only appear with the value `id`.
pub fn parse_fields(id: i64, raw: &RawRecord) -> Result<Vec<(Field, Value)>, FieldViolation> {
    let mut changes = Vec::with_capacity(raw.len());

    for (name, json) in raw {
        let field =
            Field::from_name(name).ok_or_else(|| FieldViolation::Unknown(name.clone()))?;
        let value = parse_value(field, json)?;

        if field == Field::Identifier {
            if value != Value::Integer(id) {
                return Err(FieldViolation::IdentifierChanged);
            }
            continue;
        }

        changes.push((field, value));
    }

    Ok(changes)
}

/// A book record. Always carries its `Identifier`; other fields only when supplied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Book {
    id: i64,
    values: BTreeMap<Field, Value>,
}

impl Book {
    pub fn new(id: i64) -> Self {
        let mut values = BTreeMap::new();
        values.insert(Field::Identifier, Value::Integer(id));
        Self { id, values }
    }

    pub fn id(&self) -> i64 {
        self.id
    }

    /// Builder-style setter; `Identifier` is fixed at construction and ignored here
    pub fn with(mut self, field: Field, value: Value) -> Self {
        self.set(field, value);
        self
    }

    pub(crate) fn set(&mut self, field: Field, value: Value) {
        if field != Field::Identifier {
            self.values.insert(field, value);
        }
    }

    pub fn get(&self, field: Field) -> Option<&Value> {
        self.values.get(&field)
    }

    fn present(&self, field: Field) -> Option<&Value> {
        self.get(field).filter(|v| **v != Value::Null)
    }

    pub fn fields(&self) -> impl Iterator<Item = (Field, &Value)> {
        self.values.iter().map(|(f, v)| (*f, v))
    }

    /// Sort comparator on `field`. Missing and null values sort last in either direction.
    pub(crate) fn compare_by(&self, other: &Book, field: Field, ascending: bool) -> Ordering {
        match (self.present(field), other.present(field)) {
            (Some(a), Some(b)) => {
                let ord = a.compare(b);
                if ascending {
                    ord
                } else {
                    ord.reverse()
                }
            }
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        }
    }
}

impl Serialize for Book {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.values.len()))?;
        for (field, value) in &self.values {
            map.serialize_entry(field.name(), value)?;
        }
        map.end()
    }
}
