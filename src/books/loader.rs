//! Dataset Loader
//! Mission: Build the startup book table from the catalogue CSV
//!
//! Cleaning applied on the way in:
//! - unused catalogue columns are dropped
//! - `Date of Publication` keeps its leading four-digit year, or 0
//! - spaces in column names become underscores
//! - empty cells become null

use crate::books::{
    schema::{Book, Field, FieldKind, Value},
    store::{BookStore, StoreError},
};
use anyhow::{bail, Context, Result};
use std::path::Path;
use tracing::{debug, info, warn};

/// Columns present in the catalogue export that the service never serves
pub const DROPPED_COLUMNS: [&str; 8] = [
    "Edition Statement",
    "Corporate Author",
    "Corporate Contributors",
    "Former owner",
    "Engraver",
    "Contributors",
    "Issuance type",
    "Shelfmarks",
];

/// Result of parsing a catalogue file
#[derive(Debug, Default)]
pub struct LoadReport {
    pub books: Vec<Book>,
    pub skipped_rows: usize,
}

/// Read `path` and return a populated store
pub fn load_store(path: &Path) -> Result<BookStore> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read book dataset {}", path.display()))?;

    let report = parse_books(&content)
        .with_context(|| format!("Failed to parse book dataset {}", path.display()))?;

    let store = BookStore::new();
    let mut duplicates = 0usize;
    for book in report.books {
        match store.insert(book) {
            Ok(()) => {}
            Err(StoreError::Conflict(id)) => {
                warn!("Duplicate Identifier {} in dataset, keeping first row", id);
                duplicates += 1;
            }
            Err(e) => return Err(e.into()),
        }
    }

    info!(
        "📚 Loaded {} books from {} ({} rows skipped, {} duplicates)",
        store.len(),
        path.display(),
        report.skipped_rows,
        duplicates
    );

    Ok(store)
}

/// Parse catalogue CSV text into typed book records
pub fn parse_books(content: &str) -> Result<LoadReport> {
    let mut rows = parse_csv(content).into_iter();
    let header = match rows.next() {
        Some(header) => header,
        None => bail!("Dataset is empty"),
    };

    let columns: Vec<Option<Field>> = header.iter().map(|name| map_column(name)).collect();
    let id_column = columns
        .iter()
        .position(|c| *c == Some(Field::Identifier))
        .context("Dataset has no Identifier column")?;

    let mut report = LoadReport::default();
    for (record, row) in rows.enumerate() {
        if row.iter().all(|cell| cell.trim().is_empty()) {
            continue;
        }

        let raw_id = row.get(id_column).map(|s| s.trim()).unwrap_or("");
        let id = match raw_id.parse::<i64>() {
            Ok(id) => id,
            Err(_) => {
                warn!("Skipping record {}: invalid Identifier {:?}", record + 1, raw_id);
                report.skipped_rows += 1;
                continue;
            }
        };

        let mut book = Book::new(id);
        for (cell, field) in row.iter().zip(&columns) {
            if let Some(field) = field {
                book.set(*field, clean_cell(*field, cell));
            }
        }
        report.books.push(book);
    }

    Ok(report)
}

fn map_column(name: &str) -> Option<Field> {
    let name = name.trim();
    if DROPPED_COLUMNS.contains(&name) {
        return None;
    }

    let field = Field::from_name(&name.replace(' ', "_"));
    if field.is_none() {
        debug!("Ignoring unknown column {:?}", name);
    }
    field
}

fn clean_cell(field: Field, cell: &str) -> Value {
    if field == Field::DateOfPublication {
        return Value::Integer(leading_year(cell));
    }

    let trimmed = cell.trim();
    if trimmed.is_empty() {
        return Value::Null;
    }

    match field.kind() {
        FieldKind::Text => Value::Text(cell.to_string()),
        FieldKind::Integer => trimmed.parse().map(Value::Integer).unwrap_or(Value::Null),
    }
}

/// Four-digit year at the start of a catalogue date such as `1879 [1878]`, else 0
fn leading_year(raw: &str) -> i64 {
    let prefix = raw.get(..4).unwrap_or("");
    if prefix.len() == 4 && prefix.bytes().all(|b| b.is_ascii_digit()) {
        prefix.parse().unwrap_or(0)
    } else {
        0
    }
}

/// Split CSV text into rows of cells.
///
/// Handles quoted cells containing commas, line breaks and doubled quotes.
fn parse_csv(content: &str) -> Vec<Vec<String>> {
    let mut rows = Vec::new();
    let mut row = Vec::new();
    let mut cell = String::new();
    let mut in_quotes = false;
    let mut chars = content.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            match c {
                '"' if chars.peek() == Some(&'"') => {
                    cell.push('"');
                    chars.next();
                }
                '"' => in_quotes = false,
                _ => cell.push(c),
            }
            continue;
        }

        match c {
            '"' => in_quotes = true,
            ',' => row.push(std::mem::take(&mut cell)),
            '\r' => {}
            '\n' => {
                row.push(std::mem::take(&mut cell));
                rows.push(std::mem::take(&mut row));
            }
            _ => cell.push(c),
        }
    }

    if !cell.is_empty() || !row.is_empty() {
        row.push(cell);
        rows.push(row);
    }

    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const SAMPLE: &str = "\
Identifier,Edition Statement,Place of Publication,Date of Publication,Publisher,Title,Author,Contributors,Corporate Author,Corporate Contributors,Former owner,Engraver,Issuance type,Flickr URL,Shelfmarks
206,,London,1879 [1878],S. Tinsley & Co.,Walter Forbes. [A novel.] By A. A,A. A.,\"FORBES, Walter.\",,,,,monographic,http://www.flickr.com/photos/britishlibrary/tags/sysnum000000206,British Library HMNTS 12641.b.30.
216,,London; Virtue & Yorston,1868,Virtue & Co.,\"All for Greed. [A novel. The dedication signed: A. A. A., i.e. Marie Pauline Rose, Baroness Blaze de Bury.]\",\"A., A. A.\",\"BLAZE DE BURY, Marie Pauline Rose - Baroness\",,,,,monographic,http://www.flickr.com/photos/britishlibrary/tags/sysnum000000216,British Library HMNTS 9007.d.28.
218,,London,1869,\"Bradbury, Evans & Co.\",\"Love the Avenger. By the author of \"\"All for Greed.\"\"\",\"A., A. A.\",,,,,,monographic,,British Library HMNTS 9008.a.39.
472,,London,,,Welsh Sketches,,,,,,,monographic,,
";

    #[test]
    fn test_parse_books_cleans_columns() {
        let report = parse_books(SAMPLE).unwrap();
        assert_eq!(report.skipped_rows, 0);
        assert_eq!(report.books.len(), 4);

        let first = serde_json::to_value(&report.books[0]).unwrap();
        assert_eq!(
            first,
            json!({
                "Flickr_URL": "http://www.flickr.com/photos/britishlibrary/tags/sysnum000000206",
                "Publisher": "S. Tinsley & Co.",
                "Author": "A. A.",
                "Title": "Walter Forbes. [A novel.] By A. A",
                "Date_of_Publication": 1879,
                "Identifier": 206,
                "Place_of_Publication": "London"
            })
        );
    }

    #[test]
    fn test_parse_books_handles_quotes() {
        let report = parse_books(SAMPLE).unwrap();

        let greed = &report.books[1];
        assert_eq!(
            greed.get(Field::Title),
            Some(&Value::Text(
                "All for Greed. [A novel. The dedication signed: A. A. A., i.e. Marie Pauline Rose, Baroness Blaze de Bury.]".to_string()
            ))
        );

        let avenger = &report.books[2];
        assert_eq!(
            avenger.get(Field::Title),
            Some(&Value::Text(
                "Love the Avenger. By the author of \"All for Greed.\"".to_string()
            ))
        );
        assert_eq!(
            avenger.get(Field::Publisher),
            Some(&Value::Text("Bradbury, Evans & Co.".to_string()))
        );
    }

    #[test]
    fn test_empty_cells_become_null_and_missing_year_zero() {
        let report = parse_books(SAMPLE).unwrap();
        let sketches = &report.books[3];

        assert_eq!(sketches.get(Field::Author), Some(&Value::Null));
        assert_eq!(sketches.get(Field::FlickrUrl), Some(&Value::Null));
        assert_eq!(sketches.get(Field::DateOfPublication), Some(&Value::Integer(0)));
    }

    #[test]
    fn test_rows_with_bad_identifier_skipped() {
        let csv = "Identifier,Title\n1,One\nabc,Bad\n,Blank id\n2,Two\n";
        let report = parse_books(csv).unwrap();

        assert_eq!(report.skipped_rows, 2);
        let ids: Vec<i64> = report.books.iter().map(Book::id).collect();
        assert_eq!(ids, vec![1, 2]);
    }

    #[test]
    fn test_quoted_line_break_stays_in_cell() {
        let csv = "Identifier,Title\r\n1,\"Two\nLines\"\r\n2,Plain\r\n";
        let report = parse_books(csv).unwrap();

        assert_eq!(report.books.len(), 2);
        assert_eq!(
            report.books[0].get(Field::Title),
            Some(&Value::Text("Two\nLines".to_string()))
        );
    }

    #[test]
    fn test_missing_identifier_column_is_error() {
        assert!(parse_books("Title,Author\nX,Y\n").is_err());
        assert!(parse_books("").is_err());
    }

    #[test]
    fn test_leading_year() {
        assert_eq!(leading_year("1879 [1878]"), 1879);
        assert_eq!(leading_year("1868"), 1868);
        assert_eq!(leading_year("[1850?]"), 0);
        assert_eq!(leading_year("18"), 0);
        assert_eq!(leading_year(""), 0);
    }

    #[test]
    fn test_load_store_keeps_first_duplicate() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "Identifier,Title\n7,First\n7,Second\n8,Other\n").unwrap();

        let store = load_store(file.path()).unwrap();
        assert_eq!(store.len(), 2);
        assert_eq!(
            store.get(7).unwrap().get(Field::Title),
            Some(&Value::Text("First".to_string()))
        );
    }

    #[test]
    fn test_load_store_missing_file() {
        let err = load_store(Path::new("/nonexistent/Books.csv")).unwrap_err();
        assert!(err.to_string().contains("Failed to read book dataset"));
    }
}
