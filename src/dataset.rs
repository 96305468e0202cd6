//! In-memory tabular representation of the most recently ingested file.
//!
//! A [`DatasetTable`] is built in one shot by [`DatasetTable::load`]; a
//! partially built table is never observable. The derived `search_text`
//! column (configured columns joined by a single space) exists iff the table
//! was fully built, since the constructor either returns a whole table or an
//! error.

use std::path::Path;

use crate::error::{Error, Result};
use crate::models::{Value, CATEGORY_COLUMN};

#[derive(Debug)]
pub struct DatasetTable {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
    search_text: Vec<String>,
}

impl DatasetTable {
    /// Parse a CSV file into a table and derive the `search_text` column.
    ///
    /// Missing cells (short records, empty fields) are normalized to
    /// [`Value::Empty`] — no cell is ever left unset. Fails with
    /// [`Error::NoSearchColumns`] when the configured column list is empty
    /// and [`Error::MissingColumn`] naming the first configured column that
    /// is absent from the file's header.
    pub fn load(path: &Path, search_columns: &[String]) -> Result<DatasetTable> {
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_path(path)?;

        let columns: Vec<String> = reader
            .headers()?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();

        let mut rows: Vec<Vec<Value>> = Vec::new();
        for record in reader.records() {
            let record = record?;
            let mut row: Vec<Value> = Vec::with_capacity(columns.len());
            for i in 0..columns.len() {
                row.push(record.get(i).map(Value::parse).unwrap_or(Value::Empty));
            }
            rows.push(row);
        }

        if search_columns.is_empty() {
            return Err(Error::NoSearchColumns);
        }

        let mut search_indices: Vec<usize> = Vec::with_capacity(search_columns.len());
        for name in search_columns {
            let idx = columns
                .iter()
                .position(|c| c == name)
                .ok_or_else(|| Error::MissingColumn(name.clone()))?;
            search_indices.push(idx);
        }

        let search_text: Vec<String> = rows
            .iter()
            .map(|row| {
                search_indices
                    .iter()
                    .map(|&i| row[i].as_text())
                    .collect::<Vec<_>>()
                    .join(" ")
            })
            .collect();

        Ok(DatasetTable {
            columns,
            rows,
            search_text,
        })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// The derived searchable text, one entry per row, in row order.
    pub fn search_text(&self) -> &[String] {
        &self.search_text
    }

    /// Cell accessor; `None` only for out-of-range indices, never for
    /// missing data (that was normalized at load).
    pub fn cell(&self, row: usize, col: usize) -> Option<&Value> {
        self.rows.get(row).and_then(|r| r.get(col))
    }

    /// Distinct non-empty values of the fixed category column, in first-seen
    /// row order. Errors when the column itself is absent.
    pub fn categories(&self) -> Result<Vec<String>> {
        let idx = self
            .column_index(CATEGORY_COLUMN)
            .ok_or(Error::MissingCategoryColumn(CATEGORY_COLUMN))?;

        let mut seen: Vec<String> = Vec::new();
        for row in &self.rows {
            let value = &row[idx];
            if value.is_empty() {
                continue;
            }
            let text = value.as_text();
            if !seen.contains(&text) {
                seen.push(text);
            }
        }
        Ok(seen)
    }

    /// The row's original fields as a JSON object, for result assembly.
    pub fn row_object(&self, row: usize) -> serde_json::Map<String, serde_json::Value> {
        let mut object = serde_json::Map::with_capacity(self.columns.len());
        for (col, name) in self.columns.iter().enumerate() {
            object.insert(name.clone(), self.rows[row][col].to_json());
        }
        object
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn write_csv(content: &str) -> (TempDir, PathBuf) {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("data.csv");
        fs::write(&path, content).unwrap();
        (tmp, path)
    }

    fn cols(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn builds_search_text_from_configured_columns() {
        let (_tmp, path) = write_csv(
            "title,body,category\n\
             login fails,cannot sign in,Auth\n\
             billing issue,invoice wrong,Billing\n",
        );
        let table = DatasetTable::load(&path, &cols(&["title", "body"])).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.search_text()[0], "login fails cannot sign in");
        assert_eq!(table.search_text()[1], "billing issue invoice wrong");
    }

    #[test]
    fn normalizes_missing_cells_to_empty() {
        let (_tmp, path) = write_csv(
            "title,body,category\n\
             short row\n\
             has,,Auth\n",
        );
        let table = DatasetTable::load(&path, &cols(&["title", "body"])).unwrap();
        // Short record padded; empty field normalized. Both join as "".
        assert_eq!(table.search_text()[0], "short row ");
        assert_eq!(table.search_text()[1], "has ");
        assert_eq!(table.cell(0, 2), Some(&Value::Empty));
    }

    #[test]
    fn empty_search_columns_is_a_config_error() {
        let (_tmp, path) = write_csv("title,body\na,b\n");
        let err = DatasetTable::load(&path, &[]).unwrap_err();
        assert!(matches!(err, Error::NoSearchColumns));
    }

    #[test]
    fn missing_configured_column_is_named() {
        let (_tmp, path) = write_csv("title,body\na,b\n");
        let err = DatasetTable::load(&path, &cols(&["title", "summary"])).unwrap_err();
        match err {
            Error::MissingColumn(name) => assert_eq!(name, "summary"),
            other => panic!("expected MissingColumn, got {:?}", other),
        }
    }

    #[test]
    fn categories_in_first_seen_order_without_empties() {
        let (_tmp, path) = write_csv(
            "title,category\n\
             a,Billing\n\
             b,Auth\n\
             c,\n\
             d,Billing\n",
        );
        let table = DatasetTable::load(&path, &cols(&["title"])).unwrap();
        assert_eq!(table.categories().unwrap(), vec!["Billing", "Auth"]);
    }

    #[test]
    fn categories_without_category_column_is_a_schema_error() {
        let (_tmp, path) = write_csv("title,body\na,b\n");
        let table = DatasetTable::load(&path, &cols(&["title"])).unwrap();
        assert!(matches!(
            table.categories(),
            Err(Error::MissingCategoryColumn(_))
        ));
    }

    #[test]
    fn row_object_preserves_original_fields() {
        let (_tmp, path) = write_csv("title,count\nlogin fails,3\n");
        let table = DatasetTable::load(&path, &cols(&["title"])).unwrap();
        let object = table.row_object(0);
        assert_eq!(object["title"], serde_json::json!("login fails"));
        assert_eq!(object["count"], serde_json::json!(3.0));
    }
}
