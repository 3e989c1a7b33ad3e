//! Row schema consulted when resolving column references.

use std::fmt;
use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::column_type::ColumnType;

/// Column name to index to type lookup for one row shape.
pub trait RecordMetadata: fmt::Debug + Send + Sync {
    fn column_count(&self) -> usize;

    /// Case-insensitive lookup of a column by name.
    fn column_index(&self, name: &str) -> Option<usize>;

    fn column_name(&self, index: usize) -> Option<&str>;

    /// Type of column `index`, [`ColumnType::UNDEFINED`] when out of range.
    fn column_type(&self, index: usize) -> ColumnType;

    /// Whether a symbol column's dictionary is fixed for the query.
    fn is_symbol_table_static(&self, index: usize) -> bool {
        let _ = index;
        false
    }

    /// Schema of a record-typed column.
    fn nested_metadata(&self, index: usize) -> Option<Arc<dyn RecordMetadata>> {
        let _ = index;
        None
    }
}

#[derive(Debug, Clone)]
struct ColumnMetadata {
    name: String,
    column_type: ColumnType,
    symbol_table_static: bool,
    nested: Option<Arc<dyn RecordMetadata>>,
}

/// A list-backed [`RecordMetadata`].
#[derive(Debug, Clone, Default)]
pub struct GenericRecordMetadata {
    columns: Vec<ColumnMetadata>,
    /// Lower-cased name to column index.
    by_name: FxHashMap<String, usize>,
}

impl GenericRecordMetadata {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a column. A duplicate name shadows nothing; the first wins.
    pub fn add_column(&mut self, name: &str, column_type: ColumnType) -> usize {
        self.push(ColumnMetadata {
            name: name.to_string(),
            column_type,
            symbol_table_static: false,
            nested: None,
        })
    }

    pub fn add_symbol(&mut self, name: &str, static_table: bool) -> usize {
        self.push(ColumnMetadata {
            name: name.to_string(),
            column_type: ColumnType::SYMBOL,
            symbol_table_static: static_table,
            nested: None,
        })
    }

    pub fn add_record(&mut self, name: &str, nested: Arc<dyn RecordMetadata>) -> usize {
        self.push(ColumnMetadata {
            name: name.to_string(),
            column_type: ColumnType::RECORD,
            symbol_table_static: false,
            nested: Some(nested),
        })
    }

    pub fn with_column(mut self, name: &str, column_type: ColumnType) -> Self {
        self.add_column(name, column_type);
        self
    }

    pub fn with_symbol(mut self, name: &str, static_table: bool) -> Self {
        self.add_symbol(name, static_table);
        self
    }

    pub fn with_record(mut self, name: &str, nested: Arc<dyn RecordMetadata>) -> Self {
        self.add_record(name, nested);
        self
    }

    fn push(&mut self, column: ColumnMetadata) -> usize {
        let index = self.columns.len();
        self.by_name
            .entry(column.name.to_ascii_lowercase())
            .or_insert(index);
        self.columns.push(column);
        index
    }
}

impl RecordMetadata for GenericRecordMetadata {
    fn column_count(&self) -> usize {
        self.columns.len()
    }

    fn column_index(&self, name: &str) -> Option<usize> {
        self.by_name.get(&name.to_ascii_lowercase()).copied()
    }

    fn column_name(&self, index: usize) -> Option<&str> {
        self.columns.get(index).map(|c| c.name.as_str())
    }

    fn column_type(&self, index: usize) -> ColumnType {
        self.columns
            .get(index)
            .map_or(ColumnType::UNDEFINED, |c| c.column_type)
    }

    fn is_symbol_table_static(&self, index: usize) -> bool {
        self.columns
            .get(index)
            .is_some_and(|c| c.symbol_table_static)
    }

    fn nested_metadata(&self, index: usize) -> Option<Arc<dyn RecordMetadata>> {
        self.columns.get(index).and_then(|c| c.nested.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_is_case_insensitive() {
        let metadata = GenericRecordMetadata::new()
            .with_column("Price", ColumnType::DOUBLE)
            .with_symbol("sym", true);
        assert_eq!(metadata.column_index("price"), Some(0));
        assert_eq!(metadata.column_index("SYM"), Some(1));
        assert_eq!(metadata.column_index("missing"), None);
        assert_eq!(metadata.column_type(1), ColumnType::SYMBOL);
        assert!(metadata.is_symbol_table_static(1));
        assert_eq!(metadata.column_type(7), ColumnType::UNDEFINED);
    }

    #[test]
    fn first_duplicate_wins() {
        let metadata = GenericRecordMetadata::new()
            .with_column("a", ColumnType::INT)
            .with_column("A", ColumnType::LONG);
        assert_eq!(metadata.column_index("a"), Some(0));
        assert_eq!(metadata.column_count(), 2);
    }

    #[test]
    fn record_columns_expose_nested_schema() {
        let inner: Arc<dyn RecordMetadata> =
            Arc::new(GenericRecordMetadata::new().with_column("x", ColumnType::INT));
        let metadata = GenericRecordMetadata::new().with_record("r", inner);
        let nested = metadata.nested_metadata(0).unwrap();
        assert_eq!(nested.column_index("x"), Some(0));
    }
}
