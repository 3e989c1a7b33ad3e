//! Column reference evaluators.

use std::sync::Arc;

use sqlfn_core::{
    BoxedFunction, ColumnType, Constant, Function, Record, RecordMetadata, ResolveError, Span,
    TypeTag, Value,
};

type Result<T> = std::result::Result<T, ResolveError>;

/// Reads one column of the current record.
#[derive(Debug, Clone)]
pub struct ColumnFunction {
    index: usize,
    column_type: ColumnType,
    label: String,
    symbol_table_static: bool,
}

impl ColumnFunction {
    pub fn new(index: usize, column_type: ColumnType, label: impl Into<String>) -> Self {
        Self {
            index,
            column_type,
            label: label.into(),
            symbol_table_static: false,
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    /// For symbol columns: whether the symbol table is fixed for the query.
    pub fn is_symbol_table_static(&self) -> bool {
        self.symbol_table_static
    }
}

impl Function for ColumnFunction {
    fn name(&self) -> &str {
        &self.label
    }

    fn column_type(&self) -> ColumnType {
        self.column_type
    }

    fn eval(&self, record: &dyn Record) -> Value {
        record.value(self.index)
    }
}

/// A column holding a nested record.
#[derive(Debug, Clone)]
pub struct RecordColumn {
    index: usize,
    label: String,
    metadata: Option<Arc<dyn RecordMetadata>>,
}

impl RecordColumn {
    pub fn index(&self) -> usize {
        self.index
    }

    /// Schema of the nested record, when the outer schema provides it.
    pub fn metadata(&self) -> Option<&Arc<dyn RecordMetadata>> {
        self.metadata.as_ref()
    }
}

impl Function for RecordColumn {
    fn name(&self) -> &str {
        &self.label
    }

    fn column_type(&self) -> ColumnType {
        ColumnType::RECORD
    }

    fn eval(&self, record: &dyn Record) -> Value {
        record.value(self.index)
    }
}

/// Resolve a column reference against the row schema.
pub fn create_column(
    position: Span,
    name: &str,
    metadata: &dyn RecordMetadata,
) -> Result<BoxedFunction> {
    let index = metadata
        .column_index(name)
        .ok_or_else(|| ResolveError::ColumnNotFound {
            name: name.to_string(),
            span: position,
        })?;
    let column_type = metadata.column_type(index);
    let label = metadata.column_name(index).unwrap_or(name);

    match column_type.tag() {
        TypeTag::Boolean
        | TypeTag::Byte
        | TypeTag::Short
        | TypeTag::Char
        | TypeTag::Int
        | TypeTag::Long
        | TypeTag::Float
        | TypeTag::Double
        | TypeTag::String
        | TypeTag::Varchar
        | TypeTag::Binary
        | TypeTag::Date
        | TypeTag::Timestamp
        | TypeTag::GeoByte
        | TypeTag::GeoShort
        | TypeTag::GeoInt
        | TypeTag::GeoLong
        | TypeTag::Long256
        | TypeTag::Long128
        | TypeTag::Uuid
        | TypeTag::IPv4
        | TypeTag::Interval
        | TypeTag::Array => Ok(Box::new(ColumnFunction::new(index, column_type, label))),
        TypeTag::Symbol => {
            let mut column = ColumnFunction::new(index, column_type, label);
            column.symbol_table_static = metadata.is_symbol_table_static(index);
            Ok(Box::new(column))
        }
        TypeTag::Record => Ok(Box::new(RecordColumn {
            index,
            label: label.to_string(),
            metadata: metadata.nested_metadata(index),
        })),
        TypeTag::Null => Ok(Box::new(Constant::untyped_null())),
        TypeTag::Undefined
        | TypeTag::Cursor
        | TypeTag::VarArg
        | TypeTag::GeoHash
        | TypeTag::ArrayString
        | TypeTag::RegClass
        | TypeTag::RegProcedure => Err(ResolveError::UnsupportedColumnType {
            column_type,
            span: position,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlfn_core::GenericRecordMetadata;

    fn schema() -> GenericRecordMetadata {
        let nested = GenericRecordMetadata::new().with_column("inner", ColumnType::INT);
        GenericRecordMetadata::new()
            .with_column("price", ColumnType::DOUBLE)
            .with_symbol("sym", true)
            .with_record("nested", Arc::new(nested))
            .with_column("nothing", ColumnType::NULL)
            .with_column("cur", ColumnType::CURSOR)
    }

    struct Row;

    impl Record for Row {
        fn value(&self, index: usize) -> Value {
            Value::Long(index as i64)
        }
    }

    #[test]
    fn lookup_is_case_insensitive() {
        let f = create_column(Span::point(0), "PRICE", &schema()).unwrap();
        assert_eq!(f.column_type(), ColumnType::DOUBLE);
        assert_eq!(f.name(), "price");
        assert_eq!(f.eval(&Row), Value::Long(0));
    }

    #[test]
    fn missing_column() {
        let err = create_column(Span::new(3, 4), "nope", &schema()).unwrap_err();
        assert_eq!(
            err,
            ResolveError::ColumnNotFound {
                name: "nope".to_string(),
                span: Span::new(3, 4),
            }
        );
    }

    #[test]
    fn symbol_columns_carry_static_flag() {
        let metadata = schema();
        let index = metadata.column_index("sym").unwrap();
        let mut column = ColumnFunction::new(index, ColumnType::SYMBOL, "sym");
        column.symbol_table_static = metadata.is_symbol_table_static(index);
        assert!(column.is_symbol_table_static());
        assert_eq!(
            create_column(Span::point(0), "sym", &metadata).unwrap().column_type(),
            ColumnType::SYMBOL
        );
    }

    #[test]
    fn record_and_null_columns() {
        let f = create_column(Span::point(0), "nested", &schema()).unwrap();
        assert_eq!(f.column_type(), ColumnType::RECORD);

        let f = create_column(Span::point(0), "nothing", &schema()).unwrap();
        assert!(f.as_constant().is_some());
    }

    #[test]
    fn unsupported_column_type() {
        let err = create_column(Span::point(2), "cur", &schema()).unwrap_err();
        assert!(matches!(
            err,
            ResolveError::UnsupportedColumnType { column_type, .. } if column_type == ColumnType::CURSOR
        ));
    }
}
