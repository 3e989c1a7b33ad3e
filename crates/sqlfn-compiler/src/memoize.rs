//! Per-row result caching.
//!
//! A [`Memoizer`] evaluates its inner evaluator at most once per row,
//! keyed by [`Record::row_id`]. Rows without an id (-1) are never cached.

use std::cell::RefCell;

use sqlfn_core::{
    BoxedFunction, ColumnType, Function, FunctionKind, FunctionTraits, Record, ResolveError,
    TypeTag, Value,
};
use tracing::trace;

/// Whether results of `column_type` can be memoized.
pub fn is_memoizable(column_type: ColumnType) -> bool {
    matches!(
        column_type.tag(),
        TypeTag::Long
            | TypeTag::Int
            | TypeTag::Timestamp
            | TypeTag::Double
            | TypeTag::Short
            | TypeTag::Boolean
            | TypeTag::Byte
            | TypeTag::Char
            | TypeTag::Date
            | TypeTag::Float
            | TypeTag::IPv4
            | TypeTag::Uuid
            | TypeTag::Long256
    )
}

/// Wrap `function` in a [`Memoizer`] when its type supports it.
pub fn memoize(function: BoxedFunction) -> BoxedFunction {
    if is_memoizable(function.column_type()) {
        trace!(function = function.name(), "memoizer inserted");
        Box::new(Memoizer::new(function))
    } else {
        function
    }
}

/// Caches the last row's result of an evaluator.
#[derive(Debug)]
pub struct Memoizer {
    inner: BoxedFunction,
    cache: RefCell<Option<(i64, Value)>>,
}

impl Memoizer {
    pub fn new(inner: BoxedFunction) -> Self {
        Self {
            inner,
            cache: RefCell::new(None),
        }
    }

    pub fn inner(&self) -> &dyn Function {
        self.inner.as_ref()
    }
}

impl Function for Memoizer {
    fn name(&self) -> &str {
        "memoize"
    }

    fn column_type(&self) -> ColumnType {
        self.inner.column_type()
    }

    fn eval(&self, record: &dyn Record) -> Value {
        let row_id = record.row_id();
        if row_id >= 0 {
            if let Some((cached_id, value)) = self.cache.borrow().as_ref() {
                if *cached_id == row_id {
                    return value.clone();
                }
            }
        }
        let value = self.inner.eval(record);
        if row_id >= 0 {
            *self.cache.borrow_mut() = Some((row_id, value.clone()));
        }
        value
    }

    fn traits(&self) -> FunctionTraits {
        self.inner.traits() - FunctionTraits::MEMOIZE
    }

    fn kind(&self) -> FunctionKind {
        self.inner.kind()
    }

    fn args(&self) -> Vec<&dyn Function> {
        vec![self.inner.as_ref()]
    }

    fn assign_type(&mut self, column_type: ColumnType) -> Result<(), ResolveError> {
        self.inner.assign_type(column_type)
    }
}
