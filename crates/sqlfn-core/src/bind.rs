//! Execution-scoped bind variable table.
//!
//! Positional variables (`$1`, `$2`, ...) are stored 0-based and sparse, so
//! a large index costs one entry; named variables (`:name`) are stored
//! without their leading colon.
//!
//! ## Sharing
//!
//! [`BindVariables`] is a cheap handle over a shared table. Link evaluators
//! keep a handle so values bound after resolution are visible at evaluation
//! time. The handle is single-threaded (`Rc`), matching the one-thread-per-
//! resolution model.

use std::cell::RefCell;
use std::rc::Rc;

use rustc_hash::FxHashMap;

use crate::column_type::ColumnType;
use crate::value::Value;

/// A typed bind variable slot.
#[derive(Debug, Clone, PartialEq)]
pub struct BindVariable {
    pub column_type: ColumnType,
    pub value: Value,
}

#[derive(Debug, Default)]
struct BindTable {
    indexed: FxHashMap<usize, BindVariable>,
    named: FxHashMap<String, BindVariable>,
}

/// Shared handle to a bind variable table.
#[derive(Debug, Clone, Default)]
pub struct BindVariables {
    table: Rc<RefCell<BindTable>>,
}

impl BindVariables {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a positional variable (0-based), replacing any previous binding.
    pub fn set_indexed(&self, index: usize, column_type: ColumnType, value: Value) {
        self.table
            .borrow_mut()
            .indexed
            .insert(index, BindVariable { column_type, value });
    }

    /// Bind a named variable, replacing any previous binding.
    pub fn set_named(&self, name: &str, column_type: ColumnType, value: Value) {
        self.table
            .borrow_mut()
            .named
            .insert(name.to_string(), BindVariable { column_type, value });
    }

    /// Define a positional variable's type without a value.
    ///
    /// An existing definition wins; its type is returned. Otherwise a typed
    /// null of `column_type` is defined and `column_type` is returned.
    pub fn define_indexed(&self, index: usize, column_type: ColumnType) -> ColumnType {
        if let Some(existing) = self.indexed_type(index) {
            return existing;
        }
        self.set_indexed(index, column_type, Value::Null);
        column_type
    }

    pub fn indexed(&self, index: usize) -> Option<BindVariable> {
        self.table.borrow().indexed.get(&index).cloned()
    }

    pub fn named(&self, name: &str) -> Option<BindVariable> {
        self.table.borrow().named.get(name).cloned()
    }

    pub fn indexed_type(&self, index: usize) -> Option<ColumnType> {
        self.table
            .borrow()
            .indexed
            .get(&index)
            .map(|v| v.column_type)
    }

    pub fn named_type(&self, name: &str) -> Option<ColumnType> {
        self.table.borrow().named.get(name).map(|v| v.column_type)
    }

    /// One past the highest defined positional slot.
    pub fn indexed_count(&self) -> usize {
        self.table
            .borrow()
            .indexed
            .keys()
            .max()
            .map_or(0, |index| index + 1)
    }

    pub fn clear(&self) {
        let mut table = self.table.borrow_mut();
        table.indexed.clear();
        table.named.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn indexed_slots_grow_on_demand() {
        let binds = BindVariables::new();
        binds.set_indexed(2, ColumnType::INT, Value::Int(7));
        assert_eq!(binds.indexed_count(), 3);
        assert!(binds.indexed(0).is_none());
        assert_eq!(binds.indexed(2).map(|v| v.value), Some(Value::Int(7)));
    }

    #[test]
    fn large_index_is_stored_sparsely() {
        let binds = BindVariables::new();
        let index = i32::MAX as usize - 1;
        assert_eq!(binds.define_indexed(index, ColumnType::INT), ColumnType::INT);
        assert_eq!(binds.indexed_type(index), Some(ColumnType::INT));
        assert_eq!(binds.indexed_count(), index + 1);
        assert!(binds.indexed(0).is_none());
    }

    #[test]
    fn define_keeps_existing_type() {
        let binds = BindVariables::new();
        binds.set_indexed(0, ColumnType::LONG, Value::Long(1));
        assert_eq!(binds.define_indexed(0, ColumnType::DOUBLE), ColumnType::LONG);
        assert_eq!(binds.define_indexed(1, ColumnType::DOUBLE), ColumnType::DOUBLE);
        assert_eq!(binds.indexed(1).map(|v| v.value), Some(Value::Null));
    }

    #[test]
    fn handles_share_one_table() {
        let binds = BindVariables::new();
        let other = binds.clone();
        other.set_named("x", ColumnType::STRING, Value::str("a"));
        assert_eq!(binds.named_type("x"), Some(ColumnType::STRING));
        binds.clear();
        assert!(other.named("x").is_none());
    }
}
