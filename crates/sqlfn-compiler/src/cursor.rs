//! Subquery cursors.
//!
//! A query node is compiled by an external [`SubqueryCompiler`]; the
//! resulting factory is wrapped in a [`CursorFunction`] so it can sit in an
//! argument list like any other evaluator.

use std::fmt;
use std::sync::Arc;

use sqlfn_core::{
    ColumnType, ExecutionContext, Function, QueryModel, Record, RecordMetadata, ResolveError,
    Value,
};

use crate::function_parser::FunctionParser;

/// A compiled subquery able to produce record cursors.
pub trait RecordCursorFactory: fmt::Debug {
    /// Schema of the records the cursor yields.
    fn metadata(&self) -> Arc<dyn RecordMetadata>;
}

/// Compiles embedded subqueries.
///
/// The parser is passed back in so the compiler can resolve the
/// subquery's own expressions; nested calls save and restore the parser's
/// active schema.
pub trait SubqueryCompiler {
    fn generate(
        &self,
        query: &QueryModel,
        parser: &mut FunctionParser,
        ctx: &mut dyn ExecutionContext,
    ) -> Result<Box<dyn RecordCursorFactory>, ResolveError>;
}

/// An evaluator of type `CURSOR` owning a compiled subquery.
#[derive(Debug)]
pub struct CursorFunction {
    factory: Box<dyn RecordCursorFactory>,
}

impl CursorFunction {
    pub fn new(factory: Box<dyn RecordCursorFactory>) -> Self {
        Self { factory }
    }

    pub fn factory(&self) -> &dyn RecordCursorFactory {
        self.factory.as_ref()
    }

    pub fn metadata(&self) -> Arc<dyn RecordMetadata> {
        self.factory.metadata()
    }
}

impl Function for CursorFunction {
    fn name(&self) -> &str {
        "cursor"
    }

    fn column_type(&self) -> ColumnType {
        ColumnType::CURSOR
    }

    fn eval(&self, _record: &dyn Record) -> Value {
        Value::Null
    }
}
