//! sqlfn: function resolution for a columnar SQL engine.
//!
//! Turns a parsed SQL expression tree into a tree of typed evaluators:
//! overloads are picked by scoring argument types, constant subtrees are
//! folded, and selected results are memoized per row.
//!
//! ## Crates
//!
//! - [`core`]: types, values, evaluators, errors
//! - [`registry`]: overload catalog and signature grammar
//! - [`compiler`]: overload resolution and the tree walker
//! - [`functions`]: builtin function library
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use sqlfn::prelude::*;
//!
//! let catalog = Arc::new(builtin_catalog()?);
//! let mut parser = FunctionParser::new(catalog, ResolverConfig::default());
//! let metadata = Arc::new(GenericRecordMetadata::new().with_column("price", ColumnType::DOUBLE));
//! let node = ExpressionNode::binary("*", ExpressionNode::literal("price"), ExpressionNode::constant("2"));
//! let function = parser.parse_function(&node, metadata, &mut SqlExecutionContext::new())?;
//! assert_eq!(function.column_type(), ColumnType::DOUBLE);
//! ```

use thiserror::Error;

pub use sqlfn_compiler as compiler;
pub use sqlfn_core as core;
pub use sqlfn_functions as functions;
pub use sqlfn_registry as registry;

pub use sqlfn_compiler::FunctionParser;
pub use sqlfn_core::{RegistrationError, ResolveError};
pub use sqlfn_functions::{builtin_catalog, register_builtins};

/// Any error raised by this crate.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SqlFnError {
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error(transparent)]
    Registration(#[from] RegistrationError),
}

impl SqlFnError {
    pub fn is_resolve(&self) -> bool {
        matches!(self, SqlFnError::Resolve(_))
    }

    pub fn is_registration(&self) -> bool {
        matches!(self, SqlFnError::Registration(_))
    }
}

/// Result alias for [`SqlFnError`].
pub type Result<T> = std::result::Result<T, SqlFnError>;

/// Everything needed to build a catalog and resolve expressions.
pub mod prelude {
    pub use crate::{Result, SqlFnError};
    pub use sqlfn_compiler::{FunctionParser, SubqueryCompiler, finish, resolve_function};
    pub use sqlfn_core::{
        Accumulator, Args, BindVariables, BoxedFunction, ColumnType, Constant, EmptyRecord,
        ExecutionContext, ExpressionNode, Function, FunctionKind, FunctionTraits,
        GenericRecordMetadata, NodeKind, Record, RecordMetadata, RegistrationError, ResolveError,
        ResolverConfig, Span, SqlExecutionContext, TypeTag, Value,
    };
    pub use sqlfn_functions::{builtin_catalog, register_builtins};
    pub use sqlfn_registry::{CatalogBuilder, FunctionFactory, OverloadCatalog};
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlfn_core::Span;

    #[test]
    fn errors_convert_transparently() {
        let err: SqlFnError = ResolveError::ConstantExpected {
            span: Span::point(4),
        }
        .into();
        assert!(err.is_resolve());
        assert_eq!(err.to_string(), "at 4: constant expected");

        let err: SqlFnError = RegistrationError::InvalidFunctionName("(".into()).into();
        assert!(err.is_registration());
        assert_eq!(err.to_string(), "invalid function name: '('");
    }
}
