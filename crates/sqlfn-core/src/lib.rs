//! Core types shared by the sqlfn crates.
//!
//! ## Modules
//!
//! - [`column_type`]: Type tags and parameterized column types
//! - [`value`]: Runtime values
//! - [`function`]: The evaluator trait and its capability flags
//! - [`constant`]: Constant and type-constant evaluators
//! - [`args`]: Argument lists handed to factories
//! - [`node`]: Parsed expression tree input
//! - [`metadata`]: Row schema lookup
//! - [`bind`]: Bind variable table
//! - [`context`]: Execution context
//! - [`config`]: Resolver configuration
//! - [`error`]: Error types
//! - [`span`]: Source positions

pub mod args;
pub mod bind;
pub mod column_type;
pub mod config;
pub mod constant;
pub mod context;
pub mod error;
pub mod function;
pub mod metadata;
pub mod node;
pub mod span;
pub mod value;

pub use args::Args;
pub use bind::{BindVariable, BindVariables};
pub use column_type::{ColumnType, GEOHASH_MAX_BITS, TypeTag, parse_geohash_precision};
pub use config::ResolverConfig;
pub use constant::{Constant, TypeConstant};
pub use context::{ExecutionContext, SqlExecutionContext};
pub use error::{RegistrationError, ResolveError};
pub use function::{
    Accumulator, BoxedFunction, EmptyRecord, Function, FunctionKind, FunctionTraits, Record,
    explain, walk,
};
pub use metadata::{GenericRecordMetadata, RecordMetadata};
pub use node::{ExpressionNode, NodeKind, QueryModel};
pub use span::Span;
pub use value::{ArrayValue, Value};
