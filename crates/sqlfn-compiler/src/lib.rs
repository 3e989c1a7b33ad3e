//! sqlfn Compiler
//!
//! Turns a parsed SQL expression tree into a tree of typed evaluators.
//!
//! ## Architecture
//!
//! - **Walk**: [`FunctionParser`] visits the tree in post-order, resolving
//!   leaves (columns, constants, bind variables, subqueries) directly
//! - **Resolve**: each call node picks an overload from the
//!   [`OverloadCatalog`](sqlfn_registry::OverloadCatalog) by scoring the
//!   resolved arguments against every candidate signature
//! - **Finish**: the constructed evaluator is folded into a constant or
//!   wrapped in a per-row cache
//!
//! ## Modules
//!
//! - [`function_parser`]: Tree walker and resolver entry point
//! - [`overload`]: Overload scoring, selection, and diagnostics
//! - [`conversion`]: Coercion distances between type tags
//! - [`cast`]: Implicit cast adapters
//! - [`constant`]: Literal token parsing
//! - [`column`]: Column reference evaluators
//! - [`bind`]: Bind variable links
//! - [`cursor`]: Subquery cursor evaluators
//! - [`fold`]: Constant folding
//! - [`memoize`]: Per-row result caching
//! - [`temporal`]: Date and timestamp text parsing
//! - [`geohash`]: Geohash text encoding
//! - [`traversal`]: Iterative post-order tree traversal

pub mod bind;
pub mod cast;
pub mod column;
pub mod constant;
pub mod conversion;
pub mod cursor;
pub mod fold;
pub mod function_parser;
pub mod geohash;
pub mod memoize;
pub mod overload;
pub mod temporal;
pub mod traversal;

pub use bind::{
    IndexedParameterLink, NamedParameterLink, create_bind_variable, create_bind_variable0,
};
pub use cast::{CastKind, CastOutcome, ImplicitCast, create_implicit_cast, create_implicit_cast_or_none};
pub use column::{ColumnFunction, RecordColumn, create_column};
pub use constant::parse_constant;
pub use conversion::{Conversion, ConversionKind, OVERLOAD_NONE, find_conversion, overload_distance};
pub use cursor::{CursorFunction, RecordCursorFactory, SubqueryCompiler};
pub use fold::function_to_constant;
pub use function_parser::FunctionParser;
pub use memoize::{Memoizer, is_memoizable, memoize};
pub use overload::{MatchLevel, finish, resolve_function};
