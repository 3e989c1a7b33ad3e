//! Overload catalog for sqlfn.
//!
//! A function name maps to an ordered list of [`SignatureDescriptor`]s, each
//! backed by a [`FunctionFactory`] that constructs the evaluator once the
//! resolver has picked it.
//!
//! ```
//! use std::sync::Arc;
//! use sqlfn_core::{Args, BoxedFunction, Constant, ExecutionContext, ResolveError, ResolverConfig, Span};
//! use sqlfn_registry::{CatalogBuilder, FunctionFactory};
//!
//! struct Pi;
//!
//! impl FunctionFactory for Pi {
//!     fn signature(&self) -> &str {
//!         "pi()"
//!     }
//!
//!     fn new_instance(
//!         &self,
//!         _position: Span,
//!         _args: Args,
//!         _config: &ResolverConfig,
//!         _ctx: &dyn ExecutionContext,
//!     ) -> Result<Option<BoxedFunction>, ResolveError> {
//!         Ok(Some(Box::new(Constant::double(std::f64::consts::PI))))
//!     }
//! }
//!
//! let mut builder = CatalogBuilder::new();
//! builder.register(Arc::new(Pi)).unwrap();
//! let catalog = builder.build();
//! assert!(catalog.has_no_arg_function("pi"));
//! ```

pub mod catalog;
pub mod factory;
pub mod signature;

pub use catalog::{CatalogBuilder, DEFAULT_OPERATORS, OverloadCatalog};
pub use factory::FunctionFactory;
pub use signature::{ArgFlags, ArgSpec, ParsedSignature, SignatureDescriptor, parse_signature};
