//! Builtin SQL functions for the sqlfn resolver.
//!
//! This crate provides the standard overload set:
//!
//! - **arithmetic** - `+ - * /`, unary `-` and `abs` over int, long, double
//! - **compare** - `=`, `<`, `and`, `or`, `not`
//! - **cast** - `cast(x as T)` between the common scalar types
//! - **string** - `length`, `upper`, `concat`, `in`
//! - **random** - `rnd_int`, `rnd_double`, `now`
//! - **aggregate** - `count`, `sum`, `avg`
//! - **window** - `row_number`, `rank`, running `avg`
//!
//! # Usage
//!
//! ```ignore
//! use sqlfn_functions::builtin_catalog;
//!
//! let catalog = builtin_catalog()?;
//! assert!(catalog.contains("concat"));
//! ```

use std::sync::Arc;

use sqlfn_core::RegistrationError;
use sqlfn_registry::{CatalogBuilder, FunctionFactory, OverloadCatalog};
use tracing::debug;

pub mod aggregate;
pub mod arithmetic;
pub mod cast;
pub mod compare;
pub mod random;
pub mod scalar;
pub mod string;
pub mod window;

pub use scalar::{Kernel, ScalarFactory, ScalarFunction};

// =============================================================================
// REGISTRATION
// =============================================================================

/// Every builtin factory, in registration order.
///
/// Order matters: earlier overloads win ties. Group-by `avg(double)` is
/// registered ahead of its window counterpart.
pub fn builtin_factories() -> Vec<Arc<dyn FunctionFactory>> {
    let mut factories = Vec::new();
    factories.extend(arithmetic::factories());
    factories.extend(compare::factories());
    factories.extend(cast::factories());
    factories.extend(string::factories());
    factories.extend(random::factories());
    factories.extend(aggregate::factories());
    factories.extend(window::factories());
    factories
}

/// Register every builtin into `builder`.
pub fn register_builtins(builder: &mut CatalogBuilder) -> Result<(), RegistrationError> {
    let factories = builtin_factories();
    let count = factories.len();
    builder.register_all(factories)?;
    debug!(count, "registered builtin functions");
    Ok(())
}

/// A catalog holding only the builtins.
pub fn builtin_catalog() -> Result<OverloadCatalog, RegistrationError> {
    let mut builder = CatalogBuilder::new();
    register_builtins(&mut builder)?;
    Ok(builder.build())
}
