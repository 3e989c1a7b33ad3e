//! The factory trait implemented by every function overload.

use sqlfn_core::{
    Args, BoxedFunction, ColumnType, ExecutionContext, ResolveError, ResolverConfig, Span,
};

/// Builds evaluators for one overload.
///
/// Factories are registered once and shared read-only by every resolver,
/// hence `Send + Sync`.
pub trait FunctionFactory: Send + Sync {
    /// Textual signature, e.g. `"round(double, int const)"`.
    ///
    /// See [`crate::signature`] for the grammar.
    fn signature(&self) -> &str;

    /// True for window functions.
    fn is_window(&self) -> bool {
        false
    }

    /// Whether a constant `CHAR` argument counts as an exact match for a
    /// `STRING` parameter.
    fn supports_implicit_char_to_str(&self) -> bool {
        true
    }

    /// Type for an undefined bind variable in the variadic tail at `index`.
    ///
    /// `None` makes the resolver fail with
    /// [`ResolveError::UnresolvedVariadicType`].
    fn preferred_variadic_type(&self, index: usize, args: &Args) -> Option<ColumnType> {
        let _ = (index, args);
        None
    }

    /// Construct an evaluator, taking ownership of `args`.
    ///
    /// Returning `Ok(None)` is a registration bug and is reported as
    /// [`ResolveError::BadFactory`].
    fn new_instance(
        &self,
        position: Span,
        args: Args,
        config: &ResolverConfig,
        ctx: &dyn ExecutionContext,
    ) -> Result<Option<BoxedFunction>, ResolveError>;
}
