//! Shared plumbing for stateless scalar functions.
//!
//! Most builtins are a pure kernel over their argument values. They share
//! one evaluator type, [`ScalarFunction`], and one factory type,
//! [`ScalarFactory`], differing only in signature, result type and kernel.

use std::sync::Arc;

use sqlfn_core::{
    Args, BoxedFunction, ColumnType, ExecutionContext, Function, FunctionTraits, Record,
    ResolveError, ResolverConfig, Span, Value,
};
use sqlfn_registry::FunctionFactory;

/// Computes a result from evaluated arguments.
pub type Kernel = fn(&[Value]) -> Value;

/// Traits a function inherits from its arguments.
///
/// Constant when every argument is constant, runtime constant when every
/// argument is at least runtime constant, and non-deterministic when any
/// argument is.
pub fn inherited_traits(args: &[BoxedFunction]) -> FunctionTraits {
    let mut traits = FunctionTraits::empty();
    if args.is_empty() {
        return traits;
    }
    if args.iter().all(|a| a.is_constant()) {
        traits |= FunctionTraits::CONSTANT;
    } else if args.iter().all(|a| a.is_constant_or_runtime_constant()) {
        traits |= FunctionTraits::RUNTIME_CONSTANT;
    }
    if args.iter().any(|a| a.is_non_deterministic()) {
        traits |= FunctionTraits::NON_DETERMINISTIC;
    }
    traits
}

/// True when any value is null (including NaN).
#[inline]
pub fn any_null(values: &[Value]) -> bool {
    values.iter().any(Value::is_null)
}

/// A stateless function applying a [`Kernel`].
#[derive(Debug)]
pub struct ScalarFunction {
    name: &'static str,
    column_type: ColumnType,
    args: Vec<BoxedFunction>,
    kernel: Kernel,
    traits: FunctionTraits,
}

impl ScalarFunction {
    pub fn new(
        name: &'static str,
        column_type: ColumnType,
        args: Vec<BoxedFunction>,
        kernel: Kernel,
    ) -> Self {
        let traits = inherited_traits(&args);
        Self {
            name,
            column_type,
            args,
            kernel,
            traits,
        }
    }
}

impl Function for ScalarFunction {
    fn name(&self) -> &str {
        self.name
    }

    fn column_type(&self) -> ColumnType {
        self.column_type
    }

    fn eval(&self, record: &dyn Record) -> Value {
        let values: Vec<Value> = self.args.iter().map(|a| a.eval(record)).collect();
        (self.kernel)(&values)
    }

    fn traits(&self) -> FunctionTraits {
        self.traits
    }

    fn args(&self) -> Vec<&dyn Function> {
        self.args.iter().map(|a| a.as_ref()).collect()
    }
}

/// Factory for a [`ScalarFunction`].
pub struct ScalarFactory {
    signature: &'static str,
    name: &'static str,
    returns: ColumnType,
    kernel: Kernel,
}

impl FunctionFactory for ScalarFactory {
    fn signature(&self) -> &str {
        self.signature
    }

    fn new_instance(
        &self,
        _position: Span,
        args: Args,
        _config: &ResolverConfig,
        _ctx: &dyn ExecutionContext,
    ) -> Result<Option<BoxedFunction>, ResolveError> {
        Ok(Some(Box::new(ScalarFunction::new(
            self.name,
            self.returns,
            args.into_vec(),
            self.kernel,
        ))))
    }
}

/// Shorthand for registering a [`ScalarFactory`].
pub fn scalar(
    signature: &'static str,
    name: &'static str,
    returns: ColumnType,
    kernel: Kernel,
) -> Arc<dyn FunctionFactory> {
    Arc::new(ScalarFactory {
        signature,
        name,
        returns,
        kernel,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlfn_core::{Constant, EmptyRecord};

    fn first(values: &[Value]) -> Value {
        values.first().cloned().unwrap_or(Value::Null)
    }

    #[test]
    fn constant_arguments_make_constant_function() {
        let f = ScalarFunction::new("id", ColumnType::INT, vec![Box::new(Constant::int(4))], first);
        assert!(f.is_constant());
        assert_eq!(f.eval(&EmptyRecord), Value::Int(4));
    }

    #[test]
    fn no_arguments_is_not_constant() {
        let f = ScalarFunction::new("nothing", ColumnType::INT, vec![], first);
        assert!(!f.is_constant());
        assert!(!f.is_runtime_constant());
    }

    #[test]
    fn null_detection_includes_nan() {
        assert!(any_null(&[Value::Int(1), Value::double(f64::NAN)]));
        assert!(!any_null(&[Value::Int(1)]));
    }
}
