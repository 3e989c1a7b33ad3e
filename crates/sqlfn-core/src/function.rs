//! The evaluator abstraction.
//!
//! Every resolved expression node becomes one [`Function`]: a typed
//! computation over a [`Record`]. Evaluators own their argument evaluators,
//! so dropping the root of a tree releases the whole tree.

use std::fmt::{self, Write as _};

use bitflags::bitflags;

use crate::column_type::ColumnType;
use crate::constant::Constant;
use crate::error::ResolveError;
use crate::value::Value;

/// A row of input values.
pub trait Record {
    /// Value of the column at `index`.
    fn value(&self, index: usize) -> Value;

    /// Stable identity of the current row, or -1 when unknown.
    fn row_id(&self) -> i64 {
        -1
    }
}

/// A record with no columns, used to evaluate constants.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmptyRecord;

impl Record for EmptyRecord {
    fn value(&self, _index: usize) -> Value {
        Value::Null
    }
}

bitflags! {
    /// Capabilities an evaluator reports to the resolver.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct FunctionTraits: u16 {
        /// Value is fixed at resolution time and may be folded.
        const CONSTANT = 1 << 0;
        /// Value is fixed for one execution (bind variables, `now()`).
        const RUNTIME_CONSTANT = 1 << 1;
        /// Value may differ between evaluations of the same row.
        const NON_DETERMINISTIC = 1 << 2;
        /// Opts into per-row result caching.
        const MEMOIZE = 1 << 3;
        /// Carries state beyond its value; never folded.
        const EXTENDED_OPS = 1 << 4;
        /// A type name used as a cast target.
        const TYPE_CONSTANT = 1 << 5;
        /// An array literal that may be materialized into a constant.
        const ARRAY_LITERAL = 1 << 6;
        /// An implicit cast adapter inserted by the resolver.
        const IMPLICIT_CAST = 1 << 7;
    }
}

/// State updated row by row by aggregate and window evaluators.
///
/// The driver calls [`compute_first`](Self::compute_first) on the first row
/// of a group or frame, then [`compute_next`](Self::compute_next) on each
/// following row. [`Function::eval`] reads the current state.
pub trait Accumulator {
    fn compute_first(&self, record: &dyn Record);

    fn compute_next(&self, record: &dyn Record);
}

/// Evaluation category of an evaluator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FunctionKind {
    #[default]
    Scalar,
    /// An aggregate, evaluated per group.
    GroupBy,
    /// A window function, evaluated over a frame.
    Window,
}

/// A typed, possibly resource-owning computation bound to one expression node.
pub trait Function: fmt::Debug {
    /// Readable name used in plans and diagnostics.
    fn name(&self) -> &str;

    /// Result type. [`ColumnType::UNDEFINED`] until a bind variable is typed.
    fn column_type(&self) -> ColumnType;

    /// Evaluate against one record.
    fn eval(&self, record: &dyn Record) -> Value;

    fn traits(&self) -> FunctionTraits {
        FunctionTraits::empty()
    }

    fn kind(&self) -> FunctionKind {
        FunctionKind::Scalar
    }

    /// Argument evaluators, left to right.
    fn args(&self) -> Vec<&dyn Function> {
        Vec::new()
    }

    /// The constant representation, when this evaluator is one.
    fn as_constant(&self) -> Option<&Constant> {
        None
    }

    /// Row-feeding hooks of an aggregate or window evaluator.
    fn accumulator(&self) -> Option<&dyn Accumulator> {
        None
    }

    /// Fix the type of an undefined evaluator.
    ///
    /// Only bind variable links support this; everything else reports an
    /// internal error.
    fn assign_type(&mut self, column_type: ColumnType) -> Result<(), ResolveError> {
        Err(ResolveError::internal(format!(
            "{} cannot be assigned type {}",
            self.name(),
            column_type
        )))
    }

    #[inline]
    fn is_constant(&self) -> bool {
        self.traits().contains(FunctionTraits::CONSTANT)
    }

    #[inline]
    fn is_runtime_constant(&self) -> bool {
        self.traits().contains(FunctionTraits::RUNTIME_CONSTANT)
    }

    #[inline]
    fn is_constant_or_runtime_constant(&self) -> bool {
        self.traits()
            .intersects(FunctionTraits::CONSTANT | FunctionTraits::RUNTIME_CONSTANT)
    }

    #[inline]
    fn is_non_deterministic(&self) -> bool {
        self.traits().contains(FunctionTraits::NON_DETERMINISTIC)
    }

    #[inline]
    fn should_memoize(&self) -> bool {
        self.traits().contains(FunctionTraits::MEMOIZE)
    }

    #[inline]
    fn is_undefined(&self) -> bool {
        self.column_type().is_undefined()
    }
}

/// An owned evaluator.
pub type BoxedFunction = Box<dyn Function>;

/// Render an evaluator tree as `name(arg, arg)`.
pub fn explain(function: &dyn Function) -> String {
    let mut out = String::new();
    explain_into(function, &mut out);
    out
}

fn explain_into(function: &dyn Function, out: &mut String) {
    if let Some(constant) = function.as_constant() {
        let _ = write!(out, "{}", constant);
        return;
    }
    out.push_str(function.name());
    let args = function.args();
    if !args.is_empty() {
        out.push('(');
        for (i, arg) in args.into_iter().enumerate() {
            if i > 0 {
                out.push_str(", ");
            }
            explain_into(arg, out);
        }
        out.push(')');
    }
}

/// Visit every evaluator in a tree, root first.
pub fn walk(function: &dyn Function, visit: &mut dyn FnMut(&dyn Function)) {
    visit(function);
    for arg in function.args() {
        walk(arg, visit);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Pair(BoxedFunction, BoxedFunction);

    impl Function for Pair {
        fn name(&self) -> &str {
            "pair"
        }

        fn column_type(&self) -> ColumnType {
            ColumnType::INT
        }

        fn eval(&self, _record: &dyn Record) -> Value {
            Value::Null
        }

        fn args(&self) -> Vec<&dyn Function> {
            vec![self.0.as_ref(), self.1.as_ref()]
        }
    }

    #[test]
    fn explain_nested_tree() {
        let tree = Pair(
            Box::new(Constant::int(1)),
            Box::new(Pair(Box::new(Constant::int(2)), Box::new(Constant::int(3)))),
        );
        assert_eq!(explain(&tree), "pair(1, pair(2, 3))");
    }

    #[test]
    fn walk_visits_every_node() {
        let tree = Pair(Box::new(Constant::int(1)), Box::new(Constant::int(2)));
        let mut count = 0;
        walk(&tree, &mut |_| count += 1);
        assert_eq!(count, 3);
    }

    #[test]
    fn default_assign_type_is_rejected() {
        let mut tree = Pair(Box::new(Constant::int(1)), Box::new(Constant::int(2)));
        let err = tree.assign_type(ColumnType::LONG).unwrap_err();
        assert!(matches!(err, ResolveError::Internal { .. }));
    }
}
