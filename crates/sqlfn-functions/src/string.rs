//! Text functions: `length`, `upper`, `concat` and `in`.

use std::sync::Arc;

use rustc_hash::FxHashSet;
use sqlfn_core::{
    Args, BoxedFunction, ColumnType, EmptyRecord, ExecutionContext, Function, FunctionTraits,
    Record, ResolveError, ResolverConfig, Span, Value,
};
use sqlfn_registry::FunctionFactory;

use crate::cast::to_text;
use crate::scalar::{inherited_traits, scalar};

fn length(values: &[Value]) -> Value {
    match values[0].as_str() {
        Some(s) => Value::Int(i32::try_from(s.chars().count()).unwrap_or(i32::MAX)),
        None => Value::Int(-1),
    }
}

fn upper(values: &[Value]) -> Value {
    values[0]
        .as_str()
        .map_or(Value::Null, |s| Value::str(s.to_uppercase()))
}

// =============================================================================
// CONCAT
// =============================================================================

/// `concat(var)`: joins the text form of every argument; nulls are empty.
#[derive(Debug)]
pub struct ConcatFunction {
    args: Vec<BoxedFunction>,
    scales: (usize, usize),
    traits: FunctionTraits,
}

impl Function for ConcatFunction {
    fn name(&self) -> &str {
        "concat"
    }

    fn column_type(&self) -> ColumnType {
        ColumnType::STRING
    }

    fn eval(&self, record: &dyn Record) -> Value {
        let mut out = String::new();
        for arg in &self.args {
            let value = arg.eval(record);
            if value.is_null() {
                continue;
            }
            if let Some(text) = to_text(&value, self.scales) {
                out.push_str(&text);
            }
        }
        Value::Str(out)
    }

    fn traits(&self) -> FunctionTraits {
        self.traits
    }

    fn args(&self) -> Vec<&dyn Function> {
        self.args.iter().map(|a| a.as_ref()).collect()
    }
}

struct ConcatFactory;

impl FunctionFactory for ConcatFactory {
    fn signature(&self) -> &str {
        "concat(var)"
    }

    fn preferred_variadic_type(&self, _index: usize, _args: &Args) -> Option<ColumnType> {
        Some(ColumnType::STRING)
    }

    fn new_instance(
        &self,
        _position: Span,
        args: Args,
        config: &ResolverConfig,
        _ctx: &dyn ExecutionContext,
    ) -> Result<Option<BoxedFunction>, ResolveError> {
        let args = args.into_vec();
        Ok(Some(Box::new(ConcatFunction {
            traits: inherited_traits(&args),
            args,
            scales: (config.double_to_str_scale, config.float_to_str_scale),
        })))
    }
}

// =============================================================================
// IN
// =============================================================================

/// `x in ('a', 'b', ...)` over a set of constant strings.
///
/// A null operand matches when the list contains null.
#[derive(Debug)]
pub struct InStrFunction {
    arg: BoxedFunction,
    set: FxHashSet<String>,
    contains_null: bool,
}

impl Function for InStrFunction {
    fn name(&self) -> &str {
        "in"
    }

    fn column_type(&self) -> ColumnType {
        ColumnType::BOOLEAN
    }

    fn eval(&self, record: &dyn Record) -> Value {
        match self.arg.eval(record) {
            Value::Str(s) => Value::Boolean(self.set.contains(&s)),
            Value::Char(c) => Value::Boolean(self.set.contains(c.to_string().as_str())),
            _ => Value::Boolean(self.contains_null),
        }
    }

    fn traits(&self) -> FunctionTraits {
        self.arg.traits()
            & (FunctionTraits::CONSTANT
                | FunctionTraits::RUNTIME_CONSTANT
                | FunctionTraits::NON_DETERMINISTIC)
    }

    fn args(&self) -> Vec<&dyn Function> {
        vec![self.arg.as_ref()]
    }
}

struct InStrFactory;

impl FunctionFactory for InStrFactory {
    fn signature(&self) -> &str {
        "in(string, var const)"
    }

    fn preferred_variadic_type(&self, _index: usize, _args: &Args) -> Option<ColumnType> {
        Some(ColumnType::STRING)
    }

    fn new_instance(
        &self,
        position: Span,
        args: Args,
        _config: &ResolverConfig,
        _ctx: &dyn ExecutionContext,
    ) -> Result<Option<BoxedFunction>, ResolveError> {
        let mut functions = args.into_vec().into_iter();
        let Some(arg) = functions.next() else {
            return Err(ResolveError::factory(position, "in requires an operand"));
        };

        let mut set = FxHashSet::default();
        let mut contains_null = false;
        for element in functions {
            match element.eval(&EmptyRecord) {
                Value::Str(s) => {
                    set.insert(s);
                }
                Value::Char(c) => {
                    set.insert(c.to_string());
                }
                value if value.is_null() => contains_null = true,
                value => {
                    return Err(ResolveError::factory(
                        position,
                        format!("STRING constant expected in list, found {value}"),
                    ));
                }
            }
        }

        Ok(Some(Box::new(InStrFunction {
            arg,
            set,
            contains_null,
        })))
    }
}

pub fn factories() -> Vec<Arc<dyn FunctionFactory>> {
    vec![
        scalar("length(string)", "length", ColumnType::INT, length),
        scalar("length(varchar)", "length", ColumnType::INT, length),
        scalar("upper(string)", "upper", ColumnType::STRING, upper),
        Arc::new(ConcatFactory),
        Arc::new(InStrFactory),
    ]
}
