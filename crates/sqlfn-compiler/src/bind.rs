//! Bind variable linking.
//!
//! A bind variable token resolves to a link evaluator that reads the
//! execution-scoped [`BindVariables`] table at evaluation time:
//!
//! - `:name` must already be defined; its type is fixed at link time.
//! - `$n` (1-based, at most `i32::MAX`) may be undefined. The link then has type `UNDEFINED`
//!   until the resolver picks an overload and assigns it a type, which also
//!   defines the variable in the table.

use sqlfn_core::{
    BindVariables, BoxedFunction, ColumnType, Constant, ExecutionContext, Function,
    FunctionTraits, NodeKind, Record, ResolveError, Span, Value,
};

type Result<T> = std::result::Result<T, ResolveError>;

/// Link to a positional bind variable.
#[derive(Debug)]
pub struct IndexedParameterLink {
    /// 0-based slot.
    index: usize,
    column_type: ColumnType,
    binds: BindVariables,
    label: String,
}

impl IndexedParameterLink {
    pub fn new(index: usize, column_type: ColumnType, binds: BindVariables) -> Self {
        Self {
            index,
            column_type,
            binds,
            label: format!("${}", index + 1),
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }
}

impl Function for IndexedParameterLink {
    fn name(&self) -> &str {
        &self.label
    }

    fn column_type(&self) -> ColumnType {
        self.column_type
    }

    fn eval(&self, _record: &dyn Record) -> Value {
        self.binds
            .indexed(self.index)
            .map_or(Value::Null, |variable| variable.value)
    }

    fn traits(&self) -> FunctionTraits {
        FunctionTraits::RUNTIME_CONSTANT
    }

    fn assign_type(&mut self, column_type: ColumnType) -> Result<()> {
        self.column_type = self.binds.define_indexed(self.index, column_type);
        Ok(())
    }
}

/// Link to a named bind variable.
#[derive(Debug)]
pub struct NamedParameterLink {
    /// Variable name without its colon.
    name: String,
    column_type: ColumnType,
    binds: BindVariables,
    label: String,
}

impl NamedParameterLink {
    pub fn new(name: impl Into<String>, column_type: ColumnType, binds: BindVariables) -> Self {
        let name = name.into();
        let label = format!(":{name}");
        Self {
            name,
            column_type,
            binds,
            label,
        }
    }

    pub fn variable_name(&self) -> &str {
        &self.name
    }
}

impl Function for NamedParameterLink {
    fn name(&self) -> &str {
        &self.label
    }

    fn column_type(&self) -> ColumnType {
        self.column_type
    }

    fn eval(&self, _record: &dyn Record) -> Value {
        self.binds
            .named(&self.name)
            .map_or(Value::Null, |variable| variable.value)
    }

    fn traits(&self) -> FunctionTraits {
        FunctionTraits::RUNTIME_CONSTANT
    }

    fn assign_type(&mut self, column_type: ColumnType) -> Result<()> {
        let value = self
            .binds
            .named(&self.name)
            .map_or(Value::Null, |variable| variable.value);
        self.binds.set_named(&self.name, column_type, value);
        self.column_type = column_type;
        Ok(())
    }
}

/// Create an evaluator for a bind-variable-like token.
///
/// - no name: untyped null
/// - empty name: empty string
/// - a node that is not a bind variable, or a name not starting with `:`
///   or `$`: a string constant of the name
/// - otherwise a link, see [`create_bind_variable0`]
pub fn create_bind_variable(
    ctx: &dyn ExecutionContext,
    position: Span,
    name: Option<&str>,
    kind: NodeKind,
) -> Result<BoxedFunction> {
    let Some(name) = name else {
        return Ok(Box::new(Constant::untyped_null()));
    };
    if name.is_empty() {
        return Ok(Box::new(Constant::str("")));
    }
    if kind != NodeKind::BindVariable {
        return Ok(Box::new(Constant::str(name)));
    }
    match name.as_bytes()[0] {
        b':' => create_named_parameter(ctx, position, name),
        b'$' => parse_indexed_parameter(ctx, position, name),
        _ => Ok(Box::new(Constant::str(name))),
    }
}

/// Link a bind variable node: `:name` is named, anything else positional.
pub fn create_bind_variable0(
    ctx: &dyn ExecutionContext,
    position: Span,
    name: &str,
) -> Result<BoxedFunction> {
    if name.starts_with(':') {
        create_named_parameter(ctx, position, name)
    } else {
        parse_indexed_parameter(ctx, position, name)
    }
}

fn bind_variables(ctx: &dyn ExecutionContext, position: Span) -> Result<&BindVariables> {
    ctx.bind_variables()
        .ok_or(ResolveError::BindVariablesUnavailable { span: position })
}

fn create_named_parameter(
    ctx: &dyn ExecutionContext,
    position: Span,
    name: &str,
) -> Result<BoxedFunction> {
    let binds = bind_variables(ctx, position)?;
    let key = &name[1..];
    let column_type = binds
        .named_type(key)
        .ok_or_else(|| ResolveError::UndefinedBindVariable {
            name: name.to_string(),
            span: position,
        })?;
    Ok(Box::new(NamedParameterLink::new(
        key,
        column_type,
        binds.clone(),
    )))
}

/// Parse `$n` and link slot `n - 1`. The first character is skipped
/// whatever it is.
fn parse_indexed_parameter(
    ctx: &dyn ExecutionContext,
    position: Span,
    name: &str,
) -> Result<BoxedFunction> {
    let digits = name.get(1..).unwrap_or_default();
    let number: i32 = digits
        .parse()
        .map_err(|_| ResolveError::InvalidBindVariableIndex {
            value: name.to_string(),
            span: position,
        })?;
    if number < 1 {
        return Err(ResolveError::InvalidBindVariableIndex {
            value: number.to_string(),
            span: position,
        });
    }
    let index = (number - 1) as usize;

    let binds = bind_variables(ctx, position)?;
    let column_type = binds.indexed_type(index).unwrap_or(ColumnType::UNDEFINED);
    Ok(Box::new(IndexedParameterLink::new(
        index,
        column_type,
        binds.clone(),
    )))
}
