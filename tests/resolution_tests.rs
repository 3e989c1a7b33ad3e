//! End-to-end resolution against the builtin catalog.

use std::sync::{Arc, OnceLock};

use sqlfn::prelude::*;
use tracing_subscriber::EnvFilter;

// =============================================================================
// HELPERS
// =============================================================================

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn catalog() -> Arc<OverloadCatalog> {
    static CATALOG: OnceLock<Arc<OverloadCatalog>> = OnceLock::new();
    CATALOG
        .get_or_init(|| Arc::new(builtin_catalog().expect("builtins register")))
        .clone()
}

fn schema() -> Arc<dyn RecordMetadata> {
    Arc::new(
        GenericRecordMetadata::new()
            .with_column("i", ColumnType::INT)
            .with_column("l", ColumnType::LONG)
            .with_column("d", ColumnType::DOUBLE)
            .with_column("s", ColumnType::STRING)
            .with_column("ts", ColumnType::TIMESTAMP)
            .with_column("u", ColumnType::UUID)
            .with_column("sh", ColumnType::SHORT),
    )
}

/// A row matching [`schema`].
struct Row {
    id: i64,
    values: Vec<Value>,
}

impl Row {
    fn sample(id: i64) -> Self {
        Self {
            id,
            values: vec![
                Value::Int(7),
                Value::Long(40),
                Value::double(1.5),
                Value::str("abc"),
                Value::Timestamp(1_700_000_000_000_000),
                Value::Uuid(0xa0ee_bc99_9c0b_4ef8_bb6d_6bb9_bd38_0a11),
                Value::Short(3),
            ],
        }
    }
}

impl Record for Row {
    fn value(&self, index: usize) -> Value {
        self.values.get(index).cloned().unwrap_or(Value::Null)
    }

    fn row_id(&self) -> i64 {
        self.id
    }
}

fn resolve_with(
    node: &ExpressionNode,
    config: ResolverConfig,
    ctx: &mut SqlExecutionContext,
) -> std::result::Result<BoxedFunction, ResolveError> {
    init_tracing();
    let mut parser = FunctionParser::new(catalog(), config);
    parser.parse_function(node, schema(), ctx)
}

fn resolve(node: &ExpressionNode) -> std::result::Result<BoxedFunction, ResolveError> {
    resolve_with(node, ResolverConfig::default(), &mut SqlExecutionContext::new())
}

fn col(name: &str) -> ExpressionNode {
    ExpressionNode::literal(name)
}

fn lit(token: &str) -> ExpressionNode {
    ExpressionNode::constant(token)
}

fn call(name: &str, args: Vec<ExpressionNode>) -> ExpressionNode {
    ExpressionNode::function(name, args)
}

fn mismatch_message(err: &ResolveError) -> &str {
    match err {
        ResolveError::ArgumentMismatch { message, .. } => message,
        other => panic!("expected an argument mismatch, got {other:?}"),
    }
}

// =============================================================================
// OVERLOAD SELECTION
// =============================================================================

#[test]
fn int_literals_fold_to_int() {
    let f = resolve(&ExpressionNode::binary("+", lit("1"), lit("2"))).unwrap();
    assert_eq!(f.column_type(), ColumnType::INT);
    assert!(f.as_constant().is_some());
    assert_eq!(f.eval(&EmptyRecord), Value::Int(3));
}

#[test]
fn exact_match_uses_arguments_directly() {
    let f = resolve(&ExpressionNode::binary("+", col("i"), lit("1"))).unwrap();
    assert_eq!(f.name(), "add_int");
    let args = f.args();
    assert_eq!(args[0].name(), "i");
    assert_eq!(args[1].name(), "constant");
    assert_eq!(f.eval(&Row::sample(0)), Value::Int(8));
}

#[test]
fn int_operand_widens_to_double() {
    let f = resolve(&ExpressionNode::binary("*", col("d"), lit("2"))).unwrap();
    assert_eq!(f.column_type(), ColumnType::DOUBLE);
    assert_eq!(f.eval(&Row::sample(0)), Value::double(3.0));
}

#[test]
fn cheapest_coercion_wins() {
    let f = resolve(&call("abs", vec![col("sh")])).unwrap();
    assert_eq!(f.column_type(), ColumnType::INT);
    assert_eq!(f.eval(&Row::sample(0)), Value::Int(3));
}

#[test]
fn partial_tie_goes_to_earlier_overload() {
    let f = resolve(&call("abs", vec![lit("null")])).unwrap();
    assert_eq!(f.column_type(), ColumnType::INT);
    assert!(f.is_constant());
    assert_eq!(f.eval(&EmptyRecord), Value::Null);
}

#[test]
fn timestamp_text_is_parsed_for_comparison() {
    let node = ExpressionNode::binary("<", col("ts"), lit("'2024-01-01'"));
    let f = resolve(&node).unwrap();
    assert_eq!(f.name(), "lt_timestamp");
    assert_eq!(f.args()[1].column_type(), ColumnType::TIMESTAMP);
    assert_eq!(f.eval(&Row::sample(0)), Value::Boolean(true));
}

#[test]
fn invalid_timestamp_text_fails() {
    let node = ExpressionNode::binary("<", col("ts"), lit("'not a date'").at(5));
    let err = resolve(&node).unwrap_err();
    assert!(matches!(err, ResolveError::InvalidDate { .. }));
    assert_eq!(err.span(), Some(Span::new(5, 12)));
}

#[test]
fn uuid_compares_with_text() {
    let node = ExpressionNode::binary(
        "=",
        col("u"),
        lit("'a0eebc99-9c0b-4ef8-bb6d-6bb9bd380a11'"),
    );
    let f = resolve(&node).unwrap();
    assert_eq!(f.column_type(), ColumnType::BOOLEAN);
    assert_eq!(f.eval(&Row::sample(0)), Value::Boolean(true));
}

// =============================================================================
// CASTS
// =============================================================================

#[test]
fn cast_of_null_is_typed_null() {
    let f = resolve(&call("cast", vec![lit("null"), lit("int")])).unwrap();
    assert_eq!(f.column_type(), ColumnType::INT);
    assert!(f.as_constant().is_some_and(Constant::is_null));
}

#[test]
fn cast_to_same_type_is_elided() {
    let f = resolve(&call("cast", vec![col("i"), lit("int")])).unwrap();
    assert_eq!(f.name(), "i");
}

#[test]
fn constant_cast_folds() {
    let f = resolve(&call("cast", vec![lit("'42'"), lit("long")])).unwrap();
    assert_eq!(f.column_type(), ColumnType::LONG);
    assert_eq!(f.eval(&EmptyRecord), Value::Long(42));
}

#[test]
fn double_to_string_uses_configured_scale() {
    let config = ResolverConfig::default().with_double_to_str_scale(2);
    let node = call("cast", vec![col("d"), lit("string")]);
    let f = resolve_with(&node, config, &mut SqlExecutionContext::new()).unwrap();
    let row = Row {
        id: 0,
        values: vec![Value::Null, Value::Null, Value::double(2.0 / 3.0)],
    };
    assert_eq!(f.eval(&row), Value::str("0.67"));
}

// =============================================================================
// BIND VARIABLES
// =============================================================================

#[test]
fn undefined_bind_variables_take_winning_types() {
    let mut ctx = SqlExecutionContext::new();
    let node = ExpressionNode::binary(
        "+",
        ExpressionNode::bind_variable("$1"),
        ExpressionNode::bind_variable("$2"),
    );
    let f = resolve_with(&node, ResolverConfig::default(), &mut ctx).unwrap();
    assert_eq!(f.column_type(), ColumnType::DOUBLE);

    let binds = ctx.bind_variables().unwrap();
    assert_eq!(binds.indexed_type(0), Some(ColumnType::DOUBLE));
    assert_eq!(binds.indexed_type(1), Some(ColumnType::DOUBLE));
}

#[test]
fn typed_bind_variable_keeps_its_type() {
    let binds = BindVariables::new();
    binds.set_named("limit", ColumnType::INT, Value::Int(5));
    let mut ctx = SqlExecutionContext::new().with_bind_variables(binds);
    let node = ExpressionNode::binary("+", col("i"), ExpressionNode::bind_variable(":limit"));
    let f = resolve_with(&node, ResolverConfig::default(), &mut ctx).unwrap();
    assert_eq!(f.name(), "add_int");
    assert!(!f.is_constant());
    assert_eq!(f.eval(&Row::sample(0)), Value::Int(12));
}

#[test]
fn variadic_bind_variable_uses_preferred_type() {
    let mut ctx = SqlExecutionContext::new();
    let node = call("concat", vec![ExpressionNode::bind_variable("$1"), lit("'x'")]);
    let f = resolve_with(&node, ResolverConfig::default(), &mut ctx).unwrap();
    assert_eq!(f.column_type(), ColumnType::STRING);
    assert_eq!(
        ctx.bind_variables().unwrap().indexed_type(0),
        Some(ColumnType::STRING)
    );
}

#[test]
fn missing_bind_table_is_reported() {
    let mut ctx = SqlExecutionContext::new().without_bind_variables();
    let node = ExpressionNode::bind_variable("$1").at(3);
    let err = resolve_with(&node, ResolverConfig::default(), &mut ctx).unwrap_err();
    assert!(matches!(err, ResolveError::BindVariablesUnavailable { .. }));
}

#[test]
fn oversized_bind_index_is_rejected() {
    let node = call(
        "abs",
        vec![ExpressionNode::bind_variable("$100000000000").at(4)],
    );
    let err = resolve(&node).unwrap_err();
    assert_eq!(
        err,
        ResolveError::InvalidBindVariableIndex {
            value: "$100000000000".to_string(),
            span: Span::new(4, 13),
        }
    );
}

// =============================================================================
// FOLDING AND MEMOIZATION
// =============================================================================

#[test]
fn nested_constants_fold_bottom_up() {
    let node = call(
        "length",
        vec![call("concat", vec![lit("'ab'"), lit("1"), lit("'c'")])],
    );
    let f = resolve(&node).unwrap();
    assert!(f.as_constant().is_some());
    assert_eq!(f.eval(&EmptyRecord), Value::Int(4));
}

#[test]
fn folding_can_be_disabled() {
    let config = ResolverConfig::default().with_constant_folding(false);
    let node = ExpressionNode::binary("+", lit("1"), lit("2"));
    let f = resolve_with(&node, config, &mut SqlExecutionContext::new()).unwrap();
    assert_eq!(f.name(), "add_int");
    assert!(f.is_constant());
}

#[test]
fn rnd_int_is_memoized_per_row() {
    let f = resolve(&call("rnd_int", vec![])).unwrap();
    assert_eq!(f.name(), "memoize");
    let row = Row::sample(11);
    assert_eq!(f.eval(&row), f.eval(&row));
}

#[test]
fn memoization_can_be_disabled() {
    let config = ResolverConfig::default().with_memoization(false);
    let f = resolve_with(&call("rnd_int", vec![]), config, &mut SqlExecutionContext::new())
        .unwrap();
    assert_eq!(f.name(), "rnd_int");
}

#[test]
fn now_is_runtime_constant() {
    let mut ctx = SqlExecutionContext::new().with_now(123_456);
    let f = resolve_with(&call("now", vec![]), ResolverConfig::default(), &mut ctx).unwrap();
    assert!(f.is_runtime_constant());
    assert!(f.as_constant().is_none());
    assert_eq!(f.eval(&EmptyRecord), Value::Timestamp(123_456));
}

#[test]
fn non_deterministic_functions_can_be_forbidden() {
    let mut ctx = SqlExecutionContext::new().with_non_deterministic_functions(false);
    let err = resolve_with(&call("rnd_int", vec![]), ResolverConfig::default(), &mut ctx)
        .unwrap_err();
    assert!(matches!(err, ResolveError::NonDeterministicNotAllowed { .. }));
}

// =============================================================================
// AGGREGATES AND WINDOWS
// =============================================================================

#[test]
fn avg_outside_window_is_aggregate() {
    let f = resolve(&call("avg", vec![col("d")])).unwrap();
    assert_eq!(f.kind(), FunctionKind::GroupBy);
}

#[test]
fn avg_inside_window_is_window_function() {
    let mut ctx = SqlExecutionContext::new();
    ctx.enter_window_context();
    let f = resolve_with(&call("avg", vec![col("d")]), ResolverConfig::default(), &mut ctx)
        .unwrap();
    assert_eq!(f.kind(), FunctionKind::Window);

    let accumulator = f.accumulator().unwrap();
    accumulator.compute_first(&Row::sample(0));
    accumulator.compute_next(&Row::sample(1));
    assert_eq!(f.eval(&EmptyRecord), Value::double(1.5));
}

#[test]
fn aggregate_cannot_be_an_argument() {
    let node = call("abs", vec![call("sum", vec![col("d")]).at(4)]);
    let err = resolve(&node).unwrap_err();
    assert_eq!(err, ResolveError::AggregateAsArgument { span: Span::new(4, 3) });
}

#[test]
fn row_number_counts_rows() {
    let mut ctx = SqlExecutionContext::new();
    ctx.enter_window_context();
    let f = resolve_with(&call("row_number", vec![]), ResolverConfig::default(), &mut ctx)
        .unwrap();
    let accumulator = f.accumulator().unwrap();
    accumulator.compute_first(&EmptyRecord);
    accumulator.compute_next(&EmptyRecord);
    assert_eq!(f.eval(&EmptyRecord), Value::Long(2));
}

// =============================================================================
// DIAGNOSTICS
// =============================================================================

#[test]
fn unknown_function_lists_argument_types() {
    let err = resolve(&call("nope", vec![lit("1"), lit("'ab'")])).unwrap_err();
    assert_eq!(err.to_string(), "at 0: unknown function name: nope(INT,STRING)");
}

#[test]
fn wrong_argument_count_for_single_overload() {
    let err = resolve(&call("upper", vec![lit("'a'"), lit("'b'")])).unwrap_err();
    assert_eq!(
        mismatch_message(&err),
        "wrong number of arguments for function `upper`; expected: 1, provided: 2"
    );
    assert!(matches!(
        err,
        ResolveError::ArgumentMismatch {
            expected_count: Some(1),
            actual_count: 2,
            ..
        }
    ));
}

#[test]
fn binary_operator_mismatch_names_both_types() {
    let err = resolve(&ExpressionNode::binary("+", col("u"), lit("1"))).unwrap_err();
    assert_eq!(
        mismatch_message(&err),
        "there is no matching operator `+` with the argument types: UUID + INT"
    );
}

#[test]
fn unary_operator_mismatch_names_operand_type() {
    let err = resolve(&ExpressionNode::unary("-", col("u"))).unwrap_err();
    assert_eq!(
        mismatch_message(&err),
        "there is no matching operator `-` with the argument type: UUID"
    );
}

#[test]
fn unknown_column_is_reported_at_its_position() {
    let node = ExpressionNode::binary("+", col("i"), col("missing").at(4));
    let err = resolve(&node).unwrap_err();
    assert_eq!(err.to_string(), "at 4: invalid column: missing");
}

#[test]
fn in_list_requires_constants() {
    let node = call("in", vec![col("s"), lit("'a'"), col("s").at(9)]);
    let err = resolve(&node).unwrap_err();
    assert_eq!(err, ResolveError::ConstantExpected { span: Span::new(9, 1) });
}

#[test]
fn in_list_matches() {
    let node = call("in", vec![col("s"), lit("'x'"), lit("'abc'")]);
    let f = resolve(&node).unwrap();
    assert_eq!(f.eval(&Row::sample(0)), Value::Boolean(true));
}
