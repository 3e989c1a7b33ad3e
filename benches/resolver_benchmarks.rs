//! Performance benchmarks for expression resolution.
//!
//! Measures the cost of turning expression trees into evaluators:
//! - Overload scoring on operators and functions
//! - Constant folding of literal subtrees
//! - Bind variable inference
//! - Deep operator chains
//!
//! ## Profiling
//!
//! Run with the `profile-with-puffin` feature to collect per-phase timings:
//!
//! ```bash
//! cargo bench --features profile-with-puffin -- "resolve/deep"
//! ```

use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;
use std::sync::Arc;

use sqlfn::prelude::*;

#[cfg(feature = "profile-with-puffin")]
static FRAME_VIEW: std::sync::OnceLock<puffin::GlobalFrameView> = std::sync::OnceLock::new();

/// Initialize puffin profiler.
#[cfg(feature = "profile-with-puffin")]
fn setup_profiler() {
    puffin::set_scopes_on(true);
    FRAME_VIEW.get_or_init(puffin::GlobalFrameView::default);
}

#[cfg(not(feature = "profile-with-puffin"))]
fn setup_profiler() {}

/// Call at the end of each benchmark iteration to flush profiling data.
#[cfg(feature = "profile-with-puffin")]
fn end_profiling_frame() {
    puffin::GlobalProfiler::lock().new_frame();
}

#[cfg(not(feature = "profile-with-puffin"))]
fn end_profiling_frame() {}

fn metadata() -> Arc<GenericRecordMetadata> {
    Arc::new(
        GenericRecordMetadata::new()
            .with_column("i", ColumnType::INT)
            .with_column("l", ColumnType::LONG)
            .with_column("d", ColumnType::DOUBLE)
            .with_column("s", ColumnType::STRING)
            .with_column("ts", ColumnType::TIMESTAMP),
    )
}

fn col(name: &str) -> ExpressionNode {
    ExpressionNode::literal(name)
}

fn lit(token: &str) -> ExpressionNode {
    ExpressionNode::constant(token)
}

/// `i + l + d + i + ...` with `depth` operators.
fn operator_chain(depth: usize) -> ExpressionNode {
    let columns = ["i", "l", "d"];
    (0..depth).fold(col("i"), |acc, n| {
        ExpressionNode::binary("+", acc, col(columns[n % columns.len()]))
    })
}

fn resolve(
    parser: &mut FunctionParser,
    node: &ExpressionNode,
    metadata: &Arc<GenericRecordMetadata>,
    ctx: &mut SqlExecutionContext,
) {
    let function = parser
        .parse_function(black_box(node), metadata.clone(), ctx)
        .expect("expression resolves");
    black_box(function.column_type());
    end_profiling_frame();
}

fn resolution_benchmarks(c: &mut Criterion) {
    setup_profiler();

    let catalog = Arc::new(builtin_catalog().expect("builtins register"));
    let mut parser = FunctionParser::new(catalog, ResolverConfig::default());
    let metadata = metadata();
    let mut group = c.benchmark_group("resolve");

    let arithmetic = ExpressionNode::binary("*", col("d"), ExpressionNode::binary("+", col("i"), col("l")));
    group.bench_function("arithmetic", |b| {
        let mut ctx = SqlExecutionContext::new();
        b.iter(|| resolve(&mut parser, &arithmetic, &metadata, &mut ctx));
    });

    let folded = ExpressionNode::function(
        "length",
        vec![ExpressionNode::function("concat", vec![lit("'ab'"), lit("12")])],
    );
    group.bench_function("constant_fold", |b| {
        let mut ctx = SqlExecutionContext::new();
        b.iter(|| resolve(&mut parser, &folded, &metadata, &mut ctx));
    });

    let coerced = ExpressionNode::binary("<", col("ts"), lit("'2024-01-01T00:00:00.000Z'"));
    group.bench_function("timestamp_coercion", |b| {
        let mut ctx = SqlExecutionContext::new();
        b.iter(|| resolve(&mut parser, &coerced, &metadata, &mut ctx));
    });

    let in_list = ExpressionNode::function(
        "in",
        vec![col("s"), lit("'a'"), lit("'b'"), lit("'c'"), lit("'d'")],
    );
    group.bench_function("in_list", |b| {
        let mut ctx = SqlExecutionContext::new();
        b.iter(|| resolve(&mut parser, &in_list, &metadata, &mut ctx));
    });

    let binds = ExpressionNode::binary(
        "+",
        ExpressionNode::bind_variable("$1"),
        ExpressionNode::bind_variable("$2"),
    );
    group.bench_function("bind_variables", |b| {
        b.iter(|| {
            let mut ctx = SqlExecutionContext::new().with_bind_variables(BindVariables::default());
            resolve(&mut parser, &binds, &metadata, &mut ctx);
        });
    });

    group.finish();

    let mut group = c.benchmark_group("resolve/deep");
    for depth in [8, 64, 256] {
        let chain = operator_chain(depth);
        group.bench_function(format!("chain_{depth}"), |b| {
            let mut ctx = SqlExecutionContext::new();
            b.iter(|| resolve(&mut parser, &chain, &metadata, &mut ctx));
        });
    }
    group.finish();
}

criterion_group!(benches, resolution_benchmarks);
criterion_main!(benches);
