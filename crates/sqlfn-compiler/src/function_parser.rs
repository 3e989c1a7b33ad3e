//! FunctionParser - turns an expression tree into an evaluator tree.
//!
//! The tree is walked in post-order. Each visited node pops its resolved
//! children off the function stack, resolves itself, and pushes the result
//! back, so a successful walk leaves exactly one evaluator for the root.
//!
//! ## Failure
//!
//! Evaluators own their resources. When any node fails, everything this
//! call pushed is dropped before the error is returned, and the stacks are
//! back at the lengths they had on entry. Nested calls (subqueries resolved
//! through a [`SubqueryCompiler`]) share the stacks, each above its
//! caller's entries.

use std::sync::Arc;

use sqlfn_core::{
    Args, BoxedFunction, ColumnType, Constant, ExecutionContext, ExpressionNode, FunctionKind,
    NodeKind, RecordMetadata, ResolveError, ResolverConfig, Span,
};
use sqlfn_registry::OverloadCatalog;
use tracing::debug;

use crate::bind;
use crate::cast::{self, CastOutcome};
use crate::column::create_column;
use crate::constant::parse_constant;
use crate::cursor::{CursorFunction, SubqueryCompiler};
use crate::overload::resolve_function;
use crate::traversal::traverse;

type Result<T> = std::result::Result<T, ResolveError>;

/// Resolver for expression trees.
///
/// One parser serves one thread; its stacks are scratch space reused across
/// calls.
pub struct FunctionParser {
    catalog: Arc<OverloadCatalog>,
    config: ResolverConfig,
    function_stack: Vec<BoxedFunction>,
    position_stack: Vec<Span>,
    /// Row schema of the call in progress.
    metadata: Option<Arc<dyn RecordMetadata>>,
    /// Schemas of enclosing calls.
    metadata_stack: Vec<Option<Arc<dyn RecordMetadata>>>,
    subquery_compiler: Option<Arc<dyn SubqueryCompiler>>,
}

impl FunctionParser {
    pub fn new(catalog: Arc<OverloadCatalog>, config: ResolverConfig) -> Self {
        Self {
            catalog,
            config,
            function_stack: Vec::new(),
            position_stack: Vec::new(),
            metadata: None,
            metadata_stack: Vec::new(),
            subquery_compiler: None,
        }
    }

    /// Install the compiler used for subquery nodes.
    pub fn with_subquery_compiler(mut self, compiler: Arc<dyn SubqueryCompiler>) -> Self {
        self.subquery_compiler = Some(compiler);
        self
    }

    pub fn catalog(&self) -> &Arc<OverloadCatalog> {
        &self.catalog
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Resolve `node` against the row schema `metadata`.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn parse_function(
        &mut self,
        node: &ExpressionNode,
        metadata: Arc<dyn RecordMetadata>,
        ctx: &mut dyn ExecutionContext,
    ) -> Result<BoxedFunction> {
        let enclosing = self.metadata.replace(metadata);
        self.metadata_stack.push(enclosing);

        let function_base = self.function_stack.len();
        let position_base = self.position_stack.len();

        let walked = traverse(node, |node| self.visit(node, ctx));

        self.metadata = self.metadata_stack.pop().flatten();

        if let Err(err) = walked {
            let released = self.function_stack.len().saturating_sub(function_base);
            self.function_stack.truncate(function_base);
            self.position_stack.truncate(position_base);
            debug!(released, error = %err, "expression resolution failed");
            return Err(err);
        }

        self.position_stack.pop();
        let function = self
            .function_stack
            .pop()
            .ok_or_else(|| ResolveError::internal("expression produced no function"))?;
        debug_assert_eq!(self.function_stack.len(), function_base);
        debug_assert_eq!(self.position_stack.len(), position_base);
        Ok(function)
    }

    fn visit(&mut self, node: &ExpressionNode, ctx: &mut dyn ExecutionContext) -> Result<()> {
        let arg_count = node.args.len();
        let function = if arg_count == 0 {
            self.visit_leaf(node, ctx)?
        } else {
            let args = self.pop_args(arg_count)?;
            resolve_function(
                &self.catalog,
                &node.token,
                node.position,
                args,
                &*ctx,
                &self.config,
            )?
        };
        self.function_stack.push(function);
        self.position_stack.push(node.position);
        Ok(())
    }

    fn visit_leaf(
        &mut self,
        node: &ExpressionNode,
        ctx: &mut dyn ExecutionContext,
    ) -> Result<BoxedFunction> {
        match node.kind {
            NodeKind::Literal => {
                let metadata = self
                    .metadata
                    .as_deref()
                    .ok_or_else(|| ResolveError::internal("no row schema in scope"))?;
                create_column(node.position, &node.token, metadata)
            }
            NodeKind::BindVariable => bind::create_bind_variable0(&*ctx, node.position, &node.token),
            NodeKind::MemberAccess => Ok(Box::new(Constant::str(node.token.as_str()))),
            NodeKind::Constant => parse_constant(node.position, &node.token),
            NodeKind::Query => self.create_cursor(node, ctx),
            NodeKind::Function | NodeKind::Operation => resolve_function(
                &self.catalog,
                &node.token,
                node.position,
                Args::new(),
                &*ctx,
                &self.config,
            ),
        }
    }

    /// Take the top `count` entries as an argument list in source order.
    fn pop_args(&mut self, count: usize) -> Result<Args> {
        let split = self
            .function_stack
            .len()
            .checked_sub(count)
            .ok_or_else(|| ResolveError::internal("function stack underflow"))?;
        let position_split = self
            .position_stack
            .len()
            .checked_sub(count)
            .ok_or_else(|| ResolveError::internal("position stack underflow"))?;
        let functions = self.function_stack.split_off(split);
        let positions = self.position_stack.split_off(position_split);

        if let Some(index) = functions
            .iter()
            .rposition(|f| f.kind() == FunctionKind::GroupBy)
        {
            return Err(ResolveError::AggregateAsArgument {
                span: positions[index],
            });
        }
        Ok(functions.into_iter().zip(positions).collect())
    }

    fn create_cursor(
        &mut self,
        node: &ExpressionNode,
        ctx: &mut dyn ExecutionContext,
    ) -> Result<BoxedFunction> {
        let compiler = self
            .subquery_compiler
            .clone()
            .ok_or_else(|| ResolveError::internal("no subquery compiler configured"))?;
        let query = node
            .query
            .clone()
            .ok_or_else(|| ResolveError::internal("query node without a query model"))?;

        ctx.push_timestamp_required(false);
        let generated = compiler.generate(&query, self, ctx);
        ctx.pop_timestamp_required();
        Ok(Box::new(CursorFunction::new(generated?)))
    }

    /// Create a bind variable evaluator outside a tree walk.
    pub fn create_bind_variable(
        &self,
        ctx: &dyn ExecutionContext,
        position: Span,
        name: Option<&str>,
        kind: NodeKind,
    ) -> Result<BoxedFunction> {
        bind::create_bind_variable(ctx, position, name, kind)
    }

    /// Convert `function` to `to`, folding constant inputs.
    pub fn create_implicit_cast(
        &self,
        position: Span,
        function: BoxedFunction,
        to: ColumnType,
    ) -> Result<CastOutcome> {
        cast::create_implicit_cast(position, function, to)
    }

    /// Whether `name` has an overload taking no arguments.
    pub fn has_no_arg_function(&self, name: &str) -> bool {
        self.catalog.has_no_arg_function(name)
    }
}
