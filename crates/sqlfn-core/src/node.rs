//! Parsed expression tree input.
//!
//! Nodes are built by the SQL parser and are read-only to the resolver.

use std::sync::Arc;

use crate::span::Span;

/// What a node stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// A column reference.
    Literal,
    /// A literal constant token.
    Constant,
    /// `:name` or `$n`.
    BindVariable,
    /// A `.member` suffix, resolved as text.
    MemberAccess,
    /// An embedded subquery.
    Query,
    /// A function call.
    Function,
    /// An operator application.
    Operation,
}

/// An embedded subquery, compiled by an external query compiler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryModel {
    /// Subquery text or model identifier, interpreted by the compiler.
    pub text: String,
}

impl QueryModel {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

/// One node of a parsed expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpressionNode {
    pub kind: NodeKind,
    pub token: String,
    pub position: Span,
    /// Children in argument order.
    pub args: Vec<ExpressionNode>,
    pub query: Option<Arc<QueryModel>>,
}

impl ExpressionNode {
    pub fn new(kind: NodeKind, token: impl Into<String>, position: Span) -> Self {
        Self {
            kind,
            token: token.into(),
            position,
            args: Vec::new(),
            query: None,
        }
    }

    /// A column reference.
    pub fn literal(name: impl Into<String>) -> Self {
        Self::new(NodeKind::Literal, name, Span::default())
    }

    /// A constant token such as `123`, `'abc'` or `null`.
    pub fn constant(token: impl Into<String>) -> Self {
        Self::new(NodeKind::Constant, token, Span::default())
    }

    /// A bind variable token such as `$1` or `:name`.
    pub fn bind_variable(token: impl Into<String>) -> Self {
        Self::new(NodeKind::BindVariable, token, Span::default())
    }

    pub fn member_access(token: impl Into<String>) -> Self {
        Self::new(NodeKind::MemberAccess, token, Span::default())
    }

    pub fn function(name: impl Into<String>, args: Vec<ExpressionNode>) -> Self {
        let mut node = Self::new(NodeKind::Function, name, Span::default());
        node.args = args;
        node
    }

    /// A binary operator application.
    pub fn binary(op: impl Into<String>, left: ExpressionNode, right: ExpressionNode) -> Self {
        let mut node = Self::new(NodeKind::Operation, op, Span::default());
        node.args = vec![left, right];
        node
    }

    /// A unary operator application.
    pub fn unary(op: impl Into<String>, operand: ExpressionNode) -> Self {
        let mut node = Self::new(NodeKind::Operation, op, Span::default());
        node.args = vec![operand];
        node
    }

    pub fn query(model: QueryModel) -> Self {
        let mut node = Self::new(NodeKind::Query, "select", Span::default());
        node.query = Some(Arc::new(model));
        node
    }

    /// Set the position, builder style.
    pub fn at(mut self, offset: u32) -> Self {
        self.position = Span::new(offset, self.token.len() as u32);
        self
    }

    #[inline]
    pub fn arg_count(&self) -> usize {
        self.args.len()
    }

    /// Total number of nodes in this subtree.
    pub fn node_count(&self) -> usize {
        1 + self.args.iter().map(ExpressionNode::node_count).sum::<usize>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builders_set_kind_and_children() {
        let node = ExpressionNode::binary(
            "+",
            ExpressionNode::literal("a").at(0),
            ExpressionNode::constant("1").at(4),
        )
        .at(2);
        assert_eq!(node.kind, NodeKind::Operation);
        assert_eq!(node.arg_count(), 2);
        assert_eq!(node.position, Span::new(2, 1));
        assert_eq!(node.args[1].position, Span::new(4, 1));
        assert_eq!(node.node_count(), 3);
    }

    #[test]
    fn query_node_carries_model() {
        let node = ExpressionNode::query(QueryModel::new("select 1"));
        assert_eq!(node.kind, NodeKind::Query);
        assert_eq!(node.query.as_deref().map(|q| q.text.as_str()), Some("select 1"));
    }
}
