//! Iterative post-order traversal of expression trees.

use sqlfn_core::ExpressionNode;

/// Visit every node of `root` after all of its children, left to right.
///
/// Uses an explicit stack, so tree depth is bounded by memory rather than
/// the call stack. Stops at the first error.
pub fn traverse<'n, E>(
    root: &'n ExpressionNode,
    mut visit: impl FnMut(&'n ExpressionNode) -> Result<(), E>,
) -> Result<(), E> {
    let mut stack: Vec<(&'n ExpressionNode, bool)> = vec![(root, false)];
    while let Some((node, expanded)) = stack.pop() {
        if expanded || node.args.is_empty() {
            visit(node)?;
            continue;
        }
        stack.push((node, true));
        for child in node.args.iter().rev() {
            stack.push((child, false));
        }
    }
    Ok(())
}
