use crate::analyzer::{Analyzer, AnalyzerExpr};
use crate::rewrite::{RewriteAnalyzer, RewriteNodeId};
use crate::rules::{OptExpression, Pattern};

/// Matches a rule pattern against the plan graph rooted at one node,
/// producing the [`OptExpression`] handed to the rule.
pub(super) struct Binding<'a, 'b> {
    expr_handle: RewriteNodeId,
    pattern: &'a Pattern,
    analyzer: &'b RewriteAnalyzer,
}

impl<'a, 'b> Binding<'a, 'b> {
    pub(super) fn new(
        expr_handle: RewriteNodeId,
        pattern: &'a Pattern,
        analyzer: &'b RewriteAnalyzer,
    ) -> Self {
        Self {
            expr_handle,
            pattern,
            analyzer,
        }
    }

    pub(super) fn next(self) -> Option<OptExpression<RewriteAnalyzer>> {
        let expr = self.analyzer.expr_at(self.expr_handle);
        if !(self.pattern.predict)(expr.operator()) {
            return None;
        }

        if let Some(children) = &self.pattern.children {
            if expr.inputs_len(self.analyzer) != children.len() {
                return None;
            }

            let mut inputs = Vec::with_capacity(children.len());
            for idx in 0..expr.inputs_len(self.analyzer) {
                if let Some(opt_input) = Binding::new(
                    expr.input_at(idx, self.analyzer),
                    &children[idx],
                    self.analyzer,
                )
                .next()
                {
                    inputs.push(opt_input);
                } else {
                    return None;
                }
            }

            Some(OptExpression::with_expr_handle(self.expr_handle, inputs))
        } else {
            // Leaf pattern: expose the node's inputs as group handles.
            let current_node = self.analyzer.expr_at(self.expr_handle);
            let inputs = (0..current_node.inputs_len(self.analyzer))
                .map(|input_idx| current_node.input_at(input_idx, self.analyzer))
                .map(OptExpression::<RewriteAnalyzer>::with_group_handle)
                .collect::<Vec<OptExpression<RewriteAnalyzer>>>();
            Some(OptExpression::with_expr_handle(self.expr_handle, inputs))
        }
    }
}
