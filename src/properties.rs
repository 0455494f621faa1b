//! Logical properties derived for bound plan nodes.

use crate::expr::SlotRef;

/// The materialized output of a bound operator: its slot list in output
/// order. Derived eagerly once a node and all of its inputs are bound, so
/// slot ids increase in the order tables appear in the statement.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct LogicalProperty {
    output: Vec<SlotRef>,
}

impl LogicalProperty {
    pub fn new(output: Vec<SlotRef>) -> Self {
        Self { output }
    }

    pub fn output(&self) -> &[SlotRef] {
        &self.output
    }
}
