//! Fixpoint rewrite analyzer.
//!
//! The analyzer repeatedly matches rule patterns against a plan graph and
//! substitutes rule output until the plan no longer changes (or an
//! iteration cap is hit), then materializes output properties bottom-up.
//! The implementation is the classic heuristic-planner shape: plans live in
//! a petgraph graph so a subtree can be replaced by redirecting parent
//! edges, and rules stay oblivious to the iteration strategy.

mod driver;
pub use driver::*;
mod graph;
pub use graph::*;
mod binding;
