//! ## Background
//!
//! A statement analyzer turns the parser's output into a fully bound logical
//! plan. This crate implements the relation binding slice of that process:
//! every table reference the parser emits is an [`operator::UnboundRelation`]
//! leaf, and analysis replaces each one with a bound subtree resolved
//! against the catalog.
//!
//! Binding is driven the same way heuristic plan rewriting usually is: a
//! rule set is applied to the plan repeatedly until a fix point (plan no
//! longer changes) or an iteration cap. The bind rule resolves the dotted
//! name against the session's CTE scopes, table cache and catalog, then
//! synthesizes the scan variant for the table's storage kind. Native scans
//! may pick up an implicit delete-marker filter, views are expanded through
//! a recursive nested analysis pass, and CTE references become lightweight
//! consumer nodes sharing the already-analyzed body.
//!
//! Once no unresolved relation remains, one eager bottom-up pass
//! materializes each node's output schema. Output slot ids are allocated in
//! left-to-right table-appearance order, which later rewrite rules rely on.
//!
//! ## Design
//!
//! * [`rewrite`] Fixpoint rewrite analyzer implementation.
//! * [`rules`] Analysis rule definition and the relation bind rule.
//! * [`operator`] Relational operators.
//! * [`catalog`] Table metadata shapes and the catalog read interface.
//! * [`context`] Statement analysis context and id allocation.
//! * [`plan`] Immutable plan trees and explain output.
//! * [`stats`] Statistics collection job records.

#[macro_use]
extern crate lazy_static;

pub mod analyzer;
pub mod catalog;
pub mod context;
pub mod error;
pub mod expr;
pub mod operator;
pub mod parser;
pub mod plan;
pub mod properties;
pub mod rewrite;
pub mod rules;
pub mod session;
pub mod stats;
pub mod test_utils;
