//! Central solver data structure.
//!
//! This module defines the `Context` data structure which holds all data used by the solver.
use partial_ref::{part, PartialRefTarget};

use crate::ordered_set::OrderedVarSet;
use crate::prop::{Assignment, Counters, RuleGraph};
use crate::search::Search;
use crate::stats::Stats;

/// Part declarations for the [`Context`] struct.
pub mod parts {
    use super::*;

    part!(pub AssignmentP: Assignment);
    part!(pub CountersP: Counters);
    part!(pub FreeVarsP: OrderedVarSet);
    part!(pub RuleGraphP: RuleGraph);
    part!(pub SearchP: Search);
    part!(pub StatsP: Stats);
}

pub use parts::*;

/// Central solver data structure.
///
/// This struct contains all data kept by the solver. Functions operating on multiple fields of
/// the context use partial references provided by the `partial_ref` crate. This documents the
/// data dependencies and makes the borrow checker happy without the overhead of passing
/// individual references.
#[derive(PartialRefTarget, Default)]
pub struct Context {
    #[part(AssignmentP)]
    pub assignment: Assignment,
    #[part(CountersP)]
    pub counters: Counters,
    #[part(FreeVarsP)]
    pub free_vars: OrderedVarSet,
    #[part(RuleGraphP)]
    pub rule_graph: RuleGraph,
    #[part(SearchP)]
    pub search: Search,
    #[part(StatsP)]
    pub stats: Stats,
}
