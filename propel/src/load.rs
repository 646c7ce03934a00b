//! Loading a rule set into the solver context.
use partial_ref::{partial, PartialRef};

use propel_rules::{RuleSet, Var};

use crate::context::{
    AssignmentP, Context, CountersP, FreeVarsP, RuleGraphP, SearchP, StatsP,
};
use crate::ordered_set::OrderedVarSet;
use crate::prop::RuleGraph;
use crate::stats::Stats;

/// Initialize every part of the context from an immutable rule set.
///
/// The variable count is the highest variable occurring in the rules; all variables start free.
pub fn load_rules(
    mut ctx: partial!(
        Context,
        mut AssignmentP,
        mut CountersP,
        mut FreeVarsP,
        mut RuleGraphP,
        mut SearchP,
        mut StatsP,
    ),
    rules: &RuleSet,
    order: Vec<Var>,
) {
    let var_count = rules.var_count();
    let graph = RuleGraph::build(rules);

    ctx.part_mut(AssignmentP).set_var_count(var_count);
    ctx.part_mut(CountersP).reset(&graph);
    *ctx.part_mut(RuleGraphP) = graph;
    *ctx.part_mut(FreeVarsP) = OrderedVarSet::with_all_vars(var_count);
    ctx.part_mut(SearchP).reset(order);
    *ctx.part_mut(StatsP) = Stats::default();
}
