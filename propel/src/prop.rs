//! Rule propagation.
pub mod assignment;
pub mod graph;

use partial_ref::{partial, PartialRef};

use propel_rules::Lit;

use crate::context::{AssignmentP, Context, CountersP, FreeVarsP, RuleGraphP, StatsP};

pub use assignment::{Assignment, Color, TRIAL_COLOR};
pub use graph::{Counters, RuleGraph, RuleIdx};

/// Assign a color to a literal and cascade through the rules.
///
/// A literal that already has a color is left alone. Assigning a literal decrements the counter
/// of every rule whose left-hand side contains it; a rule whose counter reaches zero fires,
/// forcing all of its right-hand side literals with the same color.
///
/// Returns `false` on conflict, i.e. when the opposite of a literal to assign is already in the
/// solution. The cascade stops there without unwinding; the caller restores the previous state by
/// calling [`unpropagate`] with the same literal, color and flag.
pub fn propagate(
    mut ctx: partial!(
        Context,
        mut AssignmentP,
        mut CountersP,
        mut FreeVarsP,
        mut StatsP,
        RuleGraphP,
    ),
    lit: Lit,
    color: Color,
    update_free: bool,
) -> bool {
    let (graph, mut ctx) = ctx.split_part(RuleGraphP);

    let mut pending = vec![lit];
    while let Some(lit) = pending.pop() {
        {
            let assignment = ctx.part_mut(AssignmentP);
            if assignment.color(lit) != 0 {
                continue;
            }
            if assignment.color(!lit) != 0 {
                return false;
            }
            assignment.set_color(lit, color);
        }
        ctx.part_mut(StatsP).propagations += 1;
        if update_free {
            ctx.part_mut(FreeVarsP).remove(lit.var());
        }

        // Decrement every counter before firing anything: a conflict deep in the cascade leaves
        // partially fired rules behind, and the symmetric increments of unpropagate only line up
        // when all counters of an assigned literal have been decremented.
        let counters = ctx.part_mut(CountersP);
        for &rule in graph.rules_of(lit) {
            counters.decrement(rule);
        }
        for &rule in graph.rules_of(lit) {
            if counters.value(rule) == 0 {
                pending.extend_from_slice(graph.rhs(rule));
            }
        }
    }

    true
}

/// Undo an assignment made by [`propagate`] with the same arguments.
///
/// Clears the literal only if its current color matches; otherwise the call is a no-op. Clearing
/// increments the counter of every rule fed by the literal, and a rule whose counter transitions
/// from 0 back to 1 unfires, recursively unassigning its right-hand side literals of the same
/// color.
pub fn unpropagate(
    mut ctx: partial!(
        Context,
        mut AssignmentP,
        mut CountersP,
        mut FreeVarsP,
        RuleGraphP,
    ),
    lit: Lit,
    color: Color,
    update_free: bool,
) {
    let (graph, mut ctx) = ctx.split_part(RuleGraphP);

    let mut pending = vec![lit];
    while let Some(lit) = pending.pop() {
        {
            let assignment = ctx.part_mut(AssignmentP);
            if assignment.color(lit) != color {
                continue;
            }
            assignment.clear(lit);
        }
        if update_free && !ctx.part(AssignmentP).lit_is_true(!lit) {
            ctx.part_mut(FreeVarsP).push_back(lit.var());
        }

        let counters = ctx.part_mut(CountersP);
        for &rule in graph.rules_of(lit) {
            if counters.increment(rule) == 1 {
                pending.extend_from_slice(graph.rhs(rule));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use partial_ref::IntoPartialRefMut;
    use propel_rules::{lit, rules, RuleSet, Var};
    use proptest::prelude::*;

    use crate::context::Context;
    use crate::load::load_rules;

    fn context_for(rules: &RuleSet) -> Box<Context> {
        let mut context = Box::<Context>::default();
        {
            let mut ctx = context.into_partial_ref_mut();
            load_rules(ctx.borrow(), rules, vec![]);
        }
        context
    }

    #[test]
    fn cascade_fires_chained_rules() {
        let rules = rules![
            1 => 2;
            2, 3 => 4;
        ];
        let mut context = context_for(&rules);
        let mut ctx = context.into_partial_ref_mut();

        assert!(propagate(ctx.borrow(), lit!(3), 1, true));
        assert!(propagate(ctx.borrow(), lit!(1), 2, true));

        let assignment = ctx.part(AssignmentP);
        assert!(assignment.lit_is_true(lit!(1)));
        assert!(assignment.lit_is_true(lit!(2)));
        assert!(assignment.lit_is_true(lit!(4)));
        assert_eq!(assignment.color(lit!(2)), 2);
        assert_eq!(assignment.color(lit!(4)), 2);
        assert_eq!(ctx.part(FreeVarsP).len(), 0);
        assert_eq!(ctx.part(CountersP).total(), 0);
    }

    #[test]
    fn conflict_is_recoverable() {
        let rules = rules![
            1 => 2;
            2 => -3;
        ];
        let mut context = context_for(&rules);
        let mut ctx = context.into_partial_ref_mut();

        assert!(propagate(ctx.borrow(), lit!(3), 1, true));
        assert!(!propagate(ctx.borrow(), lit!(1), 2, true));
        unpropagate(ctx.borrow(), lit!(1), 2, true);

        let assignment = ctx.part(AssignmentP);
        assert!(assignment.lit_is_true(lit!(3)));
        assert!(!assignment.lit_is_true(lit!(1)));
        assert!(!assignment.lit_is_true(lit!(2)));
        assert_eq!(ctx.part(FreeVarsP).len(), 2);
    }

    #[test]
    fn already_assigned_is_a_no_op() {
        let rules = rules![
            1 => 2;
        ];
        let mut context = context_for(&rules);
        let mut ctx = context.into_partial_ref_mut();

        assert!(propagate(ctx.borrow(), lit!(1), 1, true));
        let propagations = ctx.part(StatsP).propagations;
        assert!(propagate(ctx.borrow(), lit!(1), 2, true));
        assert_eq!(ctx.part(StatsP).propagations, propagations);
        assert_eq!(ctx.part(AssignmentP).color(lit!(1)), 1);
    }

    proptest! {
        #[test]
        fn propagate_unpropagate_is_identity(
            rules in propel_rules::rules::strategy::rule_set(1..20usize, 0..40, 0..4),
            lit in propel_rules::lit::strategy::lit(0..20usize),
        ) {
            prop_assume!(lit.index() < rules.var_count());

            let mut context = context_for(&rules);
            let mut ctx = context.into_partial_ref_mut();

            let total_before = ctx.part(CountersP).total();
            let free_before: Vec<Var> = ctx.part(FreeVarsP).iter().collect();

            let _ = propagate(ctx.borrow(), lit, 1, true);
            unpropagate(ctx.borrow(), lit, 1, true);

            prop_assert!(ctx.part(AssignmentP).all_free());
            prop_assert_eq!(ctx.part(CountersP).total(), total_before);
            prop_assert_eq!(ctx.part(FreeVarsP).len(), free_before.len());
            for var in free_before {
                prop_assert!(ctx.part(FreeVarsP).contains(var));
            }
        }

        #[test]
        fn nested_propagation_unwinds_to_empty(
            rules in propel_rules::rules::strategy::rule_set(1..15usize, 0..30, 0..4),
            lits in proptest::collection::vec(propel_rules::lit::strategy::lit(0..15usize), 1..6),
        ) {
            for lit in lits.iter() {
                prop_assume!(lit.index() < rules.var_count());
            }

            let mut context = context_for(&rules);
            let mut ctx = context.into_partial_ref_mut();
            let total_before = ctx.part(CountersP).total();

            let mut color = 0;
            let mut assigned = vec![];
            for &lit in lits.iter() {
                color += 1;
                if propagate(ctx.borrow(), lit, color, true) {
                    assigned.push((lit, color));
                } else {
                    unpropagate(ctx.borrow(), lit, color, true);
                    color -= 1;
                }
            }

            for &(lit, color) in assigned.iter().rev() {
                unpropagate(ctx.borrow(), lit, color, true);
            }

            prop_assert!(ctx.part(AssignmentP).all_free());
            prop_assert_eq!(ctx.part(CountersP).total(), total_before);
            prop_assert_eq!(ctx.part(FreeVarsP).len(), rules.var_count());
        }
    }
}
