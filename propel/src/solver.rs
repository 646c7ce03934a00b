//! Propagation solver over a fixed rule set.
use partial_ref::{IntoPartialRef, IntoPartialRefMut, PartialRef};

use log::debug;

use propel_rules::{Lit, RuleSet, Var};

use crate::context::{AssignmentP, Context, RuleGraphP, StatsP};
use crate::load::load_rules;
use crate::search;

/// A solver enumerating the satisfying assignments of a rule set.
///
/// The rule set is fixed at construction; to solve a modified problem a new solver must be
/// created. [`Solver::next_solution`] must be called at least once, to find the first solution or
/// to determine that there is none. While it returns `true` the current solution can be queried
/// with [`Solver::lit_is_true`].
pub struct Solver {
    ctx: Box<Context>,
}

impl Solver {
    /// Create a solver for a rule set.
    pub fn new(rules: &RuleSet) -> Solver {
        Solver::with_order(rules, vec![])
    }

    /// Like [`Solver::new`], but the listed variables are decided first, in list order.
    ///
    /// With the most significant bit of a number listed first this enumerates solutions with
    /// lower values of that number before higher ones.
    pub fn with_order(rules: &RuleSet, order: Vec<Var>) -> Solver {
        let mut solver = Solver {
            ctx: Box::new(Context::default()),
        };
        {
            let mut ctx = solver.ctx.into_partial_ref_mut();
            load_rules(ctx.borrow(), rules, order);
        }
        debug!(
            "loaded {} rules over {} variables",
            solver.rule_count(),
            solver.var_count()
        );
        solver
    }

    /// Search for the next solution.
    ///
    /// Returns `true` if a new solution was found and `false` when there are no more solutions.
    pub fn next_solution(&mut self) -> bool {
        let mut ctx = self.ctx.into_partial_ref_mut();
        search::next_solution(ctx.borrow())
    }

    /// Run one forced-move fixpoint without making any choices.
    ///
    /// Variables with a single feasible polarity are assigned; the rest stay free. Returns
    /// `false` if a variable with no feasible polarity was found, which means the rules are
    /// unsatisfiable.
    pub fn fix_forced_moves(&mut self) -> bool {
        let mut ctx = self.ctx.into_partial_ref_mut();
        search::fix_forced_moves(ctx.borrow())
    }

    /// Whether the literal is in the current solution.
    ///
    /// Meaningful only directly after a [`Solver::next_solution`] call that returned `true`, or
    /// after [`Solver::fix_forced_moves`] for the literals it fixed.
    pub fn lit_is_true(&self, lit: Lit) -> bool {
        let mut ctx = self.ctx.into_partial_ref();
        ctx.part(AssignmentP).lit_is_true(lit)
    }

    /// Whether neither polarity of the variable is currently assigned.
    pub fn var_is_free(&self, var: Var) -> bool {
        let mut ctx = self.ctx.into_partial_ref();
        ctx.part(AssignmentP).var_is_free(var)
    }

    /// Number of variables of the problem.
    pub fn var_count(&self) -> usize {
        let mut ctx = self.ctx.into_partial_ref();
        ctx.part(AssignmentP).var_count()
    }

    /// Number of rules of the problem.
    pub fn rule_count(&self) -> usize {
        let mut ctx = self.ctx.into_partial_ref();
        ctx.part(RuleGraphP).rule_count()
    }

    /// Total number of literal assignments performed so far.
    pub fn propagations(&self) -> u64 {
        let mut ctx = self.ctx.into_partial_ref();
        ctx.part(StatsP).propagations
    }

    /// Total number of decisions made so far.
    pub fn choices(&self) -> u64 {
        let mut ctx = self.ctx.into_partial_ref();
        ctx.part(StatsP).choices
    }
}
