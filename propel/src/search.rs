//! Forced moves, choices and backtracking.
use partial_ref::{partial, PartialRef};

use log::debug;

use propel_rules::{Lit, Var};

use crate::context::{
    AssignmentP, Context, CountersP, FreeVarsP, RuleGraphP, SearchP, StatsP,
};
use crate::prop::{propagate, unpropagate, Color, TRIAL_COLOR};

/// One undoable entry of the search stack.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Step {
    /// A forced move: only this polarity of the literal's variable survived trial propagation.
    Fixed(Lit),
    /// A decision whose alternative is still untried: the negative literal is active.
    Choice(Var),
    /// A decision whose alternative has been taken: the positive literal is active.
    Alternative(Var),
}

/// Search state: the decision stack, the propagation color and the ordered variable hints.
///
/// The color is incremented on every push and decremented on every pop, so the entry on top of
/// the stack was always assigned with the current color.
#[derive(Default)]
pub struct Search {
    steps: Vec<Step>,
    color: Color,
    order: Vec<Var>,
}

impl Search {
    /// Reinitialize with an empty stack and the given ordered variable hints.
    pub fn reset(&mut self, order: Vec<Var>) {
        self.steps.clear();
        self.color = 1;
        self.order = order;
    }

    /// The current propagation color.
    pub fn color(&self) -> Color {
        self.color
    }

    /// The entry on top of the stack.
    fn top(&self) -> Option<Step> {
        self.steps.last().copied()
    }

    fn push(&mut self, step: Step) {
        self.steps.push(step);
    }

    fn advance(&mut self) -> Color {
        self.color += 1;
        self.color
    }

    /// Pop the top entry together with its color.
    fn retreat(&mut self) {
        self.color -= 1;
        let _ = self.steps.pop();
    }

    /// Turn the top `Choice` into an `Alternative` in place, keeping the color.
    fn flip_top(&mut self) {
        match self.steps.last_mut() {
            Some(step) => match *step {
                Step::Choice(var) => *step = Step::Alternative(var),
                _ => unreachable!("flip_top without a choice on top"),
            },
            None => unreachable!("flip_top on an empty stack"),
        }
    }
}

/// Fix every variable for which only one polarity survives trial propagation, until the free
/// variable count reaches a fixpoint.
///
/// Each still-free variable is tried in both polarities with the reserved trial color and
/// immediately undone. A variable with exactly one feasible polarity is propagated for real
/// under a fresh color and recorded as a [`Step::Fixed`] entry. Returns `false` as soon as a
/// variable with no feasible polarity is found; the caller then backtracks.
pub fn fix_forced_moves(
    mut ctx: partial!(
        Context,
        mut AssignmentP,
        mut CountersP,
        mut FreeVarsP,
        mut SearchP,
        mut StatsP,
        RuleGraphP,
    ),
) -> bool {
    let mut last_count = usize::max_value();
    while ctx.part(FreeVarsP).len() != last_count {
        last_count = ctx.part(FreeVarsP).len();

        // Propagation reorders the free set, so iterate over a snapshot.
        let snapshot: Vec<Var> = ctx.part(FreeVarsP).iter().collect();
        for var in snapshot {
            if !ctx.part(FreeVarsP).contains(var) {
                debug_assert!(!ctx.part(AssignmentP).var_is_free(var));
                continue;
            }
            debug_assert!(ctx.part(AssignmentP).var_is_free(var));

            let total_before = ctx.part(CountersP).total();
            let free_before = ctx.part(FreeVarsP).len();

            let pos = propagate(ctx.borrow(), var.positive(), TRIAL_COLOR, false);
            unpropagate(ctx.borrow(), var.positive(), TRIAL_COLOR, false);
            let neg = propagate(ctx.borrow(), var.negative(), TRIAL_COLOR, false);
            unpropagate(ctx.borrow(), var.negative(), TRIAL_COLOR, false);

            debug_assert_eq!(total_before, ctx.part(CountersP).total());
            debug_assert_eq!(free_before, ctx.part(FreeVarsP).len());

            match (pos, neg) {
                (true, false) => fix(ctx.borrow(), var.positive()),
                (false, true) => fix(ctx.borrow(), var.negative()),
                (false, false) => {
                    debug!("no feasible polarity for {}", var);
                    return false;
                }
                (true, true) => (),
            }
        }
    }
    true
}

/// Really propagate a forced literal and record it on the stack.
fn fix(
    mut ctx: partial!(
        Context,
        mut AssignmentP,
        mut CountersP,
        mut FreeVarsP,
        mut SearchP,
        mut StatsP,
        RuleGraphP,
    ),
    lit: Lit,
) {
    let color = ctx.part_mut(SearchP).advance();
    let success = propagate(ctx.borrow(), lit, color, true);
    assert!(success, "propagation failed on a move classified as forced");
    ctx.part_mut(SearchP).push(Step::Fixed(lit));
}

/// Search for the next solution.
///
/// State machine alternating between a forward pass (forced moves, then a fresh decision on the
/// front free variable, negative polarity first) and backtracking (undoing stack entries until a
/// decision with an untried alternative is found). Returns `true` with all variables assigned
/// when a solution is found, `false` when the stack is exhausted.
pub fn next_solution(
    mut ctx: partial!(
        Context,
        mut AssignmentP,
        mut CountersP,
        mut FreeVarsP,
        mut SearchP,
        mut StatsP,
        RuleGraphP,
    ),
) -> bool {
    // A full assignment means the previous call returned a solution; resume by backtracking.
    let mut backtrack = ctx.part(FreeVarsP).is_empty();

    loop {
        if backtrack {
            let step = match ctx.part(SearchP).top() {
                None => return false, // search exhausted
                Some(step) => step,
            };
            let color = ctx.part(SearchP).color();
            match step {
                Step::Fixed(lit) => {
                    unpropagate(ctx.borrow(), lit, color, true);
                    ctx.part_mut(SearchP).retreat();
                }
                Step::Choice(var) => {
                    ctx.part_mut(StatsP).choices += 1;
                    unpropagate(ctx.borrow(), var.negative(), color, true);
                    // Retry with the positive polarity under the same color, without popping.
                    ctx.part_mut(SearchP).flip_top();
                    let success = propagate(ctx.borrow(), var.positive(), color, true);
                    assert!(success, "propagating the alternative polarity failed");
                    debug!("alternative {} color {}", var, color);
                    if ctx.part(FreeVarsP).is_empty() {
                        return true;
                    }
                    backtrack = false;
                }
                Step::Alternative(var) => {
                    unpropagate(ctx.borrow(), var.positive(), color, true);
                    ctx.part_mut(SearchP).retreat();
                }
            }
        } else {
            if !fix_forced_moves(ctx.borrow()) {
                backtrack = true;
                continue;
            }
            if ctx.part(FreeVarsP).is_empty() {
                return true;
            }

            promote_ordered_hint(ctx.borrow());

            ctx.part_mut(StatsP).choices += 1;
            let var = match ctx.part(FreeVarsP).front() {
                Some(var) => var,
                None => unreachable!(),
            };
            ctx.part_mut(SearchP).push(Step::Choice(var));
            let color = ctx.part_mut(SearchP).advance();
            let success = propagate(ctx.borrow(), var.negative(), color, true);
            assert!(success, "propagating a fresh decision failed");
            debug!(
                "choice {} color {} free {}",
                var,
                color,
                ctx.part(FreeVarsP).len()
            );
            if ctx.part(FreeVarsP).is_empty() {
                return true;
            }
        }
    }
}

/// Move the first still-free ordered-hint variable to the front of the free set, so it becomes
/// the next decision variable.
fn promote_ordered_hint(mut ctx: partial!(Context, mut FreeVarsP, SearchP)) {
    let (search, mut ctx) = ctx.split_part(SearchP);
    let free_vars = ctx.part_mut(FreeVarsP);
    for &var in search.order.iter() {
        if free_vars.contains(var) {
            free_vars.move_to_front(var);
            break;
        }
    }
}
