//! Meta operators: sub-problems solved while lowering.
//!
//! Each of these opens a fresh [`Problem`], lowers its operand(s) there, enumerates solutions
//! with a temporary [`Solver`], and folds the outcome back into the parent problem. Parent and
//! child never share state; a sub-problem that turns out unsatisfiable folds a contradiction
//! into the parent.
use log::{debug, warn};

use propel_rules::Var;

use crate::expr::{BinaryOp, Expr};
use crate::lower::{lower, var_name, var_number, CompileError};
use crate::problem::Problem;
use crate::solver::Solver;
use crate::word::{self, Word};

/// `'`: constrain a fresh number to take one of the values the left side has over the solutions
/// of `right == 1`.
pub(crate) fn eval(problem: &mut Problem, lhs: &Expr, rhs: &Expr) -> Result<Word, CompileError> {
    debug!("solving subproblem for EVAL");
    let mut sub = Problem::new(problem.config());
    let left = lower(lhs, &mut sub)?;
    let right = lower(rhs, &mut sub)?;
    word::constrain_eq(&mut sub, &right, 1);

    let mut solver = Solver::new(&sub.solver_rules());

    let result = word::fresh(problem);
    // Seed the disjunction with "result is 0 and 1 at once": unsatisfiable on its own, so a
    // sub-problem without solutions poisons the parent.
    let zero = word::constant(problem, 0);
    let one = word::constant(problem, 1);
    let eq_zero = word::eq(problem, &result, &zero);
    let eq_one = word::eq(problem, &result, &one);
    let mut any = word::and(problem, &eq_one, &eq_zero);

    let max_solutions = problem.config().max_solutions;
    let mut count = 0;
    while solver.next_solution() {
        count += 1;
        if count > max_solutions {
            warn!(
                "subproblem has more than {} solutions, EVAL truncated",
                max_solutions
            );
            break;
        }
        let value = word::read_value(&solver, &left);
        let number = word::constant(problem, value);
        let equal = word::eq(problem, &result, &number);
        any = word::or(problem, &any, &equal);
    }

    word::constrain_eq(problem, &any, 1);
    Ok(result)
}

/// `#`: the number of solutions of the operand constrained to 1, as a constant capped at the
/// configured maximum.
pub(crate) fn count(problem: &mut Problem, operand: &Expr) -> Result<Word, CompileError> {
    debug!("solving subproblem for COUNT");
    let mut sub = Problem::new(problem.config());
    let left = lower(operand, &mut sub)?;
    word::constrain_eq(&mut sub, &left, 1);

    let mut solver = Solver::new(&sub.solver_rules());

    let max_solutions = problem.config().max_solutions;
    let mut solutions = 0;
    while solver.next_solution() {
        solutions += 1;
        if solutions > max_solutions {
            warn!(
                "subproblem has more than {} solutions, COUNT truncated",
                max_solutions
            );
            solutions = max_solutions;
            break;
        }
    }

    Ok(word::constant(problem, solutions as i64))
}

/// `_`: the least value of the left side over the solutions of `right == 1`, as a constant.
pub(crate) fn min(problem: &mut Problem, lhs: &Expr, rhs: &Expr) -> Result<Word, CompileError> {
    extremum(problem, lhs, rhs, false)
}

/// `$`: the greatest value of the left side over the solutions of `right == 1`, as a constant.
pub(crate) fn max(problem: &mut Problem, lhs: &Expr, rhs: &Expr) -> Result<Word, CompileError> {
    extremum(problem, lhs, rhs, true)
}

fn extremum(
    problem: &mut Problem,
    lhs: &Expr,
    rhs: &Expr,
    maximize: bool,
) -> Result<Word, CompileError> {
    debug!(
        "solving subproblem for {}",
        if maximize { "MAX" } else { "MIN" }
    );
    let mut sub = Problem::new(problem.config());
    let left = lower(lhs, &mut sub)?;
    let right = lower(rhs, &mut sub)?;
    word::constrain_eq(&mut sub, &right, 1);

    // Two's complement order is not the bit order the solver's negative-first enumeration
    // follows, so offset the objective into a plain binary number and order on its bits, most
    // significant first. For MAX the objective is mirrored by subtracting from the offset, which
    // needs one extra bit because the negative range is the larger one.
    let positive = if maximize {
        let mut lits = vec![sub.false_lit(), sub.true_lit()];
        for _ in 0..left.len() {
            lits.push(sub.true_lit());
        }
        let limit = Word::from_lits(lits);
        word::sub(&mut sub, &limit, &left)
    } else {
        let mut lits = vec![sub.false_lit()];
        for _ in 0..left.len() {
            lits.push(sub.true_lit());
        }
        let limit = Word::from_lits(lits);
        word::add(&mut sub, &left, &limit)
    };

    let mut order: Vec<Var> = vec![];
    for &lit in positive.lits().iter() {
        order.push(sub.lit_to_var(lit));
    }

    let mut solver = Solver::with_order(&sub.solver_rules(), order);

    if solver.next_solution() {
        let value = word::read_value(&solver, &left);
        Ok(word::constant(problem, value))
    } else {
        // No solutions: a literal fixed both ways poisons the parent.
        let lit = problem.fresh_lit();
        problem.constrain_true(lit);
        problem.constrain_false(lit);
        Ok(Word::from_lits(vec![lit]))
    }
}

/// `` ` ``: conjunction of copies of the left side, one per solution of `right == 1`, with every
/// resolved variable reference replaced by its value in that solution.
pub(crate) fn indirect(problem: &mut Problem, lhs: &Expr, rhs: &Expr) -> Result<Word, CompileError> {
    debug!("solving subproblem for IND");
    let mut sub = Problem::new(problem.config());
    let right = lower(rhs, &mut sub)?;
    word::constrain_eq(&mut sub, &right, 1);

    let mut solver = Solver::new(&sub.solver_rules());

    let mut folded = Expr::Num(1);
    let max_solutions = problem.config().max_solutions;
    let mut count = 0;
    while solver.next_solution() {
        count += 1;
        if count > max_solutions {
            warn!(
                "subproblem has more than {} solutions, IND truncated",
                max_solutions
            );
            break;
        }
        let replaced = substitute(lhs, &sub, &solver);
        folded = Expr::Binary(BinaryOp::And, Box::new(folded), Box::new(replaced));
    }

    debug!("indirection expands to {}", folded);
    lower(&folded, problem)
}

/// Copy of the expression with every resolved variable reference replaced by its solved value.
///
/// Plain variable references become variables named by the value; pointer references become the
/// value itself. Unallocated references are copied unchanged.
fn substitute(expr: &Expr, sub: &Problem, solver: &Solver) -> Expr {
    match expr {
        Expr::Var(name) => {
            if let Ok(number) = var_number(name) {
                if number >= 1 {
                    if let Some(slice) = sub.lookup_word(number as usize) {
                        let value = word::read_value(solver, &slice);
                        return Expr::Var(var_name(value));
                    }
                }
            }
            expr.clone()
        }
        Expr::Pointer(target) => {
            if let Expr::Num(number) = **target {
                if number >= 1 {
                    if let Some(slice) = sub.lookup_word(number as usize) {
                        let value = word::read_value(solver, &slice);
                        return Expr::Num(value);
                    }
                }
            }
            expr.clone()
        }
        Expr::Num(_) => expr.clone(),
        Expr::Unary(op, operand) => Expr::Unary(*op, Box::new(substitute(operand, sub, solver))),
        Expr::Binary(op, left, right) => Expr::Binary(
            *op,
            Box::new(substitute(left, sub, solver)),
            Box::new(substitute(right, sub, solver)),
        ),
        Expr::Meta(op, left, right) => Expr::Meta(
            *op,
            Box::new(substitute(left, sub, solver)),
            Box::new(substitute(right, sub, solver)),
        ),
        Expr::Count(operand) => Expr::Count(Box::new(substitute(operand, sub, solver))),
        Expr::Constrain(operand) => Expr::Constrain(Box::new(substitute(operand, sub, solver))),
    }
}
