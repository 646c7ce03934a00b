//! Problem simplification.
//!
//! Runs a single forced-move fixpoint over the problem, then rebuilds it: named bit-slices get
//! fresh literals, fixed anonymous literals are frozen to the canonical constants, duplicate
//! literals are removed from each rule side, and vacuous rules are dropped. Executed once before
//! the top-level solve.
use log::{debug, info};
use rustc_hash::FxHashSet;

use propel_rules::Lit;

use crate::problem::Problem;
use crate::solver::Solver;
use crate::word::Word;

/// Simplify a problem, remapping the given top-level word into the result.
pub fn simplify(problem: &Problem, top: &Word) -> (Problem, Word) {
    let mut solver = Solver::new(&problem.solver_rules());
    info!(
        "simplify: {} variables, {} rules",
        solver.var_count(),
        solver.rule_count()
    );

    let mut out = Problem::new(problem.config());

    if !solver.fix_forced_moves() {
        // No solutions: replace everything by a minimal contradiction.
        let true_lit = out.true_lit();
        let false_lit = out.false_lit();
        out.add_rule(&[false_lit], &[true_lit]);
        out.add_rule(&[true_lit], &[false_lit]);
        return (out, Word::from_lits(vec![false_lit]));
    }

    // Replacement for every old literal. Named slices stay variable even where the fixpoint
    // fixed them; their forcing rules are carried over and re-derive the values.
    let mut map: Vec<Option<Lit>> = vec![None; problem.var_count()];
    for number in problem.named_numbers() {
        let fresh = out.named_word(number);
        if let Some(old) = problem.lookup_word(number) {
            for (&old_lit, &new_lit) in old.lits().iter().zip(fresh.lits().iter()) {
                map[old_lit.index()] = Some(new_lit);
            }
        }
    }
    for index in 0..map.len() {
        if map[index].is_none() {
            let positive = Lit::from_index(index, true);
            let is_true = solver.lit_is_true(positive);
            let is_false = solver.lit_is_true(!positive);
            debug_assert!(
                !(is_true && is_false),
                "variable {} is fixed both ways",
                positive.var()
            );
            map[index] = Some(if is_true {
                out.true_lit()
            } else if is_false {
                out.false_lit()
            } else {
                out.fresh_lit()
            });
        }
    }
    let map: Vec<Lit> = map
        .into_iter()
        .map(|lit| lit.expect("every literal is mapped"))
        .collect();
    let map_lit = |lit: Lit| -> Lit {
        if lit.is_positive() {
            map[lit.index()]
        } else {
            !map[lit.index()]
        }
    };

    let new_top = Word::from_lits(top.lits().iter().map(|&lit| map_lit(lit)).collect());

    // Rewrite the rules under the mapping. Canonical-true literals are dropped from both sides,
    // duplicates within a side are removed (the counters cannot handle them), rules with a false
    // left-hand side are vacuous, and rules left with an empty side do nothing.
    let true_lit = out.true_lit();
    let false_lit = out.false_lit();
    let mut seen = FxHashSet::default();
    for rule in problem.rules().iter() {
        let mut lhs = vec![];
        seen.clear();
        for &lit in rule.lhs.iter() {
            let lit = map_lit(lit);
            if lit != true_lit && seen.insert(lit) {
                lhs.push(lit);
            }
        }
        let mut rhs = vec![];
        seen.clear();
        for &lit in rule.rhs.iter() {
            let lit = map_lit(lit);
            if lit != true_lit && seen.insert(lit) {
                rhs.push(lit);
            }
        }
        if lhs.contains(&false_lit) || lhs.is_empty() || rhs.is_empty() {
            continue;
        }
        out.add_rule(&lhs, &rhs);
    }

    debug!(
        "simplified to {} variables, {} rules",
        out.var_count(),
        out.rules().len()
    );
    (out, new_top)
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::config::Config;
    use crate::expr::ExprParser;
    use crate::lower::{lower, wrap_top_level};
    use crate::word;

    fn compile(source: &str, config: &Config) -> (Problem, Word) {
        let expr = ExprParser::new(source)
            .parse()
            .expect("parse error")
            .expect("empty input");
        let expr = wrap_top_level(expr);
        let mut problem = Problem::new(config);
        let top = lower(&expr, &mut problem).expect("lowering failed");
        (problem, top)
    }

    #[test]
    fn freezing_shrinks_constant_problems() {
        let config = Config {
            word_width: 5,
            ..Config::default()
        };
        let (problem, top) = compile("@ = 3 3", &config);
        let (simplified, _top) = simplify(&problem, &top);

        assert!(simplified.var_count() < problem.var_count());
        assert!(simplified.rules().len() < problem.rules().len());

        let mut solver = Solver::new(&simplified.solver_rules());
        assert!(solver.next_solution());
        assert!(!solver.next_solution());
    }

    #[test]
    fn duplicate_literals_are_removed() {
        // = a a builds equality gates fed the same literal twice, which would leave their rule
        // counters permanently short of zero.
        let config = Config {
            word_width: 4,
            ..Config::default()
        };
        let (problem, top) = compile("@ = a a", &config);

        let has_duplicate_side = |problem: &Problem| {
            problem.rules().iter().any(|rule| {
                let mut seen = FxHashSet::default();
                rule.lhs.iter().any(|&lit| !seen.insert(lit))
            })
        };
        assert!(has_duplicate_side(&problem));

        let (simplified, _top) = simplify(&problem, &top);
        assert!(!has_duplicate_side(&simplified));

        // Every value of a satisfies the constraint.
        let mut solver = Solver::new(&simplified.solver_rules());
        let mut values = vec![];
        while values.len() < 20 && solver.next_solution() {
            let a = simplified.lookup_word(97).expect("a is named");
            values.push(word::read_value(&solver, &a));
        }
        assert_eq!(values.len(), 16);
        assert_eq!(values[0], 0);
        for value in -8..8 {
            assert!(values.contains(&value), "missing {}", value);
        }
    }

    #[test]
    fn conflicts_become_trivially_unsatisfiable() {
        let config = Config {
            word_width: 4,
            ..Config::default()
        };
        let (problem, top) = compile("@ = 1 2", &config);
        let (simplified, _top) = simplify(&problem, &top);

        assert!(simplified.rules().len() <= 3);
        let mut solver = Solver::new(&simplified.solver_rules());
        assert!(!solver.next_solution());
    }

    #[test]
    fn named_variables_survive() {
        let config = Config {
            word_width: 4,
            ..Config::default()
        };
        let (problem, top) = compile("@ = a 5", &config);
        let (simplified, top) = simplify(&problem, &top);

        assert!(simplified.lookup_word(97).is_some());

        let mut solver = Solver::new(&simplified.solver_rules());
        assert!(solver.next_solution());
        let a = simplified.lookup_word(97).expect("a is named");
        assert_eq!(word::read_value(&solver, &a), 5);
        // The remapped top-level word reads 1, it was constrained to the true constant.
        assert_eq!(word::read_value(&solver, &top), 1);
        assert!(!solver.next_solution());
    }
}
