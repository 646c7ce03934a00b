//! Boolean gate emission.
//!
//! Each gate allocates one fresh output literal and a cluster of rules enforcing its truth table
//! in both directions, forward and contrapositive, so that forced-move trials can settle a gate
//! from any side.
use propel_rules::{Lit, Var};

use crate::problem::Problem;

impl Problem {
    /// Fresh variable constrained to the negation of a literal.
    ///
    /// Only needed where a result must be a variable rather than a negative literal, e.g. in an
    /// ordered-hint list.
    pub fn not_gate(&mut self, lit: Lit) -> Lit {
        let out = self.fresh_lit();
        self.add_rule(&[out], &[!lit]);
        self.add_rule(&[!out], &[lit]);
        self.add_rule(&[lit], &[!out]);
        self.add_rule(&[!lit], &[out]);
        out
    }

    /// The literal's variable, routing negative literals through a [`Problem::not_gate`].
    pub fn lit_to_var(&mut self, lit: Lit) -> Var {
        if lit.is_negative() {
            self.not_gate(lit).var()
        } else {
            lit.var()
        }
    }

    /// `out = l AND r`.
    pub fn and_gate(&mut self, l: Lit, r: Lit) -> Lit {
        let out = self.fresh_lit();
        self.add_rule(&[l, r], &[out]);
        self.add_rule(&[!l], &[!out]);
        self.add_rule(&[!r], &[!out]);
        self.add_rule(&[out], &[l, r]);
        self.add_rule(&[!out, l], &[!r]);
        self.add_rule(&[!out, r], &[!l]);
        out
    }

    /// `out = l OR r`.
    pub fn or_gate(&mut self, l: Lit, r: Lit) -> Lit {
        let out = self.fresh_lit();
        self.add_rule(&[!l, !r], &[!out]);
        self.add_rule(&[l], &[out]);
        self.add_rule(&[r], &[out]);
        self.add_rule(&[!out], &[!l, !r]);
        self.add_rule(&[out, !l], &[r]);
        self.add_rule(&[out, !r], &[l]);
        out
    }

    /// `out = l XOR r`.
    pub fn xor_gate(&mut self, l: Lit, r: Lit) -> Lit {
        let out = self.fresh_lit();
        self.add_rule(&[!l, !r], &[!out]);
        self.add_rule(&[!l, r], &[out]);
        self.add_rule(&[l, r], &[!out]);
        self.add_rule(&[l, !r], &[out]);
        self.add_rule(&[!out, !l], &[!r]);
        self.add_rule(&[!out, !r], &[!l]);
        self.add_rule(&[!out, l], &[r]);
        self.add_rule(&[!out, r], &[l]);
        self.add_rule(&[out, !l], &[r]);
        self.add_rule(&[out, !r], &[l]);
        self.add_rule(&[out, l], &[!r]);
        self.add_rule(&[out, r], &[!l]);
        out
    }

    /// `out = (l == r)`.
    pub fn eq_gate(&mut self, l: Lit, r: Lit) -> Lit {
        let out = self.fresh_lit();
        self.add_rule(&[l, r], &[out]);
        self.add_rule(&[!l, !r], &[out]);
        self.add_rule(&[l, !r], &[!out]);
        self.add_rule(&[!l, r], &[!out]);
        self.add_rule(&[out, l], &[r]);
        self.add_rule(&[out, !l], &[!r]);
        self.add_rule(&[out, r], &[l]);
        self.add_rule(&[out, !r], &[!l]);
        self.add_rule(&[!out, l], &[!r]);
        self.add_rule(&[!out, !l], &[r]);
        self.add_rule(&[!out, r], &[!l]);
        self.add_rule(&[!out, !r], &[l]);
        out
    }

    /// `out = (l IMPLIES r)`.
    pub fn impl_gate(&mut self, l: Lit, r: Lit) -> Lit {
        let out = self.fresh_lit();
        self.add_rule(&[!l], &[out]);
        self.add_rule(&[l, r], &[out]);
        self.add_rule(&[l, !r], &[!out]);
        self.add_rule(&[out, l], &[r]);
        self.add_rule(&[!out], &[l, !r]);
        out
    }

    /// One bit of a ripple-carry adder; returns `(sum, carry_out)`.
    pub fn full_adder(&mut self, a: Lit, b: Lit, carry_in: Lit) -> (Lit, Lit) {
        let only_a = {
            let inner = self.and_gate(!b, !carry_in);
            self.and_gate(a, inner)
        };
        let only_b = {
            let inner = self.and_gate(!a, !carry_in);
            self.and_gate(b, inner)
        };
        let only_carry = {
            let inner = self.and_gate(!a, !b);
            self.and_gate(carry_in, inner)
        };
        let all_three = {
            let inner = self.and_gate(b, carry_in);
            self.and_gate(a, inner)
        };
        let sum = {
            let tail = self.or_gate(only_carry, all_three);
            let tail = self.or_gate(only_b, tail);
            self.or_gate(only_a, tail)
        };
        let carry_out = {
            let ab = self.and_gate(a, b);
            let ac = self.and_gate(a, carry_in);
            let cb = self.and_gate(carry_in, b);
            let tail = self.or_gate(ac, cb);
            self.or_gate(ab, tail)
        };
        (sum, carry_out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::config::Config;
    use crate::solver::Solver;

    /// Enumerate all solutions and report the observed value rows of the given literals.
    fn truth_table(problem: &Problem, lits: &[Lit]) -> Vec<Vec<bool>> {
        let mut solver = Solver::new(&problem.solver_rules());
        let mut rows = vec![];
        while solver.next_solution() {
            rows.push(lits.iter().map(|&lit| solver.lit_is_true(lit)).collect());
            assert!(rows.len() <= 64, "runaway enumeration");
        }
        rows.sort();
        rows
    }

    fn two_input_gate(gate: impl Fn(&mut Problem, Lit, Lit) -> Lit) -> Vec<Vec<bool>> {
        let mut problem = Problem::new(&Config::default());
        let l = problem.fresh_lit();
        let r = problem.fresh_lit();
        let out = gate(&mut problem, l, r);
        truth_table(&problem, &[l, r, out])
    }

    #[test]
    fn and_gate_truth_table() {
        assert_eq!(
            two_input_gate(|problem, l, r| problem.and_gate(l, r)),
            vec![
                vec![false, false, false],
                vec![false, true, false],
                vec![true, false, false],
                vec![true, true, true],
            ]
        );
    }

    #[test]
    fn or_gate_truth_table() {
        assert_eq!(
            two_input_gate(|problem, l, r| problem.or_gate(l, r)),
            vec![
                vec![false, false, false],
                vec![false, true, true],
                vec![true, false, true],
                vec![true, true, true],
            ]
        );
    }

    #[test]
    fn xor_gate_truth_table() {
        assert_eq!(
            two_input_gate(|problem, l, r| problem.xor_gate(l, r)),
            vec![
                vec![false, false, false],
                vec![false, true, true],
                vec![true, false, true],
                vec![true, true, false],
            ]
        );
    }

    #[test]
    fn eq_gate_truth_table() {
        assert_eq!(
            two_input_gate(|problem, l, r| problem.eq_gate(l, r)),
            vec![
                vec![false, false, true],
                vec![false, true, false],
                vec![true, false, false],
                vec![true, true, true],
            ]
        );
    }

    #[test]
    fn impl_gate_truth_table() {
        assert_eq!(
            two_input_gate(|problem, l, r| problem.impl_gate(l, r)),
            vec![
                vec![false, false, true],
                vec![false, true, true],
                vec![true, false, false],
                vec![true, true, true],
            ]
        );
    }

    #[test]
    fn not_gate_negates() {
        let mut problem = Problem::new(&Config::default());
        let input = problem.fresh_lit();
        let out = problem.not_gate(input);
        assert_eq!(
            truth_table(&problem, &[input, out]),
            vec![vec![false, true], vec![true, false]]
        );
    }

    #[test]
    fn full_adder_truth_table() {
        let mut problem = Problem::new(&Config::default());
        let a = problem.fresh_lit();
        let b = problem.fresh_lit();
        let c = problem.fresh_lit();
        let (sum, carry) = problem.full_adder(a, b, c);

        for row in truth_table(&problem, &[a, b, c, sum, carry]) {
            let total = row[0] as u8 + row[1] as u8 + row[2] as u8;
            assert_eq!(row[3], total & 1 == 1);
            assert_eq!(row[4], total >= 2);
        }
    }
}
