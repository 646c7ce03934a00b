//! Fixed-width two's complement numbers as literal slices.
//!
//! A number is an ordered list of literals, most significant bit first, with the first literal as
//! the sign bit. Constants are built from the problem's canonical true/false pair; zero gets two
//! bits so that numeric NOT (invert the value bits, keep the sign) stays well defined. Operands
//! of different widths are sign extended before combining.
use propel_rules::Lit;

use crate::problem::Problem;
use crate::solver::Solver;

/// A number as a list of literals, most significant bit first.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Word {
    lits: Vec<Lit>,
}

impl Word {
    /// A word over the given literals, most significant first.
    pub fn from_lits(lits: Vec<Lit>) -> Word {
        Word { lits }
    }

    /// The literals of the word.
    pub fn lits(&self) -> &[Lit] {
        &self.lits
    }

    /// Number of bits.
    pub fn len(&self) -> usize {
        self.lits.len()
    }

    /// Whether the word has no bits. The empty word is a valid zero-width accumulator.
    pub fn is_empty(&self) -> bool {
        self.lits.is_empty()
    }

    /// The sign literal, or the canonical false for the empty word.
    fn sign(&self, problem: &Problem) -> Lit {
        self.lits.first().copied().unwrap_or_else(|| problem.false_lit())
    }

    fn set_lit(&mut self, index: usize, lit: Lit) {
        self.lits[index] = lit;
    }
}

/// A constant, built from the canonical true/false literals.
pub fn constant(problem: &Problem, value: i64) -> Word {
    let mut lits = vec![];
    if value == 0 {
        // Two bits, so the value part is nonempty.
        lits.push(problem.false_lit());
        lits.push(problem.false_lit());
    } else if value > 0 {
        let mut value = value;
        while value != 0 {
            lits.push(if value & 1 == 1 {
                problem.true_lit()
            } else {
                problem.false_lit()
            });
            value >>= 1;
        }
        lits.push(problem.false_lit());
        lits.reverse();
    } else {
        // Two's complement: invert the bits of the absolute value minus one.
        let mut value = -(value + 1);
        while value != 0 {
            lits.push(if value & 1 == 1 {
                problem.false_lit()
            } else {
                problem.true_lit()
            });
            value >>= 1;
        }
        lits.push(problem.true_lit());
        lits.reverse();
    }
    Word::from_lits(lits)
}

/// A fresh unconstrained word of the configured width.
pub fn fresh(problem: &mut Problem) -> Word {
    let width = problem.config().word_width;
    Word::from_lits((0..width).map(|_| problem.fresh_lit()).collect())
}

/// The signed value of the word in the solver's current solution.
pub fn read_value(solver: &Solver, word: &Word) -> i64 {
    let mut lits = word.lits().iter();
    let negative = match lits.next() {
        Some(&sign) => solver.lit_is_true(sign),
        None => false,
    };
    let mut number: i64 = 0;
    if negative {
        for &lit in lits {
            number <<= 1;
            if !solver.lit_is_true(lit) {
                number += 1;
            }
        }
        -(number + 1)
    } else {
        for &lit in lits {
            number <<= 1;
            if solver.lit_is_true(lit) {
                number += 1;
            }
        }
        number
    }
}

/// Every bit inverted, sign included: the two's complement `x ↦ −x − 1`.
pub fn invert(word: &Word) -> Word {
    Word::from_lits(word.lits().iter().map(|&lit| !lit).collect())
}

/// The word plus one, at the same width; incrementing the maximum value wraps around.
pub fn increment(problem: &mut Problem, word: &Word) -> Word {
    let false_lit = problem.false_lit();
    let mut carry = problem.true_lit();
    let mut lits = vec![];
    for &lit in word.lits().iter().rev() {
        let (sum, carry_out) = problem.full_adder(lit, false_lit, carry);
        lits.push(sum);
        carry = carry_out;
    }
    lits.reverse();
    Word::from_lits(lits)
}

/// Two's complement negation: invert and add one.
pub fn negate(problem: &mut Problem, word: &Word) -> Word {
    let inverted = invert(word);
    increment(problem, &inverted)
}

/// The word at the given width, with the sign bit replicated in front of the value bits.
pub fn sign_extend(problem: &Problem, word: &Word, size: usize) -> Word {
    debug_assert!(size + 1 >= word.len());
    let sign = word.sign(problem);
    let value = if word.is_empty() {
        &[][..]
    } else {
        &word.lits()[1..]
    };
    let mut lits = Vec::with_capacity(size);
    for _ in value.len()..size {
        lits.push(sign);
    }
    lits.extend_from_slice(value);
    Word::from_lits(lits)
}

/// Both operands sign extended to a common width.
fn align(problem: &Problem, left: &Word, right: &Word) -> (Word, Word) {
    let size = left.len().max(right.len());
    (
        sign_extend(problem, left, size),
        sign_extend(problem, right, size),
    )
}

/// Two-bit `00`/`01` slice that is 1 exactly when the operands are equal.
pub fn eq(problem: &mut Problem, left: &Word, right: &Word) -> Word {
    let (left, right) = align(problem, left, right);
    let mut all = problem.true_lit();
    for (&l, &r) in left.lits().iter().zip(right.lits().iter()) {
        let bit_eq = problem.eq_gate(l, r);
        all = problem.and_gate(bit_eq, all);
    }
    Word::from_lits(vec![problem.false_lit(), all])
}

/// Two-bit `00`/`01` slice that is 1 exactly when every left bit implies its right bit.
pub fn implies(problem: &mut Problem, left: &Word, right: &Word) -> Word {
    let (left, right) = align(problem, left, right);
    let mut all = problem.true_lit();
    for (&l, &r) in left.lits().iter().zip(right.lits().iter()) {
        let bit_impl = problem.impl_gate(l, r);
        all = problem.and_gate(bit_impl, all);
    }
    Word::from_lits(vec![problem.false_lit(), all])
}

/// Bitwise AND.
pub fn and(problem: &mut Problem, left: &Word, right: &Word) -> Word {
    let (left, right) = align(problem, left, right);
    let lits = left
        .lits()
        .iter()
        .zip(right.lits().iter())
        .map(|(&l, &r)| problem.and_gate(l, r))
        .collect();
    Word::from_lits(lits)
}

/// Bitwise OR.
pub fn or(problem: &mut Problem, left: &Word, right: &Word) -> Word {
    let (left, right) = align(problem, left, right);
    let lits = left
        .lits()
        .iter()
        .zip(right.lits().iter())
        .map(|(&l, &r)| problem.or_gate(l, r))
        .collect();
    Word::from_lits(lits)
}

/// Bitwise XOR.
pub fn xor(problem: &mut Problem, left: &Word, right: &Word) -> Word {
    let (left, right) = align(problem, left, right);
    let lits = left
        .lits()
        .iter()
        .zip(right.lits().iter())
        .map(|(&l, &r)| problem.xor_gate(l, r))
        .collect();
    Word::from_lits(lits)
}

/// Numeric NOT: invert the value bits, keep the sign, so `!0 = 1` and `!1 = 0`.
pub fn not(word: &Word) -> Word {
    let mut lits = word.lits().to_vec();
    for lit in lits.iter_mut().skip(1) {
        *lit = !*lit;
    }
    Word::from_lits(lits)
}

/// Ripple-carry addition with one extra bit of overflow room.
pub fn add(problem: &mut Problem, left: &Word, right: &Word) -> Word {
    let size = left.len().max(right.len()) + 1;
    let left = sign_extend(problem, left, size);
    let right = sign_extend(problem, right, size);
    let false_lit = problem.false_lit();
    let mut carry = false_lit;
    let mut lits = vec![];
    for (&l, &r) in left.lits().iter().rev().zip(right.lits().iter().rev()) {
        let (sum, carry_out) = problem.full_adder(l, r, carry);
        lits.push(sum);
        carry = carry_out;
    }
    lits.reverse();
    Word::from_lits(lits)
}

/// `left − right` as `left + (−right)`.
pub fn sub(problem: &mut Problem, left: &Word, right: &Word) -> Word {
    let negated = negate(problem, right);
    add(problem, left, &negated)
}

/// The word doubled by appending a false bit at the least significant end; the width grows.
pub fn shift_left(problem: &Problem, word: &Word) -> Word {
    let mut lits = word.lits().to_vec();
    lits.push(problem.false_lit());
    Word::from_lits(lits)
}

/// Bitwise `if selector { left } else { right }`.
pub fn select(problem: &mut Problem, selector: Lit, left: &Word, right: &Word) -> Word {
    let (left, right) = align(problem, left, right);
    let mut lits = vec![];
    for (&l, &r) in left.lits().iter().zip(right.lits().iter()) {
        let on_true = problem.and_gate(selector, l);
        let on_false = problem.and_gate(!selector, r);
        lits.push(problem.or_gate(on_true, on_false));
    }
    Word::from_lits(lits)
}

/// The absolute value: the negation when the sign bit is set, the word itself otherwise.
pub fn abs(problem: &mut Problem, word: &Word) -> Word {
    let sign = word.sign(problem);
    let negated = negate(problem, word);
    select(problem, sign, &negated, word)
}

/// The word negated exactly when its sign differs from the requested sign literal.
pub fn apply_sign(problem: &mut Problem, sign: Lit, word: &Word) -> Word {
    let word_sign = word.sign(problem);
    let flip = problem.xor_gate(sign, word_sign);
    let negated = negate(problem, word);
    select(problem, flip, &negated, word)
}

/// Shift-and-add multiplication, bottom multiplier bit first. Only correct for non-negative
/// operands.
fn mul_abs(problem: &mut Problem, left: &Word, right: &Word) -> Word {
    let mut result = Word::default();
    let mut shifted = left.clone();
    for &bit in right.lits().iter().rev() {
        let added = add(problem, &result, &shifted);
        result = select(problem, bit, &added, &result);
        shifted = shift_left(problem, &shifted);
    }
    result
}

/// Signed multiplication.
///
/// Multiplies the absolute values and fixes up the sign afterwards. The direct signed
/// shift-and-add admits no solutions for `0 · −1`, so the absolute-value dispatch is load
/// bearing, not an optimization.
pub fn mul(problem: &mut Problem, left: &Word, right: &Word) -> Word {
    let left_abs = abs(problem, left);
    let right_abs = abs(problem, right);
    let product = mul_abs(problem, &left_abs, &right_abs);
    let left_sign = left.sign(problem);
    let right_sign = right.sign(problem);
    let sign = problem.xor_gate(left_sign, right_sign);
    apply_sign(problem, sign, &product)
}

/// Two-bit `00`/`01` slice that is 1 exactly when `left >= right`: the negated sign of the
/// difference.
pub fn ge(problem: &mut Problem, left: &Word, right: &Word) -> Word {
    let difference = sub(problem, left, right);
    let sign = difference.sign(problem);
    Word::from_lits(vec![problem.false_lit(), !sign])
}

/// Two-bit `00`/`01` slice that is 1 exactly when `left < right`, assembled as
/// `right >= left AND NOT right == left`.
pub fn lt(problem: &mut Problem, left: &Word, right: &Word) -> Word {
    let at_most = ge(problem, right, left);
    let equal = eq(problem, right, left);
    let not_equal = not(&equal);
    and(problem, &at_most, &not_equal)
}

/// Binary long division, most significant numerator bit first. Only correct for non-negative
/// operands. A zero divisor is constrained unsatisfiable.
fn div_abs(problem: &mut Problem, numerator: &Word, divisor: &Word) -> Word {
    let zero = constant(problem, 0);
    let mut quotient = sign_extend(problem, &zero, numerator.len());
    let mut remainder = sign_extend(problem, &zero, numerator.len());

    let divisor_zero = eq(problem, divisor, &zero);
    problem.constrain_false(divisor_zero.lits()[1]);

    for index in 1..numerator.len() {
        // Shift the next numerator bit into the remainder.
        remainder = shift_left(problem, &remainder);
        let last = remainder.len() - 1;
        remainder.set_lit(last, numerator.lits()[index]);
        // Subtract the divisor where it fits and record that as the quotient bit.
        let subtracted = sub(problem, &remainder, divisor);
        let below = lt(problem, &remainder, divisor);
        let not_below = not(&below);
        let fits = not_below.lits()[1];
        remainder = select(problem, fits, &subtracted, &remainder);
        quotient.set_lit(index, fits);
    }

    quotient
}

/// Signed truncating division. Division by zero admits no solutions.
pub fn div(problem: &mut Problem, left: &Word, right: &Word) -> Word {
    let left_sign = left.sign(problem);
    let right_sign = right.sign(problem);
    let numerator = abs(problem, left);
    let divisor = abs(problem, right);
    let quotient = div_abs(problem, &numerator, &divisor);
    let sign = problem.xor_gate(left_sign, right_sign);
    apply_sign(problem, sign, &quotient)
}

/// `left − (left / right) · right`; with truncating division this is the modulus the original
/// identity defines.
pub fn rem(problem: &mut Problem, left: &Word, right: &Word) -> Word {
    let quotient = div(problem, left, right);
    let product = mul(problem, &quotient, right);
    sub(problem, left, &product)
}

/// Constrain the word to equal the constant.
pub fn constrain_eq(problem: &mut Problem, word: &Word, value: i64) {
    let number = constant(problem, value);
    let equal = eq(problem, word, &number);
    let lits = equal.lits().to_vec();
    for &lit in &lits[..lits.len() - 1] {
        problem.constrain_false(lit);
    }
    problem.constrain_true(lits[lits.len() - 1]);
}

#[cfg(test)]
mod tests {
    use super::*;

    use proptest::prelude::*;

    use crate::config::Config;

    fn small_config() -> Config {
        Config {
            word_width: 5,
            ..Config::default()
        }
    }

    /// Lower `op` over constants, constrain nothing else, solve, and read the result back.
    fn evaluate(op: impl FnOnce(&mut Problem) -> Word) -> Option<i64> {
        let mut problem = Problem::new(&small_config());
        let word = op(&mut problem);
        let mut solver = Solver::new(&problem.solver_rules());
        if solver.next_solution() {
            Some(read_value(&solver, &word))
        } else {
            None
        }
    }

    #[test]
    fn add_constants() {
        for &(a, b) in &[(0, 0), (1, 2), (7, 9), (-3, 5), (-3, -8), (100, -100)] {
            let sum = evaluate(|problem| {
                let left = constant(problem, a);
                let right = constant(problem, b);
                add(problem, &left, &right)
            });
            assert_eq!(sum, Some(a + b), "{} + {}", a, b);
        }
    }

    #[test]
    fn negate_constants() {
        for &a in &[0, 1, 5, -3, 12, -13] {
            let negated = evaluate(|problem| {
                let word = constant(problem, a);
                negate(problem, &word)
            });
            assert_eq!(negated, Some(-a), "-({})", a);
        }
    }

    #[test]
    fn multiply_constants() {
        for &(a, b) in &[(0, 0), (3, 5), (7, -6), (-3, -8), (0, -1), (-1, 0), (11, 1)] {
            let product = evaluate(|problem| {
                let left = constant(problem, a);
                let right = constant(problem, b);
                mul(problem, &left, &right)
            });
            assert_eq!(product, Some(a * b), "{} * {}", a, b);
        }
    }

    #[test]
    fn divide_constants() {
        for &(a, b) in &[(7, 2), (-7, 2), (6, 3), (9, 10), (0, 5)] {
            let quotient = evaluate(|problem| {
                let left = constant(problem, a);
                let right = constant(problem, b);
                div(problem, &left, &right)
            });
            assert_eq!(quotient, Some(a / b), "{} / {}", a, b);
        }
    }

    #[test]
    fn divide_by_zero_is_unsatisfiable() {
        let quotient = evaluate(|problem| {
            let left = constant(problem, 7);
            let right = constant(problem, 0);
            div(problem, &left, &right)
        });
        assert_eq!(quotient, None);
    }

    #[test]
    fn modulus_constants() {
        for &(a, b, expected) in &[(7, 2, 1), (-7, 2, -1), (6, 3, 0), (5, 7, 5)] {
            let modulus = evaluate(|problem| {
                let left = constant(problem, a);
                let right = constant(problem, b);
                rem(problem, &left, &right)
            });
            assert_eq!(modulus, Some(expected), "{} % {}", a, b);
        }
    }

    #[test]
    fn comparisons() {
        for &(a, b) in &[(1, 2), (2, 1), (2, 2), (-5, 3), (3, -5), (-5, -5)] {
            let less = evaluate(|problem| {
                let left = constant(problem, a);
                let right = constant(problem, b);
                lt(problem, &left, &right)
            });
            assert_eq!(less, Some((a < b) as i64), "{} < {}", a, b);

            let equal = evaluate(|problem| {
                let left = constant(problem, a);
                let right = constant(problem, b);
                eq(problem, &left, &right)
            });
            assert_eq!(equal, Some((a == b) as i64), "{} == {}", a, b);
        }
    }

    #[test]
    fn numeric_not_of_zero() {
        let not_zero = evaluate(|problem| {
            let zero = constant(problem, 0);
            not(&zero)
        });
        assert_eq!(not_zero, Some(1));

        let not_one = evaluate(|problem| {
            let one = constant(problem, 1);
            not(&one)
        });
        assert_eq!(not_one, Some(0));
    }

    #[test]
    fn fresh_word_constrained_to_constant() {
        let mut problem = Problem::new(&small_config());
        let word = fresh(&mut problem);
        constrain_eq(&mut problem, &word, -11);
        let mut solver = Solver::new(&problem.solver_rules());
        assert!(solver.next_solution());
        assert_eq!(read_value(&solver, &word), -11);
        assert!(!solver.next_solution());
    }

    proptest! {
        #[test]
        fn constant_roundtrip(value in -300i64..300) {
            let result = evaluate(|problem| constant(problem, value));
            prop_assert_eq!(result, Some(value));
        }

        #[test]
        fn sign_extension_preserves_value(value in -40i64..40, extra in 0usize..4) {
            let result = evaluate(|problem| {
                let word = constant(problem, value);
                let size = word.len() + extra;
                sign_extend(problem, &word, size)
            });
            prop_assert_eq!(result, Some(value));
        }
    }
}
