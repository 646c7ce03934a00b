//! Problem construction.
use propel_rules::{Lit, RuleSet, Var};

use crate::config::Config;
use crate::word::Word;

/// An under-construction rule problem.
///
/// Allocates literals, collects rules, and keeps the table mapping named variables to their
/// bit-slices. Every problem starts with a canonical true/false literal pair: the first allocated
/// literal is constrained so that only its positive polarity can be part of a solution.
pub struct Problem {
    config: Config,
    rules: RuleSet,
    next_index: usize,
    names: Vec<Option<Var>>,
    true_lit: Lit,
    false_lit: Lit,
}

impl Problem {
    /// Create an empty problem with the canonical true/false pair.
    pub fn new(config: &Config) -> Problem {
        let mut problem = Problem {
            config: config.clone(),
            rules: RuleSet::new(),
            next_index: 0,
            names: vec![None; config.max_vars],
            true_lit: Lit::from_index(0, true),
            false_lit: Lit::from_index(0, false),
        };
        let true_lit = problem.fresh_lit();
        problem.add_rule(&[!true_lit], &[true_lit]);
        problem.true_lit = true_lit;
        problem.false_lit = !true_lit;
        problem
    }

    /// The configuration the problem was created with.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The literal that is always in a solution.
    pub fn true_lit(&self) -> Lit {
        self.true_lit
    }

    /// The literal that is never in a solution.
    pub fn false_lit(&self) -> Lit {
        self.false_lit
    }

    /// Allocate a fresh positive literal.
    pub fn fresh_lit(&mut self) -> Lit {
        let lit = Lit::from_index(self.next_index, true);
        self.next_index += 1;
        self.rules.set_var_count(self.next_index);
        lit
    }

    /// Number of allocated variables.
    pub fn var_count(&self) -> usize {
        self.next_index
    }

    /// Append a rule.
    pub fn add_rule(&mut self, lhs: &[Lit], rhs: &[Lit]) {
        self.rules.add_rule(lhs.iter().cloned(), rhs.iter().cloned());
    }

    /// Constrain a literal to be in every solution.
    pub fn constrain_true(&mut self, lit: Lit) {
        self.add_rule(&[!lit], &[lit]);
    }

    /// Constrain a literal to be in no solution.
    pub fn constrain_false(&mut self, lit: Lit) {
        self.add_rule(&[lit], &[!lit]);
    }

    /// The rules collected so far.
    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    /// The rules to hand to a solver.
    ///
    /// Adds a rule with an empty left-hand side naming the highest allocated literal. Such a rule
    /// never fires, but it makes the solver size its tables over every allocated variable, even
    /// ones that no other rule mentions.
    pub fn solver_rules(&self) -> RuleSet {
        let mut rules = self.rules.clone();
        if self.next_index > 0 {
            rules.add_rule(
                std::iter::empty::<Lit>(),
                std::iter::once(Lit::from_index(self.next_index - 1, true)),
            );
        }
        rules
    }

    /// The bit-slice of a named variable, allocating it on first use.
    ///
    /// The caller validates the range; `number` must be in `1..config.max_vars`.
    pub fn named_word(&mut self, number: usize) -> Word {
        debug_assert!(number >= 1 && number < self.config.max_vars);
        let first = match self.names[number] {
            Some(first) => first,
            None => {
                let first = self.fresh_lit().var();
                for _ in 1..self.config.word_width {
                    let _ = self.fresh_lit();
                }
                self.names[number] = Some(first);
                first
            }
        };
        self.word_at(first)
    }

    /// The bit-slice of a named variable, or `None` if it was never allocated.
    pub fn lookup_word(&self, number: usize) -> Option<Word> {
        let first = (*self.names.get(number)?)?;
        Some(self.word_at(first))
    }

    /// The numbers of all allocated named variables, in ascending order.
    pub fn named_numbers(&self) -> impl Iterator<Item = usize> + '_ {
        (1..self.names.len()).filter(move |&number| self.names[number].is_some())
    }

    fn word_at(&self, first: Var) -> Word {
        Word::from_lits(
            (0..self.config.word_width)
                .map(|offset| Var::from_index(first.index() + offset).positive())
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_pair() {
        let problem = Problem::new(&Config::default());
        assert_eq!(problem.true_lit(), !problem.false_lit());
        assert!(problem.true_lit().is_positive());
        assert_eq!(problem.var_count(), 1);
        assert_eq!(problem.rules().len(), 1);
    }

    #[test]
    fn named_words_are_stable() {
        let mut problem = Problem::new(&Config::default());
        let a = problem.named_word(b'a' as usize);
        let b = problem.named_word(b'b' as usize);
        let a_again = problem.named_word(b'a' as usize);

        assert_eq!(a.lits(), a_again.lits());
        assert_ne!(a.lits(), b.lits());
        assert_eq!(a.len(), 9);
        assert_eq!(problem.lookup_word(b'b' as usize).unwrap().lits(), b.lits());
        assert_eq!(problem.lookup_word(b'z' as usize), None);
        assert_eq!(
            problem.named_numbers().collect::<Vec<_>>(),
            vec![b'a' as usize, b'b' as usize]
        );
    }

    #[test]
    fn solver_rules_cover_all_variables() {
        let mut problem = Problem::new(&Config::default());
        let _ = problem.named_word(b'x' as usize);
        let rules = problem.solver_rules();
        assert_eq!(rules.var_count(), problem.var_count());
        assert_eq!(rules.len(), problem.rules().len() + 1);
    }
}
