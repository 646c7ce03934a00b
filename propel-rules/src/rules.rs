//! Implication rules over literals.
use std::cmp::max;
use std::fmt;
use std::io;
use std::ops::Range;

use thiserror::Error;

use crate::lit::Lit;

/// One implication rule, borrowed from a [`RuleSet`].
///
/// When every literal of `lhs` is in the current solution, every literal of `rhs` is forced into
/// it. Both sides may be empty: a rule with an empty left-hand side never fires (its counter is
/// never decremented) and a rule with an empty right-hand side fires without effect.
#[derive(Copy, Clone, PartialEq, Eq)]
pub struct Rule<'a> {
    pub lhs: &'a [Lit],
    pub rhs: &'a [Lit],
}

impl<'a> fmt::Debug for Rule<'a> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:?} => {:?}", self.lhs, self.rhs)
    }
}

/// A set of implication rules.
///
/// Equivalent to `Vec<(Vec<Lit>, Vec<Lit>)>` but using a single buffer for all literals.
#[derive(Default, Clone, Eq)]
pub struct RuleSet {
    var_count: usize,
    literals: Vec<Lit>,
    bounds: Vec<RuleBounds>,
}

/// Buffer positions of one rule: `lhs..mid` is the left-hand side, `mid..end` the right.
#[derive(Clone, PartialEq, Eq)]
struct RuleBounds {
    lhs: usize,
    mid: usize,
    end: usize,
}

impl RuleSet {
    /// Create an empty rule set.
    pub fn new() -> RuleSet {
        RuleSet::default()
    }

    /// Number of variables in the rule set.
    ///
    /// This also counts missing variables if a variable with a higher index is present.
    /// A vector of this length can be indexed with the variable indices present.
    pub fn var_count(&self) -> usize {
        self.var_count
    }

    /// Increase the number of variables in the rule set.
    ///
    /// If the parameter is less than the current variable count do nothing.
    pub fn set_var_count(&mut self, count: usize) {
        self.var_count = max(self.var_count, count)
    }

    /// Number of rules in the set.
    pub fn len(&self) -> usize {
        self.bounds.len()
    }

    /// Whether the set contains no rules.
    pub fn is_empty(&self) -> bool {
        self.bounds.is_empty()
    }

    /// Appends a rule to the set.
    ///
    /// Each side can be an `IntoIterator<Item = Lit>` or `IntoIterator<Item = &Lit>`.
    pub fn add_rule<L, R>(&mut self, lhs: impl IntoIterator<Item = L>, rhs: impl IntoIterator<Item = R>)
    where
        Vec<Lit>: Extend<L> + Extend<R>,
    {
        let begin = self.literals.len();
        self.literals.extend(lhs);
        let mid = self.literals.len();
        self.literals.extend(rhs);
        let end = self.literals.len();

        for &lit in self.literals[begin..end].iter() {
            self.var_count = max(lit.index() + 1, self.var_count);
        }

        self.bounds.push(RuleBounds {
            lhs: begin,
            mid,
            end,
        });
    }

    /// The rule with the given index.
    pub fn rule(&self, index: usize) -> Rule {
        let bounds = &self.bounds[index];
        Rule {
            lhs: &self.literals[bounds.lhs..bounds.mid],
            rhs: &self.literals[bounds.mid..bounds.end],
        }
    }

    /// Iterator over all rules.
    pub fn iter(&self) -> impl Iterator<Item = Rule> {
        let literals = &self.literals;
        self.bounds.iter().map(move |bounds| Rule {
            lhs: &literals[bounds.lhs..bounds.mid],
            rhs: &literals[bounds.mid..bounds.end],
        })
    }

    /// Decode a flat signed-integer rule sequence.
    ///
    /// Each rule is a left-hand side terminated by `0` followed by a right-hand side terminated
    /// by `0`; the empty rule `0 0` ends the sequence. Input past the empty rule is ignored.
    pub fn from_flat(flat: &[i32]) -> Result<RuleSet, FlatRulesError> {
        fn side(flat: &[i32], pos: &mut usize, rule: usize) -> Result<Range<usize>, FlatRulesError> {
            let begin = *pos;
            loop {
                match flat.get(*pos) {
                    None => return Err(FlatRulesError::UnterminatedRule { rule }),
                    Some(0) => {
                        let end = *pos;
                        *pos += 1;
                        return Ok(begin..end);
                    }
                    Some(_) => *pos += 1,
                }
            }
        }

        let mut rules = RuleSet::new();
        let mut pos = 0;

        loop {
            let rule = rules.len();
            let lhs = side(flat, &mut pos, rule)?;
            let rhs = side(flat, &mut pos, rule)?;
            if lhs.is_empty() && rhs.is_empty() {
                return Ok(rules);
            }
            rules.add_rule(
                flat[lhs].iter().map(|&value| Lit::from_number(value as isize)),
                flat[rhs].iter().map(|&value| Lit::from_number(value as isize)),
            );
        }
    }

    /// Encode the rules as a flat signed-integer sequence, including the terminating empty rule.
    pub fn to_flat(&self) -> Vec<i32> {
        let mut flat = Vec::with_capacity(self.literals.len() + 2 * self.len() + 2);
        for rule in self.iter() {
            flat.extend(rule.lhs.iter().map(|lit| lit.to_number() as i32));
            flat.push(0);
            flat.extend(rule.rhs.iter().map(|lit| lit.to_number() as i32));
            flat.push(0);
        }
        flat.push(0);
        flat.push(0);
        flat
    }

    /// Write the flat encoding as whitespace separated decimal integers, one rule per line.
    pub fn write_flat(&self, target: &mut impl io::Write) -> io::Result<()> {
        for rule in self.iter() {
            for &lit in rule.lhs.iter() {
                itoa::write(&mut *target, lit.to_number() as i32)?;
                target.write_all(b" ")?;
            }
            target.write_all(b"0 ")?;
            for &lit in rule.rhs.iter() {
                itoa::write(&mut *target, lit.to_number() as i32)?;
                target.write_all(b" ")?;
            }
            target.write_all(b"0\n")?;
        }
        target.write_all(b"0 0\n")
    }
}

/// Convert any iterable of `(lhs, rhs)` literal iterables into a RuleSet.
impl<F, L, R, A, B> From<F> for RuleSet
where
    F: IntoIterator<Item = (L, R)>,
    L: IntoIterator<Item = A>,
    R: IntoIterator<Item = B>,
    Vec<Lit>: Extend<A> + Extend<B>,
{
    fn from(rules: F) -> RuleSet {
        let mut rule_set = RuleSet::new();
        for (lhs, rhs) in rules {
            rule_set.add_rule(lhs, rhs);
        }
        rule_set
    }
}

impl fmt::Debug for RuleSet {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Debug::fmt(&self.var_count(), f)?;
        f.debug_list().entries(self.iter()).finish()
    }
}

impl PartialEq for RuleSet {
    fn eq(&self, other: &RuleSet) -> bool {
        self.var_count() == other.var_count()
            && self.len() == other.len()
            && (0..self.len()).all(|index| self.rule(index) == other.rule(index))
    }
}

/// Possible errors while decoding a flat rule sequence.
#[derive(Debug, Error)]
pub enum FlatRulesError {
    #[error("rule {}: input ended before the terminating empty rule", rule)]
    UnterminatedRule { rule: usize },
}

#[cfg(any(test, feature = "proptest-strategies"))]
#[doc(hidden)]
pub mod strategy {
    use super::*;

    use proptest::{collection::SizeRange, prelude::*, *};

    use crate::lit::strategy::lit;

    pub fn rule_set(
        vars: impl Strategy<Value = usize>,
        rules: impl Into<SizeRange>,
        side_len: impl Into<SizeRange>,
    ) -> impl Strategy<Value = RuleSet> {
        let rules = rules.into();
        let side_len = side_len.into();

        // Not using ind_flat_map makes shrinking too expensive
        vars.prop_ind_flat_map(move |vars| {
            collection::vec(
                (
                    collection::vec(lit(0..vars), side_len.clone()),
                    collection::vec(lit(0..vars), side_len.clone()),
                ),
                rules.clone(),
            )
        })
        .prop_map(|rules| {
            // A rule with two empty sides is the flat-encoding terminator, not a rule.
            RuleSet::from(
                rules
                    .into_iter()
                    .filter(|(lhs, rhs)| !(lhs.is_empty() && rhs.is_empty())),
            )
        })
    }
}
