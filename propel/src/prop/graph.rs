//! Rule adjacency and counters.
use propel_rules::{lit::LitIdx, Lit, RuleSet};

/// Index of a rule.
pub type RuleIdx = u32;

/// Static adjacency of a rule set: which rules each literal feeds and which literals each rule
/// forces when it fires.
///
/// Built once at solver construction and immutable afterwards.
#[derive(Default)]
pub struct RuleGraph {
    /// Left-hand side size per rule, the initial counter values.
    lhs_len: Vec<LitIdx>,
    /// Rules whose left-hand side contains the literal, per literal code. A literal occurring in
    /// several left-hand sides has several entries.
    lit_rules: Vec<Vec<RuleIdx>>,
    /// Right-hand side literals of all rules in one buffer.
    rhs_lits: Vec<Lit>,
    /// Bounds into `rhs_lits` per rule, one more entry than there are rules.
    rhs_bounds: Vec<LitIdx>,
}

impl RuleGraph {
    /// Build the adjacency for a rule set.
    pub fn build(rules: &RuleSet) -> RuleGraph {
        let mut graph = RuleGraph {
            lhs_len: Vec::with_capacity(rules.len()),
            lit_rules: vec![vec![]; 2 * rules.var_count()],
            rhs_lits: vec![],
            rhs_bounds: Vec::with_capacity(rules.len() + 1),
        };
        graph.rhs_bounds.push(0);

        for (index, rule) in rules.iter().enumerate() {
            graph.lhs_len.push(rule.lhs.len() as LitIdx);
            for &lit in rule.lhs.iter() {
                graph.lit_rules[lit.code()].push(index as RuleIdx);
            }
            graph.rhs_lits.extend_from_slice(rule.rhs);
            graph.rhs_bounds.push(graph.rhs_lits.len() as LitIdx);
        }

        graph
    }

    /// Number of rules.
    pub fn rule_count(&self) -> usize {
        self.lhs_len.len()
    }

    /// Left-hand side size of a rule.
    pub fn lhs_len(&self, rule: RuleIdx) -> usize {
        self.lhs_len[rule as usize] as usize
    }

    /// The rules fed by a literal.
    pub fn rules_of(&self, lit: Lit) -> &[RuleIdx] {
        &self.lit_rules[lit.code()]
    }

    /// The literals a rule forces.
    pub fn rhs(&self, rule: RuleIdx) -> &[Lit] {
        let rule = rule as usize;
        &self.rhs_lits[self.rhs_bounds[rule] as usize..self.rhs_bounds[rule + 1] as usize]
    }
}

/// Residual left-hand side counts per rule.
///
/// A rule fires when its counter transitions from 1 to 0 and unfires on the transition back. The
/// sum of all counters is tracked for invariant checking.
#[derive(Default)]
pub struct Counters {
    counts: Vec<LitIdx>,
    total: u64,
}

impl Counters {
    /// Reinitialize every counter to its rule's left-hand side size.
    pub fn reset(&mut self, graph: &RuleGraph) {
        self.counts.clear();
        self.counts
            .extend((0..graph.rule_count()).map(|rule| graph.lhs_len(rule as RuleIdx) as LitIdx));
        self.total = self.counts.iter().map(|&count| count as u64).sum();
    }

    /// Current counter value of a rule.
    pub fn value(&self, rule: RuleIdx) -> usize {
        self.counts[rule as usize] as usize
    }

    /// Decrement a rule's counter, returning the new value.
    pub fn decrement(&mut self, rule: RuleIdx) -> usize {
        let count = &mut self.counts[rule as usize];
        debug_assert!(*count > 0, "counter underflow");
        *count -= 1;
        self.total -= 1;
        *count as usize
    }

    /// Increment a rule's counter, returning the new value.
    pub fn increment(&mut self, rule: RuleIdx) -> usize {
        let count = &mut self.counts[rule as usize];
        *count += 1;
        self.total += 1;
        *count as usize
    }

    /// Sum of all counters.
    pub fn total(&self) -> u64 {
        self.total
    }
}
