use std::fmt::{Display, Formatter};

use itertools::Itertools;

use crate::acceptance::Acceptance;
use crate::lit::Lit;

/// A ternary assignment over the statements `1..=n`.
///
/// Created fully undecided and mutated in place; the size is fixed at
/// construction. The number of undecided statements is maintained
/// incrementally so that completion counting stays O(1).
///
/// All statement indices are 1-based.
///
/// # Panics
///
/// Every accessor panics on a statement index outside `1..=n`.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Position {
    values: Vec<Acceptance>, // {statement: acceptance}, 1-based
    num_undecided: usize,
}

impl Position {
    pub fn new(n: u32) -> Self {
        Self {
            values: vec![Acceptance::Undecided; n as usize],
            num_undecided: n as usize,
        }
    }

    /// The universe size `n`.
    pub fn size(&self) -> u32 {
        self.values.len() as u32
    }

    fn slot(&self, i: u32) -> usize {
        assert!(
            (1..=self.size()).contains(&i),
            "statement {} out of range 1..={}",
            i,
            self.size()
        );
        (i - 1) as usize
    }

    pub fn acceptance(&self, i: u32) -> Acceptance {
        self.values[self.slot(i)]
    }

    pub fn set_acceptance(&mut self, i: u32, value: Acceptance) {
        let slot = self.slot(i);
        let old = self.values[slot];
        self.num_undecided -= old.is_undecided() as usize;
        self.num_undecided += value.is_undecided() as usize;
        self.values[slot] = value;
    }

    pub fn set_accepted(&mut self, i: u32) {
        self.set_acceptance(i, Acceptance::Accepted);
    }

    pub fn set_rejected(&mut self, i: u32) {
        self.set_acceptance(i, Acceptance::Rejected);
    }

    pub fn set_undecided(&mut self, i: u32) {
        self.set_acceptance(i, Acceptance::Undecided);
    }

    /// Commit to a literal: a positive literal accepts its statement,
    /// a negative one rejects it.
    pub fn set_literal<L: Into<Lit>>(&mut self, lit: L) {
        let lit = lit.into();
        self.set_acceptance(lit.statement(), Acceptance::from(!lit.negated()));
    }

    /// The acceptance of a literal: for a negative literal, Accepted and
    /// Rejected swap.
    pub fn value<L: Into<Lit>>(&self, lit: L) -> Acceptance {
        let lit = lit.into();
        self.acceptance(lit.statement()) ^ lit.negated()
    }

    pub fn is_accepted<L: Into<Lit>>(&self, lit: L) -> bool {
        self.value(lit) == Acceptance::Accepted
    }

    pub fn is_rejected<L: Into<Lit>>(&self, lit: L) -> bool {
        self.value(lit) == Acceptance::Rejected
    }

    pub fn is_undecided<L: Into<Lit>>(&self, lit: L) -> bool {
        self.value(lit) == Acceptance::Undecided
    }

    /// Statements currently accepted, in increasing order.
    pub fn accepted_elements(&self) -> Vec<u32> {
        (1..=self.size()).filter(|&i| self.acceptance(i) == Acceptance::Accepted).collect_vec()
    }

    /// Statements currently undecided, in increasing order.
    pub fn free_elements(&self) -> Vec<u32> {
        (1..=self.size()).filter(|&i| self.acceptance(i).is_undecided()).collect_vec()
    }

    pub fn num_undecided(&self) -> usize {
        self.num_undecided
    }

    pub fn is_complete(&self) -> bool {
        self.num_undecided == 0
    }

    /// The union of two positions of the same size: wherever `self` is
    /// undecided, take `other`'s value, else keep `self`'s.
    ///
    /// Returns `None` when both positions decide some statement and
    /// disagree. Callers are expected to treat incompatible positions as
    /// zero justification, not as an error.
    pub fn union_with(&self, other: &Position) -> Option<Position> {
        assert_eq!(self.size(), other.size(), "positions differ in size");
        let mut union = Position::new(self.size());
        for i in 1..=self.size() {
            let mine = self.acceptance(i);
            let theirs = other.acceptance(i);
            if mine.is_undecided() {
                union.set_acceptance(i, theirs);
            } else if theirs.is_undecided() || theirs == mine {
                union.set_acceptance(i, mine);
            } else {
                return None;
            }
        }
        Some(union)
    }

    /// The number of total assignments extending this position,
    /// i.e. `2^undecided`.
    pub fn num_completions(&self) -> u64 {
        assert!(self.num_undecided < 64, "too many undecided statements to count completions");
        1u64 << self.num_undecided
    }
}

impl Display for Position {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "[")?;
        for &value in self.values.iter() {
            let c = match value {
                Acceptance::Accepted => '+',
                Acceptance::Rejected => '-',
                Acceptance::Undecided => '?',
            };
            write!(f, "{}", c)?;
        }
        write!(f, "]")
    }
}
