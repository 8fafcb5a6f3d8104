use std::fmt::{Display, Formatter};

use itertools::Itertools;

use crate::lit::Lit;

/// A rule identifier. Ids are unique within each rule collection of a
/// statement map, but an inference and an undercut may carry the same id.
#[derive(Debug, Copy, Clone, Ord, PartialOrd, Eq, PartialEq, Hash)]
#[repr(transparent)]
pub struct RuleId(u32);

impl RuleId {
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    pub const fn get(self) -> u32 {
        self.0
    }
}

impl Display for RuleId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "r{}", self.0)
    }
}

impl From<u32> for RuleId {
    fn from(id: u32) -> Self {
        Self::new(id)
    }
}

/// A defeasible inference: if all premises are accepted, the conclusion
/// ought not be rejected. Immutable once stored.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Inference {
    pub id: RuleId,
    pub premises: Vec<Lit>,
    pub conclusion: Lit,
}

/// An undercutting defeater: if all premises are accepted, the targeted
/// rule is removed from consideration. The target is a rule id, not a
/// literal. Immutable once stored.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Undercut {
    pub id: RuleId,
    pub premises: Vec<Lit>,
    pub target: RuleId,
}

impl Display for Inference {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: ({} => {})", self.id, self.premises.iter().join(" "), self.conclusion)
    }
}

impl Display for Undercut {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: ({} => not {})", self.id, self.premises.iter().join(" "), self.target)
    }
}
