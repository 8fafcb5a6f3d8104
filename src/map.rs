use std::collections::{BTreeMap, BTreeSet};
use std::fmt::{Display, Formatter};

use itertools::Itertools;
use tracing::{debug, warn};

use crate::lit::Lit;
use crate::position::Position;
use crate::rule::{Inference, RuleId, Undercut};

/// The coherence notion used when counting completions.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Coherence {
    /// A completion is coherent iff it violates no active inference.
    DeductiveInferences,
}

/// A statement map: a universe of statements `1..=n` together with
/// defeasible inferences and undercutting defeaters.
///
/// The universe grows as rules are registered (to the maximum statement
/// referenced) and never shrinks. Rules are immutable once stored; each
/// collection keeps its own id space.
#[derive(Debug, Clone)]
pub struct StatementMap {
    n: u32,
    inferences: BTreeMap<RuleId, Inference>,
    undercuts: BTreeMap<RuleId, Undercut>,
}

impl StatementMap {
    pub fn new() -> Self {
        Self {
            n: 0,
            inferences: BTreeMap::new(),
            undercuts: BTreeMap::new(),
        }
    }

    /// The universe size `n`.
    pub fn num_statements(&self) -> u32 {
        self.n
    }

    pub fn num_inferences(&self) -> usize {
        self.inferences.len()
    }

    pub fn num_undercuts(&self) -> usize {
        self.undercuts.len()
    }

    pub fn inference(&self, id: RuleId) -> Option<&Inference> {
        self.inferences.get(&id)
    }

    pub fn undercut(&self, id: RuleId) -> Option<&Undercut> {
        self.undercuts.get(&id)
    }

    /// Grow the universe to cover statement `i` even if no rule
    /// references it. Import layers size the universe up front this way.
    pub fn add_statement(&mut self, i: u32) {
        assert!(i >= 1, "statement indices start at 1");
        self.n = self.n.max(i);
    }

    fn cover(&mut self, lit: Lit) {
        self.n = self.n.max(lit.statement());
    }

    /// Register a defeasible inference and return the id it was stored
    /// under. A requested id that is absent or already taken within the
    /// inference collection is replaced by the smallest unused one.
    pub fn add_inference<I>(&mut self, premises: I, conclusion: impl Into<Lit>, requested: Option<RuleId>) -> RuleId
    where
        I: IntoIterator,
        I::Item: Into<Lit>,
    {
        let premises = premises.into_iter().map_into::<Lit>().collect_vec();
        let conclusion = conclusion.into();
        for &p in premises.iter() {
            self.cover(p);
        }
        self.cover(conclusion);

        let id = assign_id(requested, &self.inferences);
        if self.undercuts.contains_key(&id) {
            warn!("inference id {} collides with an undercut id; undercuts targeting it will defeat both rules", id);
        }
        let rule = Inference { id, premises, conclusion };
        debug!("adding inference {}", rule);
        self.inferences.insert(id, rule);
        id
    }

    /// Register an undercutting defeater against the rule with id
    /// `target`. The target is not required to exist (yet). Id assignment
    /// works as for [`add_inference`], within the undercut collection.
    ///
    /// [`add_inference`]: StatementMap::add_inference
    pub fn add_undercut<I>(&mut self, premises: I, target: impl Into<RuleId>, requested: Option<RuleId>) -> RuleId
    where
        I: IntoIterator,
        I::Item: Into<Lit>,
    {
        let premises = premises.into_iter().map_into::<Lit>().collect_vec();
        let target = target.into();
        for &p in premises.iter() {
            self.cover(p);
        }

        let id = assign_id(requested, &self.undercuts);
        if self.inferences.contains_key(&id) {
            warn!("undercut id {} collides with an inference id; undercuts targeting it will defeat both rules", id);
        }
        let rule = Undercut { id, premises, target };
        debug!("adding undercut {}", rule);
        self.undercuts.insert(id, rule);
        id
    }

    fn premises_accepted(&self, pos: &Position, premises: &[Lit]) -> bool {
        premises.iter().all(|&p| pos.is_accepted(p))
    }

    /// All inferences that apply under `pos` and survive undercutting.
    ///
    /// A rule is a candidate if every premise is accepted. Candidate
    /// undercuts settle once no remaining candidate undercut targets
    /// them; settled undercuts remove their target from both candidate
    /// sets, until a round removes nothing. Undercut cycles (including
    /// self-cycles) never settle, so the rules they compete over stay
    /// active: the resolution is deliberately cautious.
    pub fn active_inferences(&self, pos: &Position) -> Vec<&Inference> {
        assert!(
            pos.size() >= self.n,
            "position over {} statements cannot evaluate a map over {}",
            pos.size(),
            self.n
        );

        let mut candidate_inferences: BTreeSet<RuleId> = self
            .inferences
            .values()
            .filter(|rule| self.premises_accepted(pos, &rule.premises))
            .map(|rule| rule.id)
            .collect();
        let mut candidate_undercuts: BTreeSet<RuleId> = self
            .undercuts
            .values()
            .filter(|rule| self.premises_accepted(pos, &rule.premises))
            .map(|rule| rule.id)
            .collect();

        let mut settled: BTreeSet<RuleId> = BTreeSet::new();
        loop {
            let newly_settled = candidate_undercuts
                .iter()
                .filter(|&&id| !settled.contains(&id))
                .filter(|&&id| !candidate_undercuts.iter().any(|u| self.undercuts[u].target == id))
                .copied()
                .collect_vec();
            settled.extend(newly_settled);

            let defeated: BTreeSet<RuleId> = settled.iter().map(|id| self.undercuts[id].target).collect();
            let before = candidate_undercuts.len();
            candidate_undercuts.retain(|id| !defeated.contains(id));
            candidate_inferences.retain(|id| !defeated.contains(id));
            // Removing inferences cannot enable further settlements,
            // so only undercut removals drive another round.
            if candidate_undercuts.len() == before {
                break;
            }
        }

        candidate_inferences.iter().map(|id| &self.inferences[id]).collect_vec()
    }

    /// A rule is violated when all its premises are accepted and its
    /// conclusion is rejected.
    pub fn inference_is_violated(&self, pos: &Position, rule: &Inference) -> bool {
        self.premises_accepted(pos, &rule.premises) && pos.is_rejected(rule.conclusion)
    }

    /// The active inferences that `pos` violates.
    pub fn violated_rules(&self, pos: &Position) -> Vec<&Inference> {
        self.active_inferences(pos)
            .into_iter()
            .filter(|rule| self.inference_is_violated(pos, rule))
            .collect_vec()
    }

    /// A position is deductively valid iff no active inference is
    /// violated.
    pub fn is_deductively_valid(&self, pos: &Position) -> bool {
        self.active_inferences(pos).iter().all(|rule| !self.inference_is_violated(pos, rule))
    }

    /// Count the completions of `pos` that are coherent under the given
    /// notion.
    ///
    /// `pos` is mutated in place during the backtracking and restored
    /// before returning; do not share one position across concurrent
    /// calls. Cost is `2^k` validity checks for `k` undecided statements.
    pub fn coherent_completions(&self, pos: &mut Position, coherence: Coherence) -> u64 {
        match coherence {
            Coherence::DeductiveInferences => self.valid_completions(pos),
        }
    }

    fn valid_completions(&self, pos: &mut Position) -> u64 {
        let free = pos.free_elements();
        self.valid_completions_rec(pos, &free)
    }

    fn valid_completions_rec(&self, pos: &mut Position, free: &[u32]) -> u64 {
        let Some((&statement, rest)) = free.split_last() else {
            return self.is_deductively_valid(pos) as u64;
        };
        pos.set_accepted(statement);
        let accepted = self.valid_completions_rec(pos, rest);
        pos.set_rejected(statement);
        let rejected = self.valid_completions_rec(pos, rest);
        pos.set_undecided(statement);
        accepted + rejected
    }
}

impl Default for StatementMap {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for StatementMap {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "statements 1..={}", self.n)?;
        for rule in self.inferences.values() {
            writeln!(f, "inference {}", rule)?;
        }
        for rule in self.undercuts.values() {
            writeln!(f, "undercut {}", rule)?;
        }
        Ok(())
    }
}

fn assign_id<T>(requested: Option<RuleId>, rules: &BTreeMap<RuleId, T>) -> RuleId {
    if let Some(id) = requested {
        if !rules.contains_key(&id) {
            return id;
        }
        debug!("requested rule id {} is taken, assigning a fresh one", id);
    }
    let mut i = 1;
    while rules.contains_key(&RuleId::new(i)) {
        i += 1;
    }
    RuleId::new(i)
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;

    #[test]
    fn test_universe_growth() {
        let mut map = StatementMap::new();
        assert_eq!(map.num_statements(), 0);
        map.add_inference([2, -5], 1, None);
        assert_eq!(map.num_statements(), 5);
        // an undercut's target is a rule id, not a literal
        map.add_undercut([3], RuleId::new(9), None);
        assert_eq!(map.num_statements(), 5);
        map.add_statement(8);
        assert_eq!(map.num_statements(), 8);
    }

    #[test]
    fn test_id_assignment() {
        let mut map = StatementMap::new();
        let id1 = map.add_inference([1], 2, None);
        assert_eq!(id1, RuleId::new(1));
        let id7 = map.add_inference([1], 3, Some(RuleId::new(7)));
        assert_eq!(id7, RuleId::new(7));
        // requested id taken within the collection: smallest unused
        let id2 = map.add_inference([1], 4, Some(RuleId::new(7)));
        assert_eq!(id2, RuleId::new(2));
        // undercuts have their own id space
        let uid = map.add_undercut([5], RuleId::new(1), None);
        assert_eq!(uid, RuleId::new(1));
        assert_eq!(map.num_inferences(), 3);
        assert_eq!(map.num_undercuts(), 1);
    }

    #[test]
    fn test_active_inferences_candidates() {
        let mut map = StatementMap::new();
        let i1 = map.add_inference([2], 1, None);
        let _i2 = map.add_inference([3], 1, None);
        let mut pos = Position::new(3);
        pos.set_accepted(2);
        pos.set_rejected(3);
        let active = map.active_inferences(&pos);
        assert_eq!(active.iter().map(|rule| rule.id).collect_vec(), vec![i1]);
    }

    #[test]
    fn test_undercut_eliminates_inference() {
        let mut map = StatementMap::new();
        let i1 = map.add_inference([2], 1, None);
        map.add_undercut([3], i1, Some(RuleId::new(2)));

        let mut pos = Position::new(3);
        pos.set_accepted(2);
        pos.set_accepted(3);
        pos.set_rejected(1);
        assert!(map.active_inferences(&pos).is_empty());
        assert!(map.is_deductively_valid(&pos));

        // with the undercut's premise rejected, the inference applies
        pos.set_rejected(3);
        assert_eq!(map.active_inferences(&pos).len(), 1);
        assert!(!map.is_deductively_valid(&pos));

        pos.set_undecided(3);
        assert!(!map.is_deductively_valid(&pos));
    }

    #[test]
    fn test_undercut_chain_cascades() {
        // u3 defeats u2, so u2 never defeats i1
        let mut map = StatementMap::new();
        let i1 = map.add_inference([2], 1, Some(RuleId::new(1)));
        let u2 = map.add_undercut([3], i1, Some(RuleId::new(2)));
        map.add_undercut([4], u2, Some(RuleId::new(3)));

        let mut pos = Position::new(4);
        pos.set_accepted(2);
        pos.set_accepted(3);
        pos.set_accepted(4);
        let active = map.active_inferences(&pos);
        assert_eq!(active.iter().map(|rule| rule.id).collect_vec(), vec![i1]);
    }

    #[test]
    fn test_mutual_undercuts_never_settle() {
        let mut map = StatementMap::new();
        let i1 = map.add_inference([2], 1, Some(RuleId::new(1)));
        // u2 and u3 target each other
        map.add_undercut([3], RuleId::new(3), Some(RuleId::new(2)));
        map.add_undercut([4], RuleId::new(2), Some(RuleId::new(3)));

        let mut pos = Position::new(4);
        pos.set_accepted(2);
        pos.set_accepted(3);
        pos.set_accepted(4);
        // neither undercut settles, so the inference stays active
        // exactly as if neither undercut existed
        let active = map.active_inferences(&pos);
        assert_eq!(active.iter().map(|rule| rule.id).collect_vec(), vec![i1]);
    }

    #[test]
    fn test_self_undercut_never_settles() {
        let mut map = StatementMap::new();
        map.add_inference([2], 1, Some(RuleId::new(1)));
        // an undercut targeting its own id is a one-rule cycle
        map.add_undercut([3], RuleId::new(2), Some(RuleId::new(2)));

        let mut pos = Position::new(3);
        pos.set_accepted(2);
        pos.set_accepted(3);
        assert_eq!(map.active_inferences(&pos).len(), 1);
    }

    #[test]
    fn test_shared_id_defeats_both_rules() {
        // an inference and an undercut sharing id 1: a settled undercut
        // targeting 1 removes both candidates (reference behavior, logged
        // as a warning at registration time)
        let mut map = StatementMap::new();
        map.add_inference([2], 1, Some(RuleId::new(1)));
        map.add_undercut([3], RuleId::new(9), Some(RuleId::new(1)));
        map.add_undercut([4], RuleId::new(1), Some(RuleId::new(2)));

        let mut pos = Position::new(4);
        pos.set_accepted(2);
        pos.set_accepted(3);
        pos.set_accepted(4);
        assert!(map.active_inferences(&pos).is_empty());
    }

    #[test]
    fn test_violation() {
        let mut map = StatementMap::new();
        map.add_inference([2], 1, None);
        let rule = map.inference(RuleId::new(1)).unwrap().clone();

        let mut pos = Position::new(2);
        pos.set_accepted(2);
        assert!(!map.inference_is_violated(&pos, &rule));
        pos.set_rejected(1);
        assert!(map.inference_is_violated(&pos, &rule));
        assert_eq!(map.violated_rules(&pos).len(), 1);
        pos.set_undecided(2);
        assert!(!map.inference_is_violated(&pos, &rule));
    }

    #[test]
    fn test_completions_empty_map() {
        let map = StatementMap::new();
        let mut pos = Position::new(4);
        pos.set_accepted(1);
        assert_eq!(map.coherent_completions(&mut pos, Coherence::DeductiveInferences), 8);
    }

    #[test]
    fn test_completions_restore_position() {
        let mut map = StatementMap::new();
        map.add_inference([1], 2, None);
        let mut pos = Position::new(2);
        pos.set_accepted(1);
        let snapshot = pos.clone();
        let count = map.coherent_completions(&mut pos, Coherence::DeductiveInferences);
        assert_eq!(count, 1);
        assert_eq!(pos, snapshot);
    }

    #[test]
    fn test_completions_chain() {
        // [1] => 2 over two statements: 11, 01, 00 are valid, 10 is not
        let mut map = StatementMap::new();
        map.add_inference([1], 2, None);
        let mut empty = Position::new(2);
        assert_eq!(map.coherent_completions(&mut empty, Coherence::DeductiveInferences), 3);
    }

    #[test]
    fn test_display() {
        let mut map = StatementMap::new();
        map.add_inference([2], 1, None);
        map.add_undercut([3], RuleId::new(1), None);
        let rendered = map.to_string();
        assert!(rendered.contains("statements 1..=3"));
        assert!(rendered.contains("inference r1: (2 => 1)"));
        assert!(rendered.contains("undercut r1: (3 => not r1)"));
    }
}
