//! Degree-of-justification measures over a statement map.
//!
//! Everything here is stateless: each function takes the map and the
//! position(s) of interest and returns a scalar. Positions passed by
//! `&mut` are only mutated transiently by the completion counter and are
//! restored before the call returns.

use crate::lit::Lit;
use crate::map::{Coherence, StatementMap};
use crate::position::Position;

/// Which degree-of-justification ratio to compute.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum DojKind {
    /// Coherent completions of the position, relative to all coherent
    /// total assignments.
    Recall,
    /// Coherent completions of the position, relative to all of its
    /// completions.
    Precision,
}

/// The four reason relations: in what sense is literal `q` a reason to
/// believe literal `p`?
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ReasonRelation {
    /// `doj(p|q) - doj(p)`
    Relation1,
    /// `doj(p|q) - doj(p|not q)`
    Relation2,
    /// `log2(doj(p|q) / doj(p))`
    Relation3,
    /// `log2(doj(p|q) / doj(p|not q))`
    Relation4,
}

/// The degree of justification of `pos` under the given map.
pub fn doj(map: &StatementMap, pos: &mut Position, kind: DojKind, coherence: Coherence) -> f64 {
    match kind {
        DojKind::Recall => recall(map, pos, coherence),
        DojKind::Precision => precision(map, pos, coherence),
    }
}

/// The degree of justification of `pos` conditional on `cond`, i.e. of
/// the union of the two positions.
///
/// A conflicting union, and likewise a union with no coherent completion,
/// yields `0.0`: an impossible combination carries zero justification,
/// it is not an error.
pub fn doj_conditional(
    map: &StatementMap,
    pos: &Position,
    cond: &mut Position,
    kind: DojKind,
    coherence: Coherence,
) -> f64 {
    match kind {
        DojKind::Recall => recall_conditional(map, pos, cond, coherence),
        DojKind::Precision => precision_conditional(map, pos, cond, coherence),
    }
}

fn recall(map: &StatementMap, pos: &mut Position, coherence: Coherence) -> f64 {
    let n1 = map.coherent_completions(pos, coherence);
    if n1 == 0 {
        // n1 never exceeds n2, so this also covers the 0/0 case
        return 0.0;
    }
    let mut empty = Position::new(pos.size());
    let n2 = map.coherent_completions(&mut empty, coherence);
    n1 as f64 / n2 as f64
}

fn precision(map: &StatementMap, pos: &mut Position, coherence: Coherence) -> f64 {
    let n1 = map.coherent_completions(pos, coherence);
    n1 as f64 / pos.num_completions() as f64
}

fn recall_conditional(map: &StatementMap, pos: &Position, cond: &mut Position, coherence: Coherence) -> f64 {
    let Some(mut union) = cond.union_with(pos) else {
        return 0.0;
    };
    let n1 = map.coherent_completions(&mut union, coherence);
    if n1 == 0 {
        return 0.0;
    }
    let n2 = map.coherent_completions(cond, coherence);
    n1 as f64 / n2 as f64
}

fn precision_conditional(map: &StatementMap, pos: &Position, cond: &mut Position, coherence: Coherence) -> f64 {
    let Some(mut union) = cond.union_with(pos) else {
        return 0.0;
    };
    let n1 = map.coherent_completions(&mut union, coherence);
    if n1 == 0 {
        return 0.0;
    }
    n1 as f64 / union.num_completions() as f64
}

/// The degree to which literal `q` is a reason to believe literal `p`,
/// measured by the chosen relation over single-literal positions.
///
/// For the logarithmic relations, a zero `doj(p|q)` yields `-inf`, and a
/// zero denominator (with nonzero numerator) yields `0.0`.
///
/// # Panics
///
/// Panics if `p` or `q` references a statement outside `1..=n`.
pub fn reason(
    map: &StatementMap,
    p: impl Into<Lit>,
    q: impl Into<Lit>,
    relation: ReasonRelation,
    kind: DojKind,
    coherence: Coherence,
) -> f64 {
    let p = p.into();
    let q = q.into();
    for lit in [p, q] {
        assert!(
            (1..=map.num_statements()).contains(&lit.statement()),
            "literal {} references a statement outside 1..={}",
            lit,
            map.num_statements()
        );
    }

    let mut pos = singleton(map, p);
    match relation {
        ReasonRelation::Relation1 => {
            let conditional = doj_conditional(map, &pos, &mut singleton(map, q), kind, coherence);
            let prior = doj(map, &mut pos, kind, coherence);
            conditional - prior
        }
        ReasonRelation::Relation2 => {
            let given_q = doj_conditional(map, &pos, &mut singleton(map, q), kind, coherence);
            let given_not_q = doj_conditional(map, &pos, &mut singleton(map, -q), kind, coherence);
            given_q - given_not_q
        }
        ReasonRelation::Relation3 => {
            let conditional = doj_conditional(map, &pos, &mut singleton(map, q), kind, coherence);
            let prior = doj(map, &mut pos, kind, coherence);
            log2_ratio(conditional, prior)
        }
        ReasonRelation::Relation4 => {
            let given_q = doj_conditional(map, &pos, &mut singleton(map, q), kind, coherence);
            let given_not_q = doj_conditional(map, &pos, &mut singleton(map, -q), kind, coherence);
            log2_ratio(given_q, given_not_q)
        }
    }
}

/// A position over the map's universe committing to a single literal.
fn singleton(map: &StatementMap, lit: Lit) -> Position {
    let mut pos = Position::new(map.num_statements());
    pos.set_literal(lit);
    pos
}

fn log2_ratio(numerator: f64, denominator: f64) -> f64 {
    if numerator == 0.0 {
        return f64::NEG_INFINITY;
    }
    if denominator == 0.0 {
        return 0.0;
    }
    (numerator / denominator).log2()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain_map() -> StatementMap {
        // [2] => 1 over statements {1, 2}
        let mut map = StatementMap::new();
        map.add_inference([2], 1, None);
        map
    }

    #[test]
    fn test_recall_fully_undecided_is_one() {
        let map = chain_map();
        let mut pos = Position::new(map.num_statements());
        assert_eq!(doj(&map, &mut pos, DojKind::Recall, Coherence::DeductiveInferences), 1.0);
    }

    #[test]
    fn test_recall_single_statement() {
        // no rules, one statement: accepting it keeps 1 of 2 completions
        let mut map = StatementMap::new();
        map.add_statement(1);
        let mut pos = Position::new(1);
        pos.set_accepted(1);
        assert_eq!(doj(&map, &mut pos, DojKind::Recall, Coherence::DeductiveInferences), 0.5);
    }

    #[test]
    fn test_precision_vs_recall_on_empty_map() {
        let mut map = StatementMap::new();
        map.add_statement(3);
        let mut pos = Position::new(3);
        let recall = doj(&map, &mut pos, DojKind::Recall, Coherence::DeductiveInferences);
        let precision = doj(&map, &mut pos, DojKind::Precision, Coherence::DeductiveInferences);
        assert_eq!(recall, 1.0);
        assert_eq!(precision, 1.0);
    }

    #[test]
    fn test_conditional_conflict_is_zero() {
        let map = chain_map();
        let mut pos = Position::new(2);
        pos.set_accepted(1);
        let mut cond = Position::new(2);
        cond.set_rejected(1);
        let value = doj_conditional(&map, &pos, &mut cond, DojKind::Recall, Coherence::DeductiveInferences);
        assert_eq!(value, 0.0);
    }

    #[test]
    #[should_panic(expected = "outside 1..=2")]
    fn test_reason_out_of_range_panics() {
        let map = chain_map();
        let _ = reason(
            &map,
            3,
            2,
            ReasonRelation::Relation1,
            DojKind::Recall,
            Coherence::DeductiveInferences,
        );
    }
}
