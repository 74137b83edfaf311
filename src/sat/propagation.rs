#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]

//! Boolean constraint propagation with two watched literals.
//!
//! Every clause watches two of its literals; the clause only needs to be
//! re-examined when one of the watches becomes false. The watch lists are
//! keyed by the falsifying literal: a clause watching `l` sits in
//! `watches[!l]`, so when `p` is assigned true, `watches[p]` holds exactly
//! the clauses whose watch just failed.
//!
//! `propagate` drains the FIFO propagation queue. For each dequeued literal
//! the whole watch list is taken by value and rebuilt incrementally: each
//! clause either re-inserts itself (possibly into a different list after
//! finding a replacement watch) or propagates its remaining watched literal.
//! On a conflict the untouched tail of the taken list is appended back and
//! the queue is cleared, leaving the watch structure consistent for the
//! backtracking that follows.

use crate::sat::clause::ClauseRef;
use crate::sat::literal::{Lit, Tribool};
use crate::sat::solver::Solver;
use std::mem;

/// Outcome of re-examining a single clause after a watch failed.
enum WatchOutcome {
    /// The first watch is already true; nothing to do.
    Satisfied,
    /// A replacement watch was found; the clause moved to that literal's
    /// list.
    Moved(Lit),
    /// No replacement exists; the clause is unit on its first literal.
    Unit(Lit),
}

impl Solver {
    /// Puts a new fact on the propagation queue.
    ///
    /// An already-true fact is accepted silently; an already-false one is a
    /// conflict and returns `false`. Otherwise the assignment, level, reason
    /// and trail are updated and the literal is queued for watch processing.
    pub(crate) fn enqueue(&mut self, p: Lit, from: Option<ClauseRef>) -> bool {
        let value = self.lit_value(p);
        if !value.is_undef() {
            return !value.is_false();
        }

        let var = p.var() as usize;
        self.assigns[var] = Tribool::from_bool(!p.is_negated());
        self.level[var] = self.decision_level() as i32;
        self.reason[var] = from;
        self.trail.push(p);
        self.prop_q.push_back(p);

        true
    }

    /// Propagates all enqueued facts to fixpoint.
    ///
    /// Returns the conflicting clause if one is found, `None` otherwise.
    pub(crate) fn propagate(&mut self) -> Option<ClauseRef> {
        while let Some(p) = self.prop_q.pop_front() {
            self.propagations += 1;

            let watchers = mem::take(&mut self.watches[p.code()]);
            for (i, &cref) in watchers.iter().enumerate() {
                if !self.propagate_clause(cref, p) {
                    // Conflict: the clauses not yet examined keep watching p.
                    self.watches[p.code()].extend_from_slice(&watchers[i + 1..]);
                    self.prop_q.clear();
                    return Some(cref);
                }
            }
        }
        None
    }

    /// Re-examines one clause after `p` was assigned true and `!p` is one of
    /// its watches.
    ///
    /// The clause re-inserts itself into a watch list on every path. Returns
    /// `false` when the clause is unit and enqueuing its first literal
    /// conflicts.
    pub(crate) fn propagate_clause(&mut self, cref: ClauseRef, p: Lit) -> bool {
        let not_p = !p;

        let outcome = {
            let clause = self.arena.get_mut(cref);

            // Make sure the false literal is in the second watch position.
            if clause.lits[0] == not_p {
                clause.lits.swap(0, 1);
            }
            debug_assert_eq!(clause.lits[1], not_p, "{p} is not watched by this clause");

            if clause.lits[0].eval(&self.assigns).is_true() {
                WatchOutcome::Satisfied
            } else {
                let replacement = (2..clause.lits.len())
                    .find(|&i| !clause.lits[i].eval(&self.assigns).is_false());
                match replacement {
                    Some(i) => {
                        clause.lits.swap(1, i);
                        WatchOutcome::Moved(clause.lits[1])
                    }
                    None => WatchOutcome::Unit(clause.lits[0]),
                }
            }
        };

        match outcome {
            WatchOutcome::Satisfied => {
                self.watches[p.code()].push(cref);
                true
            }
            WatchOutcome::Moved(new_watch) => {
                self.watches[(!new_watch).code()].push(cref);
                true
            }
            WatchOutcome::Unit(first) => {
                // Clause stays on p's list; the remaining literal is forced.
                self.watches[p.code()].push(cref);
                self.enqueue(first, Some(cref))
            }
        }
    }

    /// The antecedent set of `p`'s propagation through this clause, as the
    /// negations of the other literals.
    ///
    /// With `p` undefined the clause itself is the conflict and all literals
    /// contribute. Learnt antecedents are bumped, since involvement in
    /// conflict analysis is the activity signal.
    pub(crate) fn calc_reason(&mut self, cref: ClauseRef, p: Lit) -> Vec<Lit> {
        let offset = usize::from(!p.is_undef());
        let clause = self.arena.get(cref);
        let reason: Vec<Lit> = clause.lits[offset..].iter().map(|&q| !q).collect();

        if clause.learnt {
            self.cla_bump_activity(cref);
        }
        reason
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sat::config::SolverConfig;

    fn solver_with(clauses: &[&[i32]]) -> Solver {
        let mut s = Solver::new(SolverConfig::default());
        for clause in clauses {
            assert!(s.add_clause(clause));
        }
        s
    }

    #[test]
    fn test_enqueue_sets_assignment_state() {
        let mut s = solver_with(&[&[1, 2]]);
        let p = s.intern_lit(-1);

        assert!(s.enqueue(p, None));
        assert!(s.assigns[p.var() as usize].is_false());
        assert_eq!(s.level[p.var() as usize], 0);
        assert_eq!(s.trail, vec![p]);

        // Re-enqueueing the same fact is fine; the opposite one conflicts.
        assert!(s.enqueue(p, None));
        assert!(!s.enqueue(!p, None));
        assert_eq!(s.n_assigns(), 1);
    }

    #[test]
    fn test_propagation_chain() {
        let mut s = solver_with(&[&[-1, 2], &[-2, 3]]);
        let p = s.intern_lit(1);

        assert!(s.assume(p));
        assert!(s.propagate().is_none());

        assert_eq!(s.n_assigns(), 3);
        for ext in [1, 2, 3] {
            let var = s.user_vars[&ext];
            assert!(s.assigns[var as usize].is_true(), "variable {ext} is forced true");
        }
        assert_eq!(s.n_propagations(), 3);
    }

    #[test]
    fn test_propagation_conflict_restores_watches() {
        let mut s = solver_with(&[&[-1, 2], &[-1, -2]]);
        let p = s.intern_lit(1);

        assert!(s.assume(p));
        let confl = s.propagate();
        assert!(confl.is_some());
        assert!(s.prop_q.is_empty(), "the queue is cleared on conflict");

        // Both clauses must still be watched twice.
        for &cref in &s.constrs {
            let clause = s.arena.get(cref);
            let w0 = (!clause.lits[0]).code();
            let w1 = (!clause.lits[1]).code();
            assert!(s.watches[w0].contains(&cref));
            assert!(s.watches[w1].contains(&cref));
        }
    }

    #[test]
    fn test_watch_moves_to_unfalsified_literal() {
        let mut s = solver_with(&[&[-1, 2, 3]]);
        let cref = s.constrs[0];
        let p = s.intern_lit(1);

        assert!(s.assume(p));
        assert!(s.propagate().is_none());

        // The falsified watch ~1 was replaced; no assignment was forced.
        assert_eq!(s.n_assigns(), 1);
        let clause = s.arena.get(cref);
        assert!(!clause.lits[0].eval(&s.assigns).is_false());
        assert!(!clause.lits[1].eval(&s.assigns).is_false());
        let w0 = (!clause.lits[0]).code();
        let w1 = (!clause.lits[1]).code();
        assert!(s.watches[w0].contains(&cref));
        assert!(s.watches[w1].contains(&cref));
    }

    #[test]
    fn test_calc_reason_for_propagated_literal() {
        let mut s = solver_with(&[&[-1, -2, 3]]);
        let cref = s.constrs[0];

        let lit1 = s.intern_lit(1);
        assert!(s.assume(lit1));
        assert!(s.propagate().is_none());
        let lit2 = s.intern_lit(2);
        assert!(s.assume(lit2));
        assert!(s.propagate().is_none());

        let three = s.intern_lit(3);
        assert!(s.assigns[three.var() as usize].is_true());

        let first = s.arena.get(cref).lits[0];
        assert_eq!(first, three, "the forced literal sits in the first slot");

        let reason = s.calc_reason(cref, three);
        assert_eq!(reason.len(), 2);
        for q in reason {
            assert!(q.eval(&s.assigns).is_true(), "antecedent assignments hold");
        }

        let conflict_reason = s.calc_reason(cref, Lit::UNDEF);
        assert_eq!(conflict_reason.len(), 3);
    }
}
