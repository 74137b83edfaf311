#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::cast_precision_loss)]

//! Maintenance of the clause database.
//!
//! Two housekeeping passes keep the database small. `simplify_db` runs at
//! decision level 0 and discards learnt clauses that level-0 facts already
//! satisfy, compacting falsified literals out of the rest. `reduce_db`
//! periodically drops the less active half of the learnt clauses; binary
//! clauses and clauses currently serving as a reason are always kept.

use crate::sat::clause::ClauseRef;
use crate::sat::solver::Solver;
use ordered_float::OrderedFloat;

impl Solver {
    /// Whether the clause is the reason for its first literal's assignment.
    ///
    /// Locked clauses must not be deleted.
    #[must_use]
    pub(crate) fn locked(&self, cref: ClauseRef) -> bool {
        let first = self.arena.get(cref).lits[0];
        self.reason[first.var() as usize] == Some(cref)
    }

    /// Unwatches the clause and frees its storage.
    pub(crate) fn remove_clause(&mut self, cref: ClauseRef) {
        for i in 0..2 {
            let watched = {
                let clause = self.arena.get(cref);
                (clause.len() > i).then(|| clause.lits[i])
            };
            if let Some(lit) = watched {
                let list = &mut self.watches[(!lit).code()];
                if let Some(pos) = list.iter().position(|&w| w == cref) {
                    list.swap_remove(pos);
                }
            }
        }
        self.arena.free(cref);
    }

    /// Simplifies one clause against the level-0 assignment.
    ///
    /// Returns `true` when some literal is already true, in which case the
    /// clause is permanently satisfied; otherwise falsified literals are
    /// compacted out. Only call at decision level 0, where the first two
    /// literals of an unsatisfied clause are never false, so the watches
    /// stay in place.
    pub(crate) fn simplify_clause(&mut self, cref: ClauseRef) -> bool {
        let clause = self.arena.get_mut(cref);
        let mut kept = 0;

        for i in 0..clause.lits.len() {
            let value = clause.lits[i].eval(&self.assigns);
            if value.is_true() {
                return true;
            }
            if value.is_undef() {
                clause.lits[kept] = clause.lits[i];
                kept += 1;
            }
        }
        clause.lits.truncate(kept);

        false
    }

    /// Propagates to fixpoint and simplifies the learnt database.
    ///
    /// Returns `false` on a top-level conflict.
    pub(crate) fn simplify_db(&mut self) -> bool {
        debug_assert_eq!(self.decision_level(), 0);

        if self.propagate().is_some() {
            return false;
        }

        let mut kept = 0;
        for i in 0..self.learnts.len() {
            let cref = self.learnts[i];
            if self.simplify_clause(cref) {
                self.remove_clause(cref);
            } else {
                self.learnts[kept] = cref;
                kept += 1;
            }
        }
        self.learnts.truncate(kept);

        true
    }

    /// Halves the learnt database, dropping clauses by ascending activity.
    ///
    /// Clauses in the lower half and clauses whose activity fell below
    /// `cla_inc / n_learnts` are removed, except binary and locked clauses,
    /// which are always retained.
    pub(crate) fn reduce_db(&mut self) {
        let limit = self.cla_inc / self.n_learnts() as f64;

        let arena = &self.arena;
        self.learnts
            .sort_by_key(|&cref| OrderedFloat(arena.get(cref).activity));

        let half = self.learnts.len() / 2;
        let mut kept = 0;
        for i in 0..self.learnts.len() {
            let cref = self.learnts[i];
            let (len, activity) = {
                let clause = self.arena.get(cref);
                (clause.len(), clause.activity)
            };

            if len > 2 && !self.locked(cref) && (i < half || activity < limit) {
                self.remove_clause(cref);
            } else {
                self.learnts[kept] = cref;
                kept += 1;
            }
        }
        self.learnts.truncate(kept);
    }
}
