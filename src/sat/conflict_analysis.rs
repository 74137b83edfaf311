#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]

//! Conflict analysis and clause learning.
//!
//! When propagation runs into a falsified clause, the implication graph that
//! led there is cut at the first unique implication point (1-UIP): the single
//! assignment of the current decision level through which every path from
//! the decision to the conflict passes. The learnt clause consists of the
//! negation of the UIP literal (the asserting literal, placed first) and the
//! negations of the frontier assignments below the current level. After
//! backtracking to the highest level among the frontier, the clause is unit
//! and immediately asserts.

use crate::sat::clause::ClauseRef;
use crate::sat::literal::Lit;
use crate::sat::solver::Solver;
use bit_vec::BitVec;

impl Solver {
    /// Analyses a conflict and derives a learnt clause.
    ///
    /// Returns the learnt literal sequence (asserting literal first) and the
    /// decision level to backtrack to. The trail is unwound through the
    /// current decision level as a side effect of walking the implication
    /// graph backwards.
    pub(crate) fn analyze(&mut self, confl: ClauseRef) -> (Vec<Lit>, usize) {
        let mut seen = BitVec::from_elem(self.n_vars(), false);
        let mut confl = Some(confl);
        let mut p = Lit::UNDEF;
        // Slot 0 is reserved for the asserting literal.
        let mut learnt = vec![Lit::UNDEF];
        let mut counter = 0usize;
        let mut bt_level = 0usize;

        loop {
            let reason = self.calc_reason(
                confl.expect("every literal traced during analysis has an antecedent"),
                p,
            );
            for q in reason {
                let var = q.var() as usize;
                if seen[var] {
                    continue;
                }
                seen.set(var, true);

                let level = self.level[var];
                if level == self.decision_level() as i32 {
                    // Part of the current-level frontier.
                    counter += 1;
                } else if level > 0 {
                    // The assignment q holds below the current level; its
                    // negation joins the learnt clause.
                    learnt.push(!q);
                    bt_level = bt_level.max(level as usize);
                }
                // Level-0 facts are implied by the empty context and are
                // dropped.
            }

            // Select the next literal to trace.
            loop {
                p = *self
                    .trail
                    .last()
                    .expect("the trail cannot drain before the UIP is found");
                confl = self.reason[p.var() as usize];
                self.undo_one();
                if seen[p.var() as usize] {
                    break;
                }
            }
            counter -= 1;
            if counter == 0 {
                break;
            }
        }
        learnt[0] = !p;

        (learnt, bt_level)
    }

    /// Records a learnt clause and enqueues its asserting literal with the
    /// new clause as reason.
    pub(crate) fn record(&mut self, lits: Vec<Lit>) {
        let asserting = lits[0];
        let (_, cref) = self.new_clause(lits, true);
        let cref = cref.expect("learnt clauses are never discarded");

        self.enqueue(asserting, Some(cref));
        self.learnts.push(cref);
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
    fn test_analyze_single_level_conflict() {
        // Deciding 1 forces 2 and ~2; the only level-1 lemma is ~1.
        let mut s = solver_with(&[&[-1, 2], &[-1, -2]]);
        let one = s.intern_lit(1);

        assert!(s.assume(one));
        let confl = s.propagate().expect("deciding 1 must conflict");

        let (learnt, bt_level) = s.analyze(confl);
        assert_eq!(learnt, vec![!one]);
        assert_eq!(bt_level, 0);
    }

    #[test]
    fn test_analyze_uses_uip_not_decision() {
        // Level 1 assigns 1 and 2. Level 2 decides 3, which forces 4 and
        // then 5, and both conflict clauses pass through 4. The UIP is 4,
        // not the decision 3, and the level-1 assignment 2 is the frontier.
        let mut s = solver_with(&[&[-1, 2], &[-3, 4], &[-2, -4, 5], &[-2, -4, -5]]);

        let lit1 = s.intern_lit(1);
        assert!(s.assume(lit1));
        assert!(s.propagate().is_none());
        let lit3 = s.intern_lit(3);
        assert!(s.assume(lit3));
        let confl = s.propagate().expect("deciding 3 must conflict");

        let (learnt, bt_level) = s.analyze(confl);
        let four = s.intern_lit(4);
        let two = s.intern_lit(2);

        assert_eq!(learnt[0], !four, "the asserting literal negates the UIP");
        assert_eq!(learnt, vec![!four, !two]);
        assert_eq!(bt_level, 1);
    }

    #[test]
    fn test_record_asserts_learnt_clause() {
        let mut s = solver_with(&[&[-1, 2], &[-1, -2]]);
        let one = s.intern_lit(1);

        assert!(s.assume(one));
        let confl = s.propagate().expect("deciding 1 must conflict");
        let (learnt, bt_level) = s.analyze(confl);

        s.cancel_until(bt_level);
        s.record(learnt);

        assert_eq!(s.n_learnts(), 1);
        assert!(s.assigns[one.var() as usize].is_false(), "~1 is asserted");
        assert_eq!(
            s.reason[one.var() as usize],
            Some(s.learnts[0]),
            "the learnt clause is the reason and thus locked"
        );
        assert!(s.propagate().is_none(), "the conflict is resolved");
    }
}
