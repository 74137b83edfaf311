#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap, clippy::cast_sign_loss)]

//! The conflict-driven search loop.
//!
//! `search` alternates propagation and decisions until it either finds a
//! full assignment (a model), derives a conflict at the root level (UNSAT
//! under the current assumptions), or exhausts the conflict budget of the
//! current restart and hands control back to the outer loop in
//! [`Solver::solve`](crate::sat::solver::Solver::solve).

use crate::sat::literal::{Lit, Tribool};
use crate::sat::solver::{Solver, MAX_LEARNTS_CTR_INC_GROWTH, MAX_LEARNTS_GROWTH};
use log::debug;

impl Solver {
    /// Runs the search until a model, a root-level conflict, or the restart
    /// budget is hit.
    ///
    /// Returns `True` for SAT (the model is captured), `False` for UNSAT
    /// under the current assumptions, and `Undef` to request a restart.
    pub(crate) fn search(&mut self) -> Tribool {
        self.var_decay = 1.0 / self.config.var_decay;
        self.cla_decay = 1.0 / self.config.cla_decay;
        self.model.clear();
        let mut n_conflicts = 0usize;

        loop {
            if let Some(confl) = self.propagate() {
                n_conflicts += 1;
                self.conflicts += 1;

                if self.decision_level() == self.root_level {
                    // No decision left to revise.
                    return Tribool::False;
                }

                let (learnt, bt_level) = self.analyze(confl);
                self.cancel_until(bt_level.max(self.root_level));
                self.record(learnt);

                self.decay_activities();
                self.max_learnts_ctr -= 1;
                if self.max_learnts_ctr == 0 {
                    // Let the learnt database grow as the search matures.
                    self.max_learnts_ctr_inc *= MAX_LEARNTS_CTR_INC_GROWTH;
                    self.max_learnts_ctr = self.max_learnts_ctr_inc as i64;
                    self.max_learnts *= MAX_LEARNTS_GROWTH;
                }
            } else {
                if self.n_assigns() == self.n_vars() {
                    // Every variable has a value without conflict: a model.
                    for var in 0..self.n_vars() {
                        self.model
                            .insert(self.internal_vars[var], self.assigns[var].is_true());
                    }
                    self.cancel_until(self.root_level);
                    return Tribool::True;
                }

                if self.decision_level() == 0 {
                    self.simplify_db();
                }

                if self.n_learnts() as i64 - self.n_assigns() as i64 >= self.max_learnts as i64 {
                    self.reduce_db();
                }

                if n_conflicts >= self.max_conflicts as usize {
                    // Budget exhausted; force a restart.
                    debug!(
                        "restart {} after {} conflicts",
                        self.n_restarts() + 1,
                        n_conflicts
                    );
                    self.cancel_until(self.root_level);
                    return Tribool::Undef;
                }

                let var = self
                    .order
                    .choose(&self.assigns, &self.activity)
                    .expect("an unassigned variable remains below full assignment");
                self.assume(Lit::new(var, false));
                self.decisions += 1;
            }
        }
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

    fn prepare(s: &mut Solver) {
        s.var_inc = 1.0;
        s.cla_inc = 1.0;
        s.max_learnts = s.n_constrs() as f64 / 3.0;
        s.max_learnts_ctr_inc = 100.0;
        s.max_learnts_ctr = 100;
        s.max_conflicts = 100.0;
        let activity = s.activity.clone();
        s.order.rebuild(&activity);
    }

    #[test]
    fn test_search_finds_model() {
        let mut s = solver_with(&[&[1, 2], &[-1, 2]]);
        prepare(&mut s);

        assert_eq!(s.search(), Tribool::True);
        assert!(s.model[&2], "2 is true in every model");
    }

    #[test]
    fn test_search_detects_root_conflict() {
        let mut s = solver_with(&[&[1, 2], &[-1, 2], &[-2]]);
        prepare(&mut s);

        assert_eq!(s.search(), Tribool::False);
    }

    #[test]
    fn test_search_respects_at_most_one_constraints() {
        let mut s = solver_with(&[&[1, 2, 3], &[-1, -2], &[-1, -3], &[-2, -3]]);
        prepare(&mut s);

        assert_eq!(s.search(), Tribool::True);
        let true_count = s.model.values().filter(|&&v| v).count();
        assert_eq!(true_count, 1, "exactly one variable is true");
    }
}
