#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::cast_possible_truncation, clippy::cast_precision_loss, clippy::cast_sign_loss)]

//! The solver core: state, clause construction and the public API.
//!
//! `Solver` owns every mutable structure of a solve (assignments, trail,
//! watch lists, clause arena, activity state, counters) and is strictly
//! single-threaded. Clauses live in the arena and are reached through
//! `ClauseRef` handles; the per-clause operations are `Solver` methods taking
//! a handle, which breaks the clause-to-solver reference cycle without
//! back-pointers.
//!
//! The search loop itself lives in [`crate::sat::cdcl`], propagation in
//! [`crate::sat::propagation`], conflict analysis in
//! [`crate::sat::conflict_analysis`] and database maintenance in
//! [`crate::sat::clause_management`].

use crate::sat::clause::{Clause, ClauseArena, ClauseRef};
use crate::sat::config::SolverConfig;
use crate::sat::literal::{Lit, Tribool, Variable};
use crate::sat::variable_order::VarOrder;
use itertools::Itertools;
use log::info;
use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use std::collections::VecDeque;

/// Major version of the solver.
pub const VERSION_MAJOR: u32 = 1;
/// Minor version of the solver.
pub const VERSION_MINOR: u32 = 0;

/// A list of clauses watching a literal.
pub(crate) type WatchList = SmallVec<[ClauseRef; 4]>;

/// Growth factor applied to `max_learnts` whenever the learnt-budget counter
/// reaches zero.
pub(crate) const MAX_LEARNTS_GROWTH: f64 = 1.1;
/// Growth factor for the learnt-budget counter increment itself.
pub(crate) const MAX_LEARNTS_CTR_INC_GROWTH: f64 = 1.5;
/// Base conflict budget for the first restart.
pub(crate) const MAX_CONFLICTS_GROWTH_START: f64 = 100.0;
/// Base of the geometric restart schedule.
pub(crate) const MAX_CONFLICTS_GROWTH_BASE: f64 = 2.0;

/// A CDCL SAT solver in the MiniSAT tradition.
#[derive(Debug, Clone)]
pub struct Solver {
    /// Tunable parameters for this solver.
    pub(crate) config: SolverConfig,

    // Model database.
    /// External (DIMACS) variable numbers to internal indices.
    pub(crate) user_vars: FxHashMap<i32, Variable>,
    /// Internal indices back to external variable numbers.
    pub(crate) internal_vars: Vec<i32>,
    /// The most recently discovered model, keyed by external variable.
    pub(crate) model: FxHashMap<i32, bool>,

    // Constraint database.
    /// Problem clauses.
    pub(crate) constrs: Vec<ClauseRef>,
    /// Learnt clauses.
    pub(crate) learnts: Vec<ClauseRef>,
    /// Owner of all clause storage.
    pub(crate) arena: ClauseArena,
    /// Clause activity increment.
    pub(crate) cla_inc: f64,
    /// Effective clause activity growth factor (reciprocal of the decay
    /// constant, so greater than one).
    pub(crate) cla_decay: f64,

    // Variable ordering.
    /// Per-variable activity scores.
    pub(crate) activity: Vec<f64>,
    /// Variable activity increment.
    pub(crate) var_inc: f64,
    /// Effective variable activity growth factor.
    pub(crate) var_decay: f64,
    /// Dynamic variable order.
    pub(crate) order: VarOrder,

    // Propagation.
    /// For each literal code, the clauses watching that literal's negation.
    pub(crate) watches: Vec<WatchList>,
    /// FIFO of assigned literals whose watch lists are still unprocessed.
    pub(crate) prop_q: VecDeque<Lit>,

    // Assignment.
    /// Current assignment, indexed by variable.
    pub(crate) assigns: Vec<Tribool>,
    /// Assigned literals in chronological order.
    pub(crate) trail: Vec<Lit>,
    /// Trail indices at which each decision level begins.
    pub(crate) trail_lim: Vec<usize>,
    /// The clause that propagated each variable, if any.
    pub(crate) reason: Vec<Option<ClauseRef>>,
    /// Decision level at which each variable was assigned, or -1.
    pub(crate) level: Vec<i32>,
    /// Decision level reached after enqueuing the assumptions; the search
    /// never backtracks above it.
    pub(crate) root_level: usize,
    /// Cleared when clause ingestion derives a top-level conflict.
    pub(crate) ok: bool,

    // Restart and learnt-database budgets.
    /// Maximum number of learnt clauses before the database is reduced.
    pub(crate) max_learnts: f64,
    /// Countdown of conflicts until `max_learnts` grows.
    pub(crate) max_learnts_ctr: i64,
    /// Reset value for the countdown, itself growing over time.
    pub(crate) max_learnts_ctr_inc: f64,
    /// Conflict budget of the current restart.
    pub(crate) max_conflicts: f64,

    // Statistics.
    pub(crate) propagations: usize,
    pub(crate) conflicts: usize,
    pub(crate) restarts: usize,
    pub(crate) decisions: usize,
}

impl Solver {
    /// Creates a fresh solver with the given configuration.
    #[must_use]
    pub fn new(config: SolverConfig) -> Self {
        Self {
            config,
            user_vars: FxHashMap::default(),
            internal_vars: Vec::new(),
            model: FxHashMap::default(),
            constrs: Vec::new(),
            learnts: Vec::new(),
            arena: ClauseArena::new(),
            cla_inc: 1.0,
            cla_decay: 1.0,
            activity: Vec::new(),
            var_inc: 1.0,
            var_decay: 1.0,
            order: VarOrder::new(),
            watches: Vec::new(),
            prop_q: VecDeque::new(),
            assigns: Vec::new(),
            trail: Vec::new(),
            trail_lim: Vec::new(),
            reason: Vec::new(),
            level: Vec::new(),
            root_level: 0,
            ok: true,
            max_learnts: 0.0,
            max_learnts_ctr: 0,
            max_learnts_ctr_inc: 0.0,
            max_conflicts: 0.0,
            propagations: 0,
            conflicts: 0,
            restarts: 0,
            decisions: 0,
        }
    }

    /// The solver version.
    #[must_use]
    pub fn version() -> String {
        format!("{VERSION_MAJOR}.{VERSION_MINOR}")
    }

    /// Adds a problem clause given as signed external integers.
    ///
    /// Returns `false` when the clause produced a top-level conflict, at
    /// which point the formula is already known to be unsatisfiable.
    pub fn add_clause(&mut self, ps: &[i32]) -> bool {
        let lits = ps.iter().map(|&p| self.intern_lit(p)).collect_vec();
        let (success, cref) = self.new_clause(lits, false);
        if success {
            if let Some(cref) = cref {
                self.constrs.push(cref);
            }
        } else {
            if let Some(cref) = cref {
                self.arena.free(cref);
            }
            self.ok = false;
        }
        success
    }

    /// Decides satisfiability under the given unit assumptions.
    ///
    /// Assumptions are signed external integers, imposed for the duration of
    /// this call. Returns `true` when a model was found; it can then be read
    /// with [`Self::answer`].
    pub fn solve(&mut self, assumptions: &[i32]) -> bool {
        if !self.ok {
            return false;
        }

        self.var_inc = 1.0;
        self.cla_inc = 1.0;
        self.max_learnts = self.n_constrs() as f64 / 3.0;
        self.max_learnts_ctr_inc = 100.0;
        self.max_learnts_ctr = self.max_learnts_ctr_inc as i64;

        if !self.simplify_db() {
            return false;
        }
        self.order.rebuild(&self.activity);

        let mut assumps = Vec::with_capacity(assumptions.len());
        for &p in assumptions {
            // An assumption over a variable the clauses never mentioned is
            // rejected outright.
            let Some(&var) = self.user_vars.get(&(p.unsigned_abs() as i32)) else {
                return false;
            };
            assumps.push(Lit::new(var, p < 0));
        }
        for &assump in &assumps {
            if !self.assume(assump) || self.propagate().is_some() {
                self.cancel_until(0);
                return false;
            }
        }
        self.root_level = self.decision_level();

        let mut status = Tribool::Undef;
        while status.is_undef() {
            self.max_conflicts =
                MAX_CONFLICTS_GROWTH_START * MAX_CONFLICTS_GROWTH_BASE.powi(self.restarts as i32);
            status = self.search();
            self.restarts += 1;
        }
        self.cancel_until(0);

        status.is_true()
    }

    /// Enumerates up to `count` distinct models under the given assumptions.
    ///
    /// After each model, a fresh solver is seeded with the original problem
    /// clauses plus one blocking clause per found model, each forbidding that
    /// exact assignment.
    pub fn solve_many(&mut self, assumptions: &[i32], count: u32) -> Vec<Vec<i32>> {
        let mut models: Vec<Vec<i32>> = Vec::new();

        for i in 0..count {
            if self.solve(assumptions) {
                info!("found {}/{} models", i + 1, count);
                models.push(self.answer());

                let constrs = self
                    .constrs
                    .iter()
                    .map(|&cref| self.clause_as_ints(cref))
                    .collect_vec();

                let mut fresh = Self::new(self.config);
                for clause in &constrs {
                    fresh.add_clause(clause);
                }
                for model in &models {
                    let blocking = model.iter().map(|&p| -p).collect_vec();
                    fresh.add_clause(&blocking);
                }
                *self = fresh;
            } else {
                info!("no more models exist");
                break;
            }
        }
        models
    }

    /// The current model as signed external literals, sorted ascending by
    /// absolute variable number.
    #[must_use]
    pub fn answer(&self) -> Vec<i32> {
        self.model
            .iter()
            .map(|(&var, &value)| if value { var } else { -var })
            .sorted_by_key(|p| p.abs())
            .collect_vec()
    }

    /// The number of variables.
    #[must_use]
    pub fn n_vars(&self) -> usize {
        self.assigns.len()
    }

    /// The number of assignments currently on the trail.
    #[must_use]
    pub fn n_assigns(&self) -> usize {
        self.trail.len()
    }

    /// The number of problem clauses.
    #[must_use]
    pub fn n_constrs(&self) -> usize {
        self.constrs.len()
    }

    /// The number of learnt clauses.
    #[must_use]
    pub fn n_learnts(&self) -> usize {
        self.learnts.len()
    }

    /// The number of propagations performed.
    #[must_use]
    pub const fn n_propagations(&self) -> usize {
        self.propagations
    }

    /// The number of conflicts encountered.
    #[must_use]
    pub const fn n_conflicts(&self) -> usize {
        self.conflicts
    }

    /// The number of restarts performed.
    #[must_use]
    pub const fn n_restarts(&self) -> usize {
        self.restarts
    }

    /// The number of decisions made.
    #[must_use]
    pub const fn n_decisions(&self) -> usize {
        self.decisions
    }

    /// The current decision level.
    #[must_use]
    pub(crate) fn decision_level(&self) -> usize {
        self.trail_lim.len()
    }

    /// Maps an external signed literal to an internal one, allocating the
    /// variable on first sight.
    pub(crate) fn intern_lit(&mut self, p: i32) -> Lit {
        let ext = p.unsigned_abs() as i32;
        if !self.user_vars.contains_key(&ext) {
            let var = self.n_vars() as Variable;
            self.user_vars.insert(ext, var);
            self.internal_vars.push(ext);
            self.watches.push(WatchList::new());
            self.watches.push(WatchList::new());
            self.reason.push(None);
            self.assigns.push(Tribool::Undef);
            self.level.push(-1);
            self.activity.push(0.0);
            self.order.insert_var();
        }
        Lit::new(self.user_vars[&ext], p < 0)
    }

    /// The truth value of `p` under the current assignment.
    #[must_use]
    pub(crate) fn lit_value(&self, p: Lit) -> Tribool {
        p.eval(&self.assigns)
    }

    /// Constructs a clause over internal literals and wires it into the
    /// solver.
    ///
    /// Problem clauses are normalized first: sorting makes duplicate and
    /// complementary literals adjacent, and a single pass then discards
    /// clauses that are already satisfied or tautological and drops
    /// duplicates and level-0 falsified literals. The result is dispatched on
    /// length: empty means a top-level conflict, unit clauses are enqueued as
    /// facts without entering the watch structure, and longer clauses watch
    /// their first two literals.
    ///
    /// For learnt clauses the literal with the highest decision level is
    /// moved into the second watch position, so the clause becomes unit again
    /// exactly when the search backtracks to its assertion level; the clause
    /// and its variables are bumped as a side effect.
    ///
    /// Returns `(success, handle)`; `success` is `false` on a top-level
    /// conflict, and the handle is `None` when the clause was discarded.
    pub(crate) fn new_clause(&mut self, mut lits: Vec<Lit>, learnt: bool) -> (bool, Option<ClauseRef>) {
        if !learnt {
            // Sorting puts duplicates and complementary pairs next to each
            // other.
            lits.sort_unstable();

            let mut last = Lit::UNDEF;
            let mut kept = 0;
            for i in 0..lits.len() {
                let p = lits[i];
                if self.lit_value(p).is_true() || p == !last {
                    // Already satisfied at the top level, or a tautology.
                    return (true, None);
                }
                if self.lit_value(p).is_false() || p == last {
                    continue;
                }
                lits[kept] = p;
                last = p;
                kept += 1;
            }
            lits.truncate(kept);
        }

        match lits.len() {
            0 => (false, None),
            1 => {
                // A unit clause is a fact; it never enters the watch lists.
                let unit = lits[0];
                let cref = self.arena.alloc(Clause::new(lits, learnt));
                (self.enqueue(unit, Some(cref)), Some(cref))
            }
            _ => {
                if learnt {
                    let max_idx = self.highest_level_index(&lits);
                    lits.swap(1, max_idx);
                }

                let first = lits[0];
                let second = lits[1];
                let cref = self.arena.alloc(Clause::new(lits, learnt));

                if learnt {
                    // Newly learnt clauses are considered active.
                    self.cla_bump_activity(cref);
                    for i in 0..self.arena.get(cref).len() {
                        let var = self.arena.get(cref)[i].var();
                        self.var_bump_activity(var);
                    }
                }

                self.watches[(!first).code()].push(cref);
                self.watches[(!second).code()].push(cref);

                (true, Some(cref))
            }
        }
    }

    /// Index of the literal assigned at the highest decision level.
    fn highest_level_index(&self, lits: &[Lit]) -> usize {
        let mut max_level = 0;
        let mut max_idx = 0;
        for (idx, p) in lits.iter().enumerate() {
            let level = self.level[p.var() as usize];
            if level > max_level {
                max_level = level;
                max_idx = idx;
            }
        }
        max_idx
    }

    /// Opens a new decision level and enqueues `p` as an assumption or
    /// decision. Returns `false` on immediate conflict.
    pub(crate) fn assume(&mut self, p: Lit) -> bool {
        self.trail_lim.push(self.n_assigns());
        self.enqueue(p, None)
    }

    /// Unbinds the most recently assigned variable and returns it to the
    /// variable order.
    pub(crate) fn undo_one(&mut self) {
        let p = *self.trail.last().expect("undo_one on an empty trail");
        let var = p.var() as usize;

        self.assigns[var] = Tribool::Undef;
        self.reason[var] = None;
        self.level[var] = -1;
        self.trail.pop();
        self.order.push(p.var(), &self.activity);
    }

    /// Reverts all assignments of the current decision level.
    pub(crate) fn cancel(&mut self) {
        let bound = self.trail_lim[self.decision_level() - 1];
        while self.n_assigns() > bound {
            self.undo_one();
        }
        self.trail_lim.pop();
    }

    /// Reverts assignments down to the given decision level.
    pub(crate) fn cancel_until(&mut self, level: usize) {
        while self.decision_level() > level {
            self.cancel();
        }
    }

    /// Bumps a variable's activity, rescaling all scores on overflow.
    pub(crate) fn var_bump_activity(&mut self, var: Variable) {
        self.activity[var as usize] += self.var_inc;
        if self.activity[var as usize] > 1e100 {
            self.var_rescale_activity();
        }
        self.order.update(var, &self.activity);
    }

    /// Grows the variable activity increment by the effective decay factor.
    pub(crate) fn var_decay_activity(&mut self) {
        self.var_inc *= self.var_decay;
    }

    fn var_rescale_activity(&mut self) {
        for activity in &mut self.activity {
            *activity *= 1e-100;
        }
        self.var_inc *= 1e-100;
    }

    /// Bumps a clause's activity, rescaling all learnt scores on overflow.
    pub(crate) fn cla_bump_activity(&mut self, cref: ClauseRef) {
        let activity = {
            let clause = self.arena.get_mut(cref);
            clause.activity += self.cla_inc;
            clause.activity
        };
        if activity + self.cla_inc > 1e20 {
            self.cla_rescale_activity();
        }
    }

    /// Grows the clause activity increment by the effective decay factor.
    pub(crate) fn cla_decay_activity(&mut self) {
        self.cla_inc *= self.cla_decay;
    }

    fn cla_rescale_activity(&mut self) {
        for &cref in &self.learnts {
            self.arena.get_mut(cref).activity *= 1e-20;
        }
        self.cla_inc *= 1e-20;
    }

    /// Applies both activity decays; called once per conflict.
    pub(crate) fn decay_activities(&mut self) {
        self.var_decay_activity();
        self.cla_decay_activity();
    }

    /// Renders a clause back as signed external integers.
    pub(crate) fn clause_as_ints(&self, cref: ClauseRef) -> Vec<i32> {
        self.arena
            .get(cref)
            .iter()
            .map(|&lit| {
                let ext = self.internal_vars[lit.var() as usize];
                if lit.is_negated() {
                    -ext
                } else {
                    ext
                }
            })
            .collect_vec()
    }
}
