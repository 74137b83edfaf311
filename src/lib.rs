//! A conflict-driven clause-learning (CDCL) SAT solver in the MiniSAT
//! tradition.
//!
//! Given a propositional formula in conjunctive normal form, the solver
//! decides satisfiability and, when satisfiable, produces a satisfying
//! assignment; it can also enumerate multiple distinct models. The engine
//! combines two-watched-literal unit propagation, 1-UIP clause learning with
//! non-chronological backtracking, activity-driven learnt-clause reduction,
//! a VSIDS-style decision heuristic and a geometric restart schedule.
//!
//! ```
//! use satyr::sat::config::SolverConfig;
//! use satyr::sat::solver::Solver;
//!
//! let mut solver = Solver::new(SolverConfig::default());
//! solver.add_clause(&[1, 2]);
//! solver.add_clause(&[-1, 2]);
//!
//! assert!(solver.solve(&[]));
//! assert!(solver.answer().contains(&2));
//! ```

/// The `sat` module implements the SAT solver core and its DIMACS front-end.
pub mod sat;
