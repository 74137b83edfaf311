#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]

//! Command-line front-end for the solver.
//!
//! Reads a DIMACS CNF file, solves it, and prints `p SAT` followed by one
//! line per model (signed integers terminated by `0`), or `p UNSAT`.
//! Statistics go to stderr. Exit codes: 0 on SAT, 3 on UNSAT, 1 on I/O
//! errors, 2 on usage errors.

use clap::Parser;
use log::info;
use satyr::sat::config::SolverConfig;
use satyr::sat::dimacs::{self, DimacsError};
use satyr::sat::solver::Solver;
use std::fmt::Write as _;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::{Duration, Instant};

/// A CDCL SAT solver for DIMACS CNF formulas.
#[derive(Parser, Debug)]
#[command(name = "satyr", version, about)]
struct Cli {
    /// Path to the DIMACS .cnf file to solve.
    path: PathBuf,

    /// Number of models to find.
    #[arg(short = 'm', long = "models", default_value_t = 1)]
    models: u32,

    /// Variable activity decay constant.
    #[arg(long = "decay-var", default_value_t = 0.95)]
    decay_var: f64,

    /// Clause activity decay constant.
    #[arg(long = "decay-cla", default_value_t = 0.999)]
    decay_cla: f64,
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    match run(&cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(3),
        Err(err) => {
            eprintln!("{err}");
            ExitCode::from(1)
        }
    }
}

/// Solves the given file; `Ok(true)` means at least one model was found.
fn run(cli: &Cli) -> Result<bool, DimacsError> {
    let clauses = dimacs::parse_file(&cli.path)?;

    let mut solver = Solver::new(SolverConfig {
        var_decay: cli.decay_var,
        cla_decay: cli.decay_cla,
    });
    for clause in &clauses {
        solver.add_clause(clause);
    }

    info!("starting satyr {} solver", Solver::version());
    let start = Instant::now();
    let models = solve(&mut solver, cli.models);
    info!("finished solving");

    display_stats(&solver, start.elapsed());

    if models.is_empty() {
        println!("p UNSAT");
        return Ok(false);
    }
    println!("p SAT");
    display_models(&models);

    Ok(true)
}

fn solve(solver: &mut Solver, models: u32) -> Vec<Vec<i32>> {
    if models > 1 {
        return solver.solve_many(&[], models);
    }
    if solver.solve(&[]) {
        vec![solver.answer()]
    } else {
        Vec::new()
    }
}

fn display_models(models: &[Vec<i32>]) {
    for model in models {
        let mut line = String::new();
        for p in model {
            let _ = write!(line, "{p} ");
        }
        println!("{line}0");
    }
}

fn display_stats(solver: &Solver, elapsed: Duration) {
    eprintln!();
    eprintln!("Time Taken:    {:.6}s", elapsed.as_secs_f64());
    eprintln!("Variables:     {}", solver.n_vars());
    eprintln!("Constraints:   {}", solver.n_constrs());
    eprintln!("Conflicts:     {}", solver.n_conflicts());
    eprintln!("Propagations:  {}", solver.n_propagations());
    eprintln!("Restarts:      {}", solver.n_restarts());
    eprintln!("Decisions:     {}", solver.n_decisions());
    eprintln!();
}
