use std::fmt;
use std::time::Duration;

#[derive(Clone, Copy, PartialEq, Debug, Default)]
pub struct SolverStats {
    pub solutions_found: usize,
    pub nodes_explored: usize,
    pub guesses_made: usize,
    pub time_ms: f64,
    pub interrupted_by_node_limit: bool,
    pub interrupted_by_solution_limit: bool,
}

impl SolverStats {
    pub fn record_elapsed(&mut self, elapsed: Duration) {
        self.time_ms = elapsed.as_secs_f64() * 1000.0;
    }
}

impl fmt::Display for SolverStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "solutions_found:              {}", self.solutions_found)?;
        writeln!(f, "nodes_explored:                {}", self.nodes_explored)?;
        writeln!(f, "guesses_made:                  {}", self.guesses_made)?;
        writeln!(f, "time_ms:                       {:.3}", self.time_ms)?;
        writeln!(f, "interrupted_by_node_limit:     {}", self.interrupted_by_node_limit)?;
        write!(f, "interrupted_by_solution_limit: {}", self.interrupted_by_solution_limit)
    }
}
