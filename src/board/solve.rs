use std::time::Instant;

use rand::seq::SliceRandom;
use rand::Rng;

use super::Board;
use crate::region::CellIdx;
use crate::solution::Solution;
use crate::solver_stats::SolverStats;

/// How a recursive search call wants its caller to unwind. `Continue` means
/// "keep trying sibling branches"; the other two mean "stop everywhere,
/// nothing further at this level or above should run."
enum Flow {
    Continue,
    NodeLimit,
    SolutionLimit,
}

impl Board {
    fn current_solution(&self) -> Solution {
        let values = self.grid.iter().map(|c| c.value()).collect();
        Solution::new(self.size, values)
    }

    /// Picks the next branch cell: fewest candidates, then highest impact,
    /// then uniformly at random among whatever remains tied. Panics if no
    /// empty cell exists; callers only reach here when `!is_solved()`, which
    /// guarantees one does.
    fn select_branch_cell<R: Rng>(&self, rng: &mut R) -> CellIdx {
        let mut min_count = u32::MAX;
        for pos in self.all_cells() {
            let cell = self.cell(pos);
            if !cell.is_solved() {
                min_count = min_count.min(cell.candidates().count() as u32);
            }
        }
        assert_ne!(min_count, u32::MAX, "no empty cell found while board is not solved");

        let mut tied: Vec<CellIdx> = self
            .all_cells()
            .filter(|&pos| {
                let cell = self.cell(pos);
                !cell.is_solved() && cell.candidates().count() as u32 == min_count
            })
            .collect();
        let max_impact = tied.iter().map(|&pos| self.impact(pos)).max().unwrap();
        tied.retain(|&pos| self.impact(pos) == max_impact);

        tied[rng.gen_range(0..tied.len())]
    }

    /// Finds up to `max_solutions` solutions, exploring at most `max_nodes`
    /// search-tree nodes. `rng` is the solver's sole source of randomness
    /// (branch tie-breaking); callers control determinism by seeding it.
    pub fn solve<R: Rng>(&mut self, max_solutions: usize, max_nodes: usize, rng: &mut R) -> (Vec<Solution>, SolverStats) {
        let start = Instant::now();
        let mut stats = SolverStats::default();
        let mut solutions = Vec::new();
        self.solve_step(max_solutions, max_nodes, rng, &mut stats, &mut solutions);
        stats.solutions_found = solutions.len();
        stats.record_elapsed(start.elapsed());
        (solutions, stats)
    }

    fn solve_step<R: Rng>(
        &mut self,
        max_solutions: usize,
        max_nodes: usize,
        rng: &mut R,
        stats: &mut SolverStats,
        solutions: &mut Vec<Solution>,
    ) -> Flow {
        stats.nodes_explored += 1;
        if stats.nodes_explored > max_nodes {
            stats.interrupted_by_node_limit = true;
            return Flow::NodeLimit;
        }

        if self.is_solved() {
            solutions.push(self.current_solution());
            if solutions.len() >= max_solutions {
                stats.interrupted_by_solution_limit = true;
                return Flow::SolutionLimit;
            }
            return Flow::Continue;
        }

        let pos = self.select_branch_cell(rng);
        let candidates: Vec<_> = self.cell(pos).candidates().iter().collect();
        if candidates.len() > 1 {
            stats.guesses_made += 1;
        }

        for v in candidates {
            if self.set_cell(pos, v, false) {
                let flow = self.solve_step(max_solutions, max_nodes, rng, stats, solutions);
                self.pop_history();
                match flow {
                    Flow::Continue => {}
                    Flow::NodeLimit | Flow::SolutionLimit => return flow,
                }
            }
        }
        Flow::Continue
    }

    /// Certifies, for every cell, which candidate values are actually
    /// reachable in some solution. Runs a single-solution search per
    /// (cell, value) trial over a shuffled cell order, narrowing a "tracker"
    /// clone of the board as it goes: a trial that proves a value
    /// unreachable removes it from both the tracker and the live board; a
    /// trial that finds a solution removes, from the tracker only, every
    /// value that solution already accounts for, so it is never re-tried.
    /// `on_progress` is called with the fraction of cells visited so far;
    /// `on_solution` once per newly-discovered distinct solution.
    pub fn solve_complete<R: Rng>(
        &mut self,
        max_nodes: usize,
        rng: &mut R,
        mut on_progress: impl FnMut(f64),
        mut on_solution: impl FnMut(&Solution),
    ) -> (Vec<Solution>, SolverStats) {
        let start = Instant::now();
        let mut tracker = self.shallow_clone();
        let mut stats = SolverStats::default();
        let mut solutions: Vec<Solution> = Vec::new();

        let mut order: Vec<CellIdx> = self.all_cells().collect();
        order.shuffle(rng);
        let total = order.len();

        for (i, pos) in order.into_iter().enumerate() {
            if !tracker.cell(pos).is_solved() {
                let values: Vec<_> = tracker.cell(pos).candidates().iter().collect();
                for v in values {
                    if !tracker.cell(pos).candidates().test(v) {
                        continue;
                    }
                    if self.set_cell(pos, v, false) {
                        let (sub_solutions, sub_stats) = self.solve(1, max_nodes, rng);
                        stats.nodes_explored += sub_stats.nodes_explored;
                        stats.guesses_made += sub_stats.guesses_made;
                        self.pop_history();

                        if let Some(solution) = sub_solutions.into_iter().next() {
                            for (idx, &val) in solution.values.iter().enumerate() {
                                let size = tracker.size as usize;
                                let cell_pos = CellIdx::new((idx / size) as u8, (idx % size) as u8);
                                if !tracker.cell(cell_pos).is_solved() {
                                    tracker.cell_mut(cell_pos).remove_candidate(val);
                                }
                            }
                            if !solutions.contains(&solution) {
                                on_solution(&solution);
                                solutions.push(solution);
                            }
                        } else if !sub_stats.interrupted_by_node_limit {
                            tracker.cell_mut(pos).remove_candidate(v);
                            self.cell_mut(pos).remove_candidate(v);
                        } else {
                            stats.interrupted_by_node_limit = true;
                        }
                    }
                }
            }
            on_progress((i + 1) as f64 / total as f64);
        }

        stats.solutions_found = solutions.len();
        stats.record_elapsed(start.elapsed());
        (solutions, stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::standard::RuleStandard;

    fn board_with_standard(size: u8) -> Board {
        let mut board = Board::new(size).unwrap();
        board.add_handler(Box::new(RuleStandard::new()));
        board
    }

    #[test]
    fn solve_finds_a_solution_for_an_empty_4x4() {
        let mut board = board_with_standard(4);
        let mut rng = rand::rngs::mock::StepRng::new(0, 1);
        let (solutions, stats) = board.solve(1, 100_000, &mut rng);
        assert_eq!(solutions.len(), 1);
        assert_eq!(stats.solutions_found, 1);
        assert!(!stats.interrupted_by_node_limit);
    }

    #[test]
    fn solve_respects_max_solutions() {
        let mut board = board_with_standard(4);
        let mut rng = rand::rngs::mock::StepRng::new(1, 1);
        let (solutions, stats) = board.solve(2, 1_000_000, &mut rng);
        assert!(solutions.len() <= 2);
        assert!(stats.nodes_explored > 0);
    }

    #[test]
    fn solve_honors_a_tight_node_budget() {
        let mut board = board_with_standard(9);
        let mut rng = rand::rngs::mock::StepRng::new(2, 1);
        let (_solutions, stats) = board.solve(1, 1, &mut rng);
        assert!(stats.interrupted_by_node_limit);
    }

    #[test]
    fn solve_complete_reports_progress_and_a_solution_on_a_4x4() {
        let mut board = board_with_standard(4);
        let mut rng = rand::rngs::mock::StepRng::new(3, 1);
        let mut progress_calls = 0;
        let mut solution_calls = 0;
        let (solutions, stats) = board.solve_complete(
            50_000,
            &mut rng,
            |_frac| progress_calls += 1,
            |_sol| solution_calls += 1,
        );
        assert!(progress_calls > 0);
        assert!(!solutions.is_empty());
        assert_eq!(solution_calls, solutions.len());
        assert!(stats.solutions_found >= 1);
    }
}
