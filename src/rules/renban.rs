//! Renban lines: a path of `k` cells must hold `k` distinct consecutive
//! integers, in any order along the path. A candidate value survives only if
//! some length-`k` window `[lo, lo+k-1]` is still feasible: every cell on the
//! path can reach into the window, and every value in the window has some
//! cell that could supply it. That is sound but weak — it never rejects a
//! window some completion could still use.

use crate::board::Board;
use crate::error::Result;
use crate::impact_map::ImpactMap;
use crate::number_set::{Number, NumberSet};
use crate::region::{CellIdx, Region};
use crate::rules::json::{encode_paths, field, parse_paths};
use crate::rules::utils::generate_random_path;
use crate::rules::RuleHandler;

#[derive(Debug)]
pub struct RuleRenban {
    paths: Vec<Vec<CellIdx>>,
}

impl RuleRenban {
    pub fn new(paths: Vec<Vec<CellIdx>>) -> Self {
        RuleRenban { paths }
    }

    pub fn from_json(fields: &serde_json::Value, _board_size: u8) -> Result<Self> {
        let paths = parse_paths(field(fields, "paths", "Renban")?, "Renban")?;
        Ok(RuleRenban::new(paths))
    }

    fn propagate(board: &mut Board, path: &[CellIdx]) -> bool {
        let size = board.size();
        let k = path.len() as Number;
        if k == 0 || k > size {
            return false;
        }

        let mut allowed = NumberSet::empty(size);
        for lo in 1..=(size - k + 1) {
            let hi = lo + k - 1;
            let window = NumberSet::at_least(lo, size).intersection(&NumberSet::at_most(hi, size));
            let cells_reach = path.iter().all(|&p| !board.cell(p).candidates().intersection(&window).is_empty());
            if !cells_reach {
                continue;
            }
            let mut covered = NumberSet::empty(size);
            for &p in path {
                covered = covered.union(&board.cell(p).candidates().intersection(&window));
            }
            if covered == window {
                allowed = allowed.union(&window);
            }
        }

        let mut changed = false;
        for &pos in path {
            changed |= board.cell_mut(pos).only_allow_candidates(allowed);
        }
        changed
    }
}

impl RuleHandler for RuleRenban {
    fn number_changed(&mut self, _board: &mut Board, _pos: CellIdx) -> bool {
        false
    }

    fn candidates_changed(&mut self, board: &mut Board) -> bool {
        let mut changed = false;
        for path in self.paths.clone() {
            changed |= Self::propagate(board, &path);
        }
        changed
    }

    fn valid(&self, board: &Board) -> bool {
        for path in &self.paths {
            let k = path.len() as i32;
            let mut solved: Vec<Number> = path.iter().filter_map(|&p| board.cell(p).is_solved().then(|| board.cell(p).value())).collect();
            let before = solved.len();
            solved.sort_unstable();
            solved.dedup();
            if solved.len() != before {
                return false;
            }
            if let (Some(&min), Some(&max)) = (solved.first(), solved.last()) {
                if (max as i32 - min as i32 + 1) > k {
                    return false;
                }
            }
        }
        true
    }

    fn update_impact(&self, _board: &Board, map: &mut ImpactMap) {
        for path in &self.paths {
            for &pos in path {
                map.increment(pos);
            }
        }
    }

    fn init_randomly(&mut self, board_size: u8, rng: &mut dyn rand::RngCore) {
        let mut available: Region<CellIdx> = Region::all(board_size).into_iter().collect();
        let length = board_size.min(4).max(2) as usize;
        let path = generate_random_path(board_size, length, &mut available, rng);
        if path.size() >= 2 {
            self.paths.push(path.items().to_vec());
        }
    }

    fn name(&self) -> &'static str {
        "Renban"
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::json!({ "type": "Renban", "fields": { "paths": encode_paths(&self.paths) } })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Board;

    #[test]
    fn eliminates_values_outside_every_window() {
        let mut board = Board::new(9).unwrap();
        let path = vec![CellIdx::new(0, 0), CellIdx::new(0, 1), CellIdx::new(0, 2)];
        board.set_cell(CellIdx::new(0, 0), 7, true);
        let mut rule = RuleRenban::new(vec![path.clone()]);
        rule.candidates_changed(&mut board);
        // with a 7 fixed in a length-3 window, only 5..9 windows containing 7 remain: {5,6,7},{6,7,8},{7,8,9}
        for &pos in &path[1..] {
            let c = board.get_cell(pos).unwrap().candidates();
            assert!(!c.test(1));
            assert!(!c.test(2));
        }
    }

    #[test]
    fn invalid_on_duplicate() {
        let mut board = Board::new(9).unwrap();
        board.set_cell(CellIdx::new(0, 0), 3, true);
        board.set_cell(CellIdx::new(0, 1), 3, true);
        let rule = RuleRenban::new(vec![vec![CellIdx::new(0, 0), CellIdx::new(0, 1)]]);
        assert!(!rule.valid(&board));
    }
}
