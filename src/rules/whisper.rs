//! Whisper lines: every adjacent pair along a path differs by at least a
//! fixed gap (5 on a 9x9 board, which rules out 5 itself as a valid
//! difference since no pair five apart straddles it... in practice it just
//! excludes the middle digit from ever sitting next to itself-plus-or-minus
//! four). Propagation mirrors Kropki's per-edge narrowing, generalized to an
//! arbitrary path and a minimum gap instead of a fixed relation.

use crate::board::Board;
use crate::error::Result;
use crate::impact_map::ImpactMap;
use crate::number_set::{Number, NumberSet};
use crate::region::{CellIdx, Region};
use crate::rules::json::{as_u8, encode_paths, field, parse_paths};
use crate::rules::utils::generate_random_path;
use crate::rules::RuleHandler;

fn satisfies(min_diff: Number, a: Number, b: Number) -> bool {
    (a as i16 - b as i16).abs() >= min_diff as i16
}

#[derive(Debug)]
pub struct RuleWhisper {
    paths: Vec<Vec<CellIdx>>,
    min_diff: Number,
}

impl RuleWhisper {
    pub fn new(paths: Vec<Vec<CellIdx>>, min_diff: Number) -> Self {
        RuleWhisper { paths, min_diff }
    }

    pub fn from_json(fields: &serde_json::Value, _board_size: u8) -> Result<Self> {
        let paths = parse_paths(field(fields, "paths", "Whisper")?, "Whisper")?;
        let min_diff = as_u8(field(fields, "min_diff", "Whisper")?, "Whisper", "min_diff")?;
        Ok(RuleWhisper::new(paths, min_diff))
    }

    fn propagate_edge(board: &mut Board, a: CellIdx, b: CellIdx, min_diff: Number) -> bool {
        let size = board.size();
        let ca = board.cell(a).candidates();
        let cb = board.cell(b).candidates();
        let mut changed = false;
        if !board.cell(a).is_solved() {
            let mut allowed = NumberSet::empty(size);
            for v in ca.iter() {
                if cb.iter().any(|w| satisfies(min_diff, v, w)) {
                    allowed.add(v);
                }
            }
            changed |= board.cell_mut(a).only_allow_candidates(allowed);
        }
        if !board.cell(b).is_solved() {
            let mut allowed = NumberSet::empty(size);
            for v in cb.iter() {
                if ca.iter().any(|w| satisfies(min_diff, v, w)) {
                    allowed.add(v);
                }
            }
            changed |= board.cell_mut(b).only_allow_candidates(allowed);
        }
        changed
    }
}

impl RuleHandler for RuleWhisper {
    fn number_changed(&mut self, board: &mut Board, pos: CellIdx) -> bool {
        let mut changed = false;
        for path in self.paths.clone() {
            for window in path.windows(2) {
                if window[0] == pos || window[1] == pos {
                    changed |= Self::propagate_edge(board, window[0], window[1], self.min_diff);
                }
            }
        }
        changed
    }

    fn candidates_changed(&mut self, board: &mut Board) -> bool {
        let mut changed = false;
        for path in self.paths.clone() {
            for window in path.windows(2) {
                changed |= Self::propagate_edge(board, window[0], window[1], self.min_diff);
            }
        }
        changed
    }

    fn valid(&self, board: &Board) -> bool {
        for path in &self.paths {
            for window in path.windows(2) {
                let a = board.cell(window[0]);
                let b = board.cell(window[1]);
                if a.is_solved() && b.is_solved() && !satisfies(self.min_diff, a.value(), b.value()) {
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
        self.min_diff = board_size / 2;
        let mut available: Region<CellIdx> = Region::all(board_size).into_iter().collect();
        let length = board_size.min(4).max(2) as usize;
        let path = generate_random_path(board_size, length, &mut available, rng);
        if path.size() >= 2 {
            self.paths.push(path.items().to_vec());
        }
    }

    fn name(&self) -> &'static str {
        "Whisper"
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::json!({ "type": "Whisper", "fields": { "paths": encode_paths(&self.paths), "min_diff": self.min_diff } })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Board;

    #[test]
    fn rejects_close_neighbors() {
        let mut board = Board::new(9).unwrap();
        board.set_cell(CellIdx::new(0, 0), 5, true);
        board.set_cell(CellIdx::new(0, 1), 6, true);
        let rule = RuleWhisper::new(vec![vec![CellIdx::new(0, 0), CellIdx::new(0, 1)]], 5);
        assert!(!rule.valid(&board));
    }
}
