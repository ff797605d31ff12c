//! Parity lines: along a path, parity alternates cell to cell, but which
//! phase — even-index cells odd, or even-index cells even — is not fixed
//! up front. Both hypotheses are tracked as running candidate masks; a
//! hypothesis dies the moment some cell on the path can no longer support
//! the parity it demands there, and only masks that survive both hypotheses
//! get applied back (a phase that's still alive imposes no restriction on
//! its own, since the other phase might be the real one).

use crate::board::Board;
use crate::error::Result;
use crate::impact_map::ImpactMap;
use crate::number_set::NumberSet;
use crate::region::CellIdx;
use crate::rules::json::{encode_paths, field, parse_paths};
use crate::rules::RuleHandler;

#[derive(Debug)]
pub struct RuleParity {
    paths: Vec<Vec<CellIdx>>,
}

impl RuleParity {
    pub fn new(paths: Vec<Vec<CellIdx>>) -> Self {
        RuleParity { paths }
    }

    pub fn from_json(fields: &serde_json::Value, _board_size: u8) -> Result<Self> {
        let paths = parse_paths(field(fields, "paths", "Parity")?, "Parity")?;
        Ok(RuleParity::new(paths))
    }

    /// Phase 0: even-index cells want odd values. Phase 1: the reverse.
    fn phase_mask(size: u8, phase: usize, index: usize) -> NumberSet {
        let wants_odd = (index % 2 == 0) == (phase == 0);
        if wants_odd {
            NumberSet::odd(size)
        } else {
            NumberSet::even(size)
        }
    }

    fn phases_alive(board: &Board, path: &[CellIdx]) -> [bool; 2] {
        let size = board.size();
        let mut alive = [true, true];
        for phase in 0..2 {
            for (i, &pos) in path.iter().enumerate() {
                let mask = Self::phase_mask(size, phase, i);
                if board.cell(pos).candidates().intersection(&mask).is_empty() {
                    alive[phase] = false;
                    break;
                }
            }
        }
        alive
    }

    fn propagate(board: &mut Board, path: &[CellIdx]) -> bool {
        let size = board.size();
        let alive = Self::phases_alive(board, path);
        if !alive[0] && !alive[1] {
            return false;
        }
        let mut changed = false;
        for (i, &pos) in path.iter().enumerate() {
            let mut allowed = NumberSet::empty(size);
            for phase in 0..2 {
                if alive[phase] {
                    allowed = allowed.union(&Self::phase_mask(size, phase, i));
                }
            }
            changed |= board.cell_mut(pos).only_allow_candidates(allowed);
        }
        changed
    }
}

impl RuleHandler for RuleParity {
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
        self.paths.iter().all(|path| {
            let alive = Self::phases_alive(board, path);
            alive[0] || alive[1]
        })
    }

    fn update_impact(&self, _board: &Board, map: &mut ImpactMap) {
        for path in &self.paths {
            for &pos in path {
                map.increment(pos);
            }
        }
    }

    fn name(&self) -> &'static str {
        "Parity"
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::json!({ "type": "Parity", "fields": { "paths": encode_paths(&self.paths) } })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Board;

    #[test]
    fn fixing_one_cell_narrows_the_whole_path() {
        let mut board = Board::new(9).unwrap();
        board.set_cell(CellIdx::new(0, 0), 2, true);
        let path = vec![CellIdx::new(0, 0), CellIdx::new(0, 1), CellIdx::new(0, 2)];
        let mut rule = RuleParity::new(vec![path.clone()]);
        rule.candidates_changed(&mut board);
        assert_eq!(board.get_cell(path[1]).unwrap().candidates(), NumberSet::odd(9));
        assert_eq!(board.get_cell(path[2]).unwrap().candidates(), NumberSet::even(9));
    }

    #[test]
    fn invalid_when_both_phases_die() {
        let mut board = Board::new(9).unwrap();
        board.set_cell(CellIdx::new(0, 0), 2, true);
        board.set_cell(CellIdx::new(0, 1), 4, true);
        let rule = RuleParity::new(vec![vec![CellIdx::new(0, 0), CellIdx::new(0, 1)]]);
        assert!(!rule.valid(&board));
    }
}
