//! Thermometers: an ordered path of cells must strictly increase from bulb
//! to tip. Propagation is a forward/backward bound sweep, not a peer
//! elimination, so all of it lives in `candidates_changed`.

use crate::board::Board;
use crate::error::Result;
use crate::impact_map::ImpactMap;
use crate::number_set::NumberSet;
use crate::region::{CellIdx, Region};
use crate::rules::json::{encode_paths, field, parse_paths};
use crate::rules::utils::generate_random_path;
use crate::rules::RuleHandler;

#[derive(Debug)]
pub struct RuleThermo {
    paths: Vec<Vec<CellIdx>>,
}

impl RuleThermo {
    pub fn new(paths: Vec<Vec<CellIdx>>) -> Self {
        RuleThermo { paths }
    }

    pub fn from_json(fields: &serde_json::Value, _board_size: u8) -> Result<Self> {
        let paths = parse_paths(field(fields, "paths", "Thermo")?, "Thermo")?;
        Ok(RuleThermo::new(paths))
    }

    fn propagate(board: &mut Board, path: &[CellIdx]) -> bool {
        let size = board.size();
        let mut changed = false;

        let mut floor: u8 = 1;
        for &pos in path {
            changed |= board.cell_mut(pos).only_allow_candidates(NumberSet::at_least(floor, size));
            floor = board.cell(pos).candidates().lowest().map(|v| v.saturating_add(1)).unwrap_or(floor);
        }

        let mut ceiling: u8 = size;
        for &pos in path.iter().rev() {
            changed |= board.cell_mut(pos).only_allow_candidates(NumberSet::at_most(ceiling, size));
            ceiling = board.cell(pos).candidates().highest().map(|v| v.saturating_sub(1)).unwrap_or(ceiling);
        }
        changed
    }
}

impl RuleHandler for RuleThermo {
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
            for window in path.windows(2) {
                let a = board.cell(window[0]);
                let b = board.cell(window[1]);
                if a.is_solved() && b.is_solved() && a.value() >= b.value() {
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
        let length = (board_size / 2).max(2) as usize;
        let path = generate_random_path(board_size, length, &mut available, rng);
        if path.size() >= 2 {
            self.paths.push(path.items().to_vec());
        }
    }

    fn name(&self) -> &'static str {
        "Thermo"
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::json!({ "type": "Thermo", "fields": { "paths": encode_paths(&self.paths) } })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Board;

    #[test]
    fn forward_and_backward_bounds_narrow_the_ends() {
        let mut board = Board::new(9).unwrap();
        let path = vec![CellIdx::new(0, 0), CellIdx::new(0, 1), CellIdx::new(0, 2), CellIdx::new(0, 3)];
        let mut rule = RuleThermo::new(vec![path.clone()]);
        rule.candidates_changed(&mut board);
        assert_eq!(board.get_cell(path[0]).unwrap().candidates(), NumberSet::at_most(6, 9));
        assert_eq!(board.get_cell(path[3]).unwrap().candidates(), NumberSet::at_least(4, 9));
    }

    #[test]
    fn invalid_when_non_increasing() {
        let mut board = Board::new(9).unwrap();
        board.set_cell(CellIdx::new(0, 0), 5, true);
        board.set_cell(CellIdx::new(0, 1), 3, true);
        let rule = RuleThermo::new(vec![vec![CellIdx::new(0, 0), CellIdx::new(0, 1)]]);
        assert!(!rule.valid(&board));
    }
}
