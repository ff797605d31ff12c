//! Dutch Flat: every 5 must have a 1 directly above it or a 9 directly
//! below it. At a board edge only one of those neighbors exists, so it is
//! forced outright; in the interior either neighbor can carry the required
//! value and propagation only forces one side once the other has already
//! been ruled out.

use crate::board::Board;
use crate::error::Result;
use crate::impact_map::ImpactMap;
use crate::number_set::NumberSet;
use crate::region::CellIdx;
use crate::rules::RuleHandler;

#[derive(Debug, Default)]
pub struct RuleDutchFlat;

impl RuleDutchFlat {
    pub fn new() -> Self {
        RuleDutchFlat
    }

    pub fn from_json(_fields: &serde_json::Value, _board_size: u8) -> Result<Self> {
        Ok(RuleDutchFlat::new())
    }

    fn up_of(pos: CellIdx) -> Option<CellIdx> {
        (pos.r > 0).then(|| CellIdx::new(pos.r - 1, pos.c))
    }

    fn down_of(pos: CellIdx, size: u8) -> Option<CellIdx> {
        (pos.r + 1 < size).then(|| CellIdx::new(pos.r + 1, pos.c))
    }

    fn up_possible(board: &Board, pos: CellIdx) -> bool {
        match Self::up_of(pos) {
            None => false,
            Some(up) => {
                let cell = board.cell(up);
                if cell.is_solved() {
                    cell.value() == 1
                } else {
                    cell.candidates().test(1)
                }
            }
        }
    }

    fn down_possible(board: &Board, pos: CellIdx, size: u8) -> bool {
        match Self::down_of(pos, size) {
            None => false,
            Some(down) => {
                let cell = board.cell(down);
                if cell.is_solved() {
                    cell.value() == size
                } else {
                    cell.candidates().test(size)
                }
            }
        }
    }

    fn propagate_five(board: &mut Board, pos: CellIdx) -> bool {
        let size = board.size();
        let up_possible = Self::up_possible(board, pos);
        let down_possible = Self::down_possible(board, pos, size);
        let mut changed = false;
        if !up_possible {
            if let Some(down) = Self::down_of(pos, size) {
                if !board.cell(down).is_solved() {
                    changed |= board.cell_mut(down).only_allow_candidates(NumberSet::single(size, size));
                }
            }
        } else if !down_possible {
            if let Some(up) = Self::up_of(pos) {
                if !board.cell(up).is_solved() {
                    changed |= board.cell_mut(up).only_allow_candidates(NumberSet::single(1, size));
                }
            }
        }
        changed
    }
}

impl RuleHandler for RuleDutchFlat {
    fn number_changed(&mut self, board: &mut Board, _pos: CellIdx) -> bool {
        self.candidates_changed(board)
    }

    fn candidates_changed(&mut self, board: &mut Board) -> bool {
        let fives: Vec<CellIdx> = board.all_cells().filter(|&p| board.cell(p).is_solved() && board.cell(p).value() == 5).collect();
        let mut changed = false;
        for pos in fives {
            changed |= Self::propagate_five(board, pos);
        }
        changed
    }

    fn valid(&self, board: &Board) -> bool {
        let size = board.size();
        for pos in board.all_cells() {
            let cell = board.cell(pos);
            if cell.is_solved() && cell.value() == 5 {
                if !Self::up_possible(board, pos) && !Self::down_possible(board, pos, size) {
                    return false;
                }
            }
        }
        true
    }

    fn update_impact(&self, board: &Board, map: &mut ImpactMap) {
        for pos in board.all_cells() {
            if board.cell(pos).is_solved() && board.cell(pos).value() == 5 {
                if let Some(up) = Self::up_of(pos) {
                    map.increment(up);
                }
                if let Some(down) = Self::down_of(pos, board.size()) {
                    map.increment(down);
                }
            }
        }
    }

    fn name(&self) -> &'static str {
        "Dutch-Flat"
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::json!({ "type": "Dutch-Flat", "fields": {} })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Board;

    #[test]
    fn top_edge_forces_nine_below() {
        let mut board = Board::new(9).unwrap();
        board.set_cell(CellIdx::new(0, 0), 5, true);
        let mut rule = RuleDutchFlat::new();
        rule.candidates_changed(&mut board);
        let below = board.get_cell(CellIdx::new(1, 0)).unwrap();
        assert_eq!(below.candidates().count(), 1);
        assert!(below.candidates().test(9));
    }

    #[test]
    fn invalid_when_neither_neighbor_can_hold_required_value() {
        let mut board = Board::new(9).unwrap();
        board.set_cell(CellIdx::new(0, 0), 5, true);
        board.cell_mut(CellIdx::new(1, 0)).only_allow_candidates(NumberSet::single(2, 9));
        let rule = RuleDutchFlat::new();
        assert!(!rule.valid(&board));
    }
}
