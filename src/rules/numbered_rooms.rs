//! Numbered Rooms: a clue sits outside an oriented row or column. The first
//! cell along that line (from the clue's side) holds a digit `k`, and the
//! `k`-th cell along the same line must hold a specified value. Propagation
//! runs both ways: a solved first cell pins the `k`-th cell, and the first
//! cell's own candidates are pruned to those `k` for which the `k`-th cell
//! can still carry the target value.

use crate::board::Board;
use crate::error::Result;
use crate::impact_map::ImpactMap;
use crate::number_set::{Number, NumberSet};
use crate::region::{CellIdx, IndexKind, ORCIdx};
use crate::rules::json::{as_array, as_u8, encode_orc, field, parse_orc};
use crate::rules::RuleHandler;

#[derive(Debug)]
pub struct RuleNumberedRooms {
    lines: Vec<(ORCIdx, Number)>,
}

impl RuleNumberedRooms {
    pub fn new(lines: Vec<(ORCIdx, Number)>) -> Self {
        RuleNumberedRooms { lines }
    }

    pub fn from_json(fields: &serde_json::Value, _board_size: u8) -> Result<Self> {
        let lines = as_array(field(fields, "lines", "Numbered-Rooms")?, "Numbered-Rooms", "lines")?
            .iter()
            .map(|l| {
                let orc = parse_orc(field(l, "line", "Numbered-Rooms")?, "Numbered-Rooms")?;
                let value = as_u8(field(l, "value", "Numbered-Rooms")?, "Numbered-Rooms", "value")?;
                Ok((orc, value))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(RuleNumberedRooms::new(lines))
    }

    fn propagate_line(board: &mut Board, line: ORCIdx, value: Number) -> bool {
        let cells = line.attached_cells(board.size());
        let first = cells[0];
        let mut changed = false;

        if board.cell(first).is_solved() {
            let k = board.cell(first).value() as usize;
            if k >= 1 && k <= cells.len() {
                let target = cells[k - 1];
                if !board.cell(target).is_solved() {
                    changed |= board.cell_mut(target).only_allow_candidates(NumberSet::single(value, board.size()));
                }
            }
        }

        if !board.cell(first).is_solved() {
            let size = board.size();
            let mut allowed = NumberSet::empty(size);
            for k in board.cell(first).candidates().iter() {
                let idx = k as usize;
                if idx >= 1 && idx <= cells.len() {
                    let target = cells[idx - 1];
                    let cell = board.cell(target);
                    let still_possible = if cell.is_solved() { cell.value() == value } else { cell.candidates().test(value) };
                    if still_possible {
                        allowed.add(k);
                    }
                }
            }
            changed |= board.cell_mut(first).only_allow_candidates(allowed);
        }

        changed
    }
}

impl RuleHandler for RuleNumberedRooms {
    fn number_changed(&mut self, board: &mut Board, pos: CellIdx) -> bool {
        let mut changed = false;
        for &(line, value) in &self.lines {
            if line.attached_cells(board.size()).contains(&pos) {
                changed |= Self::propagate_line(board, line, value);
            }
        }
        changed
    }

    fn candidates_changed(&mut self, board: &mut Board) -> bool {
        let mut changed = false;
        for &(line, value) in &self.lines {
            changed |= Self::propagate_line(board, line, value);
        }
        changed
    }

    fn valid(&self, board: &Board) -> bool {
        for &(line, value) in &self.lines {
            let cells = line.attached_cells(board.size());
            let first = cells[0];
            let cell = board.cell(first);
            if cell.is_solved() {
                let k = cell.value() as usize;
                if k < 1 || k > cells.len() {
                    return false;
                }
                let target = board.cell(cells[k - 1]);
                let ok = if target.is_solved() { target.value() == value } else { target.candidates().test(value) };
                if !ok {
                    return false;
                }
            }
        }
        true
    }

    fn update_impact(&self, board: &Board, map: &mut ImpactMap) {
        for &(line, _) in &self.lines {
            for pos in line.attached_cells(board.size()) {
                map.increment(pos);
            }
        }
    }

    fn name(&self) -> &'static str {
        "Numbered-Rooms"
    }

    fn to_json(&self) -> serde_json::Value {
        let lines: Vec<serde_json::Value> =
            self.lines.iter().map(|&(orc, value)| serde_json::json!({ "line": encode_orc(orc), "value": value })).collect();
        serde_json::json!({ "type": "Numbered-Rooms", "fields": { "lines": lines } })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Board;
    use crate::region::RCIdx;

    #[test]
    fn solved_first_cell_pins_the_kth_cell() {
        let mut board = Board::new(9).unwrap();
        let line = ORCIdx::new(RCIdx::Row(0), false);
        let cells = line.attached_cells(9);
        board.set_cell(cells[0], 3, true);
        let mut rule = RuleNumberedRooms::new(vec![(line, 7)]);
        rule.candidates_changed(&mut board);
        let third = board.get_cell(cells[2]).unwrap();
        assert_eq!(third.candidates().count(), 1);
        assert!(third.candidates().test(7));
    }

    #[test]
    fn invalid_when_kth_cell_cannot_hold_value() {
        let mut board = Board::new(9).unwrap();
        let line = ORCIdx::new(RCIdx::Row(0), false);
        let cells = line.attached_cells(9);
        board.set_cell(cells[0], 3, true);
        board.set_cell(cells[2], 2, true);
        let rule = RuleNumberedRooms::new(vec![(line, 7)]);
        assert!(!rule.valid(&board));
    }
}
