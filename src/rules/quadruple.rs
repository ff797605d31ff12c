//! Quadruple clues: the digits printed at the intersection of up to four
//! cells must all appear somewhere among those cells. When the corner sits
//! on an edge or in a genuine board corner there are fewer than four
//! attached cells; propagation only forces candidates down to the
//! still-missing values when the attached-cell count exactly matches the
//! clue count, since otherwise a "slack" cell may legally hold a value the
//! clue never mentioned and narrowing it would be unsound.

use crate::board::Board;
use crate::error::Result;
use crate::impact_map::ImpactMap;
use crate::number_set::{Number, NumberSet};
use crate::region::{CellIdx, CornerIdx, IndexKind};
use crate::rules::json::{encode_corner, field, parse_corner, parse_numbers};
use crate::rules::RuleHandler;

#[derive(Debug)]
pub struct RuleQuadruple {
    corner: CornerIdx,
    values: Vec<Number>,
}

impl RuleQuadruple {
    pub fn new(corner: CornerIdx, values: Vec<Number>) -> Self {
        RuleQuadruple { corner, values }
    }

    pub fn from_json(fields: &serde_json::Value, _board_size: u8) -> Result<Self> {
        let corner = parse_corner(field(fields, "corner", "Quadruple")?, "Quadruple")?;
        let values = parse_numbers(field(fields, "values", "Quadruple")?, "Quadruple")?;
        Ok(RuleQuadruple::new(corner, values))
    }

    fn attached(&self, board: &Board) -> Vec<CellIdx> {
        self.corner.attached_cells(board.size())
    }

    /// The clue values not yet accounted for by a solved attached cell.
    fn missing_values(&self, board: &Board) -> Vec<Number> {
        let mut remaining = self.values.clone();
        for pos in self.attached(board) {
            let cell = board.cell(pos);
            if cell.is_solved() {
                if let Some(idx) = remaining.iter().position(|&v| v == cell.value()) {
                    remaining.remove(idx);
                }
            }
        }
        remaining
    }
}

impl RuleHandler for RuleQuadruple {
    fn number_changed(&mut self, board: &mut Board, pos: CellIdx) -> bool {
        if self.attached(board).contains(&pos) {
            self.candidates_changed(board)
        } else {
            false
        }
    }

    fn candidates_changed(&mut self, board: &mut Board) -> bool {
        let attached = self.attached(board);
        if attached.len() != self.values.len() {
            return false;
        }
        let missing = self.missing_values(board);
        if missing.is_empty() {
            return false;
        }
        let size = board.size();
        let mut allowed = NumberSet::empty(size);
        for &v in &missing {
            allowed.add(v);
        }
        let mut changed = false;
        for pos in attached {
            if !board.cell(pos).is_solved() {
                changed |= board.cell_mut(pos).only_allow_candidates(allowed);
            }
        }
        changed
    }

    fn valid(&self, board: &Board) -> bool {
        let attached = self.attached(board);
        for &v in &self.values {
            let solved_matches = attached.iter().filter(|&&p| board.cell(p).is_solved() && board.cell(p).value() == v).count();
            let reachable = attached.iter().filter(|&&p| !board.cell(p).is_solved() && board.cell(p).candidates().test(v)).count();
            let required = self.values.iter().filter(|&&x| x == v).count();
            if solved_matches + reachable < required {
                return false;
            }
        }
        true
    }

    fn update_impact(&self, board: &Board, map: &mut ImpactMap) {
        for pos in self.attached(board) {
            map.increment(pos);
        }
    }

    fn name(&self) -> &'static str {
        "Quadruple"
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::json!({ "type": "Quadruple", "fields": { "corner": encode_corner(self.corner), "values": self.values } })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Board;

    #[test]
    fn forces_missing_values_when_no_slack_cell() {
        let mut board = Board::new(9).unwrap();
        let corner = CornerIdx::new(1, 1);
        let rule = RuleQuadruple::new(corner, vec![1, 2, 3, 4]);
        let attached = rule.attached(&board);
        assert_eq!(attached.len(), 4);
        board.set_cell(attached[0], 1, true);
        let mut rule = rule;
        rule.candidates_changed(&mut board);
        for &pos in &attached[1..] {
            let cands = board.get_cell(pos).unwrap().candidates();
            assert!(!cands.test(5));
            assert!(cands.test(2) || cands.test(3) || cands.test(4));
        }
    }

    #[test]
    fn invalid_when_a_value_is_unreachable() {
        let mut board = Board::new(4).unwrap();
        let corner = CornerIdx::new(0, 0);
        let rule = RuleQuadruple::new(corner, vec![1, 2]);
        let attached = rule.attached(&board);
        for &pos in &attached {
            board.cell_mut(pos).only_allow_candidates(crate::number_set::NumberSet::single(3, 4));
        }
        assert!(!rule.valid(&board));
    }
}
