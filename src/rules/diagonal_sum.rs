//! Diagonal sum: the values along a specified (anti-)diagonal must sum to a
//! target. Reuses the same soft bound algorithm as Killer cages.

use crate::board::Board;
use crate::error::Result;
use crate::impact_map::ImpactMap;
use crate::region::CellIdx;
use crate::rules::json::{as_bool, as_i32, encode_cells, field, parse_cells};
use crate::rules::utils::apply_sum_bounds;
use crate::rules::RuleHandler;

#[derive(Debug)]
pub struct RuleDiagonalSum {
    diagonal: Vec<CellIdx>,
    target: i32,
    no_repeat: bool,
}

impl RuleDiagonalSum {
    pub fn new(diagonal: Vec<CellIdx>, target: i32, no_repeat: bool) -> Self {
        RuleDiagonalSum { diagonal, target, no_repeat }
    }

    pub fn from_json(fields: &serde_json::Value, _board_size: u8) -> Result<Self> {
        let diagonal = parse_cells(field(fields, "diagonal", "Diagonal-Sum")?, "Diagonal-Sum")?;
        let target = as_i32(field(fields, "target", "Diagonal-Sum")?, "Diagonal-Sum", "target")?;
        let no_repeat = match fields.get("no_repeat") {
            Some(v) => as_bool(v, "Diagonal-Sum", "no_repeat")?,
            None => true,
        };
        Ok(RuleDiagonalSum::new(diagonal, target, no_repeat))
    }
}

impl RuleHandler for RuleDiagonalSum {
    fn number_changed(&mut self, board: &mut Board, pos: CellIdx) -> bool {
        if self.diagonal.contains(&pos) {
            apply_sum_bounds(board, &self.diagonal, self.target, self.no_repeat)
        } else {
            false
        }
    }

    fn candidates_changed(&mut self, board: &mut Board) -> bool {
        apply_sum_bounds(board, &self.diagonal, self.target, self.no_repeat)
    }

    fn valid(&self, board: &Board) -> bool {
        let mut sum = 0i32;
        let mut all_solved = true;
        for &pos in &self.diagonal {
            let cell = board.cell(pos);
            if cell.is_solved() {
                sum += cell.value() as i32;
            } else {
                all_solved = false;
            }
        }
        if all_solved {
            sum == self.target
        } else {
            sum <= self.target
        }
    }

    fn update_impact(&self, _board: &Board, map: &mut ImpactMap) {
        for &pos in &self.diagonal {
            map.increment(pos);
        }
    }

    fn name(&self) -> &'static str {
        "Diagonal-Sum"
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "Diagonal-Sum",
            "fields": { "diagonal": encode_cells(&self.diagonal), "target": self.target, "no_repeat": self.no_repeat }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Board;

    #[test]
    fn bounds_are_applied() {
        let mut board = Board::new(9).unwrap();
        let diag: Vec<CellIdx> = (0..9).map(|i| CellIdx::new(i, i)).collect();
        let mut rule = RuleDiagonalSum::new(diag.clone(), 45, true);
        rule.candidates_changed(&mut board);
        // sum of 1..9 is 45, so a no-repeat diagonal summing to 45 is just "use each digit once" -
        // every candidate should still be reachable given full slack elsewhere.
        assert!(!board.get_cell(diag[0]).unwrap().candidates().is_empty());
    }

    #[test]
    fn invalid_when_solved_sum_mismatches() {
        let mut board = Board::new(3).unwrap();
        let diag = vec![CellIdx::new(0, 0), CellIdx::new(1, 1), CellIdx::new(2, 2)];
        for &pos in &diag {
            board.set_cell(pos, 1, true);
        }
        let rule = RuleDiagonalSum::new(diag, 10, false);
        assert!(!rule.valid(&board));
    }
}
