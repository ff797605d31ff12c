//! Sandwich sums: in a row or column, the digits strictly between the cells
//! holding 1 and N must sum to a target. The strong propagation path — both
//! bread digits already placed — reuses the Killer-style bound narrowing on
//! the cells between them. When one or both bread positions are still
//! unresolved this only checks soft bounds in `valid`; it never wrongly
//! removes a candidate, it just leaves more work for the Standard rule to
//! pin down where 1 and N land first.

use crate::board::Board;
use crate::error::Result;
use crate::impact_map::ImpactMap;
use crate::number_set::Number;
use crate::region::CellIdx;
use crate::rules::json::{as_array, as_i32, encode_cells, field, parse_cells};
use crate::rules::utils::apply_sum_bounds;
use crate::rules::RuleHandler;

#[derive(Debug)]
pub struct RuleSandwich {
    lines: Vec<(Vec<CellIdx>, i32)>,
}

impl RuleSandwich {
    pub fn new(lines: Vec<(Vec<CellIdx>, i32)>) -> Self {
        RuleSandwich { lines }
    }

    pub fn from_json(fields: &serde_json::Value, _board_size: u8) -> Result<Self> {
        let lines = as_array(field(fields, "lines", "Sandwich")?, "Sandwich", "lines")?
            .iter()
            .map(|l| {
                let cells = parse_cells(field(l, "cells", "Sandwich")?, "Sandwich")?;
                let target = as_i32(field(l, "target", "Sandwich")?, "Sandwich", "target")?;
                Ok((cells, target))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(RuleSandwich::new(lines))
    }

    fn bread_indices(board: &Board, line: &[CellIdx]) -> (Option<usize>, Option<usize>) {
        let size = board.size();
        let mut one = None;
        let mut n = None;
        for (i, &pos) in line.iter().enumerate() {
            let cell = board.cell(pos);
            if cell.is_solved() {
                if cell.value() == 1 {
                    one = Some(i);
                } else if cell.value() == size {
                    n = Some(i);
                }
            }
        }
        (one, n)
    }

    fn propagate_line(board: &mut Board, line: &[CellIdx], target: i32) -> bool {
        let (one, n) = Self::bread_indices(board, line);
        match (one, n) {
            (Some(i1), Some(in_)) if i1 != in_ => {
                let (lo, hi) = (i1.min(in_) + 1, i1.max(in_));
                let between = &line[lo..hi];
                apply_sum_bounds(board, between, target, true)
            }
            _ => false,
        }
    }
}

impl RuleHandler for RuleSandwich {
    fn number_changed(&mut self, board: &mut Board, pos: CellIdx) -> bool {
        let mut changed = false;
        for (line, target) in self.lines.clone() {
            if line.contains(&pos) {
                changed |= Self::propagate_line(board, &line, target);
            }
        }
        changed
    }

    fn candidates_changed(&mut self, board: &mut Board) -> bool {
        let mut changed = false;
        for (line, target) in self.lines.clone() {
            changed |= Self::propagate_line(board, &line, target);
        }
        changed
    }

    fn valid(&self, board: &Board) -> bool {
        for (line, target) in &self.lines {
            let (one, n) = Self::bread_indices(board, line);
            if let (Some(i1), Some(in_)) = (one, n) {
                if i1 == in_ {
                    continue;
                }
                let (lo, hi) = (i1.min(in_) + 1, i1.max(in_));
                let between = &line[lo..hi];
                let mut sum = 0i32;
                let mut all_solved = true;
                let mut seen = Vec::new();
                for &pos in between {
                    let cell = board.cell(pos);
                    if cell.is_solved() {
                        let v: Number = cell.value();
                        if seen.contains(&v) {
                            return false;
                        }
                        seen.push(v);
                        sum += v as i32;
                    } else {
                        all_solved = false;
                    }
                }
                if all_solved && sum != *target {
                    return false;
                }
                if !all_solved && sum > *target {
                    return false;
                }
            }
        }
        true
    }

    fn update_impact(&self, _board: &Board, map: &mut ImpactMap) {
        for (line, _) in &self.lines {
            for &pos in line {
                map.increment(pos);
            }
        }
    }

    fn name(&self) -> &'static str {
        "Sandwich"
    }

    fn to_json(&self) -> serde_json::Value {
        let lines: Vec<serde_json::Value> =
            self.lines.iter().map(|(cells, target)| serde_json::json!({ "cells": encode_cells(cells), "target": target })).collect();
        serde_json::json!({ "type": "Sandwich", "fields": { "lines": lines } })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Board;

    #[test]
    fn narrows_between_cells_once_bread_is_placed() {
        let mut board = Board::new(9).unwrap();
        let line: Vec<CellIdx> = (0..9).map(|c| CellIdx::new(0, c)).collect();
        board.set_cell(line[0], 1, true);
        board.set_cell(line[8], 9, true);
        let mut rule = RuleSandwich::new(vec![(line.clone(), 10)]);
        rule.candidates_changed(&mut board);
        for &pos in &line[1..8] {
            assert!(!board.get_cell(pos).unwrap().candidates().test(1));
            assert!(!board.get_cell(pos).unwrap().candidates().test(9));
        }
    }

    #[test]
    fn invalid_when_between_sum_mismatches() {
        let mut board = Board::new(9).unwrap();
        let line: Vec<CellIdx> = (0..4).map(|c| CellIdx::new(0, c)).collect();
        board.set_cell(line[0], 1, true);
        board.set_cell(line[1], 5, true);
        board.set_cell(line[2], 9, true);
        let rule = RuleSandwich::new(vec![(line, 2)]);
        assert!(!rule.valid(&board));
    }
}
