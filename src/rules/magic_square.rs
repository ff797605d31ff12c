//! Magic squares: a 3x3 region whose rows, columns, and both diagonals all
//! sum to the same constant. There are exactly eight such arrangements of
//! 1..9 (the dihedral-group orbit of one canonical square); propagation
//! keeps only the arrangements still consistent with each cell's candidates
//! and applies their per-cell union back.

use lazy_static::lazy_static;

use crate::board::Board;
use crate::error::{Result, SolverError};
use crate::impact_map::ImpactMap;
use crate::number_set::{Number, NumberSet};
use crate::region::CellIdx;
use crate::rules::json::{encode_cells, field, parse_cells};
use serde_json::json;
use crate::rules::RuleHandler;

const BASE: [Number; 9] = [2, 7, 6, 9, 5, 1, 4, 3, 8];

fn rotate90(g: &[Number; 9]) -> [Number; 9] {
    let mut out = [0; 9];
    for r in 0..3 {
        for c in 0..3 {
            out[r * 3 + c] = g[(2 - c) * 3 + r];
        }
    }
    out
}

fn reflect(g: &[Number; 9]) -> [Number; 9] {
    let mut out = [0; 9];
    for r in 0..3 {
        for c in 0..3 {
            out[r * 3 + c] = g[r * 3 + (2 - c)];
        }
    }
    out
}

lazy_static! {
    static ref ARRANGEMENTS: Vec<[Number; 9]> = {
        let mut out = vec![BASE];
        let mut cur = BASE;
        for _ in 0..3 {
            cur = rotate90(&cur);
            out.push(cur);
        }
        let reflected = reflect(&BASE);
        out.push(reflected);
        let mut cur = reflected;
        for _ in 0..3 {
            cur = rotate90(&cur);
            out.push(cur);
        }
        out
    };
}

#[derive(Debug)]
pub struct RuleMagicSquare {
    /// Nine cells in row-major order over the 3x3 region.
    cells: [CellIdx; 9],
}

impl RuleMagicSquare {
    pub fn new(cells: [CellIdx; 9]) -> Self {
        RuleMagicSquare { cells }
    }

    pub fn from_json(fields: &serde_json::Value, _board_size: u8) -> Result<Self> {
        let cells = parse_cells(field(fields, "cells", "Magic-Square")?, "Magic-Square")?;
        let cells: [CellIdx; 9] = cells.try_into().map_err(|_| SolverError::MalformedRegion {
            rule: "Magic-Square".to_string(),
            reason: "expected exactly 9 cells".to_string(),
        })?;
        Ok(RuleMagicSquare::new(cells))
    }

    fn feasible(&self, board: &Board, arrangement: &[Number; 9]) -> bool {
        self.cells.iter().zip(arrangement.iter()).all(|(&pos, &v)| {
            let cell = board.cell(pos);
            if cell.is_solved() {
                cell.value() == v
            } else {
                cell.candidates().test(v)
            }
        })
    }
}

impl RuleHandler for RuleMagicSquare {
    fn number_changed(&mut self, _board: &mut Board, _pos: CellIdx) -> bool {
        false
    }

    fn candidates_changed(&mut self, board: &mut Board) -> bool {
        let size = board.size();
        let feasible: Vec<&[Number; 9]> = ARRANGEMENTS.iter().filter(|a| self.feasible(board, a)).collect();
        let mut allowed = [NumberSet::empty(size); 9];
        for arrangement in &feasible {
            for (i, &v) in arrangement.iter().enumerate() {
                allowed[i].add(v);
            }
        }
        let mut changed = false;
        for (i, &pos) in self.cells.iter().enumerate() {
            changed |= board.cell_mut(pos).only_allow_candidates(allowed[i]);
        }
        changed
    }

    fn valid(&self, board: &Board) -> bool {
        ARRANGEMENTS.iter().any(|a| self.feasible(board, a))
    }

    fn update_impact(&self, _board: &Board, map: &mut ImpactMap) {
        for &pos in &self.cells {
            map.increment(pos);
        }
    }

    fn name(&self) -> &'static str {
        "Magic-Square"
    }

    fn to_json(&self) -> serde_json::Value {
        json!({ "type": "Magic-Square", "fields": { "cells": encode_cells(&self.cells) } })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Board;

    fn region_3x3(top: u8, left: u8) -> [CellIdx; 9] {
        let mut out = [CellIdx::new(0, 0); 9];
        let mut i = 0;
        for r in 0..3 {
            for c in 0..3 {
                out[i] = CellIdx::new(top + r, left + c);
                i += 1;
            }
        }
        out
    }

    #[test]
    fn eight_distinct_arrangements() {
        let mut seen: Vec<[Number; 9]> = ARRANGEMENTS.clone();
        seen.sort();
        seen.dedup();
        assert_eq!(seen.len(), 8);
    }

    #[test]
    fn center_must_be_five() {
        let mut board = Board::new(9).unwrap();
        let cells = region_3x3(0, 0);
        let mut rule = RuleMagicSquare::new(cells);
        let changed = rule.candidates_changed(&mut board);
        assert!(changed);
        assert_eq!(board.get_cell(cells[4]).unwrap().candidates().count(), 1);
        assert_eq!(board.get_cell(cells[4]).unwrap().candidates().lowest(), Some(5));
    }
}
