//! Wild Apples: a marked edge asserts its endpoints are non-consecutive and
//! of opposite parity. Every edge's marker status is known, so an unmarked
//! adjacent pair must fail at least one of those two conditions.

use crate::board::Board;
use crate::error::Result;
use crate::impact_map::ImpactMap;
use crate::number_set::NumberSet;
use crate::region::{CellIdx, EdgeIdx};
use crate::rules::json::{as_array, encode_edge, field, parse_edge};
use crate::rules::utils::orthogonal_neighbors;
use crate::rules::RuleHandler;

fn marked_ok(a: i16, b: i16) -> bool {
    (a - b).abs() != 1 && (a % 2) == (b % 2)
}

fn unmarked_ok(a: i16, b: i16) -> bool {
    !marked_ok(a, b)
}

#[derive(Debug)]
pub struct RuleWildApples {
    marked: Vec<EdgeIdx>,
}

impl RuleWildApples {
    pub fn new(marked: Vec<EdgeIdx>) -> Self {
        RuleWildApples { marked }
    }

    pub fn from_json(fields: &serde_json::Value, _board_size: u8) -> Result<Self> {
        let marked = as_array(field(fields, "marked", "Wild-Apples")?, "Wild-Apples", "marked")?
            .iter()
            .map(|e| parse_edge(e, "Wild-Apples"))
            .collect::<Result<Vec<_>>>()?;
        Ok(RuleWildApples::new(marked))
    }

    fn is_marked(&self, a: CellIdx, b: CellIdx) -> bool {
        self.marked.iter().any(|e| (e.a == a && e.b == b) || (e.a == b && e.b == a))
    }

    fn narrow(board: &mut Board, a: CellIdx, b: CellIdx, ok: fn(i16, i16) -> bool) -> bool {
        let size = board.size();
        let ca = board.cell(a).candidates();
        let cb = board.cell(b).candidates();
        let mut changed = false;
        if !board.cell(a).is_solved() {
            let mut allowed = NumberSet::empty(size);
            for v in ca.iter() {
                if cb.iter().any(|w| ok(v as i16, w as i16)) {
                    allowed.add(v);
                }
            }
            changed |= board.cell_mut(a).only_allow_candidates(allowed);
        }
        if !board.cell(b).is_solved() {
            let mut allowed = NumberSet::empty(size);
            for v in cb.iter() {
                if ca.iter().any(|w| ok(v as i16, w as i16)) {
                    allowed.add(v);
                }
            }
            changed |= board.cell_mut(b).only_allow_candidates(allowed);
        }
        changed
    }
}

impl RuleHandler for RuleWildApples {
    fn number_changed(&mut self, board: &mut Board, pos: CellIdx) -> bool {
        let mut changed = false;
        for edge in self.marked.clone() {
            if edge.a == pos || edge.b == pos {
                changed |= Self::narrow(board, edge.a, edge.b, marked_ok);
            }
        }
        for neighbor in orthogonal_neighbors(pos, board.size()) {
            if !self.is_marked(pos, neighbor) {
                changed |= Self::narrow(board, pos, neighbor, unmarked_ok);
            }
        }
        changed
    }

    fn candidates_changed(&mut self, board: &mut Board) -> bool {
        let mut changed = false;
        for edge in self.marked.clone() {
            changed |= Self::narrow(board, edge.a, edge.b, marked_ok);
        }
        for pos in board.all_cells().collect::<Vec<_>>() {
            for neighbor in orthogonal_neighbors(pos, board.size()) {
                if pos >= neighbor || self.is_marked(pos, neighbor) {
                    continue;
                }
                changed |= Self::narrow(board, pos, neighbor, unmarked_ok);
            }
        }
        changed
    }

    fn valid(&self, board: &Board) -> bool {
        for edge in &self.marked {
            let a = board.cell(edge.a);
            let b = board.cell(edge.b);
            if a.is_solved() && b.is_solved() && !marked_ok(a.value() as i16, b.value() as i16) {
                return false;
            }
        }
        for pos in board.all_cells() {
            for neighbor in orthogonal_neighbors(pos, board.size()) {
                if pos >= neighbor || self.is_marked(pos, neighbor) {
                    continue;
                }
                let a = board.cell(pos);
                let b = board.cell(neighbor);
                if a.is_solved() && b.is_solved() && !unmarked_ok(a.value() as i16, b.value() as i16) {
                    return false;
                }
            }
        }
        true
    }

    fn update_impact(&self, _board: &Board, map: &mut ImpactMap) {
        for edge in &self.marked {
            map.increment(edge.a);
            map.increment(edge.b);
        }
    }

    fn name(&self) -> &'static str {
        "Wild-Apples"
    }

    fn to_json(&self) -> serde_json::Value {
        let marked: Vec<serde_json::Value> = self.marked.iter().map(|&e| encode_edge(e)).collect();
        serde_json::json!({ "type": "Wild-Apples", "fields": { "marked": marked } })
    }
}
