//! Chevron: a directional marker on an edge asserting a strict inequality.
//! Stored already resolved to `(lesser, greater)` — the loader is
//! responsible for turning an up/down/left/right marker plus the edge's two
//! endpoints into that ordering.

use crate::board::Board;
use crate::error::Result;
use crate::impact_map::ImpactMap;
use crate::number_set::NumberSet;
use crate::region::CellIdx;
use crate::rules::json::{as_array, encode_cell, field, parse_cell};
use crate::rules::RuleHandler;

#[derive(Debug)]
pub struct RuleChevron {
    pairs: Vec<(CellIdx, CellIdx)>,
}

impl RuleChevron {
    pub fn new(pairs: Vec<(CellIdx, CellIdx)>) -> Self {
        RuleChevron { pairs }
    }

    /// `pairs` are already resolved to `(lesser, greater)` — turning an
    /// up/down/left/right marker plus an edge's endpoints into that
    /// ordering is the loader's job, done once at parse time.
    pub fn from_json(fields: &serde_json::Value, _board_size: u8) -> Result<Self> {
        let pairs = as_array(field(fields, "pairs", "Chevron")?, "Chevron", "pairs")?
            .iter()
            .map(|p| {
                let lesser = parse_cell(field(p, "lesser", "Chevron")?, "Chevron")?;
                let greater = parse_cell(field(p, "greater", "Chevron")?, "Chevron")?;
                Ok((lesser, greater))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(RuleChevron::new(pairs))
    }
}

impl RuleHandler for RuleChevron {
    fn number_changed(&mut self, _board: &mut Board, _pos: CellIdx) -> bool {
        // All of this rule's work is a pure candidate-bound narrowing, not a
        // cell-solved event; it belongs entirely in `candidates_changed`.
        false
    }

    fn candidates_changed(&mut self, board: &mut Board) -> bool {
        let size = board.size();
        let mut changed = false;
        for &(lo, hi) in &self.pairs {
            if !board.cell(lo).is_solved() {
                if let Some(max_hi) = board.cell(hi).candidates().highest() {
                    changed |= board.cell_mut(lo).only_allow_candidates(NumberSet::less_than(max_hi, size));
                }
            }
            if !board.cell(hi).is_solved() {
                if let Some(min_lo) = board.cell(lo).candidates().lowest() {
                    changed |= board.cell_mut(hi).only_allow_candidates(NumberSet::greater_than(min_lo, size));
                }
            }
        }
        changed
    }

    fn valid(&self, board: &Board) -> bool {
        for &(lo, hi) in &self.pairs {
            let a = board.cell(lo);
            let b = board.cell(hi);
            if a.is_solved() && b.is_solved() && a.value() >= b.value() {
                return false;
            }
        }
        true
    }

    fn update_impact(&self, _board: &Board, map: &mut ImpactMap) {
        for &(lo, hi) in &self.pairs {
            map.increment(lo);
            map.increment(hi);
        }
    }

    fn name(&self) -> &'static str {
        "Chevron"
    }

    fn to_json(&self) -> serde_json::Value {
        let pairs: Vec<serde_json::Value> =
            self.pairs.iter().map(|&(lo, hi)| serde_json::json!({ "lesser": encode_cell(lo), "greater": encode_cell(hi) })).collect();
        serde_json::json!({ "type": "Chevron", "fields": { "pairs": pairs } })
    }
}
