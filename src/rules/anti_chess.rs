//! Anti-chess constraints: cells a knight's-move (or king's-move) apart may
//! not share a value, optionally extended with a list of forbidden sums for
//! that same pair relation. Each pair carries its own `enabled` flag — per
//! §4.4/§4.5, a puzzle can switch individual pairs off without removing
//! them from the handler, distinct from the handler-wide `enabled()` that
//! turns the whole rule off.

use crate::board::Board;
use crate::error::{Result, SolverError};
use crate::impact_map::ImpactMap;
use crate::number_set::{Number, NumberSet};
use crate::region::{CellIdx, Region};
use crate::rules::json::{as_str, encode_cell, parse_cells, parse_i32s};
use crate::rules::utils::{king_neighbors, knight_neighbors};
use crate::rules::RuleHandler;

#[derive(Debug, Clone, Copy)]
pub struct AntiChessPair {
    pub a: CellIdx,
    pub b: CellIdx,
    pub enabled: bool,
}

#[derive(Debug)]
pub struct RuleAntiChess {
    name: &'static str,
    pairs: Vec<AntiChessPair>,
    forbidden_sums: Vec<i32>,
}

impl RuleAntiChess {
    fn from_neighbor_fn(
        name: &'static str,
        board_size: u8,
        region: Option<&Region<CellIdx>>,
        neighbors_of: fn(CellIdx, u8) -> Vec<CellIdx>,
        forbidden_sums: Vec<i32>,
    ) -> Self {
        let cells: Vec<CellIdx> = match region {
            Some(r) => r.items().to_vec(),
            None => Region::<CellIdx>::all(board_size).into_iter().collect(),
        };
        let mut pairs = Vec::new();
        for &pos in &cells {
            for nb in neighbors_of(pos, board_size) {
                if pos >= nb || !cells.contains(&nb) {
                    continue;
                }
                pairs.push(AntiChessPair { a: pos, b: nb, enabled: true });
            }
        }
        RuleAntiChess { name, pairs, forbidden_sums }
    }

    /// The set of cells actually touched by any pair, used to reconstruct
    /// the loader-facing `region` field.
    fn region(&self) -> Region<CellIdx> {
        let mut region = Region::new();
        for pair in &self.pairs {
            region.add(pair.a);
            region.add(pair.b);
        }
        region
    }

    pub fn knight_move(board_size: u8, region: Option<&Region<CellIdx>>, forbidden_sums: Vec<i32>) -> Self {
        Self::from_neighbor_fn("Anti-Knight", board_size, region, knight_neighbors, forbidden_sums)
    }

    pub fn king_move(board_size: u8, region: Option<&Region<CellIdx>>, forbidden_sums: Vec<i32>) -> Self {
        Self::from_neighbor_fn("Anti-King", board_size, region, king_neighbors, forbidden_sums)
    }

    pub fn from_json(fields: &serde_json::Value, board_size: u8) -> Result<Self> {
        let move_kind = match fields.get("move") {
            Some(v) => as_str(v, "Anti-Chess", "move")?,
            None => "knight",
        };
        let region: Option<Region<CellIdx>> = match fields.get("region") {
            Some(v) => Some(parse_cells(v, "Anti-Chess")?.into_iter().collect()),
            None => None,
        };
        let forbidden_sums = match fields.get("forbidden_sums") {
            Some(v) => parse_i32s(v, "Anti-Chess")?,
            None => Vec::new(),
        };
        let mut rule = match move_kind {
            "knight" => Self::knight_move(board_size, region.as_ref(), forbidden_sums),
            "king" => Self::king_move(board_size, region.as_ref(), forbidden_sums),
            other => return Err(SolverError::MalformedRegion { rule: "Anti-Chess".to_string(), reason: format!("unknown move kind '{other}'") }),
        };
        if let Some(disabled) = fields.get("disabled_pairs") {
            for entry in crate::rules::json::as_array(disabled, "Anti-Chess", "disabled_pairs")? {
                let a = crate::rules::json::parse_cell(crate::rules::json::field(entry, "a", "Anti-Chess")?, "Anti-Chess")?;
                let b = crate::rules::json::parse_cell(crate::rules::json::field(entry, "b", "Anti-Chess")?, "Anti-Chess")?;
                for pair in rule.pairs.iter_mut() {
                    if (pair.a == a && pair.b == b) || (pair.a == b && pair.b == a) {
                        pair.enabled = false;
                    }
                }
            }
        }
        Ok(rule)
    }

    fn relation_ok(&self, a: Number, b: Number) -> bool {
        a != b && !self.forbidden_sums.contains(&(a as i32 + b as i32))
    }

    fn propagate_pair(&self, board: &mut Board, pair: &AntiChessPair) -> bool {
        let size = board.size();
        let ca = board.cell(pair.a).candidates();
        let cb = board.cell(pair.b).candidates();
        let mut changed = false;
        if !board.cell(pair.a).is_solved() {
            let mut allowed = NumberSet::empty(size);
            for v in ca.iter() {
                if cb.iter().any(|w| self.relation_ok(v, w)) {
                    allowed.add(v);
                }
            }
            changed |= board.cell_mut(pair.a).only_allow_candidates(allowed);
        }
        if !board.cell(pair.b).is_solved() {
            let mut allowed = NumberSet::empty(size);
            for v in cb.iter() {
                if ca.iter().any(|w| self.relation_ok(v, w)) {
                    allowed.add(v);
                }
            }
            changed |= board.cell_mut(pair.b).only_allow_candidates(allowed);
        }
        changed
    }
}

impl RuleHandler for RuleAntiChess {
    fn number_changed(&mut self, board: &mut Board, pos: CellIdx) -> bool {
        let mut changed = false;
        for pair in self.pairs.clone() {
            if pair.enabled && (pair.a == pos || pair.b == pos) {
                changed |= self.propagate_pair(board, &pair);
            }
        }
        changed
    }

    fn candidates_changed(&mut self, board: &mut Board) -> bool {
        let mut changed = false;
        for pair in self.pairs.clone() {
            if pair.enabled {
                changed |= self.propagate_pair(board, &pair);
            }
        }
        changed
    }

    fn valid(&self, board: &Board) -> bool {
        for pair in &self.pairs {
            if !pair.enabled {
                continue;
            }
            let a = board.cell(pair.a);
            let b = board.cell(pair.b);
            if a.is_solved() && b.is_solved() && !self.relation_ok(a.value(), b.value()) {
                return false;
            }
        }
        true
    }

    fn update_impact(&self, _board: &Board, map: &mut ImpactMap) {
        for pair in &self.pairs {
            if pair.enabled {
                map.increment(pair.a);
                map.increment(pair.b);
            }
        }
    }

    fn name(&self) -> &'static str {
        self.name
    }

    fn to_json(&self) -> serde_json::Value {
        let move_kind = if self.name == "Anti-King" { "king" } else { "knight" };
        let disabled: Vec<serde_json::Value> = self
            .pairs
            .iter()
            .filter(|p| !p.enabled)
            .map(|p| serde_json::json!({ "a": encode_cell(p.a), "b": encode_cell(p.b) }))
            .collect();
        serde_json::json!({
            "type": "Anti-Chess",
            "fields": {
                "move": move_kind,
                "region": crate::rules::json::encode_cells(self.region().items()),
                "forbidden_sums": self.forbidden_sums,
                "disabled_pairs": disabled,
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Board;

    #[test]
    fn knight_move_pairs_reject_equal_values() {
        let mut board = Board::new(9).unwrap();
        board.set_cell(CellIdx::new(0, 0), 4, true);
        board.set_cell(CellIdx::new(1, 2), 4, true);
        let rule = RuleAntiChess::knight_move(9, None, Vec::new());
        assert!(!rule.valid(&board));
    }

    #[test]
    fn disabled_pair_is_not_checked() {
        let mut board = Board::new(9).unwrap();
        board.set_cell(CellIdx::new(0, 0), 4, true);
        board.set_cell(CellIdx::new(1, 2), 4, true);
        let mut rule = RuleAntiChess::knight_move(9, None, Vec::new());
        for pair in rule.pairs.iter_mut() {
            if pair.a == CellIdx::new(0, 0) && pair.b == CellIdx::new(1, 2) {
                pair.enabled = false;
            }
        }
        assert!(rule.valid(&board));
    }
}
