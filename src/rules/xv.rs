//! X/V edges: "X" means the endpoints sum to 10, "V" means they sum to 5,
//! with an optional "all symbols given" negative-inference mode symmetric to
//! Kropki's.

use crate::board::Board;
use crate::error::{Result, SolverError};
use crate::impact_map::ImpactMap;
use crate::number_set::NumberSet;
use crate::region::{CellIdx, EdgeIdx};
use crate::rules::json::{as_array, as_bool, as_str, encode_edge, field, parse_edge};
use crate::rules::utils::orthogonal_neighbors;
use crate::rules::RuleHandler;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum XvKind {
    X,
    V,
}

impl XvKind {
    fn target(self) -> i16 {
        match self {
            XvKind::X => 10,
            XvKind::V => 5,
        }
    }
}

#[derive(Debug)]
pub struct RuleXv {
    edges: Vec<(EdgeIdx, XvKind)>,
    all_symbols_given: bool,
}

impl RuleXv {
    pub fn new(edges: Vec<(EdgeIdx, XvKind)>, all_symbols_given: bool) -> Self {
        RuleXv { edges, all_symbols_given }
    }

    pub fn from_json(fields: &serde_json::Value, _board_size: u8) -> Result<Self> {
        let edges = as_array(field(fields, "edges", "XV")?, "XV", "edges")?
            .iter()
            .map(|e| {
                let edge = parse_edge(e, "XV")?;
                let kind = match as_str(field(e, "kind", "XV")?, "XV", "kind")? {
                    "X" => XvKind::X,
                    "V" => XvKind::V,
                    other => return Err(SolverError::MalformedRegion { rule: "XV".to_string(), reason: format!("unknown symbol '{other}'") }),
                };
                Ok((edge, kind))
            })
            .collect::<Result<Vec<_>>>()?;
        let all_symbols_given = match fields.get("all_symbols_given") {
            Some(v) => as_bool(v, "XV", "all_symbols_given")?,
            None => false,
        };
        Ok(RuleXv::new(edges, all_symbols_given))
    }

    fn marked(&self, a: CellIdx, b: CellIdx) -> Option<XvKind> {
        self.edges.iter().find(|(e, _)| (e.a == a && e.b == b) || (e.a == b && e.b == a)).map(|(_, k)| *k)
    }

    fn narrow_to_sum(board: &mut Board, a: CellIdx, b: CellIdx, target: i16) -> bool {
        let size = board.size();
        let ca = board.cell(a).candidates();
        let cb = board.cell(b).candidates();
        let mut changed = false;
        if !board.cell(a).is_solved() {
            let mut allowed = NumberSet::empty(size);
            for v in ca.iter() {
                if cb.iter().any(|w| v as i16 + w as i16 == target) {
                    allowed.add(v);
                }
            }
            changed |= board.cell_mut(a).only_allow_candidates(allowed);
        }
        if !board.cell(b).is_solved() {
            let mut allowed = NumberSet::empty(size);
            for v in cb.iter() {
                if ca.iter().any(|w| v as i16 + w as i16 == target) {
                    allowed.add(v);
                }
            }
            changed |= board.cell_mut(b).only_allow_candidates(allowed);
        }
        changed
    }

    fn narrow_away_from_sums(board: &mut Board, a: CellIdx, b: CellIdx) -> bool {
        let size = board.size();
        let ca = board.cell(a).candidates();
        let cb = board.cell(b).candidates();
        let forbidden = [XvKind::X.target(), XvKind::V.target()];
        let mut changed = false;
        if !board.cell(a).is_solved() {
            let mut allowed = NumberSet::empty(size);
            for v in ca.iter() {
                if cb.iter().any(|w| !forbidden.contains(&(v as i16 + w as i16))) {
                    allowed.add(v);
                }
            }
            changed |= board.cell_mut(a).only_allow_candidates(allowed);
        }
        if !board.cell(b).is_solved() {
            let mut allowed = NumberSet::empty(size);
            for v in cb.iter() {
                if ca.iter().any(|w| !forbidden.contains(&(v as i16 + w as i16))) {
                    allowed.add(v);
                }
            }
            changed |= board.cell_mut(b).only_allow_candidates(allowed);
        }
        changed
    }
}

impl RuleHandler for RuleXv {
    fn number_changed(&mut self, board: &mut Board, pos: CellIdx) -> bool {
        let mut changed = false;
        for (edge, kind) in self.edges.clone() {
            if edge.a == pos || edge.b == pos {
                changed |= Self::narrow_to_sum(board, edge.a, edge.b, kind.target());
            }
        }
        changed
    }

    fn candidates_changed(&mut self, board: &mut Board) -> bool {
        let mut changed = false;
        for (edge, kind) in self.edges.clone() {
            changed |= Self::narrow_to_sum(board, edge.a, edge.b, kind.target());
        }
        if self.all_symbols_given {
            for pos in board.all_cells().collect::<Vec<_>>() {
                for neighbor in orthogonal_neighbors(pos, board.size()) {
                    if pos >= neighbor || self.marked(pos, neighbor).is_some() {
                        continue;
                    }
                    changed |= Self::narrow_away_from_sums(board, pos, neighbor);
                }
            }
        }
        changed
    }

    fn valid(&self, board: &Board) -> bool {
        for (edge, kind) in &self.edges {
            let a = board.cell(edge.a);
            let b = board.cell(edge.b);
            if a.is_solved() && b.is_solved() && a.value() as i16 + b.value() as i16 != kind.target() {
                return false;
            }
        }
        true
    }

    fn update_impact(&self, _board: &Board, map: &mut ImpactMap) {
        for (edge, _) in &self.edges {
            map.increment(edge.a);
            map.increment(edge.b);
        }
    }

    fn name(&self) -> &'static str {
        "XV"
    }

    fn to_json(&self) -> serde_json::Value {
        let edges: Vec<serde_json::Value> = self
            .edges
            .iter()
            .map(|(e, k)| {
                let mut v = encode_edge(*e);
                let kind = match k {
                    XvKind::X => "X",
                    XvKind::V => "V",
                };
                v.as_object_mut().unwrap().insert("kind".to_string(), serde_json::json!(kind));
                v
            })
            .collect();
        serde_json::json!({ "type": "XV", "fields": { "edges": edges, "all_symbols_given": self.all_symbols_given } })
    }
}
