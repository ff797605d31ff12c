//! Kropki dots: white edges (endpoints differ by 1), black edges (one is
//! twice the other), with an optional "all dots given" mode where every
//! unmarked adjacent pair is asserted to satisfy neither relation.

use crate::board::Board;
use crate::error::{Result, SolverError};
use crate::impact_map::ImpactMap;
use crate::number_set::{Number, NumberSet};
use rand::Rng;

use crate::region::{CellIdx, EdgeIdx};
use crate::rules::json::{as_array, as_bool, as_str, encode_edge, field, parse_edge};
use crate::rules::utils::orthogonal_neighbors;
use crate::rules::RuleHandler;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KropkiKind {
    White,
    Black,
}

fn is_white(a: Number, b: Number) -> bool {
    (a as i16 - b as i16).abs() == 1
}

fn is_black(a: Number, b: Number) -> bool {
    a != 0 && b != 0 && (a == 2 * b || b == 2 * a)
}

#[derive(Debug)]
pub struct RuleKropki {
    edges: Vec<(EdgeIdx, KropkiKind)>,
    all_dots_given: bool,
}

impl RuleKropki {
    pub fn new(edges: Vec<(EdgeIdx, KropkiKind)>, all_dots_given: bool) -> Self {
        RuleKropki { edges, all_dots_given }
    }

    pub fn from_json(fields: &serde_json::Value, _board_size: u8) -> Result<Self> {
        let edges = as_array(field(fields, "edges", "Kropki")?, "Kropki", "edges")?
            .iter()
            .map(|e| {
                let edge = parse_edge(e, "Kropki")?;
                let kind = match as_str(field(e, "kind", "Kropki")?, "Kropki", "kind")? {
                    "white" => KropkiKind::White,
                    "black" => KropkiKind::Black,
                    other => return Err(SolverError::MalformedRegion { rule: "Kropki".to_string(), reason: format!("unknown dot kind '{other}'") }),
                };
                Ok((edge, kind))
            })
            .collect::<Result<Vec<_>>>()?;
        let all_dots_given = match fields.get("all_dots_given") {
            Some(v) => as_bool(v, "Kropki", "all_dots_given")?,
            None => false,
        };
        Ok(RuleKropki::new(edges, all_dots_given))
    }

    fn edge_kind_between(&self, a: CellIdx, b: CellIdx) -> Option<KropkiKind> {
        self.edges.iter().find(|(e, _)| (e.a == a && e.b == b) || (e.a == b && e.b == a)).map(|(_, k)| *k)
    }

    fn unmarked_orthogonal_pairs(&self, board: &Board) -> Vec<(CellIdx, CellIdx)> {
        let mut out = Vec::new();
        for pos in board.all_cells() {
            for neighbor in orthogonal_neighbors(pos, board.size()) {
                if pos >= neighbor {
                    continue;
                }
                if self.edge_kind_between(pos, neighbor).is_none() {
                    out.push((pos, neighbor));
                }
            }
        }
        out
    }

    fn propagate_positive(board: &mut Board, a: CellIdx, b: CellIdx, kind: KropkiKind) -> bool {
        let size = board.size();
        let relation = match kind {
            KropkiKind::White => is_white,
            KropkiKind::Black => is_black,
        };
        let ca = board.cell(a).candidates();
        let cb = board.cell(b).candidates();

        let allowed_for = |mine: NumberSet, other: NumberSet| -> NumberSet {
            let mut allowed = NumberSet::empty(size);
            for v in mine.iter() {
                if other.iter().any(|w| relation(v, w)) {
                    allowed.add(v);
                }
            }
            allowed
        };

        let mut changed = false;
        if !board.cell(a).is_solved() {
            changed |= board.cell_mut(a).only_allow_candidates(allowed_for(ca, cb));
        }
        if !board.cell(b).is_solved() {
            changed |= board.cell_mut(b).only_allow_candidates(allowed_for(cb, ca));
        }
        changed
    }

    fn propagate_negative(board: &mut Board, a: CellIdx, b: CellIdx) -> bool {
        let size = board.size();
        let ca = board.cell(a).candidates();
        let cb = board.cell(b).candidates();

        let allowed_for = |mine: NumberSet, other: NumberSet| -> NumberSet {
            let mut allowed = NumberSet::empty(size);
            for v in mine.iter() {
                if other.iter().any(|w| !is_white(v, w) && !is_black(v, w)) {
                    allowed.add(v);
                }
            }
            allowed
        };

        let mut changed = false;
        if !board.cell(a).is_solved() {
            changed |= board.cell_mut(a).only_allow_candidates(allowed_for(ca, cb));
        }
        if !board.cell(b).is_solved() {
            changed |= board.cell_mut(b).only_allow_candidates(allowed_for(cb, ca));
        }
        changed
    }
}

impl RuleHandler for RuleKropki {
    fn number_changed(&mut self, board: &mut Board, pos: CellIdx) -> bool {
        let mut changed = false;
        for (edge, kind) in self.edges.clone() {
            if edge.a == pos || edge.b == pos {
                changed |= Self::propagate_positive(board, edge.a, edge.b, kind);
            }
        }
        changed
    }

    fn candidates_changed(&mut self, board: &mut Board) -> bool {
        let mut changed = false;
        for (edge, kind) in self.edges.clone() {
            changed |= Self::propagate_positive(board, edge.a, edge.b, kind);
        }
        if self.all_dots_given {
            for (a, b) in self.unmarked_orthogonal_pairs(board) {
                changed |= Self::propagate_negative(board, a, b);
            }
        }
        changed
    }

    fn valid(&self, board: &Board) -> bool {
        for (edge, kind) in &self.edges {
            let a = board.cell(edge.a);
            let b = board.cell(edge.b);
            if a.is_solved() && b.is_solved() {
                let ok = match kind {
                    KropkiKind::White => is_white(a.value(), b.value()),
                    KropkiKind::Black => is_black(a.value(), b.value()),
                };
                if !ok {
                    return false;
                }
            }
        }
        true
    }

    fn update_impact(&self, board: &Board, map: &mut ImpactMap) {
        for (edge, _) in &self.edges {
            map.increment(edge.a);
            map.increment(edge.b);
        }
    }

    fn init_randomly(&mut self, board_size: u8, rng: &mut dyn rand::RngCore) {
        let r = rng.gen_range(0..board_size);
        let c = rng.gen_range(0..board_size.saturating_sub(1).max(1));
        let edge = EdgeIdx::new(r, c, r, c + 1);
        let kind = if rng.gen_bool(0.5) { KropkiKind::White } else { KropkiKind::Black };
        self.edges.push((edge, kind));
    }

    fn name(&self) -> &'static str {
        "Kropki"
    }

    fn to_json(&self) -> serde_json::Value {
        let edges: Vec<serde_json::Value> = self
            .edges
            .iter()
            .map(|(e, k)| {
                let mut v = encode_edge(*e);
                let kind = match k {
                    KropkiKind::White => "white",
                    KropkiKind::Black => "black",
                };
                v.as_object_mut().unwrap().insert("kind".to_string(), serde_json::json!(kind));
                v
            })
            .collect();
        serde_json::json!({ "type": "Kropki", "fields": { "edges": edges, "all_dots_given": self.all_dots_given } })
    }
}
