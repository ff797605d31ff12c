//! Classical row/column/block uniqueness, with the optional propagation
//! accelerators named in the rule library (naked pairs, pointing/claiming,
//! X-wing, swordfish, XY-wing). None of the accelerators can change the set
//! of solutions — only how fast the search finds them — so each is gated by
//! an option and `candidates_changed` degrades gracefully with any subset
//! disabled.

use itertools::Itertools;
use serde_json::json;

use crate::board::Board;
use crate::error::Result;
use crate::impact_map::ImpactMap;
use crate::number_set::NumberSet;
use crate::region::CellIdx;
use crate::rules::json::as_bool;
use crate::rules::utils::{eliminate_value, hidden_singles, is_group_valid};
use crate::rules::RuleHandler;

#[derive(Debug, Clone, Copy)]
pub struct StandardOptions {
    pub hidden_singles: bool,
    pub pointing_claiming: bool,
    pub naked_pairs: bool,
    pub x_wing: bool,
    pub swordfish: bool,
    pub xy_wing: bool,
}

impl Default for StandardOptions {
    fn default() -> Self {
        StandardOptions {
            hidden_singles: true,
            pointing_claiming: true,
            naked_pairs: true,
            x_wing: true,
            swordfish: true,
            xy_wing: true,
        }
    }
}

#[derive(Debug)]
pub struct RuleStandard {
    options: StandardOptions,
}

impl RuleStandard {
    pub fn new() -> Self {
        RuleStandard { options: StandardOptions::default() }
    }

    pub fn with_options(options: StandardOptions) -> Self {
        RuleStandard { options }
    }

    /// All fields are optional, defaulting true: an empty `fields` object is
    /// the full classical rule with every accelerator enabled.
    pub fn from_json(fields: &serde_json::Value, _board_size: u8) -> Result<Self> {
        let flag = |key: &str| -> Result<bool> {
            match fields.get(key) {
                Some(v) => as_bool(v, "Standard", key),
                None => Ok(true),
            }
        };
        Ok(RuleStandard::with_options(StandardOptions {
            hidden_singles: flag("hidden_singles")?,
            pointing_claiming: flag("pointing_claiming")?,
            naked_pairs: flag("naked_pairs")?,
            x_wing: flag("x_wing")?,
            swordfish: flag("swordfish")?,
            xy_wing: flag("xy_wing")?,
        }))
    }

    fn block_of(board: &Board, pos: CellIdx) -> Option<Vec<CellIdx>> {
        let bs = board.block_size();
        if bs == 0 {
            return None;
        }
        let block_id = (pos.r / bs) * bs + (pos.c / bs);
        board.get_block(block_id).ok().map(|s| s.to_vec())
    }

    fn units(board: &Board) -> Vec<Vec<CellIdx>> {
        let size = board.size();
        let mut units = Vec::with_capacity(size as usize * 3);
        for r in 0..size {
            units.push(board.get_row(r).unwrap().to_vec());
        }
        for c in 0..size {
            units.push(board.get_col(c).unwrap().to_vec());
        }
        if board.block_size() > 0 {
            for b in 0..size {
                units.push(board.get_block(b).unwrap().to_vec());
            }
        }
        units
    }
}

impl Default for RuleStandard {
    fn default() -> Self {
        Self::new()
    }
}

fn sees(board: &Board, a: CellIdx, b: CellIdx) -> bool {
    if a == b {
        return false;
    }
    if a.r == b.r || a.c == b.c {
        return true;
    }
    let bs = board.block_size();
    if bs == 0 {
        return false;
    }
    (a.r / bs, a.c / bs) == (b.r / bs, b.c / bs)
}

fn naked_pairs(board: &mut Board, unit: &[CellIdx]) -> bool {
    let mut changed = false;
    let bivalue: Vec<CellIdx> =
        unit.iter().copied().filter(|&p| !board.cell(p).is_solved() && board.cell(p).candidates().count() == 2).collect();
    for (i, &a) in bivalue.iter().enumerate() {
        for &b in &bivalue[i + 1..] {
            let ca = board.cell(a).candidates();
            let cb = board.cell(b).candidates();
            if ca != cb {
                continue;
            }
            for &pos in unit {
                if pos == a || pos == b {
                    continue;
                }
                for v in ca.iter() {
                    changed |= board.cell_mut(pos).remove_candidate(v);
                }
            }
        }
    }
    changed
}

fn pointing_claiming(board: &mut Board) -> bool {
    let size = board.size();
    let bs = board.block_size();
    if bs == 0 {
        return false;
    }
    let mut changed = false;

    // Pointing: within a block, if value v's candidates all share a row or
    // column, eliminate v from the rest of that row/column outside the block.
    for b in 0..size {
        let block = board.get_block(b).unwrap().to_vec();
        for v in 1..=size {
            let holders: Vec<CellIdx> =
                block.iter().copied().filter(|&p| !board.cell(p).is_solved() && board.cell(p).candidates().test(v)).collect();
            if holders.len() < 2 {
                continue;
            }
            if holders.iter().all(|p| p.r == holders[0].r) {
                let row = board.get_row(holders[0].r).unwrap().to_vec();
                for &p in &row {
                    if block.contains(&p) {
                        continue;
                    }
                    changed |= board.cell_mut(p).remove_candidate(v);
                }
            } else if holders.iter().all(|p| p.c == holders[0].c) {
                let col = board.get_col(holders[0].c).unwrap().to_vec();
                for &p in &col {
                    if block.contains(&p) {
                        continue;
                    }
                    changed |= board.cell_mut(p).remove_candidate(v);
                }
            }
        }
    }

    // Claiming: within a row/column, if value v's candidates all share a
    // block, eliminate v from the rest of that block outside the line.
    for r in 0..size {
        let row = board.get_row(r).unwrap().to_vec();
        for v in 1..=size {
            let holders: Vec<CellIdx> =
                row.iter().copied().filter(|&p| !board.cell(p).is_solved() && board.cell(p).candidates().test(v)).collect();
            if holders.len() < 2 {
                continue;
            }
            let block_id = (holders[0].r / bs) * bs + (holders[0].c / bs);
            if holders.iter().all(|p| (p.r / bs) * bs + (p.c / bs) == block_id) {
                let block = board.get_block(block_id).unwrap().to_vec();
                for &p in &block {
                    if row.contains(&p) {
                        continue;
                    }
                    changed |= board.cell_mut(p).remove_candidate(v);
                }
            }
        }
    }
    changed
}

/// Generalized fish: for `k` rows (or columns) whose candidate positions for
/// value `v` all fall inside the same `k` columns (or rows), eliminate `v`
/// from the rest of those columns (or rows). `k = 2` is X-wing, `k = 3` is
/// swordfish.
fn fish(board: &mut Board, k: usize) -> bool {
    let size = board.size();
    let mut changed = false;
    for by_row in [true, false] {
        let lines: Vec<Vec<CellIdx>> = (0..size)
            .map(|i| if by_row { board.get_row(i).unwrap().to_vec() } else { board.get_col(i).unwrap().to_vec() })
            .collect();
        for v in 1..=size {
            let line_positions: Vec<Vec<u8>> = lines
                .iter()
                .map(|line| {
                    line.iter()
                        .filter(|&&p| !board.cell(p).is_solved() && board.cell(p).candidates().test(v))
                        .map(|p| if by_row { p.c } else { p.r })
                        .collect()
                })
                .collect();
            let candidate_lines: Vec<usize> =
                (0..size as usize).filter(|&i| !line_positions[i].is_empty() && line_positions[i].len() <= k).collect();
            for combo in candidate_lines.iter().combinations(k) {
                let mut union_positions: Vec<u8> = Vec::new();
                for &&i in &combo {
                    for &p in &line_positions[i] {
                        if !union_positions.contains(&p) {
                            union_positions.push(p);
                        }
                    }
                }
                if union_positions.len() != k {
                    continue;
                }
                let line_set: Vec<usize> = combo.iter().map(|&&i| i).collect();
                for &cross in &union_positions {
                    for i in 0..size as usize {
                        if line_set.contains(&i) {
                            continue;
                        }
                        let pos = if by_row { CellIdx::new(i as u8, cross) } else { CellIdx::new(cross, i as u8) };
                        changed |= board.cell_mut(pos).remove_candidate(v);
                    }
                }
            }
        }
    }
    changed
}

fn xy_wing(board: &mut Board) -> bool {
    let size = board.size();
    let bivalue: Vec<CellIdx> = board
        .all_cells()
        .filter(|&p| !board.cell(p).is_solved() && board.cell(p).candidates().count() == 2)
        .collect();

    let mut changed = false;
    for &pivot in &bivalue {
        let pivot_cands: Vec<_> = board.cell(pivot).candidates().iter().collect();
        let (a, b) = (pivot_cands[0], pivot_cands[1]);
        let pincers: Vec<CellIdx> = bivalue.iter().copied().filter(|&p| sees(board, pivot, p)).collect();
        for (i, &p1) in pincers.iter().enumerate() {
            for &p2 in &pincers[i + 1..] {
                let c1 = board.cell(p1).candidates();
                let c2 = board.cell(p2).candidates();
                let (c_val, ok) = if c1.test(a) && !c1.test(b) && c2.test(b) && !c2.test(a) {
                    (c1.intersection(&c2), true)
                } else if c1.test(b) && !c1.test(a) && c2.test(a) && !c2.test(b) {
                    (c1.intersection(&c2), true)
                } else {
                    (NumberSet::empty(size), false)
                };
                if !ok || c_val.count() != 1 {
                    continue;
                }
                let v = c_val.lowest().unwrap();
                for pos in board.all_cells().collect::<Vec<_>>() {
                    if pos == pivot || pos == p1 || pos == p2 {
                        continue;
                    }
                    if sees(board, pos, p1) && sees(board, pos, p2) {
                        changed |= board.cell_mut(pos).remove_candidate(v);
                    }
                }
            }
        }
    }
    changed
}

impl RuleHandler for RuleStandard {
    fn number_changed(&mut self, board: &mut Board, pos: CellIdx) -> bool {
        let v = board.cell(pos).value();
        let mut changed = false;

        let row = board.get_row(pos.r).unwrap().to_vec();
        changed |= eliminate_value(board, &row, Some(pos), v);

        let col = board.get_col(pos.c).unwrap().to_vec();
        changed |= eliminate_value(board, &col, Some(pos), v);

        if let Some(block) = Self::block_of(board, pos) {
            changed |= eliminate_value(board, &block, Some(pos), v);
        }
        changed
    }

    fn candidates_changed(&mut self, board: &mut Board) -> bool {
        let mut changed = false;
        let units = Self::units(board);

        if self.options.hidden_singles {
            for unit in &units {
                changed |= hidden_singles(board, unit);
            }
        }
        if self.options.naked_pairs {
            for unit in &units {
                changed |= naked_pairs(board, unit);
            }
        }
        if self.options.pointing_claiming {
            changed |= pointing_claiming(board);
        }
        if self.options.x_wing {
            changed |= fish(board, 2);
        }
        if self.options.swordfish {
            changed |= fish(board, 3);
        }
        if self.options.xy_wing {
            changed |= xy_wing(board);
        }
        changed
    }

    fn valid(&self, board: &Board) -> bool {
        let size = board.size();
        for r in 0..size {
            if !is_group_valid(board, board.get_row(r).unwrap()) {
                return false;
            }
        }
        for c in 0..size {
            if !is_group_valid(board, board.get_col(c).unwrap()) {
                return false;
            }
        }
        if board.block_size() > 0 {
            for b in 0..size {
                if !is_group_valid(board, board.get_block(b).unwrap()) {
                    return false;
                }
            }
        }
        true
    }

    fn update_impact(&self, _board: &Board, _map: &mut ImpactMap) {}

    fn name(&self) -> &'static str {
        "Standard"
    }

    fn to_json(&self) -> serde_json::Value {
        json!({
            "type": "Standard",
            "fields": {
                "hidden_singles": self.options.hidden_singles,
                "pointing_claiming": self.options.pointing_claiming,
                "naked_pairs": self.options.naked_pairs,
                "x_wing": self.options.x_wing,
                "swordfish": self.options.swordfish,
                "xy_wing": self.options.xy_wing,
            }
        })
    }
}
