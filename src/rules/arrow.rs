//! Arrow: the digits along a path must sum to the value held in the arrow's
//! base (a circle of one or two cells). A two-cell base reads as a
//! concatenated two-digit number, tens cell first. Propagation works both
//! directions — the base narrows the arrow's reachable sum, and the arrow's
//! own sum bounds narrow the base back — but, as with the other sum rules in
//! this library, it reasons against aggregate bounds rather than enumerating
//! full assignments, so it is sound but not maximally strong.

use crate::board::Board;
use crate::error::Result;
use crate::impact_map::ImpactMap;
use crate::number_set::{Number, NumberSet};
use crate::region::CellIdx;
use crate::rules::json::{encode_cells, field, parse_cells};
use crate::rules::utils::{lower_bound, upper_bound};
use crate::rules::RuleHandler;

#[derive(Debug)]
pub struct RuleArrow {
    base: Vec<CellIdx>,
    arrow: Vec<CellIdx>,
}

fn cell_bounds(board: &Board, pos: CellIdx) -> (i32, i32) {
    let cell = board.cell(pos);
    if cell.is_solved() {
        let v = cell.value() as i32;
        (v, v)
    } else {
        let cands = cell.candidates();
        (
            cands.lowest().map(|v| v as i32).unwrap_or(1),
            cands.highest().map(|v| v as i32).unwrap_or(board.size() as i32),
        )
    }
}

impl RuleArrow {
    /// `base` is one or two cells (a pill); `arrow` is the path leading away
    /// from it, in order (order does not matter for the sum itself).
    pub fn new(base: Vec<CellIdx>, arrow: Vec<CellIdx>) -> Self {
        assert!(base.len() == 1 || base.len() == 2, "arrow base must hold 1 or 2 cells");
        RuleArrow { base, arrow }
    }

    pub fn from_json(fields: &serde_json::Value, _board_size: u8) -> Result<Self> {
        let base = parse_cells(field(fields, "base", "Arrow")?, "Arrow")?;
        let arrow = parse_cells(field(fields, "arrow", "Arrow")?, "Arrow")?;
        Ok(RuleArrow::new(base, arrow))
    }

    fn base_bounds(&self, board: &Board) -> (i32, i32) {
        match self.base.as_slice() {
            [single] => cell_bounds(board, *single),
            [tens, ones] => {
                let (tlo, thi) = cell_bounds(board, *tens);
                let (olo, ohi) = cell_bounds(board, *ones);
                (tlo * 10 + olo, thi * 10 + ohi)
            }
            _ => unreachable!(),
        }
    }

    fn propagate_arrow_from_base(&self, board: &mut Board, lo: i32, hi: i32) -> bool {
        let size = board.size();
        let mut changed = false;
        for &pos in &self.arrow {
            if board.cell(pos).is_solved() {
                continue;
            }
            let mut lb_others = 0;
            let mut ub_others = 0;
            for &other in &self.arrow {
                if other == pos {
                    continue;
                }
                let (l, u) = cell_bounds(board, other);
                lb_others += l;
                ub_others += u;
            }
            let allowed_lo = (lo - ub_others).max(1);
            let allowed_hi = (hi - lb_others).min(size as i32);
            if allowed_hi < allowed_lo {
                continue;
            }
            let allowed = NumberSet::at_least(allowed_lo as Number, size)
                .intersection(&NumberSet::at_most(allowed_hi as Number, size));
            changed |= board.cell_mut(pos).only_allow_candidates(allowed);
        }
        changed
    }

    fn propagate_base_from_arrow(&self, board: &mut Board) -> bool {
        let size = board.size();
        let arrow_lo = lower_bound(board, &self.arrow);
        let arrow_hi = upper_bound(board, &self.arrow);
        match self.base.as_slice() {
            [single] => {
                if board.cell(*single).is_solved() {
                    return false;
                }
                let lo = arrow_lo.max(1);
                let hi = arrow_hi.min(size as i32);
                if hi < lo {
                    return false;
                }
                let allowed =
                    NumberSet::at_least(lo as Number, size).intersection(&NumberSet::at_most(hi as Number, size));
                board.cell_mut(*single).only_allow_candidates(allowed)
            }
            [tens, _ones] => {
                if board.cell(*tens).is_solved() {
                    return false;
                }
                let lo_tens = (arrow_lo / 10).clamp(1, size as i32);
                let hi_tens = (arrow_hi / 10).clamp(1, size as i32);
                if hi_tens < lo_tens {
                    return false;
                }
                let allowed = NumberSet::at_least(lo_tens as Number, size)
                    .intersection(&NumberSet::at_most(hi_tens as Number, size));
                board.cell_mut(*tens).only_allow_candidates(allowed)
            }
            _ => unreachable!(),
        }
    }

    fn propagate(&self, board: &mut Board) -> bool {
        let (lo, hi) = self.base_bounds(board);
        let mut changed = self.propagate_arrow_from_base(board, lo, hi);
        changed |= self.propagate_base_from_arrow(board);
        changed
    }
}

impl RuleHandler for RuleArrow {
    fn number_changed(&mut self, board: &mut Board, pos: CellIdx) -> bool {
        if self.base.contains(&pos) || self.arrow.contains(&pos) {
            self.propagate(board)
        } else {
            false
        }
    }

    fn candidates_changed(&mut self, board: &mut Board) -> bool {
        self.propagate(board)
    }

    fn valid(&self, board: &Board) -> bool {
        let (base_lo, base_hi) = self.base_bounds(board);
        let arrow_sum: i32 = self.arrow.iter().filter(|&&p| board.cell(p).is_solved()).map(|&p| board.cell(p).value() as i32).sum();
        let arrow_all_solved = self.arrow.iter().all(|&p| board.cell(p).is_solved());
        let base_all_solved = self.base.iter().all(|&p| board.cell(p).is_solved());
        if arrow_all_solved && base_all_solved {
            arrow_sum == base_lo
        } else {
            arrow_sum <= base_hi
        }
    }

    fn update_impact(&self, _board: &Board, map: &mut ImpactMap) {
        for &pos in self.base.iter().chain(self.arrow.iter()) {
            map.increment(pos);
        }
    }

    fn name(&self) -> &'static str {
        "Arrow"
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::json!({ "type": "Arrow", "fields": { "base": encode_cells(&self.base), "arrow": encode_cells(&self.arrow) } })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Board;

    #[test]
    fn single_cell_base_bounds_the_arrow() {
        let mut board = Board::new(9).unwrap();
        let base = vec![CellIdx::new(0, 0)];
        let arrow = vec![CellIdx::new(1, 0), CellIdx::new(1, 1)];
        board.set_cell(base[0], 4, true);
        let mut rule = RuleArrow::new(base, arrow.clone());
        rule.candidates_changed(&mut board);
        for &pos in &arrow {
            assert!(!board.get_cell(pos).unwrap().candidates().test(9));
        }
    }

    #[test]
    fn invalid_when_solved_sum_mismatches() {
        let mut board = Board::new(9).unwrap();
        let base = vec![CellIdx::new(0, 0)];
        let arrow = vec![CellIdx::new(1, 0), CellIdx::new(1, 1)];
        board.set_cell(base[0], 3, true);
        board.set_cell(arrow[0], 5, true);
        board.set_cell(arrow[1], 5, true);
        let rule = RuleArrow::new(base, arrow);
        assert!(!rule.valid(&board));
    }
}
