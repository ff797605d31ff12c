//! Palindrome lines: an ordered path whose cells, read from either end, form
//! the same sequence of digits. Propagation intersects each mirrored pair's
//! candidates; the middle cell of an odd-length path has no partner and is
//! untouched.

use crate::board::Board;
use crate::error::Result;
use crate::impact_map::ImpactMap;
use crate::region::{CellIdx, Region};
use crate::rules::json::{encode_paths, field, parse_paths};
use crate::rules::utils::generate_random_path;
use crate::rules::RuleHandler;

#[derive(Debug)]
pub struct RulePalindrome {
    paths: Vec<Vec<CellIdx>>,
}

impl RulePalindrome {
    pub fn new(paths: Vec<Vec<CellIdx>>) -> Self {
        RulePalindrome { paths }
    }

    pub fn from_json(fields: &serde_json::Value, _board_size: u8) -> Result<Self> {
        let paths = parse_paths(field(fields, "paths", "Palindrome")?, "Palindrome")?;
        Ok(RulePalindrome::new(paths))
    }

    fn mirror_pairs(path: &[CellIdx]) -> impl Iterator<Item = (CellIdx, CellIdx)> + '_ {
        let len = path.len();
        (0..len / 2).map(move |i| (path[i], path[len - 1 - i]))
    }

    fn propagate(board: &mut Board, path: &[CellIdx]) -> bool {
        let mut changed = false;
        for (a, b) in Self::mirror_pairs(path) {
            let intersected = board.cell(a).candidates().intersection(&board.cell(b).candidates());
            changed |= board.cell_mut(a).only_allow_candidates(intersected);
            changed |= board.cell_mut(b).only_allow_candidates(intersected);
        }
        changed
    }
}

impl RuleHandler for RulePalindrome {
    fn number_changed(&mut self, _board: &mut Board, _pos: CellIdx) -> bool {
        false
    }

    fn candidates_changed(&mut self, board: &mut Board) -> bool {
        let mut changed = false;
        for path in self.paths.clone() {
            changed |= Self::propagate(board, &path);
        }
        changed
    }

    fn valid(&self, board: &Board) -> bool {
        for path in &self.paths {
            for (a, b) in Self::mirror_pairs(path) {
                let ca = board.cell(a);
                let cb = board.cell(b);
                if ca.is_solved() && cb.is_solved() && ca.value() != cb.value() {
                    return false;
                }
            }
        }
        true
    }

    fn update_impact(&self, _board: &Board, map: &mut ImpactMap) {
        for path in &self.paths {
            for &pos in path {
                map.increment(pos);
            }
        }
    }

    fn init_randomly(&mut self, board_size: u8, rng: &mut dyn rand::RngCore) {
        let mut available: Region<CellIdx> = Region::all(board_size).into_iter().collect();
        let length = (board_size / 2 * 2).max(2) as usize;
        let path = generate_random_path(board_size, length, &mut available, rng);
        if path.size() >= 2 {
            self.paths.push(path.items().to_vec());
        }
    }

    fn name(&self) -> &'static str {
        "Palindrome"
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::json!({ "type": "Palindrome", "fields": { "paths": encode_paths(&self.paths) } })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Board;
    use crate::number_set::NumberSet;

    #[test]
    fn mirrored_cells_intersect_candidates() {
        let mut board = Board::new(9).unwrap();
        let a = CellIdx::new(0, 0);
        let b = CellIdx::new(0, 3);
        board.cell_mut(a).only_allow_candidates(NumberSet::at_most(3, 9));
        board.cell_mut(b).only_allow_candidates(NumberSet::at_least(2, 9));
        let mut rule = RulePalindrome::new(vec![vec![a, CellIdx::new(0, 1), CellIdx::new(0, 2), b]]);
        rule.candidates_changed(&mut board);
        let expected = NumberSet::at_most(3, 9).intersection(&NumberSet::at_least(2, 9));
        assert_eq!(board.get_cell(a).unwrap().candidates(), expected);
        assert_eq!(board.get_cell(b).unwrap().candidates(), expected);
    }

    #[test]
    fn invalid_when_mirrors_disagree() {
        let mut board = Board::new(9).unwrap();
        board.set_cell(CellIdx::new(0, 0), 1, true);
        board.set_cell(CellIdx::new(0, 1), 2, true);
        let rule = RulePalindrome::new(vec![vec![CellIdx::new(0, 0), CellIdx::new(0, 1)]]);
        assert!(!rule.valid(&board));
    }
}
