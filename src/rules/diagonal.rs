//! Main and/or anti-diagonal uniqueness.

use crate::board::Board;
use crate::error::Result;
use crate::impact_map::ImpactMap;
use crate::region::CellIdx;
use crate::rules::json::as_bool;
use crate::rules::utils::{eliminate_value, hidden_singles, is_group_valid};
use crate::rules::RuleHandler;

#[derive(Debug)]
pub struct RuleDiagonal {
    main: bool,
    anti: bool,
    diagonals: Vec<Vec<CellIdx>>,
}

impl RuleDiagonal {
    pub fn new(board_size: u8, main: bool, anti: bool) -> Self {
        let mut diagonals = Vec::new();
        if main {
            diagonals.push((0..board_size).map(|i| CellIdx::new(i, i)).collect());
        }
        if anti {
            diagonals.push((0..board_size).map(|i| CellIdx::new(i, board_size - 1 - i)).collect());
        }
        RuleDiagonal { main, anti, diagonals }
    }

    pub fn from_json(fields: &serde_json::Value, board_size: u8) -> Result<Self> {
        let main = match fields.get("main") {
            Some(v) => as_bool(v, "Diagonal", "main")?,
            None => true,
        };
        let anti = match fields.get("anti") {
            Some(v) => as_bool(v, "Diagonal", "anti")?,
            None => true,
        };
        Ok(RuleDiagonal::new(board_size, main, anti))
    }

    fn diagonals_containing(&self, pos: CellIdx) -> impl Iterator<Item = &Vec<CellIdx>> {
        self.diagonals.iter().filter(move |d| d.contains(&pos))
    }
}

impl RuleHandler for RuleDiagonal {
    fn number_changed(&mut self, board: &mut Board, pos: CellIdx) -> bool {
        let v = board.cell(pos).value();
        let mut changed = false;
        for d in self.diagonals_containing(pos).cloned().collect::<Vec<_>>() {
            changed |= eliminate_value(board, &d, Some(pos), v);
        }
        changed
    }

    fn candidates_changed(&mut self, board: &mut Board) -> bool {
        let mut changed = false;
        for d in &self.diagonals {
            changed |= hidden_singles(board, d);
        }
        changed
    }

    fn valid(&self, board: &Board) -> bool {
        self.diagonals.iter().all(|d| is_group_valid(board, d))
    }

    fn update_impact(&self, _board: &Board, _map: &mut ImpactMap) {}

    fn name(&self) -> &'static str {
        "Diagonal"
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::json!({ "type": "Diagonal", "fields": { "main": self.main, "anti": self.anti } })
    }
}
