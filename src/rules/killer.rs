//! Killer cages and Custom-Sum regions: a region of cells must sum to a
//! fixed target, optionally forbidding repeated values inside the cage.
//! Killer forbids repeats; Custom-Sum allows them. Both share this one
//! propagation algorithm, parameterized by that single flag.

use crate::board::Board;
use crate::error::Result;
use crate::impact_map::ImpactMap;
use crate::number_set::NumberSet;
use crate::region::{CellIdx, Region};
use crate::rules::json::{as_array, as_i32, encode_cells, field, parse_cells};
use crate::rules::utils::apply_sum_bounds;
use crate::rules::RuleHandler;

#[derive(Debug, Clone)]
pub struct Cage {
    pub region: Region<CellIdx>,
    pub sum: i32,
}

#[derive(Debug)]
pub struct RuleKiller {
    name: &'static str,
    number_can_repeat: bool,
    cages: Vec<Cage>,
}

impl RuleKiller {
    pub fn killer(cages: Vec<Cage>) -> Self {
        RuleKiller { name: "Killer", number_can_repeat: false, cages }
    }

    pub fn custom_sum(cages: Vec<Cage>) -> Self {
        RuleKiller { name: "Custom-Sum", number_can_repeat: true, cages }
    }

    fn parse_cages(fields: &serde_json::Value, rule: &str) -> Result<Vec<Cage>> {
        as_array(field(fields, "cages", rule)?, rule, "cages")?
            .iter()
            .map(|c| {
                let region: Region<CellIdx> = parse_cells(field(c, "cells", rule)?, rule)?.into_iter().collect();
                let sum = as_i32(field(c, "sum", rule)?, rule, "sum")?;
                Ok(Cage { region, sum })
            })
            .collect()
    }

    pub fn from_json_killer(fields: &serde_json::Value, _board_size: u8) -> Result<Self> {
        Ok(RuleKiller::killer(Self::parse_cages(fields, "Killer")?))
    }

    pub fn from_json_custom_sum(fields: &serde_json::Value, _board_size: u8) -> Result<Self> {
        Ok(RuleKiller::custom_sum(Self::parse_cages(fields, "Custom-Sum")?))
    }

    fn cages_containing(&self, pos: CellIdx) -> impl Iterator<Item = &Cage> {
        self.cages.iter().filter(move |cage| cage.region.has(&pos))
    }
}

impl RuleHandler for RuleKiller {
    fn number_changed(&mut self, board: &mut Board, pos: CellIdx) -> bool {
        let cages: Vec<Cage> = self.cages_containing(pos).cloned().collect();
        let mut changed = false;
        for cage in &cages {
            changed |= apply_sum_bounds(board, cage.region.items(), cage.sum, !self.number_can_repeat);
        }
        changed
    }

    fn candidates_changed(&mut self, board: &mut Board) -> bool {
        let mut changed = false;
        for cage in self.cages.clone() {
            changed |= apply_sum_bounds(board, cage.region.items(), cage.sum, !self.number_can_repeat);
        }
        changed
    }

    fn valid(&self, board: &Board) -> bool {
        for cage in &self.cages {
            let mut sum = 0i32;
            let mut all_solved = true;
            let mut seen = NumberSet::empty(board.size());
            for &pos in cage.region.items() {
                let cell = board.cell(pos);
                if cell.is_solved() {
                    sum += cell.value() as i32;
                    if !self.number_can_repeat {
                        if seen.test(cell.value()) {
                            return false;
                        }
                        seen.add(cell.value());
                    }
                } else {
                    all_solved = false;
                }
            }
            if all_solved && sum != cage.sum {
                return false;
            }
        }
        true
    }

    fn update_impact(&self, _board: &Board, map: &mut ImpactMap) {
        for cage in &self.cages {
            map.increment_region(&cage.region);
        }
    }

    fn name(&self) -> &'static str {
        self.name
    }

    fn to_json(&self) -> serde_json::Value {
        let cages: Vec<serde_json::Value> =
            self.cages.iter().map(|cage| serde_json::json!({ "cells": encode_cells(cage.region.items()), "sum": cage.sum })).collect();
        serde_json::json!({ "type": self.name, "fields": { "cages": cages } })
    }
}
