//! Irregular-Regions and Extra-Regions: both are "treat this user-supplied
//! region as a uniqueness unit", differing only in whether the regions
//! replace the board's blocks or sit alongside them — a distinction that
//! lives entirely in which regions the loader hands this handler, not in the
//! propagation logic itself.

use crate::board::Board;
use crate::error::Result;
use crate::impact_map::ImpactMap;
use crate::region::{CellIdx, Region};
use crate::rules::json::{as_array, encode_cells, field, parse_cells};
use crate::rules::utils::{eliminate_value, hidden_singles, is_group_valid};
use crate::rules::RuleHandler;

#[derive(Debug)]
pub struct RuleRegions {
    name: &'static str,
    regions: Vec<Region<CellIdx>>,
}

impl RuleRegions {
    pub fn irregular(regions: Vec<Region<CellIdx>>) -> Self {
        RuleRegions { name: "Irregular-Regions", regions }
    }

    pub fn extra(regions: Vec<Region<CellIdx>>) -> Self {
        RuleRegions { name: "Extra-Regions", regions }
    }

    fn parse_regions(fields: &serde_json::Value, rule: &str) -> Result<Vec<Region<CellIdx>>> {
        as_array(field(fields, "regions", rule)?, rule, "regions")?
            .iter()
            .map(|r| parse_cells(r, rule).map(|cells| cells.into_iter().collect::<Region<CellIdx>>()))
            .collect()
    }

    pub fn from_json_irregular(fields: &serde_json::Value, _board_size: u8) -> Result<Self> {
        Ok(RuleRegions::irregular(Self::parse_regions(fields, "Irregular-Regions")?))
    }

    pub fn from_json_extra(fields: &serde_json::Value, _board_size: u8) -> Result<Self> {
        Ok(RuleRegions::extra(Self::parse_regions(fields, "Extra-Regions")?))
    }

    fn regions_containing(&self, pos: CellIdx) -> impl Iterator<Item = &Region<CellIdx>> {
        self.regions.iter().filter(move |r| r.has(&pos))
    }
}

impl RuleHandler for RuleRegions {
    fn number_changed(&mut self, board: &mut Board, pos: CellIdx) -> bool {
        let v = board.cell(pos).value();
        let mut changed = false;
        for region in self.regions_containing(pos).cloned().collect::<Vec<_>>() {
            changed |= eliminate_value(board, region.items(), Some(pos), v);
        }
        changed
    }

    fn candidates_changed(&mut self, board: &mut Board) -> bool {
        let mut changed = false;
        for region in &self.regions {
            changed |= hidden_singles(board, region.items());
        }
        changed
    }

    fn valid(&self, board: &Board) -> bool {
        self.regions.iter().all(|region| is_group_valid(board, region.items()))
    }

    fn update_impact(&self, _board: &Board, _map: &mut ImpactMap) {}

    fn name(&self) -> &'static str {
        self.name
    }

    fn to_json(&self) -> serde_json::Value {
        let regions: Vec<serde_json::Value> = self.regions.iter().map(|r| encode_cells(r.items())).collect();
        serde_json::json!({ "type": self.name, "fields": { "regions": regions } })
    }
}
