//! Clone regions: two or more congruent regions (same shape under
//! translation) must hold identical values position-wise. The constructor
//! does the grouping: regions are normalized to their own bounding-box
//! origin and sorted row-major, so two regions land in the same group iff
//! their normalized shapes match, and position `i` in one region always
//! corresponds to position `i` in every other region of its group.

use crate::board::Board;
use crate::error::Result;
use crate::impact_map::ImpactMap;
use crate::region::{CellIdx, Region};
use crate::rules::json::{as_array, encode_cells, field, parse_cells};
use crate::rules::RuleHandler;

#[derive(Debug)]
pub struct RuleClone {
    groups: Vec<Vec<Vec<CellIdx>>>,
}

fn normalize(region: &Region<CellIdx>) -> (Vec<(i16, i16)>, Vec<CellIdx>) {
    let mut cells: Vec<CellIdx> = region.items().to_vec();
    cells.sort_by_key(|c| (c.r, c.c));
    let origin = cells[0];
    let shape = cells.iter().map(|c| (c.r as i16 - origin.r as i16, c.c as i16 - origin.c as i16)).collect();
    (shape, cells)
}

impl RuleClone {
    /// Groups `regions` by congruent shape; groups of size 1 (no actual
    /// clone partner) are dropped since they impose no constraint.
    pub fn new(regions: Vec<Region<CellIdx>>) -> Self {
        let mut by_shape: Vec<(Vec<(i16, i16)>, Vec<Vec<CellIdx>>)> = Vec::new();
        for region in &regions {
            if region.is_empty() {
                continue;
            }
            let (shape, cells) = normalize(region);
            if let Some((_, group)) = by_shape.iter_mut().find(|(s, _)| *s == shape) {
                group.push(cells);
            } else {
                by_shape.push((shape, vec![cells]));
            }
        }
        let groups = by_shape.into_iter().map(|(_, g)| g).filter(|g| g.len() > 1).collect();
        RuleClone { groups }
    }

    pub fn from_json(fields: &serde_json::Value, _board_size: u8) -> Result<Self> {
        let regions = as_array(field(fields, "regions", "Clone")?, "Clone", "regions")?
            .iter()
            .map(|r| parse_cells(r, "Clone").map(|cells| cells.into_iter().collect::<Region<CellIdx>>()))
            .collect::<Result<Vec<_>>>()?;
        Ok(RuleClone::new(regions))
    }

    fn groups_containing(&self, pos: CellIdx) -> impl Iterator<Item = &Vec<Vec<CellIdx>>> {
        self.groups.iter().filter(move |g| g.iter().any(|region| region.contains(&pos)))
    }
}

impl RuleHandler for RuleClone {
    fn number_changed(&mut self, board: &mut Board, pos: CellIdx) -> bool {
        let groups: Vec<Vec<Vec<CellIdx>>> = self.groups_containing(pos).cloned().collect();
        let mut changed = false;
        for group in &groups {
            for i in 0..group[0].len() {
                let mut intersected = board.cell(group[0][i]).candidates();
                for region in &group[1..] {
                    intersected = intersected.intersection(&board.cell(region[i]).candidates());
                }
                for region in group {
                    changed |= board.cell_mut(region[i]).only_allow_candidates(intersected);
                }
            }
        }
        changed
    }

    fn candidates_changed(&mut self, board: &mut Board) -> bool {
        let mut changed = false;
        for group in self.groups.clone() {
            for i in 0..group[0].len() {
                let mut intersected = board.cell(group[0][i]).candidates();
                for region in &group[1..] {
                    intersected = intersected.intersection(&board.cell(region[i]).candidates());
                }
                for region in &group {
                    changed |= board.cell_mut(region[i]).only_allow_candidates(intersected);
                }
            }
        }
        changed
    }

    fn valid(&self, board: &Board) -> bool {
        for group in &self.groups {
            for i in 0..group[0].len() {
                let mut value = None;
                for region in group {
                    let cell = board.cell(region[i]);
                    if cell.is_solved() {
                        match value {
                            None => value = Some(cell.value()),
                            Some(v) if v != cell.value() => return false,
                            _ => {}
                        }
                    }
                }
            }
        }
        true
    }

    fn update_impact(&self, _board: &Board, map: &mut ImpactMap) {
        for group in &self.groups {
            for region in group {
                for &pos in region {
                    map.increment(pos);
                }
            }
        }
    }

    fn name(&self) -> &'static str {
        "Clone"
    }

    fn to_json(&self) -> serde_json::Value {
        let regions: Vec<serde_json::Value> = self.groups.iter().flatten().map(|cells| encode_cells(cells)).collect();
        serde_json::json!({ "type": "Clone", "fields": { "regions": regions } })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Board;
    use crate::number_set::NumberSet;

    fn region_of(cells: &[(u8, u8)]) -> Region<CellIdx> {
        cells.iter().map(|&(r, c)| CellIdx::new(r, c)).collect()
    }

    #[test]
    fn congruent_regions_are_grouped_and_intersected() {
        let mut board = Board::new(9).unwrap();
        let a = region_of(&[(0, 0), (0, 1)]);
        let b = region_of(&[(3, 3), (3, 4)]);
        board.cell_mut(CellIdx::new(0, 0)).only_allow_candidates(NumberSet::at_most(3, 9));
        let mut rule = RuleClone::new(vec![a, b]);
        rule.candidates_changed(&mut board);
        assert_eq!(board.get_cell(CellIdx::new(3, 3)).unwrap().candidates(), NumberSet::at_most(3, 9));
    }

    #[test]
    fn non_congruent_regions_are_not_grouped() {
        let a = region_of(&[(0, 0), (0, 1)]);
        let b = region_of(&[(3, 3), (4, 3), (4, 4)]);
        let rule = RuleClone::new(vec![a, b]);
        assert!(rule.groups.is_empty());
    }
}
