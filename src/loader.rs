//! JSON puzzle/ruleset loading: turns a [`PuzzleDocument`] into a live
//! [`Board`] with its rule handlers registered in document order, and the
//! inverse — serializing a Board's current handler list back into a
//! document for round-tripping or for the `generate` CLI subcommand.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::board::Board;
use crate::error::{Result, SolverError};
use crate::number_set::Number;
use crate::region::{CellIdx, CornerIdx};
use crate::rules::anti_chess::RuleAntiChess;
use crate::rules::arrow::RuleArrow;
use crate::rules::chevron::RuleChevron;
use crate::rules::clone_region::RuleClone;
use crate::rules::diagonal::RuleDiagonal;
use crate::rules::diagonal_sum::RuleDiagonalSum;
use crate::rules::dutch_flat::RuleDutchFlat;
use crate::rules::killer::RuleKiller;
use crate::rules::kropki::RuleKropki;
use crate::rules::magic_square::RuleMagicSquare;
use crate::rules::numbered_rooms::RuleNumberedRooms;
use crate::rules::palindrome::RulePalindrome;
use crate::rules::parity::RuleParity;
use crate::rules::quadruple::RuleQuadruple;
use crate::rules::regions::RuleRegions;
use crate::rules::renban::RuleRenban;
use crate::rules::sandwich::RuleSandwich;
use crate::rules::standard::RuleStandard;
use crate::rules::thermo::RuleThermo;
use crate::rules::whisper::RuleWhisper;
use crate::rules::wild_apples::RuleWildApples;
use crate::rules::xv::RuleXv;
use crate::rules::RuleHandler;

/// `(row, col, value)` — a single fixed cell, serialized as a 3-element
/// JSON array.
pub type Given = (u8, u8, Number);

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleRecord {
    #[serde(rename = "type")]
    pub tag: String,
    #[serde(default)]
    pub fields: Value,
}

/// The external, serde-modeled shape handed to and produced by the loader.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PuzzleDocument {
    pub size: u8,
    #[serde(default)]
    pub givens: Vec<Given>,
    #[serde(default)]
    pub rules: Vec<RuleRecord>,
}

/// Dispatches a rule record's `type` tag to the matching handler's own
/// `from_json` constructor. `Irregular-Regions`/`Extra-Regions` and
/// `Killer`/`Custom-Sum` share one struct under two tags.
pub fn build_rule(tag: &str, fields: &Value, board_size: u8) -> Result<Box<dyn RuleHandler>> {
    let handler: Box<dyn RuleHandler> = match tag {
        "Standard" => Box::new(RuleStandard::from_json(fields, board_size)?),
        "Irregular-Regions" => Box::new(RuleRegions::from_json_irregular(fields, board_size)?),
        "Extra-Regions" => Box::new(RuleRegions::from_json_extra(fields, board_size)?),
        "Diagonal" => Box::new(RuleDiagonal::from_json(fields, board_size)?),
        "Kropki" => Box::new(RuleKropki::from_json(fields, board_size)?),
        "XV" => Box::new(RuleXv::from_json(fields, board_size)?),
        "Wild-Apples" => Box::new(RuleWildApples::from_json(fields, board_size)?),
        "Chevron" => Box::new(RuleChevron::from_json(fields, board_size)?),
        "Killer" => Box::new(RuleKiller::from_json_killer(fields, board_size)?),
        "Custom-Sum" => Box::new(RuleKiller::from_json_custom_sum(fields, board_size)?),
        "Arrow" => Box::new(RuleArrow::from_json(fields, board_size)?),
        "Thermo" => Box::new(RuleThermo::from_json(fields, board_size)?),
        "Palindrome" => Box::new(RulePalindrome::from_json(fields, board_size)?),
        "Renban" => Box::new(RuleRenban::from_json(fields, board_size)?),
        "Whisper" => Box::new(RuleWhisper::from_json(fields, board_size)?),
        "Parity" => Box::new(RuleParity::from_json(fields, board_size)?),
        "Clone" => Box::new(RuleClone::from_json(fields, board_size)?),
        "Magic-Square" => Box::new(RuleMagicSquare::from_json(fields, board_size)?),
        "Diagonal-Sum" => Box::new(RuleDiagonalSum::from_json(fields, board_size)?),
        "Sandwich" => Box::new(RuleSandwich::from_json(fields, board_size)?),
        "Anti-Chess" => Box::new(RuleAntiChess::from_json(fields, board_size)?),
        "Quadruple" => Box::new(RuleQuadruple::from_json(fields, board_size)?),
        "Dutch-Flat" => Box::new(RuleDutchFlat::from_json(fields, board_size)?),
        "Numbered-Rooms" => Box::new(RuleNumberedRooms::from_json(fields, board_size)?),
        other => return Err(SolverError::UnknownRuleTag(other.to_string())),
    };
    Ok(handler)
}

/// Constructs a fresh, empty-parameter handler for `tag` — the starting
/// point for the `generate` CLI subcommand, which then calls
/// [`RuleHandler::init_randomly`] on it before serializing it out.
pub fn default_rule(tag: &str, board_size: u8) -> Result<Box<dyn RuleHandler>> {
    let handler: Box<dyn RuleHandler> = match tag {
        "Standard" => Box::new(RuleStandard::new()),
        "Irregular-Regions" => Box::new(RuleRegions::irregular(Vec::new())),
        "Extra-Regions" => Box::new(RuleRegions::extra(Vec::new())),
        "Diagonal" => Box::new(RuleDiagonal::new(board_size, true, true)),
        "Kropki" => Box::new(RuleKropki::new(Vec::new(), false)),
        "XV" => Box::new(RuleXv::new(Vec::new(), false)),
        "Wild-Apples" => Box::new(RuleWildApples::new(Vec::new())),
        "Chevron" => Box::new(RuleChevron::new(Vec::new())),
        "Killer" => Box::new(RuleKiller::killer(Vec::new())),
        "Custom-Sum" => Box::new(RuleKiller::custom_sum(Vec::new())),
        "Arrow" => Box::new(RuleArrow::new(vec![CellIdx::new(0, 0)], Vec::new())),
        "Thermo" => Box::new(RuleThermo::new(Vec::new())),
        "Palindrome" => Box::new(RulePalindrome::new(Vec::new())),
        "Renban" => Box::new(RuleRenban::new(Vec::new())),
        "Whisper" => Box::new(RuleWhisper::new(Vec::new(), 0)),
        "Parity" => Box::new(RuleParity::new(Vec::new())),
        "Clone" => Box::new(RuleClone::new(Vec::new())),
        "Magic-Square" => Box::new(RuleMagicSquare::new(magic_square_block(board_size))),
        "Diagonal-Sum" => Box::new(RuleDiagonalSum::new(Vec::new(), 0, true)),
        "Sandwich" => Box::new(RuleSandwich::new(Vec::new())),
        "Anti-Chess" => Box::new(RuleAntiChess::knight_move(board_size, None, Vec::new())),
        "Quadruple" => Box::new(RuleQuadruple::new(CornerIdx::new(0, 0), Vec::new())),
        "Dutch-Flat" => Box::new(RuleDutchFlat::new()),
        "Numbered-Rooms" => Box::new(RuleNumberedRooms::new(Vec::new())),
        other => return Err(SolverError::UnknownRuleTag(other.to_string())),
    };
    Ok(handler)
}

/// A 3x3 block at the board's top-left corner, used as the placeholder
/// region for a default-constructed Magic-Square handler.
fn magic_square_block(board_size: u8) -> [CellIdx; 9] {
    let mut cells = [CellIdx::new(0, 0); 9];
    let mut i = 0;
    for r in 0..3.min(board_size) {
        for c in 0..3.min(board_size) {
            cells[i] = CellIdx::new(r, c);
            i += 1;
        }
    }
    cells
}

/// Builds a live Board from a document: validates `size`, applies `givens`
/// (forced, unchecked), then registers each rule in document order.
pub fn load(doc: &PuzzleDocument) -> Result<Board> {
    let mut board = Board::new(doc.size)?;
    for &(row, col, value) in &doc.givens {
        board.set_cell(CellIdx::new(row, col), value, true);
    }
    for record in &doc.rules {
        log::debug!("registering rule '{}'", record.tag);
        let handler = build_rule(&record.tag, &record.fields, doc.size)?;
        board.add_handler(handler);
    }
    board
        .valid()
        .then_some(())
        .ok_or_else(|| SolverError::MalformedRegion { rule: "<puzzle>".to_string(), reason: "givens already violate a registered rule".to_string() })?;
    Ok(board)
}

/// The inverse of [`load`]: serializes a Board's handler list and current
/// solved cells back into a document. Unsolved cells are omitted from
/// `givens`.
pub fn dump(board: &Board) -> PuzzleDocument {
    let mut givens = Vec::new();
    for pos in board.all_cells() {
        let cell = board.get_cell(pos).expect("all_cells yields only in-range positions");
        if cell.is_solved() {
            givens.push((pos.r, pos.c, cell.value()));
        }
    }
    let rules = (0..board.handler_count())
        .filter_map(|i| board.handler_json(i))
        .map(|value| {
            let tag = value.get("type").and_then(Value::as_str).unwrap_or_default().to_string();
            let fields = value.get("fields").cloned().unwrap_or(Value::Null);
            RuleRecord { tag, fields }
        })
        .collect();
    PuzzleDocument { size: board.size(), givens, rules }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn standard_kropki_doc() -> PuzzleDocument {
        PuzzleDocument {
            size: 9,
            givens: vec![(0, 0, 1)],
            rules: vec![
                RuleRecord { tag: "Standard".to_string(), fields: serde_json::json!({}) },
                RuleRecord {
                    tag: "Kropki".to_string(),
                    fields: serde_json::json!({ "edges": [{ "a": [0, 1], "b": [0, 2], "kind": "white" }] }),
                },
            ],
        }
    }

    #[test]
    fn loads_givens_and_rules_in_order() {
        let doc = standard_kropki_doc();
        let board = load(&doc).unwrap();
        assert_eq!(board.handler_count(), 2);
        assert_eq!(board.get_cell(CellIdx::new(0, 0)).unwrap().value(), 1);
    }

    #[test]
    fn unknown_tag_is_rejected() {
        let mut doc = standard_kropki_doc();
        doc.rules.push(RuleRecord { tag: "Not-A-Rule".to_string(), fields: serde_json::json!({}) });
        assert!(matches!(load(&doc), Err(SolverError::UnknownRuleTag(_))));
    }

    #[test]
    fn round_trips_through_dump_and_reload() {
        let doc = standard_kropki_doc();
        let board = load(&doc).unwrap();
        let dumped = dump(&board);
        assert_eq!(dumped.size, doc.size);
        let reloaded = load(&dumped).unwrap();
        assert_eq!(reloaded.handler_count(), board.handler_count());
    }
}
