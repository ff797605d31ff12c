//! The rule-handler contract (§4.4) and the library of concrete variant
//! rules that implement it (§4.5).

use std::fmt::Debug;

use crate::board::Board;
use crate::impact_map::ImpactMap;
use crate::region::CellIdx;

pub mod anti_chess;
pub mod arrow;
pub mod chevron;
pub mod clone_region;
pub mod diagonal;
pub mod diagonal_sum;
pub mod dutch_flat;
pub mod json;
pub mod killer;
pub mod kropki;
pub mod magic_square;
pub mod numbered_rooms;
pub mod palindrome;
pub mod parity;
pub mod quadruple;
pub mod regions;
pub mod renban;
pub mod sandwich;
pub mod standard;
pub mod thermo;
pub mod utils;
pub mod whisper;
pub mod wild_apples;
pub mod xv;

/// Every variant rule implements this. Handlers are pure functions of the
/// `Board` they are handed on each call — they never cache cell references
/// across calls, and may only mutate cells through `Cell::remove_candidate`
/// / `Cell::only_allow_candidates`.
pub trait RuleHandler: Debug {
    /// The cell at `pos` just became solved. Fired exactly once per
    /// successful `set_cell`, never for a candidate-only change. Returns
    /// whether anything changed.
    fn number_changed(&mut self, board: &mut Board, pos: CellIdx) -> bool;

    /// One full reduction pass over the whole board. Must be monotone
    /// (candidates only shrink) and idempotent at its own fixpoint. Returns
    /// whether anything changed.
    fn candidates_changed(&mut self, board: &mut Board) -> bool;

    /// False only when the handler can prove the current partial assignment
    /// violates its rule. Must never be false when some completion still
    /// satisfies it.
    fn valid(&self, board: &Board) -> bool;

    /// Increments `map` at cells where this handler tends to prune. Purely a
    /// search heuristic signal; may be a no-op.
    fn update_impact(&self, board: &Board, map: &mut ImpactMap);

    /// Whether this handler currently participates. A disabled handler must
    /// behave as `changed=false, valid=true`, and must not touch the impact
    /// map; propagation still calls it rather than the registry filtering
    /// disabled handlers out.
    fn enabled(&self) -> bool {
        true
    }

    /// Populates this handler's parameters with a plausible random choice,
    /// for the `generate` CLI subcommand's smoke test. Default no-op: most
    /// handlers are either parameter-free or were already given their shape
    /// (e.g. board size) at construction.
    fn init_randomly(&mut self, _board_size: u8, _rng: &mut dyn rand::RngCore) {}

    fn name(&self) -> &'static str;

    /// Serializes this handler's parameters back to the `fields` object of
    /// a rule record, for the loader's `PuzzleDocument` round-trip and the
    /// `generate` CLI subcommand. The matching constructor is each rule's own
    /// (non-trait) `from_json` associated function, dispatched from the tag
    /// string by `loader::build_rule`.
    fn to_json(&self) -> serde_json::Value;
}
