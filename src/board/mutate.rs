use std::mem;

use super::state::Snapshot;
use super::Board;
use crate::number_set::Number;
use crate::region::CellIdx;
use crate::rules::RuleHandler;

impl Board {
    /// Registers `handler`, then runs propagation to fixpoint so the new
    /// handler's constraints are reflected immediately.
    pub fn add_handler(&mut self, handler: Box<dyn RuleHandler>) {
        self.handlers.push(handler);
        self.process_rule_candidates();
    }

    pub fn is_valid_move(&self, pos: CellIdx, v: Number) -> bool {
        let cell = self.cell(pos);
        !cell.is_solved() && cell.candidates().test(v)
    }

    /// False if any empty cell has run out of candidates, or any handler
    /// reports its rule is violated. Takes `&mut self` only to temporarily
    /// move the handler list out (avoiding a borrow conflict with passing
    /// `self` to each handler's `valid`); it never mutates the grid.
    pub fn valid(&mut self) -> bool {
        if self.grid.iter().any(|c| !c.is_solved() && c.candidates().is_empty()) {
            return false;
        }
        let handlers = mem::take(&mut self.handlers);
        let ok = handlers.iter().all(|h| !h.enabled() || h.valid(self));
        self.handlers = handlers;
        ok
    }

    pub fn push_history(&mut self) {
        self.history.push(Snapshot::capture(&self.grid));
    }

    pub fn pop_history(&mut self) {
        if let Some(snapshot) = self.history.pop() {
            snapshot.restore(&mut self.grid);
        }
    }

    pub fn history_depth(&self) -> usize {
        self.history.len()
    }

    /// Calls every handler's `number_changed(pos)` once, in registration
    /// order, aggregating their change bits.
    pub(crate) fn process_rule_number_changed(&mut self, pos: CellIdx) -> bool {
        let mut handlers = mem::take(&mut self.handlers);
        let mut changed = false;
        for h in handlers.iter_mut() {
            if h.enabled() {
                changed |= h.number_changed(self, pos);
            }
        }
        self.handlers = handlers;
        changed
    }

    /// Runs every handler's `candidates_changed()` to fixpoint: repeated
    /// full sweeps until a sweep produces no change. Bounded by the total
    /// popcount of every cell's candidates, which only ever shrinks.
    pub(crate) fn process_rule_candidates(&mut self) -> bool {
        let mut handlers = mem::take(&mut self.handlers);
        let mut any_changed = false;
        let mut changed = true;
        while changed {
            changed = false;
            for h in handlers.iter_mut() {
                if h.enabled() {
                    changed |= h.candidates_changed(self);
                }
            }
            any_changed |= changed;
        }
        self.handlers = handlers;
        any_changed
    }

    /// Writes `v` into `pos`. When `force` is true, skips validation and
    /// history (only ever appropriate for loading givens). Otherwise: fails
    /// (returns `false`, state unchanged) unless `is_valid_move`; on success
    /// pushes a snapshot, writes the value, propagates, and rolls back (but
    /// keeps the failure local) if propagation leaves the board invalid.
    pub fn set_cell(&mut self, pos: CellIdx, v: Number, force: bool) -> bool {
        if !force {
            if !self.is_valid_move(pos, v) {
                return false;
            }
            self.push_history();
            self.cell_mut(pos).set_value(v);
            self.process_rule_number_changed(pos);
            self.process_rule_candidates();
            if !self.valid() {
                self.pop_history();
                return false;
            }
            true
        } else {
            self.cell_mut(pos).set_value(v);
            self.process_rule_number_changed(pos);
            self.process_rule_candidates();
            true
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_cell_rejects_value_outside_candidates() {
        let mut board = Board::new(9).unwrap();
        board.set_cell(CellIdx::new(0, 0), 5, true);
        // (0,1) no longer has 5 as a candidate once the standard rule is
        // registered, but with no handlers registered here every value is
        // still nominally a candidate everywhere; this only exercises the
        // bounds-style rejection path.
        assert!(!board.set_cell(CellIdx::new(0, 0), 1, false));
    }

    #[test]
    fn history_round_trips() {
        let mut board = Board::new(9).unwrap();
        let before = board.grid.clone();
        board.push_history();
        board.cell_mut(CellIdx::new(0, 0)).set_value(5);
        board.pop_history();
        assert_eq!(board.grid, before);
    }

    #[test]
    fn forced_set_skips_history() {
        let mut board = Board::new(9).unwrap();
        assert_eq!(board.history_depth(), 0);
        board.set_cell(CellIdx::new(0, 0), 5, true);
        assert_eq!(board.history_depth(), 0);
        assert_eq!(board.get_cell(CellIdx::new(0, 0)).unwrap().value(), 5);
    }
}
