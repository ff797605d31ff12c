use crate::cell::Cell;
use crate::error::{Result, SolverError};
use crate::impact_map::ImpactMap;
use crate::region::CellIdx;
use crate::rules::RuleHandler;

/// A full copy of the grid, used to restore state on backtrack. Only the
/// grid is captured — handler-internal state is either immutable after
/// construction or reconstructable from the grid, so it never needs to be
/// part of a snapshot.
#[derive(Clone)]
pub struct Snapshot {
    cells: Vec<Cell>,
}

/// An implementation ceiling well above any puzzle this solver is meant for;
/// exists so `NumberSet`'s bit width is never in question.
pub const MAX_SIZE: u8 = 25;

pub struct Board {
    pub(super) size: u8,
    pub(super) block_size: u8,
    pub(super) grid: Vec<Cell>,
    pub(super) rows: Vec<Vec<CellIdx>>,
    pub(super) cols: Vec<Vec<CellIdx>>,
    pub(super) blocks: Vec<Vec<CellIdx>>,
    pub(super) handlers: Vec<Box<dyn RuleHandler>>,
    pub(super) history: Vec<Snapshot>,
    pub(super) impact: ImpactMap,
}

fn integer_sqrt_if_perfect(n: u8) -> Option<u8> {
    let root = (n as f64).sqrt().round() as u8;
    if root * root == n {
        Some(root)
    } else {
        None
    }
}

impl Board {
    pub fn new(size: u8) -> Result<Self> {
        if size == 0 || size > MAX_SIZE {
            return Err(SolverError::InvalidSize(size as usize));
        }

        let mut grid = Vec::with_capacity(size as usize * size as usize);
        for r in 0..size {
            for c in 0..size {
                grid.push(Cell::new(CellIdx::new(r, c), size));
            }
        }

        let rows: Vec<Vec<CellIdx>> = (0..size)
            .map(|r| (0..size).map(|c| CellIdx::new(r, c)).collect())
            .collect();
        let cols: Vec<Vec<CellIdx>> = (0..size)
            .map(|c| (0..size).map(|r| CellIdx::new(r, c)).collect())
            .collect();

        let (block_size, blocks) = match integer_sqrt_if_perfect(size) {
            Some(bs) => {
                let mut blocks = vec![Vec::new(); size as usize];
                for r in 0..size {
                    for c in 0..size {
                        let block_id = (r / bs) * bs + (c / bs);
                        blocks[block_id as usize].push(CellIdx::new(r, c));
                    }
                }
                (bs, blocks)
            }
            None => (0, Vec::new()),
        };

        Ok(Board {
            size,
            block_size,
            grid,
            rows,
            cols,
            blocks,
            handlers: Vec::new(),
            history: Vec::new(),
            impact: ImpactMap::new(size),
        })
    }

    pub fn size(&self) -> u8 {
        self.size
    }

    pub fn block_size(&self) -> u8 {
        self.block_size
    }

    pub(crate) fn index(&self, pos: CellIdx) -> usize {
        pos.r as usize * self.size as usize + pos.c as usize
    }

    fn in_bounds(&self, pos: CellIdx) -> bool {
        (pos.r as usize) < self.size as usize && (pos.c as usize) < self.size as usize
    }

    /// Unchecked accessor for internal hot paths that already know `pos` is
    /// in bounds (every position derived from `rows`/`cols`/`blocks` is).
    pub(crate) fn cell(&self, pos: CellIdx) -> &Cell {
        &self.grid[self.index(pos)]
    }

    pub(crate) fn cell_mut(&mut self, pos: CellIdx) -> &mut Cell {
        let idx = self.index(pos);
        &mut self.grid[idx]
    }

    pub fn get_cell(&self, pos: CellIdx) -> Result<&Cell> {
        if self.in_bounds(pos) {
            Ok(self.cell(pos))
        } else {
            Err(SolverError::IndexOutOfRange(pos))
        }
    }

    pub fn get_row(&self, r: u8) -> Result<&[CellIdx]> {
        self.rows.get(r as usize).map(Vec::as_slice).ok_or(SolverError::IndexOutOfRange(CellIdx::new(r, 0)))
    }

    pub fn get_col(&self, c: u8) -> Result<&[CellIdx]> {
        self.cols.get(c as usize).map(Vec::as_slice).ok_or(SolverError::IndexOutOfRange(CellIdx::new(0, c)))
    }

    pub fn get_block(&self, b: u8) -> Result<&[CellIdx]> {
        self.blocks.get(b as usize).map(Vec::as_slice).ok_or(SolverError::IndexOutOfRange(CellIdx::new(0, 0)))
    }

    pub fn all_cells(&self) -> impl Iterator<Item = CellIdx> + '_ {
        (0..self.size).flat_map(move |r| (0..self.size).map(move |c| CellIdx::new(r, c)))
    }

    pub fn is_solved(&self) -> bool {
        self.grid.iter().all(Cell::is_solved)
    }

    pub fn impact(&self, pos: CellIdx) -> u32 {
        self.impact.get(pos)
    }

    pub fn impact_map(&self) -> &ImpactMap {
        &self.impact
    }

    pub fn impact_map_mut(&mut self) -> &mut ImpactMap {
        &mut self.impact
    }

    pub fn handler_count(&self) -> usize {
        self.handlers.len()
    }

    /// Serializes the handler at registration index `i` via its own
    /// `to_json`, for loader round-tripping. `None` if out of range.
    pub fn handler_json(&self, i: usize) -> Option<serde_json::Value> {
        self.handlers.get(i).map(|h| h.to_json())
    }

    /// A fresh board with the same grid/candidate state but no handlers and
    /// no history — used by the full-enumeration driver to track "not yet
    /// proven impossible" independently of the live board's own rules.
    pub fn shallow_clone(&self) -> Board {
        Board {
            size: self.size,
            block_size: self.block_size,
            grid: self.grid.clone(),
            rows: self.rows.clone(),
            cols: self.cols.clone(),
            blocks: self.blocks.clone(),
            handlers: Vec::new(),
            history: Vec::new(),
            impact: ImpactMap::new(self.size),
        }
    }
}

impl Snapshot {
    pub(super) fn capture(grid: &[Cell]) -> Self {
        Snapshot { cells: grid.to_vec() }
    }

    pub(super) fn restore(&self, grid: &mut [Cell]) {
        grid.copy_from_slice(&self.cells);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn construction_rejects_zero_and_oversized() {
        assert!(Board::new(0).is_err());
        assert!(Board::new(MAX_SIZE + 1).is_err());
        assert!(Board::new(9).is_ok());
    }

    #[test]
    fn blocks_are_empty_for_non_square_sizes() {
        let board = Board::new(7).unwrap();
        assert_eq!(board.block_size(), 0);
        assert!(board.get_block(0).is_err());
    }

    #[test]
    fn blocks_partition_a_9x9_board() {
        let board = Board::new(9).unwrap();
        assert_eq!(board.block_size(), 3);
        let mut seen = vec![false; 81];
        for b in 0..9 {
            for pos in board.get_block(b).unwrap() {
                let idx = pos.r as usize * 9 + pos.c as usize;
                assert!(!seen[idx]);
                seen[idx] = true;
            }
        }
        assert!(seen.iter().all(|&s| s));
    }

    #[test]
    fn fresh_board_is_not_solved() {
        let board = Board::new(9).unwrap();
        assert!(!board.is_solved());
    }
}
