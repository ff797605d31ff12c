use super::{CellIdx, IndexKind};

/// A full row or a full column — exclusive, never both at once.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum RCIdx {
    Row(u8),
    Col(u8),
}

impl IndexKind for RCIdx {
    fn attached_cells(&self, board_size: u8) -> Vec<CellIdx> {
        match *self {
            RCIdx::Row(r) => (0..board_size).map(|c| CellIdx::new(r, c)).collect(),
            RCIdx::Col(c) => (0..board_size).map(|r| CellIdx::new(r, c)).collect(),
        }
    }

    fn all(board_size: u8) -> Vec<Self> {
        let mut out = Vec::with_capacity(board_size as usize * 2);
        for i in 0..board_size {
            out.push(RCIdx::Row(i));
        }
        for i in 0..board_size {
            out.push(RCIdx::Col(i));
        }
        out
    }
}
