use super::IndexKind;

/// A single cell address, 0-based in both coordinates.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, PartialOrd, Ord)]
pub struct CellIdx {
    pub r: u8,
    pub c: u8,
}

impl CellIdx {
    pub fn new(r: u8, c: u8) -> Self {
        CellIdx { r, c }
    }
}

impl IndexKind for CellIdx {
    fn attached_cells(&self, _board_size: u8) -> Vec<CellIdx> {
        vec![*self]
    }

    fn all(board_size: u8) -> Vec<Self> {
        let mut out = Vec::with_capacity(board_size as usize * board_size as usize);
        for r in 0..board_size {
            for c in 0..board_size {
                out.push(CellIdx::new(r, c));
            }
        }
        out
    }
}
