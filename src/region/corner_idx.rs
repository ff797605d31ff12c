use super::{CellIdx, IndexKind};

/// The top-left corner of cell `(r, c)`; shared by up to four cells.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct CornerIdx {
    pub r: u8,
    pub c: u8,
}

impl CornerIdx {
    pub fn new(r: u8, c: u8) -> Self {
        CornerIdx { r, c }
    }
}

impl IndexKind for CornerIdx {
    fn attached_cells(&self, board_size: u8) -> Vec<CellIdx> {
        let r = self.r as i16;
        let c = self.c as i16;
        let mut out = Vec::with_capacity(4);
        for &(dr, dc) in &[(-1, -1), (-1, 0), (0, -1), (0, 0)] {
            let rr = r + dr;
            let cc = c + dc;
            if rr >= 0 && cc >= 0 && (rr as u8) < board_size && (cc as u8) < board_size {
                out.push(CellIdx::new(rr as u8, cc as u8));
            }
        }
        out
    }

    fn all(board_size: u8) -> Vec<Self> {
        let mut out = Vec::new();
        for r in 0..=board_size {
            for c in 0..=board_size {
                out.push(CornerIdx::new(r, c));
            }
        }
        out
    }
}
