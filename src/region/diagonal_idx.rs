use super::{CellIdx, IndexKind};

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum DiagonalKind {
    Main,
    Anti,
}

/// A shifted (anti-)diagonal of the board. `index` is the offset from the
/// board's primary diagonal of that kind: main diagonal cells satisfy
/// `c - r == index`; anti-diagonal cells satisfy `r + c == index + (N - 1)`.
/// Both ranges run `-(N-1)..=(N-1)`, so `index == 0` is always the board's
/// true main/anti diagonal regardless of size.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct DiagonalIdx {
    pub kind: DiagonalKind,
    pub index: i16,
}

impl DiagonalIdx {
    pub fn new(kind: DiagonalKind, index: i16) -> Self {
        DiagonalIdx { kind, index }
    }
}

impl IndexKind for DiagonalIdx {
    fn attached_cells(&self, board_size: u8) -> Vec<CellIdx> {
        let n = board_size as i16;
        let mut out = Vec::new();
        match self.kind {
            DiagonalKind::Main => {
                for r in 0..n {
                    let c = r + self.index;
                    if (0..n).contains(&c) {
                        out.push(CellIdx::new(r as u8, c as u8));
                    }
                }
            }
            DiagonalKind::Anti => {
                let total = self.index + (n - 1);
                for r in 0..n {
                    let c = total - r;
                    if (0..n).contains(&c) {
                        out.push(CellIdx::new(r as u8, c as u8));
                    }
                }
            }
        }
        out
    }

    fn all(board_size: u8) -> Vec<Self> {
        let n = board_size as i16;
        let mut out = Vec::new();
        for index in -(n - 1)..=(n - 1) {
            out.push(DiagonalIdx::new(DiagonalKind::Main, index));
            out.push(DiagonalIdx::new(DiagonalKind::Anti, index));
        }
        out
    }
}
