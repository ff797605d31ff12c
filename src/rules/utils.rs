//! Shared helpers used by more than one rule handler: unit validity,
//! soft sum bounds for cage-like constraints, neighbor enumeration, and the
//! random region/path generation backing `init_randomly`.

use rand::Rng;

use crate::board::Board;
use crate::number_set::{Number, NumberSet};
use crate::region::{CellIdx, Region};

/// A unit (row/column/block/extra-region) is valid iff its solved values
/// have no duplicate and the union of solved singletons with unsolved
/// candidate sets still covers the universe.
pub fn is_group_valid(board: &Board, cells: &[CellIdx]) -> bool {
    let size = board.size();
    let mut seen = NumberSet::empty(size);
    let mut coverage = NumberSet::empty(size);
    for &pos in cells {
        let cell = board.cell(pos);
        if cell.is_solved() {
            let v = cell.value();
            if seen.test(v) {
                return false;
            }
            seen.add(v);
            coverage.add(v);
        } else {
            coverage = coverage.union(&cell.candidates());
        }
    }
    coverage == NumberSet::full(size)
}

/// Removes `v` from every unsolved cell in `cells` other than `except`.
pub fn eliminate_value(board: &mut Board, cells: &[CellIdx], except: Option<CellIdx>, v: Number) -> bool {
    let mut changed = false;
    for &pos in cells {
        if Some(pos) == except {
            continue;
        }
        changed |= board.cell_mut(pos).remove_candidate(v);
    }
    changed
}

/// Hidden singles: if exactly one cell in `cells` can hold `v`, narrow its
/// candidates to `{v}`.
pub fn hidden_singles(board: &mut Board, cells: &[CellIdx]) -> bool {
    let size = board.size();
    let mut changed = false;
    for v in 1..=size {
        let mut holder: Option<CellIdx> = None;
        let mut count = 0;
        for &pos in cells {
            let cell = board.cell(pos);
            if !cell.is_solved() && cell.candidates().test(v) {
                count += 1;
                holder = Some(pos);
            }
        }
        if count == 1 {
            if let Some(pos) = holder {
                changed |= board.cell_mut(pos).only_allow_candidates(NumberSet::single(v, size));
            }
        }
    }
    changed
}

/// Soft per-cell lower bound for a cell's contribution to a sum: its solved
/// value, or the smallest value still among its candidates.
fn cell_lower(board: &Board, pos: CellIdx) -> i32 {
    let cell = board.cell(pos);
    if cell.is_solved() {
        cell.value() as i32
    } else {
        cell.candidates().lowest().map(|v| v as i32).unwrap_or(1)
    }
}

fn cell_upper(board: &Board, pos: CellIdx) -> i32 {
    let cell = board.cell(pos);
    if cell.is_solved() {
        cell.value() as i32
    } else {
        cell.candidates().highest().map(|v| v as i32).unwrap_or(board.size() as i32)
    }
}

pub fn lower_bound(board: &Board, cells: &[CellIdx]) -> i32 {
    cells.iter().map(|&p| cell_lower(board, p)).sum()
}

pub fn upper_bound(board: &Board, cells: &[CellIdx]) -> i32 {
    cells.iter().map(|&p| cell_upper(board, p)).sum()
}

/// Restricts every unsolved cell in `cells` to the range of values that
/// could still let the group sum to `target`, given the soft min/max of the
/// others. When `no_repeat`, also excludes values already solved elsewhere
/// in the group. This is an approximation (it reasons per-cell against the
/// group's aggregate bounds, not a full combinatorial assignment) — matching
/// the rest of the rule library, it only ever narrows; it never falsely
/// forbids a value that some completion could still use.
pub fn apply_sum_bounds(board: &mut Board, cells: &[CellIdx], target: i32, no_repeat: bool) -> bool {
    let size = board.size();
    let solved_values: Vec<Number> =
        cells.iter().filter_map(|&p| { let c = board.cell(p); c.is_solved().then(|| c.value()) }).collect();

    let mut changed = false;
    for &pos in cells {
        if board.cell(pos).is_solved() {
            continue;
        }
        let mut lb_others = 0;
        let mut ub_others = 0;
        for &other in cells {
            if other == pos {
                continue;
            }
            lb_others += cell_lower(board, other);
            ub_others += cell_upper(board, other);
        }
        let lo = (target - ub_others).max(1);
        let hi = (target - lb_others).min(size as i32);
        if hi < lo {
            continue;
        }
        let mut allowed = NumberSet::at_least(lo as Number, size).intersection(&NumberSet::at_most(hi as Number, size));
        if no_repeat {
            for &v in &solved_values {
                allowed.remove(v);
            }
        }
        changed |= board.cell_mut(pos).only_allow_candidates(allowed);
    }
    changed
}

pub fn orthogonal_neighbors(pos: CellIdx, board_size: u8) -> Vec<CellIdx> {
    let mut out = Vec::with_capacity(4);
    let (r, c) = (pos.r as i16, pos.c as i16);
    for &(dr, dc) in &[(-1, 0), (1, 0), (0, -1), (0, 1)] {
        let (rr, cc) = (r + dr, c + dc);
        if rr >= 0 && cc >= 0 && (rr as u8) < board_size && (cc as u8) < board_size {
            out.push(CellIdx::new(rr as u8, cc as u8));
        }
    }
    out
}

pub fn king_neighbors(pos: CellIdx, board_size: u8) -> Vec<CellIdx> {
    let mut out = Vec::with_capacity(8);
    let (r, c) = (pos.r as i16, pos.c as i16);
    for dr in -1..=1 {
        for dc in -1..=1 {
            if dr == 0 && dc == 0 {
                continue;
            }
            let (rr, cc) = (r + dr, c + dc);
            if rr >= 0 && cc >= 0 && (rr as u8) < board_size && (cc as u8) < board_size {
                out.push(CellIdx::new(rr as u8, cc as u8));
            }
        }
    }
    out
}

pub fn knight_neighbors(pos: CellIdx, board_size: u8) -> Vec<CellIdx> {
    const OFFSETS: [(i16, i16); 8] =
        [(-2, -1), (-2, 1), (-1, -2), (-1, 2), (1, -2), (1, 2), (2, -1), (2, 1)];
    let mut out = Vec::with_capacity(8);
    let (r, c) = (pos.r as i16, pos.c as i16);
    for &(dr, dc) in &OFFSETS {
        let (rr, cc) = (r + dr, c + dc);
        if rr >= 0 && cc >= 0 && (rr as u8) < board_size && (cc as u8) < board_size {
            out.push(CellIdx::new(rr as u8, cc as u8));
        }
    }
    out
}

/// A random walk over orthogonally-adjacent, not-yet-used cells, for
/// `init_randomly` implementations that need an arbitrary path or region of
/// roughly the requested length. Consumes cells it visits out of
/// `available`. Returns a region possibly shorter than `length` if the walk
/// gets stuck.
pub fn generate_random_path(
    board_size: u8,
    length: usize,
    available: &mut Region<CellIdx>,
    rng: &mut impl Rng,
) -> Region<CellIdx> {
    let mut path = Region::new();
    if available.is_empty() {
        return path;
    }
    let start_idx = rng.gen_range(0..available.size());
    let start = available.items()[start_idx];
    path.add(start);

    let mut remaining: Vec<CellIdx> = available.items().to_vec();
    remaining.retain(|&p| p != start);

    let mut current = start;
    while path.size() < length {
        let candidates: Vec<CellIdx> = orthogonal_neighbors(current, board_size)
            .into_iter()
            .filter(|p| remaining.contains(p))
            .collect();
        if candidates.is_empty() {
            break;
        }
        let next = candidates[rng.gen_range(0..candidates.len())];
        path.add(next);
        remaining.retain(|&p| p != next);
        current = next;
    }

    *available = remaining.into_iter().collect();
    path
}
