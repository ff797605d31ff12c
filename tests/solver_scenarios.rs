//! End-to-end scenarios from the solver's concrete test matrix: a classical
//! unique-solution grid, a forced contradiction, and propagation checks for
//! a handful of variant rules in isolation.

use rand::rngs::mock::StepRng;

use sudoku_variant_solver::board::Board;
use sudoku_variant_solver::region::{CellIdx, EdgeIdx, Region};
use sudoku_variant_solver::rules::killer::{Cage, RuleKiller};
use sudoku_variant_solver::rules::kropki::{KropkiKind, RuleKropki};
use sudoku_variant_solver::rules::standard::RuleStandard;
use sudoku_variant_solver::rules::thermo::RuleThermo;

/// Parses a row-major `.`-for-empty string of givens into a 9x9 board with
/// the Standard rule registered.
fn classical_board(givens: &str) -> Board {
    let mut board = Board::new(9).unwrap();
    for (i, ch) in givens.chars().enumerate() {
        if ch == '.' {
            continue;
        }
        let v = ch.to_digit(10).unwrap() as u8;
        let pos = CellIdx::new((i / 9) as u8, (i % 9) as u8);
        board.set_cell(pos, v, true);
    }
    board.add_handler(Box::new(RuleStandard::new()));
    board
}

const S1_GIVENS: &str = "53..7....6..195....98....6.8...6...34..8.3..17...2...6.6....28....419..5....8..79";

#[test]
fn s1_classical_easy_has_a_unique_solution() {
    let mut board = classical_board(&S1_GIVENS[..81]);
    let mut rng = StepRng::new(0, 1);
    let (solutions, stats) = board.solve(2, 1_000_000, &mut rng);
    assert_eq!(solutions.len(), 1);
    assert_eq!(stats.solutions_found, 1);
    assert!(!stats.interrupted_by_solution_limit);
    let solved = solutions[0].to_string();
    assert!(solved.starts_with("5,3,4,6,7,8,9,1,2,6,7,2,1,9,5,3,4,8,1,9,8,3,4,2,5,6,7"));
}

#[test]
fn s2_a_contradictory_given_leaves_the_board_invalid_and_unsolvable() {
    let mut board = classical_board(&S1_GIVENS[..81]);
    // (0,1) is already 3 in S1; forcing a second 5 into the same row makes
    // the board immediately invalid, as a forced write skips the
    // `is_valid_move` check entirely.
    board.set_cell(CellIdx::new(0, 1), 5, true);
    assert!(!board.valid());

    let mut rng = StepRng::new(0, 1);
    let (solutions, stats) = board.solve(2, 1_000_000, &mut rng);
    assert_eq!(solutions.len(), 0);
    assert_eq!(stats.solutions_found, 0);
}

#[test]
fn s3_kropki_white_edge_allows_every_value_until_one_endpoint_is_fixed() {
    let mut board = Board::new(3).unwrap();
    let edge = EdgeIdx::new(0, 0, 0, 1);
    board.add_handler(Box::new(RuleKropki::new(vec![(edge, KropkiKind::White)], false)));

    assert_eq!(board.get_cell(CellIdx::new(0, 0)).unwrap().candidates().count(), 3);
    assert_eq!(board.get_cell(CellIdx::new(0, 1)).unwrap().candidates().count(), 3);

    assert!(board.set_cell(CellIdx::new(0, 0), 1, false));
    let neighbor = board.get_cell(CellIdx::new(0, 1)).unwrap();
    assert_eq!(neighbor.candidates().count(), 1);
    assert!(neighbor.candidates().test(2));
}

#[test]
fn s4_thermo_propagates_floor_and_ceiling_bounds_from_empty() {
    let mut board = Board::new(9).unwrap();
    board.add_handler(Box::new(RuleStandard::new()));
    let path = vec![CellIdx::new(0, 0), CellIdx::new(0, 1), CellIdx::new(0, 2), CellIdx::new(0, 3)];
    board.add_handler(Box::new(RuleThermo::new(vec![path])));

    let bulb = board.get_cell(CellIdx::new(0, 0)).unwrap().candidates();
    for v in 1..=6 {
        assert!(bulb.test(v));
    }
    for v in 7..=9 {
        assert!(!bulb.test(v));
    }

    let tip = board.get_cell(CellIdx::new(0, 3)).unwrap().candidates();
    for v in 4..=9 {
        assert!(tip.test(v));
    }
    for v in 1..=3 {
        assert!(!tip.test(v));
    }
}

#[test]
fn s5_killer_cage_no_repeat_sum_to_six_over_two_cells() {
    let mut board = Board::new(9).unwrap();
    board.add_handler(Box::new(RuleStandard::new()));
    let region: Region<CellIdx> = vec![CellIdx::new(0, 0), CellIdx::new(0, 1)].into_iter().collect();
    board.add_handler(Box::new(RuleKiller::killer(vec![Cage { region, sum: 6 }])));

    for pos in [CellIdx::new(0, 0), CellIdx::new(0, 1)] {
        let cands = board.get_cell(pos).unwrap().candidates();
        for v in 1..=5 {
            assert!(cands.test(v), "expected {v} to remain a candidate at {pos:?}");
        }
        for v in 6..=9 {
            assert!(!cands.test(v), "expected {v} to be pruned at {pos:?}");
        }
    }
}

#[test]
fn s6_uniqueness_check_bounds_solution_count_at_two() {
    let mut board = classical_board(&S1_GIVENS[..81]);
    let mut rng = StepRng::new(7, 1);
    let (solutions, _stats) = board.solve(2, 1_000_000, &mut rng);
    assert!(solutions.len() <= 2);
    assert_eq!(solutions.len(), 1, "S1 is a unique-solution puzzle");
}

#[test]
fn s10_zero_node_budget_returns_immediately_with_no_solutions() {
    let mut board = classical_board(&S1_GIVENS[..81]);
    let before = board.get_cell(CellIdx::new(2, 2)).copied();
    let mut rng = StepRng::new(0, 1);
    let (solutions, stats) = board.solve(1, 0, &mut rng);
    assert!(solutions.is_empty());
    assert!(stats.interrupted_by_node_limit);
    assert_eq!(stats.solutions_found, 0);
    assert_eq!(board.get_cell(CellIdx::new(2, 2)).copied(), before);
}
