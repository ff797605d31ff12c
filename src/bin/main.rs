//! Command-line driver over the core: `solve`, `complete`, `generate`, and
//! the `encode`/`decode` board-state convenience pair.

use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use clap::{Parser, Subcommand};
use rand::rngs::StdRng;
use rand::SeedableRng;

use sudoku_variant_solver::board::Board;
use sudoku_variant_solver::error::{Result, SolverError};
use sudoku_variant_solver::loader::{self, PuzzleDocument};
use sudoku_variant_solver::number_set::Number;
use sudoku_variant_solver::rules::RuleHandler;

#[derive(Parser)]
#[command(name = "sudoku-variant-solver", about = "Constraint-propagation solver for variant Sudoku puzzles")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Find up to `max_solutions` solutions to a puzzle document.
    Solve {
        puzzle: PathBuf,
        #[arg(long, default_value_t = 2)]
        max_solutions: usize,
        #[arg(long, default_value_t = 10_000_000)]
        max_nodes: usize,
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Certify, for every cell, which candidate values are reachable.
    Complete {
        puzzle: PathBuf,
        #[arg(long, default_value_t = 10_000_000)]
        max_nodes: usize,
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Build a random ruleset for smoke-testing `init_randomly`/`to_json`.
    Generate {
        #[arg(long)]
        size: u8,
        #[arg(long, value_delimiter = ',')]
        rules: Vec<String>,
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Encode a comma-separated value grid (`.` for empty) as a base64 token.
    Encode { board: String },
    /// Decode a base64 token back into a comma-separated value grid.
    Decode { seed: String },
}

fn make_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_entropy(),
    }
}

fn load_document(path: &PathBuf) -> Result<PuzzleDocument> {
    let text = fs::read_to_string(path)?;
    let doc: PuzzleDocument = serde_json::from_str(&text)?;
    Ok(doc)
}

fn run_solve(puzzle: PathBuf, max_solutions: usize, max_nodes: usize, seed: Option<u64>) -> Result<()> {
    log::info!("loading puzzle from {}", puzzle.display());
    let doc = load_document(&puzzle)?;
    let mut board = loader::load(&doc)?;
    let mut rng = make_rng(seed);
    let (solutions, stats) = board.solve(max_solutions, max_nodes, &mut rng);
    log::info!("solve finished: {stats}");
    for solution in &solutions {
        println!("{solution}");
    }
    println!("{stats}");
    Ok(())
}

fn run_complete(puzzle: PathBuf, max_nodes: usize, seed: Option<u64>) -> Result<()> {
    log::info!("loading puzzle from {}", puzzle.display());
    let doc = load_document(&puzzle)?;
    let mut board = loader::load(&doc)?;
    let mut rng = make_rng(seed);
    let (_solutions, stats) = board.solve_complete(
        max_nodes,
        &mut rng,
        |fraction| log::trace!("complete progress: {:.1}%", fraction * 100.0),
        |solution| println!("{solution}"),
    );
    log::info!("complete finished: {stats}");
    println!("{stats}");
    Ok(())
}

fn run_generate(size: u8, rules: Vec<String>, seed: Option<u64>) -> Result<()> {
    let mut board = Board::new(size)?;
    let mut rng = make_rng(seed);
    for tag in &rules {
        log::debug!("generating a random '{tag}' handler");
        let mut handler = loader::default_rule(tag, size)?;
        handler.init_randomly(size, &mut rng);
        board.add_handler(handler);
    }
    let doc = loader::dump(&board);
    println!("{}", serde_json::to_string_pretty(&doc)?);
    Ok(())
}

/// Packs a value grid into the run-length scheme inherited from the
/// project's original seed format: a leading board-size byte, then per
/// distinct value the value, a count, and that many flat cell indices.
fn flatten(size: u8, board: &[Option<Number>]) -> Vec<u8> {
    let mut groups: BTreeMap<Number, Vec<u16>> = BTreeMap::new();
    for (i, cell) in board.iter().enumerate() {
        if let Some(v) = cell {
            groups.entry(*v).or_default().push(i as u16);
        }
    }
    let mut bytes = vec![size];
    for (value, indices) in groups {
        bytes.push(value);
        bytes.extend_from_slice(&(indices.len() as u16).to_le_bytes());
        for idx in indices {
            bytes.extend_from_slice(&idx.to_le_bytes());
        }
    }
    bytes
}

/// The inverse of [`flatten`]. Returns the board size and the unpacked grid.
fn unflatten(bytes: &[u8]) -> Result<(u8, Vec<Option<Number>>)> {
    let malformed = |reason: &str| SolverError::MalformedRegion { rule: "<board-encoding>".to_string(), reason: reason.to_string() };
    let size = *bytes.first().ok_or_else(|| malformed("empty payload"))?;
    let mut board = vec![None; size as usize * size as usize];
    let mut i = 1;
    while i < bytes.len() {
        let value = *bytes.get(i).ok_or_else(|| malformed("truncated value byte"))?;
        i += 1;
        let count_bytes = bytes.get(i..i + 2).ok_or_else(|| malformed("truncated count"))?;
        let count = u16::from_le_bytes([count_bytes[0], count_bytes[1]]) as usize;
        i += 2;
        for _ in 0..count {
            let idx_bytes = bytes.get(i..i + 2).ok_or_else(|| malformed("truncated index"))?;
            let idx = u16::from_le_bytes([idx_bytes[0], idx_bytes[1]]) as usize;
            i += 2;
            *board.get_mut(idx).ok_or_else(|| malformed("index out of range"))? = Some(value);
        }
    }
    Ok((size, board))
}

fn parse_board_string(board: &str) -> Result<Vec<Option<Number>>> {
    board
        .split(',')
        .map(|token| {
            let token = token.trim();
            if token == "." || token.is_empty() {
                Ok(None)
            } else {
                token
                    .parse::<Number>()
                    .map(Some)
                    .map_err(|_| SolverError::MalformedRegion { rule: "<board-encoding>".to_string(), reason: format!("not a value: '{token}'") })
            }
        })
        .collect()
}

fn render_board_string(board: &[Option<Number>]) -> String {
    board.iter().map(|cell| cell.map(|v| v.to_string()).unwrap_or_else(|| ".".to_string())).collect::<Vec<_>>().join(",")
}

fn run_encode(board: String) -> Result<()> {
    let cells = parse_board_string(&board)?;
    let size = (cells.len() as f64).sqrt().round() as u8;
    if size as usize * size as usize != cells.len() {
        return Err(SolverError::MalformedRegion { rule: "<board-encoding>".to_string(), reason: "cell count is not a perfect square".to_string() });
    }
    let encoded = BASE64.encode(flatten(size, &cells));
    println!("{encoded}");
    Ok(())
}

fn run_decode(seed: String) -> Result<()> {
    let bytes = BASE64.decode(seed.as_bytes()).map_err(|e| SolverError::MalformedRegion { rule: "<board-encoding>".to_string(), reason: e.to_string() })?;
    let (_size, board) = unflatten(&bytes)?;
    println!("{}", render_board_string(&board));
    Ok(())
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Solve { puzzle, max_solutions, max_nodes, seed } => run_solve(puzzle, max_solutions, max_nodes, seed),
        Command::Complete { puzzle, max_nodes, seed } => run_complete(puzzle, max_nodes, seed),
        Command::Generate { size, rules, seed } => run_generate(size, rules, seed),
        Command::Encode { board } => run_encode(board),
        Command::Decode { seed } => run_decode(seed),
    }
}

fn main() {
    flexi_logger::Logger::try_with_env_or_str("info")
        .expect("invalid RUST_LOG filter")
        .log_to_stderr()
        .start()
        .expect("failed to start logger");

    let cli = Cli::parse();
    if let Err(err) = run(cli) {
        log::error!("{err}");
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}
