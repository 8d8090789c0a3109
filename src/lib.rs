use std::{
    cmp::Reverse,
    collections::{BinaryHeap, HashMap},
    error,
    fmt::Display,
    fs::File,
    io::{BufRead, BufReader},
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use clap::Parser;

pub const WALL_MARKER: char = '*';
pub const START_MARKER: char = 'S';
pub const GOAL_MARKER: char = 'G';
pub const PATH_MARKER: char = '$';

#[derive(Debug)]
pub enum Error {
    InconsistentRow(usize, usize),
    MarkerNotFound(char),
    OutOfBounds(Position),
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::InconsistentRow(expect_col_n, this_col_n) => write!(
                f,
                "Expect {} column(s) in each row, given {}.",
                expect_col_n, this_col_n
            ),
            Error::MarkerNotFound(marker) => {
                write!(f, "No cell carries marker({}) in grid.", marker)
            }
            Error::OutOfBounds(pos) => write!(f, "Position{} is outside of grid.", pos),
        }
    }
}

impl error::Error for Error {}

#[derive(Debug, Parser)]
pub struct CLIArgs {
    pub input_path: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Position {
    r: usize,
    c: usize,
}

impl Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.r, self.c)
    }
}

impl Position {
    pub fn new(r: usize, c: usize) -> Self {
        Self { r, c }
    }

    pub fn neighbor(&self, dir: Direction) -> Option<Self> {
        match dir {
            Direction::Up if self.r > 0 => Some(Position::new(self.r - 1, self.c)),
            Direction::Down => Some(Position::new(self.r + 1, self.c)),
            Direction::Left if self.c > 0 => Some(Position::new(self.r, self.c - 1)),
            Direction::Right => Some(Position::new(self.r, self.c + 1)),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// Expansion order is fixed (up, down, left, right); it decides which of
    /// two equally scored routes is found first.
    pub fn all_dirs() -> &'static [Direction] {
        static ALL_DIRECTIONS: [Direction; 4] = [
            Direction::Up,
            Direction::Down,
            Direction::Left,
            Direction::Right,
        ];

        &ALL_DIRECTIONS
    }
}

/// Straight-line distance to the goal, the h(n) of f(n) = g(n) + h(n). It
/// never overestimates the remaining step count on a 4-connected grid, so
/// the first time the goal leaves the frontier its path is minimal.
fn heuristic(pos: &Position, goal: &Position) -> f64 {
    let dr = pos.r as f64 - goal.r as f64;
    let dc = pos.c as f64 - goal.c as f64;
    (dr * dr + dc * dc).sqrt()
}

#[derive(Debug, Clone)]
struct SearchEntry {
    score: f64,
    path: Vec<Position>,
}

impl Ord for SearchEntry {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.score.total_cmp(&other.score)
    }
}

impl PartialOrd for SearchEntry {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for SearchEntry {
    fn eq(&self, other: &Self) -> bool {
        self.score.total_cmp(&other.score).is_eq()
    }
}

impl Eq for SearchEntry {}

impl SearchEntry {
    /// g(n) counts every cell on the path, the start included.
    pub fn new(path: Vec<Position>, goal: &Position) -> Self {
        debug_assert!(!path.is_empty());
        let score = path.len() as f64 + heuristic(&path[path.len() - 1], goal);

        Self { score, path }
    }
}

#[derive(Debug)]
pub struct Grid {
    cells: Vec<char>,
    row_n: usize,
    col_n: usize,
}

impl Grid {
    pub fn cell(&self, pos: &Position) -> Result<char, Error> {
        self.pos_to_ind(pos)
            .and_then(|ind| self.cells.get(ind).copied())
            .ok_or(Error::OutOfBounds(pos.clone()))
    }

    // Row-major scan, so the first match is the smallest (row, column) one.
    pub fn find_marker(&self, marker: char) -> Option<Position> {
        self.cells
            .iter()
            .position(|c| *c == marker)
            .map(|ind| Position::new(ind / self.col_n, ind % self.col_n))
    }

    pub fn endpoints(&self) -> Result<(Position, Position), Error> {
        let start = self
            .find_marker(START_MARKER)
            .ok_or(Error::MarkerNotFound(START_MARKER))?;
        let goal = self
            .find_marker(GOAL_MARKER)
            .ok_or(Error::MarkerNotFound(GOAL_MARKER))?;

        Ok((start, goal))
    }

    pub fn neighbors<'a>(&'a self, pos: &Position) -> impl Iterator<Item = Position> + 'a {
        let pos = pos.clone();
        Direction::all_dirs()
            .iter()
            .filter_map(move |dir| pos.neighbor(*dir))
            .filter(|pos| self.is_open(pos))
    }

    /// Best-first search with the frontier ordered by f(n) = g(n) + h(n).
    /// Returns `None` when the frontier drains before the goal is reached.
    pub fn shortest_path(&self, start: &Position, goal: &Position) -> Option<Vec<Position>> {
        let init_entry = SearchEntry::new(vec![start.clone()], goal);
        let mut best_scores = HashMap::from([(start.clone(), init_entry.score)]);
        let mut frontier = BinaryHeap::from([Reverse(init_entry)]);
        while let Some(Reverse(cur_entry)) = frontier.pop() {
            let last_pos = &cur_entry.path[cur_entry.path.len() - 1];
            if last_pos == goal {
                return Some(cur_entry.path);
            }

            for next_pos in self.neighbors(last_pos) {
                let mut next_path = cur_entry.path.clone();
                next_path.push(next_pos.clone());
                let next_entry = SearchEntry::new(next_path, goal);
                // A recorded score no worse than the candidate means this
                // cell is already reached by a route at least as good.
                if best_scores
                    .get(&next_pos)
                    .is_some_and(|score| *score <= next_entry.score)
                {
                    continue;
                }

                best_scores.insert(next_pos, next_entry.score);
                frontier.push(Reverse(next_entry));
            }
        }

        None
    }

    /// Overlays `path` on a copy of the grid. Interior cells are written
    /// first, then the start marker, then the goal marker, so the goal
    /// marker wins the cell of a single-cell path.
    pub fn render_path(&self, path: &[Position]) -> Vec<String> {
        let mut cells = self.cells.clone();
        if path.len() > 1 {
            for pos in &path[1..(path.len() - 1)] {
                if let Some(ind) = self.pos_to_ind(pos) {
                    cells[ind] = PATH_MARKER;
                }
            }
        }

        if let Some(ind) = path.first().and_then(|pos| self.pos_to_ind(pos)) {
            cells[ind] = START_MARKER;
        }

        if let Some(ind) = path.last().and_then(|pos| self.pos_to_ind(pos)) {
            cells[ind] = GOAL_MARKER;
        }

        cells
            .chunks(self.col_n.max(1))
            .map(|row| row.iter().collect())
            .collect()
    }

    fn is_open(&self, pos: &Position) -> bool {
        self.pos_to_ind(pos)
            .is_some_and(|ind| self.cells[ind] != WALL_MARKER)
    }

    fn pos_to_ind(&self, pos: &Position) -> Option<usize> {
        if self.is_inside(pos) {
            Some(pos.r * self.col_n + pos.c)
        } else {
            None
        }
    }

    fn is_inside(&self, pos: &Position) -> bool {
        pos.r < self.row_n && pos.c < self.col_n
    }
}

#[derive(Debug)]
pub struct GridBuilder {
    cells: Vec<char>,
    row_n: usize,
    col_n: Option<usize>,
}

impl GridBuilder {
    pub fn new() -> Self {
        Self {
            cells: Vec::new(),
            row_n: 0,
            col_n: None,
        }
    }

    pub fn add_row(&mut self, text: &str) -> Result<(), Error> {
        let this_col_n = text.chars().count();
        if *self.col_n.get_or_insert(this_col_n) != this_col_n {
            return Err(Error::InconsistentRow(self.col_n.unwrap(), this_col_n));
        }

        self.cells.extend(text.chars());
        self.row_n += 1;

        Ok(())
    }

    pub fn build(self) -> Grid {
        Grid {
            cells: self.cells,
            row_n: self.row_n,
            col_n: self.col_n.unwrap_or(0),
        }
    }
}

pub fn read_grid<P: AsRef<Path>>(path: P) -> Result<Grid> {
    let file = File::open(&path)
        .with_context(|| format!("Failed to open given file({}).", path.as_ref().display()))?;
    let reader = BufReader::new(file);
    let mut builder = GridBuilder::new();
    for (ind, line) in reader.lines().enumerate() {
        let line = line.with_context(|| {
            format!(
                "Failed to read line {} in given file({}).",
                ind + 1,
                path.as_ref().display()
            )
        })?;
        builder.add_row(line.as_str())?
    }

    Ok(builder.build())
}
