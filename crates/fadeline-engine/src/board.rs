//! Board geometry: winning-line tables and win detection.
//!
//! The winning lines are every straight run of four cells on a
//! side × side grid. The table is generated from the geometry once per
//! engine, never hand-written per size, so both supported sides share
//! one algorithm: side 4 yields 10 lines, side 5 yields 28.
//!
//! Scan order matters for win detection (first match wins): horizontals,
//! then verticals, then down-right diagonals, then down-left diagonals,
//! row-major over start cells within each group.

use fadeline_protocol::Mark;

/// Run length needed to win.
pub const WIN_RUN: usize = 4;

/// Generates the winning-line table for a grid side.
///
/// Cells are row-major indices (`row * side + col`). Each line is four
/// indices in run order.
pub fn win_lines(side: usize) -> Vec<[usize; WIN_RUN]> {
    let mut lines = Vec::new();

    // Horizontal runs.
    for row in 0..side {
        for col in 0..=(side - WIN_RUN) {
            lines.push(std::array::from_fn(|i| row * side + col + i));
        }
    }

    // Vertical runs.
    for row in 0..=(side - WIN_RUN) {
        for col in 0..side {
            lines.push(std::array::from_fn(|i| (row + i) * side + col));
        }
    }

    // Down-right diagonals.
    for row in 0..=(side - WIN_RUN) {
        for col in 0..=(side - WIN_RUN) {
            lines.push(std::array::from_fn(|i| (row + i) * side + col + i));
        }
    }

    // Down-left diagonals.
    for row in 0..=(side - WIN_RUN) {
        for col in (WIN_RUN - 1)..side {
            lines.push(std::array::from_fn(|i| (row + i) * side + col - i));
        }
    }

    lines
}

/// Finds the first line fully held by a single mark, in table order.
///
/// Returns the winning line itself; callers attribute the win by turn
/// parity, not by which mark holds the line.
pub fn find_winning_line(
    board: &[Option<Mark>],
    lines: &[[usize; WIN_RUN]],
) -> Option<[usize; WIN_RUN]> {
    lines
        .iter()
        .find(|line| {
            let first = board[line[0]];
            first.is_some() && line.iter().all(|&i| board[i] == first)
        })
        .copied()
}
