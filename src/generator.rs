use rand::seq::SliceRandom;
use rand::{SeedableRng, rngs::StdRng};

use crate::error::MazeError;
use crate::grid::{Cell, Direction, Grid, Position};

/// Get a random number generator, optionally seeded for reproducibility.
pub(crate) fn get_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_os_rng(),
    }
}

/// Snaps a coordinate onto the odd lattice within `[1, dim - 2]`.
fn snap_odd(coord: usize, dim: usize) -> usize {
    let clamped = coord.clamp(1, dim - 2);
    if clamped % 2 == 1 { clamped } else { clamped - 1 }
}

/// Generates a maze with a randomized iterative backtracker.
///
/// Logical cells live at odd coordinates; carving a neighbor two steps
/// away also opens the wall cell between them, so the carved corridors
/// form a spanning tree over the logical lattice and the border ring is
/// never touched. After carving, `start` and `end` are forced to passage
/// unconditionally; forcing `end` onto a wall can leave it isolated, which
/// callers detect as an empty search path rather than an error.
pub fn generate(
    width: usize,
    height: usize,
    start: Position,
    end: Position,
    seed: Option<u64>,
) -> Result<Grid, MazeError> {
    if width < 5 || height < 5 || width % 2 == 0 || height % 2 == 0 {
        return Err(MazeError::InvalidDimension(format!(
            "width and height must be odd and at least 5, got {width}x{height}"
        )));
    }
    let mut grid = Grid::new(width, height, Cell::Wall);
    if !grid.in_bounds(start) {
        return Err(MazeError::OutOfBounds(start));
    }
    if !grid.in_bounds(end) {
        return Err(MazeError::OutOfBounds(end));
    }

    let mut rng = get_rng(seed);

    let origin = Position::new(snap_odd(start.row, height), snap_odd(start.col, width));
    grid.set(origin, Cell::Passage);

    // The stack holds carved logical cells only.
    let mut stack = vec![origin];
    let mut carved = 1usize;

    while let Some(&cell) = stack.last() {
        let mut directions = Direction::ALL;
        directions.shuffle(&mut rng);

        // First uncarved logical neighbor two steps away wins; the wall
        // cell between is opened along with it.
        let next = directions.iter().find_map(|dir| {
            let (dr, dc) = dir.offset();
            let wall = Position::new(
                cell.row.checked_add_signed(dr)?,
                cell.col.checked_add_signed(dc)?,
            );
            let neighbor = Position::new(
                cell.row.checked_add_signed(dr * 2)?,
                cell.col.checked_add_signed(dc * 2)?,
            );
            (grid.in_bounds(neighbor) && grid[neighbor] == Cell::Wall)
                .then_some((wall, neighbor))
        });

        match next {
            Some((wall, neighbor)) => {
                grid.set(wall, Cell::Passage);
                grid.set(neighbor, Cell::Passage);
                carved += 1;
                stack.push(neighbor);
            }
            None => {
                // Dead end, backtrack.
                stack.pop();
            }
        }
    }

    grid.set(start, Cell::Passage);
    grid.set(end, Cell::Passage);
    tracing::debug!(
        "[generate] carved {} logical cells in a {}x{} maze",
        carved,
        width,
        height
    );
    Ok(grid)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn reachable_from(grid: &Grid, start: Position) -> HashSet<Position> {
        let mut seen = HashSet::from([start]);
        let mut stack = vec![start];
        while let Some(pos) = stack.pop() {
            for next in grid.neighbors(pos) {
                if grid.is_passage(next) && seen.insert(next) {
                    stack.push(next);
                }
            }
        }
        seen
    }

    #[test]
    fn test_even_or_small_dimensions_rejected() {
        let start = Position::new(1, 1);
        let end = Position::new(3, 3);
        for (w, h) in [(4, 5), (5, 4), (3, 5), (5, 3), (0, 0)] {
            assert!(matches!(
                generate(w, h, start, end, Some(0)),
                Err(MazeError::InvalidDimension(_))
            ));
        }
    }

    #[test]
    fn test_out_of_bounds_endpoints_rejected() {
        let err = generate(5, 5, Position::new(9, 1), Position::new(3, 3), Some(0)).unwrap_err();
        assert_eq!(err, MazeError::OutOfBounds(Position::new(9, 1)));
    }

    #[test]
    fn test_border_stays_walled() {
        let grid = generate(11, 9, Position::new(1, 1), Position::new(7, 9), Some(7)).unwrap();
        for row in 0..grid.height() {
            for col in 0..grid.width() {
                let pos = Position::new(row, col);
                if grid.is_boundary(pos) {
                    assert_eq!(grid[pos], Cell::Wall, "border open at {pos:?}");
                }
            }
        }
    }

    #[test]
    fn test_endpoints_forced_to_passage() {
        let start = Position::new(1, 1);
        let end = Position::new(9, 9);
        let grid = generate(11, 11, start, end, Some(42)).unwrap();
        assert!(grid.is_passage(start));
        assert!(grid.is_passage(end));
    }

    #[test]
    fn test_every_passage_reachable_from_start() {
        // End on the odd lattice, so forcing it cannot isolate a pocket.
        let start = Position::new(1, 1);
        let end = Position::new(9, 9);
        for seed in 0..5 {
            let grid = generate(11, 11, start, end, Some(seed)).unwrap();
            let reachable = reachable_from(&grid, start);
            for row in 0..grid.height() {
                for col in 0..grid.width() {
                    let pos = Position::new(row, col);
                    if grid.is_passage(pos) {
                        assert!(reachable.contains(&pos), "unreachable passage at {pos:?}");
                    }
                }
            }
        }
    }

    #[test]
    fn test_seeded_generation_is_deterministic() {
        let start = Position::new(1, 1);
        let end = Position::new(11, 11);
        let a = generate(13, 13, start, end, Some(99)).unwrap();
        let b = generate(13, 13, start, end, Some(99)).unwrap();
        assert_eq!(a.to_matrix(), b.to_matrix());
    }
}
