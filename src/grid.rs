//! Board: settled cells, collision, merge, line clear and the score table.

use crate::pieces::ActivePiece;
use std::collections::VecDeque;

/// Reward per simultaneous clear, indexed by `lines - 1`.
const LINE_CLEAR_REWARDS: [u32; 4] = [40, 100, 300, 1200];

/// Score for clearing `lines` rows in one landing. `None` outside 1..=4.
pub fn line_clear_reward(lines: u32) -> Option<u32> {
    let idx = usize::try_from(lines.checked_sub(1)?).ok()?;
    LINE_CLEAR_REWARDS.get(idx).copied()
}

/// Fixed-size grid of colour ids. y=0 is top; 0 is empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    rows: usize,
    cols: usize,
    /// cells[y][x]. VecDeque so cleared rows come off the middle and empties go on the front.
    cells: VecDeque<Vec<u8>>,
}

impl Grid {
    pub fn new(rows: usize, cols: usize) -> Self {
        let cells = (0..rows).map(|_| vec![0; cols]).collect();
        Self { rows, cols, cells }
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> Option<u8> {
        self.cells.get(y).and_then(|row| row.get(x)).copied()
    }

    #[inline]
    pub fn set(&mut self, x: usize, y: usize, color: u8) {
        if let Some(cell) = self.cells.get_mut(y).and_then(|row| row.get_mut(x)) {
            *cell = color;
        }
    }

    /// Rows top to bottom, for renderers.
    pub fn iter_rows(&self) -> impl Iterator<Item = &[u8]> {
        self.cells.iter().map(Vec::as_slice)
    }

    pub fn is_row_full(&self, y: usize) -> bool {
        self.cells
            .get(y)
            .is_some_and(|row| row.iter().all(|&c| c != 0))
    }

    /// True if any filled cell of `piece` sits outside the walls, below the
    /// floor, or on a settled cell. Cells above row 0 are allowed.
    pub fn has_collision(&self, piece: &ActivePiece) -> bool {
        piece.filled_cells().any(|(bx, by)| {
            if bx < 0 || bx >= self.cols as i32 || by >= self.rows as i32 {
                return true;
            }
            if by < 0 {
                return false;
            }
            self.get(bx as usize, by as usize).is_some_and(|c| c != 0)
        })
    }

    /// Writes the piece's colour into every covered cell on the board.
    /// Cells above row 0 are dropped.
    pub fn merge(&mut self, piece: &ActivePiece) {
        for (bx, by) in piece.filled_cells() {
            if by < 0 || bx < 0 {
                continue;
            }
            self.set(bx as usize, by as usize, piece.color);
        }
    }

    /// Removes every full row, bottom to top, inserting an empty row on top
    /// for each. Returns the number of rows removed.
    pub fn clear_lines(&mut self) -> u32 {
        let mut cleared = 0;
        let mut y = self.rows;
        while y > 0 {
            // Same index is re-examined after a removal: the row above has shifted into it.
            if self.is_row_full(y - 1) {
                self.cells.remove(y - 1);
                self.cells.push_front(vec![0; self.cols]);
                cleared += 1;
            } else {
                y -= 1;
            }
        }
        cleared
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pieces::{Shape, TetrominoKind};
    use proptest::prelude::*;

    fn piece(kind: TetrominoKind, x: i32, y: i32, color: u8) -> ActivePiece {
        ActivePiece {
            shape: kind.shape(),
            x,
            y,
            color,
        }
    }

    fn fill_row(grid: &mut Grid, y: usize, color: u8) {
        for x in 0..grid.cols() {
            grid.set(x, y, color);
        }
    }

    #[test]
    fn reward_table() {
        assert_eq!(line_clear_reward(0), None);
        assert_eq!(line_clear_reward(1), Some(40));
        assert_eq!(line_clear_reward(2), Some(100));
        assert_eq!(line_clear_reward(3), Some(300));
        assert_eq!(line_clear_reward(4), Some(1200));
        assert_eq!(line_clear_reward(5), None);
    }

    #[test]
    fn new_grid_is_empty() {
        let grid = Grid::new(20, 10);
        assert_eq!(grid.iter_rows().count(), 20);
        assert!(grid.iter_rows().all(|r| r.len() == 10 && r.iter().all(|&c| c == 0)));
    }

    #[test]
    fn collision_walls_and_floor() {
        let grid = Grid::new(20, 10);
        assert!(!grid.has_collision(&piece(TetrominoKind::O, 0, 0, 1)));
        assert!(!grid.has_collision(&piece(TetrominoKind::O, 8, 18, 1)));
        assert!(grid.has_collision(&piece(TetrominoKind::O, -1, 0, 1)));
        assert!(grid.has_collision(&piece(TetrominoKind::O, 9, 0, 1)));
        assert!(grid.has_collision(&piece(TetrominoKind::O, 4, 19, 1)));
    }

    #[test]
    fn collision_is_permissive_above_top() {
        let grid = Grid::new(20, 10);
        assert!(!grid.has_collision(&piece(TetrominoKind::L, 3, -2, 1)));
        // Still strict on the walls while above the board.
        assert!(grid.has_collision(&piece(TetrominoKind::I, 7, -1, 1)));
    }

    #[test]
    fn collision_with_settled_cell() {
        let mut grid = Grid::new(20, 10);
        grid.set(5, 10, 3);
        assert!(grid.has_collision(&piece(TetrominoKind::O, 4, 9, 1)));
        assert!(!grid.has_collision(&piece(TetrominoKind::O, 6, 9, 1)));
    }

    #[test]
    fn empty_mask_cells_do_not_collide() {
        let mut grid = Grid::new(20, 10);
        // T's top row is [0, 1, 0]; the zeros may overlap settled cells.
        grid.set(0, 5, 2);
        grid.set(2, 5, 2);
        assert!(!grid.has_collision(&piece(TetrominoKind::T, 0, 5, 1)));
    }

    #[test]
    fn merge_i_piece_at_right_edge() {
        let mut grid = Grid::new(20, 10);
        let p = piece(TetrominoKind::I, 6, 19, 5);
        assert!(!grid.has_collision(&p));
        grid.merge(&p);
        let written: Vec<(usize, usize)> = (0..20)
            .flat_map(|y| (0..10).map(move |x| (x, y)))
            .filter(|&(x, y)| grid.get(x, y) != Some(0))
            .collect();
        assert_eq!(written, vec![(6, 19), (7, 19), (8, 19), (9, 19)]);
        assert!(written.iter().all(|&(x, y)| grid.get(x, y) == Some(5)));
    }

    #[test]
    fn merge_drops_cells_above_top() {
        let mut grid = Grid::new(20, 10);
        let p = piece(TetrominoKind::J, 0, -2, 4);
        grid.merge(&p);
        // J is [[0,1],[0,1],[1,1]]; only its bottom row lands on y=0.
        assert_eq!(grid.get(0, 0), Some(4));
        assert_eq!(grid.get(1, 0), Some(4));
        let filled = grid.iter_rows().flatten().filter(|&&c| c != 0).count();
        assert_eq!(filled, 2);
    }

    #[test]
    fn clear_non_adjacent_rows() {
        let mut grid = Grid::new(8, 4);
        fill_row(&mut grid, 3, 1);
        fill_row(&mut grid, 5, 2);
        grid.set(0, 0, 7);
        grid.set(1, 2, 6);
        grid.set(2, 4, 5);
        grid.set(3, 7, 4);

        let cleared = grid.clear_lines();
        assert_eq!(cleared, 2);
        assert_eq!(line_clear_reward(cleared), Some(100));

        // Two empty rows on top; rows above 3 drop by 2, row 4 drops by 1.
        assert!(grid.iter_rows().take(2).all(|r| r.iter().all(|&c| c == 0)));
        assert_eq!(grid.get(0, 2), Some(7));
        assert_eq!(grid.get(1, 4), Some(6));
        assert_eq!(grid.get(2, 5), Some(5));
        assert_eq!(grid.get(3, 7), Some(4));
        assert!((0..8).all(|y| !grid.is_row_full(y)));
    }

    #[test]
    fn clear_adjacent_rows() {
        for n in 1..=4usize {
            let mut grid = Grid::new(10, 5);
            for y in (10 - n)..10 {
                fill_row(&mut grid, y, 3);
            }
            grid.set(2, 10 - n - 1, 1);
            assert_eq!(grid.clear_lines(), n as u32);
            assert_eq!(grid.get(2, 9), Some(1));
            assert_eq!(grid.iter_rows().flatten().filter(|&&c| c != 0).count(), 1);
        }
    }

    #[test]
    fn clear_nothing() {
        let mut grid = Grid::new(4, 4);
        grid.set(1, 3, 1);
        let before = grid.clone();
        assert_eq!(grid.clear_lines(), 0);
        assert_eq!(grid, before);
    }

    proptest! {
        #[test]
        fn placement_inside_empty_grid_never_collides(
            kind_idx in 0usize..7,
            rotations in 0usize..4,
            x in 0i32..10,
            y in 0i32..20,
        ) {
            let grid = Grid::new(20, 10);
            let mut shape: Shape = TetrominoKind::ALL[kind_idx].shape();
            for _ in 0..rotations {
                shape = shape.rotated();
            }
            let p = ActivePiece { shape, x, y, color: 1 };
            let fits = x + p.shape.width() as i32 <= 10 && y + p.shape.height() as i32 <= 20;
            prop_assert_eq!(grid.has_collision(&p), !fits);
        }

        #[test]
        fn one_column_past_either_wall_collides(
            kind_idx in 0usize..7,
            y in 0i32..16,
        ) {
            let grid = Grid::new(20, 10);
            let shape = TetrominoKind::ALL[kind_idx].shape();
            let width = shape.width() as i32;
            let left = ActivePiece { shape: shape.clone(), x: -1, y, color: 1 };
            let right = ActivePiece { shape, x: 10 - width + 1, y, color: 1 };
            // Every catalog shape has a filled cell in its first and last column.
            prop_assert!(grid.has_collision(&left));
            prop_assert!(grid.has_collision(&right));
        }
    }
}
