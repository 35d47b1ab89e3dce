//! Tetromino catalog, shape masks and the active piece.

use rand::Rng;

/// Palette entries including the background at index 0.
pub const PALETTE_SIZE: u8 = 8;

/// Tetromino kinds (I, O, T, L, J, S, Z).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TetrominoKind {
    I,
    O,
    T,
    L,
    J,
    S,
    Z,
}

impl TetrominoKind {
    pub const ALL: [Self; 7] = [Self::I, Self::O, Self::T, Self::L, Self::J, Self::S, Self::Z];

    /// Spawn orientation mask.
    pub fn shape(&self) -> Shape {
        let rows: &[&[u8]] = match self {
            Self::I => &[&[1, 1, 1, 1]],
            Self::O => &[&[1, 1], &[1, 1]],
            Self::T => &[&[0, 1, 0], &[1, 1, 1]],
            Self::L => &[&[1, 0], &[1, 0], &[1, 1]],
            Self::J => &[&[0, 1], &[0, 1], &[1, 1]],
            Self::S => &[&[1, 1, 0], &[0, 1, 1]],
            Self::Z => &[&[0, 1, 1], &[1, 1, 0]],
        };
        Shape::new(rows.iter().map(|r| r.to_vec()).collect())
    }
}

/// Binary occupancy mask. Immutable: rotation builds a new value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shape {
    rows: Vec<Vec<u8>>,
}

impl Shape {
    pub fn new(rows: Vec<Vec<u8>>) -> Self {
        Self { rows }
    }

    #[cfg(test)]
    pub fn height(&self) -> usize {
        self.rows.len()
    }

    /// Width of the first row; catalog shapes are rectangular.
    #[inline]
    pub fn width(&self) -> usize {
        self.rows.first().map_or(0, Vec::len)
    }

    /// (dx, dy) of every set cell, relative to the top-left corner.
    pub fn filled(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.rows.iter().enumerate().flat_map(|(dy, row)| {
            row.iter()
                .enumerate()
                .filter(|&(_, &c)| c != 0)
                .map(move |(dx, _)| (dx, dy))
        })
    }

    /// Clockwise quarter turn: new row `i` is old column `i` read bottom to top.
    pub fn rotated(&self) -> Self {
        let rows = (0..self.width())
            .map(|i| {
                self.rows
                    .iter()
                    .rev()
                    .map(|row| row.get(i).copied().unwrap_or(0))
                    .collect()
            })
            .collect();
        Self { rows }
    }
}

/// The falling piece: its own copy of a shape, board origin and colour id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivePiece {
    pub shape: Shape,
    /// Column of the mask's left edge; may go negative while a move is tested.
    pub x: i32,
    /// Row of the mask's top edge.
    pub y: i32,
    /// Palette index in 1..PALETTE_SIZE.
    pub color: u8,
}

impl ActivePiece {
    /// Board coordinates of every set cell.
    pub fn filled_cells(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        self.shape
            .filled()
            .map(|(dx, dy)| (self.x + dx as i32, self.y + dy as i32))
    }
}

/// Shapes and colours new pieces are drawn from.
#[derive(Debug, Clone)]
pub struct PieceCatalog {
    shapes: Vec<Shape>,
    palette_size: u8,
}

impl PieceCatalog {
    /// The seven tetrominoes over the full palette.
    pub fn standard() -> Self {
        Self::new(
            TetrominoKind::ALL.iter().map(TetrominoKind::shape).collect(),
            PALETTE_SIZE,
        )
    }

    pub fn new(shapes: Vec<Shape>, palette_size: u8) -> Self {
        Self {
            shapes,
            palette_size,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    /// Uniform shape and uniform non-background colour, horizontally centred
    /// (floor division) at row 0. `None` when there is nothing to draw from.
    pub fn spawn_random_piece<R: Rng>(
        &self,
        cols: usize,
        rng: &mut R,
    ) -> Option<ActivePiece> {
        if self.shapes.is_empty() || self.palette_size < 2 {
            return None;
        }
        let shape = self.shapes[rng.gen_range(0..self.shapes.len())].clone();
        let color = rng.gen_range(1..self.palette_size);
        // div_euclid floors for negative differences too (shape wider than board).
        let x = (cols as i32 - shape.width() as i32).div_euclid(2);
        Some(ActivePiece {
            shape,
            x,
            y: 0,
            color,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn catalog_shapes() {
        assert_eq!(TetrominoKind::I.shape(), Shape::new(vec![vec![1, 1, 1, 1]]));
        assert_eq!(TetrominoKind::O.shape().width(), 2);
        assert_eq!(TetrominoKind::L.shape().height(), 3);
        for kind in TetrominoKind::ALL {
            assert_eq!(kind.shape().filled().count(), 4, "{kind:?}");
        }
    }

    #[test]
    fn rotate_t_clockwise() {
        let rotated = TetrominoKind::T.shape().rotated();
        assert_eq!(rotated, Shape::new(vec![vec![1, 0], vec![1, 1], vec![1, 0]]));
    }

    #[test]
    fn rotate_i_to_vertical() {
        let rotated = TetrominoKind::I.shape().rotated();
        assert_eq!(rotated.width(), 1);
        assert_eq!(rotated.height(), 4);
    }

    #[test]
    fn rotation_does_not_touch_catalog() {
        let catalog = PieceCatalog::standard();
        let mut rng = StdRng::seed_from_u64(7);
        let mut piece = catalog
            .spawn_random_piece(10, &mut rng)
            .expect("standard catalog spawns");
        let spawned = piece.shape.clone();
        piece.shape = piece.shape.rotated();
        assert!(catalog.shapes.contains(&spawned));
    }

    #[test]
    fn spawn_is_centred_at_top() {
        let catalog = PieceCatalog::new(vec![TetrominoKind::I.shape()], PALETTE_SIZE);
        let mut rng = StdRng::seed_from_u64(1);
        let p = catalog.spawn_random_piece(10, &mut rng).unwrap();
        assert_eq!((p.x, p.y), (3, 0));

        let catalog = PieceCatalog::new(vec![TetrominoKind::T.shape()], PALETTE_SIZE);
        let p = catalog.spawn_random_piece(10, &mut rng).unwrap();
        // (10 - 3) / 2 floors to 3.
        assert_eq!(p.x, 3);
    }

    #[test]
    fn spawn_wider_than_board_goes_negative() {
        let catalog = PieceCatalog::new(vec![TetrominoKind::I.shape()], PALETTE_SIZE);
        let mut rng = StdRng::seed_from_u64(1);
        let p = catalog.spawn_random_piece(1, &mut rng).unwrap();
        // floor((1 - 4) / 2) = -2
        assert_eq!(p.x, -2);
    }

    #[test]
    fn empty_catalog_spawns_nothing() {
        let catalog = PieceCatalog::new(Vec::new(), PALETTE_SIZE);
        let mut rng = StdRng::seed_from_u64(1);
        assert!(catalog.is_empty());
        assert!(catalog.spawn_random_piece(10, &mut rng).is_none());
    }

    #[test]
    fn spawn_covers_all_shapes_and_colours() {
        let catalog = PieceCatalog::standard();
        let mut rng = StdRng::seed_from_u64(42);
        let mut shapes_seen = Vec::new();
        let mut colours_seen = [false; PALETTE_SIZE as usize];
        for _ in 0..2000 {
            let p = catalog.spawn_random_piece(10, &mut rng).unwrap();
            assert!((1..PALETTE_SIZE).contains(&p.color));
            colours_seen[p.color as usize] = true;
            if !shapes_seen.contains(&p.shape) {
                shapes_seen.push(p.shape);
            }
        }
        assert_eq!(shapes_seen.len(), TetrominoKind::ALL.len());
        assert!(!colours_seen[0]);
        assert!(colours_seen[1..].iter().all(|&seen| seen));
    }

    proptest! {
        #[test]
        fn four_rotations_are_identity(kind_idx in 0usize..7) {
            let shape = TetrominoKind::ALL[kind_idx].shape();
            let back = shape.rotated().rotated().rotated().rotated();
            prop_assert_eq!(back, shape);
        }

        #[test]
        fn rotation_swaps_dimensions(kind_idx in 0usize..7) {
            let shape = TetrominoKind::ALL[kind_idx].shape();
            let r = shape.rotated();
            prop_assert_eq!((r.width(), r.height()), (shape.height(), shape.width()));
            prop_assert_eq!(r.filled().count(), 4);
        }
    }
}
