//! Game state: lifecycle phase, gravity timing, input dispatch.

use crate::GameConfig;
use crate::grid::{Grid, line_clear_reward};
use crate::pieces::{ActivePiece, PieceCatalog};
use log::{debug, info, warn};
use rand::rngs::StdRng;
use std::time::{Duration, Instant};

/// Lifecycle phase. A single field, so no contradictory combinations exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    NotStarted,
    Running,
    Paused,
    GameOver,
}

/// Outcome of one row of descent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Descent {
    Moved,
    Landed,
}

/// Piece commands delivered by the input adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    MoveLeft,
    MoveRight,
    SoftDrop,
    Rotate,
}

/// Whether the scheduler should keep invoking `tick`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Schedule {
    Continue,
    Stop,
}

/// Rendering collaborator. Reads state through the `Game` accessors.
pub trait Presenter {
    fn redraw(&mut self, game: &Game);
}

/// Board, active piece, score and phase for one session.
#[derive(Debug)]
pub struct Game {
    grid: Grid,
    catalog: PieceCatalog,
    piece: Option<ActivePiece>,
    score: u32,
    lines_cleared: u32,
    phase: Phase,
    drop_interval: Duration,
    /// Last automatic descent (or start/resume).
    last_move: Instant,
    rng: StdRng,
}

impl Game {
    pub fn new(config: &GameConfig, rng: StdRng) -> Self {
        Self::with_catalog(config, PieceCatalog::standard(), rng)
    }

    pub fn with_catalog(config: &GameConfig, catalog: PieceCatalog, rng: StdRng) -> Self {
        let mut game = Self {
            grid: Grid::new(config.rows, config.cols),
            catalog,
            piece: None,
            score: 0,
            lines_cleared: 0,
            phase: Phase::NotStarted,
            drop_interval: config.drop_interval,
            last_move: Instant::now(),
            rng,
        };
        game.reset();
        game
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn piece(&self) -> Option<&ActivePiece> {
        self.piece.as_ref()
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn lines_cleared(&self) -> u32 {
        self.lines_cleared
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    fn schedule(&self) -> Schedule {
        if self.phase == Phase::Running {
            Schedule::Continue
        } else {
            Schedule::Stop
        }
    }

    /// Empty grid, zero score, fresh piece; back to `NotStarted`.
    fn reset(&mut self) {
        self.grid = Grid::new(self.grid.rows(), self.grid.cols());
        self.score = 0;
        self.lines_cleared = 0;
        self.phase = Phase::NotStarted;
        if self.catalog.is_empty() {
            warn!("piece catalog is empty; board is frozen");
        }
        self.piece = self.catalog.spawn_random_piece(self.grid.cols(), &mut self.rng);
    }

    /// Begin (or continue) play. A finished game is reset first.
    pub fn start(&mut self, now: Instant) -> Schedule {
        if self.phase == Phase::GameOver {
            self.reset();
        }
        if self.phase == Phase::Running {
            return Schedule::Continue;
        }
        if self
            .piece
            .as_ref()
            .is_some_and(|p| self.grid.has_collision(p))
        {
            info!("spawn blocked at start; game over");
            self.phase = Phase::GameOver;
            return Schedule::Stop;
        }
        debug!("{:?} -> Running", self.phase);
        self.phase = Phase::Running;
        self.last_move = now;
        Schedule::Continue
    }

    pub fn pause(&mut self) -> Schedule {
        if self.phase == Phase::Running {
            debug!("Running -> Paused");
            self.phase = Phase::Paused;
        }
        self.schedule()
    }

    /// Back to `Running`; the descent timer restarts so paused time is not replayed.
    pub fn resume(&mut self, now: Instant) -> Schedule {
        if self.phase == Phase::Paused {
            debug!("Paused -> Running");
            self.phase = Phase::Running;
            self.last_move = now;
        }
        self.schedule()
    }

    pub fn restart(&mut self, now: Instant) -> Schedule {
        self.reset();
        self.start(now)
    }

    /// One scheduler frame. Descends once the drop interval has been exceeded,
    /// then asks the presenter to redraw. Inert unless `Running`.
    pub fn tick(&mut self, now: Instant, presenter: &mut impl Presenter) -> Schedule {
        if self.phase != Phase::Running {
            return Schedule::Stop;
        }
        if now.saturating_duration_since(self.last_move) > self.drop_interval {
            self.descend();
            self.last_move = now;
        }
        presenter.redraw(self);
        self.schedule()
    }

    /// Moves the piece down one row, or lands it (merge, clear, score, spawn).
    /// `None` when not running or there is no active piece.
    fn descend(&mut self) -> Option<Descent> {
        if self.phase != Phase::Running {
            return None;
        }
        let piece = self.piece.as_mut()?;
        piece.y += 1;
        if !self.grid.has_collision(piece) {
            return Some(Descent::Moved);
        }
        piece.y -= 1;
        self.land();
        Some(Descent::Landed)
    }

    fn land(&mut self) {
        let Some(piece) = self.piece.take() else {
            return;
        };
        self.grid.merge(&piece);
        let cleared = self.grid.clear_lines();
        if cleared > 0 {
            match line_clear_reward(cleared) {
                Some(reward) => self.score += reward,
                None => warn!("no reward defined for {cleared} simultaneous lines"),
            }
            self.lines_cleared += cleared;
            debug!("cleared {cleared} lines, score {}", self.score);
        }
        self.spawn_next();
    }

    /// Replaces the active piece; a spawn that collides ends the game.
    fn spawn_next(&mut self) {
        self.piece = self.catalog.spawn_random_piece(self.grid.cols(), &mut self.rng);
        match &self.piece {
            Some(p) if self.grid.has_collision(p) => {
                info!("game over, score {}", self.score);
                self.phase = Phase::GameOver;
            }
            Some(_) => {}
            None => warn!("piece catalog is empty; board is frozen"),
        }
    }

    /// Applies one command if running. Returns the descent outcome for `SoftDrop`.
    pub fn apply(&mut self, command: Command) -> Option<Descent> {
        match command {
            Command::MoveLeft => self.move_left(),
            Command::MoveRight => self.move_right(),
            Command::Rotate => self.rotate(),
            Command::SoftDrop => return self.soft_drop(),
        }
        None
    }

    pub fn move_left(&mut self) {
        self.shift(-1);
    }

    pub fn move_right(&mut self) {
        self.shift(1);
    }

    fn shift(&mut self, dx: i32) {
        if self.phase != Phase::Running {
            return;
        }
        if let Some(ref mut piece) = self.piece {
            piece.x += dx;
            if self.grid.has_collision(piece) {
                piece.x -= dx;
            }
        }
    }

    /// Clockwise rotation in place; rejected outright on collision.
    pub fn rotate(&mut self) {
        if self.phase != Phase::Running {
            return;
        }
        if let Some(ref mut piece) = self.piece {
            let rotated = piece.shape.rotated();
            let old_shape = std::mem::replace(&mut piece.shape, rotated);
            if self.grid.has_collision(piece) {
                piece.shape = old_shape;
            }
        }
    }

    /// One player-driven descent. Leaves the gravity timer alone.
    pub fn soft_drop(&mut self) -> Option<Descent> {
        self.descend()
    }
}
