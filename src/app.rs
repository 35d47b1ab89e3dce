//! App: terminal init, frame scheduling, key handling.

use crate::GameConfig;
use crate::game::{Game, Phase, Presenter, Schedule};
use crate::input::{Action, key_to_action};
use crate::theme::Theme;
use crate::ui::{self, FadeState};
use anyhow::Result;
use crossterm::event::{self, Event};
use log::{debug, info, warn};
use rand::SeedableRng;
use rand::rngs::StdRng;
use ratatui::DefaultTerminal;
use std::time::{Duration, Instant};

/// ~60 Hz frame cadence for ticks and input polling.
const FRAME_DURATION: Duration = Duration::from_millis(16);

/// Rendering collaborator backed by the terminal.
struct TerminalPresenter {
    terminal: DefaultTerminal,
    theme: Theme,
    fade: FadeState,
}

impl Presenter for TerminalPresenter {
    fn redraw(&mut self, game: &Game) {
        let now = Instant::now();
        let theme = &self.theme;
        let fade = &mut self.fade;
        if let Err(e) = self.terminal.draw(|f| ui::draw(f, game, theme, fade, now)) {
            warn!("redraw skipped: {e}");
        }
    }
}

pub struct App {
    theme: Theme,
    game: Game,
    /// Whether the scheduler is currently issuing ticks.
    schedule: Schedule,
    no_menu: bool,
}

impl App {
    pub fn new(config: GameConfig, theme: Theme) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            theme,
            game: Game::new(&config, rng),
            schedule: Schedule::Stop,
            no_menu: config.no_menu,
        }
    }

    /// Routes one action to the game. Lifecycle actions update the schedule.
    fn handle_action(&mut self, action: Action, now: Instant) {
        let schedule = match action {
            Action::Piece(command) => {
                self.game.apply(command);
                None
            }
            Action::Start => Some(self.game.start(now)),
            Action::TogglePause => match self.game.phase() {
                Phase::Running => Some(self.game.pause()),
                Phase::Paused => Some(self.game.resume(now)),
                _ => None,
            },
            Action::Restart => Some(self.game.restart(now)),
            Action::Quit | Action::None => None,
        };
        if let Some(s) = schedule {
            debug!("{action:?}: phase {:?}, {s:?}", self.game.phase());
            self.schedule = s;
        }
    }

    pub fn run(&mut self) -> Result<()> {
        use crossterm::{
            execute,
            terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
        };

        enable_raw_mode()?;
        let mut stdout = std::io::stdout();
        execute!(stdout, EnterAlternateScreen)?;

        let terminal =
            ratatui::DefaultTerminal::new(ratatui::backend::CrosstermBackend::new(stdout))?;
        let mut presenter = TerminalPresenter {
            terminal,
            theme: self.theme.clone(),
            fade: FadeState::default(),
        };

        let result = self.run_loop(&mut presenter);

        let restored = restore_terminal([
            &mut || execute!(std::io::stdout(), LeaveAlternateScreen),
            &mut disable_raw_mode,
        ]);
        info!("exit with score {}", self.game.score());

        result.and(restored.map_err(Into::into))
    }

    fn run_loop(&mut self, presenter: &mut TerminalPresenter) -> Result<()> {
        if self.no_menu {
            self.schedule = self.game.start(Instant::now());
        }
        presenter.redraw(&self.game);

        loop {
            let frame_start = Instant::now();
            if self.schedule == Schedule::Continue {
                self.schedule = self.game.tick(frame_start, presenter);
            } else if presenter.fade.animating() {
                presenter.redraw(&self.game);
            }

            let timeout = FRAME_DURATION.saturating_sub(frame_start.elapsed());
            if !event::poll(timeout)? {
                continue;
            }
            while event::poll(Duration::ZERO)? {
                match event::read()? {
                    Event::Key(key) => {
                        let action = key_to_action(key);
                        if action == Action::Quit {
                            return Ok(());
                        }
                        if action != Action::None {
                            self.handle_action(action, Instant::now());
                            presenter.redraw(&self.game);
                        }
                    }
                    Event::Resize(..) => presenter.redraw(&self.game),
                    _ => {}
                }
            }
        }
    }
}

/// Runs every restore step even when an earlier one fails; returns the first error.
fn restore_terminal(steps: [&mut dyn FnMut() -> std::io::Result<()>; 2]) -> std::io::Result<()> {
    let mut first = Ok(());
    for step in steps {
        if let Err(e) = step() {
            warn!("terminal restore step failed: {e}");
            if first.is_ok() {
                first = Err(e);
            }
        }
    }
    first
}
