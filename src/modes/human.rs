use anyhow::{Context, Result};
use crossterm::{
    event::{Event, EventStream, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use futures::StreamExt;
use ratatui::{Terminal, backend::CrosstermBackend};
use std::io::{Stderr, stderr};
use std::time::Instant;
use tokio::time::{MissedTickBehavior, interval};
use tracing::{info, warn};

use crate::game::{Frame, GameConfig, GameEngine, GameError, GameLoop, LoopState, RenderSnapshot};
use crate::input::{InputHandler, KeyAction};
use crate::metrics::SessionStats;
use crate::render::Renderer;

/// Keyboard-driven game in the terminal.
///
/// Owns the [`GameLoop`] and with it the current engine. Every frame tick
/// drives the loop and draws the resulting snapshot.
pub struct HumanMode {
    config: GameConfig,
    seed: Option<u64>,
    game_loop: GameLoop,
    last_snapshot: Option<RenderSnapshot>,
    stats: SessionStats,
    renderer: Renderer,
    input_handler: InputHandler,
    clock: Instant,
    rounds_started: u64,
    should_quit: bool,
}

impl HumanMode {
    pub fn new(config: GameConfig, seed: Option<u64>) -> Result<Self> {
        config.validate().context("Invalid game configuration")?;
        let game_loop = GameLoop::new(config.tick_interval())?;

        let mut mode = Self {
            config,
            seed,
            game_loop,
            last_snapshot: None,
            stats: SessionStats::new(),
            renderer: Renderer::new(),
            input_handler: InputHandler::new(),
            clock: Instant::now(),
            rounds_started: 0,
            should_quit: false,
        };
        mode.start_round()?;
        Ok(mode)
    }

    pub async fn run(&mut self) -> Result<()> {
        // Setup terminal
        enable_raw_mode().context("Failed to enable raw mode")?;
        let mut stderr = stderr();
        execute!(stderr, EnterAlternateScreen).context("Failed to enter alternate screen")?;
        let backend = CrosstermBackend::new(stderr);
        let mut terminal = Terminal::new(backend).context("Failed to create terminal")?;
        terminal.hide_cursor().context("Failed to hide cursor")?;
        terminal.clear().context("Failed to clear terminal")?;

        let result = self.run_game_loop(&mut terminal).await;

        self.shutdown();
        self.cleanup_terminal(&mut terminal)?;

        result
    }

    async fn run_game_loop(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<Stderr>>,
    ) -> Result<()> {
        let mut event_stream = EventStream::new();

        // Stands in for the display refresh; the loop decides when to step.
        let mut frame_timer = interval(self.config.frame_interval());
        frame_timer.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                maybe_event = event_stream.next() => {
                    if let Some(Ok(event)) = maybe_event {
                        self.handle_event(event)?;
                    }
                }

                _ = frame_timer.tick() => {
                    self.on_frame();
                    if let Err(err) = terminal.draw(|frame| {
                        if let Some(snapshot) = &self.last_snapshot {
                            self.renderer.render(frame, snapshot, &self.stats);
                        }
                    }) {
                        self.abort_after_render_fault(&err);
                    }
                }

                _ = tokio::signal::ctrl_c() => {
                    self.should_quit = true;
                }
            }

            if self.should_quit {
                break;
            }
        }

        Ok(())
    }

    /// Drive the loop while it is running and keep the latest snapshot
    fn on_frame(&mut self) {
        if self.game_loop.state() == LoopState::Running {
            let now_ms = self.now_ms();
            match self.game_loop.drive(now_ms) {
                Frame::Running { snapshot, .. } => {
                    self.last_snapshot = Some(snapshot);
                }
                Frame::Finished { snapshot } => {
                    self.stats.on_round_over(snapshot.score);
                    self.last_snapshot = Some(snapshot);
                }
                Frame::Detached => {}
            }
        }
        self.stats.update();
    }

    fn handle_event(&mut self, event: Event) -> Result<()> {
        if let Event::Key(key) = event {
            if key.kind != KeyEventKind::Press {
                return Ok(());
            }

            match self.input_handler.handle_key_event(key) {
                KeyAction::Turn(direction) => {
                    self.game_loop.queue_direction(direction);
                }
                KeyAction::Restart => {
                    if self.game_loop.state() == LoopState::Finished {
                        self.start_round()?;
                    }
                }
                KeyAction::Quit => {
                    self.should_quit = true;
                }
                KeyAction::None => {}
            }
        }

        Ok(())
    }

    /// Retire the current engine, if any, and start a fresh one
    fn start_round(&mut self) -> Result<()> {
        if let Some(previous) = self.game_loop.stop() {
            previous.destroy();
        }

        let engine = self.new_engine()?;
        self.last_snapshot = Some(engine.snapshot());
        let now_ms = self.now_ms();
        self.game_loop.start(engine, now_ms)?;
        self.rounds_started += 1;
        self.stats.on_round_start();

        info!(round = self.rounds_started, "round started");
        Ok(())
    }

    fn new_engine(&self) -> Result<GameEngine, GameError> {
        match self.seed {
            Some(seed) => GameEngine::with_seed(&self.config, seed.wrapping_add(self.rounds_started)),
            None => GameEngine::new(&self.config),
        }
    }

    /// A failed draw ends the session without taking the process down
    fn abort_after_render_fault(&mut self, err: &std::io::Error) {
        warn!(error = %err, "render failed, stopping game loop");
        self.shutdown();
        self.should_quit = true;
    }

    fn shutdown(&mut self) {
        if let Some(engine) = self.game_loop.stop() {
            engine.destroy();
        }
    }

    fn now_ms(&self) -> u64 {
        self.clock.elapsed().as_millis() as u64
    }

    fn cleanup_terminal(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<Stderr>>,
    ) -> Result<()> {
        disable_raw_mode().context("Failed to disable raw mode")?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)
            .context("Failed to leave alternate screen")?;
        terminal.show_cursor().context("Failed to show cursor")?;
        Ok(())
    }
}
