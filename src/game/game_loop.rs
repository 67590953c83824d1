use std::time::Duration;

use tracing::{debug, info};

use super::{
    action::Direction, engine::GameEngine, error::GameError, snapshot::RenderSnapshot,
};

/// Lifecycle of a [`GameLoop`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    /// No engine has been started yet
    Idle,
    /// Stepping the engine on schedule
    Running,
    /// The engine reported game over; no more steps will run
    Finished,
    /// Detached from its engine
    Stopped,
}

/// What one [`GameLoop::drive`] call produced
#[derive(Debug, Clone, PartialEq)]
pub enum Frame {
    /// Keep driving. `ticked` is set when this call stepped the engine.
    Running {
        snapshot: RenderSnapshot,
        ticked: bool,
    },
    /// Game over; the caller can stop scheduling drive calls
    Finished { snapshot: RenderSnapshot },
    /// No engine attached
    Detached,
}

impl Frame {
    pub fn snapshot(&self) -> Option<&RenderSnapshot> {
        match self {
            Frame::Running { snapshot, .. } | Frame::Finished { snapshot } => Some(snapshot),
            Frame::Detached => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, Frame::Running { .. })
    }
}

/// Steps a [`GameEngine`] at a fixed logical rate from a variable-rate frame
/// callback.
///
/// At most one step runs per [`drive`](GameLoop::drive) call. Time missed
/// during a stall is dropped rather than caught up.
#[derive(Debug)]
pub struct GameLoop {
    engine: Option<GameEngine>,
    tick_interval_ms: u64,
    last_tick_ms: u64,
    ticks: u64,
    state: LoopState,
}

impl GameLoop {
    pub fn new(tick_interval: Duration) -> Result<Self, GameError> {
        let tick_interval_ms = tick_interval.as_millis() as u64;
        if tick_interval_ms == 0 {
            return Err(GameError::InvalidInterval {
                name: "tick_interval",
            });
        }

        Ok(Self {
            engine: None,
            tick_interval_ms,
            last_tick_ms: 0,
            ticks: 0,
            state: LoopState::Idle,
        })
    }

    /// Take ownership of `engine` and start the tick clock at `now_ms`.
    ///
    /// Fails if an engine is still attached; [`stop`](GameLoop::stop) it and
    /// destroy it first.
    pub fn start(&mut self, engine: GameEngine, now_ms: u64) -> Result<(), GameError> {
        if self.engine.is_some() {
            return Err(GameError::EngineAttached);
        }

        self.engine = Some(engine);
        self.last_tick_ms = now_ms;
        self.ticks = 0;
        self.state = LoopState::Running;
        info!(tick_interval_ms = self.tick_interval_ms, "game loop started");
        Ok(())
    }

    /// Called once per display frame with the current time in milliseconds
    pub fn drive(&mut self, now_ms: u64) -> Frame {
        let Some(engine) = self.engine.as_mut() else {
            return Frame::Detached;
        };

        if self.state == LoopState::Finished {
            return Frame::Finished {
                snapshot: engine.snapshot(),
            };
        }

        if engine.is_game_over() {
            self.state = LoopState::Finished;
            info!(
                ticks = self.ticks,
                score = engine.score(),
                "game loop finished"
            );
            return Frame::Finished {
                snapshot: engine.snapshot(),
            };
        }

        let ticked = now_ms.saturating_sub(self.last_tick_ms) >= self.tick_interval_ms;
        if ticked {
            engine.step();
            self.last_tick_ms = now_ms;
            self.ticks += 1;
        }

        Frame::Running {
            snapshot: engine.snapshot(),
            ticked,
        }
    }

    /// Forward a turn request; ignored unless the loop is running
    pub fn queue_direction(&mut self, direction: Direction) -> bool {
        if self.state != LoopState::Running {
            return false;
        }
        match self.engine.as_mut() {
            Some(engine) => engine.queue_direction(direction),
            None => false,
        }
    }

    /// Stop scheduling and hand the engine back to the caller.
    ///
    /// Safe to call repeatedly; later calls return `None`.
    pub fn stop(&mut self) -> Option<GameEngine> {
        let engine = self.engine.take();
        if engine.is_some() {
            debug!(ticks = self.ticks, "game loop stopped");
        }
        self.state = LoopState::Stopped;
        engine
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    /// Steps run since the last start
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    pub fn engine(&self) -> Option<&GameEngine> {
        self.engine.as_ref()
    }
}
