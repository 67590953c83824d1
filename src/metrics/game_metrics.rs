use std::time::{Duration, Instant};

/// In-memory stats for one session of play; nothing is persisted
pub struct SessionStats {
    round_started: Instant,
    pub round_time: Duration,
    pub best_score: u32,
    pub games_played: u32,
    round_recorded: bool,
}

impl SessionStats {
    pub fn new() -> Self {
        Self {
            round_started: Instant::now(),
            round_time: Duration::ZERO,
            best_score: 0,
            games_played: 0,
            round_recorded: false,
        }
    }

    /// Refresh the round clock; frozen once the round is recorded
    pub fn update(&mut self) {
        if !self.round_recorded {
            self.round_time = self.round_started.elapsed();
        }
    }

    pub fn on_round_start(&mut self) {
        self.round_started = Instant::now();
        self.round_time = Duration::ZERO;
        self.round_recorded = false;
    }

    /// Record a finished round. Repeated calls for the same round are ignored.
    pub fn on_round_over(&mut self, final_score: u32) {
        if self.round_recorded {
            return;
        }
        self.round_recorded = true;
        self.games_played += 1;
        self.best_score = self.best_score.max(final_score);
    }

    pub fn format_time(&self) -> String {
        let total_secs = self.round_time.as_secs();
        format!("{:02}:{:02}", total_secs / 60, total_secs % 60)
    }
}

impl Default for SessionStats {
    fn default() -> Self {
        Self::new()
    }
}
