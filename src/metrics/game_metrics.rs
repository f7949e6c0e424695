use std::time::{Duration, Instant};

use crate::game::Tier;

/// Session statistics shown in the side panel. Kept in memory only.
pub struct GameMetrics {
    pub start_time: Option<Instant>,
    pub elapsed_time: Duration,
    pub high_score: u32,
    pub games_played: u32,
    pub best_tier: Tier,
    pub lives_lost: u32,
}

impl GameMetrics {
    pub fn new() -> Self {
        Self {
            start_time: None,
            elapsed_time: Duration::ZERO,
            high_score: 0,
            games_played: 0,
            best_tier: Tier::Basic,
            lives_lost: 0,
        }
    }

    /// Refresh the clock; it stands still outside a running game
    pub fn update(&mut self, now: Instant) {
        if let Some(start) = self.start_time {
            self.elapsed_time = now.saturating_duration_since(start);
        }
    }

    pub fn on_game_start(&mut self, now: Instant) {
        self.start_time = Some(now);
        self.elapsed_time = Duration::ZERO;
    }

    pub fn on_tier_reached(&mut self, tier: Tier) {
        self.best_tier = self.best_tier.max(tier);
    }

    pub fn on_life_lost(&mut self) {
        self.lives_lost += 1;
    }

    pub fn on_game_over(&mut self, final_score: u32, now: Instant) {
        self.update(now);
        self.start_time = None;
        self.games_played += 1;
        self.high_score = self.high_score.max(final_score);
    }

    pub fn format_time(&self) -> String {
        let total_secs = self.elapsed_time.as_secs();
        format!("{:02}:{:02}", total_secs / 60, total_secs % 60)
    }
}

impl Default for GameMetrics {
    fn default() -> Self {
        Self::new()
    }
}
