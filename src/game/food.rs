//! Food kinds, their effects, and the spawner that places them.

use std::time::Instant;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::config::{GameConfig, SpawnConfig};
use super::error::GameError;
use super::state::Position;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FoodKind {
    Normal,
    Special,
    Bomb,
    Heart,
}

impl FoodKind {
    pub const ALL: [FoodKind; 4] = [
        FoodKind::Normal,
        FoodKind::Special,
        FoodKind::Bomb,
        FoodKind::Heart,
    ];

    /// Points gained (or lost) when eaten
    pub fn score_delta(&self) -> i32 {
        match self {
            FoodKind::Normal => 10,
            FoodKind::Special => 40,
            FoodKind::Bomb => -20,
            FoodKind::Heart => 0,
        }
    }

    /// Net change in snake length when eaten
    pub fn growth(&self) -> i32 {
        match self {
            FoodKind::Normal => 1,
            FoodKind::Special => 4,
            FoodKind::Bomb => -2,
            FoodKind::Heart => 0,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            FoodKind::Normal => "normal",
            FoodKind::Special => "special",
            FoodKind::Bomb => "bomb",
            FoodKind::Heart => "heart",
        }
    }
}

/// A food item on the board
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Food {
    pub position: Position,
    pub kind: FoodKind,
    pub created_at: Instant,
    /// Set for kinds that disappear when left alone
    pub expires_at: Option<Instant>,
}

impl Food {
    pub fn new(position: Position, kind: FoodKind, created_at: Instant) -> Self {
        Self {
            position,
            kind,
            created_at,
            expires_at: None,
        }
    }

    pub fn is_at(&self, pos: Position) -> bool {
        self.position == pos
    }
}

/// Decides what food appears and where. Holds no game state.
#[derive(Debug, Clone)]
pub struct FoodSpawner {
    spawn: SpawnConfig,
    special: bool,
    bomb: bool,
    heart: bool,
}

impl FoodSpawner {
    pub fn new(config: &GameConfig) -> Self {
        Self {
            spawn: config.spawn.clone(),
            special: config.allows(FoodKind::Special),
            bomb: config.allows(FoodKind::Bomb),
            heart: config.allows(FoodKind::Heart),
        }
    }

    /// Pick a kind for a uniform roll in `[0, 1)`.
    ///
    /// Below the unlock score only specials can replace normal food. Above it
    /// the bands are cumulative: bomb, then special, then heart (only while
    /// lives are below the cap). Disabled kinds fall through to normal.
    pub fn kind_for_roll(&self, roll: f64, score: u32, lives: u32, max_lives: u32) -> FoodKind {
        let s = &self.spawn;

        if score < s.unlock_score {
            if self.special && roll < s.early_special_chance {
                return FoodKind::Special;
            }
            return FoodKind::Normal;
        }

        let bomb_band = s.bomb_chance;
        let special_band = bomb_band + s.special_chance;
        let heart_band = special_band + s.heart_chance;

        if roll < bomb_band {
            if self.bomb {
                return FoodKind::Bomb;
            }
        } else if roll < special_band {
            if self.special {
                return FoodKind::Special;
            }
        } else if roll < heart_band && self.heart && lives < max_lives {
            return FoodKind::Heart;
        }
        FoodKind::Normal
    }

    pub fn decide_kind<R: Rng>(
        &self,
        rng: &mut R,
        score: u32,
        lives: u32,
        max_lives: u32,
    ) -> FoodKind {
        let roll: f64 = rng.gen();
        self.kind_for_roll(roll, score, lives, max_lives)
    }

    /// Uniformly pick a free cell.
    ///
    /// Rejection sampling first; after `max_attempts` misses every free cell
    /// is enumerated so a crowded board still terminates.
    pub fn place<R, F>(
        &self,
        rng: &mut R,
        width: usize,
        height: usize,
        occupied: F,
    ) -> Result<Position, GameError>
    where
        R: Rng,
        F: Fn(Position) -> bool,
    {
        for _ in 0..self.spawn.max_attempts {
            let x = rng.gen_range(0..width) as i32;
            let y = rng.gen_range(0..height) as i32;
            let pos = Position::new(x, y);

            if !occupied(pos) {
                return Ok(pos);
            }
        }

        let free: Vec<Position> = (0..height as i32)
            .flat_map(|y| (0..width as i32).map(move |x| Position::new(x, y)))
            .filter(|&pos| !occupied(pos))
            .collect();

        debug!(free = free.len(), "rejection sampling exhausted, scanning grid");

        free.choose(rng)
            .copied()
            .ok_or(GameError::BoardFull { width, height })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    fn spawner() -> FoodSpawner {
        FoodSpawner::new(&GameConfig::default())
    }

    #[test]
    fn test_effect_table() {
        assert_eq!(FoodKind::Normal.score_delta(), 10);
        assert_eq!(FoodKind::Normal.growth(), 1);
        assert_eq!(FoodKind::Special.score_delta(), 40);
        assert_eq!(FoodKind::Special.growth(), 4);
        assert_eq!(FoodKind::Bomb.score_delta(), -20);
        assert_eq!(FoodKind::Bomb.growth(), -2);
        assert_eq!(FoodKind::Heart.score_delta(), 0);
        assert_eq!(FoodKind::Heart.growth(), 0);
    }

    #[test]
    fn test_low_score_bands() {
        let s = spawner();
        assert_eq!(s.kind_for_roll(0.0, 0, 0, 3), FoodKind::Special);
        assert_eq!(s.kind_for_roll(0.149, 49, 0, 3), FoodKind::Special);
        assert_eq!(s.kind_for_roll(0.15, 49, 0, 3), FoodKind::Normal);
        assert_eq!(s.kind_for_roll(0.99, 0, 0, 3), FoodKind::Normal);
    }

    #[test]
    fn test_high_score_bands() {
        let s = spawner();
        assert_eq!(s.kind_for_roll(0.05, 50, 0, 3), FoodKind::Bomb);
        assert_eq!(s.kind_for_roll(0.119, 50, 0, 3), FoodKind::Bomb);
        assert_eq!(s.kind_for_roll(0.12, 50, 0, 3), FoodKind::Special);
        assert_eq!(s.kind_for_roll(0.249, 50, 0, 3), FoodKind::Special);
        assert_eq!(s.kind_for_roll(0.26, 50, 0, 3), FoodKind::Heart);
        assert_eq!(s.kind_for_roll(0.3, 50, 0, 3), FoodKind::Normal);
    }

    #[test]
    fn test_no_heart_at_full_lives() {
        let s = spawner();
        assert_eq!(s.kind_for_roll(0.26, 100, 3, 3), FoodKind::Normal);
    }

    #[test]
    fn test_classic_spawns_only_normal() {
        let s = FoodSpawner::new(&GameConfig::classic());
        let mut rng = StdRng::seed_from_u64(7);
        for score in [0, 60, 500] {
            for _ in 0..500 {
                assert_eq!(s.decide_kind(&mut rng, score, 0, 0), FoodKind::Normal);
            }
        }
    }

    #[test]
    fn test_never_bomb_or_heart_below_unlock() {
        let s = spawner();
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..2000 {
            let kind = s.decide_kind(&mut rng, 40, 0, 3);
            assert!(matches!(kind, FoodKind::Normal | FoodKind::Special));
        }
    }

    #[test]
    fn test_place_avoids_occupied_cells() {
        let s = spawner();
        let mut rng = StdRng::seed_from_u64(1);
        let blocked: HashSet<Position> = (0..5).map(|x| Position::new(x, 0)).collect();
        for _ in 0..200 {
            let pos = s.place(&mut rng, 5, 2, |p| blocked.contains(&p)).unwrap();
            assert_eq!(pos.y, 1);
        }
    }

    #[test]
    fn test_place_finds_last_free_cell() {
        let s = spawner();
        let mut rng = StdRng::seed_from_u64(3);
        let free = Position::new(7, 6);
        let pos = s.place(&mut rng, 8, 8, |p| p != free).unwrap();
        assert_eq!(pos, free);
    }

    #[test]
    fn test_place_on_full_board_errors() {
        let s = spawner();
        let mut rng = StdRng::seed_from_u64(3);
        let result = s.place(&mut rng, 4, 4, |_| true);
        assert_eq!(
            result,
            Err(GameError::BoardFull {
                width: 4,
                height: 4
            })
        );
    }
}
