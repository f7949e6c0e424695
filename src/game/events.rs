use super::food::FoodKind;
use super::progression::Tier;
use super::state::{CollisionType, Position};

/// Something the front-end may want to show. The engine never reads these
/// back; they are drained once per frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameEvent {
    FoodSpawned {
        kind: FoodKind,
        position: Position,
        extra: bool,
    },
    FoodEaten {
        kind: FoodKind,
        position: Position,
    },
    /// A bomb or heart timed out before being eaten
    FoodExpired {
        kind: FoodKind,
        position: Position,
    },
    /// Tail cells removed by a bomb, tail-most first
    SegmentsLost {
        positions: Vec<Position>,
    },
    SlowMotionStarted,
    SlowMotionEnded,
    LifeLost {
        position: Position,
        lives_left: u32,
    },
    LifeGained {
        lives: u32,
    },
    TierChanged {
        from: Tier,
        to: Tier,
    },
    ScoreChanged {
        score: u32,
    },
    Died {
        position: Position,
        cause: CollisionType,
    },
    GameOver {
        final_score: u32,
    },
}
