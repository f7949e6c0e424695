use std::collections::VecDeque;
use std::time::{Duration, Instant};

use super::action::Direction;
use super::events::GameEvent;
use super::food::Food;
use super::progression::Tier;
use super::timers::TimerTable;

/// A position on the game grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Move position by delta
    pub fn moved_by(&self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    /// Move position in a direction
    pub fn moved_in_direction(&self, direction: Direction) -> Self {
        let (dx, dy) = direction.delta();
        self.moved_by(dx, dy)
    }

    /// Nearest on-board cell, used to pin wall deaths to the grid edge
    pub fn clamped(&self, width: usize, height: usize) -> Self {
        Self {
            x: self.x.clamp(0, width as i32 - 1),
            y: self.y.clamp(0, height as i32 - 1),
        }
    }
}

/// The snake in the game
///
/// Growth appends copies of the tail cell; they unstack one per tick as the
/// snake moves on.
#[derive(Debug, Clone, PartialEq)]
pub struct Snake {
    /// Body segments, with head at the front
    pub body: VecDeque<Position>,
    /// Direction applied on the last tick
    pub direction: Direction,
    /// Buffered heading, promoted at the start of the next tick
    pub next_direction: Direction,
}

impl Snake {
    /// Create a new snake with given starting position and direction
    pub fn new(head: Position, direction: Direction, length: usize) -> Self {
        let (dx, dy) = direction.delta();
        let body = (0..length.max(1) as i32)
            .map(|i| head.moved_by(-dx * i, -dy * i))
            .collect();

        Self {
            body,
            direction,
            next_direction: direction,
        }
    }

    /// Get the head position
    pub fn head(&self) -> Position {
        self.body[0]
    }

    /// Get the tail position (last segment)
    pub fn tail(&self) -> Position {
        self.body[self.body.len() - 1]
    }

    /// Get the length of the snake
    pub fn len(&self) -> usize {
        self.body.len()
    }

    /// Check if the snake is empty (should never happen in practice)
    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }

    pub fn contains(&self, pos: Position) -> bool {
        self.body.contains(&pos)
    }

    /// True if `pos` hits any segment except the last one, which vacates
    /// its cell during the move.
    pub fn collides_ignoring_tail(&self, pos: Position) -> bool {
        self.body.iter().take(self.body.len() - 1).any(|&p| p == pos)
    }

    /// Buffer a heading for the next tick. Reversing onto the current heading
    /// is refused; later calls overwrite earlier ones.
    pub fn set_next_direction(&mut self, direction: Direction) -> bool {
        if self.direction.is_opposite(direction) {
            return false;
        }
        self.next_direction = direction;
        true
    }

    pub fn apply_next_direction(&mut self) {
        self.direction = self.next_direction;
    }

    /// Where the head lands if the snake moves one step now
    pub fn next_head(&self) -> Position {
        self.head().moved_in_direction(self.direction)
    }

    pub fn push_head(&mut self, pos: Position) {
        self.body.push_front(pos);
    }

    pub fn pop_tail(&mut self) -> Option<Position> {
        if self.body.len() > 1 {
            self.body.pop_back()
        } else {
            None
        }
    }

    /// Stack `count` extra segments on the tail cell
    pub fn extend_tail(&mut self, count: usize) {
        let tail = self.tail();
        self.body.extend(std::iter::repeat(tail).take(count));
    }

    /// Remove up to `count` tail segments without going below `floor`.
    /// Returns the removed cells, tail-most first.
    pub fn shrink(&mut self, count: usize, floor: usize) -> Vec<Position> {
        let floor = floor.max(1);
        let removable = self.body.len().saturating_sub(floor).min(count);
        (0..removable).filter_map(|_| self.body.pop_back()).collect()
    }
}

/// Type of collision that occurred
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollisionType {
    /// Snake hit a wall
    Wall,
    /// Snake hit itself
    SelfCollision,
}

/// Lifecycle of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Not started yet
    Idle,
    /// Ticking
    Running,
    /// Fatal collision happened; waiting out the death animation
    Dying,
    /// Terminal; final score fixed
    GameOver,
}

/// Where and when the fatal collision happened
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Death {
    pub position: Position,
    pub cause: CollisionType,
    pub at: Instant,
}

/// Complete game state
#[derive(Debug, Clone)]
pub struct GameState {
    pub snake: Snake,
    /// Primary food; `None` only transiently or on a full board
    pub food: Option<Food>,
    /// Bonus normal food that appears together with a heart
    pub extra_food: Option<Food>,
    pub grid_width: usize,
    pub grid_height: usize,
    pub score: u32,
    pub lives: u32,
    pub steps: u32,
    pub tier: Tier,
    pub phase: Phase,
    pub death: Option<Death>,
    /// Interval the game loop currently waits between ticks
    pub tick_interval: Duration,
    pub timers: TimerTable,
    /// Cosmetic and notification events not yet consumed by the front-end
    pub events: Vec<GameEvent>,
}

impl GameState {
    /// Create a new game state
    pub fn new(
        snake: Snake,
        food: Option<Food>,
        grid_width: usize,
        grid_height: usize,
        tick_interval: Duration,
    ) -> Self {
        Self {
            snake,
            food,
            extra_food: None,
            grid_width,
            grid_height,
            score: 0,
            lives: 0,
            steps: 0,
            tier: Tier::Basic,
            phase: Phase::Idle,
            death: None,
            tick_interval,
            timers: TimerTable::new(),
            events: Vec::new(),
        }
    }

    /// Check if a position is within the grid bounds
    pub fn is_in_bounds(&self, pos: Position) -> bool {
        pos.x >= 0
            && pos.x < self.grid_width as i32
            && pos.y >= 0
            && pos.y < self.grid_height as i32
    }

    /// Check if a position is occupied by the snake
    pub fn is_occupied_by_snake(&self, pos: Position) -> bool {
        self.snake.contains(pos)
    }

    /// Snake, primary food or extra food sits on `pos`
    pub fn is_occupied(&self, pos: Position) -> bool {
        self.is_occupied_by_snake(pos)
            || self.food.is_some_and(|f| f.position == pos)
            || self.extra_food.is_some_and(|f| f.position == pos)
    }

    pub fn is_alive(&self) -> bool {
        matches!(self.phase, Phase::Idle | Phase::Running)
    }

    /// 0.0 right after death, 1.0 once the death delay has passed
    pub fn fade_progress(&self, now: Instant, delay: Duration) -> f32 {
        let Some(death) = self.death else {
            return 0.0;
        };
        if delay.is_zero() {
            return 1.0;
        }
        let elapsed = now.saturating_duration_since(death.at);
        (elapsed.as_secs_f32() / delay.as_secs_f32()).min(1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_movement() {
        let pos = Position::new(5, 5);
        assert_eq!(pos.moved_by(1, 0), Position::new(6, 5));
        assert_eq!(pos.moved_in_direction(Direction::Up), Position::new(5, 4));
        assert_eq!(pos.moved_in_direction(Direction::Down), Position::new(5, 6));
    }

    #[test]
    fn test_clamped_position() {
        assert_eq!(Position::new(-1, 4).clamped(10, 10), Position::new(0, 4));
        assert_eq!(Position::new(3, 10).clamped(10, 10), Position::new(3, 9));
    }

    #[test]
    fn test_snake_creation() {
        let snake = Snake::new(Position::new(10, 10), Direction::Right, 3);
        assert_eq!(snake.len(), 3);
        assert_eq!(snake.head(), Position::new(10, 10));
        assert_eq!(snake.body[1], Position::new(9, 10));
        assert_eq!(snake.tail(), Position::new(8, 10));
        assert_eq!(snake.next_direction, Direction::Right);
    }

    #[test]
    fn test_reverse_request_is_ignored() {
        let mut snake = Snake::new(Position::new(5, 5), Direction::Right, 3);
        assert!(!snake.set_next_direction(Direction::Left));
        assert_eq!(snake.next_direction, Direction::Right);
    }

    #[test]
    fn test_last_request_before_tick_wins() {
        let mut snake = Snake::new(Position::new(5, 5), Direction::Right, 3);
        assert!(snake.set_next_direction(Direction::Up));
        assert!(snake.set_next_direction(Direction::Down));
        assert_eq!(snake.next_direction, Direction::Down);
        snake.apply_next_direction();
        assert_eq!(snake.direction, Direction::Down);
    }

    #[test]
    fn test_opposite_checked_against_current_not_buffered() {
        let mut snake = Snake::new(Position::new(5, 5), Direction::Right, 3);
        snake.set_next_direction(Direction::Up);
        // Down reverses the buffered heading but not the current one.
        assert!(snake.set_next_direction(Direction::Down));
    }

    #[test]
    fn test_collision_ignores_tail() {
        let snake = Snake::new(Position::new(5, 5), Direction::Right, 4);
        assert!(snake.collides_ignoring_tail(Position::new(4, 5)));
        assert!(!snake.collides_ignoring_tail(Position::new(2, 5)));
        assert!(!snake.collides_ignoring_tail(Position::new(9, 9)));
    }

    #[test]
    fn test_stacked_tail_still_blocks() {
        let mut snake = Snake::new(Position::new(5, 5), Direction::Right, 3);
        snake.extend_tail(2);
        assert_eq!(snake.len(), 5);
        assert!(snake.collides_ignoring_tail(Position::new(3, 5)));
    }

    #[test]
    fn test_shrink_respects_floor() {
        let mut snake = Snake::new(Position::new(6, 5), Direction::Right, 4);
        let removed = snake.shrink(2, 3);
        assert_eq!(removed, vec![Position::new(3, 5)]);
        assert_eq!(snake.len(), 3);

        let removed = snake.shrink(2, 3);
        assert!(removed.is_empty());
        assert_eq!(snake.len(), 3);
    }

    #[test]
    fn test_pop_tail_keeps_head() {
        let mut snake = Snake::new(Position::new(5, 5), Direction::Right, 1);
        assert_eq!(snake.pop_tail(), None);
        assert_eq!(snake.len(), 1);
    }

    #[test]
    fn test_bounds_checking() {
        let state = GameState::new(
            Snake::new(Position::new(5, 5), Direction::Right, 3),
            None,
            20,
            20,
            Duration::from_millis(150),
        );

        assert!(state.is_in_bounds(Position::new(0, 0)));
        assert!(state.is_in_bounds(Position::new(19, 19)));
        assert!(!state.is_in_bounds(Position::new(-1, 0)));
        assert!(!state.is_in_bounds(Position::new(20, 0)));
        assert!(!state.is_in_bounds(Position::new(0, 20)));
    }

    #[test]
    fn test_fade_progress() {
        let mut state = GameState::new(
            Snake::new(Position::new(5, 5), Direction::Right, 3),
            None,
            20,
            20,
            Duration::from_millis(150),
        );
        let t0 = Instant::now();
        let delay = Duration::from_millis(1000);
        assert_eq!(state.fade_progress(t0, delay), 0.0);

        state.death = Some(Death {
            position: Position::new(5, 5),
            cause: CollisionType::Wall,
            at: t0,
        });
        let half = state.fade_progress(t0 + Duration::from_millis(500), delay);
        assert!((half - 0.5).abs() < 1e-3);
        assert_eq!(state.fade_progress(t0 + Duration::from_secs(3), delay), 1.0);
    }
}
