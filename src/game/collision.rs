//! Classifies a proposed head position before the snake moves.

use super::state::{CollisionType, GameState, Position};

/// Which food item a move lands on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FoodSlot {
    Primary,
    Extra,
}

/// Outcome of moving the head to a cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    Collision(CollisionType),
    Food(FoodSlot),
    Empty,
}

/// Check the proposed head against walls, the body (minus the vacating tail)
/// and the food items, in that order.
pub fn classify(state: &GameState, proposed: Position) -> MoveOutcome {
    if !state.is_in_bounds(proposed) {
        return MoveOutcome::Collision(CollisionType::Wall);
    }

    if state.snake.collides_ignoring_tail(proposed) {
        return MoveOutcome::Collision(CollisionType::SelfCollision);
    }

    if state.food.is_some_and(|f| f.is_at(proposed)) {
        return MoveOutcome::Food(FoodSlot::Primary);
    }

    if state.extra_food.is_some_and(|f| f.is_at(proposed)) {
        return MoveOutcome::Food(FoodSlot::Extra);
    }

    MoveOutcome::Empty
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::action::Direction;
    use crate::game::food::{Food, FoodKind};
    use crate::game::state::Snake;
    use std::time::{Duration, Instant};

    fn state_with(snake: Snake) -> GameState {
        GameState::new(snake, None, 10, 10, Duration::from_millis(150))
    }

    #[test]
    fn test_wall_hits() {
        let state = state_with(Snake::new(Position::new(5, 5), Direction::Right, 3));
        for pos in [
            Position::new(-1, 5),
            Position::new(10, 5),
            Position::new(5, -1),
            Position::new(5, 10),
        ] {
            assert_eq!(
                classify(&state, pos),
                MoveOutcome::Collision(CollisionType::Wall)
            );
        }
    }

    #[test]
    fn test_self_hit() {
        let state = state_with(Snake::new(Position::new(5, 5), Direction::Right, 4));
        assert_eq!(
            classify(&state, Position::new(4, 5)),
            MoveOutcome::Collision(CollisionType::SelfCollision)
        );
    }

    #[test]
    fn test_moving_into_tail_cell_is_legal() {
        let mut snake = Snake::new(Position::new(5, 5), Direction::Right, 4);
        // Square: head (5,5) with tail at (5,6) right beneath it.
        snake.body = [(5, 5), (4, 5), (4, 6), (5, 6)]
            .into_iter()
            .map(|(x, y)| Position::new(x, y))
            .collect();
        let state = state_with(snake);
        assert_eq!(classify(&state, Position::new(5, 6)), MoveOutcome::Empty);
    }

    #[test]
    fn test_food_slots() {
        let now = Instant::now();
        let mut state = state_with(Snake::new(Position::new(5, 5), Direction::Right, 3));
        state.food = Some(Food::new(Position::new(6, 5), FoodKind::Heart, now));
        state.extra_food = Some(Food::new(Position::new(5, 4), FoodKind::Normal, now));

        assert_eq!(
            classify(&state, Position::new(6, 5)),
            MoveOutcome::Food(FoodSlot::Primary)
        );
        assert_eq!(
            classify(&state, Position::new(5, 4)),
            MoveOutcome::Food(FoodSlot::Extra)
        );
        assert_eq!(classify(&state, Position::new(5, 6)), MoveOutcome::Empty);
    }
}
