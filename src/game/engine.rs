use std::collections::HashSet;

use rand::{SeedableRng, rngs::StdRng, seq::IteratorRandom};
use tracing::{debug, info};

use super::{
    action::Direction,
    config::GameConfig,
    error::GameError,
    snapshot::RenderSnapshot,
    state::{EndReason, Position, Snake},
};

/// Information about a step
#[derive(Debug, Clone, PartialEq)]
pub struct StepInfo {
    /// Whether the snake ate food this step
    pub ate_food: bool,
    /// Set on the step that ended the game
    pub end_reason: Option<EndReason>,
}

/// Result of a game step
#[derive(Debug, Clone, PartialEq)]
pub struct StepResult {
    /// Points added to the score by this step
    pub score_gained: u32,
    /// Whether the game is over after this step
    pub terminated: bool,
    /// Additional information about the step
    pub info: StepInfo,
}

impl StepResult {
    fn inert() -> Self {
        Self {
            score_gained: 0,
            terminated: true,
            info: StepInfo {
                ate_food: false,
                end_reason: None,
            },
        }
    }
}

/// Owns the whole simulation: snake, food, score and the game-over flag.
///
/// The engine only changes state when told to. Once the game is over every
/// further [`step`](GameEngine::step) is a no-op, and the instance is retired
/// with [`destroy`](GameEngine::destroy) rather than reset.
#[derive(Debug)]
pub struct GameEngine {
    width: usize,
    height: usize,
    food_reward: u32,
    snake: Snake,
    pending_direction: Option<Direction>,
    food: Position,
    score: u32,
    end_reason: Option<EndReason>,
    rng: StdRng,
}

impl GameEngine {
    /// Create a game seeded from OS entropy
    pub fn new(config: &GameConfig) -> Result<Self, GameError> {
        Self::with_rng(config, StdRng::from_entropy())
    }

    /// Create a game whose food placement is reproducible
    pub fn with_seed(config: &GameConfig, seed: u64) -> Result<Self, GameError> {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }

    fn with_rng(config: &GameConfig, mut rng: StdRng) -> Result<Self, GameError> {
        config.validate()?;

        let head = Position::new(
            (config.grid_width / 2) as i32,
            (config.grid_height / 2) as i32,
        );
        let snake = Snake::new(head, Direction::Right, config.initial_snake_length);

        let (food, end_reason) =
            match spawn_food(&snake, config.grid_width, config.grid_height, &mut rng) {
                Some(food) => (food, None),
                None => (head, Some(EndReason::GridFull)),
            };

        info!(
            width = config.grid_width,
            height = config.grid_height,
            snake_length = snake.len(),
            "game engine created"
        );

        Ok(Self {
            width: config.grid_width,
            height: config.grid_height,
            food_reward: config.food_reward,
            snake,
            pending_direction: None,
            food,
            score: 0,
            end_reason,
            rng,
        })
    }

    /// Request a turn for the next step.
    ///
    /// Only the latest accepted request is applied. A reversal onto the body
    /// (opposite of the current heading with more than one segment) is
    /// ignored, as is any request after the game ended.
    pub fn queue_direction(&mut self, direction: Direction) -> bool {
        if self.is_game_over() {
            return false;
        }
        if self.snake.len() > 1 && self.snake.direction().is_opposite(direction) {
            debug!(?direction, "ignoring reversal");
            return false;
        }

        self.pending_direction = Some(direction);
        true
    }

    /// Advance the simulation by one tick
    pub fn step(&mut self) -> StepResult {
        if self.is_game_over() {
            return StepResult::inert();
        }

        if let Some(direction) = self.pending_direction.take() {
            self.snake.set_direction(direction);
        }

        let new_head = self.snake.head().moved_in_direction(self.snake.direction());

        if !self.is_in_bounds(new_head) {
            return self.finish(EndReason::Wall, false, 0);
        }

        let ate_food = new_head == self.food;
        if self.snake.would_collide(new_head, ate_food) {
            return self.finish(EndReason::SelfCollision, false, 0);
        }

        self.snake.advance(new_head, ate_food);

        if !ate_food {
            return StepResult {
                score_gained: 0,
                terminated: false,
                info: StepInfo {
                    ate_food: false,
                    end_reason: None,
                },
            };
        }

        self.score += self.food_reward;
        debug!(score = self.score, length = self.snake.len(), "food eaten");

        match spawn_food(&self.snake, self.width, self.height, &mut self.rng) {
            Some(food) => {
                self.food = food;
                StepResult {
                    score_gained: self.food_reward,
                    terminated: false,
                    info: StepInfo {
                        ate_food: true,
                        end_reason: None,
                    },
                }
            }
            None => self.finish(EndReason::GridFull, true, self.food_reward),
        }
    }

    fn finish(&mut self, reason: EndReason, ate_food: bool, score_gained: u32) -> StepResult {
        self.end_reason = Some(reason);
        self.pending_direction = None;
        info!(?reason, score = self.score, length = self.snake.len(), "game over");

        StepResult {
            score_gained,
            terminated: true,
            info: StepInfo {
                ate_food,
                end_reason: Some(reason),
            },
        }
    }

    fn is_in_bounds(&self, pos: Position) -> bool {
        pos.x >= 0 && pos.x < self.width as i32 && pos.y >= 0 && pos.y < self.height as i32
    }

    pub fn is_game_over(&self) -> bool {
        self.end_reason.is_some()
    }

    pub fn end_reason(&self) -> Option<EndReason> {
        self.end_reason
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn direction(&self) -> Direction {
        self.snake.direction()
    }

    pub fn snake_len(&self) -> usize {
        self.snake.len()
    }

    /// Body cells at the time of the call, head first
    pub fn snake_cells(&self) -> Vec<Position> {
        self.snake.cells()
    }

    /// Last placed food; carries no meaning once the game is over
    pub fn food_position(&self) -> Position {
        self.food
    }

    /// Everything a renderer needs for one frame
    pub fn snapshot(&self) -> RenderSnapshot {
        RenderSnapshot {
            width: self.width,
            height: self.height,
            snake: self.snake_cells(),
            food: self.food,
            score: self.score,
            game_over: self.is_game_over(),
            end_reason: self.end_reason,
        }
    }

    /// Retire this engine. Taking `self` by value rules out any later use.
    pub fn destroy(self) {
        debug!(
            score = self.score,
            game_over = self.is_game_over(),
            "game engine destroyed"
        );
    }
}

/// Pick a uniformly random cell not covered by the snake
fn spawn_food(snake: &Snake, width: usize, height: usize, rng: &mut StdRng) -> Option<Position> {
    let occupied: HashSet<Position> = snake.iter().copied().collect();

    (0..height as i32)
        .flat_map(|y| (0..width as i32).map(move |x| Position::new(x, y)))
        .filter(|pos| !occupied.contains(pos))
        .choose(rng)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine_20x20() -> GameEngine {
        let mut engine = GameEngine::with_seed(&GameConfig::default(), 7).unwrap();
        engine.food = Position::new(15, 10);
        engine
    }

    fn assert_body_valid(engine: &GameEngine) {
        let cells = engine.snake_cells();
        assert!(!cells.is_empty());
        for pair in cells.windows(2) {
            assert!(pair[0].is_adjacent(pair[1]), "gap between {:?}", pair);
        }
        let unique: HashSet<_> = cells.iter().collect();
        assert_eq!(unique.len(), cells.len());
    }

    #[test]
    fn test_new_game() {
        let engine = GameEngine::with_seed(&GameConfig::default(), 1).unwrap();

        assert!(!engine.is_game_over());
        assert_eq!(engine.score(), 0);
        assert_eq!(engine.width(), 20);
        assert_eq!(engine.height(), 20);
        assert_eq!(engine.direction(), Direction::Right);
        assert_eq!(
            engine.snake_cells(),
            vec![
                Position::new(10, 10),
                Position::new(9, 10),
                Position::new(8, 10)
            ]
        );
        assert!(!engine.snake_cells().contains(&engine.food_position()));
    }

    #[test]
    fn test_invalid_dimensions() {
        let err = GameEngine::new(&GameConfig::new(3, 20)).unwrap_err();
        assert!(matches!(err, GameError::InvalidDimensions { width: 3, .. }));
        assert!(GameEngine::new(&GameConfig::new(20, 2)).is_err());
    }

    #[test]
    fn test_huge_width_rejected_instead_of_wrapping() {
        let config = GameConfig::new(i32::MAX as usize + 9, 8);
        let err = GameEngine::with_seed(&config, 0).unwrap_err();
        assert!(matches!(err, GameError::InvalidDimensions { height: 8, .. }));
    }

    #[test]
    fn test_largest_grid_starts_on_board() {
        let size = crate::game::MAX_GRID_SIZE;
        let mut engine = GameEngine::with_seed(&GameConfig::new(size, size), 4).unwrap();
        let half = (size / 2) as i32;

        assert_eq!(engine.snake_cells()[0], Position::new(half, half));
        engine.food = Position::new(0, 0);
        let result = engine.step();
        assert!(!result.terminated);
        assert_eq!(engine.snake_cells()[0], Position::new(half + 1, half));
    }

    #[test]
    fn test_food_never_on_snake_for_many_seeds() {
        for seed in 0..200 {
            let engine = GameEngine::with_seed(&GameConfig::new(4, 4), seed).unwrap();
            assert!(!engine.snake_cells().contains(&engine.food_position()));
        }
    }

    #[test]
    fn test_same_seed_same_food() {
        let a = GameEngine::with_seed(&GameConfig::default(), 42).unwrap();
        let b = GameEngine::with_seed(&GameConfig::default(), 42).unwrap();
        assert_eq!(a.food_position(), b.food_position());
    }

    #[test]
    fn test_straight_movement() {
        let mut engine = engine_20x20();

        for expected_x in [11, 12, 13] {
            let result = engine.step();
            assert!(!result.terminated);
            assert!(!result.info.ate_food);
            assert_eq!(engine.snake_cells()[0], Position::new(expected_x, 10));
        }

        assert_eq!(engine.snake_len(), 3);
        assert_eq!(engine.score(), 0);
        assert_body_valid(&engine);
    }

    #[test]
    fn test_queued_turn_applies_on_next_step() {
        let mut engine = engine_20x20();

        assert!(engine.queue_direction(Direction::Down));
        // Not applied until the step runs.
        assert_eq!(engine.direction(), Direction::Right);

        engine.step();
        assert_eq!(engine.direction(), Direction::Down);
        assert_eq!(engine.snake_cells()[0], Position::new(10, 11));
    }

    #[test]
    fn test_latest_queued_direction_wins() {
        let mut engine = engine_20x20();

        engine.queue_direction(Direction::Up);
        engine.queue_direction(Direction::Down);
        engine.step();

        assert_eq!(engine.snake_cells()[0], Position::new(10, 11));
    }

    #[test]
    fn test_prevent_180_degree_turn() {
        let mut engine = engine_20x20();

        assert!(!engine.queue_direction(Direction::Left));
        engine.step();

        assert_eq!(engine.direction(), Direction::Right);
        assert_eq!(engine.snake_cells()[0], Position::new(11, 10));
    }

    #[test]
    fn test_rejected_reversal_keeps_earlier_pending_turn() {
        let mut engine = engine_20x20();

        assert!(engine.queue_direction(Direction::Up));
        assert!(!engine.queue_direction(Direction::Left));
        engine.step();

        assert_eq!(engine.direction(), Direction::Up);
    }

    #[test]
    fn test_single_segment_may_reverse() {
        let mut config = GameConfig::default();
        config.initial_snake_length = 1;
        let mut engine = GameEngine::with_seed(&config, 3).unwrap();
        engine.food = Position::new(0, 0);

        assert!(engine.queue_direction(Direction::Left));
        let result = engine.step();

        assert!(!result.terminated);
        assert_eq!(engine.snake_cells(), vec![Position::new(9, 10)]);
    }

    #[test]
    fn test_food_consumption() {
        let mut engine = engine_20x20();
        engine.food = Position::new(11, 10);

        let result = engine.step();

        assert!(result.info.ate_food);
        assert_eq!(result.score_gained, 1);
        assert_eq!(engine.score(), 1);
        assert_eq!(engine.snake_len(), 4);
        assert_eq!(engine.snake_cells()[0], Position::new(11, 10));
        assert!(!engine.snake_cells().contains(&engine.food_position()));
        assert_body_valid(&engine);
    }

    #[test]
    fn test_custom_food_reward() {
        let mut config = GameConfig::default();
        config.food_reward = 10;
        let mut engine = GameEngine::with_seed(&config, 5).unwrap();
        engine.food = Position::new(11, 10);

        engine.step();
        assert_eq!(engine.score(), 10);
    }

    #[test]
    fn test_wall_collision_right() {
        let mut engine = engine_20x20();
        engine.food = Position::new(0, 0);

        // Head starts at x=10; the tenth step would reach x=20.
        for _ in 0..9 {
            assert!(!engine.step().terminated);
        }
        let result = engine.step();

        assert!(result.terminated);
        assert_eq!(result.info.end_reason, Some(EndReason::Wall));
        assert!(engine.is_game_over());
        assert_eq!(engine.snake_cells()[0], Position::new(19, 10));
    }

    #[test]
    fn test_wall_collision_left() {
        let mut engine = engine_20x20();
        engine.food = Position::new(19, 19);

        engine.queue_direction(Direction::Up);
        engine.step();
        engine.queue_direction(Direction::Left);
        for _ in 0..10 {
            engine.step();
        }
        assert!(!engine.is_game_over());
        assert_eq!(engine.snake_cells()[0].x, 0);

        let result = engine.step();
        assert_eq!(result.info.end_reason, Some(EndReason::Wall));
    }

    #[test]
    fn test_self_collision() {
        let mut config = GameConfig::small();
        config.initial_snake_length = 5;
        let mut engine = GameEngine::with_seed(&config, 9).unwrap();
        engine.food = Position::new(0, 0);
        // Body: (5,5) (4,5) (3,5) (2,5) (1,5)

        engine.queue_direction(Direction::Down);
        engine.step(); // (5,6)
        engine.queue_direction(Direction::Left);
        engine.step(); // (4,6)
        engine.queue_direction(Direction::Up);
        let result = engine.step(); // (4,5) is still body

        assert!(result.terminated);
        assert_eq!(result.info.end_reason, Some(EndReason::SelfCollision));
        assert_eq!(engine.end_reason(), Some(EndReason::SelfCollision));
    }

    #[test]
    fn test_chasing_tail_is_allowed() {
        let mut config = GameConfig::small();
        config.initial_snake_length = 4;
        let mut engine = GameEngine::with_seed(&config, 11).unwrap();
        engine.food = Position::new(0, 0);
        // Body: (5,5) (4,5) (3,5) (2,5); loop around a 2x2 square.

        engine.step(); // (6,5) (5,5) (4,5) (3,5)
        engine.queue_direction(Direction::Down);
        engine.step(); // (6,6) (6,5) (5,5) (4,5)
        engine.queue_direction(Direction::Left);
        engine.step(); // (5,6) (6,6) (6,5) (5,5)
        engine.queue_direction(Direction::Up);
        let result = engine.step(); // onto (5,5), the tail being vacated

        assert!(!result.terminated);
        assert_eq!(engine.snake_cells()[0], Position::new(5, 5));
        assert_body_valid(&engine);
    }

    #[test]
    fn test_growing_into_tail_collides() {
        let mut config = GameConfig::small();
        config.initial_snake_length = 4;
        let mut engine = GameEngine::with_seed(&config, 11).unwrap();
        engine.food = Position::new(0, 0);

        engine.step();
        engine.queue_direction(Direction::Down);
        engine.step();
        engine.queue_direction(Direction::Left);
        engine.step();
        // Food can never sit on the body; force the growth case directly.
        engine.food = Position::new(5, 5);
        engine.queue_direction(Direction::Up);
        let result = engine.step();

        assert_eq!(result.info.end_reason, Some(EndReason::SelfCollision));
    }

    #[test]
    fn test_terminated_game_no_update() {
        let mut engine = engine_20x20();
        engine.food = Position::new(0, 0);
        while !engine.step().terminated {}

        let cells = engine.snake_cells();
        let food = engine.food_position();
        let score = engine.score();

        for _ in 0..5 {
            let result = engine.step();
            assert!(result.terminated);
            assert_eq!(result.info.end_reason, None);
        }
        assert!(!engine.queue_direction(Direction::Up));
        assert_eq!(engine.snake_cells(), cells);
        assert_eq!(engine.food_position(), food);
        assert_eq!(engine.score(), score);
    }

    #[test]
    fn test_grid_full_ends_game() {
        let mut config = GameConfig::new(4, 4);
        config.initial_snake_length = 1;
        let mut engine = GameEngine::with_seed(&config, 0).unwrap();

        // A snake covering 15 of 16 cells, head next to the only free one.
        let head_first = [
            (0, 1),
            (0, 2),
            (0, 3),
            (1, 3),
            (2, 3),
            (3, 3),
            (3, 2),
            (2, 2),
            (1, 2),
            (1, 1),
            (2, 1),
            (3, 1),
            (3, 0),
            (2, 0),
            (1, 0),
        ];
        let mut cells = head_first.iter().rev().map(|&(x, y)| Position::new(x, y));
        let mut snake = Snake::new(cells.next().unwrap(), Direction::Up, 1);
        for cell in cells {
            snake.advance(cell, true);
        }
        snake.set_direction(Direction::Up);
        engine.snake = snake;
        engine.food = Position::new(0, 0);

        let result = engine.step();

        assert!(result.terminated);
        assert!(result.info.ate_food);
        assert_eq!(result.info.end_reason, Some(EndReason::GridFull));
        assert_eq!(engine.score(), 1);
        assert_eq!(engine.snake_len(), 16);
    }

    #[test]
    fn test_random_play_keeps_body_valid() {
        let mut engine = GameEngine::with_seed(&GameConfig::small(), 1234).unwrap();
        let turns = [Direction::Up, Direction::Left, Direction::Down, Direction::Right];

        for i in 0..500 {
            if i % 3 == 0 {
                engine.queue_direction(turns[(i / 3) % turns.len()]);
            }
            let before = engine.snake_len();
            let result = engine.step();
            if result.terminated {
                break;
            }
            assert_body_valid(&engine);
            assert!(!engine.snake_cells().contains(&engine.food_position()));
            let expected = if result.info.ate_food { before + 1 } else { before };
            assert_eq!(engine.snake_len(), expected);
        }
    }

    #[test]
    fn test_snapshot_is_detached() {
        let mut engine = engine_20x20();
        let snapshot = engine.snapshot();

        engine.step();

        assert_eq!(snapshot.snake[0], Position::new(10, 10));
        assert_eq!(snapshot.width, 20);
        assert_eq!(snapshot.food, Position::new(15, 10));
        assert!(!snapshot.game_over);
        assert_ne!(engine.snapshot(), snapshot);
    }
}
