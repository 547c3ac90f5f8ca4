use std::collections::HashMap;
use std::time::Instant;

use rand::Rng;

use crate::error::MazeError;
use crate::generator::get_rng;
use crate::grid::{Direction, Grid, Position};

/// Hyperparameters for a training run. `Default` gives the tuned values;
/// any field can be overridden before calling [`train`].
#[derive(Debug, Clone)]
pub struct TrainerConfig {
    /// Learning rate α.
    pub alpha: f64,
    /// Discount factor γ.
    pub gamma: f64,
    /// Initial exploration rate ε.
    pub epsilon: f64,
    /// Exploration floor ε never decays below.
    pub epsilon_min: f64,
    /// Multiplicative ε decay applied after each episode.
    pub epsilon_decay: f64,
    pub step_reward: f64,
    pub goal_reward: f64,
    /// Penalty for an action into a wall or the grid edge; the agent does
    /// not move.
    pub wall_reward: f64,
    /// Step cap per episode. `None` defaults to twice the grid area.
    pub max_steps: Option<usize>,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        TrainerConfig {
            alpha: 0.1,
            gamma: 0.9,
            epsilon: 1.0,
            epsilon_min: 0.05,
            epsilon_decay: 0.995,
            step_reward: -1.0,
            goal_reward: 100.0,
            wall_reward: -5.0,
            max_steps: None,
        }
    }
}

impl TrainerConfig {
    fn validate(&self) -> Result<(), MazeError> {
        if !(self.alpha > 0.0 && self.alpha <= 1.0) {
            return Err(MazeError::InvalidConfig(format!(
                "learning rate must be in (0, 1], got {}",
                self.alpha
            )));
        }
        if !(self.gamma >= 0.0 && self.gamma <= 1.0) {
            return Err(MazeError::InvalidConfig(format!(
                "discount factor must be in [0, 1], got {}",
                self.gamma
            )));
        }
        for (name, value) in [
            ("epsilon", self.epsilon),
            ("epsilon_min", self.epsilon_min),
            ("epsilon_decay", self.epsilon_decay),
        ] {
            if !(value >= 0.0 && value <= 1.0) {
                return Err(MazeError::InvalidConfig(format!(
                    "{name} must be in [0, 1], got {value}"
                )));
            }
        }
        Ok(())
    }

    fn step_cap(&self, grid: &Grid) -> usize {
        self.max_steps.unwrap_or(2 * grid.width() * grid.height())
    }
}

/// Action-value table with an implicit 0.0 for unseen entries. The greedy
/// policy is derived from it on demand, never stored.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QTable {
    values: HashMap<(Position, Direction), f64>,
}

impl QTable {
    pub fn get(&self, pos: Position, action: Direction) -> f64 {
        self.values.get(&(pos, action)).copied().unwrap_or(0.0)
    }

    fn update(&mut self, pos: Position, action: Direction, delta: f64) {
        *self.values.entry((pos, action)).or_insert(0.0) += delta;
    }

    /// Greedy action at `pos`. Scans `Direction::ALL` with a strict
    /// comparison, so ties break Up, Down, Left, Right.
    pub fn best_action(&self, pos: Position) -> Direction {
        let mut best = Direction::ALL[0];
        let mut best_value = self.get(pos, best);
        for action in &Direction::ALL[1..] {
            let value = self.get(pos, *action);
            if value > best_value {
                best = *action;
                best_value = value;
            }
        }
        best
    }

    /// max over actions of Q(pos, a).
    fn max_value(&self, pos: Position) -> f64 {
        Direction::ALL
            .into_iter()
            .map(|a| self.get(pos, a))
            .fold(f64::NEG_INFINITY, f64::max)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// One training rollout. Unlike a search trace, `visited` may revisit
/// cells.
#[derive(Debug, Clone, PartialEq)]
pub struct Episode {
    pub index: usize,
    pub total_reward: f64,
    pub visited: Vec<Position>,
}

/// Outcome of a training run. `best_path` is the greedy rollout from the
/// start; callers check whether its last position is the end to know if
/// the policy actually solves the maze.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainReport {
    pub episodes: Vec<Episode>,
    pub best_path: Vec<Position>,
    pub q_table: QTable,
}

/// Trains a tabular Q-learning policy over `grid`.
pub fn train(
    grid: &Grid,
    start: Position,
    end: Position,
    episode_count: usize,
    config: &TrainerConfig,
    seed: Option<u64>,
) -> Result<TrainReport, MazeError> {
    train_until(grid, start, end, episode_count, config, seed, None)
}

/// As [`train`], with a cooperative deadline checked once per step.
pub fn train_until(
    grid: &Grid,
    start: Position,
    end: Position,
    episode_count: usize,
    config: &TrainerConfig,
    seed: Option<u64>,
    deadline: Option<Instant>,
) -> Result<TrainReport, MazeError> {
    if episode_count == 0 {
        return Err(MazeError::InvalidConfig(
            "episode count must be positive".into(),
        ));
    }
    config.validate()?;
    for pos in [start, end] {
        if !grid.in_bounds(pos) || grid.is_boundary(pos) {
            return Err(MazeError::OutOfBounds(pos));
        }
    }

    let mut rng = get_rng(seed);
    let mut q_table = QTable::default();
    let mut epsilon = config.epsilon;
    let max_steps = config.step_cap(grid);
    let mut episodes = Vec::with_capacity(episode_count);

    for index in 0..episode_count {
        let mut state = start;
        let mut total_reward = 0.0;
        let mut visited = Vec::new();

        for _ in 0..max_steps {
            if let Some(deadline) = deadline {
                if Instant::now() >= deadline {
                    return Err(MazeError::ComputationTimeout);
                }
            }
            let action = if rng.random::<f64>() < epsilon {
                Direction::ALL[rng.random_range(0..Direction::ALL.len())]
            } else {
                q_table.best_action(state)
            };

            // A blocked move leaves the agent in place and costs extra.
            let (next, reward) = match grid.step(state, action) {
                Some(next) if grid.is_passage(next) => {
                    let reward = if next == end {
                        config.goal_reward
                    } else {
                        config.step_reward
                    };
                    (next, reward)
                }
                _ => (state, config.wall_reward),
            };

            visited.push(state);
            total_reward += reward;
            let old = q_table.get(state, action);
            let delta = config.alpha * (reward + config.gamma * q_table.max_value(next) - old);
            q_table.update(state, action, delta);
            state = next;

            if state == end {
                visited.push(end);
                break;
            }
        }

        epsilon = (epsilon * config.epsilon_decay).max(config.epsilon_min);
        if index % 100 == 0 {
            tracing::debug!(
                "[train] episode {} reward {:.1}, epsilon {:.3}",
                index,
                total_reward,
                epsilon
            );
        }
        episodes.push(Episode {
            index,
            total_reward,
            visited,
        });
    }

    let best_path = rollout(grid, &q_table, start, end, max_steps);
    tracing::debug!(
        "[train] finished {} episodes, greedy rollout {} steps, reached end: {}",
        episode_count,
        best_path.len().saturating_sub(1),
        best_path.last() == Some(&end)
    );
    Ok(TrainReport {
        episodes,
        best_path,
        q_table,
    })
}

/// Greedy rollout of the learned policy (ε = 0), capped at `max_steps`.
/// Stops early on a blocked greedy move so the result stays a valid step
/// sequence; it may end short of `end` when the policy is undertrained.
fn rollout(
    grid: &Grid,
    q_table: &QTable,
    start: Position,
    end: Position,
    max_steps: usize,
) -> Vec<Position> {
    let mut path = vec![start];
    let mut state = start;
    for _ in 0..max_steps {
        if state == end {
            break;
        }
        let action = q_table.best_action(state);
        match grid.step(state, action) {
            Some(next) if grid.is_passage(next) => {
                path.push(next);
                state = next;
            }
            _ => break,
        }
    }
    path
}
