//! JSON request/response shapes exchanged with the boundary layer, plus a
//! handler per operation so transports stay thin translation code.

use serde::{Deserialize, Serialize};

use crate::error::MazeError;
use crate::grid::{Grid, Position};
use crate::qlearning::{self, TrainerConfig};
use crate::search;
use crate::{generator, search::Strategy};

#[derive(Debug, Clone, Deserialize)]
pub struct GenerateRequest {
    pub start: Position,
    pub end: Position,
    /// Side length of the square maze; must be odd and at least 5.
    pub size: usize,
    #[serde(default)]
    pub seed: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerateResponse {
    /// Rows of 0 (passage) / 1 (wall); start and end already forced open.
    pub maze: Vec<Vec<u8>>,
}

pub fn generate(request: &GenerateRequest) -> Result<GenerateResponse, MazeError> {
    let grid = generator::generate(
        request.size,
        request.size,
        request.start,
        request.end,
        request.seed,
    )?;
    Ok(GenerateResponse {
        maze: grid.to_matrix(),
    })
}

#[derive(Debug, Clone, Deserialize)]
pub struct SolveRequest {
    pub maze: Vec<Vec<u8>>,
    /// One of "DFS", "BFS", "Dijkstra", "A-Star".
    pub algorithm: String,
    pub start: Position,
    pub end: Position,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SolveResponse {
    /// Always ordered start to end; empty when the end is unreachable.
    pub solution: Vec<Position>,
    pub visited: Vec<Position>,
    /// Elapsed wall-clock seconds.
    pub runtime: f64,
    pub total_visited_steps: usize,
    pub solution_steps: usize,
}

pub fn solve(request: &SolveRequest) -> Result<SolveResponse, MazeError> {
    let strategy: Strategy = request.algorithm.parse()?;
    let grid = Grid::from_matrix(&request.maze)?;
    let report = search::solve(&grid, request.start, request.end, strategy)?;
    Ok(SolveResponse {
        runtime: report.elapsed.as_secs_f64(),
        total_visited_steps: report.expanded,
        solution_steps: report.path.len().saturating_sub(1),
        solution: report.path,
        visited: report.visited,
    })
}

#[derive(Debug, Clone, Deserialize)]
pub struct TrainRequest {
    pub maze: Vec<Vec<u8>>,
    pub start: Position,
    pub end: Position,
    pub episodes: usize,
    #[serde(default)]
    pub seed: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EpisodeData {
    pub episode_index: usize,
    pub total_reward: f64,
    pub visited_states: Vec<Position>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainResponse {
    pub episodes_data: Vec<EpisodeData>,
    /// Greedy rollout of the learned policy; callers check whether the
    /// last position equals the end.
    pub best_path: Vec<Position>,
}

pub fn train(request: &TrainRequest) -> Result<TrainResponse, MazeError> {
    let grid = Grid::from_matrix(&request.maze)?;
    let report = qlearning::train(
        &grid,
        request.start,
        request.end,
        request.episodes,
        &TrainerConfig::default(),
        request.seed,
    )?;
    Ok(TrainResponse {
        episodes_data: report
            .episodes
            .into_iter()
            .map(|episode| EpisodeData {
                episode_index: episode.index,
                total_reward: episode.total_reward,
                visited_states: episode.visited,
            })
            .collect(),
        best_path: report.best_path,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_generate_request_wire_shape() {
        let request: GenerateRequest = serde_json::from_value(json!({
            "start": [1, 1],
            "end": [9, 9],
            "size": 11,
        }))
        .unwrap();
        assert_eq!(request.start, Position::new(1, 1));
        assert_eq!(request.seed, None);

        let response = generate(&request).unwrap();
        assert_eq!(response.maze.len(), 11);
        assert!(response.maze.iter().all(|row| row.len() == 11));
        assert_eq!(response.maze[1][1], 0);
        assert_eq!(response.maze[9][9], 0);
        assert_eq!(response.maze[0][0], 1);
    }

    #[test]
    fn test_solve_round_trip_field_names() {
        let request: SolveRequest = serde_json::from_value(json!({
            "maze": [
                [1, 1, 1, 1, 1],
                [1, 0, 0, 0, 1],
                [1, 1, 1, 1, 1],
                [1, 1, 1, 1, 1],
                [1, 1, 1, 1, 1],
            ],
            "algorithm": "BFS",
            "start": [1, 1],
            "end": [1, 3],
        }))
        .unwrap();
        let response = solve(&request).unwrap();
        assert_eq!(response.solution_steps, 2);
        assert_eq!(response.total_visited_steps, 3);

        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["solution"], json!([[1, 1], [1, 2], [1, 3]]));
        assert_eq!(value["totalVisitedSteps"], json!(3));
        assert_eq!(value["solutionSteps"], json!(2));
        assert!(value["runtime"].as_f64().unwrap() >= 0.0);
        assert_eq!(value["visited"].as_array().unwrap().len(), 3);
    }

    #[test]
    fn test_solve_rejects_unknown_algorithm() {
        let request = SolveRequest {
            maze: vec![vec![1, 1, 1], vec![1, 0, 1], vec![1, 1, 1]],
            algorithm: "Best-First".into(),
            start: Position::new(1, 1),
            end: Position::new(1, 1),
        };
        assert_eq!(
            solve(&request),
            Err(MazeError::UnknownStrategy("Best-First".into()))
        );
    }

    #[test]
    fn test_train_response_field_names() {
        let request: TrainRequest = serde_json::from_value(json!({
            "maze": [
                [1, 1, 1, 1, 1],
                [1, 0, 0, 0, 1],
                [1, 1, 1, 1, 1],
            ],
            "start": [1, 1],
            "end": [1, 3],
            "episodes": 50,
            "seed": 4,
        }))
        .unwrap();
        let response = train(&request).unwrap();
        assert_eq!(response.episodes_data.len(), 50);

        let value = serde_json::to_value(&response).unwrap();
        let first = &value["episodesData"][0];
        assert_eq!(first["episodeIndex"], json!(0));
        assert!(first["totalReward"].is_number());
        assert!(first["visitedStates"].is_array());
        assert!(value["bestPath"].is_array());
    }

    #[test]
    fn test_train_zero_episodes_is_invalid_config() {
        let request = TrainRequest {
            maze: vec![vec![1, 1, 1], vec![1, 0, 1], vec![1, 1, 1]],
            start: Position::new(1, 1),
            end: Position::new(1, 1),
            episodes: 0,
            seed: None,
        };
        assert!(matches!(
            train(&request),
            Err(MazeError::InvalidConfig(_))
        ));
    }
}
