//! Grid algorithm engine: maze generation, multi-strategy pathfinding
//! (DFS, BFS, Dijkstra, A*), and tabular Q-learning over rectangular
//! grids.
//!
//! Every invocation is a self-contained synchronous computation over data
//! it exclusively owns; callers that need timeouts pass a deadline to the
//! `*_until` variants, which check it cooperatively between expansions or
//! training steps. Given a fixed seed, generation, search, and training
//! are fully deterministic.

pub mod contract;
pub mod error;
pub mod generator;
pub mod grid;
pub mod qlearning;
pub mod search;

pub use error::MazeError;
pub use grid::{Cell, Direction, Grid, Position};
pub use qlearning::{Episode, QTable, TrainReport, TrainerConfig};
pub use search::{SolveReport, Strategy};
