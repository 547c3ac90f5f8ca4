use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap, HashSet, VecDeque};
use std::str::FromStr;
use std::time::{Duration, Instant};

use crate::error::MazeError;
use crate::grid::{Direction, Grid, Position};

/// The pathfinding strategies the engine can run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    Dfs,
    Bfs,
    Dijkstra,
    AStar,
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Strategy::Dfs => write!(f, "Depth-First Search (DFS)"),
            Strategy::Bfs => write!(f, "Breadth-First Search (BFS)"),
            Strategy::Dijkstra => write!(f, "Dijkstra's Algorithm"),
            Strategy::AStar => write!(f, "A* Search"),
        }
    }
}

impl FromStr for Strategy {
    type Err = MazeError;

    /// Parses the wire names used by the solve contract.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "DFS" => Ok(Strategy::Dfs),
            "BFS" => Ok(Strategy::Bfs),
            "Dijkstra" => Ok(Strategy::Dijkstra),
            "A-Star" => Ok(Strategy::AStar),
            other => Err(MazeError::UnknownStrategy(other.to_string())),
        }
    }
}

/// Outcome of one solve call. An unreachable end is not an error: `path`
/// is empty and `visited` holds every reachable cell.
#[derive(Debug, Clone, PartialEq)]
pub struct SolveReport {
    /// Cells in the order they were expanded (popped from the frontier).
    pub visited: Vec<Position>,
    /// Start-to-end path, empty when the end is unreachable.
    pub path: Vec<Position>,
    /// Number of expansions; equals `visited.len()`.
    pub expanded: usize,
    pub elapsed: Duration,
}

/// A frontier entry ordered by priority, with an insertion sequence number
/// so cost ties pop in insertion order. Lower priority pops first once
/// wrapped in `Reverse`.
#[derive(PartialEq, Eq)]
struct CostCell {
    priority: usize,
    seq: u64,
    cost: usize,
    pos: Position,
    parent: Option<Position>,
}

impl Ord for CostCell {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        (self.priority, self.seq).cmp(&(other.priority, other.seq))
    }
}

impl PartialOrd for CostCell {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

/// Frontier shapes shared by the four strategies.
enum Frontier {
    Stack(Vec<(Position, Option<Position>)>),
    Queue(VecDeque<(Position, Option<Position>)>),
    Heap(BinaryHeap<Reverse<CostCell>>),
}

impl Frontier {
    fn new(strategy: Strategy) -> Self {
        match strategy {
            Strategy::Dfs => Frontier::Stack(Vec::new()),
            Strategy::Bfs => Frontier::Queue(VecDeque::new()),
            Strategy::Dijkstra | Strategy::AStar => Frontier::Heap(BinaryHeap::new()),
        }
    }

    fn pop(&mut self) -> Option<(Position, Option<Position>, usize)> {
        match self {
            Frontier::Stack(stack) => stack.pop().map(|(pos, parent)| (pos, parent, 0)),
            Frontier::Queue(queue) => queue.pop_front().map(|(pos, parent)| (pos, parent, 0)),
            Frontier::Heap(heap) => heap
                .pop()
                .map(|Reverse(cell)| (cell.pos, cell.parent, cell.cost)),
        }
    }
}

/// Runs `strategy` over `grid` from `start` to `end`.
pub fn solve(
    grid: &Grid,
    start: Position,
    end: Position,
    strategy: Strategy,
) -> Result<SolveReport, MazeError> {
    solve_until(grid, start, end, strategy, None)
}

/// As [`solve`], with a cooperative deadline checked once per expansion.
/// The boundary layer uses this to bound very large grids instead of
/// killing the computation from outside.
pub fn solve_until(
    grid: &Grid,
    start: Position,
    end: Position,
    strategy: Strategy,
    deadline: Option<Instant>,
) -> Result<SolveReport, MazeError> {
    validate_endpoints(grid, start, end)?;
    let started = Instant::now();

    let mut frontier = Frontier::new(strategy);
    let mut seq = 0u64;
    push(&mut frontier, &mut seq, start, None, 0, 0);

    // Parents are recorded when a cell is popped, so each cell's parent is
    // the cell it was actually expanded from.
    let mut parents: HashMap<Position, Position> = HashMap::new();
    let mut closed: HashSet<Position> = HashSet::new();
    // Best known cost per cell, used by Dijkstra and A* to prune pushes.
    let mut best_cost: HashMap<Position, usize> = HashMap::from([(start, 0)]);
    let mut visited: Vec<Position> = Vec::new();

    while let Some((current, parent, cost)) = frontier.pop() {
        if let Some(deadline) = deadline {
            if Instant::now() >= deadline {
                return Err(MazeError::ComputationTimeout);
            }
        }
        // The frontier may hold stale duplicates; the first pop wins.
        if !closed.insert(current) {
            continue;
        }
        if let Some(parent) = parent {
            parents.insert(current, parent);
        }
        visited.push(current);

        if current == end {
            let path = reconstruct(&parents, start, end);
            let elapsed = started.elapsed();
            tracing::debug!(
                "[solve] {} found a {}-step path, {} cells expanded",
                strategy,
                path.len().saturating_sub(1),
                visited.len()
            );
            return Ok(SolveReport {
                expanded: visited.len(),
                visited,
                path,
                elapsed,
            });
        }

        for dir in Direction::ALL {
            let Some(next) = grid.step(current, dir) else {
                continue;
            };
            if !grid.is_passage(next) || closed.contains(&next) {
                continue;
            }
            match strategy {
                Strategy::Dfs | Strategy::Bfs => {
                    push(&mut frontier, &mut seq, next, Some(current), 0, 0);
                }
                Strategy::Dijkstra | Strategy::AStar => {
                    let next_cost = cost + 1;
                    let known = best_cost.get(&next);
                    if known.is_none_or(|&c| next_cost < c) {
                        best_cost.insert(next, next_cost);
                        let priority = match strategy {
                            Strategy::AStar => next_cost + next.manhattan(&end),
                            _ => next_cost,
                        };
                        push(&mut frontier, &mut seq, next, Some(current), next_cost, priority);
                    }
                }
            }
        }
    }

    // Frontier exhausted: the end is unreachable.
    tracing::debug!(
        "[solve] {} exhausted the frontier after {} expansions, no path",
        strategy,
        visited.len()
    );
    Ok(SolveReport {
        expanded: visited.len(),
        visited,
        path: Vec::new(),
        elapsed: started.elapsed(),
    })
}

fn validate_endpoints(grid: &Grid, start: Position, end: Position) -> Result<(), MazeError> {
    for pos in [start, end] {
        if !grid.in_bounds(pos) || grid.is_boundary(pos) {
            return Err(MazeError::OutOfBounds(pos));
        }
    }
    Ok(())
}

fn push(
    frontier: &mut Frontier,
    seq: &mut u64,
    pos: Position,
    parent: Option<Position>,
    cost: usize,
    priority: usize,
) {
    match frontier {
        Frontier::Stack(stack) => stack.push((pos, parent)),
        Frontier::Queue(queue) => queue.push_back((pos, parent)),
        Frontier::Heap(heap) => {
            *seq += 1;
            heap.push(Reverse(CostCell {
                priority,
                seq: *seq,
                cost,
                pos,
                parent,
            }));
        }
    }
}

/// Walks parent links from the end back to the start, then reverses so the
/// returned path always reads start to end.
fn reconstruct(parents: &HashMap<Position, Position>, start: Position, end: Position) -> Vec<Position> {
    let mut path = vec![end];
    let mut current = end;
    while current != start {
        match parents.get(&current) {
            Some(&parent) => {
                path.push(parent);
                current = parent;
            }
            None => return Vec::new(),
        }
    }
    path.reverse();
    path
}
