//! Breadth-first searches over the belief grid.
//!
//! Both searches only ever expand into cells without a confirmed hazard.
//! `frontier_path` finds the nearest place where exploration can resume;
//! `exists_alternative` decides whether any unexplored cell is still
//! reachable from the start, which is the insolubility proof.

use crate::knowledge::KnowledgeGrid;
use std::collections::VecDeque;
use wumpus_env::Coord;

/// A visited, allowed cell with at least one allowed, unvisited neighbor.
pub fn is_frontier(knowledge: &KnowledgeGrid, at: Coord) -> bool {
    let cell = knowledge.get(at);
    if !cell.is_allowed() || !cell.visited {
        return false;
    }

    knowledge.grid().neighbors(at).any(|n| {
        let nb = knowledge.get(n);
        nb.is_allowed() && !nb.visited
    })
}

/// Shortest path (by edge count) from `from` to the nearest frontier cell.
///
/// The returned path starts with `from` and ends with the frontier cell.
/// Returns `None` if no frontier cell is reachable without crossing a
/// confirmed hazard.
pub fn frontier_path(knowledge: &KnowledgeGrid, from: Coord) -> Option<Vec<Coord>> {
    let grid = *knowledge.grid();
    let mut prev: Vec<Option<usize>> = vec![None; grid.cell_count()];
    let mut seen = vec![false; grid.cell_count()];
    let mut queue = VecDeque::new();

    seen[grid.index(from)] = true;
    queue.push_back(from);

    let mut goal = None;
    while let Some(current) = queue.pop_front() {
        if is_frontier(knowledge, current) {
            goal = Some(current);
            break;
        }

        for n in grid.neighbors(current) {
            let idx = grid.index(n);
            if seen[idx] || !knowledge.get(n).is_allowed() {
                continue;
            }
            seen[idx] = true;
            prev[idx] = Some(grid.index(current));
            queue.push_back(n);
        }
    }

    let goal = goal?;

    // Walk predecessors back to `from`
    let mut path = vec![goal];
    let mut cursor = grid.index(goal);
    while let Some(p) = prev[cursor] {
        path.push(grid.coord(p));
        cursor = p;
    }
    path.reverse();
    Some(path)
}

/// True if an unvisited cell is reachable from `start` through cells
/// without a confirmed hazard.
///
/// When this returns false, no retry can learn anything new: the map is
/// unsolvable given current knowledge.
pub fn exists_alternative(knowledge: &KnowledgeGrid, start: Coord) -> bool {
    let grid = *knowledge.grid();
    let mut seen = vec![false; grid.cell_count()];
    let mut queue = VecDeque::new();

    seen[grid.index(start)] = true;
    queue.push_back(start);

    while let Some(current) = queue.pop_front() {
        if !knowledge.get(current).visited {
            return true;
        }

        for n in grid.neighbors(current) {
            let idx = grid.index(n);
            if seen[idx] || !knowledge.get(n).is_allowed() {
                continue;
            }
            seen[idx] = true;
            queue.push_back(n);
        }
    }

    false
}
