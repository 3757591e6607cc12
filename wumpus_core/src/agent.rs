//! Decision Engine - the explorer's visit protocol and step-selection policy.
//!
//! The agent owns its position, a move stack for backtracking and the
//! belief store. It never sees the world directly; every operation takes a
//! `WorldView` and only asks it what the current cell holds.
//!
//! # Step priority
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │ 1. safe & unvisited neighbor     (push, move, visit)         │
//! │ 2. any unvisited neighbor        (push, move, visit)         │
//! │ 3. pop the move stack            (move, visit)               │
//! │ 4. one step toward the frontier  (move, visit)               │
//! │ 5. nothing left                  (episode ends: no moves)    │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! Tiers 1, 2 and 3 never select a cell with a confirmed hazard.
//!
//! # Usage
//!
//! ```ignore
//! use wumpus_core::{start_episode, AgentConfig};
//!
//! let (mut agent, first) = start_episode(&world, AgentConfig::default())?;
//! while !agent.is_ended() {
//!     agent.step(&world, &mut rng);
//! }
//! ```

use crate::error::CoreError;
use crate::geometry::Grid;
use crate::knowledge::KnowledgeGrid;
use crate::search;
use crate::sensors::{self, Percept};

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use wumpus_env::{Coord, Direction, Hazard, WorldView};

/// How to choose among equally ranked candidate cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TieBreak {
    /// Uniformly at random from the injected RNG
    #[default]
    Random,

    /// First candidate in up, down, left, right order
    FirstInOrder,
}

impl std::str::FromStr for TieBreak {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "random" => Ok(TieBreak::Random),
            "first" | "first_in_order" | "ordered" => Ok(TieBreak::FirstInOrder),
            _ => Err(format!("Unknown tie-break: {}", s)),
        }
    }
}

/// Configuration for an explorer.
#[derive(Debug, Clone)]
pub struct AgentConfig {
    /// Agent's logical name (for logging)
    pub name: String,

    /// Candidate selection in tiers 1 and 2
    pub tie_break: TieBreak,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            name: "explorer".to_string(),
            tie_break: TieBreak::Random,
        }
    }
}

/// What happened when the agent settled into a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VisitOutcome {
    /// Entered a hazard; the episode is over
    Died { at: Coord, cause: Hazard },

    /// Entered the gold cell; the episode is won
    Won { at: Coord },

    /// Safe cell, warnings sensed and recorded
    Settled { at: Coord, percept: Percept },
}

impl VisitOutcome {
    /// The cell the outcome refers to.
    pub fn at(&self) -> Coord {
        match self {
            VisitOutcome::Died { at, .. } => *at,
            VisitOutcome::Won { at } => *at,
            VisitOutcome::Settled { at, .. } => *at,
        }
    }
}

/// Which policy tier produced a move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MoveKind {
    /// Tier 1: neighbor inferred safe and not yet visited
    SafeAdvance,

    /// Tier 2: unvisited neighbor without a safety proof
    Explore,

    /// Tier 3: popped from the move stack
    Backtrack,

    /// Tier 4: first step on the path to the nearest frontier
    Frontier,

    /// Manual move requested from outside
    Manual,
}

/// Result of a single automatic step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// The episode has already ended; nothing happened
    Inactive,

    /// The agent moved and the visit protocol ran on the new cell
    Moved {
        from: Coord,
        to: Coord,
        kind: MoveKind,
        visit: VisitOutcome,
    },

    /// No tier produced a move; the episode is now ended
    NoMoves { at: Coord },
}

/// The exploring agent.
///
/// Holds everything an episode family needs: the belief store is carried
/// across retries, while position, stack and the ended flag reset.
#[derive(Debug, Clone)]
pub struct Agent {
    /// Configuration
    config: AgentConfig,

    /// Grid geometry (matches the world's size)
    grid: Grid,

    /// Fixed start cell of every attempt
    start: Coord,

    /// Current position
    position: Coord,

    /// Belief store
    knowledge: KnowledgeGrid,

    /// Prior positions for backtracking
    stack: Vec<Coord>,

    /// Episode over (death, gold or no moves)
    ended: bool,

    /// Episode over because the gold was found
    won: bool,
}

/// Creates a fresh agent for `world` and runs the initial visit.
///
/// Hazard and gold cardinality are not checked here; that belongs to
/// whoever built the map.
pub fn start_episode<W: WorldView + ?Sized>(
    world: &W,
    config: AgentConfig,
) -> Result<(Agent, VisitOutcome), CoreError> {
    let mut agent = Agent::new(world, config)?;
    let outcome = agent.visit_cell(world);
    Ok((agent, outcome))
}

impl Agent {
    /// Creates an agent at the world's start with an empty belief store.
    ///
    /// Fails on an empty grid or a start cell outside the grid. Does not
    /// visit the start cell; see [`start_episode`].
    pub fn new<W: WorldView + ?Sized>(world: &W, config: AgentConfig) -> Result<Self, CoreError> {
        let grid = Grid::for_world(world)?;
        let start = world.start();

        Ok(Self {
            config,
            grid,
            start,
            position: start,
            knowledge: KnowledgeGrid::new(grid),
            stack: Vec::new(),
            ended: false,
            won: false,
        })
    }

    /// Returns the configuration.
    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    /// Returns the grid geometry.
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Returns the fixed start cell.
    pub fn start(&self) -> Coord {
        self.start
    }

    /// Returns the current position.
    pub fn position(&self) -> Coord {
        self.position
    }

    /// Returns the belief store.
    pub fn knowledge(&self) -> &KnowledgeGrid {
        &self.knowledge
    }

    /// Returns the backtracking stack, oldest first.
    pub fn stack(&self) -> &[Coord] {
        &self.stack
    }

    /// True once the episode reached death, gold or a dead end.
    pub fn is_ended(&self) -> bool {
        self.ended
    }

    /// True if the episode ended on the gold.
    pub fn has_won(&self) -> bool {
        self.won
    }

    /// Runs the visit protocol on the current cell.
    ///
    /// Death is checked before the gold and no sensing happens on a death
    /// cell. Revisiting a safe cell re-senses and never regresses
    /// `safe_inferred` or `danger_confirmed`.
    pub fn visit_cell<W: WorldView + ?Sized>(&mut self, world: &W) -> VisitOutcome {
        let at = self.position;
        let cell = self.knowledge.get_mut(at);
        cell.visited = true;

        if let Some(cause) = world.hazard_at(at) {
            cell.died_here = true;
            cell.danger_confirmed = true;
            self.ended = true;
            self.won = false;
            return VisitOutcome::Died { at, cause };
        }

        if world.has_gold(at) {
            self.ended = true;
            self.won = true;
            return VisitOutcome::Won { at };
        }

        let percept = sensors::sense_at(&self.grid, world, at);
        cell.warning_sensed = percept.any();
        cell.breeze_flag = percept.breeze;
        cell.stench_flag = percept.stench;
        if percept.breeze {
            cell.breeze_mark = true;
        }
        if percept.stench {
            cell.stench_mark = true;
        }

        sensors::infer_safe_neighbors(&mut self.knowledge, at, percept);
        VisitOutcome::Settled { at, percept }
    }

    /// Runs one iteration of the step-selection policy.
    pub fn step<W, R>(&mut self, world: &W, rng: &mut R) -> StepOutcome
    where
        W: WorldView + ?Sized,
        R: Rng + ?Sized,
    {
        if self.ended {
            return StepOutcome::Inactive;
        }

        let from = self.position;
        let candidates: Vec<Coord> = self
            .grid
            .neighbors(from)
            .filter(|n| self.knowledge.get(*n).is_allowed())
            .collect();

        // Tier 1: provably safe progress
        let safe_new: Vec<Coord> = candidates
            .iter()
            .copied()
            .filter(|n| {
                let cell = self.knowledge.get(*n);
                cell.safe_inferred && !cell.visited
            })
            .collect();
        if let Some(to) = self.pick(&safe_new, rng) {
            return self.advance_to(world, to, MoveKind::SafeAdvance);
        }

        // Tier 2: unknown ground, still informative
        let unvisited: Vec<Coord> = candidates
            .iter()
            .copied()
            .filter(|n| !self.knowledge.get(*n).visited)
            .collect();
        if let Some(to) = self.pick(&unvisited, rng) {
            return self.advance_to(world, to, MoveKind::Explore);
        }

        // Tier 3: retrace known ground
        while let Some(back) = self.stack.pop() {
            if self.knowledge.get(back).is_allowed() {
                self.position = back;
                let visit = self.visit_cell(world);
                return StepOutcome::Moved {
                    from,
                    to: back,
                    kind: MoveKind::Backtrack,
                    visit,
                };
            }
        }

        // Tier 4: head for the nearest reachable frontier
        if let Some(path) = self.frontier_path() {
            if path.len() >= 2 {
                let to = path[1];
                self.position = to;
                let visit = self.visit_cell(world);
                return StepOutcome::Moved {
                    from,
                    to,
                    kind: MoveKind::Frontier,
                    visit,
                };
            }
        }

        // Tier 5: dead end
        self.ended = true;
        StepOutcome::NoMoves { at: from }
    }

    /// Moves one cell in `direction` on request from outside.
    ///
    /// Returns `None` without any change if the episode has ended or the
    /// target is off the grid. Known hazards are not filtered.
    pub fn move_toward<W: WorldView + ?Sized>(
        &mut self,
        world: &W,
        direction: Direction,
    ) -> Option<VisitOutcome> {
        if self.ended {
            return None;
        }
        let to = self.grid.step(self.position, direction)?;
        self.stack.push(self.position);
        self.position = to;
        Some(self.visit_cell(world))
    }

    /// Starts a new attempt that keeps everything learned so far.
    ///
    /// Clears only the per-attempt death marks, then resets position, stack
    /// and the ended flag and visits the start cell.
    pub fn retry_keeping_memory<W: WorldView + ?Sized>(&mut self, world: &W) -> VisitOutcome {
        self.knowledge.clear_attempt_marks();
        self.position = self.start;
        self.stack.clear();
        self.ended = false;
        self.won = false;
        self.visit_cell(world)
    }

    /// Puts the agent marker back on the start cell without visiting it.
    pub fn park_at_start(&mut self) {
        self.position = self.start;
    }

    /// Shortest path from the current position to the nearest frontier.
    pub fn frontier_path(&self) -> Option<Vec<Coord>> {
        search::frontier_path(&self.knowledge, self.position)
    }

    /// Whether unexplored ground is still reachable from the start.
    pub fn exists_alternative(&self) -> bool {
        search::exists_alternative(&self.knowledge, self.start)
    }

    fn pick<R: Rng + ?Sized>(&self, candidates: &[Coord], rng: &mut R) -> Option<Coord> {
        match self.config.tie_break {
            TieBreak::Random => candidates.choose(rng).copied(),
            TieBreak::FirstInOrder => candidates.first().copied(),
        }
    }

    fn advance_to<W: WorldView + ?Sized>(&mut self, world: &W, to: Coord, kind: MoveKind) -> StepOutcome {
        let from = self.position;
        self.stack.push(from);
        self.position = to;
        let visit = self.visit_cell(world);
        StepOutcome::Moved { from, to, kind, visit }
    }
}
