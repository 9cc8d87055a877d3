//! Built-in agents: random baseline, greedy capture, positional weights

use std::fmt;
use std::str::FromStr;

use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::agent::{Agent, AgentOutcome, Choice};
use crate::board::{Board, Coord, Side, BOARD_SIZE};
use crate::moves::captures;

// ============================================================================
// CONSTANTS
// ============================================================================

/// Square weights favouring corners and edges, penalizing cells that give
/// the opponent corner access
const SQUARE_WEIGHTS: [[i32; BOARD_SIZE]; BOARD_SIZE] = [
    [100, -20, 10, 5, 5, 10, -20, 100],
    [-20, -50, -2, -2, -2, -2, -50, -20],
    [10, -2, -1, -1, -1, -1, -2, 10],
    [5, -2, -1, -1, -1, -1, -2, 5],
    [5, -2, -1, -1, -1, -1, -2, 5],
    [10, -2, -1, -1, -1, -1, -2, 10],
    [-20, -50, -2, -2, -2, -2, -50, -20],
    [100, -20, 10, 5, 5, 10, -20, 100],
];

// ============================================================================
// AGENT KINDS
// ============================================================================

/// Built-in agent strategies
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentKind {
    Random,
    Greedy,
    Positional,
}

impl AgentKind {
    pub const ALL: [AgentKind; 3] = [AgentKind::Random, AgentKind::Greedy, AgentKind::Positional];

    /// Instantiate an agent of this kind
    pub fn build(self, name: impl Into<String>, seed: u64) -> Box<dyn Agent> {
        let name = name.into();
        match self {
            AgentKind::Random => Box::new(RandomAgent::with_seed(name, seed)),
            AgentKind::Greedy => Box::new(GreedyAgent::new(name)),
            AgentKind::Positional => Box::new(PositionalAgent::new(name)),
        }
    }
}

impl fmt::Display for AgentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AgentKind::Random => "random",
            AgentKind::Greedy => "greedy",
            AgentKind::Positional => "positional",
        };
        f.write_str(s)
    }
}

impl FromStr for AgentKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "random" => Ok(AgentKind::Random),
            "greedy" => Ok(AgentKind::Greedy),
            "positional" => Ok(AgentKind::Positional),
            other => Err(format!(
                "unknown agent kind '{}' (expected random, greedy or positional)",
                other
            )),
        }
    }
}

// ============================================================================
// RANDOM AGENT
// ============================================================================

/// Uniform pick from the legal moves
pub struct RandomAgent {
    name: String,
    rng: ChaCha8Rng,
    games: u32,
}

impl RandomAgent {
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_seed(name, 42)
    }

    pub fn with_seed(name: impl Into<String>, seed: u64) -> Self {
        Self {
            name: name.into(),
            rng: ChaCha8Rng::seed_from_u64(seed),
            games: 0,
        }
    }

    /// Games this agent has been notified about
    pub fn games_seen(&self) -> u32 {
        self.games
    }
}

impl Agent for RandomAgent {
    fn name(&self) -> &str {
        &self.name
    }

    fn select_move(&mut self, _board: &Board, _side: Side, legal: &[Coord]) -> Choice {
        match legal.choose(&mut self.rng) {
            Some(&coord) => Choice::Play(coord),
            None => Choice::NoMove,
        }
    }

    fn notify_result(&mut self, _outcome: AgentOutcome, _move_count: usize) {
        self.games += 1;
    }
}

// ============================================================================
// GREEDY AGENT
// ============================================================================

/// Maximizes immediate captures; ties go to the first move in scan order
pub struct GreedyAgent {
    name: String,
}

impl GreedyAgent {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl Agent for GreedyAgent {
    fn name(&self) -> &str {
        &self.name
    }

    fn select_move(&mut self, board: &Board, side: Side, legal: &[Coord]) -> Choice {
        best_by(legal, |&c| captures(board, c, side).len() as i32)
    }
}

// ============================================================================
// POSITIONAL AGENT
// ============================================================================

/// Static square weights plus capture count
pub struct PositionalAgent {
    name: String,
}

impl PositionalAgent {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl Agent for PositionalAgent {
    fn name(&self) -> &str {
        &self.name
    }

    fn select_move(&mut self, board: &Board, side: Side, legal: &[Coord]) -> Choice {
        best_by(legal, |&c| square_weight(c) + captures(board, c, side).len() as i32)
    }
}

fn square_weight(coord: Coord) -> i32 {
    SQUARE_WEIGHTS[coord.row as usize][coord.col as usize]
}

/// Highest-scoring move, earliest wins ties
fn best_by(legal: &[Coord], score: impl Fn(&Coord) -> i32) -> Choice {
    let mut best: Option<(Coord, i32)> = None;
    for coord in legal {
        let s = score(coord);
        match best {
            Some((_, best_score)) if best_score >= s => {}
            _ => best = Some((*coord, s)),
        }
    }
    best.map_or(Choice::NoMove, |(coord, _)| Choice::Play(coord))
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::moves::legal_moves;

    #[test]
    fn test_random_agent_picks_legal() {
        let board = Board::new();
        let legal = legal_moves(&board, Side::A);
        let mut agent = RandomAgent::with_seed("r", 3);
        for _ in 0..20 {
            match agent.select_move(&board, Side::A, &legal) {
                Choice::Play(c) => assert!(legal.contains(&c)),
                Choice::NoMove => panic!("random agent declined with moves available"),
            }
        }
    }

    #[test]
    fn test_random_agent_deterministic_with_seed() {
        let board = Board::new();
        let legal = legal_moves(&board, Side::A);
        let mut a = RandomAgent::with_seed("a", 99);
        let mut b = RandomAgent::with_seed("b", 99);
        for _ in 0..10 {
            assert_eq!(
                a.select_move(&board, Side::A, &legal),
                b.select_move(&board, Side::A, &legal)
            );
        }
    }

    #[test]
    fn test_greedy_prefers_bigger_capture() {
        let board: Board = "
            ........
            ........
            ........
            ...BBBA.
            ...A....
            ..B.....
            ........
            ........
        "
        .parse()
        .unwrap();
        let legal = legal_moves(&board, Side::A);
        let mut agent = GreedyAgent::new("g");
        assert_eq!(
            agent.select_move(&board, Side::A, &legal),
            Choice::Play(Coord::new(3, 2))
        );
    }

    #[test]
    fn test_positional_takes_corner() {
        // (3,5) captures three and comes first in scan order, (7,7) captures one
        let board: Board = "
            ........
            ........
            ........
            .ABBB...
            ........
            .....A..
            ......B.
            ........
        "
        .parse()
        .unwrap();
        let legal = legal_moves(&board, Side::A);
        assert_eq!(legal, vec![Coord::new(3, 5), Coord::new(7, 7)]);

        let mut positional = PositionalAgent::new("p");
        assert_eq!(
            positional.select_move(&board, Side::A, &legal),
            Choice::Play(Coord::new(7, 7))
        );
        let mut greedy = GreedyAgent::new("g");
        assert_eq!(
            greedy.select_move(&board, Side::A, &legal),
            Choice::Play(Coord::new(3, 5))
        );
    }

    #[test]
    fn test_agent_kind_parse() {
        assert_eq!("Greedy".parse::<AgentKind>(), Ok(AgentKind::Greedy));
        assert!("minimax".parse::<AgentKind>().is_err());
        for kind in AgentKind::ALL {
            assert_eq!(kind.to_string().parse::<AgentKind>(), Ok(kind));
            assert_eq!(kind.build("x", 1).name(), "x");
        }
    }
}
