//! Fixture generation
//!
//! Level 3 - Steps

use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque participant identifier, assigned at registration
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AgentHandle(pub(crate) usize);

impl AgentHandle {
    /// Handle for a registration index. Handles that do not match a
    /// registered agent are rejected when a fixture list is run.
    pub fn from_index(index: usize) -> Self {
        Self(index)
    }

    /// Registration index
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for AgentHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One scheduled game
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Fixture {
    /// Position in the enumeration order
    pub index: usize,
    /// Plays side A (moves first)
    pub side_a: AgentHandle,
    /// Plays side B
    pub side_b: AgentHandle,
}

/// Double round-robin: every ordered pair (i, j), i != j, once with i on
/// side A. Lexicographic on (i, j), `n * (n - 1)` fixtures.
pub fn double_round_robin(n: usize) -> Vec<Fixture> {
    let mut fixtures = Vec::with_capacity(n * n.saturating_sub(1));
    for i in 0..n {
        for j in 0..n {
            if i != j {
                fixtures.push(Fixture {
                    index: fixtures.len(),
                    side_a: AgentHandle(i),
                    side_b: AgentHandle(j),
                });
            }
        }
    }
    fixtures
}
