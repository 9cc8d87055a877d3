//! Game runner - seats two agents and plays one fixture
//!
//! Level 3 - Step-level implementation

use std::sync::{Mutex, MutexGuard, PoisonError};

use othello_core::{
    Agent, AgentKind, AgentOutcome, Board, CancelToken, Choice, Coord, GameController, GameError, GameRecord, Side,
};

use crate::schedule::{AgentHandle, Fixture};

/// Slot holding a registered agent. Agents are long-lived and may sit in
/// several concurrent fixtures, so every call goes through the lock.
pub(crate) type AgentSlot = Mutex<Box<dyn Agent>>;

/// How a registered participant is seated for a game
pub(crate) enum Seat {
    /// One long-lived instance shared by every fixture
    Shared(AgentSlot),
    /// A built-in strategy, instantiated fresh per fixture
    PerGame { kind: AgentKind, name: String },
}

impl Seat {
    /// Agent to play one game. Per-game seats are seeded from `seed`.
    fn take(&self, seed: u64) -> Box<dyn Agent + '_> {
        match self {
            Seat::Shared(slot) => Box::new(SharedAgent::new(slot)),
            Seat::PerGame { kind, name } => kind.build(name.clone(), seed),
        }
    }
}

/// Borrowed view of an agent slot that locks per call.
///
/// The lock is never held across turns, so two fixtures sharing an agent
/// interleave their requests instead of blocking each other for a whole game.
pub(crate) struct SharedAgent<'a> {
    slot: &'a AgentSlot,
    name: String,
}

impl<'a> SharedAgent<'a> {
    pub(crate) fn new(slot: &'a AgentSlot) -> Self {
        let name = lock(slot).name().to_string();
        Self { slot, name }
    }
}

impl Agent for SharedAgent<'_> {
    fn name(&self) -> &str {
        &self.name
    }

    fn select_move(&mut self, board: &Board, side: Side, legal: &[Coord]) -> Choice {
        lock(self.slot).select_move(board, side, legal)
    }

    fn notify_result(&mut self, outcome: AgentOutcome, move_count: usize) {
        lock(self.slot).notify_result(outcome, move_count);
    }
}

/// The controller catches agent panics, which poisons the slot the guard
/// was held on. The agent keeps playing.
pub(crate) fn lock<T: ?Sized>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Fallback-policy seed for one fixture
pub fn fixture_seed(base: u64, fixture: &Fixture) -> u64 {
    base.wrapping_add((fixture.index as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15))
}

/// Seed for a per-game agent instance in one fixture
pub fn agent_seed(base: u64, fixture: &Fixture, handle: AgentHandle) -> u64 {
    fixture_seed(base, fixture) ^ (handle.index() as u64 + 1).wrapping_mul(0xBF58_476D_1CE4_E5B9)
}

/// Play `fixture` to completion. `Ok(None)` if cancelled mid-game.
pub(crate) fn run_fixture(
    fixture: &Fixture,
    seat_a: &Seat,
    seat_b: &Seat,
    base_seed: u64,
    cancel: &CancelToken,
) -> Result<Option<GameRecord>, GameError> {
    let mut a = seat_a.take(agent_seed(base_seed, fixture, fixture.side_a));
    let mut b = seat_b.take(agent_seed(base_seed, fixture, fixture.side_b));

    tracing::debug!(
        fixture = fixture.index,
        side_a = a.name(),
        side_b = b.name(),
        "fixture started"
    );

    let game = GameController::new(fixture_seed(base_seed, fixture));
    let record = game.run(a.as_mut(), b.as_mut(), cancel)?;

    match &record {
        Some(record) => tracing::debug!(
            fixture = fixture.index,
            result = ?record.result,
            pieces_a = record.side_a.pieces,
            pieces_b = record.side_b.pieces,
            "fixture finished"
        ),
        None => tracing::debug!(fixture = fixture.index, "fixture cancelled mid-game"),
    }

    Ok(record)
}
