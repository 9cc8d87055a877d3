//! Tournament execution - concurrent double round-robin
//!
//! Level 1 - Orchestration and Level 2 - Phases

use std::collections::BTreeMap;
use std::sync::Mutex;

use othello_core::{Agent, AgentKind, CancelToken, GameRecord};
use rayon::prelude::*;

use crate::config::{ResultOrdering, TournamentConfig};
use crate::error::TournamentError;
use crate::game_runner::{lock, run_fixture, Seat};
use crate::rating::RatingTracker;
use crate::report::{AgentRecord, PairingResult, TournamentReport};
use crate::schedule::{double_round_robin, AgentHandle, Fixture};
use crate::stats::StatisticsAggregator;

struct Entrant {
    name: String,
    seat: Seat,
}

/// Registered agents plus the configuration they are played under.
///
/// Agents added with `register` stay registered across runs, so their
/// internal history accumulates over every game they play. Agents added
/// with `register_kind` are rebuilt for each fixture.
pub struct Tournament {
    config: TournamentConfig,
    entrants: Vec<Entrant>,
}

impl Tournament {
    pub fn new(config: TournamentConfig) -> Result<Self, TournamentError> {
        config.validate()?;
        Ok(Self {
            config,
            entrants: Vec::new(),
        })
    }

    pub fn config(&self) -> &TournamentConfig {
        &self.config
    }

    /// Add a long-lived agent under its display name. The instance is
    /// shared by every fixture it plays, locked per move request.
    pub fn register(&mut self, agent: Box<dyn Agent>) -> Result<AgentHandle, TournamentError> {
        let name = agent.name().to_string();
        self.enter(name, Seat::Shared(Mutex::new(agent)))
    }

    /// Add a built-in strategy, instantiated fresh for every fixture with a
    /// seed derived from the configured seed, the fixture and the handle.
    /// Standings stay reproducible under fixture ordering at any worker count.
    pub fn register_kind(&mut self, name: impl Into<String>, kind: AgentKind) -> Result<AgentHandle, TournamentError> {
        let name = name.into();
        self.enter(name.clone(), Seat::PerGame { kind, name })
    }

    fn enter(&mut self, name: String, seat: Seat) -> Result<AgentHandle, TournamentError> {
        if self.entrants.iter().any(|e| e.name == name) {
            return Err(TournamentError::DuplicateAgent(name));
        }

        let handle = AgentHandle(self.entrants.len());
        tracing::debug!(agent = %name, handle = %handle, "registered agent");
        self.entrants.push(Entrant { name, seat });
        Ok(handle)
    }

    pub fn len(&self) -> usize {
        self.entrants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entrants.is_empty()
    }

    pub fn handles(&self) -> Vec<AgentHandle> {
        (0..self.entrants.len()).map(AgentHandle).collect()
    }

    pub fn name(&self, handle: AgentHandle) -> Option<&str> {
        self.entrants.get(handle.index()).map(|e| e.name.as_str())
    }

    /// The double round-robin over every registered agent
    pub fn fixtures(&self) -> Vec<Fixture> {
        double_round_robin(self.entrants.len())
    }

    // ========================================================================
    // Level 1 - Orchestration
    // ========================================================================

    /// Play the full double round-robin
    pub fn run(&self, cancel: &CancelToken) -> Result<TournamentReport, TournamentError> {
        self.run_with(cancel, |_| {})
    }

    /// Play the full double round-robin, calling `on_result` after each
    /// game is applied (inside the critical section)
    pub fn run_with<F>(&self, cancel: &CancelToken, on_result: F) -> Result<TournamentReport, TournamentError>
    where
        F: Fn(&PairingResult) + Sync,
    {
        let fixtures = self.fixtures();
        self.run_fixtures(&fixtures, cancel, on_result)
    }

    /// Play an explicit fixture list. Every fixture is checked before the
    /// first game starts.
    pub fn run_fixtures<F>(
        &self,
        fixtures: &[Fixture],
        cancel: &CancelToken,
        on_result: F,
    ) -> Result<TournamentReport, TournamentError>
    where
        F: Fn(&PairingResult) + Sync,
    {
        self.check_fixtures(fixtures)?;

        tracing::info!(
            agents = self.entrants.len(),
            fixtures = fixtures.len(),
            workers = self.config.workers,
            ordering = ?self.config.ordering,
            "tournament started"
        );

        let ledger = Mutex::new(Ledger::new(&self.config, self.entrants.len()));
        self.play_all(fixtures, cancel, &ledger, &on_result)?;
        let ledger = ledger.into_inner().unwrap_or_else(|e| e.into_inner());

        let report = self.build_report(ledger, fixtures.len(), cancel);
        if report.cancelled {
            tracing::info!(
                played = report.games_played(),
                scheduled = report.games_scheduled,
                "tournament cancelled"
            );
        } else {
            tracing::info!(
                played = report.games_played(),
                winner = report.winner().map(|r| r.name.as_str()).unwrap_or("-"),
                "tournament finished"
            );
        }
        Ok(report)
    }

    // ========================================================================
    // Level 2 - Phases
    // ========================================================================

    fn check_fixtures(&self, fixtures: &[Fixture]) -> Result<(), TournamentError> {
        let n = self.entrants.len();
        if n < 2 {
            return Err(TournamentError::NotEnoughAgents(n));
        }
        for fixture in fixtures {
            for handle in [fixture.side_a, fixture.side_b] {
                if handle.index() >= n {
                    return Err(TournamentError::UnknownAgent(handle));
                }
            }
            if fixture.side_a == fixture.side_b {
                return Err(TournamentError::SelfPairing {
                    index: fixture.index,
                    handle: fixture.side_a,
                });
            }
        }
        Ok(())
    }

    fn play_all<F>(
        &self,
        fixtures: &[Fixture],
        cancel: &CancelToken,
        ledger: &Mutex<Ledger>,
        on_result: &F,
    ) -> Result<(), TournamentError>
    where
        F: Fn(&PairingResult) + Sync,
    {
        if self.config.workers == 1 {
            for (slot, fixture) in fixtures.iter().enumerate() {
                self.play_one(slot, fixture, cancel, ledger, on_result)?;
            }
            return Ok(());
        }

        let mut builder = rayon::ThreadPoolBuilder::new();
        if self.config.workers > 0 {
            builder = builder.num_threads(self.config.workers);
        }
        let pool = builder.build()?;

        pool.install(|| {
            fixtures
                .par_iter()
                .enumerate()
                .try_for_each(|(slot, fixture)| self.play_one(slot, fixture, cancel, ledger, on_result))
        })
    }

    // ========================================================================
    // Level 3 - Steps
    // ========================================================================

    fn play_one<F>(
        &self,
        slot: usize,
        fixture: &Fixture,
        cancel: &CancelToken,
        ledger: &Mutex<Ledger>,
        on_result: &F,
    ) -> Result<(), TournamentError>
    where
        F: Fn(&PairingResult) + Sync,
    {
        let record = if cancel.is_cancelled() {
            None
        } else {
            run_fixture(
                fixture,
                &self.entrants[fixture.side_a.index()].seat,
                &self.entrants[fixture.side_b.index()].seat,
                self.config.seed,
                cancel,
            )?
        };

        lock(ledger).submit(slot, *fixture, record, on_result);
        Ok(())
    }

    fn build_report(&self, ledger: Ledger, scheduled: usize, cancel: &CancelToken) -> TournamentReport {
        let agents = self
            .entrants
            .iter()
            .enumerate()
            .map(|(i, entrant)| {
                let handle = AgentHandle(i);
                AgentRecord::new(
                    handle,
                    entrant.name.clone(),
                    ledger.ratings.rating(handle),
                    ledger.stats.agent(handle).clone(),
                )
            })
            .collect();

        TournamentReport {
            agents,
            head_to_head: ledger.stats.head_to_head_entries(),
            cancelled: cancel.is_cancelled() && ledger.results.len() < scheduled,
            results: ledger.results,
            games_scheduled: scheduled,
        }
    }
}

// ============================================================================
// Level 4 - Shared aggregation state
// ============================================================================

/// Everything mutated by finished games. Lives behind a single mutex.
struct Ledger {
    ordering: ResultOrdering,
    ratings: RatingTracker,
    stats: StatisticsAggregator,
    results: Vec<PairingResult>,
    /// Fixture ordering: finished slots waiting for their predecessors
    pending: BTreeMap<usize, Option<(Fixture, GameRecord)>>,
    next_slot: usize,
}

impl Ledger {
    fn new(config: &TournamentConfig, agents: usize) -> Self {
        Self {
            ordering: config.ordering,
            ratings: RatingTracker::new(config.rating.clone(), agents),
            stats: StatisticsAggregator::new(agents),
            results: Vec::new(),
            pending: BTreeMap::new(),
            next_slot: 0,
        }
    }

    /// Accept the outcome of slot `slot`. `None` marks a fixture that was
    /// cancelled or never started.
    fn submit<F>(&mut self, slot: usize, fixture: Fixture, record: Option<GameRecord>, on_result: &F)
    where
        F: Fn(&PairingResult),
    {
        match self.ordering {
            ResultOrdering::Completion => {
                if let Some(record) = record {
                    self.apply(fixture, record, on_result);
                }
            }
            ResultOrdering::Fixture => {
                self.pending.insert(slot, record.map(|r| (fixture, r)));
                while let Some(entry) = self.pending.remove(&self.next_slot) {
                    if let Some((fixture, record)) = entry {
                        self.apply(fixture, record, on_result);
                    }
                    self.next_slot += 1;
                }
            }
        }
    }

    fn apply<F>(&mut self, fixture: Fixture, record: GameRecord, on_result: &F)
    where
        F: Fn(&PairingResult),
    {
        let rating_change = self
            .ratings
            .record_game(fixture.side_a, fixture.side_b, record.result);
        self.stats.record(fixture.side_a, fixture.side_b, &record);

        let result = PairingResult {
            fixture,
            record,
            rating_change,
        };
        on_result(&result);
        self.results.push(result);
    }
}
