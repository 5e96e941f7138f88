//! The phase engine: a red/green signal driven by one background cycle
//! thread.
//!
//! The engine has a single owner. Observer threads borrow it (`&PhaseEngine`
//! is `Send`), for example through `std::thread::scope`. The cycle thread
//! only holds the shared state, so dropping the owner stops the cycle.

use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering::{AcqRel, Acquire, Release};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use log::{debug, info, trace, warn};
use uuid::Uuid;

use crate::channel::Channel;
use crate::config::CycleConfig;
use crate::error::EngineError;
use crate::phase::{AtomicPhase, Phase};

struct Shared {
    phase: AtomicPhase,
    changes: Channel<Phase>,
    running: AtomicBool,
}

pub struct PhaseEngine {
    id: Uuid,
    config: CycleConfig,
    shared: Arc<Shared>,
    started: AtomicBool,
    cycle: Mutex<Option<JoinHandle<()>>>,
}

impl PhaseEngine {
    /// An engine with the default 4-6 second phases, starting at red.
    pub fn new() -> Self {
        Self::build(CycleConfig::default())
    }

    pub fn with_config(config: CycleConfig) -> Result<Self, EngineError> {
        config.validate()?;
        Ok(Self::build(config))
    }

    fn build(config: CycleConfig) -> Self {
        Self {
            id: Uuid::new_v4(),
            config,
            shared: Arc::new(Shared {
                phase: AtomicPhase::new(Phase::Red),
                changes: Channel::new(),
                running: AtomicBool::new(false),
            }),
            started: AtomicBool::new(false),
            cycle: Mutex::new(None),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn config(&self) -> &CycleConfig {
        &self.config
    }

    /// Spawns the cycle thread. May be called once per engine.
    pub fn start(&self) -> Result<(), EngineError> {
        if self.started.swap(true, AcqRel) {
            return Err(EngineError::AlreadyStarted);
        }

        let shared = Arc::clone(&self.shared);
        let config = self.config.clone();
        let id = self.id;
        shared.running.store(true, Release);

        let spawned = thread::Builder::new()
            .name(format!("phase-cycle-{}", id.simple()))
            .spawn(move || cycle_through_phases(id, &shared, &config));

        match spawned {
            Ok(handle) => {
                *self.cycle.lock().unwrap_or_else(PoisonError::into_inner) = Some(handle);
                info!("engine {id}: phase cycle started at {}", self.current_phase());
                Ok(())
            }
            Err(e) => {
                self.shared.running.store(false, Release);
                self.started.store(false, Release);
                Err(EngineError::Spawn(e))
            }
        }
    }

    /// Signals the cycle thread to exit and joins it. Does nothing if the
    /// cycle is not running. The engine cannot be restarted afterwards.
    pub fn stop(&self) -> Result<(), EngineError> {
        self.shared.running.store(false, Release);
        let handle = self
            .cycle
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();

        match handle {
            Some(handle) => {
                handle
                    .join()
                    .map_err(|_| EngineError::CycleThreadPanicked)?;
                info!("engine {}: phase cycle stopped", self.id);
                Ok(())
            }
            None => Ok(()),
        }
    }

    pub fn is_running(&self) -> bool {
        self.shared.running.load(Acquire)
    }

    /// Snapshot of the current phase. Never blocks.
    pub fn current_phase(&self) -> Phase {
        self.shared.phase.load()
    }

    /// Blocks until a green phase is received. Runs forever if green is never
    /// published, e.g. on an engine that was never started.
    pub fn wait_for_green(&self) {
        loop {
            let phase = self.shared.changes.receive();
            if phase.is_green() {
                return;
            }
            trace!("engine {}: waiter discarded {phase}", self.id);
        }
    }

    /// Bounded [`PhaseEngine::wait_for_green`]. Returns `true` only if a green
    /// was received before `timeout` ran out. A timeout too large to put a
    /// deadline on waits like `wait_for_green`.
    pub fn wait_for_green_timeout(&self, timeout: Duration) -> bool {
        let Some(deadline) = Instant::now().checked_add(timeout) else {
            self.wait_for_green();
            return true;
        };
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.shared.changes.receive_timeout(remaining) {
                Some(Phase::Green) => return true,
                Some(Phase::Red) => trace!("engine {}: waiter discarded red", self.id),
                None => return false,
            }
        }
    }

    /// Blocks until the next phase change and returns the newest phase.
    pub fn wait_for_change(&self) -> Phase {
        self.shared.changes.receive()
    }
}

impl Default for PhaseEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for PhaseEngine {
    fn drop(&mut self) {
        if let Err(e) = self.stop() {
            warn!("engine {}: {e}", self.id);
        }
    }
}

fn cycle_through_phases(id: Uuid, shared: &Shared, config: &CycleConfig) {
    let mut rng = config.rng();
    let mut phase_started = Instant::now();
    let mut phase_duration = config.draw_phase_duration(&mut rng);

    while shared.running.load(Acquire) {
        if phase_started.elapsed() >= phase_duration {
            let next = shared.phase.load().toggled();
            // store 먼저, 그 다음 send: green 을 받은 waiter 는 green 을 읽음
            shared.phase.store(next);
            phase_started = Instant::now();
            phase_duration = config.draw_phase_duration(&mut rng);
            debug!("engine {id}: switched to {next}, next switch in {phase_duration:?}");
            shared.changes.send(next);
        }
        thread::sleep(config.poll_interval);
    }
}
