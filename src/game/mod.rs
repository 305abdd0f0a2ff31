pub mod camera;
pub mod constants;
pub mod instance;
pub mod intent;
pub mod movement;
pub mod physics;
pub mod scenario;

use parking_lot::RwLock;
use std::ops::ControlFlow;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use tracing::warn;

use instance::{SimulationInstance, TickReport};
use intent::IntentSender;

/// Latest tick report, readable from any thread
pub type SimulationHandle = Arc<RwLock<Option<TickReport>>>;

/// Fixed-rate driver for one simulation instance.
pub struct Simulation {
    instance: SimulationInstance,
    latest: SimulationHandle,
    tick_duration: Duration,
}

impl Simulation {
    pub fn new(instance: SimulationInstance) -> (Self, SimulationHandle) {
        let latest: SimulationHandle = Arc::new(RwLock::new(None));
        let handle = Arc::clone(&latest);
        let tick_duration = Duration::from_secs_f64(1.0 / instance.config.tick_rate as f64);
        (
            Self {
                instance,
                latest,
                tick_duration,
            },
            handle,
        )
    }

    pub fn intent_sender(&self) -> IntentSender {
        self.instance.intent_sender()
    }

    /// Run up to `ticks` fixed ticks in real time and return how many ran.
    ///
    /// Each tick's report is published to the shared handle and passed to
    /// `on_tick`, which can end the run early with `ControlFlow::Break`. A tick
    /// that takes longer than its budget is logged and the next one starts
    /// immediately.
    pub fn run_for<F>(&mut self, ticks: u64, mut on_tick: F) -> u64
    where
        F: FnMut(&TickReport) -> ControlFlow<()>,
    {
        for ran in 0..ticks {
            let start = Instant::now();

            let report = self.instance.tick();
            let flow = on_tick(&report);
            *self.latest.write() = Some(report);
            if flow.is_break() {
                return ran + 1;
            }

            let elapsed = start.elapsed();
            if elapsed < self.tick_duration {
                thread::sleep(self.tick_duration - elapsed);
            } else {
                warn!(
                    tick = self.instance.tick,
                    elapsed_ms = elapsed.as_secs_f64() * 1000.0,
                    budget_ms = self.tick_duration.as_secs_f64() * 1000.0,
                    "tick overran its budget"
                );
            }
        }
        ticks
    }
}
