use tracing::{debug, trace, warn};

use super::SimulationInstance;
use crate::game::movement::velocity::JumpOutcome;

/// Executes simulation phases for one tick:
/// intent -> character motion -> physics -> bookkeeping.
pub(super) fn run_tick_phases(instance: &mut SimulationInstance, dt: f32) {
    let tick = instance.tick;

    // Newest input since the last tick, with the jump edge latched.
    let intent = instance.intent_rx.latest();

    // Character motion writes velocity and queues forces for this step.
    instance.last_jump = JumpOutcome::NotRequested;
    match instance.physics.character_view(instance.character) {
        Some(mut view) => {
            let outcome = instance
                .controller
                .tick(&mut view, &mut instance.camera, &intent);
            instance.last_jump = outcome.jump;

            match outcome.jump {
                JumpOutcome::Jumped | JumpOutcome::WallJumped => debug!(
                    tick,
                    outcome = ?outcome.jump,
                    remaining_jumps = instance.controller.body().remaining_jumps,
                    "jump"
                ),
                JumpOutcome::Denied => trace!(tick, "jump denied, no budget"),
                JumpOutcome::NotRequested => {}
            }
        }
        None => warn!(tick, "character body missing, skipping movement"),
    }

    // The edge is spent whether or not a jump happened.
    instance.intent_rx.consume_jump();
    instance.intent_rx.consume_look();

    // Step physics; forces added above act for this step only.
    instance.physics.step(dt);

    instance.tick += 1;
}
