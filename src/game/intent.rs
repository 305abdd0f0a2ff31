//! Frame-to-tick intent handoff.
//!
//! The input side samples once per rendered frame and the simulation consumes
//! once per physics tick, at unrelated rates. Samples travel over a crossbeam
//! channel; the receiving side keeps the newest move and crouch values, sums
//! look deltas and latches the jump edge until a tick consumes them.

use crossbeam_channel::{Receiver, Sender};
use serde::{Deserialize, Serialize};

use super::movement::{IntentSnapshot, Vec2};

/// One frame's worth of input, as produced by an input adapter.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct IntentSample {
    /// Planar move input (x = strafe, y = forward)
    pub move_input: [f32; 2],
    /// Look delta since the previous sample (x = yaw, y = pitch)
    pub look: [f32; 2],
    /// Jump was pressed this frame
    pub jump: bool,
    pub crouch: bool,
}

impl IntentSample {
    /// Move input clamped to the unit disc.
    fn clamped_move(&self) -> Vec2 {
        let v = Vec2::from(self.move_input);
        let len = v.norm();
        if len > 1.0 {
            v / len
        } else {
            v
        }
    }
}

/// Frame side of the intent buffer.
#[derive(Debug, Clone)]
pub struct IntentSender {
    tx: Sender<IntentSample>,
}

impl IntentSender {
    /// Queue a sample. Returns false once the receiving simulation is gone.
    pub fn submit(&self, sample: IntentSample) -> bool {
        self.tx.send(sample).is_ok()
    }
}

/// Tick side of the intent buffer.
#[derive(Debug)]
pub struct IntentReceiver {
    rx: Receiver<IntentSample>,
    current: IntentSnapshot,
}

/// Create a connected sender/receiver pair.
pub fn intent_channel() -> (IntentSender, IntentReceiver) {
    let (tx, rx) = crossbeam_channel::unbounded();
    (
        IntentSender { tx },
        IntentReceiver {
            rx,
            current: IntentSnapshot::default(),
        },
    )
}

impl IntentReceiver {
    /// Drain pending samples and return the snapshot for this tick.
    ///
    /// Move and crouch come from the most recent sample and carry over to
    /// ticks with nothing pending. Look deltas add up until
    /// [`Self::consume_look`], and the jump flag stays set from any drained
    /// sample until [`Self::consume_jump`].
    pub fn latest(&mut self) -> IntentSnapshot {
        while let Ok(sample) = self.rx.try_recv() {
            self.current.move_input = sample.clamped_move();
            self.current.look += Vec2::from(sample.look);
            self.current.crouch_held = sample.crouch;
            self.current.jump_pressed |= sample.jump;
        }
        self.current
    }

    /// Clear the jump edge after a tick has read it.
    pub fn consume_jump(&mut self) {
        self.current.jump_pressed = false;
    }

    /// Drop the look delta a tick has applied.
    pub fn consume_look(&mut self) {
        self.current.look = Vec2::zeros();
    }
}
