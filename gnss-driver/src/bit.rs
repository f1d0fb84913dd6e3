//! BIT sub-state machine (§4.4): comms, dynamics, interference, antenna.
//! Reused as-is by PBIT, CBIT and IBIT — each just runs a fresh `BitRun`
//! and reads back `BitOutcome` once it leaves `Running`.

use gnss_core::inventory::{AntennaPower, AntennaStatus, ReceiverInventory};
use gnss_core::pending::{CommandKind, PendingCommandSet};

use crate::codec::Event;
use crate::requests;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    CommsCheck,
    DynamicsCheck,
    InterferenceCheck,
    AntennaCheck,
    Success,
    Failure,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BitOutcome {
    Running,
    Success,
    Failure,
}

/// Policy for AntennaCheck. §9 Open Question (a): the original source left
/// the intended predicate commented out and always proceeded to Success.
/// This driver applies the spec's stated intent by default — pass only on
/// `AntennaStatus::Ok` and `AntennaPower::On` — and keeps the permissive
/// behavior available for a deployment that needs the old tolerance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AntennaPolicy {
    RequireOkAndOn,
    AlwaysPass,
}

/// Pluggable "dynamics OK" predicate. §9 Open Question (b): the source
/// stubs this to always-true; concrete fix-quality policy is deployment
/// specific, so it is injected rather than hardcoded.
pub type DynamicsPredicate = fn(&ReceiverInventory) -> bool;

pub fn dynamics_always_ok(_inventory: &ReceiverInventory) -> bool {
    true
}

pub struct Bit {
    step: Step,
    antenna_policy: AntennaPolicy,
    dynamics_ok: DynamicsPredicate,
}

impl Bit {
    pub fn new(antenna_policy: AntennaPolicy, dynamics_ok: DynamicsPredicate) -> Self {
        Self { step: Step::CommsCheck, antenna_policy, dynamics_ok }
    }

    pub fn outcome(&self) -> BitOutcome {
        match self.step {
            Step::Success => BitOutcome::Success,
            Step::Failure => BitOutcome::Failure,
            _ => BitOutcome::Running,
        }
    }

    /// Advance the sub-state machine by one tick.
    pub fn tick(
        &mut self,
        inventory: &ReceiverInventory,
        events: &[Event],
        pending: &mut PendingCommandSet,
        out_frames: &mut Vec<Vec<u8>>,
    ) {
        match self.step {
            Step::CommsCheck => self.tick_comms_check(events, pending, out_frames),
            Step::DynamicsCheck => self.tick_dynamics_check(inventory),
            Step::InterferenceCheck => self.tick_interference_check(events, pending, out_frames),
            Step::AntennaCheck => self.tick_antenna_check(inventory),
            Step::Success | Step::Failure => {}
        }
    }

    fn tick_comms_check(
        &mut self,
        events: &[Event],
        pending: &mut PendingCommandSet,
        out: &mut Vec<Vec<u8>>,
    ) {
        if !pending.is_pending(CommandKind::MonComms) {
            out.push(requests::mon_comms(pending));
            return;
        }
        for event in events {
            if let Event::MonComms { tx_errors } = event {
                pending.clear(CommandKind::MonComms);
                let flags = gnss_core::inventory::TxErrorFlags::from_bits_truncate(*tx_errors);
                if flags.is_failing() {
                    log::error!(target: "gnss", "[bit] comms check failed: tx_errors={tx_errors:#04b}");
                    self.step = Step::Failure;
                } else {
                    self.step = Step::DynamicsCheck;
                }
                return;
            }
        }
    }

    fn tick_dynamics_check(&mut self, inventory: &ReceiverInventory) {
        if (self.dynamics_ok)(inventory) {
            self.step = Step::InterferenceCheck;
        } else {
            log::error!(target: "gnss", "[bit] dynamics check failed");
            self.step = Step::Failure;
        }
    }

    fn tick_interference_check(
        &mut self,
        events: &[Event],
        pending: &mut PendingCommandSet,
        out: &mut Vec<Vec<u8>>,
    ) {
        if !pending.is_pending(CommandKind::MonRf) {
            out.push(requests::mon_rf(pending));
            return;
        }
        for event in events {
            if let Event::MonRf { jamming, .. } = event {
                pending.clear(CommandKind::MonRf);
                if jamming.is_critical() {
                    log::warn!(target: "gnss", "[bit] jamming state is critical");
                }
                self.step = Step::AntennaCheck;
                return;
            }
        }
    }

    fn tick_antenna_check(&mut self, inventory: &ReceiverInventory) {
        let pass = match self.antenna_policy {
            AntennaPolicy::AlwaysPass => true,
            AntennaPolicy::RequireOkAndOn => {
                inventory.antenna_status == AntennaStatus::Ok
                    && inventory.antenna_power == AntennaPower::On
            }
        };
        if pass {
            self.step = Step::Success;
        } else {
            log::error!(target: "gnss", "[bit] antenna check failed: status={:?} power={:?}",
                inventory.antenna_status, inventory.antenna_power);
            self.step = Step::Failure;
        }
    }
}
