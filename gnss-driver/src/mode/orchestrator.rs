//! Top-level Mode Orchestrator (§4.5): the hierarchical FSM that drives
//! PBIT → Operational ⇄ CBIT, with IBIT preempting any of them and Failure
//! absorbing. Dispatch is exhaustive pattern matching over `Mode`, so a new
//! mode can't be added without updating every match arm here.

use gnss_core::config::ConfigTable;
use gnss_core::inventory::ReceiverInventory;
use gnss_core::pending::PendingCommandSet;
use gnss_core::time::MonoMillis;

use crate::bit::{AntennaPolicy, DynamicsPredicate};
use crate::codec::Event;
use crate::tunables;

use super::state::{CbitState, IbitState, Mode, ModeCtx, OperationalState, PbitState};
use super::{cbit, ibit, operational, pbit};

pub struct TickOutput {
    pub frames: Vec<Vec<u8>>,
    pub needs_reconnect: bool,
}

pub struct ModeOrchestrator {
    mode: Mode,
    ascfg: ConfigTable,
    defcfg: ConfigTable,
    inventory: ReceiverInventory,
    pending: PendingCommandSet,
    flash_present: bool,
    antenna_policy: AntennaPolicy,
    dynamics_ok: DynamicsPredicate,
    ibit_requested: bool,
}

impl ModeOrchestrator {
    pub fn new(
        ascfg: ConfigTable,
        defcfg: ConfigTable,
        antenna_policy: AntennaPolicy,
        dynamics_ok: DynamicsPredicate,
    ) -> Self {
        Self {
            mode: Mode::NoMode,
            ascfg,
            defcfg,
            inventory: ReceiverInventory::new(),
            pending: PendingCommandSet::new(),
            flash_present: false,
            antenna_policy,
            dynamics_ok,
            ibit_requested: false,
        }
    }

    /// Record an operator-initiated IBIT request. Applied at the next tick
    /// boundary (§5 Cancellation) rather than interrupting the current one.
    pub fn request_ibit(&mut self) {
        self.ibit_requested = true;
    }

    pub fn mode_name(&self) -> &'static str {
        self.mode.name()
    }

    pub fn inventory(&self) -> &ReceiverInventory {
        &self.inventory
    }

    pub fn ascfg(&self) -> &ConfigTable {
        &self.ascfg
    }

    pub fn defcfg(&self) -> &ConfigTable {
        &self.defcfg
    }

    pub fn tick(&mut self, events: &[Event], now: MonoMillis) -> TickOutput {
        if self.ibit_requested && !matches!(self.mode, Mode::Ibit(_)) {
            self.ibit_requested = false;
            self.pending.clear_all();
            self.ascfg.reset_observed();
            self.defcfg.reset_observed();
            self.mode = Mode::Ibit(IbitState::fresh(now));
        } else if matches!(self.mode, Mode::NoMode) {
            self.pending.clear_all();
            self.mode = Mode::Pbit(PbitState::fresh_attempt(0, now));
        }

        let mut out = Vec::new();
        let mut needs_reconnect = false;
        let mut ctx = ModeCtx {
            inventory: &mut self.inventory,
            events,
            pending: &mut self.pending,
            ascfg: &mut self.ascfg,
            defcfg: &mut self.defcfg,
            flash_present: self.flash_present,
            now,
            antenna_policy: self.antenna_policy,
            dynamics_ok: self.dynamics_ok,
            out: &mut out,
        };

        self.mode = match std::mem::replace(&mut self.mode, Mode::NoMode) {
            Mode::NoMode => Mode::NoMode,
            Mode::Pbit(state) => step_pbit(state, &mut ctx),
            Mode::Operational(state) => step_operational(state, &mut ctx),
            Mode::Cbit(state) => step_cbit(state, &mut ctx),
            Mode::Ibit(state) => step_ibit(state, &mut ctx, &mut needs_reconnect),
            Mode::Failure => Mode::Failure,
        };

        self.flash_present = self.inventory.flash_present;
        TickOutput { frames: out, needs_reconnect }
    }
}

fn step_pbit(mut state: PbitState, ctx: &mut ModeCtx) -> Mode {
    if ctx.now.elapsed_since(state.start) >= tunables::BIT_TIMEOUT {
        log::warn!(target: "gnss", "[mode] PBIT attempt {} timed out", state.attempt);
        return escalate_pbit(state.attempt, ctx);
    }
    match pbit::tick(&mut state, ctx) {
        pbit::PbitStepResult::Continue => Mode::Pbit(state),
        pbit::PbitStepResult::Success => {
            ctx.pending.clear_all();
            log::info!(target: "gnss", "[mode] PBIT complete, entering Operational");
            Mode::Operational(OperationalState::fresh(ctx.now))
        }
        pbit::PbitStepResult::Failure => escalate_pbit(state.attempt, ctx),
    }
}

fn escalate_pbit(attempt: u8, ctx: &mut ModeCtx) -> Mode {
    let next_attempt = attempt + 1;
    ctx.pending.clear_all();
    ctx.ascfg.reset_observed();
    if next_attempt >= tunables::BIT_MAX_TRIES {
        log::error!(target: "gnss", "[mode] PBIT failed after {next_attempt} attempts");
        Mode::Failure
    } else {
        log::warn!(target: "gnss", "[mode] restarting PBIT, attempt {next_attempt}");
        Mode::Pbit(PbitState::fresh_attempt(next_attempt, ctx.now))
    }
}

fn step_operational(mut state: OperationalState, ctx: &mut ModeCtx) -> Mode {
    match operational::tick(&mut state, ctx) {
        operational::OperationalStepResult::Continue => Mode::Operational(state),
        operational::OperationalStepResult::ToCbit => {
            ctx.pending.clear_all();
            log::info!(target: "gnss", "[mode] CBIT period elapsed, entering CBIT");
            Mode::Cbit(CbitState::fresh(ctx.now))
        }
    }
}

fn step_cbit(mut state: CbitState, ctx: &mut ModeCtx) -> Mode {
    if ctx.now.elapsed_since(state.start) >= tunables::CBIT_TIMEOUT {
        log::error!(target: "gnss", "[mode] CBIT timed out");
        ctx.pending.clear_all();
        return Mode::Failure;
    }
    match cbit::tick(&mut state, ctx) {
        cbit::CbitStepResult::Continue => Mode::Cbit(state),
        cbit::CbitStepResult::Success => {
            ctx.pending.clear_all();
            Mode::Operational(OperationalState::fresh(ctx.now))
        }
        cbit::CbitStepResult::Failure => {
            log::error!(target: "gnss", "[mode] CBIT failed a BIT check");
            ctx.pending.clear_all();
            Mode::Failure
        }
    }
}

fn step_ibit(mut state: IbitState, ctx: &mut ModeCtx, needs_reconnect: &mut bool) -> Mode {
    if ctx.now.elapsed_since(state.start) >= tunables::IBIT_TIMEOUT {
        log::error!(target: "gnss", "[mode] IBIT timed out");
        ctx.pending.clear_all();
        return Mode::Failure;
    }

    let result = ibit::tick(&mut state, ctx);
    if state.needs_reconnect {
        *needs_reconnect = true;
        state.needs_reconnect = false;
    }

    match result {
        ibit::IbitStepResult::Continue => Mode::Ibit(state),
        ibit::IbitStepResult::Success => {
            ctx.pending.clear_all();
            log::info!(target: "gnss", "[mode] IBIT complete, entering Operational");
            Mode::Operational(OperationalState::fresh(ctx.now))
        }
        ibit::IbitStepResult::Failure => {
            log::error!(target: "gnss", "[mode] IBIT failed a BIT check");
            ctx.pending.clear_all();
            Mode::Failure
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bit::{dynamics_always_ok, AntennaPolicy};
    use gnss_core::config::ConfigTable;
    use gnss_core::inventory::{AntennaPower, AntennaStatus, JammingState};

    fn orchestrator() -> ModeOrchestrator {
        ModeOrchestrator::new(
            ConfigTable::new(),
            ConfigTable::new(),
            AntennaPolicy::RequireOkAndOn,
            dynamics_always_ok,
        )
    }

    fn mon_ver_ok() -> Event {
        Event::MonVer {
            sw_version: "EXT CORE 1.00".to_string(),
            hw_version: "00190000".to_string(),
            fw_version: Some(gnss_core::inventory::Version::new(4, 4)),
            protocol_version: Some(gnss_core::inventory::Version::new(32, 1)),
        }
    }

    #[test]
    fn no_mode_bootstraps_directly_into_pbit() {
        let mut orch = orchestrator();
        orch.tick(&[], MonoMillis(1));
        assert_eq!(orch.mode_name(), "PBIT");
    }

    #[test]
    fn happy_pbit_reaches_operational() {
        let mut orch = orchestrator();
        let mut t = 1u64;
        let mut tick = |events: &[Event]| {
            t += 1;
            orch.tick(events, MonoMillis(t))
        };

        tick(&[]); // Rst
        tick(&[]); // ReqVer sends MonVer + LogInfo
        tick(&[mon_ver_ok(), Event::LogInfo { flash_capacity_bytes: 20_000 }]);
        tick(&[]); // ReqConstellations sends MonGnss
        tick(&[Event::MonGnss { supported: 1, default: 1, enabled: 1, simultaneous: 1 }]);

        // BIT: comms -> dynamics -> interference -> antenna
        tick(&[]);
        tick(&[Event::MonComms { tx_errors: 0 }]);
        tick(&[]);
        tick(&[]);
        tick(&[Event::MonRf {
            jamming: JammingState::Ok,
            antenna_status: AntennaStatus::Ok,
            antenna_power: AntennaPower::On,
        }]);
        tick(&[]); // antenna check -> Success -> AsCfgApply

        // ASCFG is empty, so reconciliation succeeds with zero frames.
        let out = tick(&[]);
        let _ = out;
        assert_eq!(orch.mode_name(), "Operational");
    }

    #[test]
    fn gps_absent_fails_pbit_after_max_tries() {
        let mut orch = orchestrator();
        let mut t = 1u64;

        for attempt in 0..tunables::BIT_MAX_TRIES {
            t += 1;
            orch.tick(&[], MonoMillis(t)); // Rst
            t += 1;
            orch.tick(&[], MonoMillis(t)); // ReqVer send
            t += 1;
            orch.tick(
                &[mon_ver_ok(), Event::LogInfo { flash_capacity_bytes: 20_000 }],
                MonoMillis(t),
            );
            t += 1;
            orch.tick(&[], MonoMillis(t)); // ReqConstellations send
            t += 1;
            let status = if attempt + 1 >= tunables::BIT_MAX_TRIES { "Failure" } else { "PBIT" };
            orch.tick(
                &[Event::MonGnss { supported: 1, default: 1, enabled: 0, simultaneous: 1 }],
                MonoMillis(t),
            );
            assert_eq!(orch.mode_name(), status);
        }
    }

    #[test]
    fn ibit_request_preempts_operational() {
        let mut orch = orchestrator();
        // Force straight into Operational for this test by constructing the
        // orchestrator fresh and driving the minimal happy path once.
        let mut t = 1u64;
        let mut tick = |events: &[Event]| {
            t += 1;
            orch.tick(events, MonoMillis(t))
        };
        tick(&[]);
        tick(&[]);
        tick(&[mon_ver_ok(), Event::LogInfo { flash_capacity_bytes: 20_000 }]);
        tick(&[]);
        tick(&[Event::MonGnss { supported: 1, default: 1, enabled: 1, simultaneous: 1 }]);
        tick(&[]);
        tick(&[Event::MonComms { tx_errors: 0 }]);
        tick(&[]);
        tick(&[]);
        tick(&[Event::MonRf {
            jamming: JammingState::Ok,
            antenna_status: AntennaStatus::Ok,
            antenna_power: AntennaPower::On,
        }]);
        tick(&[]);
        tick(&[]);
        assert_eq!(orch.mode_name(), "Operational");

        orch.request_ibit();
        t += 1;
        orch.tick(&[], MonoMillis(t));
        assert_eq!(orch.mode_name(), "IBIT");
    }
}
