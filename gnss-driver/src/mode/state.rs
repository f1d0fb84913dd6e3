//! Top-level mode tag and each mode's submode record (§3, §4.5, §9).
//!
//! A tagged enum with one variant per mode, each owning its own record,
//! dispatched by exhaustive matching in `orchestrator` — every submode is
//! handled at compile time, nothing falls through to a default arm.

use gnss_core::config::ConfigTable;
use gnss_core::inventory::ReceiverInventory;
use gnss_core::pending::PendingCommandSet;
use gnss_core::time::MonoMillis;

use crate::bit::{AntennaPolicy, Bit, DynamicsPredicate};
use crate::codec::Event;
use crate::reconcile::ReconcileEngine;

/// Everything a submode tick function needs, gathered in one place so the
/// per-mode `tick` signatures stay small as the orchestrator grows.
pub struct ModeCtx<'a> {
    pub inventory: &'a mut ReceiverInventory,
    pub events: &'a [Event],
    pub pending: &'a mut PendingCommandSet,
    pub ascfg: &'a mut ConfigTable,
    pub defcfg: &'a mut ConfigTable,
    pub flash_present: bool,
    pub now: MonoMillis,
    pub antenna_policy: AntennaPolicy,
    pub dynamics_ok: DynamicsPredicate,
    pub out: &'a mut Vec<Vec<u8>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PbitSubmode {
    Rst,
    ReqVer,
    ReqConstellations,
    BitRun,
    AsCfgApply,
}

pub struct PbitState {
    pub submode: PbitSubmode,
    pub start: MonoMillis,
    pub attempt: u8,
    pub bit: Option<Bit>,
    pub reconcile: Option<ReconcileEngine>,
}

impl PbitState {
    pub fn fresh_attempt(attempt: u8, start: MonoMillis) -> Self {
        Self { submode: PbitSubmode::Rst, start, attempt, bit: None, reconcile: None }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CbitSubmode {
    BitRun,
    DefCfgCheck,
}

pub struct CbitState {
    pub submode: CbitSubmode,
    pub start: MonoMillis,
    pub stay_start: MonoMillis,
    pub bit: Option<Bit>,
    pub reconcile: Option<ReconcileEngine>,
}

impl CbitState {
    pub fn fresh(start: MonoMillis) -> Self {
        Self {
            submode: CbitSubmode::BitRun,
            start,
            stay_start: MonoMillis::ZERO,
            bit: None,
            reconcile: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IbitSubmode {
    ClearAll,
    Rst,
    BitRun,
    AsCfgApply,
}

pub struct IbitState {
    pub submode: IbitSubmode,
    pub start: MonoMillis,
    pub rst_done_at: MonoMillis,
    pub needs_reconnect: bool,
    pub bit: Option<Bit>,
    pub reconcile: Option<ReconcileEngine>,
}

impl IbitState {
    pub fn fresh(start: MonoMillis) -> Self {
        Self {
            submode: IbitSubmode::ClearAll,
            start,
            rst_done_at: MonoMillis::ZERO,
            needs_reconnect: false,
            bit: None,
            reconcile: None,
        }
    }
}

pub struct OperationalState {
    pub entered_at: MonoMillis,
    pub last_pvt_request: MonoMillis,
}

impl OperationalState {
    pub fn fresh(now: MonoMillis) -> Self {
        Self { entered_at: now, last_pvt_request: now }
    }
}

pub enum Mode {
    NoMode,
    Pbit(PbitState),
    Operational(OperationalState),
    Cbit(CbitState),
    Ibit(IbitState),
    Failure,
}

impl Mode {
    pub fn name(&self) -> &'static str {
        match self {
            Mode::NoMode => "NoMode",
            Mode::Pbit(_) => "PBIT",
            Mode::Operational(_) => "Operational",
            Mode::Cbit(_) => "CBIT",
            Mode::Ibit(_) => "IBIT",
            Mode::Failure => "Failure",
        }
    }
}
