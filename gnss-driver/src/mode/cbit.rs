//! CBIT (§4.5): runs BIT periodically during Operational, then verifies
//! the DEFCFG table before returning to Operational.

use crate::bit::{Bit, BitOutcome};
use crate::reconcile::{ReconcileEngine, ReconcileStatus};
use crate::tunables;

use super::state::{CbitState, CbitSubmode, ModeCtx};

pub enum CbitStepResult {
    Continue,
    Success,
    Failure,
}

pub fn tick(state: &mut CbitState, ctx: &mut ModeCtx) -> CbitStepResult {
    match state.submode {
        CbitSubmode::BitRun => tick_bit_run(state, ctx),
        CbitSubmode::DefCfgCheck => tick_defcfg_check(state, ctx),
    }
}

fn tick_bit_run(state: &mut CbitState, ctx: &mut ModeCtx) -> CbitStepResult {
    let bit = state.bit.get_or_insert_with(|| Bit::new(ctx.antenna_policy, ctx.dynamics_ok));
    bit.tick(ctx.inventory, ctx.events, ctx.pending, ctx.out);
    match bit.outcome() {
        BitOutcome::Running => CbitStepResult::Continue,
        BitOutcome::Success => {
            state.submode = CbitSubmode::DefCfgCheck;
            state.stay_start = ctx.now;
            state.reconcile = Some(ReconcileEngine::new());
            CbitStepResult::Continue
        }
        BitOutcome::Failure => CbitStepResult::Failure,
    }
}

fn tick_defcfg_check(state: &mut CbitState, ctx: &mut ModeCtx) -> CbitStepResult {
    let engine = state.reconcile.get_or_insert_with(ReconcileEngine::new);
    let status = engine.tick(ctx.defcfg, ctx.events, ctx.pending, ctx.flash_present, ctx.out);
    match status {
        ReconcileStatus::Success => CbitStepResult::Success,
        ReconcileStatus::InProgress => {
            if ctx.now.elapsed_since(state.stay_start) >= tunables::CBIT_STAY_TIME {
                log::warn!(
                    target: "gnss",
                    "[cbit] stay-time elapsed before DEFCFG reconciliation completed, deferring to next cycle"
                );
                CbitStepResult::Success
            } else {
                CbitStepResult::Continue
            }
        }
    }
}
