//! IBIT (§4.5): operator-initiated recovery. Preempts any mode, clears
//! every configuration layer, power-cycles the receiver via the hardware
//! watchdog, then runs BIT and re-applies ASCFG.

use gnss_core::pending::CommandKind;

use crate::bit::{Bit, BitOutcome};
use crate::codec::Event;
use crate::reconcile::{ReconcileEngine, ReconcileStatus};
use crate::requests;
use crate::tunables;

use super::state::{IbitState, IbitSubmode, ModeCtx};

pub enum IbitStepResult {
    Continue,
    Success,
    Failure,
}

pub fn tick(state: &mut IbitState, ctx: &mut ModeCtx) -> IbitStepResult {
    match state.submode {
        IbitSubmode::ClearAll => tick_clear_all(state, ctx),
        IbitSubmode::Rst => tick_rst(state, ctx),
        IbitSubmode::BitRun => tick_bit_run(state, ctx),
        IbitSubmode::AsCfgApply => tick_ascfg_apply(state, ctx),
    }
}

fn tick_clear_all(state: &mut IbitState, ctx: &mut ModeCtx) -> IbitStepResult {
    if !ctx.pending.is_pending(CommandKind::Ack) {
        ctx.out.push(requests::erase_all_layers(ctx.pending));
        return IbitStepResult::Continue;
    }

    for event in ctx.events {
        if matches!(event, Event::Ack(_) | Event::Nak(_)) {
            ctx.pending.clear(CommandKind::Ack);
            state.submode = IbitSubmode::Rst;
            return IbitStepResult::Continue;
        }
    }
    IbitStepResult::Continue
}

fn tick_rst(state: &mut IbitState, ctx: &mut ModeCtx) -> IbitStepResult {
    if state.rst_done_at.is_unset() {
        ctx.out.push(requests::hardware_watchdog_reset());
        state.rst_done_at = ctx.now;
        return IbitStepResult::Continue;
    }

    if ctx.now.elapsed_since(state.rst_done_at) >= tunables::IBIT_WAIT_AFTER_RST {
        state.needs_reconnect = true;
        state.submode = IbitSubmode::BitRun;
    }
    IbitStepResult::Continue
}

fn tick_bit_run(state: &mut IbitState, ctx: &mut ModeCtx) -> IbitStepResult {
    let bit = state.bit.get_or_insert_with(|| Bit::new(ctx.antenna_policy, ctx.dynamics_ok));
    bit.tick(ctx.inventory, ctx.events, ctx.pending, ctx.out);
    match bit.outcome() {
        BitOutcome::Running => IbitStepResult::Continue,
        BitOutcome::Success => {
            state.submode = IbitSubmode::AsCfgApply;
            state.reconcile = Some(ReconcileEngine::new());
            IbitStepResult::Continue
        }
        BitOutcome::Failure => IbitStepResult::Failure,
    }
}

fn tick_ascfg_apply(state: &mut IbitState, ctx: &mut ModeCtx) -> IbitStepResult {
    let engine = state.reconcile.get_or_insert_with(ReconcileEngine::new);
    let status = engine.tick(ctx.ascfg, ctx.events, ctx.pending, ctx.flash_present, ctx.out);
    match status {
        ReconcileStatus::InProgress => IbitStepResult::Continue,
        ReconcileStatus::Success => IbitStepResult::Success,
    }
}
