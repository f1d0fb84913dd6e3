//! Operational (§4.5): the steady-state mode. Polls PVT on a fixed period
//! and hands off to CBIT once the configured dwell time elapses.

use gnss_core::pending::CommandKind;

use crate::codec::Event;
use crate::requests;
use crate::tunables;

use super::state::{ModeCtx, OperationalState};

pub enum OperationalStepResult {
    Continue,
    ToCbit,
}

pub fn tick(state: &mut OperationalState, ctx: &mut ModeCtx) -> OperationalStepResult {
    for event in ctx.events {
        if let Event::NavPvt { num_sv, .. } = event {
            ctx.pending.clear(CommandKind::Pvt);
            ctx.inventory.last_pvt_timestamp = Some(ctx.now);
            ctx.inventory.last_pvt_num_sv = *num_sv;
            ctx.inventory.last_pvt_valid = *num_sv > 0;
        }
    }

    if !ctx.pending.is_pending(CommandKind::Pvt)
        && ctx.now.elapsed_since(state.last_pvt_request) >= tunables::OPERATIONAL_PVT_PERIOD
    {
        ctx.out.push(requests::nav_pvt(ctx.pending));
        state.last_pvt_request = ctx.now;
    }

    if ctx.now.elapsed_since(state.entered_at) >= tunables::CBIT_PERIOD {
        return OperationalStepResult::ToCbit;
    }
    OperationalStepResult::Continue
}
