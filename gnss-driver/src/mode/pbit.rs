//! PBIT (§4.5): bring the receiver to a known RAM image, confirm identity,
//! run BIT, apply ASCFG.

use gnss_core::pending::CommandKind;

use crate::bit::{Bit, BitOutcome};
use crate::codec::Event;
use crate::reconcile::{ReconcileEngine, ReconcileStatus};
use crate::requests;
use crate::tunables;

use super::state::{ModeCtx, PbitState, PbitSubmode};

pub enum PbitStepResult {
    Continue,
    Success,
    Failure,
}

pub fn tick(state: &mut PbitState, ctx: &mut ModeCtx) -> PbitStepResult {
    match state.submode {
        PbitSubmode::Rst => tick_rst(state, ctx),
        PbitSubmode::ReqVer => tick_req_ver(state, ctx),
        PbitSubmode::ReqConstellations => tick_req_constellations(state, ctx),
        PbitSubmode::BitRun => tick_bit_run(state, ctx),
        PbitSubmode::AsCfgApply => tick_ascfg_apply(state, ctx),
    }
}

fn tick_rst(state: &mut PbitState, ctx: &mut ModeCtx) -> PbitStepResult {
    ctx.out.push(requests::erase_bbr_and_reload());
    state.submode = PbitSubmode::ReqVer;
    PbitStepResult::Continue
}

fn tick_req_ver(state: &mut PbitState, ctx: &mut ModeCtx) -> PbitStepResult {
    let awaiting = ctx.pending.is_pending(CommandKind::MonVer)
        || ctx.pending.is_pending(CommandKind::LogInfo);
    if !awaiting {
        ctx.out.push(requests::mon_ver(ctx.pending));
        ctx.out.push(requests::log_info(ctx.pending));
        return PbitStepResult::Continue;
    }

    for event in ctx.events {
        match event {
            Event::MonVer { sw_version, hw_version, fw_version, protocol_version } => {
                ctx.pending.clear(CommandKind::MonVer);
                ctx.inventory.sw_version = Some(sw_version.clone());
                ctx.inventory.hw_version = Some(hw_version.clone());
                ctx.inventory.fw_version = *fw_version;
                ctx.inventory.protocol_version = *protocol_version;

                if let Some(fw) = fw_version {
                    if *fw < tunables::MIN_PRODUCT_FW_VER {
                        log::error!(
                            target: "gnss",
                            "[pbit] SW version {fw} below minimum {}",
                            tunables::MIN_PRODUCT_FW_VER
                        );
                    }
                }
                if let Some(proto) = protocol_version {
                    if *proto < tunables::MIN_PROTOCOL_VER {
                        log::error!(
                            target: "gnss",
                            "[pbit] protocol version {proto} below minimum {}",
                            tunables::MIN_PROTOCOL_VER
                        );
                    }
                }
            }
            Event::LogInfo { flash_capacity_bytes } => {
                ctx.pending.clear(CommandKind::LogInfo);
                ctx.inventory.flash_capacity_bytes = Some(*flash_capacity_bytes);
                ctx.inventory.flash_present =
                    *flash_capacity_bytes >= tunables::MIN_FILESTORE_CAPACITY;
            }
            _ => {}
        }
    }

    let still_awaiting = ctx.pending.is_pending(CommandKind::MonVer)
        || ctx.pending.is_pending(CommandKind::LogInfo);
    if !still_awaiting {
        state.submode = PbitSubmode::ReqConstellations;
    }
    PbitStepResult::Continue
}

fn tick_req_constellations(state: &mut PbitState, ctx: &mut ModeCtx) -> PbitStepResult {
    if !ctx.pending.is_pending(CommandKind::MonGnss) {
        ctx.out.push(requests::mon_gnss(ctx.pending));
        return PbitStepResult::Continue;
    }

    for event in ctx.events {
        if let Event::MonGnss { supported, default, enabled, simultaneous } = event {
            ctx.pending.clear(CommandKind::MonGnss);
            ctx.inventory.supported_constellations = *supported;
            ctx.inventory.default_constellations = *default;
            ctx.inventory.enabled_constellations = *enabled;
            ctx.inventory.simultaneous_count = *simultaneous;

            if !ctx.inventory.gps_enabled() {
                log::error!(target: "gnss", "[pbit] GPS absent from enabled constellation mask");
                return PbitStepResult::Failure;
            }

            state.submode = PbitSubmode::BitRun;
            return PbitStepResult::Continue;
        }
    }
    PbitStepResult::Continue
}

fn tick_bit_run(state: &mut PbitState, ctx: &mut ModeCtx) -> PbitStepResult {
    let bit = state.bit.get_or_insert_with(|| Bit::new(ctx.antenna_policy, ctx.dynamics_ok));
    bit.tick(ctx.inventory, ctx.events, ctx.pending, ctx.out);
    match bit.outcome() {
        BitOutcome::Running => PbitStepResult::Continue,
        BitOutcome::Success => {
            state.submode = PbitSubmode::AsCfgApply;
            state.reconcile = Some(ReconcileEngine::new());
            PbitStepResult::Continue
        }
        BitOutcome::Failure => PbitStepResult::Failure,
    }
}

fn tick_ascfg_apply(state: &mut PbitState, ctx: &mut ModeCtx) -> PbitStepResult {
    let engine = state.reconcile.get_or_insert_with(ReconcileEngine::new);
    let status = engine.tick(ctx.ascfg, ctx.events, ctx.pending, ctx.flash_present, ctx.out);
    match status {
        ReconcileStatus::InProgress => PbitStepResult::Continue,
        ReconcileStatus::Success => PbitStepResult::Success,
    }
}
