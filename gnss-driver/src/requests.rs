//! Outgoing frame builders (§4.5, §6). Each builder that mandates a
//! response takes the pending-command set and marks the matching flag
//! before returning the frame bytes — a caller can never forget to arm the
//! flag, because there's no way to get a frame out of here without it.

use gnss_core::config::ConfigId;
use gnss_core::layer::CfgMemLayer;
use gnss_core::pending::{CommandKind, PendingCommandSet};
use gnss_core::value::TypedValue;

use crate::codec::{class_id, encode_frame};

pub const MAX_VALGET_REQ_ITEMS: usize = 64;
pub const MAX_VALSET_REQ_ITEMS: usize = 64;

/// CFG-RST with an erase-BBR-and-reload mask. No Ack is expected for this
/// variant (§4.5 PBIT/Rst): the caller proceeds immediately after sending.
pub fn erase_bbr_and_reload() -> Vec<u8> {
    // navBbrMask = 0x0001 (BBR), resetMode = 0x01 (controlled software reset).
    let payload = [0x01u8, 0x00, 0x01, 0x00];
    encode_frame(class_id::CFG_RST.class, class_id::CFG_RST.id, &payload)
}

/// CFG-RST with an erase-all-layers mask, used by IBIT/ClearAll. An Ack is
/// expected and the pending flag is armed.
pub fn erase_all_layers(pending: &mut PendingCommandSet) -> Vec<u8> {
    let payload = [0xFFu8, 0xFF, 0x01, 0x00];
    pending.set(CommandKind::Ack);
    encode_frame(class_id::CFG_RST.class, class_id::CFG_RST.id, &payload)
}

/// CFG-RST requesting a hardware watchdog reset. No Ack is expected
/// (§4.5 IBIT/Rst): the caller waits `IBIT_WAIT_AFTER_RST` then reconnects.
pub fn hardware_watchdog_reset() -> Vec<u8> {
    let payload = [0x00u8, 0x00, 0x04, 0x00];
    encode_frame(class_id::CFG_RST.class, class_id::CFG_RST.id, &payload)
}

pub fn mon_ver(pending: &mut PendingCommandSet) -> Vec<u8> {
    pending.set(CommandKind::MonVer);
    encode_frame(class_id::MON_VER.class, class_id::MON_VER.id, &[])
}

pub fn log_info(pending: &mut PendingCommandSet) -> Vec<u8> {
    pending.set(CommandKind::LogInfo);
    encode_frame(class_id::LOG_INFO.class, class_id::LOG_INFO.id, &[])
}

pub fn mon_gnss(pending: &mut PendingCommandSet) -> Vec<u8> {
    pending.set(CommandKind::MonGnss);
    encode_frame(class_id::MON_GNSS.class, class_id::MON_GNSS.id, &[])
}

pub fn mon_comms(pending: &mut PendingCommandSet) -> Vec<u8> {
    pending.set(CommandKind::MonComms);
    encode_frame(class_id::MON_COMMS.class, class_id::MON_COMMS.id, &[])
}

pub fn mon_rf(pending: &mut PendingCommandSet) -> Vec<u8> {
    pending.set(CommandKind::MonRf);
    encode_frame(class_id::MON_RF.class, class_id::MON_RF.id, &[])
}

pub fn nav_pvt(pending: &mut PendingCommandSet) -> Vec<u8> {
    pending.set(CommandKind::Pvt);
    encode_frame(class_id::NAV_PVT.class, class_id::NAV_PVT.id, &[])
}

/// VALGET request: version(1)|layer(1)|position(2 LE)|keyIds(4 LE each),
/// at most `MAX_VALGET_REQ_ITEMS` per page (§4.3, §6).
pub fn valget(ids: &[ConfigId], layer: CfgMemLayer, position: u16) -> Vec<u8> {
    debug_assert!(ids.len() <= MAX_VALGET_REQ_ITEMS);
    let mut payload = Vec::with_capacity(4 + ids.len() * 4);
    payload.push(0); // version
    payload.push(layer.index());
    payload.extend_from_slice(&position.to_le_bytes());
    for &id in ids {
        payload.extend_from_slice(&id.to_le_bytes());
    }
    encode_frame(class_id::CFG_VALGET.class, class_id::CFG_VALGET.id, &payload)
}

/// VALSET request: version(1)|layerMask(1)|reserved(2)|(keyId(4)|value) * n,
/// at most `MAX_VALSET_REQ_ITEMS` per page (§4.3, §6).
pub fn valset(items: &[(ConfigId, TypedValue)], layer: CfgMemLayer, pending: &mut PendingCommandSet) -> Vec<u8> {
    debug_assert!(items.len() <= MAX_VALSET_REQ_ITEMS);
    let mut payload = Vec::with_capacity(4 + items.len() * 8);
    payload.push(0); // version
    payload.push(layer.mask_bit());
    payload.extend_from_slice(&[0, 0]); // reserved
    for (id, value) in items {
        payload.extend_from_slice(&id.to_le_bytes());
        value.encode(&mut payload);
    }
    pending.set(CommandKind::Ack);
    encode_frame(class_id::CFG_VALSET.class, class_id::CFG_VALSET.id, &payload)
}

#[cfg(test)]
mod tests {
    use super::*;
    use gnss_core::value::TypedValue;

    #[test]
    fn mon_ver_arms_the_pending_flag() {
        let mut pending = PendingCommandSet::new();
        let _ = mon_ver(&mut pending);
        assert!(pending.is_pending(CommandKind::MonVer));
    }

    #[test]
    fn erase_bbr_and_reload_does_not_touch_pending_flags() {
        let frame = erase_bbr_and_reload();
        assert!(!frame.is_empty());
    }

    #[test]
    fn valget_encodes_ids_in_order() {
        let ids = [0x1023_0001u32, 0x1051_0003];
        let frame = valget(&ids, CfgMemLayer::Ram, 0);
        // sync(2) + class/id/len(4) + payload + checksum(2)
        let payload = &frame[6..frame.len() - 2];
        assert_eq!(&payload[0..4], &[0, 0, 0, 0]);
        assert_eq!(u32::from_le_bytes(payload[4..8].try_into().unwrap()), ids[0]);
        assert_eq!(u32::from_le_bytes(payload[8..12].try_into().unwrap()), ids[1]);
    }

    #[test]
    fn valset_arms_ack_and_encodes_layer_mask() {
        let mut pending = PendingCommandSet::new();
        let items = [(0x1023_0001u32, TypedValue::Enum8(4))];
        let frame = valset(&items, CfgMemLayer::Ram, &mut pending);
        assert!(pending.is_pending(CommandKind::Ack));
        let payload = &frame[6..frame.len() - 2];
        assert_eq!(payload[1], CfgMemLayer::Ram.mask_bit());
    }
}
