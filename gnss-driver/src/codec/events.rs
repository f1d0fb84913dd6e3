//! Typed events the wire codec dispatches once a frame has been validated
//! and decoded (§4.1).

use gnss_core::config::ConfigId;
use gnss_core::inventory::{AntennaPower, AntennaStatus, JammingState, Version};
use gnss_core::value::TypedValue;

use super::ubx::{class_id, ClassId};

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Ack(ClassId),
    Nak(ClassId),

    MonVer {
        sw_version: String,
        hw_version: String,
        fw_version: Option<Version>,
        protocol_version: Option<Version>,
    },

    MonGnss {
        supported: u32,
        default: u32,
        enabled: u32,
        simultaneous: u8,
    },

    MonComms {
        tx_errors: u8,
    },

    MonRf {
        jamming: JammingState,
        antenna_status: AntennaStatus,
        antenna_power: AntennaPower,
    },

    LogInfo {
        flash_capacity_bytes: u32,
    },

    NavPvt {
        num_sv: u8,
        lon_deg: f64,
        lat_deg: f64,
        height_m: f64,
    },

    CfgValget {
        items: Vec<(ConfigId, TypedValue)>,
    },

    /// An NMEA sentence whose checksum validated. Payload decoding is out of
    /// scope (§1 Non-goals); only the talker+type tag is surfaced.
    Nmea {
        kind: String,
    },
}

impl Event {
    pub fn class_id(&self) -> Option<ClassId> {
        match self {
            Event::Ack(c) | Event::Nak(c) => Some(*c),
            Event::MonVer { .. } => Some(class_id::MON_VER),
            Event::MonGnss { .. } => Some(class_id::MON_GNSS),
            Event::MonComms { .. } => Some(class_id::MON_COMMS),
            Event::MonRf { .. } => Some(class_id::MON_RF),
            Event::LogInfo { .. } => Some(class_id::LOG_INFO),
            Event::NavPvt { .. } => Some(class_id::NAV_PVT),
            Event::CfgValget { .. } => Some(class_id::CFG_VALGET),
            Event::Nmea { .. } => None,
        }
    }
}
