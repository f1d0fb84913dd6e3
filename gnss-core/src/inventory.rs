//! The receiver inventory: everything BIT and the mode orchestrator know
//! about the attached receiver's identity and live status, assembled from
//! decoded wire-codec events.

use bitflags::bitflags;

use crate::time::MonoMillis;

bitflags! {
    /// TX-error bits reported by MON-COMMS. A set bit on either flag fails
    /// the comms check in BIT (§4.4 step 1).
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct TxErrorFlags: u8 {
        const MEMORY = 0b0000_0001;
        const ALLOC  = 0b0000_0010;
    }
}

impl TxErrorFlags {
    pub fn is_failing(self) -> bool {
        self.intersects(TxErrorFlags::MEMORY | TxErrorFlags::ALLOC)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JammingState {
    #[default]
    Unknown,
    Ok,
    Warning,
    Critical,
}

impl JammingState {
    pub fn from_wire(value: u8) -> JammingState {
        match value {
            0 => JammingState::Unknown,
            1 => JammingState::Ok,
            2 => JammingState::Warning,
            3 => JammingState::Critical,
            _ => JammingState::Unknown,
        }
    }

    pub fn is_critical(self) -> bool {
        matches!(self, JammingState::Critical)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AntennaStatus {
    #[default]
    Init,
    DontKnow,
    Ok,
    Short,
    Open,
}

impl AntennaStatus {
    pub fn from_wire(value: u8) -> AntennaStatus {
        match value {
            0 => AntennaStatus::Init,
            1 => AntennaStatus::DontKnow,
            2 => AntennaStatus::Ok,
            3 => AntennaStatus::Short,
            4 => AntennaStatus::Open,
            _ => AntennaStatus::DontKnow,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AntennaPower {
    #[default]
    Off,
    On,
    DontKnow,
}

impl AntennaPower {
    pub fn from_wire(value: u8) -> AntennaPower {
        match value {
            0 => AntennaPower::Off,
            1 => AntennaPower::On,
            2 => AntennaPower::DontKnow,
            _ => AntennaPower::DontKnow,
        }
    }
}

/// Decoded `FWVER=SPG <major>.<minor>` / `PROTVER=<major>.<minor>` pair from
/// MON-VER's extension blob.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Version {
    pub major: u32,
    pub minor: u32,
}

impl Version {
    pub fn new(major: u32, minor: u32) -> Self {
        Self { major, minor }
    }

    /// Parse a "MM.mm" string such as "4.04" or "32.01".
    pub fn parse(s: &str) -> Option<Version> {
        let (major, minor) = s.split_once('.')?;
        Some(Version::new(major.parse().ok()?, minor.parse().ok()?))
    }
}

impl std::fmt::Display for Version {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{:02}", self.major, self.minor)
    }
}

#[derive(Debug, Clone, Default)]
pub struct ReceiverInventory {
    pub sw_version: Option<String>,
    pub hw_version: Option<String>,
    pub fw_version: Option<Version>,
    pub protocol_version: Option<Version>,
    pub flash_present: bool,
    pub flash_capacity_bytes: Option<u32>,
    pub supported_constellations: u32,
    pub default_constellations: u32,
    pub enabled_constellations: u32,
    pub simultaneous_count: u8,
    pub tx_errors: TxErrorFlags,
    pub jamming: JammingState,
    pub antenna_status: AntennaStatus,
    pub antenna_power: AntennaPower,
    pub last_pvt_timestamp: Option<MonoMillis>,
    pub last_pvt_num_sv: u8,
    pub last_pvt_valid: bool,
}

/// Bit position of GPS within the constellation masks (ICD-fixed).
pub const GPS_CONSTELLATION_BIT: u32 = 0;

impl ReceiverInventory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn gps_enabled(&self) -> bool {
        self.enabled_constellations & (1 << GPS_CONSTELLATION_BIT) != 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tx_error_flags_fail_on_memory_or_alloc() {
        assert!(!TxErrorFlags::empty().is_failing());
        assert!(TxErrorFlags::MEMORY.is_failing());
        assert!(TxErrorFlags::ALLOC.is_failing());
        assert!((TxErrorFlags::MEMORY | TxErrorFlags::ALLOC).is_failing());
    }

    #[test]
    fn jamming_critical_is_only_value_3() {
        assert!(JammingState::from_wire(3).is_critical());
        assert!(!JammingState::from_wire(2).is_critical());
        assert!(!JammingState::from_wire(1).is_critical());
    }

    #[test]
    fn version_parses_icd_style_strings() {
        assert_eq!(Version::parse("4.04"), Some(Version::new(4, 4)));
        assert_eq!(Version::parse("32.01"), Some(Version::new(32, 1)));
        assert_eq!(Version::parse("garbage"), None);
    }

    #[test]
    fn version_ordering_matches_minimum_checks() {
        assert!(Version::new(4, 3) < Version::new(4, 4));
        assert!(Version::new(32, 1) >= Version::new(32, 1));
    }

    #[test]
    fn gps_enabled_reads_bit_zero() {
        let mut inv = ReceiverInventory::new();
        assert!(!inv.gps_enabled());
        inv.enabled_constellations = 1;
        assert!(inv.gps_enabled());
    }
}
