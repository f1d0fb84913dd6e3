//! Static configuration reference data.
//!
//! The full ICD-default table is ~600 items long and is supplied by the
//! embedding application as a collaborator (§1 Non-goals) — typically
//! generated from the receiver's interface control document the same way
//! `build-i2c` turns a device manifest into Rust tables at Hubris build
//! time. What lives here is a small, representative slice sufficient to
//! exercise and test the reconciliation engine; a deployment wires in the
//! real table through [`IcdDefaults`] instead of this one.

use crate::config::ConfigId;
use crate::value::TypedValue;

/// One row of the ICD-default table: id, human name, ICD-mandated value.
pub type IcdRow = (ConfigId, &'static str, TypedValue);

/// A representative slice of the ICD defaults. Real deployments replace
/// this with the full ~600-item table generated from the receiver's ICD.
pub const ICD_DEFAULTS: &[IcdRow] = &[
    (0x1021_0001, "CFG-MSGOUT-UBX_NAV_PVT_UART1", TypedValue::U8(1)),
    (0x1023_0001, "CFG-NAVSPG-DYNMODEL", TypedValue::Enum8(0)),
    (0x1031_0001, "CFG-ODO-USE_ODO", TypedValue::Bit(false)),
    (0x1051_0003, "CFG-RATE-MEAS", TypedValue::U16(1000)),
    (0x1051_0004, "CFG-RATE-NAV", TypedValue::U16(1)),
    (0x1071_0001, "CFG-SIGNAL-GPS_ENA", TypedValue::Bit(true)),
    (0x1071_0002, "CFG-SIGNAL-GPS_L1CA_ENA", TypedValue::Bit(true)),
    (0x1071_0021, "CFG-SIGNAL-GLO_ENA", TypedValue::Bit(true)),
    (0x1071_0031, "CFG-SIGNAL-GAL_ENA", TypedValue::Bit(false)),
    (0x2091_0001, "CFG-UART1-BAUDRATE", TypedValue::U32(38_400)),
    (0x2091_0002, "CFG-UART1INPROT-UBX", TypedValue::Bit(true)),
    (0x2091_0003, "CFG-UART1OUTPROT-UBX", TypedValue::Bit(true)),
    (0x20a1_0001, "CFG-NAVHPG-DGNSSMODE", TypedValue::Enum8(3)),
    (0x20c1_0001, "CFG-BATCH-ENABLE", TypedValue::Bit(false)),
    (0x20d0_0001, "CFG-HW-ANT_CFG_VOLTCTRL", TypedValue::Bit(false)),
    (0x20d0_0002, "CFG-HW-ANT_CFG_SHORTDET", TypedValue::Bit(true)),
    (0x20d0_0003, "CFG-HW-ANT_CFG_OPENDET", TypedValue::Bit(true)),
    (0x3033_0001, "CFG-GEOFENCE-CONFLVL", TypedValue::Enum8(0)),
    (0x4021_0001, "CFG-RINV-DUMP", TypedValue::Bit(false)),
];

/// Application-specific overrides for this deployment (ASCFG). Any id
/// listed here is removed from `ICD_DEFAULTS` when the two tables are
/// split (§3: ASCFG and DEFCFG are disjoint by construction).
pub const ASCFG_OVERRIDES: &[IcdRow] = &[
    (0x1023_0001, "CFG-NAVSPG-DYNMODEL", TypedValue::Enum8(4)),
    (0x1051_0003, "CFG-RATE-MEAS", TypedValue::U16(200)),
    (0x20d0_0001, "CFG-HW-ANT_CFG_VOLTCTRL", TypedValue::Bit(true)),
];

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn default_ids_are_unique() {
        let ids: HashSet<_> = ICD_DEFAULTS.iter().map(|(id, _, _)| *id).collect();
        assert_eq!(ids.len(), ICD_DEFAULTS.len());
    }

    #[test]
    fn every_override_id_exists_in_defaults() {
        for (id, _, _) in ASCFG_OVERRIDES {
            assert!(ICD_DEFAULTS.iter().any(|(did, _, _)| did == id));
        }
    }
}
