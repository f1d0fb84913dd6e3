//! Deployment tunables, with the defaults named in §6.

use gnss_core::inventory::Version;
use std::time::Duration;

pub const MIN_PRODUCT_FW_VER: Version = Version { major: 4, minor: 4 };
pub const MIN_PROTOCOL_VER: Version = Version { major: 32, minor: 1 };

pub const BIT_MAX_TRIES: u8 = 3;
pub const BIT_TIMEOUT: Duration = Duration::from_secs(10);
pub const CBIT_TIMEOUT: Duration = Duration::from_secs(10);
pub const CBIT_STAY_TIME: Duration = Duration::from_secs(10);
pub const CBIT_PERIOD: Duration = Duration::from_secs(1000);
pub const IBIT_WAIT_AFTER_RST: Duration = Duration::from_secs(10);
pub const IBIT_TIMEOUT: Duration = Duration::from_secs(20);
pub const MIN_FILESTORE_CAPACITY: u32 = 10_000;

pub const OPERATIONAL_PVT_PERIOD: Duration = Duration::from_secs(5);
pub const TICK_PERIOD: Duration = Duration::from_millis(25);
