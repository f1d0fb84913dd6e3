//! Shared data model for the GNSS receiver driver: configuration items and
//! tables, the receiver inventory, the pending-command registry, semantic
//! value encoding, and the monotonic clock. The protocol engine and mode
//! orchestrator live in `gnss-driver`; this crate holds the types they both
//! operate on, mirroring the core/network split used elsewhere in the
//! workspace this was grown from.

pub mod config;
pub mod error;
pub mod icd_defaults;
pub mod inventory;
pub mod layer;
pub mod logger;
pub mod pending;
pub mod time;
pub mod value;

pub use config::{ConfigId, ConfigItem, ConfigTable, Observed};
pub use error::DriverError;
pub use inventory::ReceiverInventory;
pub use layer::CfgMemLayer;
pub use pending::{CommandKind, PendingCommandSet};
pub use time::{Clock, MonoMillis};
pub use value::{SemanticType, TypedValue};
