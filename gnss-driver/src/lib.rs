//! Host-side GNSS receiver driver: wire codec, configuration reconciliation
//! engine, and the hierarchical BIT/CBIT/IBIT/PBIT mode state machine.

pub mod bit;
pub mod codec;
pub mod driver;
pub mod link;
pub mod mode;
pub mod operator;
pub mod reconcile;
pub mod requests;
pub mod tunables;

pub use driver::Driver;
pub use mode::{Mode, ModeOrchestrator};
