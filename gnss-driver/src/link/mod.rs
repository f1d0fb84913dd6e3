//! Link I/O (§4.2): the serial port and the byte ring that decouples its
//! blocking reads from the cooperative core ticker.

pub mod ring;
pub mod serial;

pub use ring::{byte_ring, RingConsumer, RingProducer};
pub use serial::{SerialConfig, SerialLink};
