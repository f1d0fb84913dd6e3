//! Wire codec (§4.1): binary frame and NMEA sentence recognition, typed
//! event decoding, and outgoing frame encoding.

pub mod events;
pub mod nmea;
pub mod parser;
pub mod ubx;

pub use events::Event;
pub use parser::Parser;
pub use ubx::{class_id, encode_frame, ClassId};
