//! Top-level byte-stream parser (§4.1, §3 Parser State).
//!
//! Bytes arrive one at a time from the drained ring. The parser holds a
//! single working buffer and a small state tag; it never blocks and never
//! allocates per byte. A checksum mismatch or an unrecognized class/id
//! drops the frame and returns to `Idle` rather than propagating an error
//! that would stall the ticker — the counts are still visible for
//! diagnostics.

use gnss_core::config::ConfigId;
use gnss_core::value::SemanticType;

use super::events::Event;
use super::nmea;
use super::ubx::{self, SYNC1, SYNC2};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Idle,
    UbxSync2,
    UbxHeader,
    UbxPayload,
    UbxChecksum,
    Nmea,
}

pub struct Parser {
    state: State,
    buf: Vec<u8>,
    needed: usize,
    class: u8,
    id: u8,
    payload_len: u16,
    checksum_mismatches: u64,
    unknown_frames: u64,
}

impl Parser {
    pub fn new() -> Self {
        Self {
            state: State::Idle,
            buf: Vec::with_capacity(256),
            needed: 0,
            class: 0,
            id: 0,
            payload_len: 0,
            checksum_mismatches: 0,
            unknown_frames: 0,
        }
    }

    pub fn checksum_mismatches(&self) -> u64 {
        self.checksum_mismatches
    }

    pub fn unknown_frames(&self) -> u64 {
        self.unknown_frames
    }

    /// Feed every newly-drained byte through the state machine, appending
    /// any decoded events to `out`. `type_of` resolves VALGET key ids for
    /// the codec, per `ubx::decode_payload`.
    pub fn feed(
        &mut self,
        bytes: &[u8],
        type_of: &dyn Fn(ConfigId) -> Option<SemanticType>,
        out: &mut Vec<Event>,
    ) {
        for &byte in bytes {
            self.feed_one(byte, type_of, out);
        }
    }

    fn feed_one(
        &mut self,
        byte: u8,
        type_of: &dyn Fn(ConfigId) -> Option<SemanticType>,
        out: &mut Vec<Event>,
    ) {
        match self.state {
            State::Idle => {
                if byte == SYNC1 {
                    self.state = State::UbxSync2;
                } else if byte == b'$' {
                    self.buf.clear();
                    self.buf.push(byte);
                    self.state = State::Nmea;
                }
                // Anything else: stay in Idle, resynchronizing byte by byte.
            }
            State::UbxSync2 => {
                if byte == SYNC2 {
                    self.buf.clear();
                    self.needed = 4; // class, id, len_lo, len_hi
                    self.state = State::UbxHeader;
                } else if byte == SYNC1 {
                    // stay in UbxSync2, absorbing repeated sync bytes
                } else {
                    self.state = State::Idle;
                }
            }
            State::UbxHeader => {
                self.buf.push(byte);
                self.needed -= 1;
                if self.needed == 0 {
                    self.class = self.buf[0];
                    self.id = self.buf[1];
                    self.payload_len = u16::from_le_bytes([self.buf[2], self.buf[3]]);
                    if !ubx::is_known(self.class, self.id) {
                        self.unknown_frames += 1;
                        log::warn!(
                            target: "gnss",
                            "[codec] unknown frame class={:#04x} id={:#04x}, dropping",
                            self.class, self.id
                        );
                        self.state = State::Idle;
                        return;
                    }
                    self.needed = self.payload_len as usize;
                    if self.needed == 0 {
                        self.state = State::UbxChecksum;
                        self.needed = 2;
                    } else {
                        self.state = State::UbxPayload;
                    }
                }
            }
            State::UbxPayload => {
                self.buf.push(byte);
                self.needed -= 1;
                if self.needed == 0 {
                    self.state = State::UbxChecksum;
                    self.needed = 2;
                }
            }
            State::UbxChecksum => {
                self.buf.push(byte);
                self.needed -= 1;
                if self.needed == 0 {
                    self.finish_ubx_frame(type_of, out);
                    self.state = State::Idle;
                }
            }
            State::Nmea => {
                self.buf.push(byte);
                if byte == b'\n' {
                    self.finish_nmea_sentence(out);
                    self.state = State::Idle;
                } else if self.buf.len() > 128 {
                    // Runaway sentence with no terminator: give up and resync.
                    self.state = State::Idle;
                }
            }
        }
    }

    fn finish_ubx_frame(
        &mut self,
        type_of: &dyn Fn(ConfigId) -> Option<SemanticType>,
        out: &mut Vec<Event>,
    ) {
        let payload_end = self.buf.len() - 2;
        let header_and_payload_len = 4 + payload_end;
        let mut body = Vec::with_capacity(header_and_payload_len);
        body.push(self.class);
        body.push(self.id);
        body.extend_from_slice(&self.payload_len.to_le_bytes());
        body.extend_from_slice(&self.buf[..payload_end]);

        let (ck_a, ck_b) = ubx::fletcher8(&body);
        if ck_a != self.buf[payload_end] || ck_b != self.buf[payload_end + 1] {
            self.checksum_mismatches += 1;
            log::warn!(target: "gnss", "[codec] checksum mismatch, dropping frame");
            return;
        }

        if let Some(event) =
            ubx::decode_payload(self.class, self.id, &self.buf[..payload_end], type_of)
        {
            out.push(event);
        }
    }

    fn finish_nmea_sentence(&mut self, out: &mut Vec<Event>) {
        let trimmed = trim_trailing_crlf(&self.buf);
        if let Some(kind) = nmea::validate(trimmed) {
            out.push(Event::Nmea { kind });
        } else {
            log::warn!(target: "gnss", "[codec] invalid NMEA sentence, dropping");
        }
    }
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}

fn trim_trailing_crlf(bytes: &[u8]) -> &[u8] {
    let mut end = bytes.len();
    while end > 0 && (bytes[end - 1] == b'\n' || bytes[end - 1] == b'\r') {
        end -= 1;
    }
    &bytes[..end]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::ubx::{class_id, encode_frame};

    fn no_types(_: ConfigId) -> Option<SemanticType> {
        None
    }

    #[test]
    fn parses_a_well_formed_ack_frame() {
        let frame = encode_frame(class_id::ACK_ACK.class, class_id::ACK_ACK.id, &[0x06, 0x8B]);
        let mut parser = Parser::new();
        let mut out = Vec::new();
        parser.feed(&frame, &no_types, &mut out);
        assert_eq!(out, vec![Event::Ack(class_id::ACK_ACK)]);
        assert_eq!(parser.checksum_mismatches(), 0);
    }

    #[test]
    fn corrupt_checksum_is_dropped_and_counted() {
        // Matches the spec's literal corrupt-frame example: a MON-COMMS
        // header with a 4-byte payload whose checksum bytes are wrong.
        let frame = [0xB5u8, 0x62, 0x0A, 0x04, 0x04, 0x00, 0xFF, 0xFF, 0xFF, 0xFF, 0x00, 0x00];
        let mut parser = Parser::new();
        let mut out = Vec::new();
        parser.feed(&frame, &no_types, &mut out);
        assert!(out.is_empty());
        assert_eq!(parser.checksum_mismatches(), 1);
    }

    #[test]
    fn unknown_class_id_is_dropped_and_counted() {
        let frame = encode_frame(0xFF, 0xFF, &[1, 2, 3]);
        let mut parser = Parser::new();
        let mut out = Vec::new();
        parser.feed(&frame, &no_types, &mut out);
        assert!(out.is_empty());
        assert_eq!(parser.unknown_frames(), 1);
    }

    #[test]
    fn resynchronizes_after_garbage_bytes() {
        let mut garbage = vec![0x00u8, 0x11, 0xB5, 0x00];
        garbage.extend_from_slice(&encode_frame(
            class_id::ACK_ACK.class,
            class_id::ACK_ACK.id,
            &[0x06, 0x8B],
        ));
        let mut parser = Parser::new();
        let mut out = Vec::new();
        parser.feed(&garbage, &no_types, &mut out);
        assert_eq!(out, vec![Event::Ack(class_id::ACK_ACK)]);
    }

    #[test]
    fn parses_a_valid_nmea_sentence() {
        let sentence = b"$GPGGA,123519,4807.038,N,01131.000,E,1,08,0.9,545.4,M,46.9,M,,*47\r\n";
        let mut parser = Parser::new();
        let mut out = Vec::new();
        parser.feed(sentence, &no_types, &mut out);
        assert_eq!(out, vec![Event::Nmea { kind: "GPGGA".to_string() }]);
    }

    #[test]
    fn bytes_can_arrive_split_across_feed_calls() {
        let frame = encode_frame(class_id::ACK_ACK.class, class_id::ACK_ACK.id, &[0x06, 0x8B]);
        let mut parser = Parser::new();
        let mut out = Vec::new();
        let (first, second) = frame.split_at(3);
        parser.feed(first, &no_types, &mut out);
        assert!(out.is_empty());
        parser.feed(second, &no_types, &mut out);
        assert_eq!(out, vec![Event::Ack(class_id::ACK_ACK)]);
    }
}
