//! Link I/O: owns the exclusive-access serial handle (§4.2, §6).
//!
//! The producer thread performs blocking reads from the serial device and
//! appends bytes to the shared ring; it holds no parser state and never
//! writes. The core ticker is the only writer, and writes are short and
//! blocking — acceptable because they run far less often than reads and
//! never hold the ring's producer side.

use std::io::{ErrorKind, Read};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use gnss_core::DriverError;

use super::ring::{byte_ring, RingConsumer, RingProducer};

#[derive(Debug, Clone)]
pub struct SerialConfig {
    pub path: String,
    pub baud_rate: u32,
    pub buffer_size: usize,
}

impl SerialConfig {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            baud_rate: 38_400,
            buffer_size: 1024,
        }
    }
}

/// Owns the serial port on the write side and supervises the read-side
/// producer thread. `drain_into` pulls from the ring the producer fills;
/// it never touches the port directly.
pub struct SerialLink {
    config: SerialConfig,
    write_port: Option<Box<dyn serialport::SerialPort>>,
    consumer: RingConsumer,
    producer_shutdown: Arc<AtomicBool>,
    producer_handle: Option<JoinHandle<()>>,
}

impl SerialLink {
    /// Open the port and start the producer thread.
    pub fn connect(config: SerialConfig) -> Result<Self, DriverError> {
        let write_port = open_port(&config)?;
        let read_port = open_port(&config)?;

        let (mut producer, consumer) = byte_ring(config.buffer_size);
        let shutdown = Arc::new(AtomicBool::new(false));
        let thread_shutdown = shutdown.clone();

        let handle = std::thread::spawn(move || {
            run_producer(read_port, &mut producer, &thread_shutdown);
        });

        Ok(Self {
            config,
            write_port: Some(write_port),
            consumer,
            producer_shutdown: shutdown,
            producer_handle: Some(handle),
        })
    }

    /// Blocking, short write of a fully-framed outgoing message. Only ever
    /// called from the core ticker (§5: the serial write side is serialized
    /// by the ticker only).
    pub fn write(&mut self, frame: &[u8]) -> Result<(), DriverError> {
        let port = self
            .write_port
            .as_mut()
            .ok_or_else(|| DriverError::Transport("port not open".into()))?;
        port.write_all(frame)
            .map_err(|e| DriverError::Transport(e.to_string()))
    }

    /// Drain every byte the producer has buffered since the last tick.
    pub fn drain_into(&mut self, out: &mut Vec<u8>) {
        self.consumer.drain_into(out);
    }

    /// Tear down the current port and producer thread, then reopen both.
    /// Used by IBIT's Rst submode after the hardware watchdog reset (§4.5).
    pub fn reconnect(&mut self) -> Result<(), DriverError> {
        self.shutdown_producer();

        let write_port = open_port(&self.config)?;
        let read_port = open_port(&self.config)?;

        let (mut producer, consumer) = byte_ring(self.config.buffer_size);
        let shutdown = Arc::new(AtomicBool::new(false));
        let thread_shutdown = shutdown.clone();

        let handle = std::thread::spawn(move || {
            run_producer(read_port, &mut producer, &thread_shutdown);
        });

        self.write_port = Some(write_port);
        self.consumer = consumer;
        self.producer_shutdown = shutdown;
        self.producer_handle = Some(handle);
        Ok(())
    }

    fn shutdown_producer(&mut self) {
        self.producer_shutdown.store(true, Ordering::Relaxed);
        if let Some(handle) = self.producer_handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for SerialLink {
    fn drop(&mut self) {
        self.shutdown_producer();
    }
}

fn open_port(config: &SerialConfig) -> Result<Box<dyn serialport::SerialPort>, DriverError> {
    serialport::new(&config.path, config.baud_rate)
        .data_bits(serialport::DataBits::Eight)
        .parity(serialport::Parity::None)
        .stop_bits(serialport::StopBits::One)
        .flow_control(serialport::FlowControl::None)
        .timeout(Duration::from_millis(50))
        .open()
        .map_err(|e| DriverError::Transport(e.to_string()))
}

/// Producer loop: read whatever is available and push it byte-by-byte into
/// the ring. Performs no parsing and holds no state beyond the handle (§4.2).
fn run_producer(
    mut port: Box<dyn serialport::SerialPort>,
    ring: &mut RingProducer,
    shutdown: &AtomicBool,
) {
    let mut buf = [0u8; 256];
    while !shutdown.load(Ordering::Relaxed) {
        match port.read(&mut buf) {
            Ok(0) => {}
            Ok(n) => {
                for &byte in &buf[..n] {
                    ring.push(byte);
                }
            }
            Err(e) if e.kind() == ErrorKind::TimedOut => {}
            Err(_) => {
                // Transport error: back off briefly and keep trying. The
                // mode orchestrator notices via request timeouts and, in
                // IBIT, drives an explicit reconnect.
                std::thread::sleep(Duration::from_millis(100));
            }
        }
    }
}
