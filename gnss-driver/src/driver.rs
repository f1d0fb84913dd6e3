//! Top-level driver (§2, §5): wires the serial link, wire codec, operator
//! console and mode orchestrator together into one cooperative tick.
//!
//! Each tick runs in this order: drain operator commands, drain the serial
//! ring, feed the bytes through the parser, tick the mode orchestrator, then
//! write whatever frames it produced. Nothing here blocks on I/O except the
//! final serial write, which is short.

use gnss_core::error::DriverError;
use gnss_core::time::Clock;

use crate::codec::Parser;
use crate::link::{SerialConfig, SerialLink};
use crate::mode::ModeOrchestrator;
use crate::operator::{Operator, OperatorCommand};
use crate::tunables;

pub struct Driver {
    link: SerialLink,
    parser: Parser,
    clock: Clock,
    orchestrator: ModeOrchestrator,
    operator: Operator,
    raw: Vec<u8>,
}

impl Driver {
    pub fn connect(
        config: SerialConfig,
        orchestrator: ModeOrchestrator,
    ) -> Result<Self, DriverError> {
        Ok(Self {
            link: SerialLink::connect(config)?,
            parser: Parser::new(),
            clock: Clock::new(),
            orchestrator,
            operator: Operator::spawn(),
            raw: Vec::new(),
        })
    }

    pub fn orchestrator(&self) -> &ModeOrchestrator {
        &self.orchestrator
    }

    pub fn tick(&mut self) -> Result<(), DriverError> {
        for cmd in self.operator.poll() {
            match cmd {
                OperatorCommand::Ibit => self.orchestrator.request_ibit(),
            }
        }

        let now = self.clock.now();

        self.raw.clear();
        self.link.drain_into(&mut self.raw);

        let mut events = Vec::new();
        let orchestrator = &self.orchestrator;
        let type_of = |id| {
            orchestrator
                .ascfg()
                .get(id)
                .or_else(|| orchestrator.defcfg().get(id))
                .map(|item| item.semantic_type())
        };
        self.parser.feed(&self.raw, &type_of, &mut events);

        let output = self.orchestrator.tick(&events, now);
        for frame in output.frames {
            self.link.write(&frame)?;
        }
        if output.needs_reconnect {
            log::info!(target: "gnss", "[driver] reconnecting serial link after IBIT reset");
            self.link.reconnect()?;
        }

        Ok(())
    }

    /// Run the cooperative tick loop forever at the configured tick period.
    /// Never returns except on a fatal link error.
    pub fn run_forever(&mut self) -> Result<(), DriverError> {
        loop {
            self.tick()?;
            std::thread::sleep(tunables::TICK_PERIOD);
        }
    }
}
