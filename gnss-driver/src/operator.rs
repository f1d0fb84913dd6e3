//! Operator console. Recognizes the single command the mode orchestrator
//! reacts to; everything else about how this process is launched (flags,
//! exit codes) is out of scope here.

use std::io::BufRead;
use std::sync::mpsc::{channel, Receiver, Sender};
use std::thread;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperatorCommand {
    Ibit,
}

pub struct Operator {
    rx: Receiver<OperatorCommand>,
}

impl Operator {
    /// Spawn a thread reading lines from stdin and forwarding recognized
    /// commands over a channel. The calling side never blocks on it.
    pub fn spawn() -> Self {
        let (tx, rx) = channel();
        thread::spawn(move || read_loop(std::io::stdin().lock(), tx));
        Self { rx }
    }

    /// Drain every command received since the last call. Never blocks.
    pub fn poll(&self) -> Vec<OperatorCommand> {
        self.rx.try_iter().collect()
    }
}

fn read_loop<R: BufRead>(reader: R, tx: Sender<OperatorCommand>) {
    for line in reader.lines() {
        let Ok(line) = line else { break };
        match line.trim().to_ascii_lowercase().as_str() {
            "ibit" => {
                if tx.send(OperatorCommand::Ibit).is_err() {
                    break;
                }
            }
            "" => {}
            other => log::warn!(target: "gnss", "[operator] unrecognized command {other:?}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognizes_ibit_case_insensitively() {
        let (tx, rx) = channel();
        read_loop(b"IBIT\n".as_slice(), tx);
        let op = Operator { rx };
        assert_eq!(op.poll(), vec![OperatorCommand::Ibit]);
    }

    #[test]
    fn ignores_unrecognized_and_blank_lines() {
        let (tx, rx) = channel();
        read_loop(b"\nhello\nibit\n".as_slice(), tx);
        let op = Operator { rx };
        assert_eq!(op.poll(), vec![OperatorCommand::Ibit]);
    }

    #[test]
    fn poll_drains_without_blocking_when_nothing_arrived() {
        let (_tx, rx) = channel();
        let op = Operator { rx };
        assert!(op.poll().is_empty());
    }
}
