//! Stdin/stdout command port.
//!
//! Reading stdin blocks, so a detached reader thread forwards command bytes
//! over a channel and `poll_byte` only ever does `try_recv`. Line framing
//! (CR/LF, spaces, other control bytes) is dropped here; the command layer
//! sees only command bytes.

use std::io::{self, Read, Write};

use crossbeam_channel as xch;
use dispenser_traits::{BoxError, CommandPort};

pub struct StdioPort {
    rx: xch::Receiver<u8>,
    closed: bool,
}

/// True for bytes that carry a command rather than framing.
pub fn is_command_byte(b: u8) -> bool {
    !(b.is_ascii_whitespace() || b.is_ascii_control())
}

impl StdioPort {
    pub fn spawn() -> eyre::Result<Self> {
        let (tx, rx) = xch::unbounded();
        // Not joined: a blocking stdin read cannot be interrupted, and the
        // thread ends on EOF or when the receiver is dropped.
        std::thread::Builder::new()
            .name("stdin-commands".into())
            .spawn(move || {
                let mut stdin = io::stdin().lock();
                let mut buf = [0u8; 64];
                loop {
                    match stdin.read(&mut buf) {
                        Ok(0) => break,
                        Ok(n) => {
                            for &b in buf[..n].iter().filter(|&&b| is_command_byte(b)) {
                                if tx.send(b).is_err() {
                                    return;
                                }
                            }
                        }
                        Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                        Err(e) => {
                            tracing::warn!(error = %e, "stdin read failed");
                            break;
                        }
                    }
                }
                tracing::debug!("stdin reached end of input");
            })?;
        Ok(Self { rx, closed: false })
    }
}

impl CommandPort for StdioPort {
    fn poll_byte(&mut self) -> Result<Option<u8>, BoxError> {
        match self.rx.try_recv() {
            Ok(b) => Ok(Some(b)),
            Err(xch::TryRecvError::Empty) => Ok(None),
            Err(xch::TryRecvError::Disconnected) => {
                self.closed = true;
                Ok(None)
            }
        }
    }

    fn write_line(&mut self, line: &str) -> Result<(), BoxError> {
        let mut out = io::stdout().lock();
        writeln!(out, "{line}")?;
        out.flush()?;
        Ok(())
    }

    fn is_closed(&self) -> bool {
        self.closed
    }
}
