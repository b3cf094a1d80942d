//! Test and helper mocks for dispenser_core

use std::collections::VecDeque;

use dispenser_traits::{BoxError, CommandPort};

/// Command port fed from a fixed byte script that records every line written.
///
/// One scripted byte is handed out per poll; `None` entries in the script
/// model polls where nothing was waiting. Once the script is exhausted the
/// port reports itself closed.
#[derive(Debug, Default)]
pub struct ScriptedPort {
    script: VecDeque<Option<u8>>,
    lines: Vec<String>,
}

impl ScriptedPort {
    pub fn new(bytes: &[u8]) -> Self {
        Self {
            script: bytes.iter().copied().map(Some).collect(),
            lines: Vec::new(),
        }
    }

    /// Queue a poll that finds no input.
    pub fn then_idle(mut self) -> Self {
        self.script.push_back(None);
        self
    }

    pub fn push(&mut self, byte: u8) {
        self.script.push_back(Some(byte));
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn take_lines(&mut self) -> Vec<String> {
        std::mem::take(&mut self.lines)
    }
}

impl CommandPort for ScriptedPort {
    fn poll_byte(&mut self) -> Result<Option<u8>, BoxError> {
        Ok(self.script.pop_front().flatten())
    }

    fn write_line(&mut self, line: &str) -> Result<(), BoxError> {
        self.lines.push(line.to_owned());
        Ok(())
    }

    fn is_closed(&self) -> bool {
        self.script.is_empty()
    }
}
