//! Recording interface for tests and host tools
//!
//! Captures every framing call as a [`WireEvent`] and keeps track of session
//! discipline so callers can assert that each `start` met its `stop`.

use std::fmt;

use super::Interface;

/// One framing call seen by the recorder
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WireEvent {
    Start,
    Stop,
    Command(u8),
    Data(u8),
}

impl fmt::Display for WireEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WireEvent::Start => write!(f, "START"),
            WireEvent::Stop => write!(f, "STOP"),
            WireEvent::Command(b) => write!(f, "C:{:02X}", b),
            WireEvent::Data(b) => write!(f, "D:{:02X}", b),
        }
    }
}

/// [`Interface`] that stores everything it is asked to send
#[derive(Debug, Default, Clone)]
pub struct RecordingInterface {
    events: Vec<WireEvent>,
    data_mode: bool,
    open: bool,
    starts: usize,
    stops: usize,
    /// `start` while open, `stop` while closed, bytes outside a session
    violations: usize,
}

impl RecordingInterface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> &[WireEvent] {
        &self.events
    }

    pub fn starts(&self) -> usize {
        self.starts
    }

    pub fn stops(&self) -> usize {
        self.stops
    }

    pub fn violations(&self) -> usize {
        self.violations
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Every session closed and no framing misuse seen
    pub fn is_balanced(&self) -> bool {
        self.starts == self.stops && !self.open && self.violations == 0
    }

    /// Bytes sent in command mode, in order
    pub fn commands(&self) -> Vec<u8> {
        self.events
            .iter()
            .filter_map(|e| match e {
                WireEvent::Command(b) => Some(*b),
                _ => None,
            })
            .collect()
    }

    /// Bytes sent in data mode, in order
    pub fn data(&self) -> Vec<u8> {
        self.events
            .iter()
            .filter_map(|e| match e {
                WireEvent::Data(b) => Some(*b),
                _ => None,
            })
            .collect()
    }

    /// Events split into sessions, markers excluded
    pub fn sessions(&self) -> Vec<Vec<WireEvent>> {
        let mut out = Vec::new();
        let mut current = Vec::new();
        for event in &self.events {
            match event {
                WireEvent::Start => current.clear(),
                WireEvent::Stop => out.push(std::mem::take(&mut current)),
                other => current.push(*other),
            }
        }
        out
    }

    /// Forgets recorded events, keeping the session state
    pub fn clear(&mut self) {
        self.events.clear();
    }
}

impl Interface for RecordingInterface {
    fn start(&mut self) {
        if self.open {
            self.violations += 1;
        }
        self.open = true;
        self.starts += 1;
        self.events.push(WireEvent::Start);
    }

    fn stop(&mut self) {
        if !self.open {
            self.violations += 1;
        }
        self.open = false;
        self.stops += 1;
        self.events.push(WireEvent::Stop);
    }

    fn send(&mut self, byte: u8) {
        if !self.open {
            self.violations += 1;
        }
        self.events.push(if self.data_mode {
            WireEvent::Data(byte)
        } else {
            WireEvent::Command(byte)
        });
    }

    fn command_mode(&mut self) {
        self.data_mode = false;
    }

    fn data_mode(&mut self) {
        self.data_mode = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_records_and_balances() {
        let mut intf = RecordingInterface::new();
        intf.start();
        intf.command_mode();
        intf.send(0xAF);
        intf.data_mode();
        intf.send(0x12);
        intf.stop();
        assert!(intf.is_balanced());
        assert_eq!(intf.commands(), vec![0xAF]);
        assert_eq!(intf.data(), vec![0x12]);
        assert_eq!(
            intf.sessions(),
            vec![vec![WireEvent::Command(0xAF), WireEvent::Data(0x12)]]
        );
    }

    #[test]
    fn test_detects_misuse() {
        let mut intf = RecordingInterface::new();
        intf.send(0x00);
        intf.start();
        intf.start();
        intf.stop();
        assert!(!intf.is_balanced());
        assert_eq!(intf.violations(), 2);
        assert_eq!(WireEvent::Data(0x0A).to_string(), "D:0A");
    }
}
