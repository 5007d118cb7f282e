//! TLS alert protocol (RFC 5246 Section 7.2).

use crate::error::{AlertDescription, Error, Result};

/// Alert level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum AlertLevel {
    /// Warning (1)
    Warning = 1,

    /// Fatal (2)
    Fatal = 2,
}

impl AlertLevel {
    /// Create from wire format (u8).
    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            1 => Some(AlertLevel::Warning),
            2 => Some(AlertLevel::Fatal),
            _ => None,
        }
    }

    /// Convert to wire format (u8).
    pub const fn to_u8(self) -> u8 {
        self as u8
    }
}

/// Alert record body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Alert {
    /// Alert level
    pub level: AlertLevel,

    /// Alert description
    pub description: AlertDescription,
}

impl Alert {
    /// Create a new alert.
    pub fn new(level: AlertLevel, description: AlertDescription) -> Self {
        Self { level, description }
    }

    /// Fatal alert with the given description.
    pub fn fatal(description: AlertDescription) -> Self {
        Self::new(AlertLevel::Fatal, description)
    }

    /// close_notify, sent at warning level.
    pub fn close_notify() -> Self {
        Self::new(AlertLevel::Warning, AlertDescription::CloseNotify)
    }

    /// Two-byte wire form.
    pub fn encode(&self) -> [u8; 2] {
        [self.level.to_u8(), self.description.to_u8()]
    }

    /// Decode an alert record body; exactly two bytes.
    pub fn decode(data: &[u8]) -> Result<Self> {
        let [level, description] = data else {
            return Err(Error::MalformedMessage(format!(
                "alert must be 2 bytes, got {}",
                data.len()
            )));
        };

        let level = AlertLevel::from_u8(*level)
            .ok_or_else(|| Error::MalformedMessage(format!("invalid alert level {}", level)))?;
        let description = AlertDescription::from_u8(*description).ok_or_else(|| {
            Error::MalformedMessage(format!("invalid alert description {}", description))
        })?;

        Ok(Self { level, description })
    }

    /// True for fatal alerts.
    pub fn is_fatal(&self) -> bool {
        self.level == AlertLevel::Fatal
    }
}
