use crate::{Result, TeleopError};
use rover_command::PwmProfile;
use serde::{Deserialize, Serialize};
use std::net::{IpAddr, SocketAddr};
use std::path::Path;
use std::time::Duration;

/// Runtime settings. Every field has a default, so a config file only needs
/// the values it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TeleopConfig {
    /// Rover address for UDP command packets (IP or hostname).
    pub destination_host: String,
    pub destination_port: u16,
    /// WebSocket listen address for viewer clients.
    pub bind_host: String,
    pub bind_port: u16,
    pub poll_period_ms: u64,
    /// How often the quit signal is checked between polls.
    pub idle_period_ms: u64,
    /// Upper bound on one WebSocket send before the client is dropped.
    pub stream_send_timeout_ms: u64,
    pub pwm: PwmProfile,
}

impl Default for TeleopConfig {
    fn default() -> Self {
        Self {
            destination_host: "127.0.0.1".to_string(),
            destination_port: 12345,
            bind_host: "0.0.0.0".to_string(),
            bind_port: 8080,
            poll_period_ms: 100,
            idle_period_ms: 10,
            stream_send_timeout_ms: 50,
            pwm: PwmProfile::default(),
        }
    }
}

impl TeleopConfig {
    /// Read a JSON config file. A missing file yields the defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            tracing::info!(path = %path.display(), "config file not found, using defaults");
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    pub fn from_json(contents: &str) -> Result<Self> {
        serde_json::from_str(contents).map_err(|e| TeleopError::InvalidConfig(e.to_string()))
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| TeleopError::InvalidConfig(e.to_string()))
    }

    /// Reject settings the loop cannot run with.
    pub fn validate(&self) -> Result<()> {
        let invalid = |msg: String| Err(TeleopError::InvalidConfig(msg));

        if self.destination_host.trim().is_empty() {
            return invalid("destination_host is empty".to_string());
        }
        if self.destination_port == 0 {
            return invalid("destination_port must be non-zero".to_string());
        }
        self.bind_addr()?;
        if self.poll_period_ms == 0 {
            return invalid("poll_period_ms must be non-zero".to_string());
        }
        if self.idle_period_ms == 0 {
            return invalid("idle_period_ms must be non-zero".to_string());
        }
        if self.stream_send_timeout_ms == 0 {
            return invalid("stream_send_timeout_ms must be non-zero".to_string());
        }

        let p = &self.pwm;
        if !(p.reverse <= p.center && p.center <= p.forward) {
            return invalid(format!(
                "pwm values must satisfy reverse <= center <= forward (got {} / {} / {})",
                p.reverse, p.center, p.forward
            ));
        }
        if !(0.0..=1.0).contains(&p.deadzone) {
            return invalid(format!("pwm.deadzone must be within 0..=1 (got {})", p.deadzone));
        }
        Ok(())
    }

    pub fn bind_addr(&self) -> Result<SocketAddr> {
        let ip: IpAddr = self.bind_host.trim().parse().map_err(|_| {
            TeleopError::InvalidConfig(format!("bind_host is not an IP address: {}", self.bind_host))
        })?;
        Ok(SocketAddr::new(ip, self.bind_port))
    }

    /// Resolve the rover address, preferring the first result.
    pub async fn resolve_destination(&self) -> Result<SocketAddr> {
        let target = (self.destination_host.trim(), self.destination_port);
        let mut addrs = tokio::net::lookup_host(target)
            .await
            .map_err(|e| TeleopError::Resolve(format!("{}: {e}", self.destination_host)))?;
        addrs
            .next()
            .ok_or_else(|| TeleopError::Resolve(format!("{}: no addresses", self.destination_host)))
    }

    pub fn poll_period(&self) -> Duration {
        Duration::from_millis(self.poll_period_ms)
    }

    pub fn idle_period(&self) -> Duration {
        Duration::from_millis(self.idle_period_ms)
    }

    pub fn stream_send_timeout(&self) -> Duration {
        Duration::from_millis(self.stream_send_timeout_ms)
    }
}
