//! Bus configuration
//!
//! One-shot controller setup (clock divisor, pull-ups) plus the timeout
//! used by every bus primitive. With the `serde` feature the configuration
//! can be stored in flash as postcard-serialized binary data.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Default capacity of the internal receive buffer
pub const RECEIVE_BUFFER_LEN: usize = 32;

/// Timeout applied while scanning the bus, regardless of configuration
pub const SCAN_TIMEOUT_MS: u16 = 80;

/// Default CPU clock (Arduino-class boards)
pub const DEFAULT_CPU_HZ: u32 = 16_000_000;

/// Fixed cycles the TWI adds to every SCL period
const SCL_OVERHEAD_CYCLES: u32 = 16;

/// Bus clock preset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum BusSpeed {
    /// Standard mode (100 kHz)
    #[default]
    Standard,
    /// Fast mode (400 kHz)
    Fast,
}

impl BusSpeed {
    /// Select a preset from a fast/slow flag
    pub const fn from_fast(fast: bool) -> Self {
        if fast {
            BusSpeed::Fast
        } else {
            BusSpeed::Standard
        }
    }

    /// SCL frequency in Hz
    pub const fn hz(self) -> u32 {
        match self {
            BusSpeed::Standard => 100_000,
            BusSpeed::Fast => 400_000,
        }
    }

    /// Bit rate register value for a prescaler of 1
    ///
    /// SCL = CPU / (16 + 2 * divisor). Saturates at both ends of the 8-bit
    /// register when the CPU clock is too slow or too fast for the preset.
    pub const fn divisor(self, cpu_hz: u32) -> u8 {
        let cycles = (cpu_hz / self.hz()).saturating_sub(SCL_OVERHEAD_CYCLES) / 2;
        if cycles > u8::MAX as u32 {
            u8::MAX
        } else {
            cycles as u8
        }
    }
}

/// Bus controller configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BusConfig {
    /// CPU clock feeding the controller, in Hz
    pub cpu_hz: u32,
    /// SCL preset
    pub speed: BusSpeed,
    /// Per-phase timeout in milliseconds; 0 waits forever
    pub timeout_ms: u16,
    /// Enable internal pull-ups on setup
    pub pullups: bool,
}

impl Default for BusConfig {
    fn default() -> Self {
        Self {
            cpu_hz: DEFAULT_CPU_HZ,
            speed: BusSpeed::Standard,
            timeout_ms: 0,
            pullups: true,
        }
    }
}

impl BusConfig {
    /// Config for a given CPU clock with everything else defaulted
    pub fn with_cpu_hz(cpu_hz: u32) -> Self {
        Self {
            cpu_hz,
            ..Self::default()
        }
    }

    /// Builder-style timeout setter
    pub fn timeout(mut self, timeout_ms: u16) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Builder-style speed setter
    pub fn speed(mut self, speed: BusSpeed) -> Self {
        self.speed = speed;
        self
    }

    /// Builder-style pull-up setter
    pub fn pullups(mut self, enabled: bool) -> Self {
        self.pullups = enabled;
        self
    }

    /// Bit rate divisor for the configured speed
    pub fn divisor(&self) -> u8 {
        self.speed.divisor(self.cpu_hz)
    }

    /// Whether primitives should give up after `timeout_ms`
    pub fn timeout_enabled(&self) -> bool {
        self.timeout_ms != 0
    }
}

/// Errors from persisting the configuration
#[cfg(feature = "serde")]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Buffer too small or value not encodable
    Serialize,
    /// Stored bytes are not a valid configuration
    Deserialize,
}

#[cfg(feature = "serde")]
impl BusConfig {
    /// Serialize into `buffer`, returning the used prefix
    pub fn to_slice<'a>(&self, buffer: &'a mut [u8]) -> Result<&'a mut [u8], ConfigError> {
        postcard::to_slice(self, buffer).map_err(|_| ConfigError::Serialize)
    }

    /// Deserialize a configuration previously written by [`to_slice`](Self::to_slice)
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ConfigError> {
        postcard::from_bytes(bytes).map_err(|_| ConfigError::Deserialize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = BusConfig::default();
        assert_eq!(config.cpu_hz, 16_000_000);
        assert_eq!(config.speed, BusSpeed::Standard);
        assert!(!config.timeout_enabled());
        assert!(config.pullups);
    }

    #[test]
    fn test_divisor_16mhz() {
        // ((16 MHz / 100 kHz) - 16) / 2 = 72
        assert_eq!(BusSpeed::Standard.divisor(16_000_000), 72);
        // ((16 MHz / 400 kHz) - 16) / 2 = 12
        assert_eq!(BusSpeed::Fast.divisor(16_000_000), 12);
    }

    #[test]
    fn test_divisor_8mhz() {
        assert_eq!(BusSpeed::Standard.divisor(8_000_000), 32);
        assert_eq!(BusSpeed::Fast.divisor(8_000_000), 2);
    }

    #[test]
    fn test_divisor_saturates() {
        // CPU too slow for fast mode
        assert_eq!(BusSpeed::Fast.divisor(1_000_000), 0);
        // CPU fast enough to overflow the register
        assert_eq!(BusSpeed::Standard.divisor(200_000_000), 255);
    }

    #[test]
    fn test_builder() {
        let config = BusConfig::with_cpu_hz(8_000_000)
            .timeout(100)
            .speed(BusSpeed::from_fast(true))
            .pullups(false);
        assert_eq!(config.cpu_hz, 8_000_000);
        assert_eq!(config.timeout_ms, 100);
        assert_eq!(config.speed, BusSpeed::Fast);
        assert!(!config.pullups);
        assert_eq!(config.divisor(), 2);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_persisted_config_survives_storage() {
        let config = BusConfig::default().timeout(250).speed(BusSpeed::Fast);
        let mut buffer = [0u8; 32];
        let used = config.to_slice(&mut buffer).unwrap().len();
        assert_eq!(BusConfig::from_bytes(&buffer[..used]), Ok(config));
    }
}
