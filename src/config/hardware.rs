//! # Hardware wiring.
//!
//! [`HardwareConfig`] names the pins of the button and both status LEDs, in the
//! GPIO driver's numbering scheme, plus the minimum spacing between qualifying
//! presses.

use std::time::Duration;

use crate::error::ConfigError;

/// Immutable hardware wiring of the unit.
///
/// Constructed once at startup through [`HardwareConfig::new`], which rejects
/// shared pins and a zero debounce interval.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HardwareConfig {
    button_pin: u8,
    led_running_pin: u8,
    led_stopped_pin: u8,
    debounce: Duration,
}

impl HardwareConfig {
    /// Pin wiring of the reference unit (header pins 12, 16, 18).
    pub const DEFAULT_BUTTON_PIN: u8 = 18;
    pub const DEFAULT_LED_RUNNING_PIN: u8 = 23;
    pub const DEFAULT_LED_STOPPED_PIN: u8 = 24;
    pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(100);

    /// Validates and builds the wiring.
    pub fn new(
        button_pin: u8,
        led_running_pin: u8,
        led_stopped_pin: u8,
        debounce: Duration,
    ) -> Result<Self, ConfigError> {
        if button_pin == led_running_pin || button_pin == led_stopped_pin {
            return Err(ConfigError::invalid(
                "button_pin",
                format!("pin {button_pin} is also used by an LED"),
            ));
        }
        if led_running_pin == led_stopped_pin {
            return Err(ConfigError::invalid(
                "led_stopped_pin",
                format!("pin {led_stopped_pin} is shared by both LEDs"),
            ));
        }
        if debounce.is_zero() {
            return Err(ConfigError::invalid("debounce", "must be greater than zero"));
        }
        Ok(Self {
            button_pin,
            led_running_pin,
            led_stopped_pin,
            debounce,
        })
    }

    #[inline]
    pub fn button_pin(&self) -> u8 {
        self.button_pin
    }

    #[inline]
    pub fn led_running_pin(&self) -> u8 {
        self.led_running_pin
    }

    #[inline]
    pub fn led_stopped_pin(&self) -> u8 {
        self.led_stopped_pin
    }

    /// Minimum spacing between two qualifying button presses.
    #[inline]
    pub fn debounce(&self) -> Duration {
        self.debounce
    }
}

impl Default for HardwareConfig {
    fn default() -> Self {
        Self {
            button_pin: Self::DEFAULT_BUTTON_PIN,
            led_running_pin: Self::DEFAULT_LED_RUNNING_PIN,
            led_stopped_pin: Self::DEFAULT_LED_STOPPED_PIN,
            debounce: Self::DEFAULT_DEBOUNCE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_wiring_is_valid() {
        let d = HardwareConfig::default();
        let checked = HardwareConfig::new(
            d.button_pin(),
            d.led_running_pin(),
            d.led_stopped_pin(),
            d.debounce(),
        )
        .unwrap();
        assert_eq!(checked, d);
    }

    #[test]
    fn rejects_shared_pins() {
        let err = HardwareConfig::new(18, 18, 24, Duration::from_millis(100)).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { field: "button_pin", .. }));

        let err = HardwareConfig::new(18, 23, 23, Duration::from_millis(100)).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { field: "led_stopped_pin", .. }));
    }

    #[test]
    fn rejects_zero_debounce() {
        let err = HardwareConfig::new(18, 23, 24, Duration::ZERO).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { field: "debounce", .. }));
    }
}
