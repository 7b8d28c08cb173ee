//! Raspberry Pi backends: servos and digital inputs over GPIO, the
//! character LCD over I2C (HD44780 behind a PCF8574 backpack).

use std::thread;
use std::time::Duration;

use dispenser_traits::{Actuator, Annunciator, DigitalInput, TextDisplay};
use rppal::gpio::{Gpio, InputPin, OutputPin};
use rppal::i2c::I2c;

use crate::HwError;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

fn gpio_err(e: rppal::gpio::Error) -> HwError {
    HwError::Gpio(e.to_string())
}

fn bus_err(e: rppal::i2c::Error) -> HwError {
    HwError::Bus(e.to_string())
}

const SERVO_PERIOD_US: f64 = 20_000.0;
const SERVO_MIN_PULSE_US: f64 = 500.0;
const SERVO_MAX_PULSE_US: f64 = 2500.0;

/// Hobby servo on a GPIO pin, driven with software PWM at 50 Hz.
pub struct ServoPin {
    pin: OutputPin,
    slot: usize,
}

impl ServoPin {
    pub fn new(bcm_pin: u8, slot: usize) -> Result<Self, HwError> {
        let pin = Gpio::new()
            .map_err(gpio_err)?
            .get(bcm_pin)
            .map_err(gpio_err)?
            .into_output();
        Ok(Self { pin, slot })
    }
}

impl Actuator for ServoPin {
    fn move_to(&mut self, degrees: f32) -> Result<(), BoxError> {
        // The mechanism uses standard 180-degree hobby servos.
        let deg = f64::from(degrees).clamp(0.0, 180.0);
        let pulse = SERVO_MIN_PULSE_US + deg / 180.0 * (SERVO_MAX_PULSE_US - SERVO_MIN_PULSE_US);
        tracing::trace!(slot = self.slot, degrees, pulse_us = pulse, "servo pwm");
        self.pin
            .set_pwm_frequency(50.0, pulse / SERVO_PERIOD_US)
            .map_err(|e| Box::new(gpio_err(e)) as BoxError)
    }
}

/// Digital input with configurable polarity. The vibration switch pulls
/// the line high when rattled; the outlet break-beam goes low while the
/// beam is interrupted, so it is registered active-low.
pub struct GpioInput {
    pin: InputPin,
    active_high: bool,
}

impl GpioInput {
    pub fn new(bcm_pin: u8, active_high: bool) -> Result<Self, HwError> {
        let pin = Gpio::new()
            .map_err(gpio_err)?
            .get(bcm_pin)
            .map_err(gpio_err)?
            .into_input_pullup();
        Ok(Self { pin, active_high })
    }
}

impl DigitalInput for GpioInput {
    fn is_active(&mut self) -> Result<bool, BoxError> {
        Ok(self.pin.is_high() == self.active_high)
    }
}

/// Buzzer plus green/red status LEDs, each optional.
pub struct GpioAnnunciator {
    buzzer: Option<OutputPin>,
    green: Option<OutputPin>,
    red: Option<OutputPin>,
}

impl GpioAnnunciator {
    pub fn new(
        buzzer_pin: Option<u8>,
        green_pin: Option<u8>,
        red_pin: Option<u8>,
    ) -> Result<Self, HwError> {
        let gpio = Gpio::new().map_err(gpio_err)?;
        let out = |pin: Option<u8>| -> Result<Option<OutputPin>, HwError> {
            pin.map(|p| gpio.get(p).map(rppal::gpio::Pin::into_output).map_err(gpio_err))
                .transpose()
        };
        Ok(Self {
            buzzer: out(buzzer_pin)?,
            green: out(green_pin)?,
            red: out(red_pin)?,
        })
    }
}

impl Annunciator for GpioAnnunciator {
    fn beep(&mut self, times: u8, pulse_ms: u64) -> Result<(), BoxError> {
        if let Some(buzzer) = self.buzzer.as_mut() {
            for _ in 0..times {
                buzzer.set_high();
                thread::sleep(Duration::from_millis(pulse_ms));
                buzzer.set_low();
                thread::sleep(Duration::from_millis(pulse_ms));
            }
        }
        Ok(())
    }

    fn set_leds(&mut self, green: bool, red: bool) -> Result<(), BoxError> {
        for (pin, on) in [(self.green.as_mut(), green), (self.red.as_mut(), red)] {
            if let Some(pin) = pin {
                if on {
                    pin.set_high();
                } else {
                    pin.set_low();
                }
            }
        }
        Ok(())
    }
}

const LCD_RS: u8 = 0b0000_0001;
const LCD_ENABLE: u8 = 0b0000_0100;
const LCD_BACKLIGHT: u8 = 0b0000_1000;

/// HD44780 16x2 LCD behind a PCF8574 I2C backpack, in 4-bit mode.
pub struct I2cLcd {
    bus: I2c,
    width: usize,
}

impl I2cLcd {
    pub fn new(addr: u16, width: usize) -> Result<Self, HwError> {
        let mut bus = I2c::new().map_err(bus_err)?;
        bus.set_slave_address(addr).map_err(bus_err)?;
        let mut lcd = Self { bus, width };
        lcd.init()?;
        Ok(lcd)
    }

    fn write_nibble(&mut self, nibble: u8, rs: bool) -> Result<(), HwError> {
        let byte = (nibble << 4) | LCD_BACKLIGHT | if rs { LCD_RS } else { 0 };
        self.bus.write(&[byte | LCD_ENABLE]).map_err(bus_err)?;
        thread::sleep(Duration::from_micros(1));
        self.bus.write(&[byte]).map_err(bus_err)?;
        thread::sleep(Duration::from_micros(50));
        Ok(())
    }

    fn command(&mut self, cmd: u8) -> Result<(), HwError> {
        self.write_nibble(cmd >> 4, false)?;
        self.write_nibble(cmd & 0x0f, false)
    }

    fn data(&mut self, byte: u8) -> Result<(), HwError> {
        self.write_nibble(byte >> 4, true)?;
        self.write_nibble(byte & 0x0f, true)
    }

    fn init(&mut self) -> Result<(), HwError> {
        thread::sleep(Duration::from_millis(50));
        // Reset sequence into 4-bit mode.
        for _ in 0..3 {
            self.write_nibble(0x03, false)?;
            thread::sleep(Duration::from_millis(5));
        }
        self.write_nibble(0x02, false)?;
        self.command(0x28)?; // two lines, 5x8 font
        self.command(0x0c)?; // display on, cursor off
        self.command(0x06)?; // entry mode: increment, no shift
        self.command(0x01)?; // clear
        thread::sleep(Duration::from_millis(2));
        Ok(())
    }
}

impl TextDisplay for I2cLcd {
    fn rows(&self) -> usize {
        2
    }

    fn write_row(&mut self, row: usize, text: &str) -> Result<(), BoxError> {
        if row > 1 {
            return Err(Box::new(HwError::Bus(format!("row {row} out of range"))));
        }
        let base: u8 = if row == 0 { 0x80 } else { 0xc0 };
        self.command(base).map_err(Box::new)?;
        for ch in text.chars().take(self.width) {
            let byte = if ch.is_ascii() { ch as u8 } else { b'?' };
            self.data(byte).map_err(Box::new)?;
        }
        Ok(())
    }
}
