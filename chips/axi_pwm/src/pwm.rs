// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2022.

//! The PWM channel of the AXI PWM core.
//!
//! Usage
//! -----
//!
//! ```rust,ignore
//! let period = ClockPeriod::from_rate_hz(100_000_000)?;   // 10 ns
//! let pwm = AxiPwm::new(registers, layout, period);
//! pwm.config(5, 10)?;                                     // UP = 2, DOWN = 2
//! let measured = pwm.capture(0)?;
//! ```
//!
//! Quantization
//! ------------
//!
//! The core counts in whole clock cycles and all arithmetic is integer
//! division against the clock period `clk`:
//!
//! * config: `UP = clk / duty`, `DOWN = clk / (clk - duty)`
//! * capture: `period = clk / (UP + DOWN)`, `duty = clk / UP`
//!
//! A configured waveform therefore does not read back unchanged. At
//! `clk = 10 ns`, `config(5, 10)` programs `UP = 2, DOWN = 2`, and capturing
//! those counts yields `period = 2 ns, duty = 5 ns`.
//!
//! Limitations
//! -----------
//!
//! * `config` ignores `period_ns`. The output period follows from the fixed
//!   clock period and the requested duty; the core cannot be programmed for
//!   an arbitrary period.
//! * `capture` ignores `timeout_ms` and always returns the counts latched
//!   most recently, however old. There is no averaging or staleness window.

use kernel::hil;
use kernel::hil::pwm::Measurement;
use kernel::platform::bus::RegisterIo;
use kernel::ErrorCode;

use crate::clock::ClockPeriod;
use crate::registers::RegisterLayout;

/// Channels exposed by one core.
pub const NUM_CHANNELS: usize = 1;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// Duty is zero, or not shorter than the clock period.
    InvalidDutyCycle,
}

impl From<ConfigError> for ErrorCode {
    fn from(_: ConfigError) -> ErrorCode {
        ErrorCode::INVAL
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CaptureError {
    /// The latched counts are zero; no waveform has been measured.
    CaptureUnavailable,
}

impl From<CaptureError> for ErrorCode {
    fn from(_: CaptureError) -> ErrorCode {
        ErrorCode::FAIL
    }
}

/// UP_COUNT / DOWN_COUNT register values.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Counts {
    pub up: u32,
    pub down: u32,
}

impl Counts {
    /// Counts that produce `duty_ns` against clock period `clk`.
    pub fn for_duty(clk: ClockPeriod, duty_ns: u32) -> Result<Counts, ConfigError> {
        let clk_ns = clk.as_ns();
        if duty_ns == 0 || duty_ns >= clk_ns {
            return Err(ConfigError::InvalidDutyCycle);
        }
        Ok(Counts {
            up: clk_ns / duty_ns,
            down: clk_ns / (clk_ns - duty_ns),
        })
    }

    /// The waveform these counts describe against clock period `clk`.
    pub fn measurement(self, clk: ClockPeriod) -> Result<Measurement, CaptureError> {
        let clk_ns = clk.as_ns();
        let total = u64::from(self.up) + u64::from(self.down);
        if self.up == 0 || total == 0 {
            return Err(CaptureError::CaptureUnavailable);
        }
        // Both quotients are at most `clk_ns`, so they fit.
        Ok(Measurement {
            period_ns: (u64::from(clk_ns) / total) as u32,
            duty_cycle_ns: clk_ns / self.up,
        })
    }
}

pub struct AxiPwm<R: RegisterIo> {
    registers: R,
    layout: RegisterLayout,
    clock_period: ClockPeriod,
}

impl<R: RegisterIo> AxiPwm<R> {
    pub fn new(registers: R, layout: RegisterLayout, clock_period: ClockPeriod) -> AxiPwm<R> {
        AxiPwm {
            registers,
            layout,
            clock_period,
        }
    }

    pub fn clock_period(&self) -> ClockPeriod {
        self.clock_period
    }

    pub fn layout(&self) -> RegisterLayout {
        self.layout
    }

    /// Program the generate counters for `duty_ns`. `period_ns` is accepted
    /// for interface compatibility and not used.
    pub fn config(&self, duty_ns: u32, _period_ns: u32) -> Result<(), ConfigError> {
        let counts = Counts::for_duty(self.clock_period, duty_ns)?;
        let bank = self.layout.generate;
        // Both counters change together or not at all as seen by capture.
        critical_section::with(|_| {
            self.registers.write32(bank.up, counts.up);
            self.registers.write32(bank.down, counts.down);
        });
        Ok(())
    }

    /// Read the capture counters and convert them to nanoseconds.
    /// `timeout_ms` is currently not used.
    pub fn capture(&self, _timeout_ms: u32) -> Result<Measurement, CaptureError> {
        let bank = self.layout.capture;
        let counts = critical_section::with(|_| Counts {
            up: self.registers.read32(bank.up),
            down: self.registers.read32(bank.down),
        });
        counts.measurement(self.clock_period)
    }

    pub fn into_registers(self) -> R {
        self.registers
    }
}

impl<R: RegisterIo> hil::pwm::PwmChip for AxiPwm<R> {
    fn channel_count(&self) -> usize {
        NUM_CHANNELS
    }

    fn config(&self, duty_ns: u32, period_ns: u32) -> Result<(), ErrorCode> {
        AxiPwm::config(self, duty_ns, period_ns).map_err(ErrorCode::from)
    }

    fn capture(&self, timeout_ms: u32) -> Result<Measurement, ErrorCode> {
        AxiPwm::capture(self, timeout_ms).map_err(ErrorCode::from)
    }
}
