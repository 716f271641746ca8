// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2022.

//! Interfaces between chip drivers and the platform they run on.

use crate::ErrorCode;

pub mod bus;

/// Generic operations that clock-like things are expected to support.
pub trait ClockInterface {
    /// Current frequency of the clock in Hz.
    fn get_rate_hz(&self) -> Result<u32, ErrorCode>;
    fn is_enabled(&self) -> bool;
    fn enable(&self) -> Result<(), ErrorCode>;
    fn disable(&self) -> Result<(), ErrorCode>;
}

/// Helper struct for peripherals whose clock runs at a fixed rate and has no
/// gate control. Enabling and disabling always succeed and change nothing.
#[derive(Clone, Copy, Debug)]
pub struct FixedClock {
    rate_hz: u32,
}

impl FixedClock {
    pub const fn new(rate_hz: u32) -> FixedClock {
        FixedClock { rate_hz }
    }
}

impl ClockInterface for FixedClock {
    fn get_rate_hz(&self) -> Result<u32, ErrorCode> {
        Ok(self.rate_hz)
    }

    fn is_enabled(&self) -> bool {
        true
    }

    fn enable(&self) -> Result<(), ErrorCode> {
        Ok(())
    }

    fn disable(&self) -> Result<(), ErrorCode> {
        Ok(())
    }
}
