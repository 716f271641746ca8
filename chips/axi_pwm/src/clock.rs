// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2022.

//! Clock period of the PWM core.

use core::num::NonZeroU32;

use kernel::platform::ClockInterface;
use kernel::ErrorCode;

pub const NSEC_PER_SEC: u32 = 1_000_000_000;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClockError {
    /// The rate could not be read, or it does not give a whole nanosecond
    /// period (zero, or above 1 GHz).
    ClockUnavailable,
}

impl From<ClockError> for ErrorCode {
    fn from(_: ClockError) -> ErrorCode {
        ErrorCode::OFF
    }
}

/// Nanoseconds per cycle of the core's clock. Always at least 1.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct ClockPeriod(NonZeroU32);

impl ClockPeriod {
    /// `1_000_000_000 / rate_hz`, truncated. Any fraction of a nanosecond is
    /// lost.
    pub fn from_rate_hz(rate_hz: u32) -> Result<ClockPeriod, ClockError> {
        if rate_hz == 0 {
            return Err(ClockError::ClockUnavailable);
        }
        NonZeroU32::new(NSEC_PER_SEC / rate_hz)
            .map(ClockPeriod)
            .ok_or(ClockError::ClockUnavailable)
    }

    /// Period of whatever rate `clock` currently runs at.
    pub fn from_clock<C: ClockInterface + ?Sized>(clock: &C) -> Result<ClockPeriod, ClockError> {
        let rate_hz = clock
            .get_rate_hz()
            .map_err(|_| ClockError::ClockUnavailable)?;
        ClockPeriod::from_rate_hz(rate_hz)
    }

    pub fn as_ns(self) -> u32 {
        self.0.get()
    }
}

/// Clock period in nanoseconds for a clock running at `rate_hz`.
pub fn clock_period_ns(rate_hz: u32) -> Result<ClockPeriod, ClockError> {
    ClockPeriod::from_rate_hz(rate_hz)
}

#[cfg(test)]
mod tests {
    use super::*;
    use kernel::platform::FixedClock;

    struct UnreadableClock;

    impl ClockInterface for UnreadableClock {
        fn get_rate_hz(&self) -> Result<u32, ErrorCode> {
            Err(ErrorCode::NODEVICE)
        }
        fn is_enabled(&self) -> bool {
            false
        }
        fn enable(&self) -> Result<(), ErrorCode> {
            Err(ErrorCode::NODEVICE)
        }
        fn disable(&self) -> Result<(), ErrorCode> {
            Err(ErrorCode::NODEVICE)
        }
    }

    #[test]
    fn truncating_division() {
        for rate_hz in [
            1,
            3,
            7,
            1_000,
            33_333_333,
            50_000_000,
            100_000_000,
            150_000_000,
            333_333_333,
            999_999_999,
            NSEC_PER_SEC,
        ] {
            assert_eq!(
                clock_period_ns(rate_hz).map(ClockPeriod::as_ns),
                Ok(NSEC_PER_SEC / rate_hz),
                "rate {} Hz",
                rate_hz
            );
        }
        assert_eq!(clock_period_ns(100_000_000).unwrap().as_ns(), 10);
        assert_eq!(clock_period_ns(50_000_000).unwrap().as_ns(), 20);
        assert_eq!(clock_period_ns(150_000_000).unwrap().as_ns(), 6);
    }

    #[test]
    fn zero_rate_is_unavailable() {
        assert_eq!(clock_period_ns(0), Err(ClockError::ClockUnavailable));
    }

    #[test]
    fn sub_nanosecond_period_is_unavailable() {
        assert_eq!(
            clock_period_ns(NSEC_PER_SEC + 1),
            Err(ClockError::ClockUnavailable)
        );
        assert_eq!(clock_period_ns(u32::MAX), Err(ClockError::ClockUnavailable));
    }

    #[test]
    fn period_from_clock_service() {
        assert_eq!(
            ClockPeriod::from_clock(&FixedClock::new(50_000_000)).map(ClockPeriod::as_ns),
            Ok(20)
        );
        assert_eq!(
            ClockPeriod::from_clock(&FixedClock::new(0)),
            Err(ClockError::ClockUnavailable)
        );
        assert_eq!(
            ClockPeriod::from_clock(&UnreadableClock),
            Err(ClockError::ClockUnavailable)
        );
        assert_eq!(
            ErrorCode::from(ClockError::ClockUnavailable),
            ErrorCode::OFF
        );
    }
}
