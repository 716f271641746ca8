// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2022.

//! Interfaces for Pulse Width Modulation (PWM) controllers with capture.
//!
//! A [`PwmChip`] is the device-facing half: it programs a waveform and reads
//! back a measured one. A [`PwmRegistry`] is the dispatch-facing half: chips
//! register with it once they are ready and unregister before they go away.
//! All times are in nanoseconds.

use crate::ErrorCode;

/// A waveform measured by PWM capture.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Measurement {
    pub period_ns: u32,
    pub duty_cycle_ns: u32,
}

/// Handle returned by [`PwmRegistry::add_chip`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChipId(pub usize);

pub trait PwmChip {
    /// Number of channels the chip exposes.
    fn channel_count(&self) -> usize;

    /// Program the output waveform.
    ///
    /// Implementations may quantize both values to their clock; see the
    /// chip's documentation for which parts of the request are honored.
    fn config(&self, duty_ns: u32, period_ns: u32) -> Result<(), ErrorCode>;

    /// Return the most recently measured input waveform.
    ///
    /// `timeout_ms` bounds how long the caller is willing to wait for a
    /// fresh measurement.
    fn capture(&self, timeout_ms: u32) -> Result<Measurement, ErrorCode>;
}

/// The dispatch layer that PWM chips are registered with.
pub trait PwmRegistry {
    /// Make a chip with `npwm` channels available to PWM users.
    fn add_chip(&self, npwm: usize) -> Result<ChipId, ErrorCode>;

    /// Withdraw a chip added with `add_chip`.
    fn remove_chip(&self, chip: ChipId) -> Result<(), ErrorCode>;
}
