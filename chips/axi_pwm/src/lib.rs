// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2022.

//! Driver for the single-channel AXI PWM IP core.
//!
//! The core generates a PWM waveform from a pair of up/down counter
//! registers and captures an input waveform into a second pair. Both pairs
//! are counted in cycles of the core's AXI clock, so every nanosecond value
//! crossing this driver is quantized to that clock's period.
//!
//! - [`registers`]: where the counter registers live in the mapped window.
//! - [`clock`]: the clock period all arithmetic is quantized to.
//! - [`pwm`]: the channel itself, config and capture.
//! - [`device`]: bringing the core up on a platform bus and tearing it down.
//! - [`driver`]: probe/remove hooks with runtime state tracking.

#![cfg_attr(not(test), no_std)]

pub mod clock;
pub mod device;
pub mod driver;
pub mod pwm;
pub mod registers;

#[cfg(test)]
mod mock;
