// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2022.

//! Core kernel crate shared by the AXI PWM drivers.
//!
//! The kernel crate holds the shared error vocabulary, the debug output
//! machinery, the memory-mapped I/O helpers and the Hardware Interface Layer
//! (HIL) definitions that chip drivers implement and platform code consumes.
//!
//! Most `unsafe` code is in this kernel crate.

#![cfg_attr(not(test), no_std)]
#![warn(unreachable_pub)]

#[macro_use]
pub mod debug;
pub mod errorcode;
pub mod hil;
pub mod platform;
pub mod utilities;

pub use crate::errorcode::ErrorCode;
