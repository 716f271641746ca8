// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2022.

//! Register map of the AXI PWM core.
//!
//! The core has two counter banks. The generate bank holds the UP_COUNT and
//! DOWN_COUNT values that shape the output waveform; the capture bank holds
//! the counts latched from the input waveform. Each register is 32 bits
//! wide and read/write.
//!
//! Offsets depend on how the core was synthesized, so they are supplied by
//! the board as a [`RegisterLayout`] rather than fixed here. The layout is
//! checked against the mapped window at attach time.

use core::fmt;

use kernel::platform::bus::MemoryRegion;
use kernel::ErrorCode;

const REGISTER_SIZE: usize = 4;

/// Byte offsets of one UP_COUNT / DOWN_COUNT pair.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CounterOffsets {
    pub up: usize,
    pub down: usize,
}

/// Which counter bank a register belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Bank {
    Generate,
    Capture,
}

/// Byte offsets of every register the driver touches.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RegisterLayout {
    pub generate: CounterOffsets,
    pub capture: CounterOffsets,
}

/// The register map published with the IP's reference driver. Every counter
/// sits at offset `0x0`, so UP and DOWN alias each other. [`validate`]
/// rejects it; boards must supply the offsets of their synthesized core.
///
/// [`validate`]: RegisterLayout::validate
pub const REFERENCE_LAYOUT: RegisterLayout = RegisterLayout {
    generate: CounterOffsets { up: 0x0, down: 0x0 },
    capture: CounterOffsets { up: 0x0, down: 0x0 },
};

/// Why a [`RegisterLayout`] was rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LayoutError {
    /// The offset is not a multiple of the register width.
    Misaligned { offset: usize },
    /// The register does not fit inside the mapped window.
    OutOfRange { offset: usize },
    /// UP_COUNT and DOWN_COUNT of one bank share an offset.
    Aliased { bank: Bank },
}

impl fmt::Display for LayoutError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LayoutError::Misaligned { offset } => write!(f, "register {:#x} misaligned", offset),
            LayoutError::OutOfRange { offset } => {
                write!(f, "register {:#x} outside mapped window", offset)
            }
            LayoutError::Aliased { bank } => write!(f, "{:?} UP and DOWN share an offset", bank),
        }
    }
}

impl From<LayoutError> for ErrorCode {
    fn from(_: LayoutError) -> ErrorCode {
        ErrorCode::INVAL
    }
}

impl RegisterLayout {
    /// A core whose generate and capture banks are the same UP/DOWN pair.
    pub const fn single_bank(up: usize, down: usize) -> RegisterLayout {
        RegisterLayout {
            generate: CounterOffsets { up, down },
            capture: CounterOffsets { up, down },
        }
    }

    /// Check every offset against the window the registers are mapped in.
    pub fn validate(&self, region: MemoryRegion) -> Result<(), LayoutError> {
        for (bank, pair) in [(Bank::Generate, self.generate), (Bank::Capture, self.capture)] {
            for offset in [pair.up, pair.down] {
                if offset % REGISTER_SIZE != 0 {
                    return Err(LayoutError::Misaligned { offset });
                }
                if !region.contains(offset, REGISTER_SIZE) {
                    return Err(LayoutError::OutOfRange { offset });
                }
            }
            if pair.up == pair.down {
                return Err(LayoutError::Aliased { bank });
            }
        }
        Ok(())
    }
}
