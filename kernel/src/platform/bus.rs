// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2022.

//! Platform bus resources: register windows and device clocks.
//!
//! A peripheral found on a platform bus is described by a set of memory
//! regions and a clock. Chip drivers never touch the bus themselves; they
//! ask a [`PlatformDevice`] to map the region and hand out the clock, and
//! give both back when the device goes away.
//!
//! Register windows are accessed through [`RegisterIo`]. On hardware this is
//! [`Mmio`], a volatile 32-bit view over the mapped address range:
//!
//! ```rust,ignore
//! let regs = unsafe { Mmio::new(MemoryRegion::new(0x43C0_0000, 0x1000)) };
//! regs.write32(0x0, 2);
//! let up = regs.read32(0x0);
//! ```

use crate::platform::ClockInterface;
use crate::utilities::registers::interfaces::{Readable, Writeable};
use crate::utilities::registers::ReadWrite;
use crate::utilities::StaticRef;
use crate::ErrorCode;

/// A physical byte address range described by the platform.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MemoryRegion {
    pub start: usize,
    pub size: usize,
}

impl MemoryRegion {
    pub const fn new(start: usize, size: usize) -> MemoryRegion {
        MemoryRegion { start, size }
    }

    /// Whether `len` bytes starting at byte `offset` lie inside the region.
    pub fn contains(&self, offset: usize, len: usize) -> bool {
        offset
            .checked_add(len)
            .is_some_and(|end| end <= self.size)
    }
}

/// Raw 32-bit access to a mapped register window.
///
/// Offsets are byte offsets from the start of the window. Accesses are
/// performed in program order and are never merged or elided.
pub trait RegisterIo {
    fn read32(&self, offset: usize) -> u32;
    fn write32(&self, offset: usize, value: u32);
}

/// A register window accessed through memory-mapped I/O.
#[derive(Debug)]
pub struct Mmio {
    region: MemoryRegion,
}

impl Mmio {
    /// Create a view over an already mapped region.
    ///
    /// ## Safety
    ///
    /// `region.start` must be 4-byte aligned and the whole region must be
    /// mapped, device memory for as long as the `Mmio` exists.
    pub const unsafe fn new(region: MemoryRegion) -> Mmio {
        Mmio { region }
    }

    fn register(&self, offset: usize) -> StaticRef<ReadWrite<u32>> {
        debug_assert!(offset % 4 == 0 && self.region.contains(offset, 4));
        // SAFETY: the region is mapped for the life of `self` and the offset
        // is an aligned register inside it.
        unsafe { StaticRef::new((self.region.start + offset) as *const ReadWrite<u32>) }
    }
}

impl RegisterIo for Mmio {
    fn read32(&self, offset: usize) -> u32 {
        self.register(offset).get()
    }

    fn write32(&self, offset: usize, value: u32) {
        self.register(offset).set(value);
    }
}

/// A device instance on a platform bus.
///
/// Implemented by the platform (or a test double). The methods mirror what a
/// bus hands a driver at attach time and takes back at detach time.
pub trait PlatformDevice {
    /// Accessor for a mapped register window.
    type Registers: RegisterIo;
    /// The device's functional clock.
    type Clock: ClockInterface;

    /// The `index`th memory resource of the device, if described.
    fn memory_resource(&self, index: usize) -> Option<MemoryRegion>;

    /// Map `region` so its registers can be accessed.
    fn map_region(&self, region: MemoryRegion) -> Result<Self::Registers, ErrorCode>;

    /// Release a mapping previously returned by `map_region`.
    fn unmap_region(&self, registers: Self::Registers) -> Result<(), ErrorCode>;

    /// Look up the device's clock.
    fn get_clock(&self) -> Result<Self::Clock, ErrorCode>;

    /// Return a clock obtained from `get_clock`.
    fn put_clock(&self, clock: Self::Clock);
}
