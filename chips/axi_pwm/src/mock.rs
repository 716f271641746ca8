// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2022.

//! Test doubles for the platform bus, clock, registers and PWM registry.
//!
//! Every double appends to a shared [`EventLog`] so tests can assert the
//! order in which the driver touched them.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use kernel::hil::pwm::{ChipId, PwmRegistry};
use kernel::platform::bus::{MemoryRegion, PlatformDevice, RegisterIo};
use kernel::platform::ClockInterface;
use kernel::utilities::registers::interfaces::{Readable, Writeable};
use kernel::utilities::registers::InMemoryRegister;
use kernel::ErrorCode;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Event {
    Map,
    Unmap,
    GetClock,
    PutClock,
    Enable,
    Disable,
    AddChip(usize),
    RemoveChip,
    Read(usize),
    Write(usize, u32),
}

impl Event {
    fn is_register_access(&self) -> bool {
        matches!(self, Event::Read(_) | Event::Write(_, _))
    }
}

#[derive(Clone, Default)]
pub(crate) struct EventLog(Rc<RefCell<Vec<Event>>>);

impl EventLog {
    fn push(&self, event: Event) {
        self.0.borrow_mut().push(event);
    }

    pub(crate) fn all(&self) -> Vec<Event> {
        self.0.borrow().clone()
    }

    /// Everything except register reads and writes.
    pub(crate) fn lifecycle(&self) -> Vec<Event> {
        self.0
            .borrow()
            .iter()
            .copied()
            .filter(|e| !e.is_register_access())
            .collect()
    }

    pub(crate) fn clear(&self) {
        self.0.borrow_mut().clear();
    }
}

pub(crate) const WINDOW_SIZE: usize = 0x10;

/// A register window backed by plain memory.
pub(crate) struct MockRegisters {
    words: Rc<Vec<InMemoryRegister<u32>>>,
    log: EventLog,
}

impl MockRegisters {
    pub(crate) fn new() -> MockRegisters {
        MockRegisters::with_log(EventLog::default())
    }

    fn with_log(log: EventLog) -> MockRegisters {
        let words = (0..WINDOW_SIZE / 4).map(|_| InMemoryRegister::new(0)).collect();
        MockRegisters {
            words: Rc::new(words),
            log,
        }
    }

    fn share(&self) -> MockRegisters {
        MockRegisters {
            words: Rc::clone(&self.words),
            log: self.log.clone(),
        }
    }

    /// Read a register without logging it.
    pub(crate) fn peek(&self, offset: usize) -> u32 {
        self.words[offset / 4].get()
    }

    /// Latch a value as the hardware would, without logging it.
    pub(crate) fn poke(&self, offset: usize, value: u32) {
        self.words[offset / 4].set(value);
    }

    pub(crate) fn log(&self) -> &EventLog {
        &self.log
    }
}

impl RegisterIo for MockRegisters {
    fn read32(&self, offset: usize) -> u32 {
        self.log.push(Event::Read(offset));
        self.peek(offset)
    }

    fn write32(&self, offset: usize, value: u32) {
        self.log.push(Event::Write(offset, value));
        self.poke(offset, value);
    }
}

pub(crate) struct MockClock {
    rate: Result<u32, ErrorCode>,
    enabled: Cell<bool>,
    fail_enable: bool,
    fail_disable: bool,
    log: EventLog,
}

impl ClockInterface for MockClock {
    fn get_rate_hz(&self) -> Result<u32, ErrorCode> {
        self.rate
    }

    fn is_enabled(&self) -> bool {
        self.enabled.get()
    }

    fn enable(&self) -> Result<(), ErrorCode> {
        self.log.push(Event::Enable);
        if self.fail_enable {
            return Err(ErrorCode::FAIL);
        }
        self.enabled.set(true);
        Ok(())
    }

    fn disable(&self) -> Result<(), ErrorCode> {
        self.log.push(Event::Disable);
        if self.fail_disable || !self.enabled.get() {
            return Err(ErrorCode::ALREADY);
        }
        self.enabled.set(false);
        Ok(())
    }
}

/// A platform device with one register window and one clock.
pub(crate) struct MockPlatform {
    region: Option<MemoryRegion>,
    fail_map: bool,
    fail_unmap: bool,
    clock_present: bool,
    rate: Result<u32, ErrorCode>,
    fail_enable: bool,
    fail_disable: bool,
    registers: MockRegisters,
    mappings: Cell<usize>,
    clocks: Cell<usize>,
    log: EventLog,
}

impl MockPlatform {
    pub(crate) fn new(rate_hz: u32) -> MockPlatform {
        let log = EventLog::default();
        MockPlatform {
            region: Some(MemoryRegion::new(0x43c0_0000, WINDOW_SIZE)),
            fail_map: false,
            fail_unmap: false,
            clock_present: true,
            rate: Ok(rate_hz),
            fail_enable: false,
            fail_disable: false,
            registers: MockRegisters::with_log(log.clone()),
            mappings: Cell::new(0),
            clocks: Cell::new(0),
            log,
        }
    }

    pub(crate) fn without_region(mut self) -> Self {
        self.region = None;
        self
    }

    pub(crate) fn failing_map(mut self) -> Self {
        self.fail_map = true;
        self
    }

    pub(crate) fn failing_unmap(mut self) -> Self {
        self.fail_unmap = true;
        self
    }

    pub(crate) fn without_clock(mut self) -> Self {
        self.clock_present = false;
        self
    }

    pub(crate) fn unreadable_rate(mut self) -> Self {
        self.rate = Err(ErrorCode::NOSUPPORT);
        self
    }

    pub(crate) fn failing_enable(mut self) -> Self {
        self.fail_enable = true;
        self
    }

    pub(crate) fn failing_disable(mut self) -> Self {
        self.fail_disable = true;
        self
    }

    pub(crate) fn registers(&self) -> &MockRegisters {
        &self.registers
    }

    /// Mappings handed out and not yet unmapped.
    pub(crate) fn live_mappings(&self) -> usize {
        self.mappings.get()
    }

    /// Clocks handed out and not yet put back.
    pub(crate) fn live_clocks(&self) -> usize {
        self.clocks.get()
    }

    pub(crate) fn log(&self) -> &EventLog {
        &self.log
    }
}

impl PlatformDevice for MockPlatform {
    type Registers = MockRegisters;
    type Clock = MockClock;

    fn memory_resource(&self, index: usize) -> Option<MemoryRegion> {
        if index == 0 {
            self.region
        } else {
            None
        }
    }

    fn map_region(&self, _region: MemoryRegion) -> Result<MockRegisters, ErrorCode> {
        self.log.push(Event::Map);
        if self.fail_map {
            return Err(ErrorCode::NOMEM);
        }
        self.mappings.set(self.mappings.get() + 1);
        Ok(self.registers.share())
    }

    fn unmap_region(&self, _registers: MockRegisters) -> Result<(), ErrorCode> {
        self.log.push(Event::Unmap);
        self.mappings.set(self.mappings.get() - 1);
        if self.fail_unmap {
            return Err(ErrorCode::FAIL);
        }
        Ok(())
    }

    fn get_clock(&self) -> Result<MockClock, ErrorCode> {
        self.log.push(Event::GetClock);
        if !self.clock_present {
            return Err(ErrorCode::NODEVICE);
        }
        self.clocks.set(self.clocks.get() + 1);
        Ok(MockClock {
            rate: self.rate,
            enabled: Cell::new(false),
            fail_enable: self.fail_enable,
            fail_disable: self.fail_disable,
            log: self.log.clone(),
        })
    }

    fn put_clock(&self, _clock: MockClock) {
        self.log.push(Event::PutClock);
        self.clocks.set(self.clocks.get() - 1);
    }
}

/// A PWM dispatch layer that only records registrations.
pub(crate) struct MockRegistry {
    next_id: Cell<usize>,
    chips: Cell<usize>,
    fail_add: bool,
    fail_remove: bool,
    log: EventLog,
}

impl MockRegistry {
    pub(crate) fn new(platform: &MockPlatform) -> MockRegistry {
        MockRegistry {
            next_id: Cell::new(0),
            chips: Cell::new(0),
            fail_add: false,
            fail_remove: false,
            log: platform.log().clone(),
        }
    }

    pub(crate) fn failing_add(mut self) -> Self {
        self.fail_add = true;
        self
    }

    pub(crate) fn failing_remove(mut self) -> Self {
        self.fail_remove = true;
        self
    }

    /// Chips currently registered.
    pub(crate) fn live_chips(&self) -> usize {
        self.chips.get()
    }
}

impl PwmRegistry for MockRegistry {
    fn add_chip(&self, npwm: usize) -> Result<ChipId, ErrorCode> {
        self.log.push(Event::AddChip(npwm));
        if self.fail_add {
            return Err(ErrorCode::BUSY);
        }
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        self.chips.set(self.chips.get() + 1);
        Ok(ChipId(id))
    }

    fn remove_chip(&self, _chip: ChipId) -> Result<(), ErrorCode> {
        self.log.push(Event::RemoveChip);
        self.chips.set(self.chips.get() - 1);
        if self.fail_remove {
            return Err(ErrorCode::FAIL);
        }
        Ok(())
    }
}
