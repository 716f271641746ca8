// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2022.

//! Bringing an AXI PWM core up on a platform bus and tearing it down.
//!
//! [`attach`] acquires, in order: the register window, the clock (looked up
//! and enabled), and a slot in the PWM dispatch layer. Each resource is held
//! by a guard that gives it back when dropped, so an error part way through
//! releases exactly what was already acquired, newest first.
//!
//! [`AttachedDevice::detach`] releases everything in a fixed order: clock,
//! then register window, then dispatch registration. Every step is attempted
//! even if an earlier one fails. Dropping an `AttachedDevice` without
//! detaching releases the same resources in the same order.

use kernel::{debug, debug_verbose};
use kernel::hil::pwm::{ChipId, PwmRegistry};
use kernel::platform::bus::{MemoryRegion, PlatformDevice, RegisterIo};
use kernel::platform::ClockInterface;
use kernel::ErrorCode;

use crate::clock::{ClockError, ClockPeriod};
use crate::pwm::{AxiPwm, NUM_CHANNELS};
use crate::registers::{LayoutError, RegisterLayout};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AttachError {
    /// No register window is described, or it could not be mapped.
    ResourceUnavailable,
    /// The register layout does not fit the described window.
    InvalidRegisterLayout(LayoutError),
    /// The clock is missing, would not enable, or has an unusable rate.
    ClockUnavailable,
    /// The PWM dispatch layer refused the chip.
    RegistrationFailed(ErrorCode),
}

impl From<AttachError> for ErrorCode {
    fn from(err: AttachError) -> ErrorCode {
        match err {
            AttachError::ResourceUnavailable => ErrorCode::NODEVICE,
            AttachError::InvalidRegisterLayout(e) => e.into(),
            AttachError::ClockUnavailable => ErrorCode::OFF,
            AttachError::RegistrationFailed(e) => e,
        }
    }
}

/// The first teardown step that failed. Later steps still ran.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DetachError {
    Clock(ErrorCode),
    Resource(ErrorCode),
    Registration(ErrorCode),
}

impl From<DetachError> for ErrorCode {
    fn from(err: DetachError) -> ErrorCode {
        match err {
            DetachError::Clock(e) | DetachError::Resource(e) | DetachError::Registration(e) => e,
        }
    }
}

/// A mapped register window, unmapped on drop.
pub struct MappedRegisters<'a, D: PlatformDevice> {
    device: &'a D,
    // `None` only once unmapped.
    registers: Option<D::Registers>,
}

impl<'a, D: PlatformDevice> MappedRegisters<'a, D> {
    fn map(device: &'a D, region: MemoryRegion) -> Result<Self, ErrorCode> {
        let registers = device.map_region(region)?;
        Ok(MappedRegisters {
            device,
            registers: Some(registers),
        })
    }

    fn unmap(&mut self) -> Option<Result<(), ErrorCode>> {
        self.registers
            .take()
            .map(|registers| self.device.unmap_region(registers))
    }

    /// Unmap now and report the result.
    pub fn release(mut self) -> Result<(), ErrorCode> {
        self.unmap().unwrap_or(Ok(()))
    }
}

impl<D: PlatformDevice> RegisterIo for MappedRegisters<'_, D> {
    fn read32(&self, offset: usize) -> u32 {
        self.registers
            .as_ref()
            .map_or(0, |registers| registers.read32(offset))
    }

    fn write32(&self, offset: usize, value: u32) {
        if let Some(registers) = &self.registers {
            registers.write32(offset, value);
        }
    }
}

impl<D: PlatformDevice> Drop for MappedRegisters<'_, D> {
    fn drop(&mut self) {
        if let Some(result) = self.unmap() {
            debug_verbose!("axi_pwm: unmapped register window");
            if let Err(err) = result {
                debug!("axi_pwm: unmap failed: {:?}", err);
            }
        }
    }
}

/// A clock obtained from the platform. Disabled (if this guard enabled it)
/// and handed back on drop.
struct ClockGuard<'a, D: PlatformDevice> {
    device: &'a D,
    // `None` only once handed back.
    clock: Option<D::Clock>,
    enabled: bool,
}

impl<'a, D: PlatformDevice> ClockGuard<'a, D> {
    fn acquire(device: &'a D) -> Result<Self, ErrorCode> {
        let clock = device.get_clock()?;
        Ok(ClockGuard {
            device,
            clock: Some(clock),
            enabled: false,
        })
    }

    fn enable(&mut self) -> Result<(), ErrorCode> {
        self.clock
            .as_ref()
            .map_or(Err(ErrorCode::OFF), ClockInterface::enable)?;
        self.enabled = true;
        Ok(())
    }

    fn rate_hz(&self) -> Result<u32, ErrorCode> {
        self.clock
            .as_ref()
            .map_or(Err(ErrorCode::OFF), ClockInterface::get_rate_hz)
    }

    fn period(&self) -> Result<ClockPeriod, ClockError> {
        self.clock
            .as_ref()
            .map_or(Err(ClockError::ClockUnavailable), ClockPeriod::from_clock)
    }

    fn shutdown(&mut self) -> Option<Result<(), ErrorCode>> {
        let clock = self.clock.take()?;
        let disabled = if self.enabled {
            clock.disable()
        } else {
            Ok(())
        };
        self.device.put_clock(clock);
        Some(disabled)
    }

    fn release(mut self) -> Result<(), ErrorCode> {
        self.shutdown().unwrap_or(Ok(()))
    }
}

impl<D: PlatformDevice> Drop for ClockGuard<'_, D> {
    fn drop(&mut self) {
        if let Some(result) = self.shutdown() {
            debug_verbose!("axi_pwm: released pwm clock");
            if let Err(err) = result {
                debug!("axi_pwm: clock disable failed: {:?}", err);
            }
        }
    }
}

/// A chip registered with the PWM dispatch layer, removed on drop.
struct Registration<'a, P: PwmRegistry> {
    registry: &'a P,
    chip: ChipId,
    registered: bool,
}

impl<'a, P: PwmRegistry> Registration<'a, P> {
    fn add(registry: &'a P, npwm: usize) -> Result<Self, ErrorCode> {
        let chip = registry.add_chip(npwm)?;
        Ok(Registration {
            registry,
            chip,
            registered: true,
        })
    }

    fn remove(&mut self) -> Option<Result<(), ErrorCode>> {
        if !self.registered {
            return None;
        }
        self.registered = false;
        Some(self.registry.remove_chip(self.chip))
    }

    fn release(mut self) -> Result<(), ErrorCode> {
        self.remove().unwrap_or(Ok(()))
    }
}

impl<P: PwmRegistry> Drop for Registration<'_, P> {
    fn drop(&mut self) {
        if let Some(result) = self.remove() {
            debug_verbose!("axi_pwm: removed pwmchip {}", self.chip.0);
            if let Err(err) = result {
                debug!("axi_pwm: pwmchip remove failed: {:?}", err);
            }
        }
    }
}

/// A core that is attached and ready for use.
///
/// Fields drop in declaration order, which is the teardown order.
pub struct AttachedDevice<'a, D: PlatformDevice, P: PwmRegistry> {
    clock: ClockGuard<'a, D>,
    pwm: AxiPwm<MappedRegisters<'a, D>>,
    registration: Registration<'a, P>,
}

/// Bring up the core described by `device` and register it with `registry`.
pub fn attach<'a, D: PlatformDevice, P: PwmRegistry>(
    device: &'a D,
    registry: &'a P,
    layout: RegisterLayout,
) -> Result<AttachedDevice<'a, D, P>, AttachError> {
    let region = device.memory_resource(0).ok_or_else(|| {
        debug!("axi_pwm: no memory resource");
        AttachError::ResourceUnavailable
    })?;

    layout.validate(region).map_err(|err| {
        debug!("axi_pwm: bad register layout: {}", err);
        AttachError::InvalidRegisterLayout(err)
    })?;

    let registers = MappedRegisters::map(device, region).map_err(|err| {
        debug!("axi_pwm: failed to map {:#x}: {:?}", region.start, err);
        AttachError::ResourceUnavailable
    })?;

    let mut clock = ClockGuard::acquire(device).map_err(|err| {
        debug!("axi_pwm: failed to get pwm clock: {:?}", err);
        AttachError::ClockUnavailable
    })?;

    clock.enable().map_err(|err| {
        debug!("axi_pwm: failed to enable pwm clock: {:?}", err);
        AttachError::ClockUnavailable
    })?;

    let clock_period = clock.period().map_err(|_| {
        debug!("axi_pwm: unusable clock rate {:?}", clock.rate_hz());
        AttachError::ClockUnavailable
    })?;

    // `registers` is dropped after `clock` if this fails.
    let registration = Registration::add(registry, NUM_CHANNELS).map_err(|err| {
        debug!("axi_pwm: pwmchip add failed: {:?}", err);
        AttachError::RegistrationFailed(err)
    })?;

    Ok(AttachedDevice {
        clock,
        pwm: AxiPwm::new(registers, layout, clock_period),
        registration,
    })
}

impl<'a, D: PlatformDevice, P: PwmRegistry> AttachedDevice<'a, D, P> {
    pub fn channel(&self) -> &AxiPwm<MappedRegisters<'a, D>> {
        &self.pwm
    }

    pub fn clock_period(&self) -> ClockPeriod {
        self.pwm.clock_period()
    }

    pub fn chip_id(&self) -> ChipId {
        self.registration.chip
    }

    /// Disable and release the clock, unmap the registers, then unregister
    /// the chip.
    pub fn detach(self) -> Result<(), DetachError> {
        let AttachedDevice {
            clock,
            pwm,
            registration,
        } = self;

        let clock_result = clock.release().map_err(DetachError::Clock);
        let resource_result = pwm
            .into_registers()
            .release()
            .map_err(DetachError::Resource);
        let registration_result = registration.release().map_err(DetachError::Registration);

        for err in [&clock_result, &resource_result, &registration_result]
            .into_iter()
            .filter_map(|r| r.err())
        {
            debug!("axi_pwm: detach: {:?}", err);
        }

        clock_result.and(resource_result).and(registration_result)
    }
}
