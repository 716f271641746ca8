// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2022.

//! Probe and remove hooks for the AXI PWM core.
//!
//! Boards create one `AxiPwmDriver` per core and call `probe` when the core
//! is discovered and `remove` when it goes away. The driver tracks which of
//! the two happened and refuses out-of-order calls.
//!
//! ```rust,ignore
//! static DRIVER: AxiPwmDriver<'static, Bus, Registry> =
//!     AxiPwmDriver::new(&BUS, &REGISTRY, LAYOUT);
//!
//! DRIVER.probe()?;
//! DRIVER.with_channel(|pwm| pwm.config(500, 1000))??;
//! DRIVER.remove()?;
//! ```

use core::cell::RefCell;

use critical_section::Mutex;
use kernel::hil::pwm::{Measurement, PwmChip, PwmRegistry};
use kernel::platform::bus::PlatformDevice;
use kernel::ErrorCode;

use crate::device::{attach, AttachError, AttachedDevice, DetachError, MappedRegisters};
use crate::pwm::{AxiPwm, NUM_CHANNELS};
use crate::registers::RegisterLayout;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DeviceState {
    Unattached,
    Attached,
    /// Removed. A driver never attaches again once here.
    Detached,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DriverError {
    AlreadyAttached,
    NotAttached,
    Attach(AttachError),
    Detach(DetachError),
}

impl From<AttachError> for DriverError {
    fn from(err: AttachError) -> DriverError {
        DriverError::Attach(err)
    }
}

impl From<DetachError> for DriverError {
    fn from(err: DetachError) -> DriverError {
        DriverError::Detach(err)
    }
}

impl From<DriverError> for ErrorCode {
    fn from(err: DriverError) -> ErrorCode {
        match err {
            DriverError::AlreadyAttached => ErrorCode::ALREADY,
            DriverError::NotAttached => ErrorCode::NODEVICE,
            DriverError::Attach(e) => e.into(),
            DriverError::Detach(e) => e.into(),
        }
    }
}

enum Slot<'a, D: PlatformDevice, P: PwmRegistry> {
    Unattached,
    /// `probe` is running `attach`.
    Attaching,
    Attached(AttachedDevice<'a, D, P>),
    /// `remove` is running `detach`.
    Detaching,
    Detached,
}

pub struct AxiPwmDriver<'a, D: PlatformDevice, P: PwmRegistry> {
    device: &'a D,
    registry: &'a P,
    layout: RegisterLayout,
    slot: Mutex<RefCell<Slot<'a, D, P>>>,
}

impl<'a, D: PlatformDevice, P: PwmRegistry> AxiPwmDriver<'a, D, P> {
    pub const fn new(device: &'a D, registry: &'a P, layout: RegisterLayout) -> Self {
        AxiPwmDriver {
            device,
            registry,
            layout,
            slot: Mutex::new(RefCell::new(Slot::Unattached)),
        }
    }

    /// While a probe is in progress the driver still reports `Unattached`;
    /// while a remove is in progress it already reports `Detached`.
    pub fn state(&self) -> DeviceState {
        critical_section::with(|cs| match *self.slot.borrow_ref(cs) {
            Slot::Unattached | Slot::Attaching => DeviceState::Unattached,
            Slot::Attached(_) => DeviceState::Attached,
            Slot::Detaching | Slot::Detached => DeviceState::Detached,
        })
    }

    fn replace_slot(&self, slot: Slot<'a, D, P>) -> Slot<'a, D, P> {
        critical_section::with(|cs| self.slot.replace(cs, slot))
    }

    /// Attach the core. On failure the driver stays `Unattached` and may be
    /// probed again.
    ///
    /// Platform and registry calls run outside the critical section.
    pub fn probe(&self) -> Result<(), DriverError> {
        critical_section::with(|cs| {
            let mut slot = self.slot.borrow_ref_mut(cs);
            match &*slot {
                Slot::Unattached => {}
                Slot::Attaching | Slot::Attached(_) => return Err(DriverError::AlreadyAttached),
                Slot::Detaching | Slot::Detached => return Err(DriverError::NotAttached),
            }
            *slot = Slot::Attaching;
            Ok(())
        })?;

        match attach(self.device, self.registry, self.layout) {
            Ok(device) => {
                self.replace_slot(Slot::Attached(device));
                Ok(())
            }
            Err(err) => {
                self.replace_slot(Slot::Unattached);
                Err(err.into())
            }
        }
    }

    /// Detach the core. The driver is `Detached` afterwards even if a
    /// teardown step failed.
    ///
    /// Platform and registry calls run outside the critical section.
    pub fn remove(&self) -> Result<(), DriverError> {
        let device = critical_section::with(|cs| {
            let mut slot = self.slot.borrow_ref_mut(cs);
            match core::mem::replace(&mut *slot, Slot::Detaching) {
                Slot::Attached(device) => Ok(device),
                other => {
                    *slot = other;
                    Err(DriverError::NotAttached)
                }
            }
        })?;

        let result = device.detach().map_err(DriverError::from);
        self.replace_slot(Slot::Detached);
        result
    }

    /// Run `f` on the attached channel.
    pub fn with_channel<F, R>(&self, f: F) -> Result<R, DriverError>
    where
        F: FnOnce(&AxiPwm<MappedRegisters<'a, D>>) -> R,
    {
        critical_section::with(|cs| match &*self.slot.borrow_ref(cs) {
            Slot::Attached(device) => Ok(f(device.channel())),
            _ => Err(DriverError::NotAttached),
        })
    }
}

impl<D: PlatformDevice, P: PwmRegistry> PwmChip for AxiPwmDriver<'_, D, P> {
    fn channel_count(&self) -> usize {
        NUM_CHANNELS
    }

    fn config(&self, duty_ns: u32, period_ns: u32) -> Result<(), ErrorCode> {
        self.with_channel(|pwm| pwm.config(duty_ns, period_ns))?
            .map_err(ErrorCode::from)
    }

    fn capture(&self, timeout_ms: u32) -> Result<Measurement, ErrorCode> {
        self.with_channel(|pwm| pwm.capture(timeout_ms))?
            .map_err(ErrorCode::from)
    }
}
