// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2022.

//! Support for kernel debug output.
//!
//! Drivers report unusual conditions with the [`debug!`](crate::debug!) and
//! [`debug_verbose!`](crate::debug_verbose!) macros:
//!
//! ```rust,ignore
//! debug!("failed to get pwm clock: {:?}", err);
//! debug_verbose!("unmapped {:#x}", base);
//! ```
//!
//! Output is handed to whatever [`IoWrite`] sink the board installed with
//! [`set_debug_writer`], usually a console UART. Until a sink is installed,
//! debug messages are silently dropped; printing never fails and never
//! blocks the caller.
//!
//! `debug_verbose!` additionally prefixes each message with a running message
//! count and the `file:line` that produced it.

use core::cell::Cell;
use core::fmt::{write, Arguments, Result, Write};

use critical_section::Mutex;

/// A byte sink for debug output.
pub trait IoWrite {
    /// Write as much of `buf` as the sink accepts and return the number of
    /// bytes taken. Anything not taken is dropped.
    fn write(&self, buf: &[u8]) -> usize;
}

static DEBUG_WRITER: Mutex<Cell<Option<&'static (dyn IoWrite + Sync)>>> =
    Mutex::new(Cell::new(None));

static DEBUG_COUNT: Mutex<Cell<usize>> = Mutex::new(Cell::new(0));

/// Install the sink that receives all subsequent debug output.
pub fn set_debug_writer(writer: &'static (dyn IoWrite + Sync)) {
    critical_section::with(|cs| DEBUG_WRITER.borrow(cs).set(Some(writer)));
}

/// Remove the installed sink, if any. Later messages are dropped.
pub fn clear_debug_writer() {
    critical_section::with(|cs| DEBUG_WRITER.borrow(cs).set(None));
}

fn debug_writer() -> Option<&'static (dyn IoWrite + Sync)> {
    critical_section::with(|cs| DEBUG_WRITER.borrow(cs).get())
}

/// Adapts an [`IoWrite`] sink to `core::fmt::Write`.
struct DebugWriterWrapper {
    sink: &'static (dyn IoWrite + Sync),
}

impl Write for DebugWriterWrapper {
    fn write_str(&mut self, s: &str) -> Result {
        // Bytes the sink refuses are dropped.
        let _ = self.sink.write(s.as_bytes());
        Ok(())
    }
}

/// Write a debug message followed by `\r\n`. Used by [`debug!`](crate::debug!).
pub fn begin_debug_fmt(args: Arguments) {
    if let Some(sink) = debug_writer() {
        let mut writer = DebugWriterWrapper { sink };
        let _ = write(&mut writer, args);
        let _ = writer.write_str("\r\n");
    }
}

/// Write a debug message prefixed with its sequence number and source
/// location. Used by [`debug_verbose!`](crate::debug_verbose!).
pub fn begin_debug_verbose_fmt(args: Arguments, file_line: &(&'static str, u32)) {
    let count = critical_section::with(|cs| {
        let count = DEBUG_COUNT.borrow(cs);
        count.set(count.get().wrapping_add(1));
        count.get()
    });

    if let Some(sink) = debug_writer() {
        let mut writer = DebugWriterWrapper { sink };
        let (file, line) = *file_line;
        let _ = writer.write_fmt(format_args!("TOCK_DEBUG({}): {}:{}: ", count, file, line));
        let _ = write(&mut writer, args);
        let _ = writer.write_str("\r\n");
    }
}

/// In-kernel `println()` debugging.
#[macro_export]
macro_rules! debug {
    () => ({
        // Allow an empty debug!() to print the location when hit
        $crate::debug!("")
    });
    ($($arg:tt)+) => ({
        $crate::debug::begin_debug_fmt(format_args!($($arg)+))
    });
}

/// In-kernel `println()` debugging that includes the message count and the
/// file and line number of the call site.
#[macro_export]
macro_rules! debug_verbose {
    () => ({
        $crate::debug_verbose!("")
    });
    ($($arg:tt)+) => ({
        $crate::debug::begin_debug_verbose_fmt(format_args!($($arg)+), {
            static _FILE_LINE: (&'static str, u32) = (file!(), line!());
            &_FILE_LINE
        })
    });
}
