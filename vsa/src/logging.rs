// SPDX-FileCopyrightText: 2024 Rot127 <unisono@quyllur.org>
// SPDX-License-Identifier: LGPL-3.0-only

//! Ambient logging. The crate itself only ever emits through the `log`
//! facade (`log::trace!`/`debug!`/`warn!` calls in [`crate::memstore`],
//! [`crate::edge`] and [`crate::driver`]) and never installs a logger —
//! that is a decision for the binary or test harness embedding it. This
//! module is the opt-in `flexi_logger` wiring for callers that want one,
//! mirroring how the teacher workspace keeps the `log`/`flexi_logger`
//! dependency separate from its own ad hoc, FFI-host-specific logging.

use flexi_logger::{FileSpec, Logger, LoggerHandle};

/// Initializes a default `flexi_logger` writing to stderr at the level
/// given by `RUST_LOG` (or `info` if unset). Intended for binaries, CLI
/// drivers and tests; library code never calls this itself.
pub fn init_default_logger() -> Result<LoggerHandle, flexi_logger::FlexiLoggerError> {
    Logger::try_with_env_or_str("info")?.start()
}

/// Same as [`init_default_logger`], but additionally duplicates output to
/// a rotating log file under `directory`. Useful for long-running batch
/// analyses where the stderr stream isn't retained.
pub fn init_file_logger(directory: &str) -> Result<LoggerHandle, flexi_logger::FlexiLoggerError> {
    Logger::try_with_env_or_str("info")?
        .log_to_file(FileSpec::default().directory(directory))
        .start()
}
