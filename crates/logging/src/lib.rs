//! Verbosity-to-`tracing` wiring shared by `zsyncmake`, `zsync`, and
//! `zsyncrange`.
//!
//! # Overview
//!
//! Each binary exposes a `-v`/`--verbose` flag (repeatable) and a
//! `-q`/`--quiet` flag; [`Verbosity::from_flags`] folds those into one of
//! four levels, and [`init`] wires that level to a global
//! [`tracing_subscriber`] filter so the rest of the workspace can just call
//! `tracing::debug!`/`info!`/`warn!` without knowing which binary is
//! running.
//!
//! # Design
//!
//! There is no structured `--info=FLAG,FLAG` surface here — the core only
//! ever emits `debug!`/`info!`/`warn!` events at the phase granularity
//! named by the coordinator, so a single ladder is enough.
//!
//! # Errors
//!
//! [`init`] is infallible; a subscriber that is already set (e.g. a test
//! calling it twice) is silently ignored rather than panicking.

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

use tracing_subscriber::EnvFilter;

/// The verbosity ladder shared by all three binaries.
#[derive(Clone, Copy, Debug, Eq, PartialEq, PartialOrd, Ord)]
pub enum Verbosity {
    /// `-q`: warnings and errors only.
    Quiet,
    /// No flag: informational phase transitions plus warnings and errors.
    Normal,
    /// `-v`: adds per-block/per-range debug detail.
    Verbose,
    /// `-v -v` or higher: adds the noisiest per-byte scan tracing.
    Trace,
}

impl Verbosity {
    /// Folds a quiet flag and a verbose-occurrence count into one level.
    /// `quiet` wins over any number of `-v` occurrences, matching the
    /// client's `-q` contract.
    #[must_use]
    pub fn from_flags(quiet: bool, verbose_count: u8) -> Self {
        if quiet {
            return Self::Quiet;
        }
        match verbose_count {
            0 => Self::Normal,
            1 => Self::Verbose,
            _ => Self::Trace,
        }
    }

    /// The `tracing` directive string this level maps to.
    #[must_use]
    pub const fn directive(self) -> &'static str {
        match self {
            Self::Quiet => "warn",
            Self::Normal => "info",
            Self::Verbose => "debug",
            Self::Trace => "trace",
        }
    }
}

/// Installs a global `tracing` subscriber filtered to `level`. Safe to call
/// more than once; later calls are no-ops.
pub fn init(level: Verbosity) {
    let filter = EnvFilter::try_new(level.directive()).unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quiet_flag_overrides_any_verbose_count() {
        assert_eq!(Verbosity::from_flags(true, 5), Verbosity::Quiet);
    }

    #[test]
    fn verbose_count_maps_to_increasing_levels() {
        assert_eq!(Verbosity::from_flags(false, 0), Verbosity::Normal);
        assert_eq!(Verbosity::from_flags(false, 1), Verbosity::Verbose);
        assert_eq!(Verbosity::from_flags(false, 2), Verbosity::Trace);
        assert_eq!(Verbosity::from_flags(false, 9), Verbosity::Trace);
    }

    #[test]
    fn levels_are_ordered_from_quiet_to_trace() {
        assert!(Verbosity::Quiet < Verbosity::Normal);
        assert!(Verbosity::Normal < Verbosity::Verbose);
        assert!(Verbosity::Verbose < Verbosity::Trace);
    }
}
