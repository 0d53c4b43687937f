//! Console reporting for both passes.
//!
//! Report lines go to stdout, problems to stderr. `--quiet` silences
//! everything except per-file errors; `--verbose` adds resize and size
//! ratio details.

use std::sync::atomic::{AtomicBool, Ordering};

static QUIET_MODE: AtomicBool = AtomicBool::new(false);
static VERBOSE_MODE: AtomicBool = AtomicBool::new(false);

pub fn configure(quiet: bool, verbose: bool) {
    QUIET_MODE.store(quiet, Ordering::Relaxed);
    VERBOSE_MODE.store(verbose && !quiet, Ordering::Relaxed);
}

pub fn is_quiet() -> bool {
    QUIET_MODE.load(Ordering::Relaxed)
}

pub fn is_verbose() -> bool {
    VERBOSE_MODE.load(Ordering::Relaxed)
}

#[macro_export]
macro_rules! info {
    ($($arg:tt)*) => {{
        if !$crate::logger::is_quiet() {
            println!($($arg)*);
        }
    }};
}

#[macro_export]
macro_rules! verbose {
    ($($arg:tt)*) => {{
        if $crate::logger::is_verbose() {
            println!("🔍 {}", format!($($arg)*));
        }
    }};
}

#[macro_export]
macro_rules! error {
    ($($arg:tt)*) => {{
        eprintln!("❌ {}", format!($($arg)*));
    }};
}

#[macro_export]
macro_rules! warn {
    ($($arg:tt)*) => {{
        if !$crate::logger::is_quiet() {
            eprintln!("⚠️  {}", format!($($arg)*));
        }
    }};
}
