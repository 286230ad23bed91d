//! Helper library bundled next to command libraries.
//!
//! It exports plain C functions and no `ewar_commands` table, so a launcher
//! loading it finds no components in it.

use std::ffi::c_int;

/// Version of the support routines.
#[unsafe(no_mangle)]
pub extern "C" fn support_version() -> c_int {
    1
}
