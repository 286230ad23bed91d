//! C ABI shared between the launcher and bundled libraries.
//!
//! A bundled library exports one function, `ewar_commands`, returning a
//! [`CommandTable`]. Each [`CommandEntry`] pairs a fully-qualified component
//! name such as `tools.Build` with the component's entry point. The table and
//! the strings it points to must stay valid for as long as the library is
//! loaded; static data is the usual choice.
//!
//! Libraries written in Rust can use [`export_commands!`](crate::export_commands):
//!
//! ```ignore
//! fn build(args: Vec<String>) -> i32 {
//!     println!("ok");
//!     0
//! }
//!
//! ewar::export_commands! {
//!     "tools.Build" => build,
//! }
//! ```

use std::ffi::{CStr, c_char, c_int};
use std::slice;

/// Name of the symbol every bundled library exports.
pub const REGISTRATION_SYMBOL: &str = "ewar_commands";

/// Standard entry point: the forwarded arguments as C strings.
pub type EntryFn = unsafe extern "C" fn(argc: usize, argv: *const *const c_char) -> c_int;

/// Signature of [`REGISTRATION_SYMBOL`].
pub type RegistrationFn = unsafe extern "C" fn() -> CommandTable;

#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct CommandEntry {
    /// NUL-terminated, fully-qualified component name.
    pub name: *const c_char,
    /// `None` when the component has no runnable entry point.
    pub main: Option<EntryFn>,
}

// Entries only ever point at immutable static data.
unsafe impl Sync for CommandEntry {}

#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct CommandTable {
    pub len: usize,
    pub entries: *const CommandEntry,
}

impl CommandTable {
    pub const fn new(entries: &'static [CommandEntry]) -> Self {
        Self {
            len: entries.len(),
            entries: entries.as_ptr(),
        }
    }

    /// Decode the table into owned names and entry points, in table order.
    ///
    /// Entries with a null or non-UTF-8 name are skipped.
    ///
    /// # Safety
    ///
    /// `entries` must point at `len` valid entries whose names are valid C
    /// strings, or be null.
    pub unsafe fn components(&self) -> Vec<(String, Option<EntryFn>)> {
        if self.entries.is_null() || self.len == 0 {
            return Vec::new();
        }
        let entries = unsafe { slice::from_raw_parts(self.entries, self.len) };
        entries
            .iter()
            .filter(|entry| !entry.name.is_null())
            .filter_map(|entry| {
                let name = unsafe { CStr::from_ptr(entry.name) };
                name.to_str().ok().map(|name| (name.to_string(), entry.main))
            })
            .collect()
    }
}

/// Copy an entry point's C arguments into owned strings.
///
/// # Safety
///
/// `argv` must point at `argc` valid C strings, or be null with `argc == 0`.
pub unsafe fn collect_args(argc: usize, argv: *const *const c_char) -> Vec<String> {
    if argv.is_null() || argc == 0 {
        return Vec::new();
    }
    let argv = unsafe { slice::from_raw_parts(argv, argc) };
    argv.iter()
        .map(|&arg| unsafe { CStr::from_ptr(arg) }.to_string_lossy().into_owned())
        .collect()
}

/// Export `ewar_commands` from a bundled library.
///
/// Each function takes the forwarded arguments and returns the exit code.
#[macro_export]
macro_rules! export_commands {
    ($($name:literal => $main:path),* $(,)?) => {
        #[unsafe(no_mangle)]
        pub extern "C" fn ewar_commands() -> $crate::abi::CommandTable {
            static ENTRIES: &[$crate::abi::CommandEntry] = &[
                $($crate::abi::CommandEntry {
                    name: concat!($name, "\0").as_ptr().cast(),
                    main: Some({
                        unsafe extern "C" fn shim(
                            argc: usize,
                            argv: *const *const ::std::ffi::c_char,
                        ) -> ::std::ffi::c_int {
                            let args = unsafe { $crate::abi::collect_args(argc, argv) };
                            $main(args)
                        }
                        shim
                    }),
                }),*
            ];
            $crate::abi::CommandTable::new(ENTRIES)
        }
    };
}
