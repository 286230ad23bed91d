//! Launcher for self-contained executable archives.
//!
//! The launcher executable carries a ZIP archive at its end. Inside it, a
//! `WEB-INF/` metadata area holds arbitrary files, `WEB-INF/lib/` holds the
//! bundled native libraries, and `META-INF/MANIFEST.MF` names the command
//! namespace. Running `ewar build x` finds the archive from the running
//! executable, unpacks the libraries to temporary files, loads them into a
//! private [`ExecutionContext`] and calls the entry point registered as
//! `<namespace>.build` (or `<namespace>.Build`) with `["x"]`.
//!
//! The main entry point is [`Launcher`]. Libraries declare their commands
//! through the C ABI in [`abi`], most easily with [`export_commands!`].

pub mod abi;
mod archive;
mod cleanup;
mod cli;
pub mod command;
mod context;
mod diagnostics;
pub mod env;
mod error;
mod launcher;
mod locate;
mod manifest;
mod materialize;
mod native;
mod resolver;
#[cfg(test)]
mod testing;

pub use archive::{Archive, ArchiveEntry, ArchiveLocation};
pub use cli::Invocation;
pub use context::ExecutionContext;
pub use diagnostics::{cat_file, list_files};
pub use env::{Layout, Settings};
pub use error::LaunchError;
pub use launcher::Launcher;
pub use locate::{archive_at, current_archive};
pub use manifest::{ManifestAttributes, read_manifest};
pub use materialize::{MaterializedLibrary, materialize};
pub use native::NativeLoader;
pub use resolver::{CommandSpec, candidate_names, dispatch, resolve};
