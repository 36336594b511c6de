//! modloader-api - what a mod compiles against
//!
//! A mod is a shared library with an `info.json` manifest next to it. The
//! library exports a static [`ExportTable`] listing the methods the runtime
//! may call by their dotted `Namespace.Type.Method` name, most importantly
//! the entry point named by the manifest's `EntryMethod`.
//!
//! # Example
//!
//! ```ignore
//! use modloader_api::{
//!     EntryHandle, ExportTable, ExportedMethod, ExportedType, MethodFn, MethodResult,
//!     MethodReturn, export_mod,
//! };
//!
//! fn load(entry: &mut dyn EntryHandle) -> MethodResult {
//!     entry.log_info("Loaded!");
//!     Ok(MethodReturn::Unit)
//! }
//!
//! export_mod!(ExportTable::new(&[ExportedType::new(
//!     "MyMod.Main",
//!     &[ExportedMethod::new("Load", MethodFn::WithEntry(load))],
//! )]));
//! ```
//!
//! with `"EntryMethod": "MyMod.Main.Load"` in the manifest.

pub mod entry;
pub mod error;
pub mod exports;
pub mod manifest;
pub mod version;

pub use entry::{EntryHandle, LogLevel, PeerInfo, ToggleFn};
pub use error::ModError;
pub use exports::{
    ExportTable, ExportedMethod, ExportedType, MethodFn, MethodResult, MethodReturn, ParamType,
};
pub use manifest::Manifest;
pub use version::Version;

/// Current mod API version. Modules must match this exactly.
pub const API_VERSION: u32 = 1;

/// Symbol returning the module's API version as `extern "C" fn() -> u32`.
pub const API_VERSION_SYMBOL: &[u8] = b"_modloader_api_version";

/// Symbol returning the module's export table as
/// `extern "C" fn() -> *const ExportTable`.
pub const EXPORTS_SYMBOL: &[u8] = b"_modloader_exports";

/// Export a table of methods for dynamic loading.
///
/// # Usage
///
/// ```ignore
/// modloader_api::export_mod!(ExportTable::new(&[/* types */]));
/// ```
///
/// # Generated Functions
///
/// - `_modloader_api_version()`: Returns the API version
/// - `_modloader_exports()`: Returns a pointer to the static export table
#[macro_export]
macro_rules! export_mod {
    ($table:expr) => {
        #[unsafe(no_mangle)]
        pub extern "C" fn _modloader_api_version() -> u32 {
            $crate::API_VERSION
        }

        #[unsafe(no_mangle)]
        pub extern "C" fn _modloader_exports() -> *const $crate::ExportTable {
            static EXPORTS: $crate::ExportTable = $table;
            &EXPORTS
        }
    };
}
