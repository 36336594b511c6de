//! Hello Mod - A simple example mod for modloader
//!
//! This mod demonstrates:
//! - Exporting methods with the `export_mod!` macro
//! - An entry point that receives its own entry
//! - Registering a toggle callback
//!
//! ## Building
//!
//! ```bash
//! cargo build --release
//! ```
//!
//! ## Installing
//!
//! ```bash
//! mkdir -p Mods/hello
//! cp info.json Mods/hello/
//! cp target/release/libhello_mod.so Mods/hello/hello.so
//! modloader start
//! ```

use std::sync::atomic::{AtomicU32, Ordering};

use modloader_api::{
    EntryHandle, ExportTable, ExportedMethod, ExportedType, MethodFn, MethodResult, MethodReturn,
    export_mod,
};

/// Number of times the mod has been switched on
static ACTIVATIONS: AtomicU32 = AtomicU32::new(0);

fn load(entry: &mut dyn EntryHandle) -> MethodResult {
    entry.log_info(&format!("Hello from {} v{}!", entry.manifest().name(), entry.version()));

    entry.set_on_toggle(Box::new(|entry, active| {
        if active {
            let count = ACTIVATIONS.fetch_add(1, Ordering::Relaxed) + 1;
            entry.log_info(&format!("Switched on ({count} time(s))"));
        } else {
            entry.log_info("Switched off");
        }
        Ok(true)
    }));

    Ok(MethodReturn::Bool(true))
}

fn activations() -> MethodResult {
    Ok(MethodReturn::Bool(ACTIVATIONS.load(Ordering::Relaxed) > 0))
}

export_mod!(ExportTable::new(&[ExportedType::new(
    "HelloMod.Main",
    &[
        ExportedMethod::new("Load", MethodFn::WithEntry(load)),
        ExportedMethod::new("WasActivated", MethodFn::Static(activations)),
    ],
)]));
