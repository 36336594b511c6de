//! Export tables - the static methods a mod module makes callable by name

use std::fmt;

use crate::entry::EntryHandle;
use crate::error::ModError;

/// Parameter types an exported method can declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamType {
    /// The calling mod's own entry, as `&mut dyn EntryHandle`
    Entry,
}

/// Value returned by an exported method.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MethodReturn {
    Unit,
    Bool(bool),
}

impl MethodReturn {
    /// `Bool(false)` means the mod declined; anything else is acceptance
    pub fn is_declined(&self) -> bool {
        matches!(self, MethodReturn::Bool(false))
    }
}

impl From<()> for MethodReturn {
    fn from(_: ()) -> Self {
        MethodReturn::Unit
    }
}

impl From<bool> for MethodReturn {
    fn from(value: bool) -> Self {
        MethodReturn::Bool(value)
    }
}

pub type MethodResult = Result<MethodReturn, ModError>;

/// Typed call adapter for an exported static method.
#[derive(Clone, Copy)]
pub enum MethodFn {
    /// `fn()`
    Static(fn() -> MethodResult),
    /// `fn(entry)`
    WithEntry(fn(&mut dyn EntryHandle) -> MethodResult),
}

impl MethodFn {
    /// Ordered parameter types of this adapter
    pub fn params(&self) -> &'static [ParamType] {
        match self {
            MethodFn::Static(_) => &[],
            MethodFn::WithEntry(_) => &[ParamType::Entry],
        }
    }
}

impl fmt::Debug for MethodFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MethodFn({:?})", self.params())
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ExportedMethod {
    pub name: &'static str,
    pub func: MethodFn,
}

impl ExportedMethod {
    pub const fn new(name: &'static str, func: MethodFn) -> Self {
        Self { name, func }
    }
}

/// A named group of exported methods, addressed by its dotted path.
#[derive(Debug, Clone, Copy)]
pub struct ExportedType {
    pub path: &'static str,
    pub methods: &'static [ExportedMethod],
}

impl ExportedType {
    pub const fn new(path: &'static str, methods: &'static [ExportedMethod]) -> Self {
        Self { path, methods }
    }

    /// Find an overload by name and exact parameter list
    pub fn find_method(&self, name: &str, params: &[ParamType]) -> Option<MethodFn> {
        self.methods
            .iter()
            .find(|m| m.name == name && m.func.params() == params)
            .map(|m| m.func)
    }
}

/// Everything a module exports, returned by its `_modloader_exports` symbol.
#[derive(Debug, Clone, Copy)]
pub struct ExportTable {
    pub types: &'static [ExportedType],
}

impl ExportTable {
    pub const fn new(types: &'static [ExportedType]) -> Self {
        Self { types }
    }

    pub fn find_type(&self, path: &str) -> Option<&ExportedType> {
        self.types.iter().find(|t| t.path == path)
    }
}
