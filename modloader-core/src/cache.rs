//! Memoized method lookup inside a loaded module

use std::collections::HashMap;

use modloader_api::{MethodFn, ParamType};

use crate::loader::CodeModule;
use crate::logger::ModLogger;

/// Lookup key: the full specifier plus the ordered parameter types, so
/// overloads never share a slot.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    specifier: String,
    params: Vec<ParamType>,
}

/// Per-entry cache of `"Type.Method"` lookups.
///
/// Misses are cached too, so a missing method is reported once.
#[derive(Debug, Default)]
pub struct MethodCache {
    resolved: HashMap<CacheKey, Option<MethodFn>>,
}

impl MethodCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve `specifier` with the exact parameter list `params`.
    ///
    /// `quiet` suppresses the not-found logs, for probing optional overloads.
    pub fn find(
        &mut self,
        module: Option<&dyn CodeModule>,
        specifier: &str,
        params: &[ParamType],
        logger: &ModLogger,
        quiet: bool,
    ) -> Option<MethodFn> {
        let key = CacheKey {
            specifier: specifier.to_string(),
            params: params.to_vec(),
        };
        if let Some(cached) = self.resolved.get(&key) {
            return *cached;
        }

        let Some(module) = module else {
            if !quiet {
                logger.error(format!(
                    "Can't find method '{specifier}'. Mod '{}' is not loaded.",
                    logger.source()
                ));
            }
            return None;
        };

        let Some((type_path, method)) = specifier.rsplit_once('.') else {
            if !quiet {
                logger.error(format!("Function name error '{specifier}'."));
            }
            return None;
        };

        let resolved = match module.exports().find_type(type_path) {
            Some(exported) => {
                let found = exported.find_method(method, params);
                if found.is_none() && !quiet {
                    logger.info(format!(
                        "Method '{}' not found.",
                        describe(specifier, params)
                    ));
                }
                found
            }
            None => {
                if !quiet {
                    logger.error(format!("Class '{type_path}' not found."));
                }
                None
            }
        };

        self.resolved.insert(key, resolved);
        resolved
    }

    pub fn len(&self) -> usize {
        self.resolved.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resolved.is_empty()
    }
}

fn describe(specifier: &str, params: &[ParamType]) -> String {
    if params.is_empty() {
        specifier.to_string()
    } else {
        let names: Vec<String> = params.iter().map(|p| format!("{p:?}")).collect();
        format!("{specifier}[{}]", names.join(", "))
    }
}
