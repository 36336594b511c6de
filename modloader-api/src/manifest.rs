//! Package manifest (`info.json`)

use serde::{Deserialize, Deserializer, Serialize};

/// Declarative metadata for one mod package.
///
/// Field names follow the `info.json` format, e.g.
///
/// ```json
/// {
///   "Id": "addon",
///   "Version": "1.0.0",
///   "ManagerVersion": "0.12.0",
///   "Requirements": ["core-1.0.0"],
///   "AssemblyName": "addon.so",
///   "EntryMethod": "Addon.Main.Load"
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Manifest {
    /// Unique mod identifier
    #[serde(deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub display_name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub author: String,
    /// Mod version, parsed leniently
    #[serde(deserialize_with = "null_as_default")]
    pub version: String,
    /// Minimum manager version this mod needs
    pub manager_version: Option<String>,
    /// Bare ids or `id-major.minor.patch` minimum versions
    #[serde(deserialize_with = "null_as_default")]
    pub requirements: Vec<String>,
    /// Module file name inside the package directory
    #[serde(rename = "AssemblyName", alias = "ModuleName")]
    pub module_name: Option<String>,
    /// `Namespace.Type.Method` entry point
    pub entry_method: Option<String>,
    pub home_page: Option<String>,
    pub repository: Option<String>,
}

impl Manifest {
    /// Module file name, if one is set and non-empty
    pub fn module_file(&self) -> Option<&str> {
        non_empty(&self.module_name)
    }

    /// Entry point specifier, if one is set and non-empty
    pub fn entry_point(&self) -> Option<&str> {
        non_empty(&self.entry_method)
    }

    /// Minimum manager version text, if one is set and non-empty
    pub fn required_manager_version(&self) -> Option<&str> {
        non_empty(&self.manager_version)
    }

    /// Name shown to users, falling back to the id
    pub fn name(&self) -> &str {
        if self.display_name.is_empty() {
            &self.id
        } else {
            &self.display_name
        }
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
