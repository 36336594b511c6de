//! Requirements declared in a manifest and lenient version parsing

use modloader_api::Version;

use crate::logger::ModLogger;

/// A dependency on another mod, optionally with a minimum version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Requirement {
    pub id: String,
    pub min_version: Option<Version>,
}

impl Requirement {
    /// Parse a bare id (`"core"`) or an id with a minimum version
    /// (`"core-1.2.0"`, anything after the third component is ignored).
    ///
    /// The id ends at the right-most `-` that is followed by
    /// `digits.digits.digits`, so ids may themselves contain dashes.
    pub fn parse(text: &str) -> Self {
        for (pos, _) in text.match_indices('-').rev() {
            if let Some(version) = leading_version(&text[pos + 1..]) {
                return Self {
                    id: text[..pos].to_string(),
                    min_version: Some(version),
                };
            }
        }

        Self {
            id: text.to_string(),
            min_version: None,
        }
    }
}

/// Parse a manifest's requirement list; the first declaration of an id wins.
pub fn parse_requirements(texts: &[String]) -> Vec<Requirement> {
    let mut requirements: Vec<Requirement> = Vec::with_capacity(texts.len());
    for text in texts {
        let requirement = Requirement::parse(text);
        if !requirements.iter().any(|r| r.id == requirement.id) {
            requirements.push(requirement);
        }
    }
    requirements
}

fn leading_version(text: &str) -> Option<Version> {
    let mut parts = [0u32; 3];
    let mut rest = text;
    for (i, slot) in parts.iter_mut().enumerate() {
        if i > 0 {
            rest = rest.strip_prefix('.')?;
        }
        let len = rest.bytes().take_while(u8::is_ascii_digit).count();
        if len == 0 {
            return None;
        }
        *slot = rest[..len].parse().ok()?;
        rest = &rest[len..];
    }
    Some(Version::new(parts[0], parts[1], parts[2]))
}

/// Parse a version, logging and falling back to `0.0.0` on malformed text.
pub fn parse_version(text: &str, logger: &ModLogger) -> Version {
    match text.parse() {
        Ok(version) => version,
        Err(_) => {
            logger.error(format!("Error parsing version {text}"));
            Version::ZERO
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logger::ModLog;
    use std::sync::Arc;
    use tempfile::TempDir;

    #[test]
    fn test_bare_requirement() {
        let req = Requirement::parse("core");
        assert_eq!(req.id, "core");
        assert_eq!(req.min_version, None);
    }

    #[test]
    fn test_versioned_requirement() {
        let req = Requirement::parse("core-1.0.0");
        assert_eq!(req.id, "core");
        assert_eq!(req.min_version, Some(Version::new(1, 0, 0)));
    }

    #[test]
    fn test_versioned_requirement_with_dashed_id_and_suffix() {
        let req = Requirement::parse("better-ui-2.10.3-beta");
        assert_eq!(req.id, "better-ui");
        assert_eq!(req.min_version, Some(Version::new(2, 10, 3)));
    }

    #[test]
    fn test_dash_without_version_is_part_of_id() {
        let req = Requirement::parse("better-ui");
        assert_eq!(req.id, "better-ui");
        assert_eq!(req.min_version, None);

        let req = Requirement::parse("core-1.0");
        assert_eq!(req.id, "core-1.0");
        assert_eq!(req.min_version, None);
    }

    #[test]
    fn test_first_declaration_wins() {
        let texts = vec![
            "core-1.2.0".to_string(),
            "core".to_string(),
            "extras".to_string(),
        ];
        let reqs = parse_requirements(&texts);
        assert_eq!(reqs.len(), 2);
        assert_eq!(reqs[0].min_version, Some(Version::new(1, 2, 0)));
        assert_eq!(reqs[1].id, "extras");
    }

    #[test]
    fn test_parse_version_logs_and_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("ModManager.log");
        let logger = ModLogger::new("Manager", Arc::new(ModLog::new(&path, false)));

        assert_eq!(parse_version("1.2.3", &logger), Version::new(1, 2, 3));
        assert_eq!(parse_version("v1.2.3-beta", &logger), Version::new(1, 2, 3));
        assert_eq!(parse_version("1.2", &logger), Version::ZERO);

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, "[Manager] [Error] Error parsing version 1.2\n");
    }
}
