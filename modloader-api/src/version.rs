//! Three-component mod and manager versions

use std::fmt;
use std::str::FromStr;

use crate::error::ModError;

/// A `major.minor.patch` version.
///
/// Ordering is lexicographic on major, minor, then patch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Version {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl Version {
    /// `0.0.0`, also used to mean "no constraint".
    pub const ZERO: Version = Version::new(0, 0, 0);

    pub const fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }
}

impl FromStr for Version {
    type Err = ModError;

    /// Lenient parse: the text is split on `.` or `,`, at least three tokens
    /// are required, and each of the first three keeps only its digits.
    /// `"v1.2.3-beta"` parses as `1.2.3`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tokens: Vec<&str> = s.split(['.', ',']).collect();
        if tokens.len() < 3 {
            return Err(ModError::InvalidVersion(s.to_string()));
        }

        let component = |token: &str| -> Result<u32, ModError> {
            let digits: String = token.chars().filter(char::is_ascii_digit).collect();
            digits
                .parse()
                .map_err(|_| ModError::InvalidVersion(s.to_string()))
        };

        Ok(Self::new(
            component(tokens[0])?,
            component(tokens[1])?,
            component(tokens[2])?,
        ))
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}
