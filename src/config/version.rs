//! Shopify Admin API version definitions.

use crate::error::ConfigError;
use std::fmt;
use std::str::FromStr;

/// Shopify Admin API version.
///
/// Shopify releases new API versions quarterly (January, April, July,
/// October). This enum provides variants for known stable versions, plus an
/// `Unstable` variant for development and a `Custom` variant for future
/// versions the crate does not know about yet.
///
/// # Example
///
/// ```rust
/// use shopify_bulk::ApiVersion;
///
/// let version = ApiVersion::latest();
/// assert!(version.is_stable());
///
/// let version: ApiVersion = "2024-10".parse().unwrap();
/// assert_eq!(version, ApiVersion::V2024_10);
/// assert_eq!(version.to_string(), "2024-10");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ApiVersion {
    /// API version 2024-07 (July 2024)
    V2024_07,
    /// API version 2024-10 (October 2024)
    V2024_10,
    /// API version 2025-01 (January 2025)
    V2025_01,
    /// API version 2025-04 (April 2025)
    V2025_04,
    /// API version 2025-07 (July 2025)
    V2025_07,
    /// API version 2025-10 (October 2025)
    V2025_10,
    /// Unstable API version for development and testing.
    Unstable,
    /// Custom version string for future or unrecognized versions.
    Custom(String),
}

impl ApiVersion {
    /// Returns the latest stable API version.
    ///
    /// This should be updated when new stable versions are released.
    #[must_use]
    pub const fn latest() -> Self {
        Self::V2025_10
    }

    /// Returns `true` if this is a known stable API version.
    ///
    /// Returns `false` for `Unstable` and `Custom` variants.
    #[must_use]
    pub const fn is_stable(&self) -> bool {
        !matches!(self, Self::Unstable | Self::Custom(_))
    }

    /// Numeric ordering value backing `Ord`.
    const fn ordinal(&self) -> u32 {
        match self {
            Self::V2024_07 => 1,
            Self::V2024_10 => 2,
            Self::V2025_01 => 3,
            Self::V2025_04 => 4,
            Self::V2025_07 => 5,
            Self::V2025_10 => 6,
            // Unstable tracks the next release, so it sorts after stable;
            // Custom versions are assumed newer still.
            Self::Unstable => 100,
            Self::Custom(_) => 101,
        }
    }

    fn is_valid_version_format(s: &str) -> bool {
        // Format: YYYY-MM with MM one of Shopify's quarterly release months
        let Some((year, month)) = s.split_once('-') else {
            return false;
        };

        year.len() == 4
            && year.chars().all(|c| c.is_ascii_digit())
            && matches!(month, "01" | "04" | "07" | "10")
    }
}

impl PartialOrd for ApiVersion {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ApiVersion {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        match (self, other) {
            // Custom versions compare lexicographically with each other,
            // which matches chronology for the YYYY-MM format
            (Self::Custom(a), Self::Custom(b)) => a.cmp(b),
            _ => self.ordinal().cmp(&other.ordinal()),
        }
    }
}

impl fmt::Display for ApiVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let version_str = match self {
            Self::V2024_07 => "2024-07",
            Self::V2024_10 => "2024-10",
            Self::V2025_01 => "2025-01",
            Self::V2025_04 => "2025-04",
            Self::V2025_07 => "2025-07",
            Self::V2025_10 => "2025-10",
            Self::Unstable => "unstable",
            Self::Custom(s) => s,
        };
        f.write_str(version_str)
    }
}

impl FromStr for ApiVersion {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_lowercase();

        match s.as_str() {
            "2024-07" => Ok(Self::V2024_07),
            "2024-10" => Ok(Self::V2024_10),
            "2025-01" => Ok(Self::V2025_01),
            "2025-04" => Ok(Self::V2025_04),
            "2025-07" => Ok(Self::V2025_07),
            "2025-10" => Ok(Self::V2025_10),
            "unstable" => Ok(Self::Unstable),
            _ if Self::is_valid_version_format(&s) => Ok(Self::Custom(s)),
            _ => Err(ConfigError::InvalidApiVersion { version: s }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_known_versions() {
        assert_eq!(
            "2024-10".parse::<ApiVersion>().unwrap(),
            ApiVersion::V2024_10
        );
        assert_eq!(
            "2025-01".parse::<ApiVersion>().unwrap(),
            ApiVersion::V2025_01
        );
        assert_eq!(
            "unstable".parse::<ApiVersion>().unwrap(),
            ApiVersion::Unstable
        );
    }

    #[test]
    fn test_display_round_trips() {
        for version in [
            ApiVersion::V2024_07,
            ApiVersion::V2025_10,
            ApiVersion::Unstable,
        ] {
            let parsed: ApiVersion = version.to_string().parse().unwrap();
            assert_eq!(parsed, version);
        }
    }

    #[test]
    fn test_latest_is_stable() {
        let latest = ApiVersion::latest();
        assert!(latest.is_stable());
    }

    #[test]
    fn test_future_versions_parse_as_custom() {
        let version: ApiVersion = "2026-01".parse().unwrap();
        assert_eq!(version, ApiVersion::Custom("2026-01".to_string()));
        assert!(!version.is_stable());
        assert_eq!(version.to_string(), "2026-01");
    }

    #[test]
    fn test_rejects_invalid_versions() {
        assert!("invalid".parse::<ApiVersion>().is_err());
        assert!("2024".parse::<ApiVersion>().is_err());
        assert!("2024-1".parse::<ApiVersion>().is_err());
        assert!("2024-02".parse::<ApiVersion>().is_err()); // February is not a release month
        assert!("24-01".parse::<ApiVersion>().is_err());
    }

    #[test]
    fn test_version_ordering() {
        assert!(ApiVersion::V2024_07 < ApiVersion::V2024_10);
        assert!(ApiVersion::V2024_10 < ApiVersion::latest());
        assert!(ApiVersion::latest() < ApiVersion::Unstable);
        assert!(
            ApiVersion::Custom("2026-01".to_string()) < ApiVersion::Custom("2026-04".to_string())
        );
    }
}
