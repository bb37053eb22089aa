//! Named fingerprint profiles.

use crate::error::{Error, Result};
use super::ja3::Ja3Fingerprint;

/// Canonical Chrome descriptor.
const CHROME_DESCRIPTOR: &str = "771,4866-4867-4865-49195-49199-49196-49200-52393-52392-49171-49172-156-157-47-53,0-23-65281-10-11-35-16-5-13-18-45-43-51-27-21-41-28-19,29-23-24,0";

/// Browser fingerprint profile for impersonation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Profile {
    /// Chrome-like handshake.
    #[default]
    Chrome,
    /// Caller supplies the descriptor text directly.
    Custom,
}

impl Profile {
    /// Resolve a symbolic profile name.
    ///
    /// Unknown names fail with `UnsupportedProfile`.
    pub fn from_name(name: &str) -> Result<Self> {
        match name.to_ascii_lowercase().as_str() {
            "chrome" => Ok(Self::Chrome),
            "custom" => Ok(Self::Custom),
            other => Err(Error::UnsupportedProfile(other.to_string())),
        }
    }

    /// Build the fingerprint for this profile.
    ///
    /// `Custom` requires a non-blank descriptor; a missing or blank one
    /// fails with `InvalidFormat`. Named profiles ignore `custom`.
    pub fn fingerprint(&self, custom: Option<&str>) -> Result<Ja3Fingerprint> {
        match self {
            Self::Chrome => Ja3Fingerprint::parse(CHROME_DESCRIPTOR),
            Self::Custom => {
                let descriptor = custom
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .ok_or_else(|| {
                        Error::invalid_format("custom profile requires a descriptor string")
                    })?;
                Ja3Fingerprint::parse(descriptor)
            }
        }
    }

    /// User-Agent string matching this profile's handshake.
    pub fn user_agent(&self) -> &'static str {
        match self {
            Self::Chrome => {
                "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36"
            }
            Self::Custom => "wraith/0.1",
        }
    }
}
