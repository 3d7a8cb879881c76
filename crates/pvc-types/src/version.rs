//! Release versions and the version allocator.
//!
//! Version labels have the shape `vMAJOR.MINOR.PATCH` where each component
//! is a non-negative decimal integer. Ordering is numeric and lexicographic
//! over `(major, minor, patch)`, so `v1.10.0 > v1.9.0`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// A parsed release version.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Version {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
}

impl Version {
    /// The version returned when a prompt has no releases yet.
    pub const INITIAL: Version = Version::new(1, 0, 0);

    pub const fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    /// Parse a label of the form `vMAJOR.MINOR.PATCH`.
    ///
    /// Returns `None` for anything else, including components too large for
    /// a `u64`.
    ///
    /// # Examples
    ///
    /// ```
    /// use pvc_types::Version;
    ///
    /// assert_eq!(Version::parse("v2.0.1"), Some(Version::new(2, 0, 1)));
    /// assert_eq!(Version::parse("2.0.1"), None);
    /// assert_eq!(Version::parse("v2.0"), None);
    /// ```
    pub fn parse(label: &str) -> Option<Self> {
        let rest = label.strip_prefix('v')?;
        let mut parts = rest.split('.');
        let major = parse_component(parts.next()?)?;
        let minor = parse_component(parts.next()?)?;
        let patch = parse_component(parts.next()?)?;
        if parts.next().is_some() {
            return None;
        }
        Some(Self::new(major, minor, patch))
    }

    /// Returns `true` if `label` starts like a version (`v` then a digit),
    /// whether or not it is well-formed.
    pub fn looks_like(label: &str) -> bool {
        let mut chars = label.chars();
        chars.next() == Some('v') && chars.next().is_some_and(|c| c.is_ascii_digit())
    }

    /// The same version with the patch component incremented.
    ///
    /// Fails once the patch component is at `u64::MAX`.
    pub fn next_patch(&self) -> Result<Self, TypeError> {
        let patch = self
            .patch
            .checked_add(1)
            .ok_or(TypeError::VersionExhausted { version: *self })?;
        Ok(Self::new(self.major, self.minor, patch))
    }

    /// Render as a label, e.g. `v1.0.2`.
    pub fn to_label(&self) -> String {
        self.to_string()
    }
}

fn parse_component(s: &str) -> Option<u64> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

impl Default for Version {
    fn default() -> Self {
        Self::INITIAL
    }
}

impl fmt::Debug for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Version({self})")
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}.{}.{}", self.major, self.minor, self.patch)
    }
}

impl FromStr for Version {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| TypeError::InvalidVersion {
            label: s.to_string(),
        })
    }
}

impl TryFrom<String> for Version {
    type Error = TypeError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Version> for String {
    fn from(v: Version) -> Self {
        v.to_string()
    }
}

/// Derives the next release version from the labels already in use.
///
/// Only the patch component is ever bumped. Escalating minor or major is a
/// deliberate human decision and not something the allocator does.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionAllocator {
    initial: Version,
}

impl VersionAllocator {
    pub fn new(initial: Version) -> Self {
        Self { initial }
    }

    /// The seed returned when no version label exists.
    pub fn initial(&self) -> Version {
        self.initial
    }

    /// The highest version among `labels`, ignoring non-version labels.
    pub fn latest<I, S>(labels: I) -> Option<Version>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        labels
            .into_iter()
            .filter_map(|l| Version::parse(l.as_ref()))
            .max()
    }

    /// The next version: the seed if no label is version-shaped, otherwise
    /// the highest existing version with its patch incremented.
    pub fn next<I, S>(&self, labels: I) -> Result<Version, TypeError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.next_after(Self::latest(labels))
    }

    /// The version that follows `latest`, or the seed when nothing was
    /// released yet.
    pub fn next_after(&self, latest: Option<Version>) -> Result<Version, TypeError> {
        match latest {
            Some(latest) => latest.next_patch(),
            None => Ok(self.initial),
        }
    }
}

impl Default for VersionAllocator {
    fn default() -> Self {
        Self::new(Version::INITIAL)
    }
}

/// [`VersionAllocator::next`] with the default `v1.0.0` seed.
///
/// # Examples
///
/// ```
/// use pvc_types::{next_version, Version};
///
/// assert_eq!(next_version(["v1.0.0", "v1.0.1", "v2.0.0"]), Ok(Version::new(2, 0, 1)));
/// assert_eq!(next_version(Vec::<String>::new()), Ok(Version::new(1, 0, 0)));
/// ```
pub fn next_version<I, S>(labels: I) -> Result<Version, TypeError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    VersionAllocator::default().next(labels)
}
