//! Label classes.
//!
//! A label is plain, case-sensitive text attached to a commit. Three classes
//! carry policy meaning; everything else is a free-form user tag:
//!
//! - [`MAIN_LABEL`] marks the first commit ever created for a prompt.
//! - [`PROD_LABEL`] marks the commit currently serving production traffic.
//!   At most one commit per prompt carries it.
//! - Version labels (`vMAJOR.MINOR.PATCH`) record releases and are permanent.

use crate::version::Version;

/// Label assigned automatically to the first commit of a prompt.
pub const MAIN_LABEL: &str = "main";

/// Label marking the production commit of a prompt.
pub const PROD_LABEL: &str = "PROD";

/// Policy class of a label.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LabelClass {
    Main,
    Prod,
    Version(Version),
    Free,
}

impl LabelClass {
    /// Classify label text. Comparison is exact; `prod` is a free-form label.
    pub fn of(label: &str) -> Self {
        match label {
            MAIN_LABEL => Self::Main,
            PROD_LABEL => Self::Prod,
            other => match Version::parse(other) {
                Some(v) => Self::Version(v),
                None => Self::Free,
            },
        }
    }

    pub fn is_version(&self) -> bool {
        matches!(self, Self::Version(_))
    }
}

/// Returns `true` if `label` is a well-formed version label.
pub fn is_version_label(label: &str) -> bool {
    Version::parse(label).is_some()
}
