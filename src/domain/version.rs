use crate::error::{ReleasePlanError, Result};
use std::fmt;

/// Immutable semantic version identity resolved for a build.
///
/// Carries the usual major/minor/patch triple plus the optional pieces the
/// version grammar allows: a cosmetic single-character prefix (`v` or `=`),
/// a pre-release string, and build metadata. Transitions (`next_patch`,
/// `next_minor`, ...) always return a new value; nothing mutates in place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionIdentity {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
    pub prefix: Option<char>,
    pub pre_release: Option<String>,
    pub build_metadata: Option<String>,
}

impl VersionIdentity {
    /// Create a new version with no prefix, pre-release, or metadata.
    pub fn new(major: u32, minor: u32, patch: u32) -> Self {
        VersionIdentity {
            major,
            minor,
            patch,
            prefix: None,
            pre_release: None,
            build_metadata: None,
        }
    }

    /// Attach a prefix marker. Only `v` and `=` are accepted.
    pub fn with_prefix(mut self, prefix: char) -> Result<Self> {
        if prefix != 'v' && prefix != '=' {
            return Err(ReleasePlanError::malformed_version(format!(
                "Invalid version prefix '{}': expected 'v' or '='",
                prefix
            )));
        }
        self.prefix = Some(prefix);
        Ok(self)
    }

    /// Attach a pre-release string (e.g. "beta.2").
    pub fn with_pre_release(mut self, pre_release: impl Into<String>) -> Self {
        self.pre_release = Some(pre_release.into());
        self
    }

    /// Attach build metadata (e.g. "20240101.sha.ab12cd34").
    pub fn with_build_metadata(mut self, meta: impl Into<String>) -> Self {
        self.build_metadata = Some(meta.into());
        self
    }

    /// The canonical string form: `prefix? major.minor.patch(-pre)?(+meta)?`.
    pub fn canonical(&self) -> String {
        self.to_string()
    }

    /// Next patch version. Clears pre-release and build metadata.
    pub fn next_patch(&self) -> Self {
        VersionIdentity {
            patch: self.patch + 1,
            pre_release: None,
            build_metadata: None,
            ..self.clone()
        }
    }

    /// Next minor version. Resets patch to 0, clears pre-release and metadata.
    pub fn next_minor(&self) -> Self {
        VersionIdentity {
            minor: self.minor + 1,
            patch: 0,
            pre_release: None,
            build_metadata: None,
            ..self.clone()
        }
    }

    /// Next major version. Resets minor and patch to 0, clears pre-release
    /// and metadata.
    pub fn next_major(&self) -> Self {
        VersionIdentity {
            major: self.major + 1,
            minor: 0,
            patch: 0,
            pre_release: None,
            build_metadata: None,
            ..self.clone()
        }
    }

    /// Next pre-release iteration.
    ///
    /// - No pre-release yet: initializes the counter to `0`.
    /// - Pre-release ends in an integer counter: increments it, keeping the
    ///   leading label. A `.` separator is inserted when the label ends in a
    ///   word character (so `beta.1` -> `beta.2`, but also `rc2` -> `rc.3`).
    /// - Anything else is treated as a bare label and gets counter `0`
    ///   appended (`alpha` -> `alpha.0`, `alpha-` -> `alpha-0`).
    pub fn next_pre_release(&self) -> Self {
        let next = match &self.pre_release {
            None => "0".to_string(),
            Some(current) => Self::bump_pre_release_counter(current),
        };
        VersionIdentity {
            pre_release: Some(next),
            build_metadata: None,
            ..self.clone()
        }
    }

    /// Next pre-release with an explicitly supplied identifier.
    ///
    /// The identifier replaces the current pre-release entirely. If it
    /// already ends in an integer it is used verbatim; otherwise it is
    /// treated as a label and gets counter `0` appended.
    pub fn next_pre_release_with(&self, pre_id: &str) -> Self {
        let next = if pre_id.ends_with(|c: char| c.is_ascii_digit()) {
            pre_id.to_string()
        } else {
            Self::append_counter(pre_id, 0)
        };
        VersionIdentity {
            pre_release: Some(next),
            build_metadata: None,
            ..self.clone()
        }
    }

    fn bump_pre_release_counter(current: &str) -> String {
        let digits_start = current
            .rfind(|c: char| !c.is_ascii_digit())
            .map(|i| i + current[i..].chars().next().map_or(1, char::len_utf8))
            .unwrap_or(0);
        let (label, digits) = current.split_at(digits_start);
        if digits.is_empty() {
            // No trailing counter at all: the whole thing is a label.
            return Self::append_counter(current, 0);
        }
        match digits.parse::<u64>() {
            Ok(counter) => Self::append_counter(label, counter + 1),
            Err(_) => Self::append_counter(current, 0),
        }
    }

    fn append_counter(label: &str, counter: u64) -> String {
        if label.is_empty() {
            return counter.to_string();
        }
        let needs_separator = label
            .chars()
            .last()
            .map(|c| c.is_alphanumeric() || c == '_')
            .unwrap_or(false);
        if needs_separator {
            format!("{}.{}", label, counter)
        } else {
            format!("{}{}", label, counter)
        }
    }
}

impl fmt::Display for VersionIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(prefix) = self.prefix {
            write!(f, "{}", prefix)?;
        }
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)?;
        if let Some(pre) = &self.pre_release {
            write!(f, "-{}", pre)?;
        }
        if let Some(meta) = &self.build_metadata {
            write!(f, "+{}", meta)?;
        }
        Ok(())
    }
}
