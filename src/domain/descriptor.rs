use crate::error::{ReleasePlanError, Result};
use regex::Regex;
use std::path::{Path, PathBuf};

/// Placeholder version used when the repository has never been tagged.
pub const NO_TAG_VERSION: &str = "v0.0.0-NOTAG";

/// Immutable snapshot of version-control state for one build invocation.
///
/// Captured once from the live repository (or handed in directly by tests)
/// and read-only afterward. The interesting fields are derived from the
/// describe string: the distance to the last tag and the raw version
/// substring that the resolver will parse.
#[derive(Debug, Clone, PartialEq)]
pub struct RepositoryDescriptor {
    pub root_path: PathBuf,
    pub describe: String,
    pub commit_hash: String,
    pub branch_name: String,
    pub is_dirty: bool,
    pub distance_to_last_tag: i32,
    pub raw_version: String,
}

impl RepositoryDescriptor {
    /// Build a descriptor from raw repository facts.
    ///
    /// `root_path` must point at an existing directory; it is canonicalized
    /// here. A bad root is a fatal configuration error, surfaced at
    /// construction rather than deferred to first use.
    pub fn new(
        root_path: impl AsRef<Path>,
        describe: impl Into<String>,
        commit_hash: impl Into<String>,
        branch_name: impl Into<String>,
        is_dirty: bool,
    ) -> Result<Self> {
        let root = root_path.as_ref();
        if !root.exists() {
            return Err(ReleasePlanError::config(format!(
                "'{}' is not a valid git root path",
                root.display()
            )));
        }
        let root_path = root.canonicalize().map_err(|e| {
            ReleasePlanError::config(format!(
                "Could not canonicalize git root '{}': {}",
                root.display(),
                e
            ))
        })?;
        let describe = describe.into();
        let commit_hash = commit_hash.into();
        let distance_to_last_tag = distance_from_describe(&describe);
        let raw_version = raw_version_from_describe(&describe, &commit_hash);
        Ok(RepositoryDescriptor {
            root_path,
            describe,
            commit_hash,
            branch_name: branch_name.into(),
            is_dirty,
            distance_to_last_tag,
            raw_version,
        })
    }

    /// First 7 characters of the commit hash.
    pub fn short_hash(&self) -> &str {
        if self.commit_hash.len() > 7 {
            &self.commit_hash[..7]
        } else {
            &self.commit_hash
        }
    }
}

/// Extract the tag-name portion of a describe string.
///
/// A describe of the shape `<tag>-<distance>-<8-alnum-hash>` yields the tag.
/// When the describe is just a bare hash (never-tagged repository, the
/// describe then ends with the short hash) the [NO_TAG_VERSION] placeholder
/// is substituted instead of guessing. Anything else yields an empty string
/// and is left for the resolver to reject.
fn raw_version_from_describe(describe: &str, commit_hash: &str) -> String {
    if let Some(captures) = Regex::new(r"^(v.*)-(\d+)-[0-9a-zA-Z]{8}$")
        .ok()
        .and_then(|re| re.captures(describe))
    {
        return captures[1].to_string();
    }
    let short = if commit_hash.len() > 7 {
        &commit_hash[..7]
    } else {
        commit_hash
    };
    if !short.is_empty() && describe.ends_with(short) {
        return NO_TAG_VERSION.to_string();
    }
    String::new()
}

/// Extract the commit distance embedded in a describe string, or -1 when
/// the describe carries none.
fn distance_from_describe(describe: &str) -> i32 {
    Regex::new(r"^.*-(\d+)-[0-9a-zA-Z]{8}$")
        .ok()
        .and_then(|re| re.captures(describe))
        .and_then(|captures| captures[1].parse().ok())
        .unwrap_or(-1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn descriptor(describe: &str, hash: &str) -> RepositoryDescriptor {
        let dir = TempDir::new().expect("temp dir");
        RepositoryDescriptor::new(dir.path(), describe, hash, "main", false)
            .expect("descriptor should build")
    }

    #[test]
    fn test_raw_version_from_tagged_describe() {
        let d = descriptor("v2.3.1-0-ab12cd34", "ab12cd34ff00112233445566778899aabbccddee");
        assert_eq!(d.raw_version, "v2.3.1");
        assert_eq!(d.distance_to_last_tag, 0);
    }

    #[test]
    fn test_distance_is_parsed() {
        let d = descriptor("v1.0.0-14-9f8e7d6c", "9f8e7d6c112233445566778899aabbccddeeff00");
        assert_eq!(d.raw_version, "v1.0.0");
        assert_eq!(d.distance_to_last_tag, 14);
    }

    #[test]
    fn test_untagged_repository_gets_placeholder() {
        let d = descriptor("ab12cd3", "ab12cd34ff00112233445566778899aabbccddee");
        assert_eq!(d.raw_version, NO_TAG_VERSION);
        assert_eq!(d.distance_to_last_tag, -1);
    }

    #[test]
    fn test_unrecognized_describe_yields_empty_version() {
        let d = descriptor("release-candidate", "ab12cd34ff00112233445566778899aabbccddee");
        assert_eq!(d.raw_version, "");
        assert_eq!(d.distance_to_last_tag, -1);
    }

    #[test]
    fn test_pre_release_tag_in_describe() {
        let d = descriptor(
            "v1.2.0-beta.1-3-ab12cd34",
            "ab12cd34ff00112233445566778899aabbccddee",
        );
        assert_eq!(d.raw_version, "v1.2.0-beta.1");
        assert_eq!(d.distance_to_last_tag, 3);
    }

    #[test]
    fn test_short_hash() {
        let d = descriptor("v1.0.0-0-ab12cd34", "ab12cd34ff00112233445566778899aabbccddee");
        assert_eq!(d.short_hash(), "ab12cd3");
    }

    #[test]
    fn test_missing_root_is_fatal() {
        let result = RepositoryDescriptor::new(
            "/definitely/not/a/real/path",
            "v1.0.0-0-ab12cd34",
            "ab12cd34",
            "main",
            false,
        );
        assert!(matches!(result, Err(ReleasePlanError::Config(_))));
    }
}
