//! Release target declaration and selection.
//!
//! A release target is a named policy bucket ("production", "snapshot", ...)
//! chosen by matching the resolved version string and an externally supplied
//! build-type label against configured patterns. Declaration order is
//! meaningful: the first matching target wins, so targets live in a `Vec`
//! and are never reordered.

use crate::error::{ReleasePlanError, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Environment variable consulted when no explicit force-target key is given.
pub const FORCE_TARGET_ENV: &str = "RELEASE_PLAN_FORCE_TARGET";

/// A single release target declaration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ReleaseTarget {
    pub name: String,

    /// Regular expression tested against the full version string.
    pub version_matches: String,

    /// Optional regular expression tested against the build-type label.
    /// Unset means any build type is acceptable.
    #[serde(default)]
    pub build_type_matches: Option<String>,

    #[serde(default)]
    pub artifacts: bool,

    #[serde(default)]
    pub image: bool,

    /// Image tag label; defaults to the target name. Declaring one
    /// implicitly enables image production.
    #[serde(default)]
    pub image_tag: Option<String>,
}

impl ReleaseTarget {
    pub fn new(name: impl Into<String>, version_matches: impl Into<String>) -> Self {
        ReleaseTarget {
            name: name.into(),
            version_matches: version_matches.into(),
            build_type_matches: None,
            artifacts: false,
            image: false,
            image_tag: None,
        }
    }

    /// Whether this target produces a container image.
    pub fn produces_image(&self) -> bool {
        self.image || self.image_tag.is_some()
    }

    /// The image tag label, falling back to the target name.
    pub fn image_tag_label(&self) -> &str {
        self.image_tag.as_deref().unwrap_or(&self.name)
    }

    /// Test this target's predicates against a (buildType, version) pair.
    ///
    /// Both patterns must match the *entire* candidate string; a version
    /// pattern `.*-rc` does not accept `v1.0.0-rc.1` by substring.
    pub fn matches(&self, build_type: &str, version: &str) -> Result<bool> {
        if !full_match(&self.version_matches, version)? {
            return Ok(false);
        }
        match &self.build_type_matches {
            None => Ok(true),
            Some(pattern) => full_match(pattern, build_type),
        }
    }

    /// Compile both patterns, surfacing bad regexes eagerly.
    pub fn validate(&self) -> Result<()> {
        compile_anchored(&self.version_matches).map_err(|e| {
            ReleasePlanError::config(format!(
                "Target '{}' has an invalid version pattern '{}': {}",
                self.name, self.version_matches, e
            ))
        })?;
        if let Some(pattern) = &self.build_type_matches {
            compile_anchored(pattern).map_err(|e| {
                ReleasePlanError::config(format!(
                    "Target '{}' has an invalid build-type pattern '{}': {}",
                    self.name, pattern, e
                ))
            })?;
        }
        Ok(())
    }
}

fn compile_anchored(pattern: &str) -> std::result::Result<Regex, regex::Error> {
    Regex::new(&format!("^(?:{})$", pattern))
}

fn full_match(pattern: &str, candidate: &str) -> Result<bool> {
    let re = compile_anchored(pattern)
        .map_err(|e| ReleasePlanError::config(format!("Invalid match pattern '{}': {}", pattern, e)))?;
    Ok(re.is_match(candidate))
}

/// Select the release target for a (buildType, version) pair.
///
/// With a force key the lookup is by name only, bypassing predicate
/// evaluation; a key naming no declared target is an error, never a silent
/// fallback to matching. Without one, targets are tried in declaration
/// order and the first acceptance wins.
pub fn select_target<'a>(
    build_type: &str,
    version: &str,
    targets: &'a [ReleaseTarget],
    force_key: Option<&str>,
) -> Result<&'a ReleaseTarget> {
    if let Some(key) = force_key {
        return targets.iter().find(|t| t.name == key).ok_or_else(|| {
            ReleasePlanError::unknown_target(format!(
                "Cannot find target with key '{}'. Cannot force target to non-existing configuration.",
                key
            ))
        });
    }
    for target in targets {
        if target.matches(build_type, version)? {
            return Ok(target);
        }
    }
    Err(ReleasePlanError::no_matching_target(format!(
        "Could not find matching release target for version '{}'",
        version
    )))
}

/// Resolve the effective force-target key.
///
/// An explicit key (CLI parameter) always wins; the environment variable is
/// only consulted when none was supplied.
pub fn effective_force_key(explicit: Option<&str>) -> Option<String> {
    match explicit {
        Some(key) => Some(key.to_string()),
        None => std::env::var(FORCE_TARGET_ENV).ok().filter(|v| !v.is_empty()),
    }
}
