//! Version grammar parsing.
//!
//! A single compiled, fully-anchored pattern is the authority on what a
//! version string looks like: optional `v`/`=` prefix, three dot-separated
//! integers without leading zeros, optional `-pre.release` identifiers,
//! optional `+build.metadata`. Partial matches are rejected outright so a
//! describe string with trailing junk never sneaks through.

use crate::domain::VersionIdentity;
use crate::error::{ReleasePlanError, Result};
use regex::Regex;

/// The semver.org reference pattern extended with a `v`/`=` prefix group.
pub const VERSION_PATTERN: &str = r"^(?P<prefix>[=v]?)(?P<major>0|[1-9]\d*)\.(?P<minor>0|[1-9]\d*)\.(?P<patch>0|[1-9]\d*)(?:-(?P<pre>(?:0|[1-9]\d*|\d*[a-zA-Z-][0-9a-zA-Z-]*)(?:\.(?:0|[1-9]\d*|\d*[a-zA-Z-][0-9a-zA-Z-]*))*))?(?:\+(?P<meta>[0-9a-zA-Z-]+(?:\.[0-9a-zA-Z-]+)*))?$";

/// Parses raw version strings into [VersionIdentity] values.
pub struct VersionResolver {
    pattern: Regex,
}

impl VersionResolver {
    /// Compile the version pattern once for the lifetime of the resolver.
    pub fn new() -> Result<Self> {
        let pattern = Regex::new(VERSION_PATTERN)
            .map_err(|e| ReleasePlanError::config(format!("Invalid version pattern: {}", e)))?;
        // Group 0 aside, the pattern must capture prefix, major, minor,
        // patch, and the two optional trailing segments. A count outside
        // 5..=6 means the pattern itself drifted from the grammar.
        let group_count = pattern.captures_len() - 1;
        if !(5..=6).contains(&group_count) {
            return Err(ReleasePlanError::malformed_version(format!(
                "Version pattern captures {} groups, expected 5 to 6",
                group_count
            )));
        }
        Ok(VersionResolver { pattern })
    }

    /// Parse a whole version string.
    ///
    /// Fails with [ReleasePlanError::MalformedVersion] when the pattern does
    /// not match the full input or when a numeric group does not fit an
    /// integer. Never matches substrings: `v1.2.3junk` is an error, not
    /// `v1.2.3`.
    pub fn resolve(&self, version: &str) -> Result<VersionIdentity> {
        let captures = self.pattern.captures(version).ok_or_else(|| {
            ReleasePlanError::malformed_version(format!(
                "Could not parse version '{}': pattern does not match '{}'",
                version, VERSION_PATTERN
            ))
        })?;

        let major = parse_component(version, "major", &captures)?;
        let minor = parse_component(version, "minor", &captures)?;
        let patch = parse_component(version, "patch", &captures)?;

        let mut identity = VersionIdentity::new(major, minor, patch);
        if let Some(prefix) = captures.name("prefix").map(|m| m.as_str()) {
            if !prefix.is_empty() {
                // Single character by construction of the pattern.
                if let Some(c) = prefix.chars().next() {
                    identity = identity.with_prefix(c)?;
                }
            }
        }
        if let Some(pre) = captures.name("pre") {
            identity = identity.with_pre_release(pre.as_str());
        }
        if let Some(meta) = captures.name("meta") {
            identity = identity.with_build_metadata(meta.as_str());
        }
        Ok(identity)
    }
}

fn parse_component(version: &str, name: &str, captures: &regex::Captures<'_>) -> Result<u32> {
    let raw = captures.name(name).map(|m| m.as_str()).ok_or_else(|| {
        ReleasePlanError::malformed_version(format!(
            "Could not parse version '{}': missing {} component",
            version, name
        ))
    })?;
    raw.parse().map_err(|_| {
        ReleasePlanError::malformed_version(format!(
            "Could not parse version '{}': {} component '{}' must be an integral value",
            version, name, raw
        ))
    })
}
