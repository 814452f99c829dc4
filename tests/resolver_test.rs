// End-to-end coverage of describe-string handling: descriptor derivation
// plus version resolution, driven through the public API.

use release_plan::domain::{RepositoryDescriptor, NO_TAG_VERSION};
use release_plan::resolver::VersionResolver;
use release_plan::ReleasePlanError;
use tempfile::TempDir;

fn descriptor(describe: &str, hash: &str) -> RepositoryDescriptor {
    let dir = TempDir::new().expect("temp dir");
    RepositoryDescriptor::new(dir.path(), describe, hash, "main", false)
        .expect("descriptor should build")
}

#[test]
fn clean_zero_distance_describe_resolves() {
    let d = descriptor("v2.3.1-0-ab12cd34", "ab12cd34ff00112233445566778899aabbccddee");
    assert_eq!(d.distance_to_last_tag, 0);

    let resolver = VersionResolver::new().unwrap();
    let version = resolver.resolve(&d.raw_version).unwrap();
    assert_eq!((version.major, version.minor, version.patch), (2, 3, 1));
    assert_eq!(version.canonical(), "v2.3.1");
}

#[test]
fn distance_is_carried_through() {
    let d = descriptor("v1.0.0-14-9f8e7d6c", "9f8e7d6c112233445566778899aabbccddeeff00");
    assert_eq!(d.distance_to_last_tag, 14);

    let resolver = VersionResolver::new().unwrap();
    let version = resolver.resolve(&d.raw_version).unwrap();
    assert_eq!(version.canonical(), "v1.0.0");
}

#[test]
fn never_tagged_repository_resolves_to_sentinel() {
    let d = descriptor("ab12cd3", "ab12cd34ff00112233445566778899aabbccddee");
    assert_eq!(d.raw_version, NO_TAG_VERSION);

    // The sentinel resolves without error: a missing tag is not a failure.
    let resolver = VersionResolver::new().unwrap();
    let version = resolver.resolve(&d.raw_version).unwrap();
    assert_eq!((version.major, version.minor, version.patch), (0, 0, 0));
    assert_eq!(version.pre_release.as_deref(), Some("NOTAG"));
}

#[test]
fn git_style_describe_with_g_marker_resolves() {
    // `git describe --long` prefixes the abbreviated hash with 'g'.
    let d = descriptor("v1.4.2-3-g9f8e7d6", "9f8e7d6c112233445566778899aabbccddeeff00");
    assert_eq!(d.raw_version, "v1.4.2");
    assert_eq!(d.distance_to_last_tag, 3);
}

#[test]
fn resolved_identity_round_trips() {
    let resolver = VersionResolver::new().unwrap();
    for input in ["v2.3.1", "1.0.0-rc.2", "=0.4.0+exp.sha.5114f85"] {
        let version = resolver.resolve(input).unwrap();
        let reparsed = resolver.resolve(&version.canonical()).unwrap();
        assert_eq!(reparsed, version);
    }
}

#[test]
fn malformed_raw_version_is_rejected_loudly() {
    let resolver = VersionResolver::new().unwrap();
    for input in ["", "v1.2", "v1.2.3.4", "v1.2.3 ", "1.2.3-", "1.2.3+"] {
        let result = resolver.resolve(input);
        assert!(
            matches!(result, Err(ReleasePlanError::MalformedVersion(_))),
            "'{}' should be rejected",
            input
        );
    }
}

#[test]
fn bump_sequence_behaves_monotonically() {
    let resolver = VersionResolver::new().unwrap();
    let version = resolver.resolve("v1.2.3-beta.1").unwrap();

    let patch = version.next_patch();
    assert_eq!(patch.canonical(), "v1.2.4");

    let minor = version.next_minor();
    assert_eq!(minor.canonical(), "v1.3.0");

    let major = version.next_major();
    assert_eq!(major.canonical(), "v2.0.0");

    // Pre-release iteration keeps major.minor.patch fixed.
    let pre = version.next_pre_release();
    assert_eq!(pre.canonical(), "v1.2.3-beta.2");
}
