//! Image publish planning.
//!
//! [ImagePublishPlan] is the resolved, validated view of the registry
//! configuration for one build: where the image goes, what it is called,
//! which tags apply, and whether a login is needed at all. It performs no
//! registry I/O; the action graph carries its command lines to the external
//! executor.

use crate::config::RegistryConfig;
use crate::domain::{ImageTag, VersionIdentity};
use crate::error::{ReleasePlanError, Result};
use crate::targets::ReleaseTarget;
use std::path::Path;

/// Resolved image publish settings for a single build invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct ImagePublishPlan {
    pub enabled: bool,
    pub host: String,
    pub org: Option<String>,
    pub repo: String,
    pub is_local: bool,
    pub is_hub: bool,
    pub username: String,
    pub api_token: String,
    pub dockerfile: String,
    pub build_dir: String,
    pub tags: Vec<ImageTag>,
    /// Canonical version string lower-cased for registry tag use.
    pub version_string: String,
    pub date_stamp: String,
}

impl ImagePublishPlan {
    /// The inert plan used when the selected target produces no image.
    pub fn disabled() -> Self {
        ImagePublishPlan {
            enabled: false,
            host: String::new(),
            org: None,
            repo: String::new(),
            is_local: true,
            is_hub: false,
            username: String::new(),
            api_token: String::new(),
            dockerfile: "Dockerfile".to_string(),
            build_dir: "docker".to_string(),
            tags: Vec::new(),
            version_string: String::new(),
            date_stamp: String::new(),
        }
    }

    /// Build the publish plan for a resolved (target, version) pair.
    ///
    /// Returns the disabled plan when the target produces no image. For a
    /// remote registry, missing credentials are rejected here: failing
    /// closed beats emitting a push action that will certainly fail.
    pub fn for_target(
        registry: &RegistryConfig,
        target: &ReleaseTarget,
        version: &VersionIdentity,
        date_stamp: &str,
    ) -> Result<Self> {
        if !target.produces_image() {
            return Ok(ImagePublishPlan::disabled());
        }
        let is_local = registry.is_local();
        if !is_local && (registry.username.is_empty() || registry.api_token.is_empty()) {
            return Err(ReleasePlanError::config(format!(
                "Registry '{}' requires username and api_token for push",
                registry.host
            )));
        }
        if registry.repo_name.is_empty() {
            return Err(ReleasePlanError::config(
                "registry.repo_name must be set when the target produces an image",
            ));
        }
        let label = target.image_tag_label();
        Ok(ImagePublishPlan {
            enabled: true,
            host: registry.host.clone(),
            org: registry.org.clone(),
            repo: registry.repo_name.clone(),
            is_local,
            is_hub: registry.is_hub(),
            username: registry.username.clone(),
            api_token: registry.api_token.clone(),
            dockerfile: "Dockerfile".to_string(),
            build_dir: "docker".to_string(),
            tags: vec![ImageTag::for_target_label(label)],
            version_string: version.canonical().to_lowercase(),
            date_stamp: date_stamp.to_string(),
        })
    }

    /// The base image reference the build tags first.
    ///
    /// Local and hub builds use the bare repository name; any other remote
    /// prefixes host and optional org.
    pub fn base_reference(&self) -> String {
        if self.is_local || self.is_hub {
            self.repo.clone()
        } else {
            let mut reference = format!("{}/", self.host);
            if let Some(org) = &self.org {
                reference.push_str(org);
                reference.push('/');
            }
            reference.push_str(&self.repo);
            reference
        }
    }

    /// The full reference for one tag: `base:tagvalue`.
    pub fn tag_reference(&self, tag: &ImageTag) -> String {
        format!("{}:{}", self.base_reference(), tag.value)
    }

    /// Whether a registry login must precede pushes.
    pub fn requires_login(&self) -> bool {
        self.enabled && !self.is_local
    }

    /// The argv for the registry login command.
    ///
    /// The public hub form omits the trailing host argument; every other
    /// registry requires it. Two wire forms, one logical action.
    pub fn login_args(&self) -> Vec<String> {
        let mut args = vec![
            "docker".to_string(),
            "login".to_string(),
            "-u".to_string(),
            self.username.clone(),
            "-p".to_string(),
            self.api_token.clone(),
        ];
        if !self.is_hub {
            args.push(self.host.clone());
        }
        args
    }

    /// Whether this unit's image descriptor file exists.
    pub fn has_dockerfile(&self, project_dir: &Path) -> bool {
        project_dir.join(&self.dockerfile).exists()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PUBLIC_HUB_HOST;

    fn remote_registry() -> RegistryConfig {
        RegistryConfig {
            host: "registry.example.com".to_string(),
            org: Some("acme".to_string()),
            repo_name: "widget".to_string(),
            username: "ci".to_string(),
            api_token: "secret".to_string(),
        }
    }

    fn image_target() -> ReleaseTarget {
        let mut target = ReleaseTarget::new("production", ".*");
        target.image_tag = Some("latest".to_string());
        target
    }

    fn plan_for(registry: &RegistryConfig) -> ImagePublishPlan {
        ImagePublishPlan::for_target(
            registry,
            &image_target(),
            &VersionIdentity::new(1, 2, 3),
            "20240101T000000z",
        )
        .unwrap()
    }

    #[test]
    fn test_disabled_when_target_has_no_image() {
        let target = ReleaseTarget::new("plain", ".*");
        let plan = ImagePublishPlan::for_target(
            &remote_registry(),
            &target,
            &VersionIdentity::new(1, 0, 0),
            "ts",
        )
        .unwrap();
        assert!(!plan.enabled);
        assert!(!plan.requires_login());
    }

    #[test]
    fn test_remote_base_reference_includes_host_and_org() {
        let plan = plan_for(&remote_registry());
        assert_eq!(plan.base_reference(), "registry.example.com/acme/widget");
    }

    #[test]
    fn test_remote_base_reference_without_org() {
        let mut registry = remote_registry();
        registry.org = None;
        let plan = plan_for(&registry);
        assert_eq!(plan.base_reference(), "registry.example.com/widget");
    }

    #[test]
    fn test_local_base_reference_is_bare_repo() {
        let registry = RegistryConfig {
            repo_name: "widget".to_string(),
            ..RegistryConfig::default()
        };
        let plan = plan_for(&registry);
        assert_eq!(plan.base_reference(), "widget");
        assert!(!plan.requires_login());
    }

    #[test]
    fn test_hub_base_reference_is_bare_repo() {
        let registry = RegistryConfig {
            host: PUBLIC_HUB_HOST.to_string(),
            ..remote_registry()
        };
        let plan = plan_for(&registry);
        assert_eq!(plan.base_reference(), "widget");
        assert!(plan.requires_login());
    }

    #[test]
    fn test_tag_reference() {
        let plan = plan_for(&remote_registry());
        let tag = ImageTag::for_target_label("latest");
        assert_eq!(
            plan.tag_reference(&tag),
            "registry.example.com/acme/widget:latest"
        );
    }

    #[test]
    fn test_login_args_include_host_for_private_registry() {
        let plan = plan_for(&remote_registry());
        assert_eq!(
            plan.login_args(),
            vec!["docker", "login", "-u", "ci", "-p", "secret", "registry.example.com"]
        );
    }

    #[test]
    fn test_login_args_omit_host_for_hub() {
        let registry = RegistryConfig {
            host: PUBLIC_HUB_HOST.to_string(),
            ..remote_registry()
        };
        let plan = plan_for(&registry);
        assert_eq!(
            plan.login_args(),
            vec!["docker", "login", "-u", "ci", "-p", "secret"]
        );
    }

    #[test]
    fn test_missing_credentials_fail_closed() {
        let registry = RegistryConfig {
            username: String::new(),
            ..remote_registry()
        };
        let result = ImagePublishPlan::for_target(
            &registry,
            &image_target(),
            &VersionIdentity::new(1, 0, 0),
            "ts",
        );
        assert!(matches!(result, Err(ReleasePlanError::Config(_))));
    }

    #[test]
    fn test_version_string_is_lowercased() {
        let version = VersionIdentity::new(1, 0, 0).with_pre_release("RC.1");
        let plan = ImagePublishPlan::for_target(
            &remote_registry(),
            &image_target(),
            &version,
            "ts",
        )
        .unwrap();
        assert_eq!(plan.version_string, "1.0.0-rc.1");
    }

    #[test]
    fn test_default_tag_from_target_label() {
        let plan = plan_for(&remote_registry());
        assert_eq!(plan.tags.len(), 1);
        assert_eq!(plan.tags[0].value, "latest");
    }
}
