//! Build orchestration: the composition root.
//!
//! Wires descriptor capture, version resolution, target matching, and
//! graph construction together exactly once per invocation, and offers the
//! version-bump actions that mutate the repository through the
//! [Repository] collaborator.

use crate::config::Config;
use crate::domain::{RepositoryDescriptor, VersionIdentity};
use crate::error::{ReleasePlanError, Result};
use crate::git::Repository;
use crate::graph::{ActionGraph, ImageTaskGraphBuilder, LoginGuard, ProjectUnit};
use crate::registry::ImagePublishPlan;
use crate::resolver::VersionResolver;
use crate::targets::{effective_force_key, select_target, ReleaseTarget};
use chrono::Utc;
use std::fs;
use std::path::PathBuf;

/// Everything resolved for one build invocation.
#[derive(Debug, Clone)]
pub struct ResolvedBuild {
    pub descriptor: RepositoryDescriptor,
    pub version: VersionIdentity,
    pub target: ReleaseTarget,
    pub publish_plan: ImagePublishPlan,
    pub date_stamp: String,
    pub version_file: Option<PathBuf>,
}

/// Which monotonic transition a bump applies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BumpKind {
    Patch,
    Minor,
    Major,
    /// Pre-release iteration, optionally replacing the identifier.
    PreRelease { pre_id: Option<String> },
}

/// Sequences resolver, matcher, and graph builder for one invocation.
pub struct BuildOrchestrator<'a, R: Repository> {
    repo: &'a R,
    config: &'a Config,
}

impl<'a, R: Repository> BuildOrchestrator<'a, R> {
    pub fn new(repo: &'a R, config: &'a Config) -> Self {
        BuildOrchestrator { repo, config }
    }

    /// Resolve the current release identity.
    ///
    /// Pipeline: capture descriptor, parse the raw version, select the
    /// release target (force key beats predicates, explicit parameter beats
    /// the environment), derive the publish plan. Any failure aborts before
    /// graph construction; no partial result is returned.
    pub fn resolve(&self, force_target: Option<&str>) -> Result<ResolvedBuild> {
        self.config.validate()?;
        let descriptor = self.repo.capture_descriptor()?;
        let resolver = VersionResolver::new()?;
        let version = resolver.resolve(&descriptor.raw_version)?;
        let force = effective_force_key(force_target);
        let target = select_target(
            &self.config.build_type,
            &version.canonical(),
            &self.config.targets,
            force.as_deref(),
        )?
        .clone();
        let date_stamp = Utc::now().format("%Y%m%dT%H%M%Sz").to_string();
        let publish_plan =
            ImagePublishPlan::for_target(&self.config.registry, &target, &version, &date_stamp)?;
        Ok(ResolvedBuild {
            descriptor,
            version,
            target,
            publish_plan,
            date_stamp,
            version_file: self.config.version_file.clone(),
        })
    }

    /// Author action graphs for every buildable unit of the run.
    ///
    /// A single [LoginGuard] spans all units, so at most one graph in the
    /// returned set carries a login node.
    pub fn plan_graphs(
        &self,
        resolved: &ResolvedBuild,
        units: &[ProjectUnit],
    ) -> Result<Vec<(String, ActionGraph)>> {
        let guard = LoginGuard::new();
        let builder = ImageTaskGraphBuilder::new(&resolved.publish_plan, &guard);
        units
            .iter()
            .map(|unit| Ok((unit.name.clone(), builder.build_graph(unit)?)))
            .collect()
    }

    /// Apply a version bump: compute the next identity, persist it, and
    /// register the change as one atomic logical step (commit + annotated
    /// tag at the new version string).
    ///
    /// Preconditions, checked in order: the version file location must be
    /// configured with an existing parent directory, and the working tree
    /// must be clean. No force flag exists for either.
    pub fn apply_bump(&self, resolved: &ResolvedBuild, bump: &BumpKind) -> Result<VersionIdentity> {
        let version_file = self.version_file_for_write(resolved)?;
        if !self.repo.is_clean()? {
            return Err(ReleasePlanError::dirty_workspace(
                "Your git workspace must be clean to perform a version update",
            ));
        }
        let next = match bump {
            BumpKind::Patch => resolved.version.next_patch(),
            BumpKind::Minor => resolved.version.next_minor(),
            BumpKind::Major => resolved.version.next_major(),
            BumpKind::PreRelease { pre_id } => match pre_id {
                Some(id) => resolved.version.next_pre_release_with(id),
                None => resolved.version.next_pre_release(),
            },
        };
        // Overwrite, never append: the file holds exactly one version.
        fs::write(&version_file, next.canonical())?;
        self.repo.commit_file(
            &version_file,
            &format!(
                "Update revision from '{}' to '{}'.",
                resolved.version.canonical(),
                next.canonical()
            ),
        )?;
        self.repo
            .create_annotated_tag(&next.canonical(), "Update revision")?;
        Ok(next)
    }

    fn version_file_for_write(&self, resolved: &ResolvedBuild) -> Result<PathBuf> {
        let version_file = resolved.version_file.clone().ok_or_else(|| {
            ReleasePlanError::config("version_file must be set to apply versions")
        })?;
        let parent = version_file
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."));
        if !parent.exists() {
            return Err(ReleasePlanError::config(format!(
                "version_file must point into an existing directory. Current value: '{}'",
                version_file.display()
            )));
        }
        Ok(version_file)
    }
}
