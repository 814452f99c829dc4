//! Action graph construction for image build/tag/push.
//!
//! The builder authors a plan; it executes nothing. Each buildable unit
//! (root project or child) gets its own graph of named actions with
//! predecessor edges, and the external task executor is responsible for
//! running them. Edges always point at actions created earlier in the
//! sequence, so a graph is acyclic by construction.
//!
//! The one piece of shared mutable state in the whole design is the
//! [LoginGuard]: registry login is a process-wide singleton, requested by
//! every unit but created at most once per run.

use crate::error::Result;
use crate::registry::ImagePublishPlan;
use std::collections::{HashMap, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

/// A single named unit of work for the external executor.
///
/// Aggregate nodes (`tag-group`, `push-all`) carry an empty command; they
/// exist only to give the executor a single name that implies a set of
/// predecessors.
#[derive(Debug, Clone, PartialEq)]
pub struct Action {
    pub name: String,
    pub description: String,
    pub working_dir: PathBuf,
    pub command: Vec<String>,
    pub depends_on: Vec<String>,
}

impl Action {
    pub fn is_aggregate(&self) -> bool {
        self.command.is_empty()
    }
}

/// The ordered set of actions planned for one buildable unit.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ActionGraph {
    pub actions: Vec<Action>,
}

impl ActionGraph {
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    /// Look up an action by name.
    pub fn action(&self, name: &str) -> Option<&Action> {
        self.actions.iter().find(|a| a.name == name)
    }

    fn push(&mut self, action: Action) {
        self.actions.push(action);
    }

    /// A valid execution order for this graph's actions.
    ///
    /// Predecessors that are not part of this graph (the compile action the
    /// host build owns, or a login node emitted for an earlier unit in the
    /// same run) are treated as externally satisfied. The insertion
    /// discipline makes cycles impossible, so ordering always succeeds for
    /// graphs built here; the check still guards hand-assembled graphs in
    /// tests.
    pub fn execution_order(&self) -> Result<Vec<&str>> {
        let mut indegree: HashMap<&str, usize> = HashMap::new();
        let mut dependents: HashMap<&str, Vec<&str>> = HashMap::new();
        for action in &self.actions {
            let internal = action
                .depends_on
                .iter()
                .filter(|d| self.action(d).is_some())
                .count();
            indegree.insert(&action.name, internal);
            for dep in &action.depends_on {
                if self.action(dep).is_some() {
                    dependents.entry(dep).or_default().push(&action.name);
                }
            }
        }
        let mut ready: VecDeque<&str> = self
            .actions
            .iter()
            .filter(|a| indegree[a.name.as_str()] == 0)
            .map(|a| a.name.as_str())
            .collect();
        let mut order = Vec::with_capacity(self.actions.len());
        while let Some(name) = ready.pop_front() {
            order.push(name);
            for dependent in dependents.get(name).cloned().unwrap_or_default() {
                if let Some(count) = indegree.get_mut(dependent) {
                    *count -= 1;
                    if *count == 0 {
                        ready.push_back(dependent);
                    }
                }
            }
        }
        if order.len() != self.actions.len() {
            return Err(crate::error::ReleasePlanError::config(
                "Action graph contains a dependency cycle",
            ));
        }
        Ok(order)
    }
}

/// Process-wide "login has run" flag.
///
/// Shared by reference across every graph-builder invocation of a run.
/// `try_acquire` is an atomic check-and-set, so a parallel executor cannot
/// observe two winners.
#[derive(Debug, Default)]
pub struct LoginGuard {
    fired: AtomicBool,
}

impl LoginGuard {
    pub fn new() -> Self {
        LoginGuard {
            fired: AtomicBool::new(false),
        }
    }

    /// Claim the login action. Returns true exactly once.
    pub fn try_acquire(&self) -> bool {
        self.fired
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
    }

    pub fn has_fired(&self) -> bool {
        self.fired.load(Ordering::SeqCst)
    }
}

/// One buildable unit handed to the graph builder: the root project or a
/// child project.
#[derive(Debug, Clone)]
pub struct ProjectUnit {
    pub name: String,
    /// Directory holding the unit's image descriptor file.
    pub project_dir: PathBuf,
    /// The unit's build output root; the image build context is staged
    /// beneath it.
    pub build_root: PathBuf,
    /// Name of the unit's compile/package action when the host build
    /// exposes one. This is a capability query answered by the caller,
    /// never hard-coded here.
    pub compile_action: Option<String>,
}

impl ProjectUnit {
    pub fn new(name: impl Into<String>, project_dir: impl Into<PathBuf>) -> Self {
        let project_dir = project_dir.into();
        let build_root = project_dir.join("build");
        ProjectUnit {
            name: name.into(),
            project_dir,
            build_root,
            compile_action: None,
        }
    }

    pub fn with_compile_action(mut self, action: impl Into<String>) -> Self {
        self.compile_action = Some(action.into());
        self
    }
}

/// Builds the ordered action graph for one unit's image work.
///
/// One builder per run; invoked once per buildable unit. Login
/// deduplication spans all invocations through the shared [LoginGuard].
pub struct ImageTaskGraphBuilder<'a> {
    plan: &'a ImagePublishPlan,
    login_guard: &'a LoginGuard,
}

impl<'a> ImageTaskGraphBuilder<'a> {
    pub fn new(plan: &'a ImagePublishPlan, login_guard: &'a LoginGuard) -> Self {
        ImageTaskGraphBuilder { plan, login_guard }
    }

    /// Author the action graph for one unit.
    ///
    /// A unit without an image descriptor file produces no nodes at all.
    /// A disabled plan (target produces no image) likewise yields an empty
    /// graph. No partial graph is ever returned: any failure aborts the
    /// whole construction.
    pub fn build_graph(&self, unit: &ProjectUnit) -> Result<ActionGraph> {
        let mut graph = ActionGraph::default();
        if !self.plan.enabled || !self.plan.has_dockerfile(&unit.project_dir) {
            return Ok(graph);
        }

        let staging_dir = unit.build_root.join(&self.plan.build_dir);
        self.add_assemble(&mut graph, unit, &staging_dir);
        self.add_build(&mut graph, &staging_dir);
        let tag_names = self.add_tags(&mut graph, &staging_dir);
        self.add_tag_group(&mut graph, &staging_dir, &tag_names);

        if self.plan.requires_login() {
            self.add_login(&mut graph, unit);
            let push_names = self.add_pushes(&mut graph, &staging_dir);
            self.add_push_all(&mut graph, &staging_dir, &push_names);
        }
        Ok(graph)
    }

    fn add_assemble(&self, graph: &mut ActionGraph, unit: &ProjectUnit, staging_dir: &Path) {
        let dockerfile = unit.project_dir.join(&self.plan.dockerfile);
        let depends_on = unit.compile_action.iter().cloned().collect();
        graph.push(Action {
            name: "assemble".to_string(),
            description: "Assemble docker content for build".to_string(),
            working_dir: unit.project_dir.clone(),
            command: vec![
                "cp".to_string(),
                dockerfile.display().to_string(),
                staging_dir.display().to_string(),
            ],
            depends_on,
        });
    }

    fn add_build(&self, graph: &mut ActionGraph, staging_dir: &Path) {
        graph.push(Action {
            name: "build".to_string(),
            description: "Build the primary docker image".to_string(),
            working_dir: staging_dir.to_path_buf(),
            command: vec![
                "docker".to_string(),
                "build".to_string(),
                "--tag".to_string(),
                self.plan.base_reference(),
                ".".to_string(),
            ],
            depends_on: vec!["assemble".to_string()],
        });
    }

    fn add_tags(&self, graph: &mut ActionGraph, staging_dir: &Path) -> Vec<String> {
        let mut names = Vec::new();
        for tag in &self.plan.tags {
            let name = format!("tag-{}", tag.short_label);
            graph.push(Action {
                name: name.clone(),
                description: tag.description.clone(),
                working_dir: staging_dir.to_path_buf(),
                command: vec![
                    "docker".to_string(),
                    "tag".to_string(),
                    self.plan.base_reference(),
                    self.plan.tag_reference(tag),
                ],
                depends_on: vec!["build".to_string()],
            });
            names.push(name);
        }
        names
    }

    fn add_tag_group(&self, graph: &mut ActionGraph, staging_dir: &Path, tag_names: &[String]) {
        let mut depends_on = vec!["build".to_string()];
        depends_on.extend(tag_names.iter().cloned());
        graph.push(Action {
            name: "tag-group".to_string(),
            description: "Apply all configured tags".to_string(),
            working_dir: staging_dir.to_path_buf(),
            command: Vec::new(),
            depends_on,
        });
    }

    fn add_login(&self, graph: &mut ActionGraph, unit: &ProjectUnit) {
        // The guard is shared across every unit of the run: only the first
        // claimant gets a node. Later units still depend on the name.
        if self.login_guard.try_acquire() {
            graph.push(Action {
                name: "login".to_string(),
                description: "Login to the configured docker registry".to_string(),
                working_dir: unit.project_dir.clone(),
                command: self.plan.login_args(),
                depends_on: Vec::new(),
            });
        }
    }

    fn add_pushes(&self, graph: &mut ActionGraph, staging_dir: &Path) -> Vec<String> {
        let mut names = Vec::new();
        for tag in &self.plan.tags {
            let name = format!("push-{}", tag.short_label);
            graph.push(Action {
                name: name.clone(),
                description: format!(
                    "Push the image tag '{}': {}",
                    tag.value, tag.description
                ),
                working_dir: staging_dir.to_path_buf(),
                command: vec![
                    "docker".to_string(),
                    "push".to_string(),
                    self.plan.tag_reference(tag),
                ],
                // tag-group guarantees every tag exists before any push.
                depends_on: vec!["tag-group".to_string(), "login".to_string()],
            });
            names.push(name);
        }
        names
    }

    fn add_push_all(&self, graph: &mut ActionGraph, staging_dir: &Path, push_names: &[String]) {
        graph.push(Action {
            name: "push-all".to_string(),
            description: "Push all configured tags".to_string(),
            working_dir: staging_dir.to_path_buf(),
            command: Vec::new(),
            depends_on: push_names.to_vec(),
        });
    }
}
