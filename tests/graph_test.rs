// Action-graph construction across a whole multi-project run.

use release_plan::config::RegistryConfig;
use release_plan::domain::VersionIdentity;
use release_plan::graph::{ImageTaskGraphBuilder, LoginGuard, ProjectUnit};
use release_plan::registry::ImagePublishPlan;
use release_plan::targets::ReleaseTarget;
use std::fs;
use tempfile::TempDir;

fn image_target() -> ReleaseTarget {
    let mut target = ReleaseTarget::new("production", ".*");
    target.image_tag = Some("latest".to_string());
    target
}

fn plan(registry: &RegistryConfig) -> ImagePublishPlan {
    ImagePublishPlan::for_target(
        registry,
        &image_target(),
        &VersionIdentity::new(1, 2, 3),
        "20240101T000000z",
    )
    .expect("plan should build")
}

fn unit(dir: &TempDir, name: &str, with_dockerfile: bool) -> ProjectUnit {
    let project_dir = dir.path().join(name);
    fs::create_dir_all(&project_dir).unwrap();
    if with_dockerfile {
        fs::write(project_dir.join("Dockerfile"), "FROM scratch\n").unwrap();
    }
    ProjectUnit::new(name, project_dir)
}

#[test]
fn login_appears_once_across_root_and_two_children() {
    let dir = TempDir::new().unwrap();
    let registry = RegistryConfig {
        host: "registry.example.com".to_string(),
        org: None,
        repo_name: "widget".to_string(),
        username: "ci".to_string(),
        api_token: "secret".to_string(),
    };
    let plan = plan(&registry);
    let guard = LoginGuard::new();
    let builder = ImageTaskGraphBuilder::new(&plan, &guard);

    let units = [
        unit(&dir, "root", true),
        unit(&dir, "child-a", true),
        unit(&dir, "child-b", true),
    ];
    let graphs: Vec<_> = units
        .iter()
        .map(|u| builder.build_graph(u).unwrap())
        .collect();

    let login_count = graphs
        .iter()
        .flat_map(|g| g.actions.iter())
        .filter(|a| a.name == "login")
        .count();
    assert_eq!(login_count, 1);

    // All three units plan pushes; all pushes gate on the singleton login.
    for graph in &graphs {
        let push = graph.action("push-latest").expect("push planned");
        assert!(push.depends_on.contains(&"login".to_string()));
    }
}

#[test]
fn local_registry_emits_no_login_regardless_of_tags() {
    let dir = TempDir::new().unwrap();
    let registry = RegistryConfig {
        repo_name: "widget".to_string(),
        ..RegistryConfig::default()
    };
    let plan = plan(&registry);
    assert!(plan.is_local);

    let guard = LoginGuard::new();
    let graph = ImageTaskGraphBuilder::new(&plan, &guard)
        .build_graph(&unit(&dir, "root", true))
        .unwrap();

    assert!(graph.action("login").is_none());
    assert!(graph.action("push-latest").is_none());
    assert!(graph.action("tag-latest").is_some());
}

#[test]
fn unit_without_dockerfile_contributes_nothing() {
    let dir = TempDir::new().unwrap();
    let registry = RegistryConfig {
        host: "registry.example.com".to_string(),
        org: None,
        repo_name: "widget".to_string(),
        username: "ci".to_string(),
        api_token: "secret".to_string(),
    };
    let plan = plan(&registry);
    let guard = LoginGuard::new();
    let builder = ImageTaskGraphBuilder::new(&plan, &guard);

    let bare = builder.build_graph(&unit(&dir, "bare", false)).unwrap();
    assert!(bare.is_empty());
    // An empty unit must not consume the run's login slot either.
    assert!(!guard.has_fired());

    let real = builder.build_graph(&unit(&dir, "real", true)).unwrap();
    assert!(real.action("login").is_some());
}

#[test]
fn every_graph_has_a_valid_execution_order() {
    let dir = TempDir::new().unwrap();
    let registry = RegistryConfig {
        host: "registry.example.com".to_string(),
        org: Some("acme".to_string()),
        repo_name: "widget".to_string(),
        username: "ci".to_string(),
        api_token: "secret".to_string(),
    };
    let plan = plan(&registry);
    let guard = LoginGuard::new();
    let builder = ImageTaskGraphBuilder::new(&plan, &guard);

    for name in ["root", "child-a", "child-b"] {
        let graph = builder.build_graph(&unit(&dir, name, true)).unwrap();
        let order = graph.execution_order().unwrap();
        assert_eq!(order.len(), graph.len());
        // Predecessors present in the graph appear before their dependents.
        for action in &graph.actions {
            let own = order.iter().position(|n| *n == action.name).unwrap();
            for dep in &action.depends_on {
                if let Some(pos) = order.iter().position(|n| n == dep) {
                    assert!(pos < own, "{} must run before {}", dep, action.name);
                }
            }
        }
    }
}
