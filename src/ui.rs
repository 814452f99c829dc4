//! Terminal output formatting for the CLI.
//!
//! Pure formatting and printing; no prompts, no business logic.

use crate::graph::ActionGraph;
use crate::orchestrator::ResolvedBuild;
use console::style;

/// Print an error message in red.
pub fn display_error(message: &str) {
    eprintln!("{} {}", style("ERROR:").red().bold(), message);
}

/// Print a success message with a green checkmark.
pub fn display_success(message: &str) {
    println!("{} {}", style("✓").green(), message);
}

/// Print a status message with a yellow arrow.
pub fn display_status(message: &str) {
    println!("{} {}", style("→").yellow(), message);
}

/// Print the resolved release identity summary.
pub fn display_resolved(resolved: &ResolvedBuild) {
    println!("{}", style("Resolved release identity").bold());
    println!("  version:  {}", resolved.version.canonical());
    println!("  target:   {}", resolved.target.name);
    println!("  branch:   {}", resolved.descriptor.branch_name);
    println!("  commit:   {}", resolved.descriptor.short_hash());
    println!(
        "  distance: {}",
        if resolved.descriptor.distance_to_last_tag < 0 {
            "no tag".to_string()
        } else {
            resolved.descriptor.distance_to_last_tag.to_string()
        }
    );
    println!(
        "  dirty:    {}",
        if resolved.descriptor.is_dirty { "yes" } else { "no" }
    );
    if resolved.publish_plan.enabled {
        println!("  image:    {}", resolved.publish_plan.base_reference());
    }
}

/// Print one unit's action graph: names, predecessors, command lines.
pub fn display_graph(unit_name: &str, graph: &ActionGraph) {
    if graph.is_empty() {
        println!(
            "{} {}: no image actions (no Dockerfile or image disabled)",
            style("·").dim(),
            unit_name
        );
        return;
    }
    println!("{}", style(format!("Actions for '{}'", unit_name)).bold());
    for action in &graph.actions {
        let deps = if action.depends_on.is_empty() {
            String::new()
        } else {
            format!(" (after: {})", action.depends_on.join(", "))
        };
        println!("  {}{}", style(&action.name).cyan(), deps);
        if !action.is_aggregate() {
            println!("      $ {}", action.command.join(" "));
        }
    }
}
