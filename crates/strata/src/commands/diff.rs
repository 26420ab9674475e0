use crate::deploy;
use colored::Colorize;
use std::path::Path;
use strata_core::{ActionType, Assembly, Plan};

pub fn handle(out_dir: &Path) -> anyhow::Result<()> {
    let app = deploy::build_app()?;
    let current = app.synth()?;

    // No previous assembly means everything is a create.
    let previous = Assembly::load_from_dir(out_dir).ok();
    if previous.is_none() {
        println!(
            "No previous assembly in {}, planning from scratch",
            out_dir.display().to_string().cyan()
        );
    }

    let plan = Plan::diff(previous.as_ref(), &current);
    for action in &plan.actions {
        let tag = match action.action_type {
            ActionType::Create => "+".green().bold(),
            ActionType::Update => "~".yellow().bold(),
            ActionType::Delete => "-".red().bold(),
            ActionType::NoOp => "=".dimmed(),
        };
        println!(
            "  {} {}/{} ({})",
            tag,
            action.stack.cyan(),
            action.resource_id,
            action.kind
        );
    }
    println!();
    println!("{}", plan.summary());
    Ok(())
}
