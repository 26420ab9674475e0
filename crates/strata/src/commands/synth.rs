use crate::deploy;
use colored::Colorize;
use std::path::Path;

pub fn handle(out_dir: &Path) -> anyhow::Result<()> {
    println!("{}", "Synthesizing stacks...".blue());

    let app = deploy::build_app()?;
    let assembly = app.synth()?;
    tracing::debug!("writing {} artifacts to {}", assembly.artifacts.len(), out_dir.display());
    assembly.write_to_dir(out_dir)?;

    println!("{}", "✓ Synthesis complete".green().bold());
    for artifact in &assembly.artifacts {
        println!(
            "  {} ({} resources)",
            artifact.stack.cyan(),
            artifact.resources.len()
        );
    }
    println!(
        "Artifacts written to {}",
        out_dir.display().to_string().cyan()
    );
    Ok(())
}
