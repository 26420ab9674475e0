use crate::deploy;
use colored::Colorize;

pub fn handle() -> anyhow::Result<()> {
    let app = deploy::build_app()?;
    let order = app.topological_order()?;

    println!("Synthesis order:");
    for (i, stack) in order.iter().enumerate() {
        println!("  {}. {}", i + 1, stack.cyan());
    }
    Ok(())
}
