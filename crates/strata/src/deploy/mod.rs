//! The two-tier deployment: network stack plus web/database stack
//!
//! The network stack synthesizes first; the server stack receives a handle to
//! it and declares the explicit ordering constraint on top of the edges
//! inferred from its references.

pub mod network;
pub mod server;

use strata_core::{App, Result};

/// Wire both stacks into a synthesis context
pub fn build_app() -> Result<App> {
    let (network_stack, network) = network::network_stack()?;
    let server_stack = server::server_stack(&network)?;

    let mut app = App::new();
    app.add_stack(network_stack)?;
    app.add_stack(server_stack)?;
    app.add_dependency(server::SERVER_STACK, network::NETWORK_STACK)?;
    Ok(app)
}
