use std::net::SocketAddr;

use anyhow::{Context, Result};
use tracing::info;

use brandprobe::SessionLimiter;

use crate::commands::utils::{self, RenderArgs};

pub async fn handle_serve(
    host: String,
    port: u16,
    max_sessions: usize,
    args: RenderArgs,
) -> Result<()> {
    let addr: SocketAddr = format!("{}:{}", host, port)
        .parse()
        .with_context(|| format!("Invalid listen address {}:{}", host, port))?;

    let analyzer = utils::build_analyzer(&args, SessionLimiter::new(max_sessions))?;
    info!("Up to {} concurrent render sessions", max_sessions.max(1));

    brandprobe::server::serve(analyzer, addr).await
}
