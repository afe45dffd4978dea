//! Serve Command
//!
//! Usage:
//!   company-screener serve [--host HOST] [--port PORT]

use crate::cli::ui::Output;
use crate::config::Config;
use crate::types::Result;

pub async fn run(
    mut config: Config,
    host: Option<String>,
    port: Option<u16>,
    out: &Output,
) -> Result<()> {
    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }

    out.info(&format!(
        "Serving on http://{}",
        config.server.bind_address()
    ));
    crate::server::serve(&config).await
}
