//! Interactive mode for the server.
//!
//! Prompts for the bind address, port, and incident file before starting
//! the server.

use std::path::PathBuf;

use dialoguer::{Confirm, Input};

use crate::config::DashboardConfig;

/// Runs the server in interactive mode, prompting for configuration.
///
/// Starts from `config` and lets the user override the incident file, the
/// bind address, and the port, then delegates to [`super::run_server`].
///
/// # Errors
///
/// Returns an `std::io::Result` error if the underlying server fails to
/// start.
#[allow(clippy::future_not_send)]
pub async fn run(mut config: DashboardConfig) -> std::io::Result<()> {
    println!("Crime Dashboard Server");
    println!();

    let default_csv = config.data.incidents_csv.display().to_string();
    let csv: String = Input::new()
        .with_prompt("Incident CSV")
        .default(default_csv.clone())
        .interact_text()
        .unwrap_or(default_csv);
    config.data.incidents_csv = PathBuf::from(csv);

    let bind_addr: String = Input::new()
        .with_prompt("Bind address")
        .default(config.server.bind_addr.clone())
        .interact_text()
        .unwrap_or_else(|_| config.server.bind_addr.clone());
    config.server.bind_addr = bind_addr;

    let port: u16 = Input::new()
        .with_prompt("Port")
        .default(config.server.port)
        .interact_text()
        .unwrap_or(config.server.port);
    config.server.port = port;

    if !Confirm::new()
        .with_prompt(format!(
            "Start server on {}:{}?",
            config.server.bind_addr, config.server.port
        ))
        .default(true)
        .interact()
        .unwrap_or(true)
    {
        println!("Cancelled.");
        return Ok(());
    }

    super::run_server(config).await
}
