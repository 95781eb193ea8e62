//! Interactive mode for the server.
//!
//! Prompts for the listening address, seeded from `BIND_ADDR`/`PORT`,
//! then starts the server.

use dialoguer::{Confirm, Input};
use mesa_agua_source::form_def::FormDefinition;

use crate::ServerConfig;

/// Prompts for a [`ServerConfig`] and runs [`super::run_server`] with it.
///
/// # Errors
///
/// Returns an `std::io::Result` error if the underlying server fails to
/// start.
#[allow(clippy::future_not_send)]
pub async fn run() -> std::io::Result<()> {
    println!("Mesa de Agua Server");
    println!();

    if let Ok(form) = FormDefinition::mesa_agua()
        && std::env::var_os(&form.token_env).is_none()
    {
        println!("{} is not set; the map will load without data.", form.token_env);
        println!();
    }

    let initial = ServerConfig::from_env();

    let bind_addr: String = Input::new()
        .with_prompt("Bind address")
        .default(initial.bind_addr.clone())
        .interact_text()
        .unwrap_or_else(|_| initial.bind_addr.clone());

    let port: u16 = Input::new()
        .with_prompt("Port")
        .default(initial.port)
        .interact_text()
        .unwrap_or(initial.port);

    let config = ServerConfig { bind_addr, port };

    if !Confirm::new()
        .with_prompt(format!("Start server on {}:{}?", config.bind_addr, config.port))
        .default(true)
        .interact()
        .unwrap_or(true)
    {
        println!("Cancelled.");
        return Ok(());
    }

    super::run_server(config).await
}
