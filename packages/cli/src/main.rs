#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Interactive CLI entry point for the Mesa de Agua tools.
//!
//! Lets users pick between starting the map API server and printing a
//! dashboard summary of the survey straight to the terminal.
//!
//! Uses `indicatif-log-bridge` (via [`mesa_agua_cli_utils::init_logger`])
//! to route `log` output through `indicatif::MultiProgress` so that log
//! lines and spinners never fight for the terminal.

mod summary;

use dialoguer::Select;

/// Top-level tool selection.
enum Tool {
    Server,
    Summary,
}

impl Tool {
    const ALL: &[Self] = &[Self::Server, Self::Summary];

    #[must_use]
    const fn label(&self) -> &'static str {
        match self {
            Self::Server => "Start server",
            Self::Summary => "Print survey summary",
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let multi = mesa_agua_cli_utils::init_logger();

    println!("Mesa de Agua");
    println!();

    let labels: Vec<&str> = Tool::ALL.iter().map(Tool::label).collect();

    let idx = Select::new()
        .with_prompt("What would you like to do?")
        .items(&labels)
        .default(0)
        .interact()?;

    match Tool::ALL[idx] {
        Tool::Server => {
            // The server uses actix-web's runtime, so we need to run it
            // in a blocking task to avoid nesting tokio runtimes.
            tokio::task::spawn_blocking(|| {
                actix_web::rt::System::new().block_on(mesa_agua_server::interactive::run())
            })
            .await??;
        }
        Tool::Summary => summary::run(&multi).await?,
    }

    Ok(())
}
