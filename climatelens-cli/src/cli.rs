use std::{fmt, sync::Arc};

use anyhow::Context;
use clap::{Parser, Subcommand};
use climatelens_core::{
    Config, Dashboard, HttpGatewayClient, Mode, ProviderId, SeedRepository,
    client::DEFAULT_GATEWAY_URL, seed::SEED_CITY,
};
use inquire::{Password, Select, Text};

use crate::render;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "climatelens", version, about = "ClimateLens dashboard")]
pub struct Cli {
    /// Base URL of the ClimateLens gateway.
    #[arg(long, global = true, env = "CLIMATELENS_GATEWAY", default_value = DEFAULT_GATEWAY_URL)]
    pub gateway: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the API key for a provider in the config file.
    Configure {
        /// Provider short name: "openweather", "airvisual" or "openai".
        provider: String,
    },

    /// Fetch and print the dashboard once.
    Show {
        #[arg(long, default_value = SEED_CITY)]
        city: String,

        /// Show seed data without contacting the gateway.
        #[arg(long)]
        demo: bool,

        /// Also generate a summary.
        #[arg(long)]
        summary: bool,
    },

    /// Interactive dashboard.
    Dashboard {
        #[arg(long, default_value = SEED_CITY)]
        city: String,

        #[arg(long)]
        demo: bool,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    ChangeCity,
    ToggleMode,
    GenerateSummary,
    Refresh,
    Quit,
}

impl Action {
    const ALL: [Action; 5] = [
        Action::ChangeCity,
        Action::ToggleMode,
        Action::GenerateSummary,
        Action::Refresh,
        Action::Quit,
    ];
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Action::ChangeCity => "Change city",
            Action::ToggleMode => "Switch live/demo mode",
            Action::GenerateSummary => "Generate AI summary",
            Action::Refresh => "Refresh",
            Action::Quit => "Quit",
        })
    }
}

fn mode_for(demo: bool) -> Mode {
    if demo { Mode::Demo } else { Mode::Live }
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        let seed = Arc::new(SeedRepository::default());
        let client = HttpGatewayClient::new(self.gateway);

        match self.command {
            Command::Configure { provider } => configure(&provider)?,
            Command::Show {
                city,
                demo,
                summary,
            } => {
                let dashboard = Dashboard::new(client, seed)
                    .with_city(city)
                    .with_mode(mode_for(demo));
                dashboard.refresh().await;
                if summary {
                    dashboard.generate_summary().await;
                }
                print!("{}", render::snapshot(&dashboard.snapshot()));
            }
            Command::Dashboard { city, demo } => {
                let dashboard = Dashboard::new(client, seed)
                    .with_city(city)
                    .with_mode(mode_for(demo));
                interactive(&dashboard).await?;
            }
        }

        Ok(())
    }
}

fn configure(provider: &str) -> anyhow::Result<()> {
    let id = ProviderId::try_from(provider)?;
    let mut config = Config::load()?;

    let api_key = Password::new(&format!("API key for {id}:"))
        .without_confirmation()
        .prompt()
        .context("Failed to read API key")?;

    config.upsert_provider_api_key(id, api_key.trim().to_string());
    config.save()?;

    println!("Saved {id} key to {}", Config::config_file_path()?.display());
    Ok(())
}

async fn interactive(dashboard: &Dashboard<HttpGatewayClient>) -> anyhow::Result<()> {
    dashboard.refresh().await;

    loop {
        print!("{}", render::snapshot(&dashboard.snapshot()));

        let action = Select::new("What next?", Action::ALL.to_vec())
            .prompt()
            .context("Failed to read action")?;

        match action {
            Action::ChangeCity => {
                if dashboard.mode() == Mode::Demo {
                    println!("City input is disabled in demo mode.");
                    continue;
                }
                let city = Text::new("City:")
                    .with_initial_value(&dashboard.city())
                    .prompt()
                    .context("Failed to read city")?;
                dashboard.set_city(city.trim()).await;
            }
            Action::ToggleMode => {
                dashboard.toggle_mode().await;
            }
            Action::GenerateSummary => {
                if dashboard.generate_summary().await.is_none() {
                    println!("Summary unavailable, is the gateway running?");
                }
            }
            Action::Refresh => dashboard.refresh().await,
            Action::Quit => return Ok(()),
        }
    }
}
