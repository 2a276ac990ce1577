#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Command-line front end for the crime dashboard.
//!
//! Each subcommand loads the configured incident file, applies the filter
//! flags, and prints or writes one dashboard output. Without a subcommand
//! an interactive session walks through the same choices.

mod commands;
mod interactive;

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use crime_dash_analytics::DashboardView;
use crime_dash_analytics_models::{DateRange, FilterSelection};
use crime_dash_server::config::DashboardConfig;

#[derive(Parser)]
#[command(name = "crime_dash_cli", about = "Crime incident dashboard tool")]
struct Cli {
    /// Incident CSV (overrides the configured default)
    #[arg(long, global = true)]
    csv: Option<PathBuf>,
    /// Neighborhood boundaries `GeoJSON` (overrides the configured default)
    #[arg(long, global = true)]
    geojson: Option<PathBuf>,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print headline numbers and rankings
    Summary {
        #[command(flatten)]
        filters: FilterArgs,
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Write the filtered table as a semicolon-delimited CSV
    Export {
        #[command(flatten)]
        filters: FilterArgs,
        /// Output path (defaults to the configured export file name)
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
    /// Write the choropleth `GeoJSON` for the filtered data
    Map {
        #[command(flatten)]
        filters: FilterArgs,
        /// Output path (prints to stdout when omitted)
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
    /// Start the HTTP API server
    Serve {
        /// Address to bind
        #[arg(long)]
        bind_addr: Option<String>,
        /// Port to listen on
        #[arg(long)]
        port: Option<u16>,
    },
}

#[derive(Args, Default)]
struct FilterArgs {
    /// Incident type to keep (repeatable)
    #[arg(long = "natureza")]
    naturezas: Vec<String>,
    /// Neighborhood to keep (repeatable)
    #[arg(long = "bairro")]
    bairros: Vec<String>,
    /// First day included (YYYY-MM-DD)
    #[arg(long)]
    from: Option<NaiveDate>,
    /// Last day included (YYYY-MM-DD)
    #[arg(long)]
    to: Option<NaiveDate>,
}

impl FilterArgs {
    fn to_selection(&self) -> FilterSelection {
        FilterSelection {
            naturezas: self.naturezas.iter().cloned().collect(),
            bairros: self.bairros.iter().cloned().collect(),
            date_range: DateRange::new(self.from, self.to),
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init_custom_env("RUST_LOG");

    let cli = Cli::parse();

    let mut config = DashboardConfig::load()?;
    if let Some(csv) = cli.csv {
        config.data.incidents_csv = csv;
    }
    if let Some(geojson) = cli.geojson {
        config.data.boundaries_geojson = geojson;
    }

    let Some(command) = cli.command else {
        return interactive::run(config);
    };

    match command {
        Commands::Summary { filters, json } => {
            let current = commands::load(&config)?;
            let view = DashboardView::build(
                &current.ingested.table,
                &filters.to_selection(),
                config.charts,
            );
            if json {
                println!("{}", commands::summary_json(&view)?);
            } else {
                print!("{}", commands::render_summary(&view));
            }
        }
        Commands::Export { filters, output } => {
            let current = commands::load(&config)?;
            let path =
                output.unwrap_or_else(|| PathBuf::from(&config.data.export_file_name));
            let written =
                commands::export(&current.ingested.table, &filters.to_selection(), &path)?;
            println!("{written} registro(s) exportado(s) para {}", path.display());
        }
        Commands::Map { filters, output } => {
            let current = commands::load(&config)?;
            let view = DashboardView::build(
                &current.ingested.table,
                &filters.to_selection(),
                config.charts,
            );
            match (commands::map_geojson(&config, &view)?, output) {
                (None, _) => eprintln!(
                    "GeoJSON de bairros nao encontrado em {}. Mapa desabilitado.",
                    config.data.boundaries_geojson.display()
                ),
                (Some(geojson), Some(path)) => {
                    std::fs::write(&path, geojson)?;
                    println!("Mapa gravado em {}", path.display());
                }
                (Some(geojson), None) => println!("{geojson}"),
            }
        }
        Commands::Serve { bind_addr, port } => {
            if let Some(bind_addr) = bind_addr {
                config.server.bind_addr = bind_addr;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            actix_web::rt::System::new().block_on(crime_dash_server::run_server(config))?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_flags_build_a_selection() {
        let cli = Cli::parse_from([
            "crime_dash_cli",
            "summary",
            "--natureza",
            "FURTO",
            "--natureza",
            "ROUBO",
            "--from",
            "2021-01-01",
        ]);
        let Some(Commands::Summary { filters, json }) = cli.command else {
            panic!("expected the summary command");
        };
        assert!(!json);
        let selection = filters.to_selection();
        assert_eq!(selection.naturezas.len(), 2);
        assert!(selection.bairros.is_empty());
        assert_eq!(
            selection.date_range,
            DateRange::new(NaiveDate::from_ymd_opt(2021, 1, 1), None)
        );
    }

    #[test]
    fn no_subcommand_is_interactive() {
        let cli = Cli::parse_from(["crime_dash_cli", "--csv", "x.csv"]);
        assert!(cli.command.is_none());
        assert_eq!(cli.csv, Some(PathBuf::from("x.csv")));
    }

    #[test]
    fn empty_flags_are_unfiltered() {
        assert!(FilterArgs::default().to_selection().is_unfiltered());
    }
}
