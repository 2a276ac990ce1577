//! Interactive session, mirroring the dashboard sidebar.

use std::path::PathBuf;

use crime_dash_analytics::{DashboardView, filters};
use crime_dash_analytics_models::{DateRange, FilterOptions, FilterSelection};
use crime_dash_server::config::DashboardConfig;
use dialoguer::{Confirm, Input, MultiSelect, Select};

use crate::commands;

enum Action {
    Summary,
    Export,
    Map,
    Serve,
}

impl Action {
    const ALL: &[Self] = &[Self::Summary, Self::Export, Self::Map, Self::Serve];

    #[must_use]
    const fn label(&self) -> &'static str {
        match self {
            Self::Summary => "Show summary",
            Self::Export => "Export filtered CSV",
            Self::Map => "Write choropleth GeoJSON",
            Self::Serve => "Start server",
        }
    }
}

/// Runs the interactive session.
///
/// # Errors
///
/// Returns an error if a prompt fails, the data cannot be loaded, or the
/// chosen action fails.
pub fn run(config: DashboardConfig) -> Result<(), Box<dyn std::error::Error>> {
    println!("Crime Dashboard");
    println!();

    let labels: Vec<&str> = Action::ALL.iter().map(Action::label).collect();
    let idx = Select::new()
        .with_prompt("What would you like to do?")
        .items(&labels)
        .default(0)
        .interact()?;

    if matches!(Action::ALL[idx], Action::Serve) {
        actix_web::rt::System::new().block_on(crime_dash_server::interactive::run(config))?;
        return Ok(());
    }

    let current = commands::load(&config)?;
    let table = &current.ingested.table;
    println!(
        "{}: {} registro(s)",
        current.name,
        crime_dash_analytics::summary::format_count(table.len() as u64)
    );

    let selection = prompt_selection(&filters::options(table))?;
    let view = DashboardView::build(table, &selection, config.charts);
    if view.is_empty() {
        println!("Nenhum registro para os filtros escolhidos.");
        return Ok(());
    }

    match Action::ALL[idx] {
        Action::Summary => print!("{}", commands::render_summary(&view)),
        Action::Export => {
            let path: String = Input::new()
                .with_prompt("Output file")
                .default(config.data.export_file_name.clone())
                .interact_text()?;
            let written = commands::export(table, &selection, &PathBuf::from(&path))?;
            println!("{written} registro(s) exportado(s) para {path}");
        }
        Action::Map => {
            let Some(geojson) = commands::map_geojson(&config, &view)? else {
                println!(
                    "GeoJSON de bairros nao encontrado em {}. Mapa desabilitado.",
                    config.data.boundaries_geojson.display()
                );
                return Ok(());
            };
            let path: String = Input::new()
                .with_prompt("Output file")
                .default("mapa_bairros.geojson".to_string())
                .interact_text()?;
            std::fs::write(&path, geojson)?;
            println!("Mapa gravado em {path}");
        }
        Action::Serve => {}
    }

    Ok(())
}

/// Prompts for incident types, neighborhoods, and an optional date range.
/// Selecting nothing in a list applies no filter on it.
fn prompt_selection(
    options: &FilterOptions,
) -> Result<FilterSelection, Box<dyn std::error::Error>> {
    let naturezas = MultiSelect::new()
        .with_prompt("Natureza (space to select, enter for all)")
        .items(&options.naturezas)
        .interact()?;

    let bairros = MultiSelect::new()
        .with_prompt("Bairro (space to select, enter for all)")
        .items(&options.bairros)
        .interact()?;

    let mut date_range = DateRange::default();
    if let (Some(min), Some(max)) = (options.min_date, options.max_date) {
        let filter_dates = Confirm::new()
            .with_prompt(format!("Filter by date? ({min} a {max})"))
            .default(false)
            .interact()?;
        if filter_dates {
            let start: chrono::NaiveDate = Input::new()
                .with_prompt("Start")
                .default(min)
                .interact_text()?;
            let end: chrono::NaiveDate = Input::new()
                .with_prompt("End")
                .default(max)
                .interact_text()?;
            date_range = DateRange::new(Some(start), Some(end));
        }
    }

    Ok(FilterSelection {
        naturezas: naturezas
            .into_iter()
            .map(|i| options.naturezas[i].clone())
            .collect(),
        bairros: bairros
            .into_iter()
            .map(|i| options.bairros[i].clone())
            .collect(),
        date_range,
    })
}
