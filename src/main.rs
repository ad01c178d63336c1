//! Command line host for the Zurich bike and weather data.

use clap::{Parser, Subcommand, ValueEnum};
use log::{error, info};
use std::error::Error;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use zurich_bikes::{DatasetKey, FileRenderer, HttpFetcher, Plot, PlotParams, ZurichData};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Directory for downloaded raw files
    #[arg(long, global = true, default_value = ".")]
    data_dir: PathBuf,

    /// Keep raw files in the platform cache directory instead
    #[arg(long, global = true, conflicts_with = "data_dir")]
    user_cache: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Download a raw file unless a local copy exists
    Fetch {
        #[arg(long)]
        year: i32,

        /// Fetch the weather table instead of the bike counts
        #[arg(long)]
        weather: bool,
    },

    /// Print the bike counts of one station
    Velo {
        #[arg(long, default_value = "ECO09113499")]
        station: String,

        #[arg(long)]
        year: i32,
    },

    /// Print the Mythenquai weather measurements
    Weather {
        #[arg(long)]
        year: i32,
    },

    /// Draw one of the weekly charts
    Plot {
        #[arg(value_enum)]
        kind: PlotChoice,

        /// Counting station, defaults to the plot's first choice
        #[arg(long)]
        station: Option<String>,

        /// Defaults to the plot's default year
        #[arg(long)]
        year: Option<i32>,

        /// Output file; `.png` renders a bitmap, anything else SVG
        #[arg(long)]
        output: Option<PathBuf>,

        /// Print the chart as JSON instead of drawing it
        #[arg(long)]
        json: bool,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum PlotChoice {
    ByYear,
    Weather,
    BikeWeather,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    if let Err(e) = run(args).await {
        error!("{}", e);
        let mut source = e.source();
        while let Some(cause) = source {
            error!("  caused by: {}", cause);
            source = cause.source();
        }
        std::process::exit(1);
    }
}

async fn run(args: Args) -> Result<(), Box<dyn Error>> {
    let data = if args.user_cache {
        ZurichData::with_user_cache()?
    } else {
        ZurichData::builder()
            .fetcher(HttpFetcher::new())
            .data_dir(args.data_dir)
            .build()
    };
    info!("Using data directory {:?}", data.store().root());

    match args.command {
        Command::Fetch { year, weather } => {
            let key = if weather {
                DatasetKey::weather(year)
            } else {
                DatasetKey::bikes(year)?
            };
            let path = data.store().ensure_local_copy(&key).await?;
            println!("{}", path.display());
        }
        Command::Velo { station, year } => {
            println!("{}", data.get_velo_data(&station, year).await?);
        }
        Command::Weather { year } => {
            println!("{}", data.get_weather_data(year).await?);
        }
        Command::Plot {
            kind,
            station,
            year,
            output,
            json,
        } => {
            let plot = match kind {
                PlotChoice::ByYear => data.plot_by_year(),
                PlotChoice::Weather => data.plot_weather(),
                PlotChoice::BikeWeather => data.plot_bike_weather(),
            };
            let params = pick_params(&plot, station, year);

            if json {
                let chart = plot.chart(&params).await?;
                println!("{}", serde_json::to_string_pretty(&chart)?);
            } else {
                let output = output.unwrap_or_else(|| default_output(&plot, &params));
                plot.render(&params, &FileRenderer::new(&output)).await?;
                println!("{}", output.display());
            }
        }
    }
    Ok(())
}

/// Starts from the plot's defaults and overrides what was given on the command line.
fn pick_params(plot: &Plot<'_, HttpFetcher>, station: Option<String>, year: Option<i32>) -> PlotParams {
    let mut params = plot.parameters().defaults;
    if station.is_some() {
        params.station = station;
    }
    if let Some(year) = year {
        params.year = year;
    }
    params
}

fn default_output(plot: &Plot<'_, HttpFetcher>, params: &PlotParams) -> PathBuf {
    let name = match &params.station {
        Some(station) => format!("{}-{}-{}.svg", plot.kind().slug(), station, params.year),
        None => format!("{}-{}.svg", plot.kind().slug(), params.year),
    };
    PathBuf::from(name)
}
