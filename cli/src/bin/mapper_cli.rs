use clap::{Parser, Subcommand};
use cli::ExportJob;
use color_eyre::eyre::{Result, WrapErr};
use mapper::{
    BoundingBoxProjection, ContourConfig, ExportConfig, ExportSession, GraphBuilder, HeightRaster,
    SimplificationMethod, StaticCatalog, export::contours::export_contours,
};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::{self, EnvFilter};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Export roads, buildings, places and contours described by a job file
    Export {
        /// Path to the TOML or JSON job file
        #[arg(short, long)]
        config: PathBuf,
        /// Also write the raw graph as JSON
        #[arg(long)]
        graph_json: Option<PathBuf>,
    },
    /// Trace water contours of a height raster only
    Contours {
        /// Height raster JSON
        #[arg(short, long)]
        terrain: PathBuf,
        /// Destination GeoJSON file
        #[arg(short, long)]
        output: PathBuf,
        /// Iso-levels of the water depth field
        #[arg(short, long, default_value = "1.6", num_args = 1..)]
        level: Vec<f64>,
        /// Simplification tolerance in world units
        #[arg(long, default_value = "8.0")]
        tolerance: f64,
        /// douglas_peucker, visvalingam_whyatt or disabled
        #[arg(long, default_value = "douglas_peucker")]
        method: SimplificationMethod,
        /// Distance between samples in world units
        #[arg(long, default_value = "16.0")]
        grid_size: f64,
        /// Samples per axis
        #[arg(long, default_value = "1080")]
        steps: usize,
    },
    /// Print the JSON schema of the job file
    Schema {
        /// Write to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    color_eyre::install()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info"))
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Export { config, graph_json } => {
            export(&config, graph_json.as_deref())?;
        }
        Commands::Contours {
            terrain,
            output,
            level,
            tolerance,
            method,
            grid_size,
            steps,
        } => {
            let config = ContourConfig {
                levels: level,
                tolerance,
                method,
                grid_size,
                steps,
                ..ContourConfig::default()
            };
            contours(&terrain, &output, config)?;
        }
        Commands::Schema { output } => {
            let schema = serde_json::to_string_pretty(&ExportJob::schema())?;
            match output {
                Some(path) => std::fs::write(&path, schema)
                    .wrap_err_with(|| format!("writing schema to {}", path.display()))?,
                None => println!("{schema}"),
            }
        }
    }

    Ok(())
}

fn export(config_path: &Path, graph_json: Option<&Path>) -> Result<()> {
    let job = ExportJob::from_file(config_path)
        .wrap_err_with(|| format!("loading job {}", config_path.display()))?;
    info!("Export job: {:?}", job.paths);

    let terrain = HeightRaster::from_json_file(&job.paths.terrain)
        .wrap_err_with(|| format!("loading terrain {}", job.paths.terrain.display()))?;
    let catalog = StaticCatalog::from_json_file(&job.paths.catalog)
        .wrap_err_with(|| format!("loading catalog {}", job.paths.catalog.display()))?;

    let graph = ExportSession::from_config(job.export)?.run(&terrain, &catalog)?;

    graph.save_geojson(&job.paths.output)?;
    if let Some(path) = graph_json {
        std::fs::write(path, graph.to_json_string()?)?;
    }
    info!(
        "✅ Wrote {} points and {} polylines to {}",
        graph.points.len(),
        graph.polylines.len(),
        job.paths.output.display()
    );
    Ok(())
}

fn contours(terrain_path: &Path, output: &Path, contours: ContourConfig) -> Result<()> {
    let config = ExportConfig {
        contours,
        ..ExportConfig::default()
    };
    config.validate()?;
    let terrain = HeightRaster::from_json_file(terrain_path)
        .wrap_err_with(|| format!("loading terrain {}", terrain_path.display()))?;

    let projection = BoundingBoxProjection::new(&config.projection)?;
    let mut builder = GraphBuilder::new(projection, config.ids);
    let ids = export_contours(&mut builder, &terrain, &config.contours)?;
    info!("Traced {} contour polylines at levels {:?}", ids.len(), config.contours.levels);

    builder.finish().save_geojson(output)?;
    info!("✅ Contours written to {}", output.display());
    Ok(())
}
