use clap::Parser;
use kinetic_lib::cli::Cli;
use kinetic_lib::collision::proposal::ProposalTable;
use kinetic_lib::config::{ConfigOverlay, RunConfig};
use kinetic_lib::engine::Engine;
use kinetic_lib::field::FlowField;
use kinetic_lib::io;
use kinetic_lib::io::summary::RunSummary;
use log::{debug, info};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::error::Error;
use std::fs::File;
use std::io::BufWriter;

fn main() {
    env_logger::init();
    let cli = Cli::parse();
    if let Err(error) = run(cli) {
        eprintln!("error: {error}");
        std::process::exit(1);
    }
}

/// Load inputs, build the shared components, trace, write outputs.
fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    // Resolve configuration: defaults < TOML file < command line.
    let mut overlay = ConfigOverlay::default();
    if let Some(path) = &cli.config {
        overlay = overlay.merged(ConfigOverlay::from_toml_file(path)?);
    }
    overlay = overlay.merged(cli.overlay());
    let config = RunConfig::from_overlay(overlay)?;

    let geometry = io::geometry::load(&config.geometry)?;
    let flow_points = io::flow::load(&config.flow)?;
    let field = FlowField::new(flow_points);

    let params = config.params();
    debug!(
        "collision pair: M = {} AMU, m = {} AMU, reduced mass {:.3} AMU",
        params.particle_mass,
        params.gas_mass,
        params.reduced_mass()
    );

    let mut table_rng = StdRng::seed_from_u64(params.seed);
    let table = ProposalTable::for_field(&field, params.gas_mass, &mut table_rng);

    let grid_spec = config.wants_grid().then(|| config.grid_spec(field.bounds()));
    let engine = Engine::new(params, &field, &geometry, &table, grid_spec);
    let source = config.source();
    let output = engine.run(&source);

    // Per-particle rows, to a file or stdout.
    let written = match &config.records_out {
        Some(path) => {
            let mut writer = BufWriter::new(File::create(path)?);
            io::records::write(&mut writer, &output.records, params.save_all)?
        }
        None => {
            let stdout = std::io::stdout();
            let mut writer = stdout.lock();
            io::records::write(&mut writer, &output.records, params.save_all)?
        }
    };
    info!("wrote {written} trajectory rows");

    if let (Some(path), Some(grid)) = (&config.stats_out, output.all_stats.as_ref()) {
        let mut writer = BufWriter::new(File::create(path)?);
        io::stats::write(&mut writer, grid)?;
        info!("wrote all-trajectory statistics to {}", path.display());
    }
    if let (Some(path), Some(grid)) = (&config.exit_stats_out, output.exit_stats.as_ref()) {
        let mut writer = BufWriter::new(File::create(path)?);
        io::stats::write(&mut writer, grid)?;
        info!("wrote exit-trajectory statistics to {}", path.display());
    }
    if let Some(path) = &config.summary_out {
        io::summary::save_json(&RunSummary::new(&params, &output), path)?;
        info!("wrote run summary to {}", path.display());
    }

    Ok(())
}
