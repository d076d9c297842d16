//! # CLI Module - Command Line Interface for the Trajectory Tracer
//!
//! Flat argument surface mirroring the external configuration names: input
//! tables (`--geom`, `--flow`), source state (`--z`, `--r`, `--vz`,
//! `--vr`, `-T`), physics constants (`--m`, `--M`, `--sigma`, `--omega`,
//! `--zmin`, `--zmax`, `--pflip`), execution knobs (`-n`, `--seed`,
//! `--threads`) and output destinations (`--out`, `--stats`,
//! `--exitstats`, `--summary`).
//!
//! Every value is optional on the command line; unset values fall back to
//! the optional `--config` TOML file and then to the built-in defaults
//! (see [`crate::config`]). A typical invocation:
//!
//! ```bash
//! moltrace-rs --geom cell.geom --flow cell.flow -n 100000 \
//!     --omega 1200 --zmin -0.01 --zmax 0.04 --pflip 0.05 \
//!     --out rows.dat --stats all.csv --exitstats exit.csv
//! ```

use crate::config::ConfigOverlay;
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// TOML config file applied below the command-line flags
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Geometry input file (wall segments and bounding box)
    #[arg(long)]
    pub geom: Option<PathBuf>,

    /// Flow-field input file (background gas samples)
    #[arg(long)]
    pub flow: Option<PathBuf>,

    /// Number of trajectories to trace
    #[arg(short)]
    pub n: Option<usize>,

    /// Source axial position (m)
    #[arg(long, allow_hyphen_values = true)]
    pub z: Option<f64>,

    /// Source radial offset (m)
    #[arg(long)]
    pub r: Option<f64>,

    /// Source axial drift velocity (m/s)
    #[arg(long, allow_hyphen_values = true)]
    pub vz: Option<f64>,

    /// Source radial drift velocity (m/s)
    #[arg(long, allow_hyphen_values = true)]
    pub vr: Option<f64>,

    /// Source temperature (K); 0 launches every particle at the drift
    #[arg(short = 'T', long = "temp")]
    pub temperature: Option<f64>,

    /// Buffer-gas atom mass (AMU)
    #[arg(long = "m")]
    pub gas_mass: Option<f64>,

    /// Test-particle mass (AMU)
    #[arg(long = "M")]
    pub particle_mass: Option<f64>,

    /// Collision cross section (m²)
    #[arg(long)]
    pub sigma: Option<f64>,

    /// Signed trap frequency (s⁻¹); positive confines, negative inverts
    #[arg(long, allow_hyphen_values = true)]
    pub omega: Option<f64>,

    /// Lower axial bound of the trap interval (m)
    #[arg(long, allow_hyphen_values = true)]
    pub zmin: Option<f64>,

    /// Upper axial bound of the trap interval (m)
    #[arg(long, allow_hyphen_values = true)]
    pub zmax: Option<f64>,

    /// Per-collision spin-flip probability
    #[arg(long)]
    pub pflip: Option<f64>,

    /// Emit every trajectory row, not only the exits
    #[arg(long)]
    pub saveall: bool,

    /// Radial bin count of the statistics grid
    #[arg(long)]
    pub rbins: Option<usize>,

    /// Axial bin count of the statistics grid
    #[arg(long)]
    pub zbins: Option<usize>,

    /// Master RNG seed; worker i consumes stream seed + i
    #[arg(long)]
    pub seed: Option<u64>,

    /// Worker threads (0 = machine parallelism)
    #[arg(long)]
    pub threads: Option<usize>,

    /// Per-particle row output file (stdout when omitted)
    #[arg(long)]
    pub out: Option<PathBuf>,

    /// All-trajectory bin-statistics CSV
    #[arg(long)]
    pub stats: Option<PathBuf>,

    /// Exit-trajectory bin-statistics CSV
    #[arg(long)]
    pub exitstats: Option<PathBuf>,

    /// JSON run-summary file
    #[arg(long)]
    pub summary: Option<PathBuf>,
}

impl Cli {
    /// Converts the parsed arguments into a configuration overlay.
    ///
    /// `--saveall` is a plain flag: present means override to true, absent
    /// leaves lower layers untouched.
    pub fn overlay(&self) -> ConfigOverlay {
        ConfigOverlay {
            geom: self.geom.clone(),
            flow: self.flow.clone(),
            n: self.n,
            z: self.z,
            r: self.r,
            vz: self.vz,
            vr: self.vr,
            temperature: self.temperature,
            gas_mass: self.gas_mass,
            particle_mass: self.particle_mass,
            sigma: self.sigma,
            omega: self.omega,
            zmin: self.zmin,
            zmax: self.zmax,
            pflip: self.pflip,
            saveall: self.saveall.then_some(true),
            rbins: self.rbins,
            zbins: self.zbins,
            seed: self.seed,
            threads: self.threads,
            out: self.out.clone(),
            stats: self.stats.clone(),
            exitstats: self.exitstats.clone(),
            summary: self.summary.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_the_full_surface() {
        let cli = Cli::parse_from([
            "moltrace-rs",
            "--geom",
            "cell.geom",
            "--flow",
            "cell.flow",
            "-n",
            "5000",
            "-T",
            "4.0",
            "--m",
            "4.0",
            "--M",
            "191.0",
            "--omega",
            "-1200.0",
            "--zmin",
            "-0.01",
            "--pflip",
            "0.5",
            "--saveall",
            "--stats",
            "all.csv",
        ]);

        let overlay = cli.overlay();
        assert_eq!(overlay.n, Some(5000));
        assert_eq!(overlay.temperature, Some(4.0));
        assert_eq!(overlay.particle_mass, Some(191.0));
        assert_eq!(overlay.omega, Some(-1200.0));
        assert_eq!(overlay.zmin, Some(-0.01));
        assert_eq!(overlay.saveall, Some(true));
        assert_eq!(overlay.stats.as_deref(), Some(std::path::Path::new("all.csv")));
        assert!(overlay.vz.is_none());
    }

    #[test]
    fn absent_flags_leave_the_overlay_sparse() {
        let cli = Cli::parse_from(["moltrace-rs"]);
        let overlay = cli.overlay();
        assert!(overlay.geom.is_none());
        assert!(overlay.saveall.is_none());
        assert!(overlay.seed.is_none());
    }
}
