//! # Configuration Module - Layered Run Configuration
//!
//! A run is described by a flat set of named parameters (input paths,
//! physics constants, source state, output destinations). Values resolve
//! with the precedence **built-in defaults < TOML config file < command
//! line**: both the TOML file and the CLI produce a sparse
//! [`ConfigOverlay`] and the final [`RunConfig`] applies them in order.
//! Only the two input paths are mandatory.

use crate::engine::SimulationParams;
use crate::field::FlowBounds;
use crate::particle::ThermalPointSource;
use crate::stats::grid::GridSpec;
use serde::Deserialize;
use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};

/// Fully resolved configuration of one run.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Geometry input file.
    pub geometry: PathBuf,
    /// Flow-field input file.
    pub flow: PathBuf,

    /// Number of trajectories.
    pub n: usize,
    /// Source axial position (m).
    pub z: f64,
    /// Source radial offset (m).
    pub r: f64,
    /// Source axial drift velocity (m/s).
    pub vz: f64,
    /// Source radial drift velocity (m/s).
    pub vr: f64,
    /// Source temperature (K); 0 collapses the thermal spread.
    pub temperature: f64,

    /// Buffer-gas atom mass m (AMU).
    pub gas_mass: f64,
    /// Test-particle mass M (AMU).
    pub particle_mass: f64,
    /// Collision cross section σ (m²).
    pub cross_section: f64,
    /// Signed trap frequency ω (s⁻¹).
    pub omega: f64,
    /// Lower axial bound of the trap interval (m).
    pub trap_zmin: f64,
    /// Upper axial bound of the trap interval (m).
    pub trap_zmax: f64,
    /// Per-collision spin-flip probability.
    pub p_flip: f64,

    /// Emit all trajectory rows, not only exits.
    pub save_all: bool,
    /// Radial bin count of the statistics grid.
    pub r_bins: usize,
    /// Axial bin count of the statistics grid.
    pub z_bins: usize,
    /// Master RNG seed.
    pub seed: u64,
    /// Worker threads; 0 picks the machine parallelism.
    pub threads: usize,

    /// Per-particle row destination; stdout when unset.
    pub records_out: Option<PathBuf>,
    /// All-trajectory statistics CSV destination.
    pub stats_out: Option<PathBuf>,
    /// Exit-trajectory statistics CSV destination.
    pub exit_stats_out: Option<PathBuf>,
    /// JSON run-summary destination.
    pub summary_out: Option<PathBuf>,
}

/// Sparse configuration fragment, as produced by the TOML file or the CLI.
///
/// Field names follow the external configuration surface (`geom`, `T`,
/// `m`, `M`, `pflip`, ...), not the internal ones.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigOverlay {
    pub geom: Option<PathBuf>,
    pub flow: Option<PathBuf>,
    pub n: Option<usize>,
    pub z: Option<f64>,
    pub r: Option<f64>,
    pub vz: Option<f64>,
    pub vr: Option<f64>,
    #[serde(rename = "T")]
    pub temperature: Option<f64>,
    #[serde(rename = "m")]
    pub gas_mass: Option<f64>,
    #[serde(rename = "M")]
    pub particle_mass: Option<f64>,
    pub sigma: Option<f64>,
    pub omega: Option<f64>,
    pub zmin: Option<f64>,
    pub zmax: Option<f64>,
    pub pflip: Option<f64>,
    pub saveall: Option<bool>,
    pub rbins: Option<usize>,
    pub zbins: Option<usize>,
    pub seed: Option<u64>,
    pub threads: Option<usize>,
    pub out: Option<PathBuf>,
    pub stats: Option<PathBuf>,
    pub exitstats: Option<PathBuf>,
    pub summary: Option<PathBuf>,
}

impl ConfigOverlay {
    /// Parses an overlay from a TOML file; any subset of keys may appear.
    pub fn from_toml_file(path: &Path) -> Result<Self, Box<dyn Error>> {
        let text = fs::read_to_string(path)
            .map_err(|e| format!("cannot read config file {}: {e}", path.display()))?;
        let overlay = toml::from_str(&text)
            .map_err(|e| format!("bad config file {}: {e}", path.display()))?;
        Ok(overlay)
    }

    /// Applies `other` on top of this overlay; `other`'s set fields win.
    pub fn merged(self, other: ConfigOverlay) -> ConfigOverlay {
        ConfigOverlay {
            geom: other.geom.or(self.geom),
            flow: other.flow.or(self.flow),
            n: other.n.or(self.n),
            z: other.z.or(self.z),
            r: other.r.or(self.r),
            vz: other.vz.or(self.vz),
            vr: other.vr.or(self.vr),
            temperature: other.temperature.or(self.temperature),
            gas_mass: other.gas_mass.or(self.gas_mass),
            particle_mass: other.particle_mass.or(self.particle_mass),
            sigma: other.sigma.or(self.sigma),
            omega: other.omega.or(self.omega),
            zmin: other.zmin.or(self.zmin),
            zmax: other.zmax.or(self.zmax),
            pflip: other.pflip.or(self.pflip),
            saveall: other.saveall.or(self.saveall),
            rbins: other.rbins.or(self.rbins),
            zbins: other.zbins.or(self.zbins),
            seed: other.seed.or(self.seed),
            threads: other.threads.or(self.threads),
            out: other.out.or(self.out),
            stats: other.stats.or(self.stats),
            exitstats: other.exitstats.or(self.exitstats),
            summary: other.summary.or(self.summary),
        }
    }
}

impl RunConfig {
    /// Resolves a sparse overlay against the built-in defaults.
    ///
    /// # Errors
    ///
    /// Fails when the geometry or flow path is missing, or when a value is
    /// outside its legal range.
    pub fn from_overlay(overlay: ConfigOverlay) -> Result<Self, String> {
        let geometry = overlay.geom.ok_or("missing geometry file (geom)")?;
        let flow = overlay.flow.ok_or("missing flow file (flow)")?;

        let config = RunConfig {
            geometry,
            flow,
            n: overlay.n.unwrap_or(10_000),
            z: overlay.z.unwrap_or(0.035),
            r: overlay.r.unwrap_or(0.0),
            vz: overlay.vz.unwrap_or(0.0),
            vr: overlay.vr.unwrap_or(0.0),
            temperature: overlay.temperature.unwrap_or(0.0),
            gas_mass: overlay.gas_mass.unwrap_or(4.0),
            particle_mass: overlay.particle_mass.unwrap_or(191.0),
            cross_section: overlay.sigma.unwrap_or(130e-20),
            omega: overlay.omega.unwrap_or(0.0),
            trap_zmin: overlay.zmin.unwrap_or(f64::NEG_INFINITY),
            trap_zmax: overlay.zmax.unwrap_or(f64::INFINITY),
            p_flip: overlay.pflip.unwrap_or(0.0),
            save_all: overlay.saveall.unwrap_or(false),
            r_bins: overlay.rbins.unwrap_or(100),
            z_bins: overlay.zbins.unwrap_or(100),
            seed: overlay.seed.unwrap_or(0),
            threads: overlay.threads.unwrap_or(0),
            records_out: overlay.out,
            stats_out: overlay.stats,
            exit_stats_out: overlay.exitstats,
            summary_out: overlay.summary,
        };

        if config.n == 0 {
            return Err("n must be at least 1".into());
        }
        if config.gas_mass <= 0.0 || config.particle_mass <= 0.0 {
            return Err("masses must be positive".into());
        }
        if config.cross_section <= 0.0 {
            return Err("sigma must be positive".into());
        }
        if !(0.0..=1.0).contains(&config.p_flip) {
            return Err("pflip must be in [0, 1]".into());
        }
        if config.trap_zmin > config.trap_zmax {
            return Err("zmin must not exceed zmax".into());
        }
        if config.temperature < 0.0 {
            return Err("T must be non-negative".into());
        }
        Ok(config)
    }

    /// Engine parameters of this configuration.
    pub fn params(&self) -> SimulationParams {
        SimulationParams {
            n_particles: self.n,
            particle_mass: self.particle_mass,
            gas_mass: self.gas_mass,
            cross_section: self.cross_section,
            omega: self.omega,
            trap_zmin: self.trap_zmin,
            trap_zmax: self.trap_zmax,
            p_flip: self.p_flip,
            save_all: self.save_all,
            seed: self.seed,
            threads: self.threads,
        }
    }

    /// Particle source of this configuration.
    pub fn source(&self) -> ThermalPointSource {
        ThermalPointSource::new(
            self.z,
            self.r,
            self.vz,
            self.vr,
            self.temperature,
            self.particle_mass,
        )
    }

    /// Whether any statistics output was requested.
    pub fn wants_grid(&self) -> bool {
        self.stats_out.is_some() || self.exit_stats_out.is_some()
    }

    /// Statistics grid over the flow bounding box.
    pub fn grid_spec(&self, bounds: &FlowBounds) -> GridSpec {
        GridSpec {
            r_min: bounds.r_min,
            r_max: bounds.r_max,
            z_min: bounds.z_min,
            z_max: bounds.z_max,
            r_bins: self.r_bins,
            z_bins: self.z_bins,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal() -> ConfigOverlay {
        ConfigOverlay {
            geom: Some(PathBuf::from("geom.dat")),
            flow: Some(PathBuf::from("flow.dat")),
            ..ConfigOverlay::default()
        }
    }

    #[test]
    fn defaults_match_the_configuration_surface() {
        let config = RunConfig::from_overlay(minimal()).unwrap();
        assert_eq!(config.n, 10_000);
        assert_eq!(config.z, 0.035);
        assert_eq!(config.gas_mass, 4.0);
        assert_eq!(config.particle_mass, 191.0);
        assert_eq!(config.cross_section, 130e-20);
        assert_eq!(config.omega, 0.0);
        assert_eq!(config.trap_zmin, f64::NEG_INFINITY);
        assert_eq!(config.trap_zmax, f64::INFINITY);
        assert_eq!(config.p_flip, 0.0);
        assert!(!config.save_all);
        assert!(config.records_out.is_none());
        assert!(!config.wants_grid());
    }

    #[test]
    fn missing_inputs_are_errors() {
        assert!(RunConfig::from_overlay(ConfigOverlay::default()).is_err());

        let mut only_geom = ConfigOverlay::default();
        only_geom.geom = Some(PathBuf::from("geom.dat"));
        assert!(RunConfig::from_overlay(only_geom).is_err());
    }

    #[test]
    fn later_overlays_win() {
        let mut file_layer = minimal();
        file_layer.n = Some(500);
        file_layer.omega = Some(1000.0);

        let mut cli_layer = ConfigOverlay::default();
        cli_layer.n = Some(42);

        let config = RunConfig::from_overlay(file_layer.merged(cli_layer)).unwrap();
        assert_eq!(config.n, 42); // CLI beats the file
        assert_eq!(config.omega, 1000.0); // file beats the default
    }

    #[test]
    fn toml_keys_use_the_external_names() {
        let overlay: ConfigOverlay = toml::from_str(
            r#"
            geom = "cell.geom"
            flow = "cell.flow"
            T = 2.5
            m = 4.0
            M = 157.0
            pflip = 0.1
            saveall = true
            zmin = -0.01
            "#,
        )
        .unwrap();
        let config = RunConfig::from_overlay(overlay).unwrap();
        assert_eq!(config.temperature, 2.5);
        assert_eq!(config.particle_mass, 157.0);
        assert_eq!(config.p_flip, 0.1);
        assert!(config.save_all);
        assert_eq!(config.trap_zmin, -0.01);
    }

    #[test]
    fn unknown_toml_keys_are_rejected() {
        let parsed: Result<ConfigOverlay, _> = toml::from_str("geom = \"a\"\nbogus = 1\n");
        assert!(parsed.is_err());
    }

    #[test]
    fn range_checks() {
        let mut bad = minimal();
        bad.pflip = Some(1.5);
        assert!(RunConfig::from_overlay(bad).is_err());

        let mut inverted = minimal();
        inverted.zmin = Some(1.0);
        inverted.zmax = Some(-1.0);
        assert!(RunConfig::from_overlay(inverted).is_err());

        let mut zero_n = minimal();
        zero_n.n = Some(0);
        assert!(RunConfig::from_overlay(zero_n).is_err());
    }
}
