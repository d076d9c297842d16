#[cfg(test)]
mod units {
    use crate::collision::proposal::ProposalTable;
    use crate::engine::{Engine, SimulationParams, TrajectoryRecord};
    use crate::field::{FlowField, FlowPoint};
    use crate::geometry::{Boundary, Geometry, Segment};
    use crate::particle::{Particle, ThermalPointSource};
    use crate::stats::grid::GridSpec;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    /// Uniform flow at rest on a (z, r) grid covering the test chamber.
    fn uniform_field(temperature: f64, density: f64) -> FlowField {
        let mut points = Vec::new();
        for zi in 0..11 {
            for ri in 0..5 {
                points.push(FlowPoint {
                    z: -0.05 + zi as f64 * 0.01,
                    r: ri as f64 * 0.01,
                    v_axial: 0.0,
                    v_radial: 0.0,
                    swirl: 0.0,
                    temperature,
                    density,
                    d_min: 0.0,
                });
            }
        }
        FlowField::new(points)
    }

    /// Open box: no walls, z in [-0.05, 0.05], rho <= 0.04.
    fn open_box() -> Geometry {
        Geometry::new(Vec::new(), -0.05, 0.05, 0.04)
    }

    fn params(n: usize) -> SimulationParams {
        SimulationParams {
            n_particles: n,
            particle_mass: 191.0,
            gas_mass: 4.0,
            cross_section: 130e-20,
            omega: 0.0,
            trap_zmin: f64::NEG_INFINITY,
            trap_zmax: f64::INFINITY,
            p_flip: 0.0,
            save_all: false,
            seed: 42,
            threads: 2,
        }
    }

    fn table(field: &FlowField, seed: u64) -> ProposalTable {
        let mut rng = StdRng::seed_from_u64(seed);
        ProposalTable::for_field(field, 4.0, &mut rng)
    }

    #[test]
    fn ballistic_particle_exits_through_vacuum() {
        let field = uniform_field(300.0, 0.0);
        let geometry = open_box();
        let table = table(&field, 1);
        let engine = Engine::new(params(1), &field, &geometry, &table, None);

        let start = Particle::new(
            crate::vector::Vec3::zero(),
            crate::vector::Vec3::new(0.0, 0.0, 100.0),
        );
        let mut rng = StdRng::seed_from_u64(7);
        let record = engine.trace(start, None, &mut rng);

        assert_eq!(record.outcome, Boundary::Exit);
        assert_eq!(record.collisions, 0);
        assert_eq!(record.time, 0.0);
        // The capped free path overshoots the box by a wide margin.
        assert!(record.next_position.z > 0.05);
        assert_eq!(record.position.z, 0.0);
    }

    #[test]
    fn all_trajectories_exit_an_open_box() {
        let field = uniform_field(300.0, 0.0);
        let geometry = open_box();
        let table = table(&field, 2);
        let engine = Engine::new(params(200), &field, &geometry, &table, None);

        // Rest source: every trajectory bootstraps one collision and then
        // flies out ballistically.
        let source = ThermalPointSource::new(0.0, 0.0, 0.0, 0.0, 0.0, 191.0);
        let output = engine.run(&source);

        assert_eq!(output.records.len(), 200);
        assert_eq!(output.exits(), 200);
        assert_eq!(output.wall_hits(), 0);
        assert!(output.records.iter().all(|r| r.time.is_finite()));
    }

    #[test]
    fn wall_across_the_pipe_stops_everything() {
        let field = uniform_field(300.0, 0.0);
        // Wall at z = 0.02 spanning the full radius (dipping below the
        // axis so on-axis traces cross its interior, not an endpoint).
        let geometry = Geometry::new(
            vec![Segment {
                z1: 0.02,
                rho1: -0.01,
                z2: 0.02,
                rho2: 0.05,
            }],
            -0.05,
            0.05,
            0.04,
        );
        let table = table(&field, 3);
        let engine = Engine::new(params(100), &field, &geometry, &table, None);

        let source = ThermalPointSource::new(0.0, 0.0, 100.0, 0.0, 0.0, 191.0);
        let output = engine.run(&source);

        assert_eq!(output.wall_hits(), 100);
        assert_eq!(output.exits(), 0);
    }

    #[test]
    fn runs_reproduce_bitwise_with_fixed_seed() {
        let field = uniform_field(4.0, 1e20);
        let geometry = open_box();
        let table = table(&field, 4);
        let engine = Engine::new(params(60), &field, &geometry, &table, None);
        let source = ThermalPointSource::new(0.0, 0.0, 30.0, 0.0, 2.0, 191.0);

        let first = engine.run(&source);
        let second = engine.run(&source);

        assert_eq!(first.records, second.records);
    }

    #[test]
    fn different_seeds_differ() {
        let field = uniform_field(4.0, 1e20);
        let geometry = open_box();
        let table = table(&field, 5);

        let mut p = params(40);
        let engine_a = Engine::new(p, &field, &geometry, &table, None);
        p.seed = 43;
        let engine_b = Engine::new(p, &field, &geometry, &table, None);

        let source = ThermalPointSource::new(0.0, 0.0, 30.0, 0.0, 2.0, 191.0);
        assert_ne!(engine_a.run(&source).records, engine_b.run(&source).records);
    }

    #[test]
    fn collisions_accumulate_in_gas() {
        let field = uniform_field(4.0, 1e20);
        let geometry = open_box();
        let table = table(&field, 6);
        let mut p = params(5);
        p.threads = 1;
        let engine = Engine::new(p, &field, &geometry, &table, None);

        let source = ThermalPointSource::new(0.0, 0.0, 50.0, 0.0, 0.0, 191.0);
        let output = engine.run(&source);

        // A 50 m/s launch through 10²⁰ m⁻³ helium collides many times
        // before reaching the box edge.
        assert!(output.records.iter().all(|r| r.collisions > 0));
        assert!(output.records.iter().all(|r| r.time > 0.0));
        assert!(output.records.iter().all(|r| r.refreshes >= 1));
    }

    #[test]
    fn spin_flip_channel_changes_trapped_motion() {
        let field = uniform_field(4.0, 1e20);
        let geometry = open_box();
        let table = table(&field, 7);

        let mut base = params(20);
        base.omega = 5000.0;
        base.trap_zmin = -0.05;
        base.trap_zmax = 0.05;
        let engine_fixed = Engine::new(base, &field, &geometry, &table, None);

        let mut flipping = base;
        flipping.p_flip = 1.0;
        let engine_flipping = Engine::new(flipping, &field, &geometry, &table, None);

        let source = ThermalPointSource::new(0.0, 0.002, 30.0, 0.0, 0.0, 191.0);
        let fixed = engine_fixed.run(&source);
        let flipped = engine_flipping.run(&source);

        // Same seeds, same collision stream lengths differ only through the
        // trap orientation history; with p_flip = 1 the sign alternates at
        // every collision and the motion diverges.
        assert_ne!(fixed.records, flipped.records);
    }

    #[test]
    fn stats_grids_cover_all_and_exit_populations() {
        let field = uniform_field(4.0, 1e20);
        let geometry = open_box();
        let table = table(&field, 8);
        let spec = GridSpec {
            r_min: 0.0,
            r_max: 0.04,
            z_min: -0.05,
            z_max: 0.05,
            r_bins: 4,
            z_bins: 10,
        };
        let engine = Engine::new(params(30), &field, &geometry, &table, Some(spec));

        let source = ThermalPointSource::new(0.0, 0.0, 50.0, 0.0, 0.0, 191.0);
        let output = engine.run(&source);

        let all = output.all_stats.as_ref().unwrap();
        let exit = output.exit_stats.as_ref().unwrap();
        let all_count: u64 = all.iter_cells().map(|(_, _, c)| c.count()).sum();
        let exit_count: u64 = exit.iter_cells().map(|(_, _, c)| c.count()).sum();
        let total_collisions: u64 = output
            .records
            .iter()
            .map(|r| u64::from(r.collisions))
            .sum();

        assert_eq!(all_count, total_collisions);
        assert!(exit_count <= all_count);
        assert!(all_count > 0);
    }

    #[test]
    fn ballistic_run_leaves_stats_empty() {
        let field = uniform_field(300.0, 0.0);
        let geometry = open_box();
        let table = table(&field, 9);
        let spec = GridSpec {
            r_min: 0.0,
            r_max: 0.04,
            z_min: -0.05,
            z_max: 0.05,
            r_bins: 3,
            z_bins: 3,
        };
        let mut p = params(1);
        p.threads = 1;
        let engine = Engine::new(p, &field, &geometry, &table, Some(spec));

        let source = ThermalPointSource::new(0.0, 0.0, 100.0, 0.0, 0.0, 191.0);
        let output = engine.run(&source);

        let all = output.all_stats.as_ref().unwrap();
        assert!(all.iter_cells().all(|(_, _, cell)| cell.count() == 0));
        assert!(all.iter_cells().all(|(_, _, cell)| cell.time.mean().is_nan()));
    }

    #[test]
    #[should_panic(expected = "at least one trajectory")]
    fn zero_trajectories_panics() {
        let field = uniform_field(300.0, 0.0);
        let geometry = open_box();
        let table = table(&field, 10);
        Engine::new(params(0), &field, &geometry, &table, None);
    }

    #[test]
    fn reduced_mass_and_workers() {
        let p = params(10);
        let expected = 191.0 * 4.0 / 195.0;
        assert!((p.reduced_mass() - expected).abs() < 1e-12);
        assert_eq!(p.worker_count(), 2);

        let mut auto = p;
        auto.threads = 0;
        assert!(auto.worker_count() >= 1);
    }

    #[test]
    fn record_default_is_inert() {
        let record = TrajectoryRecord::default();
        assert_eq!(record.outcome, Boundary::None);
        assert_eq!(record.collisions, 0);
        assert_eq!(record.time, 0.0);
    }
}
