use fountain_core::{
    CollisionPolicy, FountainConfig, ModulationConfig, ParticlePreset, Plane, PresetSelection,
    Vec3, Visualizer,
};

const RATE: f32 = 44100.0;

fn rain_preset() -> ParticlePreset {
    ParticlePreset {
        name: "rain".to_string(),
        air_resistance: false,
        release_count: 0,
        velocity_variance: 0.0,
        gravity: ModulationConfig::fixed(Vec3::new(0.0, 0.0, -9.8)),
        velocity: ModulationConfig::fixed(Vec3::ZERO),
        wind: ModulationConfig::fixed(Vec3::ZERO),
        position: ModulationConfig::fixed(Vec3::new(0.0, 0.0, 2.0)),
        planes: vec![Plane::new(
            Vec3::Z,
            Vec3::ZERO,
            1.0,
            CollisionPolicy::Recycle,
        )],
        ..Default::default()
    }
}

fn config_with(presets: Vec<ParticlePreset>, capacity: usize) -> FountainConfig {
    FountainConfig {
        capacity,
        presets,
        ..Default::default()
    }
}

#[test]
fn test_recycle_plane_empties_the_fountain() {
    let mut vis = Visualizer::with_seed(&config_with(vec![rain_preset()], 100), 42);
    vis.start(RATE);
    assert_eq!(vis.simulation().planes().len(), 1);
    assert_eq!(vis.emit(100).unwrap(), 100);

    let mut crossing = None;
    for frame in 0..300 {
        vis.audio_update(&vec![1.0; 1024], RATE, 1.0 / 60.0);
        let report = vis.frame(1.0 / 60.0);
        if crossing.is_none() && report.collisions > 0 {
            crossing = Some(frame);
        }
        let pool = vis.simulation().pool();
        assert_eq!(pool.active_count() + pool.free_count(), 100);
        if report.active == 0 {
            break;
        }
    }

    // 2 m under 9.8 m/s^2 takes roughly 0.64 s
    let crossing = crossing.expect("no particle crossed the floor");
    assert!(crossing < 60, "crossed at frame {}", crossing);
    assert_eq!(vis.particles().count(), 0);
}

#[test]
fn test_same_seed_same_output() {
    let config = FountainConfig::default();
    let mut a = Visualizer::with_seed(&config, 9);
    let mut b = Visualizer::with_seed(&config, 9);
    a.start(RATE);
    b.start(RATE);

    for i in 0..30 {
        let spectrum: Vec<f32> = (0..1024).map(|k| ((k * (i + 1)) % 97) as f32 * 50.0).collect();
        a.audio_update(&spectrum, RATE, 0.023);
        b.audio_update(&spectrum, RATE, 0.023);
        a.frame(1.0 / 60.0);
        b.frame(1.0 / 60.0);
    }

    let pa: Vec<Vec3> = a.particles().map(|p| p.position).collect();
    let pb: Vec<Vec3> = b.particles().map(|p| p.position).collect();
    assert!(!pa.is_empty());
    assert_eq!(pa, pb);
}

#[test]
fn test_loud_audio_modulates_gravity() {
    let preset = ParticlePreset {
        gravity: ModulationConfig {
            modifier: 1.0,
            ..ModulationConfig::fixed(Vec3::new(0.0, 0.0, -15.0))
        },
        ..Default::default()
    };
    let mut vis = Visualizer::with_seed(&config_with(vec![preset], 1000), 5);
    vis.start(RATE);

    let mut moved = false;
    for _ in 0..20 {
        vis.audio_update(&vec![1.0e8; 1024], RATE, 0.023);
        let gravity = vis.emitter().gravity;
        // x and y static parts are zero, so only z can move
        assert_eq!(gravity.x, 0.0);
        assert_eq!(gravity.y, 0.0);
        moved |= gravity.z != -15.0;
    }
    assert!(moved);
}

#[test]
fn test_audio_update_spares_particles_in_flight() {
    let preset = ParticlePreset {
        release_count: 0,
        velocity_variance: 0.0,
        air_resistance: false,
        gravity: ModulationConfig {
            modifier: 5.0,
            ..ModulationConfig::fixed(Vec3::new(0.0, 0.0, -10.0))
        },
        velocity: ModulationConfig::fixed(Vec3::ZERO),
        ..Default::default()
    };
    let mut vis = Visualizer::with_seed(&config_with(vec![preset], 10), 6);
    vis.start(RATE);
    vis.emit(1).unwrap();

    vis.audio_update(&vec![1.0e8; 1024], RATE, 0.023);
    vis.frame(0.1);

    let p = vis.particles().next().unwrap();
    assert_eq!(p.snapshot.gravity, Vec3::new(0.0, 0.0, -10.0));
    assert!((p.velocity.z + 1.0).abs() < 1e-5);
}

#[test]
fn test_color_follows_preset_bounds() {
    let mut vis = Visualizer::with_seed(&FountainConfig::default(), 7);
    vis.start(RATE);
    for _ in 0..200 {
        vis.audio_update(&vec![1.0e5; 1024], RATE, 0.023);
        vis.frame(1.0 / 60.0);
    }
    let value = vis.active_preset().colors.value;
    for p in vis.particles() {
        assert!(p.color.v >= value.min && p.color.v <= value.max);
        assert_eq!(p.color.s, 1.0);
    }
    let base = vis.base_color();
    assert!(base.v >= value.min && base.v <= value.max);
}

#[test]
fn test_random_presets_never_repeat() {
    let presets = (0..4)
        .map(|i| ParticlePreset {
            name: format!("p{}", i),
            ..Default::default()
        })
        .collect();
    let config = FountainConfig {
        preset_selection: PresetSelection::Random,
        ..config_with(presets, 100)
    };
    let mut vis = Visualizer::with_seed(&config, 8);
    vis.start(RATE);
    let mut previous = vis.active_preset_index();
    for _ in 0..50 {
        vis.start(RATE);
        let current = vis.active_preset_index();
        assert_ne!(current, previous);
        previous = current;
    }
}

#[test]
fn test_start_clears_particles_and_resets_rotation() {
    let mut vis = Visualizer::with_seed(&FountainConfig::default(), 10);
    vis.start(RATE);
    for _ in 0..10 {
        vis.frame(1.0 / 60.0);
    }
    assert!(vis.particles().count() > 0);
    assert!(vis.rotation().angle > 0.0);

    vis.start(RATE);
    assert_eq!(vis.particles().count(), 0);
    assert_eq!(vis.rotation().angle, 0.0);
}

#[test]
fn test_shared_emitter_publishes_to_simulation() {
    let mut vis = Visualizer::with_seed(&FountainConfig::default(), 11);
    vis.start(RATE);

    let shared = vis.shared_emitter();
    let mut params = (*shared.load()).clone();
    params.release_count = 0;
    shared.publish(params);

    let report = vis.frame(1.0 / 60.0);
    assert_eq!(report.emitted, 0);
}

#[test]
fn test_runaway_modulation_stays_finite() {
    let config = FountainConfig::from_toml_str(
        r#"
[[presets]]
name = "runaway"

[presets.gravity]
vector = [0.0, 0.0, -15.0]
modifier = 200.0
modification = "Exponential"
"#,
    )
    .unwrap();
    assert!(config.presets[0].gravity.modifier <= fountain_core::modulation::MAX_MODIFIER);

    let mut vis = Visualizer::with_seed(&config, 12);
    vis.start(RATE);
    for _ in 0..30 {
        vis.audio_update(&vec![1.0e8; 1024], RATE, 0.023);
        assert!(vis.emitter().gravity.is_finite());
        vis.frame(1.0 / 60.0);
    }
    assert!(vis.particles().count() > 0);
    assert!(vis
        .particles()
        .all(|p| p.position.is_finite() && p.snapshot.gravity.is_finite()));
}

#[test]
fn test_planes_editable_between_frames() {
    let mut vis = Visualizer::with_seed(&config_with(vec![rain_preset()], 100), 13);
    vis.start(RATE);
    vis.add_plane(Plane::new(Vec3::X, Vec3::ZERO, 0.5, CollisionPolicy::Stick));
    assert_eq!(vis.simulation().planes().len(), 2);
    assert_eq!(vis.simulation().planes()[1].policy, CollisionPolicy::Stick);

    vis.clear_planes();
    assert!(vis.simulation().planes().is_empty());
    vis.frame(1.0 / 60.0);

    // The next track installs the preset's own planes again
    vis.start(RATE);
    assert_eq!(vis.simulation().planes().len(), 1);
}
