use sbpfault::boundary::BoundaryKind;
use sbpfault::config::*;
use sbpfault::error::*;
use sbpfault::initial_conditions::ICType;

fn scratch_path(name: &str) -> std::path::PathBuf {
    std::env::temp_dir().join(format!("sbpfault_{}_{}", std::process::id(), name))
}

#[test]
fn save_and_load() {
    let mut config = ProblemConfig::default();
    config.nt = 7;
    config.initial_condition = ICType::Rand { max_val: 0.25 };
    config.blocks[0].boundaries[2] = BoundaryKind::Rigid;
    config.output.every = 3;

    let path = scratch_path("config.ron");
    config.save(&path).unwrap();
    let loaded = ProblemConfig::load(&path).unwrap();
    std::fs::remove_file(&path).unwrap();
    assert_eq!(loaded, config);
}

#[test]
fn handwritten_config() {
    let text = r#"(
        ndim: 2,
        mode: 3,
        sbp_order: 3,
        nx_block: ([41, 41], [21], [1]),
        blocks: [
            (
                boundaries: [Absorbing, None, Free, Free],
                corner: (0.0, 0.0, 0.0),
                lengths: (1.0, 0.5, 0.0),
            ),
            (
                material: (rho: 2.0, lambda: 1.0, g: 2.0),
                boundaries: [None, Rigid, Free, Free],
                corner: (1.0, 0.0, 0.0),
                lengths: (1.0, 0.5, 0.0),
            ),
        ],
        interfaces: [(block_a: 0, block_b: 1, kind: Frictionless)],
        nt: 10,
        cfl: 0.2,
        initial_condition: Pulse(center: (0.5, 0.25, 0.0), width: 0.01, amplitude: 2.0),
    )"#;
    let config = ProblemConfig::from_ron_str(text).unwrap();
    assert_eq!(config.blocks.len(), 2);
    assert_eq!(config.blocks[0].material.rho, 1.0);
    assert_eq!(config.blocks[1].material.g, 2.0);
    assert_eq!(config.global_nx().as_slice(), &[82, 21, 1]);
    assert!(config.output.vtk_dir.is_none());
    assert_eq!(config.dt, None);
}

#[test]
fn missing_file() {
    assert!(matches!(
        ProblemConfig::load(scratch_path("does_not_exist.ron")),
        Err(SolverError::Io(_))
    ));
}
