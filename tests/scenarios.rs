use sbpfault::boundary::*;
use sbpfault::config::*;
use sbpfault::derivative::*;
use sbpfault::initial_conditions::ICType;
use sbpfault::material::Material;
use sbpfault::problem::*;
use sbpfault::surface::*;
use sbpfault::topology::*;
use sbpfault::util::*;

use float_cmp::assert_approx_eq;

fn single_block(ndim: usize, mode: usize, order: usize, nx: [i32; 3], lengths: [f64; 3]) -> ProblemConfig {
    ProblemConfig {
        ndim,
        mode,
        sbp_order: order,
        nx_block: [vec![nx[0]], vec![nx[1]], vec![nx[2]]],
        blocks: vec![BlockConfig {
            material: Material::default(),
            boundaries: vec![BoundaryKind::Absorbing; 2 * ndim],
            corner: [0.0; 3],
            lengths,
        }],
        initial_condition: ICType::Zero,
        ..Default::default()
    }
}

/// A plane shear wave along x, uniform in y: `v3 = g(x)`, `s13 = -zs g(x)`.
fn set_sh_wave<T: Topology>(problem: &mut Problem<'_, T>, zs: f64, centre: f64) {
    use sbpfault::derivative::mode3_layout::*;
    let fields = problem.fields_mut();
    let npts = fields.npts();
    let aabb = *fields.aabb();
    for c in aabb.coord_iter() {
        let x = fields.coords(&c)[0];
        let g = (-(x - centre).powi(2) / 0.005).exp();
        let p = fields.point(&c);
        fields.f[V3 * npts + p] = g;
        fields.f[S13 * npts + p] = -zs * g;
        fields.f[S23 * npts + p] = 0.0;
    }
}

fn v3_extremes<T: Topology>(problem: &Problem<'_, T>, x_range: (f64, f64)) -> (f64, f64) {
    use sbpfault::derivative::mode3_layout::*;
    let fields = problem.fields();
    let npts = fields.npts();
    let mut lo = f64::INFINITY;
    let mut hi = f64::NEG_INFINITY;
    for c in fields.aabb().coord_iter() {
        let x = fields.coords(&c)[0];
        if x < x_range.0 || x > x_range.1 {
            continue;
        }
        let v = fields.f[V3 * npts + fields.point(&c)];
        lo = lo.min(v);
        hi = hi.max(v);
    }
    (lo, hi)
}

#[test]
fn centred_pulse_stays_local_and_symmetric() {
    use sbpfault::derivative::mode2_layout::*;
    let config = single_block(2, 2, 2, [11, 11, 1], [1.0, 1.0, 0.0]);
    let topology = SerialTopology::new(config.global_nx());
    let mut problem = Problem::new(&config, &topology).unwrap();
    let npts = problem.fields().npts();

    // a discrete pulse on the centre point
    let centre = vector![5, 5, 0];
    let p = problem.fields().point(&centre);
    problem.fields_mut().f[S11 * npts + p] = -1.0;
    problem.fields_mut().f[S22 * npts + p] = -1.0;
    problem.fields_mut().scale_df(0.0);
    problem.calc_df();

    let fields = problem.fields();
    let df = |comp: usize, c: Coord3| fields.df[comp * npts + fields.point(&c)];
    for c in fields.aabb().coord_iter() {
        let offset = c - centre;
        let support = offset.abs().sum() <= 1;
        for comp in [V1, V2] {
            if !support {
                assert_eq!(df(comp, c), 0.0, "velocity {} at {:?}", comp, c.as_slice());
            }
        }
        for comp in [S11, S12, S22] {
            assert_eq!(df(comp, c), 0.0);
        }
    }
    let push = df(V1, vector![6, 5, 0]);
    assert!(push > 0.0);
    assert_approx_eq!(f64, df(V1, vector![4, 5, 0]), -push, epsilon = 1e-12);
    assert_approx_eq!(f64, df(V2, vector![5, 6, 0]), push, epsilon = 1e-12);
    assert_approx_eq!(f64, df(V2, vector![5, 4, 0]), -push, epsilon = 1e-12);
    assert_eq!(df(V1, centre), 0.0);
}

#[test]
fn gaussian_pulse_symmetry() {
    use sbpfault::derivative::mode2_layout::*;
    let mut config = single_block(2, 2, 3, [21, 21, 1], [1.0, 1.0, 0.0]);
    config.initial_condition = ICType::reference_pulse();
    let topology = SerialTopology::new(config.global_nx());
    let mut problem = Problem::new(&config, &topology).unwrap();
    problem.set_initial_state(&config.initial_condition).unwrap();
    for _ in 0..3 {
        problem.step().unwrap();
    }

    let fields = problem.fields();
    let npts = fields.npts();
    let f = |comp: usize, c: Coord3| fields.f[comp * npts + fields.point(&c)];
    let mut moving = false;
    for i in 0..21 {
        for j in 0..21 {
            let c = vector![i, j, 0];
            let mirror_x = vector![20 - i, j, 0];
            let swapped = vector![j, i, 0];
            assert_approx_eq!(f64, f(V1, c), -f(V1, mirror_x), epsilon = 1e-13);
            assert_approx_eq!(f64, f(V2, c), f(V2, mirror_x), epsilon = 1e-13);
            assert_approx_eq!(f64, f(S11, c), f(S11, mirror_x), epsilon = 1e-13);
            assert_approx_eq!(f64, f(V1, c), f(V2, swapped), epsilon = 1e-13);
            assert_approx_eq!(f64, f(S11, c), f(S22, swapped), epsilon = 1e-13);
            moving |= f(V1, c).abs() > 1e-3;
        }
    }
    assert!(moving);
}

#[test]
fn plane_wave_leaves_through_absorbing_face() {
    let mut config = single_block(2, 3, 3, [101, 8, 1], [1.0, 0.07, 0.0]);
    // free faces along y keep the plane wave exactly one dimensional
    config.blocks[0].boundaries = vec![
        BoundaryKind::Absorbing,
        BoundaryKind::Absorbing,
        BoundaryKind::Free,
        BoundaryKind::Free,
    ];
    config.cfl = 0.25;
    let zs = config.blocks[0].material.zs();
    let topology = SerialTopology::new(config.global_nx());
    let mut problem = Problem::new(&config, &topology).unwrap();
    set_sh_wave(&mut problem, zs, 0.5);
    let nt = (0.8 / problem.dt()).ceil() as usize;
    problem.solve(nt, |_| Ok(())).unwrap();

    let (lo, hi) = v3_extremes(&problem, (0.0, 1.0));
    assert!(lo.abs() < 0.02 && hi.abs() < 0.02, "left behind: [{}, {}]", lo, hi);

    // the same wave bounces off a free face
    config.blocks[0].boundaries[1] = BoundaryKind::Free;
    let mut problem = Problem::new(&config, &topology).unwrap();
    set_sh_wave(&mut problem, zs, 0.5);
    problem.solve(nt, |_| Ok(())).unwrap();
    let (lo, hi) = v3_extremes(&problem, (0.0, 1.0));
    assert!(hi.max(-lo) > 0.5);
}

#[test]
fn shear_wave_crosses_locked_interface() {
    let mut config = single_block(2, 3, 3, [101, 8, 1], [1.0, 0.07, 0.0]);
    config.nx_block[0] = vec![101, 101];
    let mut right = config.blocks[0].clone();
    right.corner = [1.0, 0.0, 0.0];
    // same shear speed, four times the impedance
    right.material = Material::new(4.0, 4.0, 4.0).unwrap();
    config.blocks.push(right);
    for block in config.blocks.iter_mut() {
        block.boundaries = vec![
            BoundaryKind::Absorbing,
            BoundaryKind::Absorbing,
            BoundaryKind::Free,
            BoundaryKind::Free,
        ];
    }
    config.cfl = 0.25;
    let z1 = config.blocks[0].material.zs();
    let z2 = config.blocks[1].material.zs();

    let topology = SerialTopology::new(config.global_nx());
    let mut problem = Problem::new(&config, &topology).unwrap();
    assert_eq!(problem.interfaces().len(), 1);
    set_sh_wave(&mut problem, z1, 0.5);
    let nt = (0.8 / problem.dt()).ceil() as usize;
    problem.solve(nt, |_| Ok(())).unwrap();

    let reflected = (z1 - z2) / (z1 + z2);
    let transmitted = 2.0 * z1 / (z1 + z2);
    let (lo, _) = v3_extremes(&problem, (0.0, 0.99));
    let (_, hi) = v3_extremes(&problem, (1.01, 2.0));
    assert_approx_eq!(f64, lo, reflected, epsilon = 0.03);
    assert_approx_eq!(f64, hi, transmitted, epsilon = 0.03);
}

#[test]
fn anti_plane_and_three_d_problems_run() {
    let mut config = single_block(2, 3, 2, [9, 9, 1], [1.0, 1.0, 0.0]);
    config.initial_condition = ICType::reference_pulse();
    let topology = SerialTopology::new(config.global_nx());
    let mut problem = Problem::new(&config, &topology).unwrap();
    assert_eq!(problem.kernel(), ElasticKernel::ModeIII);
    problem.set_initial_state(&config.initial_condition).unwrap();
    problem.solve(2, |_| Ok(())).unwrap();
    assert!(problem.fields().f.iter().all(|v| v.is_finite()));

    let mut config = single_block(3, 2, 2, [6, 5, 4], [1.0, 1.0, 1.0]);
    config.initial_condition = ICType::Rand { max_val: 1.0 };
    let topology = SerialTopology::new(config.global_nx());
    let mut problem = Problem::new(&config, &topology).unwrap();
    assert_eq!(problem.fields().nvar(), 9);
    problem.set_initial_state(&config.initial_condition).unwrap();
    problem.solve(2, |_| Ok(())).unwrap();
    assert!(problem.fields().f.iter().all(|v| v.is_finite()));
    assert_approx_eq!(f64, problem.time(), 2.0 * problem.dt(), epsilon = 1e-15);
}

#[test]
fn three_d_affine_map_is_exact() {
    use sbpfault::derivative::three_d_layout::*;
    let velocity = [V1, V2, V3];
    let stress = [[S11, S12, S13], [S12, S22, S23], [S13, S23, S33]];
    let mut config = single_block(3, 2, 2, [7, 6, 5], [1.0, 1.0, 1.0]);
    config.blocks[0].boundaries = vec![BoundaryKind::None; 6];
    config.blocks[0].material = Material::new(2.0, 1.5, 0.7).unwrap();
    config.dt = Some(1.0);
    let material = config.blocks[0].material;
    let nx = config.global_nx();
    let map = |xi: Vector3<f64>| {
        matrix![2.0, 0.3, 0.0; 0.1, 1.0, 0.2; 0.0, -0.2, 0.5] * xi + Vector3::new(1.0, -0.5, 0.25)
    };
    let topology = SerialTopology::new(nx);
    let mut problem =
        Problem::with_surfaces(&config, vec![SampledSurface::mapped_faces(3, &nx, map)], &topology).unwrap();

    // v = a x + c and a stress linear in x, so the rates are constant
    let a = matrix![0.3, -0.2, 0.1; 0.5, 0.4, -0.3; -0.1, 0.2, 0.6];
    let grad = |i: usize, j: usize, k: usize| 0.1 * (i + j + 1) as f64 * (k as f64 - 1.0) + 0.05 * (i * j) as f64;
    let fields = problem.fields_mut();
    let npts = fields.npts();
    let aabb = *fields.aabb();
    for c in aabb.coord_iter() {
        let x = fields.coords(&c);
        let p = fields.point(&c);
        let v = a * x + Vector3::new(0.2, -0.1, 0.3);
        for i in 0..3 {
            fields.f[velocity[i] * npts + p] = v[i];
            for j in i..3 {
                let sigma = 0.1 * (i + 2 * j) as f64 + (0..3).map(|k| grad(i, j, k) * x[k]).sum::<f64>();
                fields.f[stress[i][j] * npts + p] = sigma;
            }
        }
    }
    problem.fields_mut().scale_df(0.0);
    problem.calc_df();

    let trace = a.trace();
    let fields = problem.fields();
    for c in fields.aabb().coord_iter() {
        let p = fields.point(&c);
        for i in 0..3 {
            let divergence: f64 = (0..3).map(|k| grad(i, k, k)).sum();
            assert_approx_eq!(f64, fields.df[velocity[i] * npts + p], divergence / material.rho, epsilon = 1e-11);
            for j in i..3 {
                let mut rate = material.g * (a[(i, j)] + a[(j, i)]);
                if i == j {
                    rate += material.lambda * trace;
                }
                assert_approx_eq!(f64, fields.df[stress[i][j] * npts + p], rate, epsilon = 1e-11);
            }
        }
    }
}

#[test]
fn three_d_locked_interfaces_keep_uniform_state() {
    // 2 x 2 x 2 welded blocks with different materials, four interfaces
    // along each direction
    let mut config = single_block(3, 2, 2, [5, 5, 5], [0.5, 0.5, 0.5]);
    config.nx_block = [vec![5, 5], vec![5, 5], vec![5, 5]];
    config.blocks = (0..8)
        .map(|index| BlockConfig {
            material: Material::new(1.0 + 0.2 * index as f64, 1.0, 0.5 + 0.1 * index as f64).unwrap(),
            boundaries: vec![BoundaryKind::None; 6],
            corner: [
                0.5 * (index / 4) as f64,
                0.5 * (index / 2 % 2) as f64,
                0.5 * (index % 2) as f64,
            ],
            lengths: [0.5, 0.5, 0.5],
        })
        .collect();
    let topology = SerialTopology::new(config.global_nx());
    let mut problem = Problem::new(&config, &topology).unwrap();
    assert_eq!(problem.interfaces().len(), 12);

    let fields = problem.fields_mut();
    let npts = fields.npts();
    for comp in 0..9 {
        fields.f[comp * npts..(comp + 1) * npts]
            .iter_mut()
            .for_each(|v| *v = 0.3 * comp as f64 - 1.1);
    }
    problem.fields_mut().scale_df(0.0);
    problem.calc_df();
    assert!(problem.fields().df.iter().all(|v| v.abs() < 1e-12));
}

#[test]
fn three_d_centred_pulse_stays_local_and_symmetric() {
    use sbpfault::derivative::three_d_layout::*;
    let velocity = [V1, V2, V3];
    let config = single_block(3, 2, 2, [11, 11, 11], [1.0, 1.0, 1.0]);
    let topology = SerialTopology::new(config.global_nx());
    let mut problem = Problem::new(&config, &topology).unwrap();
    let npts = problem.fields().npts();

    let centre = vector![5, 5, 5];
    let p = problem.fields().point(&centre);
    for comp in [S11, S22, S33] {
        problem.fields_mut().f[comp * npts + p] = -1.0;
    }
    problem.fields_mut().scale_df(0.0);
    problem.calc_df();

    let fields = problem.fields();
    let df = |comp: usize, c: Coord3| fields.df[comp * npts + fields.point(&c)];
    for c in fields.aabb().coord_iter() {
        let offset = c - centre;
        if offset.abs().sum() > 1 {
            for comp in velocity {
                assert_eq!(df(comp, c), 0.0, "velocity {} at {:?}", comp, c.as_slice());
            }
        }
        for comp in [S11, S12, S13, S22, S23, S33] {
            assert_eq!(df(comp, c), 0.0);
        }
    }
    let push = df(V1, vector![6, 5, 5]);
    assert!(push > 0.0);
    for (d, comp) in velocity.into_iter().enumerate() {
        let mut step = Coord3::zero();
        step[d] = 1;
        assert_approx_eq!(f64, df(comp, centre + step), push, epsilon = 1e-12);
        assert_approx_eq!(f64, df(comp, centre - step), -push, epsilon = 1e-12);
        assert_eq!(df(comp, centre), 0.0);
        for other in 0..3 {
            if other != d {
                let mut side = Coord3::zero();
                side[other] = 1;
                assert_approx_eq!(f64, df(comp, centre + side), 0.0, epsilon = 1e-12);
            }
        }
    }
}
