// crates/rh_profile/tests/grid_scenarios.rs

//! 剖面网格与流速分布的端到端场景

use rh_config::InterpolationMode;
use rh_foundation::geometry::signed_area;
use rh_foundation::{Diagnostic, Point2D};
use rh_profile::{
    ManningTable, Profile, ProfileGridBuilder, ProfileHydro, ProfileSample, ReachLayout, Roughness,
    VelocityDistributor, VelocitySampling,
};
use std::io::Write;

/// 三条直剖面，宽度与点数各不相同
fn three_profiles() -> (Vec<Profile>, Vec<ProfileHydro>) {
    let profiles = vec![
        Profile::transect(0.0, &[0.0, 2.0, 4.0], &[1.0, 0.0, 1.0]).unwrap(),
        Profile::transect(10.0, &[0.0, 2.5, 5.0], &[1.2, 0.1, 1.2]).unwrap(),
        Profile::transect(20.0, &[0.0, 1.0, 3.0, 6.0], &[1.0, 0.2, 0.1, 1.0]).unwrap(),
    ];
    let hydro = profiles
        .iter()
        .map(|p| {
            let n = p.len();
            ProfileHydro::new(vec![0.5; n], vec![0.8; n])
        })
        .collect();
    (profiles, hydro)
}

fn assert_valid(grid: &rh_profile::ProfileGrid) {
    let mesh = &grid.mesh;
    mesh.validate().unwrap();
    assert!(mesh.orphan_nodes().is_empty());
    for i in 0..mesh.n_cells() {
        let [a, b, c] = mesh.cell_points(i);
        assert!(signed_area(a, b, c) > 0.0, "单元 {} 面积非正", i);
    }
    assert_eq!(grid.z.len(), mesh.n_nodes());
    assert_eq!(grid.velocity.len(), mesh.n_nodes());
    assert_eq!(grid.depth.len(), mesh.n_nodes());
    assert_eq!(grid.node_sample.len(), mesh.n_nodes());
    assert_eq!(grid.cell_centers.len(), mesh.n_cells());
}

#[test]
fn test_three_profile_block() {
    let profiles = vec![
        Profile::transect(0.0, &[0.0, 1.0, 2.0], &[0.0; 3]).unwrap(),
        Profile::transect(1.0, &[0.0, 1.0, 2.0], &[0.0; 3]).unwrap(),
        Profile::transect(2.0, &[0.0, 1.0, 2.0], &[0.0; 3]).unwrap(),
    ];
    let hydro = vec![ProfileHydro::dry(3); 3];
    let grid = ProfileGridBuilder::block()
        .build(&profiles, &ReachLayout::single(3), &hydro)
        .unwrap();

    assert_eq!(grid.n_cells(), 8);
    assert_eq!(grid.n_nodes(), 9);
    assert_eq!(grid.diagnostics.holes(), 0);
    assert_eq!(grid.diagnostics.overlaps(), 0);
    assert!((grid.mesh.total_area() - 4.0).abs() < 1e-12);
    assert_valid(&grid);
}

#[test]
fn test_all_modes_valid_and_aligned() {
    let (profiles, hydro) = three_profiles();
    let layout = ReachLayout::single(3);
    for mode in [InterpolationMode::Block, InterpolationMode::Linear, InterpolationMode::Nearest] {
        let grid = ProfileGridBuilder::new(mode, 3)
            .unwrap()
            .build(&profiles, &layout, &hydro)
            .unwrap();
        assert!(grid.n_cells() > 0);
        assert!(grid.failures.is_empty());
        assert_valid(&grid);

        // 常数场插值后仍为常数
        assert!(grid.velocity.iter().all(|&v| (v - 0.5).abs() < 1e-12));
        assert!(grid.depth.iter().all(|&h| (h - 0.8).abs() < 1e-12));
    }
}

#[test]
fn test_nearest_values_come_from_samples() {
    let (profiles, mut hydro) = three_profiles();
    for (i, h) in hydro.iter_mut().enumerate() {
        for (j, v) in h.velocity.iter_mut().enumerate() {
            *v = (10 * i + j) as f64;
        }
    }
    let observed: Vec<f64> = hydro.iter().flat_map(|h| h.velocity.clone()).collect();

    let grid = ProfileGridBuilder::new(InterpolationMode::Nearest, 4)
        .unwrap()
        .build(&profiles, &ReachLayout::single(3), &hydro)
        .unwrap();
    for (node, v) in grid.velocity.iter().enumerate() {
        assert!(observed.contains(v));
        let s = grid.node_sample[node];
        assert_eq!(*v, hydro[s.profile].velocity[s.sample]);
    }
}

#[test]
fn test_reach_cells_monotone() {
    let (mut profiles, mut hydro) = three_profiles();
    let (more, more_hydro) = three_profiles();
    profiles.extend(more.into_iter().map(|p| shift(&p, 100.0)));
    hydro.extend(more_hydro);
    profiles.push(Profile::transect(200.0, &[0.0, 1.0], &[0.0, 0.0]).unwrap());
    hydro.push(ProfileHydro::dry(2));

    let layout = ReachLayout::new(vec![0, 3, 3, 6, 7], 7).unwrap();
    for mode in [InterpolationMode::Block, InterpolationMode::Linear] {
        let grid = ProfileGridBuilder::new(mode, 2)
            .unwrap()
            .build(&profiles, &layout, &hydro)
            .unwrap();
        assert_eq!(grid.reach_cells.len(), layout.n_reaches() + 1);
        assert_eq!(grid.reach_cells[0], 0);
        assert!(grid.reach_cells.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(*grid.reach_cells.last().unwrap(), grid.n_cells());
        assert_eq!(grid.reach_cell_range(1).len(), 0);
        assert_eq!(grid.reach_cell_range(0).len(), grid.reach_cell_range(2).len());

        let skipped = grid
            .diagnostics
            .count(|d| matches!(d, Diagnostic::ReachSkipped { .. }));
        assert_eq!(skipped, 2);
        assert_valid(&grid);
    }
}

#[test]
fn test_manning_discharge_conservation() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "# profile, distance, n").unwrap();
    writeln!(file, "0, 0.0, 0.040").unwrap();
    writeln!(file, "0, 3.0, 0.025").unwrap();
    writeln!(file, "0, 7.0, 0.050").unwrap();
    let roughness = Roughness::Table(ManningTable::from_file(file.path()).unwrap());

    let laterals = [0.0, 1.0, 2.5, 4.0, 5.0, 7.5, 10.0];
    let z = [3.0, 1.5, 0.5, 0.0, 0.4, 1.0, 3.0];
    let profile = Profile::transect(0.0, &laterals, &z).unwrap();

    for sampling in [VelocitySampling::OnProfile, VelocitySampling::Regular(70)] {
        for q in [0.5, 12.0, 80.0] {
            // 剖面 1 沿用剖面 0 的糙率
            let result = VelocityDistributor::new(sampling)
                .distribute(1, &profile, 2.0, q, &roughness)
                .unwrap();
            assert!((result.discharge() - q).abs() < 1e-9 * q.max(1.0));
            assert!(result.hydro.velocity.iter().all(|&v| v >= 0.0));
            assert!(result.slope_sqrt > 0.0);
            for (h, v) in result.hydro.depth.iter().zip(&result.hydro.velocity) {
                if *h == 0.0 {
                    assert_eq!(*v, 0.0);
                }
            }
        }
    }
}

fn shift(profile: &Profile, dx: f64) -> Profile {
    Profile::new(
        profile
            .samples
            .iter()
            .map(|s| ProfileSample::new(Point2D::new(s.xy.x + dx, s.xy.y), s.lateral, s.z))
            .collect(),
    )
    .unwrap()
}
