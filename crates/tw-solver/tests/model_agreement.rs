//! The lumped and MTL models describe the same winding and must agree where
//! the turns are electrically short.

mod common;

use common::{FixedLine, single_segment};
use num_complex::Complex64;
use tw_core::{hz, omega};
use tw_solver::{LumpedConfig, LumpedModel, MtlConfig, MtlModel, ResponseModel, SolverError};

#[test]
fn lumped_and_mtl_agree_at_low_frequency() {
    let line = FixedLine::coupled();
    let zl = 100.0;
    let topo = single_segment(4, 0.0, zl);
    let mtl = MtlModel::new(&topo, &line, MtlConfig::default()).unwrap();
    let lumped = LumpedModel::new(&topo, &line, LumpedConfig::default()).unwrap();

    let f = 1.0e3;
    let a = mtl.response_at(hz(f)).unwrap();
    let b = lumped.response_at(hz(f)).unwrap();

    assert!((a.impedance - b.impedance).norm() / a.impedance.norm() < 0.01);
    for (ga, gb) in a.gains.iter().zip(&b.gains) {
        assert!((ga - gb).norm() < 0.01, "{ga} vs {gb}");
    }

    // a series chain carries one current: Z = Zl + sum of all branch terms
    let len = topo.turn_lengths()[0];
    let w = omega(f);
    let n = 4.0;
    let series = Complex64::new(
        n * line.r * len,
        w * len * (n * line.l + n * (n - 1.0) * line.l_mutual),
    );
    let expected = series + zl;
    assert!((a.impedance - expected).norm() / expected.norm() < 0.01);
}

#[test]
fn source_impedance_is_part_of_the_driving_point() {
    let line = FixedLine::single();
    let (rs, rl) = (50.0, 100.0);
    let topo = single_segment(1, rs, rl);
    let mtl = MtlModel::new(&topo, &line, MtlConfig::default()).unwrap();
    let lumped = LumpedModel::new(&topo, &line, LumpedConfig::default()).unwrap();

    for r in [
        mtl.response_at(hz(1.0e3)).unwrap(),
        lumped.response_at(hz(1.0e3)).unwrap(),
    ] {
        // a 2 m turn at 1 kHz is a few milliohms in series with the load
        assert!((r.impedance - Complex64::new(rs + rl, 0.0)).norm() < 0.1, "{}", r.impedance);
        assert!((r.terminal_impedance - Complex64::new(rl, 0.0)).norm() < 0.1, "{}", r.terminal_impedance);
        assert!((r.impedance - r.terminal_impedance - rs).norm() < 1e-6);
    }
}

#[test]
fn gains_fall_along_a_grounded_chain() {
    let line = FixedLine::coupled();
    let topo = single_segment(4, 0.0, 0.0);
    let lumped = LumpedModel::new(&topo, &line, LumpedConfig::default()).unwrap();
    let r = lumped.response_at(hz(1.0e3)).unwrap();

    let mags: Vec<f64> = r.gains.iter().map(|g| g.norm()).collect();
    for w in mags.windows(2) {
        assert!(w[0] > w[1], "{mags:?}");
    }
    assert!(mags[3] < 1e-9);
}

#[test]
fn ill_conditioned_frequency_is_rejected() {
    let line = FixedLine::coupled();
    let topo = single_segment(4, 0.0, 50.0);
    let config = LumpedConfig {
        max_condition: 1.000_001,
        ..LumpedConfig::default()
    };
    let lumped = LumpedModel::new(&topo, &line, config).unwrap();
    assert!(matches!(
        lumped.response_at(hz(1.0e3)),
        Err(SolverError::IllConditioned { .. })
    ));
}

#[test]
fn non_positive_frequency_is_invalid() {
    let line = FixedLine::single();
    let topo = single_segment(1, 0.0, 50.0);
    let mtl = MtlModel::new(&topo, &line, MtlConfig::default()).unwrap();
    assert!(matches!(
        mtl.response_at(hz(0.0)),
        Err(SolverError::InvalidInput { .. })
    ));
}
