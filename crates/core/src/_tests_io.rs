#![cfg(test)]

use std::f64::consts::PI;

use super::io::{ConfigError, OperatorConfig, SyntheticCoverage};

const EXPLICIT: &str = r#"
[params]
nx1 = 8
ny1 = 4
umax = 3.0
vmax = 2.0

[kernel]
hwhm = 0.9

[power]
max_iter = 50
seed = 9

[coverage]
u = [0.0, 0.1, 1.5]
v = [0.0, -0.2, 0.0]
"#;

#[test]
fn explicit_coverage_is_parsed_and_built() {
    let config = OperatorConfig::from_toml_str(EXPLICIT).unwrap();
    assert_eq!(config.params.nx1, 8);
    assert_eq!(config.params.ofx, 2);
    assert_eq!(config.params.ofy, 2);
    assert_eq!(config.kernel.hwhm, 0.9);
    assert_eq!(config.kernel.support, 2);
    assert_eq!(config.power.max_iter, 50);
    assert_eq!(config.power.rel_tol, 1e-3);
    assert_eq!(config.power.seed, 9);

    let setup = config.build().unwrap();
    let params = setup.gridding.params();
    assert_eq!(params.nmeas, 3);
    assert_eq!(params.nx2(), 16);
    assert_eq!(params.ny2(), 8);
    assert_eq!(params.umax, 3.0);
    assert_eq!(setup.gridding.matrix().nvals(), 3 * 25);
    assert_eq!(setup.power.seed, 9);
}

#[test]
fn omitted_sections_fall_back_to_defaults() {
    let raw = r#"
[params]
nx1 = 4
ny1 = 4

[coverage]
u = [0.5]
v = [0.5]
"#;
    let config = OperatorConfig::from_toml_str(raw).unwrap();
    assert_eq!(config.params.umax, PI);
    assert_eq!(config.params.vmax, PI);
    assert_eq!(config.kernel.table_len, 301);
    assert_eq!(config.power.seed, 51);
    assert_eq!(config.power.max_iter, 200);
}

#[test]
fn synthetic_coverage_is_deterministic_and_in_range() {
    let raw = r#"
[params]
nx1 = 8
ny1 = 8
umax = 2.0
vmax = 1.0

[coverage]
synthetic = { count = 64, seed = 7 }
"#;
    let config = OperatorConfig::from_toml_str(raw).unwrap();
    let (u, v) = config.coverage.coordinates(2.0, 1.0).unwrap();
    assert_eq!(u.len(), 64);
    assert_eq!(v.len(), 64);
    assert!(u.iter().all(|x| x.abs() <= 2.0));
    assert!(v.iter().all(|y| y.abs() <= 1.0));

    let (u2, v2) = config.coverage.coordinates(2.0, 1.0).unwrap();
    assert_eq!(u, u2);
    assert_eq!(v, v2);

    assert_eq!(config.build().unwrap().gridding.params().nmeas, 64);
}

#[test]
fn different_seeds_give_different_coverage() {
    let a = SyntheticCoverage {
        count: 16,
        seed: 1,
        spread: 0.25,
    };
    let b = SyntheticCoverage { seed: 2, ..a };
    assert_ne!(a.sample(PI, PI).unwrap().0, b.sample(PI, PI).unwrap().0);
}

#[test]
fn unusable_spread_is_rejected_before_sampling() {
    for spread in [1e6, 0.0, -0.5, f64::NAN, f64::INFINITY] {
        let coverage = SyntheticCoverage {
            count: 8,
            seed: 3,
            spread,
        };
        assert!(
            matches!(coverage.sample(PI, PI), Err(ConfigError::InvalidCoverage(_))),
            "spread {spread}"
        );
    }

    let raw = r#"
[params]
nx1 = 4
ny1 = 4

[coverage.synthetic]
count = 8
spread = 1e6
"#;
    let config = OperatorConfig::from_toml_str(raw).unwrap();
    assert!(matches!(config.build(), Err(ConfigError::InvalidCoverage(_))));
}

#[test]
fn widest_accepted_spread_still_fills_the_plane() {
    let coverage = SyntheticCoverage {
        count: 32,
        seed: 5,
        spread: 10.0,
    };
    let (u, v) = coverage.sample(PI, PI).unwrap();
    assert_eq!(u.len(), 32);
    assert!(u.iter().chain(&v).all(|x| x.abs() <= PI));
}

#[test]
fn mismatched_coordinate_lengths_are_rejected() {
    let raw = r#"
[params]
nx1 = 4
ny1 = 4

[coverage]
u = [0.0, 1.0]
v = [0.0]
"#;
    let config = OperatorConfig::from_toml_str(raw).unwrap();
    assert!(matches!(config.build(), Err(ConfigError::InvalidCoverage(_))));
}

#[test]
fn missing_coverage_is_rejected() {
    let raw = "[params]\nnx1 = 4\nny1 = 4\n";
    let config = OperatorConfig::from_toml_str(raw).unwrap();
    assert!(matches!(config.build(), Err(ConfigError::InvalidCoverage(_))));
}

#[test]
fn invalid_grid_surfaces_as_operator_error() {
    let raw = r#"
[params]
nx1 = 4
ny1 = 4
ofx = 0

[coverage]
u = [0.0]
v = [0.0]
"#;
    let config = OperatorConfig::from_toml_str(raw).unwrap();
    assert!(matches!(config.build(), Err(ConfigError::Operator(_))));
}

#[test]
fn malformed_toml_is_reported() {
    assert!(matches!(
        OperatorConfig::from_toml_str("[params]\nnx1 = \"eight\"\nny1 = 4\n"),
        Err(ConfigError::Toml(_))
    ));
}

#[test]
fn missing_file_is_an_io_error() {
    let path = std::path::Path::new("/nonexistent/purify-operator.toml");
    assert!(matches!(OperatorConfig::from_path(path), Err(ConfigError::Io(_))));
}
