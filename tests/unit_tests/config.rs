use fenopt::config::{load_config, parse_config, Config, StressModel};
use fenopt::optimize::newton::ConvergenceCriterion;
use fenopt::nalgebra::Point3;

#[test]
fn defaults() {
    let config = Config::default();
    assert_eq!(config.mesh.dim, 2);
    assert_eq!(config.quadrature.points_per_dim, 4);
    assert_eq!(config.newton.max_iterations, 5);
    assert_eq!(config.newton.criterion, ConvergenceCriterion::IncrementNorm);
    assert!(config.newton.accept_unconverged);
    assert_eq!(config.assembly.num_workers, 1);

    let ns = &config.navier_stokes;
    assert_eq!(ns.control_face_id, 3);
    assert_eq!(ns.inverse_reynolds(), 1.0);
    assert_eq!(ns.control_penalty, 1e10);
    assert_eq!(ns.outside_control_penalty, 1e50);
    assert!(ns.target_region.contains(2, &Point3::new(0.25, 0.75, 7.0)));
    assert!(!ns.target_region.contains(3, &Point3::new(0.25, 0.75, 7.0)));
    assert!(!ns.target_region.contains(2, &Point3::new(0.2, 0.5, 0.0)));

    assert_eq!(config.solid.model, StressModel::NeoHookean);
    assert!(config.solid.is_incompressible());
    assert!(config.solid.model.is_hyperelastic());
    assert!(!StressModel::LinearElastic.is_hyperelastic());
}

#[test]
fn partial_json_keeps_defaults() {
    let json = r#"{
        "mesh": { "dim": 3, "cells_per_dim": 2 },
        "newton": { "criterion": "residual_norm", "accept_unconverged": false },
        "navier_stokes": { "viscosity": 0.01, "density": 2.0, "advection": false },
        "solid": { "model": "mooney_rivlin", "poisson": 0.3 }
    }"#;
    let config = parse_config(json).unwrap();
    assert_eq!(config.mesh.dim, 3);
    assert_eq!(config.mesh.cells_per_dim, 2);
    assert_eq!(config.mesh.max_point(), Point3::new(1.0, 1.0, 1.0));
    assert_eq!(config.newton.criterion, ConvergenceCriterion::ResidualNorm);
    assert_eq!(config.newton.max_iterations, 5);
    assert!(!config.newton.accept_unconverged);
    assert_eq!(config.navier_stokes.inverse_reynolds(), 0.005);
    assert!(!config.navier_stokes.advection);
    assert_eq!(config.navier_stokes.alpha, 1.0);
    assert_eq!(config.solid.model, StressModel::MooneyRivlin);
    assert!(!config.solid.is_incompressible());
    assert_eq!(config.solid.density, 1000.0);

    let settings = config.newton.settings();
    assert_eq!(settings.max_iterations, Some(5));
    assert_eq!(settings.tolerance, 1e-10);
}

#[test]
fn invalid_input_is_reported() {
    assert!(parse_config(r#"{ "solid": { "model": "plastic" } }"#).is_err());
    assert!(parse_config("not json").is_err());
    assert!(load_config("this/file/does/not/exist.json").is_err());
}
