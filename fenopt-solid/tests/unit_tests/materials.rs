use fenopt::autodiff::Dual;
use fenopt::config::{SolidConfig, StressModel};
use fenopt::nalgebra::{Matrix3, Vector3};
use fenopt_solid::{CauchyStressModel, LameParameters, MassBalance, YoungPoisson};
use matrixcompare::{assert_matrix_eq, assert_scalar_eq};

const MODELS: [StressModel; 3] = [
    StressModel::LinearElastic,
    StressModel::NeoHookean,
    StressModel::MooneyRivlin,
];

fn parameters() -> LameParameters<f64> {
    LameParameters { mu: 3.0, lambda: 5.0 }
}

#[test]
fn lame_parameters_from_young_poisson() {
    let young_poisson = YoungPoisson {
        young: 1e3,
        poisson: 0.3,
    };
    let lame = LameParameters::from(young_poisson);
    assert_scalar_eq!(lame.mu, 384.6153846153846, comp = float);
    assert_scalar_eq!(lame.lambda, 576.9230769230769, comp = float);

    let scaled = lame.per_unit_density(1000.0);
    assert_scalar_eq!(scaled.mu, 0.3846153846153846, comp = float);
    assert_scalar_eq!(scaled.lambda, 0.5769230769230769, comp = float);
}

#[test]
fn incompressible_lame_parameter_is_infinite() {
    let lame = LameParameters::from(YoungPoisson {
        young: 1.5e6,
        poisson: 0.5,
    });
    assert_scalar_eq!(lame.mu, 5e5, comp = float);
    assert!(lame.lambda.is_infinite());
}

#[test]
fn models_are_stress_free_in_reference_configuration() {
    for model in MODELS {
        let stress = model.compute_stress(&Matrix3::<f64>::identity(), &parameters());
        assert_matrix_eq!(stress, Matrix3::<f64>::zeros(), comp = abs, tol = 1e-14);
    }
}

#[test]
fn linear_elastic_stress_is_symmetric_part_of_gradient() {
    #[rustfmt::skip]
    let f = Matrix3::new(1.1, 0.2, 0.0,
                         0.0, 1.0, 0.0,
                         0.0, 0.0, 1.0);
    #[rustfmt::skip]
    let expected = Matrix3::new(0.6, 0.6, 0.0,
                                0.6, 0.0, 0.0,
                                0.0, 0.0, 0.0);
    let stress = StressModel::LinearElastic.compute_stress(&f, &parameters());
    assert_matrix_eq!(stress, expected, comp = abs, tol = 1e-12);
}

#[test]
fn neo_hookean_uniaxial_stretch() {
    // B = diag(4, 1, 1), J = 2
    let f = Matrix3::from_diagonal(&Vector3::new(2.0, 1.0, 1.0));
    let stress = StressModel::NeoHookean.compute_stress(&f, &parameters());
    let expected = Matrix3::from_diagonal(&Vector3::new(4.5, 0.0, 0.0));
    assert_matrix_eq!(stress, expected, comp = abs, tol = 1e-12);
}

#[test]
fn mooney_rivlin_uniaxial_stretch() {
    // C1 = 1, C2 = 0.5, B = diag(4, 1, 1), B^-1 = diag(0.25, 1, 1), J = 2
    let f = Matrix3::from_diagonal(&Vector3::new(2.0, 1.0, 1.0));
    let stress = StressModel::MooneyRivlin.compute_stress(&f, &parameters());
    let expected = Matrix3::from_diagonal(&Vector3::new(3.375, 0.0, 0.0));
    assert_matrix_eq!(stress, expected, comp = abs, tol = 1e-12);
}

#[test]
fn stress_derivative_matches_finite_difference() {
    #[rustfmt::skip]
    let f = Matrix3::new(1.05, 0.1, 0.02,
                         -0.03, 0.97, 0.04,
                         0.01, -0.02, 1.02);
    let h = 1e-6;
    for model in MODELS {
        for (i, j) in [(0, 0), (0, 1), (2, 1)] {
            let mut f_dual = f.map(Dual::constant);
            f_dual[(i, j)] = Dual::variable(f[(i, j)]);
            let stress = model.compute_stress(&f_dual, &parameters());

            let mut f_plus = f;
            f_plus[(i, j)] += h;
            let mut f_minus = f;
            f_minus[(i, j)] -= h;
            let fd = (model.compute_stress(&f_plus, &parameters()) - model.compute_stress(&f_minus, &parameters()))
                / (2.0 * h);

            assert_matrix_eq!(stress.map(|s| s.eps), fd, comp = abs, tol = 1e-7);
            assert_matrix_eq!(
                stress.map(|s| s.re),
                model.compute_stress(&f, &parameters()),
                comp = abs,
                tol = 1e-14
            );
        }
    }
}

#[test]
fn mass_balance_formulations() {
    let incompressible = SolidConfig::default();
    let parameters = LameParameters::from(YoungPoisson {
        young: incompressible.young,
        poisson: incompressible.poisson,
    })
    .per_unit_density(incompressible.density);
    let exact = MassBalance::from_config(&incompressible, &parameters);
    assert!(exact.incompressible);
    assert_eq!(exact.residual(0.25, 7.0), 0.25);

    let penalty_config = SolidConfig {
        use_penalty: true,
        penalty_lambda: 10.0,
        ..SolidConfig::default()
    };
    let penalty = MassBalance::from_config(&penalty_config, &parameters);
    assert_scalar_eq!(penalty.residual(0.25, 5.0), 0.75, comp = float);

    let compressible_config = SolidConfig {
        poisson: 0.25,
        young: 2.5,
        density: 1.0,
        ..SolidConfig::default()
    };
    let parameters = LameParameters::from(YoungPoisson {
        young: 2.5,
        poisson: 0.25,
    });
    let compressible = MassBalance::from_config(&compressible_config, &parameters);
    assert!(!compressible.incompressible);
    assert_scalar_eq!(compressible.lambda, 1.0, comp = float);
    assert_scalar_eq!(compressible.residual(0.5, 2.0), 2.5, comp = float);
}
