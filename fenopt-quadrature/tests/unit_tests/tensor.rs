use fenopt_quadrature::integrate;
use fenopt_quadrature::tensor::{hexahedron_gauss, quadrilateral_gauss, tensor_gauss};
use matrixcompare::assert_scalar_eq;

fn monomial_integral_1d(alpha: i32) -> f64 {
    (1.0 - (-1.0f64).powi(alpha + 1)) / (alpha as f64 + 1.0)
}

#[test]
fn quadrilateral_gauss_rules_satisfy_expected_accuracy() {
    for n in 1..=8 {
        // Exact along each dimension
        let expected_polynomial_degree = 2 * n - 1;
        let rule = quadrilateral_gauss(n);
        assert_eq!(rule.0.len(), n * n);
        assert!(rule.0.iter().all(|&w| w > 0.0));

        for alpha in 0..=expected_polynomial_degree as i32 {
            for beta in 0..=expected_polynomial_degree as i32 {
                let expected = monomial_integral_1d(alpha) * monomial_integral_1d(beta);
                let estimated = integrate(&rule, |&[x, y]| x.powi(alpha) * y.powi(beta));
                assert_scalar_eq!(estimated, expected, comp = abs, tol = 1e-14);
            }
        }
    }
}

#[test]
fn hexahedral_gauss_rules_satisfy_expected_accuracy() {
    for n in 1..=5 {
        let expected_polynomial_degree = 2 * n - 1;
        let rule = hexahedron_gauss(n);
        assert_eq!(rule.0.len(), n * n * n);

        for alpha in 0..=expected_polynomial_degree as i32 {
            for beta in 0..=expected_polynomial_degree as i32 {
                for gamma in 0..=expected_polynomial_degree as i32 {
                    let expected =
                        monomial_integral_1d(alpha) * monomial_integral_1d(beta) * monomial_integral_1d(gamma);
                    let estimated =
                        integrate(&rule, |&[x, y, z]| x.powi(alpha) * y.powi(beta) * z.powi(gamma));
                    assert_scalar_eq!(estimated, expected, comp = abs, tol = 1e-13);
                }
            }
        }
    }
}

#[test]
fn tensor_rule_ordering_is_first_axis_fastest() {
    let (_, points) = quadrilateral_gauss(2);
    assert!(points[0][0] < points[1][0]);
    assert_eq!(points[0][1], points[1][1]);
    assert!(points[1][1] < points[2][1]);
}

#[test]
fn zero_dimensional_rule_is_a_single_unit_point() {
    let (weights, points) = tensor_gauss::<0>(3);
    assert_eq!(weights, vec![1.0]);
    assert_eq!(points.len(), 1);
}
