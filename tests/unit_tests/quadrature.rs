use fenopt::quadrature::QuadratureRule;
use matrixcompare::assert_scalar_eq;

#[test]
fn weights_sum_to_reference_measure() {
    for dim in 0..=3 {
        for points in 1..=4 {
            let rule = QuadratureRule::gauss(dim, points).unwrap();
            assert_eq!(rule.len(), points.pow(dim as u32));
            let sum: f64 = rule.weights().iter().sum();
            assert_scalar_eq!(sum, 2f64.powi(dim as i32), comp = abs, tol = 1e-13);
        }
    }
}

#[test]
fn zero_dimensional_rule_is_single_point() {
    let rule = QuadratureRule::gauss(0, 3).unwrap();
    assert_eq!(rule.weights(), &[1.0]);
    assert_eq!(rule.points()[0].norm(), 0.0);
}

#[test]
fn tensor_rule_integrates_products_exactly() {
    // ∫∫ x² y⁴ over [-1, 1]² = (2/3) (2/5)
    let rule = QuadratureRule::gauss(2, 3).unwrap();
    let integral: f64 = rule
        .weights()
        .iter()
        .zip(rule.points())
        .map(|(w, p)| w * p[0].powi(2) * p[1].powi(4))
        .sum();
    assert_scalar_eq!(integral, 4.0 / 15.0, comp = abs, tol = 1e-14);
    assert!(rule.points().iter().all(|p| p[2] == 0.0));
}

#[test]
fn invalid_rules_are_rejected() {
    assert!(QuadratureRule::gauss(4, 2).is_err());
    assert!(QuadratureRule::gauss(2, 0).is_err());
}
