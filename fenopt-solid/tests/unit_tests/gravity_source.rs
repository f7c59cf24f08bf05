use fenopt::nalgebra::Vector3;
use fenopt_solid::GravitySource;

#[test]
fn acceleration_is_restricted_to_active_dimensions() {
    let gravity = GravitySource::from_acceleration(Vector3::new(1.0, -9.81, 3.0));
    assert_eq!(gravity.acceleration(3), Vector3::new(1.0, -9.81, 3.0));
    assert_eq!(gravity.acceleration(2), Vector3::new(1.0, -9.81, 0.0));
}
