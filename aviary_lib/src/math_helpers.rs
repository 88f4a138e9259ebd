use std::f32::consts::TAU;

use glam::Vec3;

/// Vectors shorter than this have no usable direction and are never normalized.
pub const MIN_DIRECTION: f32 = 1e-5;

pub fn distance(a: Vec3, b: Vec3) -> f32 {
    (a - b).length()
}

/// Distance projected onto the ground plane, ignoring the Y component.
pub fn horizontal_distance(a: Vec3, b: Vec3) -> f32 {
    let dx = a.x - b.x;
    let dz = a.z - b.z;
    (dx * dx + dz * dz).sqrt()
}

pub fn normalize_or_zero(v: Vec3) -> Vec3 {
    let length = v.length();
    if length > MIN_DIRECTION {
        v / length
    } else {
        Vec3::ZERO
    }
}

/// Rescales `v` to the given length, or returns zero when `v` has no direction.
pub fn redirect(v: Vec3, length: f32) -> Vec3 {
    normalize_or_zero(v) * length
}

/// Wraps an animation phase into [0, 2π).
pub fn wrap_phase(phase: f32) -> f32 {
    phase.rem_euclid(TAU)
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use glam::Vec3;
    use std::f32::consts::TAU;

    use super::{horizontal_distance, normalize_or_zero, redirect, wrap_phase};

    macro_rules! assert_eqf32 {
        ($x:expr, $y:expr) => {
            assert_relative_eq!($x, $y, epsilon = 1e-3_f32)
        };
    }

    #[test]
    fn horizontal_distance_ignores_height() {
        let a = Vec3::new(3., 100., 0.);
        let b = Vec3::new(0., -50., 4.);

        assert_eqf32!(horizontal_distance(a, b), 5.);
    }

    #[test]
    fn normalize_of_zero_vector_is_zero() {
        assert_eq!(normalize_or_zero(Vec3::ZERO), Vec3::ZERO);
        assert_eq!(normalize_or_zero(Vec3::splat(1e-8)), Vec3::ZERO);
    }

    #[test]
    fn redirect_preserves_direction() {
        let v = redirect(Vec3::new(0., 3., 4.), 10.);

        assert_eqf32!(v.y, 6.);
        assert_eqf32!(v.z, 8.);
        assert_eqf32!(v.length(), 10.);
    }

    #[test]
    fn phase_wraps_into_revolution() {
        assert_eqf32!(wrap_phase(TAU + 0.5), 0.5);
        assert_eqf32!(wrap_phase(3. * TAU), 0.);
        assert!(wrap_phase(TAU) < TAU);
    }
}
