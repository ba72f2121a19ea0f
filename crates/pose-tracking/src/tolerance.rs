//! 容差检查
//!
//! 判断末端是否已到达目标位姿：三个位置分量各自的容差 + 一个角度容差。
//!
//! 角度误差不在这里重新计算，而是使用上一次合成速度命令时缓存的值
//! （见 [`TwistSynthesizer::angular_error`](crate::twist::TwistSynthesizer::angular_error)）。
//! 因此某个周期的容差检查看到的是上一周期的角度误差。

use crate::types::{Pose, Transform};
use nalgebra::Vector3;

/// 到达容差
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ToleranceSpec {
    /// 各轴位置容差（米）
    pub positional: Vector3<f64>,
    /// 角度容差（弧度）
    pub angular: f64,
}

impl ToleranceSpec {
    pub fn new(positional: Vector3<f64>, angular: f64) -> Self {
        ToleranceSpec {
            positional,
            angular,
        }
    }

    /// 三个轴使用相同的位置容差
    pub fn uniform(positional: f64, angular: f64) -> Self {
        Self::new(Vector3::repeat(positional), angular)
    }
}

/// 是否满足容差
///
/// 所有比较都是严格小于：误差恰好等于容差时不满足。
pub fn is_satisfied(
    target: &Pose,
    current: &Transform,
    cached_angular_error: f64,
    tolerance: &ToleranceSpec,
) -> bool {
    let error = target.position - current.translation;

    error
        .iter()
        .zip(tolerance.positional.iter())
        .all(|(e, tol)| e.abs() < *tol)
        && cached_angular_error.abs() < tolerance.angular
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::UnitQuaternion;

    fn target() -> Pose {
        Pose::from_position_rpy("base_link", 0.3, 0.0, 0.3, 0.0, 0.0, 0.0)
    }

    fn at(x: f64, y: f64, z: f64) -> Transform {
        Transform::new(Vector3::new(x, y, z), UnitQuaternion::identity())
    }

    #[test]
    fn test_satisfied_when_equal() {
        let tol = ToleranceSpec::uniform(0.01, 0.01);
        assert!(is_satisfied(&target(), &at(0.3, 0.0, 0.3), 0.0, &tol));
    }

    #[test]
    fn test_single_axis_outside_fails() {
        let tol = ToleranceSpec::uniform(0.01, 0.01);

        assert!(!is_satisfied(&target(), &at(0.32, 0.0, 0.3), 0.0, &tol));
        assert!(!is_satisfied(&target(), &at(0.3, -0.02, 0.3), 0.0, &tol));
        assert!(!is_satisfied(&target(), &at(0.3, 0.0, 0.28), 0.0, &tol));
        assert!(!is_satisfied(&target(), &at(0.3, 0.0, 0.3), 0.02, &tol));
        assert!(!is_satisfied(&target(), &at(0.3, 0.0, 0.3), -0.02, &tol));
    }

    #[test]
    fn test_boundary_is_not_satisfied() {
        let tol = ToleranceSpec::new(Vector3::new(0.5, 0.5, 0.5), 0.25);
        let target = Pose::identity("base_link");

        // 误差恰好等于容差（使用可精确表示的数值）
        assert!(!is_satisfied(&target, &at(0.5, 0.0, 0.0), 0.0, &tol));
        assert!(!is_satisfied(&target, &at(0.0, 0.0, 0.0), 0.25, &tol));
        assert!(is_satisfied(&target, &at(0.0, 0.0, 0.0), 0.125, &tol));
    }

    #[test]
    fn test_per_axis_tolerances() {
        let tol = ToleranceSpec::new(Vector3::new(0.1, 0.01, 0.001), 1.0);
        let target = Pose::identity("base_link");

        assert!(is_satisfied(&target, &at(0.05, 0.005, 0.0005), 0.0, &tol));
        assert!(!is_satisfied(&target, &at(0.05, 0.05, 0.0005), 0.0, &tol));
    }

    #[test]
    fn test_orientation_only_from_cached_error() {
        // 即使实际姿态差很多，只要缓存的角度误差小于容差就视为满足
        let tol = ToleranceSpec::uniform(0.01, 0.01);
        let rotated = Transform::new(
            Vector3::new(0.3, 0.0, 0.3),
            UnitQuaternion::from_euler_angles(0.0, 0.0, 1.0),
        );
        assert!(is_satisfied(&target(), &rotated, 0.0, &tol));
    }
}
