//! 控制核心的属性测试
//!
//! 使用 proptest 验证 PID、姿态误差和容差检查的数学属性。

use nalgebra::{UnitQuaternion, Vector3};
use pose_tracking::config::GainConfig;
use pose_tracking::pid::PidController;
use pose_tracking::tolerance::{ToleranceSpec, is_satisfied};
use pose_tracking::twist::orientation_error;
use pose_tracking::types::{Pose, Transform};
use proptest::prelude::*;
use std::f64::consts::PI;
use std::time::Duration;

fn gains_strategy() -> impl Strategy<Value = GainConfig> {
    (0.0..5.0f64, 0.0..5.0f64, 0.0..1.0f64, 0.001..2.0f64)
        .prop_map(|(kp, ki, kd, windup)| GainConfig::new(kp, ki, kd).with_windup_limit(windup))
}

fn errors_strategy() -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(-10.0..10.0f64, 1..100)
}

proptest! {
    /// 相同的误差序列产生相同的输出序列
    #[test]
    fn pid_is_deterministic(gains in gains_strategy(), errors in errors_strategy(), dt_ms in 1u64..50) {
        let dt = Duration::from_millis(dt_ms);
        let mut a = PidController::new(gains);
        let mut b = PidController::new(gains);

        for e in &errors {
            prop_assert_eq!(a.compute(*e, dt), b.compute(*e, dt));
        }
    }

    /// reset 之后重放序列得到完全相同的输出
    #[test]
    fn pid_reset_reproduces_sequence(gains in gains_strategy(), errors in errors_strategy()) {
        let dt = Duration::from_millis(10);
        let mut pid = PidController::new(gains);

        let first: Vec<f64> = errors.iter().map(|e| pid.compute(*e, dt)).collect();
        pid.reset();
        let second: Vec<f64> = errors.iter().map(|e| pid.compute(*e, dt)).collect();

        prop_assert_eq!(first, second);
    }

    /// 积分项贡献永远不超过 ki * windup_limit
    #[test]
    fn pid_integral_bounded(gains in gains_strategy(), errors in errors_strategy(), dt_ms in 1u64..1000) {
        let dt = Duration::from_millis(dt_ms);
        let mut pid = PidController::new(gains);
        let bound = gains.ki * gains.windup_limit;

        for e in &errors {
            pid.compute(*e, dt);
            prop_assert!(pid.integral_term().abs() <= bound + 1e-12);
        }
    }

    /// 相同姿态的误差角为零
    #[test]
    fn orientation_error_zero_for_equal(roll in -PI..PI, pitch in -1.5..1.5f64, yaw in -PI..PI) {
        let q = UnitQuaternion::from_euler_angles(roll, pitch, yaw);
        let (_, angle) = orientation_error(&q, &q);
        prop_assert!(angle < 1e-9);
    }

    /// 误差角在 [0, π] 内，且旋转轴有限
    #[test]
    fn orientation_error_in_range(
        r1 in -PI..PI, p1 in -1.5..1.5f64, y1 in -PI..PI,
        r2 in -PI..PI, p2 in -1.5..1.5f64, y2 in -PI..PI,
    ) {
        let target = UnitQuaternion::from_euler_angles(r1, p1, y1);
        let current = UnitQuaternion::from_euler_angles(r2, p2, y2);
        let (axis, angle) = orientation_error(&target, &current);

        prop_assert!((0.0..=PI + 1e-9).contains(&angle));
        prop_assert!(axis.iter().all(|v| v.is_finite()));
        prop_assert!((angle - target.angle_to(&current)).abs() < 1e-6);
    }

    /// 任意单个轴超出容差时检查失败
    #[test]
    fn tolerance_single_axis_flip(
        tol in 0.001..1.0f64,
        axis in 0usize..3,
        inside in 0.0..0.99f64,
        outside in 1.01..10.0f64,
    ) {
        let tolerance = ToleranceSpec::uniform(tol, tol);
        let target = Pose::identity("base_link");

        let mut offset = Vector3::repeat(tol * inside);
        let within = Transform::new(offset, UnitQuaternion::identity());
        prop_assert!(is_satisfied(&target, &within, 0.0, &tolerance));

        offset[axis] = tol * outside;
        let beyond = Transform::new(offset, UnitQuaternion::identity());
        prop_assert!(!is_satisfied(&target, &beyond, 0.0, &tolerance));
    }

    /// 缓存的角度误差超出容差时检查失败
    #[test]
    fn tolerance_angular_flip(tol in 0.001..1.0f64, outside in 1.0..10.0f64) {
        let tolerance = ToleranceSpec::uniform(1.0, tol);
        let target = Pose::identity("base_link");
        let current = Transform::identity();

        prop_assert!(!is_satisfied(&target, &current, tol * outside, &tolerance));
    }
}
