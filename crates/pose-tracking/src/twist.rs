//! 速度命令合成
//!
//! 由目标位姿、当前变换和 PID 控制器组计算一条线速度 + 角速度命令。
//!
//! # 姿态误差算法
//!
//! ```text
//! q_err = q_target * q_current⁻¹
//! (axis, angle) = axis_angle(q_err)        // angle ∈ [0, π]，最短旋转
//! |ω| = PID_angular(angle)
//! ω = axis * |ω|
//! ```
//!
//! 角度误差会被缓存下来，供下一次容差检查使用。
//!
//! # 数值稳定性
//!
//! `q_err` 接近单位四元数时旋转轴无法从近零向量归一化得到，此时返回规范轴
//! （单位 X 轴）和角度 0，避免 NaN 扩散。

use crate::pid_bank::PidBank;
use crate::types::{Axis, Pose, Transform, TwistCommand};
use nalgebra::{Unit, UnitQuaternion, Vector3};
use std::time::{Duration, Instant};

/// 小于此角度（弧度）的姿态误差视为零
const ANGLE_EPSILON: f64 = 1e-9;

/// 计算姿态误差的轴角表示
///
/// 返回 `(旋转轴, 角度)`，角度在 `[0, π]` 内；接近零旋转时返回 `(X 轴, 0.0)`。
pub fn orientation_error(
    q_target: &UnitQuaternion<f64>,
    q_current: &UnitQuaternion<f64>,
) -> (Unit<Vector3<f64>>, f64) {
    let q_error = q_target * q_current.inverse();
    let q = q_error.quaternion();

    // angle = 2 * atan2(|v|, |w|)，比 acos(w) 在零附近更稳定
    let imag = q.imag();
    let sin_half = imag.norm();
    let angle = 2.0 * sin_half.atan2(q.w.abs());

    if !angle.is_finite() || angle < ANGLE_EPSILON {
        return (Vector3::x_axis(), 0.0);
    }

    // w < 0 时翻转轴，使角度落在 [0, π]
    let direction = if q.w >= 0.0 { imag } else { -imag };
    match Unit::try_new(direction, 0.0) {
        Some(axis) if axis.iter().all(|v| v.is_finite()) => (axis, angle),
        _ => (Vector3::x_axis(), 0.0),
    }
}

/// 速度命令合成器
///
/// 持有上一次计算得到的角度误差。
#[derive(Debug, Clone, Default)]
pub struct TwistSynthesizer {
    angular_error: f64,
}

impl TwistSynthesizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// 计算速度命令
    ///
    /// 副作用：更新缓存的角度误差，并推进各 PID 控制器的内部状态。
    pub fn compute(
        &mut self,
        target: &Pose,
        current: &Transform,
        pids: &mut PidBank,
        dt: Duration,
    ) -> TwistCommand {
        // 1. 位置：每个轴独立 PID
        let position_error = target.position - current.translation;
        let mut linear = Vector3::zeros();
        for axis in Axis::ALL {
            let i = axis.index();
            linear[i] = pids.compute_linear(axis, position_error[i], dt);
        }

        // 2. 姿态：误差四元数 → 轴角 → 角速度
        let (axis, angle) = orientation_error(&target.orientation, &current.rotation);
        self.angular_error = angle;
        let magnitude = pids.compute_angular_magnitude(angle, dt);
        let angular = axis.into_inner() * magnitude;

        TwistCommand {
            frame_id: target.frame_id.clone(),
            stamp: Instant::now(),
            linear,
            angular,
        }
    }

    /// 上一次计算的角度误差（弧度）
    pub fn angular_error(&self) -> f64 {
        self.angular_error
    }

    /// 清零缓存的角度误差
    pub fn reset(&mut self) {
        self.angular_error = 0.0;
    }
}
