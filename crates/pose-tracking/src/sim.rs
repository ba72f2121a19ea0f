//! 仿真机械臂
//!
//! 一阶运动学模型：每收到一条速度命令，按固定步长把末端变换积分一步。
//! 同时实现 [`PoseSampler`] 和 [`CommandSink`]，通过 `Arc<SimulatedArm>`
//! 可以同时交给跟踪器的两端，用于命令行演示和集成测试。
//!
//! ```text
//! p' = p + v * dt
//! q' = exp(ω * dt) * q
//! ```

use crate::io::{CommandSink, PoseSampler};
use crate::types::{Transform, TwistCommand};
use nalgebra::UnitQuaternion;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use thiserror::Error;

/// 仿真采样错误
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimError {
    /// 采样被禁用（模拟坐标变换服务失联）
    #[error("Simulated sampling is disabled")]
    SamplingDisabled,
}

/// 仿真机械臂
#[derive(Debug)]
pub struct SimulatedArm {
    /// 末端当前变换
    pose: Mutex<Transform>,
    /// 积分步长（秒）
    step: f64,
    sampling_enabled: AtomicBool,
    published: AtomicU64,
    last_command: Mutex<Option<TwistCommand>>,
}

impl SimulatedArm {
    /// 创建仿真机械臂
    ///
    /// `step` 通常取跟踪器的控制周期。
    pub fn new(initial: Transform, step: f64) -> Self {
        SimulatedArm {
            pose: Mutex::new(initial),
            step,
            sampling_enabled: AtomicBool::new(true),
            published: AtomicU64::new(0),
            last_command: Mutex::new(None),
        }
    }

    /// 当前末端变换
    pub fn pose(&self) -> Transform {
        *self.pose.lock()
    }

    /// 直接设置末端变换（模拟外力扰动）
    pub fn set_pose(&self, pose: Transform) {
        *self.pose.lock() = pose;
    }

    /// 启用/禁用采样
    pub fn set_sampling_enabled(&self, enabled: bool) {
        self.sampling_enabled.store(enabled, Ordering::SeqCst);
    }

    /// 收到的命令数
    pub fn published(&self) -> u64 {
        self.published.load(Ordering::Relaxed)
    }

    /// 最近一条命令
    pub fn last_command(&self) -> Option<TwistCommand> {
        self.last_command.lock().clone()
    }

    fn integrate(&self, command: &TwistCommand) {
        if !command.is_finite() {
            tracing::warn!("Ignoring non-finite twist command: {}", command);
            return;
        }

        let mut pose = self.pose.lock();
        pose.translation += command.linear * self.step;
        pose.rotation = UnitQuaternion::from_scaled_axis(command.angular * self.step) * pose.rotation;
    }
}

impl PoseSampler for SimulatedArm {
    type Error = SimError;

    fn sample(&self) -> Result<Transform, SimError> {
        if self.sampling_enabled.load(Ordering::SeqCst) {
            Ok(self.pose())
        } else {
            Err(SimError::SamplingDisabled)
        }
    }
}

impl CommandSink for SimulatedArm {
    fn publish(&self, command: TwistCommand) {
        self.integrate(&command);
        self.published.fetch_add(1, Ordering::Relaxed);
        *self.last_command.lock() = Some(command);
    }
}
