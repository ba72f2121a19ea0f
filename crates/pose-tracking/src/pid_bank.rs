//! PID 控制器组
//!
//! 每个受控轴一个独立的 [`PidController`]：X/Y/Z 线性轴 + 一个角度幅值控制器。
//! 各控制器的内部状态互相独立，由跟踪循环的单一执行上下文独占，不需要加锁。

use crate::config::{GainConfig, TrackerConfig};
use crate::pid::PidController;
use crate::types::Axis;
use std::time::Duration;

/// PID 控制器组
#[derive(Debug, Clone)]
pub struct PidBank {
    /// 线性轴控制器 [X, Y, Z]
    linear: [PidController; 3],
    /// 角度幅值控制器
    angular: PidController,
}

impl PidBank {
    /// 从每个轴各自的增益配置构造
    pub fn new(x: GainConfig, y: GainConfig, z: GainConfig, angular: GainConfig) -> Self {
        PidBank {
            linear: [
                PidController::new(x),
                PidController::new(y),
                PidController::new(z),
            ],
            angular: PidController::new(angular),
        }
    }

    /// 从跟踪器配置构造
    pub fn from_config(config: &TrackerConfig) -> Self {
        Self::new(
            config.linear_gains(Axis::X),
            config.linear_gains(Axis::Y),
            config.linear_gains(Axis::Z),
            config.angular_gains(),
        )
    }

    /// 计算线性轴的速度命令
    pub fn compute_linear(&mut self, axis: Axis, error: f64, dt: Duration) -> f64 {
        self.linear[axis.index()].compute(error, dt)
    }

    /// 计算角速度幅值
    pub fn compute_angular_magnitude(&mut self, error: f64, dt: Duration) -> f64 {
        self.angular.compute(error, dt)
    }

    /// 重置全部四个控制器
    pub fn reset_all(&mut self) {
        for pid in &mut self.linear {
            pid.reset();
        }
        self.angular.reset();
    }

    /// 线性轴控制器（只读）
    pub fn linear(&self, axis: Axis) -> &PidController {
        &self.linear[axis.index()]
    }

    /// 角度控制器（只读）
    pub fn angular(&self) -> &PidController {
        &self.angular
    }

    /// 各控制器的积分项 `[x, y, z, angular]`
    ///
    /// 用于调试和监控。
    pub fn integral_terms(&self) -> [f64; 4] {
        [
            self.linear[0].integral_term(),
            self.linear[1].integral_term(),
            self.linear[2].integral_term(),
            self.angular.integral_term(),
        ]
    }
}
