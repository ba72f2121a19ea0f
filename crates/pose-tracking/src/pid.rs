//! PID Controller - 单轴比例-积分-微分控制器
//!
//! 位姿跟踪中每个受控轴（X/Y/Z 线性轴、角度幅值）各持有一个实例。
//!
//! # 算法
//!
//! ```text
//! output = Kp * e + Ki * clamp(∫e dt, ±windup_limit) + Kd * de/dt
//! ```
//!
//! 其中：
//! - `e` = 目标 - 当前（误差）
//! - `∫e dt` = 累积误差，钳位到 `[-windup_limit, +windup_limit]` 后再乘以 `Ki`
//! - `de/dt` = 误差变化率，第一次调用（或 `reset()` 之后）为 0
//!
//! # 特性
//!
//! - **积分饱和保护**: 积分项的绝对值永远不超过 `Ki * windup_limit`
//! - **dt 保护**: `dt == 0` 时返回零输出且不修改内部状态，不会产生 NaN/Inf
//! - **确定性**: 相同的 `(error, dt)` 序列总是产生相同的输出序列
//!
//! # 示例
//!
//! ```rust
//! use pose_tracking::config::GainConfig;
//! use pose_tracking::pid::PidController;
//! use std::time::Duration;
//!
//! let gains = GainConfig::new(2.0, 0.1, 0.0).with_windup_limit(0.5);
//! let mut pid = PidController::new(gains);
//!
//! let output = pid.compute(0.25, Duration::from_millis(10));
//! assert!(output > 0.0);
//! ```

use crate::config::GainConfig;
use std::time::Duration;

/// PID 控制器
///
/// 状态（积分累积值、上一次误差）由单个轴独占，只能通过 `reset()` 清零。
#[derive(Debug, Clone)]
pub struct PidController {
    /// 增益配置（构造后不可变）
    gains: GainConfig,

    /// 积分累积值（已钳位，未乘 Ki）
    integral: f64,

    /// 上一次的误差（用于计算微分）
    ///
    /// `None` 表示自构造或重置以来尚未计算过。
    last_error: Option<f64>,
}

impl PidController {
    /// 创建新的 PID 控制器
    pub fn new(gains: GainConfig) -> Self {
        PidController {
            gains,
            integral: 0.0,
            last_error: None,
        }
    }

    /// 计算一步控制输出
    ///
    /// # 参数
    ///
    /// - `error`: 当前误差（目标 - 当前）
    /// - `dt`: 时间步长（通常为控制循环的标称周期）
    pub fn compute(&mut self, error: f64, dt: Duration) -> f64 {
        let dt_sec = dt.as_secs_f64();

        // 防止除零
        if dt_sec <= 0.0 {
            tracing::warn!(
                "PID controller received zero dt: {:?}, returning zero output",
                dt
            );
            return 0.0;
        }
        if !error.is_finite() {
            tracing::warn!("PID controller received non-finite error: {}, returning zero output", error);
            return 0.0;
        }

        // 1. 比例项（P）
        let p_term = self.gains.kp * error;

        // 2. 积分项（I）+ 饱和保护
        let limit = self.gains.windup_limit.abs();
        self.integral = (self.integral + error * dt_sec).clamp(-limit, limit);
        let i_term = self.gains.ki * self.integral;

        // 3. 微分项（D），首次调用没有历史误差
        let d_term = match self.last_error {
            Some(last) => self.gains.kd * (error - last) / dt_sec,
            None => 0.0,
        };

        // 4. 更新上一次误差
        self.last_error = Some(error);

        let output = p_term + i_term + d_term;
        if output.is_finite() { output } else { 0.0 }
    }

    /// 完全重置控制器状态（积分项 + 微分历史）
    pub fn reset(&mut self) {
        self.integral = 0.0;
        self.last_error = None;
    }

    /// 获取增益配置
    pub fn gains(&self) -> &GainConfig {
        &self.gains
    }

    /// 获取积分累积值（未乘 Ki）
    ///
    /// 用于调试和监控。
    pub fn integral(&self) -> f64 {
        self.integral
    }

    /// 获取积分项对输出的贡献（`Ki * integral`）
    pub fn integral_term(&self) -> f64 {
        self.gains.ki * self.integral
    }

    /// 上一次的误差
    pub fn last_error(&self) -> Option<f64> {
        self.last_error
    }
}
