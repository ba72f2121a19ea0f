//! # 跟踪器配置
//!
//! 控制周期、超时阈值以及每个轴的 PID 增益。配置在构造跟踪器时一次性提供，
//! 之后不可变；重新配置需要重新构造。
//!
//! 配置可以从 TOML 文件加载：
//!
//! ```toml
//! planning_frame = "base_link"
//! publish_period = 0.01
//! pose_timeout = 0.1
//! windup_limit = 0.05
//!
//! [x]
//! kp = 1.5
//!
//! [angular]
//! kp = 0.5
//! windup_limit = 0.02  # 单轴覆盖
//! ```

use crate::error::{Result, TrackingError};
use crate::types::Axis;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

/// 单轴 PID 增益配置
///
/// 每个受控轴（X、Y、Z、角度幅值）一份，构造控制器后不可变。
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GainConfig {
    /// 比例增益 (Kp)
    pub kp: f64,
    /// 积分增益 (Ki)
    pub ki: f64,
    /// 微分增益 (Kd)
    pub kd: f64,
    /// 积分累积值的钳位上限
    pub windup_limit: f64,
    /// 标称时间步长（秒）
    pub dt: f64,
}

impl GainConfig {
    /// 创建增益配置，积分限制和时间步长使用默认值
    pub fn new(kp: f64, ki: f64, kd: f64) -> Self {
        GainConfig {
            kp,
            ki,
            kd,
            ..Self::default()
        }
    }

    /// 设置积分限制
    pub fn with_windup_limit(mut self, windup_limit: f64) -> Self {
        self.windup_limit = windup_limit;
        self
    }

    /// 设置标称时间步长（秒）
    pub fn with_dt(mut self, dt: f64) -> Self {
        self.dt = dt;
        self
    }

    fn validate(&self, name: &str) -> Result<()> {
        if !(self.kp.is_finite() && self.ki.is_finite() && self.kd.is_finite()) {
            return Err(TrackingError::InvalidConfig(format!(
                "{name}: gains must be finite (kp={}, ki={}, kd={})",
                self.kp, self.ki, self.kd
            )));
        }
        if !self.windup_limit.is_finite() || self.windup_limit < 0.0 {
            return Err(TrackingError::InvalidConfig(format!(
                "{name}: windup_limit must be >= 0 (got {})",
                self.windup_limit
            )));
        }
        Ok(())
    }
}

impl Default for GainConfig {
    fn default() -> Self {
        Self {
            kp: 1.0,
            ki: 0.0,
            kd: 0.0,
            windup_limit: 0.1,
            dt: 0.001,
        }
    }
}

/// 配置文件中的单轴增益
///
/// `windup_limit` 为空时使用 [`TrackerConfig::windup_limit`]。
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AxisGains {
    pub kp: f64,
    pub ki: f64,
    pub kd: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub windup_limit: Option<f64>,
}

impl AxisGains {
    pub const fn new(kp: f64, ki: f64, kd: f64) -> Self {
        AxisGains {
            kp,
            ki,
            kd,
            windup_limit: None,
        }
    }
}

impl Default for AxisGains {
    fn default() -> Self {
        AxisGains::new(1.5, 0.0, 0.0)
    }
}

/// 位姿跟踪器配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TrackerConfig {
    /// 参考坐标系（目标位姿应已转换到该坐标系）
    pub planning_frame: String,

    /// 控制周期（秒）
    ///
    /// 例如：0.01 表示 100Hz
    pub publish_period: f64,

    /// 位姿新鲜度阈值（秒）
    ///
    /// 缓存的年龄 >= 此值时视为过期。
    pub pose_timeout: f64,

    /// 等待首个目标位姿的时间窗口（秒）
    pub startup_timeout: f64,

    /// 等待阶段的轮询间隔（秒）
    pub wait_poll_interval: f64,

    /// 默认积分限制（各轴未覆盖时使用）
    pub windup_limit: f64,

    /// X 轴增益
    pub x: AxisGains,
    /// Y 轴增益
    pub y: AxisGains,
    /// Z 轴增益
    pub z: AxisGains,
    /// 角度幅值增益
    pub angular: AxisGains,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            planning_frame: "base_link".to_string(),
            publish_period: 0.01,    // 100Hz
            pose_timeout: 0.1,       // 100ms
            startup_timeout: 0.1,    // 与 pose_timeout 相同
            wait_poll_interval: 0.001,
            windup_limit: 0.05,
            x: AxisGains::default(),
            y: AxisGains::default(),
            z: AxisGains::default(),
            angular: AxisGains::new(0.5, 0.0, 0.0),
        }
    }
}

impl TrackerConfig {
    /// 从 TOML 字符串解析
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: TrackerConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// 从文件加载配置
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// 序列化为 TOML
    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// 保存配置到文件
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        fs::write(path, self.to_toml_string()?)?;
        Ok(())
    }

    /// 校验配置
    pub fn validate(&self) -> Result<()> {
        if self.planning_frame.is_empty() {
            return Err(TrackingError::InvalidConfig(
                "planning_frame must not be empty".to_string(),
            ));
        }

        for (name, value) in [
            ("publish_period", self.publish_period),
            ("pose_timeout", self.pose_timeout),
            ("wait_poll_interval", self.wait_poll_interval),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(TrackingError::InvalidConfig(format!(
                    "Invalid {name}: {value} (must be > 0)"
                )));
            }
        }
        if !self.startup_timeout.is_finite() || self.startup_timeout < 0.0 {
            return Err(TrackingError::InvalidConfig(format!(
                "Invalid startup_timeout: {} (must be >= 0)",
                self.startup_timeout
            )));
        }
        if self.publish_period < 1e-4 {
            tracing::warn!(
                "Very high control frequency: {:.0} Hz. This may cause performance issues.",
                1.0 / self.publish_period
            );
        }

        for axis in Axis::ALL {
            self.linear_gains(axis).validate(axis.name())?;
        }
        self.angular_gains().validate("angular")
    }

    /// 控制周期
    pub fn period(&self) -> Duration {
        secs(self.publish_period)
    }

    /// 位姿新鲜度阈值
    pub fn pose_timeout(&self) -> Duration {
        secs(self.pose_timeout)
    }

    /// 等待首个目标位姿的时间窗口
    pub fn startup_timeout(&self) -> Duration {
        secs(self.startup_timeout)
    }

    /// 等待阶段的轮询间隔
    pub fn wait_poll_interval(&self) -> Duration {
        secs(self.wait_poll_interval)
    }

    /// 线性轴的增益配置（`dt` 为控制周期）
    pub fn linear_gains(&self, axis: Axis) -> GainConfig {
        let gains = match axis {
            Axis::X => &self.x,
            Axis::Y => &self.y,
            Axis::Z => &self.z,
        };
        self.resolve(gains)
    }

    /// 角度幅值的增益配置
    pub fn angular_gains(&self) -> GainConfig {
        self.resolve(&self.angular)
    }

    fn resolve(&self, gains: &AxisGains) -> GainConfig {
        GainConfig::new(gains.kp, gains.ki, gains.kd)
            .with_windup_limit(gains.windup_limit.unwrap_or(self.windup_limit))
            .with_dt(self.publish_period)
    }
}

fn secs(value: f64) -> Duration {
    Duration::try_from_secs_f64(value).unwrap_or_default()
}
