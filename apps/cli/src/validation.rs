//! 输入验证模块
//!
//! 解析命令行中的位姿、容差和频率参数。

use anyhow::{Context, Result};
use pose_tracking::{Pose, ToleranceSpec};
use std::time::Duration;

/// `x,y,z,roll,pitch,yaw` 形式的位姿参数
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PoseArg {
    pub position: [f64; 3],
    pub rpy: [f64; 3],
}

impl PoseArg {
    /// 转换为指定坐标系下的位姿
    pub fn to_pose(self, frame_id: &str) -> Pose {
        let [x, y, z] = self.position;
        let [roll, pitch, yaw] = self.rpy;
        Pose::from_position_rpy(frame_id, x, y, z, roll, pitch, yaw)
    }
}

/// 解析逗号分隔的浮点数列表
fn parse_floats(input: &str, name: &str) -> Result<Vec<f64>> {
    let values: Vec<f64> = input
        .split(',')
        .map(|s| s.trim().parse::<f64>())
        .collect::<Result<Vec<_>, _>>()
        .with_context(|| format!("解析 {} 失败: {}", name, input))?;

    for (i, v) in values.iter().enumerate() {
        if !v.is_finite() {
            anyhow::bail!(
                "{} 第 {} 个分量无效: {}",
                name,
                i + 1,
                if v.is_nan() { "NaN" } else { "无穷大" }
            );
        }
    }

    Ok(values)
}

/// 解析位姿参数
///
/// 接受 3 个分量（仅位置，姿态为单位旋转）或 6 个分量（位置 + RPY，弧度）。
pub fn parse_pose(input: &str, name: &str) -> Result<PoseArg> {
    let values = parse_floats(input, name)?;

    match values.as_slice() {
        [x, y, z] => Ok(PoseArg {
            position: [*x, *y, *z],
            rpy: [0.0; 3],
        }),
        [x, y, z, roll, pitch, yaw] => Ok(PoseArg {
            position: [*x, *y, *z],
            rpy: [*roll, *pitch, *yaw],
        }),
        _ => anyhow::bail!(
            "{} 需要 3 个（x,y,z）或 6 个（x,y,z,roll,pitch,yaw）分量，得到 {} 个",
            name,
            values.len()
        ),
    }
}

/// 构造容差
///
/// 容差必须为正：严格小于比较下，零容差永远无法满足。
pub fn tolerance(linear: f64, angular: f64) -> Result<ToleranceSpec> {
    for (name, value) in [("linear tolerance", linear), ("angular tolerance", angular)] {
        if !value.is_finite() || value <= 0.0 {
            anyhow::bail!("{} 必须为正数，得到 {}", name, value);
        }
    }
    Ok(ToleranceSpec::uniform(linear, angular))
}

/// 由频率（Hz）换算周期
///
/// 频率必须为正，且换算出的周期在 `Duration` 可表示范围内并且不为零。
pub fn period_from_rate(rate: f64, name: &str) -> Result<Duration> {
    if !rate.is_finite() || rate <= 0.0 {
        anyhow::bail!("{} 必须为正数，得到 {}", name, rate);
    }

    let period = Duration::try_from_secs_f64(1.0 / rate)
        .with_context(|| format!("{} 过小，周期超出范围: {} Hz", name, rate))?;
    if period.is_zero() {
        anyhow::bail!("{} 过大，周期不足 1ns: {} Hz", name, rate);
    }

    Ok(period)
}
