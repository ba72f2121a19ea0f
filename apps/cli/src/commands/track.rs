//! 跟踪命令
//!
//! 在仿真机械臂上运行一次位姿跟踪会话：后台任务按固定频率重发目标位姿，
//! 会话本身在 blocking 线程中运行，Ctrl+C 或超过最长时间时请求停止。

use super::config::load_config;
use crate::validation::{parse_pose, period_from_rate, tolerance};
use anyhow::{Context, Result};
use clap::Args;
use pose_tracking::prelude::*;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// 跟踪命令参数
#[derive(Args, Debug)]
pub struct TrackCommand {
    /// 目标位姿：x,y,z 或 x,y,z,roll,pitch,yaw（米 / 弧度）
    /// 例如：0.3,0,0.3,0,0,1.57
    #[arg(short, long, allow_hyphen_values = true)]
    pub target: String,

    /// 仿真机械臂的起始位姿（格式同 --target）
    #[arg(long, default_value = "0,0,0", allow_hyphen_values = true)]
    pub start: String,

    /// 位置容差（米，三个轴相同）
    #[arg(long, default_value_t = 0.01)]
    pub linear_tolerance: f64,

    /// 角度容差（弧度）
    #[arg(long, default_value_t = 0.1)]
    pub angular_tolerance: f64,

    /// 配置文件（覆盖默认路径）
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// 目标位姿重发频率（Hz）
    #[arg(long, default_value_t = 50.0)]
    pub republish_hz: f64,

    /// 最长运行时间（秒），超时后请求停止
    #[arg(long, default_value_t = 30.0)]
    pub max_duration: f64,
}

impl TrackCommand {
    pub async fn execute(self) -> Result<()> {
        let config = load_config(self.config.as_deref())?;
        let frame = config.planning_frame.clone();

        let target = parse_pose(&self.target, "target")?.to_pose(&frame);
        let start = Transform::from_pose(&parse_pose(&self.start, "start")?.to_pose(&frame));
        let tolerance = tolerance(self.linear_tolerance, self.angular_tolerance)?;
        let republish = period_from_rate(self.republish_hz, "republish-hz")?;
        let max_duration = Duration::try_from_secs_f64(self.max_duration)
            .with_context(|| format!("max-duration 无效: {}", self.max_duration))?;

        let arm = Arc::new(SimulatedArm::new(start, config.publish_period));
        let mut tracker = PoseTrackerBuilder::new(config)
            .sampler(Arc::clone(&arm))
            .sink(Arc::clone(&arm))
            .build()
            .context("创建跟踪器失败")?;

        println!("🎯 目标: {}", target);
        println!("🤖 起点: {}", start);

        // 目标位姿生产者
        let store = tracker.target_store();
        let publisher = tokio::spawn(async move {
            let mut interval = tokio::time::interval(republish);
            loop {
                interval.tick().await;
                store.set(target.clone());
            }
        });

        // Ctrl+C → 请求停止
        let stop = tracker.stop_handle();
        let ctrl_c = tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                println!("\n收到退出信号，正在停止...");
                stop.request_stop();
            }
        });

        // 超过最长时间 → 请求停止
        let stop = tracker.stop_handle();
        let deadline = tokio::spawn(async move {
            tokio::time::sleep(max_duration).await;
            tracing::warn!("Max duration {:?} reached, requesting stop", max_duration);
            stop.request_stop();
        });

        let (status, stats) = tokio::task::spawn_blocking(move || {
            let status = tracker.move_to_pose(&tolerance);
            (status, tracker.last_session())
        })
        .await
        .context("跟踪任务异常退出")?;

        publisher.abort();
        ctrl_c.abort();
        deadline.abort();

        println!();
        println!("📊 结果: {} (code {})", status, status.code());
        if let Some(stats) = stats {
            println!("  周期数: {}", stats.ticks);
            println!("  已发布命令: {}", stats.commands_published);
            println!("  采样失败: {}", stats.sample_failures);
            println!("  超时周期: {}", stats.overruns);
            println!("  耗时: {:.3} s", stats.elapsed.as_secs_f64());
        }
        println!("  终点: {}", arm.pose());

        if status.is_success() {
            println!("✅ 已到达目标位姿");
            Ok(())
        } else {
            anyhow::bail!("跟踪未完成: {}", status)
        }
    }
}
