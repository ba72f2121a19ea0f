//! 配置管理命令
//!
//! 生成、检查跟踪器配置文件（TOML）。

use anyhow::{Context, Result};
use clap::Subcommand;
use pose_tracking::TrackerConfig;
use pose_tracking::types::Axis;
use std::fs;
use std::path::{Path, PathBuf};

/// 默认配置文件路径：`<config_dir>/pose-tracking/tracker.toml`
pub fn default_config_path() -> Result<PathBuf> {
    let mut path = dirs::config_dir().ok_or_else(|| anyhow::anyhow!("无法确定配置目录"))?;

    path.push("pose-tracking");
    path.push("tracker.toml");
    Ok(path)
}

/// 加载跟踪器配置
///
/// 显式指定的路径必须存在；未指定时使用默认路径，默认路径不存在则使用内置默认值。
pub fn load_config(path: Option<&Path>) -> Result<TrackerConfig> {
    if let Some(path) = path {
        return TrackerConfig::load_from_file(path)
            .with_context(|| format!("加载配置文件失败: {}", path.display()));
    }

    let path = default_config_path()?;
    if path.exists() {
        tracing::info!("Using config file {}", path.display());
        TrackerConfig::load_from_file(&path)
            .with_context(|| format!("加载配置文件失败: {}", path.display()))
    } else {
        Ok(TrackerConfig::default())
    }
}

/// 配置命令
#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// 打印默认配置（TOML）
    Default,

    /// 写入默认配置文件
    Init {
        /// 输出路径（默认：用户配置目录）
        path: Option<PathBuf>,

        /// 覆盖已有文件
        #[arg(long)]
        force: bool,
    },

    /// 检查配置文件
    Check {
        /// 配置文件路径（默认：用户配置目录）
        path: Option<PathBuf>,
    },

    /// 显示默认配置文件路径
    Path,
}

impl ConfigCommand {
    pub async fn execute(self) -> Result<()> {
        match self {
            ConfigCommand::Default => Self::default_(),

            ConfigCommand::Init { path, force } => Self::init_(path, force),

            ConfigCommand::Check { path } => Self::check_(path),

            ConfigCommand::Path => {
                println!("{}", default_config_path()?.display());
                Ok(())
            },
        }
    }

    fn default_() -> Result<()> {
        let content = TrackerConfig::default().to_toml_string().context("序列化默认配置失败")?;
        print!("{}", content);
        Ok(())
    }

    fn init_(path: Option<PathBuf>, force: bool) -> Result<()> {
        let path = match path {
            Some(path) => path,
            None => default_config_path()?,
        };

        if path.exists() && !force {
            anyhow::bail!("配置文件已存在: {}（使用 --force 覆盖）", path.display());
        }

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).context("创建配置目录失败")?;
        }

        TrackerConfig::default().save_to_file(&path).context("写入配置文件失败")?;
        println!("✅ 已写入默认配置: {}", path.display());
        Ok(())
    }

    fn check_(path: Option<PathBuf>) -> Result<()> {
        let path = match path {
            Some(path) => path,
            None => default_config_path()?,
        };

        let config = TrackerConfig::load_from_file(&path)
            .with_context(|| format!("配置文件无效: {}", path.display()))?;

        println!("✅ 配置有效: {}", path.display());
        println!("  参考坐标系: {}", config.planning_frame);
        println!(
            "  控制周期: {:.4} s ({:.0} Hz)",
            config.publish_period,
            1.0 / config.publish_period
        );
        println!("  位姿超时: {:.3} s", config.pose_timeout);
        println!("  启动等待: {:.3} s", config.startup_timeout);
        for axis in Axis::ALL {
            let gains = config.linear_gains(axis);
            println!(
                "  {}: kp={} ki={} kd={} windup={}",
                axis, gains.kp, gains.ki, gains.kd, gains.windup_limit
            );
        }
        let gains = config.angular_gains();
        println!(
            "  angular: kp={} ki={} kd={} windup={}",
            gains.kp, gains.ki, gains.kd, gains.windup_limit
        );

        Ok(())
    }
}
