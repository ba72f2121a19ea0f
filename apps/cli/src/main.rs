//! # Pose Tracking CLI
//!
//! 在仿真机械臂上运行位姿跟踪会话、管理跟踪器配置。
//!
//! ```bash
//! # 生成默认配置
//! pose-tracking-cli config init
//!
//! # 从原点跟踪到目标位姿（x,y,z,roll,pitch,yaw）
//! pose-tracking-cli track --target 0.05,0,0.02,0,0,0.2
//!
//! # 查看会话日志
//! RUST_LOG=pose_tracking=debug pose-tracking-cli track --target 0.05,0,0
//! ```

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;
mod validation;

use commands::{ConfigCommand, TrackCommand};

/// Pose Tracking CLI - 位姿跟踪命令行工具
#[derive(Parser, Debug)]
#[command(name = "pose-tracking-cli")]
#[command(about = "Run pose tracking sessions against a simulated arm", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// 配置管理
    #[command(subcommand)]
    Config(ConfigCommand),

    /// 跟踪目标位姿直到到达、超时或被中断
    Track {
        #[command(flatten)]
        args: TrackCommand,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // 初始化日志
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("pose_tracking_cli=info".parse()?),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Config(cmd) => cmd.execute().await,

        Commands::Track { args } => args.execute().await,
    }
}
