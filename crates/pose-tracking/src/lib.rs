//! Pose Tracking - 笛卡尔位姿跟踪伺服
//!
//! 以固定频率比较末端执行器的实测位姿和一个（可能持续移动的）目标位姿，
//! 通过每轴独立的 PID 控制器合成速度命令，直到误差落入容差范围、
//! 数据过期或调用方请求停止。
//!
//! # 架构设计
//!
//! 从底层到高层：
//!
//! - **数据层** (`types`, `config`): 位姿、变换、速度命令、增益与超时配置
//! - **控制层** (`pid`, `pid_bank`, `twist`, `tolerance`): PID、速度合成、容差检查
//! - **共享状态** (`store`): 目标位姿和末端位姿的原子快照缓存
//! - **会话层** (`tracking`): 等待首个位姿、闭环跟踪、终止与复位
//! - **外部接口** (`io`, `sim`): 采样器 / 命令接收端 Trait，以及仿真机械臂
//!
//! # 快速开始
//!
//! ```rust,no_run
//! use pose_tracking::prelude::*;
//! use std::sync::Arc;
//!
//! let arm = Arc::new(SimulatedArm::new(Transform::identity(), 0.01));
//! let mut tracker = PoseTrackerBuilder::new(TrackerConfig::default())
//!     .sampler(Arc::clone(&arm))
//!     .sink(Arc::clone(&arm))
//!     .build()?;
//!
//! // 目标位姿由其他线程持续写入
//! let store = tracker.target_store();
//! std::thread::spawn(move || loop {
//!     store.set(Pose::from_position_rpy("base_link", 0.05, 0.0, 0.02, 0.0, 0.0, 0.2));
//!     std::thread::sleep(std::time::Duration::from_millis(10));
//! });
//!
//! let status = tracker.move_to_pose(&ToleranceSpec::uniform(0.01, 0.1));
//! assert_eq!(status, TrackingStatus::Success);
//! # Ok::<(), pose_tracking::TrackingError>(())
//! ```

pub mod config;
pub mod error;
pub mod io;
pub mod pid;
pub mod pid_bank;
pub mod sim;
pub mod status;
pub mod store;
pub mod tolerance;
pub mod tracking;
pub mod twist;
pub mod types;

// Prelude 模块
pub mod prelude;

pub use config::{AxisGains, GainConfig, TrackerConfig};
pub use error::TrackingError;
pub use io::{ChannelSink, CommandSink, PoseSampler};
pub use status::{TrackingState, TrackingStatus};
pub use tolerance::ToleranceSpec;
pub use tracking::{PoseTracker, PoseTrackerBuilder, SessionStats, ShutdownToken, StopHandle};
pub use types::{Axis, Pose, Stamped, Transform, TwistCommand};
