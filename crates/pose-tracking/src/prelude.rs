//! Prelude - 常用类型的便捷导入
//!
//! ```rust
//! use pose_tracking::prelude::*;
//! ```

// 会话
pub use crate::tracking::{PoseTracker, PoseTrackerBuilder, SessionStats, ShutdownToken, StopHandle};
pub use crate::status::{TrackingState, TrackingStatus};

// 配置与数据类型
pub use crate::config::{AxisGains, GainConfig, TrackerConfig};
pub use crate::tolerance::ToleranceSpec;
pub use crate::types::{Axis, Pose, Stamped, Transform, TwistCommand};

// 外部接口
pub use crate::io::{ChannelSink, CommandSink, PoseSampler};
pub use crate::sim::SimulatedArm;
pub use crate::store::TargetPoseStore;

// 错误类型
pub use crate::error::TrackingError;
