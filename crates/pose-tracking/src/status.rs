//! 跟踪会话状态码与状态机
//!
//! 会话的终止结果是一个封闭的小枚举，而不是错误：调用方根据状态码决定是否重试。

use num_enum::{IntoPrimitive, TryFromPrimitive};
use std::fmt;

/// 一次跟踪会话的终止结果
///
/// 数值与状态话题上发布的 `i8` 状态码一致。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, IntoPrimitive, TryFromPrimitive)]
#[repr(i8)]
pub enum TrackingStatus {
    /// 到达容差范围内
    Success = 0,
    /// 启动窗口内未收到新的目标位姿
    NoRecentTargetPose = 1,
    /// 会话中末端位姿采样停止更新
    NoRecentEndEffectorPose = 2,
    /// 外部请求停止（协作式取消，不是错误）
    StopRequested = 3,
}

impl TrackingStatus {
    /// 状态码
    pub fn code(self) -> i8 {
        self.into()
    }

    /// 是否成功
    pub fn is_success(self) -> bool {
        self == Self::Success
    }

    /// 人类可读描述
    pub fn description(self) -> &'static str {
        match self {
            Self::Success => "Success",
            Self::NoRecentTargetPose => "No recent target pose",
            Self::NoRecentEndEffectorPose => "No recent end effector pose",
            Self::StopRequested => "Stop requested",
        }
    }
}

impl fmt::Display for TrackingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

/// 跟踪循环状态
///
/// ```text
/// Idle → WaitingForFirstPose → Tracking → Finished(status)
///                  └──────────────────────→ Finished(NoRecentTargetPose)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TrackingState {
    /// 尚未开始任何会话
    #[default]
    Idle,
    /// 等待首个目标位姿和末端位姿
    WaitingForFirstPose,
    /// 闭环跟踪中
    Tracking,
    /// 会话已终止
    Finished(TrackingStatus),
}

impl TrackingState {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Finished(_))
    }
}
