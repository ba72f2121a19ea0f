//! 外部协作者接口
//!
//! 跟踪核心只依赖两个协作者：
//!
//! - [`PoseSampler`]: 采样末端执行器当前的变换（已在参考坐标系下）
//! - [`CommandSink`]: 接收速度命令（发后即忘，不等待确认）
//!
//! 底层运动执行器、坐标变换服务、消息传输都在这两个接口之外。

use crate::types::{Transform, TwistCommand};
use crossbeam_channel::{Sender, TrySendError};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// 末端位姿采样器
///
/// 每个控制周期调用一次（等待阶段也会调用）。实现必须及时返回：
/// 要么给出新的变换，要么失败；失败时缓存保持不变（逐渐过期）。
pub trait PoseSampler: Send + Sync {
    /// 采样错误类型
    type Error: std::error::Error + Send + Sync + 'static;

    /// 采样当前末端变换
    fn sample(&self) -> Result<Transform, Self::Error>;
}

impl<S: PoseSampler + ?Sized> PoseSampler for Arc<S> {
    type Error = S::Error;

    fn sample(&self) -> Result<Transform, Self::Error> {
        (**self).sample()
    }
}

/// 速度命令接收端
pub trait CommandSink {
    /// 发布速度命令（发后即忘）
    fn publish(&self, command: TwistCommand);
}

impl<K: CommandSink + ?Sized> CommandSink for Arc<K> {
    fn publish(&self, command: TwistCommand) {
        (**self).publish(command)
    }
}

/// 基于 crossbeam 通道的命令接收端
///
/// 使用 `try_send`：通道满或已断开时丢弃命令并计数，从不阻塞控制循环。
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: Sender<TwistCommand>,
    dropped: Arc<AtomicU64>,
}

impl ChannelSink {
    pub fn new(tx: Sender<TwistCommand>) -> Self {
        ChannelSink {
            tx,
            dropped: Arc::new(AtomicU64::new(0)),
        }
    }

    /// 被丢弃的命令数
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}

impl CommandSink for ChannelSink {
    fn publish(&self, command: TwistCommand) {
        match self.tx.try_send(command) {
            Ok(()) => {},
            Err(TrySendError::Full(_)) => {
                self.dropped.fetch_add(1, Ordering::Relaxed);
                tracing::warn!("Command channel full, dropping twist command");
            },
            Err(TrySendError::Disconnected(_)) => {
                self.dropped.fetch_add(1, Ordering::Relaxed);
                tracing::debug!("Command channel disconnected, dropping twist command");
            },
        }
    }
}
