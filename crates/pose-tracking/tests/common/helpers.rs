//! 测试辅助函数
//!
//! 目标位姿生产者、超时看门狗以及标准测试配置。

use pose_tracking::prelude::*;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// 安装测试用日志（`RUST_LOG` 控制级别，重复调用无副作用）
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// 标准测试配置
///
/// 超时比默认值宽松，避免在负载较高的 CI 机器上误判过期。
pub fn test_config() -> TrackerConfig {
    TrackerConfig {
        pose_timeout: 0.5,
        startup_timeout: 0.5,
        ..TrackerConfig::default()
    }
}

/// 持续发布目标位姿的后台线程
pub struct TargetPublisher {
    done: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl TargetPublisher {
    /// 每 `interval` 写入一次 `pose`，直到被丢弃
    pub fn spawn(store: Arc<TargetPoseStore>, pose: Pose, interval: Duration) -> Self {
        let done = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&done);
        let handle = thread::spawn(move || {
            while !flag.load(Ordering::SeqCst) {
                store.set(pose.clone());
                thread::sleep(interval);
            }
        });

        TargetPublisher {
            done,
            handle: Some(handle),
        }
    }
}

impl Drop for TargetPublisher {
    fn drop(&mut self) {
        self.done.store(true, Ordering::SeqCst);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

/// 超时后请求停止，防止测试在不收敛时挂起
pub fn spawn_watchdog(stop: StopHandle, after: Duration) -> JoinHandle<()> {
    thread::spawn(move || {
        thread::sleep(after);
        stop.request_stop();
    })
}
