//! 位姿缓存
//!
//! 跟踪循环与外部生产者之间仅有的两份共享可变状态：
//!
//! - [`TargetPoseStore`]: 期望位姿，由外部生产者（消息回调线程等）异步写入
//! - [`EndEffectorPoseCache`]: 末端实测变换，由跟踪循环每个周期轮询采样器更新
//!
//! 两者都使用 `ArcSwapOption` 保存不可变的 `(值, 时间戳)` 快照：
//! - 读取无锁（Wait-Free），永远不会阻塞写入方
//! - 写入是一次原子指针替换，读取方不会观察到写了一半的位姿

use crate::io::PoseSampler;
use crate::types::{Pose, Stamped, Transform};
use arc_swap::ArcSwapOption;
use crossbeam_channel::Receiver;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// 目标位姿缓存
#[derive(Debug, Default)]
pub struct TargetPoseStore {
    latest: ArcSwapOption<Stamped<Pose>>,
    /// 期望的参考坐标系（仅用于诊断）
    expected_frame: Option<String>,
}

impl TargetPoseStore {
    /// 创建空缓存
    pub fn new() -> Self {
        Self::default()
    }

    /// 创建空缓存，写入坐标系不一致的位姿时记录警告
    pub fn with_expected_frame(frame: impl Into<String>) -> Self {
        TargetPoseStore {
            latest: ArcSwapOption::empty(),
            expected_frame: Some(frame.into()),
        }
    }

    /// 写入新的目标位姿，并以当前时间打戳
    ///
    /// 坐标系转换由上游负责，这里只做诊断。
    pub fn set(&self, pose: Pose) {
        if let Some(expected) = &self.expected_frame
            && pose.frame_id != *expected
        {
            tracing::warn!(
                "Target pose frame '{}' differs from planning frame '{}'; \
                 it is expected to be normalized upstream",
                pose.frame_id,
                expected
            );
        }
        tracing::trace!("Target pose updated: {}", pose);
        self.latest.store(Some(Arc::new(Stamped::now(pose))));
    }

    /// 原子快照读取
    pub fn get(&self) -> Option<Arc<Stamped<Pose>>> {
        self.latest.load_full()
    }

    /// 最近 `max_age` 内是否收到过目标位姿
    pub fn is_recent(&self, max_age: Duration) -> bool {
        self.get().is_some_and(|stamped| stamped.is_recent(max_age))
    }

    /// 让当前缓存的目标位姿失效
    ///
    /// 之后的 `is_recent()` 返回 false，直到生产者写入新的位姿。
    pub fn expire(&self) {
        self.latest.store(None);
    }

    /// 启动转发线程：把通道中的位姿逐个写入缓存
    ///
    /// 所有发送端断开后线程退出。
    pub fn spawn_listener(self: &Arc<Self>, rx: Receiver<Pose>) -> std::io::Result<JoinHandle<()>> {
        let store = Arc::clone(self);
        thread::Builder::new()
            .name("target_pose_listener".to_string())
            .spawn(move || {
                for pose in rx.iter() {
                    store.set(pose);
                }
                tracing::debug!("Target pose channel disconnected, listener exiting");
            })
    }
}

/// 末端位姿缓存
///
/// 持有采样器；`try_sample()` 成功时更新缓存和时间戳，失败时缓存保持不变。
#[derive(Debug)]
pub struct EndEffectorPoseCache<S> {
    sampler: S,
    latest: ArcSwapOption<Stamped<Transform>>,
}

impl<S: PoseSampler> EndEffectorPoseCache<S> {
    pub fn new(sampler: S) -> Self {
        EndEffectorPoseCache {
            sampler,
            latest: ArcSwapOption::empty(),
        }
    }

    /// 向采样器请求新的变换
    ///
    /// 返回是否成功更新。
    pub fn try_sample(&self) -> bool {
        match self.sampler.sample() {
            Ok(transform) => {
                tracing::trace!("End effector sampled: {}", transform);
                self.latest.store(Some(Arc::new(Stamped::now(transform))));
                true
            },
            Err(e) => {
                tracing::debug!("End effector sampling failed: {}", e);
                false
            },
        }
    }

    /// 原子快照读取
    pub fn get(&self) -> Option<Arc<Stamped<Transform>>> {
        self.latest.load_full()
    }

    /// 最近 `max_age` 内是否采样成功过
    pub fn is_recent(&self, max_age: Duration) -> bool {
        self.get().is_some_and(|stamped| stamped.is_recent(max_age))
    }

    /// 采样器
    pub fn sampler(&self) -> &S {
        &self.sampler
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};

    #[derive(Debug, thiserror::Error)]
    #[error("sampler offline")]
    struct Offline;

    struct FlakySampler {
        online: AtomicBool,
    }

    impl PoseSampler for FlakySampler {
        type Error = Offline;

        fn sample(&self) -> Result<Transform, Offline> {
            if self.online.load(Ordering::SeqCst) {
                Ok(Transform::identity())
            } else {
                Err(Offline)
            }
        }
    }

    #[test]
    fn test_target_store_initially_empty() {
        let store = TargetPoseStore::new();
        assert!(store.get().is_none());
        assert!(!store.is_recent(Duration::from_secs(1)));
    }

    #[test]
    fn test_target_store_set_and_get() {
        let store = TargetPoseStore::new();
        store.set(Pose::from_position_rpy("base_link", 0.3, 0.0, 0.3, 0.0, 0.0, 0.0));

        let snapshot = store.get().unwrap();
        assert_eq!(snapshot.value.position.x, 0.3);
        assert!(store.is_recent(Duration::from_secs(1)));
    }

    #[test]
    fn test_target_store_staleness() {
        let store = TargetPoseStore::new();
        store.set(Pose::identity("base_link"));

        thread::sleep(Duration::from_millis(30));

        assert!(!store.is_recent(Duration::from_millis(10)));
        assert!(store.is_recent(Duration::from_secs(5)));
    }

    #[test]
    fn test_target_store_expire() {
        let store = TargetPoseStore::new();
        store.set(Pose::identity("base_link"));
        assert!(store.is_recent(Duration::from_secs(1)));

        store.expire();

        assert!(!store.is_recent(Duration::from_secs(1)));
        assert!(store.get().is_none());
    }

    #[test]
    fn test_target_store_snapshot_survives_overwrite() {
        let store = TargetPoseStore::new();
        store.set(Pose::from_position_rpy("base_link", 1.0, 0.0, 0.0, 0.0, 0.0, 0.0));

        let old = store.get().unwrap();
        store.set(Pose::from_position_rpy("base_link", 2.0, 0.0, 0.0, 0.0, 0.0, 0.0));

        // 旧快照不受写入影响
        assert_eq!(old.value.position.x, 1.0);
        assert_eq!(store.get().unwrap().value.position.x, 2.0);
    }

    #[test]
    fn test_target_store_concurrent_writers() {
        let store = Arc::new(TargetPoseStore::new());
        let mut handles = Vec::new();

        for i in 0..4 {
            let store = Arc::clone(&store);
            handles.push(thread::spawn(move || {
                for j in 0..500 {
                    let v = (i * 1000 + j) as f64;
                    store.set(Pose::from_position_rpy("base_link", v, v, v, 0.0, 0.0, 0.0));
                }
            }));
        }

        // 读取方永远看到一致的快照（三个分量相同）
        for _ in 0..2000 {
            if let Some(snapshot) = store.get() {
                let p = snapshot.value.position;
                assert_eq!(p.x, p.y);
                assert_eq!(p.y, p.z);
            }
        }

        for handle in handles {
            handle.join().unwrap();
        }
        assert!(store.get().is_some());
    }

    #[test]
    fn test_target_store_listener() {
        let store = Arc::new(TargetPoseStore::new());
        let (tx, rx) = crossbeam_channel::unbounded();
        let handle = store.spawn_listener(rx).unwrap();

        tx.send(Pose::from_position_rpy("base_link", 0.5, 0.0, 0.0, 0.0, 0.0, 0.0))
            .unwrap();
        drop(tx);
        handle.join().unwrap();

        assert_eq!(store.get().unwrap().value.position.x, 0.5);
    }

    #[test]
    fn test_end_effector_cache_sample() {
        let cache = EndEffectorPoseCache::new(FlakySampler {
            online: AtomicBool::new(true),
        });
        assert!(!cache.is_recent(Duration::from_secs(1)));

        assert!(cache.try_sample());
        assert!(cache.is_recent(Duration::from_secs(1)));
        assert_eq!(cache.get().unwrap().value, Transform::identity());
    }

    #[test]
    fn test_end_effector_cache_failure_keeps_stale_value() {
        let cache = EndEffectorPoseCache::new(FlakySampler {
            online: AtomicBool::new(true),
        });
        assert!(cache.try_sample());
        let first_stamp = cache.get().unwrap().stamp;

        cache.sampler().online.store(false, Ordering::SeqCst);
        thread::sleep(Duration::from_millis(20));

        assert!(!cache.try_sample());
        // 缓存保持不变，逐渐过期
        assert_eq!(cache.get().unwrap().stamp, first_stamp);
        assert!(!cache.is_recent(Duration::from_millis(10)));
    }
}
