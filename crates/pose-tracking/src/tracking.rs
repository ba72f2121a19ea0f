//! 位姿跟踪循环
//!
//! [`PoseTracker`] 以固定频率闭环驱动末端执行器趋近目标位姿：
//!
//! ```text
//! Idle → WaitingForFirstPose ─┬→ Tracking ─┬→ Finished(Success)
//!                             │            ├→ Finished(NoRecentEndEffectorPose)
//!                             │            └→ Finished(StopRequested)
//!                             └→ Finished(NoRecentTargetPose)
//! ```
//!
//! 每个控制周期的顺序固定为：
//!
//! 1. 运行令牌已关闭 → `StopRequested`
//! 2. 容差满足（使用上一周期缓存的角度误差）→ `Success`
//! 3. 采样末端位姿
//! 4. 末端位姿过期 → `NoRecentEndEffectorPose`
//! 5. 收到停止请求 → `StopRequested`
//! 6. 合成并发布速度命令
//! 7. 睡眠到下一个绝对时间锚点
//!
//! 跟踪阶段的每一个终止出口都会执行运动后复位：清除停止标志、清零缓存的角度误差、
//! 重置全部 PID 控制器。等待阶段超时不经过跟踪阶段，直接返回。
//!
//! # 示例
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
//! let store = tracker.target_store();
//! std::thread::spawn(move || loop {
//!     store.set(Pose::from_position_rpy("base_link", 0.1, 0.0, 0.2, 0.0, 0.0, 0.0));
//!     std::thread::sleep(std::time::Duration::from_millis(10));
//! });
//!
//! let status = tracker.move_to_pose(&ToleranceSpec::uniform(0.01, 0.1));
//! println!("Finished: {}", status);
//! # Ok::<(), pose_tracking::TrackingError>(())
//! ```

use crate::config::TrackerConfig;
use crate::error::{Result, TrackingError};
use crate::io::{CommandSink, PoseSampler};
use crate::pid_bank::PidBank;
use crate::status::{TrackingState, TrackingStatus};
use crate::store::{EndEffectorPoseCache, TargetPoseStore};
use crate::tolerance::{self, ToleranceSpec};
use crate::twist::TwistSynthesizer;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

/// 停止请求句柄
///
/// 可以克隆并发送到任意线程；跟踪循环在下一个周期内观察到请求。
#[derive(Debug, Clone, Default)]
pub struct StopHandle {
    flag: Arc<AtomicBool>,
}

impl StopHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// 请求停止当前（或下一次）跟踪会话
    pub fn request_stop(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_requested(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    /// 清除停止请求
    pub fn clear(&self) {
        self.flag.store(false, Ordering::SeqCst);
    }
}

/// 进程级运行令牌
///
/// 由宿主进程持有，关闭后所有使用该令牌的跟踪会话在下一个周期以
/// `StopRequested` 结束。
#[derive(Debug, Clone)]
pub struct ShutdownToken {
    running: Arc<AtomicBool>,
}

impl ShutdownToken {
    /// 创建处于运行状态的令牌
    pub fn new() -> Self {
        ShutdownToken {
            running: Arc::new(AtomicBool::new(true)),
        }
    }

    /// 关闭令牌（不可恢复）
    pub fn shutdown(&self) {
        self.running.store(false, Ordering::SeqCst);
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }
}

impl Default for ShutdownToken {
    fn default() -> Self {
        Self::new()
    }
}

/// 单次跟踪会话的统计
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SessionStats {
    /// 跟踪阶段执行的周期数
    pub ticks: u64,
    /// 发布的速度命令数
    pub commands_published: u64,
    /// 末端采样失败次数（包括等待阶段）
    pub sample_failures: u64,
    /// 控制周期超时次数
    pub overruns: u64,
    /// 会话总耗时
    pub elapsed: Duration,
    /// 终止状态
    pub status: TrackingStatus,
}

#[derive(Debug, Default)]
struct SessionCounters {
    ticks: u64,
    commands_published: u64,
    sample_failures: u64,
    overruns: u64,
}

/// 位姿跟踪器构造器
pub struct PoseTrackerBuilder<S, K> {
    config: TrackerConfig,
    sampler: Option<S>,
    sink: Option<K>,
    shutdown: Option<ShutdownToken>,
}

impl<S: PoseSampler, K: CommandSink> PoseTrackerBuilder<S, K> {
    pub fn new(config: TrackerConfig) -> Self {
        PoseTrackerBuilder {
            config,
            sampler: None,
            sink: None,
            shutdown: None,
        }
    }

    /// 设置末端位姿采样器
    pub fn sampler(mut self, sampler: S) -> Self {
        self.sampler = Some(sampler);
        self
    }

    /// 设置速度命令接收端
    pub fn sink(mut self, sink: K) -> Self {
        self.sink = Some(sink);
        self
    }

    /// 设置运行令牌（未设置时使用永不关闭的独立令牌）
    pub fn shutdown_token(mut self, token: ShutdownToken) -> Self {
        self.shutdown = Some(token);
        self
    }

    /// 构建跟踪器
    ///
    /// # 错误
    ///
    /// - `InvalidConfig`: 配置校验失败
    /// - `MissingCollaborator`: 未设置采样器或接收端
    pub fn build(self) -> Result<PoseTracker<S, K>> {
        self.config.validate()?;

        let sampler = self.sampler.ok_or(TrackingError::MissingCollaborator("sampler"))?;
        let sink = self.sink.ok_or(TrackingError::MissingCollaborator("sink"))?;

        let target = Arc::new(TargetPoseStore::with_expected_frame(
            self.config.planning_frame.clone(),
        ));

        Ok(PoseTracker {
            pids: PidBank::from_config(&self.config),
            config: self.config,
            target,
            end_effector: EndEffectorPoseCache::new(sampler),
            sink,
            synthesizer: TwistSynthesizer::new(),
            stop: StopHandle::new(),
            shutdown: self.shutdown.unwrap_or_default(),
            state: TrackingState::Idle,
            last_session: None,
        })
    }
}

/// 位姿跟踪器
///
/// 同一时间只能运行一个会话（`move_to_pose` 需要 `&mut self`）；
/// 目标位姿缓存和停止句柄可以共享给其他线程。
pub struct PoseTracker<S, K> {
    config: TrackerConfig,
    target: Arc<TargetPoseStore>,
    end_effector: EndEffectorPoseCache<S>,
    sink: K,
    pids: PidBank,
    synthesizer: TwistSynthesizer,
    stop: StopHandle,
    shutdown: ShutdownToken,
    state: TrackingState,
    last_session: Option<SessionStats>,
}

impl<S: PoseSampler, K: CommandSink> PoseTracker<S, K> {
    /// 运行一次跟踪会话，阻塞直到终止
    ///
    /// 会话开始时先让缓存的目标位姿失效，因此只有会话开始之后写入的目标才会被跟踪。
    pub fn move_to_pose(&mut self, tolerance: &ToleranceSpec) -> TrackingStatus {
        let start = Instant::now();
        let mut counters = SessionCounters::default();

        info!(
            "Pose tracking session started (tolerance: pos {:?}, ang {:.4} rad)",
            tolerance.positional.as_slice(),
            tolerance.angular
        );

        self.target.expire();
        self.state = TrackingState::WaitingForFirstPose;

        if !self.wait_for_first_pose(start, &mut counters) {
            error!("The target pose was not updated recently. Aborting.");
            return self.finish(TrackingStatus::NoRecentTargetPose, start, counters);
        }

        self.state = TrackingState::Tracking;
        let status = self.track(tolerance, &mut counters);
        self.post_motion_reset();

        self.finish(status, start, counters)
    }

    /// 等待目标位姿和末端位姿都变为新鲜
    ///
    /// 返回目标位姿是否可用。末端位姿在窗口内仍不可用时交给跟踪阶段处理。
    fn wait_for_first_pose(&self, start: Instant, counters: &mut SessionCounters) -> bool {
        let pose_timeout = self.config.pose_timeout();
        let startup_timeout = self.config.startup_timeout();
        let poll = self.config.wait_poll_interval();

        while (!self.target.is_recent(pose_timeout) || !self.end_effector.is_recent(pose_timeout))
            && start.elapsed() < startup_timeout
        {
            if !self.end_effector.try_sample() {
                counters.sample_failures += 1;
            }
            thread::sleep(poll);
        }

        self.target.is_recent(pose_timeout)
    }

    fn track(&mut self, tolerance: &ToleranceSpec, counters: &mut SessionCounters) -> TrackingStatus {
        let period = self.config.period();
        let pose_timeout = self.config.pose_timeout();
        let mut next_tick = Instant::now();

        loop {
            // 1. 设定下一个锚点（绝对时间）
            next_tick += period;
            counters.ticks += 1;

            if !self.shutdown.is_running() {
                info!("Shutdown requested, halting pose tracking");
                return TrackingStatus::StopRequested;
            }

            let Some(target) = self.target.get() else {
                error!("Target pose was cleared during tracking. Aborting.");
                return TrackingStatus::NoRecentTargetPose;
            };

            // 2. 检查是否到达（角度误差来自上一周期）
            if let Some(current) = self.end_effector.get()
                && tolerance::is_satisfied(
                    &target.value,
                    &current.value,
                    self.synthesizer.angular_error(),
                    tolerance,
                )
            {
                info!("The target pose is achieved!");
                return TrackingStatus::Success;
            }

            // 3. 采样末端位姿
            if !self.end_effector.try_sample() {
                counters.sample_failures += 1;
            }

            let Some(current) = self
                .end_effector
                .get()
                .filter(|stamped| stamped.is_recent(pose_timeout))
            else {
                error!("The end effector pose was not updated in time. Aborting.");
                return TrackingStatus::NoRecentEndEffectorPose;
            };

            if self.stop.is_requested() {
                info!("Halting servo motion, a stop was requested.");
                return TrackingStatus::StopRequested;
            }

            // 4. 合成并发布速度命令
            let command =
                self.synthesizer.compute(&target.value, &current.value, &mut self.pids, period);
            debug!("Publishing {}", command);
            self.sink.publish(command);
            counters.commands_published += 1;

            // 5. 睡眠到下一个锚点（自动扣除耗时操作的时间）
            let now = Instant::now();
            if next_tick > now {
                spin_sleep::sleep(next_tick - now);
            } else {
                counters.overruns += 1;
                warn!(
                    "Control loop overrun: tick took {:?} (expected {:?}). Skipping sleep to catch up.",
                    now.duration_since(next_tick - period),
                    period
                );
                next_tick = now;
            }
        }
    }

    fn post_motion_reset(&mut self) {
        self.stop.clear();
        self.synthesizer.reset();
        self.pids.reset_all();
    }

    fn finish(
        &mut self,
        status: TrackingStatus,
        start: Instant,
        counters: SessionCounters,
    ) -> TrackingStatus {
        let stats = SessionStats {
            ticks: counters.ticks,
            commands_published: counters.commands_published,
            sample_failures: counters.sample_failures,
            overruns: counters.overruns,
            elapsed: start.elapsed(),
            status,
        };

        info!(
            "Pose tracking session finished: {} ({} ticks, {} commands, {:?})",
            status, stats.ticks, stats.commands_published, stats.elapsed
        );

        self.state = TrackingState::Finished(status);
        self.last_session = Some(stats);
        status
    }

    /// 请求停止当前会话
    pub fn request_stop(&self) {
        self.stop.request_stop();
    }

    /// 可跨线程使用的停止句柄
    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    /// 目标位姿缓存（交给生产者写入）
    pub fn target_store(&self) -> Arc<TargetPoseStore> {
        Arc::clone(&self.target)
    }

    pub fn end_effector(&self) -> &EndEffectorPoseCache<S> {
        &self.end_effector
    }

    pub fn sink(&self) -> &K {
        &self.sink
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    pub fn pids(&self) -> &PidBank {
        &self.pids
    }

    pub fn state(&self) -> TrackingState {
        self.state
    }

    /// 上一次会话的统计
    pub fn last_session(&self) -> Option<SessionStats> {
        self.last_session
    }
}
