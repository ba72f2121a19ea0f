//! 笛卡尔空间类型
//!
//! 位姿跟踪使用的位姿、变换、速度命令以及带时间戳的缓存值。
//!
//! # 设计目标
//!
//! - **数值稳定**: 姿态使用 `nalgebra::UnitQuaternion`，构造时即归一化
//! - **单调时间**: 所有时间戳使用 `Instant`，不受系统时钟调整影响
//!
//! # 示例
//!
//! ```rust
//! use pose_tracking::types::Pose;
//!
//! // 位置 (米) + roll/pitch/yaw (弧度)
//! let pose = Pose::from_position_rpy("base_link", 0.3, 0.0, 0.3, 0.0, 0.0, 1.57);
//! assert_eq!(pose.frame_id, "base_link");
//! ```

use nalgebra::{UnitQuaternion, Vector3};
use std::fmt;
use std::time::{Duration, Instant};

/// 线性控制轴
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    /// 所有线性轴（按向量分量顺序）
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    /// 对应的向量分量索引
    pub const fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Axis::X => "x",
            Axis::Y => "y",
            Axis::Z => "z",
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// 目标位姿（位置 + 姿态 + 坐标系 + 时间戳）
#[derive(Debug, Clone, PartialEq)]
pub struct Pose {
    /// 参考坐标系
    pub frame_id: String,
    /// 位置（米）
    pub position: Vector3<f64>,
    /// 姿态（单位四元数）
    pub orientation: UnitQuaternion<f64>,
    /// 生产者打的时间戳（仅用于诊断）
    ///
    /// 新鲜度判断使用缓存写入时记录的到达时间 [`Stamped::stamp`]，不读取此字段。
    pub stamp: Instant,
}

impl Pose {
    /// 从位置和姿态创建
    pub fn new(
        frame_id: impl Into<String>,
        position: Vector3<f64>,
        orientation: UnitQuaternion<f64>,
    ) -> Self {
        Pose {
            frame_id: frame_id.into(),
            position,
            orientation,
            stamp: Instant::now(),
        }
    }

    /// 从位置和欧拉角创建（Roll-Pitch-Yaw，弧度）
    pub fn from_position_rpy(
        frame_id: impl Into<String>,
        x: f64,
        y: f64,
        z: f64,
        roll: f64,
        pitch: f64,
        yaw: f64,
    ) -> Self {
        Self::new(
            frame_id,
            Vector3::new(x, y, z),
            UnitQuaternion::from_euler_angles(roll, pitch, yaw),
        )
    }

    /// 原点，无旋转
    pub fn identity(frame_id: impl Into<String>) -> Self {
        Self::new(frame_id, Vector3::zeros(), UnitQuaternion::identity())
    }
}

impl fmt::Display for Pose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let q = self.orientation.quaternion();
        write!(
            f,
            "Pose[{}](pos: ({:.3}, {:.3}, {:.3}), quat: Q({:.3}, {:.3}, {:.3}, {:.3}))",
            self.frame_id,
            self.position.x,
            self.position.y,
            self.position.z,
            q.w,
            q.i,
            q.j,
            q.k
        )
    }
}

/// 末端执行器的实测变换
///
/// 假定已经在参考坐标系下，采样时间由缓存记录。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    /// 平移（米）
    pub translation: Vector3<f64>,
    /// 旋转
    pub rotation: UnitQuaternion<f64>,
}

impl Transform {
    pub fn new(translation: Vector3<f64>, rotation: UnitQuaternion<f64>) -> Self {
        Transform {
            translation,
            rotation,
        }
    }

    /// 零变换
    pub fn identity() -> Self {
        Self::new(Vector3::zeros(), UnitQuaternion::identity())
    }

    /// 以位姿的位置和姿态构造（丢弃坐标系和时间戳）
    pub fn from_pose(pose: &Pose) -> Self {
        Self::new(pose.position, pose.orientation)
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

impl fmt::Display for Transform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (roll, pitch, yaw) = self.rotation.euler_angles();
        write!(
            f,
            "Transform(pos: ({:.3}, {:.3}, {:.3}), rpy: ({:.3}, {:.3}, {:.3}))",
            self.translation.x, self.translation.y, self.translation.z, roll, pitch, yaw
        )
    }
}

/// 笛卡尔空间速度命令（线速度 + 角速度）
#[derive(Debug, Clone, PartialEq)]
pub struct TwistCommand {
    /// 命令所在坐标系（来自目标位姿）
    pub frame_id: String,
    /// 生成时间
    pub stamp: Instant,
    /// 线速度（米/秒）
    pub linear: Vector3<f64>,
    /// 角速度（弧度/秒）
    pub angular: Vector3<f64>,
}

impl TwistCommand {
    /// 零速度
    pub fn zero(frame_id: impl Into<String>) -> Self {
        TwistCommand {
            frame_id: frame_id.into(),
            stamp: Instant::now(),
            linear: Vector3::zeros(),
            angular: Vector3::zeros(),
        }
    }

    /// 是否所有分量都有限
    pub fn is_finite(&self) -> bool {
        self.linear.iter().chain(self.angular.iter()).all(|v| v.is_finite())
    }
}

impl fmt::Display for TwistCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Twist[{}](lin: ({:.4}, {:.4}, {:.4}), ang: ({:.4}, {:.4}, {:.4}))",
            self.frame_id,
            self.linear.x,
            self.linear.y,
            self.linear.z,
            self.angular.x,
            self.angular.y,
            self.angular.z
        )
    }
}

/// 带接收时间戳的缓存值
#[derive(Debug, Clone)]
pub struct Stamped<T> {
    pub value: T,
    /// 写入缓存的时间
    pub stamp: Instant,
}

impl<T> Stamped<T> {
    /// 以当前时间打戳
    pub fn now(value: T) -> Self {
        Stamped {
            value,
            stamp: Instant::now(),
        }
    }

    /// 距离写入的时间
    pub fn age(&self) -> Duration {
        self.stamp.elapsed()
    }

    /// `age < max_age`（严格小于）
    pub fn is_recent(&self, max_age: Duration) -> bool {
        self.age() < max_age
    }
}
