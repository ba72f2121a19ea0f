//! 错误类型定义
//!
//! 跟踪会话本身的结果通过 [`TrackingStatus`](crate::status::TrackingStatus) 返回，
//! 这里只包含构造和配置阶段可能出现的错误。

use thiserror::Error;

/// 位姿跟踪错误类型
#[derive(Error, Debug)]
pub enum TrackingError {
    /// 配置参数无效
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// 构造时缺少外部协作者（采样器或命令接收端）
    #[error("Missing collaborator: {0}")]
    MissingCollaborator(&'static str),

    /// 配置文件读写错误
    #[error("Config file IO error: {0}")]
    Io(#[from] std::io::Error),

    /// 配置文件解析错误
    #[error("Config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// 配置序列化错误
    #[error("Config serialize error: {0}")]
    ConfigSerialize(#[from] toml::ser::Error),
}

/// 便捷的 Result 别名
pub type Result<T> = std::result::Result<T, TrackingError>;
