//! 命令定义和实现

pub mod config;
pub mod track;

pub use config::ConfigCommand;
pub use track::TrackCommand;
