//! # Nurse Assist Core
//!
//! 分诊客户端的核心模块，提供基础数据结构、错误定义和通用工具。

pub mod error;
pub mod models;
pub mod notice;
pub mod utils;

pub use error::{Result, TriageError};
pub use models::*;
pub use notice::{Notice, NoticeLevel};
