//! # Nurse Assist 集成模块
//!
//! 负责与外部病例服务通信：
//! - 线上数据格式与内部模型之间的字段名转换
//! - 病例、患者、医生记录的增删改查
//! - 网络错误与服务端错误的区分

pub mod client;
pub mod repository;
pub mod wire;

pub use client::HttpRecordRepository;
pub use repository::RecordRepository;
