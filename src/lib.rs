//! # AI Nurse Assist
//!
//! 远程分诊客户端的工作区入口，重新导出各子模块：
//! - [`core`]：数据模型、错误与通知
//! - [`workflow`]：病例状态推导与名单过滤
//! - [`integration`]：病例服务客户端
//! - [`report`]：报告渲染与 PDF 导出
//! - [`admin`]：配置、日志、会话与本地偏好

pub use nurse_admin as admin;
pub use nurse_core as core;
pub use nurse_integration as integration;
pub use nurse_report as report;
pub use nurse_workflow as workflow;
