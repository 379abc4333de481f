//! # 分诊工作流模块
//!
//! 提供病例名单相关的纯函数逻辑，包括：
//! - 病例状态模型：根据存储字段推导生命周期状态和紧急程度徽章
//! - 名单过滤引擎：按姓名、状态和日期范围过滤内存中的病例快照
//! - 名单排序与统计：最近病例排序和仪表盘计数

pub mod roster;
pub mod status;

// 重新导出主要类型
pub use roster::{
    filter_cases, filter_patients, recent, remove_case, roster_stats, sort_recent_first,
    upsert_case, CaseFilter, DateFilter, RosterStats, StatusFilter,
};
pub use status::{derive_status, derive_urgency_badge};
