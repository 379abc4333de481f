//! 病例状态模型
//!
//! 状态和紧急程度徽章都是从病例字段推导出来的纯函数结果。病例在重新提交后可能
//! 变化，所以每次渲染都要重新推导，不做缓存。

use nurse_core::{Case, CaseStatus, UrgencyBadge};

/// 推导病例状态：当且仅当存在分析结果时为 Analyzed
pub fn derive_status(case: &Case) -> CaseStatus {
    match case.analysis {
        Some(_) => CaseStatus::Analyzed,
        None => CaseStatus::Pending,
    }
}

/// 推导紧急程度徽章：没有分析结果或紧急程度无法识别时为 Undefined
pub fn derive_urgency_badge(case: &Case) -> UrgencyBadge {
    case.analysis
        .as_ref()
        .and_then(|analysis| analysis.urgency)
        .map(UrgencyBadge::from)
        .unwrap_or(UrgencyBadge::Undefined)
}
