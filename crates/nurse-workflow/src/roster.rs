//! 病例名单过滤
//!
//! 名单页面每次访问只拉取一次病例快照，之后所有过滤都在内存中以纯函数完成。
//! 过滤保持输入顺序；需要排序时由调用方先行调用 [`sort_recent_first`]。

use chrono::{Duration, Months, NaiveDateTime};
use nurse_core::{Case, CaseId, CaseStatus, Patient, Result, TriageError, UrgencyBadge};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::str::FromStr;

use crate::status::{derive_status, derive_urgency_badge};

/// 状态过滤器
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum StatusFilter {
    #[default]
    All,
    Analyzed,
    Pending,
}

impl StatusFilter {
    fn accepts(&self, status: CaseStatus) -> bool {
        match self {
            Self::All => true,
            Self::Analyzed => status == CaseStatus::Analyzed,
            Self::Pending => status == CaseStatus::Pending,
        }
    }
}

impl FromStr for StatusFilter {
    type Err = TriageError;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_lowercase().as_str() {
            "all" | "todos" => Ok(Self::All),
            "analyzed" | "analisado" => Ok(Self::Analyzed),
            "pending" | "pendente" => Ok(Self::Pending),
            other => Err(TriageError::InvalidInput(format!("Unknown status filter: {}", other))),
        }
    }
}

/// 日期过滤器
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DateFilter {
    #[default]
    All,
    Today,
    Week,
    Month,
}

impl DateFilter {
    fn accepts(&self, created_at: NaiveDateTime, now: NaiveDateTime) -> bool {
        match self {
            Self::All => true,
            Self::Today => created_at.date() == now.date(),
            Self::Week => created_at >= now - Duration::days(7),
            Self::Month => match now.checked_sub_months(Months::new(1)) {
                Some(cutoff) => created_at >= cutoff,
                None => true,
            },
        }
    }
}

impl FromStr for DateFilter {
    type Err = TriageError;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_lowercase().as_str() {
            "all" => Ok(Self::All),
            "today" => Ok(Self::Today),
            "week" => Ok(Self::Week),
            "month" => Ok(Self::Month),
            other => Err(TriageError::InvalidInput(format!("Unknown date filter: {}", other))),
        }
    }
}

/// 病例名单过滤器，三个条件按逻辑与组合
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaseFilter {
    pub name_query: String,
    pub status: StatusFilter,
    pub date: DateFilter,
}

impl CaseFilter {
    /// 是否为恒等过滤器
    pub fn is_identity(&self) -> bool {
        self.name_query.trim().is_empty()
            && self.status == StatusFilter::All
            && self.date == DateFilter::All
    }

    /// 判断单个病例是否匹配
    pub fn matches(&self, case: &Case, now: NaiveDateTime) -> bool {
        name_matches(&case.patient.full_name, &self.name_query)
            && self.status.accepts(derive_status(case))
            && self.date.accepts(case.created_at, now)
    }
}

/// 过滤病例名单，`now` 由调用方注入
pub fn filter_cases(cases: &[Case], filter: &CaseFilter, now: NaiveDateTime) -> Vec<Case> {
    let filtered: Vec<Case> = cases
        .iter()
        .filter(|case| filter.matches(case, now))
        .cloned()
        .collect();

    tracing::debug!(
        "Filtered roster: {} of {} cases match {:?}",
        filtered.len(),
        cases.len(),
        filter
    );
    filtered
}

/// 按姓名过滤患者名单
pub fn filter_patients(patients: &[Patient], name_query: &str) -> Vec<Patient> {
    patients
        .iter()
        .filter(|patient| name_matches(&patient.full_name, name_query))
        .cloned()
        .collect()
}

/// 大小写不敏感的子串匹配，空查询匹配全部
fn name_matches(full_name: &str, query: &str) -> bool {
    let query = query.trim();
    query.is_empty() || full_name.to_lowercase().contains(&query.to_lowercase())
}

/// 最近病例优先：按病例 ID 降序
pub fn sort_recent_first(cases: &mut [Case]) {
    cases.sort_by(|a, b| b.id.cmp(&a.id));
}

/// 取最近的 n 个病例
pub fn recent(cases: &[Case], n: usize) -> Vec<Case> {
    let mut sorted = cases.to_vec();
    sort_recent_first(&mut sorted);
    sorted.truncate(n);
    sorted
}

/// 创建或更新成功后修补调用方持有的名单
pub fn upsert_case(cases: &mut Vec<Case>, updated: Case) {
    match cases.iter_mut().find(|case| case.id == updated.id) {
        Some(existing) => *existing = updated,
        None => cases.insert(0, updated),
    }
}

/// 删除成功后从名单中移除
pub fn remove_case(cases: &mut Vec<Case>, case_id: CaseId) -> bool {
    let before = cases.len();
    cases.retain(|case| case.id != case_id);
    cases.len() != before
}

/// 名单统计
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterStats {
    pub total: usize,
    pub analyzed: usize,
    pub pending: usize,
    pub by_urgency: HashMap<UrgencyBadge, usize>,
}

/// 计算仪表盘统计
pub fn roster_stats(cases: &[Case]) -> RosterStats {
    let mut stats = RosterStats {
        total: cases.len(),
        ..Default::default()
    };

    for case in cases {
        match derive_status(case) {
            CaseStatus::Analyzed => stats.analyzed += 1,
            CaseStatus::Pending => stats.pending += 1,
        }
        *stats.by_urgency.entry(derive_urgency_badge(case)).or_insert(0) += 1;
    }

    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::status::tests::{sample_analysis, sample_case};
    use nurse_core::utils::parse_timestamp;
    use nurse_core::Urgency;

    fn now() -> NaiveDateTime {
        parse_timestamp("2025-11-05T10:00").unwrap()
    }

    fn roster() -> Vec<Case> {
        let mut analyzed = sample_case(3, "Ana Oliveira-Reis", "2025-11-01T09:00");
        analyzed.analysis = Some(sample_analysis(Some(Urgency::High)));
        vec![
            sample_case(5, "Maria Santos", "2025-11-05T23:59"),
            sample_case(4, "João Pereira", "2025-11-04T23:59"),
            analyzed,
            sample_case(2, "MARIANA Costa", "2025-10-10T08:00"),
            sample_case(1, "Carlos Souza", "2025-09-01T08:00"),
        ]
    }

    fn ids(cases: &[Case]) -> Vec<i64> {
        cases.iter().map(|c| c.id).collect()
    }

    #[test]
    fn test_identity_filter_returns_input() {
        let cases = roster();
        let filter = CaseFilter::default();
        assert!(filter.is_identity());
        assert_eq!(filter_cases(&cases, &filter, now()), cases);
    }

    #[test]
    fn test_name_query_is_case_insensitive_substring() {
        let filter = CaseFilter {
            name_query: "maria".to_string(),
            ..Default::default()
        };
        assert_eq!(ids(&filter_cases(&roster(), &filter, now())), vec![5, 2]);
    }

    #[test]
    fn test_today_uses_calendar_date() {
        let filter = CaseFilter {
            date: DateFilter::Today,
            ..Default::default()
        };
        assert_eq!(ids(&filter_cases(&roster(), &filter, now())), vec![5]);
    }

    #[test]
    fn test_week_and_month_windows() {
        let week = CaseFilter {
            date: DateFilter::Week,
            ..Default::default()
        };
        assert_eq!(ids(&filter_cases(&roster(), &week, now())), vec![5, 4, 3]);

        let month = CaseFilter {
            date: DateFilter::Month,
            ..Default::default()
        };
        assert_eq!(ids(&filter_cases(&roster(), &month, now())), vec![5, 4, 3, 2]);
    }

    #[test]
    fn test_predicates_combine_with_and() {
        let filter = CaseFilter {
            name_query: "a".to_string(),
            status: StatusFilter::Pending,
            date: DateFilter::Week,
        };
        assert_eq!(ids(&filter_cases(&roster(), &filter, now())), vec![5, 4]);

        let analyzed = CaseFilter {
            status: StatusFilter::Analyzed,
            ..Default::default()
        };
        assert_eq!(ids(&filter_cases(&roster(), &analyzed, now())), vec![3]);
    }

    #[test]
    fn test_filter_is_idempotent() {
        let filter = CaseFilter {
            name_query: "o".to_string(),
            status: StatusFilter::Pending,
            date: DateFilter::Month,
        };
        let once = filter_cases(&roster(), &filter, now());
        let twice = filter_cases(&once, &filter, now());
        assert_eq!(once, twice);
    }

    #[test]
    fn test_filter_preserves_input_order() {
        let mut cases = roster();
        cases.reverse();
        let filter = CaseFilter {
            date: DateFilter::Week,
            ..Default::default()
        };
        assert_eq!(ids(&filter_cases(&cases, &filter, now())), vec![3, 4, 5]);
    }

    #[test]
    fn test_filter_parsing() {
        assert_eq!("analisado".parse::<StatusFilter>().unwrap(), StatusFilter::Analyzed);
        assert_eq!("Pending".parse::<StatusFilter>().unwrap(), StatusFilter::Pending);
        assert_eq!("week".parse::<DateFilter>().unwrap(), DateFilter::Week);
        assert!("yesterday".parse::<DateFilter>().is_err());
    }

    #[test]
    fn test_recent_first_and_patching() {
        let mut cases = roster();
        cases.reverse();
        assert_eq!(ids(&recent(&cases, 3)), vec![5, 4, 3]);

        let mut created = sample_case(6, "Paula", "2025-11-05T11:00");
        upsert_case(&mut cases, created.clone());
        assert_eq!(cases[0].id, 6);

        created.analysis = Some(sample_analysis(Some(Urgency::Low)));
        upsert_case(&mut cases, created);
        assert_eq!(cases.len(), 6);
        assert!(cases[0].analysis.is_some());

        assert!(remove_case(&mut cases, 6));
        assert!(!remove_case(&mut cases, 6));
    }

    #[test]
    fn test_roster_stats() {
        let stats = roster_stats(&roster());
        assert_eq!(stats.total, 5);
        assert_eq!(stats.analyzed, 1);
        assert_eq!(stats.pending, 4);
        assert_eq!(stats.by_urgency.get(&UrgencyBadge::High), Some(&1));
        assert_eq!(stats.by_urgency.get(&UrgencyBadge::Undefined), Some(&4));
    }

    #[test]
    fn test_filter_patients() {
        let patients = vec![
            Patient {
                id: 1,
                full_name: "Maria Santos".to_string(),
                birth_date: None,
                gender: "feminino".to_string(),
                medical_history: None,
            },
            Patient {
                id: 2,
                full_name: "Carlos Souza".to_string(),
                birth_date: None,
                gender: "masculino".to_string(),
                medical_history: None,
            },
        ];
        assert_eq!(filter_patients(&patients, "SANTOS").len(), 1);
        assert_eq!(filter_patients(&patients, "").len(), 2);
    }
}
