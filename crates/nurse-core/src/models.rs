//! 核心数据模型定义

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{Result, TriageError};

pub type CaseId = i64;
pub type PatientId = i64;
pub type ClinicianId = i64;

/// 登录的医生
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Clinician {
    pub id: ClinicianId,
    pub full_name: String,
    pub registration_number: String, // CRM
    pub email: String,
    pub specialty: Option<String>,
    pub phone: Option<String>,
}

/// 医生资料的部分更新，None 表示不修改
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClinicianPatch {
    pub full_name: Option<String>,
    pub registration_number: Option<String>,
    pub email: Option<String>,
    pub specialty: Option<String>,
    pub phone: Option<String>,
}

/// 登录凭据
#[derive(Debug, Clone)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

/// 医生注册信息
#[derive(Debug, Clone)]
pub struct Signup {
    pub full_name: String,
    pub registration_number: String,
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn validate(&self) -> Result<()> {
        require("email", &self.email)?;
        require("password", &self.password)
    }
}

impl Signup {
    pub fn validate(&self) -> Result<()> {
        require("fullName", &self.full_name)?;
        require("crm", &self.registration_number)?;
        require("email", &self.email)?;
        require("password", &self.password)
    }
}

/// 患者基本信息
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Patient {
    pub id: PatientId,
    pub full_name: String,
    pub birth_date: Option<NaiveDate>,
    pub gender: String,
    pub medical_history: Option<String>,
}

/// 病例中嵌入的患者快照
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientSnapshot {
    pub patient_id: Option<PatientId>,
    pub full_name: String,
    pub birth_date: Option<NaiveDate>,
    pub gender: String,
    pub medical_history: Option<String>,
}

/// 分诊病例
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Case {
    pub id: CaseId,
    pub owner_id: Option<ClinicianId>,
    pub patient: PatientSnapshot,
    pub symptoms: String,
    pub prior_exams: Option<String>,
    pub created_at: NaiveDateTime,
    /// 服务端保存的状态标签，仅供参考；界面状态一律通过 `analysis` 推导
    pub stored_status: Option<String>,
    pub analysis: Option<AnalysisResult>,
}

/// 病例生命周期状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CaseStatus {
    Pending,  // 待分析
    Analyzed, // 已分析
}

impl CaseStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Analyzed => "Analyzed",
        }
    }
}

impl fmt::Display for CaseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 紧急程度，有序：Low < Medium < High
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Urgency {
    Low,
    Medium,
    High,
}

impl Urgency {
    /// 解析 AI 服务返回的标签（葡萄牙语或英语，大小写不敏感）
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_lowercase().as_str() {
            "baixa" | "low" => Some(Self::Low),
            "média" | "media" | "medium" | "moderada" => Some(Self::Medium),
            "alta" | "high" => Some(Self::High),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
        }
    }
}

impl fmt::Display for Urgency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 列表徽章上显示的紧急程度
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UrgencyBadge {
    Low,
    Medium,
    High,
    Undefined,
}

impl UrgencyBadge {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
            Self::Undefined => "Undefined",
        }
    }
}

impl From<Urgency> for UrgencyBadge {
    fn from(urgency: Urgency) -> Self {
        match urgency {
            Urgency::Low => Self::Low,
            Urgency::Medium => Self::Medium,
            Urgency::High => Self::High,
        }
    }
}

impl fmt::Display for UrgencyBadge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 诊断可能性标签
///
/// 视为不透明的有序标签集合；无法识别的标签原样保留以便展示。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProbabilityLabel {
    Low,
    Medium,
    High,
    Other(String),
}

impl ProbabilityLabel {
    pub fn from_label(label: &str) -> Self {
        match Urgency::from_label(label) {
            Some(Urgency::Low) => Self::Low,
            Some(Urgency::Medium) => Self::Medium,
            Some(Urgency::High) => Self::High,
            None => Self::Other(label.trim().to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
            Self::Other(label) => label,
        }
    }
}

/// 诊断假设
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnosis {
    pub name: String,
    pub probability: ProbabilityLabel,
}

/// AI 分析结果，附加到病例后不再修改
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub referral: String,
    /// None 表示服务返回了无法识别的紧急程度（如 "Indefinida"）
    pub urgency: Option<Urgency>,
    pub justification: String,
    /// 保持服务返回的顺序
    pub diagnoses: Vec<Diagnosis>,
    pub exams: Vec<String>,
    pub medications: Vec<String>,
}

/// 问诊表单
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Intake {
    /// 复诊时引用已有患者
    pub patient_id: Option<PatientId>,
    pub full_name: String,
    pub birth_date: Option<NaiveDate>,
    pub gender: String,
    pub medical_history: String,
    pub symptoms: String,
    pub exams: String,
}

impl Intake {
    /// 只检查必填字段是否存在，不做业务校验
    pub fn validate(&self) -> Result<()> {
        if self.patient_id.is_none() {
            require("fullName", &self.full_name)?;
            require("gender", &self.gender)?;
        }
        require("symptoms", &self.symptoms)
    }

    /// 用已有病例预填编辑表单
    pub fn from_case(case: &Case) -> Self {
        Self {
            patient_id: case.patient.patient_id,
            full_name: case.patient.full_name.clone(),
            birth_date: case.patient.birth_date,
            gender: case.patient.gender.clone(),
            medical_history: case.patient.medical_history.clone().unwrap_or_default(),
            symptoms: case.symptoms.clone(),
            exams: case.prior_exams.clone().unwrap_or_default(),
        }
    }

    /// 为已有患者创建复诊表单
    pub fn return_visit(patient: &Patient, symptoms: impl Into<String>) -> Self {
        Self {
            patient_id: Some(patient.id),
            full_name: patient.full_name.clone(),
            birth_date: patient.birth_date,
            gender: patient.gender.clone(),
            medical_history: patient.medical_history.clone().unwrap_or_default(),
            symptoms: symptoms.into(),
            exams: String::new(),
        }
    }
}

fn require(field: &'static str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(TriageError::ValidationMissing { field });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_urgency_labels() {
        assert_eq!(Urgency::from_label("Alta"), Some(Urgency::High));
        assert_eq!(Urgency::from_label("Média"), Some(Urgency::Medium));
        assert_eq!(Urgency::from_label(" baixa "), Some(Urgency::Low));
        assert_eq!(Urgency::from_label("Indefinida"), None);
        assert!(Urgency::Low < Urgency::Medium && Urgency::Medium < Urgency::High);
    }

    #[test]
    fn test_probability_keeps_unknown_labels() {
        assert_eq!(ProbabilityLabel::from_label("Alta"), ProbabilityLabel::High);
        let other = ProbabilityLabel::from_label("70%");
        assert_eq!(other.as_str(), "70%");
    }

    #[test]
    fn test_intake_requires_presence_only() {
        let intake = Intake {
            full_name: "Maria Santos".to_string(),
            gender: "feminino".to_string(),
            symptoms: "chest pain".to_string(),
            ..Default::default()
        };
        assert!(intake.validate().is_ok());

        let missing = Intake {
            symptoms: "   ".to_string(),
            ..intake.clone()
        };
        assert!(matches!(
            missing.validate(),
            Err(TriageError::ValidationMissing { field: "symptoms" })
        ));

        let no_name = Intake {
            full_name: String::new(),
            ..intake
        };
        assert!(matches!(
            no_name.validate(),
            Err(TriageError::ValidationMissing { field: "fullName" })
        ));
    }

    #[test]
    fn test_return_visit_only_needs_symptoms() {
        let intake = Intake {
            patient_id: Some(7),
            symptoms: "febre".to_string(),
            ..Default::default()
        };
        assert!(intake.validate().is_ok());
    }

    #[test]
    fn test_signup_validation() {
        let signup = Signup {
            full_name: "Dr. João Silva".to_string(),
            registration_number: String::new(),
            email: "joao@example.com".to_string(),
            password: "secret".to_string(),
        };
        assert!(matches!(
            signup.validate(),
            Err(TriageError::ValidationMissing { field: "crm" })
        ));
    }
}
