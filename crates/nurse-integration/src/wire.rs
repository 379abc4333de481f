//! 病例服务的线上数据格式
//!
//! 服务端使用 snake_case 字段名（`full_name`、`birth_date`、`medical_history`），
//! 内部模型使用 camelCase。两者之间的转换只在本模块完成，报告渲染和界面层
//! 不会接触线上字段名。

use nurse_core::utils::{non_blank, parse_date, parse_timestamp};
use nurse_core::{
    AnalysisResult, Case, CaseId, Clinician, ClinicianId, ClinicianPatch, Credentials, Diagnosis,
    Intake, Patient, PatientId, PatientSnapshot, ProbabilityLabel, Result, Signup, TriageError,
    Urgency,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

// ---------- 病例 ----------

/// 病例列表项与病例详情共用的响应结构
///
/// 列表项只有 `{id, patient_name, status, created_at, ai_analysis_json}`，
/// 详情额外带有患者字段、症状和既往检查。
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CaseWire {
    pub id: CaseId,
    #[serde(default)]
    pub owner_id: Option<ClinicianId>,
    #[serde(default)]
    pub patient_id: Option<PatientId>,
    #[serde(default)]
    pub patient_name: String,
    #[serde(default)]
    pub birth_date: Option<String>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub medical_history: Option<String>,
    #[serde(default)]
    pub symptoms: Option<String>,
    #[serde(default)]
    pub exams_input: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    pub created_at: String,
    #[serde(default)]
    pub ai_analysis_json: Option<Value>,
}

impl CaseWire {
    /// 写操作的响应只有列表项字段，缺失部分用刚提交的表单补齐
    pub fn fill_from(mut self, intake: &Intake) -> Self {
        if self.patient_id.is_none() {
            self.patient_id = intake.patient_id;
        }
        if self.patient_name.trim().is_empty() {
            self.patient_name = intake.full_name.clone();
        }
        if self.birth_date.is_none() {
            self.birth_date = intake.birth_date.map(|d| d.format("%Y-%m-%d").to_string());
        }
        if self.gender.is_none() {
            self.gender = Some(intake.gender.clone());
        }
        if self.medical_history.is_none() {
            self.medical_history = Some(intake.medical_history.clone());
        }
        if self.symptoms.is_none() {
            self.symptoms = Some(intake.symptoms.clone());
        }
        if self.exams_input.is_none() {
            self.exams_input = Some(intake.exams.clone());
        }
        self
    }
}

impl TryFrom<CaseWire> for Case {
    type Error = TriageError;

    fn try_from(wire: CaseWire) -> Result<Self> {
        let created_at = parse_timestamp(&wire.created_at).ok_or_else(|| {
            TriageError::InvalidInput(format!(
                "Case {} has an unreadable creation timestamp: {}",
                wire.id, wire.created_at
            ))
        })?;
        let analysis = wire.ai_analysis_json.and_then(|raw| parse_analysis(wire.id, raw));

        Ok(Case {
            id: wire.id,
            owner_id: wire.owner_id,
            patient: PatientSnapshot {
                patient_id: wire.patient_id,
                full_name: wire.patient_name,
                birth_date: wire.birth_date.as_deref().and_then(parse_date),
                gender: wire.gender.unwrap_or_default(),
                medical_history: non_blank(wire.medical_history),
            },
            symptoms: wire.symptoms.unwrap_or_default(),
            prior_exams: non_blank(wire.exams_input),
            created_at,
            stored_status: wire.status,
            analysis,
        })
    }
}

/// 创建/更新病例的请求体
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseBodyWire {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patient_id: Option<PatientId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patient_data: Option<PatientDataWire>,
    pub symptoms: String,
    pub exams: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatientDataWire {
    pub full_name: String,
    pub birth_date: Option<String>,
    pub gender: String,
    pub medical_history: String,
}

impl From<&Intake> for CaseBodyWire {
    fn from(intake: &Intake) -> Self {
        // 复诊且未填写姓名时只引用患者 ID
        let patient_data = if intake.full_name.trim().is_empty() {
            None
        } else {
            Some(PatientDataWire {
                full_name: intake.full_name.trim().to_string(),
                birth_date: intake.birth_date.map(|d| d.format("%Y-%m-%d").to_string()),
                gender: intake.gender.clone(),
                medical_history: intake.medical_history.clone(),
            })
        };

        Self {
            patient_id: intake.patient_id,
            patient_data,
            symptoms: intake.symptoms.clone(),
            exams: intake.exams.clone(),
        }
    }
}

// ---------- AI 分析结果 ----------

#[derive(Debug, Default, Deserialize)]
struct AnalysisWire {
    #[serde(default)]
    referral: Option<String>,
    #[serde(default)]
    urgency: Option<String>,
    #[serde(default)]
    justification: Option<String>,
    #[serde(default)]
    diagnoses: Vec<DiagnosisWire>,
    #[serde(default)]
    exams: Vec<String>,
    #[serde(default)]
    medications: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct DiagnosisWire {
    #[serde(default)]
    name: String,
    #[serde(default)]
    probability: Value,
}

/// 解析 `ai_analysis_json`
///
/// 服务端可能直接给出对象，也可能给出 JSON 字符串。无法解析的内容视为没有分析结果，
/// 病例仍可按待分析状态展示。
pub fn parse_analysis(case_id: CaseId, raw: Value) -> Option<AnalysisResult> {
    let parsed = match raw {
        Value::Null => return None,
        Value::String(text) if text.trim().is_empty() => return None,
        Value::String(text) => serde_json::from_str::<AnalysisWire>(&text),
        other => serde_json::from_value::<AnalysisWire>(other),
    };

    match parsed {
        Ok(wire) => Some(AnalysisResult {
            referral: wire.referral.unwrap_or_default(),
            urgency: wire.urgency.as_deref().and_then(Urgency::from_label),
            justification: wire.justification.unwrap_or_default(),
            diagnoses: wire
                .diagnoses
                .into_iter()
                .map(|d| Diagnosis {
                    name: d.name,
                    probability: probability_label(&d.probability),
                })
                .collect(),
            exams: wire.exams,
            medications: wire.medications,
        }),
        Err(e) => {
            tracing::warn!("Ignoring unreadable analysis payload for case {}: {}", case_id, e);
            None
        }
    }
}

fn probability_label(raw: &Value) -> ProbabilityLabel {
    match raw {
        Value::String(label) => ProbabilityLabel::from_label(label),
        Value::Null => ProbabilityLabel::Other(String::new()),
        other => ProbabilityLabel::Other(other.to_string()),
    }
}

// ---------- 患者 ----------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatientWire {
    pub id: PatientId,
    pub full_name: String,
    #[serde(default)]
    pub birth_date: Option<String>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub medical_history: Option<String>,
    #[serde(default)]
    pub owner_id: Option<ClinicianId>,
}

impl From<PatientWire> for Patient {
    fn from(wire: PatientWire) -> Self {
        Self {
            id: wire.id,
            full_name: wire.full_name,
            birth_date: wire.birth_date.as_deref().and_then(parse_date),
            gender: wire.gender.unwrap_or_default(),
            medical_history: non_blank(wire.medical_history),
        }
    }
}

// ---------- 医生 ----------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClinicianWire {
    pub id: ClinicianId,
    pub full_name: String,
    pub crm: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub specialty: Option<String>,
}

impl From<ClinicianWire> for Clinician {
    fn from(wire: ClinicianWire) -> Self {
        Self {
            id: wire.id,
            full_name: wire.full_name,
            registration_number: wire.crm,
            email: wire.email,
            specialty: non_blank(wire.specialty),
            phone: non_blank(wire.phone),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ClinicianPatchWire {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub crm: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub specialty: Option<String>,
}

impl From<&ClinicianPatch> for ClinicianPatchWire {
    fn from(patch: &ClinicianPatch) -> Self {
        Self {
            full_name: patch.full_name.clone(),
            crm: patch.registration_number.clone(),
            email: patch.email.clone(),
            phone: patch.phone.clone(),
            specialty: patch.specialty.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginWire {
    pub email: String,
    pub password: String,
}

impl From<&Credentials> for LoginWire {
    fn from(credentials: &Credentials) -> Self {
        Self {
            email: credentials.email.trim().to_string(),
            password: credentials.password.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SignupWire {
    pub full_name: String,
    pub crm: String,
    pub email: String,
    pub password: String,
}

impl From<&Signup> for SignupWire {
    fn from(signup: &Signup) -> Self {
        Self {
            full_name: signup.full_name.trim().to_string(),
            crm: signup.registration_number.trim().to_string(),
            email: signup.email.trim().to_string(),
            password: signup.password.clone(),
        }
    }
}

// ---------- 错误响应 ----------

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    detail: Value,
}

/// 从错误响应体中提取服务端消息
///
/// 只有字符串形式的 `detail` 会展示给用户；校验错误等结构化内容返回 None。
pub fn error_detail(body: &[u8]) -> Option<String> {
    let parsed: ErrorBody = serde_json::from_slice(body).ok()?;
    match parsed.detail {
        Value::String(detail) => non_blank(Some(detail)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use serde_json::json;

    #[test]
    fn test_intake_uses_wire_field_names() {
        let intake = Intake {
            full_name: "Maria Santos".to_string(),
            birth_date: NaiveDate::from_ymd_opt(1973, 4, 2),
            gender: "feminino".to_string(),
            medical_history: "hipertensão".to_string(),
            symptoms: "chest pain".to_string(),
            ..Default::default()
        };

        let body = serde_json::to_value(CaseBodyWire::from(&intake)).unwrap();
        assert_eq!(
            body,
            json!({
                "patient_data": {
                    "full_name": "Maria Santos",
                    "birth_date": "1973-04-02",
                    "gender": "feminino",
                    "medical_history": "hipertensão"
                },
                "symptoms": "chest pain",
                "exams": ""
            })
        );
        assert!(body.get("fullName").is_none());
    }

    #[test]
    fn test_return_visit_references_patient() {
        let intake = Intake {
            patient_id: Some(12),
            symptoms: "febre".to_string(),
            ..Default::default()
        };
        let body = CaseBodyWire::from(&intake);
        assert_eq!(body.patient_id, Some(12));
        assert!(body.patient_data.is_none());
    }

    #[test]
    fn test_case_detail_translates_back() {
        let wire: CaseWire = serde_json::from_value(json!({
            "id": 7,
            "patient_id": 3,
            "patient_name": "Maria Santos",
            "birth_date": "1973-04-02",
            "gender": "feminino",
            "medical_history": "",
            "symptoms": "chest pain",
            "exams_input": null,
            "status": "Analisado",
            "created_at": "2025-11-05T08:30:00",
            "ai_analysis_json": {
                "referral": "Cardiologia",
                "urgency": "Alta",
                "justification": "Dor torácica",
                "diagnoses": [
                    {"name": "IAM", "probability": "Alta"},
                    {"name": "Angina", "probability": "Média"}
                ],
                "exams": ["ECG", "Troponina"],
                "medications": ["AAS"]
            }
        }))
        .unwrap();

        let case = Case::try_from(wire).unwrap();
        assert_eq!(case.patient.full_name, "Maria Santos");
        assert_eq!(case.patient.birth_date, NaiveDate::from_ymd_opt(1973, 4, 2));
        assert_eq!(case.patient.medical_history, None);
        assert_eq!(case.prior_exams, None);

        let analysis = case.analysis.unwrap();
        assert_eq!(analysis.urgency, Some(Urgency::High));
        assert_eq!(analysis.diagnoses[0].name, "IAM");
        assert_eq!(analysis.diagnoses[1].probability, ProbabilityLabel::Medium);
        assert_eq!(analysis.exams, vec!["ECG", "Troponina"]);
    }

    #[test]
    fn test_list_item_without_analysis() {
        let wire: CaseWire = serde_json::from_value(json!({
            "id": 2,
            "patient_name": "João",
            "status": "Pendente",
            "created_at": "2025-11-04",
            "ai_analysis_json": null
        }))
        .unwrap();
        let case = Case::try_from(wire).unwrap();
        assert!(case.analysis.is_none());
        assert_eq!(case.symptoms, "");
    }

    #[test]
    fn test_unreadable_timestamp_is_rejected() {
        let wire = CaseWire {
            id: 9,
            created_at: "ontem".to_string(),
            ..Default::default()
        };
        assert!(matches!(Case::try_from(wire), Err(TriageError::InvalidInput(_))));
    }

    #[test]
    fn test_analysis_fallbacks() {
        // AI 服务失败时的兜底结果
        let fallback = parse_analysis(
            1,
            json!({
                "referral": "Clínico Geral",
                "urgency": "Indefinida",
                "justification": "Erro no processamento da IA.",
                "diagnoses": []
            }),
        )
        .unwrap();
        assert_eq!(fallback.urgency, None);
        assert!(fallback.exams.is_empty());

        let encoded = parse_analysis(
            2,
            Value::String(r#"{"referral":"Neurologia","urgency":"Baixa","diagnoses":[{"name":"Enxaqueca","probability":0.8}]}"#.to_string()),
        )
        .unwrap();
        assert_eq!(encoded.urgency, Some(Urgency::Low));
        assert_eq!(encoded.diagnoses[0].probability.as_str(), "0.8");

        assert!(parse_analysis(3, Value::String("not json".to_string())).is_none());
        assert!(parse_analysis(4, Value::Null).is_none());
    }

    #[test]
    fn test_clinician_translation() {
        let wire: ClinicianWire = serde_json::from_value(json!({
            "id": 1,
            "full_name": "Dr. João Silva",
            "crm": "12345-SP",
            "email": "joao@example.com",
            "phone": ""
        }))
        .unwrap();
        let clinician = Clinician::from(wire);
        assert_eq!(clinician.registration_number, "12345-SP");
        assert_eq!(clinician.phone, None);

        let patch = ClinicianPatch {
            registration_number: Some("999".to_string()),
            ..Default::default()
        };
        let body = serde_json::to_value(ClinicianPatchWire::from(&patch)).unwrap();
        assert_eq!(body, json!({"crm": "999"}));
    }

    #[test]
    fn test_error_detail_extraction() {
        assert_eq!(
            error_detail(r#"{"detail":"Email já cadastrado"}"#.as_bytes()),
            Some("Email já cadastrado".to_string())
        );
        assert_eq!(error_detail(br#"{"detail":[{"loc":["body"],"msg":"x"}]}"#), None);
        assert_eq!(error_detail(b"Internal Server Error"), None);
    }
}
