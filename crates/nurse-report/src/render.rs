//! 报告渲染器
//!
//! 把病例及其 AI 分析结果映射为 [`ReportView`]。渲染只读取病例，不做任何修改；
//! 缺少分析结果是合法状态，渲染为占位提示而不是错误。

use chrono::NaiveDate;
use nurse_core::utils::age_on;
use nurse_core::{AnalysisResult, Case, UrgencyBadge};
use nurse_workflow::derive_urgency_badge;

use crate::view::{Block, Emphasis, Medium, ReportNode, ReportView, SectionRole, Visibility};

pub const NOT_PROVIDED: &str = "Not provided";
pub const NONE_PROVIDED: &str = "None provided";
pub const ANALYSIS_PENDING: &str = "Analysis pending or failed";

pub const REPORT_TITLE: &str = "Triage Report";
pub const EXAM_TAG: &str = "Exam";
pub const MEDICATION_TAG: &str = "Medication";

/// 渲染选项
#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// 日期显示格式（chrono 格式串）
    pub date_format: String,
    /// 页脚中的应用名称
    pub app_name: String,
    /// 计算年龄的参考日期
    pub today: NaiveDate,
}

impl RenderOptions {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            date_format: "%d/%m/%Y".to_string(),
            app_name: "AI Nurse Assist".to_string(),
            today,
        }
    }
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self::new(chrono::Local::now().date_naive())
    }
}

/// 紧急程度对应的视觉强调
pub fn urgency_emphasis(badge: UrgencyBadge) -> Emphasis {
    match badge {
        UrgencyBadge::High => Emphasis::Strong,
        UrgencyBadge::Medium => Emphasis::Moderate,
        UrgencyBadge::Low | UrgencyBadge::Undefined => Emphasis::Neutral,
    }
}

/// 渲染病例报告
pub fn render_report(case: &Case, options: &RenderOptions) -> ReportView {
    let mut nodes = vec![chrome(), header(case, options), patient_summary(case, options)];

    match &case.analysis {
        Some(analysis) => nodes.push(analysis_section(case, analysis)),
        None => {
            tracing::warn!("Rendering case {} without analysis", case.id);
            nodes.push(
                ReportNode::new(SectionRole::AnalysisPlaceholder)
                    .block(Block::Text(ANALYSIS_PENDING.to_string())),
            );
        }
    }

    nodes.push(footer(options));

    tracing::debug!("Rendered report for case {}", case.id);
    ReportView {
        case_id: case.id,
        patient_name: case.patient.full_name.clone(),
        title: format!("{} #{}", REPORT_TITLE, case.id),
        nodes,
    }
}

fn chrome() -> ReportNode {
    ReportNode::new(SectionRole::Chrome)
        .with_visibility(Visibility::ScreenOnly)
        .block(Block::Action("< Back to cases".to_string()))
        .block(Block::Action("Export PDF".to_string()))
}

fn header(case: &Case, options: &RenderOptions) -> ReportNode {
    ReportNode::new(SectionRole::Header)
        .block(Block::Heading(REPORT_TITLE.to_string()))
        .block(field("Case", format!("#{}", case.id)))
        .block(field(
            "Date",
            case.created_at.format(&options.date_format).to_string(),
        ))
}

fn patient_summary(case: &Case, options: &RenderOptions) -> ReportNode {
    let patient = &case.patient;
    let age = match patient.birth_date {
        Some(birth) => {
            let formatted = birth.format(&options.date_format).to_string();
            match age_on(birth, options.today) {
                Some(years) => format!("{} years ({})", years, formatted),
                None => formatted,
            }
        }
        None => NOT_PROVIDED.to_string(),
    };

    ReportNode::new(SectionRole::PatientSummary)
        .block(Block::Heading("Patient".to_string()))
        .block(field("Name", patient.full_name.clone()))
        .block(field("Age", age))
        .block(field("Gender", or_placeholder(&patient.gender, NOT_PROVIDED)))
        .block(field(
            "Medical history",
            or_placeholder(patient.medical_history.as_deref().unwrap_or(""), NOT_PROVIDED),
        ))
        .block(field("Symptoms", or_placeholder(&case.symptoms, NOT_PROVIDED)))
        .block(field(
            "Prior exams",
            or_placeholder(case.prior_exams.as_deref().unwrap_or(""), NONE_PROVIDED),
        ))
}

fn analysis_section(case: &Case, analysis: &AnalysisResult) -> ReportNode {
    let badge = derive_urgency_badge(case);

    let referral = ReportNode::new(SectionRole::Referral)
        .block(field("Referral", or_placeholder(&analysis.referral, NOT_PROVIDED)))
        .block(Block::Badge {
            label: format!("Urgency: {}", badge),
            emphasis: urgency_emphasis(badge),
        });

    let justification = ReportNode::new(SectionRole::Justification)
        .block(Block::Heading("Justification".to_string()))
        .block(Block::Text(or_placeholder(&analysis.justification, NOT_PROVIDED)));

    // 保持 AI 服务返回的排序
    let mut diagnoses = ReportNode::new(SectionRole::Diagnoses)
        .block(Block::Heading("Diagnostic hypotheses".to_string()));
    if analysis.diagnoses.is_empty() {
        diagnoses = diagnoses.block(Block::Text(NONE_PROVIDED.to_string()));
    }
    for diagnosis in &analysis.diagnoses {
        diagnoses = diagnoses.block(Block::Item {
            text: diagnosis.name.clone(),
            tag: Some(diagnosis.probability.as_str().to_string()),
        });
    }

    let mut conduct = ReportNode::new(SectionRole::Conduct)
        .block(Block::Heading("Suggested conduct".to_string()));
    if analysis.exams.is_empty() && analysis.medications.is_empty() {
        conduct = conduct.block(Block::Text(NONE_PROVIDED.to_string()));
    }
    for exam in &analysis.exams {
        conduct = conduct.block(tagged(exam, EXAM_TAG));
    }
    for medication in &analysis.medications {
        conduct = conduct.block(tagged(medication, MEDICATION_TAG));
    }

    ReportNode::new(SectionRole::Analysis)
        .block(Block::Heading("AI Analysis".to_string()))
        .child(referral)
        .child(justification)
        .child(diagnoses)
        .child(conduct)
}

fn footer(options: &RenderOptions) -> ReportNode {
    ReportNode::new(SectionRole::Footer)
        .with_visibility(Visibility::PrintOnly)
        .block(Block::Note(format!(
            "Report generated automatically by {} - For clinical decision support only.",
            options.app_name
        )))
}

fn field(label: &str, value: impl Into<String>) -> Block {
    Block::Field {
        label: label.to_string(),
        value: value.into(),
    }
}

fn tagged(text: &str, tag: &str) -> Block {
    Block::Item {
        text: text.to_string(),
        tag: Some(tag.to_string()),
    }
}

fn or_placeholder(value: &str, placeholder: &str) -> String {
    let value = value.trim();
    if value.is_empty() {
        placeholder.to_string()
    } else {
        value.to_string()
    }
}

/// 以纯文本形式渲染报告
pub fn render_text(view: &ReportView, medium: Medium) -> String {
    let mut out = String::new();
    for block in view.visible_blocks(medium) {
        let line = match block {
            Block::Heading(text) => format!("\n== {} ==", text),
            Block::Field { label, value } => format!("{}: {}", label, value),
            Block::Text(text) => text.clone(),
            Block::Badge { label, emphasis } => match emphasis {
                Emphasis::Strong => format!("[!! {} !!]", label),
                Emphasis::Moderate => format!("[! {} !]", label),
                Emphasis::Neutral => format!("[{}]", label),
            },
            Block::Item { text, tag: Some(tag) } => format!("  - {} ({})", text, tag),
            Block::Item { text, tag: None } => format!("  - {}", text),
            Block::Note(text) => format!("\n{}", text),
            Block::Action(label) => format!("[{}]", label),
        };
        out.push_str(&line);
        out.push('\n');
    }
    out
}
