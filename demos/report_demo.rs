//! 报告渲染与导出演示程序
//!
//! 展示同一棵报告视图树如何分别输出到终端和 PDF

use chrono::{Local, NaiveDate};
use nurse_assist::core::{
    AnalysisResult, Case, Diagnosis, PatientSnapshot, ProbabilityLabel,
    Urgency,
};
use nurse_assist::report::{export_report, render_report, render_text, ExportOptions, Medium, RenderOptions};

fn main() -> anyhow::Result<()> {
    // 初始化日志
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    println!("🩺 分诊报告演示");
    println!("================================");

    let options = RenderOptions::new(Local::now().date_naive());

    // 已完成 AI 分析的病例
    let analyzed = sample_case(42, Some(sample_analysis()));
    let view = render_report(&analyzed, &options);

    println!("\n🖥️  屏幕视图");
    println!("------------------");
    println!("{}", render_text(&view, Medium::Screen));

    println!("\n🖨️  打印视图");
    println!("------------------");
    println!("{}", render_text(&view, Medium::Print));

    // 分析失败的病例仍然可以渲染和导出
    println!("\n⏳ 尚未分析的病例");
    println!("------------------");
    let pending = sample_case(43, None);
    println!("{}", render_text(&render_report(&pending, &options), Medium::Screen));

    println!("\n📄 导出 PDF...");
    let exported = export_report(&view, &view.patient_name, &ExportOptions::default())?;
    let path = exported.save_in(&std::env::temp_dir())?;
    println!("  文件: {}", path.display());
    println!("  页数: {}", exported.page_count);
    println!("  大小: {} 字节", exported.bytes.len());

    println!("\n✅ 演示完成！");
    Ok(())
}

fn sample_case(id: i64, analysis: Option<AnalysisResult>) -> Case {
    Case {
        id,
        owner_id: Some(1),
        patient: PatientSnapshot {
            patient_id: Some(7),
            full_name: "Maria Santos".to_string(),
            birth_date: NaiveDate::from_ymd_opt(1973, 4, 2),
            gender: "feminino".to_string(),
            medical_history: Some("Hipertensão arterial, diabetes tipo 2".to_string()),
        },
        symptoms: "Dor torácica em aperto há 2 horas, irradiando para o braço esquerdo".to_string(),
        prior_exams: Some("ECG de 2024 sem alterações".to_string()),
        created_at: Local::now().naive_local(),
        stored_status: None,
        analysis,
    }
}

fn sample_analysis() -> AnalysisResult {
    AnalysisResult {
        referral: "Cardiologia".to_string(),
        urgency: Some(Urgency::High),
        justification: "Dor torácica típica em paciente com múltiplos fatores de risco cardiovascular."
            .to_string(),
        diagnoses: vec![
            Diagnosis {
                name: "Síndrome coronariana aguda".to_string(),
                probability: ProbabilityLabel::High,
            },
            Diagnosis {
                name: "Dissecção de aorta".to_string(),
                probability: ProbabilityLabel::Low,
            },
        ],
        exams: vec!["ECG de 12 derivações".to_string(), "Troponina seriada".to_string()],
        medications: vec!["AAS 300mg".to_string()],
    }
}
