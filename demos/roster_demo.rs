//! 病例名单演示程序
//!
//! 展示状态推导、名单过滤和仪表盘统计

use chrono::{Duration, Local};
use nurse_assist::core::{
    AnalysisResult, Case, Diagnosis, PatientSnapshot, ProbabilityLabel, Urgency,
};
use nurse_assist::workflow::{
    derive_status, derive_urgency_badge, filter_cases, recent, roster_stats, sort_recent_first,
    CaseFilter, DateFilter, StatusFilter,
};

fn main() -> anyhow::Result<()> {
    // 初始化日志
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    println!("📋 病例名单演示");
    println!("================================");

    let now = Local::now().naive_local();
    let mut cases = vec![
        case(1, "Maria Santos", now - Duration::days(40), Some(Urgency::Medium)),
        case(2, "João Pereira", now - Duration::days(3), None),
        case(3, "Ana Oliveira", now - Duration::hours(1), Some(Urgency::High)),
        case(4, "Mariana Costa", now, None),
    ];
    sort_recent_first(&mut cases);

    println!("\n🗂️  全部病例");
    for case in &cases {
        print_case(case);
    }

    let filters = [
        ("姓名包含 \"mari\"", CaseFilter {
            name_query: "mari".to_string(),
            ..Default::default()
        }),
        ("待分析", CaseFilter {
            status: StatusFilter::Pending,
            ..Default::default()
        }),
        ("最近一周且已分析", CaseFilter {
            status: StatusFilter::Analyzed,
            date: DateFilter::Week,
            ..Default::default()
        }),
    ];

    for (label, filter) in &filters {
        println!("\n🔍 过滤：{}", label);
        for case in filter_cases(&cases, filter, now) {
            print_case(&case);
        }
    }

    println!("\n📊 仪表盘统计");
    let stats = roster_stats(&cases);
    println!("  总数: {}  已分析: {}  待分析: {}", stats.total, stats.analyzed, stats.pending);
    for (badge, total) in &stats.by_urgency {
        println!("  {}: {}", badge, total);
    }

    println!("\n🕒 最近 2 个病例");
    for case in recent(&cases, 2) {
        print_case(&case);
    }

    println!("\n✅ 演示完成！");
    Ok(())
}

fn print_case(case: &Case) {
    println!(
        "  #{} {:<16} {} {:<9} {}",
        case.id,
        case.patient.full_name,
        case.created_at.format("%d/%m/%Y"),
        derive_status(case).as_str(),
        derive_urgency_badge(case)
    );
}

fn case(id: i64, name: &str, created_at: chrono::NaiveDateTime, urgency: Option<Urgency>) -> Case {
    Case {
        id,
        owner_id: Some(1),
        patient: PatientSnapshot {
            patient_id: Some(id * 10),
            full_name: name.to_string(),
            birth_date: None,
            gender: "feminino".to_string(),
            medical_history: None,
        },
        symptoms: "Febre e tosse".to_string(),
        prior_exams: None,
        created_at,
        stored_status: None,
        analysis: urgency.map(|urgency| AnalysisResult {
            referral: "Clínica Médica".to_string(),
            urgency: Some(urgency),
            justification: "Quadro respiratório".to_string(),
            diagnoses: vec![Diagnosis {
                name: "Infecção de vias aéreas".to_string(),
                probability: ProbabilityLabel::Medium,
            }],
            exams: vec![],
            medications: vec![],
        }),
    }
}
