//! AI Nurse Assist 命令行客户端

mod commands;
mod settings;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use nurse_admin::{init_logging, ClientEnvironment};
use nurse_core::{Notice, NoticeLevel, TriageError};
use nurse_integration::HttpRecordRepository;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use tracing::error;

/// 命令行参数
#[derive(Parser, Debug)]
#[command(name = "nurse-assist")]
#[command(about = "AI 辅助远程分诊客户端")]
struct Cli {
    /// 配置文件路径
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// 医生登录
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// 注册新医生
    Signup {
        #[arg(long)]
        name: String,
        /// CRM 注册号
        #[arg(long)]
        crm: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// 退出登录
    Logout,
    /// 病例名单
    Cases(RosterArgs),
    /// 患者名单
    Patients {
        #[arg(long, default_value = "")]
        name: String,
    },
    /// 在终端查看病例报告
    Show { case_id: i64 },
    /// 导出病例报告为 PDF
    Export {
        case_id: i64,
        /// 输出目录，默认使用配置中的 export_dir
        #[arg(long)]
        dir: Option<PathBuf>,
    },
    /// 提交问诊表单
    #[command(subcommand)]
    Intake(IntakeCommand),
    /// 修改并重新提交病例
    Edit {
        case_id: i64,
        #[command(flatten)]
        fields: EditArgs,
    },
    /// 删除病例
    Delete { case_id: i64 },
    /// 医生资料
    #[command(subcommand)]
    Profile(ProfileCommand),
    /// 显示偏好
    Prefs {
        /// light 或 dark
        #[arg(long)]
        theme: Option<String>,
        /// small、medium 或 large
        #[arg(long)]
        font_size: Option<String>,
    },
    /// 仪表盘统计
    Stats {
        /// 最近病例数量
        #[arg(long, default_value = "5")]
        recent: usize,
    },
}

#[derive(Args, Debug, Default)]
struct RosterArgs {
    /// 患者姓名（不区分大小写的子串）
    #[arg(long, default_value = "")]
    name: String,
    /// all、analyzed 或 pending
    #[arg(long, default_value = "all")]
    status: String,
    /// all、today、week 或 month
    #[arg(long, default_value = "all")]
    date: String,
    /// 只显示最近的 N 个病例
    #[arg(long)]
    recent: Option<usize>,
}

#[derive(Subcommand, Debug)]
enum IntakeCommand {
    /// 新患者
    New {
        #[arg(long)]
        name: String,
        /// 出生日期 YYYY-MM-DD
        #[arg(long)]
        birth_date: Option<String>,
        #[arg(long)]
        gender: String,
        #[arg(long, default_value = "")]
        history: String,
        #[arg(long)]
        symptoms: String,
        #[arg(long, default_value = "")]
        exams: String,
    },
    /// 已有患者复诊
    Return {
        #[arg(long)]
        patient_id: i64,
        #[arg(long)]
        symptoms: String,
        #[arg(long, default_value = "")]
        exams: String,
    },
}

#[derive(Args, Debug, Default)]
struct EditArgs {
    #[arg(long)]
    name: Option<String>,
    #[arg(long)]
    birth_date: Option<String>,
    #[arg(long)]
    gender: Option<String>,
    #[arg(long)]
    history: Option<String>,
    #[arg(long)]
    symptoms: Option<String>,
    #[arg(long)]
    exams: Option<String>,
}

#[derive(Subcommand, Debug)]
enum ProfileCommand {
    Show,
    Update {
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        crm: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        specialty: Option<String>,
        #[arg(long)]
        phone: Option<String>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(Some(notice)) => {
            print_notice(&notice);
            ExitCode::SUCCESS
        }
        Ok(None) => ExitCode::SUCCESS,
        Err(e) => {
            let notice = match e.downcast_ref::<TriageError>() {
                Some(triage) => Notice::from_error(triage),
                None => Notice {
                    level: NoticeLevel::Error,
                    message: format!("{:#}", e),
                },
            };
            error!("Command failed: {:#}", e);
            print_notice(&notice);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<Option<Notice>> {
    let environment = ClientEnvironment::new(cli.config.as_deref())
        .await
        .context("Failed to load configuration")?;
    let config = environment.config_manager().get_config().await;
    init_logging(&config.logging)?;

    environment.restore_session().await?;

    let repository = HttpRecordRepository::with_connect_timeout(
        &config.service.base_url,
        config.service.connect_timeout_secs.map(Duration::from_secs),
    )?;

    let app = commands::App::new(environment, repository, config);
    app.dispatch(cli.command).await
}

fn print_notice(notice: &Notice) {
    let marker = match notice.level {
        NoticeLevel::Success => "✔",
        NoticeLevel::Warning => "⚠",
        NoticeLevel::Error => "✖",
    };
    eprintln!("{} {}", marker, notice.message);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_roster_filters() {
        let cli = Cli::parse_from([
            "nurse-assist", "cases", "--name", "maria", "--status", "pending", "--recent", "3",
        ]);
        match cli.command {
            Command::Cases(args) => {
                assert_eq!(args.name, "maria");
                assert_eq!(args.status, "pending");
                assert_eq!(args.date, "all");
                assert_eq!(args.recent, Some(3));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_return_visit() {
        let cli = Cli::parse_from([
            "nurse-assist",
            "--config",
            "custom.toml",
            "intake",
            "return",
            "--patient-id",
            "7",
            "--symptoms",
            "Tosse",
        ]);
        assert_eq!(cli.config, Some(PathBuf::from("custom.toml")));
        assert!(matches!(
            cli.command,
            Command::Intake(IntakeCommand::Return { patient_id: 7, .. })
        ));
    }
}
