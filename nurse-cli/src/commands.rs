//! 子命令处理
//!
//! 每个子命令对应客户端的一个界面。错误向上返回，由 `main` 统一转换为通知。

use anyhow::{Context, Result};
use chrono::Local;
use nurse_admin::{AppConfig, ClientEnvironment, FontSize, Theme};
use nurse_core::utils::parse_date;
use nurse_core::{
    Case, CaseId, ClinicianPatch, Credentials, Intake, Notice, Patient, Signup, TriageError,
};
use nurse_integration::RecordRepository;
use nurse_report::{export_report, render_report, render_text, Medium, ReportView};
use nurse_workflow::{
    derive_status, derive_urgency_badge, filter_cases, filter_patients, recent, roster_stats,
    sort_recent_first, CaseFilter,
};
use std::path::PathBuf;
use tracing::info;

use crate::settings::{export_options, render_options};
use crate::{Command, EditArgs, IntakeCommand, ProfileCommand, RosterArgs};

pub struct App {
    environment: ClientEnvironment,
    repository: Box<dyn RecordRepository>,
    config: AppConfig,
}

impl App {
    pub fn new(
        environment: ClientEnvironment,
        repository: impl RecordRepository + 'static,
        config: AppConfig,
    ) -> Self {
        Self {
            environment,
            repository: Box::new(repository),
            config,
        }
    }

    pub async fn dispatch(&self, command: Command) -> Result<Option<Notice>> {
        match command {
            Command::Login { email, password } => self.login(email, password).await,
            Command::Signup {
                name,
                crm,
                email,
                password,
            } => {
                let signup = Signup {
                    full_name: name,
                    registration_number: crm,
                    email,
                    password,
                };
                let clinician = self.repository.create_clinician(&signup).await?;
                info!("Clinician {} registered", clinician.id);
                Ok(Some(Notice::success("Account created. Please sign in.")))
            }
            Command::Logout => match self.environment.sign_out().await? {
                Some(_) => Ok(Some(Notice::success("Signed out."))),
                None => Ok(None),
            },
            Command::Cases(args) => self.cases(args).await,
            Command::Patients { name } => self.patients(&name).await,
            Command::Show { case_id } => {
                let view = self.render(case_id).await?;
                println!("{}", render_text(&view, Medium::Screen));
                Ok(None)
            }
            Command::Export { case_id, dir } => self.export(case_id, dir).await,
            Command::Intake(intake) => self.intake(intake).await,
            Command::Edit { case_id, fields } => self.edit(case_id, fields).await,
            Command::Delete { case_id } => {
                let owner_id = self.environment.session().owner_id().await?;
                self.repository.delete_case(case_id, owner_id).await?;
                Ok(Some(Notice::success(format!("Case #{} deleted.", case_id))))
            }
            Command::Profile(profile) => self.profile(profile).await,
            Command::Prefs { theme, font_size } => self.preferences(theme, font_size).await,
            Command::Stats { recent } => self.stats(recent).await,
        }
    }

    async fn login(&self, email: String, password: String) -> Result<Option<Notice>> {
        let credentials = Credentials { email, password };
        let clinician = self.repository.login(&credentials).await?;
        let message = format!("Welcome, {}.", clinician.full_name);
        self.environment.sign_in(clinician).await?;
        Ok(Some(Notice::success(message)))
    }

    async fn cases(&self, args: RosterArgs) -> Result<Option<Notice>> {
        let owner_id = self.environment.session().owner_id().await?;
        let mut cases = self.repository.list_cases(owner_id).await?;
        sort_recent_first(&mut cases);

        let filter = CaseFilter {
            name_query: args.name,
            status: args.status.parse()?,
            date: args.date.parse()?,
        };
        let mut shown = filter_cases(&cases, &filter, Local::now().naive_local());
        if let Some(limit) = args.recent {
            shown.truncate(limit);
        }

        if shown.is_empty() {
            println!("No cases found.");
        }
        for case in &shown {
            println!("{}", self.case_row(case));
        }
        Ok(None)
    }

    async fn patients(&self, name: &str) -> Result<Option<Notice>> {
        let owner_id = self.environment.session().owner_id().await?;
        let patients = self.repository.list_patients(owner_id).await?;
        let shown = filter_patients(&patients, name);

        if shown.is_empty() {
            println!("No patients found.");
        }
        for patient in &shown {
            let birth = patient
                .birth_date
                .map(|d| d.format(&self.config.report.date_format).to_string())
                .unwrap_or_else(|| "-".to_string());
            println!("#{:<5} {:<32} {:<10} {}", patient.id, patient.full_name, patient.gender, birth);
        }
        Ok(None)
    }

    fn case_row(&self, case: &Case) -> String {
        format!(
            "#{:<5} {:<12} {:<32} {:<9} {}",
            case.id,
            case.created_at.format(&self.config.report.date_format),
            case.patient.full_name,
            derive_status(case).as_str(),
            derive_urgency_badge(case)
        )
    }

    async fn render(&self, case_id: CaseId) -> Result<ReportView> {
        let case = self.repository.get_case(case_id).await?;
        let options = render_options(&self.config.report, Local::now().date_naive());
        Ok(render_report(&case, &options))
    }

    async fn export(&self, case_id: CaseId, dir: Option<PathBuf>) -> Result<Option<Notice>> {
        let view = self.render(case_id).await?;
        let dir = dir.unwrap_or_else(|| PathBuf::from(&self.config.storage.export_dir));

        let saved = export_report(&view, &view.patient_name, &export_options(&self.config.report))
            .and_then(|exported| exported.save_in(&dir));
        match saved {
            Ok(path) => Ok(Some(Notice::success(format!("Report saved to {}", path.display())))),
            Err(e @ TriageError::ExportFailed { .. }) => {
                println!("{}", render_text(&view, Medium::Screen));
                Ok(Some(Notice::from_error(&e)))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn intake(&self, command: IntakeCommand) -> Result<Option<Notice>> {
        let owner_id = self.environment.session().owner_id().await?;
        let intake = match command {
            IntakeCommand::New {
                name,
                birth_date,
                gender,
                history,
                symptoms,
                exams,
            } => Intake {
                patient_id: None,
                full_name: name,
                birth_date: birth_date.as_deref().map(birth_date_arg).transpose()?,
                gender,
                medical_history: history,
                symptoms,
                exams,
            },
            IntakeCommand::Return {
                patient_id,
                symptoms,
                exams,
            } => {
                let patients = self.repository.list_patients(owner_id).await?;
                let patient = find_patient(&patients, patient_id)?;
                Intake {
                    exams,
                    ..Intake::return_visit(patient, symptoms)
                }
            }
        };

        let case = self.repository.create_case(owner_id, &intake).await?;
        self.show_result(&case);
        Ok(Some(Notice::success(format!("Case #{} submitted.", case.id))))
    }

    async fn edit(&self, case_id: CaseId, fields: EditArgs) -> Result<Option<Notice>> {
        let owner_id = self.environment.session().owner_id().await?;
        let case = self.repository.get_case(case_id).await?;
        let intake = apply_edits(Intake::from_case(&case), fields)?;

        let updated = self.repository.update_case(case_id, owner_id, &intake).await?;
        self.show_result(&updated);
        Ok(Some(Notice::success(format!("Case #{} updated.", case_id))))
    }

    fn show_result(&self, case: &Case) {
        let options = render_options(&self.config.report, Local::now().date_naive());
        let view = render_report(case, &options);
        println!("{}", render_text(&view, Medium::Screen));
    }

    async fn profile(&self, command: ProfileCommand) -> Result<Option<Notice>> {
        let current = self.environment.session().clinician().await?;
        match command {
            ProfileCommand::Show => {
                let clinician = self.repository.get_clinician(current.id).await?;
                println!("Name:      {}", clinician.full_name);
                println!("CRM:       {}", clinician.registration_number);
                println!("Email:     {}", clinician.email);
                println!("Specialty: {}", clinician.specialty.as_deref().unwrap_or("-"));
                println!("Phone:     {}", clinician.phone.as_deref().unwrap_or("-"));
                Ok(None)
            }
            ProfileCommand::Update {
                name,
                crm,
                email,
                specialty,
                phone,
            } => {
                let patch = ClinicianPatch {
                    full_name: name,
                    registration_number: crm,
                    email,
                    specialty,
                    phone,
                };
                let updated = self.repository.update_clinician(current.id, &patch).await?;
                self.environment.refresh_profile(updated).await?;
                Ok(Some(Notice::success("Profile updated.")))
            }
        }
    }

    async fn preferences(
        &self,
        theme: Option<String>,
        font_size: Option<String>,
    ) -> Result<Option<Notice>> {
        let store = self.environment.local_store();
        if let Some(theme) = theme {
            store.set_theme(theme.parse::<Theme>()?).await?;
        }
        if let Some(font_size) = font_size {
            store.set_font_size(font_size.parse::<FontSize>()?).await?;
        }

        let state = store.load().await?;
        println!("Theme:     {}", state.theme);
        println!("Font size: {}", state.font_size);
        Ok(None)
    }

    async fn stats(&self, count: usize) -> Result<Option<Notice>> {
        let owner_id = self.environment.session().owner_id().await?;
        let cases = self.repository.list_cases(owner_id).await?;
        let stats = roster_stats(&cases);

        println!("Total:    {}", stats.total);
        println!("Analyzed: {}", stats.analyzed);
        println!("Pending:  {}", stats.pending);
        let mut by_urgency: Vec<_> = stats.by_urgency.iter().collect();
        by_urgency.sort_by_key(|(badge, _)| badge.as_str());
        for (badge, total) in by_urgency {
            println!("  {:<10} {}", badge.as_str(), total);
        }

        println!();
        for case in recent(&cases, count) {
            println!("{}", self.case_row(&case));
        }
        Ok(None)
    }
}

fn birth_date_arg(raw: &str) -> std::result::Result<chrono::NaiveDate, TriageError> {
    parse_date(raw).ok_or_else(|| TriageError::InvalidInput(format!("Invalid birth date: {}", raw)))
}

fn find_patient(patients: &[Patient], patient_id: i64) -> Result<&Patient> {
    patients
        .iter()
        .find(|p| p.id == patient_id)
        .with_context(|| format!("Patient #{} not found", patient_id))
}

/// 用命令行参数覆盖预填的编辑表单
fn apply_edits(mut intake: Intake, fields: EditArgs) -> Result<Intake> {
    if let Some(name) = fields.name {
        intake.full_name = name;
    }
    if let Some(birth_date) = fields.birth_date {
        intake.birth_date = Some(birth_date_arg(&birth_date)?);
    }
    if let Some(gender) = fields.gender {
        intake.gender = gender;
    }
    if let Some(history) = fields.history {
        intake.medical_history = history;
    }
    if let Some(symptoms) = fields.symptoms {
        intake.symptoms = symptoms;
    }
    if let Some(exams) = fields.exams {
        intake.exams = exams;
    }
    Ok(intake)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn intake() -> Intake {
        Intake {
            patient_id: Some(7),
            full_name: "Maria Santos".to_string(),
            birth_date: NaiveDate::from_ymd_opt(1973, 4, 2),
            gender: "feminino".to_string(),
            medical_history: "Hipertensão".to_string(),
            symptoms: "Dor torácica".to_string(),
            exams: String::new(),
        }
    }

    #[test]
    fn test_edits_override_only_given_fields() {
        let edited = apply_edits(
            intake(),
            EditArgs {
                symptoms: Some("Dor torácica e sudorese".to_string()),
                birth_date: Some("1973-04-03".to_string()),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(edited.symptoms, "Dor torácica e sudorese");
        assert_eq!(edited.birth_date, NaiveDate::from_ymd_opt(1973, 4, 3));
        assert_eq!(edited.full_name, "Maria Santos");
        assert_eq!(edited.patient_id, Some(7));
    }

    #[test]
    fn test_invalid_birth_date_is_rejected() {
        let result = apply_edits(
            intake(),
            EditArgs {
                birth_date: Some("02/04/1973x".to_string()),
                ..Default::default()
            },
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_find_patient() {
        let patients = vec![Patient {
            id: 7,
            full_name: "Maria Santos".to_string(),
            birth_date: None,
            gender: "feminino".to_string(),
            medical_history: None,
        }];
        assert_eq!(find_patient(&patients, 7).unwrap().full_name, "Maria Santos");
        assert!(find_patient(&patients, 8).is_err());
    }
}
