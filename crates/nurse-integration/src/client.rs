//! 基于 reqwest 的病例服务客户端
//!
//! 错误映射规则：
//! - 没有收到响应（连接失败、传输中断）映射为 `ConnectionUnavailable`
//! - 收到非成功状态码映射为 `RequestFailed`，并带上服务端的 `detail` 消息
//! - 必填字段在发送请求之前校验，校验失败不会产生任何网络调用

use async_trait::async_trait;
use nurse_core::{
    Case, CaseId, Clinician, ClinicianId, ClinicianPatch, Credentials, Intake, Patient, Result,
    Signup, TriageError,
};
use reqwest::{Method, RequestBuilder};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, error, info, warn};

use crate::repository::RecordRepository;
use crate::wire::{
    error_detail, CaseBodyWire, CaseWire, ClinicianPatchWire, ClinicianWire, LoginWire,
    PatientWire, SignupWire,
};

/// HTTP 病例仓库
#[derive(Debug, Clone)]
pub struct HttpRecordRepository {
    base_url: String,
    client: reqwest::Client,
}

impl HttpRecordRepository {
    /// 创建客户端，不设置请求超时
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        Self::with_connect_timeout(base_url, None)
    }

    /// 创建客户端，可选连接超时
    pub fn with_connect_timeout(
        base_url: impl Into<String>,
        connect_timeout: Option<Duration>,
    ) -> Result<Self> {
        let base_url = base_url.into().trim().trim_end_matches('/').to_string();
        if base_url.is_empty() {
            return Err(TriageError::Config("Case service base URL is empty".to_string()));
        }

        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = connect_timeout {
            builder = builder.connect_timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| TriageError::Config(format!("Failed to build HTTP client: {}", e)))?;

        info!("Case service client targeting {}", base_url);
        Ok(Self { base_url, client })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        debug!("{} {}", method, url);
        self.client.request(method, url)
    }

    /// 发送请求并读取响应体
    async fn execute(&self, request: RequestBuilder) -> Result<Vec<u8>> {
        let response = request.send().await.map_err(|e| {
            error!("Case service unreachable: {}", e);
            TriageError::ConnectionUnavailable(e.to_string())
        })?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| TriageError::ConnectionUnavailable(e.to_string()))?
            .to_vec();

        if !status.is_success() {
            let server_message = error_detail(&body);
            error!(
                "Case service answered {} ({})",
                status.as_u16(),
                server_message.as_deref().unwrap_or("no detail")
            );
            return Err(TriageError::RequestFailed {
                status_code: status.as_u16(),
                server_message,
            });
        }

        Ok(body)
    }

    async fn execute_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let body = self.execute(request).await?;
        Ok(serde_json::from_slice(&body)?)
    }
}

#[async_trait]
impl RecordRepository for HttpRecordRepository {
    async fn list_cases(&self, owner_id: ClinicianId) -> Result<Vec<Case>> {
        let request = self
            .request(Method::GET, "/cases/")
            .query(&[("owner_id", owner_id)]);
        let wires: Vec<CaseWire> = self.execute_json(request).await?;

        // 单条记录损坏时跳过该行，名单其余部分照常显示
        let cases: Vec<Case> = wires
            .into_iter()
            .filter_map(|wire| {
                let case_id = wire.id;
                Case::try_from(wire)
                    .map_err(|e| warn!("Skipping case {} in roster: {}", case_id, e))
                    .ok()
            })
            .collect();
        info!("Fetched {} cases for clinician {}", cases.len(), owner_id);
        Ok(cases)
    }

    async fn get_case(&self, case_id: CaseId) -> Result<Case> {
        let request = self.request(Method::GET, &format!("/cases/{}", case_id));
        let wire: CaseWire = self.execute_json(request).await?;
        let case = Case::try_from(wire)?;

        if case.analysis.is_none() {
            warn!("Case {} has no analysis attached", case_id);
        }
        Ok(case)
    }

    async fn create_case(&self, owner_id: ClinicianId, intake: &Intake) -> Result<Case> {
        intake.validate()?;

        let request = self
            .request(Method::POST, "/cases/")
            .query(&[("owner_id", owner_id)])
            .json(&CaseBodyWire::from(intake));
        let wire: CaseWire = self.execute_json(request).await?;
        let case = Case::try_from(wire.fill_from(intake))?;

        info!("Created case {} for clinician {}", case.id, owner_id);
        Ok(case)
    }

    async fn update_case(
        &self,
        case_id: CaseId,
        owner_id: ClinicianId,
        intake: &Intake,
    ) -> Result<Case> {
        intake.validate()?;

        let request = self
            .request(Method::PUT, &format!("/cases/{}", case_id))
            .query(&[("owner_id", owner_id)])
            .json(&CaseBodyWire::from(intake));
        let wire: CaseWire = self.execute_json(request).await?;
        let case = Case::try_from(wire.fill_from(intake))?;

        info!("Updated case {}", case.id);
        Ok(case)
    }

    async fn delete_case(&self, case_id: CaseId, owner_id: ClinicianId) -> Result<()> {
        let request = self
            .request(Method::DELETE, &format!("/cases/{}", case_id))
            .query(&[("owner_id", owner_id)]);
        self.execute(request).await?;

        info!("Deleted case {}", case_id);
        Ok(())
    }

    async fn list_patients(&self, owner_id: ClinicianId) -> Result<Vec<Patient>> {
        let request = self
            .request(Method::GET, "/patients/")
            .query(&[("owner_id", owner_id)]);
        let wires: Vec<PatientWire> = self.execute_json(request).await?;

        let patients: Vec<Patient> = wires.into_iter().map(Patient::from).collect();
        info!("Fetched {} patients for clinician {}", patients.len(), owner_id);
        Ok(patients)
    }

    async fn get_clinician(&self, clinician_id: ClinicianId) -> Result<Clinician> {
        let request = self.request(Method::GET, &format!("/users/{}", clinician_id));
        let wire: ClinicianWire = self.execute_json(request).await?;
        Ok(wire.into())
    }

    async fn update_clinician(
        &self,
        clinician_id: ClinicianId,
        patch: &ClinicianPatch,
    ) -> Result<Clinician> {
        let request = self
            .request(Method::PUT, &format!("/users/{}", clinician_id))
            .json(&ClinicianPatchWire::from(patch));
        let wire: ClinicianWire = self.execute_json(request).await?;

        info!("Updated profile of clinician {}", clinician_id);
        Ok(wire.into())
    }

    async fn login(&self, credentials: &Credentials) -> Result<Clinician> {
        credentials.validate()?;

        let request = self
            .request(Method::POST, "/login")
            .json(&LoginWire::from(credentials));
        let wire: ClinicianWire = self.execute_json(request).await?;

        info!("Clinician {} signed in", wire.id);
        Ok(wire.into())
    }

    async fn create_clinician(&self, signup: &Signup) -> Result<Clinician> {
        signup.validate()?;

        let request = self
            .request(Method::POST, "/users/")
            .json(&SignupWire::from(signup));
        let wire: ClinicianWire = self.execute_json(request).await?;

        info!("Registered clinician {}", wire.id);
        Ok(wire.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_is_normalised() {
        let repo = HttpRecordRepository::new("http://127.0.0.1:8000/").unwrap();
        assert_eq!(repo.base_url(), "http://127.0.0.1:8000");
    }

    #[test]
    fn test_empty_base_url_is_rejected() {
        assert!(matches!(
            HttpRecordRepository::new("  "),
            Err(TriageError::Config(_))
        ));
    }

    #[tokio::test]
    async fn test_validation_happens_before_network() {
        // 端口 9 上没有服务；若发出了请求会得到连接错误而不是校验错误
        let repo = HttpRecordRepository::new("http://127.0.0.1:9").unwrap();
        let intake = Intake {
            full_name: "Maria Santos".to_string(),
            gender: "feminino".to_string(),
            ..Default::default()
        };
        let err = repo.create_case(1, &intake).await.unwrap_err();
        assert!(matches!(err, TriageError::ValidationMissing { field: "symptoms" }));
    }
}
