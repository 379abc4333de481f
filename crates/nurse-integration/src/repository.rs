//! 病例记录仓库接口

use async_trait::async_trait;
use nurse_core::{
    Case, CaseId, Clinician, ClinicianId, ClinicianPatch, Credentials, Intake, Patient, Result,
    Signup,
};

/// 病例服务的访问接口
///
/// 所有方法都是一次独立的网络调用，实现本身不缓存任何数据。创建、更新、删除成功后
/// 由调用方负责刷新或修补自己持有的列表。
#[async_trait]
pub trait RecordRepository: Send + Sync {
    /// 列出医生名下的病例
    async fn list_cases(&self, owner_id: ClinicianId) -> Result<Vec<Case>>;

    /// 获取病例详情
    async fn get_case(&self, case_id: CaseId) -> Result<Case>;

    /// 提交问诊表单，创建病例
    async fn create_case(&self, owner_id: ClinicianId, intake: &Intake) -> Result<Case>;

    /// 重新提交问诊表单
    async fn update_case(
        &self,
        case_id: CaseId,
        owner_id: ClinicianId,
        intake: &Intake,
    ) -> Result<Case>;

    /// 删除病例
    async fn delete_case(&self, case_id: CaseId, owner_id: ClinicianId) -> Result<()>;

    /// 列出医生名下的患者
    async fn list_patients(&self, owner_id: ClinicianId) -> Result<Vec<Patient>>;

    async fn get_clinician(&self, clinician_id: ClinicianId) -> Result<Clinician>;

    async fn update_clinician(
        &self,
        clinician_id: ClinicianId,
        patch: &ClinicianPatch,
    ) -> Result<Clinician>;

    async fn login(&self, credentials: &Credentials) -> Result<Clinician>;

    /// 注册新医生
    async fn create_clinician(&self, signup: &Signup) -> Result<Clinician>;
}
