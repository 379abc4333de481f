//! 会话上下文
//!
//! 当前登录的医生通过显式注入的 [`SessionContext`] 传递给需要它的命令。
//! 生命周期：登录时写入，退出时清空，其余位置只读。

use chrono::{DateTime, Utc};
use nurse_core::{Clinician, ClinicianId, Result, TriageError};
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

/// 一次登录会话
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub id: Uuid,
    pub clinician: Clinician,
    pub started_at: DateTime<Utc>,
}

/// 会话上下文，克隆后共享同一份状态
#[derive(Debug, Clone, Default)]
pub struct SessionContext {
    inner: Arc<RwLock<Option<Session>>>,
}

impl SessionContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// 登录成功后开始会话
    pub async fn begin(&self, clinician: Clinician) -> Session {
        let session = Session {
            id: Uuid::new_v4(),
            clinician,
            started_at: Utc::now(),
        };

        let mut guard = self.inner.write().await;
        if let Some(previous) = guard.replace(session.clone()) {
            tracing::info!("Replacing session {} of clinician {}", previous.id, previous.clinician.id);
        }
        tracing::info!("Session {} started for clinician {}", session.id, session.clinician.id);
        session
    }

    /// 退出登录
    pub async fn end(&self) -> Option<Session> {
        let ended = self.inner.write().await.take();
        if let Some(session) = &ended {
            tracing::info!("Session {} ended", session.id);
        }
        ended
    }

    /// 资料更新后刷新会话中的医生信息，ID 必须一致
    pub async fn refresh_profile(&self, clinician: Clinician) -> Result<()> {
        let mut guard = self.inner.write().await;
        match guard.as_mut() {
            Some(session) if session.clinician.id == clinician.id => {
                session.clinician = clinician;
                Ok(())
            }
            Some(_) => Err(TriageError::InvalidInput(
                "Profile does not belong to the signed-in clinician".to_string(),
            )),
            None => Err(TriageError::NotAuthenticated),
        }
    }

    pub async fn current(&self) -> Option<Session> {
        self.inner.read().await.clone()
    }

    pub async fn is_authenticated(&self) -> bool {
        self.inner.read().await.is_some()
    }

    /// 当前医生，未登录时返回 `NotAuthenticated`
    pub async fn clinician(&self) -> Result<Clinician> {
        self.inner
            .read()
            .await
            .as_ref()
            .map(|s| s.clinician.clone())
            .ok_or(TriageError::NotAuthenticated)
    }

    /// 按医生划分的仓库调用使用的 owner id
    pub async fn owner_id(&self) -> Result<ClinicianId> {
        self.inner
            .read()
            .await
            .as_ref()
            .map(|s| s.clinician.id)
            .ok_or(TriageError::NotAuthenticated)
    }
}
