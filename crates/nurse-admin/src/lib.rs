//! # 客户端运行环境
//!
//! 提供配置加载、日志初始化、会话上下文和本地偏好存储

pub mod config;
pub mod logging;
pub mod preferences;
pub mod session;

pub use config::{AppConfig, ConfigManager};
pub use logging::init_logging;
pub use preferences::{FontSize, LocalState, LocalStore, Theme};
pub use session::{Session, SessionContext};

use anyhow::Result;
use nurse_core::Clinician;
use std::path::Path;
use std::sync::Arc;

/// 客户端环境
///
/// 集成配置、会话和本地存储的统一入口点
#[derive(Debug)]
pub struct ClientEnvironment {
    /// 配置管理器
    config_manager: Arc<ConfigManager>,
    /// 当前会话
    session: SessionContext,
    /// 本地偏好存储
    local_store: LocalStore,
}

impl ClientEnvironment {
    /// 加载配置并准备本地存储，不初始化日志
    pub async fn new(config_path: Option<&Path>) -> Result<Self> {
        let config_manager = Arc::new(ConfigManager::new(config_path)?);
        let config = config_manager.get_config().await;
        let local_store = LocalStore::new(&config.storage.local_state_path);

        Ok(Self {
            config_manager,
            session: SessionContext::new(),
            local_store,
        })
    }

    pub fn config_manager(&self) -> &Arc<ConfigManager> {
        &self.config_manager
    }

    pub fn session(&self) -> &SessionContext {
        &self.session
    }

    pub fn local_store(&self) -> &LocalStore {
        &self.local_store
    }

    /// 从本地存储恢复上次登录的医生
    pub async fn restore_session(&self) -> Result<Option<Session>> {
        let state = self.local_store.load().await?;
        match state.clinician {
            Some(clinician) => {
                tracing::debug!("Restoring session for clinician {}", clinician.id);
                Ok(Some(self.session.begin(clinician).await))
            }
            None => Ok(None),
        }
    }

    /// 登录并记住医生身份
    pub async fn sign_in(&self, clinician: Clinician) -> Result<Session> {
        self.local_store.remember_clinician(&clinician).await?;
        Ok(self.session.begin(clinician).await)
    }

    /// 资料更新后同步会话和本地存储
    pub async fn refresh_profile(&self, clinician: Clinician) -> Result<()> {
        self.session.refresh_profile(clinician.clone()).await?;
        self.local_store.remember_clinician(&clinician).await?;
        Ok(())
    }

    /// 退出登录并清除本地保存的身份，偏好保留
    pub async fn sign_out(&self) -> Result<Option<Session>> {
        self.local_store.forget_clinician().await?;
        Ok(self.session.end().await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::tests::clinician;

    async fn environment(dir: &Path) -> ClientEnvironment {
        let config_path = dir.join("nurse-assist.toml");
        let state_path = dir.join("state").join("local.toml");
        std::fs::write(
            &config_path,
            format!("[storage]\nlocal_state_path = {:?}\n", state_path.display().to_string()),
        )
        .unwrap();
        ClientEnvironment::new(Some(&config_path)).await.unwrap()
    }

    #[tokio::test]
    async fn test_session_survives_restart() {
        let dir = tempfile::tempdir().unwrap();

        let first = environment(dir.path()).await;
        assert!(first.restore_session().await.unwrap().is_none());
        first.sign_in(clinician(5)).await.unwrap();
        first.local_store().set_theme(Theme::Dark).await.unwrap();

        let second = environment(dir.path()).await;
        let restored = second.restore_session().await.unwrap().unwrap();
        assert_eq!(restored.clinician.id, 5);
        assert_eq!(second.session().owner_id().await.unwrap(), 5);

        second.sign_out().await.unwrap();
        let third = environment(dir.path()).await;
        assert!(third.restore_session().await.unwrap().is_none());
        assert_eq!(third.local_store().load().await.unwrap().theme, Theme::Dark);
    }
}
