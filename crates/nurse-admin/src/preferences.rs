//! 本地偏好存储
//!
//! 保存显示偏好（主题、字号）和最近登录的医生身份，启动时重新应用。
//! 病例数据不做本地持久化。

use anyhow::{Context, Result};
use nurse_core::Clinician;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{info, warn};

/// 颜色主题
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

/// 文字大小
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontSize {
    Small,
    #[default]
    Medium,
    Large,
}

impl FromStr for Theme {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_lowercase().as_str() {
            "light" => Ok(Self::Light),
            "dark" => Ok(Self::Dark),
            other => Err(anyhow::anyhow!("Unknown theme: {}", other)),
        }
    }
}

impl FromStr for FontSize {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_lowercase().as_str() {
            "small" => Ok(Self::Small),
            "medium" => Ok(Self::Medium),
            "large" => Ok(Self::Large),
            other => Err(anyhow::anyhow!("Unknown font size: {}", other)),
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Light => write!(f, "light"),
            Self::Dark => write!(f, "dark"),
        }
    }
}

impl fmt::Display for FontSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Small => write!(f, "small"),
            Self::Medium => write!(f, "medium"),
            Self::Large => write!(f, "large"),
        }
    }
}

/// 持久化的本地状态
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocalState {
    pub theme: Theme,
    pub font_size: FontSize,
    pub clinician: Option<Clinician>,
}

/// TOML 文件形式的本地键值存储
#[derive(Debug, Clone)]
pub struct LocalStore {
    path: PathBuf,
}

impl LocalStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 读取本地状态；文件不存在或已损坏时返回默认值
    pub async fn load(&self) -> Result<LocalState> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(LocalState::default());
            }
            Err(e) => {
                return Err(e).with_context(|| format!("Failed to read {}", self.path.display()))
            }
        };

        match toml::from_str::<LocalState>(&content) {
            Ok(state) => Ok(state),
            Err(e) => {
                warn!("Ignoring unreadable local state {}: {}", self.path.display(), e);
                Ok(LocalState::default())
            }
        }
    }

    pub async fn save(&self, state: &LocalState) -> Result<()> {
        let content = toml::to_string_pretty(state).context("Failed to serialize local state")?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        tokio::fs::write(&self.path, content)
            .await
            .with_context(|| format!("Failed to write {}", self.path.display()))?;
        Ok(())
    }

    /// 读取、修改并写回
    pub async fn update<F>(&self, change: F) -> Result<LocalState>
    where
        F: FnOnce(&mut LocalState),
    {
        let mut state = self.load().await?;
        change(&mut state);
        self.save(&state).await?;
        Ok(state)
    }

    pub async fn set_theme(&self, theme: Theme) -> Result<LocalState> {
        info!("Theme set to {}", theme);
        self.update(|state| state.theme = theme).await
    }

    pub async fn set_font_size(&self, font_size: FontSize) -> Result<LocalState> {
        info!("Font size set to {}", font_size);
        self.update(|state| state.font_size = font_size).await
    }

    pub async fn remember_clinician(&self, clinician: &Clinician) -> Result<LocalState> {
        let clinician = clinician.clone();
        self.update(|state| state.clinician = Some(clinician)).await
    }

    pub async fn forget_clinician(&self) -> Result<LocalState> {
        self.update(|state| state.clinician = None).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::tests::clinician;

    #[tokio::test]
    async fn test_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStore::new(dir.path().join("local.toml"));
        let state = store.load().await.unwrap();
        assert_eq!(state, LocalState::default());
        assert_eq!(state.font_size, FontSize::Medium);
    }

    #[tokio::test]
    async fn test_preferences_survive_restart() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("local.toml");

        let store = LocalStore::new(&path);
        store.set_theme(Theme::Dark).await.unwrap();
        store.set_font_size(FontSize::Large).await.unwrap();
        store.remember_clinician(&clinician(3)).await.unwrap();

        let reopened = LocalStore::new(&path).load().await.unwrap();
        assert_eq!(reopened.theme, Theme::Dark);
        assert_eq!(reopened.font_size, FontSize::Large);
        assert_eq!(reopened.clinician.map(|c| c.id), Some(3));

        let cleared = store.forget_clinician().await.unwrap();
        assert!(cleared.clinician.is_none());
        assert_eq!(cleared.theme, Theme::Dark);
    }

    #[tokio::test]
    async fn test_corrupt_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("local.toml");
        std::fs::write(&path, "theme = [").unwrap();
        assert_eq!(LocalStore::new(&path).load().await.unwrap(), LocalState::default());
    }

    #[test]
    fn test_parse_preferences() {
        assert_eq!("Dark".parse::<Theme>().unwrap(), Theme::Dark);
        assert_eq!("small".parse::<FontSize>().unwrap(), FontSize::Small);
        assert!("huge".parse::<FontSize>().is_err());
    }
}
