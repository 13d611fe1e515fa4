use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;

use crate::domain::config::StagingConfig;
use crate::domain::ports::ConfigRepository;

/// TOML 配置存储，默认位置:
/// Windows: %APPDATA%/stager/stager.toml
/// Linux: ~/.config/stager/stager.toml
pub struct TomlConfigStore {
    path: Option<PathBuf>,
}

impl TomlConfigStore {
    pub fn new() -> Self {
        Self { path: None }
    }

    /// 使用指定的配置文件
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
        }
    }

    fn config_path(&self) -> Result<PathBuf> {
        if let Some(path) = &self.path {
            return Ok(path.clone());
        }
        let mut path = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("无法获取系统配置目录"))?;
        path.push("stager");
        path.push("stager.toml");
        Ok(path)
    }
}

impl Default for TomlConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigRepository for TomlConfigStore {
    fn load(&self) -> Result<StagingConfig> {
        let config_path = self.config_path()?;

        if config_path.exists() {
            let content = fs::read_to_string(&config_path)
                .with_context(|| format!("无法读取配置文件: {:?}", config_path))?;
            let config: StagingConfig = toml::from_str(&content)
                .with_context(|| format!("配置文件格式错误，请检查 {:?}", config_path))?;
            Ok(config)
        } else {
            let config = StagingConfig::default();
            self.save(&config)
                .with_context(|| "创建默认配置文件失败")?;
            tracing::info!(path = ?config_path, "已创建默认配置文件");
            Ok(config)
        }
    }

    fn save(&self, config: &StagingConfig) -> Result<()> {
        let config_path = self.config_path()?;

        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("无法创建配置目录: {:?}", parent))?;
        }

        let content = toml::to_string_pretty(config)
            .with_context(|| "序列化配置失败")?;

        fs::write(&config_path, content)
            .with_context(|| format!("无法写入配置文件: {:?}", config_path))?;

        Ok(())
    }
}
