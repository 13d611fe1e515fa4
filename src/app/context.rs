use std::path::PathBuf;

use anyhow::Result;

use crate::domain::config::StagingConfig;
use crate::domain::ports::ConfigRepository;
use crate::infra::config_store::TomlConfigStore;
use crate::infra::factory::ConfiguredTransportFactory;

use super::services::stager::Stager;

pub struct AppContext {
    pub config: StagingConfig,
}

impl AppContext {
    /// 加载配置 (指定路径或默认位置)，应用环境变量覆盖并校验
    pub fn bootstrap(config_path: Option<PathBuf>) -> Result<Self> {
        let repo: Box<dyn ConfigRepository> = match config_path {
            Some(path) => Box::new(TomlConfigStore::at(path)),
            None => Box::new(TomlConfigStore::new()),
        };
        let config = repo.load()?.with_env_overrides();
        config.validate()?;
        Ok(Self { config })
    }

    pub fn stager(&self) -> Stager<ConfiguredTransportFactory> {
        Stager::new(
            self.config.clone(),
            ConfiguredTransportFactory::new(self.config.transport),
        )
    }
}
