use crate::domain::config::StagingConfig;
use crate::domain::error::{StageError, TransportError, TransportErrorKind, UploadError};
use crate::domain::layout::{generate_unique_file_name, RemoteLayout};
use crate::domain::ports::{Transport, TransportFactory};
use crate::domain::upload::{UploadRequest, UploadResult};
use crate::shared::path_utils;

use super::ensure_dir::ensure_directory;

/// 单次操作独占的传输会话，离开作用域时关闭 (仅一次)
struct Session {
    transport: Box<dyn Transport>,
}

impl Session {
    fn transport(&mut self) -> &mut dyn Transport {
        self.transport.as_mut()
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.transport.close();
        tracing::debug!("传输会话已关闭");
    }
}

/// 上传/删除入口。每次调用都新建并认证一个独立会话，不复用、不共享。
pub struct Stager<F> {
    config: StagingConfig,
    layout: RemoteLayout,
    factory: F,
}

impl<F: TransportFactory> Stager<F> {
    pub fn new(config: StagingConfig, factory: F) -> Self {
        let layout = RemoteLayout::new(config.uploads_root(), config.public_base_url.clone());
        Self {
            config,
            layout,
            factory,
        }
    }

    pub fn layout(&self) -> &RemoteLayout {
        &self.layout
    }

    fn connect_error(&self, source: TransportError) -> StageError {
        match source.kind {
            TransportErrorKind::Authentication => StageError::Authentication {
                host: self.config.host.clone(),
                user: self.config.user.clone(),
                source,
            },
            _ => StageError::Connection {
                host: self.config.host.clone(),
                port: self.config.port,
                source,
            },
        }
    }

    /// 创建并连接会话；连接失败时会话在返回前已被关闭
    fn open_session(&self) -> Result<Session, StageError> {
        let mut session = Session {
            transport: self.factory.create(),
        };
        let credentials = self.config.credentials();
        tracing::debug!(
            transport = %self.config.transport,
            host = %credentials.host,
            port = credentials.port,
            user = %credentials.user,
            "建立传输会话"
        );
        session
            .transport()
            .connect(&credentials)
            .map_err(|e| self.connect_error(e))?;
        Ok(session)
    }

    /// 上传本地文件到 <uploads>/<category>/<随机名><扩展名>
    ///
    /// 只有在传输完成后才返回结果；任何失败都包装为带本地/远程路径的 `UploadError`。
    pub fn upload(&self, request: &UploadRequest) -> Result<UploadResult, UploadError> {
        let local = &request.local_file_path;
        let category = &request.category;
        let directory = self.layout.resolve_directory(category);

        let fail = |remote: &str, kind: StageError| {
            tracing::error!(local = ?local, remote, error = %kind, "上传失败");
            UploadError {
                local: local.clone(),
                remote: remote.to_string(),
                kind,
            }
        };

        path_utils::ensure_readable_file(local).map_err(|e| fail(&directory, e))?;

        let mut session = self.open_session().map_err(|e| fail(&directory, e))?;

        ensure_directory(session.transport(), &directory, self.config.directory_mode)
            .map_err(|e| fail(&directory, e))?;

        let name = generate_unique_file_name(local);
        let remote_path = self.layout.remote_path(category, &name.file_name);

        tracing::debug!(local = ?local, remote = %remote_path, "开始上传");
        let bytes = session
            .transport()
            .upload_file(local, &remote_path)
            .map_err(|e| fail(&remote_path, StageError::at_path(&remote_path, e)))?;
        drop(session);

        let result = UploadResult {
            url: self.layout.public_url(category, &name.file_name),
            key: RemoteLayout::key(category, &name.file_name),
            public_id: name.public_id,
        };
        tracing::info!(key = %result.key, bytes, "上传完成");
        Ok(result)
    }

    /// 按 key 删除远程文件。
    ///
    /// 任何失败都只记录日志并返回 false，调用方无法区分 "文件不存在" 与传输故障。
    pub fn remove(&self, key: &str) -> bool {
        let remote_path = self.layout.path_for_key(key);

        let result = self.open_session().and_then(|mut session| {
            session
                .transport()
                .delete_file(&remote_path)
                .map_err(|e| StageError::at_path(&remote_path, e))
        });

        match result {
            Ok(()) => {
                tracing::info!(key, "远程文件已删除");
                true
            }
            Err(e) => {
                tracing::error!(key, remote = %remote_path, error = %e, "删除远程文件失败");
                false
            }
        }
    }

    /// 连接测试：建立会话并检查 uploads 根目录是否存在
    pub fn check(&self) -> Result<bool, StageError> {
        let root = self.layout.uploads_root().to_string();
        let mut session = self.open_session()?;
        session
            .transport()
            .exists(&root)
            .map_err(|e| StageError::at_path(&root, e))
    }
}
