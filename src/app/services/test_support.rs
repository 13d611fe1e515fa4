use std::collections::BTreeSet;
use std::sync::{Arc, Mutex};

use crate::domain::error::TransportError;
use crate::domain::ports::MockTransport;

/// 以内存集合模拟远程目录状态，记录每次 make_directory 调用
#[derive(Clone, Default)]
pub struct RemoteState {
    pub dirs: Arc<Mutex<BTreeSet<String>>>,
    pub mkdir_calls: Arc<Mutex<Vec<String>>>,
    pub recursive_calls: Arc<Mutex<Vec<String>>>,
    pub uploads: Arc<Mutex<Vec<String>>>,
}

impl RemoteState {
    pub fn with_dirs(dirs: &[&str]) -> Self {
        let state = Self::default();
        state
            .dirs
            .lock()
            .unwrap()
            .extend(dirs.iter().map(|d| d.to_string()));
        state
    }

    pub fn mkdir_calls(&self) -> Vec<String> {
        self.mkdir_calls.lock().unwrap().clone()
    }

    pub fn recursive_calls(&self) -> Vec<String> {
        self.recursive_calls.lock().unwrap().clone()
    }

    pub fn uploads(&self) -> Vec<String> {
        self.uploads.lock().unwrap().clone()
    }
}

/// exists/make_directory/upload_file 作用在 RemoteState 上；
/// connect/close/change_permissions/delete_file 留给调用方设置期望
pub fn mock_over(state: &RemoteState) -> MockTransport {
    let mut mock = MockTransport::new();

    let dirs = state.dirs.clone();
    mock.expect_exists()
        .returning(move |p| Ok(dirs.lock().unwrap().contains(p)));

    let dirs = state.dirs.clone();
    let calls = state.mkdir_calls.clone();
    let recursive_calls = state.recursive_calls.clone();
    mock.expect_make_directory().returning(move |p, recursive| {
        calls.lock().unwrap().push(p.to_string());
        if recursive {
            recursive_calls.lock().unwrap().push(p.to_string());
        }
        if !dirs.lock().unwrap().insert(p.to_string()) {
            return Err(TransportError::from_message("File exists"));
        }
        Ok(())
    });

    let uploads = state.uploads.clone();
    mock.expect_upload_file().returning(move |_, remote| {
        uploads.lock().unwrap().push(remote.to_string());
        Ok(42)
    });

    mock
}
