use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};

use crate::error::{ClusterError, ClusterResult};
use crate::id::{FrameworkId, TaskId};
use crate::store::{Worker, WorkerStore};

const STORE_FILE_NAME: &str = "workers.json";

/// A worker store backed by a JSON document on the local filesystem.
///
/// Every mutation rewrites the document through a temporary file and an
/// atomic rename, so a record write either fully lands or is lost as a
/// whole. The document is small (one entry per in-flight worker), which
/// keeps the full rewrite cheap.
#[derive(Debug, Clone)]
pub struct FsWorkerStore {
    path: PathBuf,
    inner: Arc<Mutex<Option<Document>>>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct Document {
    framework_id: Option<FrameworkId>,
    next_task_id: u64,
    workers: Vec<Worker>,
}

impl FsWorkerStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            inner: Arc::new(Mutex::new(None)),
        }
    }

    fn file_path(&self) -> PathBuf {
        self.path.join(STORE_FILE_NAME)
    }

    fn load(path: &Path) -> ClusterResult<Document> {
        if !path.exists() {
            return Ok(Document::default());
        }
        let data = fs::read(path)?;
        serde_json::from_slice(&data)
            .map_err(|e| ClusterError::StoreError(format!("corrupt store document: {e}")))
    }

    fn persist(&self, document: &Document) -> ClusterResult<()> {
        let data = serde_json::to_vec_pretty(document)
            .map_err(|e| ClusterError::StoreError(e.to_string()))?;
        let temp = self.path.join(format!("{STORE_FILE_NAME}.tmp"));
        fs::write(&temp, data)?;
        fs::rename(&temp, self.file_path())?;
        Ok(())
    }

    /// Runs a mutation against the loaded document and persists the result.
    /// A failed mutation leaves the document unwritten.
    fn update<T>(&self, f: impl FnOnce(&mut Document) -> ClusterResult<T>) -> ClusterResult<T> {
        let mut inner = self.inner.lock()?;
        let document = inner
            .as_mut()
            .ok_or_else(|| ClusterError::StoreError("store is not started".to_string()))?;
        let out = f(document)?;
        self.persist(document)?;
        Ok(out)
    }

    fn read<T>(&self, f: impl FnOnce(&Document) -> T) -> ClusterResult<T> {
        let inner = self.inner.lock()?;
        let document = inner
            .as_ref()
            .ok_or_else(|| ClusterError::StoreError("store is not started".to_string()))?;
        Ok(f(document))
    }
}

impl WorkerStore for FsWorkerStore {
    fn start(&self) -> ClusterResult<()> {
        fs::create_dir_all(&self.path)?;
        let document = Self::load(&self.file_path())?;
        let mut inner = self.inner.lock()?;
        *inner = Some(document);
        Ok(())
    }

    fn stop(&self, cleanup: bool) -> ClusterResult<()> {
        let mut inner = self.inner.lock()?;
        if inner.take().is_some() && cleanup {
            let path = self.file_path();
            if path.exists() {
                fs::remove_file(path)?;
            }
        }
        Ok(())
    }

    fn framework_id(&self) -> ClusterResult<Option<FrameworkId>> {
        self.read(|document| document.framework_id.clone())
    }

    fn set_framework_id(&self, framework_id: &FrameworkId) -> ClusterResult<()> {
        self.update(|document| {
            document.framework_id = Some(framework_id.clone());
            Ok(())
        })
    }

    fn new_task_id(&self) -> ClusterResult<TaskId> {
        self.update(|document| {
            let value = document
                .next_task_id
                .checked_add(1)
                .ok_or_else(|| ClusterError::StoreError("task ID overflow".to_string()))?;
            document.next_task_id = value;
            Ok(TaskId::from(value))
        })
    }

    fn put_worker(&self, worker: &Worker) -> ClusterResult<()> {
        self.update(|document| {
            match document
                .workers
                .iter_mut()
                .find(|x| x.task_id == worker.task_id)
            {
                Some(existing) => *existing = worker.clone(),
                None => document.workers.push(worker.clone()),
            }
            Ok(())
        })
    }

    fn remove_worker(&self, task_id: TaskId) -> ClusterResult<bool> {
        self.update(|document| {
            let count = document.workers.len();
            document.workers.retain(|x| x.task_id != task_id);
            Ok(document.workers.len() < count)
        })
    }

    fn recover_workers(&self) -> ClusterResult<Vec<Worker>> {
        self.read(|document| {
            let mut workers = document.workers.clone();
            workers.sort_by_key(|x| x.task_id);
            workers
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::SlaveId;
    use crate::store::{ResourceProfile, WorkerState};

    fn temp_store_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("moor-store-{name}-{}", std::process::id()))
    }

    #[test]
    fn test_state_survives_restart() {
        let path = temp_store_path("restart");
        let store = FsWorkerStore::new(&path);
        store.start().unwrap();
        store.set_framework_id(&FrameworkId::from("framework-1")).unwrap();
        let task_id = store.new_task_id().unwrap();
        let worker = Worker::new(task_id, ResourceProfile::unknown())
            .launch(SlaveId::from("slave-1"), "host-1".to_string());
        store.put_worker(&worker).unwrap();
        store.stop(false).unwrap();

        let store = FsWorkerStore::new(&path);
        store.start().unwrap();
        assert_eq!(
            store.framework_id().unwrap(),
            Some(FrameworkId::from("framework-1"))
        );
        assert_eq!(store.recover_workers().unwrap(), vec![worker.clone()]);
        match &store.recover_workers().unwrap()[0].state {
            WorkerState::Launched { hostname, .. } => assert_eq!(hostname, "host-1"),
            state => panic!("unexpected state: {state:?}"),
        }
        // Task identifiers keep advancing across restarts.
        assert!(u64::from(store.new_task_id().unwrap()) > u64::from(task_id));
        store.stop(true).unwrap();
        fs::remove_dir_all(&path).unwrap();
    }

    #[test]
    fn test_stop_with_cleanup_discards_state() {
        let path = temp_store_path("cleanup");
        let store = FsWorkerStore::new(&path);
        store.start().unwrap();
        let task_id = store.new_task_id().unwrap();
        store
            .put_worker(&Worker::new(task_id, ResourceProfile::unknown()))
            .unwrap();
        store.stop(true).unwrap();

        let store = FsWorkerStore::new(&path);
        store.start().unwrap();
        assert!(store.recover_workers().unwrap().is_empty());
        store.stop(true).unwrap();
        fs::remove_dir_all(&path).unwrap();
    }

    #[test]
    fn test_task_id_overflow_is_an_error() {
        let path = temp_store_path("overflow");
        fs::create_dir_all(&path).unwrap();
        fs::write(
            path.join(STORE_FILE_NAME),
            format!(r#"{{"framework_id":null,"next_task_id":{},"workers":[]}}"#, u64::MAX),
        )
        .unwrap();
        let store = FsWorkerStore::new(&path);
        store.start().unwrap();
        assert!(store.new_task_id().is_err());
        store.stop(true).unwrap();
        fs::remove_dir_all(&path).unwrap();
    }

    #[test]
    fn test_operations_require_start() {
        let store = FsWorkerStore::new(temp_store_path("unstarted"));
        assert!(store.new_task_id().is_err());
        assert!(store.recover_workers().is_err());
    }
}
