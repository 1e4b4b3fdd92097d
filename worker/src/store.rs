use worker::kv::KvStore;

use crate::error::*;

/// Blob storage for serialized leaderboards, one value per key.
#[allow(async_fn_in_trait)]
pub trait ScoreStore {
    async fn load(&self, key: &str) -> Result<Option<String>>;
    async fn save(&self, key: &str, blob: String) -> Result<()>;
}

/// Workers KV namespace. Reads may be stale for a while after a write elsewhere.
pub struct KvScoreStore {
    kv: KvStore,
}

impl KvScoreStore {
    pub fn from_env(env: &worker::Env, binding: &str) -> Result<Self> {
        let kv = env
            .kv(binding)
            .map_err(|err| ServiceError::StorageUnavailable(format!("binding {binding}: {err}")))?;
        Ok(Self { kv })
    }
}

impl ScoreStore for KvScoreStore {
    async fn load(&self, key: &str) -> Result<Option<String>> {
        self.kv
            .get(key)
            .text()
            .await
            .map_err(|err| ServiceError::StorageUnavailable(format!("get {key}: {err:?}")))
    }

    async fn save(&self, key: &str, blob: String) -> Result<()> {
        self.kv
            .put(key, blob)
            .map_err(|err| ServiceError::StorageUnavailable(format!("put {key}: {err:?}")))?
            .execute()
            .await
            .map_err(|err| ServiceError::StorageUnavailable(format!("put {key}: {err:?}")))
    }
}

#[cfg(test)]
pub(crate) mod memory {
    use std::cell::{Cell, RefCell};
    use std::collections::HashMap;

    use super::*;

    #[derive(Default)]
    pub struct MemoryScoreStore {
        blobs: RefCell<HashMap<String, String>>,
        pub offline: Cell<bool>,
        pub writes: Cell<usize>,
    }

    impl MemoryScoreStore {
        pub fn with_blob(key: &str, blob: &str) -> Self {
            let store = Self::default();
            store.blobs.borrow_mut().insert(key.to_string(), blob.to_string());
            store
        }

        pub fn blob(&self, key: &str) -> Option<String> {
            self.blobs.borrow().get(key).cloned()
        }

        fn check_online(&self) -> Result<()> {
            if self.offline.get() {
                Err(ServiceError::StorageUnavailable("offline".to_string()))
            } else {
                Ok(())
            }
        }
    }

    impl ScoreStore for MemoryScoreStore {
        async fn load(&self, key: &str) -> Result<Option<String>> {
            self.check_online()?;
            Ok(self.blob(key))
        }

        async fn save(&self, key: &str, blob: String) -> Result<()> {
            self.check_online()?;
            self.writes.set(self.writes.get() + 1);
            self.blobs.borrow_mut().insert(key.to_string(), blob);
            Ok(())
        }
    }
}
