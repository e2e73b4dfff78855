//! Durable key/value storage backing the session
//!
//! Only strings are stored. The session store owns the keys and the encoding,
//! backends just need to survive a restart (or not, for [`MemoryStorage`]).

use std::{
    collections::HashMap,
    fmt::Debug,
    sync::{Arc, Mutex},
};

pub trait SessionStorage: Debug + Send {
    fn get(&self, key: &str) -> anyhow::Result<Option<String>>;
    fn set(&mut self, key: &str, value: &str) -> anyhow::Result<()>;
    /// Removing a key that is not present is not an error
    fn remove(&mut self, key: &str) -> anyhow::Result<()>;
}

/// Keeps values in memory only
///
/// Clones share the same values which lets tests inspect what was persisted
#[derive(Default, Clone)]
pub struct MemoryStorage {
    values: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_values<K, V, I>(values: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let values = values
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self {
            values: Arc::new(Mutex::new(values)),
        }
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.values
            .lock()
            .expect("mutex poisoned")
            .contains_key(key)
    }

    pub fn is_empty(&self) -> bool {
        self.values.lock().expect("mutex poisoned").is_empty()
    }
}

/// Only lists the keys, the values include the token
impl Debug for MemoryStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut keys: Vec<String> = self
            .values
            .lock()
            .expect("mutex poisoned")
            .keys()
            .cloned()
            .collect();
        keys.sort();
        f.debug_struct("MemoryStorage").field("keys", &keys).finish()
    }
}

impl SessionStorage for MemoryStorage {
    fn get(&self, key: &str) -> anyhow::Result<Option<String>> {
        Ok(self.values.lock().expect("mutex poisoned").get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> anyhow::Result<()> {
        self.values
            .lock()
            .expect("mutex poisoned")
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> anyhow::Result<()> {
        self.values.lock().expect("mutex poisoned").remove(key);
        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
pub use file::FileStorage;

#[cfg(not(target_arch = "wasm32"))]
mod file {
    use super::SessionStorage;
    use anyhow::Context as _;
    use std::{
        io::ErrorKind,
        path::{Path, PathBuf},
    };

    /// Stores each key in its own file under a base directory
    ///
    /// ```text
    /// <base_dir>/
    /// ├── token
    /// └── user
    /// ```
    #[derive(Debug, Clone)]
    pub struct FileStorage {
        base: PathBuf,
    }

    impl FileStorage {
        pub fn new<P: Into<PathBuf>>(base: P) -> Self {
            Self { base: base.into() }
        }

        pub fn base(&self) -> &Path {
            &self.base
        }

        fn key_path(&self, key: &str) -> PathBuf {
            self.base.join(key)
        }
    }

    impl SessionStorage for FileStorage {
        fn get(&self, key: &str) -> anyhow::Result<Option<String>> {
            let path = self.key_path(key);
            match std::fs::read_to_string(&path) {
                Ok(value) => Ok(Some(value)),
                Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
                Err(e) => Err(e).with_context(|| format!("failed to read {path:?}")),
            }
        }

        fn set(&mut self, key: &str, value: &str) -> anyhow::Result<()> {
            std::fs::create_dir_all(&self.base)
                .with_context(|| format!("failed to create storage folder {:?}", self.base))?;
            let path = self.key_path(key);
            std::fs::write(&path, value).with_context(|| format!("failed to write {path:?}"))
        }

        fn remove(&mut self, key: &str) -> anyhow::Result<()> {
            let path = self.key_path(key);
            match std::fs::remove_file(&path) {
                Ok(()) => Ok(()),
                Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
                Err(e) => Err(e).with_context(|| format!("failed to remove {path:?}")),
            }
        }
    }
}

#[cfg(target_arch = "wasm32")]
pub use web::LocalStorage;

#[cfg(target_arch = "wasm32")]
mod web {
    use super::SessionStorage;
    use anyhow::{anyhow, Context as _};

    /// Browser `window.localStorage`
    ///
    /// The handle is looked up on every call because `web_sys::Storage` cannot
    /// be sent between threads
    #[derive(Debug, Default, Clone, Copy)]
    pub struct LocalStorage;

    impl LocalStorage {
        fn storage() -> anyhow::Result<web_sys::Storage> {
            web_sys::window()
                .context("no window found")?
                .local_storage()
                .map_err(|e| anyhow!("failed to access local storage: {e:?}"))?
                .context("local storage is not available")
        }
    }

    impl SessionStorage for LocalStorage {
        fn get(&self, key: &str) -> anyhow::Result<Option<String>> {
            Self::storage()?
                .get_item(key)
                .map_err(|e| anyhow!("failed to read {key:?} from local storage: {e:?}"))
        }

        fn set(&mut self, key: &str, value: &str) -> anyhow::Result<()> {
            Self::storage()?
                .set_item(key, value)
                .map_err(|e| anyhow!("failed to write {key:?} to local storage: {e:?}"))
        }

        fn remove(&mut self, key: &str) -> anyhow::Result<()> {
            Self::storage()?
                .remove_item(key)
                .map_err(|e| anyhow!("failed to remove {key:?} from local storage: {e:?}"))
        }
    }
}
