use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use sha2::{Digest, Sha256};
use tokio::sync::{Mutex, RwLock};
use wasmtime::Module;

use kiosk_assets::{AssetFetcher, SelectionKey};

use crate::context::RuntimeContext;
use crate::error::RunnerError;
use crate::observe::{RunObserver, RunPhase};

/// A compiled module retained for the session lifetime.
pub struct CachedModule {
    pub module: Module,
    /// Size of the downloaded payload.
    pub size_bytes: u64,
    /// SHA-256 hex of the payload, for diagnostics.
    pub digest: String,
}

/// Session-lifetime cache of compiled modules, keyed by selection.
///
/// Population is lazy: the first run for a key streams the payload,
/// compiles it, and stores the result; every later run gets the cached
/// handle with no I/O. The cache is append-only and never evicts — the
/// program catalog is small and finite. A failed download or compile
/// leaves the slot empty, so the next attempt retries from scratch.
pub struct ModuleCache {
    context: Arc<RuntimeContext>,
    fetcher: Arc<dyn AssetFetcher>,
    modules: RwLock<HashMap<SelectionKey, Arc<CachedModule>>>,
    /// Per-key download locks, making population single-flight: a second
    /// request for a key still in flight waits and then finds the cache
    /// populated instead of starting another download. Lock entries live
    /// as long as the cache itself.
    in_flight: Mutex<HashMap<SelectionKey, Arc<Mutex<()>>>>,
}

impl ModuleCache {
    pub fn new(context: Arc<RuntimeContext>, fetcher: Arc<dyn AssetFetcher>) -> Self {
        Self {
            context,
            fetcher,
            modules: RwLock::new(HashMap::new()),
            in_flight: Mutex::new(HashMap::new()),
        }
    }

    pub async fn is_cached(&self, key: &SelectionKey) -> bool {
        self.modules.read().await.contains_key(key)
    }

    /// Return the compiled module for `key`, downloading and compiling it
    /// on first use.
    ///
    /// Idempotent per key: concurrent calls share one download, and calls
    /// after a success return the cached handle immediately.
    pub async fn ensure_compiled(
        &self,
        key: &SelectionKey,
        observer: &dyn RunObserver,
    ) -> Result<Arc<CachedModule>, RunnerError> {
        // Fast path: already compiled. No phase is reported here; a cached
        // run goes straight to instantiation.
        if let Some(cached) = self.modules.read().await.get(key) {
            tracing::debug!(key = %key, "module cache hit");
            return Ok(cached.clone());
        }

        observer.on_phase(RunPhase::ResolvingModule);

        let slot = {
            let mut in_flight = self.in_flight.lock().await;
            in_flight
                .entry(key.clone())
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .clone()
        };
        let _populating = slot.lock().await;

        // A concurrent caller may have populated the slot while we waited.
        if let Some(cached) = self.modules.read().await.get(key) {
            tracing::debug!(key = %key, "module compiled by concurrent run");
            return Ok(cached.clone());
        }

        let cached = Arc::new(self.download_and_compile(key, observer).await?);
        self.modules
            .write()
            .await
            .insert(key.clone(), cached.clone());
        Ok(cached)
    }

    async fn download_and_compile(
        &self,
        key: &SelectionKey,
        observer: &dyn RunObserver,
    ) -> Result<CachedModule, RunnerError> {
        let path = key.module_path();

        observer.on_phase(RunPhase::Downloading);
        let started = Instant::now();
        let bytes = self
            .fetcher
            .fetch_binary(&path, &|progress| observer.on_download_progress(progress))
            .await
            .map_err(|e| RunnerError::from_module_fetch(&path, e))?;

        let digest = hex::encode(Sha256::digest(&bytes));
        tracing::info!(
            key = %key,
            bytes = bytes.len(),
            digest,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "module payload downloaded"
        );

        observer.on_phase(RunPhase::Compiling);
        let started = Instant::now();
        let module = Module::new(&self.context.engine, &bytes)
            .map_err(|e| RunnerError::Compile(format!("{key}: {e}")))?;

        tracing::info!(
            key = %key,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "module compiled"
        );

        Ok(CachedModule {
            module,
            size_bytes: bytes.len() as u64,
            digest,
        })
    }
}
