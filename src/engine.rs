//! Process-wide engine acquisition and teardown.
//!
//! The native engine is initialized at most once per process; concurrent
//! acquirers share the same live instance. Teardown is refcounted: every
//! [`World`](crate::World) holds its own reference, so the engine cannot go
//! away while any object it produced is still alive. Calling through a
//! released handle is unrepresentable — `release` consumes the handle.

use std::sync::{Arc, Weak};

use log::{debug, info, warn};
use parking_lot::Mutex;

use crate::config::EngineConfig;
use crate::error::BridgeError;

static SHARED_ENGINE: Mutex<Weak<EngineCore>> = Mutex::new(Weak::new());

pub(crate) struct EngineCore {
    config: EngineConfig,
    #[cfg(feature = "parallel")]
    pool: Option<rayon::ThreadPool>,
}

impl EngineCore {
    fn init(config: EngineConfig) -> Result<Arc<Self>, BridgeError> {
        config.validate()?;

        #[cfg(feature = "parallel")]
        let pool = if config.worker_threads > 0 {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(config.worker_threads)
                .thread_name(|i| format!("kinesis-worker-{i}"))
                .build()
                .map_err(|err| BridgeError::EngineInit(format!("worker pool: {err}")))?;
            Some(pool)
        } else {
            None
        };

        info!(
            "engine initialized: {} worker threads, {} max bodies",
            config.worker_threads, config.max_bodies
        );

        Ok(Arc::new(Self {
            config,
            #[cfg(feature = "parallel")]
            pool,
        }))
    }
}

impl Drop for EngineCore {
    fn drop(&mut self) {
        debug!("engine torn down");
    }
}

/// Capability granting access to the engine's factory functions.
///
/// Cloned freely. The engine itself is torn down when the last clone — and
/// every [`World`](crate::World) created through one — has been dropped.
#[derive(Clone)]
pub struct EngineHandle {
    core: Arc<EngineCore>,
}

impl EngineHandle {
    /// Acquires the process-wide engine, initializing it on first call.
    ///
    /// While any handle is alive, later acquisitions share the existing
    /// instance and `config` is ignored (a mismatch is logged, first
    /// configuration wins). Once the last handle drops, the next acquisition
    /// re-initializes with its own configuration.
    pub fn acquire(config: &EngineConfig) -> Result<Self, BridgeError> {
        let mut slot = SHARED_ENGINE.lock();
        if let Some(core) = slot.upgrade() {
            if core.config != *config {
                warn!("engine already initialized; requested configuration ignored");
            }
            return Ok(Self { core });
        }

        let core = EngineCore::init(*config)?;
        *slot = Arc::downgrade(&core);
        Ok(Self { core })
    }

    /// Initializes an engine instance that is not registered in the
    /// process-wide slot. Intended for tests and embedders running several
    /// independent sessions in one process.
    pub fn standalone(config: EngineConfig) -> Result<Self, BridgeError> {
        Ok(Self {
            core: EngineCore::init(config)?,
        })
    }

    /// Releases this handle.
    ///
    /// Worlds keep their own reference, so native objects created through the
    /// engine keep it alive until they are destroyed; the release of the last
    /// reference tears the engine down.
    pub fn release(self) {
        drop(self);
    }

    /// The configuration this engine was initialized with.
    pub fn config(&self) -> &EngineConfig {
        &self.core.config
    }

    /// Whether two handles refer to the same live engine.
    pub fn shares_engine_with(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.core, &other.core)
    }

    /// Runs `f` inside the engine's worker pool, if one is configured.
    pub(crate) fn run_scoped<R: Send>(&self, f: impl FnOnce() -> R + Send) -> R {
        #[cfg(feature = "parallel")]
        if let Some(pool) = &self.core.pool {
            return pool.install(f);
        }
        f()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn concurrent_acquisitions_share_one_engine() {
        let first = EngineHandle::acquire(&EngineConfig::default()).unwrap();
        let second = EngineHandle::acquire(&EngineConfig::default().with_max_bodies(7)).unwrap();
        assert!(first.shares_engine_with(&second));
        // First configuration wins while the engine is alive.
        assert_eq!(second.config().max_bodies, first.config().max_bodies);
    }

    #[test]
    fn standalone_engines_are_independent() {
        let a = EngineHandle::standalone(EngineConfig::default()).unwrap();
        let b = EngineHandle::standalone(EngineConfig::default()).unwrap();
        assert!(!a.shares_engine_with(&b));
    }

    #[test]
    fn invalid_config_fails_acquisition() {
        let err = EngineHandle::standalone(EngineConfig::default().with_max_bodies(0));
        assert!(matches!(err, Err(BridgeError::EngineInit(_))));
    }
}
