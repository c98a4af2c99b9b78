//! Embedded PostgreSQL helpers for the Diesel adapter suites.
//!
//! Each test gets its own temporary database on a cluster shared by the test
//! binary, migrated with the backend's embedded migrations.

use std::time::Duration;

use lms_backend::outbound::persistence::{DbPool, PoolConfig, run_migrations};
use pg_embedded_setup_unpriv::{BootstrapResult, ClusterHandle, TemporaryDatabase};
use tokio::runtime::Runtime;

const SHARED_CLUSTER_RETRIES: usize = 5;
const SHARED_CLUSTER_RETRY_DELAY: Duration = Duration::from_millis(500);

/// Returns true when `SKIP_TEST_CLUSTER` is "1", "true", or "yes".
pub fn should_skip_test_cluster() -> bool {
    std::env::var("SKIP_TEST_CLUSTER")
        .map(|value| matches!(value.to_lowercase().as_str(), "1" | "true" | "yes"))
        .unwrap_or(false)
}

/// Skip when `SKIP_TEST_CLUSTER` is set, otherwise fail loudly.
pub fn handle_cluster_setup_failure<T>(reason: impl std::fmt::Display) -> Option<T> {
    if should_skip_test_cluster() {
        eprintln!("SKIP-TEST-CLUSTER: {reason}");
        None
    } else {
        panic!("Test cluster setup failed: {reason}. Set SKIP_TEST_CLUSTER=1 to skip.");
    }
}

/// Keep `PG_PASSWORD` stable so a reused data directory still accepts it.
fn ensure_stable_password() {
    if std::env::var_os("PG_PASSWORD").is_none() {
        // SAFETY: runs before the cluster bootstrap spawns any threads.
        unsafe {
            std::env::set_var("PG_PASSWORD", "lms_embedded_test");
        }
    }
}

fn shared_cluster_handle() -> BootstrapResult<&'static ClusterHandle> {
    ensure_stable_password();
    let mut attempt = 1;
    loop {
        match pg_embedded_setup_unpriv::test_support::shared_cluster_handle() {
            Ok(handle) => return Ok(handle),
            Err(error) if attempt >= SHARED_CLUSTER_RETRIES => return Err(error),
            Err(_) => {
                std::thread::sleep(SHARED_CLUSTER_RETRY_DELAY);
                attempt += 1;
            }
        }
    }
}

/// A migrated temporary database, its pool, and the runtime driving both.
///
/// Field order matters: the pool closes before the database is dropped.
pub struct Database {
    pub pool: DbPool,
    pub runtime: Runtime,
    _database: TemporaryDatabase,
}

impl Database {
    pub fn block_on<F: std::future::Future>(&self, future: F) -> F::Output {
        self.runtime.block_on(future)
    }
}

/// Provision a fresh database with every migration applied.
pub fn migrated_database() -> Result<Database, String> {
    let cluster = shared_cluster_handle().map_err(|err| format!("shared cluster: {err:?}"))?;
    let database = cluster
        .temporary_database(format!("lms_test_{}", uuid::Uuid::new_v4().simple()).as_str())
        .map_err(|err| format!("temporary database: {err:?}"))?;
    let runtime = Runtime::new().map_err(|err| err.to_string())?;
    let url = database.url().to_owned();
    let pool = runtime
        .block_on(async {
            run_migrations(&url).await?;
            DbPool::new(
                PoolConfig::new(url.as_str())
                    .with_max_size(4)
                    .with_min_idle(Some(1)),
            )
            .await
        })
        .map_err(|err| err.to_string())?;
    Ok(Database {
        pool,
        runtime,
        _database: database,
    })
}
