use std::path::PathBuf;

/// Per-test SQLite database file, removed on drop.
///
/// Tests run in parallel, so each one gets its own file instead of sharing
/// `perf_query_funcletization.sqlite`.
#[allow(dead_code)]
pub struct TestDatabase {
    path: PathBuf,
}

#[allow(dead_code)]
impl TestDatabase {
    pub fn new(prefix: &str) -> Self {
        init_tracing();
        let dir = std::env::temp_dir().join("ormbench-tests");
        std::fs::create_dir_all(&dir).expect("Failed to create test database directory");
        let path = dir.join(format!("{prefix}-{}.sqlite", uuid::Uuid::new_v4()));
        Self { path }
    }

    pub fn url(&self) -> String {
        format!("sqlite://{}?mode=rwc", self.path.display())
    }
}

impl Drop for TestDatabase {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.path);
    }
}

/// Route `tracing` output through the test harness capture
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_test_writer()
        .try_init();
}
