/*!
# Funcletization Suite

Runs the three funcletization scenarios through the benchmark harness and
prints a summary. Exits non-zero when any scenario fails.

```bash
cargo bench --bench funcletization_suite

# Keep JSON reports
BENCHMARK_RESULTS_DIR=target/ormbench cargo bench --bench funcletization_suite
```

`RUST_LOG=ormbench=debug` shows per-benchmark progress.
*/

use ormbench::{BenchmarkRunner, FuncletizationSuite, TestConfig};
use tracing_subscriber::EnvFilter;

fn main() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("ormbench=info")),
        )
        .try_init();

    let config = match TestConfig::instance() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    };
    let suite = match FuncletizationSuite::from_config(config) {
        Ok(suite) => suite,
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    };
    let definitions = match suite.definitions() {
        Ok(definitions) => definitions,
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    };

    let report = BenchmarkRunner::from_config(config).run_all(definitions);
    println!("{}", report.summary());

    if !report.is_success() {
        std::process::exit(1);
    }
}
