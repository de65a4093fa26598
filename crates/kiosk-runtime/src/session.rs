use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tokio::sync::Mutex;

use kiosk_assets::{AssetFetcher, SelectionKey};

use crate::cache::ModuleCache;
use crate::capture::{render_output, OutputCapture};
use crate::context::RuntimeContext;
use crate::error::RunnerError;
use crate::observe::{RunObserver, RunPhase};

/// Conventional argv[0] handed to every demo program.
const PROGRAM_ARGV0: &str = "program";

#[derive(Debug)]
pub enum RunOutcome {
    Completed { duration: Duration },
    Failed { error: RunnerError },
}

/// Outcome of one run, with whatever output was captured before the run
/// ended. A failed run keeps its partial output.
#[derive(Debug)]
pub struct RunResult {
    pub outcome: RunOutcome,
    pub lines: Vec<String>,
}

impl RunResult {
    pub fn is_success(&self) -> bool {
        matches!(self.outcome, RunOutcome::Completed { .. })
    }

    /// Captured output as one HTML-escaped block, lines in emission order.
    pub fn rendered_html(&self) -> String {
        render_output(&self.lines)
    }
}

/// The execution controller: one end-to-end run at a time.
///
/// A session owns the runtime context, the module cache, and the run gate.
/// The gate is the system's mutual exclusion: it is held for the whole of
/// one run and released on every exit path by guard drop, so two runs can
/// never overlap and each run's output capture sees only its own program.
pub struct Session {
    context: Arc<RuntimeContext>,
    cache: ModuleCache,
    run_gate: Mutex<()>,
}

impl Session {
    pub fn new(fetcher: Arc<dyn AssetFetcher>) -> anyhow::Result<Self> {
        let context = Arc::new(RuntimeContext::new()?);
        let cache = ModuleCache::new(context.clone(), fetcher);
        Ok(Self {
            context,
            cache,
            run_gate: Mutex::new(()),
        })
    }

    pub fn cache(&self) -> &ModuleCache {
        &self.cache
    }

    /// Run the selected program with the chosen argument value.
    ///
    /// `raw_arg` is the canonical option value from the resolver: a JSON
    /// sequence becomes one positional argument per element, any other JSON
    /// value becomes a single argument, and undecodable text is passed
    /// through verbatim as one argument.
    ///
    /// Failures never propagate: every outcome is a [`RunResult`], with
    /// partial output preserved on the failure path.
    pub async fn run(
        &self,
        key: &SelectionKey,
        raw_arg: &str,
        observer: &dyn RunObserver,
    ) -> RunResult {
        // Held until return; drop re-enables the next run on all paths.
        let _gate = self.run_gate.lock().await;

        let mut argv = vec![PROGRAM_ARGV0.to_string()];
        argv.extend(parse_run_args(raw_arg));

        tracing::info!(key = %key, args = ?&argv[1..], "run started");

        let cached = match self.cache.ensure_compiled(key, observer).await {
            Ok(cached) => cached,
            Err(error) => {
                tracing::warn!(key = %key, %error, "module unavailable");
                return RunResult {
                    outcome: RunOutcome::Failed { error },
                    lines: Vec::new(),
                };
            }
        };

        observer.on_phase(RunPhase::Instantiating);
        let capture = OutputCapture::new();

        let result = self
            .context
            .execute(&cached.module, &argv, capture.pipe(), observer)
            .await;
        let lines = capture.lines();

        match result {
            Ok(duration) => {
                tracing::info!(key = %key, duration_ms = duration.as_millis() as u64, "run complete");
                RunResult {
                    outcome: RunOutcome::Completed { duration },
                    lines,
                }
            }
            Err(error) => {
                tracing::warn!(key = %key, %error, "run failed");
                RunResult {
                    outcome: RunOutcome::Failed { error },
                    lines,
                }
            }
        }
    }
}

/// Decode a canonical option value into positional arguments.
pub fn parse_run_args(raw: &str) -> Vec<String> {
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Array(items)) => items.iter().map(value_text).collect(),
        Ok(value) => vec![value_text(&value)],
        Err(_) => vec![raw.to_string()],
    }
}

fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
