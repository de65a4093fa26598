//! Module fetch/cache engine and execution controller for the kiosk demo
//! runner.
//!
//! Provides [`Session`], the single interface between a front end and the
//! Wasmtime execution layer. A session owns the compiled-module cache and
//! the run gate; each run streams the module payload on first use, compiles
//! it once per (language, program) selection, executes a fresh instance with
//! captured stdout, and reports phase transitions to a [`RunObserver`].
//!
//! # Quick start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use kiosk_assets::{HttpAssetClient, Language, SelectionKey};
//! use kiosk_runtime::{NullObserver, Session};
//!
//! # async fn run() -> anyhow::Result<()> {
//! let fetcher = Arc::new(HttpAssetClient::new("https://example.org/demo-assets"));
//! let session = Session::new(fetcher)?;
//!
//! let key = SelectionKey::new(Language::Clojure, "fact");
//! let result = session.run(&key, "3", &NullObserver).await;
//! println!("{}", result.rendered_html());
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod capture;
pub mod context;
pub mod error;
pub mod observe;
pub mod session;

pub use cache::{CachedModule, ModuleCache};
pub use capture::{escape_html, render_output, OutputCapture};
pub use context::RuntimeContext;
pub use error::RunnerError;
pub use observe::{NullObserver, RunObserver, RunPhase};
pub use session::{RunOutcome, RunResult, Session};
