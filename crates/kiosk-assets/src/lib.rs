//! Asset loading and argument resolution for the kiosk demo runner.
//!
//! A demo site serves a small read-only asset tree: a `config.json` catalog
//! of programs, per-language source text, intermediate listings, and the
//! compiled module payloads the runtime executes. This crate owns the
//! client side of that contract:
//!
//! - [`AssetFetcher`] — the transport boundary (HTTP in production via
//!   [`HttpAssetClient`], in-memory via [`StaticAssetFetcher`] for tests
//!   and offline use).
//! - [`ProgramConfig`] — the parsed catalog, mapping program names to their
//!   argument descriptors.
//! - [`ArgumentSet`] — the tagged argument descriptor, resolved into
//!   selectable options with exactly one default marked.
//! - [`SelectionKey`] — the (language, program) pair that names a demo
//!   variant and derives every asset path for it.

pub mod args;
pub mod client;
pub mod config;
pub mod error;
pub mod selection;

pub use args::{ArgOption, ArgumentSet};
pub use client::{AssetFetcher, DownloadProgress, HttpAssetClient, StaticAssetFetcher};
pub use config::ProgramConfig;
pub use error::AssetError;
pub use selection::{Language, SelectionKey};
