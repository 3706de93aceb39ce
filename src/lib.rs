//! Per-site option storage with autoload, decoded and miss caches
//!
//! Open a [`config::Config`] and ask it for an
//! [`OptionManager`](config::options::OptionManager) per unit of work:
//!
//! ```no_run
//! # async fn demo() -> anyhow::Result<()> {
//! let config = site_options::config::Config::load().await?;
//! let mut options = config.manager(None);
//! options.add("site_name", serde_json::json!("Example"), true).await?;
//! assert_eq!(options.get("site_name").await?, Some(serde_json::json!("Example")));
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod commands;
pub mod config;
pub mod ui;

pub use config::options;
