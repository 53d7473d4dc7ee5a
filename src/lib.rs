//! # Marquee - media concierge
//!
//! Marquee lets a user search for and request movies and TV shows on a
//! self-hosted media request server (Overseerr-compatible) by chatting with
//! a tool-calling reasoning engine (Gemini).
//!
//! ## Modules
//!
//! - [`catalog`] - HTTP client for the media catalog
//! - [`agents`] - Tool registry, executor and the conversation loop
//! - [`config`] - Layered settings (file, env, CLI)
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use marquee::agents::{llm::create_provider, Orchestrator, Transcript};
//! use marquee::catalog::CatalogClient;
//! use marquee::config::Settings;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::new()?;
//!     let llm = create_provider(&settings.engine)?;
//!     let catalog = Arc::new(CatalogClient::new(&settings.catalog));
//!     let orchestrator = Orchestrator::new(settings.agent.clone(), llm, catalog);
//!
//!     let mut transcript = Transcript::new();
//!     let reply = transcript.send(&orchestrator, "Find Inception", None).await?;
//!     println!("{}", reply.content());
//!     Ok(())
//! }
//! ```

pub mod agents;
pub mod catalog;
pub mod cli;
pub mod config;
