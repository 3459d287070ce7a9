//! The core, UI-agnostic library for the `uupconv` UUP-to-ISO converter.
//!
//! `uupconv-core` does not build images itself. It drives a media creation
//! backend and takes care of everything around that call: deciding which
//! warnings apply to the host, checking that the elevated DISM broker is
//! present when running as administrator, and turning the backend's noisy
//! progress stream into readable console output.
//!
//! The library is structured into several key modules:
//! - [`logger`]: Serialized, leveled console output shared across threads.
//! - [`platform`]: Host OS family and administrator detection.
//! - [`companion`]: The ordered search for the DISM broker executable.
//! - [`progress`]: Deduplication of progress reports.
//! - [`media`]: The [`media::MediaCreator`] contract a backend implements.
//! - [`backend`]: A [`media::MediaCreator`] backed by an external executable.
//! - [`error`]: Error types and cause-chain flattening.
//! - [`mod@run`]: The orchestrator tying the above together.
//!
//! The primary entry point is [`run::Orchestrator::run`] (or the [`run()`]
//! shorthand for the real host). Progress is reported through a callback that
//! the backend may invoke from any thread.
//!
//! ## Example: Converting a UUP set
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use uupconv_core::backend::CommandMediaCreator;
//! use uupconv_core::logger::Logger;
//! use uupconv_core::run::RunOptions;
//!
//! fn main() -> Result<(), uupconv_core::error::RunError> {
//!     let logger = Arc::new(Logger::stdout());
//!     let creator = CommandMediaCreator::default();
//!     let tokens: Vec<String> = ["./uup", "out.iso", "en-us", "Professional"]
//!         .map(String::from)
//!         .to_vec();
//!
//!     let outcome = uupconv_core::run(&tokens, &creator, logger, RunOptions::default())?;
//!     println!("finished: {outcome:?}");
//!     Ok(())
//! }
//! ```

pub mod backend;
pub mod companion;
pub mod error;
pub mod logger;
pub mod media;
pub mod platform;
pub mod progress;
pub mod run;

pub use run::run;
