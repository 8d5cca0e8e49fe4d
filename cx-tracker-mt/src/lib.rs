//! Machine translation support for cx-tracker
//!
//! Providers produce the initial content of a section; the tracker then
//! measures how much of it the translator changed.
//!
//! # Workflow Example
//!
//! ```ignore
//! use cx_tracker::ContentOrigin;
//! use cx_tracker_mt::{CxServerProvider, SectionTranslator};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let translator = SectionTranslator::new("en", "es")
//!         .with_provider(Arc::new(CxServerProvider::from_env("MinT")?));
//!
//!     let suggestion = translator
//!         .suggest("<p>The cat sat.</p>", &ContentOrigin::Provider("MinT".into()))
//!         .await;
//!     if let Some(notice) = &suggestion.notice {
//!         eprintln!("{}", notice);
//!     }
//!     println!("{} ({})", suggestion.html, suggestion.origin);
//!     Ok(())
//! }
//! ```

pub mod cxserver;
pub mod error;
pub mod mock;
pub mod suggestion;
pub mod translator;

pub use cxserver::CxServerProvider;
pub use error::{MtError, MtResult};
pub use mock::{MockMode, MockTranslator};
pub use suggestion::{SectionTranslator, Suggestion};
pub use translator::{MachineTranslator, normalize_locale, validate_locale};
