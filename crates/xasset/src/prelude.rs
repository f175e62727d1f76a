//! Prelude module for convenient imports
//!
//! ```ignore
//! use xasset::prelude::*;
//! ```

pub use crate::config::{ExtractorConfig, ExtractorConfigBuilder};
pub use crate::error::{Error, Result};
pub use crate::memory::{Address, ReadMemory, ReadMemoryExt, Signature};
pub use crate::process::AttachedProcess;
pub use crate::session::{Session, SessionState};
pub use crate::title::{TitleDescriptor, registry};
