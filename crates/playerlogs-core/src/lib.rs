//! PlayerLogs core: module registry, interval scheduler, persistent cache and
//! the built-in logging modules.

pub mod cache;
mod error;
pub mod manager;
pub mod modules;
pub mod placeholder;
pub mod registry;
pub mod report;
pub mod scheduler;
pub mod writer;

pub use cache::{CacheOrdering, CacheStore};
pub use error::CacheError;
pub use manager::{ModuleManager, PendingWrite};
pub use placeholder::{strip_color, Placeholders};
pub use registry::{AuditReport, ModuleRegistry};
pub use report::Reporter;
pub use scheduler::{IntervalTimer, Scheduler, TickOutcome};
pub use writer::LogWriter;
