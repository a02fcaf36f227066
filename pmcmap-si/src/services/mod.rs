//! Service modules for the subject-ingest workflow

pub mod orchestrator;
pub mod record_parser;
pub mod registry_client;

pub use orchestrator::{Orchestrator, RunSummary};
pub use record_parser::{parse_subject_forest, subject_paths, RecordError, TopicNode};
pub use registry_client::{FetchError, RegistryClient};
