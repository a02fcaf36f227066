//! pmcmap-si - Subject Ingest service
//!
//! Fetches subject-classification metadata for PubMed Central articles from
//! the PMC OAI-PMH registry and aggregates it into one combined subject tree:
//! every topic node carries a traversal count, and every article hangs off
//! its most specific topic(s) as a distinct leaf.

pub mod models;
pub mod services;
pub mod storage;
pub mod utils;

pub use models::article_id::PmcId;
pub use models::subject_path::SubjectPath;
pub use models::subject_tree::{SerialNode, SubjectTree};
pub use services::orchestrator::{Orchestrator, RunSummary};
pub use services::record_parser::{parse_subject_forest, subject_paths, RecordError, TopicNode};
pub use services::registry_client::{FetchError, RegistryClient};
