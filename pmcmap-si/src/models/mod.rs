//! Data models for subject aggregation

pub mod article_id;
pub mod subject_path;
pub mod subject_tree;

pub use article_id::PmcId;
pub use subject_path::{SubjectPath, PATH_SEPARATOR};
pub use subject_tree::{SerialNode, SubjectTree};
