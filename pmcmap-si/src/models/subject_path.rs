//! Subject classification paths

use std::fmt;

/// Separator for the display form of a path, e.g.
/// `Biology › Anatomy and Physiology › Bone`.
pub const PATH_SEPARATOR: &str = " › ";

/// An ordered list of topic labels from most general to most specific,
/// describing one classification of an article.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubjectPath {
    labels: Vec<String>,
}

impl SubjectPath {
    pub fn new(labels: Vec<String>) -> SubjectPath {
        SubjectPath { labels }
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }
}

impl fmt::Display for SubjectPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.labels.join(PATH_SEPARATOR))
    }
}

impl<S: Into<String>> FromIterator<S> for SubjectPath {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        SubjectPath::new(iter.into_iter().map(Into::into).collect())
    }
}
