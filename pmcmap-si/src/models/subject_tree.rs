//! Combined subject tree with article leaves
//!
//! One `SubjectTree` instance aggregates the subject paths of every article
//! in a run. Topic nodes carry a traversal count; each article hangs off its
//! most specific topic(s) as a distinct leaf node. Sibling order is decided
//! at serialization time, so the serialized shape is independent of
//! insertion order.

use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

use pmcmap_common::{Error, Result};

use crate::models::article_id::PmcId;
use crate::models::subject_path::SubjectPath;

/// One node of the aggregated tree: either a topic or an article leaf.
#[derive(Debug, Clone)]
struct SubjectNode {
    label: String,
    count: u64,
    children: HashMap<String, SubjectNode>,
    is_article: bool,
}

impl SubjectNode {
    fn topic(label: &str) -> SubjectNode {
        SubjectNode {
            label: label.to_string(),
            count: 0,
            children: HashMap::new(),
            is_article: false,
        }
    }

    fn article(label: &str) -> SubjectNode {
        SubjectNode {
            label: label.to_string(),
            count: 0,
            children: HashMap::new(),
            is_article: true,
        }
    }

    fn to_serial(&self) -> SerialNode {
        let mut children: Vec<&SubjectNode> = self.children.values().collect();
        // Topic children before article leaves, each group in label order.
        children.sort_by(|a, b| {
            (a.is_article, a.label.as_str()).cmp(&(b.is_article, b.label.as_str()))
        });
        SerialNode {
            label: self.label.clone(),
            count: self.count,
            is_article: self.is_article,
            children: children.into_iter().map(SubjectNode::to_serial).collect(),
        }
    }

    fn collect_topic_labels(&self, out: &mut BTreeSet<String>) {
        for child in self.children.values() {
            if !child.is_article {
                out.insert(child.label.clone());
                child.collect_topic_labels(out);
            }
        }
    }
}

/// Serialized tree shape: `{label, count, is_article, children}` with topic
/// children ahead of article leaves and each group in ascending label order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerialNode {
    pub label: String,
    pub count: u64,
    pub is_article: bool,
    pub children: Vec<SerialNode>,
}

/// The combined, cross-article subject hierarchy for one run.
///
/// Rooted at a synthetic empty-label topic node. The tree exclusively owns
/// its nodes; all mutation goes through [`SubjectTree::insert`].
#[derive(Debug)]
pub struct SubjectTree {
    root: SubjectNode,
}

impl SubjectTree {
    pub fn new() -> SubjectTree {
        SubjectTree {
            root: SubjectNode::topic(""),
        }
    }

    /// Merge one subject path into the tree and attach `article` as a leaf
    /// under the terminal topic.
    ///
    /// Every topic node entered along the path gains one traversal count;
    /// the terminal topic gains a second increment for the leaf it carries.
    /// Attaching the same article under the same terminal topic twice keeps
    /// a single leaf, though topic counts still increment per call. An empty
    /// path (or one whose labels are all blank) is a no-op.
    pub fn insert(&mut self, path: &SubjectPath, article: &PmcId) {
        let segments: Vec<&str> = path
            .labels()
            .iter()
            .map(|label| label.trim())
            .filter(|label| !label.is_empty())
            .collect();
        if segments.is_empty() {
            return;
        }

        let mut node = &mut self.root;
        for segment in segments {
            node = node
                .children
                .entry(segment.to_string())
                .or_insert_with(|| SubjectNode::topic(segment));
            node.count += 1;
        }
        // The terminal topic counts once more for the leaf attachment.
        node.count += 1;

        // Article leaves stay distinct from topic labels and keep count 0.
        node.children
            .entry(article.as_str().to_string())
            .or_insert_with(|| SubjectNode::article(article.as_str()));
    }

    /// Snapshot the tree in its deterministic serialized shape.
    pub fn to_serial(&self) -> SerialNode {
        self.root.to_serial()
    }

    /// Serialize to the JSON output payload.
    pub fn to_json(&self) -> Result<serde_json::Value> {
        serde_json::to_value(self.to_serial())
            .map_err(|e| Error::Internal(format!("serialize subject tree: {e}")))
    }

    /// Distinct topic labels across the whole tree, owned by the caller.
    pub fn topic_labels(&self) -> BTreeSet<String> {
        let mut out = BTreeSet::new();
        self.root.collect_topic_labels(&mut out);
        out
    }
}

impl Default for SubjectTree {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path(labels: &[&str]) -> SubjectPath {
        labels.iter().copied().collect()
    }

    fn id(raw: &str) -> PmcId {
        PmcId::parse(raw).unwrap()
    }

    fn child<'a>(node: &'a SerialNode, label: &str) -> &'a SerialNode {
        node.children
            .iter()
            .find(|c| c.label == label)
            .unwrap_or_else(|| panic!("missing child {label}"))
    }

    #[test]
    fn test_two_articles_share_a_topic() {
        let mut tree = SubjectTree::new();
        tree.insert(&path(&["Biology", "Anatomy"]), &id("PMC100"));
        tree.insert(&path(&["Biology", "Genetics"]), &id("PMC200"));

        let root = tree.to_serial();
        assert_eq!(root.label, "");
        assert_eq!(root.children.len(), 1);

        let biology = child(&root, "Biology");
        assert_eq!(biology.count, 2);
        assert!(!biology.is_article);

        let anatomy = child(biology, "Anatomy");
        assert!(anatomy.count >= 1);
        assert!(child(anatomy, "PMC100").is_article);

        let genetics = child(biology, "Genetics");
        assert!(genetics.count >= 1);
        assert!(child(genetics, "PMC200").is_article);
    }

    #[test]
    fn test_terminal_topic_double_increment() {
        let mut tree = SubjectTree::new();
        tree.insert(&path(&["Biology", "Anatomy"]), &id("PMC100"));

        let root = tree.to_serial();
        let biology = child(&root, "Biology");
        let anatomy = child(biology, "Anatomy");
        assert_eq!(biology.count, 1);
        assert_eq!(anatomy.count, 2);
        assert_eq!(child(anatomy, "PMC100").count, 0);
    }

    #[test]
    fn test_idempotent_leaf_attachment() {
        let mut tree = SubjectTree::new();
        tree.insert(&path(&["Biology"]), &id("PMC100"));
        tree.insert(&path(&["Biology"]), &id("PMC100"));

        let root = tree.to_serial();
        let biology = child(&root, "Biology");
        let leaves: Vec<_> = biology.children.iter().filter(|c| c.is_article).collect();
        assert_eq!(leaves.len(), 1);
        assert_eq!(leaves[0].label, "PMC100");
        // Topic counts still accrue per call.
        assert_eq!(biology.count, 4);
    }

    #[test]
    fn test_counts_never_decrease() {
        let mut tree = SubjectTree::new();
        tree.insert(&path(&["Biology", "Anatomy"]), &id("PMC100"));
        let before = child(&tree.to_serial(), "Biology").count;

        tree.insert(&path(&["Biology", "Genetics"]), &id("PMC200"));
        tree.insert(&path(&["Biology", "Anatomy"]), &id("PMC300"));
        let after = child(&tree.to_serial(), "Biology").count;

        assert!(after >= before);
        assert_eq!(after, 3);
    }

    #[test]
    fn test_empty_path_is_noop() {
        let mut tree = SubjectTree::new();
        tree.insert(&path(&[]), &id("PMC100"));
        tree.insert(&path(&["", "  "]), &id("PMC100"));

        let root = tree.to_serial();
        assert!(root.children.is_empty());
        assert_eq!(root.count, 0);
    }

    #[test]
    fn test_blank_segments_are_dropped() {
        let mut tree = SubjectTree::new();
        tree.insert(&path(&["Biology", "", " Anatomy "]), &id("PMC100"));

        let root = tree.to_serial();
        let biology = child(&root, "Biology");
        let anatomy = child(biology, "Anatomy");
        assert_eq!(anatomy.count, 2);
    }

    #[test]
    fn test_sibling_ordering_topics_then_articles() {
        let mut tree = SubjectTree::new();
        tree.insert(&path(&["Zoology"]), &id("PMC900"));
        tree.insert(&path(&["Zoology", "Mammals"]), &id("PMC100"));
        tree.insert(&path(&["Zoology", "Birds"]), &id("PMC500"));

        let root = tree.to_serial();
        let zoology = child(&root, "Zoology");
        let labels: Vec<&str> = zoology.children.iter().map(|c| c.label.as_str()).collect();
        assert_eq!(labels, vec!["Birds", "Mammals", "PMC900"]);
        let flags: Vec<bool> = zoology.children.iter().map(|c| c.is_article).collect();
        assert_eq!(flags, vec![false, false, true]);
    }

    #[test]
    fn test_serialization_is_deterministic() {
        let mut tree = SubjectTree::new();
        tree.insert(&path(&["Biology", "Anatomy"]), &id("PMC100"));
        tree.insert(&path(&["Physics"]), &id("PMC200"));

        let first = serde_json::to_string_pretty(&tree.to_serial()).unwrap();
        let second = serde_json::to_string_pretty(&tree.to_serial()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_insertion_order_does_not_change_shape() {
        let mut forward = SubjectTree::new();
        forward.insert(&path(&["Biology", "Anatomy"]), &id("PMC100"));
        forward.insert(&path(&["Biology", "Genetics"]), &id("PMC200"));
        forward.insert(&path(&["Physics"]), &id("PMC300"));

        let mut reverse = SubjectTree::new();
        reverse.insert(&path(&["Physics"]), &id("PMC300"));
        reverse.insert(&path(&["Biology", "Genetics"]), &id("PMC200"));
        reverse.insert(&path(&["Biology", "Anatomy"]), &id("PMC100"));

        assert_eq!(forward.to_serial(), reverse.to_serial());
    }

    #[test]
    fn test_topic_labels_exclude_articles() {
        let mut tree = SubjectTree::new();
        tree.insert(&path(&["Biology", "Anatomy"]), &id("PMC100"));
        tree.insert(&path(&["Physics"]), &id("PMC200"));

        let labels = tree.topic_labels();
        let expected: Vec<&str> = vec!["Anatomy", "Biology", "Physics"];
        assert_eq!(labels.iter().map(String::as_str).collect::<Vec<_>>(), expected);
    }

    #[test]
    fn test_json_payload_shape() {
        let mut tree = SubjectTree::new();
        tree.insert(&path(&["Biology"]), &id("PMC100"));

        let value = tree.to_json().unwrap();
        assert_eq!(value["label"], "");
        assert_eq!(value["children"][0]["label"], "Biology");
        assert_eq!(value["children"][0]["count"], 2);
        assert_eq!(value["children"][0]["is_article"], false);
        assert_eq!(value["children"][0]["children"][0]["label"], "PMC100");
        assert_eq!(value["children"][0]["children"][0]["is_article"], true);
    }
}
