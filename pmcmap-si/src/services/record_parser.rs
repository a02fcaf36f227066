//! JATS metadata record parsing
//!
//! Builds a topic forest from the `article-categories` element of one
//! OAI-PMH record and flattens it into subject paths. Element and attribute
//! names are matched by local name only, so a record may bind the JATS
//! namespace to any prefix (or none) without changing the result.

use std::collections::HashMap;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use thiserror::Error;

use crate::models::subject_path::SubjectPath;

const CONTAINER: &str = "article-categories";
const GROUP: &str = "subj-group";
const SUBJECT: &str = "subject";

/// Record parsing errors
#[derive(Debug, Error)]
pub enum RecordError {
    /// The record is not well-formed XML; the article is skipped.
    #[error("Malformed record: {0}")]
    Malformed(String),
}

/// One topic in a record's classification hierarchy.
///
/// Transient: built per record, flattened into [`SubjectPath`]s, then
/// dropped.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TopicNode {
    /// Topic name; empty when the group carries no `subject` child.
    pub label: String,
    /// Attributes of the group element, keys stripped of namespace
    /// prefixes. Carried opaquely, not interpreted here.
    pub attributes: HashMap<String, String>,
    /// Nested sub-topics in document order.
    pub children: Vec<TopicNode>,
}

/// A `subj-group` that is open while its subtree is being parsed.
struct GroupFrame {
    node: TopicNode,
    /// The first `subject` child supplies the label; later ones are skipped.
    label_taken: bool,
}

/// Parse one metadata record into its topic forest.
///
/// The forest comes from the first `article-categories` element (matched by
/// local name at any depth); an absent container yields an empty forest.
/// Only directly nested `subj-group` elements form the hierarchy — any other
/// element inside the container is skipped together with its subtree. The
/// whole document must be well-formed even past the container.
pub fn parse_subject_forest(xml: &str) -> Result<Vec<TopicNode>, RecordError> {
    let mut reader = Reader::from_str(xml);

    let mut forest: Vec<TopicNode> = Vec::new();
    let mut stack: Vec<GroupFrame> = Vec::new();
    let mut in_container = false;
    let mut container_seen = false;
    // Depth of a skipped foreign subtree inside the container.
    let mut foreign = 0usize;
    // Set while capturing the label text of the innermost group's first
    // `subject` child; `label_text_done` flips at its first child element so
    // only leading character data contributes, and `subject_nested` tracks
    // how deep inside that child we are.
    let mut in_subject = false;
    let mut subject_nested = 0usize;
    let mut label_text_done = false;
    let mut label_buf = String::new();
    // Open-element count across the whole document.
    let mut depth = 0usize;

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => {
                depth += 1;
                let local = local_name(e.name().as_ref());

                if !in_container {
                    if !container_seen && local == CONTAINER {
                        in_container = true;
                        container_seen = true;
                    }
                } else if foreign > 0 {
                    foreign += 1;
                } else if in_subject {
                    subject_nested += 1;
                    label_text_done = true;
                } else if local == GROUP {
                    stack.push(GroupFrame {
                        node: TopicNode {
                            attributes: strip_attributes(e),
                            ..TopicNode::default()
                        },
                        label_taken: false,
                    });
                } else if local == SUBJECT {
                    match stack.last_mut() {
                        Some(frame) if !frame.label_taken => {
                            frame.label_taken = true;
                            in_subject = true;
                            subject_nested = 0;
                            label_text_done = false;
                            label_buf.clear();
                        }
                        _ => foreign = 1,
                    }
                } else {
                    foreign = 1;
                }
            }
            Ok(Event::Empty(ref e)) => {
                let local = local_name(e.name().as_ref());

                if !in_container {
                    if !container_seen && local == CONTAINER {
                        // Self-closing container: empty forest.
                        container_seen = true;
                    }
                } else if foreign > 0 {
                    // Self-closing child of a skipped subtree.
                } else if in_subject {
                    label_text_done = true;
                } else if local == GROUP {
                    let node = TopicNode {
                        attributes: strip_attributes(e),
                        ..TopicNode::default()
                    };
                    attach(node, &mut stack, &mut forest);
                } else if local == SUBJECT {
                    // First subject child without text: label stays empty.
                    if let Some(frame) = stack.last_mut() {
                        frame.label_taken = true;
                    }
                }
            }
            Ok(Event::Text(ref e)) => {
                if in_container && in_subject && !label_text_done {
                    match e.unescape() {
                        Ok(text) => label_buf.push_str(&text),
                        Err(err) => return Err(RecordError::Malformed(err.to_string())),
                    }
                }
            }
            Ok(Event::CData(ref e)) => {
                if in_container && in_subject && !label_text_done {
                    label_buf.push_str(&String::from_utf8_lossy(e));
                }
            }
            Ok(Event::End(ref e)) => {
                depth = depth.saturating_sub(1);

                if !in_container {
                    continue;
                }
                if foreign > 0 {
                    foreign -= 1;
                } else if in_subject {
                    if subject_nested > 0 {
                        subject_nested -= 1;
                    } else {
                        in_subject = false;
                        if let Some(frame) = stack.last_mut() {
                            frame.node.label = label_buf.trim().to_string();
                        }
                    }
                } else {
                    let local = local_name(e.name().as_ref());
                    if local == GROUP {
                        if let Some(frame) = stack.pop() {
                            attach(frame.node, &mut stack, &mut forest);
                        }
                    } else if local == CONTAINER {
                        in_container = false;
                    }
                }
            }
            Ok(Event::Eof) => {
                if depth != 0 {
                    return Err(RecordError::Malformed(
                        "unexpected end of document".to_string(),
                    ));
                }
                break;
            }
            Ok(_) => {}
            Err(err) => return Err(RecordError::Malformed(err.to_string())),
        }
    }

    Ok(forest)
}

/// Flatten a topic forest into its root-to-leaf subject paths.
///
/// Empty-label nodes contribute no segment of their own but still propagate
/// the accumulated path into their children. Paths come out in document
/// order; duplicates are left for the aggregation tree to resolve.
pub fn subject_paths(forest: &[TopicNode]) -> Vec<SubjectPath> {
    let mut out = Vec::new();
    for node in forest {
        walk(node, &[], &mut out);
    }
    out
}

fn walk(node: &TopicNode, path: &[String], out: &mut Vec<SubjectPath>) {
    let mut next: Vec<String> = path.to_vec();
    if !node.label.is_empty() {
        next.push(node.label.clone());
    }
    if node.children.is_empty() {
        if !next.is_empty() {
            out.push(SubjectPath::new(next));
        }
        return;
    }
    for child in &node.children {
        walk(child, &next, out);
    }
}

fn attach(node: TopicNode, stack: &mut Vec<GroupFrame>, forest: &mut Vec<TopicNode>) {
    match stack.last_mut() {
        Some(parent) => parent.node.children.push(node),
        None => forest.push(node),
    }
}

/// Local part of a qualified XML name (e.g. `jats:subject` → `subject`).
fn local_name(name: &[u8]) -> String {
    let name = String::from_utf8_lossy(name);
    match name.find(':') {
        Some(pos) => name[pos + 1..].to_string(),
        None => name.to_string(),
    }
}

/// Element attributes with namespace prefixes stripped from the keys;
/// `xmlns` declarations are not attributes of the topic.
fn strip_attributes(e: &BytesStart) -> HashMap<String, String> {
    let mut out = HashMap::new();
    for attr in e.attributes().flatten() {
        let key = String::from_utf8_lossy(attr.key.as_ref()).to_string();
        if key == "xmlns" || key.starts_with("xmlns:") {
            continue;
        }
        let local = match key.find(':') {
            Some(pos) => key[pos + 1..].to_string(),
            None => key,
        };
        out.insert(local, String::from_utf8_lossy(&attr.value).to_string());
    }
    out
}
