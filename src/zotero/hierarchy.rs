//! Assemble flat collection rows into owned trees and locate the export root.

use crate::domain::{CollectionId, CollectionNode, CollectionRecord};
use crate::mirror::ExportError;
use crate::utils::sanitize;
use std::collections::{HashMap, HashSet};

/// Build every top-level tree. Rows whose parent is missing become roots.
pub fn build_forest(records: &[CollectionRecord]) -> Vec<CollectionNode> {
    let known: HashSet<CollectionId> = records.iter().map(|r| r.id).collect();
    let children = children_by_parent(records);
    let mut visited = HashSet::new();

    records
        .iter()
        .filter(|r| r.parent_id.map_or(true, |pid| !known.contains(&pid)))
        .map(|r| build_node(r, &children, &mut visited))
        .collect()
}

/// Build the tree rooted at `root_id`, or `None` if no such row exists.
pub fn build_subtree(records: &[CollectionRecord], root_id: CollectionId) -> Option<CollectionNode> {
    let root = records.iter().find(|r| r.id == root_id)?;
    let children = children_by_parent(records);
    Some(build_node(root, &children, &mut HashSet::new()))
}

fn children_by_parent(
    records: &[CollectionRecord],
) -> HashMap<CollectionId, Vec<&CollectionRecord>> {
    let mut map: HashMap<CollectionId, Vec<&CollectionRecord>> = HashMap::new();
    for record in records {
        if let Some(pid) = record.parent_id {
            map.entry(pid).or_default().push(record);
        }
    }
    map
}

fn build_node(
    record: &CollectionRecord,
    children: &HashMap<CollectionId, Vec<&CollectionRecord>>,
    visited: &mut HashSet<CollectionId>,
) -> CollectionNode {
    visited.insert(record.id);
    let mut kids = Vec::new();
    for child in children.get(&record.id).into_iter().flatten() {
        if !visited.contains(&child.id) {
            kids.push(build_node(child, children, visited));
        }
    }
    CollectionNode::new(record.id, record.key.clone(), record.name.clone()).with_children(kids)
}

/// Resolve a user-supplied collection name to exactly one collection.
///
/// Tiers are tried in order: exact, case-insensitive, sanitized, substring.
/// The first tier with any match decides the outcome.
pub fn find_root<'a>(
    records: &'a [CollectionRecord],
    query: &str,
) -> Result<&'a CollectionRecord, ExportError> {
    let needle = query.trim();
    let lowered = needle.to_lowercase();
    let sanitized = sanitize(needle).to_lowercase();

    let tiers: [&dyn Fn(&CollectionRecord) -> bool; 4] = [
        &|r: &CollectionRecord| r.name == needle,
        &|r: &CollectionRecord| r.name.to_lowercase() == lowered,
        &|r: &CollectionRecord| sanitize(&r.name).to_lowercase() == sanitized,
        &|r: &CollectionRecord| !lowered.is_empty() && r.name.to_lowercase().contains(&lowered),
    ];

    for tier in tiers {
        let hits: Vec<&CollectionRecord> = records.iter().filter(|r| tier(*r)).collect();
        match hits.as_slice() {
            [] => continue,
            [single] => return Ok(*single),
            many => {
                let mut candidates: Vec<String> = many.iter().map(|r| r.name.clone()).collect();
                candidates.sort();
                return Err(ExportError::AmbiguousMatch { query: needle.to_string(), candidates });
            }
        }
    }

    Err(ExportError::SourceNotFound { query: needle.to_string() })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: CollectionId, name: &str, parent: Option<CollectionId>) -> CollectionRecord {
        CollectionRecord { id, key: format!("KEY{id}"), name: name.to_string(), parent_id: parent }
    }

    fn library() -> Vec<CollectionRecord> {
        vec![
            record(1, "Papers", None),
            record(2, "AI", Some(1)),
            record(3, "Bio", Some(1)),
            record(4, "Transformers", Some(2)),
            record(5, "Thesis: Draft", None),
            record(6, "Reading", None),
            record(7, "reading", Some(6)),
        ]
    }

    #[test]
    fn build_forest_nests_children_in_row_order() {
        let forest = build_forest(&library());
        let names: Vec<&str> = forest.iter().map(|n| n.name.as_str()).collect();
        assert_eq!(names, vec!["Papers", "Thesis: Draft", "Reading"]);

        let papers = &forest[0];
        assert_eq!(papers.children.len(), 2);
        assert_eq!(papers.children[0].name, "AI");
        assert_eq!(papers.children[0].children[0].name, "Transformers");
    }

    #[test]
    fn build_forest_promotes_orphans() {
        let rows = vec![record(1, "Root", None), record(9, "Orphan", Some(42))];
        let forest = build_forest(&rows);
        assert_eq!(forest.len(), 2);
    }

    #[test]
    fn build_subtree_tolerates_cycles() {
        let rows = vec![record(1, "A", Some(2)), record(2, "B", Some(1))];
        let tree = build_subtree(&rows, 1).expect("subtree");
        assert_eq!(tree.subtree_len(), 2);
    }

    #[test]
    fn build_subtree_keeps_siblings_below_a_cycle() {
        let rows = vec![
            record(1, "Root", None),
            record(2, "Loop", Some(2)),
            record(3, "Left", Some(1)),
            record(4, "Right", Some(1)),
            record(5, "Leaf", Some(3)),
        ];
        let tree = build_subtree(&rows, 1).expect("subtree");
        let names: Vec<&str> = tree.children.iter().map(|n| n.name.as_str()).collect();
        assert_eq!(names, vec!["Left", "Right"]);
        assert_eq!(tree.children[0].children[0].name, "Leaf");

        let looped = build_subtree(&rows, 2).expect("self parent");
        assert_eq!(looped.subtree_len(), 1);
    }

    #[test]
    fn find_root_prefers_exact_match() {
        let rows = library();
        assert_eq!(find_root(&rows, "Reading").expect("root").id, 6);
        assert_eq!(find_root(&rows, "reading").expect("root").id, 7);
    }

    #[test]
    fn find_root_falls_back_to_case_insensitive_and_sanitized() {
        let rows = library();
        assert_eq!(find_root(&rows, "papers").expect("root").id, 1);
        assert_eq!(find_root(&rows, "Thesis_ Draft").expect("root").id, 5);
    }

    #[test]
    fn find_root_substring_must_be_unambiguous() {
        let rows = library();
        assert_eq!(find_root(&rows, "transf").expect("root").id, 4);

        let err = find_root(&rows, "a").expect_err("ambiguous");
        match err {
            ExportError::AmbiguousMatch { candidates, .. } => {
                assert!(candidates.contains(&"Papers".to_string()));
                assert!(candidates.contains(&"Reading".to_string()));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn find_root_reports_missing_collection() {
        let err = find_root(&library(), "Chemistry").expect_err("missing");
        assert!(matches!(err, ExportError::SourceNotFound { .. }));
    }
}
