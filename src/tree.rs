/*!
 * Nested tree construction from flat records
 */

use std::collections::HashMap;

use crate::types::{FlatRecord, TreeNode};

/// Parent path of a record
///
/// Uses the explicit `parent` field when set, otherwise strips the last
/// segment of `path`. Empty for root-level records.
pub fn parent_path(record: &FlatRecord) -> &str {
    if !record.parent.is_empty() {
        return &record.parent;
    }
    match record.path.rfind('/') {
        Some(idx) => &record.path[..idx],
        None => "",
    }
}

/// Build the nested tree from flat records
///
/// Two passes over an index-based arena: first one slot per record keyed by
/// path, then each record is linked under its parent if that parent exists,
/// otherwise it becomes a root. Every record appears exactly once in the
/// output; children keep the order of the input.
pub fn build_tree(records: &[FlatRecord]) -> Vec<TreeNode> {
    // First pass: index every record by path, first occurrence wins
    let mut index: HashMap<&str, usize> = HashMap::with_capacity(records.len());
    for (i, record) in records.iter().enumerate() {
        index.entry(record.path.as_str()).or_insert(i);
    }

    // Second pass: link children to parents
    let mut parent_of: Vec<Option<usize>> = vec![None; records.len()];
    let mut children: Vec<Vec<usize>> = vec![Vec::new(); records.len()];
    let mut roots = Vec::new();

    for (i, record) in records.iter().enumerate() {
        let parent = parent_path(record);
        let linked = match index.get(parent) {
            Some(&p) if !parent.is_empty() && !creates_cycle(&parent_of, p, i) => Some(p),
            _ => None,
        };

        match linked {
            Some(p) => {
                parent_of[i] = Some(p);
                children[p].push(i);
            }
            None => {
                if !parent.is_empty() {
                    log::debug!("Parent {} of {} not found, promoting to root", parent, record.path);
                }
                roots.push(i);
            }
        }
    }

    materialize(records, &roots, &mut children)
}

/// Whether hanging `child` under `parent` would close a loop
fn creates_cycle(parent_of: &[Option<usize>], parent: usize, child: usize) -> bool {
    let mut current = Some(parent);
    while let Some(idx) = current {
        if idx == child {
            return true;
        }
        current = parent_of[idx];
    }
    false
}

/// Turn the arena into owned nested nodes, bottom-up
fn materialize(records: &[FlatRecord], roots: &[usize], children: &mut [Vec<usize>]) -> Vec<TreeNode> {
    // Post-order over the arena using an explicit stack
    let mut order = Vec::with_capacity(records.len());
    let mut stack: Vec<(usize, bool)> = roots.iter().rev().map(|&r| (r, false)).collect();
    while let Some((idx, expanded)) = stack.pop() {
        if expanded {
            order.push(idx);
            continue;
        }
        stack.push((idx, true));
        for &child in children[idx].iter().rev() {
            stack.push((child, false));
        }
    }

    let mut built: Vec<Option<TreeNode>> = vec![None; records.len()];
    for idx in order {
        let kids = std::mem::take(&mut children[idx]);
        let mut node = TreeNode::new(records[idx].clone());
        node.children = kids.into_iter().filter_map(|c| built[c].take()).collect();
        built[idx] = Some(node);
    }

    roots.iter().filter_map(|&r| built[r].take()).collect()
}

/// Find the node with the given path
pub fn find_node<'a>(tree: &'a [TreeNode], path: &str) -> Option<&'a TreeNode> {
    let mut stack: Vec<&TreeNode> = tree.iter().rev().collect();
    while let Some(node) = stack.pop() {
        if node.path() == path {
            return Some(node);
        }
        stack.extend(node.children.iter().rev());
    }
    None
}

/// Paths of every node below `node`, in depth-first order
pub fn descendant_paths(node: &TreeNode) -> Vec<&str> {
    let mut paths = Vec::new();
    let mut stack: Vec<&TreeNode> = node.children.iter().rev().collect();
    while let Some(current) = stack.pop() {
        paths.push(current.path());
        stack.extend(current.children.iter().rev());
    }
    paths
}

/// Every node of the tree in depth-first order
pub fn walk(tree: &[TreeNode]) -> Vec<&TreeNode> {
    let mut out = Vec::new();
    let mut stack: Vec<&TreeNode> = tree.iter().rev().collect();
    while let Some(node) = stack.pop() {
        out.push(node);
        stack.extend(node.children.iter().rev());
    }
    out
}
