use crate::models::{CommentNode, CommentRecord};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::str::FromStr;

/// How an assembled thread is handed to the UI.
///
/// `Full` and `Compact` flatten the tree into one depth-annotated sequence;
/// `Guestbook` keeps the tree shape but shows the newest root entries first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayMode {
    Full,
    Compact,
    Guestbook,
}

impl FromStr for DisplayMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "full" => Ok(DisplayMode::Full),
            "compact" => Ok(DisplayMode::Compact),
            "guestbook" => Ok(DisplayMode::Guestbook),
            other => Err(format!("Unknown display mode: {}", other)),
        }
    }
}

/// Deeper reply chains than this are split into new roots so the recursive
/// assembly, sort and flatten passes stay within stack bounds.
const MAX_THREAD_DEPTH: u32 = 128;

/// Builds the comment forest from a flat record list in a single pass.
///
/// Each record whose `parent_id` resolves inside the input set becomes a
/// child of that parent; everything else becomes a root. A dangling parent
/// reference (deleted comment, wrong scope) is not an error: the orphan is
/// promoted to a root so it stays visible, losing only its nesting. The
/// same promotion applies to records caught in a reply cycle and to records
/// past the depth cap, so the output always conserves every input record.
pub fn build_thread(records: Vec<CommentRecord>) -> Vec<CommentNode> {
    let index: HashMap<&str, usize> = records
        .iter()
        .enumerate()
        .map(|(i, r)| (r.id.as_str(), i))
        .collect();

    let mut parent_of: Vec<Option<usize>> = vec![None; records.len()];
    for (i, record) in records.iter().enumerate() {
        if let Some(parent_id) = record.parent_id.as_deref() {
            match index.get(parent_id) {
                // A self-referencing record is treated like a dangling one.
                Some(&p) if p != i => parent_of[i] = Some(p),
                _ => {
                    tracing::debug!(
                        comment_id = %record.id,
                        parent_id = %parent_id,
                        "dangling parent reference, promoting comment to root"
                    );
                }
            }
        }
    }

    enforce_depth_cap(&records, &mut parent_of);

    let mut children_of: Vec<Vec<usize>> = vec![Vec::new(); records.len()];
    let mut roots: Vec<usize> = Vec::new();
    for (i, parent) in parent_of.iter().enumerate() {
        match *parent {
            Some(p) => children_of[p].push(i),
            None => roots.push(i),
        }
    }

    roots
        .iter()
        .map(|&i| assemble(i, &records, &children_of, 0))
        .collect()
}

/// Walks every parent chain iteratively with memoized depths. A chain that
/// loops back on itself is severed where the cycle closes; a node that would
/// sit deeper than [`MAX_THREAD_DEPTH`] has its parent link cut instead.
/// Either way the node becomes a root and its subtree restarts at depth 0,
/// which is what bounds the recursion everywhere else in this module.
fn enforce_depth_cap(records: &[CommentRecord], parent_of: &mut [Option<usize>]) {
    // 0 = unvisited, 1 = on the current walk, 2 = resolved
    let mut state = vec![0u8; parent_of.len()];
    let mut depth = vec![0u32; parent_of.len()];

    for start in 0..parent_of.len() {
        if state[start] == 2 {
            continue;
        }

        let mut chain: Vec<usize> = Vec::new();
        let mut j = start;
        let base = loop {
            if state[j] == 2 {
                break depth[j];
            }
            if state[j] == 1 {
                tracing::debug!(
                    comment_id = %records[j].id,
                    "reply cycle detected, promoting comment to root"
                );
                parent_of[j] = None;
                for &k in &chain {
                    state[k] = 0;
                }
                chain.clear();
                j = start;
                continue;
            }
            match parent_of[j] {
                None => {
                    state[j] = 2;
                    break 0;
                }
                Some(p) => {
                    state[j] = 1;
                    chain.push(j);
                    j = p;
                }
            }
        };

        let mut d = base;
        for &k in chain.iter().rev() {
            d += 1;
            if d > MAX_THREAD_DEPTH {
                tracing::debug!(
                    comment_id = %records[k].id,
                    "reply chain exceeds depth cap, promoting comment to root"
                );
                parent_of[k] = None;
                d = 0;
            }
            depth[k] = d;
            state[k] = 2;
        }
    }
}

fn assemble(
    i: usize,
    records: &[CommentRecord],
    children_of: &[Vec<usize>],
    level: u32,
) -> CommentNode {
    CommentNode {
        record: records[i].clone(),
        level,
        children: children_of[i]
            .iter()
            .map(|&c| assemble(c, records, children_of, level + 1))
            .collect(),
    }
}

/// Orders a thread for display. Pure: the input forest is never mutated.
///
/// All modes first sort every sibling group ascending by creation time
/// (stable, so equal timestamps keep input order). Guestbook then flips only
/// the root order to newest-first and keeps the tree nested; the flat modes
/// emit a depth-first pre-order sequence with `children` cleared and `level`
/// set to the node's depth.
pub fn present(roots: &[CommentNode], mode: DisplayMode) -> Vec<CommentNode> {
    let mut roots = roots.to_vec();
    sort_siblings(&mut roots);

    match mode {
        DisplayMode::Guestbook => {
            roots.sort_by(|a, b| b.record.created_at.cmp(&a.record.created_at));
            roots
        }
        DisplayMode::Full | DisplayMode::Compact => {
            let mut flat = Vec::new();
            for root in &roots {
                flatten_into(root, 0, &mut flat);
            }
            flat
        }
    }
}

fn sort_siblings(nodes: &mut [CommentNode]) {
    nodes.sort_by(|a, b| a.record.created_at.cmp(&b.record.created_at));
    for node in nodes {
        sort_siblings(&mut node.children);
    }
}

fn flatten_into(node: &CommentNode, level: u32, out: &mut Vec<CommentNode>) {
    out.push(CommentNode {
        record: node.record.clone(),
        level,
        children: Vec::new(),
    });
    for child in &node.children {
        flatten_into(child, level + 1, out);
    }
}
