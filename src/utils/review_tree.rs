// src/utils/review_tree.rs

use std::collections::HashMap;
use std::fmt;

use crate::{
    config::MAX_REVIEW_DEPTH,
    models::review::{ReviewNode, ReviewRow},
};

/// Structural problems found while rendering a movie's reviews.
#[derive(Debug, PartialEq, Eq)]
pub enum ReviewTreeError {
    /// A reply chain is deeper than the renderer allows.
    TooDeep { review_id: i64, max_depth: usize },

    /// Reviews that no root leads to (parent cycle or foreign parent).
    Unreachable { count: usize },
}

impl fmt::Display for ReviewTreeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReviewTreeError::TooDeep {
                review_id,
                max_depth,
            } => write!(
                f,
                "review {} is nested deeper than {} levels",
                review_id, max_depth
            ),
            ReviewTreeError::Unreachable { count } => {
                write!(f, "{} review(s) are not reachable from a root review", count)
            }
        }
    }
}

impl std::error::Error for ReviewTreeError {}

/// Whether a reply to a review at `parent_depth` (roots are depth 0) still
/// fits in a renderable tree.
pub fn accepts_reply_at(parent_depth: usize) -> bool {
    parent_depth + 1 < MAX_REVIEW_DEPTH
}

type ParentIndex<'a> = HashMap<Option<i64>, Vec<&'a ReviewRow>>;

/// Renders the reviews of one movie as a forest.
///
/// Only reviews without a parent appear at the top level; every other review
/// is nested under its parent's `children`. Siblings are ordered by ascending id.
pub fn build_review_tree(rows: &[ReviewRow]) -> Result<Vec<ReviewNode>, ReviewTreeError> {
    build_with_max_depth(rows, MAX_REVIEW_DEPTH)
}

fn build_with_max_depth(
    rows: &[ReviewRow],
    max_depth: usize,
) -> Result<Vec<ReviewNode>, ReviewTreeError> {
    let mut by_parent: ParentIndex = HashMap::new();
    for row in rows {
        by_parent.entry(row.parent_id).or_default().push(row);
    }
    for siblings in by_parent.values_mut() {
        siblings.sort_by_key(|row| row.id);
    }

    let mut rendered = 0;
    let mut forest = Vec::new();
    if let Some(roots) = by_parent.get(&None) {
        for root in roots {
            forest.push(render(root, &by_parent, 0, max_depth, &mut rendered)?);
        }
    }

    if rendered < rows.len() {
        return Err(ReviewTreeError::Unreachable {
            count: rows.len() - rendered,
        });
    }

    Ok(forest)
}

fn render(
    row: &ReviewRow,
    by_parent: &ParentIndex,
    depth: usize,
    max_depth: usize,
    rendered: &mut usize,
) -> Result<ReviewNode, ReviewTreeError> {
    if depth >= max_depth {
        return Err(ReviewTreeError::TooDeep {
            review_id: row.id,
            max_depth,
        });
    }
    *rendered += 1;

    let mut children = Vec::new();
    if let Some(replies) = by_parent.get(&Some(row.id)) {
        for reply in replies {
            children.push(render(reply, by_parent, depth + 1, max_depth, rendered)?);
        }
    }

    Ok(ReviewNode {
        name: row.name.clone(),
        text: row.text.clone(),
        children,
    })
}
