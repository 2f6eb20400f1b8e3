//! Lookup and insertion over the recursive category forest of a game.

use crate::dao::models::{CategoryEntity, CategoryRole, ScoreEntity, ScoreKind};

use super::ScoreError;

/// Deepest nesting level the traversals descend into.
pub const MAX_CATEGORY_DEPTH: usize = 32;

impl CategoryEntity {
    /// Build a leaf category that accumulates scores of `kind`.
    pub fn leaf(
        name: impl Into<String>,
        label: impl Into<String>,
        is_enabled: bool,
        kind: ScoreKind,
    ) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
            is_enabled,
            role: CategoryRole::Leaf {
                kind,
                scores: Vec::new(),
            },
        }
    }

    /// Build an interior category grouping `categories`.
    pub fn interior(
        name: impl Into<String>,
        label: impl Into<String>,
        is_enabled: bool,
        categories: Vec<CategoryEntity>,
    ) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
            is_enabled,
            role: CategoryRole::Interior { categories },
        }
    }

    /// Declared score kind, `None` for interior categories.
    pub fn score_kind(&self) -> Option<&ScoreKind> {
        match &self.role {
            CategoryRole::Leaf { kind, .. } => Some(kind),
            CategoryRole::Interior { .. } => None,
        }
    }

    /// Recorded scores in insertion order, `None` for interior categories.
    pub fn scores(&self) -> Option<&[ScoreEntity]> {
        match &self.role {
            CategoryRole::Leaf { scores, .. } => Some(scores),
            CategoryRole::Interior { .. } => None,
        }
    }

    /// Direct children, empty for leaves.
    pub fn children(&self) -> &[CategoryEntity] {
        match &self.role {
            CategoryRole::Interior { categories } => categories,
            CategoryRole::Leaf { .. } => &[],
        }
    }

    /// Append `score`, checking it matches the declared type of this leaf.
    pub fn append_score(&mut self, score: ScoreEntity) -> Result<(), ScoreError> {
        match &mut self.role {
            CategoryRole::Leaf { kind, scores } => {
                let expected = kind.score_type();
                let actual = score.value.score_type();
                if expected != actual {
                    return Err(ScoreError::TypeMismatch { expected, actual });
                }
                scores.push(score);
                Ok(())
            }
            CategoryRole::Interior { .. } => Err(ScoreError::NotLeaf {
                category: self.name.clone(),
            }),
        }
    }
}

/// Pre-order depth-first search for the first category called `name`.
pub fn find<'a>(forest: &'a [CategoryEntity], name: &str) -> Option<&'a CategoryEntity> {
    find_at(forest, name, 0)
}

fn find_at<'a>(
    forest: &'a [CategoryEntity],
    name: &str,
    depth: usize,
) -> Option<&'a CategoryEntity> {
    if depth >= MAX_CATEGORY_DEPTH {
        return None;
    }

    for category in forest {
        if category.name == name {
            return Some(category);
        }
        if let Some(found) = find_at(category.children(), name, depth + 1) {
            return Some(found);
        }
    }

    None
}

/// Chain of categories from the top level down to the match [`find`] returns.
pub fn find_path<'a>(forest: &'a [CategoryEntity], name: &str) -> Option<Vec<&'a CategoryEntity>> {
    let mut path = Vec::new();
    find_path_at(forest, name, 0, &mut path).then_some(path)
}

fn find_path_at<'a>(
    forest: &'a [CategoryEntity],
    name: &str,
    depth: usize,
    path: &mut Vec<&'a CategoryEntity>,
) -> bool {
    if depth >= MAX_CATEGORY_DEPTH {
        return false;
    }

    for category in forest {
        path.push(category);
        if category.name == name || find_path_at(category.children(), name, depth + 1, path) {
            return true;
        }
        path.pop();
    }

    false
}

/// Mutable counterpart of [`find`], visiting nodes in the same order.
pub fn find_mut<'a>(forest: &'a mut [CategoryEntity], name: &str) -> Option<&'a mut CategoryEntity> {
    find_mut_at(forest, name, 0)
}

fn find_mut_at<'a>(
    forest: &'a mut [CategoryEntity],
    name: &str,
    depth: usize,
) -> Option<&'a mut CategoryEntity> {
    if depth >= MAX_CATEGORY_DEPTH {
        return None;
    }

    for category in forest.iter_mut() {
        if category.name == name {
            return Some(category);
        }
        if let CategoryRole::Interior { categories } = &mut category.role {
            if let Some(found) = find_mut_at(categories, name, depth + 1) {
                return Some(found);
            }
        }
    }

    None
}

/// Names of the immediate categories whose enabled flag equals `enabled`.
///
/// Only one level is inspected; nested categories are reached through [`find`].
pub fn list_enabled(forest: &[CategoryEntity], enabled: bool) -> Vec<String> {
    forest
        .iter()
        .filter(|category| category.is_enabled == enabled)
        .map(|category| category.name.clone())
        .collect()
}
