//! Text rendering of shrink trees for debugging.
//!
//! Renderers walk the raw shrink candidates rather than the accepted
//! children, so candidates the filter map rejects show up too (marked
//! `✗`). A node whose logical value differs from its raw value is shown
//! as `value ← raw`. Trees are lazy and may be very wide, so every
//! renderer is bounded by depth and by candidates shown per node.

use super::Tree;
use std::fmt::Debug;

const DEFAULT_DEPTH: usize = 3;
const DEFAULT_BREADTH: usize = 8;

/// A raw candidate and, if accepted, the subtree rooted at it.
enum Candidate<T, U> {
    Accepted(Tree<T, U>),
    Rejected(T),
}

impl<T, U> Tree<T, U>
where
    T: Clone + Debug + 'static,
    U: Clone + Debug + 'static,
{
    fn label(&self) -> String {
        let value = format!("{:?}", self.value);
        let raw = format!("{:?}", self.raw);
        if value == raw {
            value
        } else {
            format!("{value} ← {raw}")
        }
    }

    fn candidates(&self, breadth: usize) -> Vec<Candidate<T, U>> {
        self.shrink
            .candidates(&self.raw)
            .take(breadth)
            .map(|raw| match self.filter_map.apply(&raw) {
                Some(value) => Candidate::Accepted(Tree::new(
                    raw,
                    value,
                    self.shrink.clone(),
                    self.filter_map.clone(),
                )),
                None => Candidate::Rejected(raw),
            })
            .collect()
    }

    pub fn render(&self) -> String {
        self.render_bounded(DEFAULT_DEPTH, DEFAULT_BREADTH)
    }

    /// Draw at most `max_depth` levels below the root and `max_breadth`
    /// candidates per node.
    pub fn render_bounded(&self, max_depth: usize, max_breadth: usize) -> String {
        let mut out = format!("{}\n", self.label());
        self.draw_candidates(&mut out, "", max_depth, max_breadth);
        out
    }

    fn draw_candidates(&self, out: &mut String, prefix: &str, depth: usize, breadth: usize) {
        if depth == 0 {
            return;
        }

        let candidates = self.candidates(breadth);
        let last = candidates.len().saturating_sub(1);
        for (i, candidate) in candidates.into_iter().enumerate() {
            let (branch, indent) = if i == last {
                ("└── ", "    ")
            } else {
                ("├── ", "│   ")
            };

            match candidate {
                Candidate::Accepted(child) => {
                    out.push_str(&format!("{prefix}{branch}{}\n", child.label()));
                    child.draw_candidates(out, &format!("{prefix}{indent}"), depth - 1, breadth);
                }
                Candidate::Rejected(raw) => {
                    out.push_str(&format!("{prefix}{branch}✗ {raw:?}\n"));
                }
            }
        }
    }

    /// One-line nested rendering of accepted values only.
    pub fn render_compact(&self, max_depth: usize) -> String {
        let value = format!("{:?}", self.value);
        if max_depth == 0 {
            return value;
        }

        let children: Vec<String> = self
            .children()
            .take(DEFAULT_BREADTH)
            .map(|child| child.render_compact(max_depth - 1))
            .collect();

        if children.is_empty() {
            value
        } else {
            format!("{value}[{}]", children.join(", "))
        }
    }

    /// The root and its immediate accepted shrinks, with a count of
    /// candidates the filter map threw away.
    pub fn render_shrinks(&self) -> String {
        let mut accepted = Vec::new();
        let mut rejected = 0;
        for raw in self.shrink.candidates(&self.raw) {
            match self.filter_map.apply(&raw) {
                Some(value) => accepted.push(format!("{value:?}")),
                None => rejected += 1,
            }
        }

        let mut out = if accepted.is_empty() {
            format!("{} (no shrinks)", self.label())
        } else {
            format!("{} → [{}]", self.label(), accepted.join(", "))
        };
        if rejected > 0 {
            out.push_str(&format!(" ({rejected} rejected)"));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::Tree;
    use crate::data::{Seed, Size};
    use crate::filter_map::FilterMap;
    use crate::fuzz;
    use crate::shrink;

    fn integer_tree(value: i64) -> Tree<i64> {
        Tree::new(value, value, shrink::integer(), FilterMap::identity())
    }

    #[test]
    fn test_tree_rendering() {
        let rendered = integer_tree(3).render();
        assert_eq!(
            rendered,
            "3\n\
             ├── 0\n\
             └── 2\n\
             \x20   ├── 0\n\
             \x20   └── 1\n\
             \x20       └── 0\n"
        );
    }

    #[test]
    fn test_compact_and_shrinks() {
        let tree = integer_tree(3);
        assert_eq!(tree.render_compact(3), "3[0, 2[0, 1[0]]]");
        assert_eq!(tree.render_compact(1), "3[0, 2]");
        assert_eq!(tree.render_shrinks(), "3 → [0, 2]");

        let leaf = integer_tree(0);
        assert_eq!(leaf.render_compact(3), "0");
        assert_eq!(leaf.render_shrinks(), "0 (no shrinks)");
    }

    #[test]
    fn test_rejected_candidates_are_marked() {
        let odd = FilterMap::identity().filter(|x: &i64| x % 2 == 1);
        let tree = Tree::new(9, 9, shrink::integer(), odd);

        // 9 shrinks through 0, 5, 7, 8; only the odd ones are children.
        assert_eq!(tree.render_shrinks(), "9 → [5, 7] (2 rejected)");
        assert!(tree.render_bounded(1, 8).contains("├── ✗ 0\n"));
        assert!(tree.render_bounded(1, 8).contains("└── ✗ 8\n"));
        assert_eq!(tree.render_compact(1), "9[5, 7]");
    }

    #[test]
    fn test_mapped_values_show_raw() {
        let doubled = FilterMap::new(|x: &i64| Some(x * 2));
        let tree = Tree::new(2, 4, shrink::integer(), doubled);
        assert_eq!(tree.render_bounded(1, 8), "4 ← 2\n├── 0\n└── 2 ← 1\n");
    }

    #[test]
    fn test_breadth_is_bounded() {
        let tree = integer_tree(1_000_000);
        assert_eq!(tree.render_bounded(1, 2).lines().count(), 3);
    }

    #[test]
    fn test_string_tree_rendering() {
        let tree = fuzz::string()
            .generate(Size::new(8), Seed::from_u32(1))
            .unwrap();
        assert!(tree.render_shrinks().starts_with(&format!("{:?}", tree.value())));
    }
}
