//! ASCII art rendering of a tree, built on its level-order snapshot.

use std::fmt;

use crate::tree::AvlTree;

/// Width in columns used when no other width is configured.
pub const DEFAULT_WIDTH: usize = 80;

/// Layout settings for [`Pretty`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOptions {
    /// Total width of the root level. Every level below gets half the width of its parent level.
    pub width: usize,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
        }
    }
}

/// Displays a tree level by level, connecting children to their parents.
///
/// ```
/// use avl_engine::AvlTree;
/// let mut tree = AvlTree::new();
/// tree.insert(1);
/// print!("{}", tree.pretty().width(40));
/// ```
pub struct Pretty<'a, T> {
    tree: &'a AvlTree<T>,
    options: RenderOptions,
}

impl<'a, T> Pretty<'a, T> {
    /// Sets the width of the root level.
    pub fn width(mut self, width: usize) -> Self {
        self.options.width = width;
        self
    }

    /// Replaces all layout settings.
    pub fn options(mut self, options: RenderOptions) -> Self {
        self.options = options;
        self
    }
}

impl<T> AvlTree<T> {
    /// Returns a displayable ASCII art rendering of the tree using default options.
    pub fn pretty(&self) -> Pretty<'_, T> {
        Pretty {
            tree: self,
            options: RenderOptions::default(),
        }
    }
}

impl<'a, T: fmt::Display> fmt::Display for Pretty<'a, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let snapshot = self.tree.snapshot();
        if snapshot.is_empty() {
            return writeln!(f, "tree is empty");
        }

        let mut width = self.options.width;
        let mut depth = 0;
        let mut line: Vec<Option<&T>> = vec![None];
        for entry in snapshot {
            // Levels arrive in order without gaps
            if entry.depth > depth {
                write_line(f, &line, width)?;
                width /= 2;
                depth = entry.depth;
                let num_slots = line.len() * 2;
                line.clear();
                line.resize(num_slots, None);
            }
            line[entry.position] = Some(entry.value);
        }
        write_line(f, &line, width)?;
        writeln!(f)
    }
}

fn write_line<T: fmt::Display>(
    f: &mut fmt::Formatter<'_>,
    line: &[Option<&T>],
    width: usize,
) -> fmt::Result {
    let half = width / 2;
    let first_half = width - half;

    // Connectors to the parent level
    if line.len() > 1 {
        for (i, slot) in line.iter().enumerate() {
            match slot {
                None => write!(f, "{:w$}", "", w = width)?,
                Some(_) if i % 2 == 0 => {
                    write!(f, "{:>w1$}{:-<w2$}", "-", "-", w1 = first_half, w2 = half)?
                }
                Some(_) => write!(f, "{:->w1$}{:<w2$}", "-", "-", w1 = first_half, w2 = half)?,
            }
        }
        writeln!(f)?;
    }

    for (i, slot) in line.iter().enumerate() {
        write_slot(f, slot.map(|_| "|"), i % 2 == 0, first_half, half)?;
    }
    writeln!(f)?;

    for (i, slot) in line.iter().enumerate() {
        let text = slot.map(|value| value.to_string());
        write_slot(f, text.as_deref(), i % 2 == 0, first_half, half)?;
    }
    writeln!(f)
}

// Left children lean right within their slot, right children lean left.
fn write_slot(
    f: &mut fmt::Formatter<'_>,
    text: Option<&str>,
    is_left: bool,
    first_half: usize,
    half: usize,
) -> fmt::Result {
    match text {
        None => write!(f, "{:w$}", "", w = first_half + half),
        Some(text) if is_left => write!(f, "{:>w1$}{:w2$}", text, "", w1 = first_half, w2 = half),
        Some(text) => write!(f, "{:w1$}{:<w2$}", "", text, w1 = first_half, w2 = half),
    }
}

#[cfg(test)]
mod tests {
    use super::RenderOptions;
    use crate::AvlTree;

    #[test]
    fn test_empty() {
        let tree = AvlTree::<i32>::new();
        assert_eq!(tree.pretty().to_string(), "tree is empty\n");
    }

    #[test]
    fn test_single_level() {
        let mut tree = AvlTree::new();
        tree.insert(7);
        assert_eq!(tree.pretty().width(6).to_string(), "  |   \n  7   \n\n");
    }

    #[test]
    fn test_two_levels() {
        let mut tree = AvlTree::new();
        for value in [1, 2, 3] {
            tree.insert(value);
        }
        let expected = concat!(
            "   |    \n",
            "   2    \n",
            " ------ \n",
            " |    | \n",
            " 1    3 \n",
            "\n",
        );
        assert_eq!(tree.pretty().width(8).to_string(), expected);
    }

    #[test]
    fn test_missing_child() {
        let mut tree = AvlTree::new();
        tree.insert(2);
        tree.insert(3);
        let expected = concat!(
            "   |    \n",
            "   2    \n",
            "    --- \n",
            "      | \n",
            "      3 \n",
            "\n",
        );
        let options = RenderOptions { width: 8 };
        assert_eq!(tree.pretty().options(options).to_string(), expected);
    }

    #[test]
    fn test_wide_tree() {
        // More levels than fit in a fixed number of slots
        let mut tree = AvlTree::new();
        for value in 0..1_000 {
            tree.insert(value);
        }
        let height = tree.height().unwrap();
        let rendered = tree.pretty().to_string();
        assert_eq!(rendered.matches('\n').count(), 2 + 3 * height + 1);
        assert!(rendered.ends_with("\n\n"));
    }
}
