use std::alloc::{self, Layout};
use std::cmp::{self, Ordering};
use std::ptr::NonNull;

use log::{debug, trace};

use crate::error::{Error, Result};
use crate::queue::Queue;

/// An ordered set of unique values implemented with an AVL tree.
///
/// ```
/// use avl_engine::AvlTree;
/// let mut tree = AvlTree::new();
/// tree.insert(1);
/// tree.insert(2);
/// tree.insert(3);
/// assert!(tree.contains(&2));
/// tree.remove(&2);
/// assert!(!tree.contains(&2));
/// ```
#[derive(Clone)]
pub struct AvlTree<T> {
    root: Link<T>,
    num_nodes: usize,
}

/// A node visited by a level-order traversal.
///
/// `position` addresses the node within its level: the root is at depth 0,
/// position 0, and the children of position `p` sit at `2 * p` and `2 * p + 1`
/// one level further down.
#[derive(Debug, PartialEq, Eq)]
pub struct LevelEntry<'a, T> {
    pub value: &'a T,
    pub depth: usize,
    pub position: usize,
}

type Link<T> = Option<Box<Node<T>>>;

#[derive(Clone)]
struct Node<T> {
    value: T,
    left: Link<T>,
    right: Link<T>,
    height: usize,
}

impl<T> AvlTree<T> {
    /// Creates an empty tree.
    /// No memory is allocated until the first value is inserted.
    pub fn new() -> Self {
        Self {
            root: None,
            num_nodes: 0,
        }
    }

    /// Returns true if the tree contains no values.
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Returns the number of values in the tree.
    pub fn len(&self) -> usize {
        self.num_nodes
    }

    /// Returns the height of the tree, counted in edges from the root to the deepest leaf.
    /// An empty tree has no height.
    pub fn height(&self) -> Option<usize> {
        self.root.as_ref().map(|root| root.height)
    }

    /// Clears the tree, deallocating all nodes.
    pub fn clear(&mut self) {
        if self.num_nodes > 0 {
            debug!("releasing {} tree nodes", self.num_nodes);
        }
        Self::destroy(self.root.take());
        self.num_nodes = 0;
    }

    /// Calls `f` for every node in breadth-first order.
    pub fn traverse_level_order<'a, F>(&'a self, mut f: F)
    where
        F: FnMut(LevelEntry<'a, T>),
    {
        let mut queue = Queue::new();
        if let Some(root) = self.root.as_deref() {
            queue.enqueue((root, 0, 0));
        }
        while let Some((node, depth, position)) = queue.dequeue() {
            if let Some(left) = node.left.as_deref() {
                queue.enqueue((left, depth + 1, position * 2));
            }
            if let Some(right) = node.right.as_deref() {
                queue.enqueue((right, depth + 1, position * 2 + 1));
            }
            f(LevelEntry {
                value: &node.value,
                depth,
                position,
            });
        }
    }

    /// Returns all nodes in breadth-first order together with their depth and position.
    pub fn snapshot(&self) -> Vec<LevelEntry<'_, T>> {
        let mut entries = Vec::with_capacity(self.num_nodes);
        self.traverse_level_order(|entry| entries.push(entry));
        entries
    }

    // Children are released before their parent.
    fn destroy(link: Link<T>) {
        if let Some(mut node) = link {
            Self::destroy(node.left.take());
            Self::destroy(node.right.take());
        }
    }
}

impl<T: Ord> AvlTree<T> {
    /// Returns true if the tree contains the given value.
    pub fn contains(&self, value: &T) -> bool {
        self.find(value).is_some()
    }

    /// Returns a reference to the value in the tree that is equal to the given value.
    pub fn get(&self, value: &T) -> Option<&T> {
        self.find(value).map(|node| &node.value)
    }

    /// Inserts a value into the tree.
    /// Returns false and leaves the tree untouched if an equal value is already present.
    ///
    /// Aborts via [`std::alloc::handle_alloc_error`] if a node cannot be allocated,
    /// see [`try_insert`](Self::try_insert) for the fallible variant.
    pub fn insert(&mut self, value: T) -> bool {
        match self.try_insert(value) {
            Ok(inserted) => inserted,
            Err(Error::Alloc { .. }) => alloc::handle_alloc_error(Node::<T>::layout()),
        }
    }

    /// Inserts a value into the tree, reporting allocation failure to the caller.
    /// The tree is unchanged if an error is returned.
    pub fn try_insert(&mut self, value: T) -> Result<bool> {
        if self.contains(&value) {
            return Ok(false);
        }
        let leaf = Node::create(value)?;
        self.root = Some(Self::attach(self.root.take(), leaf));
        self.num_nodes += 1;
        Ok(true)
    }

    /// Removes a value from the tree.
    /// Returns whether the value was previously in the tree.
    pub fn remove(&mut self, value: &T) -> bool {
        self.take(value).is_some()
    }

    /// Removes a value from the tree and returns it, if present.
    pub fn take(&mut self, value: &T) -> Option<T> {
        let (root, taken) = Self::remove_from(self.root.take(), value);
        self.root = root;
        if taken.is_some() {
            debug_assert!(self.num_nodes >= 1);
            self.num_nodes -= 1;
        }
        taken
    }

    #[cfg(any(test, feature = "consistency_check"))]
    pub fn check_consistency(&self) {
        let mut num_nodes = 0;
        Self::check_subtree(self.root.as_deref(), None, None, &mut num_nodes);
        assert_eq!(num_nodes, self.num_nodes);
        assert_eq!(self.root.is_none(), self.num_nodes == 0);
    }

    #[cfg(any(test, feature = "consistency_check"))]
    fn check_subtree<'a>(
        node: Option<&'a Node<T>>,
        lower: Option<&'a T>,
        upper: Option<&'a T>,
        num_nodes: &mut usize,
    ) -> isize {
        let node = match node {
            None => return -1,
            Some(node) => node,
        };

        // Check order against all ancestors
        if let Some(lower) = lower {
            assert!(node.value > *lower);
        }
        if let Some(upper) = upper {
            assert!(node.value < *upper);
        }

        let left_height = Self::check_subtree(node.left.as_deref(), lower, Some(&node.value), num_nodes);
        let right_height = Self::check_subtree(node.right.as_deref(), Some(&node.value), upper, num_nodes);

        // Check height
        assert_eq!(node.height as isize, cmp::max(left_height, right_height) + 1);

        // Check AVL condition (nearly balance)
        assert!(left_height <= right_height + 1);
        assert!(right_height <= left_height + 1);

        *num_nodes += 1;
        node.height as isize
    }

    fn find(&self, value: &T) -> Option<&Node<T>> {
        let mut current = self.root.as_deref();
        while let Some(node) = current {
            current = match value.cmp(&node.value) {
                Ordering::Equal => break,
                Ordering::Less => node.left.as_deref(),
                Ordering::Greater => node.right.as_deref(),
            }
        }
        current
    }

    // Returns the new root of the subtree that received the leaf.
    fn attach(link: Link<T>, leaf: Box<Node<T>>) -> Box<Node<T>> {
        match link {
            None => leaf,
            Some(mut node) => {
                // Equal values would go right, but try_insert rejects them beforehand.
                if leaf.value < node.value {
                    node.left = Some(Self::attach(node.left.take(), leaf));
                } else {
                    node.right = Some(Self::attach(node.right.take(), leaf));
                }
                Self::rebalance(node)
            }
        }
    }

    // Returns the new root of the subtree and the removed value.
    fn remove_from(link: Link<T>, value: &T) -> (Link<T>, Option<T>) {
        let mut node = match link {
            None => return (None, None),
            Some(node) => node,
        };
        match value.cmp(&node.value) {
            Ordering::Less => {
                let (left, taken) = Self::remove_from(node.left.take(), value);
                node.left = left;
                if taken.is_none() {
                    return (Some(node), None);
                }
                (Some(Self::rebalance(node)), taken)
            }
            Ordering::Greater => {
                let (right, taken) = Self::remove_from(node.right.take(), value);
                node.right = right;
                if taken.is_none() {
                    return (Some(node), None);
                }
                (Some(Self::rebalance(node)), taken)
            }
            Ordering::Equal => {
                let Node {
                    value: removed,
                    left,
                    right,
                    ..
                } = *node;
                let replacement = match (left, right) {
                    (None, None) => None,
                    (Some(child), None) | (None, Some(child)) => Some(child),
                    (Some(left), Some(right)) => {
                        // Replace by smallest node of the right sub tree
                        let (rest, mut successor) = Self::detach_min(right);
                        debug!("splicing in-order successor into removed node's position");
                        successor.left = Some(left);
                        successor.right = rest;
                        Some(Self::rebalance(successor))
                    }
                };
                (replacement, Some(removed))
            }
        }
    }

    // Unlinks the smallest node without releasing it.
    // Returns the remaining subtree and the detached node.
    fn detach_min(mut node: Box<Node<T>>) -> (Link<T>, Box<Node<T>>) {
        match node.left.take() {
            Some(left) => {
                let (rest, min) = Self::detach_min(left);
                node.left = rest;
                (Some(Self::rebalance(node)), min)
            }
            None => {
                let rest = node.right.take();
                (rest, node)
            }
        }
    }

    /// Adjusts the height of the given node and restores the AVL condition if necessary.
    /// Both subtrees must already be balanced with correct heights and may differ in height by at most 2.
    /// Returns the new subtree root.
    fn rebalance(mut node: Box<Node<T>>) -> Box<Node<T>> {
        node.adjust_height();
        let balance = node.balance_factor();
        debug_assert!((-2..=2).contains(&balance));
        if balance >= 2 {
            // Right heavy, double rotation if the right child leans left
            if let Some(right) = node.right.take() {
                node.right = Some(if right.balance_factor() < 0 {
                    Self::rotate_right(right)
                } else {
                    right
                });
            }
            Self::rotate_left(node)
        } else if balance <= -2 {
            // Left heavy, double rotation if the left child leans right
            if let Some(left) = node.left.take() {
                node.left = Some(if left.balance_factor() > 0 {
                    Self::rotate_left(left)
                } else {
                    left
                });
            }
            Self::rotate_right(node)
        } else {
            node
        }
    }

    //   A            B
    //  / \          / \
    // x   B   ->   A   z
    //    / \      / \
    //   y   z    x   y
    fn rotate_left(mut node: Box<Node<T>>) -> Box<Node<T>> {
        match node.right.take() {
            None => node,
            Some(mut pivot) => {
                node.right = pivot.left.take();
                node.adjust_height();
                pivot.left = Some(node);
                pivot.adjust_height();
                trace!("rotated left, new subtree height {}", pivot.height);
                pivot
            }
        }
    }

    //     A        B
    //    / \      / \
    //   B   z -> x   A
    //  / \          / \
    // x   y        y   z
    fn rotate_right(mut node: Box<Node<T>>) -> Box<Node<T>> {
        match node.left.take() {
            None => node,
            Some(mut pivot) => {
                node.left = pivot.right.take();
                node.adjust_height();
                pivot.right = Some(node);
                pivot.adjust_height();
                trace!("rotated right, new subtree height {}", pivot.height);
                pivot
            }
        }
    }
}

impl<T> Drop for AvlTree<T> {
    fn drop(&mut self) {
        Self::destroy(self.root.take());
    }
}

impl<T> Default for AvlTree<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a, T> Clone for LevelEntry<'a, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<'a, T> Copy for LevelEntry<'a, T> {}

impl<T> Node<T> {
    fn layout() -> Layout {
        Layout::new::<Node<T>>()
    }

    fn create(value: T) -> Result<Box<Node<T>>> {
        let layout = Self::layout();
        // Layout is never zero-sized, a node always stores its height
        let node_ptr = NonNull::new(unsafe { alloc::alloc(layout) }.cast::<Node<T>>())
            .ok_or(Error::Alloc {
                size: layout.size(),
            })?;
        unsafe {
            node_ptr.as_ptr().write(Node {
                value,
                left: None,
                right: None,
                height: 0,
            });
            Ok(Box::from_raw(node_ptr.as_ptr()))
        }
    }

    // Height of an absent subtree is -1.
    fn link_height(link: &Link<T>) -> isize {
        match link {
            None => -1,
            Some(node) => node.height as isize,
        }
    }

    fn adjust_height(&mut self) {
        let height = cmp::max(Self::link_height(&self.left), Self::link_height(&self.right)) + 1;
        self.height = height as usize;
    }

    fn balance_factor(&self) -> isize {
        Self::link_height(&self.right) - Self::link_height(&self.left)
    }
}
