//!
//! # Dependency-Ordering Trait and Helpers
//!

// Std-lib
use std::collections::HashSet;
use std::hash::Hash;

///
/// # Dependency-Ordering Trait
///
/// Cell hierarchies are graphs: each cell-definition depends on the definitions it instantiates.
/// Writing formats such as LEF requires visiting every definition *after* all of its dependencies.
///
/// Implementers provide `deps`, listing an item's direct dependencies in traversal order,
/// and `cycle`, deciding what to do when an item is reached while it is still being traversed.
/// The default-implemented `order` then performs an iterative depth-first post-order traversal,
/// with an explicit stack rather than recursion, and returns every reachable item exactly once,
/// each after all of its (non-cyclic) dependencies.
///
/// ```text
/// struct Hierarchy<'a> { lib: &'a Library }
/// impl DepOrder for Hierarchy<'_> {
///     type Item = CellKey;
///     type Error = LefError;
///     fn deps(&self, item: &CellKey) -> Result<Vec<CellKey>, LefError> { ... }
///     fn cycle(&self, item: &CellKey) -> Result<(), LefError> { ... }
/// }
/// for key in Hierarchy { lib }.order(&[root])? {
///     // Every child of `key` has already been visited
/// }
/// ```
///
pub trait DepOrder: Sized {
    /// Item Type. Typically keys or pointers to the nodes of the graph.
    type Item: Clone + Eq + Hash;
    /// Error Type
    type Error;

    /// Dependency-order everything reachable from `roots`
    fn order(&self, roots: &[Self::Item]) -> Result<Vec<Self::Item>, Self::Error> {
        DepOrderer::new(self).order(roots)
    }
    /// Get the direct dependencies of `item`, in the order they should be traversed
    fn deps(&self, item: &Self::Item) -> Result<Vec<Self::Item>, Self::Error>;
    /// Handle reaching `item` while it is still pending, i.e. a cycle.
    /// Returning `Ok` skips the offending edge; returning `Err` aborts the ordering.
    fn cycle(&self, item: &Self::Item) -> Result<(), Self::Error>;
}

/// # Dependency Order Helper
/// Holds the traversal state for [DepOrder::order].
pub struct DepOrderer<'p, P: DepOrder> {
    /// Item processor
    p: &'p P,
    /// Ordered, completed items
    done: Vec<P::Item>,
    /// Hash-set of completed items, for quick membership tests
    seen: HashSet<P::Item>,
    /// Hash-set of items with open traversal frames, for cycle detection
    pending: HashSet<P::Item>,
    /// Traversal frames: each item and its not-yet-visited dependencies
    frames: Vec<(P::Item, std::vec::IntoIter<P::Item>)>,
}
impl<'p, P: DepOrder> DepOrderer<'p, P> {
    /// Create a new [DepOrderer] over processor `p`
    pub fn new(p: &'p P) -> Self {
        Self {
            p,
            done: Vec::new(),
            seen: HashSet::new(),
            pending: HashSet::new(),
            frames: Vec::new(),
        }
    }
    /// Dependency-order everything reachable from `roots`
    pub fn order(mut self, roots: &[P::Item]) -> Result<Vec<P::Item>, P::Error> {
        for root in roots.iter() {
            self.visit(root.clone())?;
            self.drain()?;
        }
        Ok(self.done)
    }
    /// Open a traversal frame for `item`, unless it is complete or pending
    fn visit(&mut self, item: P::Item) -> Result<(), P::Error> {
        if self.seen.contains(&item) {
            return Ok(());
        }
        if self.pending.contains(&item) {
            return self.p.cycle(&item);
        }
        let deps = self.p.deps(&item)?;
        self.pending.insert(item.clone());
        self.frames.push((item, deps.into_iter()));
        Ok(())
    }
    /// Run the traversal until every open frame is closed
    fn drain(&mut self) -> Result<(), P::Error> {
        loop {
            let next = match self.frames.last_mut() {
                Some((_, deps)) => deps.next(),
                None => return Ok(()),
            };
            match next {
                Some(dep) => self.visit(dep)?,
                None => {
                    // All dependencies done. Close the frame and complete its item.
                    if let Some((item, _)) = self.frames.pop() {
                        self.pending.remove(&item);
                        self.seen.insert(item.clone());
                        self.done.push(item);
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    /// Graph of cell-names to the cell-names they instantiate
    struct Cells {
        children: HashMap<&'static str, Vec<&'static str>>,
        allow_cycles: bool,
    }
    impl Cells {
        fn new(edges: &[(&'static str, &[&'static str])], allow_cycles: bool) -> Self {
            let children = edges.iter().map(|(k, v)| (*k, v.to_vec())).collect();
            Self {
                children,
                allow_cycles,
            }
        }
    }
    impl DepOrder for Cells {
        type Item = &'static str;
        type Error = String;
        fn deps(&self, item: &Self::Item) -> Result<Vec<Self::Item>, String> {
            Ok(self.children.get(item).cloned().unwrap_or_default())
        }
        fn cycle(&self, item: &Self::Item) -> Result<(), String> {
            match self.allow_cycles {
                true => Ok(()),
                false => Err(format!("Cycle at {}", item)),
            }
        }
    }

    #[test]
    fn test_leaves_first() -> Result<(), String> {
        let cells = Cells::new(
            &[("top", &["a", "b"]), ("a", &["a1"]), ("b", &["a1", "b1"])],
            false,
        );
        let order = cells.order(&["top"])?;
        assert_eq!(order, vec!["a1", "a", "b1", "b", "top"]);
        Ok(())
    }
    #[test]
    fn test_shared_child_before_both_parents() -> Result<(), String> {
        // `a` is reached from `top` after `b` has already been completed through it
        let cells = Cells::new(&[("top", &["b", "a"]), ("a", &["b"])], false);
        let order = cells.order(&["top"])?;
        assert_eq!(order, vec!["b", "a", "top"]);
        Ok(())
    }
    #[test]
    fn test_cycles() {
        let edges: &[(&'static str, &[&'static str])] =
            &[("top", &["a"]), ("a", &["b"]), ("b", &["a"])];
        let cells = Cells::new(edges, false);
        assert_eq!(cells.order(&["top"]), Err("Cycle at a".to_string()));

        let cells = Cells::new(edges, true);
        assert_eq!(cells.order(&["top"]), Ok(vec!["b", "a", "top"]));
    }
}
