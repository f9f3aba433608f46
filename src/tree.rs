use std::collections::{HashMap, HashSet};

use crate::model::protocol::PTask;

/// One node in the cached task forest: a task record plus its sub-tasks.
///
/// Parent linkage is implicit — derived by traversal, never stored as a
/// back-pointer — which rules out reference cycles by construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskNode {
    pub task: PTask,
    pub children: Vec<TaskNode>,
}

impl TaskNode {
    pub fn new(task: PTask) -> TaskNode {
        TaskNode {
            task,
            children: Vec::new(),
        }
    }

    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    /// Number of tasks in this subtree, including the node itself.
    pub fn subtree_len(&self) -> usize {
        1 + self.children.iter().map(TaskNode::subtree_len).sum::<usize>()
    }
}

/// Where to place a node relative to a target during a local patch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Place {
    Before,
    After,
    /// Append as last child of the target.
    Into,
}

/// The client-side cache of one sub-group's task forest.
///
/// Repopulated wholesale by [`TaskTree::load`]; patched in place by the
/// create/delete/move operations so the UI does not flicker through a full
/// refetch. The server stays the source of truth for final ordering — sibling
/// order is re-derived at read time via [`TaskTree::export_ordered`].
#[derive(Debug, Clone, Default)]
pub struct TaskTree {
    pub roots: Vec<TaskNode>,
}

impl TaskTree {
    pub fn new() -> TaskTree {
        TaskTree { roots: Vec::new() }
    }

    pub fn clear(&mut self) {
        self.roots.clear();
    }

    /// Total number of tasks in the forest.
    pub fn len(&self) -> usize {
        self.roots.iter().map(TaskNode::subtree_len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    // -----------------------------------------------------------------------
    // Load
    // -----------------------------------------------------------------------

    /// Replace the entire forest from a flat task list.
    ///
    /// The list may arrive in any order: a child referencing a not-yet-seen
    /// parent is linked once the parent is built. Tasks whose parent never
    /// appears (including unreachable parent cycles) are returned as orphans —
    /// a reportable data inconsistency, never a silent drop.
    pub fn load(&mut self, tasks: Vec<PTask>) -> Vec<PTask> {
        self.roots.clear();

        let ids: HashSet<u32> = tasks.iter().map(|t| t.id).collect();
        let mut pending: HashMap<u32, Vec<PTask>> = HashMap::new();
        let mut root_tasks = Vec::new();
        let mut orphans = Vec::new();

        for task in tasks {
            if task.parent_id == 0 {
                root_tasks.push(task);
            } else if ids.contains(&task.parent_id) {
                pending.entry(task.parent_id).or_default().push(task);
            } else {
                orphans.push(task);
            }
        }

        for task in root_tasks {
            self.roots.push(build_subtree(task, &mut pending));
        }

        // Anything still pending hangs off a parent chain that never reaches
        // a root (corrupt data); surface it with the orphans.
        let mut leftover_ids: Vec<u32> = pending.keys().copied().collect();
        leftover_ids.sort_unstable();
        for id in leftover_ids {
            if let Some(tasks) = pending.remove(&id) {
                orphans.extend(tasks);
            }
        }
        orphans
    }

    // -----------------------------------------------------------------------
    // Lookup
    // -----------------------------------------------------------------------

    /// Depth-first search for a task by ID.
    pub fn find(&self, id: u32) -> Option<&TaskNode> {
        find_in(&self.roots, id)
    }

    pub fn find_mut(&mut self, id: u32) -> Option<&mut TaskNode> {
        find_in_mut(&mut self.roots, id)
    }

    pub fn contains(&self, id: u32) -> bool {
        self.find(id).is_some()
    }

    pub fn is_root(&self, id: u32) -> bool {
        self.roots.iter().any(|n| n.task.id == id)
    }

    /// The node whose children list contains `id`, or `None` for roots and
    /// unknown IDs.
    pub fn find_parent(&self, id: u32) -> Option<&TaskNode> {
        find_parent_in(&self.roots, id)
    }

    // -----------------------------------------------------------------------
    // Mutation
    // -----------------------------------------------------------------------

    /// Create a node for `task` and append it under its `parent_id`
    /// (0 = root). Returns false if the ID already exists or the parent is
    /// unknown — callers report, the tree never guesses.
    ///
    /// No resort happens here; ordering is re-derived at read time.
    pub fn insert(&mut self, task: PTask) -> bool {
        if self.contains(task.id) {
            return false;
        }
        if task.parent_id == 0 {
            self.roots.push(TaskNode::new(task));
            return true;
        }
        match self.find_mut(task.parent_id) {
            Some(parent) => {
                parent.children.push(TaskNode::new(task));
                true
            }
            None => false,
        }
    }

    /// Detach the node and its entire subtree, returning it for undo.
    pub fn remove(&mut self, id: u32) -> Option<TaskNode> {
        remove_in(&mut self.roots, id)
    }

    /// Move a subtree under a new parent (0 = root), appended last.
    ///
    /// Detach-then-attach happens within this one synchronous call, so no
    /// intermediate state is ever observed by other handlers. Returns false —
    /// with the tree unchanged — when the source is missing, the target is
    /// missing, or the target lies inside the moved subtree.
    pub fn relocate(&mut self, id: u32, new_parent_id: u32) -> bool {
        if new_parent_id != 0 {
            match self.find(id) {
                Some(node) if find_in(std::slice::from_ref(node), new_parent_id).is_some() => {
                    return false;
                }
                None => return false,
                _ => {}
            }
            if !self.contains(new_parent_id) {
                return false;
            }
        }
        let Some(mut node) = self.remove(id) else {
            return false;
        };
        node.task.parent_id = new_parent_id;
        if new_parent_id == 0 {
            self.roots.push(node);
        } else if let Some(parent) = self.find_mut(new_parent_id) {
            parent.children.push(node);
        }
        true
    }

    /// Move a subtree next to (or into) a target node, for optimistic
    /// patching after a drag. Self-moves are a no-op.
    pub fn relocate_near(&mut self, source_id: u32, target_id: u32, place: Place) -> bool {
        if source_id == target_id {
            return false;
        }
        if place == Place::Into {
            return self.relocate(source_id, target_id);
        }
        // Target must exist outside the moved subtree.
        match self.find(source_id) {
            Some(node) if find_in(std::slice::from_ref(node), target_id).is_some() => return false,
            None => return false,
            _ => {}
        }
        if !self.contains(target_id) {
            return false;
        }
        let Some(mut node) = self.remove(source_id) else {
            return false;
        };
        let parent_id = self.find_parent(target_id).map_or(0, |p| p.task.id);
        node.task.parent_id = parent_id;
        let siblings = if parent_id == 0 {
            &mut self.roots
        } else {
            // Parent was found above; the unwrap-free fallback keeps the node.
            match self.find_mut(parent_id) {
                Some(parent) => &mut parent.children,
                None => &mut self.roots,
            }
        };
        let target_pos = siblings
            .iter()
            .position(|n| n.task.id == target_id)
            .unwrap_or(siblings.len());
        let insert_pos = match place {
            Place::Before => target_pos,
            Place::After | Place::Into => target_pos + 1,
        };
        siblings.insert(insert_pos.min(siblings.len()), node);
        true
    }

    // -----------------------------------------------------------------------
    // Ordered export
    // -----------------------------------------------------------------------

    /// One sibling level sorted by `Index`. The sort is stable: equal indices
    /// keep their input order (duplicates occur transiently before the server
    /// assigns a final index).
    pub fn export_ordered<'a>(nodes: &'a [TaskNode], ascending: bool) -> Vec<&'a PTask> {
        let mut out: Vec<&PTask> = nodes.iter().map(|n| &n.task).collect();
        if ascending {
            out.sort_by_key(|t| t.index);
        } else {
            out.sort_by_key(|t| std::cmp::Reverse(t.index));
        }
        out
    }

    pub fn ordered_roots(&self, ascending: bool) -> Vec<&PTask> {
        Self::export_ordered(&self.roots, ascending)
    }

    pub fn ordered_children(&self, id: u32, ascending: bool) -> Vec<&PTask> {
        self.find(id)
            .map(|n| Self::export_ordered(&n.children, ascending))
            .unwrap_or_default()
    }
}

fn build_subtree(task: PTask, pending: &mut HashMap<u32, Vec<PTask>>) -> TaskNode {
    let mut node = TaskNode::new(task);
    if let Some(kids) = pending.remove(&node.task.id) {
        for kid in kids {
            node.children.push(build_subtree(kid, pending));
        }
    }
    node
}

fn find_in(nodes: &[TaskNode], id: u32) -> Option<&TaskNode> {
    for node in nodes {
        if node.task.id == id {
            return Some(node);
        }
        if let Some(found) = find_in(&node.children, id) {
            return Some(found);
        }
    }
    None
}

fn find_in_mut(nodes: &mut [TaskNode], id: u32) -> Option<&mut TaskNode> {
    for node in nodes {
        if node.task.id == id {
            return Some(node);
        }
        if let Some(found) = find_in_mut(&mut node.children, id) {
            return Some(found);
        }
    }
    None
}

fn find_parent_in(nodes: &[TaskNode], id: u32) -> Option<&TaskNode> {
    for node in nodes {
        if node.children.iter().any(|c| c.task.id == id) {
            return Some(node);
        }
        if let Some(found) = find_parent_in(&node.children, id) {
            return Some(found);
        }
    }
    None
}

fn remove_in(nodes: &mut Vec<TaskNode>, id: u32) -> Option<TaskNode> {
    if let Some(pos) = nodes.iter().position(|n| n.task.id == id) {
        return Some(nodes.remove(pos));
    }
    for node in nodes {
        if let Some(removed) = remove_in(&mut node.children, id) {
            return Some(removed);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn task(id: u32, parent_id: u32, index: i64) -> PTask {
        PTask {
            id,
            parent_id,
            index,
            title: format!("task {id}"),
            ..PTask::default()
        }
    }

    fn sample_tree() -> TaskTree {
        let mut tree = TaskTree::new();
        let orphans = tree.load(vec![
            task(1, 0, 0),
            task(2, 1, 0),
            task(3, 0, 1),
            task(4, 2, 0),
            task(5, 1, 1),
        ]);
        assert!(orphans.is_empty());
        tree
    }

    fn all_ids(tree: &TaskTree) -> Vec<u32> {
        fn walk(nodes: &[TaskNode], out: &mut Vec<u32>) {
            for n in nodes {
                out.push(n.task.id);
                walk(&n.children, out);
            }
        }
        let mut out = Vec::new();
        walk(&tree.roots, &mut out);
        out.sort_unstable();
        out
    }

    // --- load ---

    #[test]
    fn test_load_builds_forest() {
        let mut tree = TaskTree::new();
        let orphans = tree.load(vec![task(1, 0, 0), task(2, 1, 0), task(3, 0, 1)]);
        assert!(orphans.is_empty());
        assert_eq!(tree.roots.len(), 2);
        assert_eq!(tree.find(1).unwrap().children.len(), 1);
        assert_eq!(tree.find(1).unwrap().children[0].task.id, 2);
        let roots: Vec<u32> = tree.ordered_roots(true).iter().map(|t| t.id).collect();
        assert_eq!(roots, vec![1, 3]);
    }

    #[test]
    fn test_load_tolerates_child_before_parent() {
        let mut tree = TaskTree::new();
        let orphans = tree.load(vec![task(4, 2, 0), task(2, 1, 0), task(1, 0, 0)]);
        assert!(orphans.is_empty());
        assert_eq!(tree.find(4).unwrap().task.id, 4);
        assert_eq!(tree.find_parent(4).unwrap().task.id, 2);
    }

    #[test]
    fn test_load_reports_orphans() {
        let mut tree = TaskTree::new();
        let orphans = tree.load(vec![task(1, 0, 0), task(9, 42, 0)]);
        assert_eq!(orphans.len(), 1);
        assert_eq!(orphans[0].id, 9);
        assert!(!tree.contains(9));
    }

    #[test]
    fn test_load_reports_parent_cycle_as_orphans() {
        let mut tree = TaskTree::new();
        // 7 and 8 reference each other; neither can reach a root.
        let orphans = tree.load(vec![task(1, 0, 0), task(7, 8, 0), task(8, 7, 0)]);
        let mut ids: Vec<u32> = orphans.iter().map(|t| t.id).collect();
        ids.sort_unstable();
        assert_eq!(ids, vec![7, 8]);
        assert_eq!(tree.len(), 1);
    }

    #[test]
    fn test_load_is_idempotent() {
        let tasks = vec![task(1, 0, 2), task(2, 1, 0), task(3, 0, 1)];
        let mut tree = TaskTree::new();
        tree.load(tasks.clone());
        let first: Vec<u32> = tree.ordered_roots(true).iter().map(|t| t.id).collect();
        tree.load(tasks);
        let second: Vec<u32> = tree.ordered_roots(true).iter().map(|t| t.id).collect();
        assert_eq!(first, second);
        assert_eq!(first, vec![3, 1]);
    }

    // --- insert / remove ---

    #[test]
    fn test_insert_under_parent_and_root() {
        let mut tree = sample_tree();
        assert!(tree.insert(task(10, 4, 0)));
        assert!(tree.insert(task(11, 0, 9)));
        assert_eq!(tree.find_parent(10).unwrap().task.id, 4);
        assert!(tree.is_root(11));
    }

    #[test]
    fn test_insert_rejects_duplicate_and_unknown_parent() {
        let mut tree = sample_tree();
        assert!(!tree.insert(task(1, 0, 0)));
        assert!(!tree.insert(task(12, 99, 0)));
        assert_eq!(all_ids(&tree), vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_remove_detaches_whole_subtree() {
        let mut tree = sample_tree();
        let removed = tree.remove(2).unwrap();
        // 4 travels with its parent 2.
        assert_eq!(removed.subtree_len(), 2);
        assert!(!tree.contains(2));
        assert!(!tree.contains(4));
        assert_eq!(tree.len(), 3);
    }

    #[test]
    fn test_remove_unknown_is_none() {
        let mut tree = sample_tree();
        assert!(tree.remove(99).is_none());
        assert_eq!(tree.len(), 5);
    }

    // --- relocate ---

    #[test]
    fn test_relocate_moves_subtree_atomically() {
        let mut tree = sample_tree();
        assert!(tree.relocate(2, 3));
        // Every descendant still resolves, under the new ancestor chain.
        assert_eq!(tree.find_parent(2).unwrap().task.id, 3);
        assert_eq!(tree.find_parent(4).unwrap().task.id, 2);
        assert_eq!(tree.find(2).unwrap().task.parent_id, 3);
        assert_eq!(all_ids(&tree), vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_relocate_to_root() {
        let mut tree = sample_tree();
        assert!(tree.relocate(4, 0));
        assert!(tree.is_root(4));
        assert_eq!(tree.find(4).unwrap().task.parent_id, 0);
    }

    #[test]
    fn test_relocate_into_own_subtree_refused() {
        let mut tree = sample_tree();
        assert!(!tree.relocate(1, 4));
        assert_eq!(all_ids(&tree), vec![1, 2, 3, 4, 5]);
        assert!(tree.is_root(1));
    }

    #[test]
    fn test_relocate_unknown_target_refused() {
        let mut tree = sample_tree();
        assert!(!tree.relocate(2, 99));
        assert!(tree.contains(2));
        assert_eq!(tree.find_parent(2).unwrap().task.id, 1);
    }

    #[test]
    fn test_relocate_near_before_and_after() {
        let mut tree = sample_tree();
        // Move 3 between 2 and 5 under parent 1.
        assert!(tree.relocate_near(3, 5, Place::Before));
        let parent = tree.find(1).unwrap();
        let order: Vec<u32> = parent.children.iter().map(|n| n.task.id).collect();
        assert_eq!(order, vec![2, 3, 5]);
        assert_eq!(tree.find(3).unwrap().task.parent_id, 1);

        assert!(tree.relocate_near(2, 5, Place::After));
        let parent = tree.find(1).unwrap();
        let order: Vec<u32> = parent.children.iter().map(|n| n.task.id).collect();
        assert_eq!(order, vec![3, 5, 2]);
    }

    #[test]
    fn test_relocate_near_self_is_noop() {
        let mut tree = sample_tree();
        assert!(!tree.relocate_near(3, 3, Place::After));
        assert_eq!(all_ids(&tree), vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_no_duplicate_ids_after_mutation_sequence() {
        let mut tree = sample_tree();
        tree.insert(task(6, 3, 0));
        tree.relocate(2, 3);
        tree.remove(5);
        tree.relocate_near(6, 2, Place::Before);
        tree.insert(task(7, 0, 5));
        let ids = all_ids(&tree);
        let unique: HashSet<u32> = ids.iter().copied().collect();
        assert_eq!(ids.len(), unique.len());
        assert_eq!(ids, vec![1, 2, 3, 4, 6, 7]);
    }

    // --- ordering ---

    #[test]
    fn test_export_ordered_stable_on_equal_index() {
        let nodes = vec![
            TaskNode::new(task(1, 0, 5)),
            TaskNode::new(task(2, 0, 5)),
            TaskNode::new(task(3, 0, 1)),
        ];
        let asc: Vec<u32> = TaskTree::export_ordered(&nodes, true)
            .iter()
            .map(|t| t.id)
            .collect();
        // 1 and 2 share an index and keep their input order.
        assert_eq!(asc, vec![3, 1, 2]);
        let desc: Vec<u32> = TaskTree::export_ordered(&nodes, false)
            .iter()
            .map(|t| t.id)
            .collect();
        assert_eq!(desc, vec![1, 2, 3]);
    }

    #[test]
    fn test_ordered_children_of_unknown_is_empty() {
        let tree = sample_tree();
        assert!(tree.ordered_children(99, true).is_empty());
    }
}
