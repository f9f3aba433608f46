//! Per-sub-group task session: cache, mutations, and the move protocol.
//!
//! Every mutation is optimistic about the local cache but defers to server
//! truth: on success the cache is patched in place and the affected scope is
//! refetched for authoritative ordering; on failure a notice is surfaced and
//! the scope is refetched to resynchronize. No client-side rollback.

use indexmap::IndexSet;

use crate::drag::{MoveIntent, MoveTarget};
use crate::model::protocol::{PTask, TaskKey, TaskKind};
use crate::net::{Client, ServiceError};
use crate::tree::{Place, TaskTree};

pub struct SubGroupView {
    /// Scope of this view; `task_id` is always 0.
    scope: TaskKey,
    pub tree: TaskTree,
    contain_done: bool,
    /// Task ids with an operation in flight. Per-view state: two open views
    /// of different sub-groups must not see each other's markers.
    pending: IndexSet<u32>,
    /// User-visible message from the last failed operation.
    pub notice: Option<String>,
}

impl SubGroupView {
    pub fn new(scope: TaskKey, contain_done: bool) -> SubGroupView {
        SubGroupView {
            scope: scope.scope(),
            tree: TaskTree::new(),
            contain_done,
            pending: IndexSet::new(),
            notice: None,
        }
    }

    pub fn scope(&self) -> TaskKey {
        self.scope
    }

    pub fn contain_done(&self) -> bool {
        self.contain_done
    }

    /// True while a move is in flight; background refresh ticks must not
    /// clobber the cache mid-gesture.
    pub fn should_suppress_reload(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Fetch this sub-group's tasks and rebuild the cache. Orphaned rows are
    /// logged and dropped from the forest, never a hard error.
    pub fn load(&mut self, client: &Client) -> bool {
        match client.get_tasks(self.scope, self.contain_done) {
            Ok(tasks) => {
                let orphans = self.tree.load(tasks);
                if !orphans.is_empty() {
                    let ids: Vec<u32> = orphans.iter().map(|t| t.id).collect();
                    tracing::warn!(?ids, "orphaned tasks dropped from sub-group cache");
                }
                self.notice = None;
                true
            }
            Err(err) => {
                tracing::warn!(%err, "task load failed");
                self.notice = Some(err.to_string());
                false
            }
        }
    }

    /// Toggling done-visibility invalidates the whole cache.
    pub fn set_contain_done(&mut self, client: &Client, contain_done: bool) -> bool {
        if self.contain_done == contain_done {
            return true;
        }
        self.contain_done = contain_done;
        self.tree.clear();
        self.load(client)
    }

    // --- mutations ---

    pub fn create_task(
        &mut self,
        client: &Client,
        parent_task: u32,
        title: &str,
        note: &str,
        after_id: u32,
        started: bool,
        kind: TaskKind,
    ) -> bool {
        match client.create_task(
            self.scope,
            parent_task,
            title,
            note,
            after_id,
            started,
            kind,
        ) {
            Ok(task) => {
                if !self.tree.insert(task) {
                    // Unknown parent or duplicate id: cache is stale.
                    self.load(client);
                }
                true
            }
            Err(err) => self.fail_and_reload(client, err),
        }
    }

    pub fn change_task(&mut self, client: &Client, data: PTask) -> bool {
        match client.change_task(self.scope, data.clone()) {
            Ok(()) => {
                if let Some(node) = self.tree.find_mut(data.id) {
                    node.task = data;
                }
                true
            }
            Err(err) => self.fail_and_reload(client, err),
        }
    }

    pub fn delete_task(&mut self, client: &Client, task_id: u32) -> bool {
        match client.delete_tasks(self.scope, vec![task_id]) {
            Ok(()) => {
                self.tree.remove(task_id);
                true
            }
            Err(err) => self.fail_and_reload(client, err),
        }
    }

    // --- move protocol ---

    /// Issue a move for a completed drag gesture and reconcile the cache.
    ///
    /// A drop that resolves to the task's original position is still sent —
    /// the server treats it idempotently and remains the ordering authority.
    /// The pending marker is cleared whatever the outcome.
    pub fn request_move(&mut self, client: &Client, intent: MoveIntent) -> bool {
        let (target_scope, trg_parent_id, trg_task_id, after) = match intent.target {
            MoveTarget::Sibling { of, after } => {
                let parent_id = self.tree.find_parent(of).map_or(0, |p| p.task.id);
                (self.scope, parent_id, of, after)
            }
            MoveTarget::Child { of } => (self.scope, of, 0, true),
            MoveTarget::Root { sub_group } => (
                TaskKey {
                    sub_group_id: sub_group,
                    ..self.scope
                },
                0,
                0,
                true,
            ),
        };

        self.pending.insert(intent.task_id);
        let result = client.move_tasks(
            self.scope,
            vec![intent.task_id],
            target_scope,
            trg_parent_id,
            trg_task_id,
            after,
        );
        self.pending.swap_remove(&intent.task_id);

        match result {
            Ok(()) => {
                self.patch_after_move(&intent, target_scope);
                // Refetch the affected scope for authoritative indices.
                self.load(client)
            }
            Err(err) => self.fail_and_reload(client, err),
        }
    }

    fn patch_after_move(&mut self, intent: &MoveIntent, target_scope: TaskKey) {
        match intent.target {
            MoveTarget::Sibling { of, after } => {
                let place = if after { Place::After } else { Place::Before };
                self.tree.relocate_near(intent.task_id, of, place);
            }
            MoveTarget::Child { of } => {
                self.tree.relocate(intent.task_id, of);
            }
            MoveTarget::Root { .. } => {
                if target_scope.sub_group_id == self.scope.sub_group_id {
                    self.tree.relocate(intent.task_id, 0);
                } else {
                    // Moved out of this view entirely.
                    self.tree.remove(intent.task_id);
                }
            }
        }
    }

    fn fail_and_reload(&mut self, client: &Client, err: ServiceError) -> bool {
        tracing::warn!(%err, "sub-group mutation failed, reloading");
        let notice = err.to_string();
        self.load(client);
        self.notice = Some(notice);
        false
    }
}
