//! Dir/Group navigation cache.
//!
//! The browser holds the `GetDirTree` result and patches it in place after
//! create/rename/delete, so navigation never refetches on success. Failed
//! mutations surface a notice and reload from the server.

use crate::model::addr::{Addr, SegmentKind};
use crate::model::protocol::{PDir, PDirTree, PGroup};
use crate::net::Client;

/// One row in a rendered directory level: child dirs first, then groups.
#[derive(Debug, Clone, Copy)]
pub enum BrowserEntry<'a> {
    Dir(&'a PDirTree),
    Group(&'a PGroup),
}

/// The dir/group prefix of an address, resolved against the cached tree.
#[derive(Debug, Clone, Copy)]
pub struct Resolved<'a> {
    pub dir: &'a PDirTree,
    pub group: Option<&'a PGroup>,
}

#[derive(Default)]
pub struct DirBrowser {
    tree: Option<PDirTree>,
    /// User-visible message from the last failed operation.
    pub notice: Option<String>,
}

impl DirBrowser {
    pub fn new() -> DirBrowser {
        DirBrowser::default()
    }

    pub fn tree(&self) -> Option<&PDirTree> {
        self.tree.as_ref()
    }

    /// Fetch the whole dir tree. On failure the previous cache is kept and a
    /// notice is set, leaving the caller in a retryable "failed to load" state.
    pub fn load(&mut self, client: &Client) -> bool {
        match client.get_dir_tree() {
            Ok(tree) => {
                self.tree = Some(tree);
                self.notice = None;
                true
            }
            Err(err) => {
                tracing::warn!(%err, "dir tree load failed");
                self.notice = Some(err.to_string());
                false
            }
        }
    }

    // --- lookup ---

    pub fn find_dir(&self, dir_id: u32) -> Option<&PDirTree> {
        find_dir_in(self.tree.as_ref()?, dir_id)
    }

    fn find_dir_mut(&mut self, dir_id: u32) -> Option<&mut PDirTree> {
        find_dir_in_mut(self.tree.as_mut()?, dir_id)
    }

    /// Display order for one directory level: child dirs before groups, each
    /// ascending by index (stable).
    pub fn entries(&self, dir_id: u32) -> Vec<BrowserEntry<'_>> {
        let Some(dir) = self.find_dir(dir_id) else {
            return Vec::new();
        };
        let mut dirs: Vec<&PDirTree> = dir.children_dir.iter().collect();
        dirs.sort_by_key(|d| d.root_dir.index);
        let mut groups: Vec<&PGroup> = dir.children_grp.iter().collect();
        groups.sort_by_key(|g| g.index);
        dirs.into_iter()
            .map(BrowserEntry::Dir)
            .chain(groups.into_iter().map(BrowserEntry::Group))
            .collect()
    }

    /// Walk an address's dir/group prefix through the cached tree. Invalid
    /// addresses or unknown ids resolve to `None` — nothing selected.
    /// Sub-group and task segments live below this cache and are skipped.
    pub fn resolve(&self, addr: &Addr) -> Option<Resolved<'_>> {
        if !addr.is_valid() {
            return None;
        }
        let root = self.tree.as_ref()?;
        let mut dir = root;
        let mut first = true;
        let mut group = None;
        for segment in addr.segments() {
            match segment.kind {
                SegmentKind::Dir => {
                    if first && root.root_dir.id == segment.id {
                        // Leading segment may name the root itself.
                    } else {
                        dir = dir.children_dir.iter().find(|d| d.root_dir.id == segment.id)?;
                    }
                }
                SegmentKind::Group => {
                    group = Some(dir.children_grp.iter().find(|g| g.id == segment.id)?);
                }
                SegmentKind::SubGroup | SegmentKind::Task => break,
                SegmentKind::Invalid => return None,
            }
            first = false;
        }
        Some(Resolved { dir, group })
    }

    // --- local patches ---

    /// Attach a freshly created dir under its parent without refetching.
    pub fn insert_dir(&mut self, parent_dir_id: u32, dir: PDir) -> bool {
        let Some(parent) = self.find_dir_mut(parent_dir_id) else {
            return false;
        };
        parent.children_dir.push(PDirTree {
            root_dir: dir,
            children_dir: Vec::new(),
            children_grp: Vec::new(),
        });
        true
    }

    pub fn insert_group(&mut self, parent_dir_id: u32, group: PGroup) -> bool {
        let Some(parent) = self.find_dir_mut(parent_dir_id) else {
            return false;
        };
        parent.children_grp.push(group);
        true
    }

    fn remove_dir_local(&mut self, dir_id: u32) -> bool {
        fn remove_in(dir: &mut PDirTree, id: u32) -> bool {
            if let Some(pos) = dir.children_dir.iter().position(|d| d.root_dir.id == id) {
                dir.children_dir.remove(pos);
                return true;
            }
            dir.children_dir.iter_mut().any(|d| remove_in(d, id))
        }
        self.tree.as_mut().is_some_and(|t| remove_in(t, dir_id))
    }

    fn remove_group_local(&mut self, parent_dir_id: u32, group_id: u32) -> bool {
        let Some(dir) = self.find_dir_mut(parent_dir_id) else {
            return false;
        };
        let before = dir.children_grp.len();
        dir.children_grp.retain(|g| g.id != group_id);
        dir.children_grp.len() != before
    }

    // --- remote operations ---

    pub fn create_dir(
        &mut self,
        client: &Client,
        parent_dir_id: u32,
        after_id: u32,
        title: &str,
        note: &str,
    ) -> bool {
        match client.create_dir(parent_dir_id, after_id, title, note) {
            Ok(ret) => {
                self.insert_dir(
                    parent_dir_id,
                    PDir {
                        id: ret.dir_id,
                        title: title.to_string(),
                        note: note.to_string(),
                        index: ret.index,
                    },
                );
                true
            }
            Err(err) => self.fail_and_reload(client, err),
        }
    }

    pub fn create_group(
        &mut self,
        client: &Client,
        parent_dir_id: u32,
        after_id: u32,
        title: &str,
        note: &str,
    ) -> bool {
        match client.create_group(parent_dir_id, after_id, title, note) {
            Ok(ret) => {
                self.insert_group(
                    parent_dir_id,
                    PGroup {
                        id: ret.group_id,
                        title: title.to_string(),
                        note: note.to_string(),
                        index: ret.index,
                        kind: Default::default(),
                    },
                );
                true
            }
            Err(err) => self.fail_and_reload(client, err),
        }
    }

    /// Optimistic rename: patch the cache first, reconcile on failure.
    pub fn rename_dir(&mut self, client: &Client, dir_id: u32, title: &str, note: &str) -> bool {
        if let Some(dir) = self.find_dir_mut(dir_id) {
            dir.root_dir.title = title.to_string();
            dir.root_dir.note = note.to_string();
        }
        match client.change_dir(dir_id, title, note) {
            Ok(()) => true,
            Err(err) => self.fail_and_reload(client, err),
        }
    }

    pub fn rename_group(
        &mut self,
        client: &Client,
        parent_dir_id: u32,
        group_id: u32,
        title: &str,
        note: &str,
    ) -> bool {
        if let Some(dir) = self.find_dir_mut(parent_dir_id)
            && let Some(group) = dir.children_grp.iter_mut().find(|g| g.id == group_id)
        {
            group.title = title.to_string();
            group.note = note.to_string();
        }
        match client.change_group(parent_dir_id, group_id, title, note) {
            Ok(()) => true,
            Err(err) => self.fail_and_reload(client, err),
        }
    }

    pub fn delete_dir(&mut self, client: &Client, dir_id: u32) -> bool {
        self.remove_dir_local(dir_id);
        match client.delete_dir(dir_id) {
            Ok(()) => true,
            Err(err) => self.fail_and_reload(client, err),
        }
    }

    pub fn delete_group(&mut self, client: &Client, parent_dir_id: u32, group_id: u32) -> bool {
        self.remove_group_local(parent_dir_id, group_id);
        match client.delete_group(parent_dir_id, group_id) {
            Ok(()) => true,
            Err(err) => self.fail_and_reload(client, err),
        }
    }

    fn fail_and_reload(&mut self, client: &Client, err: crate::net::ServiceError) -> bool {
        tracing::warn!(%err, "dir tree mutation failed, reloading");
        let notice = err.to_string();
        self.load(client);
        self.notice = Some(notice);
        false
    }
}

fn find_dir_in(dir: &PDirTree, id: u32) -> Option<&PDirTree> {
    if dir.root_dir.id == id {
        return Some(dir);
    }
    dir.children_dir.iter().find_map(|d| find_dir_in(d, id))
}

fn find_dir_in_mut(dir: &mut PDirTree, id: u32) -> Option<&mut PDirTree> {
    if dir.root_dir.id == id {
        return Some(dir);
    }
    dir.children_dir
        .iter_mut()
        .find_map(|d| find_dir_in_mut(d, id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::addr::Addr;
    use crate::net::backend::{Backend, ServiceError, ServiceResult};
    use pretty_assertions::assert_eq;
    use serde_json::{Value, json};
    use std::cell::RefCell;
    use std::collections::VecDeque;

    struct Script {
        replies: RefCell<VecDeque<ServiceResult<Value>>>,
    }

    impl Script {
        fn new(replies: Vec<ServiceResult<Value>>) -> Script {
            Script {
                replies: RefCell::new(replies.into()),
            }
        }
    }

    impl Backend for Script {
        fn post(&self, _cmd: &str, _body: Value) -> ServiceResult<Value> {
            self.replies
                .borrow_mut()
                .pop_front()
                .unwrap_or(Ok(json!({})))
        }
    }

    fn sample_tree_json() -> Value {
        json!({
            "DirTree": {
                "RootDir": {"ID": 1, "Title": "root", "Note": "", "Index": 0},
                "ChildrenDir": [
                    {
                        "RootDir": {"ID": 2, "Title": "b", "Note": "", "Index": 5},
                        "ChildrenDir": [],
                        "ChildrenGrp": [
                            {"ID": 10, "Title": "g", "Note": "", "Index": 0, "Type": 0},
                        ],
                    },
                    {
                        "RootDir": {"ID": 3, "Title": "a", "Note": "", "Index": 2},
                        "ChildrenDir": [],
                        "ChildrenGrp": [],
                    },
                ],
                "ChildrenGrp": [
                    {"ID": 20, "Title": "top", "Note": "", "Index": 1, "Type": 1},
                ],
            }
        })
    }

    fn loaded_browser(extra_replies: Vec<ServiceResult<Value>>) -> (DirBrowser, Client) {
        let mut replies = vec![Ok(sample_tree_json())];
        replies.extend(extra_replies);
        let client = Client::new(Box::new(Script::new(replies)), "u1");
        let mut browser = DirBrowser::new();
        assert!(browser.load(&client));
        (browser, client)
    }

    #[test]
    fn test_entries_dirs_before_groups_by_index() {
        let (browser, _client) = loaded_browser(vec![]);
        let entries = browser.entries(1);
        let ids: Vec<u32> = entries
            .iter()
            .map(|e| match e {
                BrowserEntry::Dir(d) => d.root_dir.id,
                BrowserEntry::Group(g) => g.id,
            })
            .collect();
        // Dirs sorted ascending by index (3 before 2), then groups.
        assert_eq!(ids, vec![3, 2, 20]);
    }

    #[test]
    fn test_resolve_walks_dir_then_group() {
        let (browser, _client) = loaded_browser(vec![]);
        let addr = Addr::parse_path_string("dir-2/grp-10", "u1");
        let resolved = browser.resolve(&addr).unwrap();
        assert_eq!(resolved.dir.root_dir.id, 2);
        assert_eq!(resolved.group.unwrap().id, 10);
    }

    #[test]
    fn test_resolve_unknown_or_invalid_is_none() {
        let (browser, _client) = loaded_browser(vec![]);
        assert!(browser
            .resolve(&Addr::parse_path_string("dir-99", "u1"))
            .is_none());
        assert!(browser
            .resolve(&Addr::parse_path_string("bogus-1", "u1"))
            .is_none());
    }

    #[test]
    fn test_create_dir_patches_cache_in_place() {
        let (mut browser, client) = loaded_browser(vec![Ok(json!({"DirID": 7, "Index": 9}))]);
        assert!(browser.create_dir(&client, 3, 0, "new", ""));
        let created = browser.find_dir(7).unwrap();
        assert_eq!(created.root_dir.index, 9);
        assert!(browser.notice.is_none());
    }

    #[test]
    fn test_failed_rename_sets_notice_and_reloads() {
        let (mut browser, client) = loaded_browser(vec![
            Err(ServiceError::Rejected {
                cmd: "changeDir".into(),
            }),
            Ok(sample_tree_json()),
        ]);
        assert!(!browser.rename_dir(&client, 3, "renamed", ""));
        assert!(browser.notice.is_some());
        // Reload restored server truth over the optimistic patch.
        assert_eq!(browser.find_dir(3).unwrap().root_dir.title, "a");
    }

    #[test]
    fn test_delete_group_removes_locally() {
        let (mut browser, client) = loaded_browser(vec![Ok(json!({}))]);
        assert!(browser.delete_group(&client, 2, 10));
        assert!(browser.find_dir(2).unwrap().children_grp.is_empty());
    }
}
