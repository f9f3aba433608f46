use serde::{Deserialize, Serialize};

/// A directory record in the navigation hierarchy.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PDir {
    #[serde(rename = "ID")]
    pub id: u32,
    pub title: String,
    pub note: String,
    pub index: i64,
}

/// What a group holds: plain tasks, or media-library items.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "u8", into = "u8")]
pub enum GroupKind {
    #[default]
    Normal,
    Library,
}

impl From<u8> for GroupKind {
    fn from(v: u8) -> GroupKind {
        match v {
            1 => GroupKind::Library,
            _ => GroupKind::Normal,
        }
    }
}

impl From<GroupKind> for u8 {
    fn from(v: GroupKind) -> u8 {
        match v {
            GroupKind::Normal => 0,
            GroupKind::Library => 1,
        }
    }
}

/// A task-group record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PGroup {
    #[serde(rename = "ID")]
    pub id: u32,
    pub title: String,
    pub note: String,
    pub index: i64,
    #[serde(rename = "Type", default)]
    pub kind: GroupKind,
}

/// The nested Dir/Group tree returned by `GetDirTree`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PDirTree {
    pub root_dir: PDir,
    #[serde(default)]
    pub children_dir: Vec<PDirTree>,
    #[serde(default)]
    pub children_grp: Vec<PGroup>,
}

/// A sub-group: the bucket at which task lists are fetched and cached.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PSubGroup {
    #[serde(rename = "ID")]
    pub id: u32,
    pub title: String,
    pub note: String,
    pub index: i64,
}

/// Whether a task is a one-shot todo or an ongoing activity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "u8", into = "u8")]
pub enum TaskKind {
    #[default]
    Todo,
    Doing,
}

impl From<u8> for TaskKind {
    fn from(v: u8) -> TaskKind {
        match v {
            1 => TaskKind::Doing,
            _ => TaskKind::Todo,
        }
    }
}

impl From<TaskKind> for u8 {
    fn from(v: TaskKind) -> u8 {
        match v {
            TaskKind::Todo => 0,
            TaskKind::Doing => 1,
        }
    }
}

/// One task record as the server returns it.
///
/// `index` is the server-assigned sibling ordering key; only relative order
/// matters, values need not be contiguous. `parent_id == 0` means the task
/// sits directly under its sub-group.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PTask {
    #[serde(rename = "ID")]
    pub id: u32,
    pub title: String,
    pub note: String,
    pub index: i64,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    pub done: bool,
    #[serde(rename = "ParentID", default)]
    pub parent_id: u32,
    #[serde(rename = "TaskType", default)]
    pub kind: TaskKind,
    #[serde(default)]
    pub started: bool,
    #[serde(default)]
    pub begin_time: String,
    #[serde(default)]
    pub end_time: String,
    #[serde(default)]
    pub wait4: String,
}

impl PTask {
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags
            .as_ref()
            .is_some_and(|tags| tags.iter().any(|t| t == tag))
    }
}

/// Fully-qualified task location used by remote calls.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskKey {
    #[serde(rename = "DirID")]
    pub dir_id: u32,
    #[serde(rename = "GroupID")]
    pub group_id: u32,
    #[serde(rename = "SubGroupID")]
    pub sub_group_id: u32,
    #[serde(rename = "TaskID")]
    pub task_id: u32,
}

impl TaskKey {
    /// The enclosing sub-group scope (task component zeroed).
    pub fn scope(&self) -> TaskKey {
        TaskKey {
            task_id: 0,
            ..*self
        }
    }
}
