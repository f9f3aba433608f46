//! Request/response bodies for every remote operation.
//!
//! Field names mirror the server's wire form exactly; the uniform
//! `{ok, data}` envelope around these lives in [`super::backend`].

use serde::{Deserialize, Serialize};

use crate::model::protocol::{PDirTree, PSubGroup, PTask, TaskKind};

/// Empty acknowledgement body.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct Ack {}

#[derive(Debug, Clone, Serialize)]
pub struct GetDirTreeReq {
    #[serde(rename = "UserID")]
    pub user_id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GetDirTreeRet {
    #[serde(rename = "DirTree")]
    pub dir_tree: PDirTree,
}

#[derive(Debug, Clone, Serialize)]
pub struct GetSubGroupReq {
    #[serde(rename = "UserID")]
    pub user_id: String,
    #[serde(rename = "ParentDirID")]
    pub parent_dir_id: u32,
    #[serde(rename = "GroupID")]
    pub group_id: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GetSubGroupRet {
    #[serde(rename = "SubGroups", default)]
    pub sub_groups: Vec<PSubGroup>,
}

#[derive(Debug, Clone, Serialize)]
pub struct GetTasksReq {
    #[serde(rename = "UserID")]
    pub user_id: String,
    #[serde(rename = "ParentDirID")]
    pub parent_dir_id: u32,
    #[serde(rename = "GroupID")]
    pub group_id: u32,
    #[serde(rename = "SubGroupID")]
    pub sub_group_id: u32,
    #[serde(rename = "ContainDone")]
    pub contain_done: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GetTasksRet {
    /// The server sends null for an empty sub-group.
    #[serde(rename = "Tasks", default)]
    pub tasks: Option<Vec<PTask>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CreateTaskReq {
    #[serde(rename = "UserID")]
    pub user_id: String,
    #[serde(rename = "DirID")]
    pub dir_id: u32,
    #[serde(rename = "GroupID")]
    pub group_id: u32,
    #[serde(rename = "SubGroupID")]
    pub sub_group_id: u32,
    #[serde(rename = "ParentTask")]
    pub parent_task: u32,
    #[serde(rename = "Title")]
    pub title: String,
    #[serde(rename = "Note")]
    pub note: String,
    /// Sibling to insert after; 0 = append last.
    #[serde(rename = "AfterID")]
    pub after_id: u32,
    #[serde(rename = "Started")]
    pub started: bool,
    #[serde(rename = "TaskType")]
    pub kind: TaskKind,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateTaskRet {
    #[serde(rename = "Task")]
    pub task: PTask,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChangeTaskReq {
    #[serde(rename = "UserID")]
    pub user_id: String,
    #[serde(rename = "DirID")]
    pub dir_id: u32,
    #[serde(rename = "GroupID")]
    pub group_id: u32,
    #[serde(rename = "SubGroupID")]
    pub sub_group_id: u32,
    #[serde(rename = "Data")]
    pub data: PTask,
}

#[derive(Debug, Clone, Serialize)]
pub struct DelTaskReq {
    #[serde(rename = "UserID")]
    pub user_id: String,
    #[serde(rename = "DirID")]
    pub dir_id: u32,
    #[serde(rename = "GroupID")]
    pub group_id: u32,
    #[serde(rename = "SubGroupID")]
    pub sub_group_id: u32,
    #[serde(rename = "TaskID")]
    pub task_ids: Vec<u32>,
}

/// The move protocol request: source scope, moved subtree roots, and a
/// target position expressed as parent + optional sibling anchor.
///
/// `trg_task_id == 0` means "no sibling anchor": append at the end (or the
/// front, when `after` is false) of the target parent's children.
#[derive(Debug, Clone, Serialize)]
pub struct TaskMoveReq {
    #[serde(rename = "UserID")]
    pub user_id: String,
    #[serde(rename = "DirID")]
    pub dir_id: u32,
    #[serde(rename = "GroupID")]
    pub group_id: u32,
    #[serde(rename = "SubGroupID")]
    pub sub_group_id: u32,
    #[serde(rename = "TaskIDs")]
    pub task_ids: Vec<u32>,
    #[serde(rename = "TrgDir")]
    pub trg_dir: u32,
    #[serde(rename = "TrgGroup")]
    pub trg_group: u32,
    #[serde(rename = "TrgSubGroup")]
    pub trg_sub_group: u32,
    #[serde(rename = "TrgParentID")]
    pub trg_parent_id: u32,
    #[serde(rename = "TrgTaskID")]
    pub trg_task_id: u32,
    #[serde(rename = "After")]
    pub after: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct CreateSubGroupReq {
    #[serde(rename = "UserID")]
    pub user_id: String,
    #[serde(rename = "ParentDirID")]
    pub parent_dir_id: u32,
    #[serde(rename = "GroupID")]
    pub group_id: u32,
    #[serde(rename = "Title")]
    pub title: String,
    #[serde(rename = "Note")]
    pub note: String,
    #[serde(rename = "AfterID")]
    pub after_id: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateSubGroupRet {
    #[serde(rename = "SubGroupID")]
    pub sub_group_id: u32,
    #[serde(rename = "Index")]
    pub index: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChangeSubGroupReq {
    #[serde(rename = "UserID")]
    pub user_id: String,
    #[serde(rename = "ParentDirID")]
    pub parent_dir_id: u32,
    #[serde(rename = "GroupID")]
    pub group_id: u32,
    #[serde(rename = "Data")]
    pub data: PSubGroup,
}

#[derive(Debug, Clone, Serialize)]
pub struct DelSubGroupReq {
    #[serde(rename = "UserID")]
    pub user_id: String,
    #[serde(rename = "ParentDirID")]
    pub parent_dir_id: u32,
    #[serde(rename = "GroupID")]
    pub group_id: u32,
    #[serde(rename = "SubGroupID")]
    pub sub_group_id: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct CreateDirReq {
    #[serde(rename = "UserID")]
    pub user_id: String,
    #[serde(rename = "ParentDirID")]
    pub parent_dir_id: u32,
    #[serde(rename = "AfterID")]
    pub after_id: u32,
    #[serde(rename = "Title")]
    pub title: String,
    #[serde(rename = "Note")]
    pub note: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateDirRet {
    #[serde(rename = "DirID")]
    pub dir_id: u32,
    #[serde(rename = "Index")]
    pub index: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct CreateGroupReq {
    #[serde(rename = "UserID")]
    pub user_id: String,
    #[serde(rename = "ParentDir")]
    pub parent_dir: u32,
    #[serde(rename = "AfterID")]
    pub after_id: u32,
    #[serde(rename = "Title")]
    pub title: String,
    #[serde(rename = "Note")]
    pub note: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateGroupRet {
    #[serde(rename = "GroupID")]
    pub group_id: u32,
    #[serde(rename = "Index")]
    pub index: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChangeDirReq {
    #[serde(rename = "UserID")]
    pub user_id: String,
    #[serde(rename = "DirID")]
    pub dir_id: u32,
    #[serde(rename = "Title")]
    pub title: String,
    #[serde(rename = "Note")]
    pub note: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChangeGroupReq {
    #[serde(rename = "UserID")]
    pub user_id: String,
    #[serde(rename = "ParentDirID")]
    pub parent_dir_id: u32,
    #[serde(rename = "GroupID")]
    pub group_id: u32,
    #[serde(rename = "Title")]
    pub title: String,
    #[serde(rename = "Note")]
    pub note: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct DelDirReq {
    #[serde(rename = "UserID")]
    pub user_id: String,
    #[serde(rename = "DirID")]
    pub dir_id: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct DelGroupReq {
    #[serde(rename = "UserID")]
    pub user_id: String,
    #[serde(rename = "ParentDir")]
    pub parent_dir: u32,
    #[serde(rename = "GroupID")]
    pub group_id: u32,
}
