use serde::Serialize;
use serde::de::DeserializeOwned;

use super::backend::{Backend, ServiceError, ServiceResult};
use super::messages::*;
use crate::model::protocol::{PDirTree, PSubGroup, PTask, TaskKey, TaskKind};

/// Typed facade over a [`Backend`]: one method per remote operation.
/// Stamps the configured user id onto every request.
pub struct Client {
    backend: Box<dyn Backend>,
    user_id: String,
}

impl Client {
    pub fn new(backend: Box<dyn Backend>, user_id: impl Into<String>) -> Client {
        Client {
            backend,
            user_id: user_id.into(),
        }
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    fn call<Req: Serialize, Ret: DeserializeOwned>(
        &self,
        cmd: &str,
        req: &Req,
    ) -> ServiceResult<Ret> {
        let body = serde_json::to_value(req).map_err(|e| ServiceError::Malformed {
            cmd: cmd.to_string(),
            detail: e.to_string(),
        })?;
        let mut data = self.backend.post(cmd, body)?;
        // Ack-style responses may omit `data` entirely.
        if data.is_null() {
            data = serde_json::Value::Object(Default::default());
        }
        serde_json::from_value(data).map_err(|e| ServiceError::Malformed {
            cmd: cmd.to_string(),
            detail: e.to_string(),
        })
    }

    // --- reads ---

    pub fn get_dir_tree(&self) -> ServiceResult<PDirTree> {
        let ret: GetDirTreeRet = self.call(
            "getDirTree",
            &GetDirTreeReq {
                user_id: self.user_id.clone(),
            },
        )?;
        Ok(ret.dir_tree)
    }

    pub fn get_sub_groups(&self, dir_id: u32, group_id: u32) -> ServiceResult<Vec<PSubGroup>> {
        let ret: GetSubGroupRet = self.call(
            "getSubGroup",
            &GetSubGroupReq {
                user_id: self.user_id.clone(),
                parent_dir_id: dir_id,
                group_id,
            },
        )?;
        Ok(ret.sub_groups)
    }

    pub fn get_tasks(&self, scope: TaskKey, contain_done: bool) -> ServiceResult<Vec<PTask>> {
        let ret: GetTasksRet = self.call(
            "getTasks",
            &GetTasksReq {
                user_id: self.user_id.clone(),
                parent_dir_id: scope.dir_id,
                group_id: scope.group_id,
                sub_group_id: scope.sub_group_id,
                contain_done,
            },
        )?;
        Ok(ret.tasks.unwrap_or_default())
    }

    // --- task mutations ---

    #[allow(clippy::too_many_arguments)]
    pub fn create_task(
        &self,
        scope: TaskKey,
        parent_task: u32,
        title: &str,
        note: &str,
        after_id: u32,
        started: bool,
        kind: TaskKind,
    ) -> ServiceResult<PTask> {
        let ret: CreateTaskRet = self.call(
            "createTask",
            &CreateTaskReq {
                user_id: self.user_id.clone(),
                dir_id: scope.dir_id,
                group_id: scope.group_id,
                sub_group_id: scope.sub_group_id,
                parent_task,
                title: title.to_string(),
                note: note.to_string(),
                after_id,
                started,
                kind,
            },
        )?;
        Ok(ret.task)
    }

    pub fn change_task(&self, scope: TaskKey, data: PTask) -> ServiceResult<()> {
        let _: Ack = self.call(
            "changeTask",
            &ChangeTaskReq {
                user_id: self.user_id.clone(),
                dir_id: scope.dir_id,
                group_id: scope.group_id,
                sub_group_id: scope.sub_group_id,
                data,
            },
        )?;
        Ok(())
    }

    pub fn delete_tasks(&self, scope: TaskKey, task_ids: Vec<u32>) -> ServiceResult<()> {
        let _: Ack = self.call(
            "delTask",
            &DelTaskReq {
                user_id: self.user_id.clone(),
                dir_id: scope.dir_id,
                group_id: scope.group_id,
                sub_group_id: scope.sub_group_id,
                task_ids,
            },
        )?;
        Ok(())
    }

    /// The move protocol. `source` scopes where the tasks live now; `target`
    /// plus the parent/anchor pair say where they land.
    #[allow(clippy::too_many_arguments)]
    pub fn move_tasks(
        &self,
        source: TaskKey,
        task_ids: Vec<u32>,
        target: TaskKey,
        trg_parent_id: u32,
        trg_task_id: u32,
        after: bool,
    ) -> ServiceResult<()> {
        let _: Ack = self.call(
            "taskMove",
            &TaskMoveReq {
                user_id: self.user_id.clone(),
                dir_id: source.dir_id,
                group_id: source.group_id,
                sub_group_id: source.sub_group_id,
                task_ids,
                trg_dir: target.dir_id,
                trg_group: target.group_id,
                trg_sub_group: target.sub_group_id,
                trg_parent_id,
                trg_task_id,
                after,
            },
        )?;
        Ok(())
    }

    // --- sub-group mutations ---

    pub fn create_sub_group(
        &self,
        dir_id: u32,
        group_id: u32,
        title: &str,
        note: &str,
        after_id: u32,
    ) -> ServiceResult<CreateSubGroupRet> {
        self.call(
            "createSubGroup",
            &CreateSubGroupReq {
                user_id: self.user_id.clone(),
                parent_dir_id: dir_id,
                group_id,
                title: title.to_string(),
                note: note.to_string(),
                after_id,
            },
        )
    }

    pub fn change_sub_group(
        &self,
        dir_id: u32,
        group_id: u32,
        data: PSubGroup,
    ) -> ServiceResult<()> {
        let _: Ack = self.call(
            "changeSubGroup",
            &ChangeSubGroupReq {
                user_id: self.user_id.clone(),
                parent_dir_id: dir_id,
                group_id,
                data,
            },
        )?;
        Ok(())
    }

    pub fn delete_sub_group(
        &self,
        dir_id: u32,
        group_id: u32,
        sub_group_id: u32,
    ) -> ServiceResult<()> {
        let _: Ack = self.call(
            "delSubGroup",
            &DelSubGroupReq {
                user_id: self.user_id.clone(),
                parent_dir_id: dir_id,
                group_id,
                sub_group_id,
            },
        )?;
        Ok(())
    }

    // --- dir/group mutations ---

    pub fn create_dir(
        &self,
        parent_dir_id: u32,
        after_id: u32,
        title: &str,
        note: &str,
    ) -> ServiceResult<CreateDirRet> {
        self.call(
            "createDir",
            &CreateDirReq {
                user_id: self.user_id.clone(),
                parent_dir_id,
                after_id,
                title: title.to_string(),
                note: note.to_string(),
            },
        )
    }

    pub fn create_group(
        &self,
        parent_dir: u32,
        after_id: u32,
        title: &str,
        note: &str,
    ) -> ServiceResult<CreateGroupRet> {
        self.call(
            "createGroup",
            &CreateGroupReq {
                user_id: self.user_id.clone(),
                parent_dir,
                after_id,
                title: title.to_string(),
                note: note.to_string(),
            },
        )
    }

    pub fn change_dir(&self, dir_id: u32, title: &str, note: &str) -> ServiceResult<()> {
        let _: Ack = self.call(
            "changeDir",
            &ChangeDirReq {
                user_id: self.user_id.clone(),
                dir_id,
                title: title.to_string(),
                note: note.to_string(),
            },
        )?;
        Ok(())
    }

    pub fn change_group(
        &self,
        parent_dir_id: u32,
        group_id: u32,
        title: &str,
        note: &str,
    ) -> ServiceResult<()> {
        let _: Ack = self.call(
            "changeGroup",
            &ChangeGroupReq {
                user_id: self.user_id.clone(),
                parent_dir_id,
                group_id,
                title: title.to_string(),
                note: note.to_string(),
            },
        )?;
        Ok(())
    }

    pub fn delete_dir(&self, dir_id: u32) -> ServiceResult<()> {
        let _: Ack = self.call(
            "delDir",
            &DelDirReq {
                user_id: self.user_id.clone(),
                dir_id,
            },
        )?;
        Ok(())
    }

    pub fn delete_group(&self, parent_dir: u32, group_id: u32) -> ServiceResult<()> {
        let _: Ack = self.call(
            "delGroup",
            &DelGroupReq {
                user_id: self.user_id.clone(),
                parent_dir,
                group_id,
            },
        )?;
        Ok(())
    }
}
