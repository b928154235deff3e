//! 批注：附着在组件状态上的侧记录
//!
//! 审核采用非破坏式工作流：教师"删除"一个帖子时不删除底层组件状态，
//! 而是创建 action 为 Delete 的 inappropriateFlag 批注；"撤销删除"创建
//! 一条新的 UndoDelete 批注。同一 studentWorkId 可以有多条批注，
//! 以创建时间最新的一条为准。

use serde::{Deserialize, Serialize};

/// 批注类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AnnotationKind {
    InappropriateFlag,
    Score,
    Comment,
}

/// 审核动作
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FlagAction {
    Delete,
    #[serde(rename = "Undo Delete")]
    UndoDelete,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Annotation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub run_id: i64,
    pub period_id: i64,
    pub node_id: String,
    pub component_id: String,
    pub from_workgroup_id: i64,
    pub to_workgroup_id: i64,
    /// 被批注的组件状态 id
    pub student_work_id: String,
    #[serde(rename = "type")]
    pub kind: AnnotationKind,
    #[serde(default)]
    pub data: serde_json::Value,
    /// 创建时间（毫秒时间戳），同一 studentWorkId 下最新者生效
    pub client_save_time: i64,
}

impl Annotation {
    /// 创建一条审核标记批注
    #[allow(clippy::too_many_arguments)]
    pub fn inappropriate_flag(
        run_id: i64,
        period_id: i64,
        node_id: &str,
        component_id: &str,
        from_workgroup_id: i64,
        to_workgroup_id: i64,
        student_work_id: &str,
        action: FlagAction,
    ) -> Self {
        let action_str = match action {
            FlagAction::Delete => "Delete",
            FlagAction::UndoDelete => "Undo Delete",
        };
        Self {
            id: None,
            run_id,
            period_id,
            node_id: node_id.to_string(),
            component_id: component_id.to_string(),
            from_workgroup_id,
            to_workgroup_id,
            student_work_id: student_work_id.to_string(),
            kind: AnnotationKind::InappropriateFlag,
            data: serde_json::json!({ "action": action_str }),
            client_save_time: chrono::Utc::now().timestamp_millis(),
        }
    }

    /// 读取审核动作；非审核批注或数据缺失时返回 None
    pub fn flag_action(&self) -> Option<FlagAction> {
        if self.kind != AnnotationKind::InappropriateFlag {
            return None;
        }
        match self.data.get("action").and_then(|a| a.as_str()) {
            Some("Delete") => Some(FlagAction::Delete),
            Some("Undo Delete") => Some(FlagAction::UndoDelete),
            _ => None,
        }
    }

    /// 帖子是否应当对学生隐藏（最新批注的 action 为 Delete）
    pub fn hides_post(&self) -> bool {
        self.flag_action() == Some(FlagAction::Delete)
    }
}

/// 在批注列表中找某个 studentWorkId 的最新审核标记（创建时间最大者，后出现者优先）
pub fn latest_inappropriate_flag<'a>(
    annotations: &'a [Annotation],
    student_work_id: &str,
) -> Option<&'a Annotation> {
    annotations
        .iter()
        .filter(|a| {
            a.kind == AnnotationKind::InappropriateFlag && a.student_work_id == student_work_id
        })
        .max_by_key(|a| a.client_save_time)
}
