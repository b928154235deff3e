//! 组件状态：一次学生作业的记录单元
//!
//! 生命周期：组件在保存/提交时创建 → 进入内存工作集 → 发送给持久化协作方 →
//! 确认后成为权威历史。提交后不再修改（审核标记以批注形式叠加，见 annotation 模块）。

use serde::{Deserialize, Serialize};

/// 学生数据载荷
///
/// 讨论组件使用 response / attachments / component_state_id_replying_to；
/// 其他组件类型的载荷放在 extra 中原样携带。
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentData {
    #[serde(default)]
    pub response: String,
    #[serde(default)]
    pub attachments: Vec<serde_json::Value>,
    /// 被回复的组件状态 id；一旦设置不可变，缺失表示顶层帖
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub component_state_id_replying_to: Option<String>,
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub extra: serde_json::Value,
}

/// 组件状态
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentState {
    /// 由服务端分配；仅在预览/创作模式下由客户端生成
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub node_id: String,
    pub component_id: String,
    pub component_type: String,
    #[serde(default)]
    pub run_id: i64,
    #[serde(default)]
    pub period_id: i64,
    #[serde(default)]
    pub workgroup_id: i64,
    /// 客户端保存时间（毫秒时间戳）
    pub client_save_time: i64,
    #[serde(default)]
    pub is_auto_save: bool,
    #[serde(default)]
    pub is_submit: bool,
    pub student_data: StudentData,
}

impl ComponentState {
    pub fn new(node_id: &str, component_id: &str, component_type: &str) -> Self {
        Self {
            id: None,
            node_id: node_id.to_string(),
            component_id: component_id.to_string(),
            component_type: component_type.to_string(),
            run_id: 0,
            period_id: 0,
            workgroup_id: 0,
            client_save_time: chrono::Utc::now().timestamp_millis(),
            is_auto_save: false,
            is_submit: false,
            student_data: StudentData::default(),
        }
    }

    /// 客户端生成 id（预览/创作模式，环境无法权威分配时）
    pub fn with_client_id(mut self) -> Self {
        self.id = Some(format!("cs_{}", uuid::Uuid::new_v4()));
        self
    }

    pub fn reply_target(&self) -> Option<&str> {
        self.student_data
            .component_state_id_replying_to
            .as_deref()
    }

    pub fn is_reply(&self) -> bool {
        self.reply_target().is_some()
    }
}

/// 学生行为审计事件（nodeEntered / nodeExited 等）
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentWorkEvent {
    pub node_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub component_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub component_type: Option<String>,
    pub category: String,
    pub event: String,
    #[serde(default)]
    pub data: serde_json::Value,
    pub client_save_time: i64,
}

impl StudentWorkEvent {
    /// 导航类事件（进入/离开节点）
    pub fn navigation(node_id: &str, event: &str) -> Self {
        Self {
            node_id: node_id.to_string(),
            component_id: None,
            component_type: None,
            category: "Navigation".to_string(),
            event: event.to_string(),
            data: serde_json::json!({ "nodeId": node_id }),
            client_save_time: chrono::Utc::now().timestamp_millis(),
        }
    }
}
