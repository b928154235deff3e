//! 通知：回复讨论帖时发给原帖作者与此前回复者的消息

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(rename = "type")]
    pub kind: String,
    pub node_id: String,
    pub component_id: String,
    pub from_workgroup_id: i64,
    pub to_workgroup_id: i64,
    pub message: String,
    pub time_generated: i64,
}

impl Notification {
    /// 讨论区回复通知
    pub fn discussion_reply(
        node_id: &str,
        component_id: &str,
        from_workgroup_id: i64,
        to_workgroup_id: i64,
        message: &str,
    ) -> Self {
        Self {
            id: None,
            kind: "DiscussionReply".to_string(),
            node_id: node_id.to_string(),
            component_id: component_id.to_string(),
            from_workgroup_id,
            to_workgroup_id,
            message: message.to_string(),
            time_generated: chrono::Utc::now().timestamp_millis(),
        }
    }
}
