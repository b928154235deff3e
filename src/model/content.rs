//! 节点/组件内容声明
//!
//! 节点是探究活动中的一页，承载若干组件；组件可以声明自己监听另一个组件的输出
//! （connected component），用于本地扇出与讨论区的同学作业合并。

use serde::{Deserialize, Serialize};

/// 连接类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ConnectedComponentKind {
    /// 展示来源组件的作业，查看者自身不可发帖
    ShowWork,
    /// 导入来源组件的作业，同时保留自己的响应历史
    ImportWork,
    Other,
}

/// 连接声明：{nodeId, componentId, type}
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectedComponentRef {
    pub node_id: String,
    pub component_id: String,
    #[serde(rename = "type")]
    pub kind: ConnectedComponentKind,
}

/// 组件坐标（跨节点查询用）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentRef {
    pub node_id: String,
    pub component_id: String,
}

impl From<&ConnectedComponentRef> for ComponentRef {
    fn from(r: &ConnectedComponentRef) -> Self {
        Self {
            node_id: r.node_id.clone(),
            component_id: r.component_id.clone(),
        }
    }
}

/// 组件内容（创作时声明的静态部分）
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentContent {
    pub id: String,
    #[serde(rename = "type")]
    pub component_type: String,
    #[serde(default)]
    pub connected_components: Vec<ConnectedComponentRef>,
    /// 讨论组件：是否在查看者发帖前隐藏同学响应
    #[serde(default)]
    pub gate_classmate_responses: bool,
}

impl ComponentContent {
    pub fn new(id: &str, component_type: &str) -> Self {
        Self {
            id: id.to_string(),
            component_type: component_type.to_string(),
            connected_components: Vec::new(),
            gate_classmate_responses: false,
        }
    }
}

/// 过渡逻辑触发点
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TransitionTrigger {
    EnterNode,
    ExitNode,
    StudentDataChanged,
}

/// 节点声明的条件过渡逻辑
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransitionLogic {
    #[serde(default)]
    pub evaluate_on: Vec<TransitionTrigger>,
}

impl TransitionLogic {
    pub fn evaluates_on(&self, trigger: TransitionTrigger) -> bool {
        self.evaluate_on.contains(&trigger)
    }
}

/// 节点内容
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeContent {
    pub id: String,
    #[serde(default)]
    pub components: Vec<ComponentContent>,
    /// 提交后锁定整个节点
    #[serde(default)]
    pub lock_after_submit: bool,
    #[serde(default)]
    pub show_save_button: bool,
    #[serde(default)]
    pub show_submit_button: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transition_logic: Option<TransitionLogic>,
}

impl NodeContent {
    pub fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            components: Vec::new(),
            lock_after_submit: false,
            show_save_button: true,
            show_submit_button: true,
            transition_logic: None,
        }
    }

    pub fn component(&self, component_id: &str) -> Option<&ComponentContent> {
        self.components.iter().find(|c| c.id == component_id)
    }

    pub fn contains_component(&self, component_id: &str) -> bool {
        self.component(component_id).is_some()
    }

    pub fn transition_declared_on(&self, trigger: TransitionTrigger) -> bool {
        self.transition_logic
            .as_ref()
            .map(|t| t.evaluates_on(trigger))
            .unwrap_or(false)
    }
}
