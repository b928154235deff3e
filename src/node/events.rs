//! 节点事件通道的封闭消息集
//!
//! 组件与 UI 通过显式的类型化消息与节点编排器通信，不使用全局广播。

use crate::model::ComponentState;

/// 保存触发范围
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveTrigger {
    /// 整节点：所有组件统一打 isAutoSave / isSubmit 标记
    WholeNode,
    /// 单组件：只有该组件被收集与打标
    SingleComponent(String),
}

/// 发往节点编排器的事件
#[derive(Debug, Clone)]
pub enum NodeEvent {
    /// 组件请求保存学生数据
    SaveRequested { trigger: SaveTrigger },
    /// 组件请求提交学生数据
    SubmitRequested { trigger: SaveTrigger },
    /// 组件的学生数据发生本地变化（触发连接组件扇出，不触发保存）
    StudentDataChanged {
        component_id: String,
        component_state: ComponentState,
    },
    /// 组件未保存状态变化
    DirtyChanged { component_id: String, is_dirty: bool },
    /// 组件未提交状态变化
    SubmitDirtyChanged { component_id: String, is_dirty: bool },
    /// 自动保存定时器触发
    AutosaveTick,
    /// 学生离开节点
    ExitRequested,
}
