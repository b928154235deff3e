//! 组件能力契约
//!
//! 取代原系统的控制器深继承：每种组件类型实现同一个状态上报能力接口，
//! 由节点编排器按 id 注册并调用。

use async_trait::async_trait;

use crate::model::{Annotation, ComponentContent, ComponentState, ConnectedComponentRef};

/// 组件向所属节点暴露的能力
#[async_trait]
pub trait ComponentHandle: Send + Sync {
    /// 按需上报组件状态；None 表示当前没有可保存的内容（合法的 no-op）
    async fn report_state(&self, is_submit: bool) -> Option<ComponentState>;

    /// 监听的来源组件数据发生了本地变化
    ///
    /// 纯本地同步扇出，不等待服务端确认；保存失败时监听方可能观察到
    /// 最终被丢弃的数据，这是为响应性接受的权衡。
    async fn on_connected_component_changed(
        &self,
        _source_content: &ComponentContent,
        _params: &ConnectedComponentRef,
        _new_state: &ComponentState,
    ) {
    }

    /// 本组件的作业已被服务端确认保存
    async fn on_work_saved(&self, _state: &ComponentState) {}

    /// 节点锁定（lockAfterSubmit）时禁用组件
    async fn set_disabled(&self, _disabled: bool) {}

    /// 取走组件暂存的未保存批注（随保存批次一起持久化）
    async fn take_unsaved_annotation(&self) -> Option<Annotation> {
        None
    }
}

/// 节点过渡逻辑求值器
///
/// 过渡逻辑的具体求值属于导航子系统，这里只在节点内容声明的触发点调用。
#[async_trait]
pub trait TransitionEvaluator: Send + Sync {
    async fn evaluate(&self);
}
