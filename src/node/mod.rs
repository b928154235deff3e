//! 节点级保存/提交编排
//!
//! - **component**: 组件能力契约（状态上报、连接数据变更、保存确认）
//! - **connected**: 连接组件模式判定（showWork / importWork）
//! - **dirty**: 脏集合（未保存 / 未提交）
//! - **events**: 节点事件通道的封闭消息集
//! - **autosave**: 自动保存调度器（显式启停，幂等）
//! - **orchestrator**: 主控循环，聚合组件状态并批量保存

pub mod autosave;
pub mod component;
pub mod connected;
pub mod dirty;
pub mod events;
pub mod orchestrator;

pub use autosave::AutosaveScheduler;
pub use component::{ComponentHandle, TransitionEvaluator};
pub use connected::{has_connected_components, is_import_work_mode, is_show_work_mode};
pub use dirty::DirtySet;
pub use events::{NodeEvent, SaveTrigger};
pub use orchestrator::{NodeOrchestrator, SaveMessage};
