//! 共享数据模型
//!
//! 组件状态（一次学生作业快照）、节点/组件内容声明、批注（审核标记）、通知。

pub mod annotation;
pub mod component_state;
pub mod content;
pub mod notification;

pub use annotation::{latest_inappropriate_flag, Annotation, AnnotationKind, FlagAction};
pub use component_state::{ComponentState, StudentData, StudentWorkEvent};
pub use content::{ComponentContent, ComponentRef, ConnectedComponentKind, ConnectedComponentRef, NodeContent, TransitionLogic, TransitionTrigger};
pub use notification::Notification;
