//! 协作方契约抽象层
//!
//! 定义持久化、批注、通知、身份/名册四类协作方的统一接口，
//! 并为每类提供内存实现（测试与演示用）。

pub mod annotation;
pub mod identity;
pub mod notification;
pub mod student_work;

pub use annotation::{AnnotationStore, InMemoryAnnotationStore};
pub use identity::{display_name, InMemoryRoster, Mode, Roster};
pub use notification::{InMemoryNotificationStore, NotificationStore};
pub use student_work::{
    ClassmateResponses, InMemoryStudentWorkStore, SaveBatch, SaveResponse, StudentWorkStore,
};
