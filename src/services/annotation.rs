//! 批注持久化抽象层

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::SyncError;
use crate::model::annotation::latest_inappropriate_flag;
use crate::model::{Annotation, AnnotationKind};

/// 批注存储接口
#[async_trait]
pub trait AnnotationStore: Send + Sync {
    /// 保存一条批注，返回服务端确认后的批注（含 id）
    async fn save(&self, annotation: Annotation) -> Result<Annotation, SyncError>;

    /// 某个组件状态的最新指定类型批注
    async fn latest_by_student_work_id_and_kind(
        &self,
        student_work_id: &str,
        kind: AnnotationKind,
    ) -> Option<Annotation>;
}

/// 内存版批注存储
#[derive(Default)]
pub struct InMemoryAnnotationStore {
    annotations: RwLock<Vec<Annotation>>,
}

impl InMemoryAnnotationStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn count(&self) -> usize {
        self.annotations.read().await.len()
    }

    pub async fn all(&self) -> Vec<Annotation> {
        self.annotations.read().await.clone()
    }
}

#[async_trait]
impl AnnotationStore for InMemoryAnnotationStore {
    async fn save(&self, mut annotation: Annotation) -> Result<Annotation, SyncError> {
        let mut guard = self.annotations.write().await;
        if annotation.id.is_none() {
            annotation.id = Some(format!("an_{}", guard.len() + 1));
        }
        guard.push(annotation.clone());
        Ok(annotation)
    }

    async fn latest_by_student_work_id_and_kind(
        &self,
        student_work_id: &str,
        kind: AnnotationKind,
    ) -> Option<Annotation> {
        let guard = self.annotations.read().await;
        match kind {
            AnnotationKind::InappropriateFlag => {
                latest_inappropriate_flag(&guard, student_work_id).cloned()
            }
            _ => guard
                .iter()
                .filter(|a| a.kind == kind && a.student_work_id == student_work_id)
                .max_by_key(|a| a.client_save_time)
                .cloned(),
        }
    }
}
