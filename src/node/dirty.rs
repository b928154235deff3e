//! 脏集合：未保存与未提交的组件 id
//!
//! 两个集合互相独立：dirty 表示有未保存的本地修改，submit_dirty 表示
//! 自上次提交以来有变化。重复插入与移除缺席 id 都是 no-op。

/// 节点持有的脏组件 id 集合
#[derive(Debug, Default)]
pub struct DirtySet {
    dirty: Vec<String>,
    submit_dirty: Vec<String>,
}

impl DirtySet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mark_dirty(&mut self, component_id: &str) {
        if !self.dirty.iter().any(|id| id == component_id) {
            self.dirty.push(component_id.to_string());
        }
    }

    pub fn clear_dirty(&mut self, component_id: &str) {
        self.dirty.retain(|id| id != component_id);
    }

    pub fn mark_submit_dirty(&mut self, component_id: &str) {
        if !self.submit_dirty.iter().any(|id| id == component_id) {
            self.submit_dirty.push(component_id.to_string());
        }
    }

    pub fn clear_submit_dirty(&mut self, component_id: &str) {
        self.submit_dirty.retain(|id| id != component_id);
    }

    pub fn is_dirty(&self, component_id: &str) -> bool {
        self.dirty.iter().any(|id| id == component_id)
    }

    pub fn is_submit_dirty(&self, component_id: &str) -> bool {
        self.submit_dirty.iter().any(|id| id == component_id)
    }

    pub fn any_dirty(&self) -> bool {
        !self.dirty.is_empty()
    }
}
