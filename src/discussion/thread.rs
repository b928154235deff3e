//! 讨论串索引
//!
//! 按提交顺序维护帖子与回复的两级结构。删除是非破坏性的：
//! 帖子本体永不移除，只挂最近一条 inappropriateFlag 批注，
//! 渲染时按读者身份决定是否隐藏。

use std::collections::HashMap;

use crate::model::{Annotation, ComponentState};

/// 一条帖子及其展示所需的伴随数据
#[derive(Debug, Clone)]
pub struct ThreadedPost {
    pub state: ComponentState,
    /// 作者显示名（成员名逗号拼接，缺失时退化为 "Student {id}"）
    pub usernames: String,
    /// 针对该帖的最近一条 inappropriateFlag 批注
    pub latest_flag: Option<Annotation>,
    /// 回复的状态 id，按到达顺序
    pub replies: Vec<String>,
}

impl ThreadedPost {
    pub fn new(state: ComponentState, usernames: String, latest_flag: Option<Annotation>) -> Self {
        Self {
            state,
            usernames,
            latest_flag,
            replies: Vec::new(),
        }
    }

    /// 对学生读者隐藏（最近批注为 Delete）
    pub fn is_hidden(&self) -> bool {
        self.latest_flag
            .as_ref()
            .map(|a| a.hides_post())
            .unwrap_or(false)
    }
}

/// id -> 帖子的索引，另维护顶层帖与全量的插入顺序
#[derive(Debug, Default)]
pub struct ThreadIndex {
    posts: HashMap<String, ThreadedPost>,
    order: Vec<String>,
    top_level: Vec<String>,
}

impl ThreadIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.posts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.posts.is_empty()
    }

    pub fn contains(&self, state_id: &str) -> bool {
        self.posts.contains_key(state_id)
    }

    pub fn get(&self, state_id: &str) -> Option<&ThreadedPost> {
        self.posts.get(state_id)
    }

    /// 全量重建：先登记所有帖子，再接线回复。
    /// 两遍处理保证回复先于父帖到达时也能接上。
    pub fn rebuild(&mut self, posts: Vec<ThreadedPost>) {
        self.posts.clear();
        self.order.clear();
        self.top_level.clear();

        for post in posts {
            let Some(id) = post.state.id.clone() else {
                continue;
            };
            if self.posts.contains_key(&id) {
                continue;
            }
            self.order.push(id.clone());
            self.posts.insert(id, post);
        }

        for id in self.order.clone() {
            let target = self.posts[&id].state.reply_target().map(str::to_string);
            match target {
                Some(parent_id) => {
                    if let Some(parent) = self.posts.get_mut(&parent_id) {
                        parent.replies.push(id);
                    }
                    // 父帖不在本批次中：保留帖子本体，不进任何串
                }
                None => self.top_level.push(id),
            }
        }
    }

    /// 增量登记一条新帖。已登记的 id 是 no-op。
    pub fn insert(&mut self, post: ThreadedPost) {
        let Some(id) = post.state.id.clone() else {
            return;
        };
        if self.posts.contains_key(&id) {
            return;
        }
        let target = post.state.reply_target().map(str::to_string);
        self.order.push(id.clone());
        self.posts.insert(id.clone(), post);

        match target {
            Some(parent_id) => {
                if let Some(parent) = self.posts.get_mut(&parent_id) {
                    parent.replies.push(id);
                }
            }
            None => self.top_level.push(id),
        }
    }

    /// 更新某帖的最近批注（最近一条胜出由调用方保证）
    pub fn set_flag(&mut self, state_id: &str, flag: Annotation) {
        if let Some(post) = self.posts.get_mut(state_id) {
            post.latest_flag = Some(flag);
        }
    }

    /// 顶层帖，按提交顺序。include_hidden=false 时过滤被删除的帖子，
    /// 被隐藏的顶层帖连同其回复一起不渲染。
    pub fn top_level(&self, include_hidden: bool) -> Vec<&ThreadedPost> {
        self.top_level
            .iter()
            .map(|id| &self.posts[id])
            .filter(|p| include_hidden || !p.is_hidden())
            .collect()
    }

    /// 某帖下的回复，按到达顺序
    pub fn replies_of(&self, state_id: &str, include_hidden: bool) -> Vec<&ThreadedPost> {
        let Some(post) = self.posts.get(state_id) else {
            return Vec::new();
        };
        post.replies
            .iter()
            .map(|id| &self.posts[id])
            .filter(|p| include_hidden || !p.is_hidden())
            .collect()
    }
}
