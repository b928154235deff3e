//! 身份与名册：当前工作组、运行/班次信息、工作组到用户名的映射
//!
//! 名册查询是纯内存查找，不经过 I/O，因此接口保持同步。

use std::collections::HashMap;
use std::sync::Arc;

/// 运行环境模式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// 学生正常上课
    Student,
    /// 预览/离线（无服务端，历史仅在本地）
    Preview,
    /// 教师评分视图，查看指定工作组
    Grading { target_workgroup_id: i64 },
    /// 教师评分的历史修订视图
    GradingRevision { target_workgroup_id: i64 },
    /// 课程创作
    Authoring,
}

impl Mode {
    pub fn is_student(&self) -> bool {
        matches!(self, Mode::Student | Mode::Preview)
    }

    pub fn is_moderation_capable(&self) -> bool {
        matches!(self, Mode::Grading { .. } | Mode::GradingRevision { .. })
    }

    /// 评分视图的目标工作组
    pub fn grading_target(&self) -> Option<i64> {
        match self {
            Mode::Grading {
                target_workgroup_id,
            }
            | Mode::GradingRevision {
                target_workgroup_id,
            } => Some(*target_workgroup_id),
            _ => None,
        }
    }
}

/// 身份/名册接口
pub trait Roster: Send + Sync {
    fn usernames_for_workgroup(&self, workgroup_id: i64) -> Vec<String>;
    fn user_ids_for_workgroup(&self, workgroup_id: i64) -> Vec<i64>;
    fn period_id_for_workgroup(&self, workgroup_id: i64) -> Option<i64>;
    fn current_workgroup_id(&self) -> i64;
    fn current_run_id(&self) -> i64;
    fn current_period_id(&self) -> i64;
    fn mode(&self) -> Mode;
}

/// 工作组显示名：有用户名映射时拼接用户名，否则退化为 "Student {userId}" 形式
pub fn display_name(roster: &dyn Roster, workgroup_id: i64) -> String {
    let usernames = roster.usernames_for_workgroup(workgroup_id);
    if !usernames.is_empty() {
        return usernames.join(", ");
    }
    roster
        .user_ids_for_workgroup(workgroup_id)
        .iter()
        .map(|id| format!("Student {}", id))
        .collect::<Vec<_>>()
        .join(", ")
}

/// 内存版名册
pub struct InMemoryRoster {
    pub run_id: i64,
    pub period_id: i64,
    pub workgroup_id: i64,
    pub mode: Mode,
    pub usernames: HashMap<i64, Vec<String>>,
    pub user_ids: HashMap<i64, Vec<i64>>,
    pub periods: HashMap<i64, i64>,
}

impl InMemoryRoster {
    pub fn new(run_id: i64, period_id: i64, workgroup_id: i64, mode: Mode) -> Self {
        Self {
            run_id,
            period_id,
            workgroup_id,
            mode,
            usernames: HashMap::new(),
            user_ids: HashMap::new(),
            periods: HashMap::new(),
        }
    }

    pub fn with_workgroup(mut self, workgroup_id: i64, usernames: &[&str], user_ids: &[i64]) -> Self {
        self.usernames.insert(
            workgroup_id,
            usernames.iter().map(|s| s.to_string()).collect(),
        );
        self.user_ids.insert(workgroup_id, user_ids.to_vec());
        self.periods.insert(workgroup_id, self.period_id);
        self
    }

    pub fn into_arc(self) -> Arc<dyn Roster> {
        Arc::new(self)
    }
}

impl Roster for InMemoryRoster {
    fn usernames_for_workgroup(&self, workgroup_id: i64) -> Vec<String> {
        self.usernames.get(&workgroup_id).cloned().unwrap_or_default()
    }

    fn user_ids_for_workgroup(&self, workgroup_id: i64) -> Vec<i64> {
        self.user_ids.get(&workgroup_id).cloned().unwrap_or_default()
    }

    fn period_id_for_workgroup(&self, workgroup_id: i64) -> Option<i64> {
        self.periods.get(&workgroup_id).copied()
    }

    fn current_workgroup_id(&self) -> i64 {
        self.workgroup_id
    }

    fn current_run_id(&self) -> i64 {
        self.run_id
    }

    fn current_period_id(&self) -> i64 {
        self.period_id
    }

    fn mode(&self) -> Mode {
        self.mode
    }
}
