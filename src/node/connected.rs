//! 连接组件模式判定
//!
//! showWork 模式：所有连接都是 showWork，查看者自身不可发帖；
//! importWork 模式：所有连接都是 importWork，自己的响应历史也进入同学池。
//! 连接列表为空时两个模式判定都为 false（需要至少一条声明）。

use crate::model::{ComponentContent, ConnectedComponentKind};

/// 是否存在非空的连接声明
pub fn has_connected_components(content: &ComponentContent) -> bool {
    !content.connected_components.is_empty()
}

/// 所有连接都是 showWork（空列表为 false）
pub fn is_show_work_mode(content: &ComponentContent) -> bool {
    has_connected_components(content)
        && content
            .connected_components
            .iter()
            .all(|c| c.kind == ConnectedComponentKind::ShowWork)
}

/// 所有连接都是 importWork（空列表为 false）
pub fn is_import_work_mode(content: &ComponentContent) -> bool {
    has_connected_components(content)
        && content
            .connected_components
            .iter()
            .all(|c| c.kind == ConnectedComponentKind::ImportWork)
}
