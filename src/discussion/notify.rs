//! 回复通知分发
//!
//! 一条新回复产生两类通知：发给被回复帖的作者，以及该帖此前的
//! 回复者（去重、排除回复者本人）。去重只在单次分发内生效，
//! 同一人再次回复同一串会再次触发通知。

use crate::error::SyncError;
use crate::model::{ComponentState, Notification};
use crate::push::{PushChannel, PushMessage};
use crate::services::{display_name, NotificationStore, Roster};

use super::thread::ThreadIndex;

/// 为一条已保存的回复分发通知。返回发出的通知数。
///
/// 不是回复、或父帖不在索引中时是 no-op。
pub async fn dispatch_reply_notifications(
    reply: &ComponentState,
    threads: &ThreadIndex,
    roster: &dyn Roster,
    notifications: &dyn NotificationStore,
    push: &dyn PushChannel,
    message_template: &str,
) -> Result<usize, SyncError> {
    let Some(parent_id) = reply.reply_target() else {
        return Ok(0);
    };
    let Some(parent) = threads.get(parent_id) else {
        return Ok(0);
    };

    let replier = reply.workgroup_id;
    let message = message_template.replace("{usernames}", &display_name(roster, replier));

    // 本次分发内已通知的工作组
    let mut notified: Vec<i64> = Vec::new();
    let mut sent = 0;

    // 先通知父帖作者
    let author = parent.state.workgroup_id;
    if author != replier {
        send_one(reply, replier, author, &message, notifications, push).await?;
        notified.push(author);
        sent += 1;
    }

    // 再通知此前的回复者
    for reply_id in &parent.replies {
        let Some(prior) = threads.get(reply_id) else {
            continue;
        };
        let target = prior.state.workgroup_id;
        if target == replier || notified.contains(&target) {
            continue;
        }
        send_one(reply, replier, target, &message, notifications, push).await?;
        notified.push(target);
        sent += 1;
    }

    Ok(sent)
}

async fn send_one(
    reply: &ComponentState,
    from_workgroup_id: i64,
    to_workgroup_id: i64,
    message: &str,
    notifications: &dyn NotificationStore,
    push: &dyn PushChannel,
) -> Result<(), SyncError> {
    let notification = Notification::discussion_reply(
        &reply.node_id,
        &reply.component_id,
        from_workgroup_id,
        to_workgroup_id,
        message,
    );
    let saved = notifications.save(notification).await?;
    tracing::debug!(
        to_workgroup_id,
        from_workgroup_id,
        "Discussion reply notification sent"
    );
    push.send_to_period(PushMessage::Notification { notification: saved })
        .await
}
