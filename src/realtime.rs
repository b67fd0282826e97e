//! 实时事件侧信道
//! 授权核心不依赖它；状态变更后由业务服务通过注入的 EventSink 通知。
//! 进程内实现是一个 broadcast 总线，对外以 SSE 订阅。

use serde::Serialize;
use tokio::sync::broadcast;

/// 业务事件（角色/权限/用户状态变更）
#[derive(Debug, Clone, Serialize)]
pub struct AppEvent {
    /// 事件名，如 roleCreated、permissionDeleted
    pub kind: String,
    pub payload: serde_json::Value,
}

impl AppEvent {
    pub fn new(kind: impl Into<String>, payload: serde_json::Value) -> Self {
        Self {
            kind: kind.into(),
            payload,
        }
    }
}

/// 事件接收端。实现方自行决定投递方式；
/// 发送失败不得影响请求流程（由实现吞掉并记录）。
pub trait EventSink: Send + Sync {
    fn emit(&self, event: AppEvent);
}

/// 进程内事件总线
pub struct EventBus {
    sender: broadcast::Sender<AppEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// 订阅事件流（SSE 端点使用）
    pub fn subscribe(&self) -> broadcast::Receiver<AppEvent> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl EventSink for EventBus {
    fn emit(&self, event: AppEvent) {
        // 没有订阅者时 send 返回 Err，属正常情况
        if let Err(e) = self.sender.send(event.clone()) {
            tracing::debug!(kind = %e.0.kind, "Event dropped, no active subscribers");
        } else {
            tracing::debug!(kind = %event.kind, "Event emitted");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_emit_reaches_subscriber() {
        let bus = EventBus::new(16);
        let mut rx = bus.subscribe();

        bus.emit(AppEvent::new("roleCreated", json!({"slug": "moderator"})));

        let event = rx.recv().await.unwrap();
        assert_eq!(event.kind, "roleCreated");
        assert_eq!(event.payload["slug"], "moderator");
    }

    #[test]
    fn test_emit_without_subscribers_does_not_panic() {
        let bus = EventBus::new(16);
        bus.emit(AppEvent::new("roleDeleted", json!({})));
        assert_eq!(bus.subscriber_count(), 0);
    }
}
