//! 事件流 HTTP 处理器
//! 以 SSE 推送进程内事件总线，仅管理员可订阅

use crate::{
    authz::{authorize, Identity, Requirement},
    error::AppError,
    middleware::AppState,
};
use axum::{
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
};
use futures::stream::Stream;
use futures::StreamExt;
use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;
use tokio_stream::wrappers::BroadcastStream;

/// 事件订阅端点
/// 慢消费者掉队（Lagged）时该条丢弃，流本身不中断
pub async fn event_stream(
    State(state): State<Arc<AppState>>,
    identity: Identity,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, AppError> {
    authorize(&identity, &Requirement::admin())?;

    tracing::info!(user_id = %identity.id(), "Event stream subscribed");

    let stream = BroadcastStream::new(state.event_bus.subscribe()).filter_map(|result| async {
        match result {
            Ok(event) => match serde_json::to_string(&event.payload) {
                Ok(data) => Some(Ok(Event::default().event(event.kind).data(data))),
                Err(e) => {
                    tracing::warn!(error = %e, "Failed to serialize event payload");
                    None
                }
            },
            Err(e) => {
                tracing::warn!(error = %e, "Event stream lagged, dropping missed events");
                None
            }
        }
    });

    Ok(Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    ))
}
