use std::convert::Infallible;
use std::sync::Arc;

use axum::{
    extract::{Path, State},
    response::sse::{Event, KeepAlive, Sse},
};
use futures::stream::Stream;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;
use tokio_stream::{wrappers::BroadcastStream, StreamExt};
use uuid::Uuid;

use crate::features::realtime::broadcaster::Broadcaster;
use crate::features::realtime::events::Topic;

fn event_stream(
    bus: &Arc<dyn Broadcaster>,
    topic: Topic,
) -> impl Stream<Item = Result<Event, Infallible>> {
    BroadcastStream::new(bus.subscribe(&topic)).filter_map(move |item| match item {
        Ok(event) => match Event::default().event(event.name()).json_data(&event) {
            Ok(sse_event) => Some(Ok(sse_event)),
            Err(e) => {
                tracing::warn!("Failed to serialize event for {}: {}", topic.key(), e);
                None
            }
        },
        // A lagged subscriber just misses hints; its next refetch catches
        // it up, so we drop the gap marker instead of closing the stream.
        Err(BroadcastStreamRecvError::Lagged(skipped)) => {
            tracing::debug!("Subscriber on {} lagged by {} events", topic.key(), skipped);
            None
        }
    })
}

/// Subscribe to all lifecycle events (monitoring dashboards)
#[utoipa::path(
    get,
    path = "/api/events",
    responses((status = 200, description = "Server-sent event stream")),
    tag = "events"
)]
pub async fn global_events(
    State(bus): State<Arc<dyn Broadcaster>>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    Sse::new(event_stream(&bus, Topic::Global)).keep_alive(KeepAlive::default())
}

/// Subscribe to one service's events (waiting-room displays)
///
/// Unknown IDs are accepted and simply receive nothing; displays poll the
/// authoritative state anyway.
#[utoipa::path(
    get,
    path = "/api/events/services/{id}",
    params(("id" = Uuid, Path, description = "Service ID")),
    responses((status = 200, description = "Server-sent event stream")),
    tag = "events"
)]
pub async fn service_events(
    State(bus): State<Arc<dyn Broadcaster>>,
    Path(id): Path<Uuid>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    Sse::new(event_stream(&bus, Topic::Service(id))).keep_alive(KeepAlive::default())
}

/// Subscribe to one counter's events (staff console)
#[utoipa::path(
    get,
    path = "/api/events/counters/{id}",
    params(("id" = Uuid, Path, description = "Counter ID")),
    responses((status = 200, description = "Server-sent event stream")),
    tag = "events"
)]
pub async fn counter_events(
    State(bus): State<Arc<dyn Broadcaster>>,
    Path(id): Path<Uuid>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    Sse::new(event_stream(&bus, Topic::Counter(id))).keep_alive(KeepAlive::default())
}
