use actix_web::{web, HttpRequest, HttpResponse};
use futures_util::StreamExt;
use tokio::sync::broadcast;

use crate::notifier::{Event, Notifier};
use crate::store::Store;

/// Upgrades to a WebSocket and streams availability/booking events.
///
/// Each subscriber gets a full-state snapshot at connect time, then live
/// events. There is no replay: events published before the connection are
/// gone.
pub async fn ws_subscribe(
    req: HttpRequest,
    body: web::Payload,
    store: web::Data<dyn Store>,
    notifier: web::Data<Notifier>,
) -> Result<HttpResponse, actix_web::Error> {
    let (response, session, msg_stream) = actix_ws::handle(&req, body)?;
    // Subscribe before the snapshot read so nothing falls in between.
    let events = notifier.subscribe();
    actix_web::rt::spawn(run_session(session, msg_stream, events, store));
    Ok(response)
}

async fn run_session(
    mut session: actix_ws::Session,
    mut msg_stream: actix_ws::MessageStream,
    mut events: broadcast::Receiver<Event>,
    store: web::Data<dyn Store>,
) {
    match store.list_offices().await {
        Ok(offices) => {
            if send_event(&mut session, &Event::Update { offices }).await.is_err() {
                return;
            }
        }
        Err(e) => {
            tracing::error!("Failed to load snapshot for new subscriber: {e:?}");
            let _ = session.close(None).await;
            return;
        }
    }

    loop {
        tokio::select! {
            msg = msg_stream.next() => match msg {
                Some(Ok(actix_ws::Message::Ping(bytes))) => {
                    if session.pong(&bytes).await.is_err() {
                        break;
                    }
                }
                Some(Ok(actix_ws::Message::Close(_))) | None => break,
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    tracing::debug!("WebSocket protocol error, dropping subscriber: {e}");
                    break;
                }
            },
            event = events.recv() => match event {
                Ok(event) => {
                    if send_event(&mut session, &event).await.is_err() {
                        break;
                    }
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!("Slow subscriber skipped {skipped} events");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            },
        }
    }
    let _ = session.close(None).await;
}

async fn send_event(
    session: &mut actix_ws::Session,
    event: &Event,
) -> Result<(), actix_ws::Closed> {
    match serde_json::to_string(event) {
        Ok(text) => session.text(text).await,
        Err(e) => {
            tracing::error!("Failed to serialize event: {e}");
            Ok(())
        }
    }
}
