// tests/event_sink.rs

use jac::events::{ChannelSink, Event, EventSink, Notification, TailEvent};
use jac::types::NotificationKind;

#[tokio::test]
async fn channel_sink_delivers_in_order() {
    let (sink, mut rx) = ChannelSink::channel();

    sink.emit(Event::Tail(TailEvent::Lines(vec!["a".to_string()])));
    sink.success("billing", "stopped");
    sink.warn("Start all", "Bulk start is already in progress");

    assert_eq!(
        rx.recv().await,
        Some(Event::Tail(TailEvent::Lines(vec!["a".to_string()])))
    );
    assert_eq!(
        rx.recv().await,
        Some(Event::Notify(Notification::new(
            NotificationKind::Success,
            "billing",
            "stopped"
        )))
    );
    match rx.recv().await {
        Some(Event::Notify(n)) => assert_eq!(n.kind, NotificationKind::Warn),
        other => panic!("expected a warn notification, got {other:?}"),
    }
}

#[test]
fn emitting_after_the_receiver_is_gone_does_not_panic() {
    let (sink, rx) = ChannelSink::channel();
    drop(rx);
    sink.error("billing", "failed to start");
}

#[test]
fn notification_kinds_render_lowercase() {
    let rendered: Vec<String> = [
        NotificationKind::Info,
        NotificationKind::Warn,
        NotificationKind::Error,
        NotificationKind::Success,
    ]
    .iter()
    .map(ToString::to_string)
    .collect();
    assert_eq!(rendered, vec!["info", "warn", "error", "success"]);
}
