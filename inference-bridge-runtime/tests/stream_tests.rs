use futures::stream;
use inference_bridge_core::chat::StreamContentKind;
use inference_bridge_core::{Error, StreamConfig, StreamEvent};
use inference_bridge_runtime::{CallContext, StreamEmitter, deliver_stream};

#[tokio::test]
async fn test_fragments_are_coalesced_per_kind() {
    let fragments = vec![
        Ok(StreamEvent::thinking("The user")),
        Ok(StreamEvent::thinking(" wants a haiku.")),
        Ok(StreamEvent::text("Autumn ")),
        Ok(StreamEvent::text("moonlight")),
    ];

    let mut delivered = Vec::new();
    let mut emitter = StreamEmitter::new(
        StreamConfig {
            flush_interval_millis: 60_000,
            flush_chunk_size: 1024,
        },
        |event: StreamEvent| {
            delivered.push(event);
            Ok(())
        },
    )
    .with_origin("anthropic", "claude-sonnet-4-5");

    let received = deliver_stream(&CallContext::new(), stream::iter(fragments), |event| {
        emitter.push_event(event)
    })
    .await
    .unwrap();
    assert_eq!(received, 4);
    assert_eq!(emitter.finish().unwrap(), 2);

    assert_eq!(delivered.len(), 2);
    assert_eq!(delivered[0].kind(), StreamContentKind::Thinking);
    assert_eq!(delivered[0].chunk_text(), "The user wants a haiku.");
    assert_eq!(delivered[1].chunk_text(), "Autumn moonlight");
    assert_eq!(delivered[1].model.as_deref(), Some("claude-sonnet-4-5"));

    let wire = serde_json::to_value(&delivered[1]).unwrap();
    assert_eq!(wire["kind"], "text");
    assert_eq!(wire["text"]["text"], "Autumn moonlight");
}

#[tokio::test]
async fn test_emitter_error_aborts_the_stream() {
    let fragments = (0..10).map(|_| Ok(StreamEvent::text("x")));
    let mut emitter = StreamEmitter::new(
        StreamConfig {
            flush_interval_millis: 60_000,
            flush_chunk_size: 3,
        },
        |_event: StreamEvent| Err(Error::StreamHandler("socket closed".into())),
    );

    let err = deliver_stream(&CallContext::new(), stream::iter(fragments), |event| {
        emitter.push_event(event)
    })
    .await
    .unwrap_err();
    assert_eq!(err.to_string(), "Stream handler error: socket closed");
}
