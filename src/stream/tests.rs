//! Tests for stream transport module

use super::*;
use crate::engine::PageConsumer;
use crate::error::Error;
use crate::pagination::Page;
use futures::StreamExt;
use serde_json::json;

async fn drain(chunks: ChunkStream) -> Vec<String> {
    chunks
        .map(|chunk| String::from_utf8(chunk.unwrap().to_vec()).unwrap())
        .collect()
        .await
}

#[test]
fn test_transport_buffer_is_at_least_one() {
    assert_eq!(StreamTransport::new(0).buffer(), 1);
    assert_eq!(StreamTransport::new(8).buffer(), 8);
    assert_eq!(StreamTransport::default().buffer(), 1);
}

#[test]
fn test_sessions_get_distinct_ids() {
    let transport = StreamTransport::default();
    let (first, _a) = transport.open();
    let (second, _b) = transport.open();
    assert_ne!(first.id(), second.id());
}

#[tokio::test]
async fn test_chunks_are_discrete_json_arrays() {
    let transport = StreamTransport::new(4);
    let (mut session, chunks) = transport.open();

    session
        .write_chunk(&[json!({"id": 1}), json!({"id": 2})])
        .await
        .unwrap();
    session.write_chunk(&[json!({"id": 3})]).await.unwrap();
    session.write_chunk(&[]).await.unwrap();
    assert!(session.close());

    assert_eq!(session.chunks_written(), 3);
    assert_eq!(session.records_written(), 3);
    assert_eq!(
        drain(chunks).await,
        vec![r#"[{"id":1},{"id":2}]"#, r#"[{"id":3}]"#, "[]"]
    );
}

#[tokio::test]
async fn test_close_is_idempotent() {
    let (mut session, chunks) = StreamTransport::default().open();

    assert!(!session.is_closed());
    assert!(session.close());
    assert!(!session.close());
    assert!(!session.close());
    assert!(session.is_closed());

    assert!(drain(chunks).await.is_empty());
}

#[tokio::test]
async fn test_write_after_close_fails() {
    let (mut session, _chunks) = StreamTransport::default().open();
    session.close();

    let err = session.write_chunk(&[json!(1)]).await.unwrap_err();
    assert!(matches!(err, Error::TransportClosed));
    assert_eq!(session.chunks_written(), 0);
}

#[tokio::test]
async fn test_reader_gone_is_transport_closed() {
    let (mut session, chunks) = StreamTransport::default().open();
    drop(chunks);

    assert!(session.is_closed());
    let err = session.write_chunk(&[json!(1)]).await.unwrap_err();
    assert!(err.is_transport_closed());

    // The failed write already closed the session
    assert!(!session.close());
}

#[tokio::test]
async fn test_drop_ends_stream() {
    let (mut session, chunks) = StreamTransport::new(2).open();
    session.write_chunk(&[json!("a")]).await.unwrap();
    drop(session);

    assert_eq!(drain(chunks).await, vec![r#"["a"]"#]);
}

#[tokio::test]
async fn test_write_suspends_until_reader_catches_up() {
    let (mut session, mut chunks) = StreamTransport::new(1).open();
    session.write_chunk(&[json!(1)]).await.unwrap();

    // Buffer is full: the second write cannot finish yet
    let pending = tokio::time::timeout(
        std::time::Duration::from_millis(50),
        session.write_chunk(&[json!(2)]),
    )
    .await;
    assert!(pending.is_err());

    let first = chunks.next().await.unwrap().unwrap();
    assert_eq!(&first[..], b"[1]");

    session.write_chunk(&[json!(3)]).await.unwrap();
    let next = chunks.next().await.unwrap().unwrap();
    assert_eq!(&next[..], b"[3]");
}

#[tokio::test]
async fn test_session_as_page_consumer() {
    let (mut session, chunks) = StreamTransport::new(4).open();

    {
        let consumer: &mut dyn PageConsumer = &mut session;
        consumer
            .consume(Page::new(0, 2, vec![json!(1), json!(2)]))
            .await
            .unwrap();
        assert!(!consumer.is_closed());
    }
    session.close();

    assert_eq!(drain(chunks).await, vec!["[1,2]"]);
}
