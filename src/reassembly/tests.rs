//! Tests for client-side reassembly

use super::*;
use crate::stream::StreamTransport;
use futures::stream;
use pretty_assertions::assert_eq;
use serde_json::json;

fn chunks(parts: &[&'static [u8]]) -> impl futures::Stream<Item = Result<&'static [u8], String>> {
    stream::iter(parts.iter().copied().map(Ok).collect::<Vec<_>>())
}

// ============================================================================
// ReassemblyBuffer
// ============================================================================

#[test]
fn test_buffer_tracks_progress() {
    let mut buffer = ReassemblyBuffer::new();
    assert!(buffer.is_empty());

    buffer.push(b"[1,");
    buffer.push(b"2]");

    assert_eq!(buffer.len(), 5);
    assert_eq!(buffer.progress(), ReassemblyProgress { reads: 2, bytes: 5 });
    assert_eq!(buffer.into_records().unwrap(), vec![json!(1), json!(2)]);
}

#[test]
fn test_buffer_joins_split_utf8() {
    let payload = r#"[{"name":"Zoë"}]"#.as_bytes();
    let split = payload.iter().position(|b| *b == 0xc3).unwrap() + 1;

    let mut buffer = ReassemblyBuffer::new();
    buffer.push(&payload[..split]);
    buffer.push(&payload[split..]);

    assert_eq!(buffer.into_records().unwrap(), vec![json!({"name": "Zoë"})]);
}

// ============================================================================
// ClientReassembler state machine
// ============================================================================

#[test]
fn test_initial_state() {
    let reassembler = ClientReassembler::new();
    assert_eq!(reassembler.state(), LoadState::Initial);
    assert!(reassembler.results().is_empty());
    assert!(reassembler.finished().is_none());
}

#[test]
fn test_start_enters_loading_once() {
    let mut reassembler = ClientReassembler::new();
    assert!(reassembler.start());
    assert_eq!(reassembler.state(), LoadState::Loading);
    assert!(!reassembler.start());
    assert!(reassembler.finished().is_none());
}

#[tokio::test]
async fn test_single_array_payload() {
    let mut reassembler = ClientReassembler::new();
    reassembler.start();

    let records = reassembler
        .read_stream(chunks(&[br#"[{"id":1},"#, br#"{"id":2}]"#]))
        .await
        .to_vec();

    assert_eq!(records, vec![json!({"id": 1}), json!({"id": 2})]);
    assert_eq!(reassembler.state(), LoadState::Complete);
    assert_eq!(reassembler.finished().map(<[_]>::len), Some(2));
    assert!(reassembler.last_error().is_none());
}

#[tokio::test]
async fn test_concatenated_chunks_are_flattened() {
    let mut reassembler = ClientReassembler::new();

    reassembler
        .read_stream(chunks(&[b"[1,2]", b"[3]", b"[4,", b"5]"]))
        .await;

    assert_eq!(
        reassembler.into_finished().unwrap(),
        vec![json!(1), json!(2), json!(3), json!(4), json!(5)]
    );
}

#[tokio::test]
async fn test_malformed_trailing_bytes_complete_with_empty_result() {
    let mut reassembler = ClientReassembler::new();
    reassembler.start();

    let records = reassembler
        .read_stream(chunks(&[b"[1,2]", b"[3,"]))
        .await;

    assert!(records.is_empty());
    assert_eq!(reassembler.state(), LoadState::Complete);
    assert_eq!(reassembler.finished(), Some(&[][..]));
    assert!(reassembler
        .last_error()
        .unwrap()
        .contains("Invalid JSON received as response"));
}

#[tokio::test]
async fn test_empty_payload_completes_with_empty_result() {
    let mut reassembler = ClientReassembler::new();
    reassembler.start();

    reassembler.read_stream(chunks(&[])).await;

    assert_eq!(reassembler.state(), LoadState::Complete);
    assert!(reassembler.results().is_empty());
    assert!(reassembler.last_error().is_some());
}

#[tokio::test]
async fn test_read_error_parses_what_arrived() {
    let parts: Vec<Result<&'static [u8], String>> = vec![
        Ok(&b"[1]"[..]),
        Ok(&b"[2]"[..]),
        Err("connection reset".to_string()),
        Ok(&b"[3]"[..]),
    ];

    let mut reassembler = ClientReassembler::new();
    reassembler.read_stream(stream::iter(parts)).await;

    assert_eq!(reassembler.state(), LoadState::Complete);
    assert_eq!(reassembler.results(), &[json!(1), json!(2)][..]);
}

#[tokio::test]
async fn test_restart_clears_prior_results() {
    let mut reassembler = ClientReassembler::new();
    reassembler.read_stream(chunks(&[b"[1,2,3]"])).await;
    assert_eq!(reassembler.results().len(), 3);

    assert!(reassembler.start());
    assert_eq!(reassembler.state(), LoadState::Loading);
    assert!(reassembler.results().is_empty());

    reassembler.read_stream(chunks(&[b"[4]"])).await;
    assert_eq!(reassembler.results(), &[json!(4)][..]);
}

#[tokio::test]
async fn test_progress_reported_per_read() {
    let mut seen = Vec::new();
    let mut reassembler = ClientReassembler::new();

    reassembler
        .read_stream_with_progress(chunks(&[b"[1]", b"[22]"]), |progress| seen.push(progress))
        .await;

    assert_eq!(
        seen,
        vec![
            ReassemblyProgress { reads: 1, bytes: 3 },
            ReassemblyProgress { reads: 2, bytes: 7 },
        ]
    );
    assert_eq!(reassembler.progress(), ReassemblyProgress { reads: 2, bytes: 7 });
}

#[tokio::test]
async fn test_reads_stream_session_output() {
    let (mut session, body) = StreamTransport::new(4).open();
    let writer = tokio::spawn(async move {
        session.write_chunk(&[json!({"id": "a"})]).await.unwrap();
        session
            .write_chunk(&[json!({"id": "b"}), json!({"id": "c"})])
            .await
            .unwrap();
        session.close();
    });

    let mut reassembler = ClientReassembler::new();
    reassembler.start();
    reassembler.read_stream(body).await;
    writer.await.unwrap();

    let ids: Vec<&str> = reassembler
        .results()
        .iter()
        .map(|r| r["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec!["a", "b", "c"]);
}
