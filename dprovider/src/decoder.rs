//! Incremental decoding of `data: <json>` event streams.
//!
//! The decoder keeps one byte buffer across reads, so a logical line may be
//! split anywhere (including inside a multi-byte character) by the network.
//!
//! ```rust
//! use dprovider::{EventDecoder, StreamEvent};
//!
//! let mut decoder = EventDecoder::new();
//! assert!(decoder.push(b"data: {\"content\":{\"parts\":[{\"te").is_empty());
//!
//! let events = decoder.push(b"xt\":\"Hel\"}]}}\n");
//! assert_eq!(events, vec![StreamEvent::Text("Hel".into())]);
//! ```

use std::pin::Pin;

use async_stream::try_stream;
use bytes::Bytes;
use futures_core::Stream;
use futures_util::StreamExt;
use serde::Deserialize;

use crate::ProviderError;

/// Reserved prefix marking a line that carries a JSON payload.
pub const EVENT_PREFIX: &str = "data: ";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEvent {
    /// One text fragment, verbatim as received.
    Text(String),
    /// The backend invoked a named tool or function.
    ToolCall { name: String },
    /// The backend routed work to a named specialist.
    Specialist { name: String },
}

pub type ByteStream<'a> = Pin<Box<dyn Stream<Item = Result<Bytes, ProviderError>> + Send + 'a>>;

/// Decoded event stream contract.
///
/// Invariants for consumers:
/// - Events are emitted in the order their bytes arrived.
/// - A transport failure is yielded once as `Err` and ends the stream.
/// - Dropping the stream releases the underlying byte stream immediately.
pub type BoxedEventStream<'a> =
    Pin<Box<dyn Stream<Item = Result<StreamEvent, ProviderError>> + Send + 'a>>;

#[derive(Debug, Deserialize)]
struct StreamPayload {
    content: Option<PayloadContent>,
    metadata: Option<PayloadMetadata>,
}

#[derive(Debug, Deserialize)]
struct PayloadContent {
    parts: Option<Vec<PayloadPart>>,
}

#[derive(Debug, Deserialize)]
struct PayloadPart {
    text: Option<String>,
    #[serde(rename = "functionCall")]
    function_call: Option<FunctionCall>,
}

#[derive(Debug, Deserialize)]
struct FunctionCall {
    name: String,
}

#[derive(Debug, Deserialize)]
struct PayloadMetadata {
    specialist: Option<String>,
}

impl StreamPayload {
    fn into_events(self) -> Vec<StreamEvent> {
        let mut events = Vec::new();

        let parts = self
            .content
            .and_then(|content| content.parts)
            .unwrap_or_default();

        for part in parts {
            if let Some(text) = part.text
                && !text.is_empty()
            {
                events.push(StreamEvent::Text(text));
            }

            if let Some(call) = part.function_call {
                events.push(StreamEvent::ToolCall { name: call.name });
            }
        }

        if let Some(name) = self.metadata.and_then(|metadata| metadata.specialist)
            && !name.is_empty()
        {
            events.push(StreamEvent::Specialist { name });
        }

        events
    }
}

/// Decodes one complete line. Unprefixed and malformed lines yield nothing.
pub fn decode_line(line: &[u8]) -> Vec<StreamEvent> {
    let Some(payload) = line.strip_prefix(EVENT_PREFIX.as_bytes()) else {
        return Vec::new();
    };

    match serde_json::from_slice::<StreamPayload>(payload) {
        Ok(parsed) => parsed.into_events(),
        Err(error) => {
            tracing::debug!(
                error = %error,
                bytes = payload.len(),
                "dropping malformed stream line"
            );
            Vec::new()
        }
    }
}

/// Line-buffering state machine behind [`decode_event_stream`].
#[derive(Debug, Default)]
pub struct EventDecoder {
    buffer: Vec<u8>,
}

impl EventDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `chunk` and decodes every line it completes.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<StreamEvent> {
        self.buffer.extend_from_slice(chunk);

        let Some(last_newline) = self.buffer.iter().rposition(|byte| *byte == b'\n') else {
            return Vec::new();
        };

        let complete = self.buffer.drain(..=last_newline).collect::<Vec<u8>>();
        complete
            .split(|byte| *byte == b'\n')
            .flat_map(decode_line)
            .collect()
    }

    /// Bytes held back waiting for a newline.
    pub fn buffered_len(&self) -> usize {
        self.buffer.len()
    }

    /// Ends decoding, discarding any unterminated trailing line.
    pub fn finish(self) -> usize {
        self.buffer.len()
    }
}

/// Exclusive hold on a byte stream; dropping it releases the stream.
struct StreamLease<'a> {
    inner: Option<ByteStream<'a>>,
}

impl<'a> StreamLease<'a> {
    fn new(inner: ByteStream<'a>) -> Self {
        Self { inner: Some(inner) }
    }

    async fn next(&mut self) -> Option<Result<Bytes, ProviderError>> {
        match self.inner.as_mut() {
            Some(inner) => inner.next().await,
            None => None,
        }
    }

    fn release(&mut self) {
        if self.inner.take().is_some() {
            tracing::debug!("released event stream body");
        }
    }
}

impl Drop for StreamLease<'_> {
    fn drop(&mut self) {
        self.release();
    }
}

/// Lazily decodes `bytes` into [`StreamEvent`]s as the caller polls.
pub fn decode_event_stream<'a>(bytes: ByteStream<'a>) -> BoxedEventStream<'a> {
    let stream = try_stream! {
        let mut lease = StreamLease::new(bytes);
        let mut decoder = EventDecoder::new();

        while let Some(chunk) = lease.next().await {
            let chunk = match chunk {
                Ok(chunk) => chunk,
                Err(error) => {
                    lease.release();
                    Err(error)?
                }
            };

            for event in decoder.push(&chunk) {
                yield event;
            }
        }

        lease.release();
        let discarded = decoder.finish();
        if discarded > 0 {
            tracing::debug!(bytes = discarded, "discarding unterminated final stream line");
        }
    };

    Box::pin(stream)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::task::{Context, Poll};

    use futures_util::stream;

    use super::*;

    const HEL: &str = "data: {\"content\":{\"parts\":[{\"text\":\"Hel\"}]}}\n";
    const LO: &str = "data: {\"content\":{\"parts\":[{\"text\":\"lo\"}]}}\n";

    fn text(value: &str) -> StreamEvent {
        StreamEvent::Text(value.to_string())
    }

    fn chunks(parts: Vec<&[u8]>) -> ByteStream<'static> {
        let items = parts
            .into_iter()
            .map(|part| Ok(Bytes::copy_from_slice(part)))
            .collect::<Vec<_>>();
        Box::pin(stream::iter(items))
    }

    async fn collect(stream: BoxedEventStream<'_>) -> Vec<Result<StreamEvent, ProviderError>> {
        stream.collect::<Vec<_>>().await
    }

    struct TrackedBytes {
        chunks: Vec<Result<Bytes, ProviderError>>,
        released: Arc<AtomicBool>,
    }

    impl Stream for TrackedBytes {
        type Item = Result<Bytes, ProviderError>;

        fn poll_next(mut self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
            if self.chunks.is_empty() {
                Poll::Ready(None)
            } else {
                Poll::Ready(Some(self.chunks.remove(0)))
            }
        }
    }

    impl Drop for TrackedBytes {
        fn drop(&mut self) {
            self.released.store(true, Ordering::SeqCst);
        }
    }

    fn tracked(chunks: Vec<Result<Bytes, ProviderError>>) -> (ByteStream<'static>, Arc<AtomicBool>) {
        let released = Arc::new(AtomicBool::new(false));
        let stream = TrackedBytes {
            chunks,
            released: Arc::clone(&released),
        };
        (Box::pin(stream), released)
    }

    #[test]
    fn fragments_are_emitted_separately_in_order() {
        let mut decoder = EventDecoder::new();
        assert_eq!(decoder.push(HEL.as_bytes()), vec![text("Hel")]);
        assert_eq!(decoder.push(LO.as_bytes()), vec![text("lo")]);
        assert_eq!(decoder.buffered_len(), 0);
    }

    #[test]
    fn order_is_preserved_for_every_split_point() {
        let input = format!(
            "{HEL}data: {{\"content\":{{\"parts\":[{{\"functionCall\":{{\"name\":\"graph_lookup\",\"args\":{{}}}}}}]}}}}\n{LO}"
        );
        let expected = vec![
            text("Hel"),
            StreamEvent::ToolCall {
                name: "graph_lookup".to_string(),
            },
            text("lo"),
        ];

        let bytes = input.as_bytes();
        for split in 0..=bytes.len() {
            let mut decoder = EventDecoder::new();
            let mut events = decoder.push(&bytes[..split]);
            events.extend(decoder.push(&bytes[split..]));
            assert_eq!(events, expected, "split at byte {split}");
        }
    }

    #[test]
    fn multibyte_characters_survive_chunk_boundaries() {
        let line = "data: {\"content\":{\"parts\":[{\"text\":\"caf\u{e9} \u{1f3b5}\"}]}}\n";
        let bytes = line.as_bytes();

        for split in 0..=bytes.len() {
            let mut decoder = EventDecoder::new();
            let mut events = decoder.push(&bytes[..split]);
            events.extend(decoder.push(&bytes[split..]));
            assert_eq!(events, vec![text("caf\u{e9} \u{1f3b5}")]);
        }
    }

    #[test]
    fn unprefixed_and_malformed_lines_are_skipped() {
        let mut decoder = EventDecoder::new();
        let input = format!(
            ": keep-alive\nevent: message\n{HEL}data: {{not json\ndata: [DONE]\n\n{LO}"
        );

        let events = decoder.push(input.as_bytes());
        assert_eq!(events, vec![text("Hel"), text("lo")]);
    }

    #[test]
    fn specialist_metadata_is_a_separate_event_after_parts() {
        let line = "data: {\"content\":{\"parts\":[{\"text\":\"Top labels:\"}]},\"metadata\":{\"specialist\":\"Neo4j Knowledge Graph\"}}\n";
        let events = decode_line(line.trim_end_matches('\n').as_bytes());

        assert_eq!(
            events,
            vec![
                text("Top labels:"),
                StreamEvent::Specialist {
                    name: "Neo4j Knowledge Graph".to_string()
                },
            ]
        );
    }

    #[test]
    fn text_is_not_trimmed_and_crlf_lines_parse() {
        let events = decode_line(b"data: {\"content\":{\"parts\":[{\"text\":\"  spaced \\n\"}]}}\r");
        assert_eq!(events, vec![text("  spaced \n")]);
    }

    #[test]
    fn payload_without_parts_or_with_empty_text_yields_nothing() {
        assert!(decode_line(b"data: {}").is_empty());
        assert!(decode_line(b"data: {\"content\":{\"parts\":[{\"text\":\"\"}]}}").is_empty());
        assert!(decode_line(b"data:{\"content\":{\"parts\":[{\"text\":\"x\"}]}}").is_empty());
    }

    #[test]
    fn unterminated_final_line_is_discarded() {
        let mut decoder = EventDecoder::new();
        let events = decoder.push(format!("{HEL}data: {{\"content\":{{\"parts\":[{{\"text\":\"cut\"}}]}}}}").as_bytes());

        assert_eq!(events, vec![text("Hel")]);
        assert!(decoder.buffered_len() > 0);
        assert_eq!(decoder.finish(), 44);
    }

    #[tokio::test]
    async fn stream_decodes_across_chunked_reads() {
        let events = collect(decode_event_stream(chunks(vec![
            b"data: {\"content\":{\"pa".as_slice(),
            b"rts\":[{\"text\":\"Hel\"}]}}\nda".as_slice(),
            b"ta: {\"content\":{\"parts\":[{\"text\":\"lo\"}]}}\n".as_slice(),
            b"data: {\"content\":{\"parts\":[{\"text\":\"dangling\"}]}}".as_slice(),
        ])))
        .await;

        let events = events
            .into_iter()
            .collect::<Result<Vec<_>, _>>()
            .expect("no errors");
        assert_eq!(events, vec![text("Hel"), text("lo")]);
    }

    #[tokio::test]
    async fn read_failure_is_yielded_once_and_releases_body() {
        let (bytes, released) = tracked(vec![
            Ok(Bytes::from_static(HEL.as_bytes())),
            Err(ProviderError::transport("connection reset")),
            Ok(Bytes::from_static(LO.as_bytes())),
        ]);

        let mut stream = decode_event_stream(bytes);
        assert_eq!(stream.next().await, Some(Ok(text("Hel"))));

        let error = stream.next().await.expect("error item").expect_err("error");
        assert_eq!(error.message, "connection reset");
        assert!(released.load(Ordering::SeqCst));
        assert!(stream.next().await.is_none());
    }

    #[tokio::test]
    async fn early_drop_releases_body() {
        let (bytes, released) = tracked(vec![
            Ok(Bytes::from_static(HEL.as_bytes())),
            Ok(Bytes::from_static(LO.as_bytes())),
        ]);

        let mut stream = decode_event_stream(bytes);
        assert_eq!(stream.next().await, Some(Ok(text("Hel"))));
        assert!(!released.load(Ordering::SeqCst));

        drop(stream);
        assert!(released.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn natural_completion_releases_body_before_end() {
        let (bytes, released) = tracked(vec![Ok(Bytes::from_static(HEL.as_bytes()))]);

        let mut stream = decode_event_stream(bytes);
        assert_eq!(stream.next().await, Some(Ok(text("Hel"))));
        assert!(stream.next().await.is_none());
        assert!(released.load(Ordering::SeqCst));
    }
}
