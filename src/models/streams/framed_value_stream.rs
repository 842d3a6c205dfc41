//! Asynchronous streaming adapter for compiled codecs.
//!
//! `FramedValueStream` takes any chunked byte source (implementing
//! [`ChunkStream`]) and produces decoded values using a compiled codec.
//!
//! # Mechanism
//! - Each arriving chunk is adopted (not copied) into the decode session's
//!   byte sequence and drained for every value it completes.
//! - A frame caught mid-chunk stays suspended inside the session; the next
//!   chunk resumes it exactly where it stopped.
//! - End-of-stream with a suspended frame yields `CodecError::Incomplete`;
//!   leftover bytes between frames yield `CodecError::Residual`.
//!
//! # Invariants
//! - Values are yielded in the order their bytes appear.
//! - A fatal codec error ends the stream; resumable state is discarded.

use std::collections::VecDeque;
use std::mem;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures_core::Stream;
use tracing::{debug, trace};

use crate::driver::FrameReader;
use crate::error::CodecError;
use crate::models::value::Value;
use crate::traits::byte_stream::ChunkStream;
use crate::traits::codec::DynCodec;

enum SessionState {
    Running(FrameReader),
    Finished,
}

/// Decoded-value stream over a chunked byte source.
pub struct FramedValueStream<S> {
    /// The underlying chunk source.
    inner: S,
    /// The incremental decode session.
    session: SessionState,
    /// Values decoded but not yet yielded.
    ready: VecDeque<Value>,
}

impl<S> FramedValueStream<S>
where
    S: ChunkStream,
{
    /// Create a framed value stream decoding `codec` frames from `stream`.
    pub fn new(stream: S, codec: DynCodec) -> Self {
        Self {
            inner: stream,
            session: SessionState::Running(FrameReader::new(codec)),
            ready: VecDeque::new(),
        }
    }
}

impl<S> Stream for FramedValueStream<S>
where
    S: ChunkStream,
{
    type Item = Result<Value, CodecError>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let me = self.get_mut();

        loop {
            if let Some(value) = me.ready.pop_front() {
                return Poll::Ready(Some(Ok(value)));
            }
            let reader = match &mut me.session {
                SessionState::Running(reader) => reader,
                SessionState::Finished => return Poll::Ready(None),
            };

            match Pin::new(&mut me.inner).poll_next(cx) {
                Poll::Pending => return Poll::Pending,
                Poll::Ready(Some(Ok(chunk))) => match reader.feed(chunk) {
                    Ok(values) => {
                        trace!(drained = values.len(), "chunk decoded");
                        me.ready.extend(values);
                    }
                    Err(e) => {
                        me.session = SessionState::Finished;
                        return Poll::Ready(Some(Err(e)));
                    }
                },
                Poll::Ready(Some(Err(e))) => {
                    me.session = SessionState::Finished;
                    return Poll::Ready(Some(Err(e.into())));
                }
                Poll::Ready(None) => {
                    // End-of-stream: anything still parked is an error.
                    let session = mem::replace(&mut me.session, SessionState::Finished);
                    return match session {
                        SessionState::Running(reader) => match reader.finish() {
                            Ok(()) => Poll::Ready(None),
                            Err(e) => {
                                debug!("byte source ended mid-frame");
                                Poll::Ready(Some(Err(e)))
                            }
                        },
                        SessionState::Finished => Poll::Ready(None),
                    };
                }
            }
        }
    }
}
