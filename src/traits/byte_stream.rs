//! # Chunk Stream Trait
//!
//! Trait alias that lets you plug **any async stream of byte chunks** into
//! the framed value stream: files, sockets, in-memory test fixtures.
//!
//! **Why this is useful**
//! - Works with any `futures_core::Stream<Item = Result<Bytes, io::Error>>`.
//! - No extra layers or boxing, just trait bounds.
//! - Chunks are adopted by reference count; the adapter never copies them.
//!
//! Backpressure and scheduling are handled by your underlying stream.

use std::io;

use bytes::Bytes;
use futures_core::Stream;

/// Universal trait alias for any asynchronous, chunked byte source.
///
/// Implemented automatically for any [`Stream`] yielding
/// `Result<Bytes, io::Error>` and supporting `Send` + `Unpin`.
pub trait ChunkStream: Stream<Item = Result<Bytes, io::Error>> + Send + Unpin {}

impl<T> ChunkStream for T where T: Stream<Item = Result<Bytes, io::Error>> + Send + Unpin {}
