use crate::models::byte_seq::ByteSeq;
use crate::models::value::Value;
use crate::traits::codec::Resume;

/// The outcome of a single codec read step.
///
/// Communicates whether a full value has been decoded or whether more bytes
/// are required. Running out of input is never an error at this level.
#[derive(Debug)]
pub enum ReadResult {
    /// A complete value was decoded.
    ///
    /// - `value`: the decoded value.
    /// - `rest`: the unconsumed tail of the input.
    Done {
        /// The decoded value.
        value: Value,
        /// Unconsumed input after the value's bytes.
        rest: ByteSeq,
    },

    /// The input was insufficient.
    ///
    /// The caller appends the next chunk onto `rest` and feeds the result to
    /// `resume`, which continues the decode where it stopped, including any
    /// partially accumulated state.
    NeedMore {
        /// Continuation carrying the partial decode state.
        resume: Resume,
        /// All input inspected so far, unconsumed.
        rest: ByteSeq,
    },
}

/// Progress of an incremental decode session.
///
/// Held by `FrameReader` and the framed value stream between chunks.
#[derive(Debug)]
pub enum ReaderState {
    /// Between frames: the next read starts the codec from the top.
    Ready,

    /// Mid-frame: a suspended read is parked until more bytes arrive.
    Suspended(Resume),
}
