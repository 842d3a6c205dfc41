pub mod traits {
    pub mod byte_stream;
    pub mod codec;
}

pub mod models {

    pub mod codecs {
        pub mod blocks;
        pub mod enumeration;
        pub mod header;
        pub mod literal;
        pub mod primitive;
        pub mod sequence;
        pub mod string;
    }
    pub mod streams {
        pub mod framed_value_stream;
    }
    pub mod byte_seq;
    pub mod frame;
    pub mod value;
}

pub mod constants;
pub mod driver;
pub mod enums;
pub mod error;

// Re-exported for the `defcodec!` macro expansion.
#[doc(hidden)]
pub use once_cell;

pub use crate::driver::{
    contiguous, decode, decode_all, encode, encode_all, to_buf_seq, to_byte_buffer, FrameReader,
};
pub use crate::enums::ReadResult;
pub use crate::error::CodecError;
pub use crate::models::byte_seq::ByteSeq;
pub use crate::models::codecs::blocks::{
    delimited_block, delimited_frame, finite_block, finite_frame, finite_frame_len,
};
pub use crate::models::codecs::enumeration::{enumeration, enumeration_map};
pub use crate::models::codecs::header::{header, Prefix};
pub use crate::models::codecs::primitive::Prim;
pub use crate::models::codecs::sequence::{repeated, repeated_delimited, repeated_with_prefix};
pub use crate::models::codecs::string::{
    string, string_delimited, string_float, string_integer, string_with_length,
};
pub use crate::models::frame::{compile, Frame};
pub use crate::models::streams::framed_value_stream::FramedValueStream;
pub use crate::models::value::{OrderedMap, Value};
pub use crate::traits::byte_stream::ChunkStream;
pub use crate::traits::codec::{and_then, Codec, DynCodec, Resume};
