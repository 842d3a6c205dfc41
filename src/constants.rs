// --- Wire-format defaults ---

use crate::models::codecs::primitive::Prim;

/// Count prefix used by `repeated` when none is given.
pub const DEFAULT_PREFIX: Prim = Prim::Int32;

/// Wire form backing enumerations.
pub const ENUM_WIRE: Prim = Prim::Int16;

/// Initial capacity the driver gives an encode buffer when the codec's
/// size is unknown.
pub const DEFAULT_ENCODE_CAPACITY: usize = 256;
