//! Fixed-width register values
//!
//! Multi-byte values travel most-significant byte first. The convenience
//! read/write calls encode to and decode from byte sequences through this
//! trait, so the protocol logic only ever sees byte slices.

/// Unsigned integer that can be written to or read from a register
pub trait Scalar: Copy {
    /// Width on the wire in bytes
    const WIDTH: usize;

    /// Big-endian byte representation
    type Bytes: AsRef<[u8]> + AsMut<[u8]> + Default;

    /// Encode for transmission
    fn to_wire(self) -> Self::Bytes;

    /// Decode received bytes
    fn from_wire(bytes: Self::Bytes) -> Self;
}

macro_rules! impl_scalar {
    ($($ty:ty => $width:expr),+ $(,)?) => {
        $(
            impl Scalar for $ty {
                const WIDTH: usize = $width;
                type Bytes = [u8; $width];

                fn to_wire(self) -> Self::Bytes {
                    self.to_be_bytes()
                }

                fn from_wire(bytes: Self::Bytes) -> Self {
                    <$ty>::from_be_bytes(bytes)
                }
            }
        )+
    };
}

impl_scalar!(u8 => 1, u16 => 2, u32 => 4, u64 => 8);
