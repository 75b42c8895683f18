//! Archive codecs.

mod zip;

pub use self::zip::ZipCodec;
