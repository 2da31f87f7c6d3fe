use std::str::FromStr;

use serde_json::Value as JsonValue;
use snafu::ResultExt;

use crate::convert::{ConversionError, HexDecodeSnafu, IncompatibleVariantTypesSnafu};

type Result<T, E = ConversionError> = std::result::Result<T, E>;

/// Opaque 128-bit IEEE-754 value.
///
/// There is no stable native `f128` in Rust, so the value is carried as its
/// 16 raw little-endian bytes and exposed in JSON as a 32-char hex string.
/// Arithmetic is out of scope; the bytes round-trip losslessly.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub struct Float128([u8; 16]);

impl Float128 {
    pub fn from_variant(v: &JsonValue) -> Result<Self> {
        if let Some(s) = v.as_str() {
            s.parse()
        }
        else {
            // without a native f128 there is no carrier for numeric input
            IncompatibleVariantTypesSnafu { typename: "f128", value: v.clone() }.fail()
        }
    }

    pub fn to_hex(&self) -> String {
        hex::encode_upper(self.0)
    }

    pub fn to_bin_repr(&self) -> &[u8; 16] {
        &self.0
    }

    pub fn from_bin_repr(bin: &[u8; 16]) -> Self {
        Float128(*bin)
    }
}

impl FromStr for Float128 {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut result = Float128::default();
        hex::decode_to_slice(s, &mut result.0).context(HexDecodeSnafu { repr: s })?;
        Ok(result)
    }
}
