use std::io;

use serde::Serialize;

use serde_json::Result;
use serde_json::ser::{CompactFormatter, Formatter, Serializer};

pub struct EosFormatter {
    base: CompactFormatter,
}

/// JSON formatter with the following difference to `serde_json::Formatter`:
///  - `u128` and `i128` are implemented and are represented as strings (ie: double-quoted)
///  - `f32` and `f64` never use scientific notation, and floats that have a fractional
///    part do not have a trailing ".0"
///
/// 64-bit integers are quoted at the variant level (see `AntelopeValue::to_variant`)
/// rather than here: `serde_json::Value` stores every small integer as an `i64`
/// internally, so quoting `write_i64` would also quote `int8` etc.
impl EosFormatter {
    fn new() -> Self {
        EosFormatter { base: CompactFormatter {} }
    }
}

impl Formatter for EosFormatter {
    #[inline]
    fn write_u128<W>(&mut self, writer: &mut W, value: u128) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        writer.write_all(b"\"")?;
        self.base.write_u128(writer, value)?;
        writer.write_all(b"\"")
    }

    #[inline]
    fn write_i128<W>(&mut self, writer: &mut W, value: i128) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        writer.write_all(b"\"")?;
        self.base.write_i128(writer, value)?;
        writer.write_all(b"\"")
    }

    #[inline]
    fn write_f32<W>(&mut self, writer: &mut W, value: f32) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        // use this instead of the default impl that uses Ryu in order to ensure
        // that we never use scientific notation
        write!(writer, "{}", value)
    }

    #[inline]
    fn write_f64<W>(&mut self, writer: &mut W, value: f64) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        // use this instead of the default impl that uses Ryu in order to ensure
        // that we never use scientific notation
        write!(writer, "{}", value)
    }
}


pub fn to_string<T>(value: &T) -> Result<String>
where
    T: ?Sized + Serialize,
{
    let fmt = EosFormatter::new();
    let mut vec = Vec::with_capacity(128);
    let mut ser = Serializer::with_formatter(&mut vec, fmt);
    value.serialize(&mut ser)?;
    let string = unsafe {
        // We do not emit invalid UTF-8.
        String::from_utf8_unchecked(vec)
    };
    Ok(string)
}

pub use serde_json::from_str;
