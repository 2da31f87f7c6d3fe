use std::fmt;
use std::str::FromStr;

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use snafu::Snafu;


#[derive(Debug, Snafu)]
pub enum InvalidName {
    #[snafu(display(r#"invalid character '{c}' in name "{name}""#))]
    InvalidChar { name: String, c: char },

    #[snafu(display(r#"thirteenth character '{c}' in name "{name}" must be one of ".12345a-j""#))]
    InvalidThirteenthChar { name: String, c: char },
}

/// Represent an immutable name in the Antelope data model and is encoded as a `uint64`.
///
/// Names pack up to 13 characters from the alphabet `.12345a-z` into 64 bits:
/// 5 bits per character for the first 12 (high bits first), 4 low bits for the
/// 13th (which is therefore restricted to `.`, `1`-`5` and `a`-`j`). Characters
/// past the 13th are ignored; trailing dots are not part of the string form.
#[derive(Eq, Hash, PartialEq, Ord, PartialOrd, Debug, Copy, Clone, Default)]
pub struct Name {
    value: u64,
}

impl Name {
    /// Build a `Name` from its string representation.
    ///
    /// ## Example
    /// ```
    /// # use abiconv::{Name, InvalidName};
    /// assert!(Name::new("nico").is_ok());
    /// assert_eq!(Name::new("eosio.token")?.to_string(), "eosio.token");
    /// assert_eq!(Name::new("a.b.c.d.e")?.to_string(), "a.b.c.d.e");
    /// assert_eq!(Name::new("")?.as_u64(), 0);
    /// assert!(Name::new("UPPER").is_err());
    /// # Ok::<(), InvalidName>(())
    /// ```
    pub fn new(s: &str) -> Result<Self, InvalidName> {
        Ok(Name {
            value: string_to_u64(s)?,
        })
    }

    /// Build a `Name` from a string literal, panicking on invalid input.
    pub const fn constant(s: &str) -> Self {
        let bytes = s.as_bytes();
        let mut n: u64 = 0;
        let maxlen = if bytes.len() < 12 { bytes.len() } else { 12 };
        let mut i = 0;
        while i < maxlen {
            let c = char_to_symbol(bytes[i]);
            if c < 0 { panic!("invalid character in name"); }
            n |= (c as u64) << (64 - 5 * (i + 1));
            i += 1;
        }
        if bytes.len() >= 13 {
            let c = char_to_symbol(bytes[12]);
            if c < 0 || c > 15 { panic!("invalid thirteenth character in name"); }
            n |= c as u64;
        }
        Name { value: n }
    }

    /// Build a `Name` from its `u64` representation.
    #[inline]
    pub const fn from_u64(n: u64) -> Self {
        // NOTE: no validation here, all u64 are valid names
        Self { value: n }
    }

    /// Return the name `u64` representation.
    #[inline]
    pub fn as_u64(&self) -> u64 { self.value }
}


// -----------------------------------------------------------------------------
//     Helper functions
// -----------------------------------------------------------------------------

// see ref implementation in AntelopeIO/spring/libraries/chain/name.{hpp,cpp}

const fn char_to_symbol(c: u8) -> i8 {
    match c {
        b'a'..=b'z' => (c - b'a') as i8 + 6,
        b'1'..=b'5' => (c - b'1') as i8 + 1,
        b'.' => 0,
        _ => -1,
    }
}

fn string_to_u64(s: &str) -> Result<u64, InvalidName> {
    let bytes = s.as_bytes();
    let mut n: u64 = 0;
    let maxlen = bytes.len().min(12);
    for (i, &b) in bytes[..maxlen].iter().enumerate() {
        let c = char_to_symbol(b);
        if c < 0 {
            return InvalidCharSnafu { name: s, c: b as char }.fail();
        }
        n |= (c as u64) << (64 - 5 * (i + 1));
    }

    // The loop above encoded up to 60 high bits; if the string has a 13th
    // character it goes into the low (remaining) 4 bits, and only the first
    // 16 symbols of the alphabet fit there. Anything past it is ignored.
    if bytes.len() >= 13 {
        let c = char_to_symbol(bytes[12]);
        if c < 0 {
            return InvalidCharSnafu { name: s, c: bytes[12] as char }.fail();
        }
        if c > 15 {
            return InvalidThirteenthCharSnafu { name: s, c: bytes[12] as char }.fail();
        }
        n |= c as u64;
    }

    Ok(n)
}

const CHARMAP: &[u8] = b".12345abcdefghijklmnopqrstuvwxyz";

fn u64_to_string(n: u64) -> String {
    let mut n = n;
    let mut s: Vec<u8> = vec![b'.'; 13];
    for i in 0..=12 {
        let c: u8 = CHARMAP[n as usize & match i { 0 => 0x0F, _ => 0x1F }];
        s[12 - i] = c;
        n >>= match i { 0 => 4, _ => 5 };
    }

    // truncate string with unused trailing symbols
    let mut end_pos = 13;
    while end_pos > 0 && s[end_pos - 1] == b'.' {
        end_pos -= 1;
    }
    s.truncate(end_pos);

    String::from_utf8(s).unwrap()  // safe unwrap
}


// -----------------------------------------------------------------------------
//     Conversion traits
// -----------------------------------------------------------------------------

impl TryFrom<&str> for Name {
    type Error = InvalidName;

    fn try_from(s: &str) -> Result<Name, InvalidName> {
        Name::new(s)
    }
}

impl From<u64> for Name {
    fn from(n: u64) -> Name {
        Name::from_u64(n)
    }
}


// -----------------------------------------------------------------------------
//     `Display` implementation
// -----------------------------------------------------------------------------

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", u64_to_string(self.value))
    }
}


// -----------------------------------------------------------------------------
//     `FromStr` implementation
// -----------------------------------------------------------------------------

impl FromStr for Name {
    type Err = InvalidName;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Name::new(s)
    }
}


// -----------------------------------------------------------------------------
//     `Serde` traits implementation
// -----------------------------------------------------------------------------

impl Serialize for Name {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.to_string().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Name {
    fn deserialize<D>(deserializer: D) -> Result<Name, D::Error>
    where
        D: Deserializer<'de>,
    {
        let name: &str = <&str>::deserialize(deserializer)?;
        Name::new(name).map_err(|e| de::Error::custom(e.to_string()))
    }
}


// =============================================================================
//
//     Unittests
//
// =============================================================================

#[cfg(test)]
mod tests {
    use color_eyre::eyre::Result;
    use super::*;

    #[test]
    fn simple_names() -> Result<()> {
        let n = Name::new("nico")?;
        assert_eq!(n.to_string(), "nico");

        let n2 = Name::new("eosio.token")?;
        assert_eq!(n2.to_string(), "eosio.token");
        assert_eq!(n2.as_u64(), 6138663591592764928);

        let n3 = Name::new("a.b.c.d.e")?;
        assert_eq!(n3.to_string(), "a.b.c.d.e");

        assert_eq!(Name::new("")?, Name::from_u64(0));

        Ok(())
    }

    #[test]
    fn invalid_names() {
        let names = [
            "abcDef",          // invalid chars
            "A",
            "á",
            "zzzzzzzzzzzzz",   // 13th char out of the 4-bit range
            "aaaaaaaaaaaaz",
            "............z",
        ];

        for n in names {
            assert!(Name::new(n).is_err(), "Name \"{}\" should fail constructing but does not", n);
        }
    }

    #[test]
    fn trailing_dots_are_trimmed() -> Result<()> {
        // trailing dots are lost in the round-trip, leading/inner ones are kept
        assert_eq!(Name::new("a.")?.to_string(), "a");
        assert_eq!(Name::new("....")?.to_string(), "");
        assert_eq!(Name::new(".a")?.to_string(), ".a");
        Ok(())
    }

    #[test]
    fn long_names_are_truncated() -> Result<()> {
        // characters past the 13th are ignored
        assert_eq!(Name::new("zzzzzzzzzzzzjzzzz")?, Name::new("zzzzzzzzzzzzj")?);
        assert_eq!(Name::new("zzzzzzzzzzzzj")?.as_u64(), u64::MAX);
        Ok(())
    }

    #[test]
    fn basic_functionality() {
        let name = Name::new("foobar").unwrap();
        let json = r#""foobar""#;

        assert_eq!(name, Name::from_u64(6712742083569909760));
        assert_eq!(name.as_u64(), 6712742083569909760);
        assert_eq!(name, Name::constant("foobar"));

        assert_eq!(serde_json::from_str::<Name>(json).unwrap(), name);
        assert_eq!(serde_json::to_string(&name).unwrap(), json);
    }
}
