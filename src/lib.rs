//!
//! This library converts contract data between three representations driven
//! by a per-contract **ABI** schema: canonical little-endian binary, JSON
//! text, and hex.
//!
//! The basic types can be found in the [`types`] module, and the variant type
//! used to represent any built-in value is [`AntelopeValue`].
//!
//! # Data model
//!
//! Data handled by this library exists in a few formats:
//!  - Rust native data types (structs defined in this library)
//!  - JSON value (`serde_json::Value`, also called variant)
//!  - JSON string representation
//!  - binary data (and its hex string form)
//!
//! Conversions between them:
//!  - most conversions to/from JSON are handled via the `serde::Serialize`
//!    and `serde::Deserialize` traits.
//!  - to convert between a JSON value and a binary stream you need an
//!    instance of the [`ABI`] class which has been initialized with a data
//!    schema ([`ABIDefinition`]).
//!  - to convert between a Rust native value and a binary stream you use the
//!    [`ABISerializable`] trait.
//!
//! The usual entry point is a [`Context`]: it owns the loaded ABIs (keyed by
//! contract [`Name`]) along with the result and error buffers of the last
//! conversion, mirroring the C-style boundary this library is meant to back.
//!
//! ```
//! use abiconv::{Context, Name};
//!
//! let mut ctx = Context::new();
//! let token = Name::constant("eosio.token");
//! assert!(ctx.load_abi_hex(token, abiconv::abi::data::TOKEN_HEX_ABI));
//!
//! assert!(ctx.json_to_bin(token, "transfer",
//!     r#"{"from":"useraaaaaaaa","to":"useraaaaaaab","quantity":"0.0001 SYS","memo":""}"#));
//! assert_eq!(&ctx.bin_hex()[..16], "608C31C6187315D6");
//! ```
//!
//! # Feature flags
//!
//! - `cli`: whether to compile the command-line tools alongside the library.
//!          This feature is enabled by default and installs the
//!          `abi_json_to_hex` and `abi_hex_to_json` tools.
//!
//! # Differences with the C++ `abieos` library
//!
//!  - errors are explicit `Result` values all the way through the conversion
//!    pipeline instead of thrown exceptions; the [`Context`] façade converts
//!    them into the `(sentinel, last_error)` pair at the boundary
//!  - JSON input is parsed into a tree before encoding on both conversion
//!    paths; the strict path still enforces declared field order


// disable this lint to allow our types to implement a `from_str` constructor
// without implement the `std::str::FromStr` trait
// if we didn't, we would have to import that trait everywhere we want to build
// our types, which wouldn't be very convenient and isn't very discoverable
#![allow(clippy::should_implement_trait)]

pub mod abi;
pub mod config;
pub mod context;
pub mod convert;
pub mod error;
pub mod json;
pub mod types;

pub use serde_json::{
    json,
    Error as JsonError,
    Map as JsonMap,
    Value as JsonValue,
};

pub use types::*;

pub use abi::{ABI, ABIDefinition, ABIError, TypeName, abi_schema};
pub use context::Context;

pub mod abiserializable;
pub mod bytestream;

pub use abiserializable::{from_bin, to_bin, to_hex, ABISerializable, SerializeError};
pub use bytestream::{ByteStream, StreamError};
