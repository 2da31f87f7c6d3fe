//!
//! This module provides tools to encode/decode values into/from the binary
//! form described by an ABI.
//!

mod definition;
mod error;
mod serializer;
mod typename;
pub mod data;

pub use definition::{
    abi_schema, check_abi_version, ABIDefinition, Action, AbiExtension, ClausePair,
    ErrorMessage, Field, Struct, Table, TypeDef, Variant,
};
pub use error::ABIError;
pub use serializer::{variant_from_str, ABI};
pub use typename::TypeName;
