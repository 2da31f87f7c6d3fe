use hex::FromHexError;
use serde_json::{
    Error as JsonError,
    Value as JsonValue,
};
use snafu::Snafu;

use crate::{impl_auto_error_conversion, InvalidName, InvalidValue, Name, SerializeError};

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum ABIError {
    #[snafu(display("cannot deserialize {what} from stream"))]
    DeserializeError { what: String, source: SerializeError },

    #[snafu(display(r#"unsupported ABI version: "{version}""#))]
    VersionError { version: String },

    #[snafu(display("integrity error: {message}"))]
    IntegrityError { message: String },

    #[snafu(display("encode error: {message}"))]
    EncodeError { message: String },

    #[snafu(display("decode error: {message}"))]
    DecodeError { message: String },

    #[snafu(display(r#"expected field '{expected}' but found '{found}' while processing struct '{struct_name}'"#))]
    FieldOrderError { expected: String, found: String, struct_name: String },

    #[snafu(display(r#"unknown field '{field}' in input object while processing struct '{struct_name}'"#))]
    UnknownFieldError { field: String, struct_name: String },

    #[snafu(display(r#"missing field '{field}' in input object while processing struct '{struct_name}'"#))]
    MissingFieldError { field: String, struct_name: String },

    #[snafu(display(r#"specified type `{variant_type}` is not valid within the variant '{typename}'"#))]
    UnknownVariantError { variant_type: String, typename: String },

    #[snafu(display("{remaining} trailing byte(s) remaining in stream after decoding"))]
    TrailingBytesError { remaining: usize },

    #[snafu(display("unexpected trailing characters after JSON value"))]
    TrailingJsonError { source: JsonError },

    #[snafu(display("max recursion depth reached while processing type `{typename}`"))]
    RecursionDepthError { typename: String },

    #[snafu(display("cannot deserialize ABIDefinition from JSON"))]
    JsonError { source: JsonError },

    #[snafu(display("cannot decode hex representation for hex ABI"))]
    HexABIError { source: FromHexError },

    #[snafu(display("invalid name"))]
    NameError { source: InvalidName },

    #[snafu(display(r#"contract "{contract}" is not loaded"#))]
    UnknownContractError { contract: Name },

    #[snafu(display(r#"contract "{contract}" does not have action "{action}""#))]
    UnknownActionError { contract: Name, action: Name },

    #[snafu(display(r#"contract "{contract}" does not have table "{table}""#))]
    UnknownTableError { contract: Name, table: Name },

    #[snafu(display("cannot convert variant to a built-in value: {v}"))]
    VariantConversionError { v: Box<JsonValue>, source: InvalidValue },

    #[snafu(display(r#"cannot convert given variant {value} to ABI type "{typename}""#))]
    IncompatibleVariantTypes {
        typename: String,
        value: Box<JsonValue>,
    },
}

impl_auto_error_conversion!(FromHexError, ABIError, HexABISnafu);
impl_auto_error_conversion!(JsonError, ABIError, JsonSnafu);
