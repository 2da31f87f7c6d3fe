use std::sync::OnceLock;

use serde::{Deserialize, Serialize};
use serde_json::json;
use snafu::{ensure, ResultExt};

use crate::{
    ABISerializable, ActionName, Bytes, ByteStream, JsonValue, TableName,
    abi::data::ABI_SCHEMA,
    abi::error::{ABIError, DecodeSnafu, DeserializeSnafu, JsonSnafu, VersionSnafu},
    abi::serializer::ABI,
};

// see doc at: https://docs.eosnetwork.com/docs/latest/advanced-topics/understanding-ABI-files/
//
// C++ reference implementation is at:
// https://github.com/AntelopeIO/spring/blob/main/libraries/chain/include/eosio/chain/abi_def.hpp

type Result<T, E = ABIError> = core::result::Result<T, E>;

pub type TypeName = String;
pub type FieldName = String;


#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct TypeDef {
    pub new_type_name: TypeName,

    #[serde(rename = "type")]
    pub type_: TypeName,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub name: FieldName,
    #[serde(rename = "type")]
    pub type_: TypeName,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Struct {
    pub name: TypeName,
    #[serde(default)]
    pub base: TypeName,
    pub fields: Vec<Field>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Action {
    pub name: ActionName,
    #[serde(rename = "type")]
    pub type_: TypeName,
    #[serde(default)]
    pub ricardian_contract: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Table {
    pub name: TableName,
    #[serde(default)]
    pub index_type: TypeName,
    #[serde(default)]
    pub key_names: Vec<FieldName>,
    #[serde(default)]
    pub key_types: Vec<TypeName>,
    #[serde(rename = "type")]
    pub type_: TypeName,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ClausePair {
    pub id: String,
    pub body: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ErrorMessage {
    pub error_code: u64,
    pub error_msg: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct AbiExtension {
    #[serde(rename = "type")]
    pub type_: u16,
    pub data: Bytes,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Variant {
    pub name: TypeName,
    #[serde(default)]
    pub types: Vec<TypeName>,
}

/// In-memory form of an ABI definition document.
///
/// The binary form of such a document is itself an ABI-encoded value of the
/// bootstrap schema (see [`abi_schema`]); the `variants` field was added to
/// the format later and travels as a binary extension, so binary documents
/// ending right before it still load.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ABIDefinition {
    pub version: String,
    #[serde(default)]
    pub types: Vec<TypeDef>,
    #[serde(default)]
    pub structs: Vec<Struct>,
    #[serde(default)]
    pub actions: Vec<Action>,
    #[serde(default)]
    pub tables: Vec<Table>,
    #[serde(default)]
    pub ricardian_clauses: Vec<ClausePair>,
    #[serde(default)]
    pub error_messages: Vec<ErrorMessage>,
    #[serde(default)]
    pub abi_extensions: Vec<AbiExtension>,
    #[serde(default)]
    pub variants: Vec<Variant>,
}


/// Check that a version string declares a supported ABI revision, ie. matches
/// `eosio::abi/1.<minor>`.
pub fn check_abi_version(version: &str) -> Result<()> {
    let minor = version.strip_prefix("eosio::abi/1.");
    ensure!(minor.is_some_and(|m| !m.is_empty() && m.bytes().all(|b| b.is_ascii_digit())),
            VersionSnafu { version });
    Ok(())
}

impl ABIDefinition {
    pub fn from_str(s: &str) -> Result<Self> {
        let abi: Self = serde_json::from_str(s).context(JsonSnafu)?;
        check_abi_version(&abi.version)?;
        Ok(abi)
    }

    pub fn from_variant(v: &JsonValue) -> Result<Self> {
        ABIDefinition::from_str(&v.to_string())
    }

    pub fn from_bin(data: &mut ByteStream) -> Result<Self> {
        // the version string is read with the plain string decoder before
        // anything else so that it can be validated up front
        let version = String::from_bin(data).context(DeserializeSnafu { what: "version" })?;

        check_abi_version(&version)?;

        let parser = bin_abi_parser();
        let abi = json!({
            "version":  version,
            "types":    parser.decode_variant(data, "typedef[]")?,
            "structs":  parser.decode_variant(data, "struct[]")?,
            "actions":  parser.decode_variant(data, "action[]")?,
            "tables":   parser.decode_variant(data, "table[]")?,
            "ricardian_clauses": parser.decode_variant(data, "ricardian_clause[]")?,
            "error_messages":    parser.decode_variant(data, "error_message[]")?,
            "abi_extensions":    parser.decode_variant(data, "abi_extension[]")?,
            "variants": if !data.leftover().is_empty() {
                parser.decode_variant(data, "variant[]")?
            } else { json!([]) },
        });

        ensure!(data.leftover().is_empty(), DecodeSnafu {
            message: format!("unexpected trailing bytes in binary ABI: {} remaining",
                             data.leftover().len())
        });

        Self::from_variant(&abi)
    }

    pub fn to_bin(&self, stream: &mut ByteStream) -> Result<()> {
        let parser = bin_abi_parser();
        self.version.to_bin(stream);
        parser.encode_variant(stream, "typedef[]", &json!(self.types))?;
        parser.encode_variant(stream, "struct[]", &json!(self.structs))?;
        parser.encode_variant(stream, "action[]", &json!(self.actions))?;
        parser.encode_variant(stream, "table[]", &json!(self.tables))?;
        parser.encode_variant(stream, "ricardian_clause[]", &json!(self.ricardian_clauses))?;
        parser.encode_variant(stream, "error_message[]", &json!(self.error_messages))?;
        parser.encode_variant(stream, "abi_extension[]", &json!(self.abi_extensions))?;
        parser.encode_variant(stream, "variant[]", &json!(self.variants))?;

        Ok(())
    }
}

impl Default for ABIDefinition {
    fn default() -> ABIDefinition {
        ABIDefinition {
            version: "eosio::abi/1.1".to_owned(),
            types: vec![],
            structs: vec![],
            actions: vec![],
            tables: vec![],
            ricardian_clauses: vec![],
            error_messages: vec![],
            abi_extensions: vec![],
            variants: vec![],
        }
    }
}


/// The schema of ABI definition documents themselves.
pub fn abi_schema() -> &'static ABIDefinition {
    static ABI_SCHEMA_ONCE: OnceLock<ABIDefinition> = OnceLock::new();
    ABI_SCHEMA_ONCE.get_or_init(|| { ABIDefinition::from_str(ABI_SCHEMA).unwrap() })
}

fn bin_abi_parser() -> &'static ABI {
    static BIN_ABI_PARSER: OnceLock<ABI> = OnceLock::new();
    BIN_ABI_PARSER.get_or_init(|| {
        ABI::from_definition(abi_schema()).unwrap()  // safe unwrap
    })
}
