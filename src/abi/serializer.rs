use std::collections::HashMap;

use serde::Deserialize;
use serde_json::{json, Map as JsonMap, Value as JsonValue};
use snafu::{ensure, ResultExt};
use strum::VariantNames;
use tracing::debug;

use crate::{
    ABISerializable, AntelopeType, AntelopeValue, ByteStream, Name, VarUint32,
    abi::definition::{check_abi_version, ABIDefinition, Field, Struct, Variant},
    abi::error::{
        ABIError, DecodeSnafu, DeserializeSnafu, EncodeSnafu, FieldOrderSnafu,
        IncompatibleVariantTypesSnafu, IntegritySnafu, JsonSnafu, MissingFieldSnafu,
        RecursionDepthSnafu, TrailingBytesSnafu, TrailingJsonSnafu, UnknownFieldSnafu,
        UnknownVariantSnafu, VariantConversionSnafu,
    },
    abi::typename::TypeName,
};

type Result<T, E = ABIError> = core::result::Result<T, E>;

/// Bound on nested type resolution; deeper structures (which in practice only
/// arise from pathological schemas) fail with [`ABIError::RecursionDepthError`].
const MAX_RECURSION_DEPTH: usize = 32;

/// A validated ABI schema, resolving type names to their definitions and
/// driving the conversion between JSON variants and the binary form.
#[derive(Default, Clone, Debug)]
pub struct ABI {
    typedefs: HashMap<String, String>,
    structs: HashMap<String, Struct>,
    actions: HashMap<Name, String>,
    tables: HashMap<Name, String>,
    variants: HashMap<String, Variant>,
}


impl ABI {
    pub fn new() -> Self {
        Self::default()
    }

    // -----------------------------------------------------------------------------
    //     Constructors and validation of ABI
    // -----------------------------------------------------------------------------

    pub fn from_definition(abi: &ABIDefinition) -> Result<Self> {
        let mut result = Self::new();
        result.set_abi(abi)?;
        Ok(result)
    }

    pub fn from_str(abi: &str) -> Result<Self> {
        Self::from_definition(&ABIDefinition::from_str(abi)?)
    }

    pub fn from_hex_abi(abi: &str) -> Result<Self> {
        Self::from_bin_abi(&hex::decode(abi)?)
    }

    pub fn from_bin_abi(abi: &[u8]) -> Result<Self> {
        let mut data = ByteStream::from(abi.to_owned());
        let abi_def = ABIDefinition::from_bin(&mut data)?;
        Self::from_definition(&abi_def)
    }

    fn set_abi(&mut self, abi: &ABIDefinition) -> Result<()> {
        check_abi_version(&abi.version)?;

        self.typedefs.clear();
        self.structs.clear();
        self.actions.clear();
        self.tables.clear();
        self.variants.clear();

        self.structs.extend(abi.structs.iter().map(|s| (s.name.clone(), s.clone())));
        self.variants.extend(abi.variants.iter().map(|v| (v.name.clone(), v.clone())));

        for td in &abi.types {
            // this also checks that we have no duplicates between the
            // previously defined structs/variants and the typedefs
            ensure!(!self.is_type(TypeName(&td.new_type_name)),
                    IntegritySnafu { message: format!("type already exists: {}",
                                                      td.new_type_name) });
            self.typedefs.insert(td.new_type_name.clone(), td.type_.clone());
        }

        self.actions.extend(abi.actions.iter()
                            .map(|a| (a.name, a.type_.clone())));
        self.tables.extend(abi.tables.iter()
                           .map(|t| (t.name, t.type_.clone())));

        // the ABIDefinition vectors may contain duplicates which would make it an invalid ABI
        ensure!(self.typedefs.len() == abi.types.len(),
                IntegritySnafu { message: "duplicate type definition detected" });
        ensure!(self.structs.len() == abi.structs.len(),
                IntegritySnafu { message: "duplicate struct definition detected" });
        ensure!(self.actions.len() == abi.actions.len(),
                IntegritySnafu { message: "duplicate action definition detected" });
        ensure!(self.tables.len() == abi.tables.len(),
                IntegritySnafu { message: "duplicate table definition detected" });
        ensure!(self.variants.len() == abi.variants.len(),
                IntegritySnafu { message: "duplicate variant definition detected" });

        self.validate()
    }

    /// Return whether the given type expression names a type known to this ABI.
    pub fn is_type(&self, t: TypeName) -> bool {
        let mut t = t;
        let mut ft = t.fundamental_type();
        while ft != t {
            t = ft;
            ft = t.fundamental_type();
        }

        AntelopeValue::VARIANTS.contains(&t.0)
            || (self.typedefs.contains_key(t.0) &&
                self.is_type(TypeName(self.typedefs.get(t.0).unwrap())))  // safe unwrap
            || self.structs.contains_key(t.0)
            || self.variants.contains_key(t.0)
    }

    /// Follow typedefs until a non-alias type is reached.
    pub fn resolve_type<'a>(&'a self, t: TypeName<'a>) -> TypeName<'a> {
        let mut rtype = t;
        loop {
            match self.typedefs.get(rtype.0) {
                Some(t) => rtype = TypeName(t),
                None => return rtype,
            }
        }
    }

    /// Return the type name associated with the given action, if any.
    pub fn action_type(&self, action: Name) -> Option<&str> {
        self.actions.get(&action).map(|s| s.as_str())
    }

    /// Return the type name associated with the given table, if any.
    pub fn table_type(&self, table: Name) -> Option<&str> {
        self.tables.get(&table).map(|s| s.as_str())
    }

    pub fn validate(&self) -> Result<()> {
        // check there are no circular references in the typedefs definition
        for t in &self.typedefs {
            let mut types_seen = vec![t.0, t.1];
            let mut itr = self.typedefs.get(&t.1[..]);
            while let Some(it) = itr {
                ensure!(!types_seen.contains(&it),
                        IntegritySnafu { message: format!("circular reference in type `{}`", t.0) });
                types_seen.push(it);
                itr = self.typedefs.get(it);
            }
        }

        // check all types used in typedefs are valid types
        for t in &self.typedefs {
            ensure!(!TypeName(t.1).has_bin_extension(),
                    IntegritySnafu { message: format!(
                        "binary extension designator not allowed in typedef `{}`", t.0) });
            ensure!(self.is_type(t.1.into()),
                    IntegritySnafu { message: format!("invalid type used in typedef `{}`", t.1) });
        }

        // check there are no circular references in the structs definition
        for s in self.structs.values() {
            if !s.base.is_empty() {
                let mut current = s;
                let mut types_seen = vec![&current.name];
                while !current.base.is_empty() {
                    ensure!(self.structs.contains_key(&current.base),
                            IntegritySnafu { message: format!("invalid type used in '{}::base': `{}`", &s.name, &current.base) });
                    let base = self.structs.get(&current.base).unwrap();  // safe unwrap
                    ensure!(!types_seen.contains(&&base.name),
                            IntegritySnafu { message: format!("circular reference in struct '{}'", &s.name) });
                    types_seen.push(&base.name);
                    current = base;
                }
            }

            // check all field types are valid types
            for field in &s.fields {
                ensure!(self.is_type(TypeName(&field.type_[..]).remove_bin_extension()),
                        IntegritySnafu { message: format!("invalid type used in field '{}::{}': `{}`",
                                                          &s.name, &field.name, &field.type_) });
            }
        }

        // base chains are known acyclic now, so the field lists can be flattened:
        // field names must be unique (inherited ones included) and binary
        // extension fields may only form a trailing run
        for s in self.structs.values() {
            let fields = self.struct_fields(s)?;
            let mut names: Vec<&str> = Vec::with_capacity(fields.len());
            let mut extension_seen = false;
            for field in fields {
                ensure!(!names.contains(&&field.name[..]),
                        IntegritySnafu { message: format!("duplicate field '{}' in struct '{}'",
                                                          &field.name, &s.name) });
                names.push(&field.name);

                if TypeName(&field.type_).has_bin_extension() {
                    extension_seen = true;
                }
                else {
                    ensure!(!extension_seen,
                            IntegritySnafu { message: format!(
                                "field '{}::{}' without binary extension designator follows one that has it",
                                &s.name, &field.name) });
                }
            }
        }

        // check all types from a variant are valid types, and option names unique
        for v in self.variants.values() {
            for t in &v.types {
                ensure!(!TypeName(t).has_bin_extension(),
                        IntegritySnafu { message: format!(
                            "binary extension designator not allowed in variant '{}'", v.name) });
                ensure!(self.is_type(t.into()),
                        IntegritySnafu { message: format!("invalid type `{}` used in variant '{}'",
                                                          t, v.name) });
            }
            for (i, t) in v.types.iter().enumerate() {
                ensure!(!v.types[..i].contains(t),
                        IntegritySnafu { message: format!("duplicate type `{}` in variant '{}'",
                                                          t, v.name) });
            }
        }

        // check all actions are valid types
        for (name, type_) in &self.actions {
            ensure!(self.is_type(type_.into()),
                    IntegritySnafu { message: format!("invalid type `{}` used in action '{}'",
                                                      type_, name) });
        }

        // check all tables are valid types
        for (name, type_) in &self.tables {
            ensure!(self.is_type(type_.into()),
                    IntegritySnafu { message: format!("invalid type `{}` used in table '{}'",
                                                      type_, name) });
        }

        Ok(())
    }

    /// Return the fields of a struct with its base chain flattened, base
    /// fields first in declaration order.
    fn struct_fields<'a>(&'a self, struct_def: &'a Struct) -> Result<Vec<&'a Field>> {
        let mut chain = vec![struct_def];
        let mut current = struct_def;
        while !current.base.is_empty() {
            current = self.structs.get(&current.base)
                .ok_or_else(|| IntegritySnafu { message: format!(
                    "invalid type used in '{}::base': `{}`", current.name, current.base) }.build())?;
            ensure!(chain.len() <= MAX_RECURSION_DEPTH,
                    RecursionDepthSnafu { typename: &struct_def.name });
            chain.push(current);
        }
        Ok(chain.iter().rev().flat_map(|s| s.fields.iter()).collect())
    }


    // -----------------------------------------------------------------------------
    //     Encoding of JSON variant -> binary
    // -----------------------------------------------------------------------------

    /// Encode a JSON variant to its binary form; struct fields must appear in
    /// their declared order.
    pub fn variant_to_binary<'a, T>(&self, typename: T, obj: &JsonValue) -> Result<Vec<u8>>
    where
        T: Into<TypeName<'a>>,
    {
        let mut ds = ByteStream::new();
        self.encode_variant(&mut ds, typename.into(), obj)?;
        Ok(ds.into_bytes())
    }

    /// Same as [`Self::variant_to_binary`] but with struct fields looked up by
    /// name, in any order.
    pub fn variant_to_binary_reorderable<'a, T>(&self, typename: T, obj: &JsonValue) -> Result<Vec<u8>>
    where
        T: Into<TypeName<'a>>,
    {
        let mut ds = ByteStream::new();
        self.encode_variant_reorderable(&mut ds, typename.into(), obj)?;
        Ok(ds.into_bytes())
    }

    #[inline]
    pub fn encode<T: ABISerializable>(&self, stream: &mut ByteStream, obj: &T) {
        obj.to_bin(stream)
    }

    #[inline]
    pub fn encode_variant<'a, T>(&self, ds: &mut ByteStream, typename: T, object: &JsonValue)
                                 -> Result<()>
    where
        T: Into<TypeName<'a>>,
    {
        self.encode_variant_(ds, typename.into(), object, 0, true, true)
    }

    #[inline]
    pub fn encode_variant_reorderable<'a, T>(&self, ds: &mut ByteStream, typename: T, object: &JsonValue)
                                             -> Result<()>
    where
        T: Into<TypeName<'a>>,
    {
        self.encode_variant_(ds, typename.into(), object, 0, true, false)
    }

    fn encode_variant_(&self, ds: &mut ByteStream, typename: TypeName, object: &JsonValue,
                       depth: usize, allow_ext: bool, ordered: bool)
                       -> Result<()> {
        ensure!(depth <= MAX_RECURSION_DEPTH, RecursionDepthSnafu { typename: typename.0 });

        let rtype = self.resolve_type(typename);
        let ftype = rtype.fundamental_type();

        debug!(rtype = rtype.0, ftype = ftype.0, "encoding variant");

        // use a closure to avoid cloning and copying if no error occurs
        let incompatible_types = || { IncompatibleVariantTypesSnafu {
            typename: rtype.0.to_owned(),
            value: Box::new(object.clone())
        }.build() };

        if AntelopeValue::VARIANTS.contains(&ftype.0) {
            // if our fundamental type is a builtin type, we can serialize it
            // directly to the stream
            let inner_type: AntelopeType = ftype.try_into().unwrap();  // safe unwrap
            if rtype.is_array() {
                let a = object.as_array().ok_or_else(incompatible_types)?;
                VarUint32::from(a.len()).to_bin(ds);
                for v in a {
                    AntelopeValue::from_variant(inner_type, v)
                        .with_context(|_| VariantConversionSnafu { v: v.clone() })?
                        .to_bin(ds);
                }
            }
            else if rtype.is_optional() {
                match !object.is_null() {
                    true => {
                        true.to_bin(ds);
                        AntelopeValue::from_variant(inner_type, object)
                            .with_context(|_| VariantConversionSnafu { v: object.clone() })?
                            .to_bin(ds);
                    },
                    false => false.to_bin(ds),
                }
            }
            else {
                AntelopeValue::from_variant(inner_type, object)
                    .with_context(|_| VariantConversionSnafu { v: object.clone() })?
                    .to_bin(ds);
            }
        }
        else {
            // not a builtin type, we have to recurse down

            if rtype.is_array() {
                let a = object.as_array().ok_or_else(incompatible_types)?;
                VarUint32::from(a.len()).to_bin(ds);
                for v in a {
                    self.encode_variant_(ds, ftype, v, depth + 1, false, ordered)?;
                }
            }
            else if rtype.is_optional() {
                match !object.is_null() {
                    true => {
                        true.to_bin(ds);
                        self.encode_variant_(ds, ftype, object, depth + 1, allow_ext, ordered)?;
                    },
                    false => false.to_bin(ds),
                }
            }
            else if let Some(variant_def) = self.variants.get(rtype.0) {
                ensure!(object.is_array() && object.as_array().unwrap().len() == 2,
                        EncodeSnafu {
                            message: format!("expected input to be an array of 2 elements while processing variant: {}",
                                             &object)
                        });
                ensure!(object[0].is_string(),
                        EncodeSnafu {
                            message: format!("expected variant typename to be a string: {}",
                                             object[0])
                        });
                let variant_type = TypeName(object[0].as_str().unwrap());
                if let Some(vpos) = variant_def.types.iter().position(|v| v == variant_type.0) {
                    VarUint32::from(vpos).to_bin(ds);
                    self.encode_variant_(ds, variant_type, &object[1], depth + 1, allow_ext, ordered)?;
                }
                else {
                    UnknownVariantSnafu { variant_type: variant_type.0, typename: rtype.0 }.fail()?;
                }
            }
            else if let Some(struct_def) = self.structs.get(rtype.0) {
                self.encode_struct(ds, struct_def, object, depth, allow_ext, ordered)?;
            }
            else {
                EncodeSnafu { message: format!("do not know how to serialize type: `{}`", rtype) }.fail()?;
            }
        }

        Ok(())
    }

    fn encode_struct(&self, ds: &mut ByteStream, struct_def: &Struct, object: &JsonValue,
                     depth: usize, allow_ext: bool, ordered: bool)
                     -> Result<()> {
        let obj = object.as_object()
            .ok_or_else(|| EncodeSnafu { message: format!(
                "unexpected input while encoding struct '{}': {}",
                struct_def.name, object) }.build())?;

        let fields = self.struct_fields(struct_def)?;
        let nfields = fields.len();

        if ordered {
            // walk the declared fields and the object entries in lockstep
            let mut entries = obj.iter();
            for (i, field) in fields.iter().enumerate() {
                let ftype = TypeName(&field.type_);
                match entries.next() {
                    Some((key, value)) => {
                        if key != &field.name {
                            ensure!(fields.iter().any(|f| f.name == *key),
                                    UnknownFieldSnafu { field: key, struct_name: &struct_def.name });
                            FieldOrderSnafu { expected: &field.name, found: key,
                                              struct_name: &struct_def.name }.fail()?;
                        }
                        self.encode_variant_(ds, ftype.remove_bin_extension(), value,
                                             depth + 1, allow_ext && i == nfields - 1, ordered)?;
                    },
                    None => {
                        // the object may only end early at a trailing run of
                        // extension fields, and only in tail position
                        ensure!(ftype.has_bin_extension() && allow_ext,
                                MissingFieldSnafu { field: &field.name, struct_name: &struct_def.name });
                        break;
                    },
                }
            }
            if let Some((key, _)) = entries.next() {
                UnknownFieldSnafu { field: key, struct_name: &struct_def.name }.fail()?;
            }
        }
        else {
            // look up fields by name, in any order
            let mut allow_additional_fields = true;
            for (i, field) in fields.iter().enumerate() {
                let ftype = TypeName(&field.type_);
                match obj.get(&field.name) {
                    Some(value) => {
                        ensure!(allow_additional_fields,
                                EncodeSnafu { message: format!(
                                    "unexpected field '{}' found in input object while processing struct '{}'",
                                    &field.name, &struct_def.name) });
                        self.encode_variant_(ds, ftype.remove_bin_extension(), value,
                                             depth + 1, allow_ext && i == nfields - 1, ordered)?;
                    },
                    None if ftype.has_bin_extension() && allow_ext => {
                        allow_additional_fields = false;
                    },
                    None => {
                        MissingFieldSnafu { field: &field.name, struct_name: &struct_def.name }.fail()?;
                    },
                }
            }
            for key in obj.keys() {
                ensure!(fields.iter().any(|f| &f.name == key),
                        UnknownFieldSnafu { field: key, struct_name: &struct_def.name });
            }
        }

        Ok(())
    }


    // -----------------------------------------------------------------------------
    //     Decoding of binary data -> JSON variant
    // -----------------------------------------------------------------------------

    /// Decode a whole buffer into a JSON variant of the given type; trailing
    /// bytes after the root value are an error.
    pub fn binary_to_variant<'a, T>(&self, typename: T, bytes: Vec<u8>) -> Result<JsonValue>
    where
        T: Into<TypeName<'a>>,
    {
        let mut ds = ByteStream::from(bytes);
        let value = self.decode_variant_(&mut ds, typename.into(), 0)?;
        ensure!(ds.leftover().is_empty(),
                TrailingBytesSnafu { remaining: ds.leftover().len() });
        Ok(value)
    }

    #[inline]
    pub fn decode_variant<'a, T>(&self, ds: &mut ByteStream, typename: T) -> Result<JsonValue>
    where
        T: Into<TypeName<'a>>,
    {
        self.decode_variant_(ds, typename.into(), 0)
    }

    #[allow(clippy::collapsible_else_if)]
    fn decode_variant_(&self, ds: &mut ByteStream, typename: TypeName, depth: usize) -> Result<JsonValue> {
        ensure!(depth <= MAX_RECURSION_DEPTH, RecursionDepthSnafu { typename: typename.0 });

        let rtype = self.resolve_type(typename);
        let ftype = rtype.fundamental_type();

        Ok(if AntelopeValue::VARIANTS.contains(&ftype.0) {
            let type_ = ftype.try_into().unwrap();  // safe unwrap

            // if our fundamental type is a builtin type, we can deserialize it
            // directly from the stream
            if rtype.is_array() {
                let item_count = decode_usize(ds, "item_count (as varuint32)")?;
                debug!(r#"reading array of {item_count} elements of type "{ftype}""#);
                // limit the maximum size that can be reserved before data is read
                let initial_capacity = item_count.min(1024);
                let mut a = Vec::with_capacity(initial_capacity);
                for _ in 0..item_count {
                    a.push(read_value(ds, type_, "array item")?);
                }
                JsonValue::Array(a)
            }
            else if rtype.is_optional() {
                let non_null = bool::from_bin(ds)
                    .context(DeserializeSnafu { what: "optional discriminant" })?;
                match non_null {
                    true => read_value(ds, type_, "optional value")?,
                    false => JsonValue::Null,
                }
            }
            else {
                read_value(ds, type_, "single built-in value")?
            }
        }
        else {
            if rtype.is_array() {
                // not a builtin type, we have to recurse down
                let item_count = decode_usize(ds, "item_count (as varuint32)")?;
                debug!(r#"reading array of {item_count} elements of type "{ftype}""#);
                let initial_capacity = item_count.min(1024);
                let mut a = Vec::with_capacity(initial_capacity);
                for _ in 0..item_count {
                    a.push(self.decode_variant_(ds, ftype, depth + 1)?);
                }
                JsonValue::Array(a)
            }
            else if rtype.is_optional() {
                let non_null = bool::from_bin(ds)
                    .context(DeserializeSnafu { what: "optional discriminant" })?;
                match non_null {
                    true => self.decode_variant_(ds, ftype, depth + 1)?,
                    false => JsonValue::Null,
                }
            }
            else if let Some(variant_def) = self.variants.get(rtype.0) {
                let variant_tag: usize = decode_usize(ds, "variant tag (as varuint32)")?;
                ensure!(variant_tag < variant_def.types.len(),
                        DecodeSnafu { message: format!("deserialized invalid tag {} for variant {}",
                                                       variant_tag, rtype)
                        });
                let variant_type = TypeName(&variant_def.types[variant_tag]);
                json!([variant_type.0, self.decode_variant_(ds, variant_type, depth + 1)?])
            }
            else if let Some(struct_def) = self.structs.get(rtype.0) {
                self.decode_struct(ds, struct_def, depth)?
            }
            else {
                DecodeSnafu { message: format!("do not know how to deserialize type: {}", rtype) }.fail()?
            }
        })
    }

    fn decode_struct(&self, ds: &mut ByteStream, struct_def: &Struct, depth: usize) -> Result<JsonValue> {
        debug!(r#"reading struct with name "{}" and base "{}""#, struct_def.name, struct_def.base);

        let mut result: JsonMap<String, JsonValue> = JsonMap::new();

        let fields = self.struct_fields(struct_def)?;
        for field in fields {
            let fname = &field.name;
            let ftype = TypeName(&field.type_);
            if ds.leftover().is_empty() {
                // a buffer ending exactly where the trailing extension fields
                // begin is valid, those fields are simply left out
                if ftype.has_bin_extension() {
                    continue;
                }
                DecodeSnafu { message: format!(
                    "stream ended unexpectedly; unable to unpack field '{}' of struct '{}'",
                    fname, struct_def.name) }.fail()?
            }

            let value = self.decode_variant_(ds, ftype.remove_bin_extension(), depth + 1)?;
            debug!(r#"decoded field '{fname}' with type `{ftype}`: {value}"#);
            result.insert(fname.to_string(), value);
        }

        Ok(JsonValue::Object(result))
    }
}

/// Parse a JSON document into a variant, rejecting trailing tokens after the
/// root value.
pub fn variant_from_str(s: &str) -> Result<JsonValue> {
    let mut de = serde_json::Deserializer::from_str(s);
    let value = JsonValue::deserialize(&mut de).context(JsonSnafu)?;
    de.end().context(TrailingJsonSnafu)?;
    Ok(value)
}

fn read_value(stream: &mut ByteStream, type_: AntelopeType, what: &str) -> Result<JsonValue> {
    Ok(AntelopeValue::from_bin(type_, stream)
       .context(DeserializeSnafu { what })?.to_variant())
}

fn decode_usize(stream: &mut ByteStream, what: &str) -> Result<usize> {
    let n = VarUint32::from_bin(stream).context(DeserializeSnafu { what })?;
    Ok(n.into())
}
