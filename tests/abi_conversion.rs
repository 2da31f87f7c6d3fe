use std::sync::{Once, OnceLock};

use color_eyre::eyre::Result;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use abiconv::{
    abi::data::TOKEN_HEX_ABI,
    abi::variant_from_str,
    ABI, ABIDefinition, ByteStream, JsonValue,
};

// =============================================================================
//
// The round-trip vectors in this file come mainly from
// https://github.com/AntelopeIO/abieos/blob/main/src/test.cpp
//
// Every check does a full JSON -> variant -> bin -> variant -> JSON cycle.
//
// =============================================================================

static TRACING_INIT: Once = Once::new();

fn init() {
    TRACING_INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .init();
    });
}

static TEST_ABI: &str = r#"{
    "version": "eosio::abi/1.1",
    "types": [
        { "new_type_name": "my_int", "type": "uint32" },
        { "new_type_name": "i", "type": "int32" },
        { "new_type_name": "s", "type": "string" }
    ],
    "structs": [
        {
            "name": "pair",
            "base": "",
            "fields": [
                { "name": "first", "type": "int8" },
                { "name": "second", "type": "int8" }
            ]
        },
        {
            "name": "with_opt",
            "base": "",
            "fields": [
                { "name": "first", "type": "int8" },
                { "name": "opt", "type": "int8?" }
            ]
        },
        {
            "name": "simple",
            "base": "",
            "fields": [
                { "name": "a", "type": "my_int" },
                { "name": "b", "type": "string$" }
            ]
        },
        {
            "name": "base",
            "base": "",
            "fields": [
                { "name": "x", "type": "int8" }
            ]
        },
        {
            "name": "derived",
            "base": "base",
            "fields": [
                { "name": "y", "type": "string" }
            ]
        },
        {
            "name": "ext",
            "base": "",
            "fields": [
                { "name": "a", "type": "int8" },
                { "name": "b", "type": "int8$" },
                { "name": "c", "type": "int8$" }
            ]
        },
        {
            "name": "node",
            "base": "",
            "fields": [
                { "name": "next", "type": "node?" }
            ]
        }
    ],
    "variants": [
        { "name": "v1", "types": ["i", "s"] }
    ]
}"#;

fn test_abi() -> &'static ABI {
    static ABI_ONCE: OnceLock<ABI> = OnceLock::new();
    ABI_ONCE.get_or_init(|| ABI::from_str(TEST_ABI).unwrap())
}

fn builtin_abi() -> &'static ABI {
    // all built-in types are usable without any schema loaded
    static ABI_ONCE: OnceLock<ABI> = OnceLock::new();
    ABI_ONCE.get_or_init(ABI::new)
}


// =============================================================================
//
//     Helper functions
//
// =============================================================================

fn try_encode(abi: &ABI, typename: &str, data: &str) -> Result<Vec<u8>> {
    let value: JsonValue = variant_from_str(data)?;
    Ok(abi.variant_to_binary(typename, &value)?)
}

fn try_encode_reorderable(abi: &ABI, typename: &str, data: &str) -> Result<Vec<u8>> {
    let value: JsonValue = variant_from_str(data)?;
    Ok(abi.variant_to_binary_reorderable(typename, &value)?)
}

fn try_decode<T: AsRef<[u8]>>(abi: &ABI, typename: &str, hex_data: T) -> Result<JsonValue> {
    Ok(abi.binary_to_variant(typename, hex::decode(hex_data)?)?)
}

/// check roundtrip JSON -> variant -> bin -> variant -> JSON, where the
/// decoded JSON may differ from the input (eg. canonical forms)
#[track_caller]
fn check_round_trip2(abi: &ABI, typename: &str, data: &str, hex: &str, expected: &str) {
    debug!(r#"==== round-tripping type "{typename}" with value {data}"#);

    let bin = try_encode(abi, typename, data).unwrap();
    assert_eq!(hex::encode_upper(&bin), hex, "variant to binary");

    let decoded = try_decode(abi, typename, hex).unwrap();
    let repr = abiconv::json::to_string(&decoded).unwrap();
    assert_eq!(repr, expected, "variant to JSON");
}

/// check roundtrip JSON -> variant -> bin -> variant -> JSON
#[track_caller]
fn check_round_trip(abi: &ABI, typename: &str, data: &str, hex: &str) {
    check_round_trip2(abi, typename, data, hex, data)
}

#[track_caller]
fn check_error<F, T>(f: F, expected_error_msg: &str)
where
    F: FnOnce() -> Result<T>,
{
    match f() {
        Ok(_) => {
            panic!(r#"expected error with message "{}" but everything went fine..."#,
                   expected_error_msg);
        },
        Err(e) => {
            let received_msg = format!("{:?}", e);
            if !received_msg.contains(expected_error_msg) {
                eprintln!("{:?}\n", e);
                panic!(r#"expected error message with "{}", got: {}"#,
                       expected_error_msg, received_msg);
            }
        },
    }
}


// =============================================================================
//
//     ABI loading
//
// =============================================================================

#[test]
fn load_abi() -> Result<()> {
    init();

    let _token_abi = ABI::from_hex_abi(TOKEN_HEX_ABI)?;
    let _test_abi = ABI::from_str(TEST_ABI)?;

    fn str_to_hex(s: &str) -> String {
        format!("{:02x}{}", s.len(), hex::encode(s.as_bytes()))
    }

    check_error(|| Ok(ABIDefinition::from_str("")?), "cannot deserialize ABIDefinition");
    check_error(|| Ok(ABI::from_hex_abi("")?), "stream ended");
    check_error(|| Ok(ABI::from_hex_abi("00")?), "unsupported ABI version");
    check_error(|| Ok(ABI::from_hex_abi(&str_to_hex("eosio::abi/9.0"))?), "unsupported ABI version");
    check_error(|| Ok(ABI::from_hex_abi(&str_to_hex("eosio::abi/1.0"))?), "stream ended");
    check_error(|| Ok(ABI::from_hex_abi(&str_to_hex("eosio::abi/1.1"))?), "stream ended");

    Ok(())
}

#[test]
fn abi_definition_binary_round_trip() -> Result<()> {
    init();

    let abi_def = ABIDefinition::from_str(TEST_ABI)?;

    let mut ds = ByteStream::new();
    abi_def.to_bin(&mut ds)?;

    let mut ds2 = ByteStream::from(ds.into_bytes());
    let reloaded = ABIDefinition::from_bin(&mut ds2)?;
    assert_eq!(reloaded, abi_def);

    Ok(())
}

#[test]
fn token_abi_content() -> Result<()> {
    init();

    let mut data = ByteStream::from(hex::decode(TOKEN_HEX_ABI)?);
    let token = ABIDefinition::from_bin(&mut data)?;

    assert_eq!(token.version, "eosio::abi/1.0");
    assert_eq!(token.types[0].new_type_name, "account_name");
    assert_eq!(token.structs.len(), 5);
    assert_eq!(token.actions.len(), 3);
    assert_eq!(token.tables.len(), 2);
    // version 1.0 predates the variants extension field
    assert!(token.variants.is_empty());

    Ok(())
}


// =============================================================================
//
//     Round-trips of built-in types
//
// =============================================================================

#[test]
fn roundtrip_bool() -> Result<()> {
    init();

    let abi = builtin_abi();

    check_round_trip(abi, "bool", "true", "01");
    check_round_trip(abi, "bool", "false", "00");

    check_error(|| try_decode(abi, "bool", ""), "stream ended");
    check_error(|| try_encode(abi, "bool", ""), "cannot parse JSON string");
    check_error(|| try_encode(abi, "bool", "trues"), "cannot parse JSON string");
    check_error(|| try_encode(abi, "bool", "null"), "cannot convert given variant");
    check_error(|| try_encode(abi, "bool", r#""foo""#), "cannot convert given variant");

    Ok(())
}

#[test]
fn roundtrip_small_ints() -> Result<()> {
    init();

    let abi = builtin_abi();

    check_round_trip(abi, "int8", "0", "00");
    check_round_trip(abi, "int8", "127", "7F");
    check_round_trip(abi, "int8", "-128", "80");
    check_round_trip(abi, "uint8", "1", "01");
    check_round_trip(abi, "uint8", "255", "FF");

    check_round_trip(abi, "int16", "32767", "FF7F");
    check_round_trip(abi, "int16", "-32768", "0080");
    check_round_trip(abi, "uint16", "65535", "FFFF");

    check_round_trip(abi, "int32", "2147483647", "FFFFFF7F");
    check_round_trip(abi, "int32", "-2147483648", "00000080");
    check_round_trip(abi, "uint32", "4294967295", "FFFFFFFF");

    check_error(|| try_encode(abi, "int8", "128"), "integer out of range");
    check_error(|| try_encode(abi, "int8", "-129"), "integer out of range");
    check_error(|| try_encode(abi, "uint8", "-1"), "cannot convert given variant");
    check_error(|| try_encode(abi, "uint8", "256"), "integer out of range");
    check_error(|| try_decode(abi, "int16", "01"), "stream ended");

    Ok(())
}

#[test]
fn roundtrip_wide_ints() -> Result<()> {
    init();

    let abi = builtin_abi();

    // 64-bit and wider integers render as quoted strings, but both forms are
    // accepted on input
    check_round_trip(abi, "int64", r#""0""#, "0000000000000000");
    check_round_trip(abi, "int64", r#""-23""#, "E9FFFFFFFFFFFFFF");
    check_round_trip(abi, "int64", r#""9223372036854775807""#, "FFFFFFFFFFFFFF7F");
    check_round_trip(abi, "int64", r#""-9223372036854775808""#, "0000000000000080");
    check_round_trip2(abi, "int64", "-23", "E9FFFFFFFFFFFFFF", r#""-23""#);

    check_round_trip(abi, "uint64", r#""18446744073709551615""#, "FFFFFFFFFFFFFFFF");
    check_round_trip2(abi, "uint64", "18446744073709551615", "FFFFFFFFFFFFFFFF",
                      r#""18446744073709551615""#);

    check_round_trip(abi, "int128", r#""-1""#, "FFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFF");
    check_round_trip(abi, "int128", r#""-18446744073709551615""#, "0100000000000000FFFFFFFFFFFFFFFF");
    check_round_trip(abi, "int128", r#""170141183460469231731687303715884105727""#,
                     "FFFFFFFFFFFFFFFFFFFFFFFFFFFFFF7F");
    check_round_trip(abi, "uint128", r#""340282366920938463463374607431768211455""#,
                     "FFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFF");

    check_error(|| try_encode(abi, "int64", r#""9223372036854775808""#), "number too large");
    check_error(|| try_encode(abi, "uint64", r#""-1""#), "invalid digit");
    check_error(|| try_encode(abi, "uint128", r#""340282366920938463463374607431768211456""#),
                "number too large");
    check_error(|| try_encode(abi, "uint128", r#""true""#), "invalid integer");

    Ok(())
}

#[test]
fn roundtrip_varints() -> Result<()> {
    init();

    let abi = builtin_abi();

    check_round_trip(abi, "varuint32", "0", "00");
    check_round_trip(abi, "varuint32", "127", "7F");
    check_round_trip(abi, "varuint32", "128", "8001");
    check_round_trip(abi, "varuint32", "16383", "FF7F");
    check_round_trip(abi, "varuint32", "16384", "808001");
    check_round_trip(abi, "varuint32", "2097152", "80808001");
    check_round_trip(abi, "varuint32", "268435456", "8080808001");
    check_round_trip(abi, "varuint32", "4294967295", "FFFFFFFF0F");

    check_round_trip(abi, "varint32", "0", "00");
    check_round_trip(abi, "varint32", "-1", "01");
    check_round_trip(abi, "varint32", "1", "02");
    check_round_trip(abi, "varint32", "-2", "03");
    check_round_trip(abi, "varint32", "2147483647", "FEFFFFFF0F");
    check_round_trip(abi, "varint32", "-2147483648", "FFFFFFFF0F");

    check_error(|| try_encode(abi, "varuint32", "4294967296"), "integer out of range");
    check_error(|| try_encode(abi, "varuint32", "-1"), "cannot convert given variant");
    check_error(|| try_encode(abi, "varint32", "2147483648"), "integer out of range");

    Ok(())
}

#[test]
fn roundtrip_floats() -> Result<()> {
    init();

    let abi = builtin_abi();

    check_round_trip(abi, "float32", "0", "00000000");
    check_round_trip(abi, "float32", "0.125", "0000003E");
    check_round_trip(abi, "float32", "-0.125", "000000BE");
    check_round_trip(abi, "float64", "0", "0000000000000000");
    check_round_trip(abi, "float64", "0.125", "000000000000C03F");
    check_round_trip(abi, "float64", "-0.125", "000000000000C0BF");
    check_round_trip2(abi, "float64", "151115727451828646838272.0", "000000000000C044",
                      "151115727451828650000000");

    Ok(())
}

#[test]
fn roundtrip_float128() -> Result<()> {
    init();

    let abi = builtin_abi();

    // float128 is opaque: it travels as its 16 raw bytes, shown as hex
    check_round_trip(abi, "float128", r#""00000000000000000000000000000000""#,
                     "00000000000000000000000000000000");
    check_round_trip2(abi, "float128", r#""12345678abcdef12345678abcdef1234""#,
                      "12345678ABCDEF12345678ABCDEF1234",
                      r#""12345678ABCDEF12345678ABCDEF1234""#);

    check_error(|| try_encode(abi, "float128", "0.125"), "cannot convert given variant");
    check_error(|| try_encode(abi, "float128", r#""beef""#), "Invalid string length");

    Ok(())
}

#[test]
fn roundtrip_datetimes() -> Result<()> {
    init();

    let abi = builtin_abi();

    check_round_trip(abi, "time_point_sec", r#""1970-01-01T00:00:00.000""#, "00000000");
    check_round_trip(abi, "time_point_sec", r#""2018-06-15T19:17:47.000""#, "DB10245B");
    check_round_trip(abi, "time_point_sec", r#""2030-06-15T19:17:47.000""#, "5B6FB671");

    check_round_trip(abi, "time_point", r#""1970-01-01T00:00:00.000""#, "0000000000000000");
    check_round_trip(abi, "time_point", r#""1970-01-01T00:00:00.001""#, "E803000000000000");
    check_round_trip(abi, "time_point", r#""2018-06-15T19:17:47.999""#, "18EB4012B36E0500");

    check_round_trip(abi, "block_timestamp_type", r#""2000-01-01T00:00:00.000""#, "00000000");
    check_round_trip(abi, "block_timestamp_type", r#""2000-01-01T00:00:00.500""#, "01000000");
    check_round_trip(abi, "block_timestamp_type", r#""2018-06-15T19:17:47.500""#, "B79A6D45");

    check_error(|| try_encode(abi, "time_point", r#""tomorrow""#), "cannot parse date/time");
    check_error(|| try_encode(abi, "time_point_sec", "true"), "cannot convert given variant");

    Ok(())
}

#[test]
fn roundtrip_strings_and_bytes() -> Result<()> {
    init();

    let abi = builtin_abi();

    check_round_trip(abi, "string", r#""""#, "00");
    check_round_trip(abi, "string", r#""a""#, "0161");
    check_round_trip(abi, "string", r#""Hello world!""#, "0C48656C6C6F20776F726C6421");

    check_round_trip(abi, "bytes", r#""""#, "00");
    check_round_trip(abi, "bytes", r#""00""#, "0100");
    check_round_trip(abi, "bytes", r#""AABBCCDDEEFF00010203040506070809""#,
                     "10AABBCCDDEEFF00010203040506070809");
    // hex input is case-insensitive, output is canonical uppercase
    check_round_trip2(abi, "bytes", r#""aabbccddeeff00010203040506070809""#,
                      "10AABBCCDDEEFF00010203040506070809",
                      r#""AABBCCDDEEFF00010203040506070809""#);

    check_error(|| try_encode(abi, "bytes", r#""0""#), "Odd number of digits");
    check_error(|| try_encode(abi, "bytes", r#""xy""#), "Invalid character");
    check_error(|| try_decode(abi, "string", "03666F"), "stream ended");

    Ok(())
}

#[test]
fn roundtrip_checksums() -> Result<()> {
    init();

    let abi = builtin_abi();

    check_round_trip(abi, "checksum160", r#""123456789ABCDEF01234567890ABCDEF70123456""#,
                     "123456789ABCDEF01234567890ABCDEF70123456");
    check_round_trip(abi, "checksum256", r#""0987654321ABCDEF0987654321FFFF1234567890ABCDEF001234567890ABCDEF""#,
                     "0987654321ABCDEF0987654321FFFF1234567890ABCDEF001234567890ABCDEF");
    check_round_trip(abi, "checksum512", concat!(
        r#""0987654321ABCDEF0987654321FFFF1234567890ABCDEF001234567890ABCDEF"#,
        r#"0987654321ABCDEF0987654321FFFF1234567890ABCDEF001234567890ABCDEF""#),
        concat!(
        "0987654321ABCDEF0987654321FFFF1234567890ABCDEF001234567890ABCDEF",
        "0987654321ABCDEF0987654321FFFF1234567890ABCDEF001234567890ABCDEF"));

    check_error(|| try_encode(abi, "checksum256", r#""a0""#), "Invalid string length");
    check_error(|| try_encode(abi, "checksum256", "true"), "cannot convert given variant");

    Ok(())
}

#[test]
fn roundtrip_crypto_types() -> Result<()> {
    init();

    let abi = builtin_abi();

    check_round_trip(abi, "public_key", r#""PUB_K1_69X3383RzBZj41k73CSjUNXM5MYGpnDxyPnWUKPEtYQmVzqTY7""#,
                     "0002A5D2400AF24411F64C29DA2FE893FF2B6681A3B6FFBE980B2EE42AD10CC2E994");
    check_round_trip(abi, "public_key", r#""PUB_K1_7WnhaKwHpbSidYuh2DF1qAExTRUtPEdZCaZqt75cKcixtU7gEn""#,
                     "000359D04E6519311041B10FE9E828A226B48F3F27A52F071F8E364CD317785ABEBC");

    check_round_trip(abi, "private_key", r#""PVT_R1_PtoxLPzJZURZmPS4e26pjBiAn41mkkLPrET5qHnwDvbvqFEL6""#,
                     "0133FB621E78D5DC78F0029B6FD714BFE3B42FE4B72BC109051591E71F204D2813");

    check_round_trip(abi, "signature", r#""SIG_K1_Kg2UKjXTX48gw2wWH4zmsZmWu3yarcfC21Bd9JPj7QoDURqiAacCHmtExPk3syPb2tFLsp1R4ttXLXgr7FYgDvKPC5RCkx""#,
                     concat!("002056355ED1079822D2728886B449F0F4A2BBF48BF38698C0EBE8C7079768882B",
                             "1C64AC07D7A4BD85CF96B8A74FDCAFEF1A4805F946177C609FDF31ABE2463038E5"));

    // legacy public key format normalizes to the canonical form
    check_round_trip2(abi, "public_key", r#""EOS7WnhaKwHpbSidYuh2DF1qAExTRUtPEdZCaZqt75cKcixuQUtdA""#,
                      "000359D04E6519311041B10FE9E828A226B48F3F27A52F071F8E364CD317785ABEBC",
                      r#""PUB_K1_7WnhaKwHpbSidYuh2DF1qAExTRUtPEdZCaZqt75cKcixtU7gEn""#);

    check_error(|| try_encode(abi, "public_key", r#""foo""#), "not crypto data");
    check_error(|| try_encode(abi, "signature", "true"), "cannot convert given variant");

    Ok(())
}

#[test]
fn roundtrip_names_symbols_assets() -> Result<()> {
    init();

    let abi = builtin_abi();

    check_round_trip(abi, "name", r#""foobar""#, "000000005C73285D");
    check_round_trip(abi, "name", r#""eosio.token""#, "00A6823403EA3055");
    check_round_trip(abi, "name", r#""""#, "0000000000000000");
    check_round_trip(abi, "name", r#""zzzzzzzzzzzzj""#, "FFFFFFFFFFFFFFFF");

    check_round_trip(abi, "symbol_code", r#""SYS""#, "5359530000000000");
    check_round_trip(abi, "symbol", r#""4,SYS""#, "0453595300000000");
    check_round_trip(abi, "symbol", r#""0,W""#, "0057000000000000");

    check_round_trip(abi, "asset", r#""0 FOO""#, "000000000000000000464F4F00000000");
    check_round_trip(abi, "asset", r#""0.000 FOO""#, "000000000000000003464F4F00000000");
    check_round_trip(abi, "asset", r#""1.2345 SYS""#, "39300000000000000453595300000000");
    check_round_trip(abi, "asset", r#""-1.2345 SYS""#, "C7CFFFFFFFFFFFFF0453595300000000");

    check_round_trip(abi, "extended_asset", r#"{"quantity":"0 FOO","contract":"bar"}"#,
                     "000000000000000000464F4F00000000000000000000AE39");

    check_error(|| try_encode(abi, "name", r#""UPPER""#), "invalid character");
    check_error(|| try_encode(abi, "symbol", r#""foo""#), "missing comma");
    check_error(|| try_encode(abi, "asset", r#""100""#), "separated with space");

    Ok(())
}


// =============================================================================
//
//     Composite types
//
// =============================================================================

#[test]
fn roundtrip_arrays() -> Result<()> {
    init();

    let abi = builtin_abi();

    check_round_trip(abi, "uint8[]", "[]", "00");
    check_round_trip(abi, "uint8[]", "[10,9,8]", "030A0908");
    check_round_trip(abi, "uint16[]", "[1,256,65535]", "030100000100FFFF");
    check_round_trip(abi, "string[]", r#"["foo","bar","baz"]"#, "0303666F6F036261720362617A");
    check_round_trip(abi, "string[][]", r#"[["foo","bar","baz"]]"#, "010303666F6F036261720362617A");

    check_error(|| try_encode(abi, "uint8[]", "7"), "cannot convert given variant");
    check_error(|| try_decode(abi, "uint8[]", "03010203040506"), "trailing byte");
    check_error(|| try_decode(abi, "uint8[]", "0301"), "stream ended");

    Ok(())
}

#[test]
fn roundtrip_optionals() -> Result<()> {
    init();

    let abi = builtin_abi();

    check_round_trip(abi, "int8?", "null", "00");
    check_round_trip(abi, "int8?", "-1", "01FF");

    // suffixes apply left-to-right: an array of optionals vs an optional array
    check_round_trip(abi, "int8?[]", "[null,7]", "02000107");
    check_round_trip(abi, "int8[]?", "null", "00");
    check_round_trip(abi, "int8[]?", "[7]", "010107");

    check_error(|| try_decode(abi, "int8?", "02"), "cannot parse bool");
    check_error(|| try_decode(abi, "int8?", "01"), "stream ended");

    Ok(())
}

#[test]
fn roundtrip_structs() -> Result<()> {
    init();

    let abi = test_abi();

    check_round_trip(abi, "pair", r#"{"first":0,"second":1}"#, "0001");
    check_round_trip(abi, "with_opt", r#"{"first":1,"opt":null}"#, "0100");
    check_round_trip(abi, "with_opt", r#"{"first":1,"opt":-1}"#, "0101FF");

    // base struct fields come first and are flattened in the JSON form
    check_round_trip(abi, "derived", r#"{"x":1,"y":"z"}"#, "01017A");

    // aliases resolve through arrays too
    check_round_trip(abi, "my_int", "7", "07000000");
    check_round_trip(abi, "my_int[]", "[7]", "0107000000");

    check_error(|| try_encode(abi, "pair", "[]"), "unexpected input while encoding struct");
    check_error(|| try_decode(abi, "pair", "00"), "stream ended");

    Ok(())
}

#[test]
fn struct_field_order_is_enforced() -> Result<()> {
    init();

    let abi = test_abi();

    check_error(|| try_encode(abi, "pair", r#"{"second":1,"first":0}"#),
                "expected field 'first' but found 'second'");
    check_error(|| try_encode(abi, "pair", r#"{"first":0}"#), "missing field 'second'");
    check_error(|| try_encode(abi, "pair", r#"{"first":0,"second":1,"third":2}"#),
                "unknown field 'third'");
    check_error(|| try_encode(abi, "pair", r#"{"first":0,"third":1}"#), "unknown field 'third'");
    // an optional field may be null but it cannot be left out
    check_error(|| try_encode(abi, "with_opt", r#"{"first":1}"#), "missing field 'opt'");

    Ok(())
}

#[test]
fn reorderable_encoding_accepts_any_field_order() -> Result<()> {
    init();

    let abi = test_abi();

    let reference = try_encode(abi, "pair", r#"{"first":0,"second":1}"#)?;

    // every permutation yields the same bytes as the canonical ordering
    for permuted in [r#"{"first":0,"second":1}"#, r#"{"second":1,"first":0}"#] {
        assert_eq!(try_encode_reorderable(abi, "pair", permuted)?, reference);
    }

    check_error(|| try_encode_reorderable(abi, "pair", r#"{"first":0}"#), "missing field 'second'");
    check_error(|| try_encode_reorderable(abi, "pair", r#"{"second":1,"first":0,"third":2}"#),
                "unknown field 'third'");

    Ok(())
}

#[test]
fn roundtrip_variants() -> Result<()> {
    init();

    let abi = test_abi();

    check_round_trip(abi, "v1", r#"["i",7]"#, "0007000000");
    check_round_trip(abi, "v1", r#"["s","hi"]"#, "01026869");

    check_error(|| try_encode(abi, "v1", r#"["x",7]"#), "not valid within the variant");
    check_error(|| try_encode(abi, "v1", "7"), "expected input to be an array of 2 elements");
    check_error(|| try_encode(abi, "v1", r#"[7,7]"#), "expected variant typename to be a string");
    check_error(|| try_decode(abi, "v1", "05"), "invalid tag");

    Ok(())
}

#[test]
fn binary_extensions_may_be_absent() -> Result<()> {
    init();

    let abi = test_abi();

    // encoding: a trailing run of extension fields may be left out wholesale
    check_round_trip(abi, "simple", r#"{"a":7,"b":"x"}"#, "070000000178");
    assert_eq!(hex::encode_upper(try_encode(abi, "simple", r#"{"a":7}"#)?), "07000000");

    check_round_trip(abi, "ext", r#"{"a":1,"b":2,"c":3}"#, "010203");
    assert_eq!(hex::encode_upper(try_encode(abi, "ext", r#"{"a":1,"b":2}"#)?), "0102");
    assert_eq!(hex::encode_upper(try_encode(abi, "ext", r#"{"a":1}"#)?), "01");

    // an extension field cannot reappear after an absent one
    check_error(|| try_encode_reorderable(abi, "ext", r#"{"a":1,"c":3}"#), "unexpected field 'c'");

    // decoding: a buffer ending at the extension boundary is complete
    let decoded = try_decode(abi, "simple", "07000000")?;
    assert_eq!(abiconv::json::to_string(&decoded)?, r#"{"a":7}"#);
    let decoded = try_decode(abi, "ext", "0102")?;
    assert_eq!(abiconv::json::to_string(&decoded)?, r#"{"a":1,"b":2}"#);

    // but a buffer ending inside a regular field is truncated
    check_error(|| try_decode(abi, "simple", "0700"), "stream ended");

    Ok(())
}

#[test]
fn trailing_data_is_rejected() -> Result<()> {
    init();

    let abi = test_abi();

    check_error(|| try_decode(abi, "bool", "0100"), "trailing byte");
    check_error(|| try_decode(abi, "simple", "0700000001780988"), "trailing byte");
    check_error(|| try_encode(abi, "bool", "true false"), "trailing characters");

    Ok(())
}

#[test]
fn recursion_is_bounded() -> Result<()> {
    init();

    let abi = test_abi();

    // self-referential schemas are legal through an optional indirection...
    check_round_trip(abi, "node", r#"{"next":null}"#, "00");
    check_round_trip(abi, "node", r#"{"next":{"next":null}}"#, "0100");

    // ...but resolution depth is bounded
    let mut deep = String::from("null");
    for _ in 0..40 {
        deep = format!(r#"{{"next":{}}}"#, deep);
    }
    check_error(|| try_encode(abi, "node", &deep), "max recursion depth");

    let mut bin = vec![1u8; 100];
    bin.push(0);
    check_error(|| try_decode(abi, "node", hex::encode(&bin)), "max recursion depth");

    Ok(())
}
