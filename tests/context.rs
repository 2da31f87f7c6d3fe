use color_eyre::eyre::Result;

use abiconv::{
    abi::data::TOKEN_HEX_ABI,
    ABIDefinition, ByteStream, Context, Name,
};

// =============================================================================
//
//     Behavior of the memory-owning conversion façade
//
// =============================================================================

const TOKEN: Name = Name::constant("eosio.token");

fn token_context() -> Context {
    let mut ctx = Context::new();
    assert!(ctx.load_abi_hex(TOKEN, TOKEN_HEX_ABI), "cannot load token ABI: {}", ctx.last_error());
    ctx
}

static TRANSFER_JSON: &str =
    r#"{"from":"useraaaaaaaa","to":"useraaaaaaab","quantity":"0.0001 SYS","memo":"test memo"}"#;

static TRANSFER_HEX: &str =
    "608C31C6187315D6708C31C6187315D6010000000000000004535953000000000974657374206D656D6F";


#[test]
fn name_conversions() {
    let mut ctx = Context::new();

    assert_eq!(ctx.string_to_name("eosio.token"), 6138663591592764928);
    assert_eq!(ctx.name_to_string(6138663591592764928), "eosio.token");
    assert_eq!(ctx.string_to_name(""), 0);
    assert_eq!(ctx.name_to_string(0), "");

    // invalid characters are reported through the error buffer
    assert_eq!(ctx.string_to_name("UPPER"), 0);
    assert!(ctx.last_error().contains("invalid character"));
}

#[test]
fn load_and_query_token_abi() {
    let mut ctx = token_context();

    assert_eq!(ctx.type_for_action(TOKEN, Name::constant("transfer")).as_deref(), Some("transfer"));
    assert_eq!(ctx.type_for_action(TOKEN, Name::constant("issue")).as_deref(), Some("issue"));
    assert_eq!(ctx.type_for_action(TOKEN, Name::constant("create")).as_deref(), Some("create"));
    assert_eq!(ctx.type_for_table(TOKEN, Name::constant("accounts")).as_deref(), Some("account"));
    assert_eq!(ctx.type_for_table(TOKEN, Name::constant("stat")).as_deref(), Some("currency_stats"));

    assert_eq!(ctx.type_for_action(TOKEN, Name::constant("nope")), None);
    assert!(ctx.last_error().contains(r#"does not have action "nope""#));

    assert_eq!(ctx.type_for_action(Name::constant("missing"), Name::constant("transfer")), None);
    assert!(ctx.last_error().contains("is not loaded"));
}

#[test]
fn json_to_bin_and_back() {
    let mut ctx = token_context();

    assert!(ctx.json_to_bin(TOKEN, "transfer", TRANSFER_JSON), "{}", ctx.last_error());
    assert_eq!(ctx.bin_size(), TRANSFER_HEX.len() / 2);
    assert_eq!(ctx.bin_hex(), TRANSFER_HEX);

    let data = ctx.bin_data().to_vec();
    assert_eq!(ctx.bin_to_json(TOKEN, "transfer", &data), Some(TRANSFER_JSON));

    assert_eq!(ctx.hex_to_json(TOKEN, "transfer", TRANSFER_HEX), Some(TRANSFER_JSON));
    // hex input is case-insensitive
    let lower = TRANSFER_HEX.to_lowercase();
    assert_eq!(ctx.hex_to_json(TOKEN, "transfer", &lower), Some(TRANSFER_JSON));
}

#[test]
fn reorderable_json_matches_canonical_encoding() {
    let mut ctx = token_context();

    assert!(ctx.json_to_bin(TOKEN, "transfer", TRANSFER_JSON));
    let reference = ctx.bin_data().to_vec();

    let permutations = [
        r#"{"to":"useraaaaaaab","memo":"test memo","from":"useraaaaaaaa","quantity":"0.0001 SYS"}"#,
        r#"{"memo":"test memo","quantity":"0.0001 SYS","to":"useraaaaaaab","from":"useraaaaaaaa"}"#,
        TRANSFER_JSON,
    ];
    for permuted in permutations {
        assert!(ctx.json_to_bin_reorderable(TOKEN, "transfer", permuted), "{}", ctx.last_error());
        assert_eq!(ctx.bin_data(), reference, "wrong encoding for {permuted}");
    }

    // while the strict path refuses out-of-order fields
    assert!(!ctx.json_to_bin(TOKEN, "transfer", permutations[0]));
    assert!(ctx.last_error().contains("expected field"));
}

#[test]
fn error_buffer_lifecycle() {
    let mut ctx = token_context();

    // a failing call records a message...
    assert!(!ctx.json_to_bin(TOKEN, "transfer", "{"));
    let msg = ctx.last_error().to_owned();
    assert!(!msg.is_empty());

    // ...which stays put until the next call...
    assert_eq!(ctx.last_error(), msg);

    // ...and is cleared by the next successful one
    assert!(ctx.json_to_bin(TOKEN, "transfer", TRANSFER_JSON));
    assert!(ctx.last_error().is_empty());
}

#[test]
fn conversion_failures() {
    let mut ctx = token_context();

    assert!(!ctx.json_to_bin(TOKEN, "transfer", r#"{"from":"useraaaaaaaa"}"#));
    assert!(ctx.last_error().contains("missing field"));

    assert!(!ctx.json_to_bin(TOKEN, "mystery_type", "{}"));
    assert!(ctx.last_error().contains("do not know how to serialize"));

    assert_eq!(ctx.bin_to_json(TOKEN, "transfer", &[0x00]), None);
    assert!(ctx.last_error().contains("stream ended"));

    assert_eq!(ctx.hex_to_json(TOKEN, "transfer", "zz"), None);
    assert!(ctx.last_error().contains("Invalid character"));

    // trailing bytes after the decoded value are an error
    let mut data = hex::decode(TRANSFER_HEX).unwrap();
    data.push(0x00);
    assert_eq!(ctx.bin_to_json(TOKEN, "transfer", &data), None);
    assert!(ctx.last_error().contains("trailing byte"));
}

#[test]
fn wide_integers_accept_quoted_strings() {
    let mut ctx = Context::new();
    let test = Name::constant("test");

    assert!(ctx.load_abi_json(test, r#"{
        "version": "eosio::abi/1.1",
        "structs": [{
            "name": "holder",
            "base": "",
            "fields": [{ "name": "value", "type": "uint64" }]
        }]
    }"#));

    assert!(ctx.json_to_bin(test, "uint64", r#""18446744073709551615""#));
    assert_eq!(ctx.bin_hex(), "FFFFFFFFFFFFFFFF");

    // the bare number form works as well since u64 values are parsed exactly
    assert!(ctx.json_to_bin(test, "uint64", "18446744073709551615"));
    assert_eq!(ctx.bin_hex(), "FFFFFFFFFFFFFFFF");

    // and the canonical JSON output is the quoted form
    let data = ctx.bin_data().to_vec();
    assert_eq!(ctx.bin_to_json(test, "uint64", &data), Some(r#""18446744073709551615""#));
}

#[test]
fn aliases_and_binary_extensions() {
    let mut ctx = Context::new();
    let test = Name::constant("test");

    assert!(ctx.load_abi_json(test, r#"{
        "version": "eosio::abi/1.1",
        "types": [{ "new_type_name": "my_int", "type": "uint32" }],
        "structs": [{
            "name": "simple",
            "base": "",
            "fields": [
                { "name": "a", "type": "my_int" },
                { "name": "b", "type": "string$" }
            ]
        }]
    }"#), "{}", ctx.last_error());

    assert!(ctx.json_to_bin(test, "simple", r#"{"a":7,"b":"x"}"#));
    assert_eq!(ctx.bin_hex(), "070000000178");

    // the extension field may be left out of the input entirely
    assert!(ctx.json_to_bin(test, "simple", r#"{"a":7}"#));
    assert_eq!(ctx.bin_hex(), "07000000");

    // and a buffer ending at the extension boundary decodes without it
    assert_eq!(ctx.hex_to_json(test, "simple", "07000000"), Some(r#"{"a":7}"#));
    assert_eq!(ctx.hex_to_json(test, "simple", "070000000178"), Some(r#"{"a":7,"b":"x"}"#));
}

#[test]
fn optionals_and_variants() {
    let mut ctx = Context::new();
    let test = Name::constant("test");

    assert!(ctx.load_abi_json(test, r#"{
        "version": "eosio::abi/1.1",
        "types": [
            { "new_type_name": "i", "type": "int32" },
            { "new_type_name": "s", "type": "string" }
        ],
        "variants": [{ "name": "v1", "types": ["i", "s"] }]
    }"#));

    assert!(ctx.json_to_bin(test, "int8?", "null"));
    assert_eq!(ctx.bin_hex(), "00");
    assert!(ctx.json_to_bin(test, "int8?", "-1"));
    assert_eq!(ctx.bin_hex(), "01FF");

    assert!(ctx.json_to_bin(test, "v1", r#"["s","hi"]"#));
    assert_eq!(ctx.bin_hex(), "01026869");
    assert_eq!(ctx.hex_to_json(test, "v1", "01026869"), Some(r#"["s","hi"]"#));

    assert!(!ctx.json_to_bin(test, "v1", r#"["x",7]"#));
    assert!(ctx.last_error().contains("not valid within the variant"));
}

#[test]
fn array_encoding() {
    let mut ctx = token_context();

    assert!(ctx.json_to_bin(TOKEN, "uint16[]", "[1,256,65535]"));
    assert_eq!(ctx.bin_hex(), "030100000100FFFF");
}

#[test]
fn reloading_a_contract_replaces_it() {
    let mut ctx = Context::new();
    let test = Name::constant("test");

    assert!(ctx.load_abi_json(test, r#"{
        "version": "eosio::abi/1.1",
        "structs": [{ "name": "thing", "base": "", "fields": [{ "name": "a", "type": "int8" }] }]
    }"#));
    assert!(ctx.json_to_bin(test, "thing", r#"{"a":1}"#));
    assert_eq!(ctx.bin_hex(), "01");

    assert!(ctx.load_abi_json(test, r#"{
        "version": "eosio::abi/1.1",
        "structs": [{ "name": "thing", "base": "", "fields": [{ "name": "a", "type": "int16" }] }]
    }"#));
    assert!(ctx.json_to_bin(test, "thing", r#"{"a":1}"#));
    assert_eq!(ctx.bin_hex(), "0100");
}

#[test]
fn load_abi_from_binary_form() -> Result<()> {
    let mut ctx = Context::new();
    let test = Name::constant("test");

    let abi_def = ABIDefinition::from_str(r#"{
        "version": "eosio::abi/1.1",
        "structs": [{ "name": "thing", "base": "", "fields": [{ "name": "a", "type": "int8" }] }]
    }"#)?;
    let mut ds = ByteStream::new();
    abi_def.to_bin(&mut ds)?;

    assert!(ctx.load_abi_bin(test, ds.data()), "{}", ctx.last_error());
    assert!(ctx.json_to_bin(test, "thing", r#"{"a":1}"#));
    assert_eq!(ctx.bin_hex(), "01");

    // loading garbage fails and reports
    assert!(!ctx.load_abi_bin(test, &[0xFF, 0xFF]));
    assert!(!ctx.last_error().is_empty());

    Ok(())
}
