use std::fs;
use std::path::PathBuf;

use stash_core::layout::{RECORD_PADDING, RECORD_PREFIX};
use stash_core::{
    CodecOptions, DecodeError, Item, Stash, Stat, StatKind, StatValue, TextEncoding,
};

fn workspace_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../..")
}

fn fixture_path(name: &str) -> PathBuf {
    workspace_root().join("tests/fixtures").join(name)
}

fn read_fixture(name: &str) -> Vec<u8> {
    fs::read(fixture_path(name)).unwrap_or_else(|e| panic!("failed to read {name}: {e}"))
}

fn decode_fixture(options: &CodecOptions) -> Stash {
    Stash::decode_bytes(&read_fixture("player.stash"), options).expect("fixture should decode")
}

#[test]
fn fixture_decodes_header_and_footer() {
    let stash = decode_fixture(&CodecOptions::default());
    assert_eq!(stash.header, [2, 7, 0xABCD]);
    assert_eq!(stash.version, 2.5);
    assert_eq!(stash.declared_size, 2);
    assert_eq!(stash.items.len(), 3);
    assert_eq!(stash.live_items().len(), 2);
}

#[test]
fn fixture_decodes_items() {
    let stash = decode_fixture(&CodecOptions::default());
    let names: Vec<String> = stash
        .items
        .iter()
        .map(|item| item.display_name().map(ToString::to_string).unwrap_or_default())
        .collect();
    assert_eq!(names, vec!["Sword", "Amulet of Haste", "Old Boots"]);

    let sword = &stash.items[0];
    assert_eq!(
        sword.stats,
        vec![
            Stat::text("name", "Sword"),
            Stat::float("dmg", 1.0),
            Stat::float("level", 12.0),
            Stat::text("rarity", "rare"),
        ]
    );

    let amulet = &stash.items[1];
    assert_eq!(
        amulet.stat("id"),
        Some(&Stat::new(
            StatKind::Opaque("2".to_string()),
            "id",
            Some(StatValue::Bytes(vec![0x0A, 0x0B]))
        ))
    );
    assert_eq!(amulet.stat("empty").and_then(|s| s.value.as_ref()), None);

    assert_eq!(stash.items[0].marker, 1);
    assert_eq!(stash.items[2].marker, 5);
}

#[test]
fn lossless_roundtrip_is_byte_exact() {
    let bytes = read_fixture("player.stash");
    let stash = Stash::decode_bytes(&bytes, &CodecOptions::default()).expect("decodes");
    let emitted = stash
        .to_bytes(&CodecOptions::default())
        .expect("fixture re-encodes");
    assert_eq!(emitted, bytes);
}

#[test]
fn legacy_roundtrip_matches_original_editor_output() {
    let legacy = CodecOptions::legacy();
    let stash = Stash::decode_bytes(&read_fixture("player.stash"), &legacy).expect("decodes");
    assert_eq!(stash.items[1].stat("id").and_then(|s| s.value.as_ref()), None);

    let emitted = stash.to_bytes(&legacy).expect("fixture re-encodes");
    assert_eq!(emitted, read_fixture("legacy.stash"));
}

#[test]
fn body_records_cover_exact_byte_counts() {
    let stash = decode_fixture(&CodecOptions::default());
    let layout = stash.layout();
    layout.validate().expect("decoded layout is consistent");

    let payload_lens: Vec<usize> = layout.records.iter().map(|r| r.payload.len()).collect();
    assert_eq!(payload_lens, vec![77, 85, 47]);
    let expected: usize = payload_lens
        .iter()
        .map(|len| RECORD_PREFIX + len + RECORD_PADDING)
        .sum();
    assert_eq!(layout.body_len, expected);

    for (item, record) in stash.items.iter().zip(&layout.records) {
        let encoded = item
            .encode(&CodecOptions::default())
            .expect("item encodes");
        assert_eq!(encoded.len(), record.payload.len());
    }
}

#[test]
fn two_item_body_has_framed_length() {
    let first = Item::new(vec![Stat::text("name", "Sword"), Stat::float("dmg", 1.0)]);
    let second = Item::new(vec![Stat::text("name", "Axe")]);
    let options = CodecOptions::default();
    let l1 = first.encode(&options).expect("encodes").len();
    let l2 = second.encode(&options).expect("encodes").len();

    let stash = Stash::new([0, 0, 0], 1.0, 2, vec![first, second]);
    let body_hex = stash.encode_body(&options).expect("encodes");
    assert_eq!(body_hex.len() / 2, 4 + 4 + l1 + 12 + 4 + 4 + l2 + 12);
    assert_eq!(body_hex, body_hex.to_uppercase());

    let text = stash.encode(&options).expect("encodes");
    let decoded = Stash::decode(&text, &options).expect("decodes");
    assert_eq!(decoded.items, stash.items);
    assert_eq!(decoded.layout().body_len, body_hex.len() / 2);
}

#[test]
fn items_past_declared_size_survive_roundtrip() {
    let options = CodecOptions::default();
    let items = vec![
        Item::new(vec![Stat::text("name", "Live")]),
        Item::new(vec![Stat::text("name", "Stale one")]),
        Item::new(vec![Stat::text("name", "Stale two")]),
    ];
    let stash = Stash::new([1, 2, 3], 1.0, 1, items);

    let decoded = Stash::decode(&stash.encode(&options).expect("encodes"), &options)
        .expect("decodes");
    assert_eq!(decoded.items.len(), 3);
    assert_eq!(decoded.declared_size, 1);

    let summary = decoded.summary();
    assert_eq!(summary.size, 1);
    assert_eq!(summary.items.len(), 1);
    assert_eq!(
        summary.items[0].name,
        Some(StatValue::Text("Live".to_string()))
    );
}

#[test]
fn inconsistent_declared_size_is_written_as_is() {
    let options = CodecOptions::default();
    let stash = Stash::new([0; 3], 1.0, 9, vec![Item::new(Vec::new())]);
    let text = stash.encode(&options).expect("encodes");
    assert!(text.ends_with("\n1.0\n9 "));
    let decoded = Stash::decode(&text, &options).expect("decodes");
    assert_eq!(decoded.declared_size, 9);
    assert_eq!(decoded.live_items().len(), 1);
}

#[test]
fn edited_value_is_written_back() {
    let options = CodecOptions::default();
    let mut stash = decode_fixture(&options);
    stash.items[0]
        .stat_mut("dmg")
        .expect("sword has dmg")
        .set_value("200000", &options)
        .expect("numeric");

    let text = stash.encode(&options).expect("encodes");
    let reread = Stash::decode(&text, &options).expect("decodes");
    assert_eq!(
        reread.items[0].stat("dmg"),
        Some(&Stat::float("dmg", 200000.0))
    );
    assert_eq!(reread.items[1..], stash.items[1..]);
}

#[test]
fn summary_matches_original_dict_view() {
    let summary = decode_fixture(&CodecOptions::default()).summary();
    let json = serde_json::to_value(&summary).expect("summary serializes");
    assert_eq!(json["size"], 2);
    assert_eq!(json["items"][0]["name"], "Sword");
    assert_eq!(json["items"][0]["stats"][0][0], "dmg");
    assert_eq!(json["items"][0]["stats"][0][1], 1.0);
    assert_eq!(json["items"][1]["stats"][1][1], "0A0B");
}

#[test]
fn rejects_truncated_fixture() {
    let mut bytes = read_fixture("player.stash");
    let text = String::from_utf8(bytes.clone()).expect("ascii fixture");
    let body_end = text.find('\n').expect("footer newline");
    bytes.drain(body_end - 8..body_end);

    let err = Stash::decode_bytes(&bytes, &CodecOptions::default()).expect_err("truncated");
    assert!(matches!(err, DecodeError::Record { index: 2, .. }));
}

#[test]
fn rejects_non_hex_body() {
    let text = "000000000000000000000000XYZ0\n1.0\n0 ";
    assert!(matches!(
        Stash::decode(text, &CodecOptions::default()),
        Err(DecodeError::Hex { field: "body", .. })
    ));
}

#[test]
fn rejects_missing_footer() {
    let text = "000000000000000000000000\n1.0";
    assert_eq!(
        Stash::decode(text, &CodecOptions::default()).map(|_| ()),
        Err(DecodeError::MissingFooter { found: 2 })
    );
}

#[test]
fn rejects_non_ascii_file() {
    let mut bytes = read_fixture("player.stash");
    bytes.insert(30, 0xC3);
    assert!(matches!(
        Stash::decode_bytes(&bytes, &CodecOptions::default()),
        Err(DecodeError::Text { .. })
    ));
}

#[test]
fn windows_1252_names_roundtrip() {
    let options = CodecOptions {
        encoding: TextEncoding::Windows1252,
        ..CodecOptions::default()
    };
    let stash = Stash::new(
        [0; 3],
        1.0,
        1,
        vec![Item::new(vec![Stat::text("name", "Épée")])],
    );
    let text = stash.encode(&options).expect("windows-1252 encodes");
    let decoded = Stash::decode(&text, &options).expect("decodes");
    assert_eq!(decoded.items, stash.items);

    assert!(stash.encode(&CodecOptions::default()).is_err());
}
