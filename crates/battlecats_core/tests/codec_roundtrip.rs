use battlecats_core::codec::{SaveCodec, SaveRecord, StoryBlockCodec};
use battlecats_core::core_api::{CoreErrorCode, CountryCode};
use battlecats_core::progress::ProgressStore;

fn sample_record() -> SaveRecord {
    SaveRecord {
        country: CountryCode::Jp,
        game_version: 120_200,
        story: ProgressStore::with_default_layout(),
        trailing: vec![0xde, 0xad, 0x00, 0xff],
    }
}

fn put_u32(out: &mut Vec<u8>, value: u32) {
    out.extend_from_slice(&value.to_le_bytes());
}

#[test]
fn default_layout_roundtrips_byte_for_byte() {
    let codec = StoryBlockCodec;
    let record = sample_record();
    let bytes = codec.encode(&record).expect("encode sample record");

    let decoded = codec
        .decode(&bytes, CountryCode::Jp)
        .expect("decode sample record");
    assert_eq!(decoded, record);
    assert_eq!(codec.encode(&decoded).expect("re-encode"), bytes);
}

#[test]
fn trailing_bytes_are_preserved() {
    let codec = StoryBlockCodec;
    let bytes = codec.encode(&sample_record()).expect("encode");
    assert!(bytes.ends_with(&[0xde, 0xad, 0x00, 0xff]));

    let decoded = codec.decode(&bytes, CountryCode::En).expect("decode");
    assert_eq!(decoded.trailing, vec![0xde, 0xad, 0x00, 0xff]);
    assert_eq!(decoded.country, CountryCode::En);
}

#[test]
fn hand_built_block_decodes_into_chapters() {
    let mut bytes = Vec::new();
    put_u32(&mut bytes, 7);
    put_u32(&mut bytes, 1);
    put_u32(&mut bytes, 2);
    put_u32(&mut bytes, 5);
    for count in [1, 1, 0, 0, 0] {
        put_u32(&mut bytes, count);
    }
    put_u32(&mut bytes, 3);
    for flag in [1, 0, 2] {
        put_u32(&mut bytes, flag);
    }

    let record = StoryBlockCodec
        .decode(&bytes, CountryCode::Kr)
        .expect("decode hand-built block");
    assert_eq!(record.game_version, 7);
    assert_eq!(record.story.chapter_count(), 1);
    assert_eq!(record.story.progress(0).unwrap(), 2);
    assert_eq!(record.story.total_real_stages(0).unwrap(), 2);
    assert_eq!(record.story.treasures(0).unwrap(), &[1, 0, 2]);
    assert!(record.trailing.is_empty());
}

#[test]
fn rejects_empty_payload() {
    let err = StoryBlockCodec
        .decode(&[], CountryCode::En)
        .expect_err("empty payload");
    assert_eq!(err.code, CoreErrorCode::DecodeFailure);
}

#[test]
fn rejects_truncated_payload() {
    let mut bytes = StoryBlockCodec.encode(&sample_record()).expect("encode");
    bytes.truncate(64);
    let err = StoryBlockCodec
        .decode(&bytes, CountryCode::En)
        .expect_err("truncated payload");
    assert_eq!(err.code, CoreErrorCode::DecodeFailure);
}

#[test]
fn rejects_clear_list_without_bonus_slots() {
    let mut bytes = Vec::new();
    put_u32(&mut bytes, 1);
    put_u32(&mut bytes, 1);
    put_u32(&mut bytes, 0);
    put_u32(&mut bytes, 2);
    put_u32(&mut bytes, 0);
    put_u32(&mut bytes, 0);
    put_u32(&mut bytes, 0);

    let err = StoryBlockCodec
        .decode(&bytes, CountryCode::En)
        .expect_err("two slots cannot hold the bonus region");
    assert_eq!(err.code, CoreErrorCode::DecodeFailure);
    assert!(err.message.contains("expected at least 3"));
}

#[test]
fn rejects_progress_above_cap() {
    let mut bytes = Vec::new();
    put_u32(&mut bytes, 1);
    put_u32(&mut bytes, 1);
    put_u32(&mut bytes, 49);
    put_u32(&mut bytes, 3);
    for _ in 0..3 {
        put_u32(&mut bytes, 0);
    }
    put_u32(&mut bytes, 0);

    let err = StoryBlockCodec
        .decode(&bytes, CountryCode::En)
        .expect_err("progress 49 is out of range");
    assert!(err.message.contains("exceeds 48"));
}

#[test]
fn rejects_oversized_chapter_table() {
    let mut bytes = Vec::new();
    put_u32(&mut bytes, 1);
    put_u32(&mut bytes, 10_000);
    let err = StoryBlockCodec
        .decode(&bytes, CountryCode::En)
        .expect_err("chapter table too large");
    assert!(err.message.contains("exceeds limit"));
}
