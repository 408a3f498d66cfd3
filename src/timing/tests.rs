use super::*;
use rstest::rstest;

#[rstest]
#[case(0x00, 0x14, BitrateIndex::Rate1M)]
#[case(0x00, 0x16, BitrateIndex::Rate800K)]
#[case(0x00, 0x1C, BitrateIndex::Rate500K)]
#[case(0x01, 0x1C, BitrateIndex::Rate250K)]
#[case(0x03, 0x1C, BitrateIndex::Rate125K)]
#[case(0x04, 0x1C, BitrateIndex::Rate100K)]
#[case(0x09, 0x1C, BitrateIndex::Rate50K)]
#[case(0x18, 0x1C, BitrateIndex::Rate20K)]
#[case(0x31, 0x1C, BitrateIndex::Rate10K)]
fn test_known_timing_translates(
    #[case] timing0: u8,
    #[case] timing1: u8,
    #[case] expected: BitrateIndex,
) {
    assert_eq!(translate_timing(timing0, timing1).unwrap(), expected);
}

#[rstest]
#[case(0x00, 0x13)]
#[case(0x00, 0x15)]
#[case(0x00, 0x17)]
#[case(0x00, 0x1B)]
#[case(0x00, 0x1D)]
#[case(0x01, 0x1B)]
#[case(0x01, 0x1D)]
#[case(0x02, 0x1C)]
#[case(0x05, 0x1C)]
#[case(0x08, 0x1C)]
#[case(0x0A, 0x1C)]
#[case(0x17, 0x1C)]
#[case(0x19, 0x1C)]
#[case(0x30, 0x1C)]
#[case(0x32, 0x1C)]
#[case(0x41, 0x1C)] // 250K with SJW 2
#[case(0x01, 0x9C)] // 250K with triple sampling
#[case(0x00, 0x00)]
#[case(0xBF, 0xFF)] // 5K, not a backend rate
#[case(0xFF, 0xFF)]
fn test_unknown_timing_rejected(#[case] timing0: u8, #[case] timing1: u8) {
    let btr = u16::from(timing0) << 8 | u16::from(timing1);
    match translate_timing(timing0, timing1) {
        Err(AdapterError::UnsupportedTiming(value)) => assert_eq!(value, btr),
        other => panic!("expected UnsupportedTiming for 0x{:04X}, got {:?}", btr, other),
    }
}

#[test]
fn test_only_table_entries_translate() {
    for btr in 0..=u16::MAX {
        let [timing0, timing1] = btr.to_be_bytes();
        let accepted = translate_timing(timing0, timing1).is_ok();
        assert_eq!(accepted, KNOWN_SJA1000_BTR.contains(&btr), "btr 0x{:04X}", btr);
    }
}

#[test]
fn test_table_covers_every_rate_once() {
    let mut rates: Vec<BitrateIndex> = KNOWN_SJA1000_BTR
        .iter()
        .map(|btr| {
            let [timing0, timing1] = btr.to_be_bytes();
            translate_timing(timing0, timing1).unwrap()
        })
        .collect();
    rates.dedup();
    assert_eq!(rates, BitrateIndex::ALL.to_vec());
}

#[test]
fn test_table_entries_decode_to_exact_rates() {
    for btr in KNOWN_SJA1000_BTR {
        let [timing0, timing1] = btr.to_be_bytes();
        let index = translate_timing(timing0, timing1).unwrap();
        let timing = BitTiming::from_sja1000(btr);
        assert_eq!(timing.bitrate(SJA1000_CLOCK), index.bits_per_second());
    }
}

#[test]
fn test_decode_500k_registers() {
    let timing = BitTiming::from_sja1000(0x001C);
    assert_eq!(
        timing,
        BitTiming {
            brp: 1,
            tseg1: 13,
            tseg2: 2,
            sjw: 1,
            sam: 0,
        }
    );
    assert_eq!(timing.quanta(), 16);
    assert_eq!(timing.bitrate(SJA1000_CLOCK), 500_000);
}

#[test]
fn test_decode_sjw_and_sampling() {
    let timing = BitTiming::from_sja1000(0xC1_9C);
    assert_eq!(timing.sjw, 4);
    assert_eq!(timing.brp, 2);
    assert_eq!(timing.sam, 1);
    assert_eq!(timing.tseg2, 2);
    assert_eq!(timing.tseg1, 13);
}

#[test]
fn test_composite_register() {
    assert_eq!(composite(0x31, 0x1C), 0x311C);
    assert_eq!(composite(0x00, 0x14), 0x0014);
}

#[test]
fn test_nearest_rate() {
    assert_eq!(BitrateIndex::nearest(500_000), BitrateIndex::Rate500K);
    assert_eq!(BitrateIndex::nearest(490_000), BitrateIndex::Rate500K);
    assert_eq!(BitrateIndex::nearest(830_000), BitrateIndex::Rate800K);
    assert_eq!(BitrateIndex::nearest(2_000_000), BitrateIndex::Rate1M);
    assert_eq!(BitrateIndex::nearest(0), BitrateIndex::Rate10K);
}

#[test]
fn test_index_codes() {
    for idx in BitrateIndex::ALL {
        assert_eq!(BitrateIndex::from_code(idx.code()), Some(idx));
    }
    assert_eq!(BitrateIndex::Rate1M.code(), 0);
    assert_eq!(BitrateIndex::Rate250K.code(), -3);
    assert_eq!(BitrateIndex::from_code(1), None);
    assert_eq!(BitrateIndex::from_code(-9), None);
}

#[test]
fn test_index_display() {
    assert_eq!(BitrateIndex::Rate800K.to_string(), "800K");
    assert_eq!(BitrateIndex::Rate1M.to_string(), "1M");
    assert_eq!(BitrateIndex::Rate10K.to_string(), "10K");
}
