//! codec 字符串解析集成测试

use nalscope::codec::CodecId;
use nalscope::codec::codec_string::{
    AvcPrefix, CodecParameters, HevcPrefix, Tier, parse_avc_codec_string, parse_codec_string,
};
use nalscope::codec::parsers::h264::parse_avc_sps;
use nalscope::core::NalError;

/// 常见 MIME codecs 参数及期望的编解码器
const KNOWN_STRINGS: &[(&str, CodecId)] = &[
    ("av01.0.04M.08", CodecId::Av1),
    ("av01.0.15M.10.0.112.09.16.09.0", CodecId::Av1),
    ("avc1.42E01E", CodecId::H264),
    ("avc1.640028", CodecId::H264),
    ("avc3.4D401F", CodecId::H264),
    ("hvc1.1.6.L93.B0", CodecId::H265),
    ("hev1.2.4.L120.B0", CodecId::H265),
    ("vp8", CodecId::Vp8),
    ("vp09.00.10.08", CodecId::Vp9),
    ("vp09.02.10.10.01.09.16.09.01", CodecId::Vp9),
];

#[test]
fn test_known_strings_dispatch() {
    for (input, codec_id) in KNOWN_STRINGS {
        let params = parse_codec_string(input)
            .unwrap_or_else(|err| panic!("{input} 解析失败: {err}"));
        assert_eq!(params.codec_id(), *codec_id, "input={input}");
    }
}

#[test]
fn test_from_str_matches_parse() {
    for (input, _) in KNOWN_STRINGS {
        let parsed: CodecParameters = input.parse().unwrap();
        assert_eq!(parsed, parse_codec_string(input).unwrap());
    }
}

#[test]
fn test_avc_string_matches_sps() {
    // Constrained Baseline, Level 3.0
    let sps = parse_avc_sps(&[0x67, 0x42, 0xC0, 0x1E, 0x5B, 0x40, 0x50, 0x1E, 0xC8]).unwrap();
    let avc = parse_avc_codec_string("avc1.42C01E").unwrap();

    assert_eq!(avc.prefix, AvcPrefix::Avc1);
    assert_eq!(avc.profile_idc, sps.profile_idc);
    assert_eq!(avc.constraint_set_flags, sps.constraint_set_flags);
    assert_eq!(avc.level_idc, sps.level_idc);
    assert_eq!(avc.constraints(), sps.constraints());
}

#[test]
fn test_hevc_fields() {
    let CodecParameters::Hevc(hevc) = parse_codec_string("hev1.2.4.L120.B0").unwrap() else {
        panic!("应解析为 HEVC");
    };
    assert_eq!(hevc.prefix, HevcPrefix::Hev1);
    assert_eq!(hevc.general_profile_idc, 2);
    assert_eq!(hevc.general_profile_compatibility_flags, 4);
    assert_eq!(hevc.general_tier, Tier::Main);
    assert_eq!(hevc.general_level_idc, 120);
    assert_eq!(hevc.constraint_segments, vec!["B0".to_string()]);
}

#[test]
fn test_rejected_strings() {
    let rejected = [
        "",
        "vp8.0",
        "VP8",
        "avc1",
        "avc1.42E0",
        "av01.0.04M",
        "av01.0.4M.08",
        "vp09.00.10.16",
        "opus",
        "mp4a.40.2",
    ];
    for input in rejected {
        match parse_codec_string(input) {
            Err(NalError::SyntaxError(message)) => assert!(!message.is_empty()),
            other => panic!("{input:?} 应被拒绝, actual={other:?}"),
        }
    }
}
