//! codec 字符串解析.
//!
//! 解析 MIME `codecs` 参数中使用的简短编解码器标识, 以 `.` 分隔字段:
//! - `av01.P.LLT.DD[.M.CCC.cp.tc.mc.F]`
//! - `avc1.PPCCLL` / `avc3.PPCCLL`
//! - `hvc1.[A|B|C]P.CF.{L|H}LL[.CC...]` / `hev1....`
//! - `vp09.PP.LL.DD[.CC.cp.tc.mc.FF]`
//! - `vp8`
//!
//! 任何语法错误都使整个调用失败, 不返回部分结果.
//! HEVC 字段例外: 无法解析的数值降级为 0.

use std::fmt;
use std::str::FromStr;

use nalscope_core::{NalError, NalResult};

use crate::codec_id::CodecId;
use crate::parsers::h264::ConstraintSetFlags;

/// tier (AV1 的 `M`/`H`, HEVC 的 `L`/`H`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tier {
    /// Main tier
    #[default]
    Main,
    /// High tier
    High,
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Main => write!(f, "Main"),
            Self::High => write!(f, "High"),
        }
    }
}

/// AV1 codec 参数
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Av1CodecParameters {
    /// seq_profile (0=Main, 1=High, 2=Professional)
    pub profile: u8,
    /// seq_level_idx (如 4 = Level 3.0)
    pub level: u8,
    /// seq_tier
    pub tier: Tier,
    /// 位深 (8, 10, 12)
    pub bit_depth: u8,
    /// mono_chrome
    pub monochrome: Option<u8>,
    /// chroma_subsampling_x, chroma_subsampling_y, chroma_sample_position (如 110 = 4:2:0)
    pub chroma_subsampling: Option<u16>,
    /// color_primaries
    pub color_primaries: Option<u8>,
    /// transfer_characteristics
    pub transfer_characteristics: Option<u8>,
    /// matrix_coefficients
    pub matrix_coefficients: Option<u8>,
    /// video_full_range_flag
    pub video_full_range_flag: Option<u8>,
}

/// AVC 样本条目前缀
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AvcPrefix {
    /// 参数集只在 avcC 中
    Avc1,
    /// 参数集可在码流中
    Avc3,
}

impl AvcPrefix {
    /// 前缀文本
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Avc1 => "avc1",
            Self::Avc3 => "avc3",
        }
    }
}

/// AVC codec 参数
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AvcCodecParameters {
    /// 样本条目前缀
    pub prefix: AvcPrefix,
    /// profile_idc (如 0x42 = Baseline)
    pub profile_idc: u8,
    /// constraint_set 标志位
    pub constraint_set_flags: u8,
    /// level_idc (如 0x1E = Level 3.0)
    pub level_idc: u8,
}

impl AvcCodecParameters {
    /// 获取类型化的 constraint_set 标志 (忽略保留位)
    pub fn constraints(&self) -> ConstraintSetFlags {
        ConstraintSetFlags::from_bits_truncate(self.constraint_set_flags)
    }
}

/// HEVC 样本条目前缀
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HevcPrefix {
    /// 参数集只在 hvcC 中
    Hvc1,
    /// 参数集可在码流中
    Hev1,
}

impl HevcPrefix {
    /// 前缀文本
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Hvc1 => "hvc1",
            Self::Hev1 => "hev1",
        }
    }
}

/// HEVC codec 参数
///
/// 数值字段无法解析时为 0, 原始字段文本保留在 `*_segment` 中.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HevcCodecParameters {
    /// 样本条目前缀
    pub prefix: HevcPrefix,
    /// general_profile_space (无字母=0, A=1, B=2, C=3)
    pub general_profile_space: u8,
    /// general_profile_idc
    pub general_profile_idc: u8,
    /// general_profile_compatibility_flags (按字符串中的十六进制值)
    pub general_profile_compatibility_flags: u32,
    /// general_tier_flag
    pub general_tier: Tier,
    /// general_level_idc
    pub general_level_idc: u8,
    /// general_constraint_indicator_flags, 每个字段一个字节
    pub general_constraint_indicator_flags: Vec<u8>,
    /// profile 字段原文
    pub profile_segment: String,
    /// 兼容性标志字段原文
    pub compatibility_segment: String,
    /// tier/level 字段原文
    pub tier_level_segment: String,
    /// 约束标志字段原文
    pub constraint_segments: Vec<String>,
}

/// VP8 codec 参数 (无字段)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Vp8CodecParameters;

/// VP9 codec 参数
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Vp9CodecParameters {
    /// profile (0-3)
    pub profile: u8,
    /// level (如 10 = Level 1.0)
    pub level: u8,
    /// 位深 (8, 10, 12)
    pub bit_depth: u8,
    /// chroma_subsampling (0/1 = 4:2:0, 2 = 4:2:2, 3 = 4:4:4)
    pub chroma_subsampling: Option<u8>,
    /// colour_primaries
    pub color_primaries: Option<u8>,
    /// transfer_characteristics
    pub transfer_characteristics: Option<u8>,
    /// matrix_coefficients
    pub matrix_coefficients: Option<u8>,
    /// video_full_range_flag
    pub video_full_range_flag: Option<u8>,
}

/// codec 字符串解析结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CodecParameters {
    /// AV1
    Av1(Av1CodecParameters),
    /// H.264
    Avc(AvcCodecParameters),
    /// H.265
    Hevc(HevcCodecParameters),
    /// VP8
    Vp8(Vp8CodecParameters),
    /// VP9
    Vp9(Vp9CodecParameters),
}

impl CodecParameters {
    /// 对应的编解码器标识
    pub fn codec_id(&self) -> CodecId {
        match self {
            Self::Av1(_) => CodecId::Av1,
            Self::Avc(_) => CodecId::H264,
            Self::Hevc(_) => CodecId::H265,
            Self::Vp8(_) => CodecId::Vp8,
            Self::Vp9(_) => CodecId::Vp9,
        }
    }
}

impl FromStr for CodecParameters {
    type Err = NalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_codec_string(s)
    }
}

impl fmt::Display for CodecParameters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Av1(p) => write!(
                f,
                "{} profile={} level={} tier={} bit_depth={}",
                self.codec_id(),
                p.profile,
                p.level,
                p.tier,
                p.bit_depth
            ),
            Self::Avc(p) => write!(
                f,
                "{} ({}) profile_idc={} constraint_set_flags=0x{:02X} level_idc={}",
                self.codec_id(),
                p.prefix.as_str(),
                p.profile_idc,
                p.constraint_set_flags,
                p.level_idc
            ),
            Self::Hevc(p) => write!(
                f,
                "{} ({}) profile_space={} profile_idc={} tier={} level_idc={}",
                self.codec_id(),
                p.prefix.as_str(),
                p.general_profile_space,
                p.general_profile_idc,
                p.general_tier,
                p.general_level_idc
            ),
            Self::Vp8(_) => write!(f, "{}", self.codec_id()),
            Self::Vp9(p) => write!(
                f,
                "{} profile={} level={} bit_depth={}",
                self.codec_id(),
                p.profile,
                p.level,
                p.bit_depth
            ),
        }
    }
}

/// 按前缀自动选择子解析器
pub fn parse_codec_string(codec_string: &str) -> NalResult<CodecParameters> {
    // VP8 只有 3 个字符
    if codec_string == "vp8" {
        return parse_vp8_codec_string(codec_string).map(CodecParameters::Vp8);
    }

    if codec_string.len() < 5 {
        return Err(syntax(format!("无效的 codec 字符串: {codec_string:?}")));
    }

    match codec_string.get(..5) {
        Some("av01.") => parse_av1_codec_string(codec_string).map(CodecParameters::Av1),
        Some("avc1." | "avc3.") => parse_avc_codec_string(codec_string).map(CodecParameters::Avc),
        Some("hvc1." | "hev1.") => {
            parse_hevc_codec_string(codec_string).map(CodecParameters::Hevc)
        }
        Some("vp09.") => parse_vp9_codec_string(codec_string).map(CodecParameters::Vp9),
        _ => Err(syntax(format!("不支持的 codec 字符串: {codec_string:?}"))),
    }
}

/// 解析 `av01.P.LLT.DD[.M.CCC.cp.tc.mc.F]`
pub fn parse_av1_codec_string(codec_string: &str) -> NalResult<Av1CodecParameters> {
    let parts = split_fields(codec_string, "av01")?;
    if parts.len() < 4 {
        return Err(syntax(format!("AV1 codec 字符串字段不足: {codec_string:?}")));
    }

    let profile = parse_dec_u8(parts[1], "AV1 profile")?;
    if profile > 2 {
        return Err(syntax(format!("AV1 profile 非法: {profile}")));
    }

    let level_tier = parts[2];
    let (Some(level), Some(tier)) = (level_tier.get(..2), level_tier.get(2..3)) else {
        return Err(syntax(format!("AV1 level/tier 非法: {level_tier:?}")));
    };
    let level = parse_dec_u8(level, "AV1 level")?;
    let tier = match tier {
        "M" => Tier::Main,
        "H" => Tier::High,
        other => return Err(syntax(format!("AV1 tier 非法: {other:?}"))),
    };

    let bit_depth = parse_bit_depth(parts[3], "AV1")?;

    Ok(Av1CodecParameters {
        profile,
        level,
        tier,
        bit_depth,
        monochrome: optional_u8(&parts, 4, "AV1 monochrome")?,
        chroma_subsampling: parts
            .get(5)
            .map(|field| parse_dec_u16(field, "AV1 chroma_subsampling"))
            .transpose()?,
        color_primaries: optional_u8(&parts, 6, "AV1 color_primaries")?,
        transfer_characteristics: optional_u8(&parts, 7, "AV1 transfer_characteristics")?,
        matrix_coefficients: optional_u8(&parts, 8, "AV1 matrix_coefficients")?,
        video_full_range_flag: optional_u8(&parts, 9, "AV1 video_full_range_flag")?,
    })
}

/// 解析 `avc1.PPCCLL` / `avc3.PPCCLL`
pub fn parse_avc_codec_string(codec_string: &str) -> NalResult<AvcCodecParameters> {
    let prefix = match codec_string.get(..5) {
        Some("avc1.") => AvcPrefix::Avc1,
        Some("avc3.") => AvcPrefix::Avc3,
        _ => return Err(syntax(format!("AVC codec 字符串前缀非法: {codec_string:?}"))),
    };

    let hex = &codec_string[5..];
    if hex.len() != 6 || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(syntax(format!("AVC codec 参数必须是 6 位十六进制数: {hex:?}")));
    }

    let byte_at = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16);
    let (Ok(profile_idc), Ok(constraint_set_flags), Ok(level_idc)) =
        (byte_at(0), byte_at(2), byte_at(4))
    else {
        return Err(syntax(format!("AVC codec 参数非法: {hex:?}")));
    };

    Ok(AvcCodecParameters {
        prefix,
        profile_idc,
        constraint_set_flags,
        level_idc,
    })
}

/// 解析 `hvc1.X.X.X[.X...]` / `hev1.X.X.X[.X...]`
pub fn parse_hevc_codec_string(codec_string: &str) -> NalResult<HevcCodecParameters> {
    let prefix = match codec_string.get(..5) {
        Some("hvc1.") => HevcPrefix::Hvc1,
        Some("hev1.") => HevcPrefix::Hev1,
        _ => return Err(syntax(format!("HEVC codec 字符串前缀非法: {codec_string:?}"))),
    };

    let parts: Vec<&str> = codec_string.split('.').collect();
    if parts.len() < 4 {
        return Err(syntax(format!("HEVC codec 字符串字段不足: {codec_string:?}")));
    }

    // 可选的 profile_space 字母
    let profile_segment = parts[1];
    let (general_profile_space, profile_digits) = match profile_segment.as_bytes().first() {
        Some(b'A') => (1, &profile_segment[1..]),
        Some(b'B') => (2, &profile_segment[1..]),
        Some(b'C') => (3, &profile_segment[1..]),
        _ => (0, profile_segment),
    };
    let general_profile_idc = profile_digits.parse().unwrap_or(0);

    let compatibility_segment = parts[2];
    let general_profile_compatibility_flags =
        u32::from_str_radix(compatibility_segment, 16).unwrap_or(0);

    let tier_level_segment = parts[3];
    let (general_tier, level_digits) = match tier_level_segment.as_bytes().first() {
        Some(b'L') => (Tier::Main, Some(&tier_level_segment[1..])),
        Some(b'H') => (Tier::High, Some(&tier_level_segment[1..])),
        _ => (Tier::Main, None),
    };
    let general_level_idc = level_digits.and_then(|d| d.parse().ok()).unwrap_or(0);

    let constraint_segments: Vec<String> = parts[4..].iter().map(|s| s.to_string()).collect();
    let general_constraint_indicator_flags = constraint_segments
        .iter()
        .map(|s| u8::from_str_radix(s, 16).unwrap_or(0))
        .collect();

    Ok(HevcCodecParameters {
        prefix,
        general_profile_space,
        general_profile_idc,
        general_profile_compatibility_flags,
        general_tier,
        general_level_idc,
        general_constraint_indicator_flags,
        profile_segment: profile_segment.to_string(),
        compatibility_segment: compatibility_segment.to_string(),
        tier_level_segment: tier_level_segment.to_string(),
        constraint_segments,
    })
}

/// 解析 `vp8`
pub fn parse_vp8_codec_string(codec_string: &str) -> NalResult<Vp8CodecParameters> {
    if codec_string != "vp8" {
        return Err(syntax(format!("VP8 codec 字符串非法: {codec_string:?}")));
    }
    Ok(Vp8CodecParameters)
}

/// 解析 `vp09.PP.LL.DD[.CC.cp.tc.mc.FF]`
pub fn parse_vp9_codec_string(codec_string: &str) -> NalResult<Vp9CodecParameters> {
    let parts = split_fields(codec_string, "vp09")?;
    if parts.len() < 4 {
        return Err(syntax(format!("VP9 codec 字符串字段不足: {codec_string:?}")));
    }

    let profile = parse_dec_u8(parts[1], "VP9 profile")?;
    if profile > 3 {
        return Err(syntax(format!("VP9 profile 非法: {profile}")));
    }
    let level = parse_dec_u8(parts[2], "VP9 level")?;
    let bit_depth = parse_bit_depth(parts[3], "VP9")?;

    Ok(Vp9CodecParameters {
        profile,
        level,
        bit_depth,
        chroma_subsampling: optional_u8(&parts, 4, "VP9 chroma_subsampling")?,
        color_primaries: optional_u8(&parts, 5, "VP9 color_primaries")?,
        transfer_characteristics: optional_u8(&parts, 6, "VP9 transfer_characteristics")?,
        matrix_coefficients: optional_u8(&parts, 7, "VP9 matrix_coefficients")?,
        video_full_range_flag: optional_u8(&parts, 8, "VP9 video_full_range_flag")?,
    })
}

fn syntax(message: String) -> NalError {
    NalError::SyntaxError(message)
}

/// 校验 `fourcc.` 前缀并按 `.` 分割
fn split_fields<'a>(codec_string: &'a str, fourcc: &str) -> NalResult<Vec<&'a str>> {
    let parts: Vec<&str> = codec_string.split('.').collect();
    if parts.len() < 2 || parts[0] != fourcc {
        return Err(syntax(format!("{fourcc} codec 字符串前缀非法: {codec_string:?}")));
    }
    Ok(parts)
}

fn is_decimal(field: &str) -> bool {
    !field.is_empty() && field.bytes().all(|b| b.is_ascii_digit())
}

fn parse_dec_u8(field: &str, what: &str) -> NalResult<u8> {
    if !is_decimal(field) {
        return Err(syntax(format!("{what} 不是十进制数: {field:?}")));
    }
    field
        .parse()
        .map_err(|_| syntax(format!("{what} 超出范围: {field:?}")))
}

fn parse_dec_u16(field: &str, what: &str) -> NalResult<u16> {
    if !is_decimal(field) {
        return Err(syntax(format!("{what} 不是十进制数: {field:?}")));
    }
    field
        .parse()
        .map_err(|_| syntax(format!("{what} 超出范围: {field:?}")))
}

fn optional_u8(parts: &[&str], index: usize, what: &str) -> NalResult<Option<u8>> {
    parts
        .get(index)
        .map(|field| parse_dec_u8(field, what))
        .transpose()
}

fn parse_bit_depth(field: &str, codec: &str) -> NalResult<u8> {
    let bit_depth = parse_dec_u8(field, codec)?;
    if !matches!(bit_depth, 8 | 10 | 12) {
        return Err(syntax(format!("{codec} 位深非法: {bit_depth}")));
    }
    Ok(bit_depth)
}
