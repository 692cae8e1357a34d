//! 编解码器标识符.
//!
//! 为 codec 字符串可表达的每种视频编码算法分配唯一标识,
//! 供能力查询等调用方作为分派键使用.

use std::fmt;

/// 编解码器标识符
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum CodecId {
    /// AV1 (Alliance for Open Media)
    Av1,
    /// H.264 / AVC / MPEG-4 Part 10
    H264,
    /// H.265 / HEVC / MPEG-H Part 2
    H265,
    /// VP8
    Vp8,
    /// VP9
    Vp9,
}

impl CodecId {
    /// 获取编解码器名称
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Av1 => "av1",
            Self::H264 => "h264",
            Self::H265 => "hevc",
            Self::Vp8 => "vp8",
            Self::Vp9 => "vp9",
        }
    }

    /// 获取 ISO-BMFF 样本条目的默认 FourCC
    pub const fn fourcc(&self) -> &'static str {
        match self {
            Self::Av1 => "av01",
            Self::H264 => "avc1",
            Self::H265 => "hvc1",
            Self::Vp8 => "vp08",
            Self::Vp9 => "vp09",
        }
    }
}

impl fmt::Display for CodecId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}
