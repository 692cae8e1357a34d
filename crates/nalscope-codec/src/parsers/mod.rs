//! 码流解析器.
//!
//! - `nal`: H.264/H.265 共用的 Annex B 分割与防竞争字节移除
//! - `h264`: AVC NAL 头部, SPS/PPS, Annex B 与 avcC 聚合
//! - `h265`: HEVC NAL 头部, VPS/SPS/PPS, Annex B 与 hvcC 聚合

pub mod h264;
pub mod h265;
pub mod nal;

#[cfg(test)]
pub(crate) mod test_bits;

pub use nal::{NalUnitSpan, find_annexb_nal_units, remove_emulation_prevention};
