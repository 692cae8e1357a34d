//! # nalscope
//!
//! 纯 Rust 实现的视频码流参数集探测库.
//!
//! 只读取码流头部信息, 不做像素解码:
//! - **NAL 分割**: Annex B 起始码扫描, 防竞争字节移除
//! - **参数集**: H.264 SPS/PPS, H.265 VPS/SPS/PPS
//! - **配置记录**: avcC / hvcC
//! - **codec 字符串**: AV1, AVC, HEVC, VP8, VP9
//!
//! # 快速开始
//!
//! ```rust
//! use nalscope::codec::codec_string::{CodecParameters, parse_codec_string};
//!
//! let params = parse_codec_string("avc1.42E01E").unwrap();
//! if let CodecParameters::Avc(avc) = params {
//!     assert_eq!(avc.profile_idc, 0x42);
//! }
//! ```
//!
//! # Crate 结构
//!
//! | Crate | 功能 |
//! |-------|------|
//! | `nalscope-core` | 比特流读取器与错误类型 |
//! | `nalscope-codec` | NAL/参数集/配置记录/codec 字符串解析 |

/// 比特流读取器与错误类型
pub use nalscope_core as core;

/// 码流与 codec 字符串解析
pub use nalscope_codec as codec;

pub mod logging;

/// 获取 nalscope 版本号
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
