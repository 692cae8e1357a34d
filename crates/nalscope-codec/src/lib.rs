//! # nalscope-codec
//!
//! 视频码流头部解析库.
//!
//! 从 H.264/H.265 码流 (Annex B 或 avcC/hvcC 配置记录) 中提取 NAL 头与参数集,
//! 并解析 MIME `codecs` 参数中的 codec 字符串. 所有函数都是纯函数, 不持有全局状态.
//!
//! ## 使用示例
//!
//! ```rust
//! use nalscope_codec::parsers::h264::parse_avc_annexb;
//!
//! // 一个只含 AUD 的 Annex B 片段
//! let info = parse_avc_annexb(&[0x00, 0x00, 0x00, 0x01, 0x09, 0xF0]);
//! assert_eq!(info.nal_units.len(), 1);
//! assert!(info.sps.is_none());
//! ```

pub mod codec_id;
pub mod codec_string;
pub mod parsers;

// 重导出常用类型
pub use codec_id::CodecId;
pub use codec_string::{CodecParameters, parse_codec_string};
pub use parsers::{NalUnitSpan, find_annexb_nal_units, remove_emulation_prevention};
