//! H.264/AVC 码流解析器.
//!
//! 提供对 H.264 Annex B 码流和 avcC 配置记录的解析能力:
//! - NAL 头部与类型识别
//! - SPS (Sequence Parameter Set) 解析
//! - PPS (Picture Parameter Set) 解析
//! - 码流级 / 配置记录级聚合

pub mod nal;
pub mod pps;
pub mod sps;
pub mod stream;

pub use nal::{AvcNalUnitHeader, AvcNalUnitType, parse_avc_nal_header};
pub use pps::{AvcPpsInfo, parse_avc_pps};
pub use sps::{AvcSpsInfo, ColourDescription, ConstraintSetFlags, parse_avc_sps};
pub use stream::{AvcAnnexBInfo, AvcDescriptionInfo, parse_avc_annexb, parse_avc_description};
