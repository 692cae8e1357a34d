//! H.265/HEVC 码流解析器.
//!
//! 提供对 H.265 HEVC 码流的解析能力:
//! - NAL 头部与类型识别 (2 字节 NAL 头)
//! - VPS (Video Parameter Set) 解析
//! - SPS (Sequence Parameter Set) 解析
//! - PPS (Picture Parameter Set) 解析
//! - Annex B / hvcC 聚合
//!
//! # HEVC NAL 头部 (2 字节)
//! ```text
//! ┌───────────────────────────────────────────────┐
//! │ forbidden(1) | type(6) | layer_id(6) | tid(3) │
//! └───────────────────────────────────────────────┘
//! ```

pub mod nal;
pub mod pps;
pub mod ptl;
pub mod sps;
pub mod stream;

pub use nal::{HevcNalUnitHeader, HevcNalUnitType, parse_hevc_nal_header};
pub use pps::{HevcPpsInfo, parse_hevc_pps};
pub use ptl::{ProfileTierLevel, parse_profile_tier_level};
pub use sps::{HevcSpsInfo, HevcVpsInfo, parse_hevc_sps, parse_hevc_vps};
pub use stream::{
    HevcAnnexBInfo, HevcDescriptionInfo, parse_hevc_annexb, parse_hevc_description,
};
