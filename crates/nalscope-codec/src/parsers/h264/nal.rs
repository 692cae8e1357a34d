//! H.264 NAL (Network Abstraction Layer) 单元头部解析.
//!
//! # NAL 头部 (1 字节)
//! ```text
//! ┌─────────────────────────────────────┐
//! │ forbidden(1) | ref_idc(2) | type(5) │
//! └─────────────────────────────────────┘
//! ```

use nalscope_core::{NalError, NalResult};

/// NAL 单元类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum AvcNalUnitType {
    /// 未指定
    Unspecified,
    /// 非 IDR 图像切片 (P/B slice)
    Slice,
    /// 数据分区 A (DPA)
    SliceDpa,
    /// 数据分区 B (DPB)
    SliceDpb,
    /// 数据分区 C (DPC)
    SliceDpc,
    /// IDR 图像切片 (关键帧)
    SliceIdr,
    /// 增补增强信息 (SEI)
    Sei,
    /// 序列参数集 (SPS)
    Sps,
    /// 图像参数集 (PPS)
    Pps,
    /// 访问单元分隔符 (AUD)
    Aud,
    /// 序列结束
    EndOfSequence,
    /// 流结束
    EndOfStream,
    /// 填充数据
    FillerData,
    /// SPS 扩展
    SpsExtension,
    /// 前缀 NAL (SVC/MVC)
    PrefixNal,
    /// 子集 SPS (SVC/MVC)
    SubsetSps,
    /// 未知类型
    Unknown(u8),
}

impl AvcNalUnitType {
    /// 从 NAL 类型编号创建
    pub fn from_type_id(type_id: u8) -> Self {
        match type_id {
            0 => Self::Unspecified,
            1 => Self::Slice,
            2 => Self::SliceDpa,
            3 => Self::SliceDpb,
            4 => Self::SliceDpc,
            5 => Self::SliceIdr,
            6 => Self::Sei,
            7 => Self::Sps,
            8 => Self::Pps,
            9 => Self::Aud,
            10 => Self::EndOfSequence,
            11 => Self::EndOfStream,
            12 => Self::FillerData,
            13 => Self::SpsExtension,
            14 => Self::PrefixNal,
            15 => Self::SubsetSps,
            _ => Self::Unknown(type_id),
        }
    }

    /// 获取类型编号
    pub fn type_id(&self) -> u8 {
        match self {
            Self::Unspecified => 0,
            Self::Slice => 1,
            Self::SliceDpa => 2,
            Self::SliceDpb => 3,
            Self::SliceDpc => 4,
            Self::SliceIdr => 5,
            Self::Sei => 6,
            Self::Sps => 7,
            Self::Pps => 8,
            Self::Aud => 9,
            Self::EndOfSequence => 10,
            Self::EndOfStream => 11,
            Self::FillerData => 12,
            Self::SpsExtension => 13,
            Self::PrefixNal => 14,
            Self::SubsetSps => 15,
            Self::Unknown(id) => *id,
        }
    }

    /// 是否为 VCL (Video Coding Layer) NAL
    pub fn is_vcl(&self) -> bool {
        matches!(
            self,
            Self::Slice | Self::SliceDpa | Self::SliceDpb | Self::SliceDpc | Self::SliceIdr
        )
    }
}

impl std::fmt::Display for AvcNalUnitType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unspecified => write!(f, "Unspecified"),
            Self::Slice => write!(f, "Slice"),
            Self::SliceDpa => write!(f, "SliceDPA"),
            Self::SliceDpb => write!(f, "SliceDPB"),
            Self::SliceDpc => write!(f, "SliceDPC"),
            Self::SliceIdr => write!(f, "IDR"),
            Self::Sei => write!(f, "SEI"),
            Self::Sps => write!(f, "SPS"),
            Self::Pps => write!(f, "PPS"),
            Self::Aud => write!(f, "AUD"),
            Self::EndOfSequence => write!(f, "EndOfSeq"),
            Self::EndOfStream => write!(f, "EndOfStream"),
            Self::FillerData => write!(f, "Filler"),
            Self::SpsExtension => write!(f, "SPSExt"),
            Self::PrefixNal => write!(f, "Prefix"),
            Self::SubsetSps => write!(f, "SubsetSPS"),
            Self::Unknown(id) => write!(f, "Unknown({id})"),
        }
    }
}

/// 解析后的 NAL 头部
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AvcNalUnitHeader {
    /// forbidden_zero_bit, 不做校验, 仅透传
    pub forbidden_zero_bit: bool,
    /// nal_ref_idc (参考重要性, 0-3)
    pub nal_ref_idc: u8,
    /// nal_unit_type (0-31)
    pub nal_unit_type: u8,
    /// 是否为 IDR 切片
    pub is_idr: bool,
    /// 是否可作为解码起点 (IDR 或 SPS)
    pub is_key_frame: bool,
}

impl AvcNalUnitHeader {
    /// 从 NAL 头部字节解析
    pub fn from_byte(byte: u8) -> Self {
        let nal_unit_type = byte & 0x1F;
        let is_idr = nal_unit_type == AvcNalUnitType::SliceIdr.type_id();
        Self {
            forbidden_zero_bit: (byte >> 7) & 1 == 1,
            nal_ref_idc: (byte >> 5) & 0x03,
            nal_unit_type,
            is_idr,
            is_key_frame: is_idr || nal_unit_type == AvcNalUnitType::Sps.type_id(),
        }
    }

    /// 获取类型化的 NAL 单元类型
    pub fn unit_type(&self) -> AvcNalUnitType {
        AvcNalUnitType::from_type_id(self.nal_unit_type)
    }
}

/// 从 NAL 数据 (含头部字节) 解析头部
pub fn parse_avc_nal_header(data: &[u8]) -> NalResult<AvcNalUnitHeader> {
    match data.first() {
        Some(&byte) => Ok(AvcNalUnitHeader::from_byte(byte)),
        None => Err(NalError::TooShort {
            what: "H.264 NAL 头部",
            len: 0,
            min: 1,
        }),
    }
}
