//! H.264 码流级聚合: Annex B 字节流与 avcC 配置记录.
//!
//! # avcC 布局
//! ```text
//! [version(8)] [profile(8)] [compat(8)] [level(8)]
//! [reserved(6) | length_size_minus_one(2)]
//! [reserved(3) | num_sps(5)] { [len(16)] [SPS] }*
//! [num_pps(8)] { [len(16)] [PPS] }*
//! ```
//!
//! 每种参数集只保留首次成功解析的结果. 单个参数集解析失败不影响其余 NAL.

use log::{debug, trace};
use nalscope_core::{NalError, NalResult};

use super::nal::{AvcNalUnitHeader, AvcNalUnitType};
use super::pps::{AvcPpsInfo, parse_avc_pps};
use super::sps::{AvcSpsInfo, parse_avc_sps};
use crate::parsers::nal::{find_annexb_nal_units, take_length_prefixed};

/// avcC 最小长度 (固定头部 + num_sps)
const AVCC_MIN_SIZE: usize = 7;

/// Annex B 码流解析结果
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AvcAnnexBInfo {
    /// 首个成功解析的 SPS
    pub sps: Option<AvcSpsInfo>,
    /// 首个成功解析的 PPS
    pub pps: Option<AvcPpsInfo>,
    /// 按出现顺序记录的所有 NAL 头部
    pub nal_units: Vec<AvcNalUnitHeader>,
}

impl AvcAnnexBInfo {
    /// 是否包含关键帧 NAL
    pub fn has_key_frame(&self) -> bool {
        self.nal_units.iter().any(|h| h.is_key_frame)
    }
}

/// avcC 配置记录解析结果
#[derive(Debug, Clone, PartialEq)]
pub struct AvcDescriptionInfo {
    /// configurationVersion
    pub configuration_version: u8,
    /// AVCProfileIndication
    pub profile_indication: u8,
    /// profile_compatibility
    pub profile_compatibility: u8,
    /// AVCLevelIndication
    pub level_indication: u8,
    /// 长度前缀字节数 (1-4)
    pub length_size: u8,
    /// 首个成功解析的 SPS
    pub sps: Option<AvcSpsInfo>,
    /// 首个成功解析的 PPS
    pub pps: Option<AvcPpsInfo>,
    /// 按记录顺序记录的所有参数集 NAL 头部
    pub nal_units: Vec<AvcNalUnitHeader>,
}

/// 首次出现的参数集收集器
#[derive(Default)]
struct ParameterSets {
    sps: Option<AvcSpsInfo>,
    pps: Option<AvcPpsInfo>,
    nal_units: Vec<AvcNalUnitHeader>,
}

impl ParameterSets {
    /// 记录 NAL 头部, 并按 `kind` 尝试解析尚未捕获的参数集
    ///
    /// Annex B 中 `kind` 取自 NAL 头部, avcC 中取自条目所在的段.
    fn push(&mut self, nal: &[u8], kind: Option<AvcNalUnitType>) {
        let Some(&first) = nal.first() else {
            return;
        };
        let header = AvcNalUnitHeader::from_byte(first);
        trace!(
            "H264: NAL type={} ref_idc={} len={}",
            header.unit_type(),
            header.nal_ref_idc,
            nal.len()
        );
        self.nal_units.push(header);

        match kind.unwrap_or_else(|| header.unit_type()) {
            AvcNalUnitType::Sps if self.sps.is_none() => match parse_avc_sps(nal) {
                Ok(sps) => self.sps = Some(sps),
                Err(err) => debug!("H264: 跳过无法解析的 SPS, len={}, err={}", nal.len(), err),
            },
            AvcNalUnitType::Pps if self.pps.is_none() => match parse_avc_pps(nal) {
                Ok(pps) => self.pps = Some(pps),
                Err(err) => debug!("H264: 跳过无法解析的 PPS, len={}, err={}", nal.len(), err),
            },
            _ => {}
        }
    }
}

/// 解析 Annex B 字节流, 收集 NAL 头部与首个 SPS/PPS
pub fn parse_avc_annexb(data: &[u8]) -> AvcAnnexBInfo {
    let mut sets = ParameterSets::default();
    for span in find_annexb_nal_units(data) {
        sets.push(span.slice(data), None);
    }

    AvcAnnexBInfo {
        sps: sets.sps,
        pps: sets.pps,
        nal_units: sets.nal_units,
    }
}

/// 解析 avcC 配置记录
///
/// 记录短于 7 字节时返回 `TooShort`. 条目长度为 0 时停止读取该段,
/// 条目被截断时停止读取整个记录, 已收集的结果保留.
pub fn parse_avc_description(data: &[u8]) -> NalResult<AvcDescriptionInfo> {
    if data.len() < AVCC_MIN_SIZE {
        return Err(NalError::TooShort {
            what: "avcC",
            len: data.len(),
            min: AVCC_MIN_SIZE,
        });
    }

    let length_size = (data[4] & 0x03) + 1;
    let num_sps = data[5] & 0x1F;
    let mut pos = 6;
    let mut sets = ParameterSets::default();

    // 截断之后的字节都属于被截断的条目, 不再读取 PPS 段
    let intact = read_entries(data, &mut pos, num_sps, &mut sets, AvcNalUnitType::Sps);

    if let (true, Some(&num_pps)) = (intact, data.get(pos)) {
        pos += 1;
        read_entries(data, &mut pos, num_pps, &mut sets, AvcNalUnitType::Pps);
    }

    Ok(AvcDescriptionInfo {
        configuration_version: data[0],
        profile_indication: data[1],
        profile_compatibility: data[2],
        level_indication: data[3],
        length_size,
        sps: sets.sps,
        pps: sets.pps,
        nal_units: sets.nal_units,
    })
}

/// 读取一段长度前缀的参数集条目, 每个条目都按 `kind` 解析
///
/// 遇到长度为 0 的条目时停止本段. 条目越过记录末尾时返回 false.
fn read_entries(
    data: &[u8],
    pos: &mut usize,
    count: u8,
    sets: &mut ParameterSets,
    kind: AvcNalUnitType,
) -> bool {
    for index in 0..count {
        match take_length_prefixed(data, pos) {
            Some([]) => {
                debug!("H264: avcC {} 条目长度为 0, index={}", kind, index);
                return true;
            }
            Some(nal) => sets.push(nal, Some(kind)),
            None => {
                debug!("H264: avcC {} 条目截断, index={}, pos={}", kind, index, pos);
                return false;
            }
        }
    }
    true
}
