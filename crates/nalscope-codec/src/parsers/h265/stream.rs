//! H.265/HEVC 码流级聚合: Annex B 字节流与 hvcC 配置记录.
//!
//! # hvcC 布局
//! ```text
//! [0]      configurationVersion
//! [1]      profile_space(2) | tier(1) | profile_idc(5)
//! [2..6]   general_profile_compatibility_flags
//! [6..12]  general_constraint_indicator_flags
//! [12]     general_level_idc
//! [13..21] 其他字段
//! [21]     ... | lengthSizeMinusOne(2)
//! [22]     numOfArrays
//! { [completeness(1) | reserved(1) | type(6)] [numNalus(16)] { [len(16)] [NAL] }* }*
//! ```

use log::{debug, trace};
use nalscope_core::{NalError, NalResult};

use super::nal::{HevcNalUnitHeader, HevcNalUnitType};
use super::pps::{HevcPpsInfo, parse_hevc_pps};
use super::sps::{HevcSpsInfo, HevcVpsInfo, parse_hevc_sps, parse_hevc_vps};
use crate::parsers::nal::{find_annexb_nal_units, take_length_prefixed};

/// hvcC 固定头部长度
const HVCC_MIN_SIZE: usize = 23;

/// Annex B 码流解析结果
#[derive(Debug, Clone, PartialEq, Default)]
pub struct HevcAnnexBInfo {
    /// 首个成功解析的 VPS
    pub vps: Option<HevcVpsInfo>,
    /// 首个成功解析的 SPS
    pub sps: Option<HevcSpsInfo>,
    /// 首个成功解析的 PPS
    pub pps: Option<HevcPpsInfo>,
    /// 按出现顺序记录的 NAL 头部 (不足 2 字节的单元不记录)
    pub nal_units: Vec<HevcNalUnitHeader>,
}

impl HevcAnnexBInfo {
    /// 是否包含关键帧 NAL
    pub fn has_key_frame(&self) -> bool {
        self.nal_units.iter().any(|h| h.is_key_frame)
    }
}

/// hvcC 配置记录解析结果
#[derive(Debug, Clone, PartialEq)]
pub struct HevcDescriptionInfo {
    /// 记录头部中的 general_profile_idc
    pub general_profile_idc: u8,
    /// 记录头部中的 general_level_idc
    pub general_level_idc: u8,
    /// 长度前缀字节数 (1-4)
    pub length_size: u8,
    /// 首个成功解析的 VPS
    pub vps: Option<HevcVpsInfo>,
    /// 首个成功解析的 SPS
    pub sps: Option<HevcSpsInfo>,
    /// 首个成功解析的 PPS
    pub pps: Option<HevcPpsInfo>,
    /// 按记录顺序记录的 NAL 头部
    pub nal_units: Vec<HevcNalUnitHeader>,
}

#[derive(Default)]
struct ParameterSets {
    vps: Option<HevcVpsInfo>,
    sps: Option<HevcSpsInfo>,
    pps: Option<HevcPpsInfo>,
    nal_units: Vec<HevcNalUnitHeader>,
}

impl ParameterSets {
    /// 记录 NAL 头部, 并按 `kind` 尝试解析尚未捕获的参数集
    ///
    /// Annex B 中 `kind` 取自 NAL 头部, hvcC 中取自数组类型.
    fn push(&mut self, nal: &[u8], kind: Option<HevcNalUnitType>) {
        let &[b0, b1, ..] = nal else {
            return;
        };
        let header = HevcNalUnitHeader::from_bytes(b0, b1);
        trace!(
            "HEVC: NAL type={} layer={} tid_plus1={} len={}",
            header.unit_type(),
            header.nuh_layer_id,
            header.nuh_temporal_id_plus1,
            nal.len()
        );
        self.nal_units.push(header);

        let kind = kind.unwrap_or_else(|| header.unit_type());
        match kind {
            HevcNalUnitType::Vps if self.vps.is_none() => match parse_hevc_vps(nal) {
                Ok(vps) => self.vps = Some(vps),
                Err(err) => debug!("HEVC: 跳过无法解析的 VPS, len={}, err={}", nal.len(), err),
            },
            HevcNalUnitType::Sps if self.sps.is_none() => match parse_hevc_sps(nal) {
                Ok(sps) => self.sps = Some(sps),
                Err(err) => debug!("HEVC: 跳过无法解析的 SPS, len={}, err={}", nal.len(), err),
            },
            HevcNalUnitType::Pps if self.pps.is_none() => match parse_hevc_pps(nal) {
                Ok(pps) => self.pps = Some(pps),
                Err(err) => debug!("HEVC: 跳过无法解析的 PPS, len={}, err={}", nal.len(), err),
            },
            _ => {}
        }
    }
}

/// 解析 Annex B 字节流, 收集 NAL 头部与首个 VPS/SPS/PPS
pub fn parse_hevc_annexb(data: &[u8]) -> HevcAnnexBInfo {
    let mut sets = ParameterSets::default();
    for span in find_annexb_nal_units(data) {
        sets.push(span.slice(data), None);
    }

    HevcAnnexBInfo {
        vps: sets.vps,
        sps: sets.sps,
        pps: sets.pps,
        nal_units: sets.nal_units,
    }
}

/// 解析 hvcC 配置记录
///
/// 记录短于 23 字节时返回 `TooShort`. NAL 条目越过记录末尾时停止读取,
/// 已收集的结果保留. 不足 2 字节的条目被跳过.
pub fn parse_hevc_description(data: &[u8]) -> NalResult<HevcDescriptionInfo> {
    if data.len() < HVCC_MIN_SIZE {
        return Err(NalError::TooShort {
            what: "hvcC",
            len: data.len(),
            min: HVCC_MIN_SIZE,
        });
    }

    let length_size = (data[21] & 0x03) + 1;
    let num_arrays = data[22];
    let mut pos = HVCC_MIN_SIZE;
    let mut sets = ParameterSets::default();

    'arrays: for array_index in 0..num_arrays {
        let Some(array_header) = data.get(pos..pos + 3) else {
            debug!("HEVC: hvcC 数组头部截断, index={}", array_index);
            break;
        };
        let kind = HevcNalUnitType::from_type_id(array_header[0] & 0x3F);
        let num_nalus = u16::from_be_bytes([array_header[1], array_header[2]]);
        pos += 3;

        for nal_index in 0..num_nalus {
            match take_length_prefixed(data, &mut pos) {
                Some(nal) if nal.len() >= 2 => sets.push(nal, Some(kind)),
                Some(nal) => {
                    debug!("HEVC: hvcC 跳过过短的 {} 条目, len={}", kind, nal.len());
                }
                None => {
                    debug!(
                        "HEVC: hvcC {} 条目截断, array={}, index={}",
                        kind, array_index, nal_index
                    );
                    break 'arrays;
                }
            }
        }
    }

    Ok(HevcDescriptionInfo {
        general_profile_idc: data[1] & 0x1F,
        general_level_idc: data[12],
        length_size,
        vps: sets.vps,
        sps: sets.sps,
        pps: sets.pps,
        nal_units: sets.nal_units,
    })
}
