//! H.265/HEVC VPS 和 SPS 解析器.
//!
//! VPS 包含视频参数集全局信息.
//! SPS 包含编码视频序列的参数: profile/level, 分辨率, 色度格式, 位深等.
//! SPS 解析在位深之后结束, 不进入 VUI.

use nalscope_core::{BitReader, NalError, NalResult};

use super::ptl::parse_profile_tier_level;
use crate::parsers::nal::remove_emulation_prevention;

/// VPS 解析结果
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HevcVpsInfo {
    /// VPS ID
    pub vps_id: u8,
    /// vps_max_layers_minus1
    pub max_layers_minus1: u8,
    /// vps_max_sub_layers_minus1
    pub max_sub_layers_minus1: u8,
}

/// SPS 解析结果
#[derive(Debug, Clone, PartialEq)]
pub struct HevcSpsInfo {
    /// SPS 所引用的 VPS ID
    pub vps_id: u8,
    /// sps_max_sub_layers_minus1
    pub max_sub_layers_minus1: u8,
    /// SPS ID
    pub sps_id: u32,
    /// general_profile_space
    pub general_profile_space: u8,
    /// general_tier_flag (false=Main, true=High)
    pub general_tier_flag: bool,
    /// general_profile_idc
    pub general_profile_idc: u8,
    /// general_level_idc
    pub general_level_idc: u8,
    /// 色度格式 (0=单色, 1=4:2:0, 2=4:2:2, 3=4:4:4)
    pub chroma_format_idc: u32,
    /// separate_colour_plane_flag (仅 4:4:4)
    pub separate_colour_plane: bool,
    /// 原始宽度 (像素, 未裁剪)
    pub pic_width: u32,
    /// 原始高度 (像素, 未裁剪)
    pub pic_height: u32,
    /// 图像宽度 (像素, 已应用 conformance window)
    pub width: u32,
    /// 图像高度 (像素, 已应用 conformance window)
    pub height: u32,
    /// 亮度位深
    pub bit_depth_luma: u32,
    /// 色度位深
    pub bit_depth_chroma: u32,
    /// 帧率, 解析不进入 VUI, 始终为 None
    pub framerate: Option<f64>,
}

impl Default for HevcSpsInfo {
    fn default() -> Self {
        Self {
            vps_id: 0,
            max_sub_layers_minus1: 0,
            sps_id: 0,
            general_profile_space: 0,
            general_tier_flag: false,
            general_profile_idc: 0,
            general_level_idc: 0,
            chroma_format_idc: 1,
            separate_colour_plane: false,
            pic_width: 0,
            pic_height: 0,
            width: 0,
            height: 0,
            bit_depth_luma: 8,
            bit_depth_chroma: 8,
            framerate: None,
        }
    }
}

fn check_header(nal: &[u8], what: &'static str) -> NalResult<()> {
    if nal.len() < 2 {
        return Err(NalError::TooShort {
            what,
            len: nal.len(),
            min: 2,
        });
    }
    Ok(())
}

/// 解析 VPS NAL 单元 (含 2 字节 NAL 头部, 可含防竞争字节)
pub fn parse_hevc_vps(nal: &[u8]) -> NalResult<HevcVpsInfo> {
    check_header(nal, "HEVC VPS")?;

    let rbsp = remove_emulation_prevention(nal);
    let mut br = BitReader::new(&rbsp);

    // NAL 头部
    br.skip_bits(16)?;

    let vps_id = br.read_bits(4)? as u8;
    br.skip_bits(1)?; // vps_base_layer_internal_flag
    br.skip_bits(1)?; // vps_base_layer_available_flag
    let max_layers_minus1 = br.read_bits(6)? as u8;
    let max_sub_layers_minus1 = br.read_bits(3)? as u8;

    Ok(HevcVpsInfo {
        vps_id,
        max_layers_minus1,
        max_sub_layers_minus1,
    })
}

/// 解析 SPS NAL 单元 (含 2 字节 NAL 头部, 可含防竞争字节)
pub fn parse_hevc_sps(nal: &[u8]) -> NalResult<HevcSpsInfo> {
    check_header(nal, "HEVC SPS")?;

    let rbsp = remove_emulation_prevention(nal);
    let mut br = BitReader::new(&rbsp);
    let mut sps = HevcSpsInfo::default();

    // NAL 头部
    br.skip_bits(16)?;

    sps.vps_id = br.read_bits(4)? as u8;
    sps.max_sub_layers_minus1 = br.read_bits(3)? as u8;
    br.skip_bits(1)?; // sps_temporal_id_nesting_flag

    let ptl = parse_profile_tier_level(&mut br, true, sps.max_sub_layers_minus1)?;
    sps.general_profile_space = ptl.general_profile_space;
    sps.general_tier_flag = ptl.general_tier_flag;
    sps.general_profile_idc = ptl.general_profile_idc;
    sps.general_level_idc = ptl.general_level_idc;

    sps.sps_id = br.read_ue()?;
    sps.chroma_format_idc = br.read_ue()?;
    if sps.chroma_format_idc == 3 {
        sps.separate_colour_plane = br.read_flag()?;
    }

    sps.pic_width = br.read_ue()?;
    sps.pic_height = br.read_ue()?;
    sps.width = sps.pic_width;
    sps.height = sps.pic_height;

    // conformance_window_flag
    if br.read_flag()? {
        let left = br.read_ue()?;
        let right = br.read_ue()?;
        let top = br.read_ue()?;
        let bottom = br.read_ue()?;

        let sub_width_c = if matches!(sps.chroma_format_idc, 1 | 2) { 2 } else { 1 };
        let sub_height_c = if sps.chroma_format_idc == 1 { 2 } else { 1 };
        sps.width = sps
            .pic_width
            .saturating_sub(left.saturating_add(right).saturating_mul(sub_width_c));
        sps.height = sps
            .pic_height
            .saturating_sub(top.saturating_add(bottom).saturating_mul(sub_height_c));
    }

    sps.bit_depth_luma = br.read_ue()?.saturating_add(8);
    sps.bit_depth_chroma = br.read_ue()?.saturating_add(8);

    Ok(sps)
}
