//! H.264 SPS (Sequence Parameter Set) 解析器.
//!
//! SPS 包含编码视频序列的全局参数, 包括:
//! - Profile / Level (编码规格)
//! - 图像宽度和高度 (以宏块为单位, 需要 cropping 调整)
//! - 色度格式与位深
//! - 帧率信息 (通过 VUI timing_info)
//!
//! 只保留下游配置决策需要的字段, 量化矩阵只做比特消耗, 不保留数值.

use bitflags::bitflags;
use nalscope_core::{BitReader, NalError, NalResult};

use crate::parsers::nal::remove_emulation_prevention;

bitflags! {
    /// constraint_set0..5 标志位 (SPS 第 2 字节, 低 2 位保留)
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ConstraintSetFlags: u8 {
        const CONSTRAINT_SET0 = 0x80;
        const CONSTRAINT_SET1 = 0x40;
        const CONSTRAINT_SET2 = 0x20;
        const CONSTRAINT_SET3 = 0x10;
        const CONSTRAINT_SET4 = 0x08;
        const CONSTRAINT_SET5 = 0x04;
    }
}

/// VUI 颜色描述
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColourDescription {
    /// colour_primaries
    pub colour_primaries: u8,
    /// transfer_characteristics
    pub transfer_characteristics: u8,
    /// matrix_coefficients
    pub matrix_coefficients: u8,
}

/// SPS 解析结果
#[derive(Debug, Clone, PartialEq)]
pub struct AvcSpsInfo {
    /// profile_idc (编码规格, 如 66=Baseline, 77=Main, 100=High)
    pub profile_idc: u8,
    /// constraint_set 标志位 (含 2 个保留位)
    pub constraint_set_flags: u8,
    /// level_idc (编码级别, 如 30=3.0, 41=4.1)
    pub level_idc: u8,
    /// SPS ID (seq_parameter_set_id)
    pub sps_id: u32,
    /// 色度格式 (0=单色, 1=4:2:0, 2=4:2:2, 3=4:4:4)
    pub chroma_format_idc: u32,
    /// separate_colour_plane_flag (仅 4:4:4)
    pub separate_colour_plane: bool,
    /// 亮度位深
    pub bit_depth_luma: u32,
    /// 色度位深
    pub bit_depth_chroma: u32,
    /// 图像顺序计数类型 (0, 1, 2)
    pub pic_order_cnt_type: u32,
    /// 最大参考帧数
    pub max_num_ref_frames: u32,
    /// 是否为帧编码 (非场编码)
    pub frame_mbs_only: bool,
    /// 图像宽度 (像素, 已应用 cropping)
    pub width: u32,
    /// 图像高度 (像素, 已应用 cropping)
    pub height: u32,
    /// 是否存在 VUI 参数
    pub vui_present: bool,
    /// SAR (Sample Aspect Ratio, 像素宽高比), 未指定时为 None
    pub sample_aspect_ratio: Option<(u32, u32)>,
    /// video_full_range_flag
    pub video_full_range: Option<bool>,
    /// 颜色描述
    pub colour_description: Option<ColourDescription>,
    /// 帧率 (如果 VUI 中有 timing_info)
    pub framerate: Option<f64>,
}

impl Default for AvcSpsInfo {
    fn default() -> Self {
        Self {
            profile_idc: 0,
            constraint_set_flags: 0,
            level_idc: 0,
            sps_id: 0,
            chroma_format_idc: 1,
            separate_colour_plane: false,
            bit_depth_luma: 8,
            bit_depth_chroma: 8,
            pic_order_cnt_type: 0,
            max_num_ref_frames: 0,
            frame_mbs_only: true,
            width: 0,
            height: 0,
            vui_present: false,
            sample_aspect_ratio: None,
            video_full_range: None,
            colour_description: None,
            framerate: None,
        }
    }
}

impl AvcSpsInfo {
    /// 获取类型化的 constraint_set 标志 (忽略保留位)
    pub fn constraints(&self) -> ConstraintSetFlags {
        ConstraintSetFlags::from_bits_truncate(self.constraint_set_flags)
    }
}

/// 预定义的 SAR 表 (ITU-T H.264 表 E-1)
const SAR_TABLE: [(u32, u32); 17] = [
    (0, 1),    // 0: 未指定
    (1, 1),    // 1: 1:1
    (12, 11),  // 2: 12:11
    (10, 11),  // 3: 10:11
    (16, 11),  // 4: 16:11
    (40, 33),  // 5: 40:33
    (24, 11),  // 6: 24:11
    (20, 11),  // 7: 20:11
    (32, 11),  // 8: 32:11
    (80, 33),  // 9: 80:33
    (18, 11),  // 10: 18:11
    (15, 11),  // 11: 15:11
    (64, 33),  // 12: 64:33
    (160, 99), // 13: 160:99
    (4, 3),    // 14: 4:3
    (3, 2),    // 15: 3:2
    (2, 1),    // 16: 2:1
];

/// Extended_SAR 标记
const EXTENDED_SAR: u32 = 255;

/// 解析 SPS NAL 单元 (含 1 字节 NAL 头部, 可含防竞争字节)
pub fn parse_avc_sps(nal: &[u8]) -> NalResult<AvcSpsInfo> {
    if nal.is_empty() {
        return Err(NalError::TooShort {
            what: "H.264 SPS",
            len: 0,
            min: 1,
        });
    }

    let rbsp = remove_emulation_prevention(nal);
    let mut br = BitReader::new(&rbsp);
    let mut sps = AvcSpsInfo::default();

    // NAL 头部
    br.skip_bits(8)?;

    sps.profile_idc = br.read_bits(8)? as u8;
    sps.constraint_set_flags = br.read_bits(8)? as u8;
    sps.level_idc = br.read_bits(8)? as u8;
    sps.sps_id = br.read_ue()?;

    // High profile 及以上有额外字段
    if is_high_profile(sps.profile_idc) {
        sps.chroma_format_idc = br.read_ue()?;
        if sps.chroma_format_idc == 3 {
            sps.separate_colour_plane = br.read_flag()?;
        }
        sps.bit_depth_luma = br.read_ue()?.saturating_add(8);
        sps.bit_depth_chroma = br.read_ue()?.saturating_add(8);
        br.skip_bits(1)?; // qpprime_y_zero_transform_bypass_flag

        // seq_scaling_matrix_present_flag
        if br.read_flag()? {
            skip_scaling_lists(&mut br, sps.chroma_format_idc)?;
        }
    }

    br.read_ue()?; // log2_max_frame_num_minus4

    sps.pic_order_cnt_type = br.read_ue()?;
    match sps.pic_order_cnt_type {
        0 => {
            br.read_ue()?; // log2_max_pic_order_cnt_lsb_minus4
        }
        1 => {
            br.skip_bits(1)?; // delta_pic_order_always_zero_flag
            br.read_se()?; // offset_for_non_ref_pic
            br.read_se()?; // offset_for_top_to_bottom_field
            let num_ref_frames_in_cycle = br.read_ue()?;
            for _ in 0..num_ref_frames_in_cycle {
                br.read_se()?;
            }
        }
        _ => {}
    }

    sps.max_num_ref_frames = br.read_ue()?;
    br.skip_bits(1)?; // gaps_in_frame_num_value_allowed_flag

    let pic_width_in_mbs_minus1 = br.read_ue()?;
    let pic_height_in_map_units_minus1 = br.read_ue()?;

    sps.frame_mbs_only = br.read_flag()?;
    if !sps.frame_mbs_only {
        br.skip_bits(1)?; // mb_adaptive_frame_field_flag
    }
    br.skip_bits(1)?; // direct_8x8_inference_flag

    let (mut crop_left, mut crop_right, mut crop_top, mut crop_bottom) = (0, 0, 0, 0);
    if br.read_flag()? {
        crop_left = br.read_ue()?;
        crop_right = br.read_ue()?;
        crop_top = br.read_ue()?;
        crop_bottom = br.read_ue()?;
    }

    let field_factor = if sps.frame_mbs_only { 1 } else { 2 };
    let (crop_unit_x, crop_unit_y) = cropping_unit(sps.chroma_format_idc, sps.frame_mbs_only);

    sps.width = pic_width_in_mbs_minus1
        .saturating_add(1)
        .saturating_mul(16)
        .saturating_sub(crop_left.saturating_add(crop_right).saturating_mul(crop_unit_x));
    sps.height = pic_height_in_map_units_minus1
        .saturating_add(1)
        .saturating_mul(16)
        .saturating_mul(field_factor)
        .saturating_sub(crop_top.saturating_add(crop_bottom).saturating_mul(crop_unit_y));

    sps.vui_present = br.read_flag()?;
    if sps.vui_present && br.has_more_data() {
        parse_vui(&mut br, &mut sps)?;
    }

    Ok(sps)
}

/// 是否为带 chroma_format_idc 等扩展字段的 profile
fn is_high_profile(profile_idc: u8) -> bool {
    matches!(
        profile_idc,
        100 | 110 | 122 | 244 | 44 | 83 | 86 | 118 | 128 | 138 | 139 | 134 | 135
    )
}

/// 计算 cropping 单位 (crop_unit_x, crop_unit_y)
fn cropping_unit(chroma_format_idc: u32, frame_mbs_only: bool) -> (u32, u32) {
    let (sub_width_c, sub_height_c) = match chroma_format_idc {
        0 | 3 => (1, 1),
        1 => (2, 2),
        _ => (2, 1),
    };
    let field_factor = if frame_mbs_only { 1 } else { 2 };
    (sub_width_c, sub_height_c * field_factor)
}

/// 跳过 seq_scaling_list, 只消耗比特
fn skip_scaling_lists(br: &mut BitReader, chroma_format_idc: u32) -> NalResult<()> {
    let count = if chroma_format_idc == 3 { 12 } else { 8 };
    for i in 0..count {
        // seq_scaling_list_present_flag
        if !br.read_flag()? {
            continue;
        }
        let size = if i < 6 { 16 } else { 64 };
        let mut last_scale: i64 = 8;
        let mut next_scale: i64 = 8;
        for _ in 0..size {
            if next_scale != 0 {
                let delta_scale = i64::from(br.read_se()?);
                next_scale = (last_scale + delta_scale + 256).rem_euclid(256);
            }
            if next_scale != 0 {
                last_scale = next_scale;
            }
        }
    }
    Ok(())
}

/// 解析 VUI 参数, 截止到 timing_info
fn parse_vui(br: &mut BitReader, sps: &mut AvcSpsInfo) -> NalResult<()> {
    // aspect_ratio_info_present_flag
    if br.read_flag()? {
        let ar_idc = br.read_bits(8)?;
        if ar_idc == EXTENDED_SAR {
            let sar_w = br.read_bits(16)?;
            let sar_h = br.read_bits(16)?;
            if sar_w > 0 && sar_h > 0 {
                sps.sample_aspect_ratio = Some((sar_w, sar_h));
            }
        } else if let Some(&(w, h)) = SAR_TABLE.get(ar_idc as usize) {
            if w > 0 {
                sps.sample_aspect_ratio = Some((w, h));
            }
        }
    }

    // overscan_info_present_flag
    if br.read_flag()? {
        br.skip_bits(1)?; // overscan_appropriate_flag
    }

    // video_signal_type_present_flag
    if br.read_flag()? {
        br.skip_bits(3)?; // video_format
        sps.video_full_range = Some(br.read_flag()?);
        // colour_description_present_flag
        if br.read_flag()? {
            sps.colour_description = Some(ColourDescription {
                colour_primaries: br.read_bits(8)? as u8,
                transfer_characteristics: br.read_bits(8)? as u8,
                matrix_coefficients: br.read_bits(8)? as u8,
            });
        }
    }

    // chroma_loc_info_present_flag
    if br.read_flag()? {
        br.read_ue()?; // chroma_sample_loc_type_top_field
        br.read_ue()?; // chroma_sample_loc_type_bottom_field
    }

    // timing_info_present_flag
    if br.has_more_data() && br.read_flag()? {
        let num_units_in_tick = br.read_bits(32)?;
        let time_scale = br.read_bits(32)?;
        // H.264 定义: fps = time_scale / (2 * num_units_in_tick)
        if num_units_in_tick > 0 {
            sps.framerate = Some(f64::from(time_scale) / (2.0 * f64::from(num_units_in_tick)));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsers::test_bits::BitWriter;

    /// 写入 NAL 头部和 profile/constraint/level/sps_id
    fn sps_prefix(w: &mut BitWriter, profile: u8, constraints: u8, level: u8) {
        w.bits(0x67, 8)
            .bits(u64::from(profile), 8)
            .bits(u64::from(constraints), 8)
            .bits(u64::from(level), 8)
            .ue(0);
    }

    /// 写入 log2_max_frame_num 到 frame_cropping 的通用部分
    fn sps_body(w: &mut BitWriter, width: u32, height: u32) {
        w.ue(0) // log2_max_frame_num_minus4
            .ue(0) // pic_order_cnt_type
            .ue(0) // log2_max_pic_order_cnt_lsb_minus4
            .ue(4) // max_num_ref_frames
            .flag(false); // gaps_in_frame_num_value_allowed_flag

        let mbs_w = width.div_ceil(16);
        let mbs_h = height.div_ceil(16);
        w.ue(mbs_w - 1).ue(mbs_h - 1);
        w.flag(true); // frame_mbs_only_flag
        w.flag(false); // direct_8x8_inference_flag

        let raw_w = mbs_w * 16;
        let raw_h = mbs_h * 16;
        if raw_w != width || raw_h != height {
            w.flag(true)
                .ue(0)
                .ue((raw_w - width) / 2)
                .ue(0)
                .ue((raw_h - height) / 2);
        } else {
            w.flag(false);
        }
    }

    /// 构造测试用 SPS NAL (无 VUI)
    fn build_test_sps(profile: u8, level: u8, width: u32, height: u32) -> Vec<u8> {
        let mut w = BitWriter::new();
        sps_prefix(&mut w, profile, 0xC0, level);
        if is_high_profile(profile) {
            w.ue(1).ue(0).ue(0).flag(false).flag(false);
        }
        sps_body(&mut w, width, height);
        w.flag(false); // vui_parameters_present_flag
        w.finish()
    }

    /// 构造带 VUI 的 SPS NAL
    fn build_test_sps_with_vui(num_units: u32, time_scale: u32) -> Vec<u8> {
        let mut w = BitWriter::new();
        sps_prefix(&mut w, 66, 0xC0, 30);
        sps_body(&mut w, 1920, 1080);
        w.flag(true); // vui_parameters_present_flag
        w.flag(true).bits(1, 8); // aspect_ratio_idc = 1 (1:1)
        w.flag(false); // overscan_info_present_flag
        w.flag(true).bits(5, 3).flag(true); // video_format, full_range
        w.flag(true).bits(1, 8).bits(1, 8).bits(1, 8); // BT.709
        w.flag(false); // chroma_loc_info_present_flag
        w.flag(true).bits(u64::from(num_units), 32).bits(u64::from(time_scale), 32);
        w.flag(true); // fixed_frame_rate_flag
        w.finish()
    }

    #[test]
    fn test_sps_baseline_profile() {
        let nal = build_test_sps(66, 30, 640, 480);
        let sps = parse_avc_sps(&nal).unwrap();

        assert_eq!(sps.profile_idc, 66);
        assert_eq!(sps.level_idc, 30);
        assert_eq!(sps.width, 640);
        assert_eq!(sps.height, 480);
        assert_eq!(sps.chroma_format_idc, 1); // 默认 4:2:0
        assert_eq!(sps.bit_depth_luma, 8);
        assert_eq!(sps.bit_depth_chroma, 8);
        assert_eq!(sps.max_num_ref_frames, 4);
        assert!(sps.frame_mbs_only);
        assert!(sps.framerate.is_none());
    }

    #[test]
    fn test_sps_cropping_1080p() {
        let nal = build_test_sps(100, 41, 1920, 1080);
        let sps = parse_avc_sps(&nal).unwrap();

        assert_eq!(sps.profile_idc, 100);
        assert_eq!(sps.level_idc, 41);
        assert_eq!(sps.width, 1920);
        assert_eq!(sps.height, 1080);
    }

    #[test]
    fn test_sps_constraint_flags() {
        let nal = build_test_sps(66, 30, 320, 240);
        let sps = parse_avc_sps(&nal).unwrap();
        assert_eq!(sps.constraint_set_flags, 0xC0);
        assert_eq!(
            sps.constraints(),
            ConstraintSetFlags::CONSTRAINT_SET0 | ConstraintSetFlags::CONSTRAINT_SET1
        );
    }

    #[test]
    fn test_sps_high_10_422() {
        let mut w = BitWriter::new();
        sps_prefix(&mut w, 122, 0x00, 40);
        w.ue(2) // chroma_format_idc = 4:2:2
            .ue(2) // bit_depth_luma_minus8
            .ue(2) // bit_depth_chroma_minus8
            .flag(false)
            .flag(false);
        sps_body(&mut w, 1280, 720);
        w.flag(false);
        let sps = parse_avc_sps(&w.finish()).unwrap();

        assert_eq!(sps.chroma_format_idc, 2);
        assert_eq!(sps.bit_depth_luma, 10);
        assert_eq!(sps.bit_depth_chroma, 10);
        assert_eq!(sps.width, 1280);
        assert_eq!(sps.height, 720);
    }

    #[test]
    fn test_sps_444_separate_colour_plane() {
        let mut w = BitWriter::new();
        sps_prefix(&mut w, 244, 0x00, 51);
        w.ue(3).flag(true).ue(0).ue(0).flag(false).flag(false);
        sps_body(&mut w, 640, 480);
        w.flag(false);
        let sps = parse_avc_sps(&w.finish()).unwrap();

        assert_eq!(sps.chroma_format_idc, 3);
        assert!(sps.separate_colour_plane);
        assert_eq!(sps.width, 640);
    }

    #[test]
    fn test_sps_scaling_lists_consumed() {
        let mut w = BitWriter::new();
        sps_prefix(&mut w, 100, 0x00, 40);
        w.ue(1).ue(0).ue(0).flag(false);
        w.flag(true); // seq_scaling_matrix_present_flag
        // 列表 0: 16 个 delta, 全部为 +1
        w.flag(true);
        for _ in 0..16 {
            w.se(1);
        }
        // 列表 1: delta 使 next_scale 归零, 之后不再读取
        w.flag(true).se(-8);
        // 列表 2..5 不存在
        for _ in 2..6 {
            w.flag(false);
        }
        // 列表 6: 8x8, 64 个 delta
        w.flag(true);
        for _ in 0..64 {
            w.se(0);
        }
        w.flag(false);
        sps_body(&mut w, 1280, 720);
        w.flag(false);
        let sps = parse_avc_sps(&w.finish()).unwrap();

        assert_eq!(sps.width, 1280);
        assert_eq!(sps.height, 720);
    }

    #[test]
    fn test_sps_poc_type1_and_interlaced() {
        let mut w = BitWriter::new();
        sps_prefix(&mut w, 77, 0x40, 30);
        w.ue(0) // log2_max_frame_num_minus4
            .ue(1) // pic_order_cnt_type
            .flag(false)
            .se(-1)
            .se(2)
            .ue(2)
            .se(3)
            .se(-3)
            .ue(1) // max_num_ref_frames
            .flag(false);
        w.ue(44) // 720 / 16 - 1
            .ue(17); // 576 / 32 - 1
        w.flag(false) // frame_mbs_only_flag
            .flag(true) // mb_adaptive_frame_field_flag
            .flag(true) // direct_8x8_inference_flag
            .flag(false) // frame_cropping_flag
            .flag(false);
        let sps = parse_avc_sps(&w.finish()).unwrap();

        assert_eq!(sps.pic_order_cnt_type, 1);
        assert!(!sps.frame_mbs_only);
        assert_eq!(sps.width, 720);
        assert_eq!(sps.height, 576);
    }

    #[test]
    fn test_sps_interlaced_crop_unit_doubles() {
        let mut w = BitWriter::new();
        sps_prefix(&mut w, 77, 0x00, 40);
        w.ue(0).ue(2).ue(4).flag(false);
        w.ue(119).ue(33); // 1920 x 1088 (场编码)
        w.flag(false).flag(false).flag(true);
        w.flag(true).ue(0).ue(0).ue(0).ue(2); // bottom 2 * 4 = 8 行
        w.flag(false);
        let sps = parse_avc_sps(&w.finish()).unwrap();

        assert_eq!(sps.pic_order_cnt_type, 2);
        assert_eq!(sps.width, 1920);
        assert_eq!(sps.height, 1080);
    }

    #[test]
    fn test_sps_monochrome_crop_unit() {
        let mut w = BitWriter::new();
        sps_prefix(&mut w, 100, 0x00, 30);
        w.ue(0).ue(0).ue(0).flag(false).flag(false);
        w.ue(0).ue(2).ue(1).flag(false);
        w.ue(3).ue(3).flag(true).flag(true);
        w.flag(true).ue(1).ue(1).ue(2).ue(2);
        w.flag(false);
        let sps = parse_avc_sps(&w.finish()).unwrap();

        assert_eq!(sps.chroma_format_idc, 0);
        assert_eq!(sps.width, 64 - 2);
        assert_eq!(sps.height, 64 - 4);
    }

    #[test]
    fn test_sps_frame_rate_extract() {
        let nal = build_test_sps_with_vui(1001, 60000);
        let sps = parse_avc_sps(&nal).unwrap();

        assert!(sps.vui_present);
        let fps = sps.framerate.unwrap();
        assert!((fps - 29.97).abs() < 0.01, "actual={fps}");
        assert_eq!(sps.sample_aspect_ratio, Some((1, 1)));
        assert_eq!(sps.video_full_range, Some(true));
        assert_eq!(
            sps.colour_description,
            Some(ColourDescription {
                colour_primaries: 1,
                transfer_characteristics: 1,
                matrix_coefficients: 1,
            })
        );
    }

    #[test]
    fn test_sps_zero_num_units_has_no_framerate() {
        let nal = build_test_sps_with_vui(0, 60000);
        let sps = parse_avc_sps(&nal).unwrap();
        assert!(sps.vui_present);
        assert!(sps.framerate.is_none());
    }

    #[test]
    fn test_sps_extended_sar() {
        let mut w = BitWriter::new();
        sps_prefix(&mut w, 66, 0x00, 30);
        sps_body(&mut w, 720, 480);
        w.flag(true);
        w.flag(true).bits(255, 8).bits(40, 16).bits(33, 16);
        w.flag(false).flag(false).flag(false).flag(false);
        let sps = parse_avc_sps(&w.finish()).unwrap();

        assert_eq!(sps.sample_aspect_ratio, Some((40, 33)));
        assert!(sps.framerate.is_none());
    }

    #[test]
    fn test_sps_emulation_prevention_removed() {
        // level_idc = 0, sps_id = 0 之前的 00 00 需要防竞争字节
        let mut w = BitWriter::new();
        sps_prefix(&mut w, 66, 0x00, 0x00);
        sps_body(&mut w, 640, 480);
        w.flag(false);
        let raw = w.finish();
        assert_eq!(&raw[..4], &[0x67, 0x42, 0x00, 0x00]);

        let mut escaped = raw[..4].to_vec();
        escaped.push(0x03);
        escaped.extend_from_slice(&raw[4..]);
        let sps = parse_avc_sps(&escaped).unwrap();
        assert_eq!(sps.width, 640);
        assert_eq!(sps.height, 480);
    }

    #[test]
    fn test_sps_truncated_fails() {
        let nal = build_test_sps(66, 30, 640, 480);
        let err = parse_avc_sps(&nal[..5]).unwrap_err();
        assert_eq!(err, NalError::OutOfData);
    }

    #[test]
    fn test_sps_empty_input() {
        let err = parse_avc_sps(&[]).unwrap_err();
        assert!(matches!(err, NalError::TooShort { min: 1, .. }));
    }

    #[test]
    fn test_sps_oversized_crop_saturates() {
        let mut w = BitWriter::new();
        sps_prefix(&mut w, 66, 0x00, 30);
        w.ue(0).ue(2).ue(1).flag(false);
        w.ue(0).ue(0).flag(true).flag(false);
        w.flag(true).ue(100).ue(100).ue(100).ue(100);
        w.flag(false);
        let sps = parse_avc_sps(&w.finish()).unwrap();
        assert_eq!(sps.width, 0);
        assert_eq!(sps.height, 0);
    }
}
