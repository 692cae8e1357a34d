//! 探测结果的输出结构与文本渲染.

use serde::Serialize;

use nalscope_codec::codec_string::CodecParameters;
use nalscope_codec::parsers::h264::{
    AvcAnnexBInfo, AvcDescriptionInfo, AvcNalUnitHeader, AvcPpsInfo, AvcSpsInfo,
};
use nalscope_codec::parsers::h265::{
    HevcAnnexBInfo, HevcDescriptionInfo, HevcNalUnitHeader, HevcPpsInfo, HevcSpsInfo, HevcVpsInfo,
};

// ============================================================
// JSON 输出结构体
// ============================================================

/// 完整探测结果
#[derive(Serialize, Default)]
pub struct ProbeOutput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stream: Option<StreamReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub codec_string: Option<CodecStringReport>,
}

/// 码流文件探测结果
#[derive(Serialize)]
pub struct StreamReport {
    pub filename: String,
    pub codec_name: String,
    pub layout: String,
    pub nb_nal_units: usize,
    pub nb_key_frames: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config: Option<ConfigRecordInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vps: Option<VpsSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sps: Option<SpsSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pps: Option<PpsSummary>,
    pub nal_units: Vec<NalUnitInfo>,
}

/// 配置记录头部
#[derive(Serialize)]
pub struct ConfigRecordInfo {
    pub profile_idc: u8,
    pub level_idc: u8,
    pub length_size: u8,
}

/// NAL 单元头部
#[derive(Serialize)]
pub struct NalUnitInfo {
    pub index: usize,
    pub nal_unit_type: u8,
    pub type_name: String,
    pub key_frame: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nal_ref_idc: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub layer_id: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temporal_id_plus1: Option<u8>,
}

/// VPS 摘要
#[derive(Serialize)]
pub struct VpsSummary {
    pub vps_id: u8,
    pub max_layers: u8,
    pub max_sub_layers: u8,
}

/// SPS 摘要
#[derive(Serialize)]
pub struct SpsSummary {
    pub sps_id: u32,
    pub profile_idc: u8,
    pub level_idc: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tier: Option<String>,
    pub chroma_format_idc: u32,
    pub width: u32,
    pub height: u32,
    pub bit_depth_luma: u32,
    pub bit_depth_chroma: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frame_rate: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sample_aspect_ratio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_range: Option<bool>,
}

/// PPS 摘要
#[derive(Serialize)]
pub struct PpsSummary {
    pub pps_id: u32,
    pub sps_id: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entropy_coding: Option<String>,
}

/// codec 字符串解析结果
#[derive(Serialize)]
pub struct CodecStringReport {
    pub input: String,
    pub codec_name: String,
    pub fourcc: String,
    pub details: String,
}

// ============================================================
// 构建
// ============================================================

impl StreamReport {
    /// 从 H.264 Annex B 结果构建
    pub fn from_avc_annexb(filename: &str, info: &AvcAnnexBInfo) -> Self {
        Self::avc(filename, "annexb", None, &info.nal_units, info.sps.as_ref(), info.pps.as_ref())
    }

    /// 从 avcC 结果构建
    pub fn from_avc_description(filename: &str, info: &AvcDescriptionInfo) -> Self {
        let config = ConfigRecordInfo {
            profile_idc: info.profile_indication,
            level_idc: info.level_indication,
            length_size: info.length_size,
        };
        Self::avc(
            filename,
            "avcC",
            Some(config),
            &info.nal_units,
            info.sps.as_ref(),
            info.pps.as_ref(),
        )
    }

    /// 从 H.265 Annex B 结果构建
    pub fn from_hevc_annexb(filename: &str, info: &HevcAnnexBInfo) -> Self {
        Self::hevc(
            filename,
            "annexb",
            None,
            &info.nal_units,
            (info.vps.as_ref(), info.sps.as_ref(), info.pps.as_ref()),
        )
    }

    /// 从 hvcC 结果构建
    pub fn from_hevc_description(filename: &str, info: &HevcDescriptionInfo) -> Self {
        let config = ConfigRecordInfo {
            profile_idc: info.general_profile_idc,
            level_idc: info.general_level_idc,
            length_size: info.length_size,
        };
        Self::hevc(
            filename,
            "hvcC",
            Some(config),
            &info.nal_units,
            (info.vps.as_ref(), info.sps.as_ref(), info.pps.as_ref()),
        )
    }

    fn avc(
        filename: &str,
        layout: &str,
        config: Option<ConfigRecordInfo>,
        headers: &[AvcNalUnitHeader],
        sps: Option<&AvcSpsInfo>,
        pps: Option<&AvcPpsInfo>,
    ) -> Self {
        let nal_units: Vec<NalUnitInfo> = headers
            .iter()
            .enumerate()
            .map(|(index, h)| NalUnitInfo {
                index,
                nal_unit_type: h.nal_unit_type,
                type_name: h.unit_type().to_string(),
                key_frame: h.is_key_frame,
                nal_ref_idc: Some(h.nal_ref_idc),
                layer_id: None,
                temporal_id_plus1: None,
            })
            .collect();

        Self {
            filename: filename.to_string(),
            codec_name: "h264".to_string(),
            layout: layout.to_string(),
            nb_nal_units: nal_units.len(),
            nb_key_frames: nal_units.iter().filter(|n| n.key_frame).count(),
            config,
            vps: None,
            sps: sps.map(avc_sps_summary),
            pps: pps.map(|p| PpsSummary {
                pps_id: p.pps_id,
                sps_id: p.sps_id,
                entropy_coding: Some(
                    if p.entropy_coding_mode_flag { "CABAC" } else { "CAVLC" }.to_string(),
                ),
            }),
            nal_units,
        }
    }

    fn hevc(
        filename: &str,
        layout: &str,
        config: Option<ConfigRecordInfo>,
        headers: &[HevcNalUnitHeader],
        (vps, sps, pps): (Option<&HevcVpsInfo>, Option<&HevcSpsInfo>, Option<&HevcPpsInfo>),
    ) -> Self {
        let nal_units: Vec<NalUnitInfo> = headers
            .iter()
            .enumerate()
            .map(|(index, h)| NalUnitInfo {
                index,
                nal_unit_type: h.nal_unit_type,
                type_name: h.unit_type().to_string(),
                key_frame: h.is_key_frame,
                nal_ref_idc: None,
                layer_id: Some(h.nuh_layer_id),
                temporal_id_plus1: Some(h.nuh_temporal_id_plus1),
            })
            .collect();

        Self {
            filename: filename.to_string(),
            codec_name: "hevc".to_string(),
            layout: layout.to_string(),
            nb_nal_units: nal_units.len(),
            nb_key_frames: nal_units.iter().filter(|n| n.key_frame).count(),
            config,
            vps: vps.map(|v| VpsSummary {
                vps_id: v.vps_id,
                max_layers: v.max_layers_minus1.saturating_add(1),
                max_sub_layers: v.max_sub_layers_minus1.saturating_add(1),
            }),
            sps: sps.map(hevc_sps_summary),
            pps: pps.map(|p| PpsSummary {
                pps_id: p.pps_id,
                sps_id: p.sps_id,
                entropy_coding: None,
            }),
            nal_units,
        }
    }
}

fn avc_sps_summary(sps: &AvcSpsInfo) -> SpsSummary {
    SpsSummary {
        sps_id: sps.sps_id,
        profile_idc: sps.profile_idc,
        level_idc: sps.level_idc,
        tier: None,
        chroma_format_idc: sps.chroma_format_idc,
        width: sps.width,
        height: sps.height,
        bit_depth_luma: sps.bit_depth_luma,
        bit_depth_chroma: sps.bit_depth_chroma,
        frame_rate: sps.framerate,
        sample_aspect_ratio: sps.sample_aspect_ratio.map(|(w, h)| format!("{w}:{h}")),
        full_range: sps.video_full_range,
    }
}

fn hevc_sps_summary(sps: &HevcSpsInfo) -> SpsSummary {
    SpsSummary {
        sps_id: sps.sps_id,
        profile_idc: sps.general_profile_idc,
        level_idc: sps.general_level_idc,
        tier: Some(if sps.general_tier_flag { "High" } else { "Main" }.to_string()),
        chroma_format_idc: sps.chroma_format_idc,
        width: sps.width,
        height: sps.height,
        bit_depth_luma: sps.bit_depth_luma,
        bit_depth_chroma: sps.bit_depth_chroma,
        frame_rate: sps.framerate,
        sample_aspect_ratio: None,
        full_range: None,
    }
}

impl CodecStringReport {
    pub fn new(input: &str, params: &CodecParameters) -> Self {
        let codec_id = params.codec_id();
        Self {
            input: input.to_string(),
            codec_name: codec_id.name().to_string(),
            fourcc: codec_id.fourcc().to_string(),
            details: params.to_string(),
        }
    }
}

// ============================================================
// 文本输出
// ============================================================

/// 文本输出: 码流信息
pub fn print_stream_text(report: &StreamReport, show_nal_units: bool) {
    println!("[STREAM]");
    println!("  文件名       : {}", report.filename);
    println!("  编解码器     : {}", report.codec_name);
    println!("  封装方式     : {}", report.layout);
    println!("  NAL 单元数   : {}", report.nb_nal_units);
    println!("  关键帧 NAL   : {}", report.nb_key_frames);
    if let Some(ref config) = report.config {
        println!("  记录 profile : {}", config.profile_idc);
        println!("  记录 level   : {}", config.level_idc);
        println!("  长度前缀     : {} 字节", config.length_size);
    }
    println!("[/STREAM]");
    println!();

    if let Some(ref vps) = report.vps {
        println!("[VPS #{}]", vps.vps_id);
        println!("  层数         : {}", vps.max_layers);
        println!("  子层数       : {}", vps.max_sub_layers);
        println!("[/VPS]");
        println!();
    }

    if let Some(ref sps) = report.sps {
        println!("[SPS #{}]", sps.sps_id);
        println!("  profile_idc  : {}", sps.profile_idc);
        println!("  level_idc    : {}", sps.level_idc);
        if let Some(ref tier) = sps.tier {
            println!("  tier         : {tier}");
        }
        println!("  色度格式     : {}", sps.chroma_format_idc);
        println!("  分辨率       : {}x{}", sps.width, sps.height);
        println!(
            "  位深         : {} (亮度) / {} (色度)",
            sps.bit_depth_luma, sps.bit_depth_chroma
        );
        if let Some(fps) = sps.frame_rate {
            println!("  帧率         : {fps:.3}");
        }
        if let Some(ref sar) = sps.sample_aspect_ratio {
            println!("  SAR          : {sar}");
        }
        if let Some(full_range) = sps.full_range {
            println!("  全范围       : {full_range}");
        }
        println!("[/SPS]");
        println!();
    }

    if let Some(ref pps) = report.pps {
        println!("[PPS #{}]", pps.pps_id);
        println!("  引用 SPS     : {}", pps.sps_id);
        if let Some(ref entropy) = pps.entropy_coding {
            println!("  熵编码       : {entropy}");
        }
        println!("[/PPS]");
        println!();
    }

    if show_nal_units {
        println!("[NAL_UNITS]");
        for nal in &report.nal_units {
            println!(
                "  #{:<4} type={:<2} {:<16} key={}",
                nal.index, nal.nal_unit_type, nal.type_name, nal.key_frame
            );
        }
        println!("[/NAL_UNITS]");
        println!();
    }
}

/// 文本输出: codec 字符串
pub fn print_codec_string_text(report: &CodecStringReport) {
    println!("[CODEC_STRING]");
    println!("  输入         : {}", report.input);
    println!("  编解码器     : {}", report.codec_name);
    println!("  FourCC       : {}", report.fourcc);
    println!("  参数         : {}", report.details);
    println!("[/CODEC_STRING]");
    println!();
}
