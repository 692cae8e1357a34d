//! H.264 PPS (Picture Parameter Set) 解析器.
//!
//! 只读取 PPS 开头的 ID 与熵编码模式, 其余语法不解析.

use nalscope_core::{BitReader, NalError, NalResult};

use crate::parsers::nal::remove_emulation_prevention;

/// PPS 解析结果
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AvcPpsInfo {
    /// PPS ID (pic_parameter_set_id)
    pub pps_id: u32,
    /// 引用的 SPS ID
    pub sps_id: u32,
    /// entropy_coding_mode_flag (false=CAVLC, true=CABAC)
    pub entropy_coding_mode_flag: bool,
}

/// 解析 PPS NAL 单元 (含 1 字节 NAL 头部, 可含防竞争字节)
pub fn parse_avc_pps(nal: &[u8]) -> NalResult<AvcPpsInfo> {
    if nal.is_empty() {
        return Err(NalError::TooShort {
            what: "H.264 PPS",
            len: 0,
            min: 1,
        });
    }

    let rbsp = remove_emulation_prevention(nal);
    let mut br = BitReader::new(&rbsp);

    // NAL 头部
    br.skip_bits(8)?;

    Ok(AvcPpsInfo {
        pps_id: br.read_ue()?,
        sps_id: br.read_ue()?,
        entropy_coding_mode_flag: br.read_flag()?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsers::test_bits::BitWriter;

    #[test]
    fn test_pps_basic() {
        // pps_id=0, sps_id=0, entropy=CABAC
        let pps = parse_avc_pps(&[0x68, 0xEE, 0x3C, 0x80]).unwrap();
        assert_eq!(pps.pps_id, 0);
        assert_eq!(pps.sps_id, 0);
        assert!(pps.entropy_coding_mode_flag);
    }

    #[test]
    fn test_pps_ids() {
        let mut w = BitWriter::new();
        w.bits(0x68, 8).ue(3).ue(1).flag(false);
        let pps = parse_avc_pps(&w.finish()).unwrap();
        assert_eq!(pps.pps_id, 3);
        assert_eq!(pps.sps_id, 1);
        assert!(!pps.entropy_coding_mode_flag);
    }

    #[test]
    fn test_pps_header_only_fails() {
        assert_eq!(parse_avc_pps(&[0x68]).unwrap_err(), NalError::OutOfData);
    }

    #[test]
    fn test_pps_empty_input() {
        let err = parse_avc_pps(&[]).unwrap_err();
        assert!(matches!(err, NalError::TooShort { min: 1, .. }));
    }
}
