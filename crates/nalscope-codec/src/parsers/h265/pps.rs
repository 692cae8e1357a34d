//! H.265/HEVC PPS 解析器, 只读取 PPS ID 与引用的 SPS ID.

use nalscope_core::{BitReader, NalError, NalResult};

use crate::parsers::nal::remove_emulation_prevention;

/// PPS 解析结果
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HevcPpsInfo {
    /// pps_pic_parameter_set_id
    pub pps_id: u32,
    /// pps_seq_parameter_set_id
    pub sps_id: u32,
}

/// 解析 PPS NAL 单元 (含 2 字节 NAL 头部, 可含防竞争字节)
pub fn parse_hevc_pps(nal: &[u8]) -> NalResult<HevcPpsInfo> {
    if nal.len() < 2 {
        return Err(NalError::TooShort {
            what: "HEVC PPS",
            len: nal.len(),
            min: 2,
        });
    }

    let rbsp = remove_emulation_prevention(nal);
    let mut br = BitReader::new(&rbsp);
    br.skip_bits(16)?;

    Ok(HevcPpsInfo {
        pps_id: br.read_ue()?,
        sps_id: br.read_ue()?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pps_ids() {
        // pps_id=0 ("1"), sps_id=2 ("011")
        let pps = parse_hevc_pps(&[0x44, 0x01, 0b1011_0000]).unwrap();
        assert_eq!(pps.pps_id, 0);
        assert_eq!(pps.sps_id, 2);
    }

    #[test]
    fn test_pps_header_only() {
        assert_eq!(parse_hevc_pps(&[0x44, 0x01]).unwrap_err(), NalError::OutOfData);
    }

    #[test]
    fn test_pps_empty() {
        let err = parse_hevc_pps(&[]).unwrap_err();
        assert!(matches!(err, NalError::TooShort { len: 0, min: 2, .. }));
    }
}
