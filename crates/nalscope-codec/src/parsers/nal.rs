//! H.264/H.265 共用的 NAL 单元工具.
//!
//! # Annex B 格式
//!
//! Annex B 使用起始码 (start code) 分隔 NAL 单元:
//! - 3 字节起始码: `00 00 01`
//! - 4 字节起始码: `00 00 00 01`
//!
//! 本模块只负责定位 NAL 单元边界和去除防竞争字节, 不解释 NAL 内容.

/// NAL 单元在原始缓冲区中的位置 (不含起始码)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NalUnitSpan {
    /// NAL 数据 (含 NAL 头部) 的起始偏移
    pub offset: usize,
    /// NAL 数据长度, 始终大于 0
    pub length: usize,
}

impl NalUnitSpan {
    /// NAL 数据结束位置 (不含)
    pub fn end(&self) -> usize {
        self.offset + self.length
    }

    /// 从原始缓冲区中切出该 NAL 单元
    ///
    /// `data` 必须是产生该 span 的同一缓冲区.
    pub fn slice<'a>(&self, data: &'a [u8]) -> &'a [u8] {
        &data[self.offset..self.end()]
    }
}

/// 在 Annex B 字节流中查找所有 NAL 单元
///
/// 从左到右匹配第一个合法起始码, NAL 单元在下一个起始码 (3 或 4 字节) 之前
/// 或缓冲区末尾结束. 长度为 0 的单元被丢弃. 少于 4 字节的缓冲区不产生任何单元.
pub fn find_annexb_nal_units(data: &[u8]) -> Vec<NalUnitSpan> {
    let mut spans = Vec::new();

    // 最小起始码 + 1 字节数据
    if data.len() < 4 {
        return spans;
    }

    let mut pos = 0;
    while let Some(start) = next_unit_start(data, pos) {
        let end = find_next_start_code(data, start).unwrap_or(data.len());
        if end > start {
            spans.push(NalUnitSpan {
                offset: start,
                length: end - start,
            });
        }
        pos = end;
    }

    spans
}

/// 从 `pos` 开始查找起始码, 返回起始码之后的位置
fn next_unit_start(data: &[u8], mut pos: usize) -> Option<usize> {
    while pos + 2 < data.len() {
        if data[pos] == 0x00 && data[pos + 1] == 0x00 {
            if data[pos + 2] == 0x01 {
                // 3 字节起始码
                return Some(pos + 3);
            }
            if pos + 3 < data.len() && data[pos + 2] == 0x00 && data[pos + 3] == 0x01 {
                // 4 字节起始码
                return Some(pos + 4);
            }
        }
        pos += 1;
    }
    None
}

/// 从 `from` 开始查找下一个起始码 (3 或 4 字节) 的首字节位置
fn find_next_start_code(data: &[u8], from: usize) -> Option<usize> {
    (from..data.len().saturating_sub(2)).find(|&j| {
        data[j] == 0x00
            && data[j + 1] == 0x00
            && (data[j + 2] == 0x01
                || (j + 3 < data.len() && data[j + 2] == 0x00 && data[j + 3] == 0x01))
    })
}

/// 移除 emulation prevention 字节 (0x00 0x00 0x03 → 0x00 0x00)
///
/// 输入为含 NAL 头部的原始 NAL 数据. 命中 `00 00 03` 时保留两个 0x00,
/// 丢弃 0x03, 并从 0x03 之后继续扫描. 不含该模式的输入原样返回.
pub fn remove_emulation_prevention(data: &[u8]) -> Vec<u8> {
    let mut rbsp = Vec::with_capacity(data.len());
    let mut i = 0;

    while i < data.len() {
        let is_emulation_prevention =
            i + 2 < data.len() && data[i] == 0x00 && data[i + 1] == 0x00 && data[i + 2] == 0x03;
        if is_emulation_prevention {
            rbsp.push(0x00);
            rbsp.push(0x00);
            i += 3; // 跳过 0x03
        } else {
            rbsp.push(data[i]);
            i += 1;
        }
    }

    rbsp
}

/// 读取 2 字节大端长度前缀及其后的数据 (配置记录中的参数集条目)
///
/// 长度字段或数据被截断时返回 None. 长度字段完整时 `pos` 总会前移 2 字节.
pub(crate) fn take_length_prefixed<'a>(data: &'a [u8], pos: &mut usize) -> Option<&'a [u8]> {
    let len_bytes = data.get(*pos..pos.checked_add(2)?)?;
    let len = usize::from(u16::from_be_bytes([len_bytes[0], len_bytes[1]]));
    *pos += 2;

    let nal = data.get(*pos..*pos + len)?;
    *pos += len;
    Some(nal)
}
