//! 比特流读取器.
//!
//! 按大端位序 (MSB first) 从字节缓冲区中读取数据, 并提供 H.264/H.265 参数集
//! 中大量使用的 Exp-Golomb 可变长编码:
//! - `ue(v)`: 无符号 Exp-Golomb
//! - `se(v)`: 有符号 Exp-Golomb
//!
//! 任何越过缓冲区末尾的读取都返回 [`NalError::OutOfData`], 不会截断或补零.

use crate::{NalError, NalResult};

/// Exp-Golomb 允许的最大前导零个数
const MAX_LEADING_ZEROS: u32 = 31;

/// 比特流读取器
///
/// # 示例
/// ```
/// use nalscope_core::bitreader::BitReader;
///
/// // "1" → ue=0, "010" → ue=1, "011" → ue=2
/// let data = [0b1010_0110];
/// let mut br = BitReader::new(&data);
/// assert_eq!(br.read_ue().unwrap(), 0);
/// assert_eq!(br.read_ue().unwrap(), 1);
/// assert_eq!(br.read_ue().unwrap(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct BitReader<'a> {
    /// 源数据
    data: &'a [u8],
    /// 当前字节索引
    byte_pos: usize,
    /// 当前字节中的位位置 (0-7, 0 表示最高位)
    bit_pos: u8,
}

impl<'a> BitReader<'a> {
    /// 创建新的比特流读取器
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            byte_pos: 0,
            bit_pos: 0,
        }
    }

    /// 获取已读取的总位数
    pub fn bits_read(&self) -> usize {
        self.byte_pos * 8 + self.bit_pos as usize
    }

    /// 获取剩余可读位数
    pub fn bits_left(&self) -> usize {
        if self.byte_pos >= self.data.len() {
            return 0;
        }
        (self.data.len() - self.byte_pos) * 8 - self.bit_pos as usize
    }

    /// 是否还有可读数据
    pub fn has_more_data(&self) -> bool {
        self.bits_left() > 0
    }

    /// 读取 1 个位
    pub fn read_bit(&mut self) -> NalResult<u32> {
        if self.byte_pos >= self.data.len() {
            return Err(NalError::OutOfData);
        }

        let bit = (self.data[self.byte_pos] >> (7 - self.bit_pos)) & 1;
        self.bit_pos += 1;
        if self.bit_pos >= 8 {
            self.bit_pos = 0;
            self.byte_pos += 1;
        }

        Ok(u32::from(bit))
    }

    /// 读取 1 个位并转为布尔值
    pub fn read_flag(&mut self) -> NalResult<bool> {
        Ok(self.read_bit()? == 1)
    }

    /// 读取 N 个位 (最多 32 位)
    ///
    /// 按大端位序读取, 返回值的低 N 位有效. 剩余数据不足时不移动读取位置.
    pub fn read_bits(&mut self, n: u32) -> NalResult<u32> {
        if n > 32 {
            return Err(NalError::InvalidWidth(n));
        }
        if n == 0 {
            return Ok(0);
        }
        if (n as usize) > self.bits_left() {
            return Err(NalError::OutOfData);
        }

        let mut result: u32 = 0;
        let mut remaining = n;

        while remaining > 0 {
            let available = 8 - self.bit_pos as u32;
            let to_read = remaining.min(available);

            // 从当前字节中提取位
            let shift = available - to_read;
            let mask = ((1u32 << to_read) - 1) as u8;
            let bits = (self.data[self.byte_pos] >> shift) & mask;

            result = (result << to_read) | u32::from(bits);

            self.bit_pos += to_read as u8;
            if self.bit_pos >= 8 {
                self.bit_pos = 0;
                self.byte_pos += 1;
            }
            remaining -= to_read;
        }

        Ok(result)
    }

    /// 跳过 N 个位
    pub fn skip_bits(&mut self, n: u32) -> NalResult<()> {
        if (n as usize) > self.bits_left() {
            return Err(NalError::OutOfData);
        }

        let total_bits = self.bit_pos as usize + n as usize;
        self.byte_pos += total_bits / 8;
        self.bit_pos = (total_bits % 8) as u8;

        Ok(())
    }

    /// 读取无符号 Exp-Golomb 编码值 ue(v)
    pub fn read_ue(&mut self) -> NalResult<u32> {
        let mut leading_zeros = 0u32;
        while self.read_bit()? == 0 {
            leading_zeros += 1;
            if leading_zeros > MAX_LEADING_ZEROS {
                return Err(NalError::CodeTooLong);
            }
        }

        if leading_zeros == 0 {
            return Ok(0);
        }

        let suffix = self.read_bits(leading_zeros)?;
        Ok((1u32 << leading_zeros) - 1 + suffix)
    }

    /// 读取有符号 Exp-Golomb 编码值 se(v)
    ///
    /// 映射: 0→0, 1→1, 2→-1, 3→2, 4→-2, ...
    pub fn read_se(&mut self) -> NalResult<i32> {
        let code = u64::from(self.read_ue()?);
        let magnitude = (code + 1) / 2;
        let value = if code & 1 == 1 {
            magnitude as i64
        } else {
            -(magnitude as i64)
        };
        i32::try_from(value).map_err(|_| NalError::CodeTooLong)
    }

    /// 对齐到下一个字节边界
    ///
    /// 如果当前已在字节边界, 则不做任何事.
    pub fn align_to_byte(&mut self) {
        if self.bit_pos > 0 {
            self.bit_pos = 0;
            self.byte_pos += 1;
        }
    }

    /// 获取当前字节位置
    pub fn byte_position(&self) -> usize {
        self.byte_pos
    }

    /// 获取当前字节内的位位置 (0-7)
    pub fn bit_position(&self) -> u8 {
        self.bit_pos
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 按标准构造写入 ue(v)
    fn write_ue(bits: &mut Vec<bool>, val: u32) {
        let code = u64::from(val) + 1;
        let num_bits = 64 - code.leading_zeros();
        for _ in 0..num_bits - 1 {
            bits.push(false);
        }
        for i in (0..num_bits).rev() {
            bits.push(((code >> i) & 1) != 0);
        }
    }

    fn bits_to_bytes(bits: &[bool]) -> Vec<u8> {
        bits.chunks(8)
            .map(|chunk| {
                chunk
                    .iter()
                    .enumerate()
                    .fold(0u8, |acc, (i, &b)| if b { acc | (1 << (7 - i)) } else { acc })
            })
            .collect()
    }

    #[test]
    fn test_read_bits_basic() {
        let data = [0b10110001, 0b01010101];
        let mut br = BitReader::new(&data);

        assert_eq!(br.read_bits(1).unwrap(), 1);
        assert_eq!(br.read_bits(1).unwrap(), 0);
        assert_eq!(br.read_bits(2).unwrap(), 0b11);
        assert_eq!(br.read_bits(4).unwrap(), 0b0001);
        assert_eq!(br.read_bits(8).unwrap(), 0b01010101);

        assert!(!br.has_more_data());
    }

    #[test]
    fn test_read_bits_32_bit() {
        let data = [0xFF, 0x00, 0xFF, 0x00];
        let mut br = BitReader::new(&data);
        assert_eq!(br.read_bits(32).unwrap(), 0xFF00FF00);
    }

    #[test]
    fn test_read_bits_every_width_msb_first() {
        // 0xA5 重复: 1010 0101 ...
        let data = [0xA5; 9];
        for n in 0..=32u32 {
            let mut br = BitReader::new(&data);
            let mut expected = 0u64;
            for i in 0..n {
                let byte = data[(i / 8) as usize];
                let bit = (byte >> (7 - (i % 8))) & 1;
                expected = (expected << 1) | u64::from(bit);
            }
            assert_eq!(u64::from(br.read_bits(n).unwrap()), expected, "n={n}");
            assert_eq!(br.bits_read(), n as usize);
        }
    }

    #[test]
    fn test_read_bits_unaligned_32() {
        let data = [0b0111_1111, 0xFF, 0xFF, 0xFF, 0b1000_0000];
        let mut br = BitReader::new(&data);
        br.skip_bits(1).unwrap();
        assert_eq!(br.read_bits(32).unwrap(), 0xFFFF_FFFF);
        assert_eq!(br.read_bit().unwrap(), 0);
    }

    #[test]
    fn test_read_bits_reject_width_over_32() {
        let data = [0u8; 8];
        let mut br = BitReader::new(&data);
        assert_eq!(br.read_bits(33), Err(NalError::InvalidWidth(33)));
        // 失败后位置不变
        assert_eq!(br.bits_read(), 0);
    }

    #[test]
    fn test_read_past_end_is_out_of_data() {
        let data = [0xAB];
        let mut br = BitReader::new(&data);
        br.read_bits(8).unwrap();
        assert_eq!(br.read_bit(), Err(NalError::OutOfData));
        assert_eq!(br.read_bits(1), Err(NalError::OutOfData));
        assert_eq!(br.skip_bits(1), Err(NalError::OutOfData));
    }

    #[test]
    fn test_read_bits_partial_does_not_advance() {
        let data = [0xFF];
        let mut br = BitReader::new(&data);
        br.read_bits(4).unwrap();
        assert_eq!(br.read_bits(5), Err(NalError::OutOfData));
        assert_eq!(br.bits_left(), 4);
    }

    #[test]
    fn test_skip_bits() {
        let data = [0b10110001, 0b01010101];
        let mut br = BitReader::new(&data);

        br.skip_bits(4).unwrap();
        assert_eq!(br.read_bits(4).unwrap(), 0b0001);
        br.skip_bits(4).unwrap();
        assert_eq!(br.read_bits(4).unwrap(), 0b0101);
    }

    #[test]
    fn test_exp_golomb_ue() {
        // 0 → "1", 1 → "010", 2 → "011", 3 → "00100", 7 → "0001000"
        let cases: [(u8, u32); 5] = [
            (0b10000000, 0),
            (0b01000000, 1),
            (0b01100000, 2),
            (0b00100000, 3),
            (0b00010000, 7),
        ];
        for (byte, expected) in cases {
            let data = [byte];
            let mut br = BitReader::new(&data);
            assert_eq!(br.read_ue().unwrap(), expected, "byte={byte:08b}");
        }
    }

    #[test]
    fn test_exp_golomb_ue_representative_values() {
        for value in [0u32, 1, 7, 255, 1 << 20, u32::MAX - 1] {
            let mut bits = Vec::new();
            write_ue(&mut bits, value);
            let data = bits_to_bytes(&bits);
            let mut br = BitReader::new(&data);
            assert_eq!(br.read_ue().unwrap(), value);
            assert_eq!(br.bits_read(), bits.len());
        }
    }

    #[test]
    fn test_exp_golomb_se() {
        // ue: 0,1,2,3,4 → se: 0,1,-1,2,-2
        let expected = [0, 1, -1, 2, -2];
        let mut bits = Vec::new();
        for ue in 0..5 {
            write_ue(&mut bits, ue);
        }
        let data = bits_to_bytes(&bits);
        let mut br = BitReader::new(&data);
        for value in expected {
            assert_eq!(br.read_se().unwrap(), value);
        }
    }

    #[test]
    fn test_exp_golomb_too_long() {
        // 32 个前导零
        let data = [0x00, 0x00, 0x00, 0x00, 0x80];
        let mut br = BitReader::new(&data);
        assert_eq!(br.read_ue(), Err(NalError::CodeTooLong));
    }

    #[test]
    fn test_exp_golomb_truncated_suffix() {
        // 7 个前导零, 但后缀不足
        let data = [0b0000_0001];
        let mut br = BitReader::new(&data);
        assert_eq!(br.read_ue(), Err(NalError::OutOfData));
    }

    #[test]
    fn test_align_and_positions() {
        let data = [0b10110001, 0b01010101];
        let mut br = BitReader::new(&data);

        br.read_bits(3).unwrap();
        assert_eq!(br.byte_position(), 0);
        assert_eq!(br.bit_position(), 3);
        br.align_to_byte();
        assert_eq!(br.byte_position(), 1);
        assert_eq!(br.bit_position(), 0);
        br.align_to_byte();
        assert_eq!(br.byte_position(), 1);
        assert_eq!(br.read_bits(8).unwrap(), 0b01010101);
    }

    #[test]
    fn test_bits_left() {
        let data = [0x00, 0x00];
        let mut br = BitReader::new(&data);

        assert_eq!(br.bits_left(), 16);
        br.read_bits(5).unwrap();
        assert_eq!(br.bits_left(), 11);
        br.read_bits(11).unwrap();
        assert_eq!(br.bits_left(), 0);
        assert!(!br.has_more_data());
    }

    #[test]
    fn test_independent_readers_do_not_interact() {
        let data = [0b1100_0000];
        let mut a = BitReader::new(&data);
        let mut b = BitReader::new(&data);
        assert_eq!(a.read_bits(2).unwrap(), 0b11);
        assert_eq!(b.read_bit().unwrap(), 1);
        assert_eq!(a.read_bit().unwrap(), 0);
        assert_eq!(b.read_bit().unwrap(), 1);
    }
}
