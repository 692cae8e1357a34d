//! 测试用比特写入器, 用于构造参数集码流.

/// 按 MSB 优先顺序累积比特
#[derive(Debug, Default)]
pub(crate) struct BitWriter {
    bits: Vec<bool>,
}

impl BitWriter {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// 写入 `n` 位定长值
    pub(crate) fn bits(&mut self, value: u64, n: u32) -> &mut Self {
        for i in (0..n).rev() {
            self.bits.push((value >> i) & 1 == 1);
        }
        self
    }

    pub(crate) fn flag(&mut self, value: bool) -> &mut Self {
        self.bits.push(value);
        self
    }

    /// 写入 ue(v)
    pub(crate) fn ue(&mut self, value: u32) -> &mut Self {
        let code = u64::from(value) + 1;
        let num_bits = 64 - code.leading_zeros();
        for _ in 0..num_bits - 1 {
            self.bits.push(false);
        }
        self.bits(code, num_bits)
    }

    /// 写入 se(v)
    pub(crate) fn se(&mut self, value: i32) -> &mut Self {
        let code = if value <= 0 {
            (-2 * i64::from(value)) as u32
        } else {
            (2 * i64::from(value) - 1) as u32
        };
        self.ue(code)
    }

    /// 写入 rbsp_trailing_bits 并转为字节
    pub(crate) fn finish(&mut self) -> Vec<u8> {
        self.bits.push(true);
        self.to_bytes()
    }

    /// 直接转为字节, 末尾不足一字节时补 0
    pub(crate) fn to_bytes(&self) -> Vec<u8> {
        self.bits
            .chunks(8)
            .map(|chunk| {
                chunk
                    .iter()
                    .enumerate()
                    .fold(0u8, |byte, (i, &bit)| if bit { byte | (1 << (7 - i)) } else { byte })
            })
            .collect()
    }
}
