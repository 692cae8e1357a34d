//! 统一错误类型定义.
//!
//! 所有 nalscope crate 共用的错误类型. 单个参数集的解析失败由上层聚合器吸收,
//! 只有结构上不可能的输入 (如过短的配置记录) 或非法的 codec 字符串才会返回给调用方.

use thiserror::Error;

/// nalscope 统一错误类型
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NalError {
    /// 读取位置越过缓冲区末尾
    #[error("数据不足, 读取越过缓冲区末尾")]
    OutOfData,

    /// 单次读取的位宽超过 32
    #[error("无效位宽: n={0} 超过 32 位")]
    InvalidWidth(u32),

    /// Exp-Golomb 前导零超过 31 个
    #[error("Exp-Golomb 编码过长")]
    CodeTooLong,

    /// 固定头部的记录或 NAL 单元小于最小长度
    #[error("{what} 数据太短: len={len}, 至少需要 {min} 字节")]
    TooShort {
        /// 被解析对象的名称
        what: &'static str,
        /// 实际长度
        len: usize,
        /// 最小长度
        min: usize,
    },

    /// codec 字符串语法错误或字段超出合法范围
    #[error("语法错误: {0}")]
    SyntaxError(String),
}

/// nalscope 统一 Result 类型
pub type NalResult<T> = Result<T, NalError>;
