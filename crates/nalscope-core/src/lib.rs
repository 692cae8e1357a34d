//! # nalscope-core
//!
//! nalscope 核心库, 提供比特流读取器与统一错误类型.
//!
//! 本 crate 不依赖任何编解码器知识, 为上层参数集解析提供底层基础设施.

pub mod bitreader;
pub mod error;

// 重导出常用类型
pub use bitreader::BitReader;
pub use error::{NalError, NalResult};
