//! 水印嵌入、提取与侵权检测。
//!
//! ```rust
//! use dna_watermark::watermark;
//!
//! let host = "ACCATGATGACC";
//! let marked = watermark::embed(host, "HELLO").unwrap();
//! // 15 nt 编码区 + 两个 6 nt 定界符
//! assert_eq!(marked.len(), host.len() + 15 + 12);
//! assert_eq!(watermark::extract(&marked).unwrap(), "HELLO");
//! ```

pub mod detect;
pub mod embed;
pub mod extract;

use crate::error::Result;
use crate::site::SiteOpt;

pub use detect::{detect, Hit, Strand};
pub use embed::{WatermarkEmbedder, WatermarkInfo, Watermarked};
pub use extract::{Extracted, WatermarkExtractor};

/// 水印文本默认最多 100 个符号
pub const DEFAULT_MAX_MESSAGE_LEN: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WatermarkOpt {
    pub site: SiteOpt,
    pub max_message_len: usize,
}

impl Default for WatermarkOpt {
    fn default() -> Self {
        Self { site: SiteOpt::default(), max_message_len: DEFAULT_MAX_MESSAGE_LEN }
    }
}

/// 使用默认配置嵌入水印，返回带水印序列
pub fn embed(host: &str, message: &str) -> Result<String> {
    WatermarkEmbedder::default().embed(host, message)
}

/// 使用默认配置提取水印文本
pub fn extract(marked: &str) -> Result<String> {
    WatermarkExtractor::default().extract(marked)
}
