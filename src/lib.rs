//! # dna-watermark
//!
//! 面向合成生物学产品知识产权溯源的 DNA 水印工具。
//!
//! 本 crate 把一段简短的文本编码为核苷酸三联体，拼接进宿主序列，并能仅凭带水印序列把文本找回：
//!
//! - **编码表**：49 个符号 ↔ 49 个三联体的双射，不含起始密码子，终止密码子固定给 `V` / `W` / `.`
//! - **编解码**：文本 ↔ DNA，带完整输入校验与逐符号明细
//! - **位点选择**：水印首尾加 guard 三联体组成的定界符，框内插入；提取时在任意偏移扫描定界符
//! - **嵌入 / 提取**：`embed` 与 `extract` 互为逆运算
//! - **侵权检测**：在目标序列的双链上查找已知水印
//!
//! ## 快速示例
//!
//! ```rust
//! use dna_watermark::{codec, watermark};
//!
//! let enc = codec::encode("HELLO").unwrap();
//! assert_eq!(enc.dna_sequence, "CGGCGTGACGACGCG");
//!
//! let host = "ACCATGATGACC";
//! let marked = watermark::embed(host, "HELLO").unwrap();
//! assert_eq!(marked, "CCGTACCGGCGTGACGACGCGGATCTTACCATGATGACC");
//! assert_eq!(watermark::extract(&marked).unwrap(), "HELLO");
//! ```
//!
//! ## 模块说明
//!
//! - [`codec`]：符号表与文本 / DNA 编解码
//! - [`site`]：插入位点选择与水印区段定位
//! - [`watermark`]：嵌入、提取、侵权检测
//! - [`io`]：FASTA 读写（命令行使用）
//! - [`util`]：碱基归一化、反向互补等工具函数
//! - [`error`]：错误类型

pub mod codec;
pub mod error;
pub mod io;
pub mod site;
pub mod util;
pub mod watermark;

pub use error::{Result, SiteRejection, WatermarkError};
