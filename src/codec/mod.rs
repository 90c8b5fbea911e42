//! 文本 ↔ DNA 三联体编解码。
//!
//! 每个符号映射为一个三联体并按顺序拼接，编码长度恒为 `3 × 符号数`；
//! 解码是其逆过程，带完整的输入校验。

pub mod table;

use serde::Serialize;

use crate::error::{Result, WatermarkError};
use crate::util::dna;

pub use table::{SymbolTable, Triplet, SYMBOL_TABLE};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EncodeDetail {
    pub char: char,
    pub triplet: Triplet,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DecodeDetail {
    pub triplet: Triplet,
    pub char: char,
}

/// 编码结果；`length` 为 DNA 序列长度（nt）
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Encoded {
    pub dna_sequence: String,
    pub length: usize,
    pub details: Vec<EncodeDetail>,
}

/// 解码结果；`length` 为文本符号数
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Decoded {
    pub text: String,
    pub length: usize,
    pub details: Vec<DecodeDetail>,
}

/// 文本 → DNA。
///
/// 空文本返回 `EmptyInput`；第一个不在表中的字符返回 `UnsupportedSymbol`，`pos` 为字符下标。
pub fn encode(text: &str) -> Result<Encoded> {
    if text.is_empty() {
        return Err(WatermarkError::EmptyInput);
    }
    let mut dna_sequence = String::with_capacity(text.len() * 3);
    let mut details = Vec::with_capacity(text.len());
    for (pos, ch) in text.chars().enumerate() {
        let triplet = SYMBOL_TABLE.triplet_for(ch).map_err(|e| e.shifted(pos))?;
        dna_sequence.push_str(&triplet.to_string());
        details.push(EncodeDetail { char: ch.to_ascii_uppercase(), triplet });
    }
    Ok(Encoded { length: dna_sequence.len(), dna_sequence, details })
}

/// DNA → 文本。
///
/// 校验顺序：空输入 → 长度是否为 3 的倍数 → 碱基是否合法 → 三联体是否在表中。
pub fn decode(sequence: &str) -> Result<Decoded> {
    if sequence.is_empty() {
        return Err(WatermarkError::EmptyInput);
    }
    let len = sequence.chars().count();
    if len % 3 != 0 {
        return Err(WatermarkError::InvalidLength { len });
    }
    let norm = dna::normalize_seq(sequence)?;
    decode_bases(&norm)
}

/// 对已归一化（大写 ACGT）的碱基解码，供水印提取直接复用
pub(crate) fn decode_bases(bases: &[u8]) -> Result<Decoded> {
    if bases.is_empty() {
        return Err(WatermarkError::EmptyInput);
    }
    if bases.len() % 3 != 0 {
        return Err(WatermarkError::InvalidLength { len: bases.len() });
    }
    let mut text = String::with_capacity(bases.len() / 3);
    let mut details = Vec::with_capacity(bases.len() / 3);
    for (i, chunk) in bases.chunks_exact(3).enumerate() {
        let (ch, triplet) = SYMBOL_TABLE.entry_for(chunk).map_err(|e| e.shifted(i * 3))?;
        text.push(ch);
        details.push(DecodeDetail { triplet, char: ch });
    }
    Ok(Decoded { length: details.len(), text, details })
}
