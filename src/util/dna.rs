use crate::error::{Result, WatermarkError};

/// 2-bit 编码：{0:A, 1:C, 2:G, 3:T}
#[inline]
pub const fn to_code(b: u8) -> Option<u8> {
    match b.to_ascii_uppercase() {
        b'A' => Some(0),
        b'C' => Some(1),
        b'G' => Some(2),
        b'T' => Some(3),
        _ => None,
    }
}

#[inline]
pub const fn from_code(c: u8) -> u8 {
    match c & 3 {
        0 => b'A',
        1 => b'C',
        2 => b'G',
        _ => b'T',
    }
}

/// 三联体 → 0..64 的下标；含非 ACGT 字符时返回 None
#[inline]
pub const fn triplet_index(t: &[u8; 3]) -> Option<usize> {
    match (to_code(t[0]), to_code(t[1]), to_code(t[2])) {
        (Some(a), Some(b), Some(c)) => Some(((a as usize) << 4) | ((b as usize) << 2) | c as usize),
        _ => None,
    }
}

/// 大写归一化并校验碱基。
/// 只接受 A/C/G/T（大小写不敏感），N 及其它简并碱基一律拒绝，报告第一个非法字符的位置。
pub fn normalize_seq(seq: &str) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(seq.len());
    for (pos, ch) in seq.chars().enumerate() {
        let up = ch.to_ascii_uppercase();
        match up {
            'A' | 'C' | 'G' | 'T' => out.push(up as u8),
            _ => return Err(WatermarkError::InvalidBase { base: ch, pos }),
        }
    }
    Ok(out)
}

#[inline]
pub fn complement(base: u8) -> u8 {
    match base.to_ascii_uppercase() {
        b'A' => b'T',
        b'C' => b'G',
        b'G' => b'C',
        b'T' => b'A',
        _ => b'N',
    }
}

pub fn revcomp(seq: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(seq.len());
    for &b in seq.iter().rev() {
        out.push(complement(b));
    }
    out
}
