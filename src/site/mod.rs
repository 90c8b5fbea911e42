//! 插入位点选择与水印区段定位。
//!
//! 水印以定界符包裹后整体插入宿主：`START_MARK` + 编码区 + `END_MARK`。
//! 两个定界符各由 2 个不在符号表中的三联体（guard）组成，且都不含起始密码子：
//!
//! - `START_MARK` = `CCG TAC`
//! - `END_MARK`   = `GAT CTT`
//!
//! *定界区段*：任意偏移处的 `START_MARK`，其后同一读码框内连续的表内三联体，
//! 紧接着 `END_MARK`。编码区内不可能出现框内的 guard，因此区段边界只由定界符决定，
//! 与宿主内容无关；`locate` 扫描所有偏移，序列被截断或前后加了任意长度的上下文都不影响定位。
//!
//! `select` 只在 3 的倍数偏移处插入（宿主下游读码框不变），
//! 并确认插入后 `locate` 找到的恰好是新插入的区段，因此二者互逆。

use std::fmt;
use std::ops::Range;
use std::str::FromStr;

use log::{debug, warn};
use serde::Serialize;

use crate::codec::SYMBOL_TABLE;
use crate::error::{Result, SiteRejection, WatermarkError};

pub const START_MARK: [u8; 6] = *b"CCGTAC";
pub const END_MARK: [u8; 6] = *b"GATCTT";
/// 单个定界符长度（nt）
pub const MARK_LEN: usize = 6;

/// 序列上的半开区间 `[start, start + len)`，单位 nt，0 起始。
/// `Display` 输出 1 起始的闭区间 `start..end`（GenBank 风格）。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Region {
    pub start: usize,
    pub len: usize,
}

impl Region {
    pub fn end(&self) -> usize {
        self.start + self.len
    }

    pub fn range(&self) -> Range<usize> {
        self.start..self.end()
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start + 1, self.end())
    }
}

/// 序列中出现多个定界区段时的处理方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AmbiguityPolicy {
    /// 报 `AmbiguousWatermark`
    #[default]
    Strict,
    /// 取位置最早者
    PreferFirst,
}

impl FromStr for AmbiguityPolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "strict" => Ok(Self::Strict),
            "first" | "prefer-first" => Ok(Self::PreferFirst),
            other => Err(format!("unknown ambiguity policy '{}', expected 'strict' or 'first'", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SiteOpt {
    /// 宿主序列最短长度（nt）
    pub min_host_len: usize,
    /// 编码区短于该符号数的定界区段不参与定位
    pub min_symbols: usize,
    pub ambiguity: AmbiguityPolicy,
}

impl Default for SiteOpt {
    fn default() -> Self {
        Self { min_host_len: 0, min_symbols: 1, ambiguity: AmbiguityPolicy::Strict }
    }
}

/// 给编码区加上首尾定界符，得到实际插入宿主的片段
pub fn framed(payload: &[u8]) -> Vec<u8> {
    let mut block = Vec::with_capacity(payload.len() + 2 * MARK_LEN);
    block.extend_from_slice(&START_MARK);
    block.extend_from_slice(payload);
    block.extend_from_slice(&END_MARK);
    block
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SiteSelector {
    opt: SiteOpt,
}

impl SiteSelector {
    pub fn new(opt: SiteOpt) -> Self {
        Self { opt }
    }

    pub fn opt(&self) -> &SiteOpt {
        &self.opt
    }

    fn min_symbols(&self) -> usize {
        self.opt.min_symbols.max(1)
    }

    /// 为编码区 `payload` 选择插入位点，返回定界片段在宿主中的起始偏移。
    ///
    /// `host` 应为已归一化的大写 ACGT 序列。返回值是 3 的倍数，且不超过 `host.len()`；
    /// 候选位点从 0 开始递增，取第一个插入后能被 `locate` 原样找回的位点。
    pub fn select(&self, host: &[u8], payload: &[u8]) -> Result<usize> {
        if payload.is_empty() {
            return Err(WatermarkError::EmptyInput);
        }
        if payload.len() % 3 != 0 {
            return Err(WatermarkError::InvalidLength { len: payload.len() });
        }
        if let Some((i, chunk)) =
            payload.chunks_exact(3).enumerate().find(|(_, c)| !SYMBOL_TABLE.is_recognized_triplet(c))
        {
            return Err(WatermarkError::UnknownTriplet {
                triplet: String::from_utf8_lossy(chunk).into_owned(),
                pos: i * 3,
            });
        }
        if host.len() < self.opt.min_host_len {
            return Err(WatermarkError::NoSuitableSite(SiteRejection::HostTooShort {
                len: host.len(),
                min: self.opt.min_host_len,
            }));
        }
        let symbols = payload.len() / 3;
        let min = self.min_symbols();
        if symbols < min {
            return Err(WatermarkError::NoSuitableSite(SiteRejection::WatermarkTooShort { symbols, min }));
        }

        // PreferFirst 下新水印必须排在宿主已有区段之前
        let limit = match (delimited_regions(host, min).first(), self.opt.ambiguity) {
            (Some(&region), AmbiguityPolicy::Strict) => {
                debug!("host already carries a watermark at {}", region);
                return Err(WatermarkError::NoSuitableSite(SiteRejection::ExistingWatermark { region }));
            }
            (Some(region), AmbiguityPolicy::PreferFirst) => region.start.saturating_sub(MARK_LEN) / 3 * 3,
            (None, _) => host.len() / 3 * 3,
        };

        let block = framed(payload);
        let mut marked = Vec::with_capacity(host.len() + block.len());
        for site in (0..=limit).step_by(3) {
            marked.clear();
            marked.extend_from_slice(&host[..site]);
            marked.extend_from_slice(&block);
            marked.extend_from_slice(&host[site..]);

            let expected = Region { start: site + MARK_LEN, len: payload.len() };
            let regions = delimited_regions(&marked, min);
            let clean = match self.opt.ambiguity {
                AmbiguityPolicy::Strict => regions == [expected],
                AmbiguityPolicy::PreferFirst => regions.first() == Some(&expected),
            };
            if clean {
                debug!("watermark of {} codons goes to offset {}", symbols, site);
                return Ok(site);
            }
            debug!("offset {} rejected, {} delimited regions after insertion", site, regions.len());
        }
        Err(WatermarkError::NoSuitableSite(SiteRejection::NoCleanSite))
    }

    /// 仅凭带水印序列找回编码区（不含定界符）。
    pub fn locate(&self, marked: &[u8]) -> Result<Region> {
        let regions = delimited_regions(marked, self.min_symbols());
        let mut found = regions.iter().copied();
        let Some(first) = found.next() else {
            return Err(WatermarkError::WatermarkNotFound);
        };
        if let Some(second) = found.next() {
            match self.opt.ambiguity {
                AmbiguityPolicy::Strict => {
                    return Err(WatermarkError::AmbiguousWatermark { first, second });
                }
                AmbiguityPolicy::PreferFirst => {
                    warn!("{} watermark candidates, keeping {} over {}", regions.len(), first, second);
                }
            }
        }
        debug!("watermark located at {}", first);
        Ok(first)
    }
}

/// 序列中全部定界区段的编码区，按起点排序；编码区少于 `min_symbols` 个密码子的忽略
pub fn delimited_regions(seq: &[u8], min_symbols: usize) -> Vec<Region> {
    let mut regions = Vec::new();
    let mut from = 0;
    while let Some(p) = seq[from..].windows(MARK_LEN).position(|w| w == START_MARK) {
        let body = from + p + MARK_LEN;
        let mut end = body;
        while end + 3 <= seq.len() && SYMBOL_TABLE.is_recognized_triplet(&seq[end..end + 3]) {
            end += 3;
        }
        if (end - body) / 3 >= min_symbols && seq[end..].starts_with(&END_MARK) {
            regions.push(Region { start: body, len: end - body });
        }
        from += p + 1;
    }
    regions
}
