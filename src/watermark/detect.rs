use std::fmt;

use serde::Serialize;

use crate::codec;
use crate::error::{Result, WatermarkError};
use crate::site::Region;
use crate::util::dna;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum Strand {
    Forward,
    Reverse,
}

impl fmt::Display for Strand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Strand::Forward => "+",
            Strand::Reverse => "-",
        })
    }
}

/// 一次命中；`region` 总是正链坐标
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Hit {
    pub region: Region,
    pub strand: Strand,
}

/// 侵权检测：在目标序列中查找已知水印文本的编码。
///
/// 先查正链，再查反向互补链（坐标换算回正链），允许重叠命中；结果按位置排序。
pub fn detect(target: &str, message: &str) -> Result<Vec<Hit>> {
    let encoded = codec::encode(message)?;
    if target.is_empty() {
        return Err(WatermarkError::EmptyInput);
    }
    let fwd = dna::normalize_seq(target)?;
    let pattern = encoded.dna_sequence.as_bytes();
    let len = pattern.len();

    let mut hits: Vec<Hit> = find_all(&fwd, pattern)
        .map(|start| Hit { region: Region { start, len }, strand: Strand::Forward })
        .collect();

    let rev = dna::revcomp(&fwd);
    hits.extend(find_all(&rev, pattern).map(|p| Hit {
        region: Region { start: fwd.len() - p - len, len },
        strand: Strand::Reverse,
    }));

    hits.sort_by_key(|h| (h.region.start, h.strand));
    Ok(hits)
}

fn find_all<'a>(hay: &'a [u8], needle: &'a [u8]) -> impl Iterator<Item = usize> + 'a {
    hay.windows(needle.len())
        .enumerate()
        .filter(move |(_, w)| *w == needle)
        .map(|(i, _)| i)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_forward_occurrences() {
        // HI = CGGCTA
        let hits = detect("ATGCGGCTAGAACGGCTA", "HI").unwrap();
        assert_eq!(
            hits,
            vec![
                Hit { region: Region { start: 3, len: 6 }, strand: Strand::Forward },
                Hit { region: Region { start: 12, len: 6 }, strand: Strand::Forward },
            ]
        );
        assert_eq!(hits[0].region.to_string(), "4..9");
    }

    #[test]
    fn finds_reverse_complement_occurrences() {
        // revcomp(CGGCTA) = TAGCCG
        let hits = detect("attTAGCCGttt", "HI").unwrap();
        assert_eq!(hits, vec![Hit { region: Region { start: 3, len: 6 }, strand: Strand::Reverse }]);
        assert_eq!(hits[0].strand.to_string(), "-");
    }

    #[test]
    fn no_hits_in_unrelated_sequence() {
        assert!(detect("ATGATGATG", "HELLO").unwrap().is_empty());
        // 目标比水印短
        assert!(detect("CGG", "HI").unwrap().is_empty());
    }

    #[test]
    fn rejects_bad_input() {
        assert_eq!(detect("", "HI").unwrap_err(), WatermarkError::EmptyInput);
        assert_eq!(detect("ATG", "").unwrap_err(), WatermarkError::EmptyInput);
        assert_eq!(detect("ATGR", "HI").unwrap_err(), WatermarkError::InvalidBase { base: 'R', pos: 3 });
    }

    #[test]
    fn detects_embedded_watermark() {
        let marked = crate::watermark::embed("ACCATGATGACC", "HELLO").unwrap();
        let hits = detect(&marked, "HELLO").unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].region, Region { start: 6, len: 15 });
    }
}
