use rayon::prelude::*;
use serde::Serialize;

use super::WatermarkOpt;
use crate::codec;
use crate::error::{Result, WatermarkError};
use crate::site::{Region, SiteSelector};
use crate::util::dna;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Extracted {
    pub message: String,
    pub position: Region,
}

#[derive(Debug, Clone, Default)]
pub struct WatermarkExtractor {
    selector: SiteSelector,
}

impl WatermarkExtractor {
    pub fn new(opt: WatermarkOpt) -> Self {
        Self { selector: SiteSelector::new(opt.site) }
    }

    pub fn extract(&self, marked: &str) -> Result<String> {
        self.extract_with_info(marked).map(|e| e.message)
    }

    pub fn extract_with_info(&self, marked: &str) -> Result<Extracted> {
        let bases = dna::normalize_seq(marked)?;
        let region = self.selector.locate(&bases)?;
        decode_region(&bases, region)
    }

    /// 按调用方给定的区段（如数据库中保存的 start..end）解码。
    /// 区段越界视为找不到水印；区段内容无法解码视为水印损坏。
    pub fn extract_at(&self, marked: &str, region: Region) -> Result<String> {
        let bases = dna::normalize_seq(marked)?;
        let fits = bases.len().checked_sub(region.start).map_or(false, |rest| region.len <= rest);
        if region.len == 0 || !fits {
            return Err(WatermarkError::WatermarkNotFound);
        }
        decode_region(&bases, region).map(|e| e.message)
    }

    /// 并行提取多条序列，结果顺序与输入一致
    pub fn extract_all<S: AsRef<str> + Sync>(&self, marked: &[S]) -> Vec<Result<Extracted>> {
        marked.par_iter().map(|m| self.extract_with_info(m.as_ref())).collect()
    }
}

fn decode_region(bases: &[u8], region: Region) -> Result<Extracted> {
    codec::decode_bases(&bases[region.range()])
        .map(|d| Extracted { message: d.text, position: region })
        .map_err(|e| WatermarkError::CorruptedWatermark { region, cause: Box::new(e.shifted(region.start)) })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::site::{AmbiguityPolicy, SiteOpt};

    const MARKED: &str = "CCGTACCGGCGTGACGACGCGGATCTTACCATGATGACC";
    // "A" 与 "HI" 两个定界区段
    const TWO_MARKS: &str = "CCGTACACCGATCTTCCGTACCGGCTAGATCTT";

    #[test]
    fn extracts_message_and_position() {
        let e = WatermarkExtractor::default().extract_with_info(MARKED).unwrap();
        assert_eq!(e.message, "HELLO");
        assert_eq!(e.position, Region { start: 6, len: 15 });
    }

    #[test]
    fn extract_is_case_insensitive() {
        assert_eq!(WatermarkExtractor::default().extract(&MARKED.to_ascii_lowercase()).unwrap(), "HELLO");
    }

    #[test]
    fn invalid_base_is_rejected() {
        let err = WatermarkExtractor::default().extract("ACCNTG").unwrap_err();
        assert_eq!(err, WatermarkError::InvalidBase { base: 'N', pos: 3 });
    }

    #[test]
    fn not_found_and_ambiguous_propagate() {
        let ex = WatermarkExtractor::default();
        assert_eq!(ex.extract("ATGGAATTT").unwrap_err(), WatermarkError::WatermarkNotFound);
        assert!(matches!(
            ex.extract(TWO_MARKS).unwrap_err(),
            WatermarkError::AmbiguousWatermark { .. }
        ));

        let lenient = WatermarkExtractor::new(WatermarkOpt {
            site: SiteOpt { ambiguity: AmbiguityPolicy::PreferFirst, ..SiteOpt::default() },
            ..WatermarkOpt::default()
        });
        assert_eq!(lenient.extract(TWO_MARKS).unwrap(), "A");
    }

    #[test]
    fn extract_at_known_region() {
        let ex = WatermarkExtractor::default();
        assert_eq!(ex.extract_at(MARKED, Region { start: 6, len: 15 }).unwrap(), "HELLO");
        assert_eq!(ex.extract_at(MARKED, Region { start: 9, len: 6 }).unwrap(), "EL");
    }

    #[test]
    fn extract_at_reports_corruption() {
        let ex = WatermarkExtractor::default();
        // 区段包含定界符里的 TAC
        let err = ex.extract_at(MARKED, Region { start: 3, len: 6 }).unwrap_err();
        match err {
            WatermarkError::CorruptedWatermark { region, cause } => {
                assert_eq!(region, Region { start: 3, len: 6 });
                assert_eq!(*cause, WatermarkError::UnknownTriplet { triplet: "TAC".to_string(), pos: 3 });
            }
            other => panic!("unexpected error: {:?}", other),
        }

        let err = ex.extract_at(MARKED, Region { start: 6, len: 4 }).unwrap_err();
        assert!(matches!(
            err,
            WatermarkError::CorruptedWatermark { ref cause, .. } if **cause == WatermarkError::InvalidLength { len: 4 }
        ));
    }

    #[test]
    fn extract_at_out_of_range() {
        let ex = WatermarkExtractor::default();
        assert_eq!(ex.extract_at(MARKED, Region { start: 30, len: 15 }).unwrap_err(), WatermarkError::WatermarkNotFound);
        assert_eq!(ex.extract_at(MARKED, Region { start: 99, len: 3 }).unwrap_err(), WatermarkError::WatermarkNotFound);
        assert_eq!(ex.extract_at(MARKED, Region { start: 0, len: 0 }).unwrap_err(), WatermarkError::WatermarkNotFound);
    }

    #[test]
    fn extract_all_keeps_input_order() {
        let inputs = vec![MARKED.to_string(), "ATGGAA".to_string(), "CCGTACCGGCTAGATCTTATG".to_string()];
        let out = WatermarkExtractor::default().extract_all(&inputs);
        assert_eq!(out.len(), 3);
        assert_eq!(out[0].as_ref().unwrap().message, "HELLO");
        assert_eq!(out[1].as_ref().unwrap_err(), &WatermarkError::WatermarkNotFound);
        assert_eq!(out[2].as_ref().unwrap().message, "HI");
    }

    #[test]
    fn recovers_watermark_inside_wider_context() {
        let ex = WatermarkExtractor::default();
        for prefix in ["A", "GG", "TTT", "ACGTA"] {
            let shifted = format!("{}{}GA", prefix, MARKED);
            let e = ex.extract_with_info(&shifted).unwrap();
            assert_eq!(e.message, "HELLO");
            assert_eq!(e.position, Region { start: 6 + prefix.len(), len: 15 });
        }
    }

    #[test]
    fn mutated_watermark_is_not_reported_as_a_message() {
        let ex = WatermarkExtractor::default();
        // 编码区第 3 个密码子 GAC -> TTT（guard）
        let mut bases = MARKED.as_bytes().to_vec();
        bases[12..15].copy_from_slice(b"TTT");
        let mutated = String::from_utf8(bases).unwrap();
        assert_eq!(ex.extract(&mutated).unwrap_err(), WatermarkError::WatermarkNotFound);

        // 首定界符点突变
        let broken_mark = format!("CCATAC{}", &MARKED[6..]);
        assert_eq!(ex.extract(&broken_mark).unwrap_err(), WatermarkError::WatermarkNotFound);
    }
}
