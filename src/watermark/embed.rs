use serde::Serialize;

use super::WatermarkOpt;
use crate::codec;
use crate::error::{Result, WatermarkError};
use crate::site::{self, Region, SiteSelector, MARK_LEN};
use crate::util::dna;

/// 水印元信息
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WatermarkInfo {
    /// 编码区位置（`extract` 返回的就是它）
    pub position: Region,
    /// 含定界符的整个插入片段
    pub inserted: Region,
    /// 编码区 DNA 序列
    pub sequence: String,
    pub original_text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Watermarked {
    pub watermarked_sequence: String,
    pub watermark_info: WatermarkInfo,
}

#[derive(Debug, Clone, Default)]
pub struct WatermarkEmbedder {
    opt: WatermarkOpt,
    selector: SiteSelector,
}

impl WatermarkEmbedder {
    pub fn new(opt: WatermarkOpt) -> Self {
        Self { opt, selector: SiteSelector::new(opt.site) }
    }

    pub fn embed(&self, host: &str, message: &str) -> Result<String> {
        self.embed_with_info(host, message).map(|w| w.watermarked_sequence)
    }

    /// 编码 → 选位点 → 加定界符拼接。任一步失败都不产生部分结果。
    pub fn embed_with_info(&self, host: &str, message: &str) -> Result<Watermarked> {
        let encoded = codec::encode(message)?;
        if encoded.details.len() > self.opt.max_message_len {
            return Err(WatermarkError::MessageTooLong {
                len: encoded.details.len(),
                max: self.opt.max_message_len,
            });
        }
        let host = dna::normalize_seq(host)?;
        let payload = encoded.dna_sequence.as_bytes();
        let site = self.selector.select(&host, payload)?;
        let block = site::framed(payload);

        let mut marked = String::with_capacity(host.len() + block.len());
        marked.extend(host[..site].iter().map(|&b| b as char));
        marked.extend(block.iter().map(|&b| b as char));
        marked.extend(host[site..].iter().map(|&b| b as char));

        Ok(Watermarked {
            watermarked_sequence: marked,
            watermark_info: WatermarkInfo {
                position: Region { start: site + MARK_LEN, len: encoded.length },
                inserted: Region { start: site, len: block.len() },
                sequence: encoded.dna_sequence,
                original_text: message.to_string(),
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SiteRejection;
    use crate::site::SiteOpt;

    #[test]
    fn splices_framed_watermark_at_selected_site() {
        let w = WatermarkEmbedder::default().embed_with_info("accatgatgacc", "HELLO").unwrap();
        assert_eq!(w.watermarked_sequence, "CCGTACCGGCGTGACGACGCGGATCTTACCATGATGACC");
        assert_eq!(w.watermark_info.position, Region { start: 6, len: 15 });
        assert_eq!(w.watermark_info.position.to_string(), "7..21");
        assert_eq!(w.watermark_info.inserted, Region { start: 0, len: 27 });
        assert_eq!(w.watermark_info.sequence, "CGGCGTGACGACGCG");
        assert_eq!(w.watermark_info.original_text, "HELLO");
    }

    #[test]
    fn empty_host_is_all_watermark() {
        assert_eq!(WatermarkEmbedder::default().embed("", "HI").unwrap(), "CCGTACCGGCTAGATCTT");
    }

    #[test]
    fn codec_errors_propagate_unchanged() {
        let emb = WatermarkEmbedder::default();
        assert_eq!(emb.embed("ATG", "").unwrap_err(), WatermarkError::EmptyInput);
        assert_eq!(
            emb.embed("ATG", "HI~").unwrap_err(),
            WatermarkError::UnsupportedSymbol { symbol: '~', pos: 2 }
        );
    }

    #[test]
    fn invalid_host_is_rejected() {
        let err = WatermarkEmbedder::default().embed("ATGNNN", "HI").unwrap_err();
        assert_eq!(err, WatermarkError::InvalidBase { base: 'N', pos: 3 });
    }

    #[test]
    fn message_length_limit() {
        let emb = WatermarkEmbedder::new(WatermarkOpt { max_message_len: 4, ..WatermarkOpt::default() });
        assert_eq!(emb.embed("ATG", "HELLO").unwrap_err(), WatermarkError::MessageTooLong { len: 5, max: 4 });
        assert!(emb.embed("ATG", "HELL").is_ok());
    }

    #[test]
    fn site_errors_propagate() {
        let emb = WatermarkEmbedder::new(WatermarkOpt {
            site: SiteOpt { min_host_len: 30, ..SiteOpt::default() },
            ..WatermarkOpt::default()
        });
        assert_eq!(
            emb.embed("ATGATG", "HELLO").unwrap_err(),
            WatermarkError::NoSuitableSite(SiteRejection::HostTooShort { len: 6, min: 30 })
        );
    }

    #[test]
    fn info_serializes_camel_case() {
        let w = WatermarkEmbedder::default().embed_with_info("ATG", "HI").unwrap();
        let v = serde_json::to_value(&w).unwrap();
        assert_eq!(v["watermarkedSequence"], "CCGTACCGGCTAGATCTTATG");
        assert_eq!(v["watermarkInfo"]["position"]["start"], 6);
        assert_eq!(v["watermarkInfo"]["position"]["len"], 6);
        assert_eq!(v["watermarkInfo"]["inserted"]["len"], 18);
        assert_eq!(v["watermarkInfo"]["originalText"], "HI");
    }
}
