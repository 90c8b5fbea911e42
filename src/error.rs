use thiserror::Error;

use crate::site::Region;

pub type Result<T> = std::result::Result<T, WatermarkError>;

/// 编解码与水印嵌入 / 提取的全部失败类型。
///
/// 带位置的变体中 `pos` 均为 0 起始：字符位置（文本输入）或碱基偏移（序列输入）。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WatermarkError {
    #[error("input is empty")]
    EmptyInput,

    #[error("unsupported symbol {symbol:?} at position {pos}")]
    UnsupportedSymbol { symbol: char, pos: usize },

    #[error("sequence length {len} is not a multiple of 3")]
    InvalidLength { len: usize },

    #[error("invalid base {base:?} at position {pos}")]
    InvalidBase { base: char, pos: usize },

    #[error("unknown triplet {triplet} at position {pos}")]
    UnknownTriplet { triplet: String, pos: usize },

    #[error("no suitable insertion site: {0}")]
    NoSuitableSite(SiteRejection),

    #[error("no watermark region found")]
    WatermarkNotFound,

    #[error("ambiguous watermark: regions {first} and {second} both qualify")]
    AmbiguousWatermark { first: Region, second: Region },

    #[error("corrupted watermark in region {region}: {cause}")]
    CorruptedWatermark {
        region: Region,
        #[source]
        cause: Box<WatermarkError>,
    },

    #[error("message has {len} symbols, at most {max} are allowed")]
    MessageTooLong { len: usize, max: usize },
}

/// `NoSuitableSite` 的具体原因
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SiteRejection {
    #[error("host has {len} bases, minimum is {min}")]
    HostTooShort { len: usize, min: usize },

    #[error("watermark has {symbols} symbols, locator ignores regions shorter than {min}")]
    WatermarkTooShort { symbols: usize, min: usize },

    #[error("host already carries a delimited watermark at {region}")]
    ExistingWatermark { region: Region },

    #[error("every candidate offset creates a second delimited region")]
    NoCleanSite,
}

impl WatermarkError {
    /// 把位置信息平移 `offset`，用于子区间解码后回填到整条序列的坐标。
    pub(crate) fn shifted(self, offset: usize) -> Self {
        match self {
            Self::UnsupportedSymbol { symbol, pos } => Self::UnsupportedSymbol { symbol, pos: pos + offset },
            Self::InvalidBase { base, pos } => Self::InvalidBase { base, pos: pos + offset },
            Self::UnknownTriplet { triplet, pos } => Self::UnknownTriplet { triplet, pos: pos + offset },
            other => other,
        }
    }
}
