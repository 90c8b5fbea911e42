use std::fmt;

use serde::{Serialize, Serializer};

use crate::error::{Result, WatermarkError};
use crate::util::dna::triplet_index;

/// 字母 A-Z、数字 0-9、空格与 12 个标点，共 49 个符号。
///
/// 选码规则：
/// - 不使用起始密码子 ATG / GTG / TTG，避免意外启动翻译；
/// - 终止密码子 TAA / TAG / TGA 分别固定给 `V` / `W` / `.`；
/// - 其余 15 个三联体（含 3 个起始密码子）不在表中，作为水印区段的边界（guard）。
const ENTRIES: [(u8, [u8; 3]); 49] = [
    (b'A', *b"ACC"), (b'B', *b"AGT"), (b'C', *b"CAT"), (b'D', *b"CCA"),
    (b'E', *b"CGT"), (b'F', *b"CGA"), (b'G', *b"CGC"), (b'H', *b"CGG"),
    (b'I', *b"CTA"), (b'J', *b"CTC"), (b'K', *b"CTG"), (b'L', *b"GAC"),
    (b'M', *b"GCA"), (b'N', *b"GCC"), (b'O', *b"GCG"), (b'P', *b"GCT"),
    (b'Q', *b"GGA"), (b'R', *b"GGC"), (b'S', *b"GGG"), (b'T', *b"GTC"),
    (b'U', *b"GTT"), (b'V', *b"TAA"), (b'W', *b"TAG"), (b'X', *b"TCA"),
    (b'Y', *b"TCC"), (b'Z', *b"TCG"),
    (b'0', *b"ACA"), (b'1', *b"ACG"), (b'2', *b"ACT"), (b'3', *b"AGA"),
    (b'4', *b"AGC"), (b'5', *b"AGG"), (b'6', *b"CAA"), (b'7', *b"CAC"),
    (b'8', *b"CAG"), (b'9', *b"CCT"),
    (b'.', *b"TGA"), (b',', *b"TCT"), (b'?', *b"TGC"), (b'!', *b"TGG"),
    (b'-', *b"AAC"), (b'_', *b"AAG"), (b'(', *b"AAT"), (b')', *b"ATA"),
    (b'[', *b"ATC"), (b']', *b"ATT"), (b'@', *b"CCC"), (b'/', *b"GAG"),
    (b' ', *b"AAA"),
];

pub const START_CODONS: [[u8; 3]; 3] = [*b"ATG", *b"GTG", *b"TTG"];
pub const STOP_CODONS: [([u8; 3], u8); 3] = [(*b"TAA", b'V'), (*b"TAG", b'W'), (*b"TGA", b'.')];

/// 全局唯一的符号表，编译期构建，运行期只读。
pub static SYMBOL_TABLE: SymbolTable = SymbolTable::build(&ENTRIES);

/// 核苷酸三联体，保证只含 A/C/G/T
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Triplet([u8; 3]);

impl Triplet {
    pub fn as_bytes(&self) -> &[u8; 3] {
        &self.0
    }
}

impl fmt::Display for Triplet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &b in &self.0 {
            fmt::Write::write_char(f, b as char)?;
        }
        Ok(())
    }
}

impl Serialize for Triplet {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// 符号 ↔ 三联体双射
pub struct SymbolTable {
    /// ASCII 符号 → 三联体；全 0 表示未收录
    forward: [[u8; 3]; 128],
    /// 三联体下标（2-bit × 3）→ ASCII 符号；0 表示未收录
    reverse: [u8; 64],
    len: usize,
}

const fn same(a: &[u8; 3], b: &[u8; 3]) -> bool {
    a[0] == b[0] && a[1] == b[1] && a[2] == b[2]
}

impl SymbolTable {
    /// 表不满足双射 / 含起始密码子 / 终止密码子归属不对时，编译失败。
    const fn build(entries: &[(u8, [u8; 3])]) -> Self {
        let mut forward = [[0u8; 3]; 128];
        let mut reverse = [0u8; 64];
        let mut i = 0;
        while i < entries.len() {
            let (sym, t) = entries[i];
            if sym >= 128 || sym == 0 || sym.is_ascii_lowercase() {
                panic!("symbol must be printable uppercase ASCII");
            }
            if forward[sym as usize][0] != 0 {
                panic!("duplicate symbol in table");
            }
            let idx = match triplet_index(&t) {
                Some(idx) => idx,
                None => panic!("triplet must consist of A/C/G/T"),
            };
            if reverse[idx] != 0 {
                panic!("duplicate triplet in table");
            }
            let mut s = 0;
            while s < START_CODONS.len() {
                if same(&t, &START_CODONS[s]) {
                    panic!("start codon used as a watermark triplet");
                }
                s += 1;
            }
            forward[sym as usize] = t;
            reverse[idx] = sym;
            i += 1;
        }
        let mut s = 0;
        while s < STOP_CODONS.len() {
            let (stop, sym) = STOP_CODONS[s];
            let idx = match triplet_index(&stop) {
                Some(idx) => idx,
                None => panic!("stop codon must consist of A/C/G/T"),
            };
            if reverse[idx] != sym {
                panic!("stop codon not reserved for its symbol");
            }
            s += 1;
        }
        Self { forward, reverse, len: entries.len() }
    }

    /// 符号 → 三联体。小写 ASCII 字母按大写处理。
    pub fn triplet_for(&self, symbol: char) -> Result<Triplet> {
        let up = symbol.to_ascii_uppercase();
        if up.is_ascii() {
            let t = self.forward[up as usize];
            if t[0] != 0 {
                return Ok(Triplet(t));
            }
        }
        Err(WatermarkError::UnsupportedSymbol { symbol, pos: 0 })
    }

    /// 三联体 → 符号。长度不为 3、含非 ACGT 或未收录时返回 `UnknownTriplet`。
    pub fn symbol_for(&self, triplet: &[u8]) -> Result<char> {
        self.entry_for(triplet).map(|(sym, _)| sym)
    }

    /// 三联体 → (符号, `Triplet`)，一次查表
    pub(crate) fn entry_for(&self, triplet: &[u8]) -> Result<(char, Triplet)> {
        match self.lookup(triplet) {
            Some(sym) => Ok((sym, Triplet(self.forward[sym as usize]))),
            None => Err(WatermarkError::UnknownTriplet {
                triplet: String::from_utf8_lossy(triplet).into_owned(),
                pos: 0,
            }),
        }
    }

    #[inline]
    pub fn is_recognized_triplet(&self, triplet: &[u8]) -> bool {
        self.lookup(triplet).is_some()
    }

    #[inline]
    fn lookup(&self, triplet: &[u8]) -> Option<char> {
        let t: &[u8; 3] = triplet.try_into().ok()?;
        let idx = triplet_index(t)?;
        match self.reverse[idx] {
            0 => None,
            sym => Some(sym as char),
        }
    }

    /// 按表定义顺序列出全部 (符号, 三联体)
    pub fn entries(&self) -> impl Iterator<Item = (char, Triplet)> + '_ {
        ENTRIES.iter().map(|&(sym, t)| (sym as char, Triplet(t)))
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}
