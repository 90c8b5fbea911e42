//! 演示如何在 library 模式下使用 dna-watermark 嵌入、提取与检测水印。
//!
//! 运行方式：
//! ```bash
//! cargo run --example watermark_demo
//! ```

use dna_watermark::codec;
use dna_watermark::site::{delimited_regions, AmbiguityPolicy, SiteOpt, END_MARK, START_MARK};
use dna_watermark::watermark::{self, WatermarkEmbedder, WatermarkExtractor, WatermarkOpt};

/// "A" 与 "HI" 两个定界区段
const TWO_MARKS: &str = "CCGTACACCGATCTTCCGTACCGGCTAGATCTT";

fn main() -> dna_watermark::Result<()> {
    // 1. 文本编解码
    let enc = codec::encode("HELLO")?;
    println!("编码 'HELLO': {} ({} nt)", enc.dna_sequence, enc.length);
    for d in &enc.details {
        println!("  '{}' -> {}", d.char, d.triplet);
    }
    let dec = codec::decode(&enc.dna_sequence)?;
    println!("解码结果: {}", dec.text);

    // 2. 宿主序列与定界符
    let host = "ATGACCCGGGCGTTTGAAGGGAAACAATTGCCGATGTACGTCAGGCTTTTA";
    println!("\n宿主序列: {}", host);
    println!("宿主长度: {} bp", host.len());
    println!(
        "定界符: {} ... {}",
        String::from_utf8_lossy(&START_MARK),
        String::from_utf8_lossy(&END_MARK)
    );

    // 3. 嵌入
    let embedder = WatermarkEmbedder::default();
    let marked = embedder.embed_with_info(host, "COPYRIGHT 2024 ACME")?;
    println!("\n嵌入位置: {}", marked.watermark_info.position);
    println!("水印序列: {}", marked.watermark_info.sequence);
    println!("插入片段: {}", marked.watermark_info.inserted);
    println!("带水印序列: {}", marked.watermarked_sequence);
    for r in delimited_regions(marked.watermarked_sequence.as_bytes(), 1) {
        println!("  定界区段 {} ({} 个符号)", r, r.len / 3);
    }

    // 4. 提取
    let found = WatermarkExtractor::default().extract_with_info(&marked.watermarked_sequence)?;
    println!("\n提取结果: '{}' @ {}", found.message, found.position);

    // 5. 侵权检测（双链）
    let hits = watermark::detect(&marked.watermarked_sequence, "COPYRIGHT 2024 ACME")?;
    println!("\n检测到 {} 处命中:", hits.len());
    for h in &hits {
        println!("  {} 链 {}", h.strand, h.region);
    }

    // 6. 宽松策略：多个定界区段时取第一个
    let lenient = WatermarkExtractor::new(WatermarkOpt {
        site: SiteOpt { ambiguity: AmbiguityPolicy::PreferFirst, ..SiteOpt::default() },
        ..WatermarkOpt::default()
    });
    match watermark::extract(TWO_MARKS) {
        Ok(m) => println!("\n严格模式: {}", m),
        Err(e) => println!("\n严格模式: {}", e),
    }
    println!("宽松模式: {}", lenient.extract(TWO_MARKS)?);

    println!("\n完成！");
    Ok(())
}
