use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use log::{info, warn};
use rayon::prelude::*;
use serde::Serialize;
use std::io::Write;

use dna_watermark::codec::{self, SYMBOL_TABLE};
use dna_watermark::io::fasta::{self, FastaReader, FastaRecord};
use dna_watermark::site::{AmbiguityPolicy, Region, SiteOpt};
use dna_watermark::watermark::{
    self, Hit, WatermarkEmbedder, WatermarkExtractor, WatermarkOpt, Watermarked, DEFAULT_MAX_MESSAGE_LEN,
};

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

#[derive(Parser, Debug)]
#[command(
    name = "dna-watermark",
    author,
    version,
    about = "Embed and recover traceable text watermarks in DNA sequences",
    arg_required_else_help = true
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Debug, Clone)]
struct InputArgs {
    /// FASTA file (or a literal sequence with --seq)
    input: String,
    /// Treat INPUT as a literal nucleotide sequence
    #[arg(long = "seq")]
    literal: bool,
}

#[derive(Args, Debug, Clone, Copy)]
struct SiteArgs {
    /// Minimum host length in bases
    #[arg(long = "min-host-len", default_value_t = 0)]
    min_host_len: usize,
    /// Ignore candidate regions shorter than this many symbols
    #[arg(long = "min-symbols", default_value_t = 1)]
    min_symbols: usize,
    /// Policy when several delimited regions are present: strict | first
    #[arg(long = "ambiguity", default_value = "strict")]
    ambiguity: AmbiguityPolicy,
}

impl SiteArgs {
    fn opt(self) -> SiteOpt {
        SiteOpt { min_host_len: self.min_host_len, min_symbols: self.min_symbols, ambiguity: self.ambiguity }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Encode text into a DNA triplet sequence
    Encode {
        text: String,
        #[arg(long)]
        json: bool,
    },
    /// Decode a DNA triplet sequence back into text
    Decode {
        sequence: String,
        #[arg(long)]
        json: bool,
    },
    /// Embed a watermark into the first sequence of INPUT
    Embed {
        #[command(flatten)]
        input: InputArgs,
        /// Watermark text
        #[arg(short, long)]
        message: String,
        /// Output FASTA path (stdout if omitted)
        #[arg(short, long)]
        out: Option<String>,
        #[arg(long = "max-message-len", default_value_t = DEFAULT_MAX_MESSAGE_LEN)]
        max_message_len: usize,
        #[command(flatten)]
        site: SiteArgs,
        #[arg(long)]
        json: bool,
    },
    /// Recover the watermark of every sequence in INPUT
    Extract {
        #[command(flatten)]
        input: InputArgs,
        #[command(flatten)]
        site: SiteArgs,
        #[arg(short = 't', long = "threads", default_value_t = 1)]
        threads: usize,
        #[arg(long)]
        json: bool,
    },
    /// Search every sequence in INPUT (both strands) for a known watermark
    Detect {
        #[command(flatten)]
        input: InputArgs,
        /// Watermark text to look for
        #[arg(short, long)]
        message: String,
        #[arg(short = 't', long = "threads", default_value_t = 1)]
        threads: usize,
    },
    /// Print the symbol / triplet table
    Table,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Encode { text, json } => run_encode(&text, json),
        Commands::Decode { sequence, json } => run_decode(&sequence, json),
        Commands::Embed { input, message, out, max_message_len, site, json } => {
            let opt = WatermarkOpt { site: site.opt(), max_message_len };
            run_embed(&input, &message, out.as_deref(), opt, json)
        }
        Commands::Extract { input, site, threads, json } => {
            let opt = WatermarkOpt { site: site.opt(), ..WatermarkOpt::default() };
            run_extract(&input, opt, threads, json)
        }
        Commands::Detect { input, message, threads } => run_detect(&input, &message, threads),
        Commands::Table => run_table(),
    }
}

fn run_encode(text: &str, json: bool) -> Result<()> {
    let enc = codec::encode(text).context("cannot encode text")?;
    if json {
        println!("{}", serde_json::to_string_pretty(&enc)?);
    } else {
        println!("{}", enc.dna_sequence);
    }
    Ok(())
}

fn run_decode(sequence: &str, json: bool) -> Result<()> {
    let dec = codec::decode(sequence).context("cannot decode sequence")?;
    if json {
        println!("{}", serde_json::to_string_pretty(&dec)?);
    } else {
        println!("{}", dec.text);
    }
    Ok(())
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct EmbedReport<'a> {
    id: &'a str,
    #[serde(flatten)]
    result: &'a Watermarked,
    embedded_at: String,
}

fn run_embed(input: &InputArgs, message: &str, out_path: Option<&str>, opt: WatermarkOpt, json: bool) -> Result<()> {
    let records = load_records(input)?;
    if records.len() > 1 {
        warn!("{} records in '{}', only the first one is watermarked", records.len(), input.input);
    }
    let Some(rec) = records.into_iter().next() else {
        anyhow::bail!("no sequence to watermark in '{}'", input.input);
    };

    let embedder = WatermarkEmbedder::new(opt);
    let marked = embedder
        .embed_with_info(&rec.seq, message)
        .with_context(|| format!("cannot embed watermark into '{}'", rec.id))?;
    let position = marked.watermark_info.position;
    info!("watermark '{}' inserted into '{}' at {}", message, rec.id, position);

    if json {
        let report = EmbedReport { id: &rec.id, result: &marked, embedded_at: chrono::Utc::now().to_rfc3339() };
        println!("{}", serde_json::to_string_pretty(&report)?);
    }

    let desc = match &rec.desc {
        Some(d) => format!("{} watermark={}", d, position),
        None => format!("watermark={}", position),
    };
    let out_rec = FastaRecord { id: rec.id, desc: Some(desc), seq: marked.watermarked_sequence };
    match out_path {
        Some(p) => {
            let fh = std::fs::File::create(p).with_context(|| format!("cannot create output '{}'", p))?;
            let mut w = std::io::BufWriter::new(fh);
            fasta::write_record(&mut w, &out_rec)?;
            w.flush()?;
        }
        None if !json => {
            let stdout = std::io::stdout();
            let mut w = std::io::BufWriter::new(stdout.lock());
            fasta::write_record(&mut w, &out_rec)?;
            w.flush()?;
        }
        None => {}
    }
    Ok(())
}

#[derive(Serialize)]
struct ExtractLine<'a> {
    id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    position: Option<Region>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

fn run_extract(input: &InputArgs, opt: WatermarkOpt, threads: usize, json: bool) -> Result<()> {
    let records = load_records(input)?;
    let seqs: Vec<&str> = records.iter().map(|r| r.seq.as_str()).collect();
    let extractor = WatermarkExtractor::new(opt);
    let pool = build_pool(threads)?;
    let results = pool.install(|| extractor.extract_all(&seqs));

    let lines: Vec<ExtractLine> = records
        .iter()
        .zip(&results)
        .map(|(rec, res)| match res {
            Ok(e) => ExtractLine { id: &rec.id, message: Some(&e.message), position: Some(e.position), error: None },
            Err(err) => ExtractLine { id: &rec.id, message: None, position: None, error: Some(err.to_string()) },
        })
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&lines)?);
    } else {
        for l in &lines {
            match (&l.message, &l.position, &l.error) {
                (Some(m), Some(p), _) => println!("{}\t{}\t{}", l.id, m, p),
                (_, _, Some(e)) => println!("{}\t*\t{}", l.id, e),
                _ => {}
            }
        }
    }

    let failed = results.iter().filter(|r| r.is_err()).count();
    if failed == results.len() {
        anyhow::bail!("no watermark recovered from {} record(s) in '{}'", failed, input.input);
    }
    Ok(())
}

fn run_detect(input: &InputArgs, message: &str, threads: usize) -> Result<()> {
    let records = load_records(input)?;
    let pool = build_pool(threads)?;
    let results: Vec<dna_watermark::Result<Vec<Hit>>> =
        pool.install(|| records.par_iter().map(|r| watermark::detect(&r.seq, message)).collect());

    let mut total = 0usize;
    for (rec, res) in records.iter().zip(results) {
        let hits = res.with_context(|| format!("cannot scan '{}'", rec.id))?;
        for h in &hits {
            println!("{}\t{}\t{}", rec.id, h.region, h.strand);
        }
        total += hits.len();
    }
    if total == 0 {
        println!("no match for '{}'", message);
    }
    Ok(())
}

fn run_table() -> Result<()> {
    for (sym, triplet) in SYMBOL_TABLE.entries() {
        println!("'{}'\t{}", sym, triplet);
    }
    Ok(())
}

fn load_records(input: &InputArgs) -> Result<Vec<FastaRecord>> {
    if input.literal {
        return Ok(vec![FastaRecord { id: "input".to_string(), desc: None, seq: input.input.clone() }]);
    }
    let fh = std::fs::File::open(&input.input).with_context(|| format!("cannot open FASTA '{}'", input.input))?;
    let records = FastaReader::new(std::io::BufReader::new(fh)).read_all()?;
    if records.is_empty() {
        anyhow::bail!("FASTA file '{}' contains no sequences", input.input);
    }
    Ok(records)
}

fn build_pool(threads: usize) -> Result<rayon::ThreadPool> {
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build()
        .context("cannot build thread pool")
}
