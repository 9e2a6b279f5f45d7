//! `logscout analyze` command handler

use std::io::Write;
use std::path::Path;

use serde::Serialize;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tracing::{debug, info};

use logscout_core::config::LogscoutConfig;
use logscout_engine::{BatchReport, Catalog};

use crate::cli::AnalyzeArgs;
use crate::commands::{engine_config, ranking_options};
use crate::error::CliError;
use crate::output::{OutputWriter, Render, confidence_colored};

/// Execute the `analyze` command.
pub async fn execute(
    args: AnalyzeArgs,
    config: &LogscoutConfig,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    let engine = engine_config(config, &args.sources);
    let max_lines = args.max_lines.unwrap_or(engine.batch_max_lines);
    if max_lines == 0 {
        return Err(CliError::Command("--max-lines must be greater than 0".to_owned()));
    }

    let lines = read_lines(&args.file, max_lines, engine.max_line_bytes).await?;
    info!(
        file = %args.file.display(),
        lines = lines.len(),
        max_lines,
        "analyzing log file"
    );

    let (recommender, _) = Catalog::load(&engine).await?.into_recommender(&engine)?;
    let options = ranking_options(&engine.default_options, &args.ranking);
    let batch = recommender.recommend_batch(&lines, &options)?;

    let report = AnalyzeReport {
        source: args.file.display().to_string(),
        match_rate: batch.match_rate(),
        batch,
    };
    writer.render(&report)?;

    if report.batch.total_lines > 0 && report.batch.matched_lines == 0 {
        return Err(CliError::NoMatch(format!(
            "none of the {} lines matched a loaded format",
            report.batch.total_lines
        )));
    }

    Ok(())
}

/// Read up to `max_lines` non-empty lines from a file, or stdin for `-`.
///
/// Bytes are decoded lossily, so invalid UTF-8 becomes U+FFFD instead of
/// failing the whole run. At most `max_line_bytes + 1` bytes of a line are
/// kept; the engine then treats an over-long line as unmatched.
pub async fn read_lines(
    path: &Path,
    max_lines: usize,
    max_line_bytes: usize,
) -> Result<Vec<String>, CliError> {
    let mut reader: Box<dyn AsyncBufRead + Unpin + Send> = if path == Path::new("-") {
        Box::new(BufReader::new(tokio::io::stdin()))
    } else {
        Box::new(BufReader::new(tokio::fs::File::open(path).await?))
    };

    let mut buf = Vec::new();
    let mut out = Vec::new();
    let mut line_number = 0usize;
    while out.len() < max_lines {
        if !read_capped_line(&mut reader, &mut buf, max_line_bytes).await? {
            break;
        }
        line_number += 1;

        if buf.last() == Some(&b'\n') {
            buf.pop();
            if buf.last() == Some(&b'\r') {
                buf.pop();
            }
        }
        if buf.len() > max_line_bytes {
            debug!(line_number, max_line_bytes, "line truncated while reading");
        }

        let line = String::from_utf8_lossy(&buf);
        if line.trim().is_empty() {
            continue;
        }
        out.push(line.into_owned());
    }
    Ok(out)
}

/// Read one line into `buf`, keeping at most `max_bytes + 1` bytes of it.
///
/// Returns `false` at end of input.
async fn read_capped_line<R>(
    reader: &mut R,
    buf: &mut Vec<u8>,
    max_bytes: usize,
) -> std::io::Result<bool>
where
    R: AsyncBufRead + Unpin,
{
    buf.clear();
    let mut read_any = false;
    loop {
        let chunk = reader.fill_buf().await?;
        if chunk.is_empty() {
            return Ok(read_any);
        }
        read_any = true;

        let (used, done) = match chunk.iter().position(|&b| b == b'\n') {
            Some(idx) => (idx + 1, true),
            None => (chunk.len(), false),
        };
        let room = (max_bytes + 1).saturating_sub(buf.len());
        buf.extend_from_slice(&chunk[..used.min(room)]);
        reader.consume(used);

        if done {
            return Ok(true);
        }
    }
}

/// Batch analysis result for a file.
#[derive(Serialize)]
pub struct AnalyzeReport {
    pub source: String,
    pub match_rate: f64,
    #[serde(flatten)]
    pub batch: BatchReport,
}

impl Render for AnalyzeReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        writeln!(w, "Analysis: {}", self.source.bold())?;
        writeln!(
            w,
            "  Lines: {} analyzed, {} matched ({:.1}%)",
            self.batch.total_lines,
            self.batch.matched_lines.to_string().green(),
            self.match_rate
        )?;
        writeln!(w)?;

        if self.batch.top_formats.is_empty() {
            writeln!(w, "{}", "No line matched any format.".yellow())?;
        } else {
            writeln!(w, "{:<28} {:>7} {:>7}", "Top Format", "Lines", "Share")?;
            writeln!(w, "{}", "-".repeat(44))?;
            for t in &self.batch.top_formats {
                writeln!(w, "{:<28} {:>7} {:>6.1}%", t.format_name, t.lines, t.share)?;
            }
        }

        if !self.batch.format_matches.is_empty() {
            writeln!(w)?;
            writeln!(w, "{:<28} {:>7} {:>9}", "Candidate Format", "Matches", "Avg Conf")?;
            writeln!(w, "{}", "-".repeat(46))?;
            for f in &self.batch.format_matches {
                writeln!(
                    w,
                    "{:<28} {:>7} {:>9}",
                    f.format_name,
                    f.match_count,
                    confidence_colored(f.average_confidence)
                )?;
            }
        }

        writeln!(w)?;
        writeln!(w, "{:<6} {:<28} {:>6}", "Line", "Best Format", "Conf")?;
        writeln!(w, "{}", "-".repeat(44))?;
        for line in &self.batch.results {
            match line.recommendations.first() {
                Some(top) => writeln!(
                    w,
                    "{:<6} {:<28} {}",
                    line.line_number,
                    top.format_name,
                    confidence_colored(top.confidence)
                )?,
                None => writeln!(w, "{:<6} {:<28}", line.line_number, "(no match)".dimmed())?,
            }
        }

        Ok(())
    }
}
