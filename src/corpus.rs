//! Corpus-level driver: reads the aligned text files, runs one interaction
//! session per line, writes corrected (and optionally original) hypotheses,
//! and reports running effort ratios while the run progresses.

use std::fs;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::config::SessionConfig;
use crate::error::{SimError, SimResult};
use crate::metrics::{display_ratio, CorpusEffort};
use crate::simulation::generator::ScriptedGenerator;
use crate::simulation::session::{run_sentence, SessionParams};
use crate::vocabulary::{Tokenizer, Vocabulary};

#[derive(Debug, Clone)]
pub struct CorpusArgs {
    /// Source sentences, one per line.
    pub source_path: PathBuf,
    /// Reference translations, aligned line by line with the sources.
    pub reference_path: PathBuf,
    /// Pre-translated baseline hypotheses feeding the scripted generator.
    pub hypotheses_path: PathBuf,
    /// Corrected hypotheses are written here, input order, one per line.
    pub dest_path: Option<PathBuf>,
    /// Pre-interaction hypotheses, for comparing against the corrected ones.
    pub original_dest_path: Option<PathBuf>,
    /// Final totals and ratios as JSON.
    pub eval_output_path: Option<PathBuf>,
}

/// What a run produced, whether it drained fully or was interrupted.
#[derive(Debug, Clone, Copy)]
pub struct RunSummary {
    pub totals: CorpusEffort,
    pub interrupted: bool,
}

/// Reads a corpus file into lines, stripping the single trailing empty line
/// that a final newline produces.
pub fn read_corpus_lines(path: &Path) -> SimResult<Vec<String>> {
    let contents = fs::read_to_string(path)?;
    let mut lines: Vec<String> = contents.split('\n').map(str::to_string).collect();
    if lines.last().is_some_and(|l| l.is_empty()) {
        lines.pop();
    }
    Ok(lines)
}

/// Runs the whole simulation. `interrupt` is polled between sentences; when
/// it reports true the run drains gracefully and the totals accumulated so
/// far are still returned (and written) rather than lost.
pub fn run_simulation(
    config: &SessionConfig,
    args: &CorpusArgs,
    interrupt: &dyn Fn() -> bool,
) -> SimResult<RunSummary> {
    let tokenizer = Tokenizer::new(config.tokenize);

    let sources = tokenize_lines(&tokenizer, read_corpus_lines(&args.source_path)?);
    let references = tokenize_lines(&tokenizer, read_corpus_lines(&args.reference_path)?);
    if sources.len() != references.len() {
        return Err(SimError::AlignmentExhausted {
            sources: sources.len(),
            references: references.len(),
        });
    }
    let baselines = tokenize_lines(&tokenizer, read_corpus_lines(&args.hypotheses_path)?);

    // The generator's output vocabulary comes from its own translations;
    // reference-only words stay out of it so they exercise the unknown-word
    // machinery exactly as out-of-vocabulary corrections would.
    let mut vocabulary = Vocabulary::new();
    let mut generator = ScriptedGenerator::from_parallel(&sources, &baselines, &mut vocabulary)?
        .with_params(config.decoding);

    let mut dest = open_writer(args.dest_path.as_deref())?;
    let mut original_dest = open_writer(args.original_dest_path.as_deref())?;

    let params = SessionParams {
        prefix_mode: config.prefix_mode,
        max_extra_tokens: config.max_extra_tokens,
    };
    let mut totals = CorpusEffort::default();
    let mut interrupted = false;

    for (n_line, (source, reference)) in sources.iter().zip(&references).enumerate() {
        if interrupt() {
            tracing::info!("interrupt received, draining after {n_line} sentences");
            interrupted = true;
            break;
        }
        tracing::debug!(sentence = n_line + 1, source = %source.join(" "), "processing");
        tracing::debug!(wanted = %reference.join(" "), "reference");

        let outcome = run_sentence(source, reference, &mut generator, &vocabulary, &params)?;

        if let Some(writer) = original_dest.as_mut() {
            writeln!(writer, "{}", outcome.original_hypothesis.join(" "))?;
        }
        if let Some(writer) = dest.as_mut() {
            writeln!(writer, "{}", outcome.final_hypothesis.join(" "))?;
        }

        totals.absorb(&outcome.effort);
        tracing::debug!(
            errors = outcome.effort.errors,
            wsr = %display_ratio(outcome.effort.wsr()),
            mar = %display_ratio(outcome.effort.mar()),
            mar_c = %display_ratio(outcome.effort.mar_c()),
            state = ?outcome.state,
            "sentence closed"
        );

        if (n_line + 1) % config.report_every == 0 {
            flush(&mut dest)?;
            flush(&mut original_dest)?;
            tracing::info!(
                sentences = n_line + 1,
                wsr = %display_ratio(totals.wsr()),
                mar = %display_ratio(totals.mar()),
                mar_c = %display_ratio(totals.mar_c()),
                "progress"
            );
        }
    }

    flush(&mut dest)?;
    flush(&mut original_dest)?;

    if let Some(path) = &args.eval_output_path {
        write_eval_report(path, &totals)?;
    }

    tracing::info!(
        sentences = totals.sentences,
        errors = totals.errors,
        selections = totals.mouse_actions,
        wsr = %display_ratio(totals.wsr()),
        mar = %display_ratio(totals.mar()),
        mar_c = %display_ratio(totals.mar_c()),
        "run finished"
    );

    Ok(RunSummary {
        totals,
        interrupted,
    })
}

fn tokenize_lines(tokenizer: &Tokenizer, lines: Vec<String>) -> Vec<Vec<String>> {
    lines.iter().map(|line| tokenizer.tokenize(line)).collect()
}

fn open_writer(path: Option<&Path>) -> SimResult<Option<BufWriter<File>>> {
    match path {
        Some(path) => Ok(Some(BufWriter::new(File::create(path)?))),
        None => Ok(None),
    }
}

fn flush(writer: &mut Option<BufWriter<File>>) -> SimResult<()> {
    if let Some(writer) = writer.as_mut() {
        writer.flush()?;
    }
    Ok(())
}

#[derive(serde::Serialize)]
struct EvalReport {
    totals: CorpusEffort,
    wsr: Option<f64>,
    mar: Option<f64>,
    mar_c: Option<f64>,
}

fn write_eval_report(path: &Path, totals: &CorpusEffort) -> SimResult<()> {
    let report = EvalReport {
        totals: *totals,
        wsr: totals.wsr(),
        mar: totals.mar(),
        mar_c: totals.mar_c(),
    };
    let file = File::create(path)?;
    serde_json::to_writer_pretty(BufWriter::new(file), &report)?;
    Ok(())
}
