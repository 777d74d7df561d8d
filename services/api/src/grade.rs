use crate::infra::{load_config, resolve_format};
use assignment_grader::error::AppError;
use assignment_grader::grading::intake::{
    extract_documents, parse_criteria, validate_criteria, validate_max_score,
};
use assignment_grader::grading::scoring::Dimension;
use assignment_grader::grading::{normalize, Criterion, Document, GradeReport, Grader, GradingError};
use clap::Args;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Args, Debug)]
pub(crate) struct GradeArgs {
    /// Assignment file to grade (.txt, .pdf, .docx); repeat to concatenate several
    #[arg(long = "file", required = true)]
    pub(crate) files: Vec<PathBuf>,
    /// Plain-text criteria file, one criterion per line
    #[arg(long, conflicts_with = "criteria")]
    pub(crate) criteria_file: Option<PathBuf>,
    /// A single grading criterion; repeat for several
    #[arg(long = "criterion")]
    pub(crate) criteria: Vec<String>,
    /// Maximum achievable score (defaults to GRADER_DEFAULT_MAX_SCORE)
    #[arg(long)]
    pub(crate) max_score: Option<f64>,
    /// Print the full report as JSON instead of a summary
    #[arg(long)]
    pub(crate) json: bool,
}

pub(crate) fn run_grade(args: GradeArgs) -> Result<(), AppError> {
    let GradeArgs {
        files,
        criteria_file,
        criteria,
        max_score,
        json,
    } = args;

    let config = load_config(None, None)?;
    let criteria = match criteria_file {
        Some(path) => parse_criteria(&fs::read_to_string(path)?)?,
        None => validate_criteria(criteria)?,
    };
    let max_score = validate_max_score(max_score.unwrap_or(config.grading.default_max_score))?;

    let documents = files
        .iter()
        .map(|path| read_document(path))
        .collect::<Result<Vec<_>, AppError>>()?;
    let grader = Grader::from_config(&config.grading);
    let text = extract_documents(
        grader.capabilities(),
        &documents,
        config.grading.max_upload_bytes,
    )?;
    let text = normalize(&text);
    if text.is_empty() {
        return Err(GradingError::EmptyText.into());
    }

    let report = grader.grade_normalized(&text, &criteria, max_score);
    if json {
        let rendered = serde_json::to_string_pretty(&report).map_err(std::io::Error::from)?;
        println!("{rendered}");
    } else {
        let names: Vec<String> = documents.into_iter().map(|document| document.name).collect();
        render_report(&report, &names, &criteria);
    }
    Ok(())
}

fn read_document(path: &Path) -> Result<Document, AppError> {
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let format = resolve_format(&name, None)?;
    let bytes = fs::read(path)?;
    Ok(Document {
        name,
        format,
        bytes,
    })
}

fn render_report(report: &GradeReport, files: &[String], criteria: &[Criterion]) {
    println!("Assignment grade");
    println!("Files: {}", files.join(", "));
    println!(
        "Score: {:.1} / {:.1} ({:.1}%)",
        report.final_score, report.max_score, report.percentage
    );

    println!("\nScore breakdown");
    let breakdown = &report.score_breakdown;
    for (dimension, points) in Dimension::ALL.into_iter().zip([
        breakdown.content_quality,
        breakdown.writing_style,
        breakdown.criteria_coverage,
        breakdown.technical_accuracy,
    ]) {
        println!("- {}: {}/{}", dimension.label(), points, dimension.ceiling());
    }

    let quality = &report.quality_metrics;
    let style = &report.style_metrics;
    println!("\nText metrics");
    println!(
        "- {} words, {} sentences, readability {:.1}, grade level {:.1}",
        quality.word_count, quality.sentence_count, quality.readability_score, quality.grade_level
    );
    println!(
        "- {} transition words, {} passive constructions, lexical diversity {:.2}",
        style.transition_words, style.passive_voice_count, style.lexical_diversity
    );

    if report.semantic_analysis.is_empty() {
        println!("\nCriteria coverage: unavailable");
    } else {
        println!("\nCriteria coverage");
        for criterion in criteria {
            if let Some(entry) = report.semantic_analysis.get(criterion.as_str()) {
                println!("- {}: {:.2}", criterion.as_str(), entry.coverage_score);
                for sentence in &entry.relevant_sentences {
                    println!("    \"{sentence}\"");
                }
            }
        }
    }

    match &report.sentiment_analysis {
        Some(sentiment) => println!(
            "\nTone: {} ({:.0}% positive, {:.0}% neutral, {:.0}% negative)",
            sentiment.overall_tone.label(),
            sentiment.positive_ratio * 100.0,
            sentiment.neutral_ratio * 100.0,
            sentiment.negative_ratio * 100.0
        ),
        None => println!("\nTone: unavailable"),
    }

    let feedback = &report.feedback;
    for (heading, items) in [
        ("Strengths", &feedback.strengths),
        ("Weaknesses", &feedback.weaknesses),
        ("Suggestions", &feedback.suggestions),
    ] {
        if items.is_empty() {
            continue;
        }
        println!("\n{heading}");
        for item in items {
            println!("- {item}");
        }
    }
    println!("\n{}", feedback.overall_assessment);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_document_rejects_unsupported_extensions_before_reading() {
        let err = read_document(Path::new("/nonexistent/notes.md")).expect_err("rejected");
        assert!(matches!(
            err,
            AppError::Grading(GradingError::UnsupportedFormat { .. })
        ));
    }

    #[test]
    fn read_document_surfaces_missing_files_as_io_errors() {
        let err = read_document(Path::new("/nonexistent/essay.txt")).expect_err("missing");
        assert!(matches!(err, AppError::Io(_)));
    }
}
