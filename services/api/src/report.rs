use clap::Args;
use lhi::assessment::{
    AnswerMap, AssessmentResult, Catalog, EnrichedAssessment, FallbackNarrator, ScoringEngine,
};
use lhi::error::AppError;
use std::fmt::Write as _;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub(crate) struct ScoreArgs {
    /// JSON object mapping item ids to answers, e.g. {"1": 4, "2": 2}
    #[arg(long)]
    pub(crate) answers: PathBuf,
    /// Print the enriched result as JSON instead of a text report
    #[arg(long)]
    pub(crate) json: bool,
}

pub(crate) fn run_score(args: ScoreArgs) -> Result<(), AppError> {
    let raw = std::fs::read_to_string(&args.answers)?;
    let answers = parse_answers(&raw)?;
    let engine = ScoringEngine::default();

    let ignored = unknown_items(engine.catalog(), &answers);
    if !ignored.is_empty() {
        eprintln!("Ignoring answers for unknown items: {ignored:?}");
    }

    let result = engine.score(&answers);
    if args.json {
        let analysis = FallbackNarrator.analysis(&result);
        let enriched = EnrichedAssessment::new(result).with_analysis(analysis);
        println!("{}", serde_json::to_string_pretty(&enriched)?);
    } else {
        print!("{}", render_result(&result));
    }

    Ok(())
}

pub(crate) fn run_questions() -> Result<(), AppError> {
    print!("{}", render_questions(ScoringEngine::default().catalog()));
    Ok(())
}

/// Accepts either a bare item map or a submission-shaped `{ "answers": { .. } }` document.
pub(crate) fn parse_answers(raw: &str) -> Result<AnswerMap, serde_json::Error> {
    let value: serde_json::Value = serde_json::from_str(raw)?;
    match value.get("answers") {
        Some(nested) => serde_json::from_value(nested.clone()),
        None => serde_json::from_value(value),
    }
}

fn unknown_items(catalog: &Catalog, answers: &AnswerMap) -> Vec<u32> {
    answers
        .keys()
        .copied()
        .filter(|id| catalog.item(*id).is_none())
        .collect()
}

pub(crate) fn render_result(result: &AssessmentResult) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Relationship health index ({})", result.timestamp);
    let _ = writeln!(
        out,
        "- Total score {} | {}",
        result.total_score,
        result.category.label()
    );
    let _ = writeln!(out, "- Attachment style {}", result.attachment_style.label());
    let _ = writeln!(out, "Dimensions:");
    for dimension in &result.dimensions {
        let _ = writeln!(
            out,
            "  - {} {}: raw {:.2} | z {:+.2} | T {} | {}",
            dimension.id,
            dimension.name,
            dimension.raw_score,
            dimension.z_score,
            dimension.t_score,
            dimension.level.label()
        );
    }
    out
}

pub(crate) fn render_questions(catalog: &Catalog) -> String {
    let mut out = String::new();
    for dimension in catalog.dimensions() {
        let _ = writeln!(
            out,
            "{} {} ({})",
            dimension.id, dimension.name_cn, dimension.name
        );
        for item in catalog.items_for(&dimension.id) {
            let marker = if item.is_reverse { " [R]" } else { "" };
            let _ = writeln!(out, "  {:>2}. {}{}", item.id, item.text, marker);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_bare_and_nested_answer_files() {
        let bare = parse_answers(r#"{"1": 5, "12": 2}"#).expect("bare map");
        assert_eq!(bare.get(&1), Some(&5));
        assert_eq!(bare.get(&12), Some(&2));

        let nested = parse_answers(r#"{"accessCode": "X", "answers": {"3": 1}}"#)
            .expect("nested map");
        assert_eq!(nested.len(), 1);
        assert_eq!(nested.get(&3), Some(&1));

        assert!(parse_answers(r#"{"one": 5}"#).is_err());
    }

    #[test]
    fn unknown_items_are_reported() {
        let engine = ScoringEngine::default();
        let answers: AnswerMap = [(1, 3), (41, 2), (99, 1)].into_iter().collect();
        assert_eq!(unknown_items(engine.catalog(), &answers), vec![41, 99]);
    }

    #[test]
    fn text_report_lists_every_dimension() {
        let answers: AnswerMap = (1..=40).map(|item| (item, 1)).collect();
        let result = ScoringEngine::default().score(&answers);
        let text = render_result(&result);

        assert!(text.contains("Total score 98 | Healthy"));
        assert!(text.contains("Attachment style Secure (安全型)"));
        assert!(text.contains("T 70 | High"));
        assert_eq!(text.lines().filter(|line| line.starts_with("  - ")).count(), 6);
    }

    #[test]
    fn questionnaire_listing_marks_reversed_items() {
        let engine = ScoringEngine::default();
        let text = render_questions(engine.catalog());
        let reversed = engine
            .catalog()
            .items()
            .iter()
            .filter(|item| item.is_reverse)
            .count();

        assert_eq!(text.matches(" [R]").count(), reversed);
        assert_eq!(
            text.lines().filter(|line| line.starts_with("  ")).count(),
            engine.catalog().items().len()
        );
    }
}
