use std::fmt::Write as _;

use super::super::report::AiAnalysis;
use super::super::scoring::{AssessmentResult, Level};

pub const SYSTEM_PROMPT: &str = "你是专业的心理咨询师。请严格按照用户要求的格式输出，每个###标题后都要有独立的内容段落，不要把所有内容合并在一起。";

const INTERPRETATION: &str = "结果解释";
const STRENGTHS: &str = "你的优势";
const STRENGTHS_SHORT: &str = "优势";
const AREAS_TO_WATCH: &str = "需要注意";
const AREAS_TO_WATCH_SUFFIX: &str = "的方面";
const PERSONALIZED: &str = "个性化建议";
const PROFESSIONAL: &str = "专业建议";

fn level_note(level: Level) -> &'static str {
    match level {
        Level::High => "健康",
        Level::Moderate => "中等",
        Level::Low => "需关注",
    }
}

fn score_band(total_score: u8) -> &'static str {
    match total_score {
        0..=30 => "需要关注",
        31..=50 => "有改善空间",
        51..=70 => "平均水平",
        _ => "健康的爱",
    }
}

/// User prompt describing the scored result and the required five-section layout.
pub fn build_prompt(result: &AssessmentResult) -> String {
    let dimensions = result
        .dimensions
        .iter()
        .map(|dimension| {
            format!(
                "{}: T分{} ({})",
                dimension.name,
                dimension.t_score,
                level_note(dimension.level)
            )
        })
        .collect::<Vec<_>>()
        .join(", ");

    let total = result.total_score;
    let style = result.attachment_style.label();
    let mut prompt = String::new();

    let _ = writeln!(prompt, "【恋爱健康指数评估结果】");
    let _ = writeln!(prompt, "总分：{total}/100 ({})", result.category.label());
    let _ = writeln!(prompt, "依恋风格：{style}");
    let _ = writeln!(prompt, "各维度：{dimensions}");
    let _ = writeln!(prompt);
    let _ = writeln!(prompt, "【评分模型说明】");
    let _ = writeln!(prompt, "- 问卷每题1-5分（1=完全不同意，5=强烈同意）");
    let _ = writeln!(prompt, "- 各维度测量负面模式：焦虑、回避、控制、嫉妒、依赖、不安全感");
    let _ = writeln!(prompt, "- Z = (3 - 平均分) / 1，T = 50 + 10Z，T分越高代表该方面越健康");
    let _ = writeln!(prompt, "- 总分0-100越高越健康：0-30脆弱，31-50偏低，51-70平均，71-100健康");
    let _ = writeln!(prompt, "- 当前总分{total}：{}", score_band(total));
    let _ = writeln!(prompt);
    let _ = writeln!(prompt, "严格按以下格式输出5个独立部分（各约150字）：");
    let _ = writeln!(prompt);
    let _ = writeln!(prompt, "### {INTERPRETATION}");
    let _ = writeln!(prompt, "解释总分{total}在0-100量表中的含义，并说明{style}的核心特征。");
    let _ = writeln!(prompt);
    let _ = writeln!(prompt, "### {STRENGTHS}");
    let _ = writeln!(prompt, "指出T分≥50的健康维度，肯定积极特质。");
    let _ = writeln!(prompt);
    let _ = writeln!(prompt, "### {AREAS_TO_WATCH}{AREAS_TO_WATCH_SUFFIX}");
    let _ = writeln!(prompt, "指出T分<50的维度，说明潜在风险。");
    let _ = writeln!(prompt);
    let _ = writeln!(prompt, "### {PERSONALIZED}");
    let _ = writeln!(prompt, "针对得分低的维度给出可行的改善方法。");
    let _ = writeln!(prompt);
    let _ = writeln!(prompt, "### {PROFESSIONAL}");
    let _ = writeln!(prompt, "提供系统的成长方向和练习建议。");
    let _ = writeln!(prompt);
    let _ = write!(prompt, "重要：每个###后必须有独立内容，不要合并！");

    prompt
}

fn strip_header<'a>(section: &'a str, header: &str) -> &'a str {
    section
        .strip_prefix(header)
        .unwrap_or(section)
        .trim_start_matches(|c: char| c == '：' || c == ':' || c.is_whitespace())
        .trim()
}

/// Split a `###`-headed completion into report sections.
///
/// When neither the interpretation nor the strengths header is found, the text is split on
/// blank lines (five or more paragraphs) or placed whole into the interpretation.
pub fn parse_sections(content: &str) -> AiAnalysis {
    let mut analysis = AiAnalysis::default();

    for part in content.split("###") {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }

        if part.starts_with(INTERPRETATION) {
            analysis.result_interpretation = strip_header(part, INTERPRETATION).to_string();
        } else if part.starts_with(STRENGTHS) {
            analysis.strengths = strip_header(part, STRENGTHS).to_string();
        } else if part.starts_with(STRENGTHS_SHORT) {
            analysis.strengths = strip_header(part, STRENGTHS_SHORT).to_string();
        } else if part.starts_with(AREAS_TO_WATCH) {
            let rest = strip_header(part, AREAS_TO_WATCH);
            analysis.areas_to_watch = strip_header(rest, AREAS_TO_WATCH_SUFFIX).to_string();
        } else if part.starts_with(PERSONALIZED) {
            analysis.personalized_advice = strip_header(part, PERSONALIZED).to_string();
        } else if part.starts_with(PROFESSIONAL) {
            analysis.professional_advice = strip_header(part, PROFESSIONAL).to_string();
        }
    }

    if analysis.result_interpretation.is_empty() && analysis.strengths.is_empty() {
        let paragraphs: Vec<&str> = content.split("\n\n").collect();
        if paragraphs.len() >= 5 {
            analysis.result_interpretation = paragraphs[0].trim().to_string();
            analysis.strengths = paragraphs[1].trim().to_string();
            analysis.areas_to_watch = paragraphs[2].trim().to_string();
            analysis.personalized_advice = paragraphs[3].trim().to_string();
            analysis.professional_advice = paragraphs[4].trim().to_string();
        } else {
            analysis.result_interpretation = content.replace("###", "").trim().to_string();
        }
    }

    analysis
}
