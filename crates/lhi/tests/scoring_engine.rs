use chrono::NaiveDate;
use lhi::assessment::{
    normal_cdf, AnswerMap, AttachmentStyle, Catalog, Category, Dimension, DimensionRole, Item,
    ItemId, Level, ScoringEngine,
};

fn scored_on() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 11, 4).expect("valid date")
}

fn uniform(value: i32) -> AnswerMap {
    (1..=40).map(|item| (item, value)).collect()
}

fn dimension(id: &str, role: DimensionRole) -> Dimension {
    Dimension {
        id: id.to_string(),
        name: id.to_uppercase(),
        name_cn: format!("{id}-cn"),
        description: String::new(),
        role,
    }
}

fn item(id: ItemId, dimension_id: &str, is_reverse: bool) -> Item {
    Item {
        id,
        text: format!("statement {id}"),
        dimension_id: dimension_id.to_string(),
        is_reverse,
    }
}

/// One dimension of 100 items, so the aggregate z moves in steps of 0.01.
fn hundred_item_engine() -> ScoringEngine {
    let catalog = Catalog::new(
        vec![dimension("solo", DimensionRole::Other)],
        (1..=100).map(|id| item(id, "solo", false)).collect(),
    )
    .expect("valid catalog");
    ScoringEngine::new(catalog)
}

fn shifted(count: ItemId, value: i32) -> AnswerMap {
    (1..=count).map(|id| (id, value)).collect()
}

#[test]
fn scoring_is_deterministic() {
    let engine = ScoringEngine::default();
    let answers: AnswerMap = (1..=40).map(|item| (item, (item as i32 % 5) + 1)).collect();

    let first = engine.score(&answers);
    let second = engine.score(&answers);
    assert!(first.same_score(&second));
    assert_eq!(
        engine.score_at(&answers, scored_on()),
        engine.score_at(&answers, scored_on())
    );
}

#[test]
fn empty_answers_score_neutral() {
    let result = ScoringEngine::default().score_at(&AnswerMap::new(), scored_on());

    assert_eq!(result.dimensions.len(), 6);
    for dimension in &result.dimensions {
        assert_eq!(dimension.raw_score, 3.0);
        assert_eq!(dimension.z_score, 0.0);
        assert_eq!(dimension.t_score, 50);
        assert_eq!(dimension.level, Level::Moderate);
    }
    assert_eq!(result.total_score, 50);
    assert_eq!(result.category, Category::BelowAverage);
    assert_eq!(result.attachment_style, AttachmentStyle::FearfulAvoidant);
    assert_eq!(result.timestamp, "2025/11/4");
}

#[test]
fn all_fives_score_fragile() {
    let result = ScoringEngine::default().score_at(&uniform(5), scored_on());

    for dimension in &result.dimensions {
        assert_eq!(dimension.raw_score, 5.0);
        assert_eq!(dimension.z_score, -2.0);
        assert_eq!(dimension.t_score, 30);
        assert_eq!(dimension.level, Level::Low);
    }
    assert_eq!(result.total_score, 2);
    assert_eq!(result.category, Category::Fragile);
    assert_eq!(result.attachment_style, AttachmentStyle::FearfulAvoidant);
}

#[test]
fn all_ones_score_healthy_and_secure() {
    let result = ScoringEngine::default().score_at(&uniform(1), scored_on());

    for dimension in &result.dimensions {
        assert_eq!(dimension.raw_score, 1.0);
        assert_eq!(dimension.z_score, 2.0);
        assert_eq!(dimension.t_score, 70);
        assert_eq!(dimension.level, Level::High);
    }
    assert_eq!(result.total_score, 98);
    assert_eq!(result.category, Category::Healthy);
    assert_eq!(result.attachment_style, AttachmentStyle::Secure);
}

#[test]
fn category_boundaries_are_exact() {
    let engine = hundred_item_engine();
    let cases = [
        (shifted(52, 4), 30, Category::Fragile),
        (shifted(50, 4), 31, Category::BelowAverage),
        (shifted(1, 2), 50, Category::BelowAverage),
        (shifted(3, 2), 51, Category::Average),
        (shifted(52, 2), 70, Category::Average),
        (shifted(55, 2), 71, Category::Healthy),
    ];

    for (answers, expected_total, expected_category) in cases {
        let result = engine.score_at(&answers, scored_on());
        assert_eq!(result.total_score, expected_total);
        assert_eq!(result.category, expected_category, "total {expected_total}");
    }
}

#[test]
fn reversed_items_flip_the_scale() {
    let catalog = Catalog::new(
        vec![
            dimension("anx", DimensionRole::Anxiety),
            dimension("avo", DimensionRole::Avoidance),
        ],
        vec![
            item(1, "anx", false),
            item(2, "anx", true),
            item(3, "avo", false),
        ],
    )
    .expect("valid catalog");
    let engine = ScoringEngine::new(catalog);

    for (reversed_answer, plain_answer) in [(1, 5), (2, 4), (3, 3), (4, 2), (5, 1)] {
        let via_reversed: AnswerMap = [(1, 3), (2, reversed_answer)].into_iter().collect();
        let via_plain: AnswerMap = [(1, plain_answer), (2, 3)].into_iter().collect();

        let left = engine.score_at(&via_reversed, scored_on());
        let right = engine.score_at(&via_plain, scored_on());
        assert_eq!(left.dimension("anx"), right.dimension("anx"));
    }
}

#[test]
fn t_scores_follow_stored_z_scores() {
    let engine = ScoringEngine::default();
    let samples = [
        AnswerMap::new(),
        uniform(2),
        (1..=40).map(|item| (item, (item as i32 * 7) % 5 + 1)).collect(),
        [(1, 1), (8, 5), (15, 2), (21, 4), (28, 1), (34, 5)]
            .into_iter()
            .collect::<AnswerMap>(),
    ];

    for answers in &samples {
        for dimension in engine.score_at(answers, scored_on()).dimensions {
            let expected = (50.0 + 10.0 * dimension.z_score + 0.5).floor() as i32;
            assert_eq!(dimension.t_score, expected, "dimension {}", dimension.id);
            assert_eq!((dimension.z_score * 100.0).round() / 100.0, dimension.z_score);
        }
    }
}

#[test]
fn zero_anxiety_and_avoidance_tie_to_fearful_avoidant() {
    let engine = ScoringEngine::default();

    // d1 = items 1..=7, d2 = items 8..=14: three 2s, three 4s, one 3 averages to exactly 3.
    let mut answers = uniform(1);
    for (offset, value) in [2, 2, 2, 4, 4, 4, 3].into_iter().enumerate() {
        answers.insert(1 + offset as ItemId, value);
        answers.insert(8 + offset as ItemId, value);
    }

    let result = engine.score_at(&answers, scored_on());
    assert_eq!(result.dimension("d1").map(|d| d.z_score), Some(0.0));
    assert_eq!(result.dimension("d2").map(|d| d.z_score), Some(0.0));
    assert_eq!(result.attachment_style, AttachmentStyle::FearfulAvoidant);

    // Nudging only avoidance healthy flips to the anxious quadrant.
    answers.insert(14, 2);
    let result = engine.score_at(&answers, scored_on());
    assert_eq!(result.attachment_style, AttachmentStyle::AnxiousPreoccupied);
}

#[test]
fn missing_attachment_roles_read_as_zero() {
    let catalog = Catalog::new(
        vec![dimension("only", DimensionRole::Other)],
        vec![item(1, "only", false)],
    )
    .expect("valid catalog");
    let answers: AnswerMap = [(1, 1)].into_iter().collect();
    let result = ScoringEngine::new(catalog).score_at(&answers, scored_on());

    assert_eq!(result.total_score, 98);
    assert_eq!(result.attachment_style, AttachmentStyle::FearfulAvoidant);
}

#[test]
fn out_of_range_answers_are_scored_as_given() {
    let answers: AnswerMap = [(1, 9)].into_iter().collect();
    let result = ScoringEngine::default().score_at(&answers, scored_on());
    let anxiety = result.dimension("d1").expect("d1 present");
    // (9 + 6 * 3) / 7 = 3.857..
    assert_eq!(anxiety.raw_score, 3.86);
    assert_eq!(anxiety.z_score, -0.86);
    assert_eq!(anxiety.level, Level::Low);
}

#[test]
fn cdf_matches_reference_points() {
    assert!((normal_cdf(0.0) - 0.5).abs() < 1e-7);
    assert!((normal_cdf(1.0) - 0.8413).abs() < 1e-4);
    assert!((normal_cdf(-1.0) - 0.1587).abs() < 1e-4);
    assert!((normal_cdf(2.0) - 0.97725).abs() < 1e-4);
}

#[test]
fn extreme_values_on_reversed_items_do_not_overflow() {
    let catalog = Catalog::new(
        vec![dimension("rev", DimensionRole::Other)],
        vec![item(1, "rev", true)],
    )
    .expect("valid catalog");
    let engine = ScoringEngine::new(catalog);

    let low: AnswerMap = [(1, i32::MIN)].into_iter().collect();
    let result = engine.score_at(&low, scored_on());
    let dimension = result.dimension("rev").expect("rev present");
    assert_eq!(dimension.raw_score, 6.0 - f64::from(i32::MIN));
    assert_eq!(dimension.level, Level::Low);
    assert_eq!(result.total_score, 0);
    assert_eq!(result.category, Category::Fragile);

    let high: AnswerMap = [(1, i32::MAX)].into_iter().collect();
    let result = engine.score_at(&high, scored_on());
    assert_eq!(result.dimension("rev").map(|d| d.level), Some(Level::High));
    assert_eq!(result.total_score, 100);
    assert_eq!(result.category, Category::Healthy);
}
