use std::sync::Arc;

use super::common::*;
use crate::access::{AccessCodeError, ProductType};
use crate::assessment::narrative::FallbackNarrator;
use crate::assessment::scoring::{AnswerMap, AttachmentStyle, Category};
use crate::assessment::service::{
    AssessmentQuery, AssessmentServiceError, AssessmentSubmission, ClientInfo,
};
use crate::persistence::{PageRequest, RepositoryError};

fn submission(code: &str, answers: AnswerMap) -> AssessmentSubmission {
    AssessmentSubmission {
        access_code: code.to_string(),
        answers,
    }
}

fn client() -> ClientInfo {
    ClientInfo {
        ip_address: Some("192.0.2.10".to_string()),
        user_agent: Some("integration-test".to_string()),
    }
}

#[tokio::test]
async fn submit_scores_persists_and_consumes_code() {
    let (service, access) = build_service(Arc::new(FixedNarrator));
    let code = issue_code(&access);

    let assessment = service
        .submit(submission(&code, uniform_answers(1)), client())
        .await
        .expect("submission accepted");

    assert_eq!(assessment.result.total_score, 98);
    assert_eq!(assessment.result.category, Category::Healthy);
    assert_eq!(assessment.result.attachment_style, AttachmentStyle::Secure);
    assert_eq!(
        assessment
            .ai_analysis
            .as_ref()
            .map(|analysis| analysis.result_interpretation.as_str()),
        Some("score 98")
    );

    let id = assessment.assessment_id.clone().expect("id assigned");
    let stored = service.get(&id).expect("record stored");
    assert_eq!(stored.access_code, code);
    assert_eq!(stored.ip_address.as_deref(), Some("192.0.2.10"));
    assert_eq!(stored.user_agent.as_deref(), Some("integration-test"));
    assert_eq!(stored.enriched(), assessment);

    let err = service
        .submit(submission(&code, uniform_answers(1)), client())
        .await
        .expect_err("code already redeemed");
    assert!(matches!(
        err,
        AssessmentServiceError::Access(AccessCodeError::AlreadyUsed)
    ));

    let stats = access.stats(Some(ProductType::Lhi)).expect("stats");
    assert_eq!(stats.counts.used, 1);
}

#[tokio::test]
async fn narrator_failure_falls_back_to_template_text() {
    let (service, access) = build_service(Arc::new(FailingNarrator));
    let code = issue_code(&access);

    let assessment = service
        .submit(submission(&code, AnswerMap::new()), ClientInfo::default())
        .await
        .expect("narrative failures never block a submission");

    let expected = FallbackNarrator.analysis(&assessment.result);
    assert_eq!(assessment.ai_analysis, Some(expected));
    assert_eq!(assessment.result.total_score, 50);
}

#[tokio::test]
async fn out_of_range_answers_are_rejected_before_redemption() {
    let (service, access) = build_service(Arc::new(FixedNarrator));
    let code = issue_code(&access);

    let mut answers = uniform_answers(3);
    answers.insert(12, 6);
    let err = service
        .submit(submission(&code, answers), ClientInfo::default())
        .await
        .expect_err("6 is outside the Likert scale");
    assert!(matches!(
        err,
        AssessmentServiceError::AnswerOutOfRange { item: 12, value: 6 }
    ));

    let mut unknown = AnswerMap::new();
    unknown.insert(41, 3);
    let err = service
        .submit(submission(&code, unknown), ClientInfo::default())
        .await
        .expect_err("item 41 does not exist");
    assert!(matches!(err, AssessmentServiceError::UnknownItem(41)));

    // The code survived both rejections.
    service
        .submit(submission(&code, uniform_answers(3)), ClientInfo::default())
        .await
        .expect("valid resubmission");
}

#[tokio::test]
async fn master_code_admits_repeated_submissions() {
    let (service, _access) = build_service(Arc::new(FixedNarrator));

    for _ in 0..3 {
        service
            .submit(submission("lhi159951", uniform_answers(2)), ClientInfo::default())
            .await
            .expect("master code is reusable");
    }

    let page = service
        .list(AssessmentQuery::default(), PageRequest::default())
        .expect("lists");
    assert_eq!(page.pagination.total, 3);
    assert!(page.items.iter().all(|row| row.access_code == MASTER_CODE));
}

#[tokio::test]
async fn unknown_code_is_invalid() {
    let (service, _access) = build_service(Arc::new(FixedNarrator));
    let err = service
        .submit(submission("ZZZZ9999", AnswerMap::new()), ClientInfo::default())
        .await
        .expect_err("unknown code");
    assert!(matches!(
        err,
        AssessmentServiceError::Access(AccessCodeError::Invalid)
    ));
}

#[tokio::test]
async fn statistics_and_export_cover_stored_records() {
    let (service, access) = build_service(Arc::new(FixedNarrator));
    for value in [1, 5] {
        let code = issue_code(&access);
        service
            .submit(submission(&code, uniform_answers(value)), client())
            .await
            .expect("submission accepted");
    }

    let stats = service
        .statistics(AssessmentQuery::default())
        .expect("statistics");
    assert_eq!(stats.total, 2);
    assert_eq!(stats.avg_score, 50);
    assert_eq!(stats.min_score, 2);
    assert_eq!(stats.max_score, 98);
    assert_eq!(stats.daily_stats.iter().map(|day| day.count).sum::<usize>(), 2);

    let lci_only = service
        .statistics(AssessmentQuery {
            product_type: Some(ProductType::Lci),
        })
        .expect("statistics");
    assert_eq!(lci_only.total, 0);

    let csv = service
        .export_csv(AssessmentQuery::default())
        .expect("export");
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[0].starts_with("id,createdAt,accessCode,totalScore"));
    assert!(lines[1..].iter().all(|line| line.ends_with(",192.0.2.10")));
}

#[tokio::test]
async fn repository_outage_surfaces_as_error() {
    let (service, access) =
        build_service_with(Arc::new(UnavailableRepository), Arc::new(FixedNarrator));
    let code = issue_code(&access);

    let err = service
        .submit(submission(&code, AnswerMap::new()), ClientInfo::default())
        .await
        .expect_err("storage offline");
    assert!(matches!(
        err,
        AssessmentServiceError::Repository(RepositoryError::Unavailable(_))
    ));

    // The claim is released when storage fails, so the code is still available.
    assert!(access.validate(&code, ProductType::Lhi).is_ok());
}

#[tokio::test]
async fn concurrent_submissions_store_one_record_per_code() {
    let (service, access) = build_service(Arc::new(YieldingNarrator));
    let code = issue_code(&access);

    let (first, second) = tokio::join!(
        service.submit(submission(&code, uniform_answers(1)), client()),
        service.submit(submission(&code, uniform_answers(5)), client()),
    );

    assert_eq!(usize::from(first.is_ok()) + usize::from(second.is_ok()), 1);
    let rejected = first.err().or(second.err()).expect("one submission rejected");
    assert!(matches!(
        rejected,
        AssessmentServiceError::Access(AccessCodeError::AlreadyUsed)
    ));

    let stats = service
        .statistics(AssessmentQuery::default())
        .expect("statistics");
    assert_eq!(stats.total, 1);
    assert_eq!(access.stats(None).expect("code stats").counts.used, 1);
}
