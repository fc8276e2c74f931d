use super::*;
use crate::test_support::{advisory_row, RecordingSession};

#[tokio::test]
async fn test_zero_rows_is_no_candidates_even_with_create_flag() {
    let mut session = RecordingSession::with_rows(Vec::new());

    let report = tune(&mut session, true).await.unwrap();

    assert_eq!(report.outcome, TuneOutcome::NoCandidates);
    assert!(report.candidates.is_empty());
    assert!(session.batches.is_empty());
}

#[tokio::test]
async fn test_only_insignificant_rows_is_no_candidates() {
    let mut session = RecordingSession::with_rows(vec![advisory_row(1, 1, (1.0, 5.0, 2))]);

    let report = tune(&mut session, true).await.unwrap();

    assert_eq!(report.outcome, TuneOutcome::NoCandidates);
    assert!(session.batches.is_empty());
}

#[tokio::test]
async fn test_preview_never_executes() {
    let mut session = RecordingSession::with_rows(vec![
        advisory_row(1, 2, (1.0, 50.0, 1)),
        advisory_row(3, 4, (2.0, 90.0, 10)),
    ]);

    let report = tune(&mut session, false).await.unwrap();

    assert_eq!(report.outcome, TuneOutcome::Previewed);
    assert_eq!(session.queries, 1);
    assert!(session.batches.is_empty());
    assert_eq!(
        report.statements(),
        vec![
            "CREATE INDEX missing_index_3_4 ON [shop].[dbo].[orders] ([customer_id]) INCLUDE ([total])",
            "CREATE INDEX missing_index_1_2 ON [shop].[dbo].[orders] ([customer_id]) INCLUDE ([total])",
        ]
    );
}

#[tokio::test]
async fn test_apply_submits_one_batch_in_ranked_order() {
    let mut session = RecordingSession::with_rows(vec![
        advisory_row(1, 2, (1.0, 50.0, 1)),
        advisory_row(3, 4, (2.0, 90.0, 10)),
    ]);

    let report = tune(&mut session, true).await.unwrap();

    assert_eq!(report.outcome, TuneOutcome::Applied);
    assert_eq!(session.batches.len(), 1);
    assert_eq!(
        session.batches[0],
        "CREATE INDEX missing_index_3_4 ON [shop].[dbo].[orders] ([customer_id]) INCLUDE ([total]);\n\
         CREATE INDEX missing_index_1_2 ON [shop].[dbo].[orders] ([customer_id]) INCLUDE ([total]);"
    );
    assert!(report.into_result().is_ok());
}

#[tokio::test]
async fn test_apply_failure_keeps_reported_statements() {
    let mut session = RecordingSession::with_rows(vec![advisory_row(7, 8, (3.0, 40.0, 5))]);
    let engine_error = TuneError::Apply("Cannot create index: permission denied".to_string());
    session.execute_error = Some(engine_error.clone());

    let report = tune(&mut session, true).await.unwrap();

    assert_eq!(report.outcome, TuneOutcome::ApplyFailed(engine_error));
    assert_eq!(report.candidates.len(), 1);
    assert_eq!(
        report.statements(),
        vec![
            "CREATE INDEX missing_index_7_8 ON [shop].[dbo].[orders] ([customer_id]) INCLUDE ([total])"
        ]
    );
    assert!(matches!(report.into_result(), Err(TuneError::Apply(_))));
}

#[tokio::test]
async fn test_query_failure_is_fatal() {
    let mut session = RecordingSession::default();
    session.query_error = Some(TuneError::Query(
        "VIEW SERVER STATE permission was denied".to_string(),
    ));

    let result = tune(&mut session, true).await;

    assert!(matches!(result, Err(TuneError::Query(_))));
    assert!(session.batches.is_empty());
}

#[test]
fn test_report_returns_statements_in_ranked_order() {
    let ranked = rank_candidates(vec![
        advisory_row(1, 2, (1.0, 50.0, 1)),
        advisory_row(3, 4, (2.0, 90.0, 10)),
        advisory_row(5, 6, (1.0, 5.0, 1)),
    ]);

    assert_eq!(
        report(&ranked),
        vec![
            "CREATE INDEX missing_index_3_4 ON [shop].[dbo].[orders] ([customer_id]) INCLUDE ([total])",
            "CREATE INDEX missing_index_1_2 ON [shop].[dbo].[orders] ([customer_id]) INCLUDE ([total])",
        ]
    );
}

#[test]
fn test_report_of_no_candidates_is_empty() {
    assert!(report(&[]).is_empty());
}
