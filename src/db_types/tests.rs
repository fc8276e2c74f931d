use super::*;

fn row(cost: f64, impact: f64, seeks: i64, scans: i64) -> IndexAdvisoryRow {
    IndexAdvisoryRow {
        group_handle: 1,
        index_handle: 2,
        database_id: 5,
        object_id: 42,
        statement: "[shop].[dbo].[orders]".to_string(),
        equality_columns: Some("[customer_id]".to_string()),
        inequality_columns: None,
        included_columns: None,
        avg_total_user_cost: cost,
        avg_user_impact: impact,
        user_seeks: seeks,
        user_scans: scans,
    }
}

#[test]
fn test_improvement_measure_multiplies_cost_impact_and_uses() {
    assert_eq!(row(2.0, 50.0, 3, 1).improvement_measure(), 400.0);
    assert_eq!(row(0.5, 10.0, 0, 0).improvement_measure(), 0.0);
}

#[test]
fn test_improvement_measure_rounds_to_one_decimal() {
    // 0.123 * 99.5 * 7 = 85.6695
    assert_eq!(row(0.123, 99.5, 4, 3).improvement_measure(), 85.7);
    // 0.01 * 33.33 * 3 = 0.9999
    assert_eq!(row(0.01, 33.33, 3, 0).improvement_measure(), 1.0);
}

#[test]
fn test_significance_threshold_is_exclusive() {
    assert!(!row(1.0, 10.0, 1, 0).is_significant());
    assert!(row(1.0, 10.5, 1, 0).is_significant());
    assert!(!row(0.1, 1.0, 5, 5).is_significant());
}

#[test]
fn test_connection_config_debug_redacts_password() {
    let config = ConnectionConfig {
        server: "srv.database.windows.net".to_string(),
        port: DEFAULT_SQL_PORT,
        database: "shop".to_string(),
        user: "admin@srv".to_string(),
        password: "hunter2".to_string(),
        encrypt: true,
        trust_server_certificate: false,
    };

    let rendered = format!("{:?}", config);
    assert!(!rendered.contains("hunter2"));
    assert!(rendered.contains("admin@srv"));
    assert!(rendered.contains("srv.database.windows.net"));
}

#[test]
fn test_candidate_serializes_row_fields_flat() {
    let candidate = IndexCandidate {
        row: row(2.0, 50.0, 3, 1),
        improvement_measure: 400.0,
        create_index_statement:
            "CREATE INDEX missing_index_1_2 ON [shop].[dbo].[orders] ([customer_id])".to_string(),
    };

    let json = serde_json::to_value(&candidate).unwrap();
    assert_eq!(json["group_handle"], 1);
    assert_eq!(json["statement"], "[shop].[dbo].[orders]");
    assert_eq!(json["equality_columns"], "[customer_id]");
    assert!(json["inequality_columns"].is_null());
    assert_eq!(json["improvement_measure"], 400.0);
    assert_eq!(
        json["create_index_statement"],
        "CREATE INDEX missing_index_1_2 ON [shop].[dbo].[orders] ([customer_id])"
    );
    assert!(json.get("row").is_none());
}
