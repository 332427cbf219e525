use crate::helpers::TestApp;

#[tokio::test]
async fn subscribing_with_invalid_data_returns_400() {
    let test_app = TestApp::spawn_app().await;
    let test_cases = vec![
        (
            serde_json::json!({
                "email": "ada@test.dev",
                "timezone": "Europe/Madrid"
            }),
            "missing name",
        ),
        (
            serde_json::json!({
                "name": "Ada",
                "email": "definitely-not-an-email",
                "timezone": "Europe/Madrid"
            }),
            "malformed email",
        ),
        (
            serde_json::json!({
                "name": "Ada",
                "email": "ada@test.dev",
                "timezone": "Mars/Olympus_Mons"
            }),
            "unknown timezone",
        ),
        (
            serde_json::json!({
                "name": "",
                "email": "ada@test.dev",
                "timezone": "Europe/Madrid"
            }),
            "empty name",
        ),
    ];

    for (invalid_body, error_message) in test_cases {
        let response = test_app.post_subscription(invalid_body).await;

        assert_eq!(
            400,
            response.status().as_u16(),
            "The API did not fail with 400 status when payload had {}",
            error_message
        );
    }
}
