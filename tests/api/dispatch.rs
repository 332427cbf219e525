use crate::helpers::TestApp;
use wiremock::matchers::{method, path};
use wiremock::{Mock, ResponseTemplate};

#[tokio::test]
async fn dispatch_without_a_bearer_token_is_rejected() {
    let test_app = TestApp::spawn_app().await;

    let response = test_app.post_dispatch(None, false).await;

    assert_eq!(response.status().as_u16(), 401);
}

#[tokio::test]
async fn dispatch_with_a_wrong_bearer_token_is_rejected() {
    let test_app = TestApp::spawn_app().await;

    let response = test_app.post_dispatch(Some("not-the-secret"), false).await;

    assert_eq!(response.status().as_u16(), 401);
}

#[tokio::test]
async fn dispatch_fails_when_the_news_pull_yields_no_material() {
    let test_app = TestApp::spawn_app().await;

    Mock::given(method("GET"))
        .and(path("/v2/everything"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "articles": [] })),
        )
        .expect(1)
        .mount(&test_app.news_server)
        .await;

    let response = test_app
        .post_dispatch(Some(&test_app.cron_secret()), false)
        .await;

    assert_eq!(response.status().as_u16(), 500);
}

#[tokio::test]
async fn dispatch_fails_when_the_news_api_is_down() {
    let test_app = TestApp::spawn_app().await;

    Mock::given(method("GET"))
        .and(path("/v2/everything"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&test_app.news_server)
        .await;

    let response = test_app
        .post_dispatch(Some(&test_app.cron_secret()), false)
        .await;

    assert_eq!(response.status().as_u16(), 500);
}
