use reqwest::Response;
use secrecy::ExposeSecret;
use wiremock::MockServer;

use the_signal::{
    config::{get_configuration, Settings},
    startup::Application,
};

pub struct TestApp {
    pub config: Settings,
    pub address: String,
    pub email_server: MockServer,
    pub news_server: MockServer,
    pub llm_server: MockServer,
}

impl TestApp {
    pub async fn spawn_app() -> TestApp {
        let mut config = get_configuration().expect("Missing configuration file.");
        let email_server = MockServer::start().await;
        let news_server = MockServer::start().await;
        let llm_server = MockServer::start().await;

        // We are using port 0 as way to define a different port per each test. Port 0 is a special case that operating systems
        // take into account: when port is 0, the OS will search for the first available port
        config.set_app_port(0);
        config.set_email_client_base_url(email_server.uri());
        config.set_news_api_base_url(news_server.uri());
        config.set_llm_base_url(llm_server.uri());

        let application = Application::build(config.clone())
            .await
            .expect("Failed to build application.");

        let address = format!("http://127.0.0.1:{}", application.get_port());

        tokio::spawn(application.run_until_stop());

        TestApp {
            address,
            config,
            email_server,
            news_server,
            llm_server,
        }
    }

    pub async fn post_subscription(&self, body: serde_json::Value) -> Response {
        let client = reqwest::Client::new();
        let url = format!("{}/subscriptions", self.address);

        client
            .post(&url)
            .json(&body)
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn post_dispatch(&self, token: Option<&str>, force: bool) -> Response {
        let client = reqwest::Client::new();
        let url = format!("{}/newsletters/dispatch?force={}", self.address, force);
        let mut request = client.post(&url);

        if let Some(token) = token {
            request = request.header("Authorization", format!("Bearer {}", token));
        }

        request.send().await.expect("Failed to execute request.")
    }

    pub fn cron_secret(&self) -> String {
        self.config.get_cron_secret().expose_secret().to_string()
    }
}
