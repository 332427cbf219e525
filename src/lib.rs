pub mod config;
pub mod dispatch;
pub mod domain;
pub mod email_client;
pub mod llm_client;
pub mod news_client;
pub mod routes;
pub mod startup;
pub mod store;
pub mod telemetry;
