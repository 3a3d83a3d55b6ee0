use chrono::{Days, Local};
use fxcache::ConversionError;
use fxcache::core::config::AppConfig;
use std::fs;
use std::path::Path;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const PAYLOAD: &str = r#"{"data":{"USD":1,"EUR":0.92,"CHF":0.88}}"#;

mod test_utils {
    use super::*;

    pub async fn create_rates_mock_server(currencies: &str, status: u16, body: &str) -> MockServer {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/latest"))
            .and(query_param("apikey", "integration-key"))
            .and(query_param("currencies", currencies))
            .respond_with(ResponseTemplate::new(status).set_body_string(body))
            .mount(&mock_server)
            .await;

        mock_server
    }

    pub fn write_config(dir: &Path, base_url: &str) -> std::path::PathBuf {
        let config_path = dir.join("config.yaml");
        let config_content = format!(
            r#"
provider:
  base_url: "{base_url}/v1/latest"
  api_key: "integration-key"
  api_key_env: "FXCACHE_INTEGRATION_UNSET_KEY"
cache:
  backend: disk
  path: "{}"
"#,
            dir.join("rates").display()
        );
        fs::write(&config_path, config_content).expect("Failed to write config file");
        config_path
    }

    pub fn today() -> String {
        Local::now().date_naive().format("%Y-%m-%d").to_string()
    }
}

#[test_log::test(tokio::test)]
async fn test_full_app_flow_with_mock() {
    let mock_server = test_utils::create_rates_mock_server("EUR,CHF", 200, PAYLOAD).await;
    let dir = tempfile::tempdir().unwrap();
    let config_path = test_utils::write_config(dir.path(), &mock_server.uri());

    let result = fxcache::run_command(
        fxcache::AppCommand::Rate {
            from: "eur".to_string(),
            to: "chf".to_string(),
        },
        Some(config_path.to_str().unwrap()),
    )
    .await;
    assert!(result.is_ok(), "Command failed with: {:?}", result.err());

    let entry = dir
        .path()
        .join("rates")
        .join(test_utils::today())
        .join("EUR")
        .join("CHF.txt");
    let cached: f64 = fs::read_to_string(&entry).unwrap().trim().parse().unwrap();
    assert_eq!(cached, 0.88 / 0.92);
}

#[test_log::test(tokio::test)]
async fn test_second_call_served_from_cache() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/latest"))
        .respond_with(ResponseTemplate::new(200).set_body_string(PAYLOAD))
        .up_to_n_times(1)
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let config_path = test_utils::write_config(dir.path(), &mock_server.uri());
    let config = AppConfig::load_from_path(&config_path).unwrap();
    let resolver = fxcache::build_resolver(&config).unwrap();

    let first = resolver.resolve("USD", "EUR").await.unwrap();
    let second = resolver.resolve("usd", "eur").await.unwrap();
    assert_eq!(first, 0.92);
    assert_eq!(first, second);
}

#[test_log::test(tokio::test)]
async fn test_inverse_rates_multiply_to_one() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string(PAYLOAD))
        .mount(&mock_server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let config_path = test_utils::write_config(dir.path(), &mock_server.uri());
    let config = AppConfig::load_from_path(&config_path).unwrap();
    let resolver = fxcache::build_resolver(&config).unwrap();

    let forward = resolver.resolve("EUR", "CHF").await.unwrap();
    let backward = resolver.resolve("CHF", "EUR").await.unwrap();
    assert!(forward > 0.0 && backward > 0.0);
    assert!((forward * backward - 1.0).abs() < 1e-4);
}

#[test_log::test(tokio::test)]
async fn test_unknown_currencies_are_not_cached() {
    let mock_server = test_utils::create_rates_mock_server(
        "RAN,DOM",
        422,
        r#"{"message":"The selected currencies is invalid."}"#,
    )
    .await;
    let dir = tempfile::tempdir().unwrap();
    let config_path = test_utils::write_config(dir.path(), &mock_server.uri());
    let config = AppConfig::load_from_path(&config_path).unwrap();
    let resolver = fxcache::build_resolver(&config).unwrap();

    let err = resolver.resolve("RAN", "DOM").await.unwrap_err();
    match err {
        ConversionError::FailedConversion { message } => {
            assert!(message.starts_with("HTTP error: 422"), "{message}")
        }
        other => panic!("Expected FailedConversion, got {other:?}"),
    }
    assert!(
        !dir.path()
            .join("rates")
            .join(test_utils::today())
            .join("RAN")
            .exists()
    );
}

#[test_log::test(tokio::test)]
async fn test_prune_command_removes_old_partitions() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = test_utils::write_config(dir.path(), "http://127.0.0.1:9");
    let rates = dir.path().join("rates");

    let old = Local::now()
        .date_naive()
        .checked_sub_days(Days::new(10))
        .unwrap()
        .format("%Y-%m-%d")
        .to_string();
    fs::create_dir_all(rates.join(&old).join("EUR")).unwrap();
    fs::write(rates.join(&old).join("EUR").join("CHF.txt"), "0.95\n").unwrap();
    fs::create_dir_all(rates.join(test_utils::today()).join("EUR")).unwrap();

    let result = fxcache::run_command(
        fxcache::AppCommand::Prune { days: 7 },
        Some(config_path.to_str().unwrap()),
    )
    .await;
    assert!(result.is_ok(), "Command failed with: {:?}", result.err());
    assert!(!rates.join(&old).exists());
    assert!(rates.join(test_utils::today()).exists());
}
