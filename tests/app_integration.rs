use pecan::handler::{ConversionHandler, ProxyEvent, ProxyResponse};
use std::fs;
use std::sync::Arc;
use tracing::{error, info};

const RATES: &str = r#"{
    "eur": {"code": "EUR", "name": "Euro", "rate": 0.9, "inverseRate": 1.1111},
    "chf": {"code": "CHF", "name": "Swiss Franc", "rate": 0.85, "inverseRate": 1.1765},
    "jpy": {"code": "JPY", "name": "Japanese Yen", "rate": 145.0, "inverseRate": 0.0069},
    "rub": {"code": "RUB", "name": "Russian Rouble", "rate": 92.5, "inverseRate": 0.0108},
    "byn": {"code": "BYN", "name": "Belarussian Ruble", "rate": 3.25, "inverseRate": 0.3077}
}"#;

mod test_utils {
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    pub async fn create_rates_mock_server(template: ResponseTemplate) -> MockServer {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/daily/usd.json"))
            .respond_with(template)
            .mount(&mock_server)
            .await;

        mock_server
    }

    pub fn write_config(base_url: &str, targets: &str) -> tempfile::NamedTempFile {
        let config_file = tempfile::NamedTempFile::new().expect("Failed to create temp file");
        let config_content = format!(
            r#"
            rate_source:
              base_url: {base_url}
              timeout_secs: 2
            target_currencies: {targets}
        "#
        );
        std::fs::write(config_file.path(), config_content).expect("Failed to write config file");
        config_file
    }
}

#[test_log::test(tokio::test)]
async fn test_full_convert_flow_with_mock() {
    let mock_server = test_utils::create_rates_mock_server(
        wiremock::ResponseTemplate::new(200).set_body_string(RATES),
    )
    .await;
    let config_file = test_utils::write_config(&mock_server.uri(), "[EUR, RUB, BYN]");

    let result = pecan::run_command(
        pecan::AppCommand::Convert {
            usd_amount: "100".to_string(),
            as_json: true,
        },
        Some(config_file.path().to_str().unwrap()),
    )
    .await;
    assert!(
        result.is_ok(),
        "Convert command failed with: {:?}",
        result.err()
    );
}

#[test_log::test(tokio::test)]
async fn test_convert_flow_reports_upstream_failure() {
    let mock_server =
        test_utils::create_rates_mock_server(wiremock::ResponseTemplate::new(503)).await;
    let config_file = test_utils::write_config(&mock_server.uri(), "[EUR, CHF, JPY]");

    let result = pecan::run_command(
        pecan::AppCommand::Convert {
            usd_amount: "100".to_string(),
            as_json: false,
        },
        Some(config_file.path().to_str().unwrap()),
    )
    .await;
    let err = result.expect_err("Upstream failure should fail the command");
    assert!(err.to_string().contains("Rate source unavailable"));
}

#[test_log::test(tokio::test)]
async fn test_invalid_config_is_rejected() {
    let config_file = tempfile::NamedTempFile::new().unwrap();
    fs::write(config_file.path(), "target_currencies: [EUR, EUR]").unwrap();

    let result = pecan::run_command(
        pecan::AppCommand::Convert {
            usd_amount: "1".to_string(),
            as_json: true,
        },
        Some(config_file.path().to_str().unwrap()),
    )
    .await;
    assert!(result.is_err());
}

#[test_log::test(tokio::test)]
async fn test_http_server_end_to_end() {
    let mock_server = test_utils::create_rates_mock_server(
        wiremock::ResponseTemplate::new(200).set_body_string(RATES),
    )
    .await;
    let config_file = test_utils::write_config(&mock_server.uri(), "[EUR, CHF, JPY]");
    let config = pecan::load_config(config_file.path().to_str()).unwrap();
    let handler = Arc::new(ConversionHandler::from_config(&config).unwrap());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, pecan::server::router(handler))
            .await
            .unwrap();
    });

    let client = reqwest::Client::new();
    let mut tasks = Vec::new();
    for amount in 0..8 {
        let client = client.clone();
        tasks.push(tokio::spawn(async move {
            let response = client
                .get(format!("http://{addr}/convert?usd_amount={amount}"))
                .send()
                .await
                .unwrap();
            (amount, response.status().as_u16(), response.text().await.unwrap())
        }));
    }

    for task in tasks {
        let (amount, status, body) = task.await.unwrap();
        assert_eq!(status, 200);
        let body: serde_json::Value = serde_json::from_str(&body).unwrap();
        let amount = amount as f64;
        assert_eq!(body["USD"].as_f64().unwrap(), amount);
        assert!((body["EUR"].as_f64().unwrap() - amount * 0.9).abs() < 1e-9);
        assert!((body["JPY"].as_f64().unwrap() - amount * 145.0).abs() < 1e-9);
    }

    let response = client
        .post(format!("http://{addr}/invoke"))
        .json(&ProxyEvent::default())
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 200);
    let proxy: ProxyResponse = response.json().await.unwrap();
    assert_eq!(proxy.status_code, 400);
}

#[test_log::test(tokio::test)]
async fn test_unreachable_rate_source_does_not_hang() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let config_file = test_utils::write_config(&format!("http://{addr}"), "[EUR]");
    let config = pecan::load_config(config_file.path().to_str()).unwrap();
    let handler = ConversionHandler::from_config(&config).unwrap();

    let response = tokio::time::timeout(
        std::time::Duration::from_secs(10),
        handler.handle(&ProxyEvent::with_usd_amount("1")),
    )
    .await
    .expect("Handler should answer before the deadline");
    assert_eq!(response.status_code, 502);
    assert!(response.body.contains("upstream_error"));
}

#[test_log::test(tokio::test)]
#[ignore = "requires network access to the live floatrates feed"]
async fn test_real_floatrates_api() {
    let config = pecan::core::config::AppConfig::default();
    let handler = ConversionHandler::from_config(&config).unwrap();

    let result = handler.run(&ProxyEvent::with_usd_amount("100")).await;

    match result {
        Ok(amounts) => {
            info!(?amounts, "Received successful conversion");
            assert_eq!(amounts.get("USD"), Some(100.0));
            for code in &config.target_currencies {
                assert!(amounts.get(code).unwrap() > 0.0, "{code} should be positive");
            }
        }
        Err(e) => {
            error!("Rate API request failed: {e}\n{e:?}");
            panic!("Rate API request failed: {e}");
        }
    }
}
