use std::{
    fmt::Write,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};

use ipc_api::{
    AdminCredentials, ApiConfig, ApiService, AppState,
    dto::{LatestIpcResponse, RentMonthDTO, RentRowDTO, RentTableResponse},
};
use ipc_core::YearMonth;
use ipc_source::{DatasetSource, FetchStatus, RawDataset, SourceError};
use reqwest::StatusCode;
use rust_decimal::{Decimal, dec};
use serde_json::Value;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

const SOURCE_URL: &str = "https://example.test/ipc.csv";

struct StubSource {
    text: Option<String>,
    cleared: AtomicBool,
}

#[async_trait::async_trait]
impl DatasetSource for StubSource {
    fn source_url(&self) -> &str {
        SOURCE_URL
    }

    async fn fetch(&self) -> Result<RawDataset, SourceError> {
        match &self.text {
            Some(text) => Ok(RawDataset {
                text: text.clone(),
                status: FetchStatus::new(SOURCE_URL.to_string()),
            }),
            None => Err(SourceError::Timeout("upstream too slow".to_string())),
        }
    }

    async fn clear_cache(&self) -> Result<bool, SourceError> {
        Ok(!self.cleared.swap(true, Ordering::SeqCst))
    }
}

/// Fourteen months from 2023-01 growing exactly 1% a month.
fn dataset() -> String {
    let mut text = String::from("indice_tiempo,ipc_ng_nacional\n");
    let first: YearMonth = "2023-01".parse().unwrap();
    let mut index = dec!(100);
    for i in 0..14 {
        writeln!(text, "{}-01,{index}", first.add_months(i)).unwrap();
        index *= dec!(1.01);
    }
    text
}

struct TestApp {
    base_url: String,
    client: reqwest::Client,
    token: CancellationToken,
}

impl TestApp {
    async fn spawn(text: Option<String>) -> Self {
        let state = AppState {
            source: Arc::new(StubSource {
                text,
                cleared: AtomicBool::new(false),
            }),
            config: Arc::new(ApiConfig {
                admin: AdminCredentials {
                    username: "admin".to_string(),
                    password: "s3cret".to_string(),
                },
                request_timeout: Duration::from_secs(10),
                cors_allowed_origins: None,
            }),
        };

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let token = CancellationToken::new();
        let service = ApiService::new(state, "127.0.0.1", addr.port());
        tokio::spawn(service.serve(listener, token.clone()));

        Self {
            base_url: format!("http://{addr}"),
            client: reqwest::Client::new(),
            token,
        }
    }

    async fn get(&self, path: &str) -> reqwest::Response {
        self.client
            .get(format!("{}{path}", self.base_url))
            .send()
            .await
            .unwrap()
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

#[tokio::test]
async fn health_reports_ok() {
    let app = TestApp::spawn(Some(dataset())).await;
    let resp = app.get("/health").await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body, serde_json::json!({ "ok": true }));
}

#[tokio::test]
async fn latest_returns_requested_months_in_order() {
    let app = TestApp::spawn(Some(dataset())).await;
    let resp = app.get("/ipc/ultimos?n=12").await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: LatestIpcResponse = resp.json().await.unwrap();
    assert_eq!(body.source, SOURCE_URL);
    assert_eq!(body.count, 12);
    assert_eq!(body.data.len(), 12);
    assert_eq!(body.last_month.as_deref(), Some("2024-02"));
    assert_eq!(body.data[0].mes, "2023-03");
    assert!(body.data.windows(2).all(|w| w[0].mes < w[1].mes));
    assert!(body.data.iter().all(|p| p.ipc_mensual == dec!(1.0)));

    // More than available returns everything.
    let all: LatestIpcResponse = app.get("/ipc/ultimos?n=100").await.json().await.unwrap();
    assert_eq!(all.count, 13);

    let default: LatestIpcResponse = app.get("/ipc/ultimos").await.json().await.unwrap();
    assert_eq!(default.count, 12);
}

#[tokio::test]
async fn latest_rejects_out_of_range_n() {
    let app = TestApp::spawn(Some(dataset())).await;
    for query in ["n=0", "n=1201", "n=abc", "n=-3"] {
        let resp = app.get(&format!("/ipc/ultimos?{query}")).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "query {query}");
        let body: Value = resp.json().await.unwrap();
        assert_eq!(body["status"], "error");
    }
}

#[tokio::test]
async fn unavailable_source_is_a_retryable_error() {
    let app = TestApp::spawn(None).await;
    let resp = app.get("/ipc/ultimos").await;
    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["status"], "error");
    assert!(body["msg"].as_str().unwrap().contains("try again"));
}

#[tokio::test]
async fn rent_table_compounds_quarters() {
    let app = TestApp::spawn(Some(dataset())).await;
    let resp = app
        .get("/alquiler/tabla?alquiler_base=100000&fecha_inicio_contrato=2023-02-01&periodo_actualizacion_meses=3&meses=6")
        .await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: RentTableResponse = resp.json().await.unwrap();
    assert_eq!(body.periodo_actualizacion_meses, 3);
    // Feb-Apr, May-Jul, Aug-Oct, Nov-Jan; February 2024 alone is not a full period.
    assert_eq!(body.periodos.len(), 4);
    assert_eq!(body.periodos[0].compounded_variation, dec!(3.03));
    assert_eq!(body.periodos[0].adjusted_rent, dec!(103030));
    assert_eq!(body.periodos[1].rent_before, dec!(103030));
    assert_eq!(body.periodos[1].adjusted_rent, dec!(106152));

    // Six months plus the May adjustment row.
    assert_eq!(body.tabla.len(), 7);
    let RentRowDTO::Mes(february) = &body.tabla[0] else {
        panic!("expected a month row first, got {:?}", body.tabla[0]);
    };
    assert_eq!(february.mes, "Febrero 2023");
    assert_eq!(february.valor, dec!(100000));

    let RentRowDTO::Mes(may) = &body.tabla[3] else {
        panic!("expected the May month row, got {:?}", body.tabla[3]);
    };
    assert_eq!(may.ym, "2023-05");
    assert_eq!(may.valor, dec!(103030));
    let RentRowDTO::Ajuste(adjustment) = &body.tabla[4] else {
        panic!("expected the May adjustment row, got {:?}", body.tabla[4]);
    };
    assert_eq!(adjustment.ym, "2023-05");
    assert_eq!(adjustment.mes, "Ajuste Mayo 2023");
    assert_eq!(adjustment.valor, dec!(3030));

    let months: Vec<&RentMonthDTO> = body
        .tabla
        .iter()
        .filter_map(|row| match row {
            RentRowDTO::Mes(month) => Some(month),
            RentRowDTO::Ajuste(_) => None,
        })
        .collect();
    assert_eq!(months.len(), 6);
    assert!(months.iter().all(|m| !m.provisorio && !m.future));
}

#[tokio::test]
async fn rent_table_rows_are_tagged() {
    let app = TestApp::spawn(Some(dataset())).await;
    let body: Value = app
        .get("/alquiler/tabla?alquiler_base=100000&fecha_inicio_contrato=2023-02-01&meses=4")
        .await
        .json()
        .await
        .unwrap();
    let kinds: Vec<&str> = body["tabla"]
        .as_array()
        .unwrap()
        .iter()
        .map(|row| row["tipo"].as_str().unwrap())
        .collect();
    assert_eq!(kinds, vec!["mes", "mes", "mes", "mes", "ajuste"]);
    assert_eq!(body["tabla"][4]["valor"], 3030.0);
}

#[tokio::test]
async fn rent_table_defaults_to_quarterly_updates() {
    let app = TestApp::spawn(Some(dataset())).await;
    let body: RentTableResponse = app
        .get("/alquiler/tabla?alquiler_base=1000&fecha_inicio_contrato=2023-02&meses=3")
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(body.periodo_actualizacion_meses, 3);
    assert_eq!(body.alquiler_base, Decimal::from(1000));
    assert_eq!(body.tabla.len(), 3);
}

#[tokio::test]
async fn rent_table_validates_parameters() {
    let app = TestApp::spawn(Some(dataset())).await;

    let missing = app.get("/alquiler/tabla?alquiler_base=1000").await;
    assert_eq!(missing.status(), StatusCode::BAD_REQUEST);

    let bad_base = app
        .get("/alquiler/tabla?alquiler_base=mucho&fecha_inicio_contrato=2023-02-01")
        .await;
    assert_eq!(bad_base.status(), StatusCode::BAD_REQUEST);

    let zero_period = app
        .get("/alquiler/tabla?alquiler_base=1000&fecha_inicio_contrato=2023-02-01&periodo_actualizacion_meses=0")
        .await;
    assert_eq!(zero_period.status(), StatusCode::BAD_REQUEST);

    // Returns promptly instead of looping over an enormous period.
    for period in ["1201", "2147483648", "4294967295"] {
        let huge_period = app
            .get(&format!(
                "/alquiler/tabla?alquiler_base=1000&fecha_inicio_contrato=2023-02-01&periodo_actualizacion_meses={period}"
            ))
            .await;
        assert_eq!(huge_period.status(), StatusCode::BAD_REQUEST, "period {period}");
    }

    // Only February 2024 is published from this start onward.
    let insufficient = app
        .get("/alquiler/tabla?alquiler_base=1000&fecha_inicio_contrato=2024-02-01")
        .await;
    assert_eq!(insufficient.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = insufficient.json().await.unwrap();
    assert!(body["msg"].as_str().unwrap().contains("Insufficient data"));
}

#[tokio::test]
async fn admin_requires_credentials() {
    let app = TestApp::spawn(Some(dataset())).await;
    let url = format!("{}/admin/estado", app.base_url);

    let anonymous = app.client.get(&url).send().await.unwrap();
    assert_eq!(anonymous.status(), StatusCode::UNAUTHORIZED);
    assert!(anonymous.headers().contains_key("www-authenticate"));

    let wrong = app
        .client
        .get(&url)
        .basic_auth("admin", Some("admin"))
        .send()
        .await
        .unwrap();
    assert_eq!(wrong.status(), StatusCode::UNAUTHORIZED);

    let ok = app
        .client
        .get(&url)
        .basic_auth("admin", Some("s3cret"))
        .send()
        .await
        .unwrap();
    assert_eq!(ok.status(), StatusCode::OK);
    let body: Value = ok.json().await.unwrap();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["data"]["source"], SOURCE_URL);
    assert_eq!(body["data"]["dataset"]["records"], 14);
    assert_eq!(body["data"]["dataset"]["points"], 13);
    assert_eq!(body["data"]["dataset"]["last_month"], "2024-02");
}

#[tokio::test]
async fn admin_reports_fetch_errors_and_clears_cache() {
    let app = TestApp::spawn(None).await;

    let status: Value = app
        .client
        .get(format!("{}/admin/estado", app.base_url))
        .basic_auth("admin", Some("s3cret"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(status["data"]["error"]["code"], "timeout");
    assert_eq!(status["data"]["error"]["origin"], "external_service");

    let clear = |expected: bool| {
        let request = app
            .client
            .delete(format!("{}/admin/cache", app.base_url))
            .basic_auth("admin", Some("s3cret"));
        async move {
            let body: Value = request.send().await.unwrap().json().await.unwrap();
            assert_eq!(body["data"]["removed"], expected);
        }
    };
    clear(true).await;
    clear(false).await;
}

#[tokio::test]
async fn serves_openapi_document_and_404s() {
    let app = TestApp::spawn(Some(dataset())).await;
    let doc: Value = app.get("/docs/openapi.json").await.json().await.unwrap();
    assert!(doc["paths"]["/ipc/ultimos"].is_object());
    assert!(doc["paths"]["/alquiler/tabla"].is_object());

    assert_eq!(app.get("/nope").await.status(), StatusCode::NOT_FOUND);
}
