//! Testes de integração do fluxo de consulta contra uma API simulada.

use std::sync::Arc;

use chrono::{NaiveDate, TimeDelta};
use consulta_cnpj::cnpj::normalize_and_validate;
use consulta_cnpj::lookup::{LookupEngine, LookupOutcome, RecordSource, Rejection, StatsObserver};
use consulta_cnpj::ratelimit::{ManualClock, CALLS_PER_MINUTE};
use consulta_cnpj::registry::{AlwaysOnline, HttpRegistryClient};
use consulta_cnpj::store::RecordStore;
use consulta_cnpj::types::config::RegistryConfig;
use consulta_cnpj::Record;
use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{method, path, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn start_time() -> chrono::DateTime<chrono::Local> {
    NaiveDate::from_ymd_opt(2024, 6, 1)
        .unwrap()
        .and_hms_opt(10, 0, 0)
        .unwrap()
        .and_local_timezone(chrono::Local)
        .earliest()
        .unwrap()
}

fn engine_for(server: &MockServer, temp_dir: &TempDir) -> (LookupEngine, Arc<ManualClock>) {
    let config = RegistryConfig::default().with_base_url(server.uri());
    let client = HttpRegistryClient::new(&config).unwrap();
    let store = RecordStore::new(temp_dir.path().join("dados").join("consultas.csv"));
    let clock = Arc::new(ManualClock::new(start_time()));

    let engine = LookupEngine::new(store, Arc::new(client), Arc::new(AlwaysOnline))
        .with_clock(clock.clone());
    (engine, clock)
}

fn acme_body() -> serde_json::Value {
    json!({
        "taxId": "11222333000181",
        "company": { "name": "ACME LTDA" },
        "address": { "state": "SP" },
        "registrations": [{ "number": "123456", "state": "SP" }]
    })
}

#[tokio::test]
async fn test_lookup_end_to_end() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/11222333000181"))
        .respond_with(ResponseTemplate::new(200).set_body_json(acme_body()))
        .expect(1)
        .mount(&server)
        .await;

    let temp_dir = TempDir::new().unwrap();
    let (engine, _clock) = engine_for(&server, &temp_dir);

    let outcome = engine.lookup(" 11.222.333/0001-81 ").await.unwrap();

    let record = outcome.record().expect("record expected");
    assert_eq!(outcome.source(), Some(RecordSource::Remote));
    assert_eq!(record.id, "11222333000181");
    assert_eq!(record.business_name, "ACME LTDA");
    assert_eq!(record.region_code, "SP");
    assert_eq!(record.registration_number, "123456");
    assert_eq!(record.queried_at_text(), "01/06/2024 10:00:00");

    assert_eq!(engine.remaining_quota(), CALLS_PER_MINUTE - 1);
    assert_eq!(engine.store().count().unwrap(), 1);

    let content = std::fs::read_to_string(engine.store().path()).unwrap();
    assert!(content.starts_with("Cnpj,BusinessName,State,StateRegistration,QueryTime"));
    assert!(content.contains("11222333000181,ACME LTDA,SP,123456,06/01/2024 10:00:00"));
}

#[tokio::test]
async fn test_missing_fields_become_not_available() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/11222333000181"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "company": { "name": "ACME" } })),
        )
        .mount(&server)
        .await;

    let temp_dir = TempDir::new().unwrap();
    let (engine, _clock) = engine_for(&server, &temp_dir);

    let outcome = engine.lookup("11222333000181").await.unwrap();
    let record = outcome.record().unwrap();

    assert_eq!(record.business_name, "ACME");
    assert_eq!(record.region_code, "N/A");
    assert_eq!(record.registration_number, "N/A");
}

#[tokio::test]
async fn test_cache_avoids_second_request() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/11222333000181"))
        .respond_with(ResponseTemplate::new(200).set_body_json(acme_body()))
        .expect(1)
        .mount(&server)
        .await;

    let temp_dir = TempDir::new().unwrap();
    let (engine, clock) = engine_for(&server, &temp_dir);

    let first = engine.lookup("11222333000181").await.unwrap();
    clock.advance(TimeDelta::seconds(5));
    let second = engine.lookup("11.222.333/0001-81").await.unwrap();

    assert_eq!(second.source(), Some(RecordSource::Cache));
    assert_eq!(first.record(), second.record());
    // O acerto no cache não gasta cota
    assert_eq!(engine.remaining_quota(), CALLS_PER_MINUTE - 1);
}

#[tokio::test]
async fn test_unknown_id_consumes_quota_without_writing() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(400).set_body_string("CNPJ inválido"))
        .mount(&server)
        .await;

    let temp_dir = TempDir::new().unwrap();
    let (engine, _clock) = engine_for(&server, &temp_dir);

    let outcome = engine.lookup("00000000000000").await.unwrap();

    assert_eq!(
        outcome.rejection(),
        Some(&Rejection::UnknownId {
            cnpj: "00000000000000".to_string()
        })
    );
    assert_eq!(engine.remaining_quota(), CALLS_PER_MINUTE - 1);
    assert_eq!(engine.store().count().unwrap(), 0);
    assert!(!engine.store().path().exists());
}

#[tokio::test]
async fn test_server_error_detail() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503).set_body_string("manutenção"))
        .mount(&server)
        .await;

    let temp_dir = TempDir::new().unwrap();
    let (engine, _clock) = engine_for(&server, &temp_dir);

    let outcome = engine.lookup("11222333000181").await.unwrap();

    match outcome {
        LookupOutcome::Rejected(Rejection::RemoteError { detail }) => {
            assert_eq!(detail, "503 Service Unavailable - manutenção");
        }
        other => panic!("unexpected outcome: {:?}", other),
    }
    assert_eq!(engine.store().count().unwrap(), 0);
}

#[tokio::test]
async fn test_sixth_request_is_rate_limited() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path_regex(r"^/\d{14}$"))
        .respond_with(ResponseTemplate::new(200).set_body_json(acme_body()))
        .expect(u64::from(CALLS_PER_MINUTE))
        .mount(&server)
        .await;

    let temp_dir = TempDir::new().unwrap();
    let (engine, clock) = engine_for(&server, &temp_dir);
    let stats = Arc::new(StatsObserver::new());
    let engine = engine.with_observer(stats.clone());

    for i in 1..=CALLS_PER_MINUTE {
        let id = format!("{:014}", i);
        let outcome = engine.lookup(&id).await.unwrap();
        assert_eq!(outcome.source(), Some(RecordSource::Remote));
        clock.advance(TimeDelta::seconds(1));
    }
    assert_eq!(engine.remaining_quota(), 0);

    let outcome = engine.lookup("00000000000099").await.unwrap();
    assert_eq!(
        outcome.rejection(),
        Some(&Rejection::RateLimited { retry_in_secs: 55 })
    );
    assert_eq!(stats.remote_hits(), u64::from(CALLS_PER_MINUTE));
    assert_eq!(stats.rejections(), 1);

    // Cache continua disponível mesmo sem cota
    let cached = engine.lookup("00000000000001").await.unwrap();
    assert_eq!(cached.source(), Some(RecordSource::Cache));

    // Depois que a primeira tentativa sai da janela, uma nova consulta passa
    clock.advance(TimeDelta::seconds(55));
    assert_eq!(engine.remaining_quota(), 1);
}

#[tokio::test]
async fn test_records_survive_new_engine() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path_regex(r"^/\d{14}$"))
        .respond_with(ResponseTemplate::new(200).set_body_json(acme_body()))
        .mount(&server)
        .await;

    let temp_dir = TempDir::new().unwrap();
    let ids = ["11222333000181", "33000167000101", "00000000000191"];
    {
        let (engine, clock) = engine_for(&server, &temp_dir);
        for id in ids {
            engine.lookup(id).await.unwrap();
            clock.advance(TimeDelta::seconds(2));
        }
    }

    let store = RecordStore::new(temp_dir.path().join("dados").join("consultas.csv"));
    let records: Vec<Record> = store.load_all().unwrap();
    assert_eq!(records.len(), ids.len());

    for (record, id) in records.iter().zip(ids) {
        let cnpj = normalize_and_validate(id).unwrap();
        assert_eq!(record.id, cnpj.as_str());
    }
    assert!(records
        .windows(2)
        .all(|pair| pair[0].queried_at < pair[1].queried_at));
}
