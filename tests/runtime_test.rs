//! Runtime bridge end to end against a scripted backend

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use rust_decimal::Decimal;

use screener::app::App;
use screener::config::Config;
use screener::domain::{Chain, DateRange};
use screener::error::GatewayError;
use screener::infrastructure::gateway::{ExportKind, Gateway, HttpResponse, Transport};
use screener::infrastructure::runtime::{RuntimeBridge, RuntimeCommand, RuntimeEvent, TaskKind};

const ADDR: &str = "0x742d35Cc6634C0532925a3b844Bc454e4438f44e";

const ANALYSIS: &str = r#"{
    "success": true,
    "balance": "2500000000000000000",
    "token_balances": {"USDT": {"balance": 120.5, "contract": "0xdac17f958d2ee523a2206206994597c13d831ec7"}},
    "transactions": [
        {"hash": "0xaa", "timestamp": 1704067200, "type": "Transfer", "direction": "in",
         "from": "0x1111111111111111111111111111111111111111", "to": "0x742d35cc6634c0532925a3b844bc454e4438f44e",
         "amount": 1.5, "usdValue": 3300.25, "status": "success"},
        {"hash": "0xbb", "timestamp": 1704153600, "type": "Swap", "direction": "out",
         "from": "0x742d35cc6634c0532925a3b844bc454e4438f44e", "to": null,
         "amount": 0.5, "status": "failed"}
    ]
}"#;

/// Replies in order; `panic` replies blow up inside the task
#[derive(Default)]
struct ScriptedBackend {
    replies: Mutex<VecDeque<Option<HttpResponse>>>,
    urls: Mutex<Vec<String>>,
}

impl ScriptedBackend {
    fn reply(&self, response: HttpResponse) {
        self.replies.lock().unwrap().push_back(Some(response));
    }

    fn panic_next(&self) {
        self.replies.lock().unwrap().push_back(None);
    }

    fn next(&self, url: &str) -> Result<HttpResponse, GatewayError> {
        self.urls.lock().unwrap().push(url.to_string());
        let reply = self.replies.lock().unwrap().pop_front();
        match reply {
            Some(Some(response)) => Ok(response),
            Some(None) => panic!("backend exploded"),
            None => Err(GatewayError::Transport("connection refused".into())),
        }
    }
}

#[async_trait::async_trait]
impl Transport for ScriptedBackend {
    async fn get(&self, url: &str) -> Result<HttpResponse, GatewayError> {
        self.next(url)
    }

    async fn post_json(
        &self,
        url: &str,
        _body: &serde_json::Value,
    ) -> Result<HttpResponse, GatewayError> {
        self.next(url)
    }
}

fn bridge() -> (Arc<ScriptedBackend>, RuntimeBridge) {
    let backend = Arc::new(ScriptedBackend::default());
    let gateway = Gateway::new(backend.clone(), "http://backend/api");
    let bridge = RuntimeBridge::new(Arc::new(gateway)).unwrap();
    (backend, bridge)
}

fn wait_for_event(bridge: &RuntimeBridge) -> RuntimeEvent {
    let deadline = Instant::now() + Duration::from_secs(5);
    loop {
        if let Some(event) = bridge.poll_events().into_iter().next() {
            return event;
        }
        assert!(Instant::now() < deadline, "no runtime event");
        std::thread::sleep(Duration::from_millis(10));
    }
}

fn range() -> DateRange {
    DateRange::parse("2024-01-01", "2024-01-31").unwrap()
}

#[test]
fn test_analysis_round_trip_through_app() {
    let (backend, bridge) = bridge();
    backend.reply(HttpResponse::json(200, ANALYSIS));

    let mut app = App::new(&Config::default());
    app.request_analysis("eth", ADDR, "2024-01-01", "2024-01-31");
    for cmd in app.take_requests() {
        bridge.send(cmd).unwrap();
    }

    match wait_for_event(&bridge) {
        RuntimeEvent::AnalysisReady { generation, result } => {
            app.apply_analysis(generation, result)
        }
        other => panic!("unexpected event: {other:?}"),
    }

    assert!(!app.is_loading());
    let balance = app.store.effective_balance().unwrap();
    assert_eq!(balance.native, "2.5".parse::<Decimal>().unwrap());
    assert_eq!(balance.tokens[0].symbol, "USDT");
    assert_eq!(app.store.filtered().len(), 2);
    assert_eq!(
        backend.urls.lock().unwrap()[0],
        format!(
            "http://backend/api/analyze/ethereum/{}?start_date=2024-01-01&end_date=2024-01-31",
            ADDR
        )
    );
}

#[test]
fn test_failed_analysis_is_reported() {
    let (backend, bridge) = bridge();
    backend.reply(HttpResponse::json(
        200,
        r#"{"success": false, "error": "Invalid address for polygon"}"#,
    ));

    bridge
        .send(RuntimeCommand::Analyze {
            generation: 7,
            chain: Chain::Polygon,
            address: ADDR.to_string(),
            range: range(),
        })
        .unwrap();

    match wait_for_event(&bridge) {
        RuntimeEvent::AnalysisFailed { generation, error } => {
            assert_eq!(generation, 7);
            assert_eq!(error, GatewayError::Backend("Invalid address for polygon".into()));
        }
        other => panic!("unexpected event: {other:?}"),
    }
}

#[test]
fn test_panicking_request_keeps_worker_alive() {
    let (backend, bridge) = bridge();
    backend.panic_next();
    backend.reply(HttpResponse::json(
        200,
        r#"{"status": "healthy", "service": "analysis", "version": "1.2.0"}"#,
    ));

    bridge.send(RuntimeCommand::Health).unwrap();
    match wait_for_event(&bridge) {
        RuntimeEvent::Unexpected {
            task,
            generation,
            message,
        } => {
            assert_eq!(task, TaskKind::Health);
            assert_eq!(generation, None);
            assert_eq!(message, "backend exploded");
        }
        other => panic!("unexpected event: {other:?}"),
    }

    bridge.send(RuntimeCommand::Health).unwrap();
    match wait_for_event(&bridge) {
        RuntimeEvent::HealthReady { status } => {
            assert_eq!(status.status, "healthy");
            assert_eq!(status.version.as_deref(), Some("1.2.0"));
        }
        other => panic!("unexpected event: {other:?}"),
    }
}

#[test]
fn test_pdf_export_download() {
    let (backend, bridge) = bridge();
    backend.reply(HttpResponse::json(200, ANALYSIS));
    backend.reply(HttpResponse {
        status: 200,
        content_type: Some("application/pdf".to_string()),
        content_disposition: Some(
            "attachment; filename=\"ethereum_0x742d35_statement.pdf\"".to_string(),
        ),
        body: b"%PDF-1.4".to_vec(),
    });

    let mut app = App::new(&Config::default());
    app.request_analysis("ethereum", ADDR, "2024-01-01", "2024-01-31");
    for cmd in app.take_requests() {
        bridge.send(cmd).unwrap();
    }
    if let RuntimeEvent::AnalysisReady { generation, result } = wait_for_event(&bridge) {
        app.apply_analysis(generation, result);
    }

    app.request_export(screener::core::ExportTarget::Pdf);
    let requests = app.take_requests();
    assert!(matches!(
        requests.as_slice(),
        [RuntimeCommand::Export { kind: ExportKind::Pdf, .. }]
    ));
    for cmd in requests {
        bridge.send(cmd).unwrap();
    }

    match wait_for_event(&bridge) {
        RuntimeEvent::ExportReady { file } => {
            assert_eq!(file.filename, "ethereum_0x742d35_statement.pdf");
            assert_eq!(file.bytes, b"%PDF-1.4".to_vec());
        }
        other => panic!("unexpected event: {other:?}"),
    }
    assert!(backend.urls.lock().unwrap()[1].starts_with("http://backend/api/export/pdf/ethereum/"));
}
