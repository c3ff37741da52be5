//! Integration tests for the connection controller
//!
//! These drive the controller against an in-memory agent server so the
//! lifecycle, the re-entrancy gate and the liveness probe can be checked
//! without a network. Timer tests run on tokio's paused clock.

use async_trait::async_trait;
use companion_core::session::{
    ActionOutcome, ApiError, ApiResponse, ConnectionController, ConnectionError,
    ConnectionState, ResultCode, SessionApi, SessionParams,
};
use companion_core::state::{AppStore, NotificationLevel, SessionOptions, StoreAction};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::{Notify, RwLock};

const PING_INTERVAL: Duration = Duration::from_secs(3);

/// In-memory agent server with call counters
#[derive(Default)]
struct FakeAgentServer {
    start_calls: AtomicUsize,
    stop_calls: AtomicUsize,
    ping_calls: AtomicUsize,
    /// `None` makes start fail in transport
    start_response: Mutex<Option<ApiResponse>>,
    ping_response: Mutex<Option<ApiResponse>>,
    stop_fails: AtomicBool,
    /// When set, start waits for a notification before answering
    start_gate: Option<Arc<Notify>>,
    /// When set, ping waits for a notification before answering
    ping_gate: Option<Arc<Notify>>,
    last_start: Mutex<Option<SessionParams>>,
}

impl FakeAgentServer {
    fn new() -> Self {
        Self {
            start_response: Mutex::new(Some(ApiResponse::ok())),
            ping_response: Mutex::new(Some(ApiResponse::ok())),
            ..Default::default()
        }
    }

    fn gated(gate: Arc<Notify>) -> Self {
        Self {
            start_gate: Some(gate),
            ..Self::new()
        }
    }

    fn ping_gated(gate: Arc<Notify>) -> Self {
        Self {
            ping_gate: Some(gate),
            ..Self::new()
        }
    }

    fn set_start_response(&self, response: Option<ApiResponse>) {
        *self.start_response.lock().unwrap() = response;
    }

    fn set_ping_response(&self, response: Option<ApiResponse>) {
        *self.ping_response.lock().unwrap() = response;
    }

    fn starts(&self) -> usize {
        self.start_calls.load(Ordering::SeqCst)
    }

    fn stops(&self) -> usize {
        self.stop_calls.load(Ordering::SeqCst)
    }

    fn pings(&self) -> usize {
        self.ping_calls.load(Ordering::SeqCst)
    }
}

fn unavailable() -> ApiError {
    ApiError::Status {
        status: 503,
        body: "service unavailable".to_string(),
    }
}

#[async_trait]
impl SessionApi for FakeAgentServer {
    async fn ping(&self, _channel: &str) -> Result<ApiResponse, ApiError> {
        self.ping_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = &self.ping_gate {
            gate.notified().await;
        }
        self.ping_response.lock().unwrap().clone().ok_or_else(unavailable)
    }

    async fn start_service(&self, params: &SessionParams) -> Result<ApiResponse, ApiError> {
        self.start_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_start.lock().unwrap() = Some(params.clone());
        if let Some(gate) = &self.start_gate {
            gate.notified().await;
        }
        self.start_response.lock().unwrap().clone().ok_or_else(unavailable)
    }

    async fn stop_service(&self, _channel: &str) -> Result<ApiResponse, ApiError> {
        self.stop_calls.fetch_add(1, Ordering::SeqCst);
        if self.stop_fails.load(Ordering::SeqCst) {
            Err(unavailable())
        } else {
            Ok(ApiResponse::ok())
        }
    }
}

fn store_for(channel: &str, graph: Option<&str>) -> Arc<RwLock<AppStore>> {
    let mut store = AppStore::with_options(SessionOptions {
        channel: channel.to_string(),
        user_name: "tester".to_string(),
        user_id: 123456,
    });
    store.dispatch(StoreAction::SetSelectedGraphId(graph.map(str::to_string)));
    Arc::new(RwLock::new(store))
}

fn controller_with(
    api: Arc<FakeAgentServer>,
    store: Arc<RwLock<AppStore>>,
) -> Arc<ConnectionController> {
    Arc::new(ConnectionController::new(api, store, PING_INTERVAL))
}

fn setup() -> (Arc<FakeAgentServer>, Arc<ConnectionController>) {
    let api = Arc::new(FakeAgentServer::new());
    let store = store_for("room-1", Some("va_openai_azure"));
    let controller = controller_with(api.clone(), store);
    (api, controller)
}

/// Probe, controller state and store mirror must agree
async fn assert_consistent(controller: &ConnectionController) {
    let connected = controller.state() == ConnectionState::Connected;
    assert_eq!(controller.liveness_active(), connected);
    assert_eq!(controller.store().read().await.agent_connected, connected);
}

async fn latest_message(controller: &ConnectionController) -> (NotificationLevel, String) {
    let store = controller.store().read().await;
    let latest = store.notifications.latest().expect("a notification");
    (latest.level, latest.message.clone())
}

#[tokio::test]
async fn test_connect_without_graph_makes_no_call() {
    let api = Arc::new(FakeAgentServer::new());
    let controller = controller_with(api.clone(), store_for("room-1", None));

    let err = controller.connect().await.unwrap_err();

    assert!(matches!(err, ConnectionError::NoGraphSelected));
    assert_eq!(api.starts(), 0);
    assert_eq!(controller.state(), ConnectionState::Disconnected);
    assert!(!controller.is_loading());
    assert_eq!(
        latest_message(&controller).await,
        (NotificationLevel::Error, "请先选择一个图谱".to_string())
    );
}

#[tokio::test]
async fn test_connect_with_unknown_graph_id_makes_no_call() {
    let api = Arc::new(FakeAgentServer::new());
    let controller = controller_with(api.clone(), store_for("room-1", Some("deleted_graph")));

    let err = controller.connect().await.unwrap_err();

    assert!(matches!(err, ConnectionError::NoGraphSelected));
    assert_eq!(api.starts(), 0);
}

#[tokio::test]
async fn test_connect_with_empty_channel_makes_no_call() {
    let api = Arc::new(FakeAgentServer::new());
    let controller = controller_with(api.clone(), store_for("  ", Some("va_openai_azure")));

    let err = controller.connect().await.unwrap_err();

    assert!(matches!(err, ConnectionError::EmptyChannel));
    assert_eq!(api.starts(), 0);
    assert_eq!(controller.state(), ConnectionState::Disconnected);
}

#[tokio::test(start_paused = true)]
async fn test_successful_connect_starts_one_probe() {
    let (api, controller) = setup();

    let outcome = controller.connect().await.unwrap();

    assert_eq!(outcome, ActionOutcome::Connected);
    assert_eq!(controller.state(), ConnectionState::Connected);
    assert!(controller.liveness_active());
    assert!(controller.store().read().await.agent_connected);
    assert_eq!(
        latest_message(&controller).await,
        (NotificationLevel::Success, "晓佑已连接".to_string())
    );

    let sent = api.last_start.lock().unwrap().clone().unwrap();
    assert_eq!(sent.channel, "room-1");
    assert_eq!(sent.user_id, 123456);
    assert_eq!(sent.graph_name, "va_openai_azure");
    assert_eq!(controller.active_session(), Some(sent));

    // three intervals -> three pings from a single probe
    tokio::time::sleep(Duration::from_millis(9_100)).await;
    assert_eq!(api.pings(), 3);
}

#[tokio::test]
async fn test_rapid_double_connect_sends_one_start() {
    let gate = Arc::new(Notify::new());
    let api = Arc::new(FakeAgentServer::gated(gate.clone()));
    let controller = controller_with(api.clone(), store_for("room-1", Some("va_openai_azure")));

    let first = {
        let controller = controller.clone();
        tokio::spawn(async move { controller.connect().await })
    };
    while api.starts() == 0 {
        tokio::task::yield_now().await;
    }

    assert!(controller.is_loading());
    assert_eq!(controller.state(), ConnectionState::Connecting);
    assert_eq!(controller.connect().await.unwrap(), ActionOutcome::Suppressed);
    assert_eq!(controller.toggle().await.unwrap(), ActionOutcome::Suppressed);
    assert_eq!(controller.disconnect().await.unwrap(), ActionOutcome::Suppressed);

    gate.notify_one();
    assert_eq!(first.await.unwrap().unwrap(), ActionOutcome::Connected);
    assert_eq!(api.starts(), 1);
    assert_eq!(api.stops(), 0);
    assert!(!controller.is_loading());
}

#[tokio::test(start_paused = true)]
async fn test_disconnect_cancels_probe_even_when_stop_fails() {
    let (api, controller) = setup();
    controller.connect().await.unwrap();
    api.stop_fails.store(true, Ordering::SeqCst);

    let err = controller.disconnect().await.unwrap_err();

    assert!(matches!(err, ConnectionError::Api(ApiError::Status { status: 503, .. })));
    assert_eq!(api.stops(), 1);
    assert!(!controller.liveness_active());
    assert_eq!(controller.state(), ConnectionState::Disconnected);
    assert!(!controller.store().read().await.agent_connected);
    assert!(controller.active_session().is_none());
    assert!(!controller.is_loading());

    tokio::time::sleep(Duration::from_secs(30)).await;
    assert_eq!(api.pings(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_disconnect_success_notifies() {
    let (api, controller) = setup();
    controller.connect().await.unwrap();

    assert_eq!(controller.toggle().await.unwrap(), ActionOutcome::Disconnected);

    assert_eq!(api.stops(), 1);
    assert!(!controller.liveness_active());
    assert_eq!(
        latest_message(&controller).await,
        (NotificationLevel::Success, "已断开晓佑".to_string())
    );
}

#[tokio::test]
async fn test_disconnect_when_disconnected_is_a_no_op() {
    let (api, controller) = setup();

    assert_eq!(controller.disconnect().await.unwrap(), ActionOutcome::Disconnected);
    assert_eq!(api.stops(), 0);
}

#[tokio::test]
async fn test_capacity_code_reports_limit() {
    let (api, controller) = setup();
    api.set_start_response(Some(ApiResponse::failure(
        ResultCode::Text("10001".to_string()),
        "too many sessions",
    )));

    let err = controller.connect().await.unwrap_err();

    assert!(matches!(err, ConnectionError::CapacityExceeded));
    assert_eq!(controller.state(), ConnectionState::Disconnected);
    assert!(!controller.liveness_active());
    assert!(!controller.is_loading());
    assert!(!controller.store().read().await.agent_connected);
    assert_eq!(
        latest_message(&controller).await,
        (
            NotificationLevel::Error,
            "当前同时在线体验人数已达上限，请稍后再试。".to_string()
        )
    );
}

#[tokio::test]
async fn test_generic_failure_reports_code_and_message() {
    let (api, controller) = setup();
    api.set_start_response(Some(ApiResponse::failure(
        ResultCode::Number(500),
        "graph missing",
    )));

    let err = controller.connect().await.unwrap_err();

    match err {
        ConnectionError::ServiceFailure { code, msg } => {
            assert_eq!(code, ResultCode::Number(500));
            assert_eq!(msg, "graph missing");
        }
        other => panic!("expected service failure, got {:?}", other),
    }
    assert_eq!(
        latest_message(&controller).await,
        (NotificationLevel::Error, "错误码:500，信息:graph missing".to_string())
    );
}

#[tokio::test]
async fn test_transport_failure_propagates_and_releases_gate() {
    let (api, controller) = setup();
    api.set_start_response(None);

    let err = controller.connect().await.unwrap_err();

    assert!(matches!(err, ConnectionError::Api(_)));
    assert_eq!(controller.state(), ConnectionState::Disconnected);
    assert!(!controller.is_loading());
    assert!(controller.store().read().await.notifications.is_empty());

    // the gate is free again, so a retry goes out
    api.set_start_response(Some(ApiResponse::ok()));
    assert_eq!(controller.connect().await.unwrap(), ActionOutcome::Connected);
    assert_eq!(api.starts(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_reconnect_cycles_keep_a_single_probe() {
    let (api, controller) = setup();

    for _ in 0..3 {
        controller.connect().await.unwrap();
        controller.disconnect().await.unwrap();
    }
    controller.connect().await.unwrap();
    // a second connect while connected must not add a probe
    assert_eq!(controller.connect().await.unwrap(), ActionOutcome::Connected);
    assert_eq!(api.starts(), 4);

    tokio::time::sleep(Duration::from_millis(3_100)).await;
    assert_eq!(api.pings(), 1);
    tokio::time::sleep(Duration::from_secs(3)).await;
    assert_eq!(api.pings(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_existing_session_is_adopted_without_start() {
    let (api, controller) = setup();

    assert!(controller.check_existing_session().await.unwrap());

    assert_eq!(api.starts(), 0);
    assert_eq!(api.pings(), 1);
    assert_eq!(controller.state(), ConnectionState::Connected);
    assert!(controller.store().read().await.agent_connected);
    assert!(controller.liveness_active());
    assert!(controller.active_session().is_none());

    // the adopted session can be disconnected normally
    assert_eq!(controller.toggle().await.unwrap(), ActionOutcome::Disconnected);
    assert_eq!(api.stops(), 1);
}

#[tokio::test]
async fn test_existing_session_not_running() {
    let (api, controller) = setup();
    api.set_ping_response(Some(ApiResponse::failure(ResultCode::Number(1), "not found")));

    assert!(!controller.check_existing_session().await.unwrap());

    assert_eq!(controller.state(), ConnectionState::Disconnected);
    assert!(!controller.liveness_active());
}

#[tokio::test]
async fn test_existing_session_skipped_without_channel() {
    let api = Arc::new(FakeAgentServer::new());
    let controller = controller_with(api.clone(), store_for("", Some("va_openai_azure")));

    assert!(!controller.check_existing_session().await.unwrap());
    assert_eq!(api.pings(), 0);
}

#[tokio::test]
async fn test_existing_session_ping_transport_error_propagates() {
    let (api, controller) = setup();
    api.set_ping_response(None);

    let err = controller.check_existing_session().await.unwrap_err();

    assert!(matches!(err, ConnectionError::Api(_)));
    assert_eq!(controller.state(), ConnectionState::Disconnected);
}

#[tokio::test]
async fn test_adoption_is_dropped_while_connect_in_flight() {
    let gate = Arc::new(Notify::new());
    let api = Arc::new(FakeAgentServer::gated(gate.clone()));
    api.set_start_response(Some(ApiResponse::failure(
        ResultCode::Text("10001".to_string()),
        "full",
    )));
    let controller = controller_with(api.clone(), store_for("room-1", Some("va_openai_azure")));

    let connect = {
        let controller = controller.clone();
        tokio::spawn(async move { controller.connect().await })
    };
    while api.starts() == 0 {
        tokio::task::yield_now().await;
    }

    // the channel answers the ping but connect owns the transition
    assert!(!controller.check_existing_session().await.unwrap());
    assert_eq!(api.pings(), 1);
    assert_eq!(controller.state(), ConnectionState::Connecting);
    assert!(!controller.liveness_active());

    gate.notify_one();
    let err = connect.await.unwrap().unwrap_err();
    assert!(matches!(err, ConnectionError::CapacityExceeded));
    assert_eq!(controller.state(), ConnectionState::Disconnected);
    assert_consistent(&controller).await;
}

#[tokio::test]
async fn test_connect_is_suppressed_while_adoption_in_flight() {
    let ping_gate = Arc::new(Notify::new());
    let api = Arc::new(FakeAgentServer::ping_gated(ping_gate.clone()));
    api.set_start_response(Some(ApiResponse::failure(
        ResultCode::Text("10001".to_string()),
        "full",
    )));
    let controller = controller_with(api.clone(), store_for("room-1", Some("va_openai_azure")));

    let adopt = {
        let controller = controller.clone();
        tokio::spawn(async move { controller.check_existing_session().await })
    };
    while api.pings() == 0 {
        tokio::task::yield_now().await;
    }

    // park adoption on the store after it has taken the gate
    let store_guard = controller.store().write().await;
    ping_gate.notify_one();
    while !controller.is_loading() {
        tokio::task::yield_now().await;
    }

    assert_eq!(controller.connect().await.unwrap(), ActionOutcome::Suppressed);
    assert_eq!(api.starts(), 0);

    drop(store_guard);
    assert!(adopt.await.unwrap().unwrap());
    assert_eq!(controller.state(), ConnectionState::Connected);
    assert!(!controller.is_loading());
    assert_consistent(&controller).await;
}

#[tokio::test]
async fn test_refused_connect_after_adoption_ping_leaves_consistent_state() {
    let ping_gate = Arc::new(Notify::new());
    let api = Arc::new(FakeAgentServer::ping_gated(ping_gate.clone()));
    api.set_start_response(Some(ApiResponse::failure(
        ResultCode::Text("10001".to_string()),
        "full",
    )));
    let controller = controller_with(api.clone(), store_for("room-1", Some("va_openai_azure")));

    let adopt = {
        let controller = controller.clone();
        tokio::spawn(async move { controller.check_existing_session().await })
    };
    while api.pings() == 0 {
        tokio::task::yield_now().await;
    }

    // connect runs to completion while the ping is outstanding
    let err = controller.connect().await.unwrap_err();
    assert!(matches!(err, ConnectionError::CapacityExceeded));
    assert_consistent(&controller).await;

    ping_gate.notify_one();
    let adopted = adopt.await.unwrap().unwrap();
    assert_eq!(adopted, controller.state() == ConnectionState::Connected);
    assert_consistent(&controller).await;
}

#[tokio::test]
async fn test_adoption_dropped_when_channel_changed_during_ping() {
    let ping_gate = Arc::new(Notify::new());
    let api = Arc::new(FakeAgentServer::ping_gated(ping_gate.clone()));
    let controller = controller_with(api.clone(), store_for("room-1", Some("va_openai_azure")));

    let adopt = {
        let controller = controller.clone();
        tokio::spawn(async move { controller.check_existing_session().await })
    };
    while api.pings() == 0 {
        tokio::task::yield_now().await;
    }

    controller
        .store()
        .write()
        .await
        .dispatch(StoreAction::SetOptions(SessionOptions {
            channel: "room-2".to_string(),
            user_name: "tester".to_string(),
            user_id: 123456,
        }));
    ping_gate.notify_one();

    assert!(!adopt.await.unwrap().unwrap());
    assert_eq!(controller.state(), ConnectionState::Disconnected);
    assert_consistent(&controller).await;
}
