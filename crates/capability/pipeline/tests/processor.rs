use async_trait::async_trait;
use beacon_ingest::BatchHandler;
use beacon_notify::{LineMessage, LineMessenger, NotifyError, PushNotification, PushSender, RetryPolicy};
use beacon_pipeline::{BeaconProcessor, Notifiers, PipelineConfig, Stores, auto_gateway_id};
use beacon_storage::{
    ActivityRecord, ActivityStore, DeviceRecord, DeviceStore, ElderRecord, ErrorLogStore,
    GatewayRecord, GatewayStore, InMemoryActivityStore, InMemoryAlertStore, InMemoryDeviceStore,
    InMemoryElderStore, InMemoryErrorLogStore, InMemoryGatewayStore, InMemoryMapUserStore,
    InMemoryNotificationPointStore, InMemoryTenantStore, MapUserRecord, NotificationPointRecord,
    StorageError, TenantMemberRecord, TenantRecord,
};
use domain::{
    BeaconSighting, BeaconSignature, Binding, Coordinates, GatewayType, MemberStatus,
    NotificationChannel, SightingBatch,
};
use std::sync::{Arc, Mutex};

const UUID: &str = "FDA50693-A4E2-4FB1-AFCF-C6EB07647825";
const T0: i64 = 1_700_000_000_000;
const MINUTE: i64 = 60_000;

#[derive(Debug, Clone)]
struct SentLine {
    token: String,
    to: String,
    alt_text: String,
}

#[derive(Default)]
struct RecordingLine {
    failing_for: Vec<String>,
    sent: Mutex<Vec<SentLine>>,
}

impl RecordingLine {
    /// 对指定收件人返回 500，其余照常记录。
    fn failing_for(recipients: &[&str]) -> Self {
        Self {
            failing_for: recipients.iter().map(|to| to.to_string()).collect(),
            ..Self::default()
        }
    }

    fn sent(&self) -> Vec<SentLine> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl LineMessenger for RecordingLine {
    async fn push(
        &self,
        channel_access_token: &str,
        to: &str,
        message: &LineMessage,
    ) -> Result<(), NotifyError> {
        if self.failing_for.iter().any(|failing| failing == to) {
            return Err(NotifyError::Status {
                status: 500,
                body: "upstream unavailable".to_string(),
            });
        }
        self.sent.lock().unwrap().push(SentLine {
            token: channel_access_token.to_string(),
            to: to.to_string(),
            alt_text: message.alt_text.clone(),
        });
        Ok(())
    }
}

#[derive(Default)]
struct RecordingPush {
    fail: bool,
    sent: Mutex<Vec<(String, PushNotification)>>,
}

impl RecordingPush {
    fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    fn sent(&self) -> Vec<(String, PushNotification)> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl PushSender for RecordingPush {
    async fn send(
        &self,
        device_token: &str,
        notification: &PushNotification,
    ) -> Result<(), NotifyError> {
        self.sent
            .lock()
            .unwrap()
            .push((device_token.to_string(), notification.clone()));
        if self.fail {
            return Err(NotifyError::Status {
                status: 400,
                body: "InvalidRegistration".to_string(),
            });
        }
        Ok(())
    }
}

struct FailingActivityStore;

#[async_trait]
impl ActivityStore for FailingActivityStore {
    async fn append_activity(&self, _record: ActivityRecord) -> Result<(), StorageError> {
        Err(StorageError::new("activity table unavailable"))
    }

    async fn list_activities(
        &self,
        _device_id: &str,
        _limit: usize,
    ) -> Result<Vec<ActivityRecord>, StorageError> {
        Ok(Vec::new())
    }
}

struct Fixture {
    stores: Stores,
    gateways: Arc<InMemoryGatewayStore>,
    devices: Arc<InMemoryDeviceStore>,
    alerts: Arc<InMemoryAlertStore>,
    activities: Arc<InMemoryActivityStore>,
    error_logs: Arc<InMemoryErrorLogStore>,
    line: Arc<RecordingLine>,
    push: Arc<RecordingPush>,
}

impl Fixture {
    fn new() -> Self {
        Self::with_notifiers(RecordingLine::default(), RecordingPush::default())
    }

    fn with_push(push: RecordingPush) -> Self {
        Self::with_notifiers(RecordingLine::default(), push)
    }

    fn with_line(line: RecordingLine) -> Self {
        Self::with_notifiers(line, RecordingPush::default())
    }

    fn with_notifiers(line: RecordingLine, push: RecordingPush) -> Self {
        let gateways = Arc::new(InMemoryGatewayStore::new());
        let devices = Arc::new(InMemoryDeviceStore::new());
        let alerts = Arc::new(InMemoryAlertStore::new());
        let activities = Arc::new(InMemoryActivityStore::new());
        let error_logs = Arc::new(InMemoryErrorLogStore::new());
        let stores = Stores {
            gateways: gateways.clone(),
            devices: devices.clone(),
            elders: Arc::new(InMemoryElderStore::new()),
            tenants: Arc::new(InMemoryTenantStore::new()),
            map_users: Arc::new(InMemoryMapUserStore::new()),
            points: Arc::new(InMemoryNotificationPointStore::new()),
            alerts: alerts.clone(),
            activities: activities.clone(),
            error_logs: error_logs.clone(),
            ..Stores::in_memory()
        };
        Self {
            stores,
            gateways,
            devices,
            alerts,
            activities,
            error_logs,
            line: Arc::new(line),
            push: Arc::new(push),
        }
    }

    fn processor(&self) -> BeaconProcessor {
        let notifiers = Notifiers {
            line: self.line.clone(),
            push: self.push.clone(),
        };
        let config = PipelineConfig {
            retry: RetryPolicy {
                max_retries: 0,
                backoff_ms: 0,
            },
            ..PipelineConfig::default()
        };
        BeaconProcessor::new(self.stores.clone(), notifiers, config)
    }

    async fn gateway(&self, id: &str, gateway_type: GatewayType) {
        let record = GatewayRecord {
            gateway_id: id.to_string(),
            serial_number: id.to_string(),
            mac_address: None,
            imei: None,
            name: format!("網關 {id}"),
            location: Some("社區活動中心".to_string()),
            gateway_type,
            latitude: Some(25.0330),
            longitude: Some(121.5654),
            tenant_id: Some("tenant-1".to_string()),
            is_active: true,
            created_at_ms: 0,
        };
        self.gateways.insert_gateway_if_absent(record).await.unwrap();
    }

    async fn device(&self, id: &str, minor: u16, binding: Binding, active: bool) {
        let record = DeviceRecord {
            device_id: id.to_string(),
            uuid: UUID.to_string(),
            major: 100,
            minor,
            is_active: active,
            binding,
            bound_at_ms: Some(0),
            last_seen_ms: None,
            last_rssi: None,
            battery_level: None,
        };
        self.devices.create_device(record).await.unwrap();
    }

    async fn elder_with_tenant(&self, token: Option<&str>) {
        self.stores
            .tenants
            .create_tenant(TenantRecord {
                tenant_id: "tenant-1".to_string(),
                name: "幸福社區".to_string(),
                line_channel_access_token: token.map(str::to_string),
            })
            .await
            .unwrap();
        let members = [
            ("m-1", MemberStatus::Approved, Some("U-approved")),
            ("m-2", MemberStatus::Approved, None),
            ("m-3", MemberStatus::Pending, Some("U-pending")),
        ];
        for (member_id, status, line_user_id) in members {
            self.stores
                .tenants
                .add_member(TenantMemberRecord {
                    tenant_id: "tenant-1".to_string(),
                    member_id: member_id.to_string(),
                    name: member_id.to_string(),
                    status,
                    line_user_id: line_user_id.map(str::to_string),
                })
                .await
                .unwrap();
        }
        self.stores
            .elders
            .create_elder(ElderRecord {
                elder_id: "elder-1".to_string(),
                tenant_id: "tenant-1".to_string(),
                name: "王奶奶".to_string(),
                phone: None,
            })
            .await
            .unwrap();
    }

    async fn approved_member(&self, member_id: &str, line_user_id: &str) {
        self.stores
            .tenants
            .add_member(TenantMemberRecord {
                tenant_id: "tenant-1".to_string(),
                member_id: member_id.to_string(),
                name: member_id.to_string(),
                status: MemberStatus::Approved,
                line_user_id: Some(line_user_id.to_string()),
            })
            .await
            .unwrap();
    }

    async fn map_user(&self, notification_enabled: bool) {
        self.map_user_with_token(Some("fcm-token-1"), notification_enabled)
            .await;
    }

    async fn map_user_with_token(&self, fcm_token: Option<&str>, notification_enabled: bool) {
        self.stores
            .map_users
            .create_map_user(MapUserRecord {
                user_id: "user-1".to_string(),
                name: "小明".to_string(),
                fcm_token: fcm_token.map(str::to_string),
                notification_enabled,
                bound_device_id: Some("dev-1".to_string()),
            })
            .await
            .unwrap();
    }

    async fn point(&self, gateway_id: &str) {
        self.stores
            .points
            .create_point(NotificationPointRecord {
                point_id: "point-1".to_string(),
                owner_id: "user-1".to_string(),
                gateway_id: gateway_id.to_string(),
                name: "學校".to_string(),
                message: Some("已到校".to_string()),
                is_active: true,
            })
            .await
            .unwrap();
    }

    async fn activities(&self, device_id: &str) -> Vec<ActivityRecord> {
        self.activities.list_activities(device_id, 100).await.unwrap()
    }
}

fn batch(gateway: &str, timestamp_ms: i64, minors: &[u16]) -> SightingBatch {
    SightingBatch {
        gateway_identifier: gateway.to_string(),
        reported: None,
        timestamp_ms,
        sightings: minors
            .iter()
            .map(|minor| BeaconSighting {
                signature: BeaconSignature::new(UUID.to_ascii_lowercase(), 100, *minor),
                rssi: -65,
                battery_level: Some(80),
            })
            .collect(),
    }
}

#[tokio::test]
async fn unknown_and_inactive_devices_are_ignored() {
    let fixture = Fixture::new();
    fixture.gateway("gw-1", GatewayType::General).await;
    fixture
        .device("dev-off", 2, Binding::Elder("elder-1".to_string()), false)
        .await;

    let summary = fixture
        .processor()
        .process(batch("gw-1", T0, &[1, 2]))
        .await
        .unwrap();

    assert_eq!(summary.received, 2);
    assert_eq!(summary.ignored, 2);
    assert_eq!(summary.updated, 0);
    assert!(fixture.activities.is_empty());
    let inactive = fixture.devices.find_device("dev-off").await.unwrap().unwrap();
    assert_eq!(inactive.last_seen_ms, None);
}

#[tokio::test]
async fn elder_first_sighting_pushes_to_approved_line_members() {
    let fixture = Fixture::new();
    fixture.gateway("gw-1", GatewayType::General).await;
    fixture
        .device("dev-1", 1, Binding::Elder("elder-1".to_string()), true)
        .await;
    fixture.elder_with_tenant(Some("channel-token")).await;

    let summary = fixture
        .processor()
        .process(batch("gw-1", T0, &[1]))
        .await
        .unwrap();

    assert_eq!(summary.updated, 1);
    let sent = fixture.line.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].token, "channel-token");
    assert_eq!(sent[0].to, "U-approved");
    assert_eq!(sent[0].alt_text, "王奶奶 出現在 網關 gw-1");

    let activities = fixture.activities("dev-1").await;
    assert_eq!(activities.len(), 1);
    assert!(activities[0].triggered_notification);
    assert_eq!(activities[0].notification_type, Some(NotificationChannel::Line));
    assert_eq!(activities[0].latitude, 25.0330);
    assert_eq!(activities[0].details["delivered"], 1);
    assert_eq!(activities[0].details["cooldown"], "FIRST_ACTIVITY");
}

#[tokio::test]
async fn one_failed_line_recipient_does_not_block_the_others() {
    let fixture = Fixture::with_line(RecordingLine::failing_for(&["U-approved"]));
    fixture.gateway("gw-1", GatewayType::General).await;
    fixture
        .device("dev-1", 1, Binding::Elder("elder-1".to_string()), true)
        .await;
    fixture.elder_with_tenant(Some("channel-token")).await;
    fixture.approved_member("m-4", "U-second").await;

    let summary = fixture
        .processor()
        .process(batch("gw-1", T0, &[1]))
        .await
        .unwrap();

    assert_eq!(summary.updated, 1);
    assert_eq!(summary.failed, 0);
    let sent = fixture.line.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, "U-second");
    let activities = fixture.activities("dev-1").await;
    assert!(activities[0].triggered_notification);
    assert_eq!(activities[0].notification_type, Some(NotificationChannel::Line));
    assert_eq!(activities[0].details["recipients"], 2);
    assert_eq!(activities[0].details["delivered"], 1);
}

#[tokio::test]
async fn all_line_recipients_failing_is_send_failed() {
    let fixture = Fixture::with_line(RecordingLine::failing_for(&["U-approved", "U-second"]));
    fixture.gateway("gw-1", GatewayType::General).await;
    fixture
        .device("dev-1", 1, Binding::Elder("elder-1".to_string()), true)
        .await;
    fixture.elder_with_tenant(Some("channel-token")).await;
    fixture.approved_member("m-4", "U-second").await;

    let summary = fixture
        .processor()
        .process(batch("gw-1", T0, &[1]))
        .await
        .unwrap();

    assert_eq!(summary.updated, 1);
    assert!(fixture.line.sent().is_empty());
    let activities = fixture.activities("dev-1").await;
    assert!(!activities[0].triggered_notification);
    assert_eq!(activities[0].notification_type, None);
    assert_eq!(activities[0].details["reason"], "send_failed");
    assert_eq!(activities[0].details["recipients"], 2);
    assert_eq!(activities[0].details["delivered"], 0);
}

#[tokio::test]
async fn same_gateway_within_window_is_suppressed_but_recorded() {
    let fixture = Fixture::new();
    fixture.gateway("gw-1", GatewayType::General).await;
    fixture
        .device("dev-1", 1, Binding::Elder("elder-1".to_string()), true)
        .await;
    fixture.elder_with_tenant(Some("channel-token")).await;
    let processor = fixture.processor();

    processor.process(batch("gw-1", T0, &[1])).await.unwrap();
    let summary = processor
        .process(batch("gw-1", T0 + MINUTE, &[1]))
        .await
        .unwrap();

    assert_eq!(summary.updated, 1);
    assert_eq!(fixture.line.sent().len(), 1);
    let activities = fixture.activities("dev-1").await;
    assert_eq!(activities.len(), 2);
    let latest = &activities[0];
    assert_eq!(latest.timestamp_ms, T0 + MINUTE);
    assert!(!latest.triggered_notification);
    assert_eq!(latest.details["reason"], "cooldown");

    let device = fixture.devices.find_device("dev-1").await.unwrap().unwrap();
    assert_eq!(device.last_seen_ms, Some(T0 + MINUTE));
    assert_eq!(device.battery_level, Some(80));
}

#[tokio::test]
async fn cooldown_window_expiry_triggers_again() {
    let fixture = Fixture::new();
    fixture.gateway("gw-1", GatewayType::General).await;
    fixture
        .device("dev-1", 1, Binding::Elder("elder-1".to_string()), true)
        .await;
    fixture.elder_with_tenant(Some("channel-token")).await;
    let processor = fixture.processor();

    processor.process(batch("gw-1", T0, &[1])).await.unwrap();
    processor
        .process(batch("gw-1", T0 + 4 * MINUTE, &[1]))
        .await
        .unwrap();
    processor
        .process(batch("gw-1", T0 + 5 * MINUTE, &[1]))
        .await
        .unwrap();

    assert_eq!(fixture.line.sent().len(), 2);
}

#[tokio::test]
async fn moving_to_another_gateway_triggers_immediately() {
    let fixture = Fixture::new();
    fixture.gateway("gw-1", GatewayType::General).await;
    fixture.gateway("gw-2", GatewayType::General).await;
    fixture
        .device("dev-1", 1, Binding::Elder("elder-1".to_string()), true)
        .await;
    fixture.elder_with_tenant(Some("channel-token")).await;
    let processor = fixture.processor();

    processor.process(batch("gw-1", T0, &[1])).await.unwrap();
    processor.process(batch("gw-2", T0, &[1])).await.unwrap();

    let sent = fixture.line.sent();
    assert_eq!(sent.len(), 2);
    assert_eq!(sent[1].alt_text, "王奶奶 出現在 網關 gw-2");
}

#[tokio::test]
async fn boundary_alerts_are_debounced_per_gateway() {
    let fixture = Fixture::new();
    fixture.gateway("gw-edge", GatewayType::Boundary).await;
    fixture.gateway("gw-home", GatewayType::General).await;
    fixture
        .device("dev-1", 1, Binding::Elder("elder-1".to_string()), true)
        .await;
    fixture.elder_with_tenant(Some("channel-token")).await;
    let processor = fixture.processor();

    processor.process(batch("gw-edge", T0, &[1])).await.unwrap();
    processor
        .process(batch("gw-home", T0 + 10_000, &[1]))
        .await
        .unwrap();
    processor
        .process(batch("gw-edge", T0 + 20_000, &[1]))
        .await
        .unwrap();
    assert_eq!(fixture.alerts.all().len(), 1);

    processor
        .process(batch("gw-edge", T0 + 7 * MINUTE, &[1]))
        .await
        .unwrap();
    let alerts = fixture.alerts.all();
    assert_eq!(alerts.len(), 2);
    assert!(alerts.iter().all(|alert| alert.gateway_id == "gw-edge"));
    assert!(alerts[0].title.contains("王奶奶"));
    assert_eq!(alerts[0].details["beacon"]["major"], 100);
}

#[tokio::test]
async fn boundary_alert_is_created_without_line_credentials() {
    let fixture = Fixture::new();
    fixture.gateway("gw-edge", GatewayType::Boundary).await;
    fixture
        .device("dev-1", 1, Binding::Elder("elder-1".to_string()), true)
        .await;
    fixture.elder_with_tenant(None).await;

    fixture
        .processor()
        .process(batch("gw-edge", T0, &[1]))
        .await
        .unwrap();

    assert_eq!(fixture.alerts.all().len(), 1);
    assert!(fixture.line.sent().is_empty());
    let activities = fixture.activities("dev-1").await;
    assert!(!activities[0].triggered_notification);
    assert_eq!(activities[0].details["reason"], "line_not_configured");
    assert_eq!(activities[0].details["boundaryAlert"]["status"], "CREATED");
}

#[tokio::test]
async fn map_user_without_point_gets_no_push() {
    let fixture = Fixture::new();
    fixture.gateway("gw-1", GatewayType::SchoolZone).await;
    fixture
        .device("dev-1", 1, Binding::MapUser("user-1".to_string()), true)
        .await;
    fixture.map_user(true).await;

    fixture
        .processor()
        .process(batch("gw-1", T0, &[1]))
        .await
        .unwrap();

    assert!(fixture.push.sent().is_empty());
    let activities = fixture.activities("dev-1").await;
    assert_eq!(activities.len(), 1);
    assert!(!activities[0].triggered_notification);
    assert_eq!(activities[0].notification_point_id, None);
}

#[tokio::test]
async fn map_user_point_sends_fcm_push() {
    let fixture = Fixture::new();
    fixture.gateway("gw-1", GatewayType::SchoolZone).await;
    fixture
        .device("dev-1", 1, Binding::MapUser("user-1".to_string()), true)
        .await;
    fixture.map_user(true).await;
    fixture.point("gw-1").await;

    fixture
        .processor()
        .process(batch("gw-1", T0, &[1]))
        .await
        .unwrap();

    let sent = fixture.push.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].0, "fcm-token-1");
    assert_eq!(sent[0].1.body, "已到校");
    assert_eq!(sent[0].1.data.get("pointId").map(String::as_str), Some("point-1"));
    let activities = fixture.activities("dev-1").await;
    assert!(activities[0].triggered_notification);
    assert_eq!(activities[0].notification_type, Some(NotificationChannel::Fcm));
    assert_eq!(activities[0].notification_point_id.as_deref(), Some("point-1"));
}

#[tokio::test]
async fn failed_push_still_records_point() {
    let fixture = Fixture::with_push(RecordingPush::failing());
    fixture.gateway("gw-1", GatewayType::SchoolZone).await;
    fixture
        .device("dev-1", 1, Binding::MapUser("user-1".to_string()), true)
        .await;
    fixture.map_user(true).await;
    fixture.point("gw-1").await;

    let summary = fixture
        .processor()
        .process(batch("gw-1", T0, &[1]))
        .await
        .unwrap();

    assert_eq!(summary.updated, 1);
    assert_eq!(summary.failed, 0);
    let activities = fixture.activities("dev-1").await;
    assert!(!activities[0].triggered_notification);
    assert_eq!(activities[0].notification_type, None);
    assert_eq!(activities[0].notification_point_id.as_deref(), Some("point-1"));
    assert_eq!(activities[0].details["reason"], "send_failed");
}

#[tokio::test]
async fn disabled_map_user_is_not_pushed() {
    let fixture = Fixture::new();
    fixture.gateway("gw-1", GatewayType::SchoolZone).await;
    fixture
        .device("dev-1", 1, Binding::MapUser("user-1".to_string()), true)
        .await;
    fixture.map_user(false).await;
    fixture.point("gw-1").await;

    fixture
        .processor()
        .process(batch("gw-1", T0, &[1]))
        .await
        .unwrap();

    assert!(fixture.push.sent().is_empty());
    let activities = fixture.activities("dev-1").await;
    assert_eq!(activities[0].details["reason"], "notifications_disabled");
}

#[tokio::test]
async fn map_user_without_token_keeps_point() {
    let fixture = Fixture::new();
    fixture.gateway("gw-1", GatewayType::SchoolZone).await;
    fixture
        .device("dev-1", 1, Binding::MapUser("user-1".to_string()), true)
        .await;
    fixture.map_user_with_token(None, true).await;
    fixture.point("gw-1").await;

    fixture
        .processor()
        .process(batch("gw-1", T0, &[1]))
        .await
        .unwrap();

    assert!(fixture.push.sent().is_empty());
    let activities = fixture.activities("dev-1").await;
    assert!(!activities[0].triggered_notification);
    assert_eq!(activities[0].notification_point_id.as_deref(), Some("point-1"));
    assert_eq!(activities[0].details["reason"], "missing_token");
}

#[tokio::test]
async fn unbound_device_is_recorded_without_notification() {
    let fixture = Fixture::new();
    fixture.gateway("gw-1", GatewayType::General).await;
    fixture.device("dev-1", 1, Binding::Unbound, true).await;

    let summary = fixture
        .processor()
        .process(batch("gw-1", T0, &[1]))
        .await
        .unwrap();

    assert_eq!(summary.updated, 1);
    let activities = fixture.activities("dev-1").await;
    assert_eq!(activities[0].binding, Binding::Unbound);
    assert!(!activities[0].triggered_notification);
    assert!(fixture.line.sent().is_empty());
    assert!(fixture.push.sent().is_empty());
}

#[tokio::test]
async fn unknown_gateway_is_registered_once() {
    let fixture = Fixture::new();
    fixture.device("dev-1", 1, Binding::Unbound, true).await;
    let processor = fixture.processor();
    let mut first = batch("AA:BB:CC:DD:EE:FF", T0, &[1]);
    first.reported = Some(Coordinates::new(24.1477, 120.6736));

    processor.process(first.clone()).await.unwrap();
    processor.process(first).await.unwrap();

    assert_eq!(fixture.gateways.len(), 1);
    let gateway = fixture
        .gateways
        .find_gateway(&auto_gateway_id("AA:BB:CC:DD:EE:FF"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(gateway.gateway_type, GatewayType::Mobile);
    assert_eq!(gateway.mac_address.as_deref(), Some("AA:BB:CC:DD:EE:FF"));
    assert_eq!(gateway.latitude, Some(24.1477));

    let activities = fixture.activities("dev-1").await;
    assert_eq!(activities.len(), 2);
    assert_eq!(activities[0].longitude, 120.6736);
    assert_eq!(activities[0].details["locationSource"], "REPORTED");
}

#[tokio::test]
async fn retired_auto_registered_gateway_is_replaced() {
    let fixture = Fixture::new();
    let retired_id = auto_gateway_id("GW-DEAD");
    fixture
        .gateways
        .insert_gateway_if_absent(GatewayRecord {
            gateway_id: retired_id.clone(),
            serial_number: "GW-DEAD".to_string(),
            mac_address: None,
            imei: None,
            name: "停用邊界".to_string(),
            location: None,
            gateway_type: GatewayType::Boundary,
            latitude: Some(25.0),
            longitude: Some(121.0),
            tenant_id: Some("tenant-1".to_string()),
            is_active: false,
            created_at_ms: 0,
        })
        .await
        .unwrap();
    fixture
        .device("dev-1", 1, Binding::Elder("elder-1".to_string()), true)
        .await;
    fixture.elder_with_tenant(Some("channel-token")).await;
    let processor = fixture.processor();

    processor.process(batch("GW-DEAD", T0, &[1])).await.unwrap();
    processor
        .process(batch("GW-DEAD", T0 + 10 * MINUTE, &[1]))
        .await
        .unwrap();

    assert_eq!(fixture.gateways.len(), 2);
    let active = fixture
        .gateways
        .find_active_by_serial("GW-DEAD")
        .await
        .unwrap()
        .unwrap();
    assert_ne!(active.gateway_id, retired_id);
    assert_eq!(active.gateway_type, GatewayType::Mobile);
    let retired = fixture.gateways.find_gateway(&retired_id).await.unwrap().unwrap();
    assert!(!retired.is_active);
    assert_eq!(retired.gateway_type, GatewayType::Boundary);

    let activities = fixture.activities("dev-1").await;
    assert_eq!(activities.len(), 2);
    assert!(activities.iter().all(|activity| activity.gateway_id == active.gateway_id));
    assert!(fixture.alerts.all().is_empty());
}

#[tokio::test]
async fn sighting_failure_is_isolated_and_logged() {
    let fixture = Fixture::new();
    let error_logs = fixture.error_logs.clone();
    let stores = Stores {
        activities: Arc::new(FailingActivityStore),
        ..fixture.stores.clone()
    };
    fixture.gateway("gw-1", GatewayType::General).await;
    fixture.device("dev-1", 1, Binding::Unbound, true).await;
    let processor = BeaconProcessor::new(stores, Notifiers::noop(), PipelineConfig::default());

    let summary = processor
        .handle(batch("gw-1", T0, &[1, 9]))
        .await
        .unwrap();

    assert_eq!(summary.received, 2);
    assert_eq!(summary.failed, 1);
    assert_eq!(summary.ignored, 1);
    let logs = error_logs.list_error_logs(10).await.unwrap();
    assert_eq!(logs.len(), 1);
    assert!(logs[0].message.contains("activity table unavailable"));
    assert_eq!(logs[0].payload["beacon"]["minor"], 1);
}

#[tokio::test]
async fn mac_reported_batch_notifies_elder_over_line() {
    let fixture = Fixture::new();
    fixture
        .gateways
        .insert_gateway_if_absent(GatewayRecord {
            gateway_id: "gw-mac".to_string(),
            serial_number: "SN-MAC".to_string(),
            mac_address: Some("AA:BB:CC:DD:EE:FF".to_string()),
            imei: None,
            name: "社區大門".to_string(),
            location: None,
            gateway_type: GatewayType::General,
            latitude: None,
            longitude: None,
            tenant_id: Some("tenant-1".to_string()),
            is_active: true,
            created_at_ms: 0,
        })
        .await
        .unwrap();
    fixture
        .devices
        .create_device(DeviceRecord {
            device_id: "dev-x".to_string(),
            uuid: "X".to_string(),
            major: 1,
            minor: 1,
            is_active: true,
            binding: Binding::Elder("elder-1".to_string()),
            bound_at_ms: Some(0),
            last_seen_ms: None,
            last_rssi: None,
            battery_level: None,
        })
        .await
        .unwrap();
    fixture.elder_with_tenant(Some("channel-token")).await;

    let summary = fixture
        .processor()
        .process(SightingBatch {
            gateway_identifier: "AA:BB:CC:DD:EE:FF".to_string(),
            reported: Some(Coordinates::new(25.03, 121.56)),
            timestamp_ms: T0,
            sightings: vec![BeaconSighting {
                signature: BeaconSignature::new("X", 1, 1),
                rssi: -60,
                battery_level: None,
            }],
        })
        .await
        .unwrap();

    assert_eq!(summary.received, 1);
    assert_eq!(summary.updated, 1);
    assert_eq!(summary.ignored, 0);
    assert_eq!(fixture.gateways.len(), 1);
    assert_eq!(fixture.line.sent().len(), 1);
    let activities = fixture.activities("dev-x").await;
    assert_eq!(activities.len(), 1);
    assert!(activities[0].triggered_notification);
    assert_eq!(activities[0].notification_type, Some(NotificationChannel::Line));
    assert_eq!(activities[0].gateway_id, "gw-mac");
    assert_eq!(activities[0].latitude, 25.03);
}
