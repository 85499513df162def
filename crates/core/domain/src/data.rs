/// 信标身份三元组。
///
/// 信标 MAC 会随机变化，不可信；身份只由 (uuid, major, minor) 决定。
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BeaconSignature {
    pub uuid: String,
    pub major: u16,
    pub minor: u16,
}

impl BeaconSignature {
    pub fn new(uuid: impl Into<String>, major: u16, minor: u16) -> Self {
        Self {
            uuid: uuid.into(),
            major,
            minor,
        }
    }
}

impl std::fmt::Display for BeaconSignature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}:{}", self.uuid, self.major, self.minor)
    }
}

/// 单次信标目击（不落库，处理后即丢弃）。
#[derive(Debug, Clone)]
pub struct BeaconSighting {
    pub signature: BeaconSignature,
    pub rssi: i32,
    pub battery_level: Option<u8>,
}

/// 经纬度坐标。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// 无可用坐标时的降级值。
    pub fn origin() -> Self {
        Self::new(0.0, 0.0)
    }
}

/// 网关一次上报的信标批次（已校验）。
#[derive(Debug, Clone)]
pub struct SightingBatch {
    pub gateway_identifier: String,
    pub reported: Option<Coordinates>,
    pub timestamp_ms: i64,
    pub sightings: Vec<BeaconSighting>,
}
