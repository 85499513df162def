//! 有效坐标的选取。

use beacon_storage::GatewayRecord;
use beacon_telemetry::record_location_fallback;
use domain::{Coordinates, GatewayType};
use tracing::warn;

/// 坐标来源。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocationSource {
    /// 网关随批次上报的 GPS。
    Reported,
    /// 网关配置的固定坐标。
    Gateway,
    /// 两者都没有，降级为 (0,0)。
    Fallback,
}

impl LocationSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Reported => "REPORTED",
            Self::Gateway => "GATEWAY",
            Self::Fallback => "FALLBACK",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedLocation {
    pub coordinates: Coordinates,
    pub source: LocationSource,
}

/// 行动网关优先用上报坐标；其他网关优先用自身配置坐标。
pub fn resolve_location(
    gateway: &GatewayRecord,
    reported: Option<Coordinates>,
) -> ResolvedLocation {
    if gateway.gateway_type == GatewayType::Mobile {
        if let Some(coordinates) = reported {
            return ResolvedLocation {
                coordinates,
                source: LocationSource::Reported,
            };
        }
    }
    if let Some(coordinates) = gateway.coordinates() {
        return ResolvedLocation {
            coordinates,
            source: LocationSource::Gateway,
        };
    }
    if let Some(coordinates) = reported {
        return ResolvedLocation {
            coordinates,
            source: LocationSource::Reported,
        };
    }
    record_location_fallback();
    warn!(
        target: "beacon.pipeline",
        gateway_id = %gateway.gateway_id,
        "location_fallback_origin"
    );
    ResolvedLocation {
        coordinates: Coordinates::origin(),
        source: LocationSource::Fallback,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gateway(gateway_type: GatewayType, coordinates: Option<(f64, f64)>) -> GatewayRecord {
        GatewayRecord {
            gateway_id: "gw-1".to_string(),
            serial_number: "SN".to_string(),
            mac_address: None,
            imei: None,
            name: "gw".to_string(),
            location: None,
            gateway_type,
            latitude: coordinates.map(|c| c.0),
            longitude: coordinates.map(|c| c.1),
            tenant_id: None,
            is_active: true,
            created_at_ms: 0,
        }
    }

    #[test]
    fn mobile_gateway_prefers_reported() {
        let reported = Coordinates::new(24.0, 120.0);
        let resolved = resolve_location(
            &gateway(GatewayType::Mobile, Some((25.0, 121.0))),
            Some(reported),
        );
        assert_eq!(resolved.coordinates, reported);
        assert_eq!(resolved.source, LocationSource::Reported);
    }

    #[test]
    fn fixed_gateway_prefers_stored() {
        let resolved = resolve_location(
            &gateway(GatewayType::General, Some((25.0, 121.0))),
            Some(Coordinates::new(24.0, 120.0)),
        );
        assert_eq!(resolved.coordinates, Coordinates::new(25.0, 121.0));
        assert_eq!(resolved.source, LocationSource::Gateway);
    }

    #[test]
    fn fixed_gateway_without_coordinates_uses_reported() {
        let resolved = resolve_location(
            &gateway(GatewayType::Boundary, None),
            Some(Coordinates::new(24.0, 120.0)),
        );
        assert_eq!(resolved.source, LocationSource::Reported);
    }

    #[test]
    fn nothing_known_falls_back_to_origin() {
        let resolved = resolve_location(&gateway(GatewayType::Mobile, None), None);
        assert_eq!(resolved.coordinates, Coordinates::origin());
        assert_eq!(resolved.source, LocationSource::Fallback);
    }
}
