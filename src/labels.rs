// ABOUTME: Label keys for the health-check subsystem.
// ABOUTME: Both labels carry JSON payloads on the container's label map.

/// Label holding the JSON-encoded probe specification.
///
/// Written once at container creation, immutable afterwards.
pub const HEALTH_CONFIG_LABEL: &str = "healthcheck/config";

/// Label holding the JSON-encoded health record.
///
/// Created lazily on the first probe and rewritten after every probe.
pub const HEALTH_STATUS_LABEL: &str = "healthcheck/status";
