//! Data types sent to clients over WebSocket and HTTP.
//! Keep this module minimal and stable; it defines the wire format.

use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct CpuStats {
    pub brand: String,
    pub cores: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub physical_cores: Option<usize>,
    pub frequency_mhz: u64,
    /// Global load, 0..100.
    pub usage: f32,
    pub core_loads: Vec<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

#[derive(Debug, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct GpuStats {
    pub model: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub memory_used_bytes: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub memory_total_bytes: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

#[derive(Debug, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct MemoryStats {
    pub total: u64,
    /// total - available; what the OS could not hand out right now.
    pub used: u64,
    pub free: u64,
    pub active: u64,
    pub available: u64,
    pub usage_percent: f64,
}

#[derive(Debug, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct DiskStats {
    pub fs: String,
    pub mount: String,
    pub size: u64,
    pub used: u64,
    pub available: u64,
    pub usage_percent: f64,
}

#[derive(Debug, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct InterfaceStats {
    pub name: String,
    pub rx_bytes_per_sec: u64,
    pub tx_bytes_per_sec: u64,
    // cumulative totals since the interface counters started
    pub rx_total: u64,
    pub tx_total: u64,
}

#[derive(Debug, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct NetworkStats {
    pub download_bytes_per_sec: u64,
    pub upload_bytes_per_sec: u64,
    pub interfaces: Vec<InterfaceStats>,
}

#[derive(Debug, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct OsStats {
    pub platform: String,
    pub distro: String,
    pub hostname: String,
}

/// One point-in-time reading of host metrics.
#[derive(Debug, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub timestamp: DateTime<Utc>,
    pub cpu: CpuStats,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gpu: Option<GpuStats>,
    pub memory: MemoryStats,
    pub disk: Vec<DiskStats>,
    pub network: NetworkStats,
    pub os: OsStats,
}

/// Payload shared by `monitoringData` and `monitoringComplete`.
#[derive(Debug, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct MonitoringReport {
    pub data: Vec<Snapshot>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_time: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time: Option<i64>,
    pub data_points: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_monitoring: Option<bool>,
}

/// Server-to-client frames. Serialized as `{"event": ..., "data": ...}`.
#[derive(Debug, Serialize, Clone)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum ServerEvent {
    SystemInfo(Snapshot),
    #[serde(rename_all = "camelCase")]
    SystemError { message: String },
    #[serde(rename_all = "camelCase")]
    MonitoringStarted { start_time: i64 },
    MonitoringData(MonitoringReport),
    MonitoringComplete(MonitoringReport),
}

/// Client-to-server commands, sent as bare text frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientCommand {
    StartMonitoring,
    StopMonitoring,
    GetMonitoringData,
}

impl ClientCommand {
    pub fn parse(text: &str) -> Option<Self> {
        match text.trim() {
            "startMonitoring" => Some(Self::StartMonitoring),
            "stopMonitoring" => Some(Self::StopMonitoring),
            "getMonitoringData" => Some(Self::GetMonitoringData),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn to_value(event: &ServerEvent) -> Value {
        serde_json::to_value(event).unwrap()
    }

    #[test]
    fn system_error_frame_shape() {
        let v = to_value(&ServerEvent::SystemError {
            message: "boom".into(),
        });
        assert_eq!(v["event"], "systemError");
        assert_eq!(v["data"], json!({ "message": "boom" }));
    }

    #[test]
    fn monitoring_started_frame_shape() {
        let v = to_value(&ServerEvent::MonitoringStarted {
            start_time: 1_700_000_000_000,
        });
        assert_eq!(v["event"], "monitoringStarted");
        assert_eq!(v["data"]["startTime"], 1_700_000_000_000_i64);
    }

    #[test]
    fn monitoring_report_uses_camel_case_and_omits_empty_fields() {
        let report = MonitoringReport {
            data: vec![],
            start_time: Some(10),
            end_time: None,
            data_points: 0,
            is_monitoring: None,
        };
        let v = to_value(&ServerEvent::MonitoringData(report));
        assert_eq!(v["event"], "monitoringData");
        let data = v["data"].as_object().unwrap();
        assert_eq!(data["startTime"], 10);
        assert_eq!(data["dataPoints"], 0);
        assert!(!data.contains_key("endTime"));
        assert!(!data.contains_key("isMonitoring"));

        let report = MonitoringReport {
            data: vec![],
            start_time: Some(10),
            end_time: Some(20),
            data_points: 0,
            is_monitoring: Some(true),
        };
        let v = to_value(&ServerEvent::MonitoringComplete(report));
        assert_eq!(v["event"], "monitoringComplete");
        assert_eq!(v["data"]["endTime"], 20);
        assert_eq!(v["data"]["isMonitoring"], true);
    }

    #[test]
    fn command_parse() {
        assert_eq!(
            ClientCommand::parse("startMonitoring"),
            Some(ClientCommand::StartMonitoring)
        );
        assert_eq!(
            ClientCommand::parse(" stopMonitoring\n"),
            Some(ClientCommand::StopMonitoring)
        );
        assert_eq!(
            ClientCommand::parse("getMonitoringData"),
            Some(ClientCommand::GetMonitoringData)
        );
        assert_eq!(ClientCommand::parse("get_metrics"), None);
        assert_eq!(ClientCommand::parse(""), None);
    }
}
