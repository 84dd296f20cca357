//! Moonraker HTTP client
//!
//! Implements [`PrinterClient`] against the Moonraker API of a Klipper
//! host. Every call is a blocking request on a shared `ureq` agent.

use std::time::Duration;

use log::{trace, warn};
use serde::Deserialize;
use serde_json::json;

use klcd_core::state::{PrintState, PrinterSnapshot};
use klcd_core::traits::{PrinterClient, PrinterError};
use klcd_protocol::{Axis, AxisMove};

/// Printer objects requested for each snapshot
const SNAPSHOT_QUERY: &str =
    "extruder&heater_bed&fan&print_stats&virtual_sdcard&gcode_move&toolhead";

/// Moonraker wraps every successful response in `{"result": ...}`
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    result: T,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

#[derive(Debug, Deserialize)]
struct QueryResult {
    status: ObjectStatus,
}

/// Printer objects from `/printer/objects/query`
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ObjectStatus {
    extruder: HeaterStatus,
    heater_bed: HeaterStatus,
    fan: FanStatus,
    print_stats: PrintStats,
    virtual_sdcard: VirtualSdcard,
    gcode_move: GcodeMove,
    toolhead: Toolhead,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct HeaterStatus {
    temperature: Option<f32>,
    target: Option<f32>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FanStatus {
    /// 0.0 to 1.0
    speed: Option<f32>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct PrintStats {
    state: Option<String>,
    filename: Option<String>,
    print_duration: Option<f32>,
    total_duration: Option<f32>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct VirtualSdcard {
    /// 0.0 to 1.0
    progress: Option<f32>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct GcodeMove {
    speed_factor: Option<f32>,
    extrude_factor: Option<f32>,
    homing_origin: Vec<f32>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Toolhead {
    position: Vec<f32>,
    max_velocity: Option<f32>,
    max_accel: Option<f32>,
    minimum_cruise_ratio: Option<f32>,
    square_corner_velocity: Option<f32>,
}

/// Entry of `/server/files/list`
#[derive(Debug, Deserialize)]
struct FileEntry {
    #[serde(alias = "filename")]
    path: String,
}

fn percent(fraction: Option<f32>) -> Option<f32> {
    fraction.map(|f| f * 100.0)
}

impl ObjectStatus {
    fn into_snapshot(self) -> PrinterSnapshot {
        let state = match self.print_stats.state.as_deref() {
            Some(name) => name.parse().unwrap_or_else(|_| {
                warn!("Unknown printer state {:?}, treating as standby", name);
                PrintState::Standby
            }),
            None => PrintState::Standby,
        };

        let progress = self.virtual_sdcard.progress;
        let print_duration = self.print_stats.print_duration;
        let remaining = match (progress, print_duration) {
            (Some(p), Some(elapsed)) if p > 0.0 => Some(elapsed / p - elapsed),
            _ => None,
        };
        let position = &self.toolhead.position;

        PrinterSnapshot {
            hotend: self.extruder.temperature,
            hotend_target: self.extruder.target,
            bed: self.heater_bed.temperature,
            bed_target: self.heater_bed.target,
            fan: percent(self.fan.speed),
            state,
            progress: percent(progress),
            print_duration,
            total_duration: self.print_stats.total_duration,
            remaining,
            feed_rate: percent(self.gcode_move.speed_factor),
            flow_rate: percent(self.gcode_move.extrude_factor),
            x: position.first().copied(),
            y: position.get(1).copied(),
            z: position.get(2).copied(),
            z_offset: self.gcode_move.homing_origin.get(2).copied(),
            max_velocity: self.toolhead.max_velocity,
            max_accel: self.toolhead.max_accel,
            minimum_cruise_ratio: self.toolhead.minimum_cruise_ratio,
            square_corner_velocity: self.toolhead.square_corner_velocity,
            file_name: self.print_stats.filename.filter(|name| !name.is_empty()),
        }
    }
}

/// Parse a `/printer/objects/query` response body
fn parse_snapshot(body: &str) -> Result<PrinterSnapshot, PrinterError> {
    let envelope: Envelope<QueryResult> =
        serde_json::from_str(body).map_err(|_| PrinterError::InvalidResponse)?;
    Ok(envelope.result.status.into_snapshot())
}

/// Parse a `/server/files/list` response body
fn parse_file_list(body: &str) -> Result<Vec<String>, PrinterError> {
    let envelope: Envelope<Vec<FileEntry>> =
        serde_json::from_str(body).map_err(|_| PrinterError::InvalidResponse)?;
    Ok(envelope.result.into_iter().map(|entry| entry.path).collect())
}

/// Map an HTTP failure onto the printer error taxonomy
fn map_error(err: ureq::Error) -> PrinterError {
    match err {
        ureq::Error::Status(code, response) => match response.into_json::<ErrorEnvelope>() {
            Ok(body) => PrinterError::Rejected(body.error.message),
            Err(_) => PrinterError::Status(code),
        },
        ureq::Error::Transport(transport) => {
            trace!("Transport error: {}", transport);
            PrinterError::Unreachable
        }
    }
}

/// G-code for a fan speed percentage (M106 takes 0-255)
fn fan_gcode(percent: u32) -> String {
    format!("M106 S{}", percent.min(100) * 255 / 100)
}

fn home_gcode(axis: Option<Axis>) -> String {
    match axis {
        Some(axis) => format!("G28 {}", axis.letter()),
        None => String::from("G28"),
    }
}

/// Relative jog, restoring absolute positioning afterwards
fn move_gcode(movement: AxisMove) -> String {
    format!(
        "G91\nG1 {}{} F{}\nG90",
        movement.axis.letter(),
        movement.distance,
        movement.feed
    )
}

/// Blocking Moonraker client
#[derive(Clone)]
pub struct MoonrakerClient {
    agent: ureq::Agent,
    base_url: String,
}

impl MoonrakerClient {
    /// Create a client for the API at `base_url`
    pub fn new(base_url: &str, timeout: Duration) -> Self {
        let agent = ureq::AgentBuilder::new().timeout(timeout).build();
        Self {
            agent,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn get_text(&self, path: &str) -> Result<String, PrinterError> {
        let response = self.agent.get(&self.url(path)).call().map_err(map_error)?;
        response
            .into_string()
            .map_err(|_| PrinterError::InvalidResponse)
    }

    fn post(&self, path: &str, body: serde_json::Value) -> Result<(), PrinterError> {
        trace!("POST {} {}", path, body);
        self.agent
            .post(&self.url(path))
            .send_json(body)
            .map_err(map_error)?;
        Ok(())
    }

    fn gcode(&self, script: &str) -> Result<(), PrinterError> {
        self.post("/printer/gcode/script", json!({ "script": script }))
    }
}

impl PrinterClient for MoonrakerClient {
    fn snapshot(&mut self) -> Result<PrinterSnapshot, PrinterError> {
        let body = self.get_text(&format!("/printer/objects/query?{}", SNAPSHOT_QUERY))?;
        parse_snapshot(&body)
    }

    fn file_list(&mut self) -> Result<Vec<String>, PrinterError> {
        let body = self.get_text("/server/files/list?root=gcodes")?;
        parse_file_list(&body)
    }

    fn set_hotend_target(&mut self, celsius: u32) -> Result<(), PrinterError> {
        self.gcode(&format!("M104 S{}", celsius))
    }

    fn set_bed_target(&mut self, celsius: u32) -> Result<(), PrinterError> {
        self.gcode(&format!("M140 S{}", celsius))
    }

    fn set_fan_speed(&mut self, percent: u32) -> Result<(), PrinterError> {
        self.gcode(&fan_gcode(percent))
    }

    fn set_feed_rate(&mut self, percent: u32) -> Result<(), PrinterError> {
        self.gcode(&format!("M220 S{}", percent))
    }

    fn home(&mut self, axis: Option<Axis>) -> Result<(), PrinterError> {
        self.gcode(&home_gcode(axis))
    }

    fn move_relative(&mut self, movement: AxisMove) -> Result<(), PrinterError> {
        self.gcode(&move_gcode(movement))
    }

    fn disable_motors(&mut self) -> Result<(), PrinterError> {
        self.gcode("M18")
    }

    fn start_print(&mut self, path: &str) -> Result<(), PrinterError> {
        self.post("/printer/print/start", json!({ "filename": path }))
    }

    fn pause(&mut self) -> Result<(), PrinterError> {
        self.post("/printer/print/pause", json!({}))
    }

    fn resume(&mut self) -> Result<(), PrinterError> {
        self.post("/printer/print/resume", json!({}))
    }

    fn cancel(&mut self) -> Result<(), PrinterError> {
        self.post("/printer/print/cancel", json!({}))
    }
}
