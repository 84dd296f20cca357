//! Build script for klcd-bridge
//!
//! Validates the embedded default bridge.toml at compile time

use std::fs;
use std::path::Path;

include!("src/config/limits.rs");

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-changed=src/config/limits.rs");
    validate_config();
}

/// Validate bridge.toml at compile time
fn validate_config() {
    println!("cargo:rerun-if-changed=bridge.toml");

    let config_path = Path::new("bridge.toml");

    let config_content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) => {
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Failed to read bridge.toml                               ║\n\
                ║                                                                  ║\n\
                ║  The bridge embeds bridge.toml as its default configuration.     ║\n\
                ║  Error: {:<56} ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                e
            );
        }
    };

    let config: toml::Table = match toml::from_str(&config_content) {
        Ok(table) => table,
        Err(e) => {
            let error_msg = e.to_string();
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Invalid TOML syntax in bridge.toml                       ║\n\
                ╠══════════════════════════════════════════════════════════════════╣\n\
                {}\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                format_error_lines(&error_msg)
            );
        }
    };

    let mut errors = Vec::new();
    validate_serial(&config, &mut errors);
    validate_printer(&config, &mut errors);
    validate_poll(&config, &mut errors);
    validate_safety(&config, &mut errors);
    validate_presets(&config, &mut errors);

    if !errors.is_empty() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: Invalid configuration in bridge.toml                     ║\n\
            ╠══════════════════════════════════════════════════════════════════╣\n\
            {}\n\
            ╚══════════════════════════════════════════════════════════════════╝\n",
            errors
                .iter()
                .map(|e| format!("║  • {:<62} ║", e))
                .collect::<Vec<_>>()
                .join("\n")
        );
    }
}

/// Format error message lines with box drawing
fn format_error_lines(msg: &str) -> String {
    msg.lines()
        .map(|line| {
            let truncated = if line.chars().count() > 64 {
                format!("{}...", line.chars().take(61).collect::<String>())
            } else {
                line.to_string()
            };
            format!("║  {:<64} ║", truncated)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Section as a table, recording an error if it has another type
fn section<'a>(
    config: &'a toml::Table,
    name: &str,
    errors: &mut Vec<String>,
) -> Option<&'a toml::Table> {
    match config.get(name) {
        Some(toml::Value::Table(t)) => Some(t),
        Some(_) => {
            errors.push(format!("[{}] must be a table", name));
            None
        }
        None => None,
    }
}

fn validate_serial(config: &toml::Table, errors: &mut Vec<String>) {
    let Some(serial) = section(config, "serial", errors) else {
        return;
    };

    match serial.get("port") {
        Some(toml::Value::String(port)) if port.is_empty() => {
            errors.push("[serial] port must not be empty".to_string());
        }
        Some(toml::Value::String(_)) | None => {}
        Some(_) => errors.push("[serial] port must be a string".to_string()),
    }

    match serial.get("baud") {
        Some(toml::Value::Integer(baud)) if !supported_baud(*baud) => {
            errors.push(format!("[serial] baud {} is not supported", baud));
        }
        Some(toml::Value::Integer(_)) | None => {}
        Some(_) => errors.push("[serial] baud must be an integer".to_string()),
    }
}

fn supported_baud(baud: i64) -> bool {
    u32::try_from(baud).is_ok_and(|b| SUPPORTED_BAUDS.contains(&b))
}

fn validate_printer(config: &toml::Table, errors: &mut Vec<String>) {
    let Some(printer) = section(config, "printer", errors) else {
        return;
    };

    match printer.get("url") {
        Some(toml::Value::String(url)) if !url.starts_with(PRINTER_URL_SCHEME) => {
            errors.push(format!("[printer] url must start with {}", PRINTER_URL_SCHEME));
        }
        Some(toml::Value::String(_)) | None => {}
        Some(_) => errors.push("[printer] url must be a string".to_string()),
    }

    if let Some(timeout) = printer.get("timeout_ms") {
        if !matches!(timeout, toml::Value::Integer(t) if *t > 0) {
            errors.push("[printer] timeout_ms must be a positive integer".to_string());
        }
    }
}

fn validate_poll(config: &toml::Table, errors: &mut Vec<String>) {
    let Some(poll) = section(config, "poll", errors) else {
        return;
    };

    if let Some(interval) = poll.get("interval_ms") {
        if !matches!(interval, toml::Value::Integer(i) if *i > 0) {
            errors.push("[poll] interval_ms must be a positive integer".to_string());
        }
    }
}

fn validate_safety(config: &toml::Table, errors: &mut Vec<String>) {
    let Some(safety) = section(config, "safety", errors) else {
        return;
    };

    let bound = |key: &str, errors: &mut Vec<String>| match safety.get(key) {
        Some(toml::Value::Float(v)) => Some(*v),
        Some(toml::Value::Integer(v)) => Some(*v as f64),
        Some(_) => {
            errors.push(format!("[safety] {} must be a number", key));
            None
        }
        None => None,
    };

    let min = bound("hotend_min", errors);
    let max = bound("hotend_max", errors);
    if let (Some(min), Some(max)) = (min, max) {
        if min >= max {
            errors.push("[safety] hotend_min must be below hotend_max".to_string());
        }
    }
}

fn validate_presets(config: &toml::Table, errors: &mut Vec<String>) {
    let Some(presets) = section(config, "presets", errors) else {
        return;
    };

    for (name, preset) in presets {
        if name != "pla" && name != "abs" {
            errors.push(format!("[presets.{}] unknown preset, expected pla or abs", name));
            continue;
        }
        let toml::Value::Table(preset) = preset else {
            errors.push(format!("[presets.{}] must be a table", name));
            continue;
        };
        for key in ["hotend", "bed"] {
            match preset.get(key) {
                Some(toml::Value::Integer(t)) if (0..=i64::from(MAX_PRESET_C)).contains(t) => {}
                Some(_) => errors.push(format!(
                    "[presets.{}] {} must be 0-{}",
                    name, key, MAX_PRESET_C
                )),
                None => errors.push(format!("[presets.{}] missing '{}'", name, key)),
            }
        }
    }
}
