// Configuration limits shared by the loader and the build script.
// build.rs pulls this file in with include!, so it holds plain constants only.

/// Baud rates the serial port can be opened with
pub const SUPPORTED_BAUDS: &[u32] = &[9600, 19200, 38400, 57600, 115200, 230400, 460800, 921600];

/// Only plain HTTP is supported for the printer host
pub const PRINTER_URL_SCHEME: &str = "http://";

/// Highest preset target (°C)
pub const MAX_PRESET_C: u32 = 400;
