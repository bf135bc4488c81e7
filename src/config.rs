// src/config.rs
//! 编译期常量。改端口或波特率需要改这里再重新编译。
use std::time::Duration;

/// Arduino 所在串口 (Linux 下通常是 /dev/ttyUSB0 或 /dev/ttyACM0)
pub const SERIAL_PORT: &str = "COM3";
pub const BAUD_RATE: u32 = 9600;

pub const READ_TIMEOUT: Duration = Duration::from_secs(1);
/// 打开串口后 Arduino 会复位，等它启动完
pub const SETTLE_DELAY: Duration = Duration::from_secs(2);

pub const TICK_INTERVAL: Duration = Duration::from_millis(100);

/// Number of points kept on the live graph at once.
pub const MAX_POINTS: usize = 50;

/// HC-SR04 的量程上限约 400cm
pub const MAX_DISTANCE_CM: i32 = 400;

/// Fixed y range of the live graph. Readings above the top are drawn off-scale.
pub const Y_AXIS_MIN: f64 = 0.0;
pub const Y_AXIS_MAX: f64 = 50.0;

pub const FILE_PREFIX: &str = "ultrasonic_data_";
