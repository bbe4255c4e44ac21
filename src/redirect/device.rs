//! 设备识别
//!
//! 根据 User-Agent 判断访问设备类型

use serde::{Deserialize, Serialize};

const IOS_MARKERS: [&str; 3] = ["ipad", "iphone", "ipod"];
const ANDROID_MARKER: &str = "android";

/// 设备类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceClass {
    Ios,
    Android,
    Other,
}

/// 识别 User-Agent 对应的设备类型
///
/// iOS 判断优先于 Android。
pub fn classify(user_agent: &str) -> DeviceClass {
    let ua = user_agent.to_ascii_lowercase();
    if IOS_MARKERS.iter().any(|marker| ua.contains(marker)) {
        DeviceClass::Ios
    } else if ua.contains(ANDROID_MARKER) {
        DeviceClass::Android
    } else {
        DeviceClass::Other
    }
}
