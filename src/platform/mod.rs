//! ESP-IDF adapters for the bridge traits.

pub mod ble;
pub mod nvs;
pub mod uart;
pub mod watchdog;

pub use ble::BleNotifier;
pub use nvs::NvsNameStore;
pub use uart::UartScaleLink;
pub use watchdog::TaskWatchdog;

use esp_idf_svc::sys::{esp_mac_type_t_ESP_MAC_WIFI_STA, esp_read_mac, ESP_OK};
use log::{error, warn};

/// Station MAC address, the one the advertised name tag is taken from.
pub fn station_mac() -> [u8; 6] {
    let mut mac = [0u8; 6];
    let result = unsafe { esp_read_mac(mac.as_mut_ptr(), esp_mac_type_t_ESP_MAC_WIFI_STA) };
    if result != ESP_OK {
        warn!("Failed to read station MAC: {}", result);
    }
    mac
}

/// Full chip reset. Does not return.
pub fn restart() -> ! {
    error!("Resetting ESP");
    esp_idf_svc::hal::reset::restart()
}
