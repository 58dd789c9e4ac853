#[cfg(target_os = "espidf")]
mod firmware {
    use embassy_time::Timer;
    use esp_idf_svc::hal::gpio::PinDriver;
    use esp_idf_svc::hal::prelude::Peripherals;
    use esp_idf_svc::hal::task::watchdog::{TWDTConfig, TWDTDriver};
    use esp_idf_svc::nvs::EspDefaultNvsPartition;
    use log::{error, info, warn};
    use scale_bridge::{
        bridge::Bridge,
        device_name::{advertised_name, mac_tag, DeviceName, VERSION},
        hardware::RgbIndicator,
        platform::{self, NvsNameStore, TaskWatchdog, UartScaleLink},
        system::EventChannel,
        traits::{NameStore, Watchdog},
        types::RestartReason,
    };
    use std::sync::Arc;

    pub async fn run() -> anyhow::Result<RestartReason> {
        let peripherals = Peripherals::take()?;
        let pins = peripherals.pins;

        let mut names = NvsNameStore::new(EspDefaultNvsPartition::take()?)?;
        let config = names.load_config();
        let name = match names.load_name() {
            Ok(Some(name)) => name,
            Ok(None) => DeviceName::default(),
            Err(e) => {
                warn!("Failed to load device name: {} - using default", e);
                DeviceName::default()
            }
        };

        info!("Configuring WDT ({}s)", config.watchdog_timeout_s);
        let twdt_config = TWDTConfig {
            duration: core::time::Duration::from_secs(config.watchdog_timeout_s),
            panic_on_trigger: true,
            ..Default::default()
        };
        let mut twdt = TWDTDriver::new(peripherals.twdt, &twdt_config)?;
        let mut watchdog = TaskWatchdog::new(twdt.watch_current_task()?);

        let events = Arc::new(EventChannel::new());
        let advertised = advertised_name(&name, mac_tag(&platform::station_mac()), &VERSION);
        let notifier = platform::ble::start(&advertised, events.clone())?;
        watchdog.feed();

        let indicator = RgbIndicator::new(
            PinDriver::output(pins.gpio13)?,
            PinDriver::output(pins.gpio14)?,
            PinDriver::output(pins.gpio12)?,
        );

        info!("Initializing the scale...");
        Timer::after(config.serial_settle()).await;
        watchdog.feed();

        let scale = match UartScaleLink::open(peripherals.uart2, pins.gpio19, pins.gpio21) {
            Ok(scale) => scale,
            Err(e) => {
                error!("Could not establish serial connection: {}", e);
                return Ok(RestartReason::SerialInitFailed);
            }
        };

        let mut bridge = Bridge::new(scale, notifier, indicator, names, events, config);
        Ok(bridge.run(&mut watchdog).await)
    }
}

#[cfg(target_os = "espidf")]
#[embassy_executor::main]
async fn main(_spawner: embassy_executor::Spawner) {
    // It is necessary to call this function once. Otherwise some patches to the runtime
    // implemented by esp-idf-sys might not link properly. See https://github.com/esp-rs/esp-idf-template/issues/71
    esp_idf_svc::sys::link_patches();

    // Bind the log crate to the ESP Logging facilities
    esp_idf_svc::log::EspLogger::initialize_default();

    log::info!("Booting scale bridge, software version {}", scale_bridge::device_name::VERSION);

    match firmware::run().await {
        Ok(reason) => log::warn!("Bridge stopped: {:?}", reason),
        Err(e) => log::error!("Bridge setup failed: {:?}", e),
    }

    scale_bridge::platform::restart();
}

#[cfg(not(target_os = "espidf"))]
fn main() {
    println!("scale-bridge is ESP32 firmware; build it for an espidf target.");
}
