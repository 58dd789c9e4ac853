//! GATT server the phone app talks to.
//!
//! Callbacks run on the NimBLE host task and only post events; the bridge
//! loop does the actual work.

use crate::error::BridgeError;
use crate::protocol::{
    COMMAND2_CHAR_UUID, COMMAND_CHAR_UUID, DEVICE_NAME_CHAR_UUID, LEGACY_NOTIFY_CHAR_UUID,
    PREFERRED_CONN_INTERVAL_MAX, PREFERRED_CONN_INTERVAL_MIN, PREFERRED_SUPERVISION_TIMEOUT,
    SERVICE_UUID, WEIGHT_CHAR_UUID,
};
use crate::system::{post_event, BridgeEvent, EventChannel};
use crate::traits::WeightNotifier;
use esp32_nimble::{
    enums::{PowerLevel, PowerType},
    utilities::{mutex::Mutex, BleUuid},
    BLEAdvertisementData, BLECharacteristic, BLEDevice, NimbleProperties,
};
use log::{info, warn};
use std::sync::Arc;
use uuid::Uuid;

fn ble_uuid(uuid: Uuid) -> BleUuid {
    // NimBLE stores 128-bit UUIDs little endian
    let mut bytes = *uuid.as_bytes();
    bytes.reverse();
    BleUuid::from_uuid128(bytes)
}

fn ble_err(context: &str, e: impl std::fmt::Debug) -> BridgeError {
    BridgeError::BleError(format!("{}: {:?}", context, e))
}

/// Notifies weight records on the TX characteristic.
pub struct BleNotifier {
    weight: Arc<Mutex<BLECharacteristic>>,
    // Kept alive for older apps that subscribe to it; never written
    _legacy: Arc<Mutex<BLECharacteristic>>,
}

impl WeightNotifier for BleNotifier {
    fn notify(&mut self, payload: &[u8]) -> Result<(), BridgeError> {
        self.weight.lock().set_value(payload).notify();
        Ok(())
    }
}

/// Bring up the GATT service and start advertising under `advertised_name`.
pub fn start(advertised_name: &str, events: Arc<EventChannel>) -> Result<BleNotifier, BridgeError> {
    info!("Starting BLE device as '{}'", advertised_name);

    let device = BLEDevice::take();
    BLEDevice::set_device_name(advertised_name).map_err(|e| ble_err("set name", e))?;
    for power_type in [PowerType::Default, PowerType::Advertising, PowerType::Scan] {
        if let Err(e) = device.set_power(power_type, PowerLevel::P9) {
            warn!("Failed to set TX power: {:?}", e);
        }
    }

    let server = device.get_server();
    {
        let events = events.clone();
        server.on_connect(move |server, desc| {
            info!("BLE client connected: {:?}", desc.address());
            post_event(&events, BridgeEvent::Connected);
            if let Err(e) = server.update_conn_params(
                desc.conn_handle(),
                PREFERRED_CONN_INTERVAL_MIN,
                PREFERRED_CONN_INTERVAL_MAX,
                0,
                PREFERRED_SUPERVISION_TIMEOUT,
            ) {
                warn!("Failed to request connection parameters: {:?}", e);
            }
        });
    }
    {
        let events = events.clone();
        server.on_disconnect(move |_desc, reason| {
            info!("BLE client disconnected: {:?}", reason);
            post_event(&events, BridgeEvent::Disconnected);
        });
    }

    let service = server.create_service(ble_uuid(SERVICE_UUID));

    let weight = service
        .lock()
        .create_characteristic(ble_uuid(WEIGHT_CHAR_UUID), NimbleProperties::NOTIFY);
    let legacy = service
        .lock()
        .create_characteristic(ble_uuid(LEGACY_NOTIFY_CHAR_UUID), NimbleProperties::NOTIFY);

    for uuid in [COMMAND_CHAR_UUID, COMMAND2_CHAR_UUID] {
        let events = events.clone();
        service
            .lock()
            .create_characteristic(ble_uuid(uuid), NimbleProperties::WRITE | NimbleProperties::WRITE_NO_RSP)
            .lock()
            .on_write(move |args| {
                let data = args.recv_data();
                if !data.is_empty() {
                    post_event(&events, BridgeEvent::CommandWrite(data.to_vec()));
                }
            });
    }

    {
        let events = events.clone();
        service
            .lock()
            .create_characteristic(
                ble_uuid(DEVICE_NAME_CHAR_UUID),
                NimbleProperties::WRITE | NimbleProperties::WRITE_NO_RSP,
            )
            .lock()
            .on_write(move |args| {
                let data = args.recv_data();
                if !data.is_empty() {
                    post_event(&events, BridgeEvent::RenameWrite(data.to_vec()));
                }
            });
    }

    let advertising = device.get_advertising();
    advertising
        .lock()
        .scan_response(true)
        .set_data(BLEAdvertisementData::new().add_service_uuid(ble_uuid(SERVICE_UUID)))
        .map_err(|e| ble_err("advertising data", e))?;
    advertising
        .lock()
        .set_scan_response_data(BLEAdvertisementData::new().name(advertised_name))
        .map_err(|e| ble_err("scan response data", e))?;
    advertising.lock().start().map_err(|e| ble_err("start advertising", e))?;

    info!("BLE advertising started");
    Ok(BleNotifier {
        weight,
        _legacy: legacy,
    })
}
