//! NVS (Non-Volatile Storage) persistence for the device name and the
//! optional bridge config override.

use crate::device_name::DeviceName;
use crate::error::BridgeError;
use crate::system::BridgeConfig;
use crate::traits::NameStore;
use esp_idf_svc::nvs::{EspDefaultNvsPartition, EspNvs, NvsDefault};
use log::{debug, info, warn};

// Namespace and keys shared with earlier firmware revisions
const NVS_NAMESPACE: &str = "my-app";
const NAME_KEY: &str = "device_name";
const CONFIG_KEY: &str = "bridge_cfg";

pub struct NvsNameStore {
    nvs: EspNvs<NvsDefault>,
}

impl NvsNameStore {
    pub fn new(partition: EspDefaultNvsPartition) -> Result<Self, BridgeError> {
        let nvs = EspNvs::new(partition, NVS_NAMESPACE, true)
            .map_err(|e| BridgeError::StorageError(format!("Failed to open NVS: {:?}", e)))?;
        info!("NVS namespace '{}' opened", NVS_NAMESPACE);
        Ok(Self { nvs })
    }

    /// Bridge config override, or defaults when none is stored.
    pub fn load_config(&self) -> BridgeConfig {
        let mut buffer = vec![0u8; 256];
        match self.nvs.get_blob(CONFIG_KEY, &mut buffer) {
            Ok(Some(data)) => BridgeConfig::from_json_or_default(data),
            Ok(None) => {
                debug!("No bridge config override stored");
                BridgeConfig::default()
            }
            Err(e) => {
                warn!("Failed to read bridge config: {:?} - using defaults", e);
                BridgeConfig::default()
            }
        }
    }
}

impl NameStore for NvsNameStore {
    fn load_name(&mut self) -> Result<Option<DeviceName>, BridgeError> {
        let mut buffer = [0u8; 64];
        let stored = self
            .nvs
            .get_str(NAME_KEY, &mut buffer)
            .map_err(|e| BridgeError::StorageError(format!("Failed to read name: {:?}", e)))?;

        match stored {
            Some(raw) => match DeviceName::parse(raw.as_bytes()) {
                Ok(name) => Ok(Some(name)),
                Err(e) => {
                    warn!("Stored device name {:?} is invalid ({}) - using default", raw, e);
                    Ok(None)
                }
            },
            None => Ok(None),
        }
    }

    fn store_name(&mut self, name: &DeviceName) -> Result<(), BridgeError> {
        self.nvs
            .set_str(NAME_KEY, name.as_str())
            .map_err(|e| BridgeError::StorageError(format!("Failed to write name: {:?}", e)))?;
        info!("Saved device name '{}' to NVS", name);
        Ok(())
    }
}
