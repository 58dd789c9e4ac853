use crate::error::BridgeError;
use crate::protocol::SERIAL_BAUD;
use crate::traits::ScaleLink;
use esp_idf_svc::hal::delay::NON_BLOCK;
use esp_idf_svc::hal::gpio::{AnyIOPin, InputPin, OutputPin};
use esp_idf_svc::hal::peripheral::Peripheral;
use esp_idf_svc::hal::uart::{config, Uart, UartDriver};
use esp_idf_svc::hal::units::Hertz;
use log::{debug, info};

const RX_CHUNK: usize = 32;

/// UART link to the scale, 9600 8N1.
pub struct UartScaleLink {
    driver: UartDriver<'static>,
    pending: heapless::Deque<u8, RX_CHUNK>,
}

impl UartScaleLink {
    pub fn open<U: Uart>(
        uart: impl Peripheral<P = U> + 'static,
        tx: impl Peripheral<P = impl OutputPin> + 'static,
        rx: impl Peripheral<P = impl InputPin> + 'static,
    ) -> Result<Self, BridgeError> {
        let config = config::Config::default()
            .baudrate(Hertz(SERIAL_BAUD))
            .data_bits(config::DataBits::DataBits8)
            .parity_none()
            .stop_bits(config::StopBits::STOP1);

        let driver = UartDriver::new(
            uart,
            tx,
            rx,
            Option::<AnyIOPin>::None,
            Option::<AnyIOPin>::None,
            &config,
        )
        .map_err(|e| BridgeError::SerialError(format!("Failed to open UART: {:?}", e)))?;

        info!("Scale UART opened at {} baud (8N1)", SERIAL_BAUD);
        Ok(Self {
            driver,
            pending: heapless::Deque::new(),
        })
    }

    fn refill(&mut self) {
        let mut chunk = [0u8; RX_CHUNK];
        match self.driver.read(&mut chunk, NON_BLOCK) {
            Ok(n) => {
                for &b in &chunk[..n] {
                    // Capacity equals the chunk size and refill only runs when empty
                    let _ = self.pending.push_back(b);
                }
            }
            Err(e) => debug!("UART read error: {:?}", e),
        }
    }
}

impl ScaleLink for UartScaleLink {
    fn read_byte(&mut self) -> Option<u8> {
        if self.pending.is_empty() {
            self.refill();
        }
        self.pending.pop_front()
    }

    fn write(&mut self, bytes: &[u8]) -> Result<(), BridgeError> {
        match self.driver.write(bytes) {
            Ok(n) if n == bytes.len() => Ok(()),
            Ok(n) => Err(BridgeError::SerialError(format!(
                "Short write: {} of {} bytes",
                n,
                bytes.len()
            ))),
            Err(e) => Err(BridgeError::SerialError(format!("UART write failed: {:?}", e))),
        }
    }
}
