use crate::protocol::CommandKeyword;
use crate::traits::ScaleLink;
use bstr::ByteSlice;
use log::{debug, info, warn};

/// Forwards button presses from the phone to the scale.
#[derive(Debug, Default)]
pub struct CommandDispatcher {
    sent: u32,
    dropped: u32,
}

impl CommandDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve the written text and send the matching control sequence. The
    /// write is attempted once; a busy or failed link drops the command.
    pub fn dispatch<S: ScaleLink>(&mut self, text: &[u8], scale: &mut S) -> Option<CommandKeyword> {
        let Some(keyword) = CommandKeyword::from_text(text) else {
            debug!("Ignoring command write {:?}", text.as_bstr());
            return None;
        };

        info!("{} Pressed", keyword.name());

        match scale.write(&keyword.envelope()) {
            Ok(()) => {
                self.sent = self.sent.wrapping_add(1);
            }
            Err(e) => {
                self.dropped = self.dropped.wrapping_add(1);
                warn!("Failed to send {} command: {}", keyword.name(), e);
            }
        }
        Some(keyword)
    }

    pub fn sent(&self) -> u32 {
        self.sent
    }

    pub fn dropped(&self) -> u32 {
        self.dropped
    }
}
