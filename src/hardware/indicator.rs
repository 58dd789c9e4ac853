use crate::traits::StatusIndicator;
use crate::types::LinkStatus;
use embedded_hal::digital::v2::OutputPin;
use log::{info, warn};

/// Common-anode RGB status LED. A channel is lit by driving its pin LOW.
pub struct RgbIndicator<R, G, B> {
    red: R,
    green: G,
    blue: B,
    failures: u32,
}

impl<R, G, B> RgbIndicator<R, G, B>
where
    R: OutputPin,
    G: OutputPin,
    B: OutputPin,
{
    pub fn new(red: R, green: G, blue: B) -> Self {
        let mut indicator = Self {
            red,
            green,
            blue,
            failures: 0,
        };
        indicator.set_rgb(false, false, false);
        info!("Status LED initialized (active low)");
        indicator
    }

    pub fn set_rgb(&mut self, red: bool, green: bool, blue: bool) {
        let ok = drive(&mut self.red, red) & drive(&mut self.green, green) & drive(&mut self.blue, blue);
        if !ok {
            self.failures = self.failures.wrapping_add(1);
            warn!("Failed to drive status LED");
        }
    }

    /// Number of LED updates where at least one pin could not be driven.
    pub fn failures(&self) -> u32 {
        self.failures
    }
}

fn drive<P: OutputPin>(pin: &mut P, lit: bool) -> bool {
    let result = if lit { pin.set_low() } else { pin.set_high() };
    result.is_ok()
}

impl<R, G, B> StatusIndicator for RgbIndicator<R, G, B>
where
    R: OutputPin,
    G: OutputPin,
    B: OutputPin,
{
    fn show(&mut self, status: LinkStatus) {
        let lit = status == LinkStatus::Connected;
        if !drive(&mut self.blue, lit) {
            self.failures = self.failures.wrapping_add(1);
            warn!("Failed to drive status LED for {:?}", status);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::convert::Infallible;
    use std::rc::Rc;

    #[derive(Clone, Default)]
    struct FakePin(Rc<Cell<Option<bool>>>);

    impl OutputPin for FakePin {
        type Error = Infallible;

        fn set_low(&mut self) -> Result<(), Self::Error> {
            self.0.set(Some(false));
            Ok(())
        }

        fn set_high(&mut self) -> Result<(), Self::Error> {
            self.0.set(Some(true));
            Ok(())
        }
    }

    #[derive(Clone, Default)]
    struct BrokenPin;

    impl OutputPin for BrokenPin {
        type Error = ();

        fn set_low(&mut self) -> Result<(), Self::Error> {
            Err(())
        }

        fn set_high(&mut self) -> Result<(), Self::Error> {
            Err(())
        }
    }

    #[test]
    fn test_starts_dark() {
        let (r, g, b) = (FakePin::default(), FakePin::default(), FakePin::default());
        let _indicator = RgbIndicator::new(r.clone(), g.clone(), b.clone());
        assert_eq!(r.0.get(), Some(true));
        assert_eq!(g.0.get(), Some(true));
        assert_eq!(b.0.get(), Some(true));
    }

    #[test]
    fn test_blue_follows_link() {
        let (r, g, b) = (FakePin::default(), FakePin::default(), FakePin::default());
        let mut indicator = RgbIndicator::new(r.clone(), g, b.clone());
        indicator.show(LinkStatus::Connected);
        assert_eq!(b.0.get(), Some(false));
        assert_eq!(r.0.get(), Some(true));
        indicator.show(LinkStatus::Disconnected);
        assert_eq!(b.0.get(), Some(true));
    }

    #[test]
    fn test_show_counts_pin_failures() {
        let mut indicator = RgbIndicator::new(FakePin::default(), FakePin::default(), BrokenPin);
        assert_eq!(indicator.failures(), 1);
        indicator.show(LinkStatus::Connected);
        indicator.show(LinkStatus::Disconnected);
        assert_eq!(indicator.failures(), 3);
    }
}
