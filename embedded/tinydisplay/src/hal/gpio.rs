//! Output pin abstraction for D/C and chip-select lines

/// Push-pull output owned by a framing layer
pub trait OutputPin {
    fn set_high(&mut self);
    fn set_low(&mut self);

    #[inline]
    fn set_level(&mut self, high: bool) {
        if high {
            self.set_high();
        } else {
            self.set_low();
        }
    }
}

impl<T: OutputPin + ?Sized> OutputPin for &mut T {
    fn set_high(&mut self) {
        (**self).set_high();
    }

    fn set_low(&mut self) {
        (**self).set_low();
    }
}
