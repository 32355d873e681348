use embedded_hal::digital::{Error, ErrorType, InputPin, OutputPin};

/// The bus line as the master sees it: an open-drain output with a pull-up.
///
/// All three operations must have short, bounded latency; they are called
/// inside the timed windows of every slot.
pub trait IoWire {
    type Error: Error;

    /// Pulls the line to ground
    fn drive_low(&mut self) -> Result<(), Self::Error>;

    /// Stops driving and lets the pull-up raise the line.
    /// It stays low while any device holds it down.
    fn release(&mut self) -> Result<(), Self::Error>;

    /// `true` when the line reads high
    fn read_level(&mut self) -> Result<bool, Self::Error>;
}

/// One open-drain pin: setting it high releases the line
impl<P> IoWire for (P,)
where
    P: ErrorType + OutputPin + InputPin,
{
    type Error = P::Error;

    fn drive_low(&mut self) -> Result<(), Self::Error> {
        self.0.set_low()
    }

    fn release(&mut self) -> Result<(), Self::Error> {
        self.0.set_high()
    }

    fn read_level(&mut self) -> Result<bool, Self::Error> {
        self.0.is_high()
    }
}

/// A sense pin and a drive pin tied to the same line
impl<E, S, D> IoWire for (S, D)
where
    E: Error,
    S: ErrorType<Error = E> + InputPin,
    D: ErrorType<Error = E> + OutputPin,
{
    type Error = E;

    fn drive_low(&mut self) -> Result<(), Self::Error> {
        self.1.set_low()
    }

    fn release(&mut self) -> Result<(), Self::Error> {
        self.1.set_high()
    }

    fn read_level(&mut self) -> Result<bool, Self::Error> {
        self.0.is_high()
    }
}

/// Pin adapter for a line buffered through an inverting transistor stage
pub struct Inverted<P>(pub P);

impl<P: ErrorType> ErrorType for Inverted<P> {
    type Error = P::Error;
}

impl<P: InputPin> InputPin for Inverted<P> {
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        self.0.is_low()
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        self.0.is_high()
    }
}

impl<P: OutputPin> OutputPin for Inverted<P> {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.0.set_high()
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.0.set_low()
    }
}
