//! Sensor link port - abstraction over the request/response channel
//!
//! This trait lets the poll cycle talk to the sensor without knowing the
//! transport (serial port, RS-422 radio bridge, test double).

use crate::error::LinkError;

/// Port for requesting readings from the sensor
///
/// One call to [`request`](SensorLink::request) is one poll command and one
/// response line. Implementations block for at most their configured read
/// timeout.
///
/// # Example Implementation
///
/// ```ignore
/// struct ScriptedLink {
///     lines: VecDeque<String>,
/// }
///
/// impl SensorLink for ScriptedLink {
///     fn request(&mut self) -> Result<String, LinkError> {
///         self.lines.pop_front().ok_or(LinkError::Timeout)
///     }
///
///     fn disable_echo(&mut self) -> Result<(), LinkError> {
///         Ok(())
///     }
/// }
/// ```
pub trait SensorLink: Send {
    /// Send the poll command and return exactly one response line
    fn request(&mut self) -> Result<String, LinkError>;

    /// Ask the sensor to stop echoing commands
    fn disable_echo(&mut self) -> Result<(), LinkError>;

    /// Human-readable endpoint name for logs
    fn endpoint(&self) -> &str {
        "sensor"
    }
}

impl<L: SensorLink + ?Sized> SensorLink for Box<L> {
    fn request(&mut self) -> Result<String, LinkError> {
        (**self).request()
    }

    fn disable_echo(&mut self) -> Result<(), LinkError> {
        (**self).disable_echo()
    }

    fn endpoint(&self) -> &str {
        (**self).endpoint()
    }
}
