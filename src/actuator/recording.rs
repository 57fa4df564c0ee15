use parking_lot::Mutex;

use super::{Actuator, ActuatorError, ActuatorIdentity, Transport};

/// A command accepted by a [`RecordingActuator`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RecordedCommand {
    /// Low-frequency motor intensity
    pub low: f32,
    /// High-frequency motor intensity
    pub high: f32,
}

#[derive(Debug)]
struct RecorderState {
    commands: Vec<RecordedCommand>,
    connected: bool,
    failing: bool,
    attempts: usize,
}

/// In-memory actuator that records every accepted command.
///
/// Used by the CLI simulation and by tests. It can be switched into a
/// failing or disconnected state to exercise error paths.
#[derive(Debug)]
pub struct RecordingActuator {
    identity: ActuatorIdentity,
    transport: Transport,
    state: Mutex<RecorderState>,
}

impl RecordingActuator {
    /// Create a recorder with the given identity and transport.
    pub fn new(identity: ActuatorIdentity, transport: Transport) -> Self {
        Self {
            identity,
            transport,
            state: Mutex::new(RecorderState {
                commands: Vec::new(),
                connected: true,
                failing: false,
                attempts: 0,
            }),
        }
    }

    /// Wired gamepad recorder.
    pub fn continuous() -> Self {
        Self::new(
            ActuatorIdentity::new(0x045e, 0x028e, "Wired Gamepad"),
            Transport::Continuous,
        )
    }

    /// Wireless gamepad recorder at the reference 25 Hz rate.
    pub fn wireless() -> Self {
        Self::new(
            ActuatorIdentity::new(0x045e, 0x02ea, "Wireless Gamepad"),
            Transport::WIRELESS,
        )
    }

    /// Snapshot of accepted commands in write order.
    pub fn commands(&self) -> Vec<RecordedCommand> {
        self.state.lock().commands.clone()
    }

    /// Most recently accepted command.
    pub fn last_command(&self) -> Option<RecordedCommand> {
        self.state.lock().commands.last().copied()
    }

    /// Number of accepted commands.
    pub fn command_count(&self) -> usize {
        self.state.lock().commands.len()
    }

    /// Number of `set_channels` calls, including rejected ones.
    pub fn attempt_count(&self) -> usize {
        self.state.lock().attempts
    }

    /// Forget recorded commands and attempts.
    pub fn clear(&self) {
        let mut state = self.state.lock();
        state.commands.clear();
        state.attempts = 0;
    }

    /// Make subsequent writes fail with a transport error.
    pub fn set_failing(&self, failing: bool) {
        self.state.lock().failing = failing;
    }

    /// Simulate plugging or unplugging the device.
    pub fn set_connected(&self, connected: bool) {
        self.state.lock().connected = connected;
    }
}

impl Default for RecordingActuator {
    fn default() -> Self {
        Self::continuous()
    }
}

impl Actuator for RecordingActuator {
    fn identity(&self) -> ActuatorIdentity {
        self.identity.clone()
    }

    fn transport(&self) -> Transport {
        self.transport
    }

    fn is_connected(&self) -> bool {
        self.state.lock().connected
    }

    fn set_channels(&self, low: f32, high: f32) -> Result<(), ActuatorError> {
        let mut state = self.state.lock();
        state.attempts += 1;
        if !state.connected {
            return Err(ActuatorError::Disconnected);
        }
        if state.failing {
            return Err(ActuatorError::Transport("simulated write failure".into()));
        }
        state.commands.push(RecordedCommand { low, high });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_commands_in_order() {
        let actuator = RecordingActuator::default();
        actuator.set_channels(0.1, 0.2).unwrap();
        actuator.set_channels(0.3, 0.4).unwrap();
        assert_eq!(actuator.command_count(), 2);
        assert_eq!(
            actuator.last_command(),
            Some(RecordedCommand {
                low: 0.3,
                high: 0.4
            })
        );
    }

    #[test]
    fn failing_and_disconnected_writes_are_not_recorded() {
        let actuator = RecordingActuator::wireless();
        actuator.set_failing(true);
        assert!(matches!(
            actuator.set_channels(1.0, 1.0),
            Err(ActuatorError::Transport(_))
        ));
        actuator.set_failing(false);
        actuator.set_connected(false);
        assert_eq!(
            actuator.set_channels(1.0, 1.0),
            Err(ActuatorError::Disconnected)
        );
        assert_eq!(actuator.command_count(), 0);
        assert_eq!(actuator.attempt_count(), 2);
    }
}
