use super::models::Mode;

/// Interaction state owned by the controller. Transitions are plain
/// methods so they can be checked without any rendering.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct UiState {
    pub mode: Mode,
    pub listening: bool,
    pub in_flight: bool,
}

impl UiState {
    pub fn new(mode: Mode) -> Self {
        Self {
            mode,
            ..Default::default()
        }
    }

    pub fn select_mode(&mut self, mode: Mode) {
        self.mode = mode;
    }

    /// Returns `false` when a request is already in flight.
    pub fn begin_request(&mut self) -> bool {
        if self.in_flight {
            return false;
        }
        self.in_flight = true;
        true
    }

    pub fn end_request(&mut self) {
        self.in_flight = false;
    }

    pub fn start_listening(&mut self) {
        self.listening = true;
    }

    pub fn stop_listening(&mut self) {
        self.listening = false;
    }
}
