#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DrawingState {
    #[default]
    Idle,
    Drawing,
}

impl DrawingState {
    pub fn is_drawing(self) -> bool {
        matches!(self, Self::Drawing)
    }
}

pub fn can_transition(from: DrawingState, to: DrawingState) -> bool {
    matches!(
        (from, to),
        (DrawingState::Idle, DrawingState::Drawing) | (DrawingState::Drawing, DrawingState::Idle)
    ) || from == to
}
