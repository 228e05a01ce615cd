use crate::draw::model::StrokePoint;
use eframe::egui::{self, PointerButton, TouchId, TouchPhase};

/// Screen-space bounds of the drawing surface.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SurfaceRect {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl SurfaceRect {
    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.left && y >= self.top && x < self.left + self.width && y < self.top + self.height
    }
}

impl From<egui::Rect> for SurfaceRect {
    fn from(rect: egui::Rect) -> Self {
        Self {
            left: rect.min.x,
            top: rect.min.y,
            width: rect.width(),
            height: rect.height(),
        }
    }
}

/// A position reported by either input device, in client coordinates.
#[derive(Debug, Clone, PartialEq)]
pub enum RawInput {
    Pointer { client_x: f32, client_y: f32 },
    Touch { contacts: Vec<(f32, f32)> },
}

/// Map a raw event position into surface-local coordinates.
///
/// Touch input follows the first active contact; a touch event without any
/// contact yields `None`.
pub fn normalize(input: &RawInput, rect: SurfaceRect) -> Option<StrokePoint> {
    let (client_x, client_y) = match input {
        RawInput::Pointer { client_x, client_y } => (*client_x, *client_y),
        RawInput::Touch { contacts } => *contacts.first()?,
    };
    Some(StrokePoint::new(client_x - rect.left, client_y - rect.top))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputPhase {
    Start,
    Move,
    End,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SurfaceEvent {
    pub phase: InputPhase,
    pub input: Option<RawInput>,
}

impl SurfaceEvent {
    fn at(phase: InputPhase, input: RawInput) -> Self {
        Self {
            phase,
            input: Some(input),
        }
    }

    fn end() -> Self {
        Self {
            phase: InputPhase::End,
            input: None,
        }
    }
}

/// Turns egui's pointer and touch events into one stream of surface events.
///
/// Mouse presses only start a stroke inside the surface, and moving the
/// pointer out of the surface ends it. Only the first touch contact draws;
/// further fingers are ignored until it lifts.
///
/// The windowing layer also reports the first finger as emulated pointer
/// events. Pointer events are dropped while a touch is active or when they
/// share a frame with touch events, so each contact is seen once.
#[derive(Debug, Default)]
pub struct InputAdapter {
    primary_touch: Option<TouchId>,
}

impl InputAdapter {
    pub fn translate(&mut self, events: &[egui::Event], rect: SurfaceRect) -> Vec<SurfaceEvent> {
        let touch_frame = events
            .iter()
            .any(|event| matches!(event, egui::Event::Touch { .. }));
        events
            .iter()
            .filter_map(|event| self.translate_one(event, rect, touch_frame))
            .collect()
    }

    fn translate_one(
        &mut self,
        event: &egui::Event,
        rect: SurfaceRect,
        touch_frame: bool,
    ) -> Option<SurfaceEvent> {
        let pointer_muted = touch_frame || self.primary_touch.is_some();
        match event {
            egui::Event::PointerButton { .. }
            | egui::Event::PointerMoved(_)
            | egui::Event::PointerGone
                if pointer_muted =>
            {
                None
            }
            egui::Event::PointerButton {
                pos,
                button: PointerButton::Primary,
                pressed,
                ..
            } => {
                let input = RawInput::Pointer {
                    client_x: pos.x,
                    client_y: pos.y,
                };
                if !*pressed {
                    Some(SurfaceEvent::end())
                } else if rect.contains(pos.x, pos.y) {
                    Some(SurfaceEvent::at(InputPhase::Start, input))
                } else {
                    None
                }
            }
            egui::Event::PointerMoved(pos) => {
                if rect.contains(pos.x, pos.y) {
                    Some(SurfaceEvent::at(
                        InputPhase::Move,
                        RawInput::Pointer {
                            client_x: pos.x,
                            client_y: pos.y,
                        },
                    ))
                } else {
                    Some(SurfaceEvent::end())
                }
            }
            egui::Event::PointerGone => Some(SurfaceEvent::end()),
            egui::Event::Touch { id, phase, pos, .. } => {
                let input = RawInput::Touch {
                    contacts: vec![(pos.x, pos.y)],
                };
                match phase {
                    TouchPhase::Start => {
                        if self.primary_touch.is_some() || !rect.contains(pos.x, pos.y) {
                            return None;
                        }
                        self.primary_touch = Some(*id);
                        Some(SurfaceEvent::at(InputPhase::Start, input))
                    }
                    TouchPhase::Move if self.primary_touch == Some(*id) => {
                        Some(SurfaceEvent::at(InputPhase::Move, input))
                    }
                    TouchPhase::End | TouchPhase::Cancel if self.primary_touch == Some(*id) => {
                        self.primary_touch = None;
                        Some(SurfaceEvent::end())
                    }
                    _ => None,
                }
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use eframe::egui::{pos2, Modifiers, Rect};

    fn rect() -> SurfaceRect {
        SurfaceRect {
            left: 100.0,
            top: 50.0,
            width: 300.0,
            height: 300.0,
        }
    }

    fn touch(id: u64, phase: TouchPhase, x: f32, y: f32) -> egui::Event {
        egui::Event::Touch {
            device_id: egui::TouchDeviceId(0),
            id: TouchId(id),
            phase,
            pos: pos2(x, y),
            force: None,
        }
    }

    #[test]
    fn pointer_is_offset_by_surface_origin() {
        let point = normalize(
            &RawInput::Pointer {
                client_x: 110.0,
                client_y: 75.5,
            },
            rect(),
        );
        assert_eq!(point, Some(StrokePoint::new(10.0, 25.5)));
    }

    #[test]
    fn touch_uses_first_contact() {
        let point = normalize(
            &RawInput::Touch {
                contacts: vec![(150.0, 60.0), (300.0, 300.0)],
            },
            rect(),
        );
        assert_eq!(point, Some(StrokePoint::new(50.0, 10.0)));
    }

    #[test]
    fn touch_without_contacts_has_no_point() {
        assert_eq!(
            normalize(&RawInput::Touch { contacts: vec![] }, rect()),
            None
        );
    }

    #[test]
    fn surface_rect_from_egui_rect() {
        let surface = SurfaceRect::from(Rect::from_min_size(pos2(4.0, 8.0), egui::vec2(30.0, 20.0)));
        assert_eq!(
            surface,
            SurfaceRect {
                left: 4.0,
                top: 8.0,
                width: 30.0,
                height: 20.0
            }
        );
        assert!(surface.contains(4.0, 8.0));
        assert!(!surface.contains(34.0, 8.0));
    }

    #[test]
    fn press_outside_surface_is_ignored_but_release_always_ends() {
        let mut adapter = InputAdapter::default();
        let events = vec![
            egui::Event::PointerButton {
                pos: pos2(10.0, 10.0),
                button: PointerButton::Primary,
                pressed: true,
                modifiers: Modifiers::NONE,
            },
            egui::Event::PointerButton {
                pos: pos2(10.0, 10.0),
                button: PointerButton::Primary,
                pressed: false,
                modifiers: Modifiers::NONE,
            },
        ];

        let out = adapter.translate(&events, rect());
        assert_eq!(out, vec![SurfaceEvent::end()]);
    }

    #[test]
    fn leaving_the_surface_ends_the_stroke() {
        let mut adapter = InputAdapter::default();
        let out = adapter.translate(
            &[
                egui::Event::PointerMoved(pos2(120.0, 60.0)),
                egui::Event::PointerMoved(pos2(500.0, 60.0)),
            ],
            rect(),
        );
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].phase, InputPhase::Move);
        assert_eq!(out[1], SurfaceEvent::end());
    }

    #[test]
    fn second_finger_is_ignored_while_first_is_down() {
        let mut adapter = InputAdapter::default();
        let out = adapter.translate(
            &[
                touch(1, TouchPhase::Start, 120.0, 60.0),
                touch(2, TouchPhase::Start, 130.0, 70.0),
                touch(2, TouchPhase::Move, 140.0, 80.0),
                touch(1, TouchPhase::Move, 125.0, 65.0),
                touch(2, TouchPhase::End, 140.0, 80.0),
                touch(1, TouchPhase::Cancel, 125.0, 65.0),
            ],
            rect(),
        );

        let phases: Vec<_> = out.iter().map(|e| e.phase).collect();
        assert_eq!(
            phases,
            vec![InputPhase::Start, InputPhase::Move, InputPhase::End]
        );
    }

    fn button(x: f32, y: f32, pressed: bool) -> egui::Event {
        egui::Event::PointerButton {
            pos: pos2(x, y),
            button: PointerButton::Primary,
            pressed,
            modifiers: Modifiers::NONE,
        }
    }

    #[test]
    fn emulated_pointer_events_from_a_tap_are_dropped() {
        use crate::draw::blank::is_blank;
        use crate::draw::model::{Color, SurfaceStyle};
        use crate::draw::surface::DrawingSurface;

        let mut adapter = InputAdapter::default();
        let mut surface = DrawingSurface::new(300, 300, SurfaceStyle::default());
        let frames = [
            vec![
                touch(7, TouchPhase::Start, 150.0, 100.0),
                egui::Event::PointerMoved(pos2(150.0, 100.0)),
                button(150.0, 100.0, true),
            ],
            vec![
                touch(7, TouchPhase::End, 150.0, 100.0),
                button(150.0, 100.0, false),
                egui::Event::PointerGone,
            ],
        ];

        let mut phases = Vec::new();
        for frame in &frames {
            for event in adapter.translate(frame, rect()) {
                phases.push(event.phase);
                surface.apply(&event, Some(rect()));
            }
        }

        assert_eq!(phases, vec![InputPhase::Start, InputPhase::End]);
        assert!(is_blank(surface.raster(), Color::WHITE).expect("encode"));
    }

    #[test]
    fn touch_drag_yields_one_move_per_frame() {
        let mut adapter = InputAdapter::default();
        adapter.translate(&[touch(3, TouchPhase::Start, 120.0, 60.0)], rect());

        let out = adapter.translate(
            &[
                touch(3, TouchPhase::Move, 140.0, 70.0),
                egui::Event::PointerMoved(pos2(140.0, 70.0)),
            ],
            rect(),
        );
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].phase, InputPhase::Move);

        // a stray emulated move in a later frame is still ignored mid-touch
        assert!(adapter
            .translate(&[egui::Event::PointerMoved(pos2(141.0, 71.0))], rect())
            .is_empty());
    }

    #[test]
    fn mouse_works_again_after_touch_lifts() {
        let mut adapter = InputAdapter::default();
        adapter.translate(&[touch(3, TouchPhase::Start, 120.0, 60.0)], rect());
        adapter.translate(&[touch(3, TouchPhase::End, 120.0, 60.0)], rect());

        let out = adapter.translate(&[button(130.0, 70.0, true)], rect());
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].phase, InputPhase::Start);
    }
}
