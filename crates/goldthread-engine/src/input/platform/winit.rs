use winit::dpi::PhysicalPosition;
use winit::event::{ElementState, MouseButton as WinitMouseButton, Touch, TouchPhase, WindowEvent};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::Window;

use crate::coords::Vec2;
use crate::input::{ContactId, TouchAccumulator};

/// Contact id used for the left mouse button when simulating a finger.
pub const MOUSE_PRIMARY_ID: ContactId = 0;
/// Contact id used for the right mouse button when simulating a second finger.
pub const MOUSE_SECONDARY_ID: ContactId = 1;
/// Hardware touch ids are shifted past the simulated ones.
const TOUCH_ID_OFFSET: ContactId = 2;

/// Platform state that winit does not keep for us.
#[derive(Debug, Default, Clone)]
pub struct PlatformInputState {
    cursor: Option<Vec2>,
    arrows: [bool; 4],
}

/// Feeds one winit `WindowEvent` into the accumulator.
///
/// Real touches map to their own contacts; the left and right mouse buttons
/// simulate two fingers; arrow keys drive the keyboard tilt axes.
pub fn feed_window_event(
    window: &Window,
    platform: &mut PlatformInputState,
    acc: &mut TouchAccumulator,
    event: &WindowEvent,
) {
    match event {
        WindowEvent::Touch(Touch { phase, location, id, .. }) => {
            let pos = to_logical(window, *location);
            let id = id.saturating_add(TOUCH_ID_OFFSET);
            match phase {
                TouchPhase::Started => acc.began(id, pos),
                TouchPhase::Moved => acc.moved(id, pos),
                TouchPhase::Ended | TouchPhase::Cancelled => acc.ended(id, pos),
            }
        }

        WindowEvent::CursorMoved { position, .. } => {
            let pos = to_logical(window, *position);
            platform.cursor = Some(pos);
            for id in [MOUSE_PRIMARY_ID, MOUSE_SECONDARY_ID] {
                if acc.is_held(id) {
                    acc.moved(id, pos);
                }
            }
        }

        WindowEvent::CursorLeft { .. } => {
            for id in [MOUSE_PRIMARY_ID, MOUSE_SECONDARY_ID] {
                if acc.is_held(id) {
                    let pos = acc.position(id).unwrap_or_default();
                    acc.ended(id, pos);
                }
            }
        }

        WindowEvent::MouseInput { state, button, .. } => {
            let id = match button {
                WinitMouseButton::Left => MOUSE_PRIMARY_ID,
                WinitMouseButton::Right => MOUSE_SECONDARY_ID,
                _ => return,
            };
            let pos = platform.cursor.unwrap_or_default();
            match state {
                ElementState::Pressed => acc.began(id, pos),
                ElementState::Released => acc.ended(id, pos),
            }
        }

        WindowEvent::KeyboardInput { event, .. } => {
            let slot = match event.physical_key {
                PhysicalKey::Code(KeyCode::ArrowLeft) => 0,
                PhysicalKey::Code(KeyCode::ArrowRight) => 1,
                PhysicalKey::Code(KeyCode::ArrowUp) => 2,
                PhysicalKey::Code(KeyCode::ArrowDown) => 3,
                _ => return,
            };
            platform.arrows[slot] = event.state == ElementState::Pressed;
            let [left, right, up, down] = platform.arrows.map(|p| if p { 1.0 } else { 0.0 });
            acc.set_key_tilt(right - left, up - down);
        }

        WindowEvent::Focused(false) => {
            // Avoids stuck contacts when focus changes mid-press.
            platform.arrows = [false; 4];
            acc.set_key_tilt(0.0, 0.0);
            acc.release_all();
        }

        _ => {}
    }
}

fn to_logical(window: &Window, pos: PhysicalPosition<f64>) -> Vec2 {
    let logical = pos.to_logical::<f64>(window.scale_factor());
    Vec2::new(logical.x as f32, logical.y as f32)
}
