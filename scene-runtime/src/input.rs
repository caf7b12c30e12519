// Copyright 2025 John Brosnihan
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//! Keyboard and mouse state singleton
//!
//! The runtime never polls devices. The embedding application submits the
//! held keys, held mouse buttons, and cursor position each frame, and the
//! `InputManager` latches them at the very start of the update pass so every
//! component in a frame sees the same pressed/held/released answers.

use crate::ecs::updater::{order, Updatable};
use crate::ecs::{Component, SceneContext};
use crate::math::Vec2;
use std::collections::HashSet;

/// Keyboard key
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Escape,
    Enter,
    Tab,
    Backspace,
    Space,
    Up,
    Down,
    Left,
    Right,
    A,
    B,
    C,
    D,
    E,
    F,
    G,
    H,
    I,
    J,
    K,
    L,
    M,
    N,
    O,
    P,
    Q,
    R,
    S,
    T,
    U,
    V,
    W,
    X,
    Y,
    Z,
    Num0,
    Num1,
    Num2,
    Num3,
    Num4,
    Num5,
    Num6,
    Num7,
    Num8,
    Num9,
    F1,
    F2,
    F3,
    F4,
    F5,
    F6,
    F7,
    F8,
    F9,
    F10,
    F11,
    F12,
}

/// Mouse button, including the two wheel directions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    /// Primary button
    Left,
    /// Secondary button
    Right,
    /// Wheel click
    Middle,
    /// First side button
    X1,
    /// Second side button
    X2,
    /// Down while the wheel scrolled up this frame
    WheelUp,
    /// Down while the wheel scrolled down this frame
    WheelDown,
}

#[derive(Debug, Clone)]
struct MouseState {
    buttons: HashSet<MouseButton>,
    position: Vec2,
    wheel_delta: i32,
}

impl MouseState {
    fn is_down(&self, button: MouseButton) -> bool {
        match button {
            MouseButton::WheelUp => self.wheel_delta > 0,
            MouseButton::WheelDown => self.wheel_delta < 0,
            _ => self.buttons.contains(&button),
        }
    }
}

impl Default for MouseState {
    fn default() -> Self {
        MouseState {
            buttons: HashSet::new(),
            position: Vec2::zeros(),
            wheel_delta: 0,
        }
    }
}

/// Frame-latched keyboard and mouse state
#[derive(Debug, Default)]
pub struct InputManager {
    submitted: HashSet<Key>,
    current: HashSet<Key>,
    previous: HashSet<Key>,
    submitted_mouse: MouseState,
    current_mouse: MouseState,
    previous_mouse: MouseState,
}

impl InputManager {
    /// Create an input manager with no keys down
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the set of keys held for the coming frame
    pub fn submit_frame(&mut self, held: impl IntoIterator<Item = Key>) {
        self.submitted = held.into_iter().collect();
    }

    /// Mark one key held for the coming frame
    pub fn press(&mut self, key: Key) {
        self.submitted.insert(key);
    }

    /// Mark one key released for the coming frame
    pub fn release(&mut self, key: Key) {
        self.submitted.remove(&key);
    }

    /// Replace the held mouse buttons and cursor position for the coming frame
    ///
    /// `WheelUp` and `WheelDown` are ignored here; they follow `scroll`.
    pub fn submit_mouse(
        &mut self,
        held: impl IntoIterator<Item = MouseButton>,
        position: Vec2,
    ) {
        self.submitted_mouse.buttons = held
            .into_iter()
            .filter(|button| !matches!(button, MouseButton::WheelUp | MouseButton::WheelDown))
            .collect();
        self.submitted_mouse.position = position;
    }

    /// Accumulate wheel movement for the coming frame; positive scrolls up
    pub fn scroll(&mut self, delta: i32) {
        self.submitted_mouse.wheel_delta += delta;
    }

    /// Latch submitted state: this frame becomes the previous frame
    ///
    /// Wheel movement is consumed by the latch.
    pub fn advance(&mut self) {
        self.previous = std::mem::replace(&mut self.current, self.submitted.clone());
        self.previous_mouse =
            std::mem::replace(&mut self.current_mouse, self.submitted_mouse.clone());
        self.submitted_mouse.wheel_delta = 0;
    }

    /// Key is down this frame
    pub fn is_down(&self, key: Key) -> bool {
        self.current.contains(&key)
    }

    /// Key is up this frame
    pub fn is_up(&self, key: Key) -> bool {
        !self.is_down(key)
    }

    /// Key went down this frame
    pub fn is_pressed(&self, key: Key) -> bool {
        self.is_down(key) && !self.previous.contains(&key)
    }

    /// Key has been down for at least two frames
    pub fn is_held(&self, key: Key) -> bool {
        self.is_down(key) && self.previous.contains(&key)
    }

    /// Key went up this frame
    pub fn is_released(&self, key: Key) -> bool {
        self.is_up(key) && self.previous.contains(&key)
    }

    /// Cursor position this frame, in screen pixels
    pub fn mouse_position(&self) -> Vec2 {
        self.current_mouse.position
    }

    /// Wheel movement latched this frame
    pub fn wheel_delta(&self) -> i32 {
        self.current_mouse.wheel_delta
    }

    /// Button is down this frame
    pub fn is_mouse_down(&self, button: MouseButton) -> bool {
        self.current_mouse.is_down(button)
    }

    /// Button is up this frame
    pub fn is_mouse_up(&self, button: MouseButton) -> bool {
        !self.is_mouse_down(button)
    }

    /// Button went down this frame
    pub fn is_mouse_pressed(&self, button: MouseButton) -> bool {
        self.is_mouse_down(button) && !self.previous_mouse.is_down(button)
    }

    /// Button has been down for at least two frames
    pub fn is_mouse_held(&self, button: MouseButton) -> bool {
        self.is_mouse_down(button) && self.previous_mouse.is_down(button)
    }

    /// Button went up this frame
    pub fn is_mouse_released(&self, button: MouseButton) -> bool {
        self.is_mouse_up(button) && self.previous_mouse.is_down(button)
    }
}

impl Component for InputManager {
    fn as_updatable(&mut self) -> Option<&mut dyn Updatable> {
        Some(self)
    }
}

impl Updatable for InputManager {
    fn update_order(&self) -> i32 {
        order::INPUT
    }

    fn pause(&mut self) -> bool {
        false
    }

    fn update(&mut self, _ctx: &mut SceneContext<'_>) {
        self.advance();
    }
}
