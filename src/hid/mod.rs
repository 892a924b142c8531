//! # HID Injection Module
//!
//! Performs mouse button and pointer actions on the host.
//!
//! This module handles:
//! - The [`HidInjector`] seam used by the packet ingest and cursor mover workers
//! - A Linux uinput virtual pointer ([`uinput::UinputInjector`])
//! - A dry-run backend that only logs ([`log::LogInjector`])
//! - Pointer position tracking shared by both backends

pub mod log;
pub mod pointer;
pub mod uinput;

use std::sync::Arc;

use crate::config::Config;
use crate::control::mapper::{HidAction, MouseButton};
use crate::error::{ReceiverError, Result};

/// Host input injection.
///
/// Implementations are shared between workers behind an `Arc`, so every
/// method takes `&self`.
pub trait HidInjector: Send + Sync {
    /// Press and hold a mouse button
    fn press_button(&self, button: MouseButton) -> Result<()>;

    /// Release a held mouse button
    fn release_button(&self, button: MouseButton) -> Result<()>;

    /// Absolute pointer position, origin at the top-left corner
    fn pointer_position(&self) -> Result<(i32, i32)>;

    /// Glide the pointer to an absolute position
    fn move_pointer_smoothly(&self, x: i32, y: i32) -> Result<()>;

    /// Perform one mapped button action
    fn apply(&self, action: HidAction) -> Result<()> {
        match action {
            HidAction::Press(button) => self.press_button(button),
            HidAction::Release(button) => self.release_button(button),
        }
    }
}

/// Build the injector selected by `[hid] backend`.
///
/// # Errors
///
/// Returns `Hid` error for an unknown backend name, or the backend's own
/// error if it cannot be created (e.g. `/dev/uinput` not writable).
pub fn from_config(config: &Config) -> Result<Arc<dyn HidInjector>> {
    let hid = &config.hid;
    match hid.backend.as_str() {
        "uinput" => Ok(Arc::new(uinput::UinputInjector::create(hid, config.cursor.smooth_steps)?)),
        "log" => Ok(Arc::new(log::LogInjector::new(hid.screen_width, hid.screen_height))),
        other => Err(ReceiverError::Hid(format!("Unknown HID backend: {}", other))),
    }
}

fn lock_poisoned<T>(_: std::sync::PoisonError<T>) -> ReceiverError {
    ReceiverError::Hid("injector state lock poisoned".to_string())
}

#[cfg(test)]
pub mod mocks {
    use super::*;
    use std::sync::Mutex;

    /// One recorded injector call
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum InjectorCall {
        Press(MouseButton),
        Release(MouseButton),
        MoveTo(i32, i32),
    }

    /// Mock injector for testing
    ///
    /// Records every action and tracks the pointer without any bounds.
    #[derive(Default)]
    pub struct MockInjector {
        pub calls: Mutex<Vec<InjectorCall>>,
        pub position: Mutex<(i32, i32)>,
        pub fail_buttons: Mutex<bool>,
        pub fail_moves: Mutex<bool>,
    }

    impl MockInjector {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn at(x: i32, y: i32) -> Self {
            let mock = Self::default();
            *mock.position.lock().unwrap() = (x, y);
            mock
        }

        pub fn get_calls(&self) -> Vec<InjectorCall> {
            self.calls.lock().unwrap().clone()
        }

        pub fn get_moves(&self) -> Vec<(i32, i32)> {
            self.get_calls()
                .into_iter()
                .filter_map(|call| match call {
                    InjectorCall::MoveTo(x, y) => Some((x, y)),
                    _ => None,
                })
                .collect()
        }

        pub fn set_button_error(&self) {
            *self.fail_buttons.lock().unwrap() = true;
        }

        pub fn set_move_error(&self) {
            *self.fail_moves.lock().unwrap() = true;
        }
    }

    impl HidInjector for MockInjector {
        fn press_button(&self, button: MouseButton) -> Result<()> {
            if *self.fail_buttons.lock().unwrap() {
                return Err(ReceiverError::Hid("Mock press error".to_string()));
            }
            self.calls.lock().unwrap().push(InjectorCall::Press(button));
            Ok(())
        }

        fn release_button(&self, button: MouseButton) -> Result<()> {
            if *self.fail_buttons.lock().unwrap() {
                return Err(ReceiverError::Hid("Mock release error".to_string()));
            }
            self.calls.lock().unwrap().push(InjectorCall::Release(button));
            Ok(())
        }

        fn pointer_position(&self) -> Result<(i32, i32)> {
            Ok(*self.position.lock().unwrap())
        }

        fn move_pointer_smoothly(&self, x: i32, y: i32) -> Result<()> {
            if *self.fail_moves.lock().unwrap() {
                return Err(ReceiverError::Hid("Mock move error".to_string()));
            }
            *self.position.lock().unwrap() = (x, y);
            self.calls.lock().unwrap().push(InjectorCall::MoveTo(x, y));
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::mocks::{InjectorCall, MockInjector};
    use super::*;

    #[test]
    fn test_apply_dispatches_actions() {
        let mock = MockInjector::new();
        mock.apply(HidAction::Press(MouseButton::Primary)).unwrap();
        mock.apply(HidAction::Release(MouseButton::Secondary)).unwrap();

        assert_eq!(
            mock.get_calls(),
            vec![
                InjectorCall::Press(MouseButton::Primary),
                InjectorCall::Release(MouseButton::Secondary),
            ]
        );
    }

    #[test]
    fn test_from_config_log_backend() {
        let mut config = Config::default();
        config.hid.backend = "log".to_string();
        let injector = from_config(&config).unwrap();
        assert_eq!(injector.pointer_position().unwrap(), (960, 540));
    }

    #[test]
    fn test_from_config_unknown_backend() {
        let mut config = Config::default();
        config.hid.backend = "robot".to_string();
        assert!(matches!(from_config(&config), Err(ReceiverError::Hid(_))));
    }
}
