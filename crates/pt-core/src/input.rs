//! Input abstraction layer.
//!
//! Mouse and touch deliver different, asymmetric event sequences. Both are
//! folded into one [`PressInput`] stream consumed by the repeater, so the
//! repeat and acceleration logic exists once.

/// The device family an event came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerSource {
    Mouse,
    Touch,
}

/// A raw platform event as the rendering host sees it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RawInput {
    /// Mouse button pressed over the element.
    MouseDown {
        /// Vertical offset of the press point from the element's top edge.
        offset_y: f32,
        cancelable: bool,
    },
    /// Mouse button released (on the element or anywhere on the surface).
    MouseUp { cancelable: bool },
    TouchStart { offset_y: f32, cancelable: bool },
    TouchEnd { cancelable: bool },
    /// The platform aborted the touch (gesture takeover, palm rejection).
    TouchCancel { cancelable: bool },
}

/// A normalized press transition.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PressInput {
    /// Press began; `local_y` is the offset inside the pressed element when known.
    Start { local_y: Option<f32> },
    /// Press ended, whatever the cause.
    End,
}

impl RawInput {
    pub fn normalize(&self) -> PressInput {
        match *self {
            Self::MouseDown { offset_y, .. } | Self::TouchStart { offset_y, .. } => {
                PressInput::Start {
                    local_y: Some(offset_y),
                }
            }
            Self::MouseUp { .. } | Self::TouchEnd { .. } | Self::TouchCancel { .. } => {
                PressInput::End
            }
        }
    }

    pub fn source(&self) -> PointerSource {
        match self {
            Self::MouseDown { .. } | Self::MouseUp { .. } => PointerSource::Mouse,
            Self::TouchStart { .. } | Self::TouchEnd { .. } | Self::TouchCancel { .. } => {
                PointerSource::Touch
            }
        }
    }

    /// Whether the host should call `preventDefault` (and stop propagation).
    ///
    /// Handled events are always consumed; suppressing the default on a
    /// touch start also keeps the browser from synthesizing mouse events
    /// and from opening a long-press context menu.
    pub fn prevent_default(&self) -> bool {
        match *self {
            Self::MouseDown { cancelable, .. }
            | Self::MouseUp { cancelable }
            | Self::TouchStart { cancelable, .. }
            | Self::TouchEnd { cancelable }
            | Self::TouchCancel { cancelable } => cancelable,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn mouse_and_touch_starts_normalize_alike() {
        let mouse = RawInput::MouseDown {
            offset_y: 12.0,
            cancelable: true,
        };
        let touch = RawInput::TouchStart {
            offset_y: 12.0,
            cancelable: true,
        };
        assert_eq!(mouse.normalize(), touch.normalize());
        assert_eq!(mouse.source(), PointerSource::Mouse);
        assert_eq!(touch.source(), PointerSource::Touch);
    }

    #[test]
    fn every_release_kind_ends_the_press() {
        for raw in [
            RawInput::MouseUp { cancelable: true },
            RawInput::TouchEnd { cancelable: true },
            RawInput::TouchCancel { cancelable: false },
        ] {
            assert_eq!(raw.normalize(), PressInput::End, "{raw:?}");
        }
    }

    #[test]
    fn prevent_default_follows_cancelable() {
        assert!(RawInput::TouchEnd { cancelable: true }.prevent_default());
        assert!(!RawInput::TouchCancel { cancelable: false }.prevent_default());
    }
}
