//! Browser boundary events, lifted into data.
//!
//! The embedder translates real DOM events into these and feeds them to
//! [`crate::Stage::handle`]. Coordinates are CSS pixels.

use stardust_page::PlayerKey;

/// One input or lifecycle event from the page boundary.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    /// Pointer or touch press at a stage position.
    PointerDown {
        /// Horizontal position.
        x: f32,
        /// Vertical position.
        y: f32,
    },
    /// Keyboard input routed to the player.
    KeyDown {
        /// The pressed key.
        key: PlayerKey,
        /// Whether focus is on the stage body (not an input field).
        focus_on_body: bool,
    },
    /// Viewport resized.
    Resized {
        /// New viewport width.
        width: f32,
        /// New viewport height.
        height: f32,
    },
    /// Page visibility flipped.
    VisibilityChanged {
        /// True when the page became hidden.
        hidden: bool,
    },
    /// The page finished loading; releases the preloader.
    LoadFinished,
    /// Web fonts finished loading; the label finally has real metrics.
    FontsReady,
    /// Click on the player wave, as a fraction of its width.
    WaveSeek {
        /// Seek target in `[0, 1]`.
        fraction: f64,
    },
    /// Waitlist form submitted.
    WaitlistSubmit {
        /// The raw input value; trimmed and validated by the form.
        email: String,
    },
    /// The waitlist input was edited.
    WaitlistInputEdited,
    /// The waitlist success modal was dismissed.
    WaitlistDismissed,
}
