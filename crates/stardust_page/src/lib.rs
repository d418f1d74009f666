//! # Stardust Page
//!
//! The interactive and sequenced components of the landing stage: the
//! preloader, the hero animation sequence, the compact audio player and
//! the email waitlist form.
//!
//! Everything here follows the same degradation rule: a missing page
//! element logs a warning and disables exactly one feature. The stage
//! keeps running.

#![deny(missing_docs)]
#![deny(unsafe_code)]

pub mod hero;
pub mod player;
pub mod preloader;
pub mod waitlist;

pub use hero::{HeroNodes, HeroSequence};
pub use player::{AudioNotice, AudioSource, CompactPlayer, PlayerKey, SilentAudio, Track};
pub use preloader::{Preloader, PreloaderNodes, PreloaderPhase};
pub use waitlist::{
    HttpTransport, Submission, SubmissionMeta, SubmitOutcome, TransportError, WaitlistError,
    WaitlistForm, WaitlistResponse, WaitlistStatus, WaitlistTransport,
};
