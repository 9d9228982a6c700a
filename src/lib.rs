//! Time-domain pitch shifting with TD-PSOLA.
//!
//! `tdpsola` changes the pitch of audio without altering its duration. It
//! estimates the local period of each channel with FFT autocorrelation,
//! places pitch marks on waveform peaks, retimes the marks by the requested
//! frequency ratio, and overlap-adds Tukey-windowed grains centred on the
//! retimed marks.
//!
//! # Quick Start
//!
//! ```
//! use tdpsola::{Audio, ShiftConfig, pitch_shift};
//!
//! // 1 second of 160 Hz sine at 8 kHz
//! let input: Vec<f32> = (0..8000)
//!     .map(|n| (2.0 * std::f32::consts::PI * 160.0 * n as f32 / 8000.0).sin())
//!     .collect();
//!
//! let audio = Audio::mono(8000, input);
//! let shifted = pitch_shift(&audio, 1.5, &ShiftConfig::default()).unwrap();
//! assert_eq!(shifted.len(), audio.len()); // duration is preserved
//! ```
//!
//! Grain-level telemetry for mono signals is available through
//! [`pitch_shift_traced`], which additionally returns a [`GrainTrace`]
//! describing every overlap-added grain.

pub mod audio;
pub mod error;
pub mod io;
pub mod psola;

pub use audio::Audio;
pub use error::PsolaError;
pub use psola::telemetry::{GrainRecord, GrainTrace};
pub use psola::{ShiftConfig, pitch_shift, pitch_shift_traced};
