//! Limite de consultas à API.
//!
//! A API pública aceita poucas consultas por minuto. Este módulo mantém a
//! janela deslizante de tentativas ([`RateLimiter`]), o timer que expira a
//! janela e avisa a interface ([`ResetTimer`]) e o relógio injetável
//! ([`Clock`]) usado por ambos.

mod clock;
mod timer;
mod window;

pub use clock::{Clock, ManualClock, SystemClock};
pub use timer::ResetTimer;
pub use window::{RateLimiter, CALLS_PER_MINUTE, WINDOW_SECS};
