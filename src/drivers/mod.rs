// Hardware drivers, board-independent.
//
// Everything here is written against embedded-hal traits and a raw input
// snapshot; only pin assignments and bus wiring (in board/) are
// board-specific.

pub mod battery;
pub mod button;
pub mod display;
pub mod input;
pub mod power;
pub mod rails;
