// Board-independent system logic
// Frame polling, shutdown sequencing and the sleep interface.
// Single core, no preemption; everything here is driven from the main loop.

pub mod clock;
pub mod poll;
pub mod shutdown;
pub mod wake;

pub use clock::{Clock, Tick};
pub use poll::{InputReport, InputTask};
pub use shutdown::{HardwareFault, PowerDown, ShutdownReason, ShutdownTiming, Stage};
pub use wake::{SleepControl, WakeConfig};
