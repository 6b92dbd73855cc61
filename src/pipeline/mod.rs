//! Audio pipeline components.
//!
//! The pipeline connects the driver callback to downstream consumers:
//!
//! ```text
//! Driver Thread → Ring Buffer → Frame Window → Extraction Buffer
//! ```
//!
//! - **Ring Buffer**: Lock-free SPSC queue; the driver callback never blocks
//! - **Frame Window**: Whole frames that arrived since the previous tick
//! - **Extraction Buffer**: One channel of the window, gain applied, filled
//!   by [`ChannelRouter::tick`]
//!
//! Everything downstream of the ring runs on the tick thread.

mod meter;
mod router;

pub use meter::{Levels, SILENCE_FLOOR_DB};
pub use router::ChannelRouter;
