pub mod addr;
pub mod config;
pub mod library;
pub mod protocol;

pub use addr::{Addr, Segment, SegmentKind};
pub use config::{ClientConfig, RefreshScope};
pub use protocol::{GroupKind, PDir, PDirTree, PGroup, PSubGroup, PTask, TaskKey, TaskKind};
