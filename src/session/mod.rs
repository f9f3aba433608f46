pub mod browser;
pub mod subgroup;

pub use browser::{BrowserEntry, DirBrowser, Resolved};
pub use subgroup::SubGroupView;
