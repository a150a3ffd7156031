pub mod content;
pub mod history;
pub mod user;
pub mod watchlist;

pub use content::{ContentId, ContentItem, ContentKind};
pub use history::{HistoryEntry, HistoryMirror, ProgressPatch};
pub use user::{Session, User, UserProfile};
pub use watchlist::{WatchlistEntry, WatchlistMirror, WatchlistStats, WatchlistToggle};
