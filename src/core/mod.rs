//! 核心引擎：检查点序列、视图池与窗口调度、回放状态机、定时录制、会话上下文

pub mod command;
pub mod error;
pub mod playback;
pub mod recording;
pub mod sequence;
pub mod session;
pub mod view_pool;
pub mod window;

pub use command::StudyCommand;
pub use error::StudyError;
pub use playback::{PlaybackController, Transition, Trigger};
pub use recording::RecordingSampler;
pub use sequence::{Checkpoint, CheckpointKind, CheckpointSequence};
pub use session::StudySession;
pub use view_pool::{SlotContent, SlotTier, ViewPool, ViewSlot, DEFAULT_POOL_SIZE};
pub use window::{window_layout, WindowEntry, WindowScheduler};
