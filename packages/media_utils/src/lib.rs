mod frame_history;
mod num_extend;

pub use frame_history::FrameHistory;
pub use num_extend::NumExtend;
