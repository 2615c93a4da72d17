//! Per subscriber packet selection for forwarded scalable video.
//!
//! One selector instance is owned by one forwarding pipeline and entered
//! serially for its stream. A selector decides forward or drop per packet,
//! never touches payload bytes, and signals the pipeline through
//! `is_waiting_for_intra` when only a key frame can resynchronise the
//! subscriber.

use media_forward_utils::NumExtend;

pub mod video_dd_svc;

const FRAME_NO_CYCLE: u64 = 1 << 16;

/// Frame number extender matching the descriptor wire width.
pub type FrameNoExtend = NumExtend<FRAME_NO_CYCLE>;
