/// Window of recently seen frame numbers.
const WINDOW: u64 = 128;

/// Bounded membership set over extended frame numbers.
///
/// Keeps the newest number plus a 128 frame bit window behind it, one bit per
/// frame indexed by distance from newest. Numbers that fall out of the window
/// read as absent, callers treat them as lost.
///
/// Example usage:
/// ```
/// use media_forward_utils::FrameHistory;
///
/// let mut history = FrameHistory::default();
///
/// history.add(10);
/// history.add(12);
/// assert!(history.contains(10));
/// assert!(!history.contains(11));
/// assert!(history.contains(12));
/// ```
///
#[derive(Default, Clone)]
pub struct FrameHistory {
    newest: Option<u64>,
    bits: u128,
}

impl FrameHistory {
    pub fn add(&mut self, frame: u64) {
        match self.newest {
            None => {
                self.newest = Some(frame);
                self.bits = 1;
            }
            Some(newest) if frame > newest => {
                let ahead = frame - newest;
                if ahead >= WINDOW {
                    self.bits = 0;
                } else {
                    self.bits <<= ahead;
                }
                self.bits |= 1;
                self.newest = Some(frame);
            }
            Some(newest) => {
                // late arrival, only representable inside the window
                let behind = newest - frame;
                if behind < WINDOW {
                    self.bits |= 1 << behind;
                }
            }
        }
    }

    pub fn contains(&self, frame: u64) -> bool {
        match self.newest {
            Some(newest) if frame <= newest => {
                let behind = newest - frame;
                behind < WINDOW && self.bits & (1 << behind) != 0
            }
            _ => false,
        }
    }
}
