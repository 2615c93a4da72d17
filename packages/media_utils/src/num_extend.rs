/// This file contains the implementation of the `num_extend` module.
/// It provides functions for extending wire counters for avoiding reset when they reach the cycle MAX.
///
/// The cycle is a const parameter, so the same type serves 16bit rtp seq, 16bit
/// frame numbers and the shorter radixes some descriptors use.
///
/// Example usage:
/// ```
/// use media_forward_utils::NumExtend;
///
/// let mut extender = NumExtend::<{ 1 << 16 }>::default();
///
/// assert_eq!(extender.generate(1), Some(1));
/// assert_eq!(extender.generate(65535), None);
/// assert_eq!(extender.generate(2), Some(2));
/// assert_eq!(extender.generate(20000), Some(20000));
/// assert_eq!(extender.generate(40000), Some(40000));
/// assert_eq!(extender.generate(65535), Some(65535));
/// assert_eq!(extender.generate(0), Some(65536));
/// ```
///
#[derive(Default)]
pub struct NumExtend<const CYCLE: u64> {
    last: Option<u64>,
    delta: u64,
}

impl<const CYCLE: u64> NumExtend<CYCLE> {
    /// Generate extended value as u64.
    ///
    /// # Returns
    ///
    /// The extended value as a Some(u64). If it is from previous cycle but cannot subtract
    /// the delta, it will return None to avoid subtract with overflow.
    ///
    pub fn generate(&mut self, value: u64) -> Option<u64> {
        assert!(value < CYCLE, "{} should < CYCLE {}", value, CYCLE);

        if let Some(last) = self.last {
            if value > last && value - last > CYCLE / 2 {
                if value + self.delta > CYCLE {
                    return Some(value + self.delta - CYCLE);
                } else {
                    return None;
                }
            }

            if value < last && last - value > CYCLE / 2 {
                self.delta += CYCLE;
                log::info!("[NumExtend] extended to next cycle {:?} => {}, new delta: {}", self.last, value, self.delta);
            }
            self.last = Some(value);

            Some(value + self.delta)
        } else {
            self.last = Some(value);
            Some(value)
        }
    }
}
