use crate::error::Result;
use std::collections::VecDeque;
use zeroize::Zeroizing;

const BUFFER_LEN: usize = 256;

/// Source of uniform randomness for candidate construction.
///
/// Implementations must either be backed by the operating system's secure
/// generator ([`OsEntropy`]) or be an explicitly scripted replay source for
/// reproducible tests ([`ScriptedEntropy`]). There is deliberately no
/// time-seeded PRNG implementation in this crate.
pub trait EntropySource {
    /// Fills `buf` with random bytes.
    fn next_bytes(&mut self, buf: &mut [u8]) -> Result<()>;

    fn next_u32(&mut self) -> Result<u32> {
        let mut buf = [0u8; 4];
        self.next_bytes(&mut buf)?;
        Ok(u32::from_le_bytes(buf))
    }

    /// Uniform integer in `low..=high`, unbiased via rejection sampling.
    fn next_int(&mut self, low: u32, high: u32) -> Result<u32> {
        debug_assert!(low <= high);
        let span = u64::from(high - low) + 1;
        let rejection_threshold = ((1u64 << 32) / span) * span;

        loop {
            let draw = u64::from(self.next_u32()?);
            if draw < rejection_threshold {
                return Ok(low + (draw % span) as u32);
            }
        }
    }

    /// Uniform pick from a non-empty slice.
    ///
    /// # Panics
    ///
    /// Panics if `items` is empty.
    fn choice<'a, T>(&mut self, items: &'a [T]) -> Result<&'a T>
    where
        Self: Sized,
    {
        assert!(!items.is_empty(), "choice from an empty slice");
        let index = self.next_int(0, items.len() as u32 - 1)?;
        Ok(&items[index as usize])
    }
}

/// Buffered reader over the operating system's secure random source.
///
/// Construction probes the OS source once so that an unusable generator is
/// reported before any candidate is assembled, not halfway through a batch.
pub struct OsEntropy {
    buffer: Zeroizing<[u8; BUFFER_LEN]>,
    pos: usize,
}

impl OsEntropy {
    pub fn new() -> Result<Self> {
        let mut source = Self {
            buffer: Zeroizing::new([0u8; BUFFER_LEN]),
            pos: 0,
        };
        source.refill()?;
        Ok(source)
    }

    fn refill(&mut self) -> Result<()> {
        getrandom::fill(&mut self.buffer[..])?;
        self.pos = 0;
        Ok(())
    }
}

impl EntropySource for OsEntropy {
    fn next_bytes(&mut self, buf: &mut [u8]) -> Result<()> {
        for byte in buf.iter_mut() {
            if self.pos == BUFFER_LEN {
                self.refill()?;
            }
            *byte = self.buffer[self.pos];
            self.pos += 1;
        }
        Ok(())
    }
}

/// Replay source returning a fixed script of draws.
///
/// `next_int` pops one scripted value per call and reduces it modulo the
/// requested range, so a script maps one-to-one onto the structural choices
/// made during assembly. An exhausted script yields zeroes.
pub struct ScriptedEntropy {
    script: VecDeque<u32>,
}

impl ScriptedEntropy {
    pub fn new<I: IntoIterator<Item = u32>>(script: I) -> Self {
        Self {
            script: script.into_iter().collect(),
        }
    }

    fn pop(&mut self) -> u32 {
        self.script.pop_front().unwrap_or(0)
    }
}

impl EntropySource for ScriptedEntropy {
    fn next_bytes(&mut self, buf: &mut [u8]) -> Result<()> {
        for byte in buf.iter_mut() {
            *byte = self.pop() as u8;
        }
        Ok(())
    }

    fn next_u32(&mut self) -> Result<u32> {
        Ok(self.pop())
    }

    fn next_int(&mut self, low: u32, high: u32) -> Result<u32> {
        debug_assert!(low <= high);
        let span = u64::from(high - low) + 1;
        Ok(low + (u64::from(self.pop()) % span) as u32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_os_entropy_fills_requested_length() {
        let mut source = OsEntropy::new().unwrap();
        let mut buf = [0u8; 64];
        source.next_bytes(&mut buf).unwrap();
    }

    #[test]
    fn test_os_entropy_crosses_buffer_boundary() {
        let mut source = OsEntropy::new().unwrap();
        let mut buf = vec![0u8; BUFFER_LEN * 2 + 17];
        source.next_bytes(&mut buf).unwrap();
    }

    #[test]
    fn test_next_int_stays_in_bounds() {
        let mut source = OsEntropy::new().unwrap();
        for _ in 0..1000 {
            let value = source.next_int(3, 17).unwrap();
            assert!((3..=17).contains(&value), "out of bounds: {}", value);
        }
    }

    #[test]
    fn test_next_int_singleton_range() {
        let mut source = OsEntropy::new().unwrap();
        assert_eq!(source.next_int(7, 7).unwrap(), 7);
    }

    #[test]
    fn test_rejection_threshold_covers_span_evenly() {
        let span = 10u64;
        let threshold = ((1u64 << 32) / span) * span;
        assert_eq!(threshold % span, 0);
        assert!(threshold <= 1u64 << 32);
        assert!((1u64 << 32) - threshold < span);
    }

    #[test]
    fn test_choice_returns_slice_element() {
        let mut source = OsEntropy::new().unwrap();
        let items = ['a', 'b', 'c'];
        for _ in 0..100 {
            let picked = source.choice(&items).unwrap();
            assert!(items.contains(picked));
        }
    }

    #[test]
    fn test_scripted_replays_in_order() {
        let mut source = ScriptedEntropy::new([2, 0, 1]);
        assert_eq!(source.next_int(0, 9).unwrap(), 2);
        assert_eq!(source.next_int(0, 9).unwrap(), 0);
        assert_eq!(source.next_int(0, 9).unwrap(), 1);
    }

    #[test]
    fn test_scripted_reduces_modulo_span() {
        let mut source = ScriptedEntropy::new([12]);
        assert_eq!(source.next_int(0, 9).unwrap(), 2);
    }

    #[test]
    fn test_scripted_exhausted_yields_zero() {
        let mut source = ScriptedEntropy::new([]);
        assert_eq!(source.next_int(5, 9).unwrap(), 5);
        let items = ["first", "second"];
        assert_eq!(*source.choice(&items).unwrap(), "first");
    }
}
