use rand_core::{Error, RngCore, SeedableRng};

/// Mulberry32, a 32-bit PRNG reused across restarts so the kth random draw
/// in a run is reproducible given a seed. Implements `RngCore` so it slots
/// into the rest of the `rand` ecosystem, but the solver draws its uniform
/// `[0, 1)` samples through `next_f64` directly to match the algorithm
/// bit-for-bit rather than going through `rand`'s own float distributions.
#[derive(Debug, Clone)]
pub struct Mulberry32 {
    state: u32,
}

impl Mulberry32 {
    pub fn new(seed: u32) -> Self {
        Mulberry32 { state: seed }
    }

    /// Fresh state seeded from the OS's randomness source.
    pub fn from_entropy() -> Self {
        let mut buf = [0u8; 4];
        getrandom::getrandom(&mut buf).expect("OS randomness source unavailable");
        Mulberry32::new(u32::from_le_bytes(buf))
    }

    /// Uniform draw in `[0, 1)`, the output of one Mulberry32 step scaled
    /// by 2^32 as specified.
    pub fn next_f64(&mut self) -> f64 {
        self.next_u32() as f64 / 4294967296.0
    }
}

impl RngCore for Mulberry32 {
    fn next_u32(&mut self) -> u32 {
        self.state = self.state.wrapping_add(0x6D2B79F5);
        let mut t = self.state;
        t ^= t >> 15;
        t = t.wrapping_mul(1 | self.state);
        t = t.wrapping_add((t ^ (t >> 7)).wrapping_mul(61 | t));
        t ^ (t >> 14)
    }

    fn next_u64(&mut self) -> u64 {
        rand_core::impls::next_u64_via_u32(self)
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        rand_core::impls::fill_bytes_via_next(self, dest)
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), Error> {
        self.fill_bytes(dest);
        Ok(())
    }
}

impl SeedableRng for Mulberry32 {
    type Seed = [u8; 4];

    fn from_seed(seed: Self::Seed) -> Self {
        Mulberry32::new(u32::from_le_bytes(seed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_sequence() {
        let mut a = Mulberry32::new(42);
        let mut b = Mulberry32::new(42);
        for _ in 0..100 {
            assert_eq!(a.next_u32(), b.next_u32());
        }
    }

    #[test]
    fn f64_draws_stay_in_unit_interval() {
        let mut rng = Mulberry32::new(7);
        for _ in 0..1000 {
            let v = rng.next_f64();
            assert!(v >= 0.0 && v < 1.0);
        }
    }

    #[test]
    fn different_seeds_diverge() {
        let mut a = Mulberry32::new(1);
        let mut b = Mulberry32::new(2);
        assert_ne!(a.next_u32(), b.next_u32());
    }
}
