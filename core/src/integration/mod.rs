//! Integration tests for the loop core
//!
//! Drives a simulated host through full record → playback cycles across the
//! snapshot store, input log, session controller and config.

#[cfg(test)]
mod config_tests;

#[cfg(test)]
pub(crate) mod test_utils {
    use bytemuck::{Pod, Zeroable};

    /// Gamepad-shaped input record
    #[repr(C)]
    #[derive(Clone, Copy, Default, PartialEq, Eq, Debug, Pod, Zeroable)]
    pub struct PadInput {
        pub buttons: u32,
        pub stick_x: i16,
        pub stick_y: i16,
    }

    /// Deterministic host: a state buffer that every frame's input perturbs
    pub struct TestHost {
        pub state: Vec<u8>,
    }

    impl TestHost {
        pub fn new(len: usize, seed: u8) -> Self {
            let state = (0..len)
                .map(|i| (i as u8).wrapping_mul(17).wrapping_add(seed))
                .collect();
            Self { state }
        }

        /// Advance one frame. Touches a handful of bytes spread over the buffer.
        pub fn update(&mut self, input: &PadInput) {
            let len = self.state.len();
            let mut cursor = (input.buttons as usize).wrapping_mul(2_654_435_761) % len;
            for k in 0..8 {
                let delta = (input.stick_x as u8) ^ (input.stick_y as u8).rotate_left(k);
                self.state[cursor] = self.state[cursor].wrapping_add(delta | 1);
                cursor = (cursor + 4099) % len;
            }
        }

        pub fn checksum(&self) -> u64 {
            xxhash_rust::xxh3::xxh3_64(&self.state)
        }
    }

    /// Pseudo-random but reproducible input sequence
    pub fn input_sequence(count: usize, seed: u32) -> Vec<PadInput> {
        let mut x = seed.wrapping_mul(747_796_405).wrapping_add(1);
        (0..count)
            .map(|_| {
                x ^= x << 13;
                x ^= x >> 17;
                x ^= x << 5;
                PadInput {
                    buttons: x,
                    stick_x: (x >> 8) as i16,
                    stick_y: (x >> 16) as i16,
                }
            })
            .collect()
    }
}
