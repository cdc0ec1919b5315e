use rand::seq::SliceRandom;

/// Grid pitch of the dissolve sample set, in backing pixels.
pub const SAMPLE_STEP: u32 = 4;

/// Enumerate a step-4 coordinate grid over a backing buffer and shuffle it
/// in place (Fisher–Yates via `SliceRandom`).
///
/// The shuffled order is the dissolve effect's reveal order. There is no
/// seeding contract: every build is independently randomized and two builds
/// over the same dimensions will almost certainly disagree.
pub fn generate_sample_grid(width: u32, height: u32) -> Vec<(u32, u32)> {
    let per_row = width.div_ceil(SAMPLE_STEP) as usize;
    let rows = height.div_ceil(SAMPLE_STEP) as usize;
    let mut coords = Vec::with_capacity(per_row * rows);
    for y in (0..height).step_by(SAMPLE_STEP as usize) {
        for x in (0..width).step_by(SAMPLE_STEP as usize) {
            coords.push((x, y));
        }
    }
    coords.shuffle(&mut rand::rng());
    coords
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn grid_covers_every_step_coordinate_once() {
        let samples = generate_sample_grid(10, 6);
        let set: HashSet<_> = samples.iter().copied().collect();
        assert_eq!(samples.len(), set.len());

        let mut expected = HashSet::new();
        for y in [0u32, 4] {
            for x in [0u32, 4, 8] {
                expected.insert((x, y));
            }
        }
        assert_eq!(set, expected);
    }

    #[test]
    fn empty_dimensions_yield_no_samples() {
        assert!(generate_sample_grid(0, 8).is_empty());
        assert!(generate_sample_grid(8, 0).is_empty());
    }

    #[test]
    fn single_pixel_buffer_has_one_sample() {
        assert_eq!(generate_sample_grid(1, 1), vec![(0, 0)]);
    }
}
