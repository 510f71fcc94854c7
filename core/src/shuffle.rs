use rand::Rng;

/// Fisher-Yates shuffle: walks the slice backwards swapping each element with a uniformly
/// chosen one at or before it. All state lives in `rng`.
pub fn shuffle<T, R: Rng + ?Sized>(items: &mut [T], rng: &mut R) {
    for i in (1..items.len()).rev() {
        let j = rng.random_range(0..=i);
        items.swap(i, j);
    }
}
