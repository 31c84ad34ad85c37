use core::mem;

/// u32-key radix sort for SoA (inds/vals).
/// - Sorts by inds ascending
/// - Reorders vals accordingly
/// - Stable
///
/// Used to order the column indices of each matrix row, which arrive in hash
/// order from the accumulator.
///
/// Complexity: 4 passes, each O(n + 256)
#[inline]
pub fn radix_sort_u32_soa<N: Copy>(inds: &mut [u32], vals: &mut [N]) {
    assert_eq!(inds.len(), vals.len());
    let n = inds.len();
    if n <= 1 {
        return;
    }

    // Small sizes: insertion sort beats allocating scratch.
    if n <= 32 {
        insertion_sort_u32_soa(inds, vals);
        return;
    }

    let mut inds_tmp = vec![0u32; n];
    let mut vals_tmp: Vec<N> = vals.to_vec();

    let mut src_inds: &mut [u32] = inds;
    let mut src_vals: &mut [N] = vals;
    let mut dst_inds: &mut [u32] = &mut inds_tmp;
    let mut dst_vals: &mut [N] = &mut vals_tmp;
    let mut in_scratch = false;

    // LSD, byte 0..3
    for shift in [0u32, 8, 16, 24] {
        let mut count = [0usize; 256];
        for &k in src_inds.iter() {
            count[((k >> shift) & 0xFF) as usize] += 1;
        }
        // all keys share this byte: pass is a no-op
        if count.iter().any(|&c| c == n) {
            continue;
        }

        let mut sum = 0usize;
        for c in count.iter_mut() {
            let tmp = *c;
            *c = sum;
            sum += tmp;
        }

        for idx in 0..n {
            let k = src_inds[idx];
            let b = ((k >> shift) & 0xFF) as usize;
            let pos = count[b];
            count[b] = pos + 1;
            dst_inds[pos] = k;
            dst_vals[pos] = src_vals[idx];
        }

        mem::swap(&mut src_inds, &mut dst_inds);
        mem::swap(&mut src_vals, &mut dst_vals);
        in_scratch = !in_scratch;
    }

    // skipped passes can leave the result in the scratch buffers
    if in_scratch {
        dst_inds.copy_from_slice(src_inds);
        dst_vals.copy_from_slice(src_vals);
    }
}

/// Tiny insertion sort for small n (SoA).
#[inline]
fn insertion_sort_u32_soa<N: Copy>(inds: &mut [u32], vals: &mut [N]) {
    let n = inds.len();
    for i in 1..n {
        let mut j = i;
        while j > 0 && inds[j] < inds[j - 1] {
            inds.swap(j, j - 1);
            vals.swap(j, j - 1);
            j -= 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// stable baseline: sort by (key, original position)
    fn baseline_stable_sort<N: Copy>(inds: &[u32], vals: &[N]) -> (Vec<u32>, Vec<N>) {
        let mut pairs: Vec<(u32, usize, N)> = inds
            .iter()
            .copied()
            .enumerate()
            .map(|(i, k)| (k, i, vals[i]))
            .collect();
        pairs.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.cmp(&b.1)));
        pairs.into_iter().map(|(k, _, v)| (k, v)).unzip()
    }

    /// tiny deterministic PRNG (xorshift32)
    struct Rng(u32);
    impl Rng {
        fn next_u32(&mut self) -> u32 {
            let mut x = self.0;
            x ^= x << 13;
            x ^= x >> 17;
            x ^= x << 5;
            self.0 = x;
            x
        }
    }

    #[test]
    fn handles_empty_and_single() {
        let mut inds: Vec<u32> = vec![];
        let mut vals: Vec<u32> = vec![];
        radix_sort_u32_soa(&mut inds, &mut vals);
        assert!(inds.is_empty());

        let mut inds = vec![42u32];
        let mut vals = vec![7u32];
        radix_sort_u32_soa(&mut inds, &mut vals);
        assert_eq!((inds, vals), (vec![42], vec![7]));
    }

    #[test]
    fn keeps_pairs_together_on_duplicates() {
        let mut inds = vec![3u32, 1, 3, 2, 1, 3, 0];
        let mut vals: Vec<u32> = (0..inds.len() as u32).collect();
        let (base_k, base_v) = baseline_stable_sort(&inds, &vals);
        radix_sort_u32_soa(&mut inds, &mut vals);
        assert_eq!(inds, base_k);
        assert_eq!(vals, base_v);
    }

    #[test]
    fn matches_baseline_many_sizes() {
        let mut rng = Rng(0x1234_5678);
        for &n in &[0usize, 2, 31, 32, 33, 64, 65, 129, 1024] {
            for mask in [0x0000_00FFu32, 0x0000_FFFF, 0x00FF_FFFF, u32::MAX] {
                let inds: Vec<u32> = (0..n).map(|_| rng.next_u32() & mask).collect();
                let vals: Vec<u32> = (0..n as u32).collect();
                let (base_k, base_v) = baseline_stable_sort(&inds, &vals);

                let (mut k, mut v) = (inds.clone(), vals.clone());
                radix_sort_u32_soa(&mut k, &mut v);
                assert_eq!(k, base_k, "keys mismatch at n={n} mask={mask:#x}");
                assert_eq!(v, base_v, "vals mismatch at n={n} mask={mask:#x}");
            }
        }
    }

    #[test]
    fn extremes() {
        let mut inds: Vec<u32> = (0..40).map(|i| if i % 2 == 0 { u32::MAX - i } else { i }).collect();
        let mut vals: Vec<u32> = (0..40).collect();
        let (base_k, base_v) = baseline_stable_sort(&inds, &vals);
        radix_sort_u32_soa(&mut inds, &mut vals);
        assert_eq!(inds, base_k);
        assert_eq!(vals, base_v);
    }
}
