//! Secret permutations.

use rand::{CryptoRng, Rng};

use super::errors::ShuffleError;

/// Draw a uniformly random permutation of `0..k` (Fisher–Yates).
pub fn random_permutation<R: Rng + CryptoRng>(k: usize, rng: &mut R) -> Vec<usize> {
    let mut pi: Vec<usize> = (0..k).collect();
    for i in (1..k).rev() {
        let j = rng.gen_range(0..=i);
        pi.swap(i, j);
    }
    pi
}

/// Check that `pi` is a bijection on `0..pi.len()`.
pub fn validate(pi: &[usize]) -> Result<(), ShuffleError> {
    let mut seen = vec![false; pi.len()];
    for &target in pi {
        match seen.get_mut(target) {
            Some(slot) if !*slot => *slot = true,
            _ => return Err(ShuffleError::InvalidPermutation),
        }
    }
    Ok(())
}

/// Inverse permutation: `inverse(pi)[pi[i]] == i`.
pub fn inverse(pi: &[usize]) -> Vec<usize> {
    let mut inv = vec![0; pi.len()];
    for (i, &target) in pi.iter().enumerate() {
        inv[target] = i;
    }
    inv
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::OsRng;

    #[test]
    fn test_random_permutation_is_valid() {
        for k in 0..20 {
            let pi = random_permutation(k, &mut OsRng);
            assert_eq!(pi.len(), k);
            validate(&pi).unwrap();
        }
    }

    #[test]
    fn test_validate_rejects_duplicates() {
        assert!(validate(&[0, 0, 1]).is_err());
        assert!(validate(&[0, 3, 1]).is_err());
        assert!(validate(&[2, 0, 3, 1]).is_ok());
    }

    #[test]
    fn test_inverse() {
        let pi = [2, 0, 3, 1];
        let inv = inverse(&pi);
        for (i, &p) in pi.iter().enumerate() {
            assert_eq!(inv[p], i);
        }
    }
}
