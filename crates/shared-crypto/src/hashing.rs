//! SHA-256 hashing and Merkle roots.
//!
//! Merkle construction: leaves are `SHA-256(item)`; each layer pairs nodes
//! left to right, padding an odd layer with a zero node, until one root is
//! left. A single item's root is its leaf hash; an empty set has a zero root.

use sha2::{Digest, Sha256};

/// SHA-256 output (256-bit).
pub type Hash = [u8; 32];

/// Compute SHA-256 hash of data
#[inline]
pub fn sha256(data: &[u8]) -> Hash {
    Sha256::digest(data).into()
}

/// SHA-256 over the concatenation of `parts`.
pub fn sha256_concat(parts: &[&[u8]]) -> Hash {
    let mut hasher = Sha256::new();
    for part in parts {
        hasher.update(part);
    }
    hasher.finalize().into()
}

fn hash_pair(left: &Hash, right: &Hash) -> Hash {
    sha256_concat(&[left, right])
}

/// Merkle root over a list of byte items.
pub fn merkle_root<T: AsRef<[u8]>>(items: &[T]) -> Hash {
    if items.is_empty() {
        return [0u8; 32];
    }

    let mut layer: Vec<Hash> = items.iter().map(|item| sha256(item.as_ref())).collect();
    while layer.len() > 1 {
        if layer.len() % 2 == 1 {
            layer.push([0u8; 32]);
        }
        layer = layer
            .chunks(2)
            .map(|pair| hash_pair(&pair[0], &pair[1]))
            .collect();
    }
    layer[0]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sha256_known_vector() {
        assert_eq!(
            hex::encode(sha256(b"abc")),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_concat_matches_single() {
        assert_eq!(sha256_concat(&[b"ab", b"c"]), sha256(b"abc"));
    }

    #[test]
    fn test_single_item_root_is_leaf() {
        assert_eq!(merkle_root(&[b"only"]), sha256(b"only"));
    }

    #[test]
    fn test_empty_root_is_zero() {
        let empty: [&[u8]; 0] = [];
        assert_eq!(merkle_root(&empty), [0u8; 32]);
    }

    #[test]
    fn test_root_depends_on_order() {
        let a = merkle_root(&[b"x".as_slice(), b"y".as_slice()]);
        let b = merkle_root(&[b"y".as_slice(), b"x".as_slice()]);
        assert_ne!(a, b);
    }

    #[test]
    fn test_odd_layer_padding() {
        let items = [b"a".as_slice(), b"b".as_slice(), b"c".as_slice()];
        let left = hash_pair(&sha256(b"a"), &sha256(b"b"));
        let right = hash_pair(&sha256(b"c"), &[0u8; 32]);
        assert_eq!(merkle_root(&items), hash_pair(&left, &right));
    }
}
