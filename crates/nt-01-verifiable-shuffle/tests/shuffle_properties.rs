//! Property tests for the pair shuffle.

use nt_01_verifiable_shuffle::{
    hash_verify, shuffle, shuffle_with_witness, PairShuffleWitness, ShuffleError,
};
use proptest::prelude::*;
use shared_crypto::{random_scalar, GroupElement, Scalar};

fn random_points(k: usize) -> Vec<GroupElement> {
    (0..k).map(|_| GroupElement::random()).collect()
}

fn sorted_bytes<'a>(points: impl Iterator<Item = &'a GroupElement>) -> Vec<Vec<u8>> {
    let mut bytes: Vec<Vec<u8>> = points.map(GroupElement::to_bytes).collect();
    bytes.sort();
    bytes
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(12))]

    #[test]
    fn prop_honest_shuffle_verifies(k in 2usize..7) {
        let g = GroupElement::generator();
        let h = GroupElement::random();
        let x = random_points(k);
        let y = random_points(k);

        let out = shuffle(&g, &h, &x, &y).unwrap();
        let statement = out.prover.statement().clone();
        let proof = out.prover.hash_prove().unwrap();
        prop_assert!(hash_verify(&statement, &proof).is_ok());
    }

    #[test]
    fn prop_single_output_mutation_fails(k in 2usize..6, index in 0usize..6, column in 0usize..2) {
        let index = index % k;
        let g = GroupElement::generator();
        let h = GroupElement::random();
        let x = random_points(k);
        let y = random_points(k);

        let out = shuffle(&g, &h, &x, &y).unwrap();
        let mut statement = out.prover.statement().clone();
        let proof = out.prover.hash_prove().unwrap();

        let target = if column == 0 { &mut statement.xbar[index] } else { &mut statement.ybar[index] };
        *target = *target + g;

        prop_assert!(matches!(hash_verify(&statement, &proof), Err(ShuffleError::InvalidProof)));
    }

    #[test]
    fn prop_single_sigma_mutation_fails(k in 2usize..6, index in 0usize..6) {
        let index = index % k;
        let g = GroupElement::generator();
        let h = GroupElement::random();
        let out = shuffle(&g, &h, &random_points(k), &random_points(k)).unwrap();
        let statement = out.prover.statement().clone();
        let mut proof = out.prover.hash_prove().unwrap();

        proof.sigma[index] += Scalar::ONE;
        prop_assert!(hash_verify(&statement, &proof).is_err());
    }

    #[test]
    fn prop_single_alpha_mutation_fails(k in 2usize..6, index in 0usize..11) {
        let g = GroupElement::generator();
        let h = GroupElement::random();
        let out = shuffle(&g, &h, &random_points(k), &random_points(k)).unwrap();
        let statement = out.prover.statement().clone();
        let mut proof = out.prover.hash_prove().unwrap();

        let index = index % proof.simple.alpha.len();
        proof.simple.alpha[index] += Scalar::ONE;
        prop_assert!(hash_verify(&statement, &proof).is_err());
    }

    #[test]
    fn prop_unblinded_multiset_preserved(k in 2usize..8) {
        let g = GroupElement::generator();
        let h = GroupElement::random();
        let x = random_points(k);
        let y = random_points(k);

        let out = shuffle(&g, &h, &x, &y).unwrap();
        let recovered: Vec<GroupElement> = out
            .ybar
            .iter()
            .zip(&out.h_blinding)
            .map(|(yb, hb)| *yb - *hb)
            .collect();
        prop_assert_eq!(sorted_bytes(recovered.iter()), sorted_bytes(y.iter()));
    }
}

#[test]
fn test_known_permutation_2031() {
    let g = GroupElement::generator();
    let h = GroupElement::random();
    let x = random_points(4);
    let y = random_points(4);
    let witness = PairShuffleWitness {
        permutation: vec![2, 0, 3, 1],
        beta: (0..4).map(|_| random_scalar()).collect(),
    };

    let out = shuffle_with_witness(&g, &h, &x, &y, witness).unwrap();
    for (i, &p) in [2usize, 0, 3, 1].iter().enumerate() {
        assert_eq!(out.ybar[i] - out.h_blinding[i], y[p]);
        assert_ne!(out.ybar[i], y[p]);
    }

    let statement = out.prover.statement().clone();
    let proof = out.prover.hash_prove().unwrap();
    hash_verify(&statement, &proof).unwrap();
}
