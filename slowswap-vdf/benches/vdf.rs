// Copyright (c) 2022, Mysten Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

#[macro_use]
extern crate criterion;

use criterion::{BenchmarkId, Criterion};
use num_bigint::BigUint;
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use slowswap_vdf::rsa_group::modulus::DEFAULT_MODULUS;
use slowswap_vdf::rsa_group::RSAGroupElement;
use slowswap_vdf::seed::{derive_seed, generate_x, Address, Quantity, TradeDigestInputs};
use slowswap_vdf::vdf::wesolowski::fiat_shamir::generate_challenge;
use slowswap_vdf::vdf::wesolowski::WesolowskisVDF;
use slowswap_vdf::vdf::{NoCheckpoint, VDF};

fn random_input(rng: &mut StdRng) -> RSAGroupElement {
    let mut bytes = [0u8; 32];
    rng.fill_bytes(&mut bytes);
    RSAGroupElement::new(BigUint::from_bytes_be(&bytes), DEFAULT_MODULUS.clone())
}

fn evaluate(c: &mut Criterion) {
    let mut group = c.benchmark_group("VDF evaluate".to_string());
    let mut rng = StdRng::seed_from_u64(42);

    for iterations in [1_000u64, 10_000, 100_000] {
        let vdf = WesolowskisVDF::new(DEFAULT_MODULUS.clone(), iterations).unwrap();
        let input = random_input(&mut rng);
        group.bench_with_input(
            BenchmarkId::from_parameter(iterations),
            &iterations,
            |b, _| b.iter(|| vdf.evaluate(&input).unwrap()),
        );
    }
}

fn prove(c: &mut Criterion) {
    let mut group = c.benchmark_group("VDF prove".to_string());
    let mut rng = StdRng::seed_from_u64(42);

    for iterations in [1_000u64, 10_000] {
        let vdf = WesolowskisVDF::new(DEFAULT_MODULUS.clone(), iterations).unwrap();
        let input = random_input(&mut rng);
        let output = vdf.evaluate_vdf(&input, &mut NoCheckpoint).unwrap();
        let challenge =
            generate_challenge(input.value(), output.value(), vdf.modulus(), iterations).unwrap();
        group.bench_with_input(
            BenchmarkId::from_parameter(iterations),
            &iterations,
            |b, _| b.iter(|| vdf.generate_proof(&input, &challenge, &mut NoCheckpoint).unwrap()),
        );
    }
}

fn start_value(c: &mut Criterion) {
    let path: Vec<Address> = (1..=4u8).map(|i| Address::new([i; 20])).collect();
    let inputs = TradeDigestInputs {
        origin: Address::new([0xaa; 20]),
        path,
        known_qty_in: Quantity::from(1_000_000u64),
        known_qty_out: Quantity::zero(),
    };
    let block_hash = [0x11u8; 32];

    c.bench_function("VDF start value", |b| {
        b.iter(|| {
            let seed = derive_seed(&inputs).unwrap();
            generate_x(&DEFAULT_MODULUS, &seed, &block_hash)
        })
    });
}

criterion_group! {
    name = vdf_benchmarks;
    config = Criterion::default().sample_size(10);
    targets = evaluate, prove, start_value
}

criterion_main!(vdf_benchmarks);
