// Copyright (c) 2022, Mysten Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

use assert_cmd::Command;

const MODULUS: &str =
    "44771746775035800231893057667067514385523709770528832291415080542575843241867";

#[test]
fn integration_test_seed() {
    let mut cmd = Command::cargo_bin("vdf-cli").unwrap();
    let result = cmd
        .arg("seed")
        .arg("--origin")
        .arg("0x0000000000000000000000000000000000000000")
        .arg("--amount")
        .arg("1000")
        .ok();
    assert!(result.is_ok());
    let output = String::from_utf8(result.unwrap().stdout).unwrap();
    assert_eq!(
        "Seed: 0x05a93d15c1a5f7075ac35f9445e8e9f56116134009616891d238255c93dcb2a1\n",
        output
    );
}

#[test]
fn integration_test_evaluate() {
    let mut cmd = Command::cargo_bin("vdf-cli").unwrap();
    let result = cmd
        .env_remove("SLOWSWAP_VDF_MODULUS")
        .env_remove("SLOWSWAP_VDF_ITERATIONS")
        .env_remove("SLOWSWAP_VDF_CHECKPOINT_INTERVAL")
        .arg("evaluate")
        .arg("--origin")
        .arg("0x0000000000000000000000000000000000000000")
        .arg("--direction")
        .arg("exact-input")
        .arg("--amount")
        .arg("1000")
        .arg("--block-hash")
        .arg("00".repeat(32))
        .arg("--block-number")
        .arg("0")
        .arg("--modulus")
        .arg(MODULUS)
        .arg("--iterations")
        .arg("100")
        .ok();
    assert!(result.is_ok());
    let output = String::from_utf8(result.unwrap().stdout).unwrap();
    let payload = output.lines().last().unwrap();
    assert_eq!(
        "Payload: 0x000000000000000000000000000000000000000000000000000000000000000147c9782815d9cbf819d35dff059a8876fa98b56bc556c441dc9558dcc88251bf0000000000000000000000000000000000000000000000000000000000000000",
        payload
    );
}

#[test]
fn integration_test_invalid_payload() {
    let mut cmd = Command::cargo_bin("vdf-cli").unwrap();
    cmd.arg("decode")
        .arg("--payload")
        .arg("0x1234")
        .assert()
        .code(65);
}
