//! Round-trips `zsyncmake` and `zsync` against a local seed, verifying the
//! two binaries agree on a control file without any network access.

use std::fs;
use std::io::Write;

use assert_cmd::Command;

#[test]
fn generator_then_client_reconstruct_an_identical_seed() {
    let dir = tempfile::tempdir().unwrap();
    let source_path = dir.path().join("payload.bin");
    let mut source = fs::File::create(&source_path).unwrap();
    let payload: Vec<u8> = (0..20_000u32).map(|i| (i % 251) as u8).collect();
    source.write_all(&payload).unwrap();
    drop(source);

    let control_path = dir.path().join("payload.bin.zsync");

    Command::cargo_bin("zsyncmake")
        .unwrap()
        .args([
            "-u",
            "http://example.invalid/payload.bin",
            "-o",
            control_path.to_str().unwrap(),
            source_path.to_str().unwrap(),
        ])
        .assert()
        .success();

    assert!(control_path.exists());

    let seed_path = dir.path().join("seed.bin");
    fs::copy(&source_path, &seed_path).unwrap();

    let output_path = dir.path().join("reconstructed.bin");

    Command::cargo_bin("zsync")
        .unwrap()
        .args([
            "-i",
            seed_path.to_str().unwrap(),
            "-o",
            output_path.to_str().unwrap(),
            control_path.to_str().unwrap(),
        ])
        .assert()
        .success();

    let reconstructed = fs::read(&output_path).unwrap();
    assert_eq!(reconstructed, payload);
}

#[test]
fn generator_rejects_stdin_input_without_an_outfile() {
    Command::cargo_bin("zsyncmake")
        .unwrap()
        .args(["-u", "http://example.invalid/x"])
        .write_stdin("hello world")
        .assert()
        .code(2);
}
