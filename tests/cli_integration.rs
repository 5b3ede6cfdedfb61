//! CLI integration tests
//!
//! Tests the command-line interface end-to-end.

use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Output, Stdio};
use tempfile::TempDir;

/// Base64url of the key bytes 0x00..=0x1f, as stored in testdata/test.key.
const TEST_KEY: &str = "AAECAwQFBgcICQoLDA0ODxAREhMUFRYXGBkaGxwdHh8";

/// Base64url of 24 bytes of 0x07, the nonce used for testdata/hello.txt.ccb.
const TEST_NONCE: &str = "BwcHBwcHBwcHBwcHBwcHBwcHBwcHBwcH";

fn chachabox_bin() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_chachabox"))
}

/// Run chachabox with the key supplied on stdin
fn run_chachabox_with_key(args: &[&str], key: &str) -> Output {
    let mut child = Command::new(chachabox_bin())
        .arg("--key-stdin")
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("failed to spawn chachabox");

    {
        let stdin = child.stdin.as_mut().expect("failed to open stdin");
        // Ignore BrokenPipe errors - the command may exit before reading stdin
        // if it encounters an error (e.g., file not found)
        let _ = stdin.write_all(key.as_bytes());
    }

    child.wait_with_output().expect("failed to wait for chachabox")
}

fn run_chachabox(args: &[&str]) -> Output {
    Command::new(chachabox_bin())
        .args(args)
        .stdin(Stdio::null())
        .output()
        .expect("failed to run chachabox")
}

/// Get path to testdata directory
fn testdata_path(filename: &str) -> PathBuf {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("testdata");
    path.push(filename);
    path
}

/// Decrypt known ciphertext.
#[test]
fn test_decrypt_known_ciphertext() {
    let temp_dir = TempDir::new().unwrap();
    let output = temp_dir.path().join("hello-decrypted.txt");

    let result = run_chachabox(&[
        "--key-file",
        testdata_path("test.key").to_str().unwrap(),
        "decrypt",
        "-i",
        testdata_path("hello.txt.ccb").to_str().unwrap(),
        "-o",
        output.to_str().unwrap(),
        "--nonce",
        TEST_NONCE,
    ]);

    assert!(
        result.status.success(),
        "decrypt failed: {}",
        String::from_utf8_lossy(&result.stderr)
    );

    let decrypted = fs::read_to_string(&output).unwrap();
    let expected = fs::read_to_string(testdata_path("hello.txt")).unwrap();
    assert_eq!(decrypted, expected);
}

#[test]
fn test_encrypt_decrypt_roundtrip_with_generated_nonce() {
    let temp_dir = TempDir::new().unwrap();
    let plaintext_path = testdata_path("hello.txt");
    let encrypted_path = temp_dir.path().join("hello.txt.ccb");
    let decrypted_path = temp_dir.path().join("hello-decrypted.txt");

    let result = run_chachabox_with_key(
        &[
            "encrypt",
            "-i",
            plaintext_path.to_str().unwrap(),
            "-o",
            encrypted_path.to_str().unwrap(),
        ],
        TEST_KEY,
    );
    assert!(
        result.status.success(),
        "encrypt failed: {}",
        String::from_utf8_lossy(&result.stderr)
    );

    let nonce = String::from_utf8(result.stdout).unwrap();
    let nonce = nonce.trim();
    assert_eq!(nonce.len(), 32, "expected a 24-byte base64url nonce");

    let result = run_chachabox_with_key(
        &[
            "decrypt",
            "-i",
            encrypted_path.to_str().unwrap(),
            "-o",
            decrypted_path.to_str().unwrap(),
            "--nonce",
            nonce,
        ],
        TEST_KEY,
    );
    assert!(
        result.status.success(),
        "decrypt failed: {}",
        String::from_utf8_lossy(&result.stderr)
    );

    let original = fs::read_to_string(&plaintext_path).unwrap();
    let decrypted = fs::read_to_string(&decrypted_path).unwrap();
    assert_eq!(original, decrypted);
}

#[test]
fn test_standard_variant_roundtrip() {
    let temp_dir = TempDir::new().unwrap();
    let plaintext_path = temp_dir.path().join("plain.txt");
    let encrypted_path = temp_dir.path().join("plain.ccb");
    let decrypted_path = temp_dir.path().join("decrypted.txt");
    fs::write(&plaintext_path, "standard nonce content").unwrap();

    let result = run_chachabox(&["--variant", "standard", "nonce"]);
    assert!(result.status.success());
    let nonce = String::from_utf8(result.stdout).unwrap().trim().to_string();
    assert_eq!(nonce.len(), 16, "expected a 12-byte base64url nonce");

    let result = run_chachabox_with_key(
        &[
            "--variant",
            "standard",
            "encrypt",
            "-i",
            plaintext_path.to_str().unwrap(),
            "-o",
            encrypted_path.to_str().unwrap(),
            "--nonce",
            nonce.as_str(),
        ],
        TEST_KEY,
    );
    assert!(
        result.status.success(),
        "encrypt failed: {}",
        String::from_utf8_lossy(&result.stderr)
    );
    assert!(result.stdout.is_empty(), "supplied nonce must not be echoed");

    let result = run_chachabox_with_key(
        &[
            "--variant",
            "standard",
            "decrypt",
            "-i",
            encrypted_path.to_str().unwrap(),
            "-o",
            decrypted_path.to_str().unwrap(),
            "--nonce",
            nonce.as_str(),
        ],
        TEST_KEY,
    );
    assert!(result.status.success());
    assert_eq!(
        fs::read_to_string(&decrypted_path).unwrap(),
        "standard nonce content"
    );
}

#[test]
fn test_nonce_command_produces_distinct_values() {
    let first = run_chachabox(&["nonce"]);
    let second = run_chachabox(&["nonce"]);
    assert!(first.status.success());
    assert!(second.status.success());
    assert_ne!(first.stdout, second.stdout);
}

#[test]
fn test_decrypt_with_wrong_key_fails() {
    let temp_dir = TempDir::new().unwrap();
    let output = temp_dir.path().join("output.txt");

    let result = run_chachabox_with_key(
        &[
            "decrypt",
            "-i",
            testdata_path("hello.txt.ccb").to_str().unwrap(),
            "-o",
            output.to_str().unwrap(),
            "--nonce",
            TEST_NONCE,
        ],
        "AQECAwQFBgcICQoLDA0ODxAREhMUFRYXGBkaGxwdHh8",
    );

    assert!(!result.status.success());
    let stderr = String::from_utf8_lossy(&result.stderr);
    assert!(
        stderr.contains("failed to decrypt"),
        "Expected error message about decryption, got: {}",
        stderr
    );
    assert!(!output.exists());
}

#[test]
fn test_nonce_of_wrong_variant_fails() {
    let temp_dir = TempDir::new().unwrap();
    let output = temp_dir.path().join("output.txt");

    let result = run_chachabox_with_key(
        &[
            "--variant",
            "standard",
            "decrypt",
            "-i",
            testdata_path("hello.txt.ccb").to_str().unwrap(),
            "-o",
            output.to_str().unwrap(),
            "--nonce",
            TEST_NONCE,
        ],
        TEST_KEY,
    );

    assert!(!result.status.success());
    let stderr = String::from_utf8_lossy(&result.stderr);
    assert!(stderr.contains("nonce"), "got: {}", stderr);
}

#[test]
fn test_decrypt_nonexistent_file_fails() {
    let temp_dir = TempDir::new().unwrap();
    let nonexistent = temp_dir.path().join("nonexistent.ccb");
    let output = temp_dir.path().join("output.txt");

    let result = run_chachabox_with_key(
        &[
            "decrypt",
            "-i",
            nonexistent.to_str().unwrap(),
            "-o",
            output.to_str().unwrap(),
            "--nonce",
            TEST_NONCE,
        ],
        TEST_KEY,
    );

    assert!(!result.status.success());
    let stderr = String::from_utf8_lossy(&result.stderr);
    assert!(stderr.contains("failed to read from"), "got: {}", stderr);
}

#[test]
fn test_unknown_variant_rejected() {
    let result = run_chachabox(&["--variant", "xchacha", "nonce"]);
    assert!(!result.status.success());
}
