//! Integration tests for sonoqc-cli.
//!
//! Tests run the built `sonoqc` binary on synthetic PCM piped through stdin
//! or written to temporary files, and check stdout and the exit status.

use std::f32::consts::PI;
use std::io::Write;
use std::process::{Command, Output, Stdio};

use sonoqc_io::{SampleWidth, StereoFrame, encode_frames};

/// Helper to get the path to the `sonoqc` binary built by cargo.
fn sonoqc_bin() -> Command {
    let mut command = Command::new(env!("CARGO_BIN_EXE_sonoqc"));
    command.env_remove("RUST_LOG");
    command
}

/// Run `sonoqc` with `args`, feeding `stdin` bytes.
fn run_with_stdin(args: &[&str], stdin: &[u8]) -> Output {
    let mut child = sonoqc_bin()
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("failed to spawn sonoqc");

    {
        let mut pipe = child.stdin.take().unwrap();
        // The binary may exit before reading everything on error paths.
        let _ = pipe.write_all(stdin);
    }
    child.wait_with_output().expect("failed to wait for sonoqc")
}

/// Left: bin-centred tone at bin 100 of 1024; right: silence.
fn left_tone_pcm(frames: usize, width: SampleWidth) -> Vec<u8> {
    let tone = (0..frames).map(|i| {
        let phase = 2.0 * PI * ((100 * i) % 1024) as f32 / 1024.0;
        StereoFrame::new(0.5 * phase.sin(), 0.0)
    });
    encode_frames(tone, width)
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

// ---------------------------------------------------------------------------
// thdn
// ---------------------------------------------------------------------------

#[test]
fn thdn_tone_left_silence_right() {
    let pcm = left_tone_pcm(1024, SampleWidth::Bits32);
    let output = run_with_stdin(&["thdn", "-p", "1024", "--no-high-pass"], &pcm);

    // Right channel THD+n is 100 %, above the 1 % default limit.
    assert_eq!(output.status.code(), Some(8), "stderr: {}", String::from_utf8_lossy(&output.stderr));

    let text = stdout(&output);
    let values: Vec<f64> = text
        .trim()
        .split(',')
        .map(|v| v.trim().parse().unwrap())
        .collect();
    assert_eq!(values.len(), 2);
    assert!(values[0] < 0.1, "left THD+n {}", values[0]);
    assert_eq!(values[1], 100.0);
    assert_eq!(text.trim_end().split(',').nth(1), Some("100.000"));
}

#[test]
fn thdn_left_only_passes() {
    let pcm = left_tone_pcm(1024, SampleWidth::Bits16);
    let output = run_with_stdin(
        &["thdn", "-", "-p", "1024", "-b", "16", "-c", "left", "--no-high-pass"],
        &pcm,
    );

    assert_eq!(output.status.code(), Some(0));
    assert_eq!(stdout(&output).trim().split(',').count(), 1);
}

#[test]
fn thdn_verbose_goes_to_stderr() {
    let pcm = left_tone_pcm(1024, SampleWidth::Bits32);
    let output = run_with_stdin(&["thdn", "-v", "-p", "1024", "--no-high-pass"], &pcm);

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Left   Signal:"), "stderr: {stderr}");
    assert!(stderr.contains("Right THD+n: 100.000%"), "stderr: {stderr}");
    assert!(!stderr.contains("input opened"), "stderr: {stderr}");
    assert!(stdout(&output).is_empty());

    let output = run_with_stdin(&["thdn", "-vv", "-p", "1024", "--no-high-pass"], &pcm);
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("input opened"), "stderr: {stderr}");
}

#[test]
fn thdn_max_flags_match_rms_letters() {
    let pcm = left_tone_pcm(1024, SampleWidth::Bits32);

    // Right is silent (100 %); raising only its limit clears the verdict.
    let output = run_with_stdin(&["thdn", "-p", "1024", "--no-high-pass", "-X", "150"], &pcm);
    assert_eq!(output.status.code(), Some(0));

    let output = run_with_stdin(
        &["thdn", "-p", "1024", "--no-high-pass", "-x", "0", "-X", "150"],
        &pcm,
    );
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn thdn_unbounded_half_width_is_all_signal() {
    let pcm = left_tone_pcm(1024, SampleWidth::Bits32);
    let output = run_with_stdin(
        &["thdn", "-p", "1024", "--no-high-pass", "-c", "left", "-w", "18446744073709551615"],
        &pcm,
    );

    assert_eq!(output.status.code(), Some(0), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    assert_eq!(stdout(&output).trim(), "0.000");
}

#[test]
fn thdn_json_report() {
    let pcm = left_tone_pcm(2048, SampleWidth::Bits32);
    let output = run_with_stdin(
        &["thdn", "-p", "1024", "-n", "2", "--no-high-pass", "--json"],
        &pcm,
    );
    assert_eq!(output.status.code(), Some(8));

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["averages"], 2);
    assert_eq!(report["fail_flags"], 8);
    assert_eq!(report["channels"][0]["channel"], "Left");
    assert_eq!(report["channels"][0]["fundamental_bin"], 100);
    assert_eq!(report["channels"][1]["pass"], false);
}

#[test]
fn thdn_with_high_pass_needs_priming_frames() {
    // 4800 priming frames minus one plus one block.
    let pcm = left_tone_pcm(4799 + 1024, SampleWidth::Bits32);
    let output = run_with_stdin(&["thdn", "-p", "1024", "-c", "left"], &pcm);
    assert_eq!(output.status.code(), Some(0));

    let short = left_tone_pcm(1024, SampleWidth::Bits32);
    let output = run_with_stdin(&["thdn", "-p", "1024", "-c", "left"], &short);
    assert_eq!(output.status.code(), Some(16));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("insufficient input"), "stderr: {stderr}");
}

#[test]
fn truncated_input_fails_unless_padded() {
    let pcm = left_tone_pcm(1000, SampleWidth::Bits32);

    let strict = run_with_stdin(&["thdn", "-p", "1024", "--no-high-pass"], &pcm);
    assert_eq!(strict.status.code(), Some(16));
    assert!(strict.stdout.is_empty());

    let padded = run_with_stdin(&["thdn", "-p", "1024", "--no-high-pass", "--pad"], &pcm);
    assert_ne!(padded.status.code(), Some(16));
    assert!(!padded.stdout.is_empty());
}

#[test]
fn invalid_fft_size_is_a_config_error() {
    let output = run_with_stdin(&["thdn", "-p", "1000"], &[]);
    assert_eq!(output.status.code(), Some(16));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("power of two"), "stderr: {stderr}");
}

#[test]
fn unknown_flag_is_an_error_not_a_verdict() {
    let output = run_with_stdin(&["thdn", "--no-such-flag"], &[]);
    assert_eq!(output.status.code(), Some(16));
}

#[test]
fn skip_bytes_and_seconds() {
    let mut pcm = vec![0x55; 6];
    pcm.extend(encode_frames(vec![StereoFrame::new(0.9, 0.9); 480], SampleWidth::Bits16));
    pcm.extend(left_tone_pcm(1024, SampleWidth::Bits16));

    let output = run_with_stdin(
        &["thdn", "-p", "1024", "-b", "16", "-e", "6", "-s", "0.01", "-c", "left", "--no-high-pass"],
        &pcm,
    );
    assert_eq!(output.status.code(), Some(0), "stderr: {}", String::from_utf8_lossy(&output.stderr));
}

// ---------------------------------------------------------------------------
// spectrum
// ---------------------------------------------------------------------------

#[test]
fn spectrum_csv_to_stdout() {
    let pcm = left_tone_pcm(1024, SampleWidth::Bits32);
    let output = run_with_stdin(&["spectrum", "-p", "1024"], &pcm);
    assert!(output.status.success());

    let text = stdout(&output);
    let mut lines = text.lines();
    assert_eq!(lines.next(), Some("Freq (Hz),Left,Right"));
    assert_eq!(lines.count(), 428);

    let peak = text
        .lines()
        .skip(1)
        .max_by(|a, b| {
            let amp = |l: &str| l.split(',').nth(1).unwrap().trim().parse::<f64>().unwrap();
            amp(a).partial_cmp(&amp(b)).unwrap()
        })
        .unwrap();
    assert!(peak.starts_with(" 4687.50,"), "peak row {peak}");
}

#[test]
fn spectrum_csv_to_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("spectrum.csv");
    let pcm = left_tone_pcm(1024, SampleWidth::Bits32);

    let output = run_with_stdin(
        &["spectrum", "-p", "1024", "-c", "right", "-o", path.to_str().unwrap()],
        &pcm,
    );
    assert!(output.status.success());
    assert!(output.stdout.is_empty());

    let text = std::fs::read_to_string(&path).unwrap();
    assert!(text.starts_with("Freq (Hz),Right\n"));
}

// ---------------------------------------------------------------------------
// rms
// ---------------------------------------------------------------------------

#[test]
fn rms_from_file_with_limits() {
    let file = tempfile::NamedTempFile::new().unwrap();
    std::fs::write(
        file.path(),
        encode_frames(vec![StereoFrame::new(0.5, -0.25); 4800], SampleWidth::Bits32),
    )
    .unwrap();
    let path = file.path().to_str().unwrap();

    let output = sonoqc_bin()
        .args(["rms", path, "-d", "0.1"])
        .output()
        .expect("failed to run sonoqc rms");
    assert!(output.status.success());
    assert_eq!(stdout(&output).trim(), "50.000000,25.000000");

    let output = sonoqc_bin()
        .args(["rms", path, "-d", "0.1", "-x", "40", "-M", "30"])
        .output()
        .expect("failed to run sonoqc rms");
    assert_eq!(output.status.code(), Some(2 | 4));
}

#[test]
fn rms_missing_file_is_an_error() {
    let output = sonoqc_bin()
        .args(["rms", "/nonexistent/capture.raw"])
        .output()
        .expect("failed to run sonoqc rms");
    assert_eq!(output.status.code(), Some(16));
    assert!(String::from_utf8_lossy(&output.stderr).contains("failed to open input"));
}

// ---------------------------------------------------------------------------
// configuration
// ---------------------------------------------------------------------------

#[test]
fn config_file_with_flag_override() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("qc.toml");
    std::fs::write(&config, "fft_size = 1024\nhigh_pass = false\nchannels = \"left\"\n").unwrap();

    let output = sonoqc_bin()
        .args(["thdn", "--config", config.to_str().unwrap(), "-n", "3", "--print-config"])
        .output()
        .expect("failed to run sonoqc thdn");
    assert!(output.status.success());

    let text = stdout(&output);
    assert!(text.contains("fft_size = 1024"), "{text}");
    assert!(text.contains("averages = 3"), "{text}");
    assert!(text.contains("channels = \"left\""), "{text}");
}

#[test]
fn help_exits_successfully() {
    let output = sonoqc_bin().arg("--help").output().expect("failed to run sonoqc --help");
    assert!(output.status.success());
    let text = stdout(&output);
    for command in ["thdn", "spectrum", "rms"] {
        assert!(text.contains(command), "help should list '{command}'");
    }
}
