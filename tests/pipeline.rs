use std::io::{BufWriter, Write};
use std::path::Path;

use rs1brc::{mmap, run, run_with, Backend, Config, Error, Strategy};
use tempfile::NamedTempFile;

fn input_file(contents: &[u8]) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("Failed to create temp file");
    file.write_all(contents).unwrap();
    file.flush().unwrap();
    file
}

fn summary(config: &Config, path: &Path) -> String {
    let mut out = Vec::new();
    run_with(config, path, &mut out).unwrap();
    String::from_utf8(out).unwrap()
}

fn configs() -> Vec<Config> {
    let mut configs = Vec::new();
    for backend in [Backend::FixedPoint, Backend::Float] {
        for strategy in [Strategy::Stream, Strategy::Mapped] {
            configs.push(
                Config::default()
                    .with_workers(4)
                    .with_window_size(16)
                    .with_backend(backend)
                    .with_strategy(strategy),
            );
        }
    }
    configs
}

#[test]
fn hamburg_berlin() {
    let file = input_file(b"Hamburg;12.0\nBerlin;5.5\nHamburg;8.0\n");
    for config in configs() {
        assert_eq!(
            summary(&config, file.path()),
            "{Berlin=5.5/5.5/5.5, Hamburg=8.0/10.0/12.0}",
            "{config:?}"
        );
    }
}

#[test]
fn default_run_writes_summary() {
    let file = input_file(b"Hamburg;12.0\nBerlin;5.5\nHamburg;8.0\n");
    let mut out = Vec::new();
    run(file.path(), &mut out).unwrap();
    assert_eq!(out, b"{Berlin=5.5/5.5/5.5, Hamburg=8.0/10.0/12.0}");
}

#[test]
fn negative_zero() {
    let file = input_file(b"Oslo;-0.0\n");
    for config in configs() {
        assert_eq!(summary(&config, file.path()), "{Oslo=0.0/0.0/0.0}", "{config:?}");
    }
}

#[test]
fn last_line_without_newline() {
    let file = input_file(b"Oslo;-3.2\nRome;20.1\nOslo;4.0");
    for config in configs() {
        assert_eq!(
            summary(&config, file.path()),
            "{Oslo=-3.2/0.4/4.0, Rome=20.1/20.1/20.1}",
            "{config:?}"
        );
    }
}

#[test]
fn empty_file() {
    let file = input_file(b"");
    for config in configs() {
        assert_eq!(summary(&config, file.path()), "{}", "{config:?}");
    }
}

#[test]
fn missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("measurements.txt");
    for config in configs() {
        let mut out = Vec::new();
        let result = run_with(&config, &path, &mut out);
        assert!(matches!(result, Err(Error::Open { .. })), "{config:?}");
        assert!(out.is_empty());
    }
}

#[test]
fn malformed_records_abort_without_output() {
    for contents in [&b"Oslo;1.0\n;2.0\n"[..], &b"Oslo;1.0\nRome 2.0\n"[..]] {
        let file = input_file(contents);
        for config in configs() {
            let mut out = Vec::new();
            let result = run_with(&config, file.path(), &mut out);
            assert!(
                matches!(
                    result,
                    Err(Error::EmptyStationName) | Err(Error::MalformedRecord { .. })
                ),
                "{config:?}"
            );
            assert!(out.is_empty());
        }
    }
}

#[test]
fn line_longer_than_window() {
    let file = input_file(b"A station name far longer than the window;1.0\n");
    let config = Config::default().with_window_size(8);
    let mut out = Vec::new();
    let result = run_with(&config, file.path(), &mut out);
    assert!(matches!(result, Err(Error::LineTooLong { window: 8 })));
}

const RECORDS: i64 = 1_000_000;

/// Station `S{j}` receives `(i % 1000 - 499) / 10` for every `i` with `i % 10 == j`.
fn write_synthetic() -> NamedTempFile {
    let file = NamedTempFile::new().expect("Failed to create temp file");
    let mut writer = BufWriter::new(file.reopen().unwrap());
    for i in 0..RECORDS {
        writeln!(writer, "S{};{}", i % 10, tenths(i % 1000 - 499)).unwrap();
    }
    writer.flush().unwrap();
    file
}

fn tenths(value: i64) -> String {
    let sign = if value < 0 { "-" } else { "" };
    format!("{}{}.{}", sign, value.abs() / 10, value.abs() % 10)
}

fn synthetic_summary() -> String {
    let stations = (0..10)
        .map(|j| {
            format!(
                "S{}={}/{}/{}",
                j,
                tenths(j - 499),
                tenths(j - 4),
                tenths(491 + j)
            )
        })
        .collect::<Vec<_>>();
    format!("{{{}}}", stations.join(", "))
}

#[test]
fn million_records_any_partitioning() {
    let file = write_synthetic();
    let expected = synthetic_summary();
    let data = std::fs::read(file.path()).unwrap();

    for parts in [1, 4, 64] {
        let results = mmap::aggregate_slice::<i64>(&data, parts).unwrap();
        assert_eq!(rs1brc::report::format_results(&results).unwrap(), expected);
        let results = mmap::aggregate_slice::<f64>(&data, parts).unwrap();
        assert_eq!(rs1brc::report::format_results(&results).unwrap(), expected);

        let window = if parts == 1 { data.len() + 1 } else { data.len() / parts };
        for backend in [Backend::FixedPoint, Backend::Float] {
            let config = Config::default()
                .with_window_size(window)
                .with_backend(backend);
            let mut out = Vec::new();
            let stats = run_with(&config, file.path(), &mut out).unwrap();
            assert_eq!(String::from_utf8(out).unwrap(), expected);
            assert_eq!(stats.bytes + stats.chunks as u64, data.len() as u64);
            if parts == 1 {
                assert_eq!(stats.chunks, 1);
            } else {
                assert!(stats.chunks >= parts);
            }
        }

        let config = Config::default()
            .with_workers(parts)
            .with_strategy(Strategy::Mapped);
        let mut out = Vec::new();
        let stats = run_with(&config, file.path(), &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), expected);
        assert_eq!(stats.bytes, data.len() as u64);
    }
}

#[test]
fn sum_beyond_reading_range() {
    let file = input_file(b"A;500000000000000000.0\nA;500000000000000000.0\n");
    for backend in [Backend::FixedPoint, Backend::Float] {
        for strategy in [Strategy::Stream, Strategy::Mapped] {
            let config = Config::default()
                .with_workers(1)
                .with_backend(backend)
                .with_strategy(strategy);
            assert_eq!(
                summary(&config, file.path()),
                "{A=500000000000000000.0/500000000000000000.0/500000000000000000.0}",
                "{config:?}"
            );
        }
    }
}

#[test]
fn run_from_inside_a_runtime() {
    let file = input_file(b"Hamburg;12.0\nBerlin;5.5\nHamburg;8.0\n");
    for flavor in ["current", "multi"] {
        let runtime = if flavor == "current" {
            tokio::runtime::Builder::new_current_thread().build().unwrap()
        } else {
            tokio::runtime::Builder::new_multi_thread().build().unwrap()
        };
        let out = runtime.block_on(async {
            let mut out = Vec::new();
            run(file.path(), &mut out).unwrap();
            out
        });
        assert_eq!(out, b"{Berlin=5.5/5.5/5.5, Hamburg=8.0/10.0/12.0}", "{flavor}");
    }
}
