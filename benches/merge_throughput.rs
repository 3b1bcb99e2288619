use std::fs::File;
use std::io::Write;
use std::path::PathBuf;

use criterion::{BatchSize, Criterion, criterion_group, criterion_main};
use tempfile::TempDir;
use wave_merge::cli::MergeArgs;
use wave_merge::merge;

fn generate_waves(waves: usize, columns: usize, rows: usize) -> (TempDir, Vec<PathBuf>) {
    let temp_dir = tempfile::tempdir().expect("temp dir");
    let mut paths = Vec::with_capacity(waves);
    for wave in 0..waves {
        let csv_path = temp_dir.path().join(format!("wave{wave}.csv"));
        let mut file = File::create(&csv_path).expect("create csv");
        let header = (0..columns)
            .map(|c| format!("w{wave}_q{c}"))
            .collect::<Vec<_>>()
            .join(",");
        writeln!(file, "{header}").expect("header");
        for row in 0..rows {
            let line = (0..columns)
                .map(|c| {
                    if (row + c) % 7 == 0 {
                        String::new()
                    } else {
                        ((row * (c + 1)) % 5).to_string()
                    }
                })
                .collect::<Vec<_>>()
                .join(",");
            writeln!(file, "{line}").expect("row");
        }

        let sidecar = csv_path.with_extension("codebook.yaml");
        let mut book = File::create(&sidecar).expect("create codebook");
        writeln!(book, "variables:").expect("codebook header");
        for c in 0..columns {
            writeln!(book, "  - name: w{wave}_q{c}").expect("name");
            writeln!(book, "    label: Question {c}").expect("label");
            writeln!(book, "    measure: nominal").expect("measure");
            writeln!(book, "    value_labels:").expect("value labels");
            for v in 0..5 {
                writeln!(book, "      \"{v}\": Category {v}").expect("value label");
            }
        }
        paths.push(csv_path);
    }
    (temp_dir, paths)
}

fn bench_merge(c: &mut Criterion) {
    let (temp_dir, inputs) = generate_waves(8, 40, 500);
    let output = temp_dir.path().join("merged.csv");
    let args = MergeArgs {
        inputs,
        output,
        delimiter: None,
        output_delimiter: None,
        input_encoding: None,
    };

    let mut group = c.benchmark_group("merge");
    group.bench_function("merge_8_waves_40x500", |b| {
        b.iter_batched(
            || (),
            |_| {
                merge::execute(&args).expect("merge waves");
            },
            BatchSize::SmallInput,
        );
    });

    drop(temp_dir);
    group.finish();
}

criterion_group!(benches, bench_merge);
criterion_main!(benches);
