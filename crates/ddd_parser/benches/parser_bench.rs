use criterion::{Criterion, black_box, criterion_group, criterion_main};
use ddd_parser::writer::{BlendWriter, DnaBuilder, StructData};
use ddd_parser::{BlendFile, block_code};

/// A file with `count` objects linked into one list
fn synthetic_file(count: u64) -> Vec<u8> {
    let mut builder = DnaBuilder::new(8);
    builder
        .add_struct("ID", &[("void", "*next"), ("void", "*prev"), ("char", "name[66]")])
        .expect("ID struct")
        .add_struct("Object", &[("ID", "id"), ("float", "loc[3]"), ("short", "rotmode")])
        .expect("Object struct");
    let dna = builder.build().expect("valid DNA");

    let mut writer = BlendWriter::legacy(8, 405).expect("legacy header");
    for i in 0..count {
        let address = 0x1000 + i * 0x100;
        let next = if i + 1 < count { address + 0x100 } else { 0 };
        let mut object = StructData::new(&dna, "Object").expect("Object data");
        object
            .set_ptr("id.next", next)
            .and_then(|o| o.set_str("id.name", &format!("OBObject.{i:04}")))
            .and_then(|o| o.set_f32s("loc", &[i as f32, 0.0, 0.0]))
            .expect("object fields");
        writer.add_struct("OB", address, &object);
    }
    writer.finish(&builder).expect("file bytes")
}

fn benchmark_parse_from_bytes(c: &mut Criterion) {
    for count in [10, 1_000] {
        let bytes = synthetic_file(count);
        c.bench_function(&format!("parse_blend_bytes_{count}"), |b| {
            b.iter(|| {
                let file = BlendFile::from_bytes(black_box(bytes.clone())).expect("parse");
                black_box(file.blocks_len())
            })
        });
    }
}

fn benchmark_field_reads(c: &mut Criterion) {
    let file = BlendFile::from_bytes(synthetic_file(1_000)).expect("parse");
    let objects = file.blocks_by_type(&block_code("OB")).to_vec();

    c.bench_function("read_field_f32_array", |b| {
        b.iter(|| {
            let mut sum = 0.0f32;
            for &index in &objects {
                let view = file.field_view(index).expect("view");
                sum += view.read_field_f32_array::<3>("Object", "loc").expect("loc")[0];
            }
            black_box(sum)
        })
    });

    c.bench_function("read_field_string", |b| {
        b.iter(|| {
            for &index in objects.iter().take(100) {
                let view = file.field_view(index).expect("view");
                black_box(view.read_field_string("Object", "id.name").expect("name"));
            }
        })
    });
}

fn benchmark_find_block_by_address(c: &mut Criterion) {
    let file = BlendFile::from_bytes(synthetic_file(1_000)).expect("parse");

    c.bench_function("find_block_by_address", |b| {
        b.iter(|| black_box(file.find_block_by_address(black_box(0x1000 + 500 * 0x100))))
    });
}

criterion_group!(
    benches,
    benchmark_parse_from_bytes,
    benchmark_field_reads,
    benchmark_find_block_by_address
);
criterion_main!(benches);
