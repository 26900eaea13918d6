use criterion::{Criterion, criterion_group, criterion_main};
use dcmingest::dicom::writer::{SequenceLength, write_file};
use dcmingest::dicom::{Dataset, Element, TransferSyntax, VR, Value, parse_dataset, tags};
use dcmingest::{compute_fingerprint, render_to_raster};
use std::hint::black_box;

const ROWS: u16 = 512;
const COLS: u16 = 512;

/// 512x512 16-bit MONOCHROME2 CT-like slice with a small nested sequence
fn synthetic_ct(syntax: TransferSyntax) -> Vec<u8> {
    let pixels: Vec<u8> = (0..usize::from(ROWS) * usize::from(COLS))
        .flat_map(|i| ((i * 7 % 4096) as u16).to_le_bytes())
        .collect();

    let item = Dataset::from_elements([
        Element::new(tags::SOP_CLASS_UID, VR::UI, Value::Str("1.2.840.10008.5.1.4.1.1.2".into())),
        Element::new(tags::SOP_INSTANCE_UID, VR::UI, Value::Str("1.2.3.4.5.6".into())),
    ])
    .unwrap();

    let dataset = Dataset::from_elements([
        Element::new(tags::SOP_CLASS_UID, VR::UI, Value::Str("1.2.840.10008.5.1.4.1.1.2".into())),
        Element::new(tags::SOP_INSTANCE_UID, VR::UI, Value::Str("1.2.3.4.5.7".into())),
        Element::new(tags::MODALITY, VR::CS, Value::Str("CT".into())),
        Element::new(tags::REFERENCED_IMAGE_SEQUENCE, VR::SQ, Value::Sequence(vec![item])),
        Element::new(tags::PATIENT_NAME, VR::PN, Value::Str("Bench^Patient".into())),
        Element::new(tags::SAMPLES_PER_PIXEL, VR::US, Value::U16(vec![1])),
        Element::new(tags::PHOTOMETRIC_INTERPRETATION, VR::CS, Value::Str("MONOCHROME2".into())),
        Element::new(tags::ROWS, VR::US, Value::U16(vec![ROWS])),
        Element::new(tags::COLUMNS, VR::US, Value::U16(vec![COLS])),
        Element::new(tags::BITS_ALLOCATED, VR::US, Value::U16(vec![16])),
        Element::new(tags::BITS_STORED, VR::US, Value::U16(vec![12])),
        Element::new(tags::PIXEL_REPRESENTATION, VR::US, Value::U16(vec![0])),
        Element::new(tags::PIXEL_DATA, VR::OW, Value::Bytes(pixels)),
    ])
    .unwrap();

    write_file(&dataset, syntax, SequenceLength::Undefined)
}

// ============================================================================
// TIER 1: FULL PIPELINE BENCHMARKS (Primary Baseline)
// ============================================================================

/// Parse, fingerprint and render from raw bytes
fn bench_full_pipeline(c: &mut Criterion) {
    let mut group = c.benchmark_group("full_pipeline");
    let bytes = synthetic_ct(TransferSyntax::ExplicitVrLittleEndian);

    group.bench_function("ct_512x512", |b| {
        b.iter(|| {
            let file = parse_dataset(black_box(&bytes)).unwrap();
            let fingerprint = compute_fingerprint(&file.dataset);
            let png = render_to_raster(&file.dataset).unwrap();
            black_box((fingerprint, png))
        });
    });

    group.finish();
}

// ============================================================================
// TIER 2: COMPONENT-LEVEL BENCHMARKS (Diagnostic)
// ============================================================================

/// Parsing in each transfer syntax
fn bench_dicom_parsing(c: &mut Criterion) {
    let mut group = c.benchmark_group("dicom_parsing");

    for syntax in TransferSyntax::ALL {
        let bytes = synthetic_ct(syntax);
        group.bench_function(syntax.name(), |b| {
            b.iter(|| parse_dataset(black_box(&bytes)).unwrap());
        });
    }

    group.finish();
}

fn bench_fingerprint(c: &mut Criterion) {
    let mut group = c.benchmark_group("fingerprint");
    let file = parse_dataset(&synthetic_ct(TransferSyntax::ExplicitVrLittleEndian)).unwrap();

    group.bench_function("ct_dataset", |b| {
        b.iter(|| compute_fingerprint(black_box(&file.dataset)));
    });

    group.finish();
}

/// Pixel normalization and PNG encoding
fn bench_image_conversion(c: &mut Criterion) {
    let mut group = c.benchmark_group("image_conversion");
    let file = parse_dataset(&synthetic_ct(TransferSyntax::ExplicitVrLittleEndian)).unwrap();

    group.bench_function("decode_ct", |b| {
        b.iter(|| dcmingest::image::decode(black_box(&file.dataset)).unwrap());
    });

    let raster = dcmingest::image::decode(&file.dataset).unwrap();
    group.bench_function("encode_png_ct", |b| {
        b.iter(|| dcmingest::image::encode_png(black_box(&raster)).unwrap());
    });

    group.finish();
}

// ============================================================================
// BENCHMARK REGISTRATION
// ============================================================================

criterion_group!(
    benches,
    // Primary baseline (these run by default with `cargo bench`)
    bench_full_pipeline,
    // Diagnostic benchmarks (help identify bottlenecks)
    bench_dicom_parsing,
    bench_fingerprint,
    bench_image_conversion,
);

criterion_main!(benches);
