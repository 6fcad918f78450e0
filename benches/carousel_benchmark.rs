//! Benchmarks for carousel selection and definition extraction.
//!
//! Run with: cargo bench

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use pptx_carousel::carousel::{select_pages, PictureSlot, TemplatePattern, TemplateSet};
use pptx_carousel::model::{EmuRect, ImageData};
use pptx_carousel::pptx::{
    add_morph_transitions_to_bytes, MorphOptions, PresentationWriter, Rgb, TextStyle,
};
use pptx_carousel::{NullReporter, PptxParser};

const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

fn reference_templates() -> TemplateSet {
    let pattern = |slots: usize| {
        TemplatePattern::new(
            (0..slots)
                .map(|i| PictureSlot::new(i as f64 * 2.6, 2.5, 2.4, 1.35))
                .collect(),
        )
    };
    TemplateSet::new(vec![pattern(3), pattern(4), pattern(5), pattern(5), pattern(5)])
}

/// A deck with a title, a picture and a filled rectangle on every slide.
fn create_test_deck(slide_count: usize) -> Vec<u8> {
    let mut writer = PresentationWriter::from_inches(13.3333, 7.5);
    for i in 0..slide_count {
        let slide = writer.add_slide();
        slide.add_text_box(
            EmuRect::from_inches(0.5, 0.3, 12.0, 0.8),
            format!("Slide {}", i + 1),
            TextStyle::new(32.0).bold(true),
            None,
        );
        if let Some(image) = ImageData::from_bytes(PNG_SIGNATURE.to_vec()) {
            slide.add_picture(
                image,
                EmuRect::from_inches(1.0, 1.5, 5.0, 2.8),
                None,
                "chart",
            );
        }
        slide.add_rectangle(
            EmuRect::from_inches(7.0, 1.5, 5.0, 2.8),
            Some(pptx_carousel::pptx::Fill::Solid(Rgb::new(30, 60, 90))),
            None,
            0.0,
        );
    }
    writer.to_bytes().expect("deck serializes")
}

fn bench_selection(c: &mut Criterion) {
    let templates = reference_templates();
    let mut group = c.benchmark_group("select_pages");

    for images in [10, 100, 1000] {
        group.throughput(Throughput::Elements(images as u64));
        group.bench_with_input(BenchmarkId::from_parameter(images), &images, |b, &n| {
            b.iter(|| select_pages(black_box(&templates), black_box(n)))
        });
    }

    group.finish();
}

fn bench_extraction(c: &mut Criterion) {
    let mut group = c.benchmark_group("extract_definition");

    for slides in [10, 50, 200] {
        let data = create_test_deck(slides);
        group.throughput(Throughput::Bytes(data.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(slides), &data, |b, data| {
            b.iter(|| {
                PptxParser::from_bytes(black_box(data.clone()), "bench.pptx")
                    .and_then(|parser| parser.parse())
            })
        });
    }

    group.finish();
}

fn bench_morph(c: &mut Criterion) {
    let data = create_test_deck(50);
    let options = MorphOptions::default();

    c.bench_function("morph_50_slides", |b| {
        b.iter(|| add_morph_transitions_to_bytes(black_box(data.clone()), &options, &NullReporter))
    });
}

criterion_group!(benches, bench_selection, bench_extraction, bench_morph);
criterion_main!(benches);
