#![allow(clippy::float_cmp)]
use approx::assert_relative_eq;
use prdkit_core::{
    summarize, BoxShape, Error, ExamInfo, Header, MemorySource, PromptEvent, ScannerGeometry,
    ScannerInfo, TimeBlock,
};

fn make_header(energy_bin_edges: Vec<f32>, duration: f32) -> Header {
    Header {
        exam: Some(ExamInfo::for_subject("phantom-01")),
        scanner: ScannerInfo {
            model_name: "test ring".to_string(),
            geometry: ScannerGeometry::ring(6, 2, 200.0, BoxShape::centered(4.0, 20.0, 4.0), 4.0),
            tof_bin_edges: vec![-300.0, -100.0, 100.0, 300.0],
            energy_bin_edges,
            listmode_time_block_duration: duration,
        },
    }
}

#[test]
fn test_two_events_average_to_ten() {
    let blocks = vec![TimeBlock::new(
        0,
        vec![
            PromptEvent::with_energies(0, 1),
            PromptEvent::with_energies(1, 0),
        ],
    )];
    let source = MemorySource::new(make_header(vec![0.0, 10.0, 20.0], 1.0), blocks);
    let report = summarize(source).unwrap();

    assert_eq!(report.energy_midpoints, vec![5.0, 15.0]);
    assert_eq!(report.num_events, 2);
    assert_relative_eq!(report.average_energy_1, 10.0);
    assert_relative_eq!(report.average_energy_2, 10.0);
    assert_eq!(report.subject_id.as_deref(), Some("phantom-01"));
    assert_eq!(report.number_of_detectors, 12);
}

#[test]
fn test_zero_blocks_reports_undefined_averages() {
    let source = MemorySource::new(make_header(vec![0.0, 10.0], 1.0), vec![]);
    let report = summarize(source).unwrap();

    assert_eq!(report.num_events, 0);
    assert_eq!(report.num_blocks, 0);
    assert!(report.average_energy_1.is_nan());
    assert!(report.average_energy_2.is_nan());
    assert_eq!(report.last_block_time_ms, 0.0);
    assert!(report.is_empty());
}

#[test]
fn test_last_block_time_comes_from_last_block() {
    let blocks = (0..3)
        .map(|id| TimeBlock::new(id, vec![PromptEvent::with_energies(0, 0)]))
        .collect();
    let source = MemorySource::new(make_header(vec![0.0, 10.0], 5.0), blocks);
    let report = summarize(source).unwrap();

    assert_relative_eq!(report.last_block_time_ms, 10.0);
    assert_eq!(report.num_blocks, 3);
    assert_eq!(report.num_events, 3);
}

#[test]
fn test_out_of_range_index_is_fatal() {
    let blocks = vec![
        TimeBlock::new(0, vec![PromptEvent::with_energies(0, 0)]),
        TimeBlock::new(1, vec![PromptEvent::with_energies(2, 0)]),
        TimeBlock::new(2, vec![PromptEvent::with_energies(0, 0)]),
    ];
    let source = MemorySource::new(make_header(vec![0.0, 10.0, 20.0], 1.0), blocks);
    let err = summarize(source).unwrap_err();

    assert_eq!(
        err,
        Error::IndexOutOfRange {
            field: "energy_1_idx",
            index: 2,
            len: 2
        }
    );
}

#[test]
fn test_missing_exam_is_not_an_error() {
    let mut header = make_header(vec![0.0, 10.0], 1.0);
    header.exam = None;
    let report = summarize(MemorySource::new(header, vec![])).unwrap();
    assert_eq!(report.subject_id, None);
    assert!(!report.to_string().contains("Subject ID"));
}

#[test]
fn test_repeated_runs_are_identical() {
    let blocks: Vec<TimeBlock> = (0..10)
        .map(|id| {
            let events = (0..id)
                .map(|i| PromptEvent::with_energies(i % 3, (i + 1) % 3))
                .collect();
            TimeBlock::new(id, events)
        })
        .collect();
    let header = make_header(vec![400.0, 450.0, 550.0, 650.0], 2.5);

    let first = summarize(MemorySource::new(header.clone(), blocks.clone())).unwrap();
    let second = summarize(MemorySource::new(header, blocks)).unwrap();
    assert_eq!(first, second);
    assert_eq!(first.num_events, 45);
}

#[test]
fn test_report_uses_source_name() {
    let source = MemorySource::new(make_header(vec![0.0, 10.0], 1.0), vec![])
        .with_name("synthetic.h5");
    let report = summarize(source).unwrap();
    assert_eq!(report.input, "synthetic.h5");
}
