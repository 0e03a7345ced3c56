#![allow(clippy::float_cmp)]
use approx::assert_relative_eq;
use hdf5::types::VarLenUnicode;
use prdkit_core::{
    BoxShape, ExamInfo, ExperimentSource, Header, PromptEvent, ScannerGeometry, ScannerInfo,
    TimeBlock,
};
use prdkit_io::{
    summarize_file, write_experiment, Error, Hdf5ExperimentReader, ReaderOptions, WriteOptions,
};
use tempfile::NamedTempFile;

fn make_header(energy_bin_edges: Vec<f32>, duration: f32) -> Header {
    Header {
        exam: Some(ExamInfo::for_subject("subject-7")),
        scanner: ScannerInfo {
            model_name: "PET ring".to_string(),
            geometry: ScannerGeometry::ring(8, 3, 250.0, BoxShape::centered(4.0, 20.0, 4.0), 4.2),
            tof_bin_edges: vec![-450.0, -150.0, 150.0, 450.0],
            energy_bin_edges,
            listmode_time_block_duration: duration,
        },
    }
}

fn small_chunks() -> WriteOptions {
    WriteOptions {
        chunk_events: 4,
        chunk_blocks: 2,
        compression: None,
        shuffle: false,
        ..WriteOptions::default()
    }
}

#[test]
fn test_header_roundtrip() {
    let file = NamedTempFile::new().unwrap();
    let header = make_header(vec![430.0, 480.0, 550.0, 650.0], 1.0);
    write_experiment(file.path(), &header, Vec::new(), small_chunks()).unwrap();

    let mut reader = Hdf5ExperimentReader::open(file.path()).unwrap();
    let loaded = reader.read_header().unwrap();
    assert_eq!(loaded, header);
    assert_eq!(loaded.scanner.number_of_detectors(), 24);
    assert_eq!(reader.read_time_block().unwrap(), None);
}

#[test]
fn test_header_without_exam() {
    let file = NamedTempFile::new().unwrap();
    let mut header = make_header(vec![0.0, 1.0], 1.0);
    header.exam = None;
    write_experiment(file.path(), &header, Vec::new(), small_chunks()).unwrap();

    let mut reader = Hdf5ExperimentReader::open(file.path()).unwrap();
    assert_eq!(reader.read_header().unwrap().exam, None);
}

#[test]
fn test_time_blocks_roundtrip() {
    let file = NamedTempFile::new().unwrap();
    let blocks: Vec<TimeBlock> = (0..5)
        .map(|id| {
            let events = (0..id * 2)
                .map(|i| PromptEvent {
                    detector_1_id: i,
                    detector_2_id: i + 10,
                    tof_idx: i % 3,
                    energy_1_idx: i % 2,
                    energy_2_idx: (i + 1) % 2,
                })
                .collect();
            TimeBlock::new(id, events)
        })
        .collect();
    write_experiment(
        file.path(),
        &make_header(vec![0.0, 10.0, 20.0], 1.0),
        blocks.clone(),
        small_chunks(),
    )
    .unwrap();

    let mut reader = Hdf5ExperimentReader::open(file.path()).unwrap();
    reader.read_header().unwrap();
    let loaded: Vec<TimeBlock> = reader.time_blocks().map(Result::unwrap).collect();
    assert_eq!(loaded, blocks);
    assert_eq!(reader.time_block_count(), Some(5));
}

#[test]
fn test_summary_of_two_events() {
    let file = NamedTempFile::new().unwrap();
    let blocks = vec![TimeBlock::new(
        0,
        vec![
            PromptEvent::with_energies(0, 1),
            PromptEvent::with_energies(1, 0),
        ],
    )];
    write_experiment(
        file.path(),
        &make_header(vec![0.0, 10.0, 20.0], 1.0),
        blocks,
        small_chunks(),
    )
    .unwrap();

    let report = summarize_file(file.path()).unwrap();
    assert_eq!(report.energy_midpoints, vec![5.0, 15.0]);
    assert_eq!(report.num_events, 2);
    assert_relative_eq!(report.average_energy_1, 10.0);
    assert_relative_eq!(report.average_energy_2, 10.0);
    assert_eq!(report.subject_id.as_deref(), Some("subject-7"));
    assert_eq!(report.input, file.path().display().to_string());
}

#[test]
fn test_summary_without_blocks() {
    let file = NamedTempFile::new().unwrap();
    write_experiment(
        file.path(),
        &make_header(vec![0.0, 10.0], 1.0),
        Vec::new(),
        small_chunks(),
    )
    .unwrap();

    let report = summarize_file(file.path()).unwrap();
    assert_eq!(report.num_events, 0);
    assert!(report.average_energy_1.is_nan());
    assert!(report.average_energy_2.is_nan());
}

#[test]
fn test_events_without_blocks_rejected() {
    let file = NamedTempFile::new().unwrap();
    write_experiment(
        file.path(),
        &make_header(vec![0.0, 10.0], 1.0),
        Vec::new(),
        small_chunks(),
    )
    .unwrap();
    {
        let h5 = hdf5::File::open_rw(file.path()).unwrap();
        let group = h5.group("PrdExperiment/time_blocks").unwrap();
        for name in [
            "detector_1_id",
            "detector_2_id",
            "tof_idx",
            "energy_1_idx",
            "energy_2_idx",
        ] {
            let dataset = group.dataset(name).unwrap();
            dataset.resize((3,)).unwrap();
            dataset.write(&[0_u32, 0, 9][..]).unwrap();
        }
    }

    let err = summarize_file(file.path()).unwrap_err();
    assert!(matches!(err, Error::InvalidFormat(_)), "{err}");
}

#[test]
fn test_last_block_time() {
    let file = NamedTempFile::new().unwrap();
    let blocks = (0..3).map(|id| TimeBlock::new(id, vec![PromptEvent::with_energies(0, 0)]));
    write_experiment(
        file.path(),
        &make_header(vec![0.0, 10.0], 5.0),
        blocks,
        small_chunks(),
    )
    .unwrap();

    let report = summarize_file(file.path()).unwrap();
    assert_relative_eq!(report.last_block_time_ms, 10.0);
}

#[test]
fn test_summary_is_repeatable() {
    let file = NamedTempFile::new().unwrap();
    let blocks = (0..20).map(|id| {
        TimeBlock::new(
            id,
            (0..50)
                .map(|i| PromptEvent::with_energies(i % 3, (i * 7) % 3))
                .collect(),
        )
    });
    write_experiment(
        file.path(),
        &make_header(vec![400.0, 480.0, 560.0, 640.0], 2.0),
        blocks,
        WriteOptions::default(),
    )
    .unwrap();

    let first = summarize_file(file.path()).unwrap();
    let second = summarize_file(file.path()).unwrap();
    assert_eq!(first, second);
    assert_eq!(first.num_events, 1000);
}

#[test]
fn test_out_of_range_energy_index() {
    let file = NamedTempFile::new().unwrap();
    let blocks = vec![TimeBlock::new(0, vec![PromptEvent::with_energies(0, 9)])];
    write_experiment(
        file.path(),
        &make_header(vec![0.0, 10.0], 1.0),
        blocks,
        small_chunks(),
    )
    .unwrap();

    let err = summarize_file(file.path()).unwrap_err();
    assert!(matches!(
        err,
        Error::Core(prdkit_core::Error::IndexOutOfRange { index: 9, .. })
    ));
}

#[test]
fn test_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let err = summarize_file(dir.path().join("absent.h5")).unwrap_err();
    assert!(matches!(err, Error::FileOpen { .. }));
}

#[test]
fn test_not_hdf5() {
    let file = NamedTempFile::new().unwrap();
    std::fs::write(file.path(), b"not an hdf5 file").unwrap();
    let err = Hdf5ExperimentReader::open(file.path()).err().unwrap();
    assert!(matches!(err, Error::FileOpen { .. }));
}

#[test]
fn test_hdf5_without_experiment_group() {
    let file = NamedTempFile::new().unwrap();
    hdf5::File::create(file.path())
        .unwrap()
        .create_group("entry")
        .unwrap();
    let err = Hdf5ExperimentReader::open(file.path()).err().unwrap();
    assert!(matches!(err, Error::FileOpen { .. }));
}

#[test]
fn test_incomplete_header() {
    let file = NamedTempFile::new().unwrap();
    {
        let h5 = hdf5::File::create(file.path()).unwrap();
        let root = h5.create_group("PrdExperiment").unwrap();
        let version: VarLenUnicode = "0.1".parse().unwrap();
        root.new_attr::<VarLenUnicode>()
            .create("prd_format_version")
            .unwrap()
            .write_scalar(&version)
            .unwrap();
        root.create_group("header")
            .unwrap()
            .create_group("scanner")
            .unwrap();
    }

    let mut reader = Hdf5ExperimentReader::open(file.path()).unwrap();
    let err = reader.read_header().unwrap_err();
    assert!(matches!(err, Error::HeaderRead(_)));
    assert!(matches!(
        reader.read_time_block(),
        Err(Error::Core(prdkit_core::Error::Protocol(_)))
    ));
}

#[test]
fn test_blocks_before_header() {
    let file = NamedTempFile::new().unwrap();
    write_experiment(
        file.path(),
        &make_header(vec![0.0, 10.0], 1.0),
        Vec::new(),
        small_chunks(),
    )
    .unwrap();

    let mut reader = Hdf5ExperimentReader::open(file.path()).unwrap();
    let err = reader.read_time_block().unwrap_err();
    assert!(matches!(err, Error::Core(prdkit_core::Error::Protocol(_))));
}

#[test]
fn test_custom_root_group() {
    let file = NamedTempFile::new().unwrap();
    let options = WriteOptions {
        root: "scan".to_string(),
        ..small_chunks()
    };
    write_experiment(
        file.path(),
        &make_header(vec![0.0, 10.0], 1.0),
        Vec::new(),
        options,
    )
    .unwrap();

    assert!(Hdf5ExperimentReader::open(file.path()).is_err());
    let reader = Hdf5ExperimentReader::open_with_options(
        file.path(),
        &ReaderOptions {
            root: "scan".to_string(),
        },
    );
    assert!(reader.is_ok());
}
