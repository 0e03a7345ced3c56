//! Streaming reader for HDF5 list-mode files.
//!

use crate::h5util::{read_attr, read_attr_string, read_dataset_vec, read_matrix, read_slice};
use crate::layout::{
    element_group, module_group, ReaderOptions, BLOCK_DURATION, BLOCK_ID, CORNERS, ELEMENT_COUNT,
    ENERGY_BIN_EDGES, EVENT_FIELDS, EVENT_INDEX, EXAM, FORMAT_VERSION, FORMAT_VERSION_ATTR,
    GEOMETRY, HEADER, MODEL_NAME, MODULE_COUNT, SCANNER, SUBJECT_ID, TIME_BLOCKS, TOF_BIN_EDGES,
    TRANSFORMS,
};
use crate::{Error, Result};
use hdf5::{Dataset, File, Group};
use log::{debug, trace};
use prdkit_core::{
    BoxShape, DetectorModule, ExamInfo, ExperimentSource, Header, PromptEvent, ReplicatedObject,
    RigidTransformation, ScannerGeometry, ScannerInfo, StreamState, TimeBlock,
};
use std::fmt::Display;
use std::path::{Path, PathBuf};

/// Reads one header and then time blocks, one at a time, from an HDF5 file.
///
/// The file stays open for the lifetime of the reader and is closed when the
/// reader is dropped.
pub struct Hdf5ExperimentReader {
    _file: File,
    root: Group,
    path: PathBuf,
    state: StreamState,
    cursor: Option<BlockCursor>,
}

impl Hdf5ExperimentReader {
    /// Opens a list-mode file with the default layout.
    ///
    /// # Errors
    /// Returns [`Error::FileOpen`] if the file cannot be opened or is not a
    /// list-mode file.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open_with_options(path, &ReaderOptions::default())
    }

    /// Opens a list-mode file stored under `options.root`.
    ///
    /// # Errors
    /// Returns [`Error::FileOpen`] if the file cannot be opened, the root group
    /// is missing, or the format version is not supported.
    pub fn open_with_options<P: AsRef<Path>>(path: P, options: &ReaderOptions) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| open_error(path, e))?;
        let root = file
            .group(&options.root)
            .map_err(|e| open_error(path, format!("missing group '{}': {e}", options.root)))?;
        let version = read_attr_string(&root, FORMAT_VERSION_ATTR)
            .map_err(|e| open_error(path, format!("missing {FORMAT_VERSION_ATTR}: {e}")))?;
        if version != FORMAT_VERSION {
            return Err(open_error(
                path,
                format!("unsupported format version {version} (expected {FORMAT_VERSION})"),
            ));
        }
        debug!("opened {} (format {version})", path.display());

        Ok(Self {
            _file: file,
            root,
            path: path.to_path_buf(),
            state: StreamState::default(),
            cursor: None,
        })
    }

    /// Path the reader was opened with.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of time blocks in the file, once streaming has started.
    #[must_use]
    pub fn time_block_count(&self) -> Option<usize> {
        self.cursor.as_ref().map(|cursor| cursor.block_ids.len())
    }
}

impl ExperimentSource for Hdf5ExperimentReader {
    type Error = Error;

    fn name(&self) -> String {
        self.path.display().to_string()
    }

    fn read_header(&mut self) -> Result<Header> {
        self.state.begin_header()?;
        match read_header_group(&self.root) {
            Ok(header) => {
                debug!(
                    "{}: header for scanner '{}'",
                    self.path.display(),
                    header.scanner.model_name
                );
                Ok(header)
            }
            Err(e) => {
                self.state.fail();
                Err(Error::HeaderRead(e.to_string()))
            }
        }
    }

    fn read_time_block(&mut self) -> Result<Option<TimeBlock>> {
        if !self.state.check_time_blocks()? {
            return Ok(None);
        }
        let cursor = match self.cursor.take() {
            Some(cursor) => cursor,
            None => BlockCursor::open(&self.root)?,
        };
        let next = self.cursor.insert(cursor).next_block()?;
        if next.is_none() {
            trace!("{}: end of time blocks", self.path.display());
            self.state.finish();
        }
        Ok(next)
    }
}

fn open_error(path: &Path, reason: impl Display) -> Error {
    Error::FileOpen {
        path: path.to_path_buf(),
        reason: reason.to_string(),
    }
}

fn read_header_group(root: &Group) -> Result<Header> {
    let header = root.group(HEADER)?;

    let exam = if header.link_exists(EXAM) {
        let exam = header.group(EXAM)?;
        Some(ExamInfo::for_subject(read_attr_string(&exam, SUBJECT_ID)?))
    } else {
        None
    };

    let scanner = header.group(SCANNER)?;
    let scanner = ScannerInfo {
        model_name: read_attr_string(&scanner, MODEL_NAME)?,
        geometry: read_geometry(&scanner.group(GEOMETRY)?)?,
        tof_bin_edges: read_dataset_vec::<f32>(&scanner, TOF_BIN_EDGES)?,
        energy_bin_edges: read_dataset_vec::<f32>(&scanner, ENERGY_BIN_EDGES)?,
        listmode_time_block_duration: read_attr::<f32>(&scanner, BLOCK_DURATION)?,
    };
    scanner.validate()?;

    Ok(Header { exam, scanner })
}

fn read_geometry(group: &Group) -> Result<ScannerGeometry> {
    let module_count = read_attr::<u32>(group, MODULE_COUNT)? as usize;
    let mut replicated_modules = Vec::with_capacity(module_count);

    for i in 0..module_count {
        let module = group.group(&module_group(i))?;
        let element_count = read_attr::<u32>(&module, ELEMENT_COUNT)? as usize;
        let mut detecting_elements = Vec::with_capacity(element_count);

        for j in 0..element_count {
            let element = module.group(&element_group(j))?;
            let (n, corners) = read_matrix::<f32>(&element, CORNERS, &[3])?;
            if n != 8 {
                return Err(Error::InvalidFormat(format!(
                    "module {i} element {j}: box needs 8 corners, found {n}"
                )));
            }
            let mut shape = BoxShape::default();
            for (corner, xyz) in shape.corners.iter_mut().zip(corners.chunks_exact(3)) {
                corner.c.copy_from_slice(xyz);
            }
            detecting_elements.push(ReplicatedObject::new(shape, read_transforms(&element)?));
        }

        replicated_modules.push(ReplicatedObject::new(
            DetectorModule { detecting_elements },
            read_transforms(&module)?,
        ));
    }

    Ok(ScannerGeometry { replicated_modules })
}

fn read_transforms(group: &Group) -> Result<Vec<RigidTransformation>> {
    let (_, values) = read_matrix::<f32>(group, TRANSFORMS, &[3, 4])?;
    let transforms = values
        .chunks_exact(12)
        .map(RigidTransformation::from_row_major)
        .collect::<prdkit_core::Result<Vec<_>>>()?;
    Ok(transforms)
}

/// Position in the `time_blocks` group.
struct BlockCursor {
    block_ids: Vec<u32>,
    /// First event of each block.
    event_index: Vec<usize>,
    total_events: usize,
    /// Event datasets in [`EVENT_FIELDS`] order.
    fields: Vec<Dataset>,
    next: usize,
}

impl BlockCursor {
    fn open(root: &Group) -> Result<Self> {
        let group = root.group(TIME_BLOCKS)?;
        let block_ids = read_dataset_vec::<u32>(&group, BLOCK_ID)?;
        let event_index = read_dataset_vec::<u64>(&group, EVENT_INDEX)?;
        if block_ids.len() != event_index.len() {
            return Err(Error::InvalidFormat(format!(
                "{BLOCK_ID} has {} entries but {EVENT_INDEX} has {}",
                block_ids.len(),
                event_index.len()
            )));
        }

        let fields = EVENT_FIELDS
            .iter()
            .map(|name| group.dataset(name))
            .collect::<hdf5::Result<Vec<_>>>()?;
        let total_events = fields[0].size();
        if let Some((name, ds)) = EVENT_FIELDS
            .iter()
            .zip(&fields)
            .find(|(_, ds)| ds.size() != total_events)
        {
            return Err(Error::InvalidFormat(format!(
                "{name} has {} events, expected {total_events}",
                ds.size()
            )));
        }

        let event_index = event_index
            .into_iter()
            .map(|offset| {
                usize::try_from(offset)
                    .ok()
                    .filter(|&offset| offset <= total_events)
                    .ok_or_else(|| {
                        Error::InvalidFormat(format!(
                            "{EVENT_INDEX} entry {offset} exceeds {total_events} events"
                        ))
                    })
            })
            .collect::<Result<Vec<_>>>()?;
        if event_index.windows(2).any(|w| w[0] > w[1]) {
            return Err(Error::InvalidFormat(format!("{EVENT_INDEX} must be non-decreasing")));
        }
        match event_index.first() {
            Some(&first) if first != 0 => {
                return Err(Error::InvalidFormat(format!("{EVENT_INDEX} must start at 0")));
            }
            None if total_events > 0 => {
                return Err(Error::InvalidFormat(format!(
                    "{total_events} prompt events not assigned to any time block"
                )));
            }
            _ => {}
        }
        debug!("{} time blocks, {total_events} prompt events", block_ids.len());

        Ok(Self {
            block_ids,
            event_index,
            total_events,
            fields,
            next: 0,
        })
    }

    fn next_block(&mut self) -> Result<Option<TimeBlock>> {
        let Some(&id) = self.block_ids.get(self.next) else {
            return Ok(None);
        };
        let start = self.event_index[self.next];
        let end = self
            .event_index
            .get(self.next + 1)
            .copied()
            .unwrap_or(self.total_events);
        self.next += 1;

        let mut columns = Vec::with_capacity(self.fields.len());
        for dataset in &self.fields {
            columns.push(read_slice::<u32>(dataset, start, end)?);
        }
        let prompt_events = (0..end - start)
            .map(|i| PromptEvent {
                detector_1_id: columns[0][i],
                detector_2_id: columns[1][i],
                tof_idx: columns[2][i],
                energy_1_idx: columns[3][i],
                energy_2_idx: columns[4][i],
            })
            .collect();

        Ok(Some(TimeBlock::new(id, prompt_events)))
    }
}
