//! Streaming writer for HDF5 list-mode files.
//!

use crate::h5util::{
    append_slice, create_extendable_dataset, set_attr, set_attr_str, write_matrix, write_vec,
};
use crate::layout::{
    element_group, module_group, WriteOptions, BLOCK_DURATION, BLOCK_ID, CORNERS, ELEMENT_COUNT,
    ENERGY_BIN_EDGES, EVENT_FIELDS, EVENT_INDEX, EXAM, FORMAT_VERSION, FORMAT_VERSION_ATTR,
    GEOMETRY, HEADER, MODEL_NAME, MODULE_COUNT, SCANNER, SUBJECT_ID, TIME_BLOCKS, TOF_BIN_EDGES,
    TRANSFORMS,
};
use crate::{Error, Result};
use hdf5::{Dataset, File, Group};
use log::debug;
use prdkit_core::{Header, RigidTransformation, ScannerGeometry, StreamState, TimeBlock};
use std::path::Path;

/// Writes a header followed by any number of time blocks.
pub struct Hdf5ExperimentWriter {
    file: File,
    root: Group,
    options: WriteOptions,
    state: StreamState,
    blocks: Option<BlockWriter>,
}

impl Hdf5ExperimentWriter {
    /// Creates (or truncates) a list-mode file.
    ///
    /// # Errors
    /// Returns an error if the HDF5 file or its root group cannot be created.
    pub fn create<P: AsRef<Path>>(path: P, options: WriteOptions) -> Result<Self> {
        let file = File::create(path.as_ref())?;
        let root = file.create_group(&options.root)?;
        set_attr_str(&root, FORMAT_VERSION_ATTR, FORMAT_VERSION)?;
        debug!("created {}", path.as_ref().display());

        Ok(Self {
            file,
            root,
            options,
            state: StreamState::default(),
            blocks: None,
        })
    }

    /// Writes the header. Must be called once, before any time block.
    ///
    /// # Errors
    /// Returns an error if the header is invalid, was already written, or
    /// HDF5 I/O fails.
    pub fn write_header(&mut self, header: &Header) -> Result<()> {
        header.scanner.validate()?;
        self.state.begin_header()?;

        let group = self.root.create_group(HEADER)?;
        if let Some(exam) = &header.exam {
            let exam_group = group.create_group(EXAM)?;
            set_attr_str(&exam_group, SUBJECT_ID, &exam.subject.id)?;
        }

        let scanner = &header.scanner;
        let scanner_group = group.create_group(SCANNER)?;
        set_attr_str(&scanner_group, MODEL_NAME, &scanner.model_name)?;
        set_attr(&scanner_group, BLOCK_DURATION, &scanner.listmode_time_block_duration)?;
        write_vec(&scanner_group, TOF_BIN_EDGES, &scanner.tof_bin_edges)?;
        write_vec(&scanner_group, ENERGY_BIN_EDGES, &scanner.energy_bin_edges)?;
        write_geometry(&scanner_group.create_group(GEOMETRY)?, &scanner.geometry)?;

        self.blocks = Some(BlockWriter::new(&self.root, &self.options)?);
        Ok(())
    }

    /// Appends one time block.
    ///
    /// # Errors
    /// Returns an error if the header has not been written or HDF5 I/O fails.
    pub fn write_time_block(&mut self, block: &TimeBlock) -> Result<()> {
        self.state.check_time_blocks()?;
        match self.blocks.as_mut() {
            Some(blocks) => blocks.append(block),
            None => Err(Error::InvalidFormat("time block datasets missing".to_string())),
        }
    }

    /// Flushes the file. Dropping the writer also closes it.
    ///
    /// # Errors
    /// Returns an error if the flush fails.
    pub fn finish(mut self) -> Result<()> {
        self.state.finish();
        if let Some(blocks) = &self.blocks {
            debug!(
                "wrote {} time blocks, {} prompt events",
                blocks.block_count, blocks.event_count
            );
        }
        self.file.flush()?;
        Ok(())
    }
}

/// Writes a complete file in one call.
///
/// # Errors
/// Returns an error if the header is invalid or HDF5 I/O fails.
pub fn write_experiment<P, I>(
    path: P,
    header: &Header,
    blocks: I,
    options: WriteOptions,
) -> Result<()>
where
    P: AsRef<Path>,
    I: IntoIterator<Item = TimeBlock>,
{
    let mut writer = Hdf5ExperimentWriter::create(path, options)?;
    writer.write_header(header)?;
    for block in blocks {
        writer.write_time_block(&block)?;
    }
    writer.finish()
}

fn write_geometry(group: &Group, geometry: &ScannerGeometry) -> Result<()> {
    set_attr(group, MODULE_COUNT, &count_u32(geometry.replicated_modules.len())?)?;
    for (i, module) in geometry.replicated_modules.iter().enumerate() {
        let module_node = group.create_group(&module_group(i))?;
        write_transforms(&module_node, &module.transforms)?;

        let elements = &module.object.detecting_elements;
        set_attr(&module_node, ELEMENT_COUNT, &count_u32(elements.len())?)?;
        for (j, element) in elements.iter().enumerate() {
            let element_node = module_node.create_group(&element_group(j))?;
            let corners: Vec<f32> = element.object.corners.iter().flat_map(|c| c.c).collect();
            write_matrix(&element_node, CORNERS, &[8, 3], &corners)?;
            write_transforms(&element_node, &element.transforms)?;
        }
    }
    Ok(())
}

fn write_transforms(group: &Group, transforms: &[RigidTransformation]) -> Result<()> {
    let values: Vec<f32> = transforms
        .iter()
        .flat_map(RigidTransformation::to_row_major)
        .collect();
    write_matrix(group, TRANSFORMS, &[transforms.len(), 3, 4], &values)?;
    Ok(())
}

fn count_u32(len: usize) -> Result<u32> {
    u32::try_from(len).map_err(|_| Error::InvalidFormat(format!("count {len} exceeds u32 range")))
}

struct BlockWriter {
    block_id: Dataset,
    event_index: Dataset,
    fields: Vec<Dataset>,
    event_count: usize,
    block_count: usize,
}

impl BlockWriter {
    fn new(root: &Group, options: &WriteOptions) -> Result<Self> {
        let group = root.create_group(TIME_BLOCKS)?;
        let block_id = create_extendable_dataset::<u32>(
            &group,
            BLOCK_ID,
            options.chunk_blocks,
            options.compression,
            options.shuffle,
        )?;
        let event_index = create_extendable_dataset::<u64>(
            &group,
            EVENT_INDEX,
            options.chunk_blocks,
            options.compression,
            options.shuffle,
        )?;
        let fields = EVENT_FIELDS
            .iter()
            .map(|name| {
                create_extendable_dataset::<u32>(
                    &group,
                    name,
                    options.chunk_events,
                    options.compression,
                    options.shuffle,
                )
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            block_id,
            event_index,
            fields,
            event_count: 0,
            block_count: 0,
        })
    }

    fn append(&mut self, block: &TimeBlock) -> Result<()> {
        let start = self.event_count;
        let events = &block.prompt_events;
        let columns: [Vec<u32>; 5] = [
            events.iter().map(|e| e.detector_1_id).collect(),
            events.iter().map(|e| e.detector_2_id).collect(),
            events.iter().map(|e| e.tof_idx).collect(),
            events.iter().map(|e| e.energy_1_idx).collect(),
            events.iter().map(|e| e.energy_2_idx).collect(),
        ];
        for (dataset, column) in self.fields.iter().zip(&columns) {
            append_slice(dataset, start, column)?;
        }

        append_slice(&self.block_id, self.block_count, &[block.id])?;
        append_slice(&self.event_index, self.block_count, &[start as u64])?;

        self.event_count += events.len();
        self.block_count += 1;
        Ok(())
    }
}
