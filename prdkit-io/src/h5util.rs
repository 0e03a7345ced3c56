//! Small HDF5 helpers shared by the reader and the writer.

use crate::{Error, Result};
use hdf5::types::{H5Type, VarLenUnicode};
use hdf5::{Dataset, Group, Location};
use ndarray::{s, ArrayView1};
use std::str::FromStr;

pub(crate) fn create_extendable_dataset<T: H5Type>(
    group: &Group,
    name: &str,
    chunk: usize,
    compression: Option<u8>,
    shuffle: bool,
) -> Result<Dataset> {
    let mut builder = group
        .new_dataset::<T>()
        .shape((0..,))
        .chunk((chunk.max(1),));

    if let Some(level) = compression {
        builder = builder.deflate(level);
    }

    if shuffle {
        builder = builder.shuffle();
    }

    Ok(builder.create(name)?)
}

pub(crate) fn append_slice<T: H5Type>(dataset: &Dataset, offset: usize, data: &[T]) -> Result<()> {
    if data.is_empty() {
        return Ok(());
    }
    let new_len = offset + data.len();
    dataset.resize((new_len,))?;
    let view = ArrayView1::from(data);
    dataset.write_slice(view, s![offset..new_len])?;
    Ok(())
}

pub(crate) fn write_vec<T: H5Type>(group: &Group, name: &str, data: &[T]) -> Result<Dataset> {
    let dataset = group.new_dataset::<T>().shape((data.len(),)).create(name)?;
    if !data.is_empty() {
        dataset.write(ArrayView1::from(data))?;
    }
    Ok(dataset)
}

pub(crate) fn write_matrix<T: H5Type>(
    group: &Group,
    name: &str,
    shape: &[usize],
    data: &[T],
) -> Result<Dataset> {
    if shape.iter().product::<usize>() != data.len() {
        return Err(Error::InvalidFormat(format!(
            "{name}: {} values do not fill shape {shape:?}",
            data.len()
        )));
    }
    let dataset = group.new_dataset::<T>().shape(shape.to_vec()).create(name)?;
    if !data.is_empty() {
        let view = ndarray::ArrayView::from_shape(shape, data)
            .map_err(|e| Error::InvalidFormat(format!("{name}: {e}")))?;
        dataset.write(view)?;
    }
    Ok(dataset)
}

pub(crate) fn read_dataset_vec<T: H5Type>(group: &Group, name: &str) -> Result<Vec<T>> {
    let dataset = group.dataset(name)?;
    if dataset.size() == 0 {
        return Ok(Vec::new());
    }
    Ok(dataset.read_raw::<T>()?)
}

/// Reads a dataset and checks that all but its first dimension match `tail`.
/// Returns the leading dimension together with the flattened values.
pub(crate) fn read_matrix<T: H5Type>(
    group: &Group,
    name: &str,
    tail: &[usize],
) -> Result<(usize, Vec<T>)> {
    let dataset = group.dataset(name)?;
    let shape = dataset.shape();
    if shape.len() != tail.len() + 1 || shape[1..] != *tail {
        return Err(Error::InvalidFormat(format!(
            "{name}: expected shape [n, {tail:?}], found {shape:?}"
        )));
    }
    if shape[0] == 0 {
        return Ok((0, Vec::new()));
    }
    let values = dataset.read_raw::<T>()?;
    Ok((shape[0], values))
}

pub(crate) fn read_slice<T: H5Type>(dataset: &Dataset, start: usize, end: usize) -> Result<Vec<T>> {
    if start == end {
        return Ok(Vec::new());
    }
    Ok(dataset.read_slice_1d::<T, _>(s![start..end])?.to_vec())
}

pub(crate) fn set_attr_str(location: &Location, name: &str, value: &str) -> Result<()> {
    let value = to_var_len_unicode(value)?;
    location
        .new_attr::<VarLenUnicode>()
        .create(name)?
        .write_scalar(&value)?;
    Ok(())
}

pub(crate) fn set_attr<T: H5Type>(location: &Location, name: &str, value: &T) -> Result<()> {
    location
        .new_attr::<T>()
        .create(name)?
        .write_scalar(value)?;
    Ok(())
}

pub(crate) fn read_attr<T: H5Type>(location: &Location, name: &str) -> Result<T> {
    Ok(location.attr(name)?.read_scalar::<T>()?)
}

pub(crate) fn read_attr_string(location: &Location, name: &str) -> Result<String> {
    let value: VarLenUnicode = location.attr(name)?.read_scalar()?;
    Ok(value.to_string())
}

fn to_var_len_unicode(value: &str) -> Result<VarLenUnicode> {
    VarLenUnicode::from_str(value)
        .map_err(|e| Error::InvalidFormat(format!("invalid utf-8 attribute: {e}")))
}
