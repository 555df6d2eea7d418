//! Save a merged dataset to a parquet file.
//!
//! Field types differ between sources and are not known up front, so every
//! column is written as text in the dataset's header order.

use std::{fs::File, sync::Arc};

use arrow::{
    array::{ArrayRef, StringBuilder},
    datatypes::{DataType, Field, Schema},
    record_batch::RecordBatch,
};
use parquet::{
    arrow::ArrowWriter,
    basic::Compression,
    errors::{ParquetError, Result},
    file::properties::WriterProperties,
};

use crate::dataset::Dataset;

const CHUNK_SIZE: usize = 10_000;

pub fn save_dataset(dataset: &Dataset, file: File) -> Result<()> {
    let schema = Arc::new(Schema::new(
        dataset
            .header
            .iter()
            .map(|name| Field::new(name, DataType::Utf8, false))
            .collect::<Vec<_>>(),
    ));

    let props = WriterProperties::builder()
        .set_compression(Compression::SNAPPY)
        .build();

    let mut writer = ArrowWriter::try_new(file, schema.clone(), Some(props))?;

    for chunk in dataset.rows.chunks(CHUNK_SIZE) {
        let mut builders: Vec<StringBuilder> = (0..dataset.header.len())
            .map(|_| StringBuilder::with_capacity(chunk.len(), chunk.len() * 8))
            .collect();

        for row in chunk {
            if row.len() != builders.len() {
                return Err(ParquetError::General(format!(
                    "row has {} values, expected {}",
                    row.len(),
                    builders.len()
                )));
            }
            for (builder, value) in builders.iter_mut().zip(row) {
                builder.append_value(value);
            }
        }

        let columns: Vec<ArrayRef> = builders
            .iter_mut()
            .map(|builder| Arc::new(builder.finish()) as ArrayRef)
            .collect();

        let batch = RecordBatch::try_new(schema.clone(), columns)?;
        writer.write(&batch)?;
    }

    writer.close()?;

    Ok(())
}

// -- Tests -------------------------------------------------------------------
