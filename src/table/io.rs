//! Parquet persistence for [`Frame`]
//!
//! The Arrow schema is embedded in the file footer, so column names,
//! types and nullability survive a round trip exactly, including for
//! frames with no rows and for columns whose every cell is null.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use arrow::compute::concat_batches;
use arrow::error::ArrowError;
use arrow::record_batch::RecordBatch;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::arrow::ArrowWriter;
use parquet::basic::Compression;
use parquet::file::properties::WriterProperties;
use parquet::file::reader::ChunkReader;

use super::frame::Frame;
use crate::error::Result;

/// Read a whole Parquet source into one frame
pub fn read_parquet<R: ChunkReader + 'static>(reader: R) -> Result<Frame> {
    let builder = ParquetRecordBatchReaderBuilder::try_new(reader)?;
    let schema = builder.schema().clone();
    let batches: Vec<RecordBatch> = builder
        .build()?
        .collect::<std::result::Result<_, ArrowError>>()?;
    Ok(Frame::from_batch(concat_batches(&schema, &batches)?))
}

/// Write a frame as a single-row-group Parquet stream
pub fn write_parquet<W: Write + Send>(frame: &Frame, writer: W) -> Result<()> {
    let props = WriterProperties::builder()
        .set_compression(Compression::SNAPPY)
        .build();
    let mut writer = ArrowWriter::try_new(writer, frame.schema(), Some(props))?;
    writer.write(frame.batch())?;
    writer.close()?;
    Ok(())
}

/// Read a Parquet file
pub fn read_parquet_path(path: impl AsRef<Path>) -> Result<Frame> {
    read_parquet(File::open(path.as_ref())?)
}

/// Write a Parquet file, creating or truncating it
pub fn write_parquet_path(frame: &Frame, path: impl AsRef<Path>) -> Result<()> {
    let file = File::create(path.as_ref())?;
    write_parquet(frame, BufWriter::new(file))
}
