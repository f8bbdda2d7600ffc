use log::{debug, info};

use super::compress_block::compress_block;
use super::container::{write_header, write_record, StreamHeader};
use crate::error::{BwhError, Result};
use crate::tools::cli::{BwhOpts, Mode, Output};
use crate::tools::file_io::{buffer_to_file, buffer_to_stdout, file_to_buffer};
use crate::tools::naming::get_file_name;
use crate::tools::text::{count_lines, word_wrap_buffer};

/// Compress a whole buffer into a stream. Blocks are cut at line boundaries no wider than
/// `width` and compressed one after the other.
pub fn compress_buffer(data: &[u8], width: usize, transform: bool) -> Result<Vec<u8>> {
    let block_width = u32::try_from(width)
        .map_err(|_| BwhError::Config(format!("block width {} is too large", width)))?;
    let blocks = word_wrap_buffer(data, width)?;
    let block_count = u32::try_from(blocks.len())
        .map_err(|_| BwhError::Config(format!("{} blocks is too many", blocks.len())))?;

    let mut out = Vec::with_capacity(data.len() / 2 + 64);
    write_header(
        &mut out,
        &StreamHeader {
            block_width,
            block_count,
            total_len: data.len() as u64,
        },
    );

    let mut done = 0;
    for (seq, block) in blocks.iter().enumerate() {
        let record = compress_block(seq, block, transform)?;
        write_record(&mut out, &record);
        done += block.len();
        debug!(
            "Compressed block {} of {} ({}%).",
            seq + 1,
            blocks.len(),
            done * 100 / data.len()
        );
    }
    Ok(out)
}

/// Compress the input file defined in opts <BwhOpts>.
pub fn compress(opts: &BwhOpts) -> Result<()> {
    let data = file_to_buffer(&opts.file)?;
    info!(
        "Compressing {} bytes ({} lines) from {}.",
        data.len(),
        count_lines(&data),
        opts.file.display()
    );
    let stream = compress_buffer(&data, opts.block_width, opts.transform)?;

    match opts.output {
        Output::Stdout => buffer_to_stdout(&stream)?,
        Output::File => {
            let out_name = get_file_name(&opts.file, &Mode::Zip);
            buffer_to_file(&stream, &out_name, opts.force_overwrite)?;
            info!("Wrote {}.", out_name.display());
        }
    }
    if !data.is_empty() {
        info!(
            "{} bytes in, {} bytes out ({:.1}% of the original).",
            data.len(),
            stream.len(),
            stream.len() as f64 * 100.0 / data.len() as f64
        );
    }
    Ok(())
}
