use log::{debug, info};

use super::container::{read_stream, HEADER_LEN};
use super::decompress_block::decompress_block;
use crate::error::{BwhError, Result};
use crate::tools::cli::{BwhOpts, Mode, Output};
use crate::tools::file_io::{buffer_to_file, buffer_to_stdout, file_to_buffer, seek_size_of_file};
use crate::tools::naming::get_file_name;

/// Decompress a whole stream back into the original bytes.
pub fn decompress_buffer(bytes: &[u8]) -> Result<Vec<u8>> {
    let (header, records) = read_stream(bytes)?;
    info!(
        "Found a valid stream: {} blocks, {} bytes.",
        header.block_count, header.total_len
    );

    let capacity = usize::try_from(header.total_len).map_err(|_| {
        BwhError::CorruptData(format!("stream claims {} bytes", header.total_len))
    })?;
    // Each symbol took at least one bit, so the stream bounds the output.
    let mut out = Vec::with_capacity(capacity.min(bytes.len().saturating_mul(8)));
    for (seq, record) in records.iter().enumerate() {
        out.extend_from_slice(&decompress_block(seq, record)?);
        debug!(
            "Decoded block {} of {} ({}%).",
            seq + 1,
            records.len(),
            out.len() * 100 / capacity.max(1)
        );
    }
    Ok(out)
}

/// Decompress (or test) the file specified in opts (BwhOpts).
pub fn decompress(opts: &BwhOpts) -> Result<()> {
    let size = seek_size_of_file(&opts.file)?;
    if size < HEADER_LEN as u64 {
        return Err(BwhError::BadHeader(format!(
            "{} is {} bytes, too short to be compressed",
            opts.file.display(),
            size
        )));
    }
    let bytes = file_to_buffer(&opts.file)?;
    let data = decompress_buffer(&bytes)?;

    if opts.op_mode == Mode::Test {
        info!("{}: ok, {} bytes.", opts.file.display(), data.len());
        return Ok(());
    }
    match opts.output {
        Output::Stdout => buffer_to_stdout(&data)?,
        Output::File => {
            let out_name = get_file_name(&opts.file, &Mode::Unzip);
            buffer_to_file(&data, &out_name, opts.force_overwrite)?;
            info!("Wrote {} bytes to {}.", data.len(), out_name.display());
        }
    }
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::compression::compress::{compress, compress_buffer};
    use crate::error::Stage;
    use std::path::PathBuf;
    use tempfile::tempdir;

    const PETER: &[u8] = b"Peter Piper picked a peck of pickled peppers;\n\
        A peck of pickled peppers Peter Piper picked;\n\
        If Peter Piper picked a peck of pickled peppers,\n\
        Where's the peck of pickled peppers Peter Piper picked?\n";

    #[test]
    fn round_trip_widths() {
        for width in [1, 2, 7, 50, 1024] {
            for transform in [true, false] {
                let stream = compress_buffer(PETER, width, transform).unwrap();
                assert_eq!(decompress_buffer(&stream).unwrap(), PETER.to_vec());
            }
        }
    }

    #[test]
    fn zero_bytes_survive() {
        let data = [0_u8, 0, 1, 0, 255, 0, 0, b'\n', 0];
        let stream = compress_buffer(&data, 4, true).unwrap();
        assert_eq!(decompress_buffer(&stream).unwrap(), data.to_vec());
    }

    #[test]
    fn empty_stream_round_trip() {
        let stream = compress_buffer(b"", 1024, true).unwrap();
        assert!(decompress_buffer(&stream).unwrap().is_empty());
    }

    #[test]
    fn corrupt_payload_names_the_block() {
        let mut stream = compress_buffer(PETER, 1024, true).unwrap();
        // drop the last payload byte and fix nothing else
        stream.pop();
        assert!(matches!(
            decompress_buffer(&stream),
            Err(BwhError::Block { index: 0, stage: Stage::Container, .. })
        ));
    }

    #[test]
    fn huge_claimed_length_is_an_error() {
        let mut stream = compress_buffer(b"banana", 16, true).unwrap();
        // claim 2^32 - 1 symbols for a 9 bit payload, in a block and stream that allow it
        stream[4..8].copy_from_slice(&u32::MAX.to_be_bytes());
        stream[12..20].copy_from_slice(&(u32::MAX as u64).to_be_bytes());
        stream[HEADER_LEN + 5..HEADER_LEN + 9].copy_from_slice(&u32::MAX.to_be_bytes());
        match decompress_buffer(&stream) {
            Err(BwhError::Block { source, .. }) => {
                assert!(matches!(*source, BwhError::CorruptData(_)))
            }
            other => panic!("unexpected result {:?}", other),
        }
    }

    #[test]
    fn file_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("peter.txt");
        std::fs::write(&path, PETER).unwrap();

        let mut opts = BwhOpts::new(path.clone());
        opts.block_width = 60;
        compress(&opts).unwrap();
        let packed: PathBuf = dir.path().join("peter.txt.bwh");
        assert!(packed.exists());

        // refuses to clobber the original without force
        let mut opts = BwhOpts::new(packed.clone());
        opts.op_mode = Mode::Unzip;
        assert!(matches!(decompress(&opts), Err(BwhError::IoWrite { .. })));

        opts.op_mode = Mode::Test;
        decompress(&opts).unwrap();

        opts.op_mode = Mode::Unzip;
        opts.force_overwrite = true;
        decompress(&opts).unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), PETER.to_vec());
    }

    #[test]
    fn not_a_stream() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("plain.bwh");
        std::fs::write(&path, b"this is not compressed at all").unwrap();
        let mut opts = BwhOpts::new(path.clone());
        opts.op_mode = Mode::Test;
        assert!(matches!(decompress(&opts), Err(BwhError::BadHeader(_))));

        std::fs::write(&path, b"BWH").unwrap();
        assert!(matches!(decompress(&opts), Err(BwhError::BadHeader(_))));
    }
}
