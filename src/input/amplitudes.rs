//! Random-access reader over a flat file of complex FFT amplitudes.
//!
//! The file holds consecutive (real, imaginary) little-endian `f32` pairs,
//! eight bytes per bin with no header; bin 0 is DC.

use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;

use num_complex::Complex32;

use crate::error::{ExploreError, Result};

/// Bytes occupied by one complex bin on disk.
pub const BYTES_PER_BIN: u64 = 8;

/// Random-access source of contiguous complex-amplitude ranges.
///
/// Implemented by [`AmplitudeFile`] for on-disk spectra and by in-memory
/// vectors for synthetic test data.
pub trait AmplitudeSource {
    /// Total number of complex bins available.
    fn num_bins(&self) -> u64;

    /// Read `count` consecutive bins starting at `lo`.
    fn read_range(&mut self, lo: u64, count: usize) -> Result<Vec<Complex32>>;
}

/// An opened `.fft` file.
#[derive(Debug)]
pub struct AmplitudeFile {
    file: File,
    num_bins: u64,
}

impl AmplitudeFile {
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        let len = file.metadata()?.len();
        if len % BYTES_PER_BIN != 0 {
            return Err(ExploreError::InputFormat(format!(
                "'{}' is {} bytes, not a whole number of {}-byte complex bins",
                path.display(),
                len,
                BYTES_PER_BIN
            )));
        }
        Ok(Self {
            file,
            num_bins: len / BYTES_PER_BIN,
        })
    }
}

impl AmplitudeSource for AmplitudeFile {
    fn num_bins(&self) -> u64 {
        self.num_bins
    }

    fn read_range(&mut self, lo: u64, count: usize) -> Result<Vec<Complex32>> {
        if lo + count as u64 > self.num_bins {
            return Err(ExploreError::OutOfRange(format!(
                "requested bins [{}, {}) from a {}-bin file",
                lo,
                lo + count as u64,
                self.num_bins
            )));
        }

        self.file.seek(SeekFrom::Start(lo * BYTES_PER_BIN))?;
        let mut bytes = vec![0u8; count * BYTES_PER_BIN as usize];
        self.file.read_exact(&mut bytes).map_err(|e| {
            ExploreError::InputFormat(format!("short read of {} amplitude bins: {}", count, e))
        })?;

        let amps = bytes
            .chunks_exact(BYTES_PER_BIN as usize)
            .map(|chunk| {
                let re = f32::from_le_bytes(chunk[0..4].try_into().unwrap());
                let im = f32::from_le_bytes(chunk[4..8].try_into().unwrap());
                Complex32::new(re, im)
            })
            .collect();
        Ok(amps)
    }
}

impl AmplitudeSource for Vec<Complex32> {
    fn num_bins(&self) -> u64 {
        self.len() as u64
    }

    fn read_range(&mut self, lo: u64, count: usize) -> Result<Vec<Complex32>> {
        let lo = lo as usize;
        if lo + count > self.len() {
            return Err(ExploreError::OutOfRange(format!(
                "requested bins [{}, {}) from a {}-bin buffer",
                lo,
                lo + count,
                self.len()
            )));
        }
        Ok(self[lo..lo + count].to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_fft(amps: &[Complex32]) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        for amp in amps {
            file.write_all(&amp.re.to_le_bytes()).unwrap();
            file.write_all(&amp.im.to_le_bytes()).unwrap();
        }
        file.flush().unwrap();
        file
    }

    #[test]
    fn reads_back_written_bins() {
        let amps: Vec<Complex32> = (0..32)
            .map(|i| Complex32::new(i as f32, -(i as f32)))
            .collect();
        let file = write_fft(&amps);

        let mut reader = AmplitudeFile::open(file.path()).expect("open");
        assert_eq!(reader.num_bins(), 32);

        let range = reader.read_range(4, 8).expect("read");
        assert_eq!(range.len(), 8);
        assert_eq!(range[0], Complex32::new(4.0, -4.0));
        assert_eq!(range[7], Complex32::new(11.0, -11.0));
    }

    #[test]
    fn rejects_reads_past_the_end() {
        let amps = vec![Complex32::new(1.0, 0.0); 16];
        let file = write_fft(&amps);

        let mut reader = AmplitudeFile::open(file.path()).expect("open");
        assert!(matches!(
            reader.read_range(10, 8),
            Err(ExploreError::OutOfRange(_))
        ));
    }

    #[test]
    fn rejects_files_with_a_partial_bin() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        file.write_all(&[0u8; 12]).unwrap();
        file.flush().unwrap();

        assert!(matches!(
            AmplitudeFile::open(file.path()),
            Err(ExploreError::InputFormat(_))
        ));
    }
}
