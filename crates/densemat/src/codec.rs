//! Binary matrix serialization.
//!
//! The format is:
//! - 16-byte header
//!   - `rows` (i64, native byte order)
//!   - `cols` (i64, native byte order)
//! - Payload: `rows × cols` [`f64`] elements in native byte order, tightly packed in row-major
//!   order
//!
//! There is no magic number or version tag, and the format is only portable between machines
//! of the same endianness. Round trips are bit-exact (NaN payloads and signed zeros included).

use std::{
    fs::File,
    io::{self, BufReader, BufWriter, Read, Write},
    mem,
    path::Path,
};

use anyhow::Context;

use crate::{backend::Backend, Error, Matrix, Shape};

const HEADER_LEN: usize = 2 * mem::size_of::<i64>();
const F64_LEN: usize = mem::size_of::<f64>();

/// Elements per staged read (4 MiB) when the stream length isn't known in advance.
const CHUNK_LEN: usize = 1 << 19;

fn encode_header(shape: Shape) -> io::Result<[u8; HEADER_LEN]> {
    let (Ok(rows), Ok(cols)) = (i64::try_from(shape.rows), i64::try_from(shape.cols)) else {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("{shape} matrix does not fit the serialized header"),
        ));
    };
    let mut bytes = [0; HEADER_LEN];
    bytes[..8].copy_from_slice(&rows.to_ne_bytes());
    bytes[8..].copy_from_slice(&cols.to_ne_bytes());
    Ok(bytes)
}

/// Decodes and validates a header, rejecting negative dimensions and shapes whose payload size
/// overflows.
fn decode_header(bytes: [u8; HEADER_LEN]) -> Result<Shape, Error> {
    let mut half = [0; 8];
    half.copy_from_slice(&bytes[..8]);
    let rows = i64::from_ne_bytes(half);
    half.copy_from_slice(&bytes[8..]);
    let cols = i64::from_ne_bytes(half);

    let invalid = Error::InvalidHeader { rows, cols };
    let (Ok(r), Ok(c)) = (usize::try_from(rows), usize::try_from(cols)) else {
        return Err(invalid);
    };
    let shape = Shape::new(r, c);
    match shape
        .checked_numel()
        .and_then(|n| n.checked_mul(F64_LEN))
    {
        Some(_) => Ok(shape),
        None => Err(invalid),
    }
}

fn read_header<R: Read>(reader: &mut R) -> Result<Shape, Error> {
    let mut header = [0; HEADER_LEN];
    reader.read_exact(&mut header)?;
    decode_header(header)
}

/// Reads until `buf` is full or the stream ends, returning the number of bytes read.
fn read_full<R: Read>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

/// Serialization.
impl<B: Backend> Matrix<B> {
    /// Writes the matrix to `writer` in the binary format described in the
    /// [module docs](crate::codec).
    pub fn write_to<W: Write>(&self, mut writer: W) -> Result<(), Error> {
        writer.write_all(&encode_header(self.shape())?)?;
        writer.write_all(bytemuck::cast_slice::<f64, u8>(self.as_slice()))?;
        Ok(())
    }

    /// Reads a matrix from `reader`.
    ///
    /// Returns [`Error::InvalidHeader`] if the header can't describe a matrix,
    /// [`Error::AllocationFailure`] if storage for the declared shape can't be allocated,
    /// [`Error::TruncatedPayload`] if the stream ends inside the payload, and [`Error::Io`] if it
    /// ends inside the header.
    ///
    /// Large payloads are buffered in chunks as they arrive, so a header declaring more data than
    /// the stream holds fails without reserving storage for the full declared shape.
    pub fn read_from<R: Read>(mut reader: R) -> Result<Self, Error> {
        let shape = read_header(&mut reader)?;
        Self::read_payload(&mut reader, shape, CHUNK_LEN)
    }

    /// Reads the payload for `shape`. Payloads of up to `direct_len` elements are read straight
    /// into newly allocated storage; longer ones are staged chunk by chunk first.
    fn read_payload<R: Read>(
        reader: &mut R,
        shape: Shape,
        direct_len: usize,
    ) -> Result<Self, Error> {
        let numel = shape.rows * shape.cols;
        let truncated = |available: usize| Error::TruncatedPayload {
            shape,
            expected: (numel * F64_LEN) as u64,
            available: available as u64,
        };

        let mat = if numel <= direct_len {
            let mut mat = Self::try_new(shape.rows, shape.cols)?;
            let bytes = bytemuck::cast_slice_mut::<f64, u8>(mat.as_mut_slice());
            let read = read_full(reader, bytes)?;
            if read < bytes.len() {
                return Err(truncated(read));
            }
            mat
        } else {
            let mut staged = Vec::new();
            while staged.len() < numel {
                let start = staged.len();
                let end = numel.min(start + CHUNK_LEN);
                staged
                    .try_reserve(end - start)
                    .map_err(|_| Error::AllocationFailure { shape })?;
                staged.resize(end, 0.0);
                let bytes = bytemuck::cast_slice_mut::<f64, u8>(&mut staged[start..]);
                let read = read_full(reader, bytes)?;
                if read < bytes.len() {
                    return Err(truncated(start * F64_LEN + read));
                }
            }
            let mut mat = Self::try_new(shape.rows, shape.cols)?;
            B::copy(&staged, 1, mat.as_mut_slice());
            mat
        };
        log::debug!("decoded {shape} matrix");
        Ok(mat)
    }

    /// Replaces `self` with a matrix read from `reader`.
    ///
    /// The previous storage of `self` is released. If decoding fails, `self` is left untouched.
    pub fn read_into<R: Read>(&mut self, reader: R) -> Result<(), Error> {
        *self = Self::read_from(reader)?;
        Ok(())
    }

    /// Saves the matrix to the file at `path`, creating or truncating it.
    pub fn save<A: AsRef<Path>>(&self, path: A) -> anyhow::Result<()> {
        self.save_impl(path.as_ref())
    }

    fn save_impl(&self, path: &Path) -> anyhow::Result<()> {
        let file = File::create(path)
            .with_context(|| format!("failed to create '{}'", path.display()))?;
        let mut writer = BufWriter::new(file);
        self.write_to(&mut writer).with_context(|| {
            format!(
                "failed to write {} matrix to '{}'",
                self.shape(),
                path.display()
            )
        })?;
        writer.flush()?;
        Ok(())
    }

    /// Loads a matrix previously written with [`Matrix::save`] (or [`Matrix::write_to`]).
    pub fn load<A: AsRef<Path>>(path: A) -> anyhow::Result<Self> {
        Self::load_impl(path.as_ref())
    }

    fn load_impl(path: &Path) -> anyhow::Result<Self> {
        let context = || format!("failed to read matrix from '{}'", path.display());
        let file =
            File::open(path).with_context(|| format!("failed to open '{}'", path.display()))?;
        let len = file.metadata().with_context(context)?.len();
        let mut reader = BufReader::new(file);
        let shape = read_header(&mut reader).with_context(context)?;

        // The file size is known up front, so a short file is rejected before allocating.
        let expected = (shape.rows * shape.cols * F64_LEN) as u64;
        let available = len.saturating_sub(HEADER_LEN as u64);
        if available < expected {
            return Err(Error::TruncatedPayload {
                shape,
                expected,
                available,
            })
            .with_context(context);
        }
        let mat = Self::read_payload(&mut reader, shape, usize::MAX).with_context(context)?;
        Ok(mat)
    }
}
