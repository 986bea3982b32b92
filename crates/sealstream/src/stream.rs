//! Chunked stream sealing and opening
//!
//! Container layout (big-endian throughout):
//! ```text
//! [8 bytes: ciphertext length][12 bytes: nonce][length bytes: ciphertext + tag]
//! ... repeated per chunk ...
//! [8 bytes: zero]                                <- explicit terminator
//! ```
//!
//! Each chunk holds at most [`CHUNK_SIZE`] bytes of plaintext and is
//! sealed independently with ChaCha20-Poly1305, so both directions run in
//! O(chunk size) memory no matter how large the payload is. The explicit
//! zero terminator makes the container self-delimiting: several containers
//! may be concatenated on one transport and opened back to back. A stream
//! that ends before the terminator is corrupt, not merely finished.

use std::io::{ErrorKind, Read, Write};

use chacha20poly1305::{
    aead::{Aead, KeyInit},
    ChaCha20Poly1305, Nonce,
};
use rand::RngCore;
use rayon::prelude::*;
use tracing::{debug, trace};

use crate::error::{Result, SealError};
use crate::key::SymmetricKey;
use crate::nonce::counted_nonce;
use crate::{CHUNK_SIZE, NONCE_SIZE, TAG_SIZE};

// Size of the chunk length field (u64, big-endian)
const LEN_SIZE: usize = 8;

fn cipher_for(key: &SymmetricKey) -> ChaCha20Poly1305 {
    ChaCha20Poly1305::new(key.as_bytes().into())
}

/// Fill `buf` from `reader`, stopping early only at end of stream.
///
/// Returns the number of bytes read (possibly zero at EOF); transport
/// errors surface as [`SealError::Read`].
fn read_chunk<R: Read>(reader: &mut R, buf: &mut [u8]) -> Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(SealError::Read(e)),
        }
    }
    Ok(filled)
}

/// Read exactly `buf.len()` bytes or report the container as truncated.
fn read_framed<R: Read>(reader: &mut R, buf: &mut [u8], context: &'static str) -> Result<()> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => {
                return Err(SealError::Truncated {
                    context,
                    expected: buf.len(),
                    actual: filled,
                })
            }
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(SealError::Read(e)),
        }
    }
    Ok(())
}

/// Seal a plaintext stream into a chunked container.
///
/// Draws one random prime nonce for the whole container and derives the
/// nonce of chunk `i` as [`counted_nonce`]`(prime, i)`. Returns the total
/// number of container bytes written, terminator included. An empty
/// input still produces a valid container: the 8-byte terminator alone.
pub fn seal<R: Read, W: Write>(mut reader: R, mut writer: W, key: &SymmetricKey) -> Result<u64> {
    let cipher = cipher_for(key);

    let mut prime = [0u8; NONCE_SIZE];
    rand::thread_rng().fill_bytes(&mut prime);

    let mut chunk = vec![0u8; CHUNK_SIZE];
    let mut counter: u64 = 0;
    let mut written: u64 = 0;

    loop {
        let read = read_chunk(&mut reader, &mut chunk)?;
        if read == 0 {
            break;
        }

        let nonce = counted_nonce(&prime, counter)?;
        counter += 1;

        // encrypt only fails past the cipher's message-length bound,
        // unreachable at 5 MiB chunks
        let sealed = cipher
            .encrypt(Nonce::from_slice(&nonce), &chunk[..read])
            .map_err(|_| SealError::Authentication)?;

        writer
            .write_all(&(sealed.len() as u64).to_be_bytes())
            .map_err(SealError::Write)?;
        writer.write_all(&nonce).map_err(SealError::Write)?;
        writer.write_all(&sealed).map_err(SealError::Write)?;
        written += (LEN_SIZE + NONCE_SIZE + sealed.len()) as u64;

        trace!(chunk = counter - 1, plaintext = read, "sealed chunk");
    }

    writer
        .write_all(&0u64.to_be_bytes())
        .map_err(SealError::Write)?;
    written += LEN_SIZE as u64;

    debug!(chunks = counter, bytes = written, "sealed container");
    Ok(written)
}

/// Open a chunked container back into plaintext.
///
/// Stops at the zero terminator and leaves the reader positioned right
/// after it, so concatenated containers can be opened in sequence.
/// Returns the number of plaintext bytes written.
pub fn open<R: Read, W: Write>(mut reader: R, mut writer: W, key: &SymmetricKey) -> Result<u64> {
    let cipher = cipher_for(key);

    let mut header = [0u8; LEN_SIZE];
    let mut nonce = [0u8; NONCE_SIZE];
    let mut chunk = vec![0u8; CHUNK_SIZE + TAG_SIZE];
    let mut counter: u64 = 0;
    let mut written: u64 = 0;

    loop {
        read_framed(&mut reader, &mut header, "chunk header")?;
        let declared = u64::from_be_bytes(header);
        if declared == 0 {
            debug!(chunks = counter, bytes = written, "opened container");
            return Ok(written);
        }
        // bound memory before allocating or reading anything
        if declared > (CHUNK_SIZE + TAG_SIZE) as u64 {
            return Err(SealError::ChunkTooLarge {
                declared,
                max: (CHUNK_SIZE + TAG_SIZE) as u64,
            });
        }

        read_framed(&mut reader, &mut nonce, "chunk nonce")?;
        let sealed = &mut chunk[..declared as usize];
        read_framed(&mut reader, sealed, "chunk ciphertext")?;

        let plain = cipher
            .decrypt(Nonce::from_slice(&nonce), &*sealed)
            .map_err(|_| SealError::Authentication)?;

        writer.write_all(&plain).map_err(SealError::Write)?;
        written += plain.len() as u64;
        counter += 1;

        trace!(chunk = counter - 1, plaintext = plain.len(), "opened chunk");
    }
}

/// Seal an in-memory payload, returning the container bytes.
pub fn seal_bytes(plain: &[u8], key: &SymmetricKey) -> Result<Vec<u8>> {
    let mut container = Vec::with_capacity(plain.len() + container_overhead(plain.len()));
    seal(plain, &mut container, key)?;
    Ok(container)
}

/// Open an in-memory container, returning the plaintext.
pub fn open_bytes(container: &[u8], key: &SymmetricKey) -> Result<Vec<u8>> {
    let mut plain = Vec::with_capacity(container.len());
    open(container, &mut plain, key)?;
    Ok(plain)
}

/// Seal an in-memory payload, encrypting its chunks concurrently.
///
/// Chunk boundaries of a slice are known up front, so nonces can be
/// pre-assigned by index and the independent AEAD operations run on the
/// rayon pool. Chunks are emitted in index order: the output is laid out
/// exactly like [`seal`]'s and is opened by the same [`open`] path.
pub fn seal_bytes_parallel(plain: &[u8], key: &SymmetricKey) -> Result<Vec<u8>> {
    let cipher = cipher_for(key);

    let mut prime = [0u8; NONCE_SIZE];
    rand::thread_rng().fill_bytes(&mut prime);

    let sealed: Vec<(Vec<u8>, Vec<u8>)> = plain
        .par_chunks(CHUNK_SIZE)
        .enumerate()
        .map(|(idx, chunk)| {
            let nonce = counted_nonce(&prime, idx as u64)?;
            let sealed = cipher
                .encrypt(Nonce::from_slice(&nonce), chunk)
                .map_err(|_| SealError::Authentication)?;
            Ok((nonce, sealed))
        })
        .collect::<Result<_>>()?;

    let mut container = Vec::with_capacity(plain.len() + container_overhead(plain.len()));
    for (nonce, chunk) in &sealed {
        container.extend_from_slice(&(chunk.len() as u64).to_be_bytes());
        container.extend_from_slice(nonce);
        container.extend_from_slice(chunk);
    }
    container.extend_from_slice(&0u64.to_be_bytes());

    debug!(
        chunks = sealed.len(),
        bytes = container.len(),
        "sealed container (parallel)"
    );
    Ok(container)
}

/// Framing and tag overhead for a payload of `plain_len` bytes.
fn container_overhead(plain_len: usize) -> usize {
    let chunks = plain_len.div_ceil(CHUNK_SIZE).max(1);
    chunks * (LEN_SIZE + NONCE_SIZE + TAG_SIZE) + LEN_SIZE
}
