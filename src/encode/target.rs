//! Where the octets of an encoded value end up.
//!
//! This is a private module. The relevant items are re-exported by the
//! parent.

use std::{error, io};
use std::convert::Infallible;
use bytes::BytesMut;


//------------ Target --------------------------------------------------------

/// A sink for the octets of an encoded value.
///
/// [`EncodeNode::write_encoded`][super::EncodeNode::write_encoded] walks the
/// finished tree and hands its octets to the target piece by piece. Because
/// the tree knows its size, the target is told the total length before the
/// first octet arrives and can make room for it.
///
/// Targets that can’t fail, such as `Vec<u8>` and `BytesMut`, use
/// [`Infallible`] as their error type.
pub trait Target {
    /// The error writing to the target can result in.
    type Error: error::Error;

    /// Announces that `len` more octets are about to be appended.
    fn reserve(&mut self, len: usize) {
        let _ = len;
    }

    /// Appends a single octet.
    fn put_u8(&mut self, octet: u8) -> Result<(), Self::Error> {
        self.put_slice(&[octet])
    }

    /// Appends a slice of octets.
    fn put_slice(&mut self, data: &[u8]) -> Result<(), Self::Error>;
}

impl<T: Target + ?Sized> Target for &mut T {
    type Error = T::Error;

    fn reserve(&mut self, len: usize) {
        (**self).reserve(len)
    }

    fn put_u8(&mut self, octet: u8) -> Result<(), Self::Error> {
        (**self).put_u8(octet)
    }

    fn put_slice(&mut self, data: &[u8]) -> Result<(), Self::Error> {
        (**self).put_slice(data)
    }
}

impl Target for Vec<u8> {
    type Error = Infallible;

    fn reserve(&mut self, len: usize) {
        Vec::reserve(self, len)
    }

    fn put_u8(&mut self, octet: u8) -> Result<(), Self::Error> {
        self.push(octet);
        Ok(())
    }

    fn put_slice(&mut self, data: &[u8]) -> Result<(), Self::Error> {
        self.extend_from_slice(data);
        Ok(())
    }
}

impl Target for BytesMut {
    type Error = Infallible;

    fn reserve(&mut self, len: usize) {
        BytesMut::reserve(self, len)
    }

    fn put_slice(&mut self, data: &[u8]) -> Result<(), Self::Error> {
        self.extend_from_slice(data);
        Ok(())
    }
}


//------------ IoTarget ------------------------------------------------------

/// A target writing into an IO writer.
///
/// Since values are often written back to back into a file or socket, the
/// target keeps count of the octets written through it.
pub struct IoTarget<W> {
    writer: W,
    written: usize,
}

impl<W> IoTarget<W> {
    pub fn new(writer: W) -> Self {
        IoTarget { writer, written: 0 }
    }

    /// Returns the number of octets written so far.
    pub fn written(&self) -> usize {
        self.written
    }

    pub fn into_writer(self) -> W {
        self.writer
    }
}

impl<W: io::Write> Target for IoTarget<W> {
    type Error = io::Error;

    fn put_slice(&mut self, data: &[u8]) -> Result<(), Self::Error> {
        self.writer.write_all(data)?;
        self.written += data.len();
        Ok(())
    }
}


//------------ infallible ----------------------------------------------------

/// Unwraps the result of writing to a target that can’t fail.
pub(crate) fn infallible<T>(res: Result<T, Infallible>) -> T {
    match res {
        Ok(res) => res,
        Err(err) => match err { }
    }
}


//============ Tests =========================================================
