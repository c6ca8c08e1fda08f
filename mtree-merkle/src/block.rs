// File: mtree-merkle/src/block.rs
use std::borrow::Cow;

pub type BlockError = Box<dyn std::error::Error + Send + Sync>;

/// Input record of a tree. Serialization is the only thing the tree asks of it.
pub trait DataBlock {
    fn serialize(&self) -> Result<Cow<'_, [u8]>, BlockError>;
}

impl DataBlock for [u8] {
    fn serialize(&self) -> Result<Cow<'_, [u8]>, BlockError> { Ok(Cow::Borrowed(self)) }
}

impl<const N: usize> DataBlock for [u8; N] {
    fn serialize(&self) -> Result<Cow<'_, [u8]>, BlockError> { Ok(Cow::Borrowed(self.as_slice())) }
}

impl DataBlock for Vec<u8> {
    fn serialize(&self) -> Result<Cow<'_, [u8]>, BlockError> { Ok(Cow::Borrowed(self.as_slice())) }
}

impl DataBlock for str {
    fn serialize(&self) -> Result<Cow<'_, [u8]>, BlockError> { Ok(Cow::Borrowed(self.as_bytes())) }
}

impl DataBlock for String {
    fn serialize(&self) -> Result<Cow<'_, [u8]>, BlockError> { Ok(Cow::Borrowed(self.as_bytes())) }
}

impl<T: DataBlock + ?Sized> DataBlock for &T {
    fn serialize(&self) -> Result<Cow<'_, [u8]>, BlockError> { (**self).serialize() }
}
