use tdm_types::PropertyHandle;

/// A per-property attribute bitmap.
///
/// Bit `handle - 2` (LSB first within each byte) is set when the property
/// carries the attribute. The root has no bit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandleBitfield(Vec<u8>);

impl HandleBitfield {
    /// Wraps raw generated bytes.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self(bytes.to_vec())
    }

    /// Builds a bitmap with exactly `handles` set.
    pub fn from_handles(handles: impl IntoIterator<Item = PropertyHandle>) -> Self {
        let mut bits = Self(Vec::new());
        for handle in handles {
            bits.set(handle);
        }
        bits
    }

    /// Sets the bit for `handle`, growing the bitmap as needed. No-op for
    /// the root and null handles.
    pub fn set(&mut self, handle: PropertyHandle) {
        let Some(bit) = handle.property_index() else {
            return;
        };
        let byte = bit / 8;
        if self.0.len() <= byte {
            self.0.resize(byte + 1, 0);
        }
        self.0[byte] |= 1 << (bit % 8);
    }

    /// Grows the bitmap with zero bits so it addresses at least `bits` bits.
    pub(crate) fn pad_to(&mut self, bits: usize) {
        let bytes = bits.div_ceil(8);
        if self.0.len() < bytes {
            self.0.resize(bytes, 0);
        }
    }

    /// The bit for `handle`, or `None` if the handle falls outside the
    /// bitmap.
    pub fn get(&self, handle: PropertyHandle) -> Option<bool> {
        let bit = handle.property_index()?;
        let byte = self.0.get(bit / 8)?;
        Some(byte & (1 << (bit % 8)) != 0)
    }

    /// Number of bits the bitmap can address.
    pub fn capacity(&self) -> usize {
        self.0.len() * 8
    }

    /// Handles whose bit is set, ascending.
    pub fn handles(&self) -> impl Iterator<Item = PropertyHandle> + '_ {
        (0..self.capacity())
            .filter(|bit| self.0[bit / 8] & (1 << (bit % 8)) != 0)
            .map(PropertyHandle::from_property_index)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}
