//! Container sniffing by magic bytes.
//!
//! Input arrives as an already-open stream with no trustworthy filename, so
//! the container is identified from its leading bytes rather than an
//! extension.

/// Byte order of a TIFF container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteOrder {
    Big,
    Little,
}

impl ByteOrder {
    /// Read a `u16` at `offset`, `None` when out of bounds.
    pub fn read_u16(self, data: &[u8], offset: usize) -> Option<u16> {
        let bytes: [u8; 2] = data.get(offset..offset.checked_add(2)?)?.try_into().ok()?;
        Some(match self {
            ByteOrder::Big => u16::from_be_bytes(bytes),
            ByteOrder::Little => u16::from_le_bytes(bytes),
        })
    }

    /// Read a `u32` at `offset`, `None` when out of bounds.
    pub fn read_u32(self, data: &[u8], offset: usize) -> Option<u32> {
        let bytes: [u8; 4] = data.get(offset..offset.checked_add(4)?)?.try_into().ok()?;
        Some(match self {
            ByteOrder::Big => u32::from_be_bytes(bytes),
            ByteOrder::Little => u32::from_le_bytes(bytes),
        })
    }
}

/// Image containers that can carry IPTC-IIM data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Container {
    Jpeg,
    Tiff(ByteOrder),
}

impl Container {
    /// Identify the container from its first bytes.
    pub fn sniff(bytes: &[u8]) -> Option<Container> {
        match bytes {
            [0xFF, 0xD8, 0xFF, ..] => Some(Container::Jpeg),
            [b'M', b'M', 0x00, 0x2A, ..] => Some(Container::Tiff(ByteOrder::Big)),
            [b'I', b'I', 0x2A, 0x00, ..] => Some(Container::Tiff(ByteOrder::Little)),
            _ => None,
        }
    }
}
