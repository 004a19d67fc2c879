/// Read-only view of the emulated machine's RAM.
///
/// Scan-out reads without synchronization; a frame may tear if the machine is mid-write.
pub trait GuestRam {
    /// `len` bytes at guest address `addr`, or `None` if the range is not backed.
    fn read_bytes(&self, addr: u32, len: usize) -> Option<&[u8]>;

    /// Big-endian word at `addr` (the 68000 is big-endian).
    fn read_u16_be(&self, addr: u32) -> Option<u16> {
        let b = self.read_bytes(addr, 2)?;
        Some(u16::from_be_bytes([b[0], b[1]]))
    }
}

impl GuestRam for [u8] {
    fn read_bytes(&self, addr: u32, len: usize) -> Option<&[u8]> {
        let start = usize::try_from(addr).ok()?;
        let end = start.checked_add(len)?;
        self.get(start..end)
    }
}

impl GuestRam for Vec<u8> {
    fn read_bytes(&self, addr: u32, len: usize) -> Option<&[u8]> {
        self.as_slice().read_bytes(addr, len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn words_are_big_endian() {
        let ram = vec![0x12, 0x34, 0x56];
        assert_eq!(ram.read_u16_be(0), Some(0x1234));
        assert_eq!(ram.read_u16_be(1), Some(0x3456));
        assert_eq!(ram.read_u16_be(2), None);
    }

    #[test]
    fn out_of_range_is_none() {
        let ram = [0u8; 4];
        assert_eq!(ram[..].read_bytes(2, 2), Some(&[0, 0][..]));
        assert_eq!(ram[..].read_bytes(3, 2), None);
        assert_eq!(ram[..].read_bytes(u32::MAX, 2), None);
    }
}
