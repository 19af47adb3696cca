use socketcan::{EFF_FLAG, EFF_MASK, ERR_FLAG, RTR_FLAG, SFF_MASK};

/// A frame as it comes off the kernel socket: the full identifier word
/// with the flag bits still set, the declared length, and the fixed
/// eight-byte payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawFrame {
    pub id: u32,
    pub dlc: u8,
    pub data: [u8; 8],
}

/// A decoded frame: flags separated out, identifier masked down to its
/// 11-bit or 29-bit value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frame {
    pub id: u32,
    pub extended: bool,
    pub rtr: bool,
    pub error: bool,
    pub dlc: u8,
    pub data: [u8; 8],
}

impl Frame {
    /// Splits the raw identifier word into flags and identifier. All
    /// three flags are probed on the unmasked word, then the identifier
    /// is masked to 29 bits for extended frames and 11 bits otherwise,
    /// so callers never see flag bits mixed into `id`.
    pub fn decode(raw: &RawFrame) -> Frame {
        let extended: bool = raw.id & EFF_FLAG != 0;
        let id: u32 = if extended {
            raw.id & EFF_MASK
        } else {
            raw.id & SFF_MASK
        };
        Frame {
            id,
            extended,
            rtr: raw.id & RTR_FLAG != 0,
            error: raw.id & ERR_FLAG != 0,
            dlc: raw.dlc,
            data: raw.data,
        }
    }
}
