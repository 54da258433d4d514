/// Value of the sync field that follows every break.
pub const SYNC_BYTE: u8 = 0x55;
/// Number of data bytes carried by every frame of the loopback test.
pub const DATA_LEN: usize = 8;
/// Sync, protected identifier, data and checksum.
pub const FRAME_LEN: usize = DATA_LEN + 3;
/// Largest identifier that fits into the 6 identifier bits.
pub const MAX_ID: u8 = 0x3f;

/// Index of the protected identifier inside a frame.
pub const PID_INDEX: usize = 1;
/// Index of the first data byte inside a frame.
pub const DATA_INDEX: usize = 2;
/// Index of the checksum inside a frame.
pub const CHECKSUM_INDEX: usize = FRAME_LEN - 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[serde(rename_all = "lowercase")]
pub enum LinChecksum {
    /// LIN 1.x, data bytes only.
    Classic,
    /// LIN 2.x, protected identifier and data bytes.
    #[default]
    Enhanced,
}

impl LinChecksum {
    /// First frame index that takes part in the checksum.
    pub fn offset(self) -> usize {
        match self {
            LinChecksum::Classic => DATA_INDEX,
            LinChecksum::Enhanced => PID_INDEX,
        }
    }

    /// Start value of the running sum for [`calc_lin_chksum`].
    pub fn start_value(self, pid: ProtectedIdentifier) -> u8 {
        match self {
            LinChecksum::Classic => 0,
            LinChecksum::Enhanced => pid.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ProtectedIdentifier(pub u8);

impl ProtectedIdentifier {
    /// Adds the two parity bits to `id`.
    ///
    /// Parity is computed over the low 6 bits only. Bits above them are a usage
    /// error of the caller and are passed through untouched.
    pub fn from_id(id: u8) -> Self {
        Self(id | Self::parity_bits(id))
    }

    pub fn is_valid(&self) -> bool {
        let mut valid_pid = *self;
        valid_pid.set_parity_bits();
        &valid_pid == self
    }

    pub fn set_parity_bits(&mut self) {
        self.0 = (self.0 & MAX_ID) | Self::parity_bits(self.0);
    }

    pub fn get_id(&self) -> u8 {
        self.0 & MAX_ID
    }

    fn parity_bits(id: u8) -> u8 {
        let p0 = ((id & 0b1) ^ ((id >> 1) & 0b1) ^ ((id >> 2) & 0b1) ^ ((id >> 4) & 0b1)) & 0b1;
        let p1 = !(((id >> 1) & 0b1) ^ ((id >> 3) & 0b1) ^ ((id >> 4) & 0b1) ^ ((id >> 5) & 0b1))
            & 0b1;
        (p0 << 6) | (p1 << 7)
    }
}

/// Sums `buf` onto `start` with end-around carry and returns the complement.
pub fn calc_lin_chksum(buf: &[u8], start: u8) -> u8 {
    let mut chksum: u8 = start;
    let mut overflow;

    for byte in buf {
        (chksum, overflow) = chksum.overflowing_add(*byte);
        if overflow {
            chksum += 1;
        }
    }
    !chksum
}

/// Checksum over the pid and data part of a frame laid out as
/// `[sync, pid, data.., checksum]`.
///
/// `Enhanced` covers indices `1..=9`, `Classic` covers `2..=9`.
pub fn frame_checksum(frame: &[u8], mode: LinChecksum) -> u8 {
    calc_lin_chksum(&frame[mode.offset()..CHECKSUM_INDEX], 0)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LinFrame {
    pub pid: ProtectedIdentifier,
    pub data: [u8; DATA_LEN],
    pub checksum: u8,
}

impl LinFrame {
    pub fn new(pid: ProtectedIdentifier, data: [u8; DATA_LEN], mode: LinChecksum) -> Self {
        Self {
            pid,
            data,
            checksum: calc_lin_chksum(&data, mode.start_value(pid)),
        }
    }

    pub fn to_bytes(&self) -> [u8; FRAME_LEN] {
        let mut bytes = [0; FRAME_LEN];
        bytes[0] = SYNC_BYTE;
        bytes[PID_INDEX] = self.pid.0;
        bytes[DATA_INDEX..CHECKSUM_INDEX].copy_from_slice(&self.data);
        bytes[CHECKSUM_INDEX] = self.checksum;
        bytes
    }

    pub fn from_bytes(bytes: &[u8; FRAME_LEN]) -> Self {
        let mut data = [0; DATA_LEN];
        data.copy_from_slice(&bytes[DATA_INDEX..CHECKSUM_INDEX]);
        Self {
            pid: ProtectedIdentifier(bytes[PID_INDEX]),
            data,
            checksum: bytes[CHECKSUM_INDEX],
        }
    }

    /// Whether the carried checksum matches the data for `mode`.
    pub fn checksum_valid(&self, mode: LinChecksum) -> bool {
        calc_lin_chksum(&self.data, mode.start_value(self.pid)) == self.checksum
    }
}
