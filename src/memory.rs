/// Where the simulated stack starts. It grows toward lower addresses from here.
pub const BASE_ADDRESS: u64 = 0x7fff_0000;

/// Width of one stack slot on x86-64
pub const SLOT_SIZE: u64 = 8;

/// The simulated address space the stack lives in.
///
/// Nothing is stored here; it only turns slot indices into the addresses a real downward-growing
/// call stack would use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Memory {
    base: u64,
}

impl Memory {
    /// Constructs a [`Memory`] whose slot 0 sits at `base`
    pub const fn new(base: u64) -> Self {
        Self { base }
    }

    pub const fn base(&self) -> u64 {
        self.base
    }

    /// Address of the slot at `index`, counting up from the bottom of the stack.
    ///
    /// Wraps around on underflow like real address arithmetic would.
    pub const fn address(&self, index: usize) -> u64 {
        self.base.wrapping_sub((index as u64).wrapping_mul(SLOT_SIZE))
    }

    /// Number of bytes occupied by `slots` stack slots
    pub const fn byte_size(slots: usize) -> u64 {
        slots as u64 * SLOT_SIZE
    }
}

impl Default for Memory {
    fn default() -> Self {
        Self::new(BASE_ADDRESS)
    }
}

/// Parses a base address from the command line.
///
/// Hexadecimal needs a `0x` prefix, anything else is read as decimal. The address must be a
/// non-zero multiple of [`SLOT_SIZE`].
pub fn parse_address(text: &str) -> Result<u64, String> {
    let text = text.trim();
    let parsed = match text
        .strip_prefix("0x")
        .or_else(|| text.strip_prefix("0X"))
    {
        Some(hex) => u64::from_str_radix(&hex.replace('_', ""), 16),
        None => text.replace('_', "").parse::<u64>(),
    };
    let value = parsed.map_err(|e| format!("invalid address `{text}`: {e}"))?;

    if value == 0 || value % SLOT_SIZE != 0 {
        return Err(format!(
            "address {value:#x} must be a non-zero multiple of {SLOT_SIZE}"
        ));
    }

    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slots_grow_downward() {
        let memory = Memory::default();
        assert_eq!(memory.address(0), 0x7fff0000);
        assert_eq!(memory.address(1), 0x7ffefff8);
        assert_eq!(memory.address(2), 0x7ffefff0);
    }

    #[test]
    fn address_wraps_below_zero() {
        let memory = Memory::new(8);
        assert_eq!(memory.address(1), 0);
        assert_eq!(memory.address(2), u64::MAX - 7);
    }

    #[test]
    fn byte_size_counts_eight_per_slot() {
        assert_eq!(Memory::byte_size(0), 0);
        assert_eq!(Memory::byte_size(3), 24);
    }

    #[test]
    fn parses_hex_and_decimal_addresses() {
        assert_eq!(parse_address("0x7fff0000"), Ok(0x7fff0000));
        assert_eq!(parse_address("0X1000"), Ok(0x1000));
        assert_eq!(parse_address("0x7fff_0000"), Ok(0x7fff0000));
        assert_eq!(parse_address("4096"), Ok(4096));
    }

    #[test]
    fn digits_without_prefix_are_decimal() {
        assert_eq!(parse_address("20000000"), Ok(20_000_000));
        assert!(parse_address("7fff0000").is_err());
    }

    #[test]
    fn rejects_unaligned_or_bad_addresses() {
        assert!(parse_address("0x7fff0001").is_err());
        assert!(parse_address("0").is_err());
        assert!(parse_address("0xzz").is_err());
        assert!(parse_address("").is_err());
    }
}
