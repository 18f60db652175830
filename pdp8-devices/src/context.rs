//! The small bundle of machine state an IOT handler needs.
//!
//! Passing `&mut IotContext` instead of the full `Machine` keeps this
//! crate free of a dependency on `pdp8-cpu` (which, in turn, depends on
//! this crate for the peripheral device structs it stores).

/// Processor state visible to a peripheral's IOT handler.
pub struct IotContext<'a> {
    /// The accumulator. Most IOT functions read or OR into this.
    pub ac: &'a mut u16,
    /// The interrupt-request bitmap, one bit per device number.
    pub ireq: &'a mut u64,
    /// This device's bit position within `ireq`.
    pub device_number: u16,
    /// PC of the instruction currently executing, for diagnostics.
    pub this_pc: u16,
    /// The IOT instruction word itself, for diagnostics.
    pub ir: u16,
    /// Set by the interpreter when the word immediately following this
    /// instruction is `JMP .-1` targeting this instruction's own address.
    /// Only meaningful to `KeyboardDevice::iot`'s `KSF` handling; every
    /// other device ignores it.
    pub idle_loop_hint: bool,
}

impl IotContext<'_> {
    /// Set this device's request bit.
    pub fn raise_request(&mut self) {
        *self.ireq |= 1 << self.device_number;
    }

    /// Clear this device's request bit.
    pub fn clear_request(&mut self) {
        *self.ireq &= !(1 << self.device_number);
    }
}

/// Result of dispatching one IOT function to a device.
#[derive(Debug, Default, Clone, Copy)]
pub struct IotOutcome {
    /// Whether the interpreter should skip the next instruction.
    pub skip: bool,
}

impl IotOutcome {
    pub const NONE: IotOutcome = IotOutcome { skip: false };
    pub const SKIP: IotOutcome = IotOutcome { skip: true };
}
