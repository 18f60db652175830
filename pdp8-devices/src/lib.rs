//! Peripheral device models for the PDP-8 simulator.
//!
//! CPU-internal pseudo-devices (device 0's self-IOT group and the
//! memory-extension family on 20-27) are not here: they mutate core
//! processor flip-flops (IEN, IF, DF, IB, SF) so tightly that they live
//! in `pdp8-cpu`'s interpreter instead, next to the registers they touch.
//! This crate holds the genuine peripherals: the ones with their own
//! state independent of the processor record.

mod context;
mod keyboard;
mod parity;
mod printer;
mod punch;
mod reader;
mod table;

pub use context::{IotContext, IotOutcome};
pub use keyboard::{KeyboardDevice, KeyboardSource, NullKeyboardSource};
pub use parity::ParityDevice;
pub use printer::PrinterDevice;
pub use punch::PunchDevice;
pub use reader::ReaderDevice;
pub use table::DeviceTable;
