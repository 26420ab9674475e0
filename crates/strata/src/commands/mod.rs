pub mod diff;
pub mod order;
pub mod synth;
